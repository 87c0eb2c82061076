//! In-memory mock gateway for tests.
//!
//! Seed it with households, members, properties, and interactions, then
//! hand it to the service layer. RPC failure toggles force the fallback
//! paths, and per-method call counters let tests assert that cached reads
//! and no-household short-circuits never reach the gateway.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value as JsonValue};

use nestmatch_core::{
    new_entity_id, GatewayError, HouseholdId, InteractionId, InteractionType, LikeRow,
    PropertyId, Timestamp, UserId,
};

use crate::gateway::CouplesGateway;

/// Denormalized property details used by the enhanced-activity join.
#[derive(Debug, Clone)]
pub struct MockProperty {
    pub address: String,
    pub price: i64,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub images: Vec<String>,
}

#[derive(Debug, Clone)]
struct MockInteraction {
    id: InteractionId,
    household_id: HouseholdId,
    user_id: UserId,
    property_id: PropertyId,
    interaction_type: InteractionType,
    created_at: Timestamp,
}

#[derive(Default)]
struct MockState {
    /// user -> household membership.
    households: HashMap<UserId, HouseholdId>,
    /// user -> display name (read-time join source).
    display_names: HashMap<UserId, String>,
    properties: HashMap<PropertyId, MockProperty>,
    interactions: Vec<MockInteraction>,
}

/// Per-method call counters.
#[derive(Debug, Default)]
pub struct MockCallCounts {
    pub household_for_user: AtomicU64,
    pub mutual_likes_rollup: AtomicU64,
    pub enhanced_activity: AtomicU64,
    pub like_interactions: AtomicU64,
    pub count_household_likes: AtomicU64,
    pub recent_interaction_times: AtomicU64,
    pub partner_likes_excluding: AtomicU64,
}

impl MockCallCounts {
    /// Total stored-procedure invocations (the two RPC methods).
    pub fn rpc_calls(&self) -> u64 {
        self.mutual_likes_rollup.load(Ordering::Relaxed)
            + self.enhanced_activity.load(Ordering::Relaxed)
    }

    /// Total calls hitting any gateway method.
    pub fn total(&self) -> u64 {
        self.household_for_user.load(Ordering::Relaxed)
            + self.mutual_likes_rollup.load(Ordering::Relaxed)
            + self.enhanced_activity.load(Ordering::Relaxed)
            + self.like_interactions.load(Ordering::Relaxed)
            + self.count_household_likes.load(Ordering::Relaxed)
            + self.recent_interaction_times.load(Ordering::Relaxed)
            + self.partner_likes_excluding.load(Ordering::Relaxed)
    }
}

/// In-memory [`CouplesGateway`] implementation.
#[derive(Default)]
pub struct MockGateway {
    state: RwLock<MockState>,
    /// Exposed so tests can assert on gateway traffic.
    pub calls: MockCallCounts,
    fail_mutual_rpc: AtomicBool,
    fail_activity_rpc: AtomicBool,
    fail_row_access: AtomicBool,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a user in a household with a display name.
    pub fn add_member(&self, household_id: HouseholdId, user_id: UserId, name: &str) {
        let mut state = self.write();
        state.households.insert(user_id, household_id);
        state.display_names.insert(user_id, name.to_string());
    }

    /// Register property details for the enhanced-activity join.
    pub fn add_property(&self, property_id: PropertyId, property: MockProperty) {
        self.write().properties.insert(property_id, property);
    }

    /// Record an interaction for a user already added via [`add_member`].
    /// Returns the new interaction id. Panics if the user has no household
    /// (seed order bug in the test).
    pub fn record_interaction(
        &self,
        user_id: UserId,
        property_id: PropertyId,
        interaction_type: InteractionType,
        created_at: Timestamp,
    ) -> InteractionId {
        let mut state = self.write();
        let household_id = *state
            .households
            .get(&user_id)
            .expect("record_interaction: user has no household");
        let id = new_entity_id();
        state.interactions.push(MockInteraction {
            id,
            household_id,
            user_id,
            property_id,
            interaction_type,
            created_at,
        });
        id
    }

    /// Convenience: record a like timestamped now.
    pub fn record_like(&self, user_id: UserId, property_id: PropertyId) -> InteractionId {
        self.record_interaction(user_id, property_id, InteractionType::Like, Utc::now())
    }

    /// Make the mutual-likes stored procedure fail, forcing the fallback.
    pub fn fail_mutual_rpc(&self, fail: bool) {
        self.fail_mutual_rpc.store(fail, Ordering::Relaxed);
    }

    /// Make the enhanced-activity stored procedure fail.
    pub fn fail_activity_rpc(&self, fail: bool) {
        self.fail_activity_rpc.store(fail, Ordering::Relaxed);
    }

    /// Make every row-access method fail as well.
    pub fn fail_row_access(&self, fail: bool) {
        self.fail_row_access.store(fail, Ordering::Relaxed);
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, MockState> {
        match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, MockState> {
        match self.state.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn check_row_access(&self) -> Result<(), GatewayError> {
        if self.fail_row_access.load(Ordering::Relaxed) {
            Err(GatewayError::Query {
                reason: "mock row access failure".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// The same aggregation the real stored procedure performs, expressed
    /// over the seeded rows: distinct likers per property, threshold 2.
    fn rollup_rows(&self, household_id: HouseholdId) -> Vec<JsonValue> {
        let state = self.read();
        let mut groups: HashMap<PropertyId, (Vec<UserId>, Timestamp, Timestamp)> = HashMap::new();
        for row in state.interactions.iter().filter(|i| {
            i.household_id == household_id && i.interaction_type == InteractionType::Like
        }) {
            let entry = groups
                .entry(row.property_id)
                .or_insert_with(|| (Vec::new(), row.created_at, row.created_at));
            if !entry.0.contains(&row.user_id) {
                entry.0.push(row.user_id);
            }
            entry.1 = entry.1.min(row.created_at);
            entry.2 = entry.2.max(row.created_at);
        }

        let mut rows: Vec<JsonValue> = groups
            .into_iter()
            .filter(|(_, (users, _, _))| users.len() >= 2)
            .map(|(property_id, (users, first, last))| {
                json!({
                    "property_id": property_id,
                    "liked_by_count": users.len(),
                    "first_liked_at": first,
                    "last_liked_at": last,
                    "user_ids": users,
                })
            })
            .collect();
        // Stable output order for assertions.
        rows.sort_by_key(|row| row["property_id"].as_str().map(str::to_string));
        rows
    }
}

#[async_trait]
impl CouplesGateway for MockGateway {
    async fn household_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<HouseholdId>, GatewayError> {
        self.calls
            .household_for_user
            .fetch_add(1, Ordering::Relaxed);
        self.check_row_access()?;
        Ok(self.read().households.get(&user_id).copied())
    }

    async fn mutual_likes_rollup(
        &self,
        household_id: HouseholdId,
    ) -> Result<JsonValue, GatewayError> {
        self.calls
            .mutual_likes_rollup
            .fetch_add(1, Ordering::Relaxed);
        if self.fail_mutual_rpc.load(Ordering::Relaxed) {
            return Err(GatewayError::Rpc {
                procedure: "get_household_mutual_likes".to_string(),
                reason: "mock rpc failure".to_string(),
            });
        }
        Ok(JsonValue::Array(self.rollup_rows(household_id)))
    }

    async fn enhanced_activity(
        &self,
        household_id: HouseholdId,
        limit: i64,
        offset: i64,
    ) -> Result<JsonValue, GatewayError> {
        self.calls.enhanced_activity.fetch_add(1, Ordering::Relaxed);
        if self.fail_activity_rpc.load(Ordering::Relaxed) {
            return Err(GatewayError::Rpc {
                procedure: "get_household_activity_enhanced".to_string(),
                reason: "mock rpc failure".to_string(),
            });
        }

        let state = self.read();
        let mut rows: Vec<&MockInteraction> = state
            .interactions
            .iter()
            .filter(|i| i.household_id == household_id)
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let page: Vec<JsonValue> = rows
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|i| {
                let mut row = json!({
                    "id": i.id,
                    "user_id": i.user_id,
                    "property_id": i.property_id,
                    "interaction_type": i.interaction_type.as_str(),
                    "created_at": i.created_at,
                });
                if let Some(name) = state.display_names.get(&i.user_id) {
                    row["user_display_name"] = json!(name);
                }
                if let Some(property) = state.properties.get(&i.property_id) {
                    row["property_address"] = json!(property.address);
                    row["property_price"] = json!(property.price);
                    row["property_bedrooms"] = json!(property.bedrooms);
                    row["property_bathrooms"] = json!(property.bathrooms);
                    row["property_images"] = json!(property.images);
                }
                row
            })
            .collect();
        Ok(JsonValue::Array(page))
    }

    async fn like_interactions(
        &self,
        household_id: HouseholdId,
    ) -> Result<Vec<LikeRow>, GatewayError> {
        self.calls.like_interactions.fetch_add(1, Ordering::Relaxed);
        self.check_row_access()?;
        Ok(self
            .read()
            .interactions
            .iter()
            .filter(|i| {
                i.household_id == household_id && i.interaction_type == InteractionType::Like
            })
            .map(|i| LikeRow {
                property_id: i.property_id,
                user_id: i.user_id,
                created_at: i.created_at,
            })
            .collect())
    }

    async fn count_household_likes(
        &self,
        household_id: HouseholdId,
    ) -> Result<i64, GatewayError> {
        self.calls
            .count_household_likes
            .fetch_add(1, Ordering::Relaxed);
        self.check_row_access()?;
        Ok(self
            .read()
            .interactions
            .iter()
            .filter(|i| {
                i.household_id == household_id && i.interaction_type == InteractionType::Like
            })
            .count() as i64)
    }

    async fn recent_interaction_times(
        &self,
        household_id: HouseholdId,
        limit: i64,
    ) -> Result<Vec<Timestamp>, GatewayError> {
        self.calls
            .recent_interaction_times
            .fetch_add(1, Ordering::Relaxed);
        self.check_row_access()?;
        let mut times: Vec<Timestamp> = self
            .read()
            .interactions
            .iter()
            .filter(|i| i.household_id == household_id)
            .map(|i| i.created_at)
            .collect();
        times.sort_by(|a, b| b.cmp(a));
        times.truncate(limit.max(0) as usize);
        Ok(times)
    }

    async fn partner_likes_excluding(
        &self,
        household_id: HouseholdId,
        property_id: PropertyId,
        user_id: UserId,
    ) -> Result<Vec<UserId>, GatewayError> {
        self.calls
            .partner_likes_excluding
            .fetch_add(1, Ordering::Relaxed);
        self.check_row_access()?;
        let mut partners: Vec<UserId> = Vec::new();
        for row in self.read().interactions.iter().filter(|i| {
            i.household_id == household_id
                && i.property_id == property_id
                && i.interaction_type == InteractionType::Like
                && i.user_id != user_id
        }) {
            if !partners.contains(&row.user_id) {
                partners.push(row.user_id);
            }
        }
        Ok(partners)
    }
}
