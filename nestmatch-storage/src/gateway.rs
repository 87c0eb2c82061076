//! Data-access gateway abstraction.
//!
//! The relational store is an external collaborator reached two ways: row
//! access with filter predicates, and named stored procedures for the
//! aggregate queries. `CouplesGateway` captures exactly the surface the
//! couples layer consumes; the PostgreSQL implementation lives in
//! nestmatch-api and the in-memory mock in [`crate::mock`].
//!
//! Stored procedures return loosely-shaped JSON rows (counts may arrive as
//! numeric strings, member lists may be absent), so this module also owns
//! the validating parse step that turns raw rows into the typed entities.
//! Rows that fail validation are dropped per-row, never propagated as
//! partial entries.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;

use nestmatch_core::{
    GatewayError, HouseholdActivity, HouseholdId, InteractionId, InteractionType, LikeRow,
    MutualLike, PropertyId, Timestamp, UserId,
};

// ============================================================================
// GATEWAY TRAIT
// ============================================================================

/// Read surface of the relational store, as consumed by the couples layer.
///
/// All methods are point-in-time reads; the layer issues no writes through
/// this trait (interaction writes happen upstream, this layer only reacts
/// to them).
#[async_trait]
pub trait CouplesGateway: Send + Sync {
    /// Resolve `user_profiles.household_id` for a user. `None` when the
    /// user has no household - not an error.
    async fn household_for_user(&self, user_id: UserId)
        -> Result<Option<HouseholdId>, GatewayError>;

    /// Call the `get_household_mutual_likes(p_household_id)` stored
    /// procedure. Returns the raw JSON row array.
    async fn mutual_likes_rollup(
        &self,
        household_id: HouseholdId,
    ) -> Result<JsonValue, GatewayError>;

    /// Call the `get_household_activity_enhanced(p_household_id, p_limit,
    /// p_offset)` stored procedure. Returns the raw JSON row array.
    async fn enhanced_activity(
        &self,
        household_id: HouseholdId,
        limit: i64,
        offset: i64,
    ) -> Result<JsonValue, GatewayError>;

    /// Fetch all raw like interactions for a household (fallback path for
    /// the mutual-likes aggregation).
    async fn like_interactions(
        &self,
        household_id: HouseholdId,
    ) -> Result<Vec<LikeRow>, GatewayError>;

    /// Count all like interactions across the household, not deduplicated
    /// by property.
    async fn count_household_likes(
        &self,
        household_id: HouseholdId,
    ) -> Result<i64, GatewayError>;

    /// The most recent interaction timestamps for the household, newest
    /// first, at most `limit` rows.
    async fn recent_interaction_times(
        &self,
        household_id: HouseholdId,
        limit: i64,
    ) -> Result<Vec<Timestamp>, GatewayError>;

    /// Distinct household members other than `user_id` with an active like
    /// on the property.
    async fn partner_likes_excluding(
        &self,
        household_id: HouseholdId,
        property_id: PropertyId,
        user_id: UserId,
    ) -> Result<Vec<UserId>, GatewayError>;
}

// ============================================================================
// RAW ROW SHAPES
// ============================================================================

/// Raw row from `get_household_mutual_likes`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMutualLikeRow {
    pub property_id: PropertyId,
    /// May arrive as a JSON number or a numeric string.
    #[serde(deserialize_with = "de_count")]
    pub liked_by_count: u64,
    pub first_liked_at: Timestamp,
    pub last_liked_at: Timestamp,
    /// Absent from older versions of the procedure.
    #[serde(default)]
    pub user_ids: Vec<UserId>,
}

/// Raw row from `get_household_activity_enhanced`.
///
/// Identity fields are required; the denormalized join fields are all
/// optional and defaulted during transformation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawActivityRow {
    pub id: InteractionId,
    pub user_id: UserId,
    pub property_id: PropertyId,
    pub interaction_type: String,
    pub created_at: Timestamp,
    #[serde(default)]
    pub user_display_name: Option<String>,
    #[serde(default)]
    pub property_address: Option<String>,
    #[serde(default, deserialize_with = "de_opt_count")]
    pub property_price: Option<i64>,
    #[serde(default)]
    pub property_bedrooms: Option<i32>,
    #[serde(default)]
    pub property_bathrooms: Option<i32>,
    #[serde(default)]
    pub property_images: Option<Vec<String>>,
}

/// Deserialize a count that may be a JSON number or a numeric string.
fn de_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| serde::de::Error::custom(format!("not a count: {s:?}"))),
    }
}

/// Same coercion as [`de_count`] for an optional signed field.
fn de_opt_count<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MaybeNumber {
        Number(i64),
        String(String),
        Null,
    }

    match Option::<MaybeNumber>::deserialize(deserializer)? {
        None | Some(MaybeNumber::Null) => Ok(None),
        Some(MaybeNumber::Number(n)) => Ok(Some(n)),
        Some(MaybeNumber::String(s)) => Ok(s.trim().parse::<i64>().ok()),
    }
}

// ============================================================================
// VALIDATING TRANSFORMS
// ============================================================================

/// Sentinel for display fields whose read-time join produced no match.
const UNKNOWN: &str = "Unknown";

/// Transform the raw `get_household_mutual_likes` rows into typed
/// [`MutualLike`]s. Malformed rows and rows with a coerced count below 2
/// are dropped.
pub fn parse_mutual_like_rows(value: &JsonValue) -> Vec<MutualLike> {
    let Some(rows) = value.as_array() else {
        if !value.is_null() {
            tracing::debug!("mutual-likes rollup was not a row array, treating as empty");
        }
        return Vec::new();
    };

    rows.iter()
        .filter_map(|row| match serde_json::from_value::<RawMutualLikeRow>(row.clone()) {
            Ok(raw) if raw.liked_by_count >= 2 => Some(MutualLike {
                property_id: raw.property_id,
                liked_by_count: raw.liked_by_count as usize,
                first_liked_at: raw.first_liked_at,
                last_liked_at: raw.last_liked_at,
                user_ids: raw.user_ids,
            }),
            Ok(raw) => {
                tracing::debug!(
                    property_id = %raw.property_id,
                    count = raw.liked_by_count,
                    "dropping sub-threshold mutual-like row"
                );
                None
            }
            Err(err) => {
                tracing::debug!(%err, "dropping malformed mutual-like row");
                None
            }
        })
        .collect()
}

/// Transform the raw `get_household_activity_enhanced` rows into typed
/// [`HouseholdActivity`] entries, defaulting missing denormalized fields
/// and flagging mutuality against `mutual_ids`. Rows missing identity
/// fields or carrying an unknown interaction type are dropped.
pub fn parse_activity_rows(
    value: &JsonValue,
    mutual_ids: &HashSet<PropertyId>,
) -> Vec<HouseholdActivity> {
    let Some(rows) = value.as_array() else {
        if !value.is_null() {
            tracing::debug!("activity rollup was not a row array, treating as empty");
        }
        return Vec::new();
    };

    rows.iter()
        .filter_map(|row| {
            let raw = match serde_json::from_value::<RawActivityRow>(row.clone()) {
                Ok(raw) => raw,
                Err(err) => {
                    tracing::debug!(%err, "dropping malformed activity row");
                    return None;
                }
            };
            let interaction_type = match raw.interaction_type.parse::<InteractionType>() {
                Ok(ty) => ty,
                Err(err) => {
                    tracing::debug!(%err, "dropping activity row with unknown type");
                    return None;
                }
            };
            Some(HouseholdActivity {
                id: raw.id,
                user_id: raw.user_id,
                property_id: raw.property_id,
                interaction_type,
                created_at: raw.created_at,
                user_display_name: raw
                    .user_display_name
                    .unwrap_or_else(|| UNKNOWN.to_string()),
                property_address: raw
                    .property_address
                    .unwrap_or_else(|| UNKNOWN.to_string()),
                property_price: raw.property_price.unwrap_or(0),
                property_bedrooms: raw.property_bedrooms.unwrap_or(0),
                property_bathrooms: raw.property_bathrooms.unwrap_or(0),
                property_images: raw.property_images.unwrap_or_default(),
                is_mutual: interaction_type == InteractionType::Like
                    && mutual_ids.contains(&raw.property_id),
            })
        })
        .collect()
}
