//! Nestmatch Test Utilities
//!
//! Centralized test infrastructure for the Nestmatch workspace:
//! - Household fixtures backed by the in-memory mock gateway
//! - Proptest generators for the couples entity types
//! - Re-exports so test modules need only one dev-dependency

use std::sync::Arc;

// Re-export the mock gateway from its source crate
pub use nestmatch_storage::{MockCallCounts, MockGateway, MockProperty};

// Re-export core types for convenience
pub use nestmatch_core::{
    new_entity_id, CouplesError, CouplesResult, CouplesStats, GatewayError, HouseholdActivity,
    HouseholdId, InteractionId, InteractionType, LikeRow, MutualLike, PotentialMutual, PropertyId,
    Timestamp, UserId,
};

// ============================================================================
// FIXTURES
// ============================================================================

/// A seeded household and the gateway holding it.
pub struct HouseholdFixture {
    pub gateway: Arc<MockGateway>,
    pub household_id: HouseholdId,
    /// Member ids in the order their names were given.
    pub members: Vec<UserId>,
}

/// Build a gateway with one household containing a member per name.
pub fn household_with_members(names: &[&str]) -> HouseholdFixture {
    let gateway = Arc::new(MockGateway::new());
    let household_id = new_entity_id();
    let members = names
        .iter()
        .map(|name| {
            let user_id = new_entity_id();
            gateway.add_member(household_id, user_id, name);
            user_id
        })
        .collect();
    HouseholdFixture {
        gateway,
        household_id,
        members,
    }
}

impl HouseholdFixture {
    /// Seed a property every member likes, returning its id. With two or
    /// more members this produces a mutual like.
    pub fn seed_shared_like(&self) -> PropertyId {
        let property_id = new_entity_id();
        for member in &self.members {
            self.gateway.record_like(*member, property_id);
        }
        property_id
    }
}

/// Property detail row with plausible listing values.
pub fn sample_property() -> MockProperty {
    MockProperty {
        address: "12 Elm St".to_string(),
        price: 425_000,
        bedrooms: 3,
        bathrooms: 2,
        images: vec!["https://img.example/12-elm-st/1.jpg".to_string()],
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;
    use proptest::prelude::*;
    use uuid::Uuid;

    /// Generate an arbitrary UUID v7 (matches production id generation).
    pub fn arb_uuid_v7() -> impl Strategy<Value = Uuid> {
        any::<u128>().prop_map(|_| Uuid::now_v7())
    }

    pub fn arb_household_id() -> impl Strategy<Value = HouseholdId> {
        arb_uuid_v7()
    }

    pub fn arb_user_id() -> impl Strategy<Value = UserId> {
        arb_uuid_v7()
    }

    pub fn arb_property_id() -> impl Strategy<Value = PropertyId> {
        arb_uuid_v7()
    }

    /// Timestamps between 2020-01-01 and 2035-12-31.
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        (1_577_836_800i64..2_082_758_400i64)
            .prop_map(|secs| Utc.timestamp_opt(secs, 0).unwrap())
    }

    pub fn arb_interaction_type() -> impl Strategy<Value = InteractionType> {
        prop_oneof![
            Just(InteractionType::Like),
            Just(InteractionType::Dislike),
            Just(InteractionType::Skip),
            Just(InteractionType::View),
        ]
    }

    /// One raw like row drawn from small user/property pools, so generated
    /// sets actually collide on properties.
    pub fn arb_like_row(
        users: Vec<UserId>,
        properties: Vec<PropertyId>,
    ) -> impl Strategy<Value = LikeRow> {
        (
            proptest::sample::select(properties),
            proptest::sample::select(users),
            arb_timestamp(),
        )
            .prop_map(|(property_id, user_id, created_at)| LikeRow {
                property_id,
                user_id,
                created_at,
            })
    }

    /// A batch of like rows over shared 4-user / 4-property pools.
    pub fn arb_like_rows() -> impl Strategy<Value = Vec<LikeRow>> {
        let users: Vec<UserId> = (0..4).map(|_| new_entity_id()).collect();
        let properties: Vec<PropertyId> = (0..4).map(|_| new_entity_id()).collect();
        proptest::collection::vec(arb_like_row(users, properties), 0..32)
    }
}

// ============================================================================
// TESTS
// ============================================================================
