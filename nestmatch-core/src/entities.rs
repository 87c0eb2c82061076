//! Derived entity types for the couples matching layer.
//!
//! None of these are persisted as their own rows - they are materialized on
//! read from `user_property_interactions` (directly or via stored
//! procedures) and live only in the cache between recomputations.

use crate::enums::InteractionType;
use crate::identity::{InteractionId, PropertyId, Timestamp, UserId};
use serde::{Deserialize, Serialize};

// ============================================================================
// MUTUAL LIKES
// ============================================================================

/// A property currently liked by two or more distinct household members.
///
/// One instance exists per (household, property) pair while the distinct
/// liker count is >= 2; the pair conceptually ceases to exist the instant
/// the count drops below that threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutualLike {
    /// The liked property. Opaque to this layer.
    pub property_id: PropertyId,
    /// Count of distinct members with an active like. Always >= 2.
    pub liked_by_count: usize,
    /// Earliest qualifying like among the current likers.
    pub first_liked_at: Timestamp,
    /// Most recent qualifying like among the current likers.
    pub last_liked_at: Timestamp,
    /// The distinct members who liked the property. May be empty when the
    /// aggregation procedure does not return the member list.
    pub user_ids: Vec<UserId>,
}

// ============================================================================
// ACTIVITY TIMELINE
// ============================================================================

/// One household-member interaction event, denormalized for display.
///
/// Property and profile fields are a read-time join snapshot; when the join
/// produces no match they default to "Unknown"/empty/zero rather than being
/// dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseholdActivity {
    pub id: InteractionId,
    pub user_id: UserId,
    pub property_id: PropertyId,
    pub interaction_type: InteractionType,
    pub created_at: Timestamp,
    /// Display name of the acting member, or "Unknown".
    pub user_display_name: String,
    /// Street address of the property, or "Unknown".
    pub property_address: String,
    /// Listing price, or 0 when the join missed.
    pub property_price: i64,
    pub property_bedrooms: i32,
    pub property_bathrooms: i32,
    pub property_images: Vec<String>,
    /// True iff this is a like and the property is currently in the
    /// household's mutual-like set.
    pub is_mutual: bool,
}

// ============================================================================
// HOUSEHOLD STATS
// ============================================================================

/// Point-in-time engagement rollup for one household.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouplesStats {
    /// Cardinality of the household's mutual-like set.
    pub total_mutual_likes: usize,
    /// Count of all like interactions across all members, not deduplicated
    /// by property.
    pub total_household_likes: i64,
    /// Consecutive calendar days (UTC, ending today or yesterday) with at
    /// least one interaction, over at most the last 30 interactions.
    pub activity_streak_days: u32,
    /// `last_liked_at` of the most recently updated mutual like.
    pub last_mutual_like_at: Option<Timestamp>,
}

// ============================================================================
// NOTIFIER
// ============================================================================

/// Result of a potential-mutual-like check after a like is recorded.
///
/// Surfaced by the interaction notifier as a hook for downstream
/// notification wiring; produced regardless of whether anything consumes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PotentialMutual {
    /// The property the acting user just liked.
    pub property_id: PropertyId,
    /// A household member (other than the acting user) who already liked
    /// the property, making the pair mutual.
    pub partner_user_id: UserId,
    /// Distinct likers on the property including the acting user.
    pub liked_by_count: usize,
}

// ============================================================================
// RAW INTERACTION ROWS
// ============================================================================

/// A raw like interaction row, as fetched for the client-side fallback
/// aggregation. Narrow on purpose: only the columns the aggregation needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeRow {
    pub property_id: PropertyId,
    pub user_id: UserId,
    pub created_at: Timestamp,
}
