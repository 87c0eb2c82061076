//! Identity types for Nestmatch entities

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Entity identifier using UUIDv7 for timestamp-sortable IDs.
/// UUIDv7 embeds a Unix timestamp, making IDs naturally sortable by creation time.
pub type EntityId = Uuid;

/// A user account identifier (`user_profiles.id` upstream).
pub type UserId = Uuid;

/// A household identifier. Households group the accounts collaborating on
/// a property search; a user belongs to at most one household at a time.
pub type HouseholdId = Uuid;

/// A property listing identifier. Properties are an external entity; this
/// layer only ever treats the id as opaque.
pub type PropertyId = Uuid;

/// An interaction row identifier (`user_property_interactions.id` upstream).
pub type InteractionId = Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Generate a new UUIDv7 EntityId (timestamp-sortable).
pub fn new_entity_id() -> EntityId {
    Uuid::now_v7()
}
