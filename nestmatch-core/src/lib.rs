//! Nestmatch Core - Entity Types
//!
//! Pure data structures with no behavior. All other crates depend on this.
//! This crate contains ONLY data types - no business logic and no I/O.

pub mod entities;
pub mod enums;
pub mod error;
pub mod identity;

pub use entities::{
    CouplesStats, HouseholdActivity, LikeRow, MutualLike, PotentialMutual,
};
pub use enums::{InteractionType, UnknownInteractionType};
pub use error::{CouplesError, CouplesResult, GatewayError};
pub use identity::{
    new_entity_id, EntityId, HouseholdId, InteractionId, PropertyId, Timestamp, UserId,
};
