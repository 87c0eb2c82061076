//! Interaction Notifier
//!
//! Invoked out-of-band after every interaction write. Invalidates the
//! household's cached views and, for likes, checks whether the interaction
//! creates a mutual like - the partner surfaced here is the hook for
//! downstream notification wiring.

use nestmatch_core::{CouplesResult, HouseholdId, PotentialMutual, PropertyId, UserId};
use nestmatch_storage::CouplesGateway;

/// Check whether a like on `property_id` by `user_id` pairs up with an
/// existing like from another household member. Returns the first such
/// partner, with the distinct liker count including the acting user.
pub async fn check_partner_likes(
    gateway: &dyn CouplesGateway,
    household_id: HouseholdId,
    property_id: PropertyId,
    user_id: UserId,
) -> CouplesResult<Option<PotentialMutual>> {
    let partners = gateway
        .partner_likes_excluding(household_id, property_id, user_id)
        .await?;
    Ok(partners.first().map(|&partner_user_id| PotentialMutual {
        property_id,
        partner_user_id,
        liked_by_count: partners.len() + 1,
    }))
}
