//! Household Resolver
//!
//! Maps a user identity to its household, or none. Deliberately uncached:
//! membership changes must be visible immediately, and the lookup is a
//! single indexed read. Every couples operation calls this first and
//! short-circuits on `None` - a user without a household is not an error.

use nestmatch_core::{GatewayError, HouseholdId, UserId};
use nestmatch_storage::CouplesGateway;

/// Resolve the household a user currently belongs to.
pub async fn resolve_household(
    gateway: &dyn CouplesGateway,
    user_id: UserId,
) -> Result<Option<HouseholdId>, GatewayError> {
    let household = gateway.household_for_user(user_id).await?;
    if household.is_none() {
        tracing::debug!(%user_id, "user has no household");
    }
    Ok(household)
}
