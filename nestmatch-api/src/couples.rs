//! Couples Service Facade
//!
//! The public surface of the couples layer: plain async methods consumed
//! by API routes. Contract: no method here ever returns an error - every
//! failure collapses to an empty/null result at this boundary, and only at
//! this boundary. Interior code keeps the three-way distinction between
//! "no household", "gateway failure", and "legitimately empty" so the
//! collapse stays a deliberate decision rather than a swallowed exception.

use std::sync::Arc;

use nestmatch_core::{
    CouplesResult, CouplesStats, HouseholdActivity, HouseholdId, InteractionType, MutualLike,
    PotentialMutual, PropertyId, UserId,
};
use nestmatch_storage::{CoupleCacheStore, CouplesGateway};

use crate::config::CouplesConfig;
use crate::services::{
    activity_for_household, check_partner_likes, mutual_likes_for_household, resolve_household,
    stats_for_household,
};

/// Default page size for the activity timeline.
pub const DEFAULT_ACTIVITY_LIMIT: i64 = 20;

/// The household mutual-interest service.
///
/// Holds the gateway and the shared cache store; construct one per process
/// and share it (`Clone` is cheap via the inner `Arc`s). Tests construct a
/// fresh instance per case - there is no process-wide singleton.
#[derive(Clone)]
pub struct CouplesService {
    gateway: Arc<dyn CouplesGateway>,
    caches: Arc<CoupleCacheStore>,
    cache_enabled: bool,
}

impl CouplesService {
    /// Create a service over a gateway with the given configuration.
    pub fn new(gateway: Arc<dyn CouplesGateway>, config: CouplesConfig) -> Self {
        Self {
            gateway,
            caches: Arc::new(CoupleCacheStore::new(&config.cache)),
            cache_enabled: config.cache_enabled,
        }
    }

    /// Create a service with default configuration.
    pub fn with_defaults(gateway: Arc<dyn CouplesGateway>) -> Self {
        Self::new(gateway, CouplesConfig::default())
    }

    /// The shared cache store, for observability.
    pub fn caches(&self) -> &CoupleCacheStore {
        &self.caches
    }

    // ========================================================================
    // PUBLIC READ OPERATIONS
    // ========================================================================

    /// Properties liked by two or more distinct members of the user's
    /// household. Empty when the user has no household or on failure.
    pub async fn get_mutual_likes(&self, user_id: UserId) -> Vec<MutualLike> {
        let outcome: CouplesResult<Option<Vec<MutualLike>>> = async {
            let Some(household_id) = resolve_household(self.gateway.as_ref(), user_id).await?
            else {
                return Ok(None);
            };
            mutual_likes_for_household(
                self.gateway.as_ref(),
                &self.caches,
                household_id,
                self.cache_enabled,
            )
            .await
            .map(Some)
        }
        .await;
        collapse("get_mutual_likes", outcome).unwrap_or_default()
    }

    /// One page of the household activity timeline, newest first. Empty
    /// when the user has no household or on failure.
    pub async fn get_household_activity(
        &self,
        user_id: UserId,
        limit: i64,
        offset: i64,
    ) -> Vec<HouseholdActivity> {
        let outcome: CouplesResult<Option<Vec<HouseholdActivity>>> = async {
            let Some(household_id) = resolve_household(self.gateway.as_ref(), user_id).await?
            else {
                return Ok(None);
            };
            activity_for_household(
                self.gateway.as_ref(),
                &self.caches,
                household_id,
                limit,
                offset,
                self.cache_enabled,
            )
            .await
            .map(Some)
        }
        .await;
        collapse("get_household_activity", outcome).unwrap_or_default()
    }

    /// Engagement stats rollup for the user's household. `None` when the
    /// user has no household or on failure.
    pub async fn get_household_stats(&self, user_id: UserId) -> Option<CouplesStats> {
        let outcome: CouplesResult<Option<CouplesStats>> = async {
            let Some(household_id) = resolve_household(self.gateway.as_ref(), user_id).await?
            else {
                return Ok(None);
            };
            stats_for_household(
                self.gateway.as_ref(),
                &self.caches,
                household_id,
                self.cache_enabled,
            )
            .await
            .map(Some)
        }
        .await;
        collapse("get_household_stats", outcome)
    }

    /// Would (or did) a like on this property by this user create a mutual
    /// like? `None` when it would not, when the user has no household, or
    /// on failure.
    pub async fn check_potential_mutual_like(
        &self,
        user_id: UserId,
        property_id: PropertyId,
    ) -> Option<PotentialMutual> {
        let outcome: CouplesResult<Option<PotentialMutual>> = async {
            let Some(household_id) = resolve_household(self.gateway.as_ref(), user_id).await?
            else {
                return Ok(None);
            };
            check_partner_likes(self.gateway.as_ref(), household_id, property_id, user_id).await
        }
        .await;
        collapse("check_potential_mutual_like", outcome)
    }

    // ========================================================================
    // WRITE-SIDE HOOKS
    // ========================================================================

    /// React to an interaction write: invalidate every cached view for the
    /// household, and for likes report whether mutuality was created and
    /// with whom. No-op (and `None`) when the user has no household.
    pub async fn notify_interaction(
        &self,
        user_id: UserId,
        property_id: PropertyId,
        interaction_type: InteractionType,
    ) -> Option<PotentialMutual> {
        let outcome: CouplesResult<Option<Option<PotentialMutual>>> = async {
            let Some(household_id) = resolve_household(self.gateway.as_ref(), user_id).await?
            else {
                return Ok(None);
            };

            self.caches.invalidate_household(household_id);

            if interaction_type != InteractionType::Like {
                return Ok(Some(None));
            }
            let hit =
                check_partner_likes(self.gateway.as_ref(), household_id, property_id, user_id)
                    .await?;
            if let Some(ref mutual) = hit {
                tracing::info!(
                    %user_id,
                    %property_id,
                    partner = %mutual.partner_user_id,
                    "interaction created a mutual like"
                );
            }
            Ok(Some(hit))
        }
        .await;
        collapse("notify_interaction", outcome).flatten()
    }

    /// Drop every cached view for a household. Safe to call when nothing
    /// is cached.
    pub fn clear_household_cache(&self, household_id: HouseholdId) {
        self.caches.invalidate_household(household_id);
    }
}

/// Collapse an internal tagged outcome to the public surface, logging
/// which of the three cases occurred. `Ok(None)` is a resolution miss,
/// `Err` is a degraded failure; both look identical to the caller.
fn collapse<T>(operation: &'static str, outcome: CouplesResult<Option<T>>) -> Option<T> {
    match outcome {
        Ok(Some(value)) => Some(value),
        Ok(None) => {
            tracing::debug!(operation, "no household, returning empty result");
            None
        }
        Err(err) => {
            tracing::warn!(operation, %err, "operation degraded to empty result");
            None
        }
    }
}
