//! Activity Timeline Builder
//!
//! Produces a paginated, denormalized feed of household interactions with
//! a per-item mutuality flag. The enhanced-activity procedure and the
//! mutual-id-set computation are issued concurrently and joined before the
//! transform.

use std::collections::HashSet;

use serde_json::Value as JsonValue;

use nestmatch_core::{CouplesResult, HouseholdActivity, HouseholdId, PropertyId};
use nestmatch_storage::{parse_activity_rows, ActivityPageKey, CoupleCacheStore, CouplesGateway};

use super::mutual_likes::mutual_likes_for_household;

/// Fetch one page of the household activity timeline.
///
/// A procedure error degrades to an empty row set, and a failed mutual-set
/// computation degrades to "nothing is mutual" - the page itself is still
/// served. Pages are cached under their exact `(household, limit, offset)`
/// key.
pub async fn activity_for_household(
    gateway: &dyn CouplesGateway,
    caches: &CoupleCacheStore,
    household_id: HouseholdId,
    limit: i64,
    offset: i64,
    use_cache: bool,
) -> CouplesResult<Vec<HouseholdActivity>> {
    let key = ActivityPageKey {
        household_id,
        limit,
        offset,
    };
    if use_cache {
        if let Some(hit) = caches.activity.get(&key) {
            tracing::debug!(%household_id, limit, offset, "activity page cache hit");
            return Ok(hit);
        }
    }

    let (rows, mutual) = tokio::join!(
        gateway.enhanced_activity(household_id, limit, offset),
        mutual_likes_for_household(gateway, caches, household_id, use_cache),
    );

    let rows = match rows {
        Ok(rows) => rows,
        Err(err) => {
            tracing::warn!(%household_id, %err, "activity procedure failed, serving empty page");
            JsonValue::Array(Vec::new())
        }
    };
    let mutual_ids: HashSet<PropertyId> = match mutual {
        Ok(likes) => likes.iter().map(|ml| ml.property_id).collect(),
        Err(err) => {
            tracing::warn!(%household_id, %err, "mutual set unavailable for activity page");
            HashSet::new()
        }
    };

    let page = parse_activity_rows(&rows, &mutual_ids);
    if use_cache {
        caches.activity.put(key, page.clone());
    }
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use nestmatch_core::{new_entity_id, InteractionType};
    use nestmatch_storage::{MockGateway, MockProperty};

    fn seeded_household() -> (MockGateway, HouseholdId, uuid::Uuid, uuid::Uuid) {
        let gateway = MockGateway::new();
        let household = new_entity_id();
        let (a, b) = (new_entity_id(), new_entity_id());
        gateway.add_member(household, a, "Alex");
        gateway.add_member(household, b, "Blair");
        (gateway, household, a, b)
    }

    #[tokio::test]
    async fn test_page_is_denormalized_and_flagged() {
        let (gateway, household, a, b) = seeded_household();
        let shared = new_entity_id();
        let solo = new_entity_id();
        gateway.add_property(
            shared,
            MockProperty {
                address: "12 Elm St".to_string(),
                price: 450_000,
                bedrooms: 3,
                bathrooms: 2,
                images: vec!["front.jpg".to_string()],
            },
        );

        let t0 = Utc::now() - Duration::hours(3);
        gateway.record_interaction(a, shared, InteractionType::Like, t0);
        gateway.record_interaction(b, shared, InteractionType::Like, t0 + Duration::hours(1));
        gateway.record_interaction(a, solo, InteractionType::Like, t0 + Duration::hours(2));

        let caches = CoupleCacheStore::with_defaults();
        let page = activity_for_household(&gateway, &caches, household, 20, 0, true)
            .await
            .unwrap();

        assert_eq!(page.len(), 3);
        // Newest first: the solo like on an unknown property.
        assert_eq!(page[0].property_id, solo);
        assert!(!page[0].is_mutual);
        assert_eq!(page[0].property_address, "Unknown");
        assert_eq!(page[0].user_display_name, "Alex");

        assert!(page[1].is_mutual);
        assert!(page[2].is_mutual);
        assert_eq!(page[1].property_address, "12 Elm St");
        assert_eq!(page[1].property_price, 450_000);
    }

    #[tokio::test]
    async fn test_limit_and_offset_page_the_feed() {
        let (gateway, household, a, _) = seeded_household();
        let t0 = Utc::now() - Duration::hours(10);
        for hour in 0..5 {
            gateway.record_interaction(
                a,
                new_entity_id(),
                InteractionType::View,
                t0 + Duration::hours(hour),
            );
        }

        let caches = CoupleCacheStore::with_defaults();
        let first = activity_for_household(&gateway, &caches, household, 2, 0, true)
            .await
            .unwrap();
        let second = activity_for_household(&gateway, &caches, household, 2, 2, true)
            .await
            .unwrap();
        let tail = activity_for_household(&gateway, &caches, household, 2, 4, true)
            .await
            .unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 2);
        assert_eq!(tail.len(), 1);
        assert!(first[0].created_at > first[1].created_at);
        assert!(first[1].created_at > second[0].created_at);
    }

    #[tokio::test]
    async fn test_procedure_failure_serves_empty_page() {
        let (gateway, household, a, _) = seeded_household();
        gateway.record_like(a, new_entity_id());
        gateway.fail_activity_rpc(true);

        let caches = CoupleCacheStore::with_defaults();
        let page = activity_for_household(&gateway, &caches, household, 20, 0, true)
            .await
            .unwrap();
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn test_second_read_is_served_from_cache() {
        let (gateway, household, a, _) = seeded_household();
        gateway.record_like(a, new_entity_id());

        let caches = CoupleCacheStore::with_defaults();
        let first = activity_for_household(&gateway, &caches, household, 20, 0, true)
            .await
            .unwrap();
        let before = gateway.calls.enhanced_activity.load(std::sync::atomic::Ordering::Relaxed);
        let second = activity_for_household(&gateway, &caches, household, 20, 0, true)
            .await
            .unwrap();
        let after = gateway.calls.enhanced_activity.load(std::sync::atomic::Ordering::Relaxed);

        assert_eq!(first, second);
        assert_eq!(before, after);
    }
}
