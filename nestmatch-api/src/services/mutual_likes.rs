//! Mutual-Likes Aggregator
//!
//! Computes, per household, the set of properties liked by two or more
//! distinct members. Fast path: the `get_household_mutual_likes` stored
//! procedure. On procedure failure the same aggregation is recomputed
//! client-side from the raw like rows; both paths produce the same set for
//! the same underlying interactions, sorted by property id so results are
//! deterministic.

use std::collections::HashMap;

use nestmatch_core::{CouplesResult, HouseholdId, LikeRow, MutualLike, PropertyId, Timestamp, UserId};
use nestmatch_storage::{parse_mutual_like_rows, CoupleCacheStore, CouplesGateway};

/// Fetch (or recompute) the mutual-like set for a household.
///
/// `use_cache` is false in test/diagnostic mode; the fallback result is
/// cached under the same key as the fast path, so after normal TTL expiry
/// or invalidation the procedure is retried.
pub async fn mutual_likes_for_household(
    gateway: &dyn CouplesGateway,
    caches: &CoupleCacheStore,
    household_id: HouseholdId,
    use_cache: bool,
) -> CouplesResult<Vec<MutualLike>> {
    if use_cache {
        if let Some(hit) = caches.mutual_likes.get(&household_id) {
            tracing::debug!(%household_id, "mutual likes cache hit");
            return Ok(hit);
        }
    }

    let likes = match gateway.mutual_likes_rollup(household_id).await {
        Ok(rollup) => {
            let mut likes = parse_mutual_like_rows(&rollup);
            likes.sort_by_key(|ml| ml.property_id);
            likes
        }
        Err(err) => {
            tracing::warn!(
                %household_id,
                %err,
                "mutual-likes procedure failed, recomputing client-side"
            );
            let rows = gateway.like_interactions(household_id).await?;
            aggregate_like_rows(&rows)
        }
    };

    if use_cache {
        caches.mutual_likes.put(household_id, likes.clone());
    }
    Ok(likes)
}

/// Client-side aggregation over raw like rows: group by property, keep
/// groups with at least two distinct likers. Duplicate rows from one user
/// never count toward the threshold. Output is sorted by property id.
pub fn aggregate_like_rows(rows: &[LikeRow]) -> Vec<MutualLike> {
    struct Group {
        user_ids: Vec<UserId>,
        first: Timestamp,
        last: Timestamp,
    }

    let mut groups: HashMap<PropertyId, Group> = HashMap::new();
    for row in rows {
        let group = groups.entry(row.property_id).or_insert_with(|| Group {
            user_ids: Vec::new(),
            first: row.created_at,
            last: row.created_at,
        });
        if !group.user_ids.contains(&row.user_id) {
            group.user_ids.push(row.user_id);
        }
        group.first = group.first.min(row.created_at);
        group.last = group.last.max(row.created_at);
    }

    let mut likes: Vec<MutualLike> = groups
        .into_iter()
        .filter(|(_, group)| group.user_ids.len() >= 2)
        .map(|(property_id, group)| MutualLike {
            property_id,
            liked_by_count: group.user_ids.len(),
            first_liked_at: group.first,
            last_liked_at: group.last,
            user_ids: group.user_ids,
        })
        .collect();
    likes.sort_by_key(|ml| ml.property_id);
    likes
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use nestmatch_core::new_entity_id;
    use nestmatch_storage::{CoupleCacheStore, MockGateway};
    use std::collections::HashSet;

    fn like(property_id: PropertyId, user_id: UserId, at: Timestamp) -> LikeRow {
        LikeRow {
            property_id,
            user_id,
            created_at: at,
        }
    }

    #[test]
    fn test_aggregate_requires_two_distinct_users() {
        let p1 = new_entity_id();
        let a = new_entity_id();
        let t = Utc::now();

        // Two rows, one user: not mutual.
        let likes = aggregate_like_rows(&[like(p1, a, t), like(p1, a, t + Duration::hours(1))]);
        assert!(likes.is_empty());
    }

    #[test]
    fn test_aggregate_timestamps_span_the_group() {
        let p1 = new_entity_id();
        let (a, b, c) = (new_entity_id(), new_entity_id(), new_entity_id());
        let t0 = Utc::now();
        let rows = [
            like(p1, b, t0 + Duration::hours(2)),
            like(p1, a, t0),
            like(p1, c, t0 + Duration::hours(5)),
        ];

        let likes = aggregate_like_rows(&rows);
        assert_eq!(likes.len(), 1);
        assert_eq!(likes[0].liked_by_count, 3);
        assert_eq!(likes[0].first_liked_at, t0);
        assert_eq!(likes[0].last_liked_at, t0 + Duration::hours(5));
    }

    #[test]
    fn test_aggregate_output_sorted_by_property() {
        let (a, b) = (new_entity_id(), new_entity_id());
        let t = Utc::now();
        let mut properties = vec![new_entity_id(), new_entity_id(), new_entity_id()];
        let rows: Vec<LikeRow> = properties
            .iter()
            .flat_map(|&p| [like(p, a, t), like(p, b, t)])
            .collect();

        let likes = aggregate_like_rows(&rows);
        properties.sort();
        let got: Vec<PropertyId> = likes.iter().map(|ml| ml.property_id).collect();
        assert_eq!(got, properties);
    }

    #[tokio::test]
    async fn test_fallback_equivalent_to_procedure_path() {
        let gateway = MockGateway::new();
        let household = new_entity_id();
        let (a, b) = (new_entity_id(), new_entity_id());
        let p1 = new_entity_id();
        gateway.add_member(household, a, "A");
        gateway.add_member(household, b, "B");
        let t1 = Utc::now() - Duration::hours(2);
        let t2 = Utc::now();
        gateway.record_interaction(a, p1, nestmatch_core::InteractionType::Like, t1);
        gateway.record_interaction(b, p1, nestmatch_core::InteractionType::Like, t2);

        let caches = CoupleCacheStore::with_defaults();
        let fast = mutual_likes_for_household(&gateway, &caches, household, false)
            .await
            .unwrap();

        gateway.fail_mutual_rpc(true);
        let fallback = mutual_likes_for_household(&gateway, &caches, household, false)
            .await
            .unwrap();

        assert_eq!(fast.len(), 1);
        assert_eq!(fallback.len(), 1);
        assert_eq!(fast[0].property_id, fallback[0].property_id);
        assert_eq!(fast[0].liked_by_count, 2);
        assert_eq!(fallback[0].liked_by_count, 2);
        assert_eq!(fast[0].first_liked_at, t1);
        assert_eq!(fallback[0].first_liked_at, t1);
        assert_eq!(fast[0].last_liked_at, t2);
        assert_eq!(fallback[0].last_liked_at, t2);

        let fast_users: HashSet<UserId> = fast[0].user_ids.iter().copied().collect();
        let fallback_users: HashSet<UserId> = fallback[0].user_ids.iter().copied().collect();
        assert_eq!(fast_users, [a, b].into_iter().collect());
        assert_eq!(fast_users, fallback_users);
    }

    #[tokio::test]
    async fn test_fallback_failure_propagates() {
        let gateway = MockGateway::new();
        let household = new_entity_id();
        gateway.fail_mutual_rpc(true);
        gateway.fail_row_access(true);

        let caches = CoupleCacheStore::with_defaults();
        let result = mutual_likes_for_household(&gateway, &caches, household, false).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_cache_disabled_mode_always_hits_gateway() {
        let gateway = MockGateway::new();
        let household = new_entity_id();
        let (a, b) = (new_entity_id(), new_entity_id());
        let p1 = new_entity_id();
        gateway.add_member(household, a, "A");
        gateway.add_member(household, b, "B");
        gateway.record_like(a, p1);
        gateway.record_like(b, p1);

        let caches = CoupleCacheStore::with_defaults();
        for _ in 0..3 {
            mutual_likes_for_household(&gateway, &caches, household, false)
                .await
                .unwrap();
        }
        assert_eq!(gateway.calls.rpc_calls(), 3);
        assert!(caches.mutual_likes.is_empty());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        /// Rows drawn from small id pools so collisions (same property,
        /// same user) actually happen.
        fn like_rows() -> impl Strategy<Value = Vec<LikeRow>> {
            let pool: Vec<PropertyId> = (0..4).map(|_| new_entity_id()).collect();
            let users: Vec<UserId> = (0..4).map(|_| new_entity_id()).collect();
            prop::collection::vec(
                (0usize..4, 0usize..4, 0i64..10_000).prop_map(move |(p, u, secs)| LikeRow {
                    property_id: pool[p],
                    user_id: users[u],
                    created_at: Utc::now() + Duration::seconds(secs),
                }),
                0..40,
            )
        }

        proptest! {
            /// liked_by_count always equals the distinct user set size and
            /// is always >= 2.
            #[test]
            fn prop_count_matches_user_ids(rows in like_rows()) {
                for ml in aggregate_like_rows(&rows) {
                    let distinct: HashSet<UserId> = ml.user_ids.iter().copied().collect();
                    prop_assert_eq!(distinct.len(), ml.user_ids.len());
                    prop_assert_eq!(ml.liked_by_count, ml.user_ids.len());
                    prop_assert!(ml.liked_by_count >= 2);
                }
            }

            /// Timestamps are bounded by the group's underlying rows.
            #[test]
            fn prop_timestamps_bound_by_rows(rows in like_rows()) {
                for ml in aggregate_like_rows(&rows) {
                    prop_assert!(ml.first_liked_at <= ml.last_liked_at);
                    let group: Vec<&LikeRow> = rows
                        .iter()
                        .filter(|r| r.property_id == ml.property_id)
                        .collect();
                    let min = group.iter().map(|r| r.created_at).min().unwrap();
                    let max = group.iter().map(|r| r.created_at).max().unwrap();
                    prop_assert_eq!(ml.first_liked_at, min);
                    prop_assert_eq!(ml.last_liked_at, max);
                }
            }

            /// Every property with >= 2 distinct likers appears, and no
            /// other property does.
            #[test]
            fn prop_threshold_is_exact(rows in like_rows()) {
                let likes = aggregate_like_rows(&rows);
                let mut expected: HashMap<PropertyId, HashSet<UserId>> = HashMap::new();
                for row in &rows {
                    expected.entry(row.property_id).or_default().insert(row.user_id);
                }
                let got: HashSet<PropertyId> = likes.iter().map(|ml| ml.property_id).collect();
                let want: HashSet<PropertyId> = expected
                    .iter()
                    .filter(|(_, users)| users.len() >= 2)
                    .map(|(p, _)| *p)
                    .collect();
                prop_assert_eq!(got, want);
            }
        }
    }
}
