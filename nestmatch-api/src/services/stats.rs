//! Household Statistics Aggregator
//!
//! Point-in-time rollup per household: mutual-like cardinality, raw like
//! count, a consecutive-day activity streak, and the most recent mutual
//! like timestamp.

use chrono::{Days, NaiveDate, Utc};
use std::collections::BTreeSet;

use nestmatch_core::{CouplesResult, CouplesStats, HouseholdId, Timestamp};
use nestmatch_storage::{CoupleCacheStore, CouplesGateway};

use super::mutual_likes::mutual_likes_for_household;

/// The streak looks at most this many recent interactions.
pub const RECENT_INTERACTIONS_LIMIT: i64 = 30;

/// Compute (or fetch) the stats rollup for a household.
pub async fn stats_for_household(
    gateway: &dyn CouplesGateway,
    caches: &CoupleCacheStore,
    household_id: HouseholdId,
    use_cache: bool,
) -> CouplesResult<CouplesStats> {
    if use_cache {
        if let Some(hit) = caches.stats.get(&household_id) {
            tracing::debug!(%household_id, "stats cache hit");
            return Ok(hit);
        }
    }

    // A failed mutual-set computation degrades to empty, same as the
    // aggregator's own contract; the count and streak queries stay hard
    // requirements.
    let mutual_likes = match mutual_likes_for_household(gateway, caches, household_id, use_cache)
        .await
    {
        Ok(likes) => likes,
        Err(err) => {
            tracing::warn!(%household_id, %err, "mutual set unavailable for stats");
            Vec::new()
        }
    };
    let total_household_likes = gateway.count_household_likes(household_id).await?;
    let recent = gateway
        .recent_interaction_times(household_id, RECENT_INTERACTIONS_LIMIT)
        .await?;

    let stats = CouplesStats {
        total_mutual_likes: mutual_likes.len(),
        total_household_likes,
        activity_streak_days: compute_streak(&recent, Utc::now().date_naive()),
        last_mutual_like_at: mutual_likes.iter().map(|ml| ml.last_liked_at).max(),
    };

    if use_cache {
        caches.stats.put(household_id, stats.clone());
    }
    Ok(stats)
}

/// Length of the run of consecutive UTC calendar days with activity,
/// anchored at `today` (or yesterday, when today has no activity yet).
/// Zero when the most recent activity is older than yesterday.
pub fn compute_streak(timestamps: &[Timestamp], today: NaiveDate) -> u32 {
    let days: BTreeSet<NaiveDate> = timestamps.iter().map(|t| t.date_naive()).collect();
    let Some(&latest) = days.iter().next_back() else {
        return 0;
    };

    let Some(yesterday) = today.checked_sub_days(Days::new(1)) else {
        return 0;
    };
    if latest != today && latest != yesterday {
        return 0;
    }

    let mut streak = 0;
    let mut day = if days.contains(&today) { today } else { yesterday };
    while days.contains(&day) {
        streak += 1;
        match day.checked_sub_days(Days::new(1)) {
            Some(previous) => day = previous,
            None => break,
        }
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use nestmatch_core::{new_entity_id, InteractionType};
    use nestmatch_storage::MockGateway;

    fn at_noon(date: NaiveDate) -> Timestamp {
        Utc.from_utc_datetime(&date.and_hms_opt(12, 0, 0).expect("valid time"))
    }

    #[test]
    fn test_streak_zero_without_activity() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();
        assert_eq!(compute_streak(&[], today), 0);
    }

    #[test]
    fn test_streak_zero_when_latest_is_stale() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();
        // Activity only two days ago: gap from today, streak broken.
        let stale = at_noon(today - Duration::days(2));
        assert_eq!(compute_streak(&[stale], today), 0);
    }

    #[test]
    fn test_streak_counts_consecutive_days_until_gap() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();
        let stamps: Vec<Timestamp> = [0, 1, 2, 5]
            .into_iter()
            .map(|back| at_noon(today - Duration::days(back)))
            .collect();
        // Today, yesterday, the day before, then a gap.
        assert_eq!(compute_streak(&stamps, today), 3);
    }

    #[test]
    fn test_streak_anchors_at_yesterday_when_today_quiet() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();
        let stamps: Vec<Timestamp> = [1, 2]
            .into_iter()
            .map(|back| at_noon(today - Duration::days(back)))
            .collect();
        assert_eq!(compute_streak(&stamps, today), 2);
    }

    #[test]
    fn test_streak_dedups_same_day_activity() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();
        let morning = at_noon(today) - Duration::hours(3);
        let evening = at_noon(today) + Duration::hours(3);
        assert_eq!(compute_streak(&[morning, evening], today), 1);
    }

    #[tokio::test]
    async fn test_stats_rollup_counts_raw_likes() {
        let gateway = MockGateway::new();
        let household = new_entity_id();
        let (a, b, c) = (new_entity_id(), new_entity_id(), new_entity_id());
        gateway.add_member(household, a, "A");
        gateway.add_member(household, b, "B");
        gateway.add_member(household, c, "C");

        let p1 = new_entity_id();
        let p2 = new_entity_id();
        let t0 = Utc::now() - Duration::hours(4);
        gateway.record_interaction(a, p1, InteractionType::Like, t0);
        gateway.record_interaction(b, p1, InteractionType::Like, t0 + Duration::hours(1));
        gateway.record_interaction(a, p2, InteractionType::Like, t0 + Duration::hours(2));
        // C likes nothing and views don't count as likes.
        gateway.record_interaction(c, p2, InteractionType::View, t0 + Duration::hours(3));

        let caches = CoupleCacheStore::with_defaults();
        let stats = stats_for_household(&gateway, &caches, household, true)
            .await
            .unwrap();

        assert_eq!(stats.total_mutual_likes, 1);
        assert_eq!(stats.total_household_likes, 3);
        assert_eq!(stats.last_mutual_like_at, Some(t0 + Duration::hours(1)));
        assert!(stats.activity_streak_days >= 1);
    }

    #[tokio::test]
    async fn test_stats_without_mutual_likes_has_null_timestamp() {
        let gateway = MockGateway::new();
        let household = new_entity_id();
        let a = new_entity_id();
        gateway.add_member(household, a, "A");
        gateway.record_like(a, new_entity_id());

        let caches = CoupleCacheStore::with_defaults();
        let stats = stats_for_household(&gateway, &caches, household, true)
            .await
            .unwrap();
        assert_eq!(stats.total_mutual_likes, 0);
        assert_eq!(stats.last_mutual_like_at, None);
    }
}
