//! Service Layer
//!
//! One module per couples component: household resolution, mutual-likes
//! aggregation, the activity timeline builder, the stats aggregator, and
//! the interaction notifier. The functions here return tagged `Result`s;
//! collapsing failures to the public empty/null contract happens in
//! [`crate::couples::CouplesService`].

mod activity;
mod household;
mod mutual_likes;
mod notifier;
mod stats;

pub use activity::activity_for_household;
pub use household::resolve_household;
pub use mutual_likes::{aggregate_like_rows, mutual_likes_for_household};
pub use notifier::check_partner_likes;
pub use stats::{compute_streak, stats_for_household, RECENT_INTERACTIONS_LIMIT};
