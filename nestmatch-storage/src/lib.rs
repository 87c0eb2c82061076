//! Nestmatch Storage - Cache Layer and Gateway Abstraction
//!
//! Defines the data-access abstraction for the couples layer and the
//! bounded TTL caches that sit in front of it. The PostgreSQL gateway
//! implementation lives in nestmatch-api; the in-memory mock lives here so
//! every crate in the workspace can test against it.

pub mod cache;
pub mod gateway;
pub mod mock;

pub use cache::{
    ActivityPageKey, CacheConfig, CacheStats, CoupleCacheStore, TtlLruCache,
};
pub use gateway::{
    parse_activity_rows, parse_mutual_like_rows, CouplesGateway, RawActivityRow,
    RawMutualLikeRow,
};
pub use mock::{MockCallCounts, MockGateway, MockProperty};
