//! Nestmatch API - Couples Service Layer
//!
//! The household mutual-interest aggregation layer: resolves users to
//! households, computes mutual likes, activity timelines, and engagement
//! stats over the interaction store, and serves them through read-through
//! caches with household-scoped invalidation.
//!
//! The public surface is [`CouplesService`] - plain async methods consumed
//! directly by API routes. Nothing here speaks a network protocol.

pub mod config;
pub mod couples;
pub mod db;
pub mod services;

pub use config::{CouplesConfig, DbConfig};
pub use couples::{CouplesService, DEFAULT_ACTIVITY_LIMIT};
pub use db::PgGateway;
