//! Error types for Nestmatch operations
//!
//! The public `CouplesService` surface never propagates these - every
//! failure is collapsed to an empty/null result at that boundary. The enums
//! here exist so the interior of the layer can tell "no household" from
//! "gateway failure" from "legitimately empty" instead of losing that
//! distinction to an uncaught exception.

use thiserror::Error;

/// Data-access gateway errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Query failed: {reason}")]
    Query { reason: String },

    #[error("Stored procedure {procedure} failed: {reason}")]
    Rpc { procedure: String, reason: String },

    #[error("Connection pool error: {reason}")]
    Pool { reason: String },
}

/// Errors internal to the couples layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CouplesError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Malformed row from gateway: {reason}")]
    Decode { reason: String },
}

impl CouplesError {
    /// Shorthand for a decode failure.
    pub fn decode(reason: impl Into<String>) -> Self {
        CouplesError::Decode {
            reason: reason.into(),
        }
    }
}

/// Result type alias used throughout the couples layer.
pub type CouplesResult<T> = Result<T, CouplesError>;
