//! Shared enums for Nestmatch entities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A user's recorded gesture against a property listing.
///
/// These mirror the `interaction_type` column of
/// `user_property_interactions` and are persisted as lowercase strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionType {
    /// Swiped right - the user wants this property.
    Like,
    /// Swiped left - the user rejected this property.
    Dislike,
    /// Deferred without a verdict.
    Skip,
    /// Opened the listing detail view.
    View,
}

impl InteractionType {
    /// The wire string stored in the interactions table.
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionType::Like => "like",
            InteractionType::Dislike => "dislike",
            InteractionType::Skip => "skip",
            InteractionType::View => "view",
        }
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionType {
    type Err = UnknownInteractionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(InteractionType::Like),
            "dislike" => Ok(InteractionType::Dislike),
            "skip" => Ok(InteractionType::Skip),
            "view" => Ok(InteractionType::View),
            other => Err(UnknownInteractionType(other.to_string())),
        }
    }
}

/// Error returned when parsing an unrecognized interaction type string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownInteractionType(pub String);

impl fmt::Display for UnknownInteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown interaction type: {}", self.0)
    }
}

impl std::error::Error for UnknownInteractionType {}
