//! Filter/sort modes offered to the user after a search.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A derived view over an aggregated result set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterMode {
    /// Natural aggregation order, unchanged
    #[default]
    #[serde(rename = "all")]
    All,
    /// Ascending by price; unknown prices last
    #[serde(rename = "cheapest")]
    Cheapest,
    /// Descending by price; unknown prices first
    #[serde(rename = "expensive")]
    Expensive,
    /// The three cheapest records
    #[serde(rename = "top3_cheap", alias = "top3")]
    Top3Cheap,
    /// The five cheapest records
    #[serde(rename = "top5_cheap", alias = "top5")]
    Top5Cheap,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown filter mode: {0}")]
pub struct UnknownFilterMode(pub String);

impl FilterMode {
    pub const ALL: [FilterMode; 5] = [
        Self::All,
        Self::Cheapest,
        Self::Expensive,
        Self::Top3Cheap,
        Self::Top5Cheap,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Cheapest => "cheapest",
            Self::Expensive => "expensive",
            Self::Top3Cheap => "top3_cheap",
            Self::Top5Cheap => "top5_cheap",
        }
    }

    /// Title shown above a filtered listing.
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All Results",
            Self::Cheapest => "Cheapest First",
            Self::Expensive => "Most Expensive",
            Self::Top3Cheap => "Top 3 Deals",
            Self::Top5Cheap => "Top 5 Deals",
        }
    }

    /// Maximum number of records in this view, if truncated.
    pub fn limit(self) -> Option<usize> {
        match self {
            Self::Top3Cheap => Some(3),
            Self::Top5Cheap => Some(5),
            _ => None,
        }
    }

    /// Parse a mode name, falling back to [`FilterMode::All`] for anything unrecognized.
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl FromStr for FilterMode {
    type Err = UnknownFilterMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "cheapest" => Ok(Self::Cheapest),
            "expensive" => Ok(Self::Expensive),
            "top3_cheap" | "top3" => Ok(Self::Top3Cheap),
            "top5_cheap" | "top5" => Ok(Self::Top5Cheap),
            other => Err(UnknownFilterMode(other.to_string())),
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
