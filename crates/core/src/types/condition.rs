//! Item condition grading for secondhand goods.

use serde::{Deserialize, Serialize};

/// Condition of a secondhand item.
///
/// This is a closed enumeration: listings store one of these five values and
/// nothing else. Raw records from the backend may carry anything (legacy
/// rows, manual edits), so the normalizer routes unknown values through
/// [`Condition::parse`] and falls back to [`Condition::Good`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    New,
    LikeNew,
    #[default]
    Good,
    Fair,
    Poor,
}

impl Condition {
    /// All valid conditions, in grading order from best to worst.
    pub const ALL: [Self; 5] = [Self::New, Self::LikeNew, Self::Good, Self::Fair, Self::Poor];

    /// Parse a raw condition string against the allow-list.
    ///
    /// Returns `None` for anything outside the closed set; the caller decides
    /// how to degrade (the normalizer coerces to `Good` with a warning).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "new" => Some(Self::New),
            "like_new" => Some(Self::LikeNew),
            "good" => Some(Self::Good),
            "fair" => Some(Self::Fair),
            "poor" => Some(Self::Poor),
            _ => None,
        }
    }

    /// The wire representation stored by the backend.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::LikeNew => "like_new",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
        }
    }

    /// Human-readable label for display.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::LikeNew => "Like new",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
        }
    }
}

impl core::fmt::Display for Condition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
