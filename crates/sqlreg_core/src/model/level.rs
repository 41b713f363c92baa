//! Member level progression.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Ordered member level. `Gold` is terminal.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    #[default]
    Basic,
    Silver,
    Gold,
}

impl Level {
    /// All levels in ascending order.
    pub const ALL: [Level; 3] = [Level::Basic, Level::Silver, Level::Gold];

    /// Returns the immediate successor, or `None` for the terminal level.
    pub fn next(self) -> Option<Level> {
        match self {
            Self::Basic => Some(Self::Silver),
            Self::Silver => Some(Self::Gold),
            Self::Gold => None,
        }
    }

    /// Storage ordinal used by the `members.level` column.
    pub fn to_db(self) -> i64 {
        match self {
            Self::Basic => 1,
            Self::Silver => 2,
            Self::Gold => 3,
        }
    }

    pub fn from_db(value: i64) -> Option<Level> {
        Self::ALL.into_iter().find(|level| level.to_db() == value)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Silver => "silver",
            Self::Gold => "gold",
        }
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
