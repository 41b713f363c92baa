//! Member domain model.
//!
//! # Responsibility
//! - Define the record evaluated by the level upgrade policy.
//! - Own the only code path that advances a member's level.
//!
//! # Invariants
//! - `level` is private: after construction it changes only via
//!   [`Member::upgrade_level`], one step at a time.
//! - `id` and `name` are non-blank; `email` has a `local@domain.tld` shape.

use crate::model::level::Level;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Stable member identifier.
pub type MemberId = String;

/// Member record subject to level upgrades.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub password: String,
    level: Level,
    /// Number of recorded logins; gates `basic -> silver`.
    pub login_count: u32,
    /// Number of received recommendations; gates `silver -> gold`.
    pub recommend_count: u32,
    /// Notification recipient.
    pub email: String,
}

/// Validation failures for [`Member`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberValidationError {
    EmptyId,
    EmptyName(MemberId),
    InvalidEmail { id: MemberId, email: String },
}

impl Display for MemberValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "member id cannot be blank"),
            Self::EmptyName(id) => write!(f, "member `{id}` has a blank name"),
            Self::InvalidEmail { id, email } => {
                write!(f, "member `{id}` has an invalid email `{email}`")
            }
        }
    }
}

impl Error for MemberValidationError {}

/// Raised when a member already at the terminal level is asked to upgrade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelCeilingReached {
    pub id: MemberId,
    pub level: Level,
}

impl Display for LevelCeilingReached {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "member `{}` is already at terminal level `{}`",
            self.id, self.level
        )
    }
}

impl Error for LevelCeilingReached {}

impl Member {
    /// Creates a member at [`Level::Basic`] with zeroed counters.
    pub fn new(
        id: impl Into<MemberId>,
        name: impl Into<String>,
        password: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            password: password.into(),
            level: Level::Basic,
            login_count: 0,
            recommend_count: 0,
            email: email.into(),
        }
    }

    /// Rebuilds a member whose level was already decided, when loading a
    /// stored row or seeding fixtures. There is no setter: once built, the
    /// level moves only through [`Member::upgrade_level`].
    pub fn restore(
        id: impl Into<MemberId>,
        name: impl Into<String>,
        password: impl Into<String>,
        email: impl Into<String>,
        level: Level,
    ) -> Self {
        Self {
            level,
            ..Self::new(id, name, password, email)
        }
    }

    pub fn with_counts(mut self, login_count: u32, recommend_count: u32) -> Self {
        self.login_count = login_count;
        self.recommend_count = recommend_count;
        self
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// Advances exactly one level and returns the new level.
    ///
    /// # Errors
    /// - [`LevelCeilingReached`] when the member is at the terminal level; the
    ///   member is left unchanged.
    pub fn upgrade_level(&mut self) -> Result<Level, LevelCeilingReached> {
        let next = self.level.next().ok_or_else(|| LevelCeilingReached {
            id: self.id.clone(),
            level: self.level,
        })?;
        self.level = next;
        Ok(next)
    }

    pub fn validate(&self) -> Result<(), MemberValidationError> {
        if self.id.trim().is_empty() {
            return Err(MemberValidationError::EmptyId);
        }
        if self.name.trim().is_empty() {
            return Err(MemberValidationError::EmptyName(self.id.clone()));
        }
        if !EMAIL_RE.is_match(self.email.trim()) {
            return Err(MemberValidationError::InvalidEmail {
                id: self.id.clone(),
                email: self.email.clone(),
            });
        }
        Ok(())
    }
}
