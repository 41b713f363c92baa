//! Pre-write failure policy for the upgrade batch.
//!
//! Production services use [`NeverFail`], which compiles to nothing. Tests
//! supply their own implementation to abort a batch at a chosen member and
//! observe the rollback.

use crate::model::member::{Member, MemberId};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure raised by a [`FailurePolicy`] for one member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectedFailure {
    pub member_id: MemberId,
}

impl Display for InjectedFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "injected failure for member `{}`", self.member_id)
    }
}

impl Error for InjectedFailure {}

/// Checked right before a promoted member is persisted.
pub trait FailurePolicy {
    fn before_write(&self, member: &Member) -> Result<(), InjectedFailure>;
}

/// Policy that never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverFail;

impl FailurePolicy for NeverFail {
    #[inline]
    fn before_write(&self, _member: &Member) -> Result<(), InjectedFailure> {
        Ok(())
    }
}
