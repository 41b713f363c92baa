//! Transactional member level upgrade batch.
//!
//! # Responsibility
//! - Evaluate the upgrade policy for every member in enumeration order.
//! - Promote eligible members by exactly one level, persist, and notify.
//! - Run the whole batch inside one [`TxScope`].
//!
//! # Invariants
//! - A batch either commits every promotion or leaves stored members
//!   untouched; the first error rolls back all earlier writes of the batch.
//! - Notifications are sent right after each write and are never recalled on
//!   rollback. Notification failures are logged and do not abort the batch.
//! - An eligible member without a successor level is a policy contract
//!   violation, never a silent skip.

use crate::db::{DbError, TxScope};
use crate::model::level::Level;
use crate::model::member::{Member, MemberId};
use crate::repo::member_repo::{MemberRepository, RepoError, SqliteMemberRepository};
use crate::service::failure::{FailurePolicy, InjectedFailure, NeverFail};
use crate::service::notifier::Notifier;
use crate::service::policy::UpgradePolicy;
use log::{error, info, warn};
use rusqlite::Connection;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use uuid::Uuid;

pub type UpgradeResult<T> = Result<T, UpgradeError>;

/// Batch failure. Any variant means the batch was rolled back.
#[derive(Debug)]
pub enum UpgradeError {
    Repo(RepoError),
    /// The policy marked a member eligible although its level has no successor.
    PolicyContractViolation { member_id: MemberId, level: Level },
    InjectedFailure(InjectedFailure),
}

impl Display for UpgradeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::PolicyContractViolation { member_id, level } => write!(
                f,
                "policy contract violation: member `{member_id}` is eligible at terminal level `{level}`"
            ),
            Self::InjectedFailure(err) => write!(f, "{err}"),
        }
    }
}

impl Error for UpgradeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::InjectedFailure(err) => Some(err),
            Self::PolicyContractViolation { .. } => None,
        }
    }
}

impl From<RepoError> for UpgradeError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<DbError> for UpgradeError {
    fn from(value: DbError) -> Self {
        Self::Repo(RepoError::Db(value))
    }
}

impl From<InjectedFailure> for UpgradeError {
    fn from(value: InjectedFailure) -> Self {
        Self::InjectedFailure(value)
    }
}

/// One committed promotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Promotion {
    pub member_id: MemberId,
    pub from: Level,
    pub to: Level,
    /// Whether the notifier accepted the message.
    pub notified: bool,
}

/// Result of one successful batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpgradeReport {
    pub run_id: Uuid,
    pub scanned: usize,
    pub promotions: Vec<Promotion>,
}

/// Level upgrade batch service.
pub struct UpgradeService<P, N, F = NeverFail> {
    policy: P,
    notifier: N,
    failure_policy: F,
}

impl<P: UpgradePolicy, N: Notifier> UpgradeService<P, N, NeverFail> {
    pub fn new(policy: P, notifier: N) -> Self {
        Self {
            policy,
            notifier,
            failure_policy: NeverFail,
        }
    }
}

impl<P: UpgradePolicy, N: Notifier, F: FailurePolicy> UpgradeService<P, N, F> {
    /// Replaces the pre-write failure policy.
    pub fn with_failure_policy<G: FailurePolicy>(
        self,
        failure_policy: G,
    ) -> UpgradeService<P, N, G> {
        UpgradeService {
            policy: self.policy,
            notifier: self.notifier,
            failure_policy,
        }
    }

    /// Runs one upgrade batch over every stored member in one transaction.
    ///
    /// # Errors
    /// - Any [`UpgradeError`]; the transaction has been rolled back and stored
    ///   members are exactly as before the call.
    ///
    /// # Side effects
    /// - Sends one notification per promoted member, even on later rollback.
    /// - Emits `upgrade_batch` and `member_promoted` logging events.
    pub fn run_upgrade_batch(&self, conn: &mut Connection) -> UpgradeResult<UpgradeReport> {
        let run_id = Uuid::new_v4();
        let started_at = Instant::now();
        info!("event=upgrade_batch module=upgrade status=start run_id={run_id}");

        let result = TxScope::run(conn, "upgrade_batch", |tx| {
            let repo = SqliteMemberRepository::try_new(tx)?;
            self.upgrade_members(&repo, run_id)
        });

        match &result {
            Ok(report) => info!(
                "event=upgrade_batch module=upgrade status=ok run_id={run_id} scanned={} promoted={} duration_ms={}",
                report.scanned,
                report.promotions.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=upgrade_batch module=upgrade status=error run_id={run_id} rolled_back=true duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            ),
        }
        result
    }

    /// Batch body. Only [`Self::run_upgrade_batch`] calls it outside tests, so
    /// every write through `repo` belongs to an open [`TxScope`].
    fn upgrade_members<R: MemberRepository + ?Sized>(
        &self,
        repo: &R,
        run_id: Uuid,
    ) -> UpgradeResult<UpgradeReport> {
        let members = repo.list_members()?;
        let scanned = members.len();
        let mut promotions = Vec::new();

        for member in members {
            if let Some(promotion) = self.upgrade_member(repo, member, run_id)? {
                promotions.push(promotion);
            }
        }

        Ok(UpgradeReport {
            run_id,
            scanned,
            promotions,
        })
    }

    /// Runs one member through the upgrade states:
    /// `Ineligible` (skip), `Eligible -> Promoted` (write + notify), or
    /// `Eligible -> RejectedTerminal` (contract violation).
    fn upgrade_member<R: MemberRepository + ?Sized>(
        &self,
        repo: &R,
        mut member: Member,
        run_id: Uuid,
    ) -> UpgradeResult<Option<Promotion>> {
        if !self.policy.is_eligible(&member) {
            return Ok(None);
        }

        let from = member.level();
        let to = member
            .upgrade_level()
            .map_err(|ceiling| UpgradeError::PolicyContractViolation {
                member_id: ceiling.id,
                level: ceiling.level,
            })?;

        self.failure_policy.before_write(&member)?;
        repo.update_member(&member)?;
        info!(
            "event=member_promoted module=upgrade status=ok run_id={run_id} member_id={} from={from} to={to}",
            member.id
        );

        let notified = self.notify(&member, run_id);
        Ok(Some(Promotion {
            member_id: member.id,
            from,
            to,
            notified,
        }))
    }

    fn notify(&self, member: &Member, run_id: Uuid) -> bool {
        let content = format!(
            "Hello {}, your membership level has been upgraded to {}.",
            member.name,
            member.level()
        );
        match self.notifier.send(&member.email, &content) {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    "event=notify_failed module=upgrade status=error run_id={run_id} member_id={} error={err}",
                    member.id
                );
                false
            }
        }
    }
}
