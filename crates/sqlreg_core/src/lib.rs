//! Core logic for sqlreg.
//! Statement registry backends and the transactional member upgrade batch.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod statement;

pub use config::{load_config, ConfigError, CoreConfig, LoggingConfig, UpgradePolicyConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult, TxScope};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::level::Level;
pub use model::member::{LevelCeilingReached, Member, MemberId, MemberValidationError};
pub use model::statement::StatementEntry;
pub use repo::member_repo::{MemberRepository, RepoError, RepoResult, SqliteMemberRepository};
pub use service::failure::{FailurePolicy, InjectedFailure, NeverFail};
pub use service::notifier::{LogNotifier, Notifier, NotifyError};
pub use service::policy::{ThresholdPolicy, UpgradePolicy};
pub use service::upgrade_service::{
    Promotion, UpgradeError, UpgradeReport, UpgradeResult, UpgradeService,
};
pub use statement::concurrent::ConcurrentStore;
pub use statement::loader::{
    JsonStatementSource, LoadError, SourceError, StatementLoader, StatementSource,
    VecStatementSource,
};
pub use statement::memory::InMemoryStore;
pub use statement::service::{RetrievalFailure, StatementService};
pub use statement::sqlite::SqliteStatementStore;
pub use statement::{StatementStore, StoreError, StoreResult, UpdatableStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
