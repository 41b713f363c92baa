//! Caller-facing statement lookup.
//!
//! # Responsibility
//! - Resolve statement text by key for the data-access layer.
//! - Translate backend errors into one stable [`RetrievalFailure`] kind.
//!
//! # Invariants
//! - Callers never see [`StoreError`] variants directly; swapping the backend
//!   does not change the error type of `get_statement`.

use super::loader::{LoadError, StatementLoader, StatementSource};
use super::{StatementStore, StoreError};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Lookup failure returned by [`StatementService::get_statement`].
#[derive(Debug)]
pub struct RetrievalFailure {
    key: String,
    cause: StoreError,
}

impl RetrievalFailure {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Backend error that caused the failure, for diagnostics only.
    pub fn cause(&self) -> &StoreError {
        &self.cause
    }
}

impl Display for RetrievalFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "cannot retrieve statement `{}`: {}", self.key, self.cause)
    }
}

impl Error for RetrievalFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.cause)
    }
}

/// Boundary translation from backend errors to the caller-facing kind.
fn to_retrieval_failure(key: &str, cause: StoreError) -> RetrievalFailure {
    RetrievalFailure {
        key: key.to_string(),
        cause,
    }
}

/// Read-side facade over a statement store.
pub struct StatementService<S: StatementStore> {
    store: S,
}

impl<S: StatementStore> StatementService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Loads `source` into `store` and wraps it.
    ///
    /// # Errors
    /// - Any [`LoadError`]; the service is not created without its statements.
    pub fn initialize(source: impl StatementSource, store: S) -> Result<Self, LoadError> {
        StatementLoader::new(source).load_into(&store)?;
        Ok(Self::new(store))
    }

    pub fn get_statement(&self, key: &str) -> Result<String, RetrievalFailure> {
        self.store
            .find(key)
            .map_err(|cause| to_retrieval_failure(key, cause))
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
