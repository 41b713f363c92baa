//! Initial statement set loading.
//!
//! # Responsibility
//! - Read ordered `(key, text)` pairs from a [`StatementSource`].
//! - Register every pair into a store, in source order, once at startup.
//!
//! # Invariants
//! - A source that fails or yields no pairs aborts initialization; nothing
//!   is silently skipped.
//! - Later pairs with a repeated key win, matching `register` semantics.

use super::{StatementStore, StoreError};
use crate::model::statement::StatementEntry;
use log::{error, info};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Failure raised by a statement source.
#[derive(Debug)]
pub enum SourceError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read statement source `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "cannot parse statement source `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for SourceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

/// Initialization failure. Always fatal to the caller.
#[derive(Debug)]
pub enum LoadError {
    Source(SourceError),
    Empty { source_name: String },
    Store(StoreError),
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source(err) => write!(f, "{err}"),
            Self::Empty { source_name } => {
                write!(f, "statement source `{source_name}` produced no statements")
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Source(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Empty { .. } => None,
        }
    }
}

impl From<SourceError> for LoadError {
    fn from(value: SourceError) -> Self {
        Self::Source(value)
    }
}

impl From<StoreError> for LoadError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Producer of already-parsed statement pairs.
pub trait StatementSource {
    /// Short label used in logs and errors.
    fn name(&self) -> String;
    /// Returns all pairs in declaration order.
    fn read(&self) -> Result<Vec<StatementEntry>, SourceError>;
}

/// In-process source over a fixed pair list.
#[derive(Debug, Clone, Default)]
pub struct VecStatementSource {
    entries: Vec<StatementEntry>,
}

impl VecStatementSource {
    pub fn new(entries: impl IntoIterator<Item = impl Into<StatementEntry>>) -> Self {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }
}

impl StatementSource for VecStatementSource {
    fn name(&self) -> String {
        "inline".to_string()
    }

    fn read(&self) -> Result<Vec<StatementEntry>, SourceError> {
        Ok(self.entries.clone())
    }
}

#[derive(Debug, Deserialize)]
struct StatementFile {
    statements: Vec<StatementEntry>,
}

/// JSON file source: `{"statements": [{"key": "...", "text": "..."}]}`.
#[derive(Debug, Clone)]
pub struct JsonStatementSource {
    path: PathBuf,
}

impl JsonStatementSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl StatementSource for JsonStatementSource {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn read(&self) -> Result<Vec<StatementEntry>, SourceError> {
        let raw = std::fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        let file: StatementFile =
            serde_json::from_str(&raw).map_err(|source| SourceError::Parse {
                path: self.path.clone(),
                source,
            })?;
        Ok(file.statements)
    }
}

/// Populates a store from a source.
pub struct StatementLoader<Src: StatementSource> {
    source: Src,
}

impl<Src: StatementSource> StatementLoader<Src> {
    pub fn new(source: Src) -> Self {
        Self { source }
    }

    /// Registers every pair from the source and returns how many were read.
    ///
    /// # Side effects
    /// - Emits `statements_load` logging events.
    pub fn load_into<S: StatementStore + ?Sized>(&self, store: &S) -> Result<usize, LoadError> {
        let started_at = Instant::now();
        let source_name = self.source.name();
        info!("event=statements_load module=statement status=start source={source_name}");

        let result = self.read_and_register(&source_name, store);
        match &result {
            Ok(count) => info!(
                "event=statements_load module=statement status=ok source={source_name} count={count} duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=statements_load module=statement status=error source={source_name} duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            ),
        }
        result
    }

    fn read_and_register<S: StatementStore + ?Sized>(
        &self,
        source_name: &str,
        store: &S,
    ) -> Result<usize, LoadError> {
        let entries = self.source.read()?;
        if entries.is_empty() {
            return Err(LoadError::Empty {
                source_name: source_name.to_string(),
            });
        }
        for entry in &entries {
            store.register(&entry.key, &entry.text)?;
        }
        Ok(entries.len())
    }
}
