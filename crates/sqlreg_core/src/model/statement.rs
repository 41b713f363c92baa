//! Statement registry entry.

use serde::{Deserialize, Serialize};

/// One named statement template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementEntry {
    pub key: String,
    pub text: String,
}

impl StatementEntry {
    pub fn new(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            text: text.into(),
        }
    }
}

impl<K: Into<String>, T: Into<String>> From<(K, T)> for StatementEntry {
    fn from((key, text): (K, T)) -> Self {
        Self::new(key, text)
    }
}
