//! Message entries as stored in a locale file.

use std::collections::BTreeSet;

use serde::{
    Deserialize,
    Serialize,
};

/// Stored value of one message plus the files it was extracted from.
///
/// `files` is a set, so it is always sorted and free of duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEntry {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub files: BTreeSet<String>,
}

impl MessageEntry {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into(), files: BTreeSet::new() }
    }

    /// Entry extracted from a single source file.
    #[must_use]
    pub fn from_file(value: impl Into<String>, file: impl Into<String>) -> Self {
        Self { value: value.into(), files: BTreeSet::from([file.into()]) }
    }

    #[must_use]
    pub fn with_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files = files.into_iter().map(Into::into).collect();
        self
    }
}

/// A message value as found on disk.
///
/// Older stores kept a bare string per key. Both shapes are accepted and
/// normalized into [`MessageEntry`] when a document is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum StoredMessage {
    Legacy(String),
    Entry(MessageEntry),
}

impl From<StoredMessage> for MessageEntry {
    fn from(message: StoredMessage) -> Self {
        match message {
            StoredMessage::Legacy(value) => Self::new(value),
            StoredMessage::Entry(entry) => entry,
        }
    }
}
