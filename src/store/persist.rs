//! Reading and writing store documents.

use std::collections::BTreeMap;
use std::io;
use std::path::{
    Path,
    PathBuf,
};

use serde::Serialize;
use thiserror::Error;

use super::{
    MessageEntry,
    MessageStore,
    StoredMessage,
};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse JSON in '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize messages: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Parses a message document, normalizing legacy bare-string values.
///
/// # Errors
/// Returns `serde_json::Error` if the text is not a JSON object of messages.
pub fn parse_message_document(text: &str) -> Result<MessageStore, serde_json::Error> {
    let document: BTreeMap<String, StoredMessage> = serde_json::from_str(text)?;
    Ok(document.into_iter().map(|(key, message)| (key, MessageEntry::from(message))).collect())
}

/// Loads a message document that must exist.
///
/// # Errors
/// Returns `StoreError` on read or parse failure.
pub async fn load_message_document(path: &Path) -> Result<MessageStore, StoreError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| StoreError::Read { path: path.to_path_buf(), source })?;
    parse_message_document(&text)
        .map_err(|source| StoreError::Parse { path: path.to_path_buf(), source })
}

/// Loads a persisted store, `Ok(None)` when the file does not exist yet.
///
/// # Errors
/// Returns `StoreError` on read or parse failure.
pub async fn load_store(path: &Path) -> Result<Option<MessageStore>, StoreError> {
    match load_message_document(path).await {
        Ok(store) => Ok(Some(store)),
        Err(StoreError::Read { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Renders a store as canonical JSON: sorted keys, `indent` spaces per
/// level (compact when 0) and a trailing newline.
///
/// # Errors
/// Returns `serde_json::Error` if serialization fails.
pub fn to_json(store: &MessageStore, indent: usize) -> Result<String, serde_json::Error> {
    let mut buffer = Vec::new();
    if indent == 0 {
        serde_json::to_writer(&mut buffer, &store.messages)?;
    } else {
        let indent = " ".repeat(indent);
        let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        store.messages.serialize(&mut serializer)?;
    }
    buffer.push(b'\n');
    // serde_json only emits valid UTF-8
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Writes a store, creating parent directories as needed.
///
/// # Errors
/// Returns `StoreError` on serialization or write failure.
pub async fn write_store(path: &Path, store: &MessageStore, indent: usize) -> Result<(), StoreError> {
    let json = to_json(store, indent)?;
    write_text(path, &json).await
}

/// Writes a text file, creating parent directories as needed.
pub(crate) async fn write_text(path: &Path, text: &str) -> Result<(), StoreError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| StoreError::Write { path: path.to_path_buf(), source })?;
    }
    tokio::fs::write(path, text)
        .await
        .map_err(|source| StoreError::Write { path: path.to_path_buf(), source })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;
    use crate::store::MergeMode;

    #[rstest]
    fn parse_normalizes_legacy_values() {
        let store = parse_message_document(r#"{"Hi": "Hi"}"#).unwrap();

        let json = to_json(&store, 0).unwrap();

        assert_that!(json, eq("{\"Hi\":{\"value\":\"Hi\",\"files\":[]}}\n"));
    }

    #[rstest]
    fn parse_accepts_mixed_documents() {
        let store = parse_message_document(
            r#"{"b": {"value": "B", "files": ["x.js"]}, "a": "A"}"#,
        )
        .unwrap();

        assert_that!(store.len(), eq(2));
        assert_that!(store.get("a").unwrap().value, eq("A"));
        assert_that!(store.get("b").unwrap().files.contains("x.js"), eq(true));
    }

    #[rstest]
    fn parse_rejects_non_object() {
        assert!(parse_message_document("[1, 2]").is_err());
    }

    #[rstest]
    fn to_json_sorts_keys_and_indents() {
        let mut store = MessageStore::new();
        store.merge("zebra", MessageEntry::from_file("Zebra", "b.js"), MergeMode::Extend);
        store.merge("apple", MessageEntry::new("Apple"), MergeMode::Extend);

        let json = to_json(&store, 2).unwrap();

        let expected = r#"{
  "apple": {
    "value": "Apple",
    "files": []
  },
  "zebra": {
    "value": "Zebra",
    "files": [
      "b.js"
    ]
  }
}
"#;
        assert_that!(json, eq(expected));
    }

    #[tokio::test]
    async fn load_store_missing_file_is_none() {
        let temp_dir = TempDir::new().unwrap();

        let result = load_store(&temp_dir.path().join("missing.json")).await;

        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test]
    async fn load_store_invalid_json_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();

        let result = load_store(&path).await;

        assert!(matches!(result, Err(StoreError::Parse { .. })));
    }

    #[tokio::test]
    async fn write_then_load_store() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("locale/en_US/i18n.json");
        let mut store = MessageStore::new();
        store.merge("Hello", MessageEntry::from_file("Hello", "a.js"), MergeMode::Extend);

        write_store(&path, &store, 2).await.unwrap();
        let loaded = load_store(&path).await.unwrap();

        assert_eq!(loaded, Some(store));
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.ends_with("}\n"));
    }
}
