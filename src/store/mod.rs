//! Per-locale message stores and the merge that reconciles them.

mod entry;
mod persist;

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

pub use entry::{
    MessageEntry,
    StoredMessage,
};
pub(crate) use persist::write_text;
pub use persist::{
    StoreError,
    load_message_document,
    load_store,
    parse_message_document,
    to_json,
    write_store,
};

/// How an incoming entry is folded into a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// Extraction: new keys are inserted, existing values are never touched.
    Extend,
    /// Translation import: existing values are overwritten, unknown keys ignored.
    Update,
}

/// Mapping from message key to entry, kept in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageStore {
    messages: BTreeMap<String, MessageEntry>,
}

impl MessageStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds `incoming` into the entry stored at `key`.
    ///
    /// Files are unioned. With [`MergeMode::Update`] the stored value is
    /// replaced and absent keys stay absent; with [`MergeMode::Extend`] the
    /// stored value is kept and absent keys are inserted. Merging the same
    /// entry twice has the same effect as merging it once.
    pub fn merge(&mut self, key: &str, incoming: MessageEntry, mode: MergeMode) {
        match self.messages.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                let existing = occupied.get_mut();
                existing.files.extend(incoming.files);
                if mode == MergeMode::Update {
                    existing.value = incoming.value;
                }
            }
            Entry::Vacant(vacant) => {
                if mode == MergeMode::Extend {
                    vacant.insert(incoming);
                }
            }
        }
    }

    /// Merges every entry of `other`.
    pub fn merge_all(&mut self, other: &Self, mode: MergeMode) {
        for (key, entry) in &other.messages {
            self.merge(key, entry.clone(), mode);
        }
    }

    /// Drops every key `keep` rejects.
    pub fn retain_keys<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        self.messages.retain(|key, _| keep(key));
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&MessageEntry> {
        self.messages.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.messages.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Entries in sorted key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &MessageEntry)> {
        self.messages.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.messages.keys()
    }
}

impl FromIterator<(String, MessageEntry)> for MessageStore {
    fn from_iter<I: IntoIterator<Item = (String, MessageEntry)>>(iter: I) -> Self {
        let mut store = Self::new();
        for (key, entry) in iter {
            store.merge(&key, entry, MergeMode::Extend);
        }
        store
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;

    fn file_names(files: &std::collections::BTreeSet<String>) -> Vec<&str> {
        files.iter().map(String::as_str).collect()
    }

    #[rstest]
    fn merge_is_idempotent() {
        let mut once = MessageStore::new();
        once.merge("Hello", MessageEntry::from_file("Hello", "a.js"), MergeMode::Extend);

        let mut twice = once.clone();
        twice.merge("Hello", MessageEntry::from_file("Hello", "a.js"), MergeMode::Extend);

        assert_eq!(twice, once);
    }

    #[rstest]
    fn merge_unions_files_without_clobbering_value() {
        let mut store = MessageStore::new();
        store.merge("Hello", MessageEntry::from_file("A", "x.js"), MergeMode::Extend);
        store.merge("Hello", MessageEntry::from_file("B", "y.js"), MergeMode::Extend);

        let entry = store.get("Hello").unwrap();
        assert_that!(entry.value, eq("A"));
        assert_eq!(file_names(&entry.files), ["x.js", "y.js"]);
    }

    #[rstest]
    fn merge_keeps_existing_files_when_incoming_has_none() {
        let mut store = MessageStore::new();
        store.merge("Hello", MessageEntry::from_file("A", "x.js"), MergeMode::Extend);
        store.merge("Hello", MessageEntry::new("B"), MergeMode::Update);

        let entry = store.get("Hello").unwrap();
        assert_that!(entry.value, eq("B"));
        assert_eq!(file_names(&entry.files), ["x.js"]);
    }

    #[rstest]
    fn merge_takes_incoming_files_when_existing_has_none() {
        let mut store = MessageStore::new();
        store.merge("Hello", MessageEntry::new("A"), MergeMode::Extend);
        store.merge("Hello", MessageEntry::from_file("A", "z.js"), MergeMode::Extend);

        assert_eq!(file_names(&store.get("Hello").unwrap().files), ["z.js"]);
    }

    #[rstest]
    fn update_mode_overwrites_value() {
        let mut store = MessageStore::new();
        store.merge("Hello", MessageEntry::from_file("Hello", "a.js"), MergeMode::Extend);
        store.merge("Hello", MessageEntry::new("Hallo"), MergeMode::Update);

        assert_that!(store.get("Hello").unwrap().value, eq("Hallo"));
    }

    #[rstest]
    fn update_mode_never_inserts() {
        let mut store = MessageStore::new();
        store.merge("Hello", MessageEntry::new("Hello"), MergeMode::Extend);
        let before = store.clone();

        store.merge("Goodbye", MessageEntry::new("Tschüss"), MergeMode::Update);

        assert_eq!(store, before);
        assert_that!(store.contains_key("Goodbye"), eq(false));
    }

    #[rstest]
    fn merge_keeps_files_sorted() {
        let mut store = MessageStore::new();
        store.merge("k", MessageEntry::from_file("k", "m.js"), MergeMode::Extend);
        store.merge("k", MessageEntry::new("k").with_files(["z.js", "a.js"]), MergeMode::Extend);

        assert_eq!(file_names(&store.get("k").unwrap().files), ["a.js", "m.js", "z.js"]);
    }

    #[rstest]
    fn retain_keys_drops_rejected_keys() {
        let mut store: MessageStore = [
            ("a".to_string(), MessageEntry::new("a")),
            ("b".to_string(), MessageEntry::new("b")),
        ]
        .into_iter()
        .collect();

        store.retain_keys(|key| key == "a");

        assert_eq!(store.keys().map(String::as_str).collect::<Vec<_>>(), ["a"]);
    }
}
