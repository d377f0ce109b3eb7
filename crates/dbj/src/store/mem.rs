use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use rand::Rng;
use serde_json::Value as Json;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::document::{document_from_value, ensure_not_empty, Document, Key, KeySet};
use crate::error::{Error, Result};
use crate::query::{self, FindOptions, TextMatch};
use crate::store::{file, StoreView};

// ─────────────────────────────────────────────────────────────────────────────
// In-memory ordered document store
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory, insertion-ordered collection of documents addressed by key.
///
/// The store optionally knows a backing file. With `autosave` enabled every
/// successful mutation is written back to that file; otherwise the caller
/// decides when to [`save`](Store::save).
#[derive(Debug, Clone, Default)]
pub struct Store {
    docs: IndexMap<Key, Document>,
    path: Option<PathBuf>,
    autosave: bool,
    indent: Option<usize>,
}

impl Store {
    /// A store with no backing file.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the store described by `config`, loading the file when it exists.
    #[tracing::instrument(skip_all)]
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let mut store = Self {
            docs: IndexMap::new(),
            path: Some(config.path.clone()),
            autosave: config.autosave,
            indent: config.indent,
        };
        store.load()?;
        Ok(store)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn autosave(&self) -> bool {
        self.autosave
    }

    pub fn set_autosave(&mut self, autosave: bool) {
        self.autosave = autosave;
    }

    /// Replace the in-memory contents with the backing file.
    ///
    /// A missing file yields an empty store.
    pub fn load(&mut self) -> Result<()> {
        let path = self.require_path()?.to_path_buf();
        self.docs = if path.exists() {
            file::read_documents(&path)?
        } else {
            IndexMap::new()
        };
        info!(path = %path.display(), documents = self.docs.len(), "store loaded");
        Ok(())
    }

    /// Write the whole store to its backing file.
    pub fn save(&self) -> Result<()> {
        let path = self.require_path()?;
        file::write_documents(path, &self.docs, self.indent)?;
        info!(path = %path.display(), documents = self.docs.len(), "store saved");
        Ok(())
    }

    fn require_path(&self) -> Result<&Path> {
        self.path
            .as_deref()
            .ok_or_else(|| Error::invalid_argument("store has no backing file"))
    }

    fn autosave_now(&self) -> Result<()> {
        if self.autosave {
            self.save()?;
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Create
    // ─────────────────────────────────────────────────────────────────────

    /// Insert `document` under `key`, or under a generated key.
    ///
    /// An existing key is overwritten in place, keeping its position.
    pub fn insert(&mut self, document: Document, key: Option<&str>) -> Result<Key> {
        let key = self.insert_unsaved(document, key)?;
        self.autosave_now()?;
        Ok(key)
    }

    /// Like [`insert`](Store::insert) for an arbitrary JSON value.
    pub fn insert_value(&mut self, value: Json, key: Option<&str>) -> Result<Key> {
        self.insert(document_from_value(value)?, key)
    }

    /// Insert several documents under generated keys.
    ///
    /// Every value is validated before the first insert, so either all of
    /// them are inserted or none.
    pub fn insert_many(&mut self, values: Vec<Json>) -> Result<usize> {
        let documents = values
            .into_iter()
            .map(document_from_value)
            .collect::<Result<Vec<_>>>()?;

        let count = documents.len();
        for document in documents {
            self.insert_unsaved(document, None)?;
        }
        self.autosave_now()?;
        Ok(count)
    }

    fn insert_unsaved(&mut self, document: Document, key: Option<&str>) -> Result<Key> {
        ensure_not_empty(&document)?;
        let key = match key {
            Some(key) => key.to_string(),
            None => generate_key(),
        };
        self.docs.insert(key.clone(), document);
        Ok(key)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Read
    // ─────────────────────────────────────────────────────────────────────

    pub fn get(&self, key: &str) -> Option<&Document> {
        self.docs.get(key)
    }

    /// Documents for `keys`, skipping keys that do not exist.
    pub fn get_many<K: AsRef<str>>(&self, keys: &[K]) -> Vec<&Document> {
        keys.iter().filter_map(|k| self.get(k.as_ref())).collect()
    }

    pub fn get_all(&self) -> Vec<&Document> {
        self.docs.values().collect()
    }

    pub fn keys(&self) -> Vec<Key> {
        self.docs.keys().cloned().collect()
    }

    pub fn first_key(&self) -> Option<&str> {
        self.docs.first().map(|(k, _)| k.as_str())
    }

    pub fn last_key(&self) -> Option<&str> {
        self.docs.last().map(|(k, _)| k.as_str())
    }

    pub fn first(&self) -> Option<&Document> {
        self.docs.first().map(|(_, doc)| doc)
    }

    pub fn last(&self) -> Option<&Document> {
        self.docs.last().map(|(_, doc)| doc)
    }

    /// A uniformly random document, or `None` when the store is empty.
    pub fn random(&self) -> Option<&Document> {
        if self.docs.is_empty() {
            return None;
        }
        let index = rand::rng().random_range(0..self.docs.len());
        self.docs.get_index(index).map(|(_, doc)| doc)
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.docs.contains_key(key)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Update
    // ─────────────────────────────────────────────────────────────────────

    /// Merge `values` into the document stored under `key`.
    ///
    /// Returns `false` when the key does not exist.
    pub fn update(&mut self, key: &str, values: Document) -> Result<bool> {
        let updated = self.update_unsaved(key, values);
        if updated {
            self.autosave_now()?;
        }
        Ok(updated)
    }

    /// Merge `values` into every existing document in `keys`.
    pub fn update_many<K: AsRef<str>>(&mut self, keys: &[K], values: &Document) -> Result<usize> {
        let updated = keys
            .iter()
            .filter(|k| self.update_unsaved(k.as_ref(), values.clone()))
            .count();
        if updated > 0 {
            self.autosave_now()?;
        }
        Ok(updated)
    }

    fn update_unsaved(&mut self, key: &str, values: Document) -> bool {
        match self.docs.get_mut(key) {
            Some(doc) => {
                doc.extend(values);
                true
            }
            None => false,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Delete
    // ─────────────────────────────────────────────────────────────────────

    /// Remove and return the document under `key`.
    pub fn pop(&mut self, key: &str) -> Result<Option<Document>> {
        let doc = self.docs.shift_remove(key);
        if doc.is_some() {
            self.autosave_now()?;
        }
        Ok(doc)
    }

    /// Remove and return the first inserted document.
    pub fn pop_first(&mut self) -> Result<Option<Document>> {
        let doc = self.docs.shift_remove_index(0).map(|(_, doc)| doc);
        if doc.is_some() {
            self.autosave_now()?;
        }
        Ok(doc)
    }

    /// Remove and return the last inserted document.
    pub fn pop_last(&mut self) -> Result<Option<Document>> {
        let doc = self.docs.pop().map(|(_, doc)| doc);
        if doc.is_some() {
            self.autosave_now()?;
        }
        Ok(doc)
    }

    /// Delete the document under `key`; `false` when it did not exist.
    pub fn delete(&mut self, key: &str) -> Result<bool> {
        Ok(self.pop(key)?.is_some())
    }

    /// Delete every document in `keys`, returning how many existed.
    pub fn delete_many<K: AsRef<str>>(&mut self, keys: &[K]) -> Result<usize> {
        let deleted = keys
            .iter()
            .filter(|k| self.docs.shift_remove(k.as_ref()).is_some())
            .count();
        if deleted > 0 {
            self.autosave_now()?;
        }
        Ok(deleted)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.docs.clear();
        self.autosave_now()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Query
    // ─────────────────────────────────────────────────────────────────────

    /// See [`query::find_text`].
    pub fn find_text(&self, field: &str, text: &str, opts: TextMatch) -> KeySet {
        query::find_text(self, field, text, opts)
    }

    /// See [`query::find_num`].
    pub fn find_num(&self, expression: &str) -> Result<KeySet> {
        query::find_num(self, expression)
    }

    /// See [`query::find`].
    pub fn find(&self, query: &str, opts: &FindOptions) -> Result<Vec<Key>> {
        query::find(self, query, opts)
    }

    /// See [`query::sort`].
    pub fn sort<K: AsRef<str>>(&self, keys: &[K], field: &str, reverse: bool) -> Vec<Key> {
        query::sort(self, keys, field, reverse)
    }
}

impl StoreView for Store {
    fn entries(&self) -> Box<dyn Iterator<Item = (&str, &Document)> + '_> {
        StoreView::entries(&self.docs)
    }

    fn document(&self, key: &str) -> Option<&Document> {
        self.docs.get(key)
    }
}

/// 32 lowercase hex digits, no dashes.
fn generate_key() -> Key {
    let key = Uuid::new_v4().simple().to_string();
    debug!(%key, "generated document key");
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn doc(value: Json) -> Document {
        document_from_value(value).expect("test document")
    }

    fn store_with(entries: Vec<(&str, Json)>) -> Store {
        let mut store = Store::in_memory();
        for (key, value) in entries {
            store.insert(doc(value), Some(key)).expect("insert");
        }
        store
    }

    // ─────────────────────────────────────────────────────────────
    // insert / insert_many
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn insert_with_explicit_key_returns_it() {
        let mut store = Store::in_memory();
        let key = store.insert(doc(json!({ "test": "testing" })), Some("1")).unwrap();
        assert_eq!(key, "1");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn insert_without_key_generates_hex_key() {
        let mut store = Store::in_memory();
        let key = store.insert(doc(json!({ "test": "testing" })), None).unwrap();

        assert_eq!(key.len(), 32);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert!(store.contains_key(&key));
    }

    #[test]
    fn insert_rejects_empty_document() {
        let mut store = Store::in_memory();
        let err = store.insert(Document::new(), None).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn insert_value_rejects_non_object() {
        let mut store = Store::in_memory();
        let err = store.insert_value(json!("test"), None).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn insert_existing_key_overwrites_in_place() {
        let mut store = store_with(vec![
            ("1", json!({ "v": 1 })),
            ("2", json!({ "v": 2 })),
            ("3", json!({ "v": 3 })),
        ]);

        store.insert(doc(json!({ "v": 20 })), Some("2")).unwrap();

        assert_eq!(store.keys(), vec!["1", "2", "3"]);
        assert_eq!(store.get("2").unwrap()["v"], json!(20));
    }

    #[test]
    fn insert_many_is_all_or_nothing() {
        let mut store = Store::in_memory();

        let err = store
            .insert_many(vec![json!({ "test": "testing" }), json!("testing")])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(store.is_empty());

        let inserted = store
            .insert_many(vec![json!({ "a": 1 }), json!({ "b": 2 }), json!({ "c": 3 })])
            .unwrap();
        assert_eq!(inserted, 3);
        assert_eq!(store.len(), 3);
    }

    // ─────────────────────────────────────────────────────────────
    // get / first / last / random
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn get_many_skips_missing_keys() {
        let store = store_with(vec![("1", json!({ "a": 1 })), ("2", json!({ "b": 2 }))]);

        let docs = store.get_many(&["2", "missing", "1"]);
        assert_eq!(docs, vec![&doc(json!({ "b": 2 })), &doc(json!({ "a": 1 }))]);
        assert!(store.get("missing").is_none());
    }

    #[test]
    fn first_and_last_follow_insertion_order() {
        let empty = Store::in_memory();
        assert!(empty.first().is_none());
        assert!(empty.last_key().is_none());

        let store = store_with(vec![("b", json!({ "n": 1 })), ("a", json!({ "n": 2 }))]);
        assert_eq!(store.first_key(), Some("b"));
        assert_eq!(store.last_key(), Some("a"));
        assert_eq!(store.first().unwrap()["n"], json!(1));
        assert_eq!(store.last().unwrap()["n"], json!(2));
    }

    #[test]
    fn random_picks_an_existing_document() {
        assert!(Store::in_memory().random().is_none());

        let store = store_with(vec![("1", json!({ "n": 1 })), ("2", json!({ "n": 2 }))]);
        let picked = store.random().expect("non-empty store");
        assert!(store.get_all().contains(&picked));
    }

    // ─────────────────────────────────────────────────────────────
    // pop / delete / clear
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn pop_variants_remove_and_return() {
        let mut store = store_with(vec![
            ("1", json!({ "n": 1 })),
            ("2", json!({ "n": 2 })),
            ("3", json!({ "n": 3 })),
        ]);

        assert_eq!(store.pop("2").unwrap(), Some(doc(json!({ "n": 2 }))));
        assert_eq!(store.pop("2").unwrap(), None);
        assert_eq!(store.pop_first().unwrap(), Some(doc(json!({ "n": 1 }))));
        assert_eq!(store.pop_last().unwrap(), Some(doc(json!({ "n": 3 }))));
        assert_eq!(store.pop_last().unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn delete_keeps_order_of_survivors() {
        let mut store = store_with(vec![
            ("1", json!({ "n": 1 })),
            ("2", json!({ "n": 2 })),
            ("3", json!({ "n": 3 })),
            ("4", json!({ "n": 4 })),
        ]);

        assert!(store.delete("2").unwrap());
        assert!(!store.delete("2").unwrap());
        store.insert(doc(json!({ "n": 5 })), Some("5")).unwrap();

        assert_eq!(store.keys(), vec!["1", "3", "4", "5"]);
    }

    #[test]
    fn delete_many_counts_existing_keys_only() {
        let mut store = store_with(vec![("1", json!({ "n": 1 })), ("2", json!({ "n": 2 }))]);
        assert_eq!(store.delete_many(&["1", "2", "3"]).unwrap(), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn clear_empties_store() {
        let mut store = store_with(vec![("1", json!({ "n": 1 }))]);
        store.clear().unwrap();
        assert_eq!(store.len(), 0);
    }

    // ─────────────────────────────────────────────────────────────
    // update / update_many
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn update_merges_fields_and_reports_missing() {
        let mut store = store_with(vec![("1", json!({ "test": "testing" }))]);

        assert!(!store.update("2", doc(json!({ "x": 1 }))).unwrap());
        assert!(store
            .update("1", doc(json!({ "test": "updated", "new": true })))
            .unwrap());

        assert_eq!(
            store.get("1").unwrap(),
            &doc(json!({ "test": "updated", "new": true }))
        );
    }

    #[test]
    fn update_many_counts_updated_documents() {
        let mut store = store_with(vec![
            ("1", json!({ "test": "testing" })),
            ("2", json!({ "test2": "testing2" })),
        ]);

        let values = doc(json!({ "flag": 1 }));
        assert_eq!(store.update_many(&["1", "2", "3"], &values).unwrap(), 2);
        assert_eq!(store.get("2").unwrap()["flag"], json!(1));
    }

    // ─────────────────────────────────────────────────────────────
    // persistence
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn save_without_path_is_invalid_argument() {
        let store = Store::in_memory();
        assert!(matches!(store.save().unwrap_err(), Error::InvalidArgument(_)));
    }

    #[test]
    fn open_missing_file_yields_empty_store() {
        let dir = TempDir::new().unwrap();
        let config = StoreConfig::new(dir.path().join("db.json"));

        let store = Store::open(&config).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.path(), Some(config.path.as_path()));
    }

    #[test]
    fn save_then_open_round_trips_order() {
        let dir = TempDir::new().unwrap();
        let config = StoreConfig::new(dir.path().join("db.json"));

        let mut store = Store::open(&config).unwrap();
        store.insert(doc(json!({ "z": 1, "a": 2 })), Some("b")).unwrap();
        store.insert(doc(json!({ "test": "testing" })), Some("a")).unwrap();
        store.save().unwrap();

        let reopened = Store::open(&config).unwrap();
        assert_eq!(reopened.keys(), vec!["b", "a"]);
        let fields: Vec<_> = reopened.get("b").unwrap().keys().cloned().collect();
        assert_eq!(fields, vec!["z", "a"]);
    }

    #[test]
    fn autosave_persists_every_mutation() {
        let dir = TempDir::new().unwrap();
        let mut config = StoreConfig::new(dir.path().join("db.json"));
        config.autosave = true;

        let mut store = Store::open(&config).unwrap();
        store.insert(doc(json!({ "test": "testing" })), None).unwrap();
        store.insert(doc(json!({ "test2": "testing2" })), None).unwrap();

        let reopened = Store::open(&StoreConfig::new(config.path.clone())).unwrap();
        assert_eq!(reopened.len(), 2);
    }

    #[test]
    fn set_autosave_toggles_saving_on_mutation() {
        let dir = TempDir::new().unwrap();
        let config = StoreConfig::new(dir.path().join("db.json"));

        let mut store = Store::open(&config).unwrap();
        assert!(!store.autosave());

        store.set_autosave(true);
        store.insert(doc(json!({ "n": 1 })), Some("1")).unwrap();
        assert_eq!(Store::open(&config).unwrap().keys(), vec!["1"]);

        store.set_autosave(false);
        store.insert(doc(json!({ "n": 2 })), Some("2")).unwrap();
        assert_eq!(Store::open(&config).unwrap().keys(), vec!["1"]);
    }

    #[test]
    fn load_replaces_unsaved_changes() {
        let dir = TempDir::new().unwrap();
        let config = StoreConfig::new(dir.path().join("db.json"));

        let mut store = Store::open(&config).unwrap();
        store.insert(doc(json!({ "n": 1 })), Some("1")).unwrap();
        store.save().unwrap();
        store.insert(doc(json!({ "n": 2 })), Some("2")).unwrap();

        store.load().unwrap();
        assert_eq!(store.keys(), vec!["1"]);
    }
}
