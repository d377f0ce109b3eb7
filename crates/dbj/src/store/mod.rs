pub mod file;
pub mod mem;

use indexmap::IndexMap;
use serde_json::Value as Json;

use crate::document::{Document, Key};

pub use mem::Store;

// ─────────────────────────────────────────────────────────────────────────────
// Read-only view used by the query engine
// ─────────────────────────────────────────────────────────────────────────────

/// Read-only abstraction over an ordered collection of documents.
///
/// The query engine only ever needs two things from a collection:
/// - every `(key, document)` pair, in insertion order
/// - a single document by key
///
/// Both borrow from the collection, so it cannot change under a running scan.
pub trait StoreView {
    /// Iterate every `(key, document)` pair in insertion order.
    fn entries(&self) -> Box<dyn Iterator<Item = (&str, &Document)> + '_>;

    /// Get a document by key.
    fn document(&self, key: &str) -> Option<&Document>;

    /// Get a single field of a document.
    fn field(&self, key: &str, field: &str) -> Option<&Json> {
        self.document(key).and_then(|doc| doc.get(field))
    }
}

impl StoreView for IndexMap<Key, Document> {
    fn entries(&self) -> Box<dyn Iterator<Item = (&str, &Document)> + '_> {
        Box::new(self.iter().map(|(key, doc)| (key.as_str(), doc)))
    }

    fn document(&self, key: &str) -> Option<&Document> {
        self.get(key)
    }
}
