use indexmap::IndexSet;
use serde_json::{Map, Value as Json};

use crate::error::{Error, Result};

/// Unique identifier of a document within a store.
pub type Key = String;

/// A document: ordered field name -> JSON value mapping.
///
/// Field order is preserved (`serde_json` is built with `preserve_order`), so
/// a document round-trips through save/load unchanged.
pub type Document = Map<String, Json>;

/// Set of keys produced by a predicate or a whole query.
///
/// Evaluators fill it while scanning, so before any fold it is in store order.
pub type KeySet = IndexSet<Key>;

/// Convert an arbitrary JSON value into a storable document.
///
/// Only non-empty objects qualify.
pub fn document_from_value(value: Json) -> Result<Document> {
    match value {
        Json::Object(map) => {
            ensure_not_empty(&map)?;
            Ok(map)
        }
        other => Err(Error::invalid_argument(format!(
            "document must be a JSON object, got: {other}"
        ))),
    }
}

pub(crate) fn ensure_not_empty(document: &Document) -> Result<()> {
    if document.is_empty() {
        return Err(Error::invalid_argument("document must not be empty"));
    }
    Ok(())
}
