//! Embedded, in-memory JSON document store with a small query language.
//!
//! Documents are JSON objects kept in insertion order under string keys and
//! optionally persisted to a single JSON file. Queries look like
//!
//! ```text
//! name ?= "silva" and age >= 18 or city == ""São "SP" Paulo""
//! ```
//!
//! and are folded strictly left to right, without precedence.
//!
//! ```
//! use dbj::{FindOptions, Store};
//! use serde_json::json;
//!
//! let mut store = Store::in_memory();
//! store.insert_value(json!({ "name": "André", "age": 10 }), Some("1")).unwrap();
//! store.insert_value(json!({ "name": "Bia", "age": "18" }), Some("2")).unwrap();
//!
//! let keys = store.find("name == \"andre\" or age >= 18", &FindOptions::default()).unwrap();
//! assert_eq!(keys, vec!["1", "2"]);
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod query;
pub mod store;

pub use config::{QueryConfig, Settings, StoreConfig};
pub use document::{document_from_value, Document, Key, KeySet};
pub use error::{Error, ExpressionFault, QueryFault, Result};
pub use query::{find, find_num, find_text, parse_query, sort, FindOptions, Query, TextMatch};
pub use store::{Store, StoreView};
