//! On-disk format of a store: one JSON object mapping key -> document, in
//! store order.
//!
//! Writes go to a temporary file next to the target which is then renamed
//! over it, so a process killed mid-save leaves the previous file intact.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::document::{Document, Key};
use crate::error::{Error, Result};

/// Read every document from `path`, keeping the file's key order.
pub fn read_documents(path: &Path) -> Result<IndexMap<Key, Document>> {
    let reader = BufReader::new(File::open(path)?);
    let docs: IndexMap<Key, Document> = serde_json::from_reader(reader)?;
    debug!(path = %path.display(), documents = docs.len(), "read documents");
    Ok(docs)
}

/// Atomically replace `path` with `docs`.
///
/// `indent` of `Some(n)` pretty-prints with `n` spaces per level (`Some(0)`
/// only inserts newlines); `None` writes compact JSON.
pub fn write_documents(
    path: &Path,
    docs: &IndexMap<Key, Document>,
    indent: Option<usize>,
) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        match indent {
            Some(width) => {
                let indent = vec![b' '; width];
                let mut ser =
                    Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(&indent));
                docs.serialize(&mut ser)?;
            }
            None => serde_json::to_writer(&mut writer, docs)?,
        }
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;

    debug!(path = %path.display(), documents = docs.len(), "wrote documents");
    Ok(())
}
