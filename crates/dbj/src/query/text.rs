use std::borrow::Cow;

use serde_json::Value as Json;
use tracing::debug;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::document::KeySet;
use crate::store::StoreView;

/// How [`find_text`] compares a field against the search text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextMatch {
    /// Whole-value equality instead of substring containment.
    pub exact: bool,
    pub case_sensitive: bool,
    /// Return the keys that do not match instead.
    pub invert: bool,
    /// Strip diacritics from both sides before comparing.
    pub fold_diacritics: bool,
}

impl Default for TextMatch {
    fn default() -> Self {
        Self {
            exact: false,
            case_sensitive: false,
            invert: false,
            fold_diacritics: true,
        }
    }
}

impl TextMatch {
    pub fn exact(mut self, yes: bool) -> Self {
        self.exact = yes;
        self
    }

    pub fn case_sensitive(mut self, yes: bool) -> Self {
        self.case_sensitive = yes;
        self
    }

    pub fn invert(mut self, yes: bool) -> Self {
        self.invert = yes;
        self
    }

    pub fn fold_diacritics(mut self, yes: bool) -> Self {
        self.fold_diacritics = yes;
        self
    }

    fn normalize<'a>(&self, s: &'a str) -> Cow<'a, str> {
        let mut out = Cow::Borrowed(s);
        if self.fold_diacritics {
            out = Cow::Owned(fold_diacritics(&out));
        }
        if !self.case_sensitive {
            out = Cow::Owned(out.to_lowercase());
        }
        out
    }

    fn is_match(&self, value: &str, text: &str) -> bool {
        if self.exact {
            value == text
        } else {
            value.contains(text)
        }
    }
}

/// Decompose (NFKD) and drop combining marks: `"Café"` becomes `"Cafe"`.
///
/// Characters without a decomposition, like `ß` or `ø`, are kept.
pub fn fold_diacritics(s: &str) -> String {
    s.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Keys whose string `field` matches `text` under `opts`.
///
/// Only documents holding `field` as a JSON string take part; with
/// `opts.invert` the result is the non-matching part of those documents.
pub fn find_text<S: StoreView + ?Sized>(
    store: &S,
    field: &str,
    text: &str,
    opts: TextMatch,
) -> KeySet {
    let needle = opts.normalize(text);

    let keys: KeySet = store
        .entries()
        .filter_map(|(key, doc)| match doc.get(field) {
            Some(Json::String(value)) => Some((key, value)),
            _ => None,
        })
        .filter(|(_, value)| opts.is_match(&opts.normalize(value), &needle) != opts.invert)
        .map(|(key, _)| key.to_string())
        .collect();

    debug!(field, ?opts, matched = keys.len(), "text scan");
    keys
}
