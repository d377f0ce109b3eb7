use tracing::debug;

use crate::document::{Key, KeySet};
use crate::error::Result;
use crate::query::ast::{FindOptions, Predicate, Query};
use crate::query::numeric::find_num_expr;
use crate::query::parser::parse_query;
use crate::query::sort::sort;
use crate::query::text::{find_text, TextMatch};
use crate::store::StoreView;

/// Keys matching a single predicate, in store order.
pub fn eval_predicate<S: StoreView + ?Sized>(
    store: &S,
    predicate: &Predicate,
    case_sensitive: bool,
    fold_diacritics: bool,
) -> KeySet {
    match predicate {
        Predicate::Text {
            field,
            text,
            exact,
            invert,
        } => {
            let opts = TextMatch {
                exact: *exact,
                case_sensitive,
                invert: *invert,
                fold_diacritics,
            };
            find_text(store, field, text, opts)
        }
        Predicate::Numeric(expr) => find_num_expr(store, expr),
    }
}

/// Evaluate a parsed query, folding predicates strictly left to right.
pub fn eval_query<S: StoreView + ?Sized>(
    store: &S,
    query: &Query,
    case_sensitive: bool,
    fold_diacritics: bool,
) -> KeySet {
    let first = eval_predicate(store, &query.first, case_sensitive, fold_diacritics);
    query.rest.iter().fold(first, |acc, (op, predicate)| {
        let next = eval_predicate(store, predicate, case_sensitive, fold_diacritics);
        op.combine(acc, next)
    })
}

/// Run a query string against `store`.
///
/// The query is validated in full before the first scan. Without
/// `opts.sort_by` the keys come back in store order.
#[tracing::instrument(skip_all)]
pub fn find<S: StoreView + ?Sized>(store: &S, query: &str, opts: &FindOptions) -> Result<Vec<Key>> {
    let parsed = parse_query(query)?;
    let matched = eval_query(store, &parsed, opts.case_sensitive, opts.fold_diacritics);
    debug!(query, matched = matched.len(), "query evaluated");

    let keys = match &opts.sort_by {
        Some(field) => {
            let keys: Vec<&Key> = matched.iter().collect();
            sort(store, &keys, field, opts.reverse)
        }
        None => store
            .entries()
            .filter(|(key, _)| matched.contains(*key))
            .map(|(key, _)| key.to_string())
            .collect(),
    };
    Ok(keys)
}
