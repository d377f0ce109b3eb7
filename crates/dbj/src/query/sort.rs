use std::cmp::Ordering;

use serde_json::Value as Json;

use crate::document::Key;
use crate::store::StoreView;

/// Order `keys` by the value of `field` in their documents.
///
/// Keys not in the store, or whose document lacks `field`, are dropped.
/// Equal values fall back to key order, so the result is fully determined
/// by its input. `reverse` flips the whole order.
pub fn sort<S, K>(store: &S, keys: &[K], field: &str, reverse: bool) -> Vec<Key>
where
    S: StoreView + ?Sized,
    K: AsRef<str>,
{
    let mut pairs: Vec<(&Json, &str)> = keys
        .iter()
        .filter_map(|key| {
            let key = key.as_ref();
            store.field(key, field).map(|value| (value, key))
        })
        .collect();

    pairs.sort_by(|(a, ka), (b, kb)| compare_values(a, b).then_with(|| ka.cmp(kb)));
    if reverse {
        pairs.reverse();
    }

    pairs.into_iter().map(|(_, key)| key.to_string()).collect()
}

/// Total order over JSON values.
///
/// Within a type: numbers numerically, strings by code point, `false < true`,
/// arrays element by element. Across types:
/// null < bool < number < string < array < object. Objects compare equal.
pub fn compare_values(a: &Json, b: &Json) -> Ordering {
    match (a, b) {
        (Json::Null, Json::Null) => Ordering::Equal,
        (Json::Bool(x), Json::Bool(y)) => x.cmp(y),
        (Json::Number(x), Json::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.total_cmp(&y)
        }
        (Json::String(x), Json::String(y)) => x.cmp(y),
        (Json::Array(x), Json::Array(y)) => x
            .iter()
            .zip(y)
            .map(|(a, b)| compare_values(a, b))
            .find(|ord| ord.is_ne())
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        (Json::Object(_), Json::Object(_)) => Ordering::Equal,
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(value: &Json) -> u8 {
    match value {
        Json::Null => 0,
        Json::Bool(_) => 1,
        Json::Number(_) => 2,
        Json::String(_) => 3,
        Json::Array(_) => 4,
        Json::Object(_) => 5,
    }
}
