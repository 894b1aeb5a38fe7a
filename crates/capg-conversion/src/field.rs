//! Reusable reshaping rules for fields whose structure differs between
//! versions.
//!
//! Plain 1:1 copies are expressed as [`From`] implementations next to the
//! types. The functions in here cover the shapes which need an explicit rule,
//! and they are the only place where a conversion may legitimately fail.

use std::collections::BTreeMap;

use snafu::ensure;

use crate::error::{ConversionFailedSnafu, Result};

/// Turns a list of named items into a map keyed by name.
///
/// Fails if two items share a name, because the map could only keep one of
/// them.
pub fn keyed_list_to_map<T, K, V>(
    entity: &'static str,
    items: &[T],
    key_and_value: impl Fn(&T) -> (K, V),
) -> Result<BTreeMap<K, V>>
where
    K: Ord + std::fmt::Debug,
{
    let mut map = BTreeMap::new();

    for item in items {
        let (key, value) = key_and_value(item);
        ensure!(!map.contains_key(&key), ConversionFailedSnafu {
            entity,
            reason: format!("duplicate key {key:?}"),
        });
        map.insert(key, value);
    }

    Ok(map)
}

/// Turns a map into a list of items, ordered by key.
pub fn map_to_keyed_list<K, V, T>(map: &BTreeMap<K, V>, item: impl Fn(&K, &V) -> T) -> Vec<T> {
    map.iter().map(|(key, value)| item(key, value)).collect()
}

/// Reorders `current` to follow the order of `preferred` when both contain
/// the same elements.
///
/// Maps lose the declaration order of list items. This restores it from a
/// preserved copy of the list, but only if that copy still describes exactly
/// the same items. Otherwise `current` is kept as it is.
pub fn restore_order<T>(current: &mut Vec<T>, preferred: Vec<T>)
where
    T: PartialEq,
{
    let same_items = current.len() == preferred.len()
        && preferred.iter().all(|item| current.contains(item));

    if same_items {
        *current = preferred;
    }
}
