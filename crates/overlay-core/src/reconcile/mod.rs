//! Keyed set reconciliation.
//!
//! [`partition`] is the pure part: given the keys that are currently
//! materialized and the freshly computed data, it splits the data into the
//! items to create and the items to refresh, and lists the keys to tear down.
//! [`RenderedList`] applies a partition to a materialized list and reports
//! the resulting [`Patch`]es.

pub mod rendered;

pub use rendered::{ControlItem, ControlState, InputKind, Patch, RenderedList, SectionRules};

use std::collections::HashSet;
use std::hash::Hash;

/// Result of diffing new data against previously materialized keys.
///
/// `enter` and `update` keep the order of the new data, `exit` keeps the
/// order of the previous keys.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition<K, T> {
    pub enter: Vec<T>,
    pub update: Vec<T>,
    pub exit: Vec<K>,
}

impl<K, T> Partition<K, T> {
    pub fn is_noop(&self) -> bool {
        self.enter.is_empty() && self.exit.is_empty()
    }
}

/// Split `next` against `previous` by key.
///
/// Exit = previous − next, Enter = next − previous, Update = previous ∩ next.
/// When `next` holds several items with the same key only the first one
/// counts.
pub fn partition<K, T, F>(previous: &[K], next: Vec<T>, key_of: F) -> Partition<K, T>
where
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
{
    let before: HashSet<&K> = previous.iter().collect();
    let mut seen: HashSet<K> = HashSet::with_capacity(next.len());
    let mut enter = Vec::new();
    let mut update = Vec::new();

    for item in next {
        let key = key_of(&item);
        if !seen.insert(key.clone()) {
            continue;
        }
        if before.contains(&key) {
            update.push(item);
        } else {
            enter.push(item);
        }
    }

    let exit = previous
        .iter()
        .filter(|key| !seen.contains(*key))
        .cloned()
        .collect();

    Partition {
        enter,
        update,
        exit,
    }
}
