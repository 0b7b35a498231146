use std::collections::HashMap;
use std::hash::Hash;

use crate::model::{normalize, ReferenceResult};

/// Rank of a record whose ranked field is empty; below every assigned rank.
pub const EMPTY_RANK: i64 = 0;

/// Rank of a non-empty value the rank map does not know; above every
/// assigned rank. 2^53 - 1 so it survives a JSON double unchanged.
pub const UNRANKED: i64 = (1 << 53) - 1;

pub const DEFAULT_STATUS_VOCABULARY: [&str; 5] =
    ["not entered", "entered", "published", "declined", "recorded"];

/// Ordinal ranks built from a canonical reference list. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankMap<K: Eq + Hash> {
    ranks: HashMap<K, i64>,
}

impl<K: Eq + Hash> Default for RankMap<K> {
    fn default() -> Self {
        Self {
            ranks: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash> RankMap<K> {
    pub fn get<Q>(&self, key: &Q) -> Option<i64>
    where
        K: std::borrow::Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.ranks.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// First occurrence wins; later duplicates are ignored.
    fn insert_first(&mut self, key: K, rank: i64) -> bool {
        if self.ranks.contains_key(&key) {
            return false;
        }
        self.ranks.insert(key, rank);
        true
    }
}

/// Rank reference results 1, 2, 3... in list order.
///
/// Entries without a usable id, and repeated ids, are skipped and do not
/// consume a rank.
pub fn build_result_rank(reference: &[ReferenceResult]) -> RankMap<i64> {
    let mut map = RankMap::default();
    let mut next = 1;
    for res in reference {
        let Some(id) = res.id else {
            continue;
        };
        if map.insert_first(id, next) {
            next += 1;
        }
    }
    map
}

/// Positional (0-based) ranks for status labels, keyed by normalized label.
pub fn build_status_rank<S: AsRef<str>>(vocabulary: Option<&[S]>) -> RankMap<String> {
    let mut map = RankMap::default();
    match vocabulary {
        Some(v) => {
            for (idx, s) in v.iter().enumerate() {
                map.insert_first(normalize(s.as_ref()), idx as i64);
            }
        }
        None => {
            for (idx, s) in DEFAULT_STATUS_VOCABULARY.iter().enumerate() {
                map.insert_first(normalize(s), idx as i64);
            }
        }
    }
    map
}
