//! Transposition cache over fully resolved search results.
//!
//! The cache improves move ordering and stands in for re-computing
//! ordering keys; it is not a full memoization layer, and the search
//! stays correct with it empty. One cache lives for one search session.

use std::collections::HashMap;

use crate::position::Grid;
use crate::search::tree::Ply;
use crate::search::Value;

/// Full tile configuration plus the pending move that produced the
/// position. Player-turn results are stored with no move component.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct CacheKey {
    tiles: [u16; 16],
    ply: Option<Ply>,
}

impl CacheKey {
    pub fn new(grid: &Grid, ply: Option<Ply>) -> CacheKey {
        CacheKey {
            tiles: grid.as_list(),
            ply,
        }
    }
}

#[derive(Debug, Default)]
pub struct TranspositionCache {
    entries: HashMap<CacheKey, Value>,
}

impl TranspositionCache {
    pub fn new() -> TranspositionCache {
        TranspositionCache::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<Value> {
        self.entries.get(key).copied()
    }

    pub fn put(&mut self, key: CacheKey, value: Value) {
        self.entries.insert(key, value);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
