//! Bounded FIFO cache keyed by path.
//!
//! Two instances live on the app state: directory listings and file previews.
//! Eviction is strictly by insertion order. A `put` for a key that is already
//! present is ignored, so the first value written for a path stays put until
//! it ages out.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

/// Capacity used for both the listing and the preview cache.
pub const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug)]
pub struct FifoCache<V> {
    capacity: usize,
    map: HashMap<PathBuf, V>,
    order: VecDeque<PathBuf>,
}

impl<V> FifoCache<V> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            map: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn get(&self, key: &Path) -> Option<&V> {
        self.map.get(key)
    }

    #[inline]
    pub fn has(&self, key: &Path) -> bool {
        self.map.contains_key(key)
    }

    /// Inserts `value` unless `key` is already cached.
    ///
    /// Returns true when the value was stored.
    pub fn put(&mut self, key: PathBuf, value: V) -> bool {
        if self.map.contains_key(&key) {
            return false;
        }
        self.order.push_back(key.clone());
        self.map.insert(key, value);

        if self.order.len() > self.capacity
            && let Some(oldest) = self.order.pop_front()
        {
            self.map.remove(&oldest);
        }
        true
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<V> Default for FifoCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
