use crate::array_lru_cache::{ArrayLruCache, Cache, Record};
use crate::error::Result;
use crate::geometry::Geometry;
use crate::mode::{KeyStored, PositionIndexed};
use crate::options::LruOptions;

/// A cache whose key mode is picked at runtime by `LruOptions::key_stored`.
///
/// Each variant is a fully typed [`ArrayLruCache`]; this enum only dispatches.
pub enum Lru<V> {
    KeyStored(ArrayLruCache<V, KeyStored>),
    PositionIndexed(ArrayLruCache<V, PositionIndexed>),
}

macro_rules! dispatch {
    ($self:expr, $cache:ident => $body:expr) => {
        match $self {
            Lru::KeyStored($cache) => $body,
            Lru::PositionIndexed($cache) => $body,
        }
    };
}

impl<V> Lru<V> {
    /// Creates a cache for at least `max_capacity` entries.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use array_lru::{Lru, LruOptions};
    ///
    /// let mut cache = Lru::init(16, LruOptions::new().collisions(4)).unwrap();
    /// cache.set(1, 10u32);
    /// assert_eq!(cache.get(1).map(|r| *r.value), Some(10));
    /// ```
    pub fn init(max_capacity: usize, options: LruOptions<V>) -> Result<Self> {
        if options.is_key_stored() {
            ArrayLruCache::with_options(max_capacity, options).map(Lru::KeyStored)
        } else {
            ArrayLruCache::with_options(max_capacity, options).map(Lru::PositionIndexed)
        }
    }

    pub fn is_key_stored(&self) -> bool {
        matches!(self, Lru::KeyStored(_))
    }

    pub fn geometry(&self) -> Geometry {
        dispatch!(self, cache => cache.geometry())
    }

    pub fn capacity(&self) -> usize {
        dispatch!(self, cache => cache.capacity())
    }

    pub fn is_evicting(&self) -> bool {
        dispatch!(self, cache => cache.is_evicting())
    }

    pub fn bucket_index(&self, key: u64) -> usize {
        dispatch!(self, cache => cache.bucket_index(key))
    }

    pub fn set(&mut self, key: u64, value: V) {
        dispatch!(self, cache => cache.set(key, value))
    }

    pub fn get(&mut self, key: u64) -> Option<Record<'_, V>> {
        dispatch!(self, cache => cache.get(key))
    }

    pub fn get_mut(&mut self, key: u64) -> Option<&mut V> {
        dispatch!(self, cache => cache.get_mut(key))
    }

    pub fn peek(&self, key: u64) -> Option<Record<'_, V>> {
        dispatch!(self, cache => cache.peek(key))
    }

    pub fn contains(&self, key: u64) -> bool {
        dispatch!(self, cache => cache.contains(key))
    }

    pub fn remove(&mut self, key: u64) -> Option<V> {
        dispatch!(self, cache => cache.remove(key))
    }

    pub fn slot_at(&self, position: usize) -> Option<Record<'_, V>> {
        dispatch!(self, cache => cache.slot_at(position))
    }

    pub fn len(&self) -> usize {
        dispatch!(self, cache => cache.len())
    }

    pub fn is_empty(&self) -> bool {
        dispatch!(self, cache => cache.is_empty())
    }

    pub fn clear(&mut self) {
        dispatch!(self, cache => cache.clear())
    }
}

impl<V> Cache<V> for Lru<V> {
    fn get(&mut self, key: u64) -> Option<&V> {
        self.get(key).map(|record| record.value)
    }

    fn set(&mut self, key: u64, value: V) {
        self.set(key, value)
    }

    fn remove(&mut self, key: u64) -> Option<V> {
        self.remove(key)
    }

    fn len(&self) -> usize {
        self.len()
    }

    fn is_empty(&self) -> bool {
        self.is_empty()
    }

    fn clear(&mut self) {
        self.clear()
    }
}

impl<V> std::fmt::Debug for Lru<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        dispatch!(self, cache => std::fmt::Debug::fmt(cache, f))
    }
}
