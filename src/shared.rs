use parking_lot::Mutex;

use crate::error::Result;
use crate::geometry::Geometry;
use crate::lru::Lru;
use crate::options::LruOptions;

/// An [`Lru`] behind a single exclusive lock, for sharing across threads.
///
/// The cache itself is single-threaded; this wrapper is the external
/// synchronization it expects. Every operation holds the lock for one bucket
/// scan, and values are cloned out so no reference outlives the lock. The
/// eviction callback runs while the lock is held and must not call back into
/// the same cache.
///
/// # Examples
///
/// ```rust
/// use array_lru::{LruOptions, SharedArrayLru};
///
/// let cache = SharedArrayLru::new(1000, LruOptions::new()).unwrap();
/// cache.set(1, "value1".to_string());
/// assert_eq!(cache.get(1), Some("value1".to_string()));
/// ```
pub struct SharedArrayLru<V> {
    inner: Mutex<Lru<V>>,
    geometry: Geometry,
}

impl<V> SharedArrayLru<V> {
    pub fn new(max_capacity: usize, options: LruOptions<V>) -> Result<Self> {
        let lru = Lru::init(max_capacity, options)?;
        Ok(Self {
            geometry: lru.geometry(),
            inner: Mutex::new(lru),
        })
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn capacity(&self) -> usize {
        self.geometry.size()
    }

    pub fn set(&self, key: u64, value: V) {
        self.inner.lock().set(key, value)
    }

    pub fn remove(&self, key: u64) -> Option<V> {
        self.inner.lock().remove(key)
    }

    pub fn contains(&self, key: u64) -> bool {
        self.inner.lock().contains(key)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn clear(&self) {
        self.inner.lock().clear()
    }

    /// Runs `f` with exclusive access to the underlying cache.
    pub fn with<R>(&self, f: impl FnOnce(&mut Lru<V>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl<V: Clone> SharedArrayLru<V> {
    /// Looks up `key`, promoting it on a hit, and returns a clone of its value.
    pub fn get(&self, key: u64) -> Option<V> {
        self.inner.lock().get(key).map(|record| record.value.clone())
    }

    /// Clone of the value at array position `position`.
    pub fn slot_at(&self, position: usize) -> Option<V> {
        self.inner
            .lock()
            .slot_at(position)
            .map(|record| record.value.clone())
    }
}
