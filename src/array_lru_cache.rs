use std::fmt;
use std::marker::PhantomData;

use tracing::{debug, trace};

use crate::error::{ConfigError, Result};
use crate::geometry::{Geometry, DEFAULT_COLLISIONS};
use crate::hash::BucketHash;
use crate::mode::{KeyMode, KeyStored};
use crate::options::{EvictFn, LruOptions};

/// The operations shared by every cache in this crate.
///
/// # Type Parameters
///
/// * `V` - The type of values stored in the cache
pub trait Cache<V> {
    /// Looks up `key` and marks it most recently used within its bucket.
    ///
    /// # Returns
    ///
    /// * `Some(&V)` if the key is cached
    /// * `None` otherwise; a miss leaves every slot untouched
    fn get(&mut self, key: u64) -> Option<&V>;

    /// Stores `value` under `key` at the front of its bucket, evicting the
    /// bucket's least recently used entry if the bucket is full.
    fn set(&mut self, key: u64, value: V);

    /// Removes `key`, returning its value.
    fn remove(&mut self, key: u64) -> Option<V>;

    /// Returns the number of occupied slots.
    fn len(&self) -> usize;

    /// Returns true if no slot is occupied.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Empties every slot without invoking the eviction callback.
    fn clear(&mut self);
}

/// An occupied slot.
struct Slot<V, M: KeyMode> {
    key: M::Stored,
    value: V,
}

impl<V, M: KeyMode> Slot<V, M> {
    fn new(key: u64, value: V) -> Self {
        Self {
            key: M::store(key),
            value,
        }
    }

    fn record(&self) -> Record<'_, V> {
        Record {
            key: M::key_of(&self.key),
            value: &self.value,
        }
    }
}

/// A borrowed view of a cached entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a, V> {
    /// The original key; `None` in position-indexed mode.
    pub key: Option<u64>,
    pub value: &'a V,
}

// Outcome of scanning a bucket for a key.
enum Probe {
    Hit(usize),
    Vacant(usize),
    Full,
}

/// A fixed-capacity cache with approximate LRU eviction and no linked lists.
///
/// Slots live in a single flat array split into buckets of `collisions`
/// slots. A key only ever occupies a slot of the bucket its hash selects, and
/// within a bucket the occupied slots are packed from the front in recency
/// order: the first slot is the most recently used, the last occupied slot the
/// least. Ordering is exact within a bucket and not tracked across buckets.
///
/// The cache is single-threaded; see [`SharedArrayLru`](crate::SharedArrayLru)
/// for a locked wrapper.
///
/// # Type Parameters
///
/// * `V` - The type of values stored in the cache
/// * `M` - The key representation, [`KeyStored`] or
///   [`PositionIndexed`](crate::PositionIndexed)
///
/// # Examples
///
/// ```rust
/// use array_lru::ArrayLruCache;
///
/// let mut cache = ArrayLruCache::new(16).unwrap();
/// cache.set(7, "seven");
/// let record = cache.get(7).unwrap();
/// assert_eq!(record.key, Some(7));
/// assert_eq!(*record.value, "seven");
/// ```
pub struct ArrayLruCache<V, M: KeyMode = KeyStored> {
    geometry: Geometry,
    hash: BucketHash,
    slots: Box<[Option<Slot<V, M>>]>,
    len: usize,
    on_evict: Option<EvictFn<V>>,
    _mode: PhantomData<M>,
}

impl<V> ArrayLruCache<V, KeyStored> {
    /// Creates a key-stored cache for at least `max_capacity` entries with the
    /// default collision degree of 4 and no eviction callback.
    pub fn new(max_capacity: usize) -> Result<Self> {
        Self::build(Geometry::new(max_capacity, DEFAULT_COLLISIONS)?, None)
    }
}

impl<V, M: KeyMode> ArrayLruCache<V, M> {
    /// Creates a cache from `options`.
    ///
    /// # Errors
    ///
    /// Besides sizing errors, returns [`ConfigError::ModeMismatch`] when
    /// `options.key_stored` was set to a mode other than `M`.
    pub fn with_options(max_capacity: usize, options: LruOptions<V>) -> Result<Self> {
        if options.is_key_stored() != M::KEY_STORED {
            return Err(ConfigError::ModeMismatch {
                requested: options.is_key_stored(),
                mode: M::NAME,
            });
        }
        let geometry = options.geometry(max_capacity)?;
        Self::build(geometry, options.on_evict)
    }

    fn build(geometry: Geometry, on_evict: Option<EvictFn<V>>) -> Result<Self> {
        let mut slots: Vec<Option<Slot<V, M>>> = Vec::new();
        // The slot count fits in usize, but its size in bytes may not.
        slots
            .try_reserve_exact(geometry.size())
            .map_err(|_| ConfigError::CapacityOverflow {
                capacity: geometry.size(),
                collisions: geometry.collisions(),
            })?;
        slots.extend(std::iter::repeat_with(|| None).take(geometry.size()));
        let slots = slots.into_boxed_slice();
        debug!(
            buckets = geometry.buckets(),
            collisions = geometry.collisions(),
            size = geometry.size(),
            mode = M::NAME,
            evicting = on_evict.is_some(),
            "array lru initialized"
        );
        Ok(Self {
            geometry,
            hash: BucketHash::for_buckets(geometry.buckets()),
            slots,
            len: 0,
            on_evict,
            _mode: PhantomData,
        })
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.geometry.size()
    }

    /// Whether an eviction callback is registered.
    pub fn is_evicting(&self) -> bool {
        self.on_evict.is_some()
    }

    /// Bucket that `key` maps to.
    #[inline]
    pub fn bucket_index(&self, key: u64) -> usize {
        self.hash.index(key)
    }

    #[inline]
    fn bucket_range(&self, key: u64) -> (usize, usize) {
        let front = self.geometry.bucket_start(self.bucket_index(key));
        (front, front + self.geometry.collisions())
    }

    // Scanning stops at the first empty slot: occupied slots are packed at the
    // front of the bucket, so nothing can follow it.
    fn probe(&self, front: usize, end: usize, key: u64) -> Probe {
        for pos in front..end {
            match &self.slots[pos] {
                None => return Probe::Vacant(pos),
                Some(slot) if M::matches(&slot.key, key) => return Probe::Hit(pos),
                Some(_) => {}
            }
        }
        Probe::Full
    }

    /// Moves the slot at `pos` to `front`, shifting `[front, pos)` one slot
    /// toward `pos` and keeping their relative order.
    #[inline]
    fn promote(&mut self, front: usize, pos: usize) {
        debug_assert!(front <= pos);
        self.slots[front..=pos].rotate_right(1);
    }

    /// Stores `value` under `key` and makes it the most recent entry of its
    /// bucket.
    ///
    /// An existing entry for `key` is overwritten in place. When the bucket is
    /// full, its last slot (the least recently used entry) is evicted and the
    /// eviction callback, if any, is invoked before this returns.
    pub fn set(&mut self, key: u64, value: V) {
        let (front, end) = self.bucket_range(key);
        match self.probe(front, end, key) {
            Probe::Hit(pos) => {
                if let Some(slot) = self.slots[pos].as_mut() {
                    slot.value = value;
                }
                self.promote(front, pos);
            }
            Probe::Vacant(pos) => {
                self.slots[pos] = Some(Slot::new(key, value));
                self.len += 1;
                self.promote(front, pos);
            }
            Probe::Full => {
                let tail = end - 1;
                if let Some(evicted) = self.slots[tail].replace(Slot::new(key, value)) {
                    self.notify_evicted(tail, evicted);
                }
                self.promote(front, tail);
            }
        }
    }

    fn notify_evicted(&mut self, position: usize, evicted: Slot<V, M>) {
        let identity = M::evicted_identity(&evicted.key, position);
        trace!(identity, position, mode = M::NAME, "evicting least recently used slot");
        if let Some(on_evict) = self.on_evict.as_mut() {
            on_evict(identity, evicted.value);
        }
    }

    /// Looks up `key`, promoting it to the front of its bucket on a hit.
    ///
    /// Always `None` in position-indexed mode, where slots carry no key.
    pub fn get(&mut self, key: u64) -> Option<Record<'_, V>> {
        let (front, end) = self.bucket_range(key);
        match self.probe(front, end, key) {
            Probe::Hit(pos) => {
                self.promote(front, pos);
                self.slots[front].as_ref().map(Slot::record)
            }
            Probe::Vacant(_) | Probe::Full => None,
        }
    }

    /// Like [`get`](Self::get), returning the value mutably.
    pub fn get_mut(&mut self, key: u64) -> Option<&mut V> {
        let (front, end) = self.bucket_range(key);
        match self.probe(front, end, key) {
            Probe::Hit(pos) => {
                self.promote(front, pos);
                self.slots[front].as_mut().map(|slot| &mut slot.value)
            }
            Probe::Vacant(_) | Probe::Full => None,
        }
    }

    /// Looks up `key` without touching recency.
    pub fn peek(&self, key: u64) -> Option<Record<'_, V>> {
        let (front, end) = self.bucket_range(key);
        match self.probe(front, end, key) {
            Probe::Hit(pos) => self.slots[pos].as_ref().map(Slot::record),
            Probe::Vacant(_) | Probe::Full => None,
        }
    }

    pub fn contains(&self, key: u64) -> bool {
        self.peek(key).is_some()
    }

    /// Removes `key` and returns its value. Later slots of the bucket shift
    /// one position toward the front so the bucket stays packed.
    pub fn remove(&mut self, key: u64) -> Option<V> {
        let (front, end) = self.bucket_range(key);
        match self.probe(front, end, key) {
            Probe::Hit(pos) => {
                let removed = self.slots[pos].take();
                self.slots[pos..end].rotate_left(1);
                self.len -= 1;
                removed.map(|slot| slot.value)
            }
            Probe::Vacant(_) | Probe::Full => None,
        }
    }

    /// The entry stored at array position `position`, if any. This is how
    /// position-indexed caches address their entries.
    pub fn slot_at(&self, position: usize) -> Option<Record<'_, V>> {
        self.slots.get(position)?.as_ref().map(Slot::record)
    }

    /// Occupied slots in array order as `(position, record)` pairs. Within a
    /// bucket this is most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Record<'_, V>)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(pos, slot)| slot.as_ref().map(|slot| (pos, slot.record())))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Empties every slot. The eviction callback is not invoked.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.len = 0;
    }
}

impl<V, M: KeyMode> Cache<V> for ArrayLruCache<V, M> {
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

impl<V, M: KeyMode> fmt::Debug for ArrayLruCache<V, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayLruCache")
            .field("geometry", &self.geometry)
            .field("mode", &M::NAME)
            .field("len", &self.len)
            .field("evicting", &self.is_evicting())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lru::Lru;
    use crate::mode::PositionIndexed;
    use parking_lot::Mutex;
    use proptest::prelude::*;
    use std::sync::Arc;

    type Evictions = Arc<Mutex<Vec<(u64, String)>>>;

    fn recording_cache(capacity: usize, collisions: usize) -> (ArrayLruCache<String>, Evictions) {
        let evictions: Evictions = Arc::default();
        let sink = Arc::clone(&evictions);
        let cache = ArrayLruCache::with_options(
            capacity,
            LruOptions::new()
                .collisions(collisions)
                .on_evict(move |key, value| sink.lock().push((key, value))),
        )
        .unwrap();
        (cache, evictions)
    }

    // First `count` keys that share a bucket with key 0.
    fn colliding_keys<V, M: KeyMode>(cache: &ArrayLruCache<V, M>, count: usize) -> Vec<u64> {
        let bucket = cache.bucket_index(0);
        (0u64..)
            .filter(|&key| cache.bucket_index(key) == bucket)
            .take(count)
            .collect()
    }

    fn bucket_keys<V, M: KeyMode>(cache: &ArrayLruCache<V, M>, key: u64) -> Vec<Option<u64>> {
        let (front, end) = cache.bucket_range(key);
        (front..end)
            .map(|pos| cache.slot_at(pos).and_then(|record| record.key))
            .collect()
    }

    #[test]
    fn test_basic_operations() {
        let mut cache = ArrayLruCache::new(16).unwrap();
        assert!(cache.is_empty());

        cache.set(1, "one".to_string());
        cache.set(2, "two".to_string());
        assert_eq!(cache.len(), 2);

        assert_eq!(cache.get(1).map(|r| r.value.clone()), Some("one".to_string()));
        assert_eq!(cache.get(2).map(|r| r.key), Some(Some(2)));
        assert!(cache.get(3).is_none());
    }

    #[test]
    fn test_concrete_geometry() {
        let cache = ArrayLruCache::<u32>::with_options(16, LruOptions::new().collisions(4)).unwrap();
        assert_eq!(cache.geometry().collisions(), 4);
        assert_eq!(cache.geometry().buckets(), 4);
        assert_eq!(cache.capacity(), 16);
        assert!(!cache.is_evicting());
    }

    #[test]
    fn test_update_existing() {
        let mut cache = ArrayLruCache::new(16).unwrap();
        cache.set(9, "v1");
        cache.set(9, "v2");

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(9).map(|r| *r.value), Some("v2"));
        let occurrences = bucket_keys(&cache, 9)
            .into_iter()
            .filter(|key| *key == Some(9))
            .count();
        assert_eq!(occurrences, 1);
    }

    #[test]
    fn test_set_promotes_to_front() {
        let mut cache = ArrayLruCache::new(16).unwrap();
        let keys = colliding_keys(&cache, 3);
        for &key in &keys {
            cache.set(key, key);
        }
        assert_eq!(
            bucket_keys(&cache, keys[0]),
            vec![Some(keys[2]), Some(keys[1]), Some(keys[0]), None]
        );

        cache.set(keys[0], 100);
        assert_eq!(
            bucket_keys(&cache, keys[0]),
            vec![Some(keys[0]), Some(keys[2]), Some(keys[1]), None]
        );
    }

    #[test]
    fn test_full_bucket_evicts_least_recent() {
        let (mut cache, evictions) = recording_cache(16, 4);
        let keys = colliding_keys(&cache, 6);

        for &key in &keys[..4] {
            cache.set(key, format!("v{key}"));
        }
        assert!(evictions.lock().is_empty());

        cache.set(keys[4], format!("v{}", keys[4]));
        assert_eq!(*evictions.lock(), vec![(keys[0], format!("v{}", keys[0]))]);

        cache.set(keys[5], format!("v{}", keys[5]));
        assert_eq!(evictions.lock().len(), 2);
        assert_eq!(evictions.lock()[1].0, keys[1]);

        assert!(cache.get(keys[0]).is_none());
        assert!(cache.get(keys[1]).is_none());
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn test_get_protects_from_eviction() {
        let (mut cache, evictions) = recording_cache(16, 4);
        let keys = colliding_keys(&cache, 5);
        for &key in &keys[..4] {
            cache.set(key, key.to_string());
        }

        // keys[0] is least recent; reading it makes keys[1] the next victim.
        assert!(cache.get(keys[0]).is_some());
        cache.set(keys[4], keys[4].to_string());

        assert_eq!(evictions.lock()[0].0, keys[1]);
        assert!(cache.get(keys[0]).is_some());
    }

    #[test]
    fn test_miss_does_not_reorder() {
        let mut cache = ArrayLruCache::new(16).unwrap();
        let keys = colliding_keys(&cache, 5);
        for &key in &keys[..4] {
            cache.set(key, key);
        }
        let before = bucket_keys(&cache, keys[0]);

        assert!(cache.get(keys[4]).is_none());
        assert!(cache.get_mut(keys[4]).is_none());
        assert_eq!(bucket_keys(&cache, keys[0]), before);
    }

    #[test]
    fn test_peek_does_not_promote() {
        let mut cache = ArrayLruCache::new(16).unwrap();
        let keys = colliding_keys(&cache, 2);
        cache.set(keys[0], 'a');
        cache.set(keys[1], 'b');

        assert_eq!(cache.peek(keys[0]).map(|r| *r.value), Some('a'));
        assert!(cache.contains(keys[0]));
        assert_eq!(bucket_keys(&cache, keys[0])[0], Some(keys[1]));
    }

    #[test]
    fn test_get_mut() {
        let mut cache = ArrayLruCache::new(8).unwrap();
        cache.set(5, vec![1]);
        cache.get_mut(5).unwrap().push(2);
        assert_eq!(cache.get(5).map(|r| r.value.clone()), Some(vec![1, 2]));
    }

    #[test]
    fn test_remove_keeps_bucket_packed() {
        let mut cache = ArrayLruCache::new(16).unwrap();
        let keys = colliding_keys(&cache, 4);
        for &key in &keys {
            cache.set(key, key);
        }

        assert_eq!(cache.remove(keys[2]), Some(keys[2]));
        assert_eq!(cache.remove(keys[2]), None);
        assert_eq!(cache.len(), 3);
        assert_eq!(
            bucket_keys(&cache, keys[0]),
            vec![Some(keys[3]), Some(keys[1]), Some(keys[0]), None]
        );
        // Still reachable past the hole that was closed.
        assert_eq!(cache.get(keys[0]).map(|r| *r.value), Some(keys[0]));
    }

    #[test]
    fn test_clear() {
        let (mut cache, evictions) = recording_cache(16, 4);
        cache.set(1, "one".to_string());
        cache.set(2, "two".to_string());
        cache.clear();

        assert!(cache.is_empty());
        assert!(cache.get(1).is_none());
        assert!(cache.iter().next().is_none());
        assert!(evictions.lock().is_empty());
    }

    #[test]
    fn test_iter_reports_positions() {
        let mut cache = ArrayLruCache::new(16).unwrap();
        cache.set(3, 30);
        let entries: Vec<_> = cache.iter().map(|(pos, r)| (pos, r.key, *r.value)).collect();
        let front = cache.geometry().bucket_start(cache.bucket_index(3));
        assert_eq!(entries, vec![(front, Some(3), 30)]);
    }

    #[test]
    fn test_tiny_capacity() {
        let mut cache = ArrayLruCache::new(0).unwrap();
        assert_eq!(cache.capacity(), 4);
        for key in 0..4 {
            cache.set(key, key);
        }
        assert_eq!(cache.len(), 4);
        cache.set(4, 4);
        assert_eq!(cache.len(), 4);
        assert!(cache.get(0).is_none());
    }

    #[test]
    fn test_huge_capacity_is_config_error() {
        // The geometry is representable, the slot array in bytes is not.
        let geometry = Geometry::new(1usize << 62, 4).unwrap();
        assert_eq!(geometry.size(), 1usize << 62);

        let result = ArrayLruCache::<u64>::new(1usize << 62);
        assert!(matches!(
            result,
            Err(ConfigError::CapacityOverflow { capacity, .. }) if capacity == 1usize << 62
        ));

        let result = Lru::<String>::init(usize::MAX / 2, LruOptions::new().key_stored(false));
        assert!(matches!(result, Err(ConfigError::CapacityOverflow { .. })));
    }

    #[test]
    fn test_mode_mismatch() {
        let result = ArrayLruCache::<u8, KeyStored>::with_options(16, LruOptions::new().key_stored(false));
        assert!(matches!(
            result,
            Err(ConfigError::ModeMismatch { requested: false, .. })
        ));
    }

    #[test]
    fn test_position_indexed_mode() {
        let evictions = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&evictions);
        let mut cache = ArrayLruCache::<&str, PositionIndexed>::with_options(
            4,
            LruOptions::new()
                .key_stored(false)
                .on_evict(move |position, value| sink.lock().push((position, value))),
        )
        .unwrap();

        for (key, value) in [(0, "a"), (1, "b"), (2, "c"), (3, "d")] {
            cache.set(key, value);
        }
        // Keys are not recorded, so lookups by key never hit.
        assert!(cache.get(0).is_none());
        assert_eq!(cache.slot_at(0).map(|r| (r.key, *r.value)), Some((None, "d")));
        assert_eq!(cache.slot_at(3).map(|r| *r.value), Some("a"));

        cache.set(0, "e");
        assert_eq!(*evictions.lock(), vec![(3, "a")]);
        assert_eq!(cache.slot_at(0).map(|r| *r.value), Some("e"));
        assert_eq!(cache.len(), 4);
    }

    proptest! {
        #[test]
        fn set_then_get_round_trips(key in any::<u64>(), value in any::<u32>()) {
            let mut cache = ArrayLruCache::new(1024).unwrap();
            cache.set(key, value);
            prop_assert_eq!(cache.get(key).map(|r| *r.value), Some(value));
        }

        #[test]
        fn buckets_stay_packed_and_unique(ops in proptest::collection::vec((0u64..64, any::<bool>()), 0..200)) {
            let mut cache = ArrayLruCache::new(16).unwrap();
            for (key, insert) in ops {
                if insert {
                    cache.set(key, key);
                } else {
                    cache.remove(key);
                }
            }
            let collisions = cache.geometry().collisions();
            let mut seen = std::collections::HashSet::new();
            for bucket in 0..cache.geometry().buckets() {
                let front = cache.geometry().bucket_start(bucket);
                let occupied: Vec<bool> = (front..front + collisions)
                    .map(|pos| cache.slot_at(pos).is_some())
                    .collect();
                prop_assert!(occupied.windows(2).all(|w| w[0] || !w[1]));
                for pos in front..front + collisions {
                    if let Some(record) = cache.slot_at(pos) {
                        let key = record.key.unwrap();
                        prop_assert_eq!(cache.bucket_index(key), bucket);
                        prop_assert!(seen.insert(key));
                    }
                }
            }
            prop_assert_eq!(seen.len(), cache.len());
        }
    }
}
