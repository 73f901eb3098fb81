use std::fmt;

use crate::error::Result;
use crate::geometry::{Geometry, DEFAULT_COLLISIONS};
use crate::lru::Lru;

/// Eviction callback: `(identity, evicted value)`.
pub type EvictFn<V> = Box<dyn FnMut(u64, V) + Send + 'static>;

/// Construction options for a cache.
///
/// # Examples
///
/// ```rust
/// use array_lru::LruOptions;
///
/// let cache = LruOptions::<String>::new()
///     .collisions(8)
///     .on_evict(|key, value| println!("evicted {key} => {value}"))
///     .build(1024)
///     .unwrap();
/// assert_eq!(cache.geometry().collisions(), 8);
/// ```
pub struct LruOptions<V> {
    pub(crate) collisions: Option<usize>,
    pub(crate) bucket_size: Option<usize>,
    pub(crate) key_stored: Option<bool>,
    pub(crate) on_evict: Option<EvictFn<V>>,
}

impl<V> Default for LruOptions<V> {
    fn default() -> Self {
        Self {
            collisions: None,
            bucket_size: None,
            key_stored: None,
            on_evict: None,
        }
    }
}

impl<V> LruOptions<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slots per bucket. Takes precedence over [`bucket_size`](Self::bucket_size).
    pub fn collisions(mut self, collisions: usize) -> Self {
        self.collisions = Some(collisions);
        self
    }

    /// Alias for [`collisions`](Self::collisions).
    pub fn bucket_size(mut self, bucket_size: usize) -> Self {
        self.bucket_size = Some(bucket_size);
        self
    }

    /// `false` selects position-indexed mode. Defaults to `true`.
    pub fn key_stored(mut self, key_stored: bool) -> Self {
        self.key_stored = Some(key_stored);
        self
    }

    /// Called synchronously inside `set` whenever a full bucket drops its
    /// least recently used entry.
    pub fn on_evict<F>(mut self, on_evict: F) -> Self
    where
        F: FnMut(u64, V) + Send + 'static,
    {
        self.on_evict = Some(Box::new(on_evict));
        self
    }

    /// Effective collision degree.
    pub fn collision_degree(&self) -> usize {
        self.collisions
            .or(self.bucket_size)
            .unwrap_or(DEFAULT_COLLISIONS)
    }

    pub fn is_key_stored(&self) -> bool {
        self.key_stored.unwrap_or(true)
    }

    pub(crate) fn geometry(&self, max_capacity: usize) -> Result<Geometry> {
        Geometry::new(max_capacity, self.collision_degree())
    }

    /// Builds a cache for at least `max_capacity` entries in the selected mode.
    pub fn build(self, max_capacity: usize) -> Result<Lru<V>> {
        Lru::init(max_capacity, self)
    }
}

impl<V> fmt::Debug for LruOptions<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruOptions")
            .field("collisions", &self.collisions)
            .field("bucket_size", &self.bucket_size)
            .field("key_stored", &self.key_stored)
            .field("on_evict", &self.on_evict.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[test]
    fn test_defaults() {
        let opts = LruOptions::<u32>::new();
        assert_eq!(opts.collision_degree(), DEFAULT_COLLISIONS);
        assert!(opts.is_key_stored());
        assert!(opts.on_evict.is_none());
    }

    #[test]
    fn test_collisions_take_precedence() {
        let opts = LruOptions::<u32>::new().bucket_size(16).collisions(2);
        assert_eq!(opts.collision_degree(), 2);

        let opts = LruOptions::<u32>::new().bucket_size(16);
        assert_eq!(opts.collision_degree(), 16);
    }

    #[test]
    fn test_zero_bucket_size_fails() {
        let result = LruOptions::<u32>::new().bucket_size(0).build(64);
        assert!(matches!(result, Err(ConfigError::ZeroCollisions)));
    }
}
