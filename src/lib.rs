//! A fixed-capacity, array-backed cache with approximate LRU eviction.
//!
//! Keys are `u64`. The cache allocates one flat array of slots up front and
//! splits it into power-of-two sized buckets. A 16-bit CRC of the key picks
//! the bucket, and recency is tracked only inside a bucket by shifting slots
//! in place, so there are no linked lists and no allocation after
//! construction.
//!
//! This crate provides:
//!
//! 1. [`ArrayLruCache`] - The cache, with the key mode fixed by its type
//! 2. [`Lru`] - The same cache with the key mode chosen by [`LruOptions`]
//! 3. [`SharedArrayLru`] - An [`Lru`] behind a `parking_lot` mutex
//!
//! # Features
//!
//! - Predictable memory footprint, sized once from a requested capacity
//! - Bounded work per operation, proportional to the bucket width
//! - Optional eviction callback invoked synchronously from `set`
//! - Key-stored or position-indexed slots
//!
//! # Examples
//!
//! ```rust
//! use array_lru::{ArrayLruCache, LruOptions};
//!
//! let mut cache: ArrayLruCache<String> = ArrayLruCache::with_options(
//!     1000,
//!     LruOptions::new()
//!         .collisions(8)
//!         .on_evict(|key, value| eprintln!("evicted {key}: {value}")),
//! )
//! .unwrap();
//!
//! cache.set(42, "answer".to_string());
//! assert_eq!(cache.get(42).map(|r| r.value.as_str()), Some("answer"));
//! assert!(cache.get(7).is_none());
//! ```

pub mod array_lru_cache;
pub mod error;
mod ffi;
pub mod geometry;
pub mod hash;
pub mod lru;
pub mod mode;
pub mod options;
pub mod shared;

pub use array_lru_cache::{ArrayLruCache, Cache, Record};
pub use error::{ConfigError, Result};
pub use geometry::Geometry;
pub use lru::Lru;
pub use mode::{KeyMode, KeyStored, PositionIndexed};
pub use options::{EvictFn, LruOptions};
pub use shared::SharedArrayLru;
