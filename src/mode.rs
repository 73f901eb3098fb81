//! How a slot carries the identity of its entry.
//!
//! [`KeyStored`] keeps the key inside the slot, so lookups compare keys.
//! [`PositionIndexed`] keeps no key at all: the slot's array position is the
//! identity, lookups by key never match, and callers address entries with
//! [`ArrayLruCache::slot_at`](crate::ArrayLruCache::slot_at).
//!
//! Either way the eviction callback receives `(identity, value)`, where the
//! identity is the evicted key or the evicted slot's position respectively.

use std::fmt::Debug;

mod private {
    pub trait Sealed {}
    impl Sealed for super::KeyStored {}
    impl Sealed for super::PositionIndexed {}
}

/// Key representation of a cache, fixed by its type.
pub trait KeyMode: private::Sealed + 'static {
    /// What a slot stores next to its value.
    type Stored: Copy + Debug;

    /// Whether this mode records keys, as set by `LruOptions::key_stored`.
    const KEY_STORED: bool;

    /// Human readable name used in errors and logs.
    const NAME: &'static str;

    /// What a new slot for `key` keeps.
    fn store(key: u64) -> Self::Stored;

    /// Whether a slot holding `stored` belongs to `key`.
    fn matches(stored: &Self::Stored, key: u64) -> bool;

    /// The key reported in a [`Record`](crate::Record), if the mode keeps one.
    fn key_of(stored: &Self::Stored) -> Option<u64>;

    /// Identity reported to the eviction callback for a slot at `position`.
    fn evicted_identity(stored: &Self::Stored, position: usize) -> u64;
}

/// Slots record the key that produced them. The default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyStored;

/// Slots hold only a value; array position is the identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PositionIndexed;

impl KeyMode for KeyStored {
    type Stored = u64;

    const KEY_STORED: bool = true;
    const NAME: &'static str = "key-stored";

    #[inline]
    fn store(key: u64) -> u64 {
        key
    }

    #[inline]
    fn matches(stored: &u64, key: u64) -> bool {
        *stored == key
    }

    #[inline]
    fn key_of(stored: &u64) -> Option<u64> {
        Some(*stored)
    }

    #[inline]
    fn evicted_identity(stored: &u64, _position: usize) -> u64 {
        *stored
    }
}

impl KeyMode for PositionIndexed {
    type Stored = ();

    const KEY_STORED: bool = false;
    const NAME: &'static str = "position-indexed";

    #[inline]
    fn store(_key: u64) {}

    #[inline]
    fn matches(_stored: &(), _key: u64) -> bool {
        false
    }

    #[inline]
    fn key_of(_stored: &()) -> Option<u64> {
        None
    }

    #[inline]
    fn evicted_identity(_stored: &(), position: usize) -> u64 {
        position as u64
    }
}
