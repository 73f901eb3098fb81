//! Bucket layout derived from a requested capacity.

use crate::error::{ConfigError, Result};
use crate::hash::MAX_BUCKETS;

/// Default number of slots per bucket.
pub const DEFAULT_COLLISIONS: usize = 4;

/// Fixed layout of a cache: `buckets` runs of `collisions` slots each.
///
/// Both counts are powers of two and `buckets <= 65536`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    buckets: usize,
    collisions: usize,
}

impl Geometry {
    /// Derives the layout for at least `max_capacity` entries.
    ///
    /// The collision degree is rounded up to a power of two. The bucket count is
    /// the smallest power of two holding `max_capacity` entries, and never less
    /// than one bucket. When that needs more buckets than a 16-bit hash can
    /// address, buckets are halved and collisions doubled until it fits.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroCollisions`] for a zero collision degree and
    /// [`ConfigError::CapacityOverflow`] when rounding overflows `usize`.
    pub fn new(max_capacity: usize, collisions: usize) -> Result<Self> {
        if collisions == 0 {
            return Err(ConfigError::ZeroCollisions);
        }
        let overflow = ConfigError::CapacityOverflow {
            capacity: max_capacity,
            collisions,
        };

        let mut collisions = collisions
            .checked_next_power_of_two()
            .ok_or_else(|| overflow.clone())?;
        // A power of two is a multiple of `collisions` once it is at least `collisions`.
        let slots = max_capacity
            .max(1)
            .checked_next_power_of_two()
            .ok_or(overflow)?
            .max(collisions);
        let mut buckets = slots / collisions;

        while buckets > MAX_BUCKETS {
            buckets >>= 1;
            collisions <<= 1;
        }

        Ok(Self {
            buckets,
            collisions,
        })
    }

    /// Number of buckets.
    #[inline]
    pub fn buckets(&self) -> usize {
        self.buckets
    }

    /// Slots per bucket.
    #[inline]
    pub fn collisions(&self) -> usize {
        self.collisions
    }

    /// Total slot count, `buckets * collisions`.
    #[inline]
    pub fn size(&self) -> usize {
        self.buckets * self.collisions
    }

    /// Index of the first slot of `bucket`.
    #[inline]
    pub fn bucket_start(&self, bucket: usize) -> usize {
        bucket * self.collisions
    }
}
