//! Key to bucket mapping.
//!
//! Buckets are addressed with a 16-bit CRC of the key, so a cache never has
//! more than [`MAX_BUCKETS`] buckets.

/// Number of buckets addressable by a 16-bit hash.
pub const MAX_BUCKETS: usize = 1 << 16;

const CRC16_POLY: u16 = 0x1021;

const CRC16_TABLE: [u16; 256] = build_table();

const fn build_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = (i as u16) << 8;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ CRC16_POLY
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// CRC-16/XMODEM of the key's little-endian bytes.
#[inline]
pub fn crc16(key: u64) -> u16 {
    key.to_le_bytes().iter().fold(0u16, |crc, &byte| {
        let idx = ((crc >> 8) as u8 ^ byte) as usize;
        (crc << 8) ^ CRC16_TABLE[idx]
    })
}

/// Bucket selector chosen once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketHash {
    /// All 65536 buckets: the CRC is the bucket index.
    Full,
    /// Fewer buckets: the CRC masked to `buckets - 1`.
    Masked(u16),
}

impl BucketHash {
    /// Picks the variant for a power-of-two bucket count in `1..=MAX_BUCKETS`.
    pub fn for_buckets(buckets: usize) -> Self {
        debug_assert!(buckets.is_power_of_two() && buckets <= MAX_BUCKETS);
        if buckets == MAX_BUCKETS {
            BucketHash::Full
        } else {
            BucketHash::Masked((buckets - 1) as u16)
        }
    }

    /// Bucket index of `key`, always below the bucket count.
    #[inline]
    pub fn index(self, key: u64) -> usize {
        match self {
            BucketHash::Full => crc16(key) as usize,
            BucketHash::Masked(mask) => (crc16(key) & mask) as usize,
        }
    }
}
