use thiserror::Error;

/// Result type for cache construction.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Configuration mistakes detected while initializing a cache.
///
/// Normal operation never fails: a miss is `None`, an eviction is reported
/// through the eviction callback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The collision degree (bucket size) was zero.
    #[error("collision degree must be at least 1")]
    ZeroCollisions,

    /// Rounding the requested capacity to power-of-two boundaries overflowed `usize`.
    #[error("capacity {capacity} with collision degree {collisions} overflows usize")]
    CapacityOverflow { capacity: usize, collisions: usize },

    /// The options asked for a key mode the cache type cannot provide.
    #[error("options request key_stored = {requested}, but the cache type is {mode}")]
    ModeMismatch {
        requested: bool,
        mode: &'static str,
    },
}
