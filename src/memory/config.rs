/*!
 * Pool Configuration
 *
 * Slot geometry and nesting limits for the default backing strategy
 */

use crate::core::errors::ConfigError;
use crate::core::limits::{
    DEFAULT_MAX_NESTING, DEFAULT_POOL_CAPACITY, DEFAULT_SLOT_ALIGN, DEFAULT_SLOT_SIZE,
    ENV_CAPACITY, ENV_MAX_NESTING, ENV_SLOT_ALIGN, ENV_SLOT_SIZE, MAX_SLAB_BYTES,
};
use crate::core::types::{Alignment, Size};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Slot pool configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Largest request a slot can hold
    pub slot_size: Size,
    /// Alignment of every slot (power of two)
    pub slot_align: Alignment,
    /// Number of slots reserved up front
    pub capacity: usize,
    /// Gateway acquisitions a single thread may nest
    pub max_nesting: u32,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            slot_size: DEFAULT_SLOT_SIZE,
            slot_align: DEFAULT_SLOT_ALIGN,
            capacity: DEFAULT_POOL_CAPACITY,
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }
}

impl PoolConfig {
    /// Small footprint for constrained targets
    pub const fn compact() -> Self {
        Self {
            slot_size: 128,
            slot_align: 8,
            capacity: 8,
            max_nesting: 2,
        }
    }

    /// Headroom for heavily threaded runtimes with large error payloads
    pub const fn generous() -> Self {
        Self {
            slot_size: 1024,
            slot_align: 64,
            capacity: 256,
            max_nesting: 8,
        }
    }

    pub const fn with_slot_size(mut self, slot_size: Size) -> Self {
        self.slot_size = slot_size;
        self
    }

    pub const fn with_slot_align(mut self, slot_align: Alignment) -> Self {
        self.slot_align = slot_align;
        self
    }

    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub const fn with_max_nesting(mut self, max_nesting: u32) -> Self {
        self.max_nesting = max_nesting;
        self
    }

    /// Distance between consecutive slot starts
    ///
    /// Never zero, so zero-size acquisitions land at distinct addresses.
    pub fn stride(&self) -> Size {
        let align = self.slot_align.max(1);
        self.slot_size.max(1).div_ceil(align) * align
    }

    /// Total bytes reserved for the slab
    pub fn slab_bytes(&self) -> Option<usize> {
        self.stride().checked_mul(self.capacity)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.slot_size == 0 {
            return Err(ConfigError::ZeroSlotSize);
        }
        if !self.slot_align.is_power_of_two() {
            return Err(ConfigError::InvalidAlignment(self.slot_align));
        }
        if self.max_nesting == 0 {
            return Err(ConfigError::ZeroNesting);
        }
        match self.slab_bytes() {
            Some(bytes) if bytes <= MAX_SLAB_BYTES => Ok(()),
            Some(bytes) => Err(ConfigError::SlabTooLarge {
                requested: bytes,
                limit: MAX_SLAB_BYTES,
            }),
            None => Err(ConfigError::SlabTooLarge {
                requested: usize::MAX,
                limit: MAX_SLAB_BYTES,
            }),
        }
    }

    /// Defaults overlaid with `EXCEPT_POOL_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Defaults overlaid with values from `lookup`, keyed by env var name
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = parse_var(&lookup, ENV_SLOT_SIZE)? {
            config.slot_size = value;
        }
        if let Some(value) = parse_var(&lookup, ENV_SLOT_ALIGN)? {
            config.slot_align = value;
        }
        if let Some(value) = parse_var(&lookup, ENV_CAPACITY)? {
            config.capacity = value;
        }
        if let Some(value) = parse_var(&lookup, ENV_MAX_NESTING)? {
            config.max_nesting = value;
        }

        config.validate()?;
        debug!(
            slot_size = config.slot_size,
            slot_align = config.slot_align,
            capacity = config.capacity,
            max_nesting = config.max_nesting,
            "Loaded exception pool configuration"
        );
        Ok(config)
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { var, value: raw }),
    }
}
