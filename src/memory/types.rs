/*!
 * Pool Types
 * Statistics and pressure levels for exception storage
 */

use crate::core::types::{Alignment, Size};
use serde::{Deserialize, Serialize};

/// Point-in-time pool statistics
///
/// Counters are read individually, so a snapshot taken while other threads
/// acquire or release may be slightly inconsistent. Quiescent snapshots are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    pub capacity: usize,
    pub available: usize,
    pub outstanding: usize,
    pub high_water: usize,
    pub total_acquires: u64,
    pub failed_acquires: u64,
    pub slot_size: Size,
    pub slot_align: Alignment,
}

impl PoolStats {
    pub fn usage_percentage(&self) -> f64 {
        if self.capacity == 0 {
            return 100.0;
        }
        (self.outstanding as f64 / self.capacity as f64) * 100.0
    }

    pub fn pressure(&self) -> PoolPressure {
        let usage = self.usage_percentage();
        if usage >= 95.0 {
            PoolPressure::Critical
        } else if usage >= 80.0 {
            PoolPressure::High
        } else if usage >= 60.0 {
            PoolPressure::Medium
        } else {
            PoolPressure::Low
        }
    }

    pub fn is_saturated(&self) -> bool {
        self.available == 0
    }
}

/// Pool pressure levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolPressure {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for PoolPressure {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            PoolPressure::Low => write!(f, "LOW"),
            PoolPressure::Medium => write!(f, "MEDIUM"),
            PoolPressure::High => write!(f, "HIGH"),
            PoolPressure::Critical => write!(f, "CRITICAL"),
        }
    }
}
