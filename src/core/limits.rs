/*!
 * Pool Limits and Constants
 *
 * Centralized defaults for the exception allocation path.
 * Performance-sensitive values are marked with [PERF].
 */

// =============================================================================
// SLOT GEOMETRY
// =============================================================================

/// Default slot size (256 bytes)
/// Large enough for a typical error object plus its unwinding header
pub const DEFAULT_SLOT_SIZE: usize = 256;

/// Default slot alignment (16 bytes)
/// Matches the strictest fundamental alignment on mainstream 64-bit targets
pub const DEFAULT_SLOT_ALIGN: usize = 16;

/// Default number of slots
/// Upper bound on simultaneously in-flight error objects across all threads
pub const DEFAULT_POOL_CAPACITY: usize = 64;

/// Largest slab a single pool may reserve (64MB)
pub const MAX_SLAB_BYTES: usize = 64 * 1024 * 1024;

// =============================================================================
// RE-ENTRANCY
// =============================================================================

/// Default per-thread nesting limit for gateway acquisitions
/// An error raised while acquiring storage for an error raised while...
pub const DEFAULT_MAX_NESTING: u32 = 4;

// =============================================================================
// DEBUG AIDS
// =============================================================================

/// Byte written over released slots in debug builds
/// [PERF] Skipped entirely in release builds
pub const FREED_SLOT_POISON: u8 = 0xDD;

// =============================================================================
// ENVIRONMENT
// =============================================================================

pub const ENV_SLOT_SIZE: &str = "EXCEPT_POOL_SLOT_SIZE";
pub const ENV_SLOT_ALIGN: &str = "EXCEPT_POOL_SLOT_ALIGN";
pub const ENV_CAPACITY: &str = "EXCEPT_POOL_CAPACITY";
pub const ENV_MAX_NESTING: &str = "EXCEPT_POOL_MAX_NESTING";

/// Set to `1` or `true` for JSON trace output
pub const ENV_TRACE_JSON: &str = "EXCEPT_TRACE_JSON";
