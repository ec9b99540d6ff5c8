/*!
 * Error Types
 * Centralized error handling with thiserror and miette
 *
 * `AllocError` and `ContractViolation` are `Copy` and hold no heap data:
 * building, returning and matching on them never touches the allocator.
 */

use super::types::{Alignment, Size};
use miette::Diagnostic;
use thiserror::Error;

/// Result of a gateway acquisition
pub type AllocResult<T> = Result<T, AllocError>;

/// Preformatted report for runtimes that cannot obtain error storage
pub const OUT_OF_MEMORY_REPORT: &str = "out of memory while allocating an exception object";

/// Recoverable acquisition failures
///
/// The caller is expected to degrade to [`AllocError::fallback_report`]
/// instead of allocating anything further.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Diagnostic)]
pub enum AllocError {
    #[error("Exception pool exhausted: all {capacity} slots outstanding")]
    #[diagnostic(
        code(except_alloc::exhausted),
        help("Too many error objects are in flight. Increase the pool capacity.")
    )]
    Exhausted { capacity: usize },

    #[error("Request of {requested} bytes exceeds slot size of {slot_size} bytes")]
    #[diagnostic(
        code(except_alloc::too_large),
        help("Error objects must fit in one slot. Raise the configured slot size.")
    )]
    TooLarge { requested: Size, slot_size: Size },

    #[error("Alignment {requested} exceeds slot alignment {slot_align}")]
    #[diagnostic(
        code(except_alloc::unsupported_alignment),
        help("Raise the configured slot alignment.")
    )]
    UnsupportedAlignment {
        requested: Alignment,
        slot_align: Alignment,
    },

    #[error("Invalid layout: size {size}, alignment {align}")]
    #[diagnostic(
        code(except_alloc::invalid_layout),
        help("Alignment must be a non-zero power of two.")
    )]
    InvalidLayout { size: Size, align: Alignment },

    #[error("Nested exception allocation at depth {depth} refused")]
    #[diagnostic(
        code(except_alloc::reentrant),
        help("An error was raised while acquiring storage for another error.")
    )]
    Reentrant { depth: u32 },

    #[error("System allocator refused {size} bytes (alignment {align})")]
    #[diagnostic(code(except_alloc::system_exhausted))]
    SystemExhausted { size: Size, align: Alignment },

    #[error("Exception allocator unavailable")]
    #[diagnostic(
        code(except_alloc::unavailable),
        help("The process-wide pool could not be reserved. Install one explicitly.")
    )]
    Unavailable,
}

impl AllocError {
    /// Static report for the runtime to surface instead of the lost error object
    pub const fn fallback_report(&self) -> &'static str {
        match self {
            AllocError::Exhausted { .. } | AllocError::SystemExhausted { .. } => {
                OUT_OF_MEMORY_REPORT
            }
            AllocError::TooLarge { .. } => "exception object too large for exception storage",
            AllocError::UnsupportedAlignment { .. } | AllocError::InvalidLayout { .. } => {
                "exception object layout unsupported by exception storage"
            }
            AllocError::Reentrant { .. } => "exception raised while allocating an exception",
            AllocError::Unavailable => "exception storage unavailable",
        }
    }

    /// Whether retrying after some blocks are released could succeed
    pub const fn is_exhaustion(&self) -> bool {
        matches!(
            self,
            AllocError::Exhausted { .. } | AllocError::SystemExhausted { .. }
        )
    }
}

/// Caller-side misuse of the release contract
///
/// Never returned as a value; see [`contract_violation`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractViolation {
    #[error("exception allocation contract violated: null block released")]
    NullBlock,

    #[error("exception allocation contract violated: foreign block 0x{address:x} released")]
    ForeignBlock { address: usize },

    #[error("exception allocation contract violated: double release of 0x{address:x}")]
    DoubleRelease { address: usize },

    #[error(
        "exception allocation contract violated: size mismatch at 0x{address:x} (acquired {acquired}, released {released})"
    )]
    SizeMismatch {
        address: usize,
        acquired: Size,
        released: Size,
    },

    #[error(
        "exception allocation contract violated: alignment mismatch at 0x{address:x} (acquired {acquired}, released {released})"
    )]
    AlignmentMismatch {
        address: usize,
        acquired: Alignment,
        released: Alignment,
    },

    #[error("exception allocation contract violated: invalid layout (size {size}, alignment {align})")]
    InvalidLayout { size: Size, align: Alignment },
}

/// Surface a contract violation
///
/// Assertion semantics: panics in debug builds, aborts the process otherwise.
#[cold]
#[inline(never)]
#[track_caller]
pub fn contract_violation(violation: ContractViolation) -> ! {
    if cfg!(debug_assertions) {
        panic!("{violation}");
    }
    std::process::abort()
}

/// Pool configuration and setup errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum ConfigError {
    #[error("Pool capacity must be at least one slot")]
    #[diagnostic(code(except_alloc::config::zero_capacity))]
    ZeroCapacity,

    #[error("Slot size must be non-zero")]
    #[diagnostic(code(except_alloc::config::zero_slot_size))]
    ZeroSlotSize,

    #[error("Slot alignment {0} is not a power of two")]
    #[diagnostic(code(except_alloc::config::invalid_alignment))]
    InvalidAlignment(Alignment),

    #[error("Nesting limit must be at least one")]
    #[diagnostic(code(except_alloc::config::zero_nesting))]
    ZeroNesting,

    #[error("Slab of {requested} bytes exceeds limit of {limit} bytes")]
    #[diagnostic(
        code(except_alloc::config::slab_too_large),
        help("Reduce capacity or slot size.")
    )]
    SlabTooLarge { requested: usize, limit: usize },

    #[error("Failed to reserve {bytes} bytes for the exception pool")]
    #[diagnostic(code(except_alloc::config::reservation_failed))]
    ReservationFailed { bytes: usize },

    #[error("Invalid value {value:?} for {var}")]
    #[diagnostic(
        code(except_alloc::config::invalid_env),
        help("Pool environment variables take unsigned integers.")
    )]
    InvalidEnv { var: &'static str, value: String },

    #[error("A process-wide exception allocator is already installed")]
    #[diagnostic(code(except_alloc::config::already_installed))]
    AlreadyInstalled,
}
