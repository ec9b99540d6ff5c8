/*!
 * Process-wide Gateway
 *
 * One default `ExceptionAllocator` for runtimes that want a single named
 * allocation path instead of threading a gateway through every call site.
 * Install it at startup: the lazy fallback reserves its pool on first use,
 * which may be the moment an error is already being raised.
 */

use super::ExceptionAllocator;
use crate::core::errors::{
    contract_violation, AllocError, AllocResult, ConfigError, ContractViolation,
};
use crate::core::types::{Alignment, AllocationTag, Size};
use crate::memory::{PoolConfig, PoolStats};
use std::ptr::NonNull;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;
use tracing::{error, info, instrument, warn};

static GLOBAL: OnceLock<ExceptionAllocator> = OnceLock::new();

/// Set once a lazy install has failed; later lookups refuse without retrying
static LAZY_INSTALL_FAILED: AtomicBool = AtomicBool::new(false);

/// Install the process-wide gateway
#[instrument(level = "debug", skip_all, fields(capacity = config.capacity))]
pub fn install_global(config: PoolConfig) -> Result<&'static ExceptionAllocator, ConfigError> {
    if GLOBAL.get().is_some() {
        return Err(ConfigError::AlreadyInstalled);
    }

    let gateway = ExceptionAllocator::with_config(config)?;
    let mut installed = false;
    let global = GLOBAL.get_or_init(|| {
        installed = true;
        gateway
    });
    if !installed {
        return Err(ConfigError::AlreadyInstalled);
    }

    info!(
        capacity = config.capacity,
        slot_size = config.slot_size,
        max_nesting = config.max_nesting,
        "Process-wide exception allocator installed"
    );
    Ok(global)
}

/// The process-wide gateway, installing one from the environment if needed
///
/// A failed lazy install is attempted only once. Every later call returns
/// [`AllocError::Unavailable`] without touching the general allocator, until
/// [`install_global`] succeeds.
#[inline]
pub fn global() -> AllocResult<&'static ExceptionAllocator> {
    if let Some(gateway) = GLOBAL.get() {
        return Ok(gateway);
    }
    if LAZY_INSTALL_FAILED.load(Ordering::Acquire) {
        return Err(AllocError::Unavailable);
    }
    install_default()
}

#[cold]
fn install_default() -> AllocResult<&'static ExceptionAllocator> {
    let config = PoolConfig::from_env().unwrap_or_else(|error| {
        warn!(%error, "Ignoring invalid exception pool environment");
        PoolConfig::default()
    });

    match install_global(config) {
        Ok(gateway) => Ok(gateway),
        // Lost the race to another thread
        Err(ConfigError::AlreadyInstalled) => GLOBAL.get().ok_or(AllocError::Unavailable),
        Err(error) => {
            LAZY_INSTALL_FAILED.store(true, Ordering::Release);
            error!(%error, "Failed to reserve process-wide exception pool");
            Err(AllocError::Unavailable)
        }
    }
}

/// Statistics of the installed gateway, if any
pub fn global_stats() -> Option<PoolStats> {
    GLOBAL.get().map(ExceptionAllocator::stats)
}

/// Acquire error-object storage from the process-wide gateway
#[inline]
pub fn exception_acquire(
    size: Size,
    align: Alignment,
    tag: AllocationTag,
) -> AllocResult<NonNull<u8>> {
    global()?.acquire(size, align, tag)
}

/// Release storage obtained from [`exception_acquire`]
///
/// # Safety
///
/// `block` must come from `exception_acquire` with exactly `size` and
/// `align` and must not have been released already. Null is a contract
/// violation.
#[inline]
pub unsafe fn exception_release(block: *mut u8, size: Size, align: Alignment, tag: AllocationTag) {
    let Some(block) = NonNull::new(block) else {
        contract_violation(ContractViolation::NullBlock);
    };
    match GLOBAL.get() {
        Some(gateway) => gateway.release(block, size, align, tag),
        None => contract_violation(ContractViolation::ForeignBlock {
            address: block.as_ptr() as usize,
        }),
    }
}
