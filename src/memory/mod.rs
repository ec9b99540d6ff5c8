/*!
 * Memory Module
 * Backing strategies for exception storage
 */

pub mod config;
pub mod pool;
pub mod system;
pub mod traits;
pub mod types;

// Re-export for convenience
pub use config::PoolConfig;
pub use pool::SlotPool;
pub use system::SystemDelegate;
pub use traits::*;
pub use types::*;
