/*!
 * Monitoring
 * Tracing setup and pool reporting
 */

mod tracer;

pub use tracer::{init_tracing, report_pool};
