//! Pipeline entry points for watcher operations.
//!
//! - `run_watcher`: Fetch the board, reconcile against the watermark, notify, persist
//! - `fetch_batch`: Fetch and extract once with retries
//! - `run_validate`: Check a configuration file

pub mod reconcile;
pub mod retry;
pub mod validate;
pub mod watch;

pub use reconcile::{Reconciliation, Transition, reconcile};
pub use retry::RetryPolicy;
pub use validate::run_validate;
pub use watch::{RunSummary, fetch_batch, run_watcher, run_with_config};
