//! Pipeline entry points for watcher operations.
//!
//! - `run_watch`: scheduled polling loop with notification delivery
//! - `run_check_once`: single fetch/extract cycle printed to stdout

pub mod check;
pub mod watch;

pub use check::run_check_once;
pub use watch::run_watch;
