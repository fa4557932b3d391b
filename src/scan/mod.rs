//! Project-wide scan
//!
//! Lists every repository in the merged repository's project and reconciles
//! them one after another.

mod driver;
mod progress;

pub use driver::{scan, ScanReport};
pub use progress::{NoopProgress, ScanProgress, TracingProgress};
