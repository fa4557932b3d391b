//! CLI commands
//!
//! Command implementations for the `submodule-bot` binary.

mod auth;
mod progress;
mod scan;
mod serve;
pub mod style;

pub use auth::{run_auth_setup, run_auth_test};
pub use scan::{run_scan, ScanOptions};
pub use serve::{run_serve, ServeOptions};
