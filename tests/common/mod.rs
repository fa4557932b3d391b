//! Shared test utilities

pub mod fixtures;
pub mod mock_code_host;
pub mod mock_vcs;
