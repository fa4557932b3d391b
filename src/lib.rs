//! submodule-bot - keep git submodule pointers current across a project
//!
//! When a pull request is merged into a repository's default branch, every
//! other repository in the same Bitbucket project that pins it as a
//! submodule gets a branch moving the pointer to the merge commit and a pull
//! request for that branch.
//!
//! The pipeline is:
//! - [`server`] receives the webhook and queues a scan ([`queue`])
//! - [`scan`] walks the project's repositories one at a time
//! - [`reconcile`] inspects each repository and, if the submodule is stale,
//!   commits, pushes and opens a PR
//!
//! Code host and version control access go through the [`platform::CodeHost`]
//! and [`vcs::Vcs`] traits.

pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod platform;
pub mod queue;
pub mod reconcile;
pub mod scan;
pub mod server;
pub mod signing;
pub mod submodule;
pub mod types;
pub mod vcs;
