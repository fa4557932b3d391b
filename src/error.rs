//! Error types for submodule-bot

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reconciling submodules
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP transport error talking to the code host
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Bitbucket returned an error response
    #[error("Bitbucket API error: {0}")]
    BitbucketApi(String),

    /// A git command exited unsuccessfully
    #[error("git {command} failed in {dir}: {stderr}")]
    Git {
        /// The git subcommand and its arguments
        command: String,
        /// Working directory the command ran in
        dir: PathBuf,
        /// Captured stderr (trimmed)
        stderr: String,
    },

    /// A located submodule has no entry in `git submodule status`
    #[error("submodule at {path} is declared in {repo} but not initialized")]
    SubmoduleNotInitialized {
        /// Candidate repository name
        repo: String,
        /// Declared submodule path
        path: String,
    },

    /// Repository has no usable HTTP clone link
    #[error("no http clone link for repository {0}")]
    NoCloneUrl(String),

    /// Invalid or missing configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Authentication error
    #[error("authentication error: {0}")]
    Auth(String),

    /// Failed to parse input (webhook payload, URL, command output)
    #[error("parse error: {0}")]
    Parse(String),

    /// Scan queue is at capacity
    #[error("scan queue is full")]
    QueueFull,

    /// Scan queue worker has shut down
    #[error("scan queue is closed")]
    QueueClosed,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for submodule-bot operations
pub type Result<T> = std::result::Result<T, Error>;
