//! Bot configuration loaded from environment variables

use crate::auth::BitbucketAuth;
use crate::error::{Error, Result};
use std::env;
use std::path::PathBuf;

/// Default directory holding the local working copies
pub const DEFAULT_WORKING_DIR: &str = "./repos";

/// Default number of scans that may wait in the queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 16;

/// Author identity for bump commits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitIdentity {
    /// `user.name`
    pub name: String,
    /// `user.email`
    pub email: String,
}

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Bitbucket credentials for REST and git
    pub auth: BitbucketAuth,
    /// Commit author identity
    pub identity: GitIdentity,
    /// GPG key ID to sign commits with
    pub signing_key_id: Option<String>,
    /// Armored GPG private key to import at startup
    pub signing_key: Option<String>,
    /// Directory holding local working copies
    pub working_dir: PathBuf,
    /// Maximum number of queued scans
    pub queue_capacity: usize,
    /// Address to bind the webhook server to
    pub host: String,
    /// Port to bind the webhook server to
    pub port: u16,
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    lookup(key)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::Config(format!("missing required environment variable {key}")))
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.trim().is_empty())
}

fn parsed<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T> {
    optional(lookup, key).map_or(Ok(default), |v| {
        v.trim()
            .parse()
            .map_err(|_| Error::Config(format!("invalid value for {key}: {v}")))
    })
}

impl BotConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration with a custom variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let auth = BitbucketAuth::from_lookup(&lookup)?;

        let identity = GitIdentity {
            name: required(&lookup, "GIT_USER_NAME")?,
            email: required(&lookup, "GIT_USER_EMAIL")?,
        };

        let queue_capacity =
            parsed(&lookup, "SUBMODULE_BOT_QUEUE_CAPACITY", DEFAULT_QUEUE_CAPACITY)?;
        if queue_capacity == 0 {
            return Err(Error::Config(
                "SUBMODULE_BOT_QUEUE_CAPACITY must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            auth,
            identity,
            signing_key_id: optional(&lookup, "SUBMODULE_BOT_PRIVATE_KEY_ID"),
            signing_key: optional(&lookup, "SUBMODULE_BOT_PRIVATE_KEY"),
            working_dir: optional(&lookup, "SUBMODULE_BOT_WORKING_DIR")
                .map_or_else(|| PathBuf::from(DEFAULT_WORKING_DIR), PathBuf::from),
            queue_capacity,
            host: optional(&lookup, "HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parsed(&lookup, "PORT", 3000)?,
        })
    }
}
