//! Code host service factory
//!
//! Webhook payloads name the Bitbucket instance they came from, so services
//! are created per host.

use crate::auth::BitbucketAuth;
use crate::error::Result;
use crate::platform::{BitbucketService, CodeHost};
use std::sync::Arc;

/// Creates a [`CodeHost`] for a given host name
pub trait CodeHostFactory: Send + Sync {
    /// Connect to the code host at `host`
    fn connect(&self, host: &str) -> Result<Arc<dyn CodeHost>>;
}

/// Factory producing [`BitbucketService`] clients sharing one set of credentials
#[derive(Debug, Clone)]
pub struct BitbucketFactory {
    auth: BitbucketAuth,
}

impl BitbucketFactory {
    /// Create a factory using `auth` for every host
    pub const fn new(auth: BitbucketAuth) -> Self {
        Self { auth }
    }
}

impl CodeHostFactory for BitbucketFactory {
    fn connect(&self, host: &str) -> Result<Arc<dyn CodeHost>> {
        Ok(Arc::new(BitbucketService::new(host, self.auth.clone())))
    }
}
