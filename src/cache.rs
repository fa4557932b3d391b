//! Local working copy cache
//!
//! One clone per repository name under a root directory, created on first
//! use and reused by later scans.

use crate::error::Result;
use crate::vcs::Vcs;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::info;

/// Tracks which repositories already have a local working copy
#[derive(Debug)]
pub struct RepoCache {
    root: PathBuf,
    cloned: Mutex<HashSet<String>>,
}

impl RepoCache {
    /// Create a cache rooted at `root` (created on first clone)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cloned: Mutex::new(HashSet::new()),
        }
    }

    fn known(&self) -> MutexGuard<'_, HashSet<String>> {
        self.cloned.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Working copy directory for a repository name
    pub fn dir_for(&self, repo_name: &str) -> PathBuf {
        self.root.join(repo_name)
    }

    /// Whether a working copy for `repo_name` is known to exist
    pub fn contains(&self, repo_name: &str) -> bool {
        if self.known().contains(repo_name) {
            return true;
        }

        // Survives restarts: an existing checkout on disk counts as cloned.
        if self.dir_for(repo_name).join(".git").exists() {
            self.known().insert(repo_name.to_string());
            return true;
        }

        false
    }

    /// Return the working copy for `repo_name`, cloning it first if needed
    ///
    /// `clone_url` is only evaluated when a clone is actually performed.
    pub async fn ensure_clone(
        &self,
        vcs: &dyn Vcs,
        repo_name: &str,
        clone_url: impl FnOnce() -> Result<String> + Send,
    ) -> Result<PathBuf> {
        let dir = self.dir_for(repo_name);
        if self.contains(repo_name) {
            return Ok(dir);
        }

        tokio::fs::create_dir_all(&self.root).await?;
        info!("Cloning [{repo_name}]...");
        vcs.clone_repo(&clone_url()?, &dir).await?;
        info!("Done [{repo_name}]");

        self.known().insert(repo_name.to_string());
        Ok(dir)
    }
}
