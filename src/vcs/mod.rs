//! Version control operations
//!
//! Every operation takes the working directory it acts on, so callers never
//! depend on a shared "current repository".

mod git;

pub use git::GitCli;

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Default remote name used for fetch and push
pub const DEFAULT_REMOTE: &str = "origin";

/// Version control capability used by the reconciler
#[async_trait]
pub trait Vcs: Send + Sync {
    /// Clone `url` into `dest`
    async fn clone_repo(&self, url: &str, dest: &Path) -> Result<()>;

    /// Reset the working copy to the latest remote state of `branch`
    async fn pull(&self, dir: &Path, remote: &str, branch: &str) -> Result<()>;

    /// Initialize and update all submodules recursively
    async fn submodule_init_recursive(&self, dir: &Path) -> Result<()>;

    /// Read config entries from `file` whose keys match `key_pattern`
    async fn read_config(&self, dir: &Path, file: &str, key_pattern: &str) -> Result<Vec<String>>;

    /// List `git submodule status` lines
    async fn submodule_status(&self, dir: &Path) -> Result<Vec<String>>;

    /// Check out a ref or commit
    async fn checkout(&self, dir: &Path, reference: &str) -> Result<()>;

    /// Fetch from the default remote
    async fn fetch(&self, dir: &Path) -> Result<()>;

    /// Stage all changes
    async fn stage_all(&self, dir: &Path) -> Result<()>;

    /// Set a repository-local config value
    async fn set_config(&self, dir: &Path, key: &str, value: &str) -> Result<()>;

    /// Commit staged changes, signing with `signing_key` when given
    async fn commit(&self, dir: &Path, message: &str, signing_key: Option<&str>) -> Result<()>;

    /// Push `refspec` to `remote`
    async fn push(&self, dir: &Path, remote: &str, refspec: &str) -> Result<()>;

    /// Commit the submodule at `path` is pinned to on `remote`'s `branch`
    ///
    /// `None` when the branch does not exist on the remote or has no
    /// submodule at `path`.
    async fn remote_pinned_commit(
        &self,
        dir: &Path,
        remote: &str,
        branch: &str,
        path: &str,
    ) -> Result<Option<String>>;
}
