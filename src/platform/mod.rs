//! Code host services
//!
//! Provides the repository, commit and pull request operations the
//! reconciler needs from Bitbucket Server.

mod bitbucket;
mod detection;
mod factory;

pub use bitbucket::BitbucketService;
pub use detection::{authenticated_clone_url, host_from_url};
pub use factory::{BitbucketFactory, CodeHostFactory};

use crate::error::Result;
use crate::types::{CommitInfo, DefaultBranch, NewPullRequest, PullRequest, TrackedRepository};
use async_trait::async_trait;

/// Code host trait for repository and PR operations
///
/// Abstracts the REST API so the reconciler can be driven against a mock in
/// tests.
#[async_trait]
pub trait CodeHost: Send + Sync {
    /// List all repositories in a project
    async fn list_repositories(&self, project_key: &str) -> Result<Vec<TrackedRepository>>;

    /// Get a repository's default branch
    async fn default_branch(&self, project_key: &str, repo_slug: &str) -> Result<DefaultBranch>;

    /// Get commit metadata, including properties such as linked issue keys
    async fn get_commit(&self, project_key: &str, repo_slug: &str, commit_id: &str)
        -> Result<CommitInfo>;

    /// Find an open PR whose source is `branch`
    async fn find_open_pull_request(
        &self,
        project_key: &str,
        repo_slug: &str,
        branch: &str,
    ) -> Result<Option<PullRequest>>;

    /// Create a new PR
    async fn create_pull_request(
        &self,
        project_key: &str,
        repo_slug: &str,
        pr: &NewPullRequest,
    ) -> Result<PullRequest>;
}
