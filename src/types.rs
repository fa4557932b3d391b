//! Core types for submodule-bot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Commit property carrying linked Jira issue keys
pub const TICKET_PROPERTY: &str = "jira-key";

/// Ticket identifier used when the merged commit carries no matching issue key
pub const FALLBACK_TICKET: &str = "XXX";

/// A repository on the code host
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackedRepository {
    /// URL slug used in REST paths
    pub slug: String,
    /// Display name, also the local working copy directory name
    pub name: String,
    /// Key of the owning project
    pub project_key: String,
    /// HTTP(S) clone URL, if the host advertises one
    pub http_clone_url: Option<String>,
}

/// A merged pull request that should propagate to dependent repositories
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MergeEvent {
    /// Code host the event came from (e.g. `bitbucket.example.com`)
    pub host: String,
    /// Repository the pull request was merged into
    pub merged_repo: TrackedRepository,
    /// Merge commit ID
    pub merged_commit: String,
    /// Target branch ref of the merged pull request
    pub target_ref: String,
    /// Reviewer user names to copy onto bump pull requests
    pub reviewers: Vec<String>,
}

/// A submodule declared in `.gitmodules`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmoduleDeclaration {
    /// Submodule name (the `<name>` in `submodule.<name>.path`)
    pub name: String,
    /// Path relative to the repository root
    pub path: String,
    /// Remote URL (empty if not declared)
    pub url: String,
}

/// One line of `git submodule status`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmoduleStatus {
    /// Leading status flag: ' ', '+', '-' or 'U'
    pub flag: char,
    /// Commit currently checked out in the submodule
    pub commit: String,
    /// Path relative to the repository root
    pub path: String,
}

/// Whether a located submodule needs to move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateDecision {
    /// Submodule path to update
    pub path: String,
    /// Commit currently pinned
    pub current: String,
    /// Commit it should point at
    pub desired: String,
    /// True when `current != desired`
    pub is_stale: bool,
}

impl UpdateDecision {
    /// Compare a submodule's current commit against the merged commit
    pub fn new(status: &SubmoduleStatus, desired: &str) -> Self {
        Self {
            path: status.path.clone(),
            current: status.commit.clone(),
            desired: desired.to_string(),
            is_stale: status.commit != desired,
        }
    }
}

/// A repository's default branch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DefaultBranch {
    /// Full ref (e.g. `refs/heads/main`)
    pub id: String,
    /// Short name (e.g. `main`)
    pub display_id: String,
}

/// Commit metadata from the code host
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CommitInfo {
    /// Full commit ID
    pub id: String,
    /// Abbreviated commit ID
    pub display_id: String,
    /// Commit message
    pub message: String,
    /// When the commit was authored
    pub authored_at: Option<DateTime<Utc>>,
    /// Commit properties (e.g. `jira-key` → issue keys)
    pub properties: HashMap<String, Vec<String>>,
}

impl CommitInfo {
    /// Issue keys linked to this commit
    pub fn tickets(&self) -> &[String] {
        self.properties
            .get(TICKET_PROPERTY)
            .map_or(&[], Vec::as_slice)
    }
}

/// Request body for a new pull request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
    /// PR title
    pub title: String,
    /// PR description
    pub description: String,
    /// Source branch name (without `refs/heads/`)
    pub source_branch: String,
    /// Full target ref
    pub target_ref: String,
    /// Reviewer user names
    pub reviewers: Vec<String>,
}

/// A pull request on the code host
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRequest {
    /// PR ID within the repository
    pub id: u64,
    /// PR title
    pub title: String,
    /// Source ref
    pub from_ref: String,
    /// Target ref
    pub to_ref: String,
    /// Web URL for the PR, if provided
    pub html_url: Option<String>,
}
