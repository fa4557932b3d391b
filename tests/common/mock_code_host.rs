//! Mock code host for testing
//!
//! These are test utilities - not all may be used in every test binary.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use submodule_bot::error::{Error, Result};
use submodule_bot::platform::{CodeHost, CodeHostFactory};
use submodule_bot::types::{
    CommitInfo, DefaultBranch, NewPullRequest, PullRequest, TrackedRepository,
};

/// Call record for `create_pull_request`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePrCall {
    pub repo_slug: String,
    pub request: NewPullRequest,
}

/// Hand-written `CodeHost` mock
///
/// Features:
/// - Auto-incrementing PR ids
/// - Created PRs are returned by later `find_open_pull_request` calls
/// - Call tracking for verification
/// - Error injection per repository
pub struct MockCodeHost {
    repos: Mutex<Vec<TrackedRepository>>,
    default_branches: Mutex<HashMap<String, DefaultBranch>>,
    commits: Mutex<HashMap<String, CommitInfo>>,
    open_prs: Mutex<HashMap<(String, String), PullRequest>>,
    next_pr_id: AtomicU64,
    // Call tracking
    default_branch_calls: Mutex<Vec<String>>,
    get_commit_calls: Mutex<Vec<String>>,
    create_pr_calls: Mutex<Vec<CreatePrCall>>,
    // Error injection
    error_on_default_branch: Mutex<HashMap<String, String>>,
    error_on_list: Mutex<Option<String>>,
    error_on_create_pr: Mutex<Option<String>>,
}

impl Default for MockCodeHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCodeHost {
    pub fn new() -> Self {
        Self {
            repos: Mutex::new(Vec::new()),
            default_branches: Mutex::new(HashMap::new()),
            commits: Mutex::new(HashMap::new()),
            open_prs: Mutex::new(HashMap::new()),
            next_pr_id: AtomicU64::new(1),
            default_branch_calls: Mutex::new(Vec::new()),
            get_commit_calls: Mutex::new(Vec::new()),
            create_pr_calls: Mutex::new(Vec::new()),
            error_on_default_branch: Mutex::new(HashMap::new()),
            error_on_list: Mutex::new(None),
            error_on_create_pr: Mutex::new(None),
        }
    }

    // === Setup ===

    /// Register a repository with `main` as its default branch
    pub fn add_repo(&self, repo: TrackedRepository) {
        self.set_default_branch(&repo.slug, "main");
        self.repos.lock().unwrap().push(repo);
    }

    pub fn set_default_branch(&self, slug: &str, display_id: &str) {
        self.default_branches.lock().unwrap().insert(
            slug.to_string(),
            DefaultBranch {
                id: format!("refs/heads/{display_id}"),
                display_id: display_id.to_string(),
            },
        );
    }

    pub fn add_commit(&self, commit: CommitInfo) {
        self.commits
            .lock()
            .unwrap()
            .insert(commit.id.clone(), commit);
    }

    /// Pretend an open PR from `branch` already exists in `slug`
    pub fn add_open_pr(&self, slug: &str, branch: &str, pr: PullRequest) {
        self.open_prs
            .lock()
            .unwrap()
            .insert((slug.to_string(), branch.to_string()), pr);
    }

    /// Decline or merge the open PR from `branch` in `slug`
    pub fn close_pr(&self, slug: &str, branch: &str) {
        self.open_prs
            .lock()
            .unwrap()
            .remove(&(slug.to_string(), branch.to_string()));
    }

    // === Error injection ===

    /// Make `default_branch` fail for one repository
    pub fn fail_default_branch(&self, slug: &str, msg: &str) {
        self.error_on_default_branch
            .lock()
            .unwrap()
            .insert(slug.to_string(), msg.to_string());
    }

    pub fn fail_list(&self, msg: &str) {
        *self.error_on_list.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fail_create_pr(&self, msg: &str) {
        *self.error_on_create_pr.lock().unwrap() = Some(msg.to_string());
    }

    // === Call verification ===

    pub fn get_create_pr_calls(&self) -> Vec<CreatePrCall> {
        self.create_pr_calls.lock().unwrap().clone()
    }

    pub fn get_commit_calls(&self) -> Vec<String> {
        self.get_commit_calls.lock().unwrap().clone()
    }

    pub fn get_default_branch_calls(&self) -> Vec<String> {
        self.default_branch_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CodeHost for MockCodeHost {
    async fn list_repositories(&self, project_key: &str) -> Result<Vec<TrackedRepository>> {
        if let Some(msg) = self.error_on_list.lock().unwrap().as_ref() {
            return Err(Error::BitbucketApi(msg.clone()));
        }
        Ok(self
            .repos
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.project_key == project_key)
            .cloned()
            .collect())
    }

    async fn default_branch(&self, _project_key: &str, repo_slug: &str) -> Result<DefaultBranch> {
        self.default_branch_calls
            .lock()
            .unwrap()
            .push(repo_slug.to_string());

        if let Some(msg) = self.error_on_default_branch.lock().unwrap().get(repo_slug) {
            return Err(Error::BitbucketApi(msg.clone()));
        }

        self.default_branches
            .lock()
            .unwrap()
            .get(repo_slug)
            .cloned()
            .ok_or_else(|| Error::BitbucketApi(format!("no such repository: {repo_slug}")))
    }

    async fn get_commit(
        &self,
        _project_key: &str,
        _repo_slug: &str,
        commit_id: &str,
    ) -> Result<CommitInfo> {
        self.get_commit_calls
            .lock()
            .unwrap()
            .push(commit_id.to_string());

        Ok(self
            .commits
            .lock()
            .unwrap()
            .get(commit_id)
            .cloned()
            .unwrap_or_else(|| CommitInfo {
                id: commit_id.to_string(),
                display_id: commit_id.chars().take(7).collect(),
                message: "Merge pull request".to_string(),
                ..CommitInfo::default()
            }))
    }

    async fn find_open_pull_request(
        &self,
        _project_key: &str,
        repo_slug: &str,
        branch: &str,
    ) -> Result<Option<PullRequest>> {
        Ok(self
            .open_prs
            .lock()
            .unwrap()
            .get(&(repo_slug.to_string(), branch.to_string()))
            .cloned())
    }

    async fn create_pull_request(
        &self,
        _project_key: &str,
        repo_slug: &str,
        pr: &NewPullRequest,
    ) -> Result<PullRequest> {
        self.create_pr_calls.lock().unwrap().push(CreatePrCall {
            repo_slug: repo_slug.to_string(),
            request: pr.clone(),
        });

        if let Some(msg) = self.error_on_create_pr.lock().unwrap().as_ref() {
            return Err(Error::BitbucketApi(msg.clone()));
        }

        let id = self.next_pr_id.fetch_add(1, Ordering::SeqCst);
        let created = PullRequest {
            id,
            title: pr.title.clone(),
            from_ref: format!("refs/heads/{}", pr.source_branch),
            to_ref: pr.target_ref.clone(),
            html_url: Some(format!(
                "https://bb.example.com/projects/PROJ/repos/{repo_slug}/pull-requests/{id}"
            )),
        };
        self.add_open_pr(repo_slug, &pr.source_branch, created.clone());
        Ok(created)
    }
}

/// Factory handing out one shared `MockCodeHost` regardless of host
pub struct MockFactory {
    pub code_host: Arc<MockCodeHost>,
    connect_calls: Mutex<Vec<String>>,
}

impl MockFactory {
    pub fn new(code_host: Arc<MockCodeHost>) -> Self {
        Self {
            code_host,
            connect_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn get_connect_calls(&self) -> Vec<String> {
        self.connect_calls.lock().unwrap().clone()
    }
}

impl CodeHostFactory for MockFactory {
    fn connect(&self, host: &str) -> Result<Arc<dyn CodeHost>> {
        self.connect_calls.lock().unwrap().push(host.to_string());
        Ok(self.code_host.clone())
    }
}
