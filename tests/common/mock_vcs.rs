//! In-memory `Vcs` mock
//!
//! Remote repositories are seeded by name. Cloning copies the seed into a
//! working copy keyed by its directory, and pulling resets the working copy
//! to the seed. Checking out inside a submodule directory moves that
//! submodule's pointer. Pushes record the pushed submodule pointers per
//! remote branch.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use submodule_bot::error::{Error, Result};
use submodule_bot::vcs::Vcs;

/// A recorded VCS call: operation name and the directory it ran in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcsCall {
    pub op: String,
    pub dir: PathBuf,
    pub args: Vec<String>,
}

/// A submodule as the mock repository knows it
#[derive(Debug, Clone)]
pub struct MockSubmodule {
    pub name: String,
    pub path: String,
    pub url: String,
    pub commit: String,
    pub initialized: bool,
}

impl MockSubmodule {
    pub fn new(name: &str, path: &str, url: &str, commit: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            url: url.to_string(),
            commit: commit.to_string(),
            initialized: true,
        }
    }

    /// Declared in `.gitmodules` but missing from `git submodule status`
    pub fn uninitialized(mut self) -> Self {
        self.initialized = false;
        self
    }
}

#[derive(Debug, Clone, Default)]
struct RepoState {
    submodules: Vec<MockSubmodule>,
    config: HashMap<String, String>,
    commits: Vec<(String, Option<String>)>,
}

/// Hand-written `Vcs` mock
#[derive(Default)]
pub struct MockVcs {
    remotes: Mutex<HashMap<String, RepoState>>,
    working_copies: Mutex<HashMap<PathBuf, RepoState>>,
    remote_branches: Mutex<HashMap<(String, String), Vec<MockSubmodule>>>,
    calls: Mutex<Vec<VcsCall>>,
    error_on_push: Mutex<Option<String>>,
}

impl MockVcs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a remote repository, cloned into a directory named `repo_name`
    pub fn add_remote(&self, repo_name: &str, submodules: Vec<MockSubmodule>) {
        self.remotes.lock().unwrap().insert(
            repo_name.to_string(),
            RepoState {
                submodules,
                ..RepoState::default()
            },
        );
    }

    /// Merge a pushed branch of `repo_name` into the seeded default branch
    pub fn merge_branch(&self, repo_name: &str, branch: &str) {
        let key = (repo_name.to_string(), branch.to_string());
        let pushed = self.remote_branches.lock().unwrap().get(&key).cloned();
        let pushed = pushed.unwrap_or_else(|| panic!("{branch} was never pushed"));
        if let Some(remote) = self.remotes.lock().unwrap().get_mut(repo_name) {
            remote.submodules = pushed;
        }
    }

    pub fn fail_push(&self, msg: &str) {
        *self.error_on_push.lock().unwrap() = Some(msg.to_string());
    }

    // === Call verification ===

    pub fn calls(&self) -> Vec<VcsCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls of one operation
    pub fn calls_of(&self, op: &str) -> Vec<VcsCall> {
        self.calls().into_iter().filter(|c| c.op == op).collect()
    }

    /// Current pointer of a submodule in a working copy
    pub fn submodule_commit(&self, dir: &Path, path: &str) -> Option<String> {
        self.working_copies
            .lock()
            .unwrap()
            .get(dir)?
            .submodules
            .iter()
            .find(|s| s.path == path)
            .map(|s| s.commit.clone())
    }

    /// Submodule pointer on a pushed branch of a remote repository
    pub fn remote_branch_commit(
        &self,
        repo_name: &str,
        branch: &str,
        path: &str,
    ) -> Option<String> {
        self.remote_branches
            .lock()
            .unwrap()
            .get(&(repo_name.to_string(), branch.to_string()))?
            .iter()
            .find(|s| s.path == path)
            .map(|s| s.commit.clone())
    }

    /// Commits made in a working copy: message and signing key
    pub fn commits(&self, dir: &Path) -> Vec<(String, Option<String>)> {
        self.working_copies
            .lock()
            .unwrap()
            .get(dir)
            .map(|s| s.commits.clone())
            .unwrap_or_default()
    }

    pub fn config_value(&self, dir: &Path, key: &str) -> Option<String> {
        self.working_copies
            .lock()
            .unwrap()
            .get(dir)?
            .config
            .get(key)
            .cloned()
    }

    fn record(&self, op: &str, dir: &Path, args: &[&str]) {
        self.calls.lock().unwrap().push(VcsCall {
            op: op.to_string(),
            dir: dir.to_path_buf(),
            args: args.iter().map(ToString::to_string).collect(),
        });
    }

    fn repo_name(dir: &Path) -> String {
        dir.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    fn with_repo<T>(&self, dir: &Path, f: impl FnOnce(&mut RepoState) -> T) -> Result<T> {
        let mut copies = self.working_copies.lock().unwrap();
        let state = copies.get_mut(dir).ok_or_else(|| Error::Git {
            command: "mock".to_string(),
            dir: dir.to_path_buf(),
            stderr: "not a git repository".to_string(),
        })?;
        Ok(f(state))
    }
}

#[async_trait]
impl Vcs for MockVcs {
    async fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        self.record("clone", dest, &[url]);

        let name = Self::repo_name(dest);
        let seed = self.remotes.lock().unwrap().get(&name).cloned();
        let seed = seed.ok_or_else(|| Error::Git {
            command: format!("clone {name}"),
            dir: dest.to_path_buf(),
            stderr: "repository not found".to_string(),
        })?;

        self.working_copies
            .lock()
            .unwrap()
            .insert(dest.to_path_buf(), seed);
        Ok(())
    }

    async fn pull(&self, dir: &Path, remote: &str, branch: &str) -> Result<()> {
        self.record("pull", dir, &[remote, branch]);
        let seed = self.remotes.lock().unwrap().get(&Self::repo_name(dir)).cloned();
        self.with_repo(dir, |state| {
            if let Some(seed) = seed {
                state.submodules = seed.submodules;
            }
        })
    }

    async fn submodule_init_recursive(&self, dir: &Path) -> Result<()> {
        self.record("submodule_init", dir, &[]);
        self.with_repo(dir, |_| ())
    }

    async fn read_config(&self, dir: &Path, file: &str, key_pattern: &str) -> Result<Vec<String>> {
        self.record("read_config", dir, &[file, key_pattern]);
        self.with_repo(dir, |state| {
            state
                .submodules
                .iter()
                .flat_map(|s| {
                    [
                        format!("submodule.{}.path {}", s.name, s.path),
                        format!("submodule.{}.url {}", s.name, s.url),
                    ]
                })
                .collect()
        })
    }

    async fn submodule_status(&self, dir: &Path) -> Result<Vec<String>> {
        self.record("submodule_status", dir, &[]);
        self.with_repo(dir, |state| {
            state
                .submodules
                .iter()
                .filter(|s| s.initialized)
                .map(|s| format!(" {} {} (heads/main)", s.commit, s.path))
                .collect()
        })
    }

    async fn checkout(&self, dir: &Path, reference: &str) -> Result<()> {
        self.record("checkout", dir, &[reference]);

        let mut copies = self.working_copies.lock().unwrap();
        for (root, state) in copies.iter_mut() {
            if let Ok(rel) = dir.strip_prefix(root) {
                let rel = rel.to_string_lossy();
                if let Some(sub) = state.submodules.iter_mut().find(|s| s.path == rel) {
                    sub.commit = reference.to_string();
                    return Ok(());
                }
            }
        }

        Err(Error::Git {
            command: format!("checkout {reference}"),
            dir: dir.to_path_buf(),
            stderr: "pathspec did not match".to_string(),
        })
    }

    async fn fetch(&self, dir: &Path) -> Result<()> {
        self.record("fetch", dir, &[]);
        Ok(())
    }

    async fn stage_all(&self, dir: &Path) -> Result<()> {
        self.record("stage_all", dir, &[]);
        self.with_repo(dir, |_| ())
    }

    async fn set_config(&self, dir: &Path, key: &str, value: &str) -> Result<()> {
        self.record("set_config", dir, &[key, value]);
        self.with_repo(dir, |state| {
            state.config.insert(key.to_string(), value.to_string());
        })
    }

    async fn commit(&self, dir: &Path, message: &str, signing_key: Option<&str>) -> Result<()> {
        self.record("commit", dir, &[message]);
        self.with_repo(dir, |state| {
            state
                .commits
                .push((message.to_string(), signing_key.map(ToString::to_string)));
        })
    }

    async fn push(&self, dir: &Path, remote: &str, refspec: &str) -> Result<()> {
        self.record("push", dir, &[remote, refspec]);
        if let Some(msg) = self.error_on_push.lock().unwrap().as_ref() {
            return Err(Error::Git {
                command: format!("push {remote} {refspec}"),
                dir: dir.to_path_buf(),
                stderr: msg.clone(),
            });
        }

        let pushed = self.with_repo(dir, |state| state.submodules.clone())?;
        let target = refspec.rsplit(':').next().unwrap_or(refspec);
        let branch = target.trim_start_matches('+').trim_start_matches("refs/heads/");
        self.remote_branches
            .lock()
            .unwrap()
            .insert((Self::repo_name(dir), branch.to_string()), pushed);
        Ok(())
    }

    async fn remote_pinned_commit(
        &self,
        dir: &Path,
        remote: &str,
        branch: &str,
        path: &str,
    ) -> Result<Option<String>> {
        self.record("remote_pinned_commit", dir, &[remote, branch, path]);
        self.with_repo(dir, |_| ())?;
        Ok(self.remote_branch_commit(&Self::repo_name(dir), branch, path))
    }
}
