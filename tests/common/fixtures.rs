//! Test data factories for submodule-bot types

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use submodule_bot::auth::BitbucketAuth;
use submodule_bot::cache::RepoCache;
use submodule_bot::config::GitIdentity;
use submodule_bot::reconcile::ReconcileSettings;
use submodule_bot::types::{CommitInfo, MergeEvent, TICKET_PROPERTY, TrackedRepository};

pub const PROJECT: &str = "PROJ";
pub const HOST: &str = "bb.example.com";

/// Create a repository in [`PROJECT`] with an http clone link
pub fn make_repo(name: &str) -> TrackedRepository {
    TrackedRepository {
        slug: name.to_string(),
        name: name.to_string(),
        project_key: PROJECT.to_string(),
        http_clone_url: Some(format!(
            "https://bot@{HOST}/scm/{}/{name}.git",
            PROJECT.to_lowercase()
        )),
    }
}

/// Clone URL a submodule would declare for `name`
pub fn submodule_url(name: &str) -> String {
    format!("../{name}.git")
}

/// Merge of `merged` at `commit` into `refs/heads/main`
pub fn make_event(merged: &str, commit: &str) -> MergeEvent {
    MergeEvent {
        host: HOST.to_string(),
        merged_repo: make_repo(merged),
        merged_commit: commit.to_string(),
        target_ref: "refs/heads/main".to_string(),
        reviewers: vec!["alice".to_string()],
    }
}

/// Commit metadata carrying linked issue keys
pub fn commit_with_tickets(id: &str, keys: &[&str]) -> CommitInfo {
    let mut properties = HashMap::new();
    if !keys.is_empty() {
        properties.insert(
            TICKET_PROPERTY.to_string(),
            keys.iter().map(ToString::to_string).collect(),
        );
    }
    CommitInfo {
        id: id.to_string(),
        display_id: id.chars().take(7).collect(),
        message: "Add field to order model".to_string(),
        authored_at: None,
        properties,
    }
}

pub fn make_settings(signing_key_id: Option<&str>) -> ReconcileSettings {
    ReconcileSettings {
        auth: BitbucketAuth {
            username: "bot".to_string(),
            password: "p@ss".to_string(),
        },
        identity: GitIdentity {
            name: "Submodule Bot".to_string(),
            email: "bot@example.com".to_string(),
        },
        signing_key_id: signing_key_id.map(ToString::to_string),
    }
}

pub fn make_cache(root: &Path) -> RepoCache {
    RepoCache::new(root.join("repos"))
}
