//! Bitbucket webhook payload and handlers

use crate::error::{Error, Result};
use crate::platform::host_from_url;
use crate::server::{AppError, AppState};
use crate::types::{MergeEvent, TrackedRepository};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Event key Bitbucket sends for merged pull requests
pub const MERGED_EVENT_KEY: &str = "pr:merged";

/// JSON body of every webhook response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResponseMessage {
    /// Human-readable outcome
    pub message: String,
}

impl ResponseMessage {
    fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct Link {
    href: String,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Project {
    key: String,
}

#[derive(Debug, Default, Deserialize)]
struct RepositoryLinks {
    #[serde(default)]
    clone: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct Repository {
    slug: String,
    name: String,
    project: Project,
    #[serde(default)]
    links: RepositoryLinks,
}

#[derive(Debug, Deserialize)]
struct Ref {
    id: String,
    repository: Repository,
}

#[derive(Debug, Default, Deserialize)]
struct PullRequestLinks {
    #[serde(rename = "self", default)]
    self_links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct MergeCommit {
    id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Properties {
    merge_commit: Option<MergeCommit>,
}

#[derive(Debug, Deserialize)]
struct User {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Participant {
    user: User,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequest {
    to_ref: Ref,
    #[serde(default)]
    links: PullRequestLinks,
    #[serde(default)]
    properties: Properties,
    #[serde(default)]
    reviewers: Vec<Participant>,
}

/// Bitbucket Server pull request webhook body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    /// Event type, e.g. `pr:merged`
    pub event_key: Option<String>,
    pull_request: PullRequest,
}

impl WebhookPayload {
    /// Whether this payload announces a merge (payloads without a key are
    /// assumed to be merges, as older Bitbucket versions omit it)
    pub fn is_merge(&self) -> bool {
        self.event_key
            .as_deref()
            .is_none_or(|key| key == MERGED_EVENT_KEY)
    }

    /// Extract the merged repository, commit and reviewers
    pub fn into_merge_event(self) -> Result<MergeEvent> {
        let pr = self.pull_request;

        let self_link = pr
            .links
            .self_links
            .first()
            .ok_or_else(|| Error::Parse("pull request has no self link".to_string()))?;
        let host = host_from_url(&self_link.href)?;

        let merged_commit = pr
            .properties
            .merge_commit
            .map(|c| c.id)
            .ok_or_else(|| Error::Parse("pull request has no merge commit".to_string()))?;

        let repo = pr.to_ref.repository;
        let http_clone_url = repo
            .links
            .clone
            .into_iter()
            .find(|l| l.name.as_deref() == Some("http"))
            .map(|l| l.href);

        Ok(MergeEvent {
            host,
            merged_repo: TrackedRepository {
                slug: repo.slug,
                name: repo.name,
                project_key: repo.project.key,
                http_clone_url,
            },
            merged_commit,
            target_ref: pr.to_ref.id,
            reviewers: pr.reviewers.into_iter().map(|r| r.user.name).collect(),
        })
    }
}

pub(super) async fn index() -> Json<ResponseMessage> {
    ResponseMessage::new("This is submodule-bot, use /hook path for your Bitbucket webhook")
}

pub(super) async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "submodule-bot"
    }))
}

pub(super) async fn hook(
    State(state): State<AppState>,
    payload: std::result::Result<Json<WebhookPayload>, JsonRejection>,
) -> std::result::Result<Json<ResponseMessage>, AppError> {
    info!("POST /hook");
    let Json(payload) = payload.map_err(|e| Error::Parse(e.body_text()))?;

    if !payload.is_merge() {
        let key = payload.event_key.unwrap_or_default();
        info!("Ignoring {key} event");
        return Ok(ResponseMessage::new(format!("Ignoring {key} event")));
    }

    let event = payload.into_merge_event()?;
    info!(
        "Merge of [{}] at {} into {}, reviewers for bump PRs: {:?}",
        event.merged_repo.name, event.merged_commit, event.target_ref, event.reviewers
    );

    let code_host = state.factory.connect(&event.host)?;
    let default_branch = code_host
        .default_branch(&event.merged_repo.project_key, &event.merged_repo.slug)
        .await?;

    if default_branch.id != event.target_ref {
        info!("Not merging to default branch, ignoring");
        return Ok(ResponseMessage::new("Not merging to default branch, ignoring"));
    }

    state.queue.enqueue(event)?;
    Ok(ResponseMessage::new("Successfully scheduled submodule update"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MERGED: &str = r#"{
        "eventKey": "pr:merged",
        "pullRequest": {
            "id": 12,
            "fromRef": {
                "id": "refs/heads/feature/PROJ-42-add-field",
                "repository": {"slug": "shared-model", "name": "shared-model", "project": {"key": "PROJ"}}
            },
            "toRef": {
                "id": "refs/heads/main",
                "repository": {
                    "slug": "shared-model",
                    "name": "shared-model",
                    "project": {"key": "PROJ"},
                    "links": {"clone": [{"href": "https://bb.example.com/scm/proj/shared-model.git", "name": "http"}]}
                }
            },
            "links": {"self": [{"href": "https://bb.example.com/projects/PROJ/repos/shared-model/pull-requests/12"}]},
            "properties": {"mergeCommit": {"id": "abc123", "displayId": "abc"}},
            "reviewers": [{"user": {"name": "alice"}}, {"user": {"name": "bob"}}]
        }
    }"#;

    #[test]
    fn test_merge_event_from_payload() {
        let payload: WebhookPayload = serde_json::from_str(MERGED).unwrap();
        assert!(payload.is_merge());

        let event = payload.into_merge_event().unwrap();
        assert_eq!(event.host, "bb.example.com");
        assert_eq!(event.merged_repo.name, "shared-model");
        assert_eq!(event.merged_repo.project_key, "PROJ");
        assert_eq!(event.merged_commit, "abc123");
        assert_eq!(event.target_ref, "refs/heads/main");
        assert_eq!(event.reviewers, vec!["alice".to_string(), "bob".to_string()]);
        assert_eq!(
            event.merged_repo.http_clone_url.as_deref(),
            Some("https://bb.example.com/scm/proj/shared-model.git")
        );
    }

    #[test]
    fn test_missing_merge_commit_is_parse_error() {
        let json = MERGED.replace(r#""mergeCommit": {"id": "abc123", "displayId": "abc"}"#, "");
        let payload: WebhookPayload = serde_json::from_str(&json).unwrap();
        assert!(matches!(payload.into_merge_event(), Err(Error::Parse(_))));
    }

    #[test]
    fn test_other_event_keys_are_not_merges() {
        let json = MERGED.replace("pr:merged", "pr:opened");
        let payload: WebhookPayload = serde_json::from_str(&json).unwrap();
        assert!(!payload.is_merge());
    }
}
