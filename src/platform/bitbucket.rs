//! Bitbucket Server platform service implementation

use crate::auth::BitbucketAuth;
use crate::error::{Error, Result};
use crate::platform::CodeHost;
use crate::types::{CommitInfo, DefaultBranch, NewPullRequest, PullRequest, TrackedRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Bitbucket Server service using reqwest
pub struct BitbucketService {
    client: Client,
    auth: BitbucketAuth,
    base_url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Page<T> {
    values: Vec<T>,
    #[serde(default = "default_true")]
    is_last_page: bool,
    next_page_start: Option<u64>,
}

const fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
struct Link {
    href: String,
    name: Option<String>,
}

#[derive(Deserialize, Default)]
struct RepoLinks {
    #[serde(default)]
    clone: Vec<Link>,
}

#[derive(Deserialize)]
struct ProjectKey {
    key: String,
}

#[derive(Deserialize)]
struct Repo {
    slug: String,
    name: String,
    project: ProjectKey,
    #[serde(default)]
    links: RepoLinks,
}

impl From<Repo> for TrackedRepository {
    fn from(repo: Repo) -> Self {
        let http_clone_url = repo
            .links
            .clone
            .into_iter()
            .find(|l| l.name.as_deref() == Some("http"))
            .map(|l| l.href);

        Self {
            slug: repo.slug,
            name: repo.name,
            project_key: repo.project.key,
            http_clone_url,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Branch {
    id: String,
    display_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Commit {
    id: String,
    display_id: String,
    #[serde(default)]
    message: String,
    author_timestamp: Option<i64>,
    #[serde(default)]
    properties: HashMap<String, serde_json::Value>,
}

/// Keep only properties that are lists of strings (e.g. `jira-key`)
fn string_list_properties(
    properties: HashMap<String, serde_json::Value>,
) -> HashMap<String, Vec<String>> {
    properties
        .into_iter()
        .filter_map(|(key, value)| {
            let values = value.as_array()?;
            let strings = values
                .iter()
                .filter_map(|v| v.as_str().map(ToString::to_string))
                .collect();
            Some((key, strings))
        })
        .collect()
}

#[derive(Deserialize, Default)]
struct PrLinks {
    #[serde(rename = "self", default)]
    self_links: Vec<Link>,
}

#[derive(Deserialize)]
struct RefId {
    id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BitbucketPr {
    id: u64,
    title: String,
    from_ref: RefId,
    to_ref: RefId,
    #[serde(default)]
    links: PrLinks,
}

impl From<BitbucketPr> for PullRequest {
    fn from(pr: BitbucketPr) -> Self {
        Self {
            id: pr.id,
            title: pr.title,
            from_ref: pr.from_ref.id,
            to_ref: pr.to_ref.id,
            html_url: pr.links.self_links.into_iter().next().map(|l| l.href),
        }
    }
}

#[derive(Serialize)]
struct ProjectRef<'a> {
    key: &'a str,
}

#[derive(Serialize)]
struct RepositoryRef<'a> {
    slug: &'a str,
    project: ProjectRef<'a>,
}

#[derive(Serialize)]
struct PrRef<'a> {
    id: String,
    repository: RepositoryRef<'a>,
}

#[derive(Serialize)]
struct UserName<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct Reviewer<'a> {
    user: UserName<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatePrPayload<'a> {
    title: &'a str,
    description: &'a str,
    state: &'static str,
    open: bool,
    closed: bool,
    from_ref: PrRef<'a>,
    to_ref: PrRef<'a>,
    locked: bool,
    reviewers: Vec<Reviewer<'a>>,
}

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Page size for paged list endpoints
const PAGE_LIMIT: u64 = 1000;

impl BitbucketService {
    /// Create a new Bitbucket service for `host`, reached over HTTPS
    pub fn new(host: &str, auth: BitbucketAuth) -> Self {
        Self::with_base_url(format!("https://{host}"), auth)
    }

    /// Create a service against an explicit base URL (scheme included)
    pub fn with_base_url(base_url: impl Into<String>, auth: BitbucketAuth) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            auth,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/rest/api/latest{}", self.base_url, path)
    }

    fn repo_path(project_key: &str, repo_slug: &str) -> String {
        format!(
            "/projects/{}/repos/{}",
            urlencoding::encode(project_key),
            urlencoding::encode(repo_slug)
        )
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.auth.username, Some(&self.auth.password))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        debug!("GET {url}");
        let value = self
            .authed(self.client.get(url))
            .query(query)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::BitbucketApi(e.to_string()))?
            .json()
            .await?;
        Ok(value)
    }

    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut start = 0;

        loop {
            let mut params = query.to_vec();
            params.push(("limit", PAGE_LIMIT.to_string()));
            params.push(("start", start.to_string()));

            let page: Page<T> = self.get_json(url, &params).await?;
            items.extend(page.values);

            match page.next_page_start {
                Some(next) if !page.is_last_page && next > start => start = next,
                _ => break,
            }
        }

        Ok(items)
    }
}

#[async_trait]
impl CodeHost for BitbucketService {
    async fn list_repositories(&self, project_key: &str) -> Result<Vec<TrackedRepository>> {
        let url = self.api_url(&format!("/projects/{}/repos", urlencoding::encode(project_key)));
        let repos: Vec<Repo> = self.get_all_pages(&url, &[]).await?;
        Ok(repos.into_iter().map(Into::into).collect())
    }

    async fn default_branch(&self, project_key: &str, repo_slug: &str) -> Result<DefaultBranch> {
        let url = self.api_url(&format!(
            "{}/branches/default",
            Self::repo_path(project_key, repo_slug)
        ));
        let branch: Branch = self.get_json(&url, &[]).await?;
        Ok(DefaultBranch {
            id: branch.id,
            display_id: branch.display_id,
        })
    }

    async fn get_commit(
        &self,
        project_key: &str,
        repo_slug: &str,
        commit_id: &str,
    ) -> Result<CommitInfo> {
        let url = self.api_url(&format!(
            "{}/commits/{}",
            Self::repo_path(project_key, repo_slug),
            urlencoding::encode(commit_id)
        ));
        let commit: Commit = self.get_json(&url, &[]).await?;

        Ok(CommitInfo {
            id: commit.id,
            display_id: commit.display_id,
            message: commit.message,
            authored_at: commit
                .author_timestamp
                .and_then(DateTime::<Utc>::from_timestamp_millis),
            properties: string_list_properties(commit.properties),
        })
    }

    async fn find_open_pull_request(
        &self,
        project_key: &str,
        repo_slug: &str,
        branch: &str,
    ) -> Result<Option<PullRequest>> {
        let url = self.api_url(&format!(
            "{}/pull-requests",
            Self::repo_path(project_key, repo_slug)
        ));
        let source_ref = format!("refs/heads/{branch}");
        let query = [
            ("state", "OPEN".to_string()),
            ("direction", "OUTGOING".to_string()),
            ("at", source_ref.clone()),
        ];

        let prs: Vec<BitbucketPr> = self.get_all_pages(&url, &query).await?;
        Ok(prs
            .into_iter()
            .find(|pr| pr.from_ref.id == source_ref)
            .map(Into::into))
    }

    async fn create_pull_request(
        &self,
        project_key: &str,
        repo_slug: &str,
        pr: &NewPullRequest,
    ) -> Result<PullRequest> {
        let url = self.api_url(&format!(
            "{}/pull-requests",
            Self::repo_path(project_key, repo_slug)
        ));

        let repository = || RepositoryRef {
            slug: repo_slug,
            project: ProjectRef { key: project_key },
        };

        let payload = CreatePrPayload {
            title: &pr.title,
            description: &pr.description,
            state: "OPEN",
            open: true,
            closed: false,
            from_ref: PrRef {
                id: format!("refs/heads/{}", pr.source_branch),
                repository: repository(),
            },
            to_ref: PrRef {
                id: pr.target_ref.clone(),
                repository: repository(),
            },
            locked: false,
            reviewers: pr
                .reviewers
                .iter()
                .map(|name| Reviewer {
                    user: UserName { name },
                })
                .collect(),
        };

        debug!("POST {url}");
        let created: BitbucketPr = self
            .authed(self.client.post(&url))
            .json(&payload)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::BitbucketApi(e.to_string()))?
            .json()
            .await?;

        Ok(created.into())
    }
}
