//! Submodule staleness reconciliation
//!
//! For one candidate repository:
//! 1. Inspection - clone/pull, read submodules, decide whether the pointer is stale
//! 2. Update - move the submodule, commit, push a bump branch, open a PR
//!
//! Inspection is read-only. The update has no rollback: if a later step
//! fails, earlier pushes stay on the remote.

mod inspect;
mod naming;
mod update;

pub use inspect::Inspection;
pub use naming::{branch_name, commit_message, pr_description, pr_title, resolve_ticket};

use crate::auth::BitbucketAuth;
use crate::cache::RepoCache;
use crate::config::{BotConfig, GitIdentity};
use crate::error::Result;
use crate::platform::CodeHost;
use crate::types::{CommitInfo, MergeEvent, PullRequest, TrackedRepository};
use crate::vcs::Vcs;
use std::fmt;
use tracing::info;

/// Settings the reconciler needs beyond its collaborators
#[derive(Debug, Clone)]
pub struct ReconcileSettings {
    /// Credentials injected into clone URLs
    pub auth: BitbucketAuth,
    /// Author identity for bump commits
    pub identity: GitIdentity,
    /// GPG key ID to sign bump commits with
    pub signing_key_id: Option<String>,
}

impl From<&BotConfig> for ReconcileSettings {
    fn from(config: &BotConfig) -> Self {
        Self {
            auth: config.auth.clone(),
            identity: config.identity.clone(),
            signing_key_id: config.signing_key_id.clone(),
        }
    }
}

/// Result of reconciling one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// No single submodule refers to the merged repository
    Skipped,
    /// The submodule already points at the merged commit
    UpToDate,
    /// A bump PR was created (or an open one reused)
    Updated(PullRequest),
}

impl fmt::Display for ReconcileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped => write!(f, "skipped"),
            Self::UpToDate => write!(f, "up to date"),
            Self::Updated(pr) => write!(f, "updated (PR #{})", pr.id),
        }
    }
}

/// Drives one candidate repository through inspection and update
pub struct Reconciler<'a> {
    code_host: &'a dyn CodeHost,
    vcs: &'a dyn Vcs,
    cache: &'a RepoCache,
    settings: &'a ReconcileSettings,
}

impl<'a> Reconciler<'a> {
    /// Create a reconciler over the given collaborators
    pub const fn new(
        code_host: &'a dyn CodeHost,
        vcs: &'a dyn Vcs,
        cache: &'a RepoCache,
        settings: &'a ReconcileSettings,
    ) -> Self {
        Self {
            code_host,
            vcs,
            cache,
            settings,
        }
    }

    /// Code host this reconciler talks to
    pub fn code_host(&self) -> &'a dyn CodeHost {
        self.code_host
    }

    /// Bring `candidate`'s submodule pointer for the merged repository up to date
    ///
    /// `merged_commit` is the metadata of `event.merged_commit`, fetched once
    /// per scan.
    pub async fn reconcile(
        &self,
        candidate: &TrackedRepository,
        event: &MergeEvent,
        merged_commit: &CommitInfo,
    ) -> Result<ReconcileOutcome> {
        info!("Working on [{}]...", candidate.name);

        match self.inspect(candidate, event).await? {
            Inspection::NoMatch => {
                info!("No submodule to update in [{}]", candidate.name);
                Ok(ReconcileOutcome::Skipped)
            }
            Inspection::UpToDate(decision) => {
                info!(
                    "Submodule [{}] in [{}] is up to date at {}",
                    decision.path, candidate.name, decision.current
                );
                Ok(ReconcileOutcome::UpToDate)
            }
            Inspection::Stale {
                decision,
                dir,
                default_branch,
            } => {
                info!(
                    "Submodule [{}] in [{}] is behind ({} -> {}), updating",
                    decision.path, candidate.name, decision.current, decision.desired
                );
                let pr = self
                    .apply_update(candidate, event, merged_commit, &decision, &dir, &default_branch)
                    .await?;
                Ok(ReconcileOutcome::Updated(pr))
            }
        }
    }
}
