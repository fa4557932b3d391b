//! Read-only inspection of a candidate repository

use crate::error::{Error, Result};
use crate::platform::authenticated_clone_url;
use crate::reconcile::Reconciler;
use crate::submodule::{
    find_status, locate, parse_declarations, parse_status, SUBMODULE_KEY_PATTERN,
};
use crate::types::{DefaultBranch, MergeEvent, TrackedRepository, UpdateDecision};
use crate::vcs::DEFAULT_REMOTE;
use std::path::PathBuf;
use tracing::debug;

/// What inspection found in a candidate repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inspection {
    /// Zero or several submodules refer to the merged repository
    NoMatch,
    /// The submodule already points at the merged commit
    UpToDate(UpdateDecision),
    /// The submodule needs to move
    Stale {
        /// Which submodule and where it should go
        decision: UpdateDecision,
        /// Working copy of the candidate
        dir: PathBuf,
        /// Candidate's default branch, the PR target
        default_branch: DefaultBranch,
    },
}

impl Reconciler<'_> {
    /// Steps 1-6: working copy, pull, submodule lookup, staleness check
    pub(super) async fn inspect(
        &self,
        candidate: &TrackedRepository,
        event: &MergeEvent,
    ) -> Result<Inspection> {
        let auth = &self.settings.auth;
        let dir = self
            .cache
            .ensure_clone(self.vcs, &candidate.name, || {
                let url = candidate
                    .http_clone_url
                    .as_deref()
                    .ok_or_else(|| Error::NoCloneUrl(candidate.name.clone()))?;
                authenticated_clone_url(url, auth)
            })
            .await?;

        let default_branch = self
            .code_host
            .default_branch(&candidate.project_key, &candidate.slug)
            .await?;

        self.vcs
            .pull(&dir, DEFAULT_REMOTE, &default_branch.display_id)
            .await?;
        self.vcs.submodule_init_recursive(&dir).await?;

        let config = self
            .vcs
            .read_config(&dir, ".gitmodules", SUBMODULE_KEY_PATTERN)
            .await?;
        let declarations = parse_declarations(&config);
        if declarations.is_empty() {
            debug!("No submodule for [{}]", candidate.name);
            return Ok(Inspection::NoMatch);
        }

        let Some(declaration) = locate(&declarations, &event.merged_repo.name) else {
            return Ok(Inspection::NoMatch);
        };
        debug!(
            "Submodule [{}] ({}) refers to [{}]",
            declaration.path, declaration.url, event.merged_repo.name
        );

        let statuses = parse_status(&self.vcs.submodule_status(&dir).await?);
        let status = find_status(&statuses, &declaration.path).ok_or_else(|| {
            Error::SubmoduleNotInitialized {
                repo: candidate.name.clone(),
                path: declaration.path.clone(),
            }
        })?;

        let decision = UpdateDecision::new(status, &event.merged_commit);
        if decision.is_stale {
            Ok(Inspection::Stale {
                decision,
                dir,
                default_branch,
            })
        } else {
            Ok(Inspection::UpToDate(decision))
        }
    }
}
