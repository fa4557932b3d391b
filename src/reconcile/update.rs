//! Submodule bump: commit, push and pull request

use crate::error::Result;
use crate::reconcile::naming::{
    branch_name, commit_message, pr_description, pr_title, resolve_ticket,
};
use crate::reconcile::Reconciler;
use crate::types::{
    CommitInfo, DefaultBranch, MergeEvent, NewPullRequest, PullRequest, TrackedRepository,
    UpdateDecision,
};
use crate::vcs::DEFAULT_REMOTE;
use std::path::Path;
use tracing::{debug, info};

impl Reconciler<'_> {
    /// Steps 7-12: move the submodule and open (or reuse) the bump PR
    pub(super) async fn apply_update(
        &self,
        candidate: &TrackedRepository,
        event: &MergeEvent,
        merged_commit: &CommitInfo,
        decision: &UpdateDecision,
        dir: &Path,
        default_branch: &DefaultBranch,
    ) -> Result<PullRequest> {
        let merged_name = &event.merged_repo.name;
        let ticket = resolve_ticket(merged_commit, &candidate.project_key);
        let branch = branch_name(&ticket, merged_name);

        let pinned = self
            .vcs
            .remote_pinned_commit(dir, DEFAULT_REMOTE, &branch, &decision.path)
            .await?;
        if pinned.as_deref() == Some(decision.desired.as_str()) {
            info!(
                "[{branch}] on [{}] already pins {}, not pushing",
                candidate.name, decision.desired
            );
        } else {
            self.commit_and_push(candidate, &ticket, merged_name, decision, dir, &branch)
                .await?;
        }

        if let Some(existing) = self
            .code_host
            .find_open_pull_request(&candidate.project_key, &candidate.slug, &branch)
            .await?
        {
            info!("Reusing open PR #{} for [{branch}]", existing.id);
            return Ok(existing);
        }

        let request = NewPullRequest {
            title: pr_title(merged_name),
            description: pr_description(
                merged_name,
                &decision.path,
                &decision.current,
                merged_commit,
            ),
            source_branch: branch,
            target_ref: default_branch.id.clone(),
            reviewers: event.reviewers.clone(),
        };

        let pr = self
            .code_host
            .create_pull_request(&candidate.project_key, &candidate.slug, &request)
            .await?;
        info!(
            "PR created [#{}] {}",
            pr.id,
            pr.html_url.as_deref().unwrap_or_default()
        );

        Ok(pr)
    }

    async fn commit_and_push(
        &self,
        candidate: &TrackedRepository,
        ticket: &str,
        merged_name: &str,
        decision: &UpdateDecision,
        dir: &Path,
        branch: &str,
    ) -> Result<()> {
        let submodule_dir = dir.join(&decision.path);
        self.vcs.fetch(&submodule_dir).await?;
        self.vcs.checkout(&submodule_dir, &decision.desired).await?;

        let identity = &self.settings.identity;
        self.vcs.stage_all(dir).await?;
        self.vcs.set_config(dir, "user.name", &identity.name).await?;
        self.vcs.set_config(dir, "user.email", &identity.email).await?;

        let message = commit_message(ticket, &candidate.name, merged_name);
        let signing_key = self.settings.signing_key_id.as_deref();
        if signing_key.is_none() {
            debug!("No signing key configured, committing unsigned");
        }
        self.vcs.commit(dir, &message, signing_key).await?;

        // The bump branch belongs to the bot; force so retries land on it.
        self.vcs
            .push(dir, DEFAULT_REMOTE, &format!("+HEAD:refs/heads/{branch}"))
            .await?;
        info!("Pushed [{branch}] to [{}]", candidate.name);
        Ok(())
    }
}
