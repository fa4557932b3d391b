//! Sequential scan over a project's repositories

use crate::error::Result;
use crate::reconcile::{ReconcileOutcome, Reconciler};
use crate::scan::ScanProgress;
use crate::types::{MergeEvent, PullRequest, TrackedRepository};
use tracing::{info_span, Instrument};

/// Outcome of one scan, grouped by result
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Repositories that got a bump PR, with the PR
    pub updated: Vec<(String, PullRequest)>,
    /// Repositories already pointing at the merged commit
    pub up_to_date: Vec<String>,
    /// Repositories without a matching submodule
    pub skipped: Vec<String>,
    /// Repositories whose reconciliation failed, with the error message
    pub failed: Vec<(String, String)>,
}

impl ScanReport {
    fn record(&mut self, repo: &TrackedRepository, outcome: ReconcileOutcome) {
        let name = repo.name.clone();
        match outcome {
            ReconcileOutcome::Skipped => self.skipped.push(name),
            ReconcileOutcome::UpToDate => self.up_to_date.push(name),
            ReconcileOutcome::Updated(pr) => self.updated.push((name, pr)),
        }
    }

    /// Number of repositories visited
    pub fn total(&self) -> usize {
        self.updated.len() + self.up_to_date.len() + self.skipped.len() + self.failed.len()
    }
}

/// Reconcile every repository in the merged repository's project
///
/// Repositories are processed strictly one at a time. A failing repository
/// is reported and recorded; the scan moves on to the next one. Only listing
/// the repositories or fetching the merged commit can fail the scan itself.
pub async fn scan(
    reconciler: &Reconciler<'_>,
    event: &MergeEvent,
    progress: &dyn ScanProgress,
) -> Result<ScanReport> {
    let code_host = reconciler.code_host();
    let merged = &event.merged_repo;

    let repos = code_host.list_repositories(&merged.project_key).await?;
    let merged_commit = code_host
        .get_commit(&merged.project_key, &merged.slug, &event.merged_commit)
        .await?;

    progress.on_scan_start(event, repos.len()).await;

    let mut report = ScanReport::default();
    for repo in &repos {
        progress.on_repo_start(repo).await;

        let span = info_span!("reconcile", repo = %repo.name);
        match reconciler
            .reconcile(repo, event, &merged_commit)
            .instrument(span)
            .await
        {
            Ok(outcome) => {
                progress.on_outcome(repo, &outcome).await;
                report.record(repo, outcome);
            }
            Err(e) => {
                progress.on_error(repo, &e).await;
                report.failed.push((repo.name.clone(), e.to_string()));
            }
        }
    }

    progress.on_complete(&report).await;
    Ok(report)
}
