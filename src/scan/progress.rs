//! Progress callback trait for interface-agnostic updates
//!
//! The webhook worker logs scan progress; the `scan` CLI command prints it.

use crate::error::Error;
use crate::reconcile::ReconcileOutcome;
use crate::scan::ScanReport;
use crate::types::{MergeEvent, TrackedRepository};
use async_trait::async_trait;
use tracing::{error, info};

/// Progress callback trait
///
/// Implement this trait to receive updates while a scan runs.
#[async_trait]
pub trait ScanProgress: Send + Sync {
    /// Called once the repositories to scan are known
    async fn on_scan_start(&self, event: &MergeEvent, repo_count: usize);

    /// Called before a repository is reconciled
    async fn on_repo_start(&self, repo: &TrackedRepository);

    /// Called when a repository was reconciled
    async fn on_outcome(&self, repo: &TrackedRepository, outcome: &ReconcileOutcome);

    /// Called when reconciling a repository failed (the scan continues)
    async fn on_error(&self, repo: &TrackedRepository, error: &Error);

    /// Called after the last repository
    async fn on_complete(&self, report: &ScanReport);
}

/// No-op progress callback for testing or when progress isn't needed
pub struct NoopProgress;

#[async_trait]
impl ScanProgress for NoopProgress {
    async fn on_scan_start(&self, _event: &MergeEvent, _repo_count: usize) {}
    async fn on_repo_start(&self, _repo: &TrackedRepository) {}
    async fn on_outcome(&self, _repo: &TrackedRepository, _outcome: &ReconcileOutcome) {}
    async fn on_error(&self, _repo: &TrackedRepository, _error: &Error) {}
    async fn on_complete(&self, _report: &ScanReport) {}
}

/// Progress callback that reports through `tracing`
pub struct TracingProgress;

#[async_trait]
impl ScanProgress for TracingProgress {
    async fn on_scan_start(&self, event: &MergeEvent, repo_count: usize) {
        info!(
            merged_repo = %event.merged_repo.name,
            commit = %event.merged_commit,
            "Scanning [{repo_count}] repos...."
        );
    }

    async fn on_repo_start(&self, _repo: &TrackedRepository) {}

    async fn on_outcome(&self, repo: &TrackedRepository, outcome: &ReconcileOutcome) {
        info!(repo = %repo.name, "Reconciled: {outcome}");
    }

    async fn on_error(&self, repo: &TrackedRepository, err: &Error) {
        error!(repo = %repo.name, "Reconciliation failed: {err}");
    }

    async fn on_complete(&self, report: &ScanReport) {
        info!(
            updated = report.updated.len(),
            up_to_date = report.up_to_date.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Scanned repos and updated submodules"
        );
    }
}
