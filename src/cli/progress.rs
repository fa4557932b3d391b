//! Styled scan progress for the `scan` command

use crate::cli::style::{check, cross, dash, Paint};
use anstream::{eprintln, println};
use async_trait::async_trait;
use submodule_bot::error::Error;
use submodule_bot::reconcile::ReconcileOutcome;
use submodule_bot::scan::{ScanProgress, ScanReport};
use submodule_bot::types::{MergeEvent, TrackedRepository};

/// Prints one line per repository as the scan proceeds
pub struct CliProgress;

#[async_trait]
impl ScanProgress for CliProgress {
    async fn on_scan_start(&self, event: &MergeEvent, repo_count: usize) {
        println!(
            "{} {} at {}",
            "Bumping".emphasis(),
            event.merged_repo.name.accent(),
            event.merged_commit.muted()
        );
        println!(
            "Scanning {} repos in project {}",
            repo_count.accent(),
            event.merged_repo.project_key.accent()
        );
        println!();
    }

    async fn on_repo_start(&self, _repo: &TrackedRepository) {}

    async fn on_outcome(&self, repo: &TrackedRepository, outcome: &ReconcileOutcome) {
        match outcome {
            ReconcileOutcome::Skipped => {
                println!("  {} {} {}", dash(), repo.name.muted(), "no submodule".muted());
            }
            ReconcileOutcome::UpToDate => {
                println!("  {} {} {}", check(), repo.name.accent(), "up to date".muted());
            }
            ReconcileOutcome::Updated(pr) => {
                let pr_num = format!("#{}", pr.id);
                println!(
                    "  {} {} bumped in PR {}",
                    check(),
                    repo.name.emphasis(),
                    pr_num.accent()
                );
                if let Some(url) = &pr.html_url {
                    println!("    {}", url.muted());
                }
            }
        }
    }

    async fn on_error(&self, repo: &TrackedRepository, err: &Error) {
        eprintln!("  {} {}: {}", cross(), repo.name, err.error());
    }

    async fn on_complete(&self, report: &ScanReport) {
        println!();
        println!(
            "{} updated, {} up to date, {} skipped, {} failed",
            report.updated.len().success(),
            report.up_to_date.len().accent(),
            report.skipped.len().muted(),
            if report.failed.is_empty() {
                "0".muted().to_string()
            } else {
                report.failed.len().warn().to_string()
            }
        );
    }
}
