//! Scan command - run one bump scan by hand, without a webhook

use crate::cli::progress::CliProgress;
use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use submodule_bot::cache::RepoCache;
use submodule_bot::config::BotConfig;
use submodule_bot::platform::{BitbucketFactory, CodeHostFactory};
use submodule_bot::queue::ScanContext;
use submodule_bot::reconcile::ReconcileSettings;
use submodule_bot::signing::prepare_signing;
use submodule_bot::types::MergeEvent;
use submodule_bot::vcs::GitCli;

/// What to bump, as given on the command line
#[derive(Debug)]
pub struct ScanOptions {
    /// Bitbucket host, e.g. `bitbucket.example.com`
    pub host: String,
    /// Project key of the merged repository
    pub project: String,
    /// Slug or name of the merged repository
    pub repo: String,
    /// Commit the submodules should point at
    pub commit: String,
    /// Reviewers for created PRs
    pub reviewers: Vec<String>,
    /// Working copy root, overriding `SUBMODULE_BOT_WORKING_DIR`
    pub working_dir: Option<PathBuf>,
}

/// Bump every submodule of `options.repo` in the project to `options.commit`
pub async fn run_scan(options: ScanOptions) -> Result<()> {
    let mut config = BotConfig::from_env().context("failed to load configuration")?;
    if let Some(dir) = options.working_dir {
        config.working_dir = dir;
    }

    let factory = Arc::new(BitbucketFactory::new(config.auth.clone()));
    let code_host = factory.connect(&options.host)?;

    let merged_repo = code_host
        .list_repositories(&options.project)
        .await?
        .into_iter()
        .find(|r| r.slug == options.repo || r.name == options.repo)
        .with_context(|| {
            format!(
                "repository {} not found in project {}",
                options.repo, options.project
            )
        })?;
    let default_branch = code_host
        .default_branch(&merged_repo.project_key, &merged_repo.slug)
        .await?;

    let event = MergeEvent {
        host: options.host,
        merged_repo,
        merged_commit: options.commit,
        target_ref: default_branch.id,
        reviewers: options.reviewers,
    };

    let mut settings = ReconcileSettings::from(&config);
    settings.signing_key_id = prepare_signing(
        "gpg",
        config.signing_key_id.clone(),
        config.signing_key.as_deref(),
    )
    .await;

    let context = ScanContext {
        factory,
        vcs: Arc::new(GitCli::new()),
        cache: RepoCache::new(&config.working_dir),
        settings,
        progress: Arc::new(CliProgress),
    };

    let report = context.run(&event).await?;
    if !report.failed.is_empty() {
        bail!("{} of {} repos failed", report.failed.len(), report.total());
    }
    Ok(())
}
