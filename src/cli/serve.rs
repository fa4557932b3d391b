//! Serve command - run the webhook server

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use submodule_bot::cache::RepoCache;
use submodule_bot::config::BotConfig;
use submodule_bot::platform::BitbucketFactory;
use submodule_bot::queue::{ScanContext, ScanQueue};
use submodule_bot::reconcile::ReconcileSettings;
use submodule_bot::scan::TracingProgress;
use submodule_bot::server::{build_router, AppState};
use submodule_bot::signing::prepare_signing;
use submodule_bot::vcs::GitCli;
use tracing::info;

/// Address overrides given on the command line
#[derive(Debug, Default)]
pub struct ServeOptions {
    /// Bind address, overriding `HOST`
    pub host: Option<String>,
    /// Bind port, overriding `PORT`
    pub port: Option<u16>,
    /// Working copy root, overriding `SUBMODULE_BOT_WORKING_DIR`
    pub working_dir: Option<PathBuf>,
}

/// Run the webhook server until Ctrl-C
pub async fn run_serve(options: ServeOptions) -> Result<()> {
    let mut config = BotConfig::from_env().context("failed to load configuration")?;
    if let Some(host) = options.host {
        config.host = host;
    }
    if let Some(port) = options.port {
        config.port = port;
    }
    if let Some(dir) = options.working_dir {
        config.working_dir = dir;
    }

    let mut settings = ReconcileSettings::from(&config);
    settings.signing_key_id = prepare_signing(
        "gpg",
        config.signing_key_id.clone(),
        config.signing_key.as_deref(),
    )
    .await;

    let factory = Arc::new(BitbucketFactory::new(config.auth.clone()));
    let context = ScanContext {
        factory: factory.clone(),
        vcs: Arc::new(GitCli::new()),
        cache: RepoCache::new(&config.working_dir),
        settings,
        progress: Arc::new(TracingProgress),
    };
    let (queue, worker) = ScanQueue::start(context, config.queue_capacity);

    let app = build_router(AppState { factory, queue });

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(
        "submodule-bot listening on {addr}, working copies in {}",
        config.working_dir.display()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    // The router held the last queue handle; wait for queued scans to drain.
    info!("Server stopped, finishing queued scans");
    worker.await.context("scan worker panicked")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
