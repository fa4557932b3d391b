//! Bounded scan queue with a single worker
//!
//! The webhook handler acknowledges immediately and leaves the scan to this
//! queue. Scans run one at a time in arrival order; when the queue is full,
//! `enqueue` fails instead of piling up background work.

use crate::cache::RepoCache;
use crate::error::{Error, Result};
use crate::platform::CodeHostFactory;
use crate::reconcile::{ReconcileSettings, Reconciler};
use crate::scan::{scan, ScanProgress, ScanReport};
use crate::types::MergeEvent;
use crate::vcs::Vcs;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{error, info, info_span, Instrument};

/// Everything a scan needs, owned by the worker
pub struct ScanContext {
    /// Creates code host clients for the event's host
    pub factory: Arc<dyn CodeHostFactory>,
    /// Version control driver
    pub vcs: Arc<dyn Vcs>,
    /// Local working copies
    pub cache: RepoCache,
    /// Credentials, identity and signing key
    pub settings: ReconcileSettings,
    /// Progress reporting
    pub progress: Arc<dyn ScanProgress>,
}

impl ScanContext {
    /// Run a full scan for one merge event
    pub async fn run(&self, event: &MergeEvent) -> Result<ScanReport> {
        let code_host = self.factory.connect(&event.host)?;
        let reconciler = Reconciler::new(
            code_host.as_ref(),
            self.vcs.as_ref(),
            &self.cache,
            &self.settings,
        );
        scan(&reconciler, event, self.progress.as_ref()).await
    }
}

/// Handle for submitting merge events to the scan worker
#[derive(Debug, Clone)]
pub struct ScanQueue {
    tx: mpsc::Sender<MergeEvent>,
}

impl ScanQueue {
    /// Spawn the worker and return a handle to it
    ///
    /// The worker exits once every `ScanQueue` clone is dropped and the
    /// queued events are drained.
    pub fn start(context: ScanContext, capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let worker = tokio::spawn(run_worker(context, rx));
        (Self { tx }, worker)
    }

    /// Queue a scan without waiting for it
    pub fn enqueue(&self, event: MergeEvent) -> Result<()> {
        self.tx.try_send(event).map_err(|e| match e {
            TrySendError::Full(_) => Error::QueueFull,
            TrySendError::Closed(_) => Error::QueueClosed,
        })
    }
}

async fn run_worker(context: ScanContext, mut rx: mpsc::Receiver<MergeEvent>) {
    while let Some(event) = rx.recv().await {
        let span = info_span!(
            "scan",
            merged_repo = %event.merged_repo.name,
            commit = %event.merged_commit
        );

        match context.run(&event).instrument(span).await {
            Ok(report) => info!(
                merged_repo = %event.merged_repo.name,
                "Scan finished: {} updated, {} failed of {} repos",
                report.updated.len(),
                report.failed.len(),
                report.total()
            ),
            Err(e) => error!(
                merged_repo = %event.merged_repo.name,
                "Scan aborted: {e}"
            ),
        }
    }

    info!("Scan queue closed, worker exiting");
}
