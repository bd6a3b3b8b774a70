//! Crawl engine - the traversal core
//!
//! One [`run_crawler`] call is one crawl run. The run owns its dedup state:
//! a global visited-(kind, key) set shared by all workers, so re-listed or
//! shared resources are stored and announced exactly once, and a misbehaving
//! enumerator cannot send the traversal into a cycle.
//!
//! Failure policy: a failed enumeration is reported to the progresser
//! (warning for a leaf listing, error when the failed kind roots a subtree)
//! and never stops sibling branches. Storage failures, credential failures,
//! and an unknown organization abort the whole run and propagate.

use crate::config::CrawlerConfig;
use crate::enumerator::{
    DirectoryClient, DirectoryCredentials, Enumerator, EnumeratorRegistry, InventoryClient,
    ProviderResult,
};
use crate::model::{Resource, ResourceKind};
use crate::progress::Progresser;
use crate::storage::Storage;
use crate::{ConfigError, TrawlError};
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, Notify, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Tunables for one crawl run
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Maximum enumerator calls in flight at once
    pub max_concurrent: usize,

    /// Retry attempts for retryable enumeration failures
    pub max_retries: u32,

    /// Base delay for exponential retry backoff
    pub retry_base_delay: Duration,

    /// Cancelling this token stops new child work promptly; already
    /// committed writes stay (rollback is the caller's decision)
    pub cancel: CancellationToken,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_concurrent: 8,
            max_retries: 3,
            retry_base_delay: Duration::from_millis(250),
            cancel: CancellationToken::new(),
        }
    }
}

impl From<&CrawlerConfig> for CrawlOptions {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            max_concurrent: config.max_concurrent_enumerations as usize,
            max_retries: config.max_retries,
            retry_base_delay: Duration::from_millis(config.retry_base_delay_ms),
            cancel: CancellationToken::new(),
        }
    }
}

/// Runs a full inventory crawl of an organization
///
/// The storage session must already be open; the crawler only writes into it
/// and never commits or closes it. Fatal conditions - unreadable directory
/// credentials, an unknown organization id, an unusable storage session -
/// surface as `Err`; per-branch provider failures are reported through the
/// progresser and swallowed. Callers inspect `progresser.summary()` for
/// partial-failure counts.
pub async fn run_crawler(
    storage: Arc<Mutex<dyn Storage>>,
    progresser: Arc<dyn Progresser>,
    client: InventoryClient,
    directory_credentials_path: &Path,
    admin_email: &str,
    organization_id: &str,
    options: CrawlOptions,
) -> Result<(), TrawlError> {
    // Credential and root failures are fatal, before any resource is written
    let credentials = DirectoryCredentials::load(directory_credentials_path, admin_email)?;
    let directory = DirectoryClient::new(client.base_url(), credentials)?;
    let registry = EnumeratorRegistry::for_provider(client.clone(), directory);

    let data = client.get_organization(organization_id).await?;
    let root = Resource::new(
        ResourceKind::Organization,
        format!("organizations/{}", organization_id),
        None,
        data,
    );

    run_with_enumerators(storage, progresser, registry, root, options).await
}

/// Runs a crawl from an already-fetched root with an explicit adapter set
///
/// This is the seam tests and embedders use to supply their own enumerators.
pub async fn run_with_enumerators(
    storage: Arc<Mutex<dyn Storage>>,
    progresser: Arc<dyn Progresser>,
    registry: EnumeratorRegistry,
    root: Resource,
    options: CrawlOptions,
) -> Result<(), TrawlError> {
    let engine = Arc::new(CrawlEngine {
        registry,
        storage,
        progresser,
        visited: Mutex::new(HashSet::new()),
        semaphore: Semaphore::new(options.max_concurrent.max(1)),
        cancel: options.cancel,
        max_retries: options.max_retries,
        retry_base_delay: options.retry_base_delay,
        fatal: Mutex::new(None),
        pending: AtomicUsize::new(0),
        drained: Notify::new(),
    });
    engine.run(root).await
}

/// Shared state of one crawl run
struct CrawlEngine {
    registry: EnumeratorRegistry,
    storage: Arc<Mutex<dyn Storage>>,
    progresser: Arc<dyn Progresser>,

    /// Run-scoped dedup set; global across all branches
    visited: Mutex<HashSet<(ResourceKind, String)>>,

    /// Bounds concurrent enumerator calls
    semaphore: Semaphore,

    cancel: CancellationToken,
    max_retries: u32,
    retry_base_delay: Duration,

    /// First fatal error wins; set aborts the run
    fatal: Mutex<Option<TrawlError>>,

    /// Queued plus in-flight work items; zero means the frontier is drained
    pending: AtomicUsize,
    drained: Notify,
}

impl CrawlEngine {
    async fn run(self: &Arc<Self>, root: Resource) -> Result<(), TrawlError> {
        tracing::info!("Starting inventory crawl at {}", root.key);
        let start = std::time::Instant::now();

        let (tx, mut rx) = mpsc::unbounded_channel::<Resource>();

        // The root is discovered like any other resource
        self.mark_visited(&root);
        self.write_and_announce(&root)?;
        self.pending.fetch_add(1, Ordering::SeqCst);
        let _ = tx.send(root);

        let mut workers = JoinSet::new();
        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    tracing::info!("Crawl cancelled, winding down");
                    break;
                }
                _ = self.drained.notified() => {
                    if self.pending.load(Ordering::SeqCst) == 0 {
                        break;
                    }
                }
                // Reap finished workers as the run goes so the set stays
                // bounded by in-flight work, not total resource count
                _ = workers.join_next(), if !workers.is_empty() => {}
                maybe = rx.recv() => {
                    let Some(parent) = maybe else { break };
                    let engine = Arc::clone(self);
                    let tx = tx.clone();
                    workers.spawn(async move {
                        // Acquire inside the task so dispatch stays responsive
                        if let Ok(_permit) = engine.semaphore.acquire().await {
                            if !engine.cancel.is_cancelled() {
                                engine.expand(&parent, &tx).await;
                            }
                        }
                        if engine.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
                            engine.drained.notify_one();
                        }
                    });
                }
            }
        }

        drop(tx);
        while workers.join_next().await.is_some() {}

        if let Some(fatal) = self.fatal.lock().unwrap().take() {
            return Err(fatal);
        }

        let summary = self.progresser.summary();
        tracing::info!(
            "Crawl finished in {:?}: {} objects, {} warnings, {} errors",
            start.elapsed(),
            summary.objects,
            summary.warnings,
            summary.errors
        );
        Ok(())
    }

    /// Enumerates every child kind of one parent, storing and queueing what
    /// it finds
    async fn expand(&self, parent: &Resource, tx: &mpsc::UnboundedSender<Resource>) {
        for &child_kind in parent.kind.children() {
            if self.cancel.is_cancelled() {
                return;
            }

            let Some(enumerator) = self.registry.get(child_kind) else {
                // A kind in the model table with no adapter is a programming
                // error, fatal to the run
                self.abort(TrawlError::Config(ConfigError::UnknownKind(
                    child_kind.to_string(),
                )));
                return;
            };

            match self.enumerate_with_retry(enumerator.as_ref(), parent).await {
                Ok(children) => {
                    for child in children {
                        if self.cancel.is_cancelled() {
                            return;
                        }
                        if !self.mark_visited(&child) {
                            // Re-listed or shared resource; already handled
                            tracing::trace!(
                                "Skipping duplicate {} {}",
                                child.kind,
                                child.key
                            );
                            continue;
                        }
                        if let Err(e) = self.write_and_announce(&child) {
                            self.abort(e);
                            return;
                        }
                        if child.is_expandable() {
                            self.pending.fetch_add(1, Ordering::SeqCst);
                            if tx.send(child).is_err() {
                                self.pending.fetch_sub(1, Ordering::SeqCst);
                                return;
                            }
                        }
                    }
                }
                Err(e) => {
                    // A failed leaf listing loses one branch: warning. A
                    // failed kind with children of its own prunes a whole
                    // subtree: error. Siblings continue either way.
                    if child_kind.children().is_empty() {
                        self.progresser.on_warning(&e);
                    } else {
                        self.progresser.on_error(&e);
                    }
                }
            }
        }
    }

    /// Calls an enumerator, retrying rate-limited and transient failures
    /// with exponential backoff
    async fn enumerate_with_retry(
        &self,
        enumerator: &dyn Enumerator,
        parent: &Resource,
    ) -> ProviderResult<Vec<Resource>> {
        let mut attempt = 0u32;
        loop {
            match enumerator.enumerate(parent).await {
                Ok(children) => return Ok(children),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let delay = self.retry_base_delay * 2u32.saturating_pow(attempt);
                    tracing::debug!(
                        "Retrying {} under {} in {:?}: {}",
                        enumerator.kind(),
                        parent.key,
                        delay,
                        e
                    );
                    attempt += 1;
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = self.cancel.cancelled() => return Err(e),
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Returns false if this (kind, key) was already seen this run
    fn mark_visited(&self, resource: &Resource) -> bool {
        let mut visited = self.visited.lock().unwrap();
        visited.insert((resource.kind, resource.key.clone()))
    }

    /// Write-then-notify: the progresser only hears about a resource after
    /// the storage write has completed
    fn write_and_announce(&self, resource: &Resource) -> Result<(), TrawlError> {
        {
            let mut storage = self.storage.lock().unwrap();
            storage.write(resource)?;
        }
        self.progresser.on_new_object(resource);
        Ok(())
    }

    fn abort(&self, error: TrawlError) {
        {
            let mut fatal = self.fatal.lock().unwrap();
            if fatal.is_none() {
                *fatal = Some(error);
            }
        }
        self.cancel.cancel();
    }
}
