//! Progress observation for crawl runs
//!
//! The crawler reports every discovered object, warning, and error to a
//! [`Progresser`]. Implementations are swappable: [`NullProgresser`] keeps
//! counters only (tests and dry runs), [`LogProgresser`] additionally emits
//! tracing events (production). Counters are atomic so one progresser can be
//! shared across all crawl workers.

use crate::enumerator::ProviderError;
use crate::model::Resource;
use std::sync::atomic::{AtomicU64, Ordering};

/// Aggregate counts produced at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressSummary {
    /// Resources successfully written to storage
    pub objects: u64,

    /// Recoverable anomalies that did not abort a subtree
    pub warnings: u64,

    /// Failures that aborted enumeration of a subtree
    pub errors: u64,
}

/// Observer notified of every discovery, warning, and error during a run
///
/// `on_new_object` is called exactly once per resource written to storage,
/// and always after the write has completed.
pub trait Progresser: Send + Sync {
    /// Called once per resource successfully written to storage
    fn on_new_object(&self, resource: &Resource);

    /// Called for a recoverable anomaly; the surrounding subtree continues
    fn on_warning(&self, warning: &ProviderError);

    /// Called for a failure that aborts the current subtree (never the run)
    fn on_error(&self, error: &ProviderError);

    /// Returns the aggregate counts; read once after traversal completes
    fn summary(&self) -> ProgressSummary;
}

#[derive(Debug, Default)]
struct Counters {
    objects: AtomicU64,
    warnings: AtomicU64,
    errors: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> ProgressSummary {
        ProgressSummary {
            objects: self.objects.load(Ordering::Relaxed),
            warnings: self.warnings.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

/// No-op progresser: counts events and nothing else
#[derive(Debug, Default)]
pub struct NullProgresser {
    counters: Counters,
}

impl NullProgresser {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Progresser for NullProgresser {
    fn on_new_object(&self, _resource: &Resource) {
        self.counters.objects.fetch_add(1, Ordering::Relaxed);
    }

    fn on_warning(&self, _warning: &ProviderError) {
        self.counters.warnings.fetch_add(1, Ordering::Relaxed);
    }

    fn on_error(&self, _error: &ProviderError) {
        self.counters.errors.fetch_add(1, Ordering::Relaxed);
    }

    fn summary(&self) -> ProgressSummary {
        self.counters.snapshot()
    }
}

/// Logging progresser: counts events and emits tracing records
#[derive(Debug, Default)]
pub struct LogProgresser {
    counters: Counters,
}

impl LogProgresser {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Progresser for LogProgresser {
    fn on_new_object(&self, resource: &Resource) {
        let n = self.counters.objects.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::debug!(kind = %resource.kind, key = %resource.key, "Discovered resource");
        if n % 100 == 0 {
            tracing::info!("Progress: {} resources discovered", n);
        }
    }

    fn on_warning(&self, warning: &ProviderError) {
        self.counters.warnings.fetch_add(1, Ordering::Relaxed);
        tracing::warn!("Enumeration warning: {}", warning);
    }

    fn on_error(&self, error: &ProviderError) {
        self.counters.errors.fetch_add(1, Ordering::Relaxed);
        tracing::error!("Subtree aborted: {}", error);
    }

    fn summary(&self) -> ProgressSummary {
        self.counters.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ResourceKind;
    use serde_json::json;

    fn folder() -> Resource {
        Resource::new(ResourceKind::Folder, "folders/f1", None, json!({}))
    }

    fn denied() -> ProviderError {
        ProviderError::PermissionDenied {
            kind: ResourceKind::Bucket,
            parent: "projects/p1".to_string(),
        }
    }

    #[test]
    fn test_null_progresser_counts() {
        let progresser = NullProgresser::new();
        progresser.on_new_object(&folder());
        progresser.on_new_object(&folder());
        progresser.on_warning(&denied());
        progresser.on_error(&denied());

        let summary = progresser.summary();
        assert_eq!(summary.objects, 2);
        assert_eq!(summary.warnings, 1);
        assert_eq!(summary.errors, 1);
    }

    #[test]
    fn test_fresh_summary_is_zero() {
        let progresser = LogProgresser::new();
        assert_eq!(progresser.summary(), ProgressSummary::default());
    }

    #[test]
    fn test_counts_across_threads() {
        use std::sync::Arc;

        let progresser = Arc::new(NullProgresser::new());
        let mut handles = Vec::new();
        for _ in 0..4 {
            let p = Arc::clone(&progresser);
            handles.push(std::thread::spawn(move || {
                for _ in 0..100 {
                    p.on_new_object(&folder());
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(progresser.summary().objects, 400);
    }
}
