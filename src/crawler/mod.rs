//! Crawler module - traversal orchestration
//!
//! The crawler expands the resource hierarchy from a synthetic organization
//! root, keyed by the resource model's children-kinds table. Discovered
//! resources are written to storage and announced to the progresser; the
//! traversal itself is an explicit work queue drained by a bounded set of
//! concurrent workers rather than call-stack recursion.

mod engine;

pub use engine::{run_crawler, run_with_enumerators, CrawlOptions};
