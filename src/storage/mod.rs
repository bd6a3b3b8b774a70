//! Storage module for persisting discovered inventory
//!
//! This module defines the transactional sink the crawler writes into, with
//! two implementations behind one trait:
//! - [`MemoryStorage`]: keyed in-memory mapping, used by tests and dry runs
//! - [`SqliteStorage`]: durable backing with all-or-nothing sessions
//!
//! A session is opened by the caller before crawling and released on every
//! exit path; the crawler only ever writes into an already-open session.

mod memory;
mod schema;
mod sqlite;
mod traits;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};
