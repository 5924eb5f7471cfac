//! # Repository Module
//!
//! The storage contract every handler talks to, and its two implementations.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   handler ──► Arc<dyn Repository<OrderSession>>                         │
//! │                         │                                               │
//! │           ┌─────────────┴──────────────┐                                │
//! │           ▼                            ▼                                │
//! │   SqliteRepository<T>           MemoryRepository<T>                     │
//! │   documents table, JSON body    RwLock<Vec<(id, T)>>                    │
//! │   (production)                  (tests)                                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! [`Repository::update_by_id`] is a blind overwrite. Read-modify-write
//! callers use [`Repository::replace_if_unchanged`] instead, which only
//! succeeds while the stored body still equals the copy they loaded:
//!
//! ```text
//! A: find_by_id ──► created            B: find_by_id ──► created
//! A: mark_cancelled, replace ──► ok
//!                                      B: add_item, replace ──► StaleWrite
//! ```
//!
//! ## Cancellation
//! Dropping a returned future cancels the operation.
//!
//! ## Available Repositories
//!
//! - [`SqliteRepository`] - SQLite-backed document collection
//! - [`MemoryRepository`] - In-process collection with the same contract

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use serde_json::Value;

use crate::document::Document;
use crate::error::{DbError, DbResult};

pub use memory::MemoryRepository;
pub use sqlite::SqliteRepository;

/// Generic document storage.
#[async_trait]
pub trait Repository<T: Document>: Send + Sync {
    /// Inserts a new document. Fails with `UniqueViolation` if the id is taken.
    async fn create(&self, doc: &T) -> DbResult<()>;

    /// Every document in the collection, oldest first.
    async fn read_all(&self) -> DbResult<Vec<T>>;

    async fn find_by_id(&self, id: &str) -> DbResult<Option<T>>;

    /// Documents whose top-level `field` equals `value`, oldest first.
    async fn find_by_field(&self, field: &str, value: &Value) -> DbResult<Vec<T>>;

    /// Replaces a document. Fails with `NotFound` if nothing matched.
    async fn update_by_id(&self, id: &str, doc: &T) -> DbResult<()>;

    /// Replaces a document only if its stored body still equals `current`.
    ///
    /// Fails with `StaleWrite` if another write landed after `current` was
    /// read, and with `NotFound` if the document is gone.
    async fn replace_if_unchanged(&self, id: &str, current: &T, doc: &T) -> DbResult<()>;

    /// Fails with `NotFound` if nothing matched.
    async fn delete_by_id(&self, id: &str) -> DbResult<()>;

    async fn count(&self) -> DbResult<u64>;

    /// False on any storage error.
    async fn exists(&self, id: &str) -> bool;
}

/// Field names are spliced into a JSON path, so only plain identifiers pass.
pub(crate) fn validate_field(field: &str) -> DbResult<()> {
    let valid = !field.is_empty()
        && field
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(DbError::InvalidField(field.to_string()))
    }
}

// =============================================================================
// Contract Tests
// =============================================================================
