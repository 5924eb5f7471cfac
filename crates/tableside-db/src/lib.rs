//! # tableside-db: Persistence for Tableside
//!
//! Stores order sessions, stores, seats and managers as JSON documents in
//! SQLite, behind the generic [`Repository`] contract.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  axum handler (apps/api)                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                   tableside-db (THIS CRATE)                     │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐   │    │
//! │  │   │   Database    │    │ Repository<T>  │    │  Migrations  │   │    │
//! │  │   │   (pool.rs)   │    │  SqliteRepo    │    │  (embedded)  │   │    │
//! │  │   │  SqlitePool   │◄───│  MemoryRepo    │    │ 001_docs.sql │   │    │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘   │    │
//! │  │                                                                 │    │
//! │  │   Environment ──► collection prefix (dev_, stg_, test_, none)   │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  tableside.db (SQLite, WAL)                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use tableside_db::{Database, DbConfig, Environment, Repository};
//!
//! let db = Database::new(DbConfig::new("./tableside.db"), Environment::Development).await?;
//! db.orders().create(&order).await?;
//! ```

pub mod document;
pub mod environment;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use document::Document;
pub use environment::Environment;
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::{MemoryRepository, Repository, SqliteRepository};
