//! # jumpzone-store: Persistence Layer for JumpZone POS
//!
//! This crate provides durable storage for JumpZone POS collections.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      JumpZone POS Data Flow                             │
//! │                                                                         │
//! │  UI shell / command layer                                              │
//! │       │   load → mutate via jumpzone-core → replace                    │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   jumpzone-store (THIS CRATE)                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │    Store      │    │   Snapshots   │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (snapshot.rs) │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ load<T>()     │    │ 001_snap...  │  │   │
//! │  │   │ WAL mode      │    │ replace<T>()  │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (one `snapshots` row per collection)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why Whole-Collection Snapshots?
//! The engine is pure: it takes collections in, returns new collections out.
//! Persisting anything finer-grained would force the storage layer to
//! understand business state transitions. One row per collection keeps the
//! contract at "load collection of T; replace collection of T" and makes
//! every write atomic by construction.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use jumpzone_store::{Store, StoreConfig};
//!
//! let store = Store::new(StoreConfig::new("path/to/jumpzone.db")).await?;
//!
//! let mut guests = store.snapshots().load_guests().await?;
//! // ... mutate guests via jumpzone-core ...
//! store.snapshots().replace_guests(&guests).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod snapshot;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use pool::{Store, StoreConfig};
pub use snapshot::{collections, Snapshots};
