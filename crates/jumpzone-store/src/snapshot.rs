//! # Snapshot Repository
//!
//! Whole-collection persistence: load a collection of T, replace a
//! collection of T. That is the entire contract.
//!
//! ## Why Not Row-Per-Entity?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  The engine mutates whole in-memory collections and hands them back.   │
//! │  Row-per-entity storage would force this crate to diff collections    │
//! │  and understand which business operation happened - exactly the       │
//! │  coupling the core/store split exists to prevent.                      │
//! │                                                                        │
//! │  One `snapshots` row per collection:                                   │
//! │    'guests'               → JSON array of Guest                        │
//! │    'sales'                → JSON array of Sale                         │
//! │    'pending_transactions' → JSON array of Transaction                  │
//! │    'drawer_sessions'      → JSON array of CashDrawerSession            │
//! │                                                                        │
//! │  Every replace is a single upsert: atomic by construction.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The active-transaction selection is deliberately NOT persisted here; it
//! is per-counter UI state and the pool revalidates it on rehydration
//! anyway (`TransactionPool::from_parts`).

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use jumpzone_core::{CashDrawerSession, Guest, Sale, Transaction};

/// Well-known collection names.
pub mod collections {
    /// All registered guests and their waiver records.
    pub const GUESTS: &str = "guests";
    /// All finalized sales.
    pub const SALES: &str = "sales";
    /// Open orders awaiting checkout.
    pub const PENDING_TRANSACTIONS: &str = "pending_transactions";
    /// Cash drawer sessions, open and closed.
    pub const DRAWER_SESSIONS: &str = "drawer_sessions";
}

/// Repository for whole-collection snapshots.
#[derive(Debug, Clone)]
pub struct Snapshots {
    pool: SqlitePool,
}

impl Snapshots {
    /// Creates a new snapshot repository.
    pub fn new(pool: SqlitePool) -> Self {
        Snapshots { pool }
    }

    /// Loads a collection. A collection never written yet loads as empty.
    pub async fn load<T: DeserializeOwned>(&self, collection: &str) -> StoreResult<Vec<T>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT payload FROM snapshots WHERE collection = ?1")
                .bind(collection)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            None => Ok(Vec::new()),
            Some((payload,)) => {
                serde_json::from_str(&payload).map_err(|e| StoreError::corrupt(collection, e))
            }
        }
    }

    /// Replaces a collection with the given items.
    ///
    /// A single upsert; either the whole new collection lands or nothing
    /// changes.
    pub async fn replace<T: Serialize>(&self, collection: &str, items: &[T]) -> StoreResult<()> {
        let payload =
            serde_json::to_string(items).map_err(|e| StoreError::encode(collection, e))?;

        sqlx::query(
            r#"
            INSERT INTO snapshots (collection, payload, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(collection) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(collection)
        .bind(payload)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!(collection, items = items.len(), "Snapshot replaced");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Typed conveniences
    // -------------------------------------------------------------------------

    /// Loads all guests.
    pub async fn load_guests(&self) -> StoreResult<Vec<Guest>> {
        self.load(collections::GUESTS).await
    }

    /// Replaces all guests.
    pub async fn replace_guests(&self, guests: &[Guest]) -> StoreResult<()> {
        self.replace(collections::GUESTS, guests).await
    }

    /// Loads all finalized sales.
    pub async fn load_sales(&self) -> StoreResult<Vec<Sale>> {
        self.load(collections::SALES).await
    }

    /// Replaces all finalized sales.
    pub async fn replace_sales(&self, sales: &[Sale]) -> StoreResult<()> {
        self.replace(collections::SALES, sales).await
    }

    /// Loads the pending transactions.
    pub async fn load_pending_transactions(&self) -> StoreResult<Vec<Transaction>> {
        self.load(collections::PENDING_TRANSACTIONS).await
    }

    /// Replaces the pending transactions.
    pub async fn replace_pending_transactions(
        &self,
        transactions: &[Transaction],
    ) -> StoreResult<()> {
        self.replace(collections::PENDING_TRANSACTIONS, transactions)
            .await
    }

    /// Loads all cash drawer sessions.
    pub async fn load_drawer_sessions(&self) -> StoreResult<Vec<CashDrawerSession>> {
        self.load(collections::DRAWER_SESSIONS).await
    }

    /// Replaces all cash drawer sessions.
    pub async fn replace_drawer_sessions(
        &self,
        sessions: &[CashDrawerSession],
    ) -> StoreResult<()> {
        self.replace(collections::DRAWER_SESSIONS, sessions).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
