//! # jumpzone-advisory: Advisory Text for JumpZone POS
//!
//! Cashier-facing helper texts produced by an LLM backend: waiver
//! boilerplate, safety tips, per-transaction suggestions, discrepancy
//! narratives and jumper-assignment proposals.
//!
//! ## Degradation Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Advisory Request Flow                               │
//! │                                                                         │
//! │  Advisor::transaction_tip(...)                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  build prompt (pure string, see prompts module)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SuggestionProvider::generate(prompt)  ◄── pluggable backend           │
//! │       │                                                                 │
//! │       ├── Ok(text) within the timeout ──► text                         │
//! │       ├── Err(_)                      ──► static fallback (+ warn log) │
//! │       ├── empty response              ──► static fallback              │
//! │       └── timeout elapsed             ──► static fallback              │
//! │                                                                         │
//! │  The caller always gets a String. Checkout and reconciliation never    │
//! │  wait on, or fail because of, this crate.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod prompts;
pub mod provider;

// =============================================================================
// Re-exports
// =============================================================================

pub use provider::{Advisor, AdvisoryError, NoSuggestions, SuggestionProvider};
