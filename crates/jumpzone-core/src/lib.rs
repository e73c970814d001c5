//! # jumpzone-core: Pure Business Logic for JumpZone POS
//!
//! This crate is the **heart** of JumpZone POS, the front-of-house system for
//! a trampoline park: ticket sales, waiver tracking, pending-order juggling
//! and end-of-shift cash reconciliation. It contains all business logic as
//! pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       JumpZone POS Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     Front-of-house UI                           │   │
//! │  │   Search UI ──► Cart UI ──► Assign Jumpers ──► Pay ──► Receipt  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ jumpzone-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────┐ ┌─────────┐ ┌───────────┐ ┌──────────┐ ┌───────┐ │   │
//! │  │  │  money  │ │ billing │ │ assignment│ │ register │ │ drawer│ │   │
//! │  │  │  Money  │ │ GST 18% │ │  jumpers  │ │ pending  │ │ cash  │ │   │
//! │  │  │ TaxRate │ │ discount│ │  waivers  │ │ orders   │ │ recon │ │   │
//! │  │  └─────────┘ └─────────┘ └───────────┘ └──────────┘ └───────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          jumpzone-store (snapshot persistence, SQLite)          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Guest, Transaction, Sale, CashDrawerSession, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`guests`] - Waiver signing, group codes, guest-group resolution
//! - [`assignment`] - Cart operations and jumper assignment
//! - [`billing`] - Subtotal / discount / GST / total derivation
//! - [`register`] - Pending-transaction pool: resume, merge, delete, checkout
//! - [`drawer`] - Cash drawer sessions and reconciliation
//! - [`staff`] - Staff users, roles and the permission gate
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **No Clock Reads**: Time-sensitive functions take `now` as an argument
//! 4. **Integer Money**: All monetary values are in paise (i64) to avoid float errors
//! 5. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use jumpzone_core::money::Money;
//! use jumpzone_core::GST_RATE;
//!
//! // Create money from paise (never from floats!)
//! let taxable = Money::from_paise(108_000); // ₹1080.00
//!
//! // GST on ₹1080.00 at 18% = ₹194.40
//! let gst = taxable.calculate_tax(GST_RATE);
//! assert_eq!(gst.paise(), 19_440);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod assignment;
pub mod billing;
pub mod drawer;
pub mod error;
pub mod guests;
pub mod money;
pub mod register;
pub mod staff;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use jumpzone_core::Money` instead of
// `use jumpzone_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, TaxRate};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Goods and Services Tax applied to every sale: a flat 18%.
///
/// ## Why a constant?
/// The park operates in a single jurisdiction with a single GST slab. Per-item
/// tax rates would be over-engineering here; if the slab changes, it changes
/// everywhere at once.
pub const GST_RATE: TaxRate = TaxRate::from_bps(1800);

/// How long a signed waiver remains valid, in calendar months.
///
/// Calendar months (not a fixed day count) so that a waiver signed on
/// 5 March expires on 5 March the following year, leap years included.
pub const WAIVER_VALIDITY_MONTHS: u32 = 12;

/// Separator used when a transaction spans several phone numbers after a
/// merge. The display string `"98765... & 91234..."` is also the storage
/// format; split on this to recover the set.
pub const PHONE_JOIN: &str = " & ";

/// Maximum entries allowed in a single cart.
///
/// ## Business Reason
/// Prevents runaway carts and ensures reasonable transaction sizes.
pub const MAX_CART_ENTRIES: usize = 100;

/// Age (in completed years) at which a guest no longer needs a guardian
/// signature on their waiver.
pub const ADULT_AGE_YEARS: i32 = 18;
