//! # Domain Types
//!
//! Core domain types used throughout JumpZone POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Guest       │   │  Transaction    │   │      Sale       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  waiver_signed  │   │  phone(s)       │   │  customer       │       │
//! │  │  guardian/group │   │  guests, cart   │   │  frozen totals  │       │
//! │  └─────────────────┘   │  discount       │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   CartEntry     │   │CashDrawerSession│   │    Deposit      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  catalog ref    │   │  open/close     │   │  amount         │       │
//! │  │  price snapshot │   │  deposits       │   │  recorded_by    │       │
//! │  │  assigned guest │   │  discrepancy    │   │  append-only    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! `CartEntry` freezes the catalog item's name and price at the moment it is
//! added; `Sale` freezes the whole transaction plus its computed totals at
//! checkout. Catalog edits never rewrite history.

use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;
use crate::WAIVER_VALIDITY_MONTHS;

// =============================================================================
// Waiver Status
// =============================================================================

/// Validity of a guest's liability waiver at a point in time.
///
/// Always derived, never stored: a status that was `Valid` this morning can
/// be `Expired` by the afternoon, so every decision point re-evaluates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WaiverStatus {
    /// Signed within the validity window.
    Valid,
    /// Signed, but the validity window has elapsed.
    Expired,
    /// Never signed.
    None,
}

// =============================================================================
// Guest
// =============================================================================

/// A park guest (customer) and their waiver record.
///
/// Created when a waiver is first submitted; updated in place when the guest
/// re-signs. Guests are never hard-deleted.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Guest {
    /// Unique identifier.
    pub id: String,

    /// Full name as written on the waiver.
    pub name: String,

    /// Date of birth; drives minor/guardian rules.
    #[ts(as = "String")]
    pub dob: NaiveDate,

    /// Contact email.
    pub email: String,

    /// Contact phone. Guests sharing a phone form the default group at the
    /// sales counter.
    pub phone: String,

    /// When the current waiver was signed, if ever.
    #[ts(as = "Option<String>")]
    pub waiver_signed_on: Option<DateTime<Utc>>,

    /// Guardian who counter-signed for a minor.
    pub guardian_name: Option<String>,

    /// Identifier of the shared waiver-signing session, for walk-in groups
    /// that signed together.
    pub group_id: Option<String>,

    /// When the shared group waiver was signed.
    #[ts(as = "Option<String>")]
    pub group_waiver_date: Option<DateTime<Utc>>,
}

impl Guest {
    /// Evaluates the waiver's validity at `now`.
    ///
    /// A waiver is valid for [`WAIVER_VALIDITY_MONTHS`] calendar months from
    /// signing. The boundary instant itself is already expired: validity
    /// requires `now < signed + validity`.
    pub fn waiver_status(&self, now: DateTime<Utc>) -> WaiverStatus {
        let Some(signed) = self.waiver_signed_on else {
            return WaiverStatus::None;
        };
        match signed.checked_add_months(Months::new(WAIVER_VALIDITY_MONTHS)) {
            Some(expiry) if now < expiry => WaiverStatus::Valid,
            _ => WaiverStatus::Expired,
        }
    }

    /// When the current waiver lapses, if one was signed.
    pub fn waiver_expires_at(&self) -> Option<DateTime<Utc>> {
        self.waiver_signed_on?.checked_add_months(Months::new(WAIVER_VALIDITY_MONTHS))
    }

    /// Whether the guest is under [`crate::ADULT_AGE_YEARS`] on the given day.
    pub fn is_minor(&self, today: NaiveDate) -> bool {
        crate::guests::age_on(self.dob, today) < crate::ADULT_AGE_YEARS
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Category of a catalog item. Drives jumper-assignment rules: tickets and
/// memberships are redeemed by a named guest, add-ons are not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Timed jump ticket.
    Ticket,
    /// Merchandise or concession (socks, drinks, food).
    Addon,
    /// Multi-visit membership.
    Membership,
}

/// An item offered for sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CatalogItem {
    /// Unique identifier.
    pub id: String,

    /// Display name shown on the sales grid and the receipt.
    pub name: String,

    /// Price in paise.
    pub price_paise: i64,

    /// Category (ticket / add-on / membership).
    pub kind: ItemKind,

    /// Jump duration for timed tickets; `None` for everything else.
    pub duration_minutes: Option<i64>,
}

impl CatalogItem {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_paise(self.price_paise)
    }
}

// =============================================================================
// Cart Entry
// =============================================================================

/// One unit of a catalog item inside a transaction's cart.
///
/// ## Design Notes
/// - Name and price are frozen at add time (snapshot pattern).
/// - Quantity is modeled as repetition: three 1-hour tickets are three
///   entries, because each is redeemed by a different jumper.
/// - `assigned_guest_name` is cached alongside the id so receipts and the
///   cart UI never need a guest lookup.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartEntry {
    /// Catalog item id this entry was created from.
    pub item_id: String,

    /// Item name at time of adding (frozen).
    pub name: String,

    /// Price in paise at time of adding (frozen).
    pub price_paise: i64,

    /// Category tag carried from the catalog item.
    pub kind: ItemKind,

    /// Guest redeeming this entry, for tickets and memberships.
    pub assigned_guest_id: Option<String>,

    /// Cached display name of the assigned guest.
    pub assigned_guest_name: Option<String>,
}

impl CartEntry {
    /// Creates an unassigned entry from a catalog item.
    pub fn from_item(item: &CatalogItem) -> Self {
        CartEntry {
            item_id: item.id.clone(),
            name: item.name.clone(),
            price_paise: item.price_paise,
            kind: item.kind,
            assigned_guest_id: None,
            assigned_guest_name: None,
        }
    }

    /// Returns the price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_paise(self.price_paise)
    }

    /// Whether this entry is the kind that carries a jumper assignment.
    /// Add-ons never do.
    #[inline]
    pub fn carries_assignment(&self) -> bool {
        !matches!(self.kind, ItemKind::Addon)
    }

    /// Drops any assignment on this entry.
    pub fn clear_assignment(&mut self) {
        self.assigned_guest_id = None;
        self.assigned_guest_name = None;
    }
}

// =============================================================================
// Discount
// =============================================================================

/// Discount applied to a whole transaction.
///
/// The *effective* amount is always clamped to the subtotal when billing is
/// computed; storing an oversized fixed discount is legal, billing just
/// caps it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Discount {
    /// Percentage of the subtotal, in basis points (1000 = 10%).
    Percentage { bps: u32 },
    /// Absolute amount in paise.
    Fixed { amount_paise: i64 },
}

impl Discount {
    /// No discount.
    pub const fn none() -> Self {
        Discount::Percentage { bps: 0 }
    }
}

impl Default for Discount {
    fn default() -> Self {
        Discount::none()
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// An open order at the sales counter.
///
/// Lives in the pending pool from the moment a guest group is looked up
/// until checkout or explicit deletion. Everything on it is mutable until
/// the `Sale` snapshot is taken.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Transaction {
    /// Unique identifier.
    pub id: String,

    /// Display phone string. After merges this holds several numbers joined
    /// by [`crate::PHONE_JOIN`]; split on that to recover the set.
    pub phone: String,

    /// Guests in scope for this order, in arrival order. The first guest is
    /// the default "primary" contact.
    pub guests: Vec<Guest>,

    /// Cart entries in add order.
    pub cart: Vec<CartEntry>,

    /// Transaction-level discount.
    pub discount: Discount,
}

impl Transaction {
    /// Creates a fresh transaction for a guest group.
    pub fn new(phone: impl Into<String>, guests: Vec<Guest>) -> Self {
        Transaction {
            id: Uuid::new_v4().to_string(),
            phone: phone.into(),
            guests,
            cart: Vec::new(),
            discount: Discount::none(),
        }
    }

    /// The individual phone numbers this transaction answers to.
    pub fn phones(&self) -> impl Iterator<Item = &str> {
        self.phone.split(crate::PHONE_JOIN)
    }

    /// Whether the given phone is one of this transaction's numbers.
    pub fn has_phone(&self, phone: &str) -> bool {
        self.phones().any(|p| p == phone)
    }

    /// Looks up a guest on this transaction by id.
    pub fn guest(&self, guest_id: &str) -> Option<&Guest> {
        self.guests.iter().find(|g| g.id == guest_id)
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale was paid. Cash is the one the drawer cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment; feeds drawer reconciliation.
    Cash,
    /// Card payment on an external terminal.
    Card,
    /// UPI payment (GPay, PhonePe, Paytm, ...).
    Upi,
}

// =============================================================================
// Sale
// =============================================================================

/// A completed, immutable sale record.
///
/// Uses the snapshot pattern: the cart and all computed figures are frozen
/// at checkout. Nothing here is ever recomputed or mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Sale {
    /// Unique identifier.
    pub id: String,

    /// Primary customer: the first assigned jumper, else the transaction's
    /// first guest.
    pub customer_id: String,

    /// Display name; suffixed with " & group" when several guests were in
    /// scope.
    pub customer_name: String,

    /// Cart entries exactly as sold, assignments included.
    pub items: Vec<CartEntry>,

    /// Sum of entry prices, in paise.
    pub subtotal_paise: i64,

    /// Effective (clamped) discount, in paise.
    pub discount_paise: i64,

    /// GST charged, in paise.
    pub gst_paise: i64,

    /// Amount tendered: subtotal - discount + GST, in paise.
    pub total_paise: i64,

    /// When the sale was completed.
    #[ts(as = "String")]
    pub date: DateTime<Utc>,

    /// Tender used.
    pub payment_method: PaymentMethod,
}

impl Sale {
    /// Returns the subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_paise(self.subtotal_paise)
    }

    /// Returns the effective discount as Money.
    #[inline]
    pub fn discount(&self) -> Money {
        Money::from_paise(self.discount_paise)
    }

    /// Returns the GST charged as Money.
    #[inline]
    pub fn gst(&self) -> Money {
        Money::from_paise(self.gst_paise)
    }

    /// Returns the grand total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_paise(self.total_paise)
    }
}

// =============================================================================
// Cash Drawer
// =============================================================================

/// Lifecycle state of a cash drawer session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    /// Shift in progress; deposits may be recorded.
    Open,
    /// Shift ended and reconciled; immutable from here on.
    Closed,
}

/// Cash physically moved from the drawer to the safe mid-shift.
/// Append-only within a session.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Deposit {
    /// Unique identifier.
    pub id: String,

    /// Amount moved, in paise. Always positive.
    pub amount_paise: i64,

    /// Staff code of whoever recorded the deposit.
    pub recorded_by: String,

    /// Optional free-text note ("mid-day safe drop").
    pub notes: Option<String>,

    /// When the deposit was recorded.
    #[ts(as = "String")]
    pub recorded_at: DateTime<Utc>,
}

impl Deposit {
    /// Returns the deposited amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_paise(self.amount_paise)
    }
}

/// Evidence attached to a discrepancy explanation (photo of a torn note,
/// a till slip, ...). The payload is an opaque base64 data URL supplied by
/// the caller.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscrepancyAttachment {
    /// Original file name.
    pub name: String,

    /// MIME type of the payload.
    pub mime_type: String,

    /// Base64 data URL.
    pub data: String,
}

/// One cashier shift on the register, from float-in to reconciliation.
///
/// ## Invariants
/// - `deposits` is append-only while the session is `Open`
/// - Once `Closed`, nothing mutates the session again
/// - At most one session is `Open` at a time, system-wide; the caller
///   enforces this with [`crate::drawer::find_open_session`]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CashDrawerSession {
    /// Unique identifier.
    pub id: String,

    /// When the shift started.
    #[ts(as = "String")]
    pub opening_time: DateTime<Utc>,

    /// When the shift ended; `None` while open.
    #[ts(as = "Option<String>")]
    pub closing_time: Option<DateTime<Utc>>,

    /// Float counted into the drawer at open, in paise.
    pub opening_balance_paise: i64,

    /// Cash counted at close, in paise; `None` while open.
    pub closing_balance_paise: Option<i64>,

    /// Staff code of the opener.
    pub opened_by: String,

    /// Staff code of the closer; `None` while open.
    pub closed_by: Option<String>,

    /// Open or closed.
    pub status: SessionStatus,

    /// Note recorded at open when the float differed from the suggested
    /// figure.
    pub opening_note: Option<String>,

    /// Safe drops recorded during the shift.
    pub deposits: Vec<Deposit>,

    /// Explanation for a nonzero discrepancy at close.
    pub discrepancy_reason: Option<String>,

    /// Supporting evidence for the discrepancy.
    pub discrepancy_attachment: Option<DiscrepancyAttachment>,
}

// =============================================================================
// Unit Tests
// =============================================================================
