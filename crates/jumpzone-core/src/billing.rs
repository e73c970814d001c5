//! # Billing
//!
//! Derives money figures from a transaction, deterministically.
//!
//! ## The Four Figures
//! ```text
//! subtotal        = Σ entry.price
//! discount amount = percentage-of-subtotal or fixed, clamped to subtotal
//! GST             = (subtotal − discount) × 18%
//! grand total     = subtotal − discount + GST
//! ```
//!
//! All four are pure derived values, recomputed from the current cart and
//! discount on every read. They are stored exactly once: inside the `Sale`
//! snapshot at checkout.
//!
//! The clamp is the only non-obvious rule: a ₹5000 voucher against a ₹800
//! cart discounts ₹800, never more. The bill cannot go negative and GST is
//! never charged on money nobody paid.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::money::Money;
use crate::types::{Discount, Transaction};
use crate::validation::validate_discount;
use crate::GST_RATE;

impl Transaction {
    /// Applies a discount to the transaction after validating it.
    ///
    /// Whether the acting user may discount at all
    /// ([`crate::staff::permissions::APPLY_DISCOUNT`]) is checked by the
    /// caller before offering the control.
    pub fn set_discount(&mut self, discount: Discount) -> CoreResult<()> {
        validate_discount(&discount)?;
        self.discount = discount;
        Ok(())
    }
}

/// Sum of cart entry prices.
pub fn subtotal(tx: &Transaction) -> Money {
    Money::from_paise(tx.cart.iter().map(|e| e.price_paise).sum())
}

/// Effective discount: the configured discount, clamped to the subtotal.
pub fn discount_amount(tx: &Transaction) -> Money {
    let subtotal = subtotal(tx);
    let raw = match tx.discount {
        Discount::Percentage { bps } => subtotal.percentage(bps),
        Discount::Fixed { amount_paise } => Money::from_paise(amount_paise),
    };
    raw.min(subtotal)
}

/// GST charged on the discounted amount.
pub fn gst_amount(tx: &Transaction) -> Money {
    (subtotal(tx) - discount_amount(tx)).calculate_tax(GST_RATE)
}

/// What the customer pays: subtotal − discount + GST.
pub fn grand_total(tx: &Transaction) -> Money {
    let subtotal = subtotal(tx);
    let discount = discount_amount(tx);
    subtotal - discount + (subtotal - discount).calculate_tax(GST_RATE)
}

/// All four billing figures of a transaction, for display and for freezing
/// into a `Sale` at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BillingSummary {
    /// Sum of entry prices, in paise.
    pub subtotal_paise: i64,
    /// Effective (clamped) discount, in paise.
    pub discount_paise: i64,
    /// GST charged, in paise.
    pub gst_paise: i64,
    /// Grand total, in paise.
    pub total_paise: i64,
}

impl From<&Transaction> for BillingSummary {
    fn from(tx: &Transaction) -> Self {
        let subtotal = subtotal(tx);
        let discount = discount_amount(tx);
        let gst = (subtotal - discount).calculate_tax(GST_RATE);
        BillingSummary {
            subtotal_paise: subtotal.paise(),
            discount_paise: discount.paise(),
            gst_paise: gst.paise(),
            total_paise: (subtotal - discount + gst).paise(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
