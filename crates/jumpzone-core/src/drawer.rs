//! # Cash Drawer Reconciliation
//!
//! Tracks a cashier's register session and computes expected vs. actual
//! cash.
//!
//! ## The Reconciliation Formula
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Expected Cash in Drawer                             │
//! │                                                                         │
//! │  opening balance (float counted in at shift start)                     │
//! │    + cash-tender sale totals inside the session window                 │
//! │    − safe drops (deposits) recorded during the shift                   │
//! │  ───────────────────────────────────────────────────                   │
//! │  = expected cash                                                       │
//! │                                                                         │
//! │  Worked example:                                                       │
//! │    float ₹2500, one cash sale ₹850, one deposit ₹1000                  │
//! │    expected = 2500 + 850 − 1000 = ₹2350                                │
//! │                                                                         │
//! │  At close:  discrepancy = counted − expected                           │
//! │    positive ──► over  (too much cash in the drawer)                    │
//! │    negative ──► short (missing cash)                                   │
//! │                                                                         │
//! │  Card and UPI tenders never touch the drawer and never appear here.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Who May Close
//! The opener always may. Anyone else needs the close-any-session
//! permission (managers and admins hold it by default). A refused close
//! leaves the session OPEN and untouched.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::staff::{permissions, PermissionGate, StaffUser};
use crate::types::{
    CashDrawerSession, Deposit, DiscrepancyAttachment, PaymentMethod, Sale, SessionStatus,
};
use crate::validation::{validate_amount_paise, validate_note};

impl CashDrawerSession {
    /// Opens a new register session with the counted float.
    ///
    /// The engine accepts any non-negative balance; prompting for a note
    /// when the float differs from the suggested figure is the caller's
    /// convention.
    pub fn open(
        opening_balance: Money,
        opened_by: &StaffUser,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> CoreResult<Self> {
        validate_amount_paise("opening balance", opening_balance.paise())?;
        if let Some(note) = note.as_deref() {
            validate_note(note)?;
        }

        Ok(CashDrawerSession {
            id: Uuid::new_v4().to_string(),
            opening_time: now,
            closing_time: None,
            opening_balance_paise: opening_balance.paise(),
            closing_balance_paise: None,
            opened_by: opened_by.code.clone(),
            closed_by: None,
            status: SessionStatus::Open,
            opening_note: note.filter(|n| !n.trim().is_empty()),
            deposits: Vec::new(),
            discrepancy_reason: None,
            discrepancy_attachment: None,
        })
    }

    /// Whether a sale falls inside this session's window.
    ///
    /// The window is `[opening_time, closing_time]`, open-ended while the
    /// session is still running.
    fn window_contains(&self, at: DateTime<Utc>, until: Option<DateTime<Utc>>) -> bool {
        self.opening_time <= at && until.map_or(true, |end| at <= end)
    }

    /// Total of cash-tender sales inside the session window.
    pub fn cash_sales_total(&self, sales: &[Sale]) -> Money {
        self.cash_sales_until(sales, self.closing_time)
    }

    fn cash_sales_until(&self, sales: &[Sale], until: Option<DateTime<Utc>>) -> Money {
        Money::from_paise(
            sales
                .iter()
                .filter(|s| s.payment_method == PaymentMethod::Cash)
                .filter(|s| self.window_contains(s.date, until))
                .map(|s| s.total_paise)
                .sum(),
        )
    }

    /// Total of deposits recorded so far.
    pub fn deposits_total(&self) -> Money {
        Money::from_paise(self.deposits.iter().map(|d| d.amount_paise).sum())
    }

    /// The cash the drawer should contain right now:
    /// `opening balance + cash sales − deposits`.
    pub fn expected_cash(&self, sales: &[Sale]) -> Money {
        self.expected_cash_until(sales, self.closing_time)
    }

    fn expected_cash_until(&self, sales: &[Sale], until: Option<DateTime<Utc>>) -> Money {
        Money::from_paise(self.opening_balance_paise) + self.cash_sales_until(sales, until)
            - self.deposits_total()
    }

    /// Records a safe drop.
    ///
    /// ## Validation
    /// - session must be OPEN
    /// - `0 < amount ≤ expected cash in drawer`
    ///
    /// Nothing is appended when validation fails.
    pub fn record_deposit(
        &mut self,
        amount: Money,
        recorded_by: &StaffUser,
        notes: Option<String>,
        sales: &[Sale],
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        if self.status == SessionStatus::Closed {
            return Err(CoreError::SessionClosed {
                session_id: self.id.clone(),
            });
        }
        if !amount.is_positive() {
            return Err(ValidationError::MustBePositive {
                field: "deposit amount".to_string(),
            }
            .into());
        }
        if let Some(notes) = notes.as_deref() {
            validate_note(notes)?;
        }
        let expected = self.expected_cash(sales);
        if amount > expected {
            return Err(ValidationError::DepositExceedsExpected {
                requested_paise: amount.paise(),
                expected_paise: expected.paise(),
            }
            .into());
        }

        self.deposits.push(Deposit {
            id: Uuid::new_v4().to_string(),
            amount_paise: amount.paise(),
            recorded_by: recorded_by.code.clone(),
            notes: notes.filter(|n| !n.trim().is_empty()),
            recorded_at: now,
        });
        Ok(())
    }

    /// Closes the session against the counted cash.
    ///
    /// ## Preconditions
    /// - session must be OPEN
    /// - `counted` must be non-negative
    /// - `closed_by` must be the opener, or hold
    ///   [`permissions::CLOSE_ANY_DRAWER_SESSION`]
    ///
    /// Requiring a reason for a nonzero discrepancy is the caller's
    /// convention; the engine stores whatever explanation it is given.
    ///
    /// ## Returns
    /// The discrepancy, `counted − expected` (positive = over, negative =
    /// short). On error the session is left OPEN and unmodified.
    pub fn close(
        &mut self,
        counted: Money,
        closed_by: &StaffUser,
        gate: &dyn PermissionGate,
        reason: Option<String>,
        attachment: Option<DiscrepancyAttachment>,
        sales: &[Sale],
        now: DateTime<Utc>,
    ) -> CoreResult<Money> {
        if self.status == SessionStatus::Closed {
            return Err(CoreError::SessionClosed {
                session_id: self.id.clone(),
            });
        }
        validate_amount_paise("closing balance", counted.paise())?;
        if let Some(reason) = reason.as_deref() {
            validate_note(reason)?;
        }
        if closed_by.code != self.opened_by
            && !gate.has_permission(closed_by, permissions::CLOSE_ANY_DRAWER_SESSION)
        {
            return Err(CoreError::PermissionDenied {
                user: closed_by.code.clone(),
                permission: permissions::CLOSE_ANY_DRAWER_SESSION.to_string(),
            });
        }

        let expected = self.expected_cash_until(sales, Some(now));
        let discrepancy = counted - expected;

        self.closing_time = Some(now);
        self.closing_balance_paise = Some(counted.paise());
        self.closed_by = Some(closed_by.code.clone());
        self.discrepancy_reason = reason.filter(|r| !r.trim().is_empty());
        self.discrepancy_attachment = attachment;
        self.status = SessionStatus::Closed;

        Ok(discrepancy)
    }

    /// The discrepancy of a closed session, recomputed from its stored
    /// figures. `None` while the session is still open.
    pub fn discrepancy(&self, sales: &[Sale]) -> Option<Money> {
        let counted = Money::from_paise(self.closing_balance_paise?);
        Some(counted - self.expected_cash(sales))
    }
}

/// The single OPEN session, if any.
///
/// The one-open-session rule is the caller's to enforce: check this before
/// opening another.
pub fn find_open_session(sessions: &[CashDrawerSession]) -> Option<&CashDrawerSession> {
    sessions.iter().find(|s| s.status == SessionStatus::Open)
}

/// Sessions ordered newest-opened first, for the history screen.
pub fn sessions_newest_first(sessions: &[CashDrawerSession]) -> Vec<&CashDrawerSession> {
    let mut sorted: Vec<&CashDrawerSession> = sessions.iter().collect();
    sorted.sort_by(|a, b| b.opening_time.cmp(&a.opening_time));
    sorted
}

// =============================================================================
// Unit Tests
// =============================================================================
