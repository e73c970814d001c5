//! # Register: the Pending Transaction Pool
//!
//! Manages the pool of concurrently open orders and the single "active" one
//! the cashier is editing.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Pending Transaction Pool                             │
//! │                                                                         │
//! │  Counter search resolves a guest group                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  start_or_resume()                                                     │
//! │       ├── phone already on a pending order ──► Resumed (switch to it)  │
//! │       ├── active order has empty cart ───────► Repurposed (in place)   │
//! │       └── otherwise ─────────────────────────► Created (park the old   │
//! │                                                order, open a new one)  │
//! │                                                                         │
//! │  merge_into_active([ids]) ──► carts concatenated, guests and phones    │
//! │                               deduped, sources leave the pool          │
//! │                                                                         │
//! │  delete(id) ──► order abandoned; active cleared if it was this one     │
//! │                                                                         │
//! │  finalize(method) ──► eligibility re-checked, Sale snapshot frozen,    │
//! │                       order leaves the pool, active cleared            │
//! │                                                                         │
//! │  The active selection is an explicit enum, not a UI artifact: every    │
//! │  transition above is checkable without rendering anything.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::assignment::checkout_eligibility;
use crate::billing::BillingSummary;
use crate::error::{CoreError, CoreResult};
use crate::guests::GuestGroup;
use crate::types::{Guest, PaymentMethod, Sale, Transaction};
use crate::PHONE_JOIN;

// =============================================================================
// Active Selection
// =============================================================================

/// Which pending transaction the cashier is editing, if any.
///
/// Deliberately its own type rather than an `Option<String>` buried in UI
/// state: merge/delete/switch transitions update it explicitly and tests
/// assert on it directly.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ActiveTransaction {
    /// Nothing selected; the counter must run a new search.
    #[default]
    None,
    /// The pending transaction with this id is being edited.
    Selected(String),
}

impl ActiveTransaction {
    /// The selected id, if any.
    pub fn id(&self) -> Option<&str> {
        match self {
            ActiveTransaction::None => None,
            ActiveTransaction::Selected(id) => Some(id),
        }
    }

    /// Whether the given id is the selected one.
    pub fn is(&self, id: &str) -> bool {
        self.id() == Some(id)
    }
}

/// Outcome of [`TransactionPool::start_or_resume`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// An existing pending transaction already covered the phone; it is now
    /// active.
    Resumed(String),
    /// The previously active transaction had an empty cart and was reused
    /// in place for the new group.
    Repurposed(String),
    /// A new transaction was created and made active.
    Created(String),
}

impl StartOutcome {
    /// The id of the transaction that is now active.
    pub fn transaction_id(&self) -> &str {
        match self {
            StartOutcome::Resumed(id)
            | StartOutcome::Repurposed(id)
            | StartOutcome::Created(id) => id,
        }
    }
}

// =============================================================================
// Transaction Pool
// =============================================================================

/// The pool of pending transactions plus the active selection.
///
/// All mutations are whole-value, synchronous and atomic per call; callers
/// persist the pool between operations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionPool {
    pending: Vec<Transaction>,
    active: ActiveTransaction,
}

impl TransactionPool {
    /// An empty pool.
    pub fn new() -> Self {
        TransactionPool::default()
    }

    /// Rebuilds a pool from persisted parts.
    ///
    /// An active id that no longer matches a pending transaction is
    /// discarded rather than trusted.
    pub fn from_parts(pending: Vec<Transaction>, active: ActiveTransaction) -> Self {
        let active = match active {
            ActiveTransaction::Selected(id) if pending.iter().any(|t| t.id == id) => {
                ActiveTransaction::Selected(id)
            }
            _ => ActiveTransaction::None,
        };
        TransactionPool { pending, active }
    }

    /// Splits the pool into its persistable parts.
    pub fn into_parts(self) -> (Vec<Transaction>, ActiveTransaction) {
        (self.pending, self.active)
    }

    /// The pending transactions, in creation order.
    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    /// The current active selection.
    pub fn active_selection(&self) -> &ActiveTransaction {
        &self.active
    }

    /// The active transaction, if one is selected.
    pub fn active(&self) -> Option<&Transaction> {
        let id = self.active.id()?;
        self.pending.iter().find(|t| t.id == id)
    }

    /// Mutable access to the active transaction (cart edits, discounts).
    pub fn active_mut(&mut self) -> Option<&mut Transaction> {
        let id = self.active.id()?.to_string();
        self.pending.iter_mut().find(|t| t.id == id)
    }

    /// Looks up a pending transaction by id.
    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.pending.iter().find(|t| t.id == id)
    }

    /// Makes the given pending transaction the active one.
    pub fn select(&mut self, id: &str) -> CoreResult<()> {
        if !self.pending.iter().any(|t| t.id == id) {
            return Err(CoreError::TransactionNotFound(id.to_string()));
        }
        self.active = ActiveTransaction::Selected(id.to_string());
        Ok(())
    }

    /// Starts a transaction for a resolved guest group, resuming or
    /// repurposing where possible.
    ///
    /// ## Behavior
    /// 1. A pending transaction whose phone set contains the group's primary
    ///    phone is resumed.
    /// 2. Otherwise, if the active transaction has an empty cart it is
    ///    repurposed in place (its id survives, its group is replaced).
    /// 3. Otherwise a new transaction is appended and selected; the old
    ///    active one stays parked in the pool.
    pub fn start_or_resume(&mut self, group: GuestGroup) -> StartOutcome {
        if let Some(existing) = self
            .pending
            .iter()
            .find(|t| t.has_phone(&group.primary_phone))
        {
            let id = existing.id.clone();
            self.active = ActiveTransaction::Selected(id.clone());
            return StartOutcome::Resumed(id);
        }

        if let Some(active) = self.active_mut() {
            if active.cart.is_empty() {
                active.phone = group.primary_phone;
                active.guests = group.members;
                let id = active.id.clone();
                return StartOutcome::Repurposed(id);
            }
        }

        let tx = Transaction::new(group.primary_phone, group.members);
        let id = tx.id.clone();
        self.pending.push(tx);
        self.active = ActiveTransaction::Selected(id.clone());
        StartOutcome::Created(id)
    }

    /// Merges the given pending transactions into the active one.
    ///
    /// ## Behavior
    /// - Source carts are appended after the active cart, in pool order,
    ///   with their jumper assignments carried over verbatim.
    /// - Guests are unioned by id, first occurrence wins.
    /// - Phone sets are unioned (first-appearance order) and re-joined for
    ///   display.
    /// - Sources leave the pool. Ids not found in the pool - and the active
    ///   id itself - are skipped silently.
    ///
    /// ## Returns
    /// The number of transactions merged in.
    pub fn merge_into_active(&mut self, ids: &[String]) -> CoreResult<usize> {
        let active_id = self
            .active
            .id()
            .ok_or(CoreError::NoActiveTransaction)?
            .to_string();

        // Pull the sources out first so the active borrow below is clean.
        let mut sources = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].id != active_id && ids.contains(&self.pending[i].id) {
                sources.push(self.pending.remove(i));
            } else {
                i += 1;
            }
        }

        let active = self
            .pending
            .iter_mut()
            .find(|t| t.id == active_id)
            .ok_or(CoreError::TransactionNotFound(active_id))?;

        let merged = sources.len();
        let mut phones: Vec<String> = active.phone.split(PHONE_JOIN).map(str::to_string).collect();
        for source in sources {
            active.cart.extend(source.cart);
            for guest in source.guests {
                if !active.guests.iter().any(|g| g.id == guest.id) {
                    active.guests.push(guest);
                }
            }
            for phone in source.phone.split(PHONE_JOIN) {
                if !phones.iter().any(|p| p == phone) {
                    phones.push(phone.to_string());
                }
            }
        }
        active.phone = phones.join(PHONE_JOIN);

        Ok(merged)
    }

    /// Removes a pending transaction outright.
    ///
    /// Clears the active selection if it pointed at the deleted transaction;
    /// the caller must prompt a fresh search in that case.
    pub fn delete(&mut self, id: &str) -> CoreResult<()> {
        let pos = self
            .pending
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| CoreError::TransactionNotFound(id.to_string()))?;
        if self.active.is(id) {
            self.active = ActiveTransaction::None;
        }
        self.pending.remove(pos);
        Ok(())
    }

    /// Checks out the active transaction: re-validates eligibility, freezes
    /// the `Sale` snapshot, removes the transaction from the pool and clears
    /// the active selection.
    ///
    /// On any error the pool is untouched and the transaction remains
    /// pending.
    pub fn finalize(&mut self, method: PaymentMethod, now: DateTime<Utc>) -> CoreResult<Sale> {
        let id = self
            .active
            .id()
            .ok_or(CoreError::NoActiveTransaction)?
            .to_string();
        let pos = self
            .pending
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| CoreError::TransactionNotFound(id.clone()))?;

        checkout_eligibility(&self.pending[pos], now).map_err(|blocker| {
            CoreError::CheckoutIneligible {
                transaction_id: id.clone(),
                reason: blocker.to_string(),
            }
        })?;

        let tx = self.pending.remove(pos);
        self.active = ActiveTransaction::None;
        Ok(build_sale(tx, method, now))
    }
}

/// Freezes a transaction into an immutable sale record.
fn build_sale(tx: Transaction, method: PaymentMethod, now: DateTime<Utc>) -> Sale {
    let summary = BillingSummary::from(&tx);

    // Primary customer: the first jumper actually assigned in cart order,
    // else the transaction's first guest.
    let primary: Option<&Guest> = tx
        .cart
        .iter()
        .filter(|e| e.carries_assignment())
        .find_map(|e| e.assigned_guest_id.as_deref())
        .and_then(|gid| tx.guest(gid))
        .or_else(|| tx.guests.first());

    let customer_id = primary.map(|g| g.id.clone()).unwrap_or_default();
    let customer_name = match primary {
        Some(guest) if tx.guests.len() > 1 => format!("{} & group", guest.name),
        Some(guest) => guest.name.clone(),
        None => String::new(),
    };

    Sale {
        id: Uuid::new_v4().to_string(),
        customer_id,
        customer_name,
        items: tx.cart,
        subtotal_paise: summary.subtotal_paise,
        discount_paise: summary.discount_paise,
        gst_paise: summary.gst_paise,
        total_paise: summary.total_paise,
        date: now,
        payment_method: method,
    }
}

// =============================================================================
// History Helpers
// =============================================================================

/// The most recent prior sale involving any guest of the group, for the
/// "Last Visit" card. `None` means this is their first visit.
pub fn last_visit(sales: &[Sale], guests: &[Guest]) -> Option<DateTime<Utc>> {
    sales
        .iter()
        .filter(|sale| guests.iter().any(|g| g.id == sale.customer_id))
        .map(|sale| sale.date)
        .max()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CatalogItem, ItemKind};
    use chrono::{Duration, NaiveDate};

    fn guest(id: &str, name: &str, phone: &str, now: DateTime<Utc>) -> Guest {
        Guest {
            id: id.to_string(),
            name: name.to_string(),
            dob: NaiveDate::from_ymd_opt(1995, 5, 20).unwrap(),
            email: format!("{id}@example.com"),
            phone: phone.to_string(),
            waiver_signed_on: Some(now - Duration::days(10)),
            guardian_name: None,
            group_id: None,
            group_waiver_date: None,
        }
    }

    fn group(phone: &str, guests: Vec<Guest>) -> GuestGroup {
        GuestGroup {
            primary_phone: phone.to_string(),
            members: guests,
        }
    }

    fn ticket() -> CatalogItem {
        CatalogItem {
            id: "tkt_60".to_string(),
            name: "1 hour jump".to_string(),
            price_paise: 50_000,
            kind: ItemKind::Ticket,
            duration_minutes: Some(60),
        }
    }

    #[test]
    fn test_start_creates_then_resumes() {
        let now = Utc::now();
        let mut pool = TransactionPool::new();

        let first = pool.start_or_resume(group("9876543210", vec![guest("g1", "A", "9876543210", now)]));
        assert!(matches!(first, StartOutcome::Created(_)));
        assert_eq!(pool.pending().len(), 1);

        // Put something in the cart so the active order is not repurposed.
        pool.active_mut().unwrap().add_entry(&ticket(), now).unwrap();

        let second = pool.start_or_resume(group("1234567890", vec![guest("g2", "B", "1234567890", now)]));
        assert!(matches!(second, StartOutcome::Created(_)));
        assert_eq!(pool.pending().len(), 2);

        // Searching the first phone again switches back without creating.
        let third = pool.start_or_resume(group("9876543210", vec![]));
        assert_eq!(third, StartOutcome::Resumed(first.transaction_id().to_string()));
        assert_eq!(pool.pending().len(), 2);
        assert!(pool.active_selection().is(first.transaction_id()));
    }

    #[test]
    fn test_empty_active_transaction_is_repurposed() {
        let now = Utc::now();
        let mut pool = TransactionPool::new();

        let first = pool.start_or_resume(group("9876543210", vec![guest("g1", "A", "9876543210", now)]));
        let second =
            pool.start_or_resume(group("1234567890", vec![guest("g2", "B", "1234567890", now)]));

        assert_eq!(
            second,
            StartOutcome::Repurposed(first.transaction_id().to_string())
        );
        assert_eq!(pool.pending().len(), 1, "no second order was created");
        let active = pool.active().unwrap();
        assert_eq!(active.phone, "1234567890");
        assert_eq!(active.guests[0].id, "g2");
    }

    #[test]
    fn test_merge_concatenates_and_dedupes() {
        let now = Utc::now();
        let mut pool = TransactionPool::new();

        let shared = guest("g1", "Anjali", "8888888888", now);

        let a = pool.start_or_resume(group("8888888888", vec![shared.clone()]));
        pool.active_mut().unwrap().add_entry(&ticket(), now).unwrap();

        pool.start_or_resume(group(
            "9876543210",
            vec![guest("g2", "Aarav", "9876543210", now), shared.clone()],
        ));
        pool.active_mut().unwrap().add_entry(&ticket(), now).unwrap();

        pool.select(a.transaction_id()).unwrap();
        let b_id = pool
            .pending()
            .iter()
            .find(|t| t.id != a.transaction_id())
            .unwrap()
            .id
            .clone();

        let merged = pool.merge_into_active(&[b_id]).unwrap();
        assert_eq!(merged, 1);
        assert_eq!(pool.pending().len(), 1);

        let active = pool.active().unwrap();
        assert_eq!(active.cart.len(), 2);
        assert_eq!(active.phone, "8888888888 & 9876543210");
        // g1 appears once even though both orders carried them.
        let ids: Vec<_> = active.guests.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["g1", "g2"]);
        // The merged entry kept its assignment (g2 was auto-assigned in B).
        assert_eq!(active.cart[1].assigned_guest_id.as_deref(), Some("g2"));
    }

    #[test]
    fn test_merge_is_associative_on_guest_sets() {
        let now = Utc::now();
        let g = |id: &str, phone: &str| guest(id, id, phone, now);

        let build = |merge_plan: &[&[usize]]| {
            let mut pool = TransactionPool::new();
            let a = pool.start_or_resume(group("1111", vec![g("ga", "1111"), g("shared", "1111")]));
            pool.active_mut().unwrap().add_entry(&ticket(), now).unwrap();
            pool.start_or_resume(group("2222", vec![g("gb", "2222"), g("shared", "2222")]));
            pool.active_mut().unwrap().add_entry(&ticket(), now).unwrap();
            pool.start_or_resume(group("3333", vec![g("gc", "3333")]));
            pool.active_mut().unwrap().add_entry(&ticket(), now).unwrap();

            let ids: Vec<String> = pool.pending().iter().map(|t| t.id.clone()).collect();
            pool.select(a.transaction_id()).unwrap();
            for step in merge_plan {
                let batch: Vec<String> = step.iter().map(|&i| ids[i].clone()).collect();
                pool.merge_into_active(&batch).unwrap();
            }
            pool.active()
                .unwrap()
                .guests
                .iter()
                .map(|guest| guest.id.clone())
                .collect::<Vec<_>>()
        };

        // {A,B} then {C} vs {A,B,C} in one call.
        let stepwise = build(&[&[1], &[2]]);
        let at_once = build(&[&[1, 2]]);
        assert_eq!(stepwise, at_once);
        assert_eq!(stepwise, vec!["ga", "shared", "gb", "gc"]);
    }

    #[test]
    fn test_merge_skips_unknown_ids() {
        let now = Utc::now();
        let mut pool = TransactionPool::new();
        pool.start_or_resume(group("1111", vec![guest("g1", "A", "1111", now)]));

        let merged = pool
            .merge_into_active(&["no-such-transaction".to_string()])
            .unwrap();
        assert_eq!(merged, 0);
    }

    #[test]
    fn test_merge_without_active_errors() {
        let mut pool = TransactionPool::new();
        assert!(matches!(
            pool.merge_into_active(&[]),
            Err(CoreError::NoActiveTransaction)
        ));
    }

    #[test]
    fn test_delete_clears_active_selection() {
        let now = Utc::now();
        let mut pool = TransactionPool::new();
        let outcome = pool.start_or_resume(group("1111", vec![guest("g1", "A", "1111", now)]));

        pool.delete(outcome.transaction_id()).unwrap();
        assert!(pool.pending().is_empty());
        assert_eq!(pool.active_selection(), &ActiveTransaction::None);

        assert!(matches!(
            pool.delete("gone"),
            Err(CoreError::TransactionNotFound(_))
        ));
    }

    #[test]
    fn test_finalize_builds_sale_and_clears() {
        let now = Utc::now();
        let mut pool = TransactionPool::new();
        pool.start_or_resume(group(
            "9876543210",
            vec![
                guest("g1", "Aarav Sharma", "9876543210", now),
                guest("g2", "Priya Patel", "9876543210", now),
            ],
        ));
        pool.active_mut().unwrap().add_entry(&ticket(), now).unwrap();

        let sale = pool.finalize(PaymentMethod::Cash, now).unwrap();

        assert_eq!(sale.customer_id, "g1");
        assert_eq!(sale.customer_name, "Aarav Sharma & group");
        assert_eq!(sale.subtotal_paise, 50_000);
        assert_eq!(sale.gst_paise, 9_000);
        assert_eq!(sale.total_paise, 59_000);
        assert_eq!(sale.payment_method, PaymentMethod::Cash);

        assert!(pool.pending().is_empty());
        assert_eq!(pool.active_selection(), &ActiveTransaction::None);
    }

    #[test]
    fn test_finalize_primary_is_first_assigned_jumper() {
        let now = Utc::now();
        let mut pool = TransactionPool::new();
        pool.start_or_resume(group(
            "9876543210",
            vec![
                guest("g1", "First Guest", "9876543210", now),
                guest("g2", "Second Guest", "9876543210", now),
            ],
        ));
        let active = pool.active_mut().unwrap();
        active.add_entry(&ticket(), now).unwrap();
        // Reassign the single ticket to the second guest.
        let mut map = std::collections::BTreeMap::new();
        map.insert(0, "g2".to_string());
        active.bulk_assign(&map);

        let sale = pool.finalize(PaymentMethod::Upi, now).unwrap();
        assert_eq!(sale.customer_id, "g2");
    }

    #[test]
    fn test_finalize_ineligible_leaves_pool_untouched() {
        let now = Utc::now();
        let mut pool = TransactionPool::new();
        let outcome = pool.start_or_resume(group("1111", vec![]));
        pool.active_mut().unwrap().add_entry(&ticket(), now).unwrap();

        let err = pool.finalize(PaymentMethod::Cash, now);
        assert!(matches!(err, Err(CoreError::CheckoutIneligible { .. })));
        assert_eq!(pool.pending().len(), 1);
        assert!(pool.active_selection().is(outcome.transaction_id()));
    }

    #[test]
    fn test_from_parts_discards_dangling_active() {
        let tx = Transaction::new("1111", Vec::new());
        let id = tx.id.clone();

        let pool = TransactionPool::from_parts(
            vec![tx],
            ActiveTransaction::Selected("stale-id".to_string()),
        );
        assert_eq!(pool.active_selection(), &ActiveTransaction::None);

        let pool2 = TransactionPool::from_parts(
            pool.into_parts().0,
            ActiveTransaction::Selected(id.clone()),
        );
        assert!(pool2.active_selection().is(&id));
    }

    #[test]
    fn test_last_visit() {
        let now = Utc::now();
        let guests = vec![guest("g1", "A", "1111", now)];
        assert_eq!(last_visit(&[], &guests), None);

        let mut pool = TransactionPool::new();
        pool.start_or_resume(group("1111", guests.clone()));
        pool.active_mut().unwrap().add_entry(&ticket(), now).unwrap();
        let sale = pool.finalize(PaymentMethod::Cash, now).unwrap();

        assert_eq!(last_visit(&[sale], &guests), Some(now));
    }
}
