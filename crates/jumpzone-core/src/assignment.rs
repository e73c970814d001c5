//! # Cart Operations and Jumper Assignment
//!
//! Maintains the mapping from ticket/membership cart entries to guests.
//!
//! ## Assignment Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Jumper Assignment                                  │
//! │                                                                         │
//! │  Cart entry kinds:                                                     │
//! │    Ticket / Membership ──► redeemed by exactly one named jumper        │
//! │    Addon               ──► never assigned                              │
//! │                                                                         │
//! │  Invariants:                                                           │
//! │    • at most one guest per entry                                       │
//! │    • a guest holds at most one assignment per transaction              │
//! │                                                                         │
//! │  Add ticket ──► auto-assign the first guest (in arrival order) whose   │
//! │                 waiver is Valid right now and who holds no assignment.  │
//! │                 Nobody available? The entry stays "Not Assigned" -     │
//! │                 a normal, visible state, not an error.                  │
//! │                                                                         │
//! │  Bulk assign ──► wipe all assignments, then apply the chosen map.      │
//! │                  Unknown guest ids are ignored on purpose: the map     │
//! │                  may come from a stale screen or an LLM suggestion.    │
//! │                                                                         │
//! │  Checkout   ──► every ticket/membership entry must be assigned to a    │
//! │                 guest whose waiver is Valid AT CHECKOUT TIME. A waiver  │
//! │                 can lapse between assignment and payment; we re-check. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::error::{CoreError, CoreResult};
use crate::types::{CartEntry, CatalogItem, Transaction, WaiverStatus};
use crate::MAX_CART_ENTRIES;

// =============================================================================
// Cart Mutation
// =============================================================================

impl Transaction {
    /// Adds one unit of a catalog item to the cart.
    ///
    /// Ticket and membership entries are auto-assigned to the first guest
    /// (in arrival order) with a currently valid waiver and no existing
    /// assignment. If no guest qualifies the entry is added unassigned -
    /// that is a normal state, not an error. The only failure is a full
    /// cart.
    ///
    /// ## Returns
    /// The index of the new entry.
    pub fn add_entry(&mut self, item: &CatalogItem, now: DateTime<Utc>) -> CoreResult<usize> {
        if self.cart.len() >= MAX_CART_ENTRIES {
            return Err(CoreError::CartFull {
                max: MAX_CART_ENTRIES,
            });
        }

        let mut entry = CartEntry::from_item(item);
        if entry.carries_assignment() {
            if let Some((guest_id, guest_name)) = self.first_assignable_guest(now) {
                entry.assigned_guest_id = Some(guest_id);
                entry.assigned_guest_name = Some(guest_name);
            }
        }
        self.cart.push(entry);
        Ok(self.cart.len() - 1)
    }

    /// Removes the first cart entry created from the given catalog item.
    ///
    /// ## Returns
    /// `true` if an entry was removed; `false` if none matched (a no-op,
    /// mirroring the "-" button on an already-empty line).
    pub fn remove_entry(&mut self, item_id: &str) -> bool {
        match self.cart.iter().position(|e| e.item_id == item_id) {
            Some(pos) => {
                self.cart.remove(pos);
                true
            }
            None => false,
        }
    }

    /// First guest in arrival order with a Valid waiver and no assignment.
    fn first_assignable_guest(&self, now: DateTime<Utc>) -> Option<(String, String)> {
        let taken: HashSet<&str> = self
            .cart
            .iter()
            .filter_map(|e| e.assigned_guest_id.as_deref())
            .collect();
        self.guests
            .iter()
            .find(|g| {
                g.waiver_status(now) == WaiverStatus::Valid && !taken.contains(g.id.as_str())
            })
            .map(|g| (g.id.clone(), g.name.clone()))
    }

    /// Replaces all jumper assignments with the given `entry index -> guest
    /// id` map.
    ///
    /// ## Behavior
    /// 1. Every ticket/membership assignment is cleared first, so an entry
    ///    absent from the map ends up unassigned.
    /// 2. The map is applied in ascending index order.
    /// 3. Lenient by design: indices out of range, add-on indices, and guest
    ///    ids not on this transaction are skipped silently. A guest named
    ///    for two entries is applied at the first only.
    ///
    /// ## Returns
    /// The number of assignments actually applied.
    pub fn bulk_assign(&mut self, assignments: &BTreeMap<usize, String>) -> usize {
        for entry in self.cart.iter_mut() {
            if entry.carries_assignment() {
                entry.clear_assignment();
            }
        }

        let mut used: HashSet<String> = HashSet::new();
        let mut applied = 0;
        for (&index, guest_id) in assignments {
            if used.contains(guest_id) {
                continue;
            }
            let Some((id, name)) = self
                .guests
                .iter()
                .find(|g| &g.id == guest_id)
                .map(|g| (g.id.clone(), g.name.clone()))
            else {
                continue;
            };
            let Some(entry) = self.cart.get_mut(index) else {
                continue;
            };
            if !entry.carries_assignment() {
                continue;
            }
            entry.assigned_guest_id = Some(id);
            entry.assigned_guest_name = Some(name);
            used.insert(guest_id.clone());
            applied += 1;
        }
        applied
    }

    /// Removes the single assignment held by the given guest.
    /// No-op if the guest holds none.
    pub fn unassign(&mut self, guest_id: &str) {
        if let Some(entry) = self
            .cart
            .iter_mut()
            .find(|e| e.assigned_guest_id.as_deref() == Some(guest_id))
        {
            entry.clear_assignment();
        }
    }

    /// Groups the cart for display: one line per catalog item and kind,
    /// with the entry indices backing each line.
    pub fn grouped_cart(&self) -> Vec<CartLine<'_>> {
        let mut lines: Vec<CartLine<'_>> = Vec::new();
        for (index, entry) in self.cart.iter().enumerate() {
            if let Some(line) = lines
                .iter_mut()
                .find(|l| l.item_id == entry.item_id && l.kind == entry.kind)
            {
                line.quantity += 1;
                line.entry_indices.push(index);
            } else {
                lines.push(CartLine {
                    item_id: &entry.item_id,
                    name: &entry.name,
                    kind: entry.kind,
                    unit_price_paise: entry.price_paise,
                    quantity: 1,
                    entry_indices: vec![index],
                });
            }
        }
        lines
    }
}

/// One display line of a grouped cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine<'a> {
    /// Catalog item id backing this line.
    pub item_id: &'a str,
    /// Frozen display name.
    pub name: &'a str,
    /// Category tag.
    pub kind: crate::types::ItemKind,
    /// Frozen unit price in paise.
    pub unit_price_paise: i64,
    /// How many entries share this line.
    pub quantity: i64,
    /// Cart indices of the underlying entries, in add order.
    pub entry_indices: Vec<usize>,
}

// =============================================================================
// Checkout Eligibility
// =============================================================================

/// Why a transaction cannot be checked out right now.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutBlocker {
    /// Nothing in the cart.
    #[error("cart is empty")]
    EmptyCart,

    /// No guests attached to the transaction.
    #[error("no guests on the transaction")]
    NoGuests,

    /// A ticket/membership entry has no jumper.
    #[error("'{name}' (entry {entry_index}) has no jumper assigned")]
    Unassigned { entry_index: usize, name: String },

    /// An entry points at a guest that is no longer on the transaction.
    #[error("entry {entry_index} is assigned to unknown guest {guest_id}")]
    UnknownGuest { entry_index: usize, guest_id: String },

    /// The assigned guest's waiver is not valid right now.
    #[error("{guest_name}'s waiver is {status:?}; they must re-sign before jumping")]
    WaiverNotValid {
        entry_index: usize,
        guest_name: String,
        status: WaiverStatus,
    },
}

/// Checks whether a transaction can be checked out at `now`.
///
/// Waiver validity is evaluated here, not at assignment time: an assignment
/// made this morning does not excuse a waiver that lapsed by the afternoon.
///
/// ## Returns
/// `Ok(())` when eligible; the first blocker found otherwise.
pub fn checkout_eligibility(tx: &Transaction, now: DateTime<Utc>) -> Result<(), CheckoutBlocker> {
    if tx.cart.is_empty() {
        return Err(CheckoutBlocker::EmptyCart);
    }
    if tx.guests.is_empty() {
        return Err(CheckoutBlocker::NoGuests);
    }

    for (entry_index, entry) in tx.cart.iter().enumerate() {
        if !entry.carries_assignment() {
            continue;
        }
        let Some(guest_id) = entry.assigned_guest_id.as_deref() else {
            return Err(CheckoutBlocker::Unassigned {
                entry_index,
                name: entry.name.clone(),
            });
        };
        let Some(guest) = tx.guest(guest_id) else {
            return Err(CheckoutBlocker::UnknownGuest {
                entry_index,
                guest_id: guest_id.to_string(),
            });
        };
        let status = guest.waiver_status(now);
        if status != WaiverStatus::Valid {
            return Err(CheckoutBlocker::WaiverNotValid {
                entry_index,
                guest_name: guest.name.clone(),
                status,
            });
        }
    }

    Ok(())
}

/// Convenience boolean form of [`checkout_eligibility`].
pub fn is_checkout_eligible(tx: &Transaction, now: DateTime<Utc>) -> bool {
    checkout_eligibility(tx, now).is_ok()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Guest, ItemKind};
    use chrono::{Duration, NaiveDate};

    fn guest(id: &str, name: &str, signed_days_ago: Option<i64>, now: DateTime<Utc>) -> Guest {
        Guest {
            id: id.to_string(),
            name: name.to_string(),
            dob: NaiveDate::from_ymd_opt(1995, 5, 20).unwrap(),
            email: format!("{id}@example.com"),
            phone: "9876543210".to_string(),
            waiver_signed_on: signed_days_ago.map(|d| now - Duration::days(d)),
            guardian_name: None,
            group_id: None,
            group_waiver_date: None,
        }
    }

    fn ticket(id: &str, price_paise: i64) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            name: format!("Ticket {id}"),
            price_paise,
            kind: ItemKind::Ticket,
            duration_minutes: Some(60),
        }
    }

    fn addon(id: &str, price_paise: i64) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            name: format!("Addon {id}"),
            price_paise,
            kind: ItemKind::Addon,
            duration_minutes: None,
        }
    }

    fn transaction_with_guests(guests: Vec<Guest>) -> Transaction {
        Transaction::new("9876543210", guests)
    }

    #[test]
    fn test_add_ticket_auto_assigns_first_valid_guest() {
        let now = Utc::now();
        let mut tx = transaction_with_guests(vec![
            guest("g1", "No Waiver", None, now),
            guest("g2", "Valid Waiver", Some(10), now),
        ]);

        tx.add_entry(&ticket("tkt_60", 50_000), now).unwrap();

        assert_eq!(tx.cart[0].assigned_guest_id.as_deref(), Some("g2"));
        assert_eq!(tx.cart[0].assigned_guest_name.as_deref(), Some("Valid Waiver"));
    }

    #[test]
    fn test_add_ticket_skips_already_assigned_guests() {
        let now = Utc::now();
        let mut tx = transaction_with_guests(vec![
            guest("g1", "First", Some(10), now),
            guest("g2", "Second", Some(10), now),
        ]);

        tx.add_entry(&ticket("tkt_60", 50_000), now).unwrap();
        tx.add_entry(&ticket("tkt_60", 50_000), now).unwrap();
        tx.add_entry(&ticket("tkt_60", 50_000), now).unwrap();

        assert_eq!(tx.cart[0].assigned_guest_id.as_deref(), Some("g1"));
        assert_eq!(tx.cart[1].assigned_guest_id.as_deref(), Some("g2"));
        // Nobody left: third ticket stays unassigned.
        assert_eq!(tx.cart[2].assigned_guest_id, None);
    }

    #[test]
    fn test_add_addon_never_assigns() {
        let now = Utc::now();
        let mut tx = transaction_with_guests(vec![guest("g1", "Valid", Some(10), now)]);

        tx.add_entry(&addon("addon_socks", 10_000), now).unwrap();

        assert_eq!(tx.cart[0].assigned_guest_id, None);
    }

    #[test]
    fn test_expired_waiver_guest_not_auto_assigned() {
        let now = Utc::now();
        let mut tx = transaction_with_guests(vec![guest("g1", "Expired", Some(400), now)]);

        tx.add_entry(&ticket("tkt_60", 50_000), now).unwrap();

        assert_eq!(tx.cart[0].assigned_guest_id, None);
    }

    #[test]
    fn test_remove_entry_removes_first_match_only() {
        let now = Utc::now();
        let mut tx = transaction_with_guests(vec![]);
        tx.add_entry(&ticket("tkt_60", 50_000), now).unwrap();
        tx.add_entry(&ticket("tkt_60", 50_000), now).unwrap();

        assert!(tx.remove_entry("tkt_60"));
        assert_eq!(tx.cart.len(), 1);
        assert!(!tx.remove_entry("tkt_999"));
    }

    #[test]
    fn test_bulk_assign_clears_then_applies() {
        let now = Utc::now();
        let mut tx = transaction_with_guests(vec![
            guest("g1", "First", Some(10), now),
            guest("g2", "Second", Some(10), now),
        ]);
        tx.add_entry(&ticket("tkt_60", 50_000), now).unwrap(); // auto-assigned g1
        tx.add_entry(&ticket("tkt_60", 50_000), now).unwrap(); // auto-assigned g2

        // Swap the two jumpers.
        let mut map = BTreeMap::new();
        map.insert(0, "g2".to_string());
        map.insert(1, "g1".to_string());
        let applied = tx.bulk_assign(&map);

        assert_eq!(applied, 2);
        assert_eq!(tx.cart[0].assigned_guest_id.as_deref(), Some("g2"));
        assert_eq!(tx.cart[1].assigned_guest_id.as_deref(), Some("g1"));
    }

    #[test]
    fn test_bulk_assign_unmentioned_entry_becomes_unassigned() {
        let now = Utc::now();
        let mut tx = transaction_with_guests(vec![
            guest("g1", "First", Some(10), now),
            guest("g2", "Second", Some(10), now),
        ]);
        tx.add_entry(&ticket("tkt_60", 50_000), now).unwrap();
        tx.add_entry(&ticket("tkt_60", 50_000), now).unwrap();

        let mut map = BTreeMap::new();
        map.insert(1, "g1".to_string());
        tx.bulk_assign(&map);

        assert_eq!(tx.cart[0].assigned_guest_id, None);
        assert_eq!(tx.cart[1].assigned_guest_id.as_deref(), Some("g1"));
    }

    #[test]
    fn test_bulk_assign_ignores_unknown_guest_id() {
        let now = Utc::now();
        let mut tx = transaction_with_guests(vec![guest("g1", "First", Some(10), now)]);
        tx.add_entry(&ticket("tkt_60", 50_000), now).unwrap();

        let mut map = BTreeMap::new();
        map.insert(0, "stranger".to_string());
        let applied = tx.bulk_assign(&map);

        assert_eq!(applied, 0);
        assert_eq!(tx.cart[0].assigned_guest_id, None);
    }

    #[test]
    fn test_bulk_assign_never_duplicates_a_guest() {
        let now = Utc::now();
        let mut tx = transaction_with_guests(vec![guest("g1", "Only", Some(10), now)]);
        tx.add_entry(&ticket("tkt_60", 50_000), now).unwrap();
        tx.add_entry(&ticket("tkt_60", 50_000), now).unwrap();

        let mut map = BTreeMap::new();
        map.insert(0, "g1".to_string());
        map.insert(1, "g1".to_string());
        let applied = tx.bulk_assign(&map);

        assert_eq!(applied, 1);
        let assigned: Vec<_> = tx
            .cart
            .iter()
            .filter_map(|e| e.assigned_guest_id.as_deref())
            .collect();
        assert_eq!(assigned, vec!["g1"]);
    }

    #[test]
    fn test_unassign_is_noop_without_assignment() {
        let now = Utc::now();
        let mut tx = transaction_with_guests(vec![guest("g1", "First", Some(10), now)]);
        tx.add_entry(&ticket("tkt_60", 50_000), now).unwrap();

        tx.unassign("g1");
        assert_eq!(tx.cart[0].assigned_guest_id, None);
        tx.unassign("g1"); // already gone - nothing to do
        assert_eq!(tx.cart[0].assigned_guest_id, None);
    }

    #[test]
    fn test_checkout_requires_assignment_and_valid_waiver() {
        let now = Utc::now();
        let mut tx = transaction_with_guests(vec![guest("g1", "Valid", Some(10), now)]);

        assert_eq!(checkout_eligibility(&tx, now), Err(CheckoutBlocker::EmptyCart));

        tx.add_entry(&ticket("tkt_60", 50_000), now).unwrap();
        assert!(is_checkout_eligible(&tx, now));

        tx.add_entry(&ticket("tkt_60", 50_000), now).unwrap(); // nobody left to assign
        assert!(matches!(
            checkout_eligibility(&tx, now),
            Err(CheckoutBlocker::Unassigned { entry_index: 1, .. })
        ));
    }

    #[test]
    fn test_waiver_expiring_between_assignment_and_checkout() {
        let now = Utc::now();
        // Signed 360 days ago: valid now, expired a fortnight from now.
        let mut tx = transaction_with_guests(vec![guest("g1", "Borderline", Some(360), now)]);
        tx.add_entry(&ticket("tkt_60", 50_000), now).unwrap();
        assert!(is_checkout_eligible(&tx, now));

        let checkout_time = now + Duration::days(14);
        assert!(matches!(
            checkout_eligibility(&tx, checkout_time),
            Err(CheckoutBlocker::WaiverNotValid { .. })
        ));
    }

    #[test]
    fn test_addons_do_not_block_checkout() {
        let now = Utc::now();
        let mut tx = transaction_with_guests(vec![guest("g1", "Valid", Some(10), now)]);
        tx.add_entry(&addon("addon_socks", 10_000), now).unwrap();

        assert!(is_checkout_eligible(&tx, now));
    }

    #[test]
    fn test_cart_cap() {
        let now = Utc::now();
        let mut tx = transaction_with_guests(vec![]);
        for _ in 0..crate::MAX_CART_ENTRIES {
            tx.add_entry(&addon("addon_water", 3_000), now).unwrap();
        }

        let err = tx.add_entry(&addon("addon_water", 3_000), now);
        assert!(matches!(err, Err(CoreError::CartFull { .. })));
        assert_eq!(tx.cart.len(), crate::MAX_CART_ENTRIES);
    }

    #[test]
    fn test_grouped_cart() {
        let now = Utc::now();
        let mut tx = transaction_with_guests(vec![]);
        tx.add_entry(&ticket("tkt_60", 50_000), now).unwrap();
        tx.add_entry(&addon("addon_socks", 10_000), now).unwrap();
        tx.add_entry(&ticket("tkt_60", 50_000), now).unwrap();

        let lines = tx.grouped_cart();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].item_id, "tkt_60");
        assert_eq!(lines[0].quantity, 2);
        assert_eq!(lines[0].entry_indices, vec![0, 2]);
        assert_eq!(lines[1].quantity, 1);
    }
}
