//! # Staff, Roles and Permissions
//!
//! Staff identities and the permission gate consumed by checkout and cash
//! drawer preconditions.
//!
//! The engine does not own authorization policy; it asks a [`PermissionGate`]
//! yes/no questions. [`RoleTable`] is the bundled implementation - a plain
//! role → permission-set map that management screens can edit - but any
//! gate (LDAP, a hosted IAM, a hard-coded closure in tests) satisfies the
//! trait.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Permission Keys
// =============================================================================

/// Well-known permission keys.
///
/// The catalog is open-ended: roles may carry keys the engine never checks
/// (page-access keys are enforced by the UI shell), and gates may recognize
/// keys minted after this list was written.
pub mod permissions {
    /// View main sales and customer analytics.
    pub const PAGE_DASHBOARD: &str = "page:dashboard";
    /// Access the main sales screen.
    pub const PAGE_SALE: &str = "page:sale";
    /// View and search past sales records.
    pub const PAGE_HISTORY: &str = "page:history";
    /// Manage customer profiles and waivers.
    pub const PAGE_CUSTOMERS: &str = "page:customers";
    /// Manage staff and roles.
    pub const PAGE_COMPANY: &str = "page:company";
    /// View cash drawer history.
    pub const PAGE_CASHDRAWER: &str = "page:cashdrawer";

    /// Apply discounts in the POS.
    pub const APPLY_DISCOUNT: &str = "feature:sale:apply_discount";
    /// Record a cash deposit from the POS.
    pub const MAKE_DEPOSIT: &str = "feature:cashdrawer:make_deposit";
    /// Close a drawer session opened by someone else.
    pub const CLOSE_ANY_DRAWER_SESSION: &str = "feature:cashdrawer:close_any_session";
    /// Add, edit, or delete staff members.
    pub const MANAGE_STAFF: &str = "feature:company:manage_staff";
    /// Create, edit, or delete roles.
    pub const MANAGE_ROLES: &str = "feature:company:manage_roles";

    /// Every key above, for "grant all" roles.
    pub const ALL: &[&str] = &[
        PAGE_DASHBOARD,
        PAGE_SALE,
        PAGE_HISTORY,
        PAGE_CUSTOMERS,
        PAGE_COMPANY,
        PAGE_CASHDRAWER,
        APPLY_DISCOUNT,
        MAKE_DEPOSIT,
        CLOSE_ANY_DRAWER_SESSION,
        MANAGE_STAFF,
        MANAGE_ROLES,
    ];
}

// =============================================================================
// Staff User
// =============================================================================

/// A member of staff, identified at the register by their login code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StaffUser {
    /// Login code typed at the register (also the identity stored on
    /// drawer sessions and deposits).
    pub code: String,

    /// Display name.
    pub name: String,

    /// Role name, resolved through a [`PermissionGate`].
    pub role: String,
}

// =============================================================================
// Permission Gate
// =============================================================================

/// Answers "may this user do that?".
///
/// Engine preconditions (drawer close, discount application) consume this
/// trait; they never inspect roles directly.
pub trait PermissionGate {
    /// Whether `user` holds `permission`.
    fn has_permission(&self, user: &StaffUser, permission: &str) -> bool;
}

/// Role → permission-set table, the default gate.
///
/// ## Default Grants
/// ```text
/// admin    everything
/// manager  everything except role management
/// staff    sales screen, customers, deposits
/// ```
/// Management screens mutate the table at runtime; nothing below is fixed
/// policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleTable {
    grants: HashMap<String, HashSet<String>>,
}

impl RoleTable {
    /// An empty table: every check fails.
    pub fn new() -> Self {
        RoleTable::default()
    }

    /// The stock three-role setup a fresh install ships with.
    pub fn with_defaults() -> Self {
        let mut table = RoleTable::new();
        for key in permissions::ALL {
            table.grant("admin", key);
        }
        for key in permissions::ALL {
            if *key != permissions::MANAGE_ROLES {
                table.grant("manager", key);
            }
        }
        for key in [
            permissions::PAGE_SALE,
            permissions::PAGE_CUSTOMERS,
            permissions::MAKE_DEPOSIT,
        ] {
            table.grant("staff", key);
        }
        table
    }

    /// Grants a permission to a role.
    pub fn grant(&mut self, role: &str, permission: &str) {
        self.grants
            .entry(role.to_string())
            .or_default()
            .insert(permission.to_string());
    }

    /// Revokes a permission from a role. No-op if absent.
    pub fn revoke(&mut self, role: &str, permission: &str) {
        if let Some(set) = self.grants.get_mut(role) {
            set.remove(permission);
        }
    }

    /// The permissions a role currently holds.
    pub fn permissions_of(&self, role: &str) -> impl Iterator<Item = &str> {
        self.grants
            .get(role)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }
}

impl PermissionGate for RoleTable {
    fn has_permission(&self, user: &StaffUser, permission: &str) -> bool {
        self.grants
            .get(&user.role)
            .is_some_and(|set| set.contains(permission))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
