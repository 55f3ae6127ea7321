//! Pure permission checks over roles and the route table.
//!
//! Everything here is deterministic and side-effect-free; the backing
//! tables are immutable, so callers may invoke these functions on every
//! render without caching.

use vivarium_core::Role;

use super::routes::RouteTable;

/// A capability the UI can ask about.
///
/// Permissions form a closed set; tags arriving as strings are parsed at
/// the boundary and anything unrecognized is denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// See the signed-in dashboard.
    ViewDashboard,
    /// Create and edit listings.
    ManageListings,
    /// View order history and status.
    ViewOrders,
    /// Edit taxonomy screens (categories, diets, traits, and the rest).
    ManageTaxonomy,
    /// Manage storefront records.
    ManageStores,
    /// Administer user accounts.
    ManageUsers,
    /// Place orders and pay.
    Checkout,
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ViewDashboard => write!(f, "view_dashboard"),
            Self::ManageListings => write!(f, "manage_listings"),
            Self::ViewOrders => write!(f, "view_orders"),
            Self::ManageTaxonomy => write!(f, "manage_taxonomy"),
            Self::ManageStores => write!(f, "manage_stores"),
            Self::ManageUsers => write!(f, "manage_users"),
            Self::Checkout => write!(f, "checkout"),
        }
    }
}

impl std::str::FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view_dashboard" => Ok(Self::ViewDashboard),
            "manage_listings" => Ok(Self::ManageListings),
            "view_orders" => Ok(Self::ViewOrders),
            "manage_taxonomy" => Ok(Self::ManageTaxonomy),
            "manage_stores" => Ok(Self::ManageStores),
            "manage_users" => Ok(Self::ManageUsers),
            "checkout" => Ok(Self::Checkout),
            _ => Err(format!("invalid permission: {s}")),
        }
    }
}

/// The permissions granted to `role`.
#[must_use]
pub const fn role_permissions(role: Role) -> &'static [Permission] {
    match role {
        Role::SuperAdmin => &[
            Permission::ViewDashboard,
            Permission::ManageListings,
            Permission::ViewOrders,
            Permission::ManageTaxonomy,
            Permission::ManageStores,
            Permission::ManageUsers,
            Permission::Checkout,
        ],
        Role::Admin => &[
            Permission::ViewDashboard,
            Permission::ManageListings,
            Permission::ViewOrders,
            Permission::ManageTaxonomy,
            Permission::ManageStores,
            Permission::Checkout,
        ],
        Role::Seller => &[
            Permission::ViewDashboard,
            Permission::ManageListings,
            Permission::ViewOrders,
            Permission::ManageStores,
        ],
        Role::Buyer => &[
            Permission::ViewDashboard,
            Permission::ViewOrders,
            Permission::Checkout,
        ],
    }
}

/// Whether `role` holds the permission named by `tag`.
///
/// Unknown tags are denied, never errors: a typo in a template must fail
/// closed.
#[must_use]
pub fn has_permission(role: Role, tag: &str) -> bool {
    tag.parse::<Permission>()
        .is_ok_and(|permission| role_permissions(role).contains(&permission))
}

/// Whether `role` sits at or above `required` in the hierarchy.
#[must_use]
pub const fn is_role_at_least(role: Role, required: Role) -> bool {
    role.is_at_least(required)
}

/// The landing path for `role`: the first rule in `table` that admits it,
/// falling back to the root path when none does.
#[must_use]
pub fn default_landing_path(table: &RouteTable, role: Role) -> String {
    table
        .rules()
        .iter()
        .find(|rule| rule.allows(role))
        .map_or_else(|| "/".to_string(), |rule| rule.prefix.clone())
}

/// Whether `role` may reach `path` under `table`.
///
/// Finds the first rule whose prefix matches and checks membership; a path
/// with no matching rule is denied, not implicitly public.
#[must_use]
pub fn can_access_path(table: &RouteTable, path: &str, role: Role) -> bool {
    table
        .first_match(path)
        .is_some_and(|rule| rule.allows(role))
}
