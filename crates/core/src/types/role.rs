//! Marketplace roles and the role hierarchy.

use serde::{Deserialize, Serialize};

/// A marketplace role with different permission levels.
///
/// Roles form a strict hierarchy: `SuperAdmin` > `Admin` > `Seller` > `Buyer`.
/// A higher role is allowed to do everything a lower role can; use
/// [`Role::is_at_least`] for threshold checks rather than comparing variants
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access to every marketplace feature including user management.
    SuperAdmin,
    /// Marketplace operations: taxonomy, stores, and order oversight.
    Admin,
    /// Runs a storefront: manages own listings and incoming orders.
    Seller,
    /// Shops the marketplace: browse, cart, and checkout.
    Buyer,
}

impl Role {
    /// All known roles, ordered from most to least privileged.
    pub const ALL: [Self; 4] = [Self::SuperAdmin, Self::Admin, Self::Seller, Self::Buyer];

    /// Numeric rank within the hierarchy. Higher means more privileged.
    #[must_use]
    pub const fn rank(&self) -> u8 {
        match self {
            Self::SuperAdmin => 3,
            Self::Admin => 2,
            Self::Seller => 1,
            Self::Buyer => 0,
        }
    }

    /// Whether this role sits at or above `min` in the hierarchy.
    #[must_use]
    pub const fn is_at_least(&self, min: Self) -> bool {
        self.rank() >= min.rank()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SuperAdmin => write!(f, "superadmin"),
            Self::Admin => write!(f, "admin"),
            Self::Seller => write!(f, "seller"),
            Self::Buyer => write!(f, "buyer"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "superadmin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            "seller" => Ok(Self::Seller),
            "buyer" => Ok(Self::Buyer),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}
