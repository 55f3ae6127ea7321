//! Route rules and the ordered route table.

use vivarium_core::Role;

/// A single guarded navigation prefix.
///
/// Any path beginning with `prefix` (plain string-prefix semantics, no
/// globbing) falls under this rule and is open to exactly the roles listed.
#[derive(Debug, Clone)]
pub struct RouteRule {
    /// Path prefix this rule covers, e.g. `/orders`.
    pub prefix: String,
    /// Human label for navigation chrome.
    pub label: String,
    /// Optional icon tag for navigation chrome.
    pub icon: Option<String>,
    /// Roles permitted under this prefix.
    pub roles: Vec<Role>,
}

impl RouteRule {
    /// Create a rule without an icon.
    #[must_use]
    pub fn new(prefix: impl Into<String>, label: impl Into<String>, roles: Vec<Role>) -> Self {
        Self {
            prefix: prefix.into(),
            label: label.into(),
            icon: None,
            roles,
        }
    }

    /// Attach an icon tag.
    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Whether `role` is permitted under this rule.
    #[must_use]
    pub fn allows(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// Fixed, ordered sequence of [`RouteRule`]s.
///
/// Matching is **first-match-wins** in table order: when several prefixes
/// could match a path, the earliest rule governs, even if a later rule's
/// prefix is longer or more specific. Order rules from most to least
/// specific when shadowing is not wanted.
#[derive(Debug, Clone)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

impl RouteTable {
    /// Build a table from an ordered rule list.
    #[must_use]
    pub fn new(rules: Vec<RouteRule>) -> Self {
        Self { rules }
    }

    /// The marketplace's guarded surface.
    ///
    /// Note there is no rule for `/` itself: a root rule would prefix-match
    /// every path and shadow the entire table. Root access is granted
    /// unconditionally by the guard instead.
    #[must_use]
    pub fn marketplace() -> Self {
        use Role::{Admin, Buyer, Seller, SuperAdmin};

        let everyone = vec![SuperAdmin, Admin, Seller, Buyer];
        let staff = vec![SuperAdmin, Admin];

        Self::new(vec![
            RouteRule::new("/dashboard", "Dashboard", everyone.clone())
                .with_icon("layout-dashboard"),
            RouteRule::new("/listings", "Listings", vec![SuperAdmin, Admin, Seller])
                .with_icon("clipboard-list"),
            RouteRule::new("/orders", "Orders", everyone).with_icon("package"),
            RouteRule::new("/categories", "Categories", staff.clone()).with_icon("folder-tree"),
            RouteRule::new("/diets", "Diets", staff.clone()).with_icon("utensils"),
            RouteRule::new("/traits", "Traits", staff.clone()).with_icon("dna"),
            RouteRule::new("/tags", "Tags", staff.clone()).with_icon("tag"),
            RouteRule::new("/genders", "Genders", staff.clone()).with_icon("venus-mars"),
            RouteRule::new("/maturity-levels", "Maturity levels", staff.clone())
                .with_icon("hourglass"),
            RouteRule::new("/origins", "Origins", staff.clone()).with_icon("globe"),
            RouteRule::new("/stores", "Stores", vec![SuperAdmin, Admin, Seller])
                .with_icon("store"),
            RouteRule::new("/users", "Users", vec![SuperAdmin]).with_icon("users"),
        ])
    }

    /// The rules in table order.
    #[must_use]
    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    /// The first rule whose prefix is a prefix of `path`, in table order.
    #[must_use]
    pub fn first_match(&self, path: &str) -> Option<&RouteRule> {
        self.rules
            .iter()
            .find(|rule| path.starts_with(rule.prefix.as_str()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_walks_table_order() {
        let table = RouteTable::new(vec![
            RouteRule::new("/stores", "Stores", vec![Role::Seller]),
            RouteRule::new("/stores/settings", "Store settings", vec![Role::Admin]),
        ]);

        // The later, longer prefix is shadowed: first literal match governs.
        let rule = table.first_match("/stores/settings").unwrap();
        assert_eq!(rule.prefix, "/stores");
        assert!(rule.allows(Role::Seller));
        assert!(!rule.allows(Role::Admin));
    }

    #[test]
    fn test_first_match_none_for_unruled_path() {
        let table = RouteTable::marketplace();
        assert!(table.first_match("/profile").is_none());
        assert!(table.first_match("/").is_none());
    }

    #[test]
    fn test_marketplace_has_no_root_rule() {
        let table = RouteTable::marketplace();
        assert!(table.rules().iter().all(|rule| rule.prefix != "/"));
    }

    #[test]
    fn test_marketplace_prefix_matches_subpaths() {
        let table = RouteTable::marketplace();
        let rule = table.first_match("/orders/118/detail").unwrap();
        assert_eq!(rule.prefix, "/orders");
    }

    #[test]
    fn test_marketplace_users_is_superadmin_only() {
        let table = RouteTable::marketplace();
        let rule = table.first_match("/users").unwrap();
        assert_eq!(rule.roles, vec![Role::SuperAdmin]);
    }

    #[test]
    fn test_marketplace_every_role_has_a_rule() {
        let table = RouteTable::marketplace();
        for role in Role::ALL {
            assert!(
                table.rules().iter().any(|rule| rule.allows(role)),
                "no rule admits {role}"
            );
        }
    }
}
