//! Per-navigation access decisions.
//!
//! The [`RouteGuard`] runs on every navigation event: it consults the
//! current identity and the route table, then either renders the
//! destination or issues a redirect. Denials are navigation outcomes, not
//! errors; nothing here returns a `Result`.

use std::sync::Arc;

use tracing::debug;

use vivarium_core::Role;

use super::permissions::{can_access_path, default_landing_path};
use super::routes::RouteTable;
use crate::identity::IdentityStore;

/// Path of the login screen, the redirect target for anonymous visitors.
pub const LOGIN_PATH: &str = "/login";

/// How a navigation attempt was classified, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    /// No identity is signed in.
    Unauthenticated,
    /// The matched rule admits none of the identity's roles.
    RoleDenied,
    /// No rule admits the path for any held role.
    PathDenied,
    /// The destination may render.
    Allowed,
}

/// What the caller should do with the navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardAction {
    /// Render the guarded destination.
    Render,
    /// Navigate elsewhere instead.
    Redirect {
        /// Where to go.
        to: String,
        /// The originally requested path, carried so the caller can return
        /// there after login. Best-effort; only set for login redirects.
        return_to: Option<String>,
    },
}

/// A guard verdict for one navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub outcome: GuardOutcome,
    pub action: GuardAction,
}

/// Decision point for guarded navigation.
///
/// Holds the identity store and the route table; evaluation is synchronous
/// against the in-memory identity snapshot at the moment of navigation.
pub struct RouteGuard {
    identity: Arc<IdentityStore>,
    table: RouteTable,
}

impl RouteGuard {
    /// Create a guard over `table`.
    #[must_use]
    pub fn new(identity: Arc<IdentityStore>, table: RouteTable) -> Self {
        Self { identity, table }
    }

    /// Create a guard over the built-in marketplace table.
    #[must_use]
    pub fn marketplace(identity: Arc<IdentityStore>) -> Self {
        Self::new(identity, RouteTable::marketplace())
    }

    /// The route table this guard consults.
    #[must_use]
    pub const fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Classify a navigation to `path`.
    ///
    /// Checks run in strict order: authentication, then role membership on
    /// the matched rule, then path accessibility. Multi-role identities are
    /// evaluated permissively; a check passes if any held role passes it.
    #[must_use]
    pub fn evaluate(&self, path: &str) -> Decision {
        let Some(identity) = self.identity.current() else {
            debug!(path, "navigation while anonymous; redirecting to login");
            return Decision {
                outcome: GuardOutcome::Unauthenticated,
                action: GuardAction::Redirect {
                    to: LOGIN_PATH.to_string(),
                    return_to: Some(path.to_string()),
                },
            };
        };

        // Root stays reachable for every authenticated identity. The table
        // deliberately has no "/" rule (it would prefix-match everything),
        // so the guarantee lives here; without it, an identity admitted by
        // no rule would bounce between "/" and its landing path forever.
        if path == "/" {
            return Decision {
                outcome: GuardOutcome::Allowed,
                action: GuardAction::Render,
            };
        }

        let roles = identity.roles();
        let landing = default_landing_path(&self.table, identity.primary_role());

        if let Some(rule) = self.table.first_match(path) {
            let role_passes = roles.iter().any(|role| rule.allows(*role));
            if !role_passes {
                debug!(path, rule = %rule.prefix, "no held role admitted; redirecting");
                return Decision {
                    outcome: GuardOutcome::RoleDenied,
                    action: redirect_to(landing),
                };
            }
        }

        let path_passes = roles
            .iter()
            .any(|role: &Role| can_access_path(&self.table, path, *role));
        if !path_passes {
            debug!(path, "no rule admits path; redirecting");
            return Decision {
                outcome: GuardOutcome::PathDenied,
                action: redirect_to(landing),
            };
        }

        Decision {
            outcome: GuardOutcome::Allowed,
            action: GuardAction::Render,
        }
    }
}

fn redirect_to(to: String) -> GuardAction {
    GuardAction::Redirect {
        to,
        return_to: None,
    }
}
