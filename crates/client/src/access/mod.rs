//! Access control: who may navigate where.
//!
//! Three pieces cooperate on every navigation event:
//!
//! - [`RouteTable`] - the fixed, ordered prefix rules for the guarded
//!   surface, first-match-wins;
//! - [`permissions`] - pure functions answering role and path questions
//!   against the table, deny-by-default;
//! - [`RouteGuard`] - the per-navigation decision point producing render
//!   or redirect.

pub mod guard;
pub mod permissions;
pub mod routes;

pub use guard::{Decision, GuardAction, GuardOutcome, LOGIN_PATH, RouteGuard};
pub use permissions::{
    Permission, can_access_path, default_landing_path, has_permission, is_role_at_least,
    role_permissions,
};
pub use routes::{RouteRule, RouteTable};
