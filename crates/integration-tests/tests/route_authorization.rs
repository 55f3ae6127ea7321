//! Scenario tests for navigation authorization.
//!
//! These drive the guard through whole sessions, sign-in and sign-out
//! included, the way the frontend shell does: every navigation goes through
//! [`RouteGuard::evaluate`] and every denial must land the user somewhere
//! renderable.

use std::sync::Arc;

use secrecy::SecretString;
use vivarium_client::access::{
    GuardAction, GuardOutcome, LOGIN_PATH, RouteGuard, default_landing_path,
};
use vivarium_client::identity::{Identity, IdentityStore};
use vivarium_client::storage::MemoryStorage;
use vivarium_core::{Email, Role, UserId};

fn fresh_store() -> Arc<IdentityStore> {
    Arc::new(IdentityStore::open(Box::new(MemoryStorage::new())))
}

fn identity_with_roles(roles: &[Role]) -> Identity {
    Identity::new(
        UserId::new(71),
        "Rowan Calloway",
        Email::parse("rowan@example.com").expect("valid email"),
        roles.to_vec(),
        SecretString::from("session-token-71"),
    )
    .expect("at least one role")
}

// ============================================================================
// Login Round-Trip
// ============================================================================

#[test]
fn test_visitor_is_sent_to_login_and_returns_after_signing_in() {
    let store = fresh_store();
    let guard = RouteGuard::marketplace(Arc::clone(&store));

    // Anonymous hit on a guarded page: redirect to login, destination kept.
    let decision = guard.evaluate("/listings/rescues");
    assert_eq!(decision.outcome, GuardOutcome::Unauthenticated);
    let GuardAction::Redirect { to, return_to } = &decision.action else {
        panic!("expected a redirect, got {decision:?}");
    };
    assert_eq!(to, LOGIN_PATH);
    assert_eq!(return_to.as_deref(), Some("/listings/rescues"));

    // Signing in is observed synchronously by the very next evaluation.
    store.set_identity(identity_with_roles(&[Role::Seller]));
    let decision = guard.evaluate("/listings/rescues");
    assert_eq!(decision.outcome, GuardOutcome::Allowed);
    assert_eq!(decision.action, GuardAction::Render);
}

#[test]
fn test_sign_out_mid_session_reinstates_the_login_redirect() {
    let store = fresh_store();
    let guard = RouteGuard::marketplace(Arc::clone(&store));

    store.set_identity(identity_with_roles(&[Role::Buyer]));
    assert_eq!(guard.evaluate("/dashboard").outcome, GuardOutcome::Allowed);

    store.clear();
    let decision = guard.evaluate("/dashboard");
    assert_eq!(decision.outcome, GuardOutcome::Unauthenticated);
}

// ============================================================================
// Cross-Role Denial
// ============================================================================

#[test]
fn test_seller_on_admin_surface_lands_on_own_landing_not_login() {
    let store = fresh_store();
    store.set_identity(identity_with_roles(&[Role::Seller]));
    let guard = RouteGuard::marketplace(store);

    let decision = guard.evaluate("/categories");
    assert_eq!(decision.outcome, GuardOutcome::RoleDenied);
    let GuardAction::Redirect { to, return_to } = &decision.action else {
        panic!("expected a redirect, got {decision:?}");
    };
    assert_eq!(to, "/dashboard");
    assert!(return_to.is_none());

    // The redirect must terminate: its target renders for this seller.
    assert_eq!(guard.evaluate(to).outcome, GuardOutcome::Allowed);
}

#[test]
fn test_buyer_on_user_administration_is_denied() {
    let store = fresh_store();
    store.set_identity(identity_with_roles(&[Role::Buyer]));
    let guard = RouteGuard::marketplace(store);

    let decision = guard.evaluate("/users");
    assert_eq!(decision.outcome, GuardOutcome::RoleDenied);
    assert_eq!(
        decision.action,
        GuardAction::Redirect {
            to: "/dashboard".to_string(),
            return_to: None,
        }
    );
}

// ============================================================================
// Multi-Role Sessions
// ============================================================================

#[test]
fn test_admin_buyer_union_reaches_both_surfaces_in_one_session() {
    let store = fresh_store();
    store.set_identity(identity_with_roles(&[Role::Admin, Role::Buyer]));
    let guard = RouteGuard::marketplace(store);

    // Staff-only taxonomy surface, admitted through the admin role.
    assert_eq!(guard.evaluate("/categories").outcome, GuardOutcome::Allowed);
    assert_eq!(guard.evaluate("/diets").outcome, GuardOutcome::Allowed);

    // Shared surfaces admitted through either role.
    assert_eq!(guard.evaluate("/orders").outcome, GuardOutcome::Allowed);
    assert_eq!(guard.evaluate("/dashboard").outcome, GuardOutcome::Allowed);

    // Union does not over-grant: superadmin-only stays closed.
    assert_eq!(guard.evaluate("/users").outcome, GuardOutcome::RoleDenied);
}

// ============================================================================
// Default Deny & Landing Stability
// ============================================================================

#[test]
fn test_unmatched_path_is_denied_for_every_role() {
    for role in Role::ALL {
        let store = fresh_store();
        store.set_identity(identity_with_roles(&[role]));
        let guard = RouteGuard::marketplace(store);

        let decision = guard.evaluate("/metrics/export");
        assert_eq!(
            decision.outcome,
            GuardOutcome::PathDenied,
            "{role} slipped through an unmatched path"
        );
    }
}

#[test]
fn test_landing_path_is_deterministic_and_renders_for_every_role() {
    for role in Role::ALL {
        let store = fresh_store();
        store.set_identity(identity_with_roles(&[role]));
        let guard = RouteGuard::marketplace(store);

        let first = default_landing_path(guard.table(), role);
        let second = default_landing_path(guard.table(), role);
        assert_eq!(first, second, "landing for {role} is not stable");

        assert_eq!(
            guard.evaluate(&first).outcome,
            GuardOutcome::Allowed,
            "{role} denied on its own landing {first}"
        );
    }
}

#[test]
fn test_root_never_loops_for_any_authenticated_session() {
    for role in Role::ALL {
        let store = fresh_store();
        store.set_identity(identity_with_roles(&[role]));
        let guard = RouteGuard::marketplace(store);

        assert_eq!(
            guard.evaluate("/").action,
            GuardAction::Render,
            "{role} was redirected off the root"
        );
    }
}
