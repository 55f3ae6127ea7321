//! Scenario tests for the anonymous-cart-to-login journey.
//!
//! These wire the real stores together the way the frontend shell does:
//! one storage backend shared by identity and cart, a guard over the
//! identity store, and a sync coordinator triggered by the sign-in event.
//! Only the server cart is faked.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use secrecy::SecretString;
use vivarium_client::access::{GuardAction, GuardOutcome, RouteGuard};
use vivarium_client::api::{ApiError, CreateCartLine, ErrorEnvelope, RemoteCartLine};
use vivarium_client::cart::{CartApi, CartSyncCoordinator, LocalCartStore, SyncOutcome};
use vivarium_client::identity::{Identity, IdentityStore};
use vivarium_client::storage::MemoryStorage;
use vivarium_core::{CartLineId, CurrencyCode, Email, Price, ProductId, Role, StoreId, UserId};

/// Server cart fake: records creates, optionally failing one call.
struct RecordingApi {
    calls: Mutex<Vec<CreateCartLine>>,
    fail_on_call: Mutex<Option<usize>>,
}

impl RecordingApi {
    fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on_call: Mutex::new(None),
        }
    }

    fn failing_on(call: usize) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on_call: Mutex::new(Some(call)),
        }
    }

    fn heal(&self) {
        *self.fail_on_call.lock().expect("lock poisoned") = None;
    }

    fn calls(&self) -> Vec<CreateCartLine> {
        self.calls.lock().expect("lock poisoned").clone()
    }
}

impl CartApi for &RecordingApi {
    fn create_line(
        &self,
        request: &CreateCartLine,
    ) -> impl Future<Output = Result<RemoteCartLine, ApiError>> + Send {
        let result = {
            let mut calls = self.calls.lock().expect("lock poisoned");
            calls.push(request.clone());
            let call_number = calls.len();

            if *self.fail_on_call.lock().expect("lock poisoned") == Some(call_number) {
                Err(ApiError::Status {
                    status: 500,
                    envelope: ErrorEnvelope {
                        message: "server error".to_string(),
                        errors: None,
                    },
                })
            } else {
                Ok(RemoteCartLine {
                    id: CartLineId::new(call_number as i64),
                    product_id: request.product_id,
                    store_id: request.store_id,
                    quantity: request.quantity,
                })
            }
        };

        async move { result }
    }
}

fn buyer_identity() -> Identity {
    Identity::new(
        UserId::new(42),
        "Imogen Hart",
        Email::parse("imogen@example.com").expect("valid email"),
        vec![Role::Buyer],
        SecretString::from("session-token-42"),
    )
    .expect("at least one role")
}

fn usd(cents: i64) -> Price {
    Price::from_cents(cents, CurrencyCode::USD)
}

// ============================================================================
// Login-to-Dashboard Journey
// ============================================================================

#[tokio::test]
async fn test_login_to_dashboard_migrates_the_anonymous_cart() {
    let storage = Arc::new(MemoryStorage::new());
    let identity = Arc::new(IdentityStore::open(Box::new(Arc::clone(&storage))));
    let cart = Arc::new(LocalCartStore::open(Box::new(Arc::clone(&storage))));
    let guard = RouteGuard::marketplace(Arc::clone(&identity));

    // Browsing anonymously: two lines, one product added twice.
    cart.add_or_increment(ProductId::new(301), StoreId::new(9), usd(12_050));
    cart.add_or_increment(ProductId::new(301), StoreId::new(9), usd(12_050));
    cart.add_or_increment(ProductId::new(777), StoreId::new(9), usd(4_500));
    assert_eq!(cart.lines().len(), 2);

    // The dashboard is behind the guard until sign-in.
    let decision = guard.evaluate("/dashboard");
    assert_eq!(decision.outcome, GuardOutcome::Unauthenticated);

    // Sign in, wired the way the shell wires it: the subscriber marks the
    // sync as due, the app task runs it.
    let sync_due = Arc::new(AtomicBool::new(false));
    let observed = Arc::clone(&sync_due);
    identity.subscribe(move |event| {
        if CartSyncCoordinator::<&RecordingApi>::should_run(event) {
            observed.store(true, Ordering::SeqCst);
        }
    });
    identity.set_identity(buyer_identity());
    assert!(sync_due.load(Ordering::SeqCst));

    // The very next navigation renders.
    assert_eq!(guard.evaluate("/dashboard").action, GuardAction::Render);

    // The due sync drains both lines, in the order they were added.
    let api = RecordingApi::new();
    let coordinator = CartSyncCoordinator::new(Arc::clone(&cart), &api);
    let outcome = coordinator.run().await;
    assert!(matches!(outcome, SyncOutcome::Completed { created: 2 }));

    let calls = api.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].product_id, ProductId::new(301));
    assert_eq!(calls[0].quantity, 2);
    assert_eq!(calls[0].store_id, Some(StoreId::new(9)));
    assert_eq!(calls[1].product_id, ProductId::new(777));
    assert_eq!(calls[1].quantity, 1);

    // Drained locally, and durably so.
    assert!(cart.is_empty());
    let reopened = LocalCartStore::open(Box::new(Arc::clone(&storage)));
    assert!(reopened.is_empty());
}

#[tokio::test]
async fn test_token_refresh_sign_in_does_not_resync() {
    let storage = Arc::new(MemoryStorage::new());
    let identity = Arc::new(IdentityStore::open(Box::new(Arc::clone(&storage))));

    let triggers = Arc::new(AtomicBool::new(false));
    let observed = Arc::clone(&triggers);
    identity.subscribe(move |event| {
        if CartSyncCoordinator::<&RecordingApi>::should_run(event) {
            observed.store(true, Ordering::SeqCst);
        }
    });

    // Already signed in; a replacement identity is a refresh, not a
    // transition out of anonymity.
    identity.set_identity(buyer_identity());
    triggers.store(false, Ordering::SeqCst);
    identity.set_identity(buyer_identity());
    assert!(!triggers.load(Ordering::SeqCst));
}

// ============================================================================
// Failure & Retry
// ============================================================================

#[tokio::test]
async fn test_failed_migration_survives_a_reload_and_retries_in_full() {
    let storage = Arc::new(MemoryStorage::new());
    let cart = Arc::new(LocalCartStore::open(Box::new(Arc::clone(&storage))));
    cart.add_or_increment(ProductId::new(11), StoreId::new(2), usd(9_999));
    cart.add_or_increment(ProductId::new(12), StoreId::new(2), usd(1_250));
    cart.add_or_increment(ProductId::new(13), StoreId::new(2), usd(880));

    // Second create fails mid-run: the third is never attempted and every
    // local line stays put.
    let api = RecordingApi::failing_on(2);
    let coordinator = CartSyncCoordinator::new(Arc::clone(&cart), &api);
    let outcome = coordinator.run().await;
    let SyncOutcome::Failed { created, .. } = &outcome else {
        panic!("expected a failed run, got {outcome:?}");
    };
    assert_eq!(*created, 1);
    assert_eq!(api.calls().len(), 2);
    assert_eq!(cart.lines().len(), 3);

    // A reload between attempts loses nothing.
    let cart = Arc::new(LocalCartStore::open(Box::new(Arc::clone(&storage))));
    assert_eq!(cart.lines().len(), 3);

    // The retry resends the whole batch; the server may see duplicates of
    // the lines that got through, never a gap.
    api.heal();
    let coordinator = CartSyncCoordinator::new(Arc::clone(&cart), &api);
    assert!(matches!(
        coordinator.run().await,
        SyncOutcome::Completed { created: 3 }
    ));
    assert_eq!(api.calls().len(), 5);
    assert!(cart.is_empty());
}

// ============================================================================
// Live API Smoke Tests
// ============================================================================

/// Base URL for the marketplace API (configurable via environment).
fn api_base_url() -> String {
    std::env::var("VIVARIUM_API_BASE").unwrap_or_else(|_| "http://localhost:8000/api".to_string())
}

#[tokio::test]
#[ignore = "Requires a running Vivarium API server"]
async fn test_login_rejects_bad_credentials() {
    let client = reqwest::Client::new();
    let base_url = api_base_url();

    let resp = client
        .post(format!("{base_url}/login"))
        .json(&serde_json::json!({
            "email": "nobody@example.com",
            "password": "wrong-password",
        }))
        .send()
        .await
        .expect("Failed to reach login endpoint");

    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires a running Vivarium API server"]
async fn test_cart_endpoints_require_authentication() {
    let client = reqwest::Client::new();
    let base_url = api_base_url();

    let resp = client
        .get(format!("{base_url}/carts"))
        .send()
        .await
        .expect("Failed to reach carts endpoint");

    assert!(
        resp.status() == reqwest::StatusCode::UNAUTHORIZED
            || resp.status() == reqwest::StatusCode::FORBIDDEN,
        "expected an auth rejection, got: {}",
        resp.status()
    );
}
