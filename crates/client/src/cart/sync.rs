//! One-shot migration of the local cart into the server cart at login.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use super::local::LocalCartStore;
use crate::api::{ApiError, CreateCartLine, RemoteCartLine};
use crate::identity::IdentityEvent;

/// Port to the server-side cart, as this coordinator needs it.
///
/// The production implementation is [`CartClient`]; tests inject a
/// recording fake.
///
/// [`CartClient`]: crate::api::CartClient
pub trait CartApi: Send + Sync {
    /// Create one server-side cart line.
    fn create_line(
        &self,
        request: &CreateCartLine,
    ) -> impl Future<Output = Result<RemoteCartLine, ApiError>> + Send;
}

/// How a sync run ended.
///
/// Failure is a normal, retry-eligible outcome here, not an error: the
/// local cart is preserved and a later trigger retries the whole batch.
#[derive(Debug)]
pub enum SyncOutcome {
    /// Nothing to do: the local cart was empty, or a sync was already
    /// attempted this session.
    Skipped,
    /// Every line was accepted; the local cart is now empty.
    Completed {
        /// Lines created server-side.
        created: usize,
    },
    /// A create call failed; the remainder was aborted and the local cart
    /// left untouched.
    Failed {
        /// Lines the server had accepted before the failure.
        created: usize,
        /// The failing call's error.
        error: ApiError,
    },
}

/// Migrates locally captured cart lines into the server cart, once per
/// session, when an anonymous visitor signs in.
///
/// Lines are created sequentially in local insertion order, each call
/// awaited before the next, so server arrival order matches what the user
/// built offline. Delivery is at-least-once across retries: a failed run
/// leaves every local line in place and the whole batch is resent next
/// time.
pub struct CartSyncCoordinator<C: CartApi> {
    cart: Arc<LocalCartStore>,
    api: C,
    attempted: AtomicBool,
}

impl<C: CartApi> CartSyncCoordinator<C> {
    /// Create a coordinator over the local cart and a server cart port.
    #[must_use]
    pub fn new(cart: Arc<LocalCartStore>, api: C) -> Self {
        Self {
            cart,
            api,
            attempted: AtomicBool::new(false),
        }
    }

    /// Whether `event` is the transition this coordinator reacts to.
    ///
    /// Only the anonymous-to-authenticated sign-in triggers a sync; token
    /// refreshes and sign-outs do not.
    #[must_use]
    pub const fn should_run(event: IdentityEvent) -> bool {
        matches!(
            event,
            IdentityEvent::SignedIn {
                from_anonymous: true
            }
        )
    }

    /// Run one sync attempt.
    ///
    /// An empty local cart is a no-op that does not consume the
    /// once-per-session attempt; the guard flag is only set once there is
    /// something to send.
    pub async fn run(&self) -> SyncOutcome {
        if self.attempted.load(Ordering::SeqCst) {
            return SyncOutcome::Skipped;
        }

        let lines = self.cart.lines();
        if lines.is_empty() {
            return SyncOutcome::Skipped;
        }

        // Set before the first remote call so a rapid re-trigger cannot
        // start a second run mid-flight.
        if self.attempted.swap(true, Ordering::SeqCst) {
            return SyncOutcome::Skipped;
        }

        let total = lines.len();
        let mut created = 0usize;

        for line in &lines {
            let request = CreateCartLine {
                product_id: line.product_id,
                store_id: Some(line.store_id),
                quantity: line.quantity,
            };

            match self.api.create_line(&request).await {
                Ok(_) => created += 1,
                Err(error) => {
                    warn!(
                        %error,
                        created,
                        total,
                        "cart sync aborted; local cart preserved for retry"
                    );
                    self.attempted.store(false, Ordering::SeqCst);
                    return SyncOutcome::Failed { created, error };
                }
            }
        }

        self.cart.clear();
        info!(created, "cart sync complete; local cart cleared");
        SyncOutcome::Completed { created }
    }
}
