//! Card payment confirmation against the third-party processor.
//!
//! The processor's browser SDK is reached through the [`PaymentGateway`]
//! port. Payment failures are never swallowed: every error reaches the
//! caller carrying a shopper-facing message, and retry is left to the UI.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use vivarium_core::PaymentIntentStatus;

/// Fallback text when a decline code is unknown or the SDK gave no code.
const GENERIC_DECLINE_MESSAGE: &str =
    "Payment failed. Please try again or use a different payment method.";

/// Payment confirmation failure.
#[derive(Debug, Clone, Error)]
pub enum PaymentError {
    /// The processor refused the charge and reported a machine code.
    #[error("payment declined ({code}): {message}")]
    Declined {
        /// Processor decline code, e.g. `card_declined`.
        code: String,
        /// The processor's own description of the failure.
        message: String,
    },
    /// The SDK failed before a charge decision was made.
    #[error("payment SDK error: {0}")]
    Sdk(String),
}

impl PaymentError {
    /// Message suitable for direct display to the shopper.
    #[must_use]
    pub fn friendly_message(&self) -> &'static str {
        match self {
            Self::Declined { code, .. } => decline_message(code),
            Self::Sdk(_) => GENERIC_DECLINE_MESSAGE,
        }
    }
}

/// Shopper-facing text for a processor decline code.
///
/// Unknown codes get the generic fallback rather than leaking the raw code.
#[must_use]
pub fn decline_message(code: &str) -> &'static str {
    match code {
        "card_declined" => "Your card was declined. Please try a different payment method.",
        "insufficient_funds" => "Your card has insufficient funds.",
        "expired_card" => "Your card has expired. Please use a different card.",
        "incorrect_cvc" => "Your card's security code is incorrect.",
        "processing_error" => "An error occurred while processing your card. Please try again.",
        _ => GENERIC_DECLINE_MESSAGE,
    }
}

/// Payment intent state returned by a confirmation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Current lifecycle status.
    pub status: PaymentIntentStatus,
}

/// Port to the payment processor's confirmation call.
///
/// Mirrors the SDK's `confirm_card_payment(client_secret, payment_method)`
/// contract; tests inject a scripted fake.
pub trait PaymentGateway: Send + Sync {
    /// Confirm a card payment against the intent behind `client_secret`.
    fn confirm_card_payment(
        &self,
        client_secret: &str,
        payment_method_id: &str,
    ) -> impl Future<Output = Result<PaymentIntent, PaymentError>> + Send;
}

/// Confirm the payment for an order and report the resulting intent status.
///
/// A `Succeeded` status is treated as complete client-side; server-side
/// webhook confirmation is assumed and not re-verified here. Any other
/// status is returned as-is so the UI can drive the follow-up step, and
/// errors propagate untouched.
pub async fn confirm_payment<G: PaymentGateway>(
    gateway: &G,
    client_secret: &str,
    payment_method_id: &str,
) -> Result<PaymentIntentStatus, PaymentError> {
    let intent = gateway
        .confirm_card_payment(client_secret, payment_method_id)
        .await?;

    if intent.status.is_succeeded() {
        info!("payment confirmed");
    } else {
        debug!(status = ?intent.status, "payment not yet complete");
    }

    Ok(intent.status)
}
