//! Marketplace REST API clients.
//!
//! # Architecture
//!
//! - Thin typed wrappers over `reqwest` against the marketplace REST API
//! - The server is the source of truth for carts, orders, and accounts -
//!   these clients do no local caching
//! - Authenticated calls read the bearer token from the [`IdentityStore`]
//!   at call time, so a login or logout is picked up immediately
//!
//! # Clients
//!
//! - [`CartClient`] - server-side cart CRUD
//! - [`AuthClient`] - login, registration, OTP verification
//! - [`OrderClient`] - order placement and payment initiation
//!
//! [`IdentityStore`]: crate::identity::IdentityStore

mod auth;
mod cart;
mod orders;

pub use auth::{AuthClient, AuthError, RegisterRequest};
pub use cart::{CartClient, CreateCartLine, RemoteCartLine, UpdateCartLine};
pub use orders::{Order, OrderClient, PaymentHandoff, PlaceOrder};

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when calling the marketplace API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API rejected the request with an error envelope.
    #[error("API error ({status}): {}", envelope.message)]
    Status {
        /// HTTP status code.
        status: u16,
        /// Parsed error body.
        envelope: ErrorEnvelope,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ApiError {
    /// The HTTP status carried by this error, when there is one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(_) | Self::Parse(_) => None,
        }
    }
}

/// Error body returned by the marketplace API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Human-readable summary.
    pub message: String,
    /// Field-level validation messages, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<HashMap<String, Vec<String>>>,
}

impl ErrorEnvelope {
    fn from_opaque_body(body: &str) -> Self {
        Self {
            message: body.chars().take(200).collect(),
            errors: None,
        }
    }
}

/// Decode a JSON response, mapping non-success statuses to the API's error
/// envelope.
async fn decode_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();

    // Get response body as text first for better error diagnostics
    let response_text = response.text().await?;

    if !status.is_success() {
        return Err(status_error(status.as_u16(), &response_text));
    }

    match serde_json::from_str(&response_text) {
        Ok(value) => Ok(value),
        Err(error) => {
            tracing::error!(
                error = %error,
                body = %response_text.chars().take(500).collect::<String>(),
                "failed to parse API response"
            );
            Err(ApiError::Parse(error))
        }
    }
}

/// Await a response that carries no useful body, mapping non-success
/// statuses to the API's error envelope.
async fn expect_success(response: reqwest::Response) -> Result<(), ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let response_text = response.text().await?;
    Err(status_error(status.as_u16(), &response_text))
}

fn status_error(status: u16, body: &str) -> ApiError {
    // Not every error body is a well-formed envelope; fall back to the raw
    // text so the message is never lost.
    let envelope = serde_json::from_str::<ErrorEnvelope>(body)
        .unwrap_or_else(|_| ErrorEnvelope::from_opaque_body(body));

    tracing::debug!(status, message = %envelope.message, "API returned an error");
    ApiError::Status { status, envelope }
}
