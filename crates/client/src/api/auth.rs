//! Authentication API client.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;
use url::Url;

use vivarium_core::{Email, Role, UserId};

use super::{ApiError, decode_response};
use crate::identity::{Identity, IdentityError, RoleShape, normalize_roles};

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid credentials (wrong password, unknown account, or bad OTP).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account came back with no usable roles.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// Underlying API failure.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Registration request body.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    /// Display name for the new account.
    pub name: String,
    /// Account email.
    pub email: Email,
    /// Account password.
    pub password: String,
    /// Whether the account starts as a buyer or a seller.
    pub role: Role,
}

/// Session payload returned by login, registration, and OTP verification.
///
/// The role array is duck-typed on the wire; it is normalized into [`Role`]
/// tags before anything else sees it.
#[derive(Debug, Deserialize)]
struct SessionResponse {
    user: SessionUser,
    token: String,
}

#[derive(Debug, Deserialize)]
struct SessionUser {
    id: UserId,
    name: String,
    email: Email,
    roles: Vec<RoleShape>,
}

impl SessionResponse {
    fn into_identity(self) -> Result<Identity, IdentityError> {
        Identity::new(
            self.user.id,
            self.user.name,
            self.user.email,
            normalize_roles(&self.user.roles),
            secrecy::SecretString::from(self.token),
        )
    }
}

/// Client for authentication endpoints.
#[derive(Clone)]
pub struct AuthClient {
    inner: Arc<AuthClientInner>,
}

struct AuthClientInner {
    client: reqwest::Client,
    base: String,
}

impl AuthClient {
    /// Create a new authentication client.
    #[must_use]
    pub fn new(api_base: &Url) -> Self {
        Self {
            inner: Arc::new(AuthClientInner {
                client: reqwest::Client::new(),
                base: api_base.as_str().trim_end_matches('/').to_owned(),
            }),
        }
    }

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is
    /// wrong; other API failures pass through.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &Email, password: &str) -> Result<Identity, AuthError> {
        let url = format!("{}/login", self.inner.base);
        let body = serde_json::json!({ "email": email, "password": password });

        let response = self
            .inner
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::from)?;
        let session: SessionResponse = decode_response(response)
            .await
            .map_err(map_unauthorized)?;

        Ok(session.into_identity()?)
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns an error if registration is rejected or the response cannot
    /// be decoded.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<Identity, AuthError> {
        let url = format!("{}/register", self.inner.base);

        let response = self
            .inner
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(ApiError::from)?;
        let session: SessionResponse = decode_response(response).await?;

        Ok(session.into_identity()?)
    }

    /// Verify a one-time passcode sent to the account's email.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the code is wrong or
    /// expired; other API failures pass through.
    #[instrument(skip(self, code), fields(email = %email))]
    pub async fn verify_otp(&self, email: &Email, code: &str) -> Result<Identity, AuthError> {
        let url = format!("{}/verify-otp", self.inner.base);
        let body = serde_json::json!({ "email": email, "code": code });

        let response = self
            .inner
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::from)?;
        let session: SessionResponse = decode_response(response)
            .await
            .map_err(map_unauthorized)?;

        Ok(session.into_identity()?)
    }
}

fn map_unauthorized(error: ApiError) -> AuthError {
    if error.status() == Some(401) {
        AuthError::InvalidCredentials
    } else {
        AuthError::Api(error)
    }
}
