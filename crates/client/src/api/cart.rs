//! Server-side cart API client.

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use url::Url;

use vivarium_core::{CartLineId, ProductId, StoreId};

use super::{ApiError, decode_response, expect_success};
use crate::cart::CartApi;
use crate::identity::IdentityStore;

/// Request shape for creating a server-side cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCartLine {
    /// Product to add.
    pub product_id: ProductId,
    /// Storefront selling the product, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<StoreId>,
    /// Units to add.
    pub quantity: u32,
}

/// Request shape for updating a server-side cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCartLine {
    /// New quantity for the line.
    pub quantity: u32,
}

/// A cart line as the server reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteCartLine {
    /// Server-assigned line id.
    pub id: CartLineId,
    /// Product on the line.
    pub product_id: ProductId,
    /// Storefront selling the product.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<StoreId>,
    /// Units on the line.
    pub quantity: u32,
}

/// Client for the server-side cart.
///
/// The server owns these lines; this client only creates, reads, updates,
/// and deletes them. The bearer token is read from the identity store at
/// call time.
#[derive(Clone)]
pub struct CartClient {
    inner: Arc<CartClientInner>,
}

struct CartClientInner {
    client: reqwest::Client,
    endpoint: String,
    identity: Arc<IdentityStore>,
}

impl CartClient {
    /// Create a new cart API client.
    #[must_use]
    pub fn new(api_base: &Url, identity: Arc<IdentityStore>) -> Self {
        let endpoint = format!("{}/carts", api_base.as_str().trim_end_matches('/'));

        Self {
            inner: Arc::new(CartClientInner {
                client: reqwest::Client::new(),
                endpoint,
                identity,
            }),
        }
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.inner.identity.current() {
            Some(identity) => request.bearer_auth(identity.session_token().expose_secret()),
            None => request,
        }
    }

    /// List the lines in the server-side cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// decoded.
    #[instrument(skip(self))]
    pub async fn list_lines(&self) -> Result<Vec<RemoteCartLine>, ApiError> {
        let response = self
            .authorize(self.inner.client.get(&self.inner.endpoint))
            .send()
            .await?;

        decode_response(response).await
    }

    /// Update a line's quantity.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects the
    /// update.
    #[instrument(skip(self), fields(line_id = %line_id))]
    pub async fn update_line(
        &self,
        line_id: CartLineId,
        request: &UpdateCartLine,
    ) -> Result<RemoteCartLine, ApiError> {
        let url = format!("{}/{line_id}", self.inner.endpoint);
        let response = self
            .authorize(self.inner.client.put(&url))
            .json(request)
            .send()
            .await?;

        decode_response(response).await
    }

    /// Delete a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects the
    /// delete.
    #[instrument(skip(self), fields(line_id = %line_id))]
    pub async fn delete_line(&self, line_id: CartLineId) -> Result<(), ApiError> {
        let url = format!("{}/{line_id}", self.inner.endpoint);
        let response = self.authorize(self.inner.client.delete(&url)).send().await?;

        expect_success(response).await
    }

    #[instrument(
        skip(self, request),
        fields(product_id = %request.product_id, quantity = request.quantity)
    )]
    async fn create_line_request(
        &self,
        request: &CreateCartLine,
    ) -> Result<RemoteCartLine, ApiError> {
        let response = self
            .authorize(self.inner.client.post(&self.inner.endpoint))
            .json(request)
            .send()
            .await?;

        decode_response(response).await
    }
}

impl CartApi for CartClient {
    fn create_line(
        &self,
        request: &CreateCartLine,
    ) -> impl Future<Output = Result<RemoteCartLine, ApiError>> + Send {
        self.create_line_request(request)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_serializes_contract_shape() {
        let request = CreateCartLine {
            product_id: ProductId::new(11),
            store_id: Some(StoreId::new(3)),
            quantity: 2,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"product_id":11,"store_id":3,"quantity":2}"#);
    }

    #[test]
    fn test_create_request_omits_absent_store_id() {
        let request = CreateCartLine {
            product_id: ProductId::new(11),
            store_id: None,
            quantity: 1,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"product_id":11,"quantity":1}"#);
    }

    #[test]
    fn test_remote_line_decodes_without_store_id() {
        let line: RemoteCartLine =
            serde_json::from_str(r#"{"id":900,"product_id":11,"quantity":4}"#).unwrap();
        assert_eq!(line.id, CartLineId::new(900));
        assert!(line.store_id.is_none());
    }
}
