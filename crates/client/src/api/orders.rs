//! Order placement and payment initiation API client.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use url::Url;

use vivarium_core::{OrderId, OrderStatus, Price};

use super::{ApiError, decode_response};
use crate::identity::IdentityStore;

/// Request body for placing an order from the server-side cart.
#[derive(Debug, Clone, Serialize)]
pub struct PlaceOrder {
    /// Recipient name.
    pub shipping_name: String,
    /// Shipping address, as a single formatted block.
    pub shipping_address: String,
}

/// An order as the server reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct Order {
    /// Server-assigned order id.
    pub id: OrderId,
    /// Order total.
    pub total: Price,
    /// Current lifecycle status.
    pub status: OrderStatus,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
}

/// Handoff payload for the payment processor.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentHandoff {
    /// Client secret to pass to the payment SDK's confirm call.
    pub client_secret: String,
}

/// Client for order endpoints.
#[derive(Clone)]
pub struct OrderClient {
    inner: Arc<OrderClientInner>,
}

struct OrderClientInner {
    client: reqwest::Client,
    endpoint: String,
    identity: Arc<IdentityStore>,
}

impl OrderClient {
    /// Create a new order API client.
    #[must_use]
    pub fn new(api_base: &Url, identity: Arc<IdentityStore>) -> Self {
        let endpoint = format!("{}/orders", api_base.as_str().trim_end_matches('/'));

        Self {
            inner: Arc::new(OrderClientInner {
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

    /// Place an order from the server-side cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects the
    /// order.
    #[instrument(skip(self, request))]
    pub async fn place_order(&self, request: &PlaceOrder) -> Result<Order, ApiError> {
        let response = self
            .authorize(self.inner.client.post(&self.inner.endpoint))
            .json(request)
            .send()
            .await?;

        decode_response(response).await
    }

    /// Start payment for an order, returning the processor handoff.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the order cannot be paid.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn initiate_payment(&self, order_id: OrderId) -> Result<PaymentHandoff, ApiError> {
        let url = format!("{}/{order_id}/pay", self.inner.endpoint);
        let response = self.authorize(self.inner.client.post(&url)).send().await?;

        decode_response(response).await
    }
}
