//! # Checkout Client
//!
//! A typed Rust client for the checkout API, usable directly or as the
//! [`PaymentGateway`] adapter behind `CheckoutService`.

pub mod openapi;

use std::time::Duration;

use async_trait::async_trait;
use checkout_types::{
    ContinuePaymentRequest, ExecutePaymentRequest, GatewayError, PaymentGateway, PaymentOrder,
    PaymentOutcome,
};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid order id: {0:?}")]
    InvalidOrderId(String),
}

impl From<ClientError> for GatewayError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Http(e) if e.is_decode() => GatewayError::Decode(e.to_string()),
            ClientError::Http(e) => GatewayError::Transport(e.to_string()),
            ClientError::Api { status, message } => GatewayError::Api { status, message },
            ClientError::Json(e) => GatewayError::Decode(e.to_string()),
            ClientError::InvalidUrl(url) => {
                GatewayError::Transport(format!("invalid base URL: {url}"))
            }
            ClientError::InvalidOrderId(id) => {
                GatewayError::Transport(format!("invalid order id: {id:?}"))
            }
        }
    }
}

/// Checkout API client.
#[derive(Clone)]
pub struct CheckoutClient {
    base_url: String,
    session_token: Option<String>,
    http: Client,
}

impl CheckoutClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_token: None,
            http: Client::new(),
        }
    }

    /// Sets the session token sent as a bearer credential.
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Rebuilds the HTTP client with a per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, ClientError> {
        self.http = Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self.http.get(self.endpoint(&["health"])?).send().await?;
        Ok(resp.status().is_success())
    }

    /// Gets an order by ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, order_id: &str) -> Result<PaymentOrder, ClientError> {
        let url = self.endpoint(&["api", "v1", "orders", order_segment(order_id)?])?;
        self.get(url).await
    }

    /// Submits the checkout for an order.
    #[tracing::instrument(skip(self, req))]
    pub async fn execute_payment(
        &self,
        order_id: &str,
        req: &ExecutePaymentRequest,
    ) -> Result<PaymentOutcome, ClientError> {
        let url = self.endpoint(&["api", "v1", "orders", order_segment(order_id)?, "execute"])?;
        self.post(url, req).await
    }

    /// Resumes an order after a challenge or a PayPal approval.
    #[tracing::instrument(skip(self, req))]
    pub async fn continue_payment(
        &self,
        order_id: &str,
        req: &ContinuePaymentRequest,
    ) -> Result<PaymentOutcome, ClientError> {
        let url = self.endpoint(&["api", "v1", "orders", order_segment(order_id)?, "continue"])?;
        self.post(url, req).await
    }

    /// Appends `segments` to the base URL, each percent-encoded as a single
    /// path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ClientError> {
        let mut req = self.http.get(url);
        if let Some(token) = &self.session_token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, ClientError> {
        let mut req = self.http.post(url).json(body);
        if let Some(token) = &self.session_token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or(body);
            tracing::warn!(status = status.as_u16(), %message, "gateway rejected request");
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// Order ids that would not survive as a single path segment.
fn order_segment(order_id: &str) -> Result<&str, ClientError> {
    match order_id {
        "" | "." | ".." => Err(ClientError::InvalidOrderId(order_id.to_string())),
        id => Ok(id),
    }
}

#[async_trait]
impl PaymentGateway for CheckoutClient {
    async fn get_order(&self, order_id: &str) -> Result<PaymentOrder, GatewayError> {
        Ok(CheckoutClient::get_order(self, order_id).await?)
    }

    async fn execute_payment(
        &self,
        order_id: &str,
        req: &ExecutePaymentRequest,
    ) -> Result<PaymentOutcome, GatewayError> {
        Ok(CheckoutClient::execute_payment(self, order_id, req).await?)
    }

    async fn continue_payment(
        &self,
        order_id: &str,
        req: &ContinuePaymentRequest,
    ) -> Result<PaymentOutcome, GatewayError> {
        Ok(CheckoutClient::continue_payment(self, order_id, req).await?)
    }
}
