//! # HTTP Backend
//!
//! [`StorefrontApi`] over `reqwest`.
//!
//! ## Request Flow
//! ```text
//! ┌────────────┐   endpoint()    ┌──────────────┐   send()   ┌──────────────┐
//! │ service    │ ──────────────► │ Url + bearer │ ─────────► │ backend      │
//! └────────────┘                 └──────────────┘            └──────┬───────┘
//!       ▲                                                           │
//!       │   T / ClientError::{Unauthorized, Forbidden, NotFound, Api}
//!       └───────────────────── handle_response() ◄──────────────────┘
//! ```
//!
//! Non-success bodies look like `{"detail": "..."}` (or a list of
//! validation errors for 422); the detail text is carried into the error.

use async_trait::async_trait;
use mandi_core::{
    CartLine, IngestReport, Order, OrderDraft, OrderId, PaymentDetails, Product, ProductId,
    ServerCart, User,
};
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::api::{
    Credentials, DeliveryReceipt, ProfileUpdate, SignupRequest, SignupResponse, SpreadsheetUpload,
    StorefrontApi, TokenResponse,
};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// HTTP implementation of the storefront API.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: Url,
}

impl HttpApi {
    /// Creates a client for the configured backend.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("mandi-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(client, config.base_url()?))
    }

    /// Uses an existing `reqwest::Client`.
    pub fn with_client(client: Client, base_url: Url) -> Self {
        HttpApi { client, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends path segments to the base URL, percent-encoding each.
    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::Config(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, builder: RequestBuilder, token: &SecretString) -> RequestBuilder {
        builder.bearer_auth(token.expose_secret())
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<T> {
        let response = builder.send().await?;
        handle_response(response).await
    }

    async fn send_empty(&self, builder: RequestBuilder) -> ClientResult<()> {
        let response = builder.send().await?;
        if response.status().is_success() {
            return Ok(());
        }
        Err(parse_error(response).await)
    }
}

/// Decodes a success body or turns the status into a [`ClientError`].
async fn handle_response<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    if response.status().is_success() {
        let bytes = response.bytes().await?;
        return serde_json::from_slice(&bytes).map_err(ClientError::from);
    }
    Err(parse_error(response).await)
}

async fn parse_error(response: Response) -> ClientError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let detail = extract_detail(&body)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());

    debug!(status = status.as_u16(), detail = %detail, "Backend returned an error");
    ClientError::from_status(status.as_u16(), detail)
}

/// Pulls the human-readable message out of an error body.
fn extract_detail(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    let value: serde_json::Value = match serde_json::from_str(trimmed) {
        Ok(v) => v,
        Err(_) => return Some(trimmed.to_string()),
    };

    match value.get("detail") {
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(serde_json::Value::Array(items)) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => value
            .get("error")
            .and_then(|e| e.as_str())
            .map(str::to_string),
    }
}

#[async_trait]
impl StorefrontApi for HttpApi {
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    async fn login(&self, credentials: &Credentials) -> ClientResult<TokenResponse> {
        let body = serde_json::json!({
            "email": credentials.email,
            "password": credentials.password.expose_secret(),
        });
        self.send(self.client.post(self.endpoint(&["auth", "login"])?).json(&body))
            .await
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    async fn signup(&self, request: &SignupRequest) -> ClientResult<SignupResponse> {
        let body = serde_json::json!({
            "name": request.name,
            "email": request.email,
            "password": request.password.expose_secret(),
            "location": request.location,
            "contact_number": request.contact_number,
        });
        self.send(self.client.post(self.endpoint(&["auth", "signup"])?).json(&body))
            .await
    }

    #[instrument(skip(self, token))]
    async fn profile(&self, token: &SecretString) -> ClientResult<User> {
        let request = self.client.get(self.endpoint(&["user", "profile"])?);
        self.send(self.authorized(request, token)).await
    }

    #[instrument(skip(self, token, changes))]
    async fn update_profile(
        &self,
        token: &SecretString,
        changes: &ProfileUpdate,
    ) -> ClientResult<User> {
        let request = self
            .client
            .put(self.endpoint(&["user", "profile"])?)
            .json(changes);
        self.send(self.authorized(request, token)).await
    }

    #[instrument(skip(self))]
    async fn products(&self, skip: i64, limit: i64) -> ClientResult<Vec<Product>> {
        let request = self
            .client
            .get(self.endpoint(&["product"])?)
            .query(&[("skip", skip), ("limit", limit)]);
        self.send(request).await
    }

    #[instrument(skip(self))]
    async fn product(&self, id: ProductId) -> ClientResult<Product> {
        let id = id.to_string();
        self.send(self.client.get(self.endpoint(&["product", &id])?))
            .await
    }

    #[instrument(skip(self))]
    async fn products_by_category(&self, category: &str) -> ClientResult<Vec<Product>> {
        self.send(
            self.client
                .get(self.endpoint(&["product", "category", category])?),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn search_products(&self, query: &str) -> ClientResult<Vec<Product>> {
        let request = self
            .client
            .get(self.endpoint(&["product", "search"])?)
            .query(&[("query", query)]);
        self.send(request).await
    }

    #[instrument(skip(self, token))]
    async fn cart(&self, token: &SecretString) -> ClientResult<ServerCart> {
        let request = self.client.get(self.endpoint(&["cart"])?);
        self.send(self.authorized(request, token)).await
    }

    #[instrument(skip(self, token, lines), fields(lines = lines.len()))]
    async fn replace_cart(
        &self,
        token: &SecretString,
        lines: &[CartLine],
    ) -> ClientResult<ServerCart> {
        let request = self.client.post(self.endpoint(&["cart"])?).json(lines);
        self.send(self.authorized(request, token)).await
    }

    #[instrument(skip(self, token))]
    async fn remove_cart_item(
        &self,
        token: &SecretString,
        product_id: ProductId,
    ) -> ClientResult<ServerCart> {
        let request = self
            .client
            .post(self.endpoint(&["cart", "remove_item"])?)
            .json(&serde_json::json!({ "product_id": product_id }));
        self.send(self.authorized(request, token)).await
    }

    #[instrument(skip(self, token))]
    async fn clear_cart(&self, token: &SecretString) -> ClientResult<()> {
        let request = self
            .client
            .post(self.endpoint(&["cart", "clear"])?)
            .json(&serde_json::json!({}));
        self.send_empty(self.authorized(request, token)).await
    }

    #[instrument(skip(self, token, draft), fields(total = draft.total_order_price))]
    async fn place_order(&self, token: &SecretString, draft: &OrderDraft) -> ClientResult<Order> {
        let request = self.client.post(self.endpoint(&["order"])?).json(draft);
        self.send(self.authorized(request, token)).await
    }

    #[instrument(skip(self, token))]
    async fn my_orders(&self, token: &SecretString) -> ClientResult<Vec<Order>> {
        let request = self.client.get(self.endpoint(&["order"])?);
        self.send(self.authorized(request, token)).await
    }

    #[instrument(skip(self, token))]
    async fn all_orders(&self, token: &SecretString) -> ClientResult<Vec<Order>> {
        let request = self.client.get(self.endpoint(&["order", "all"])?);
        self.send(self.authorized(request, token)).await
    }

    #[instrument(skip(self, token, payment_details))]
    async fn authorise_delivery(
        &self,
        token: &SecretString,
        order_id: OrderId,
        payment_details: &PaymentDetails,
    ) -> ClientResult<DeliveryReceipt> {
        let id = order_id.to_string();
        let request = self
            .client
            .post(self.endpoint(&["admin", "AuthoriseDelivery", &id])?)
            .json(&serde_json::json!({ "payment_details": payment_details }));
        self.send(self.authorized(request, token)).await
    }

    #[instrument(skip(self, token, upload), fields(file = %upload.file_name, bytes = upload.bytes.len()))]
    async fn ingest_products(
        &self,
        token: &SecretString,
        upload: SpreadsheetUpload,
    ) -> ClientResult<IngestReport> {
        let mime = upload.mime_type();
        let part = reqwest::multipart::Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(mime)?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let request = self
            .client
            .post(self.endpoint(&["admin", "IngestProducts"])?)
            .multipart(form);
        let report: IngestReport = self.send(self.authorized(request, token)).await?;

        if !report.success {
            warn!(message = ?report.message, "Product ingestion reported failure");
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base: &str) -> HttpApi {
        HttpApi::with_client(Client::new(), Url::parse(base).unwrap())
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let api = api("http://localhost:8000");
        assert_eq!(
            api.endpoint(&["product", "category", "leafy greens"])
                .unwrap()
                .as_str(),
            "http://localhost:8000/product/category/leafy%20greens"
        );

        let api = self::api("https://shop.example.com/api/");
        assert_eq!(
            api.endpoint(&["cart", "clear"]).unwrap().as_str(),
            "https://shop.example.com/api/cart/clear"
        );
    }

    #[test]
    fn test_extract_detail() {
        assert_eq!(
            extract_detail(r#"{"detail": "Cart not found"}"#).as_deref(),
            Some("Cart not found")
        );
        assert_eq!(
            extract_detail(
                r#"{"detail": [{"loc": ["body", "email"], "msg": "value is not a valid email address"}]}"#
            )
            .as_deref(),
            Some("value is not a valid email address")
        );
        assert_eq!(
            extract_detail(r#"{"error": "Invalid file"}"#).as_deref(),
            Some("Invalid file")
        );
        assert_eq!(extract_detail("Bad Gateway").as_deref(), Some("Bad Gateway"));
        assert_eq!(extract_detail("  "), None);
    }
}
