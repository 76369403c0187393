//! # Storefront API
//!
//! The REST surface the client consumes, as a trait so services can run
//! against the real backend ([`crate::http::HttpApi`]) or an in-memory
//! fake in tests.
//!
//! ## Endpoints
//! ```text
//! ┌──────────────────────────────────────┬──────────────┬──────────────────┐
//! │ Endpoint                             │ Auth         │ Method           │
//! ├──────────────────────────────────────┼──────────────┼──────────────────┤
//! │ POST /auth/login                     │ -            │ login            │
//! │ POST /auth/signup                    │ -            │ signup           │
//! │ GET|PUT /user/profile                │ bearer       │ (update_)profile │
//! │ GET /product, /product/{id}          │ -            │ products/product │
//! │ GET /product/category/{category}     │ -            │ by_category      │
//! │ GET /product/search?query=           │ -            │ search_products  │
//! │ GET|POST /cart                       │ bearer       │ cart/replace     │
//! │ POST /cart/clear, /cart/remove_item  │ bearer       │ clear/remove     │
//! │ GET|POST /order                      │ bearer       │ my_orders/place  │
//! │ GET /order/all                       │ bearer admin │ all_orders       │
//! │ POST /admin/AuthoriseDelivery/{id}   │ bearer admin │ authorise_...    │
//! │ POST /admin/IngestProducts           │ bearer admin │ ingest_products  │
//! └──────────────────────────────────────┴──────────────┴──────────────────┘
//! ```

use async_trait::async_trait;
use mandi_core::validation::{validate_email, validate_phone, validate_required};
use mandi_core::{
    CartLine, IngestReport, Order, OrderDraft, OrderId, PaymentDetails, Product, ProductId,
    ServerCart, User,
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::ClientResult;

// =============================================================================
// Request Types
// =============================================================================

/// Email and password for `POST /auth/login`.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// New account details for `POST /auth/signup`.
#[derive(Debug, Clone)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub location: String,
    pub contact_number: String,
}

impl SignupRequest {
    /// Checks that every field is present, returning a trimmed copy.
    pub fn validate(&self) -> ClientResult<SignupRequest> {
        Ok(SignupRequest {
            name: validate_required("name", &self.name)?,
            email: validate_email(&self.email)?,
            password: self.password.clone(),
            location: validate_required("location", &self.location)?,
            contact_number: validate_phone(&self.contact_number)?,
        })
    }
}

/// Body of `PUT /user/profile`. Only set fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.location.is_none()
            && self.contact_number.is_none()
    }
}

/// A product spreadsheet to upload.
#[derive(Debug, Clone)]
pub struct SpreadsheetUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl SpreadsheetUpload {
    /// Content type sent with the file.
    pub fn mime_type(&self) -> &'static str {
        if self.file_name.to_ascii_lowercase().ends_with(".xls") {
            "application/vnd.ms-excel"
        } else {
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Body of a successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,

    #[serde(default)]
    pub refresh_token: Option<String>,

    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// Some deployments return the user alongside the token.
    #[serde(default)]
    pub user: Option<User>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Signup answers with either a token (signed in) or the created user.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SignupResponse {
    Token(TokenResponse),
    Created(User),
}

/// Body of `POST /admin/AuthoriseDelivery/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DeliveryReceipt {
    #[serde(default)]
    pub success: bool,

    #[serde(default)]
    pub message: String,
}

// =============================================================================
// API Trait
// =============================================================================

/// The backend as the client sees it.
///
/// Authenticated calls take the bearer token explicitly; the session
/// holder decides which token that is.
#[async_trait]
pub trait StorefrontApi: Send + Sync {
    // --- auth ---------------------------------------------------------------
    async fn login(&self, credentials: &Credentials) -> ClientResult<TokenResponse>;

    async fn signup(&self, request: &SignupRequest) -> ClientResult<SignupResponse>;

    async fn profile(&self, token: &SecretString) -> ClientResult<User>;

    async fn update_profile(
        &self,
        token: &SecretString,
        changes: &ProfileUpdate,
    ) -> ClientResult<User>;

    // --- catalog ------------------------------------------------------------
    async fn products(&self, skip: i64, limit: i64) -> ClientResult<Vec<Product>>;

    async fn product(&self, id: ProductId) -> ClientResult<Product>;

    async fn products_by_category(&self, category: &str) -> ClientResult<Vec<Product>>;

    async fn search_products(&self, query: &str) -> ClientResult<Vec<Product>>;

    // --- cart ---------------------------------------------------------------
    async fn cart(&self, token: &SecretString) -> ClientResult<ServerCart>;

    /// Replaces the whole server cart with `lines`.
    async fn replace_cart(
        &self,
        token: &SecretString,
        lines: &[CartLine],
    ) -> ClientResult<ServerCart>;

    async fn remove_cart_item(
        &self,
        token: &SecretString,
        product_id: ProductId,
    ) -> ClientResult<ServerCart>;

    async fn clear_cart(&self, token: &SecretString) -> ClientResult<()>;

    // --- orders -------------------------------------------------------------
    async fn place_order(&self, token: &SecretString, draft: &OrderDraft) -> ClientResult<Order>;

    async fn my_orders(&self, token: &SecretString) -> ClientResult<Vec<Order>>;

    // --- admin --------------------------------------------------------------
    async fn all_orders(&self, token: &SecretString) -> ClientResult<Vec<Order>>;

    async fn authorise_delivery(
        &self,
        token: &SecretString,
        order_id: OrderId,
        payment_details: &PaymentDetails,
    ) -> ClientResult<DeliveryReceipt>;

    async fn ingest_products(
        &self,
        token: &SecretString,
        upload: SpreadsheetUpload,
    ) -> ClientResult<IngestReport>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_response_variants() {
        let token: SignupResponse =
            serde_json::from_str(r#"{"access_token": "abc", "token_type": "bearer"}"#).unwrap();
        assert!(matches!(token, SignupResponse::Token(_)));

        let created: SignupResponse = serde_json::from_str(
            r#"{"id": 9, "name": "Ravi", "email": "ravi@example.com", "role": 2,
                "location": "Nashik", "contact_number": "9876543210"}"#,
        )
        .unwrap();
        assert!(matches!(created, SignupResponse::Created(ref u) if u.id == 9));
    }

    #[test]
    fn test_profile_update_sends_only_set_fields() {
        let update = ProfileUpdate {
            location: Some("Nashik".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({"location": "Nashik"})
        );
        assert!(ProfileUpdate::default().is_empty());
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials::new("asha@example.com", "hunter22");
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("hunter22"));
    }

    #[test]
    fn test_spreadsheet_mime_type() {
        let upload = SpreadsheetUpload {
            file_name: "stock.XLS".to_string(),
            bytes: Vec::new(),
        };
        assert_eq!(upload.mime_type(), "application/vnd.ms-excel");
    }
}
