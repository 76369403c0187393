//! # Domain Types
//!
//! The storefront's domain types, shaped after the backend's JSON.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Order       │   │      User       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  product_id     │   │  order_id       │   │  id             │       │
//! │  │  product_name   │   │  products[]     │   │  email          │       │
//! │  │  product_price  │   │  order_status   │   │  role           │       │
//! │  │  stock_quantity │   │  total_price    │   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   ServerCart    │   │  OrderStatus    │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  products[]     │   │  0 Failed       │   │  Cash           │       │
//! │  │   product_id    │   │  1/5 Delivered  │   │  Upi            │       │
//! │  │   quantity      │   │  2 Processing   │   │  Card           │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All prices on the wire are whole rupees. Accessors convert to [`Money`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::DEFAULT_UNIT;

/// Backend product identifier.
pub type ProductId = i64;

/// Backend order identifier.
pub type OrderId = i64;

/// Backend user identifier.
pub type UserId = i64;

// =============================================================================
// Product
// =============================================================================

/// A product listed by the backend. Read-only from the client's perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    #[serde(rename = "product_id")]
    pub id: ProductId,

    #[serde(rename = "product_name")]
    pub name: String,

    #[serde(rename = "product_category", default)]
    pub category: String,

    #[serde(rename = "product_description", default)]
    pub description: String,

    /// Pack weight in kilograms.
    #[serde(rename = "product_weight", default)]
    pub weight_kg: i64,

    /// Price in whole rupees per unit.
    #[serde(rename = "product_price")]
    pub price_rupees: i64,

    #[serde(default)]
    pub stock_quantity: i64,

    #[serde(default)]
    pub seasonal_availability: bool,

    /// Image URLs, first one is the listing image.
    #[serde(default)]
    pub images: Vec<String>,

    #[serde(default)]
    pub ratings: f64,

    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Returns the unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_rupees(self.price_rupees)
    }

    /// Selling unit. The catalog is priced per kilogram.
    #[inline]
    pub fn unit(&self) -> &'static str {
        DEFAULT_UNIT
    }

    /// Listing image, if the product has any.
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Checks whether `quantity` units are in stock.
    pub fn has_stock_for(&self, quantity: i64) -> bool {
        self.stock_quantity >= quantity
    }
}

// =============================================================================
// User
// =============================================================================

/// Role codes as stored by the backend.
///
/// Serialized as the integer code; deserialized from either the code or
/// its name, since login responses have carried both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    Admin,
    #[default]
    Customer,
    DeliveryAgent,
}

impl Role {
    /// Maps a backend role code. Unknown codes get customer rights.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Role::Admin,
            3 => Role::DeliveryAgent,
            _ => Role::Customer,
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            Role::Admin => 1,
            Role::Customer => 2,
            Role::DeliveryAgent => 3,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Customer => write!(f, "customer"),
            Role::DeliveryAgent => write!(f, "delivery_agent"),
        }
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" | "1" => Ok(Role::Admin),
            "customer" | "2" => Ok(Role::Customer),
            "delivery_agent" | "delivery" | "3" => Ok(Role::DeliveryAgent),
            other => Err(ValidationError::InvalidFormat {
                field: "role".to_string(),
                reason: format!("unknown role '{}'", other),
            }),
        }
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.code())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Code(i64),
            Name(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Code(code) => Ok(Role::from_code(code)),
            Repr::Name(name) => name.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// The signed-in user's record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,

    /// Doubles as the delivery address on the backend.
    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub contact_number: Option<String>,

    #[serde(default)]
    #[ts(type = "number")]
    pub role: Role,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

// =============================================================================
// Cart (wire)
// =============================================================================

/// One line of the server-held cart.
///
/// Outbound lines carry only `product_id` and `quantity`; inbound lines may
/// also carry a name and price snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,

    /// Unit price in rupees, when the server included it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
}

impl CartLine {
    /// Builds an outbound line.
    pub fn new(product_id: ProductId, quantity: i64) -> Self {
        CartLine {
            product_id,
            quantity,
            product_name: None,
            price: None,
        }
    }
}

/// The authoritative cart as returned by `GET /cart` and `POST /cart`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ServerCart {
    #[serde(default)]
    pub cart_id: Option<i64>,

    #[serde(default)]
    pub user_id: Option<UserId>,

    #[serde(default)]
    pub products: Vec<CartLine>,

    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub expires_at: Option<DateTime<Utc>>,

    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle of an order.
///
/// ```text
///              ┌──────────────► Delivered (1, 5)
///  Processing ─┤
///     (2)      └──────────────► Failed (0)
/// ```
///
/// Transitions are one-directional and admin-only. Codes the client does
/// not know are preserved as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Failed,
    Delivered,
    Processing,
    Unknown(i64),
}

impl OrderStatus {
    /// Maps a backend status code.
    ///
    /// `5` is what the admin delivery endpoint writes, `1` is what payment
    /// completion writes; both mean delivered.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => OrderStatus::Failed,
            1 | 5 => OrderStatus::Delivered,
            2 => OrderStatus::Processing,
            other => OrderStatus::Unknown(other),
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            OrderStatus::Failed => 0,
            OrderStatus::Delivered => 1,
            OrderStatus::Processing => 2,
            OrderStatus::Unknown(code) => *code,
        }
    }

    /// Status text shown to shoppers.
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Failed => "Failed",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Processing => "Processing",
            OrderStatus::Unknown(_) => "Unknown",
        }
    }

    /// Whether the order still awaits delivery.
    pub fn is_open(&self) -> bool {
        matches!(self, OrderStatus::Processing)
    }

    /// Only processing orders move, and only to delivered or failed.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Processing, OrderStatus::Delivered)
                | (OrderStatus::Processing, OrderStatus::Failed)
        )
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Processing
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for OrderStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.code())
    }
}

impl<'de> Deserialize<'de> for OrderStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i64::deserialize(deserializer).map(OrderStatus::from_code)
    }
}

// =============================================================================
// Payment
// =============================================================================

/// Payment options offered at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[default]
    Cash,
    Upi,
    Card,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Upi => "upi",
            PaymentMethod::Card => "card",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" | "cod" => Ok(PaymentMethod::Cash),
            "upi" => Ok(PaymentMethod::Upi),
            "card" => Ok(PaymentMethod::Card),
            other => Err(ValidationError::InvalidFormat {
                field: "payment method".to_string(),
                reason: format!("'{}' is not one of cash, upi, card", other),
            }),
        }
    }
}

/// Free-form payment descriptor attached to an order.
///
/// The backend stores whatever JSON it was given; admins have also typed
/// plain strings into it. Empty means payment has not been recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentDetails(pub serde_json::Value);

impl PaymentDetails {
    /// Descriptor for a checkout payment method.
    pub fn for_method(method: PaymentMethod) -> Self {
        PaymentDetails(serde_json::json!({ "payment_method": method.as_str() }))
    }

    /// Descriptor from text typed by an admin.
    pub fn from_note(note: &str) -> Self {
        PaymentDetails(serde_json::Value::String(note.trim().to_string()))
    }

    pub fn is_empty(&self) -> bool {
        match &self.0 {
            serde_json::Value::Null => true,
            serde_json::Value::Object(map) => map.is_empty(),
            serde_json::Value::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Payment method text for order listings.
    ///
    /// `Pending` when nothing is recorded, the `payment_method` field when
    /// present, `Online` otherwise. Strings holding JSON are parsed first;
    /// other strings are shown as typed.
    pub fn method_label(&self) -> String {
        if self.is_empty() {
            return "Pending".to_string();
        }

        match &self.0 {
            serde_json::Value::Object(map) => method_field(map),
            serde_json::Value::String(raw) => match serde_json::from_str(raw) {
                Ok(serde_json::Value::Object(map)) => method_field(&map),
                Ok(_) => "Online".to_string(),
                Err(_) => raw.clone(),
            },
            _ => "Online".to_string(),
        }
    }
}

fn method_field(map: &serde_json::Map<String, serde_json::Value>) -> String {
    map.get("payment_method")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("Online")
        .to_string()
}

// =============================================================================
// Order
// =============================================================================

/// A line of a placed order. `price` is the unit price frozen at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderLine {
    pub product_id: ProductId,

    #[serde(default)]
    pub product_name: Option<String>,

    pub quantity: i64,

    #[serde(default)]
    pub price: i64,
}

impl OrderLine {
    pub fn unit_price(&self) -> Money {
        Money::from_rupees(self.price)
    }

    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }

    /// Name for display, falling back to the product id.
    pub fn display_name(&self) -> String {
        self.product_name
            .clone()
            .unwrap_or_else(|| format!("Product {}", self.product_id))
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    #[serde(rename = "order_id")]
    pub id: OrderId,

    #[serde(default)]
    pub user_id: Option<UserId>,

    #[serde(default)]
    pub products: Vec<OrderLine>,

    #[serde(rename = "total_order_price")]
    pub total_rupees: i64,

    #[serde(rename = "order_status", default)]
    #[ts(type = "number")]
    pub status: OrderStatus,

    #[serde(default)]
    pub delivery_address: String,

    #[serde(default)]
    #[ts(type = "unknown")]
    pub payment_details: PaymentDetails,

    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn total(&self) -> Money {
        Money::from_rupees(self.total_rupees)
    }

    pub fn payment_method_label(&self) -> String {
        self.payment_details.method_label()
    }

    /// Checks that this order may move to `next`.
    pub fn ensure_transition(&self, next: OrderStatus) -> CoreResult<()> {
        if self.status.can_transition_to(next) {
            Ok(())
        } else {
            Err(CoreError::InvalidStatusTransition {
                order_id: self.id,
                from: self.status,
                to: next,
            })
        }
    }
}

// =============================================================================
// Admin
// =============================================================================

/// Result of a product spreadsheet upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct IngestReport {
    #[serde(default)]
    pub success: bool,

    #[serde(default)]
    pub products_added: i64,

    #[serde(default)]
    pub products_updated: i64,

    #[serde(default)]
    pub total_processed: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================
