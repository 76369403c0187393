//! In-memory storefront backend for service tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use mandi_client::api::{
    Credentials, DeliveryReceipt, ProfileUpdate, SignupRequest, SignupResponse,
    SpreadsheetUpload, StorefrontApi, TokenResponse,
};
use mandi_client::config::ClientConfig;
use mandi_client::{ClientError, ClientResult, MemorySessionStore, RecordingNavigator, Storefront};
use mandi_core::{
    CartLine, IngestReport, Order, OrderDraft, OrderId, OrderLine, OrderStatus, PaymentDetails,
    Product, ProductId, Role, ServerCart, User,
};
use secrecy::{ExposeSecret, SecretString};

pub const TOKEN: &str = "fake-token";
pub const PASSWORD: &str = "sabzi123";

#[derive(Default)]
pub struct FakeState {
    pub products: BTreeMap<ProductId, Product>,
    pub user: Option<User>,
    /// `None` means the backend has never seen a cart for the user.
    pub cart: Option<Vec<CartLine>>,
    pub orders: Vec<Order>,
    pub placed: Vec<OrderDraft>,
    pub cart_pushes: Vec<Vec<CartLine>>,
    pub profile_updates: Vec<ProfileUpdate>,
    pub uploads: Vec<String>,
    pub calls: Vec<&'static str>,
    /// Endpoints forced to answer with the given status.
    pub failures: HashMap<&'static str, u16>,
    /// When set every authenticated call answers 401.
    pub reject_tokens: bool,
}

#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        let backend = FakeBackend::default();
        backend.with(|s| {
            s.user = Some(customer());
            s.products.insert(1, product(1, "Tomatoes", 40));
            s.products.insert(2, product(2, "Onions", 30));
            s.products.insert(3, product(3, "Alphonso Mangoes", 600));
        });
        Arc::new(backend)
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut FakeState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    pub fn fail(&self, endpoint: &'static str, status: u16) {
        self.with(|s| s.failures.insert(endpoint, status));
    }

    pub fn heal(&self, endpoint: &'static str) {
        self.with(|s| s.failures.remove(endpoint));
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.with(|s| s.calls.clone())
    }

    pub fn call_count(&self, endpoint: &str) -> usize {
        self.calls().iter().filter(|c| **c == endpoint).count()
    }

    pub fn server_cart(&self) -> Option<Vec<CartLine>> {
        self.with(|s| s.cart.clone())
    }

    fn enter(&self, endpoint: &'static str) -> ClientResult<()> {
        self.with(|s| {
            s.calls.push(endpoint);
            match s.failures.get(endpoint) {
                Some(status) => Err(ClientError::from_status(
                    *status,
                    format!("{} failed", endpoint),
                )),
                None => Ok(()),
            }
        })
    }

    fn authed(&self, endpoint: &'static str, token: &SecretString) -> ClientResult<()> {
        self.enter(endpoint)?;
        let rejected = self.with(|s| s.reject_tokens);
        if rejected || token.expose_secret() != TOKEN {
            return Err(ClientError::Unauthorized(
                "Could not validate credentials".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl StorefrontApi for FakeBackend {
    async fn login(&self, credentials: &Credentials) -> ClientResult<TokenResponse> {
        self.enter("login")?;
        let user = self.with(|s| s.user.clone());
        match user {
            Some(u) if u.email == credentials.email && credentials.password.expose_secret() == PASSWORD => {
                Ok(TokenResponse {
                    access_token: TOKEN.to_string(),
                    refresh_token: None,
                    token_type: "bearer".to_string(),
                    user: None,
                })
            }
            _ => Err(ClientError::Unauthorized(
                "Incorrect email or password".to_string(),
            )),
        }
    }

    async fn signup(&self, request: &SignupRequest) -> ClientResult<SignupResponse> {
        self.enter("signup")?;
        let user = User {
            id: 99,
            name: request.name.clone(),
            email: request.email.clone(),
            location: Some(request.location.clone()),
            contact_number: Some(request.contact_number.clone()),
            role: Role::Customer,
        };
        Ok(SignupResponse::Created(user))
    }

    async fn profile(&self, token: &SecretString) -> ClientResult<User> {
        self.authed("profile", token)?;
        self.with(|s| s.user.clone())
            .ok_or_else(|| ClientError::NotFound("User not found".to_string()))
    }

    async fn update_profile(
        &self,
        token: &SecretString,
        changes: &ProfileUpdate,
    ) -> ClientResult<User> {
        self.authed("update_profile", token)?;
        self.with(|s| {
            s.profile_updates.push(changes.clone());
            let user = s
                .user
                .as_mut()
                .ok_or_else(|| ClientError::NotFound("User not found".to_string()))?;
            if let Some(name) = &changes.name {
                user.name = name.clone();
            }
            if let Some(email) = &changes.email {
                user.email = email.clone();
            }
            if let Some(location) = &changes.location {
                user.location = Some(location.clone());
            }
            if let Some(contact) = &changes.contact_number {
                user.contact_number = Some(contact.clone());
            }
            Ok(user.clone())
        })
    }

    async fn products(&self, skip: i64, limit: i64) -> ClientResult<Vec<Product>> {
        self.enter("products")?;
        Ok(self.with(|s| {
            s.products
                .values()
                .skip(skip as usize)
                .take(limit as usize)
                .cloned()
                .collect()
        }))
    }

    async fn product(&self, id: ProductId) -> ClientResult<Product> {
        self.enter("product")?;
        self.with(|s| s.products.get(&id).cloned())
            .ok_or_else(|| ClientError::NotFound("Product not found".to_string()))
    }

    async fn products_by_category(&self, category: &str) -> ClientResult<Vec<Product>> {
        self.enter("products_by_category")?;
        Ok(self.with(|s| {
            s.products
                .values()
                .filter(|p| p.category.eq_ignore_ascii_case(category))
                .cloned()
                .collect()
        }))
    }

    async fn search_products(&self, query: &str) -> ClientResult<Vec<Product>> {
        self.enter("search_products")?;
        let query = query.to_lowercase();
        Ok(self.with(|s| {
            s.products
                .values()
                .filter(|p| p.name.to_lowercase().contains(&query))
                .cloned()
                .collect()
        }))
    }

    async fn cart(&self, token: &SecretString) -> ClientResult<ServerCart> {
        self.authed("cart", token)?;
        match self.server_cart() {
            Some(products) => Ok(ServerCart {
                cart_id: Some(1),
                user_id: Some(7),
                products,
                ..Default::default()
            }),
            None => Err(ClientError::NotFound("Cart not found".to_string())),
        }
    }

    async fn replace_cart(&self, token: &SecretString, lines: &[CartLine]) -> ClientResult<ServerCart> {
        self.authed("replace_cart", token)?;
        let products = lines.to_vec();
        self.with(|s| {
            s.cart_pushes.push(products.clone());
            s.cart = Some(products.clone());
        });
        Ok(ServerCart {
            products,
            ..Default::default()
        })
    }

    async fn remove_cart_item(
        &self,
        token: &SecretString,
        product_id: ProductId,
    ) -> ClientResult<ServerCart> {
        self.authed("remove_cart_item", token)?;
        self.with(|s| {
            let lines = s
                .cart
                .as_mut()
                .ok_or_else(|| ClientError::NotFound("Cart not found".to_string()))?;
            let before = lines.len();
            lines.retain(|l| l.product_id != product_id);
            if lines.len() == before {
                return Err(ClientError::NotFound("Product not in cart".to_string()));
            }
            Ok(ServerCart {
                products: lines.clone(),
                ..Default::default()
            })
        })
    }

    async fn clear_cart(&self, token: &SecretString) -> ClientResult<()> {
        self.authed("clear_cart", token)?;
        self.with(|s| match s.cart.as_mut() {
            Some(lines) => {
                lines.clear();
                Ok(())
            }
            None => Err(ClientError::NotFound("Cart not found".to_string())),
        })
    }

    async fn place_order(&self, token: &SecretString, draft: &OrderDraft) -> ClientResult<Order> {
        self.authed("place_order", token)?;
        self.with(|s| {
            s.placed.push(draft.clone());
            let order = Order {
                id: s.orders.len() as OrderId + 1,
                user_id: Some(7),
                products: draft.products.clone(),
                total_rupees: draft.total_order_price,
                status: OrderStatus::Processing,
                delivery_address: draft.delivery_address.clone(),
                payment_details: draft.payment_details.clone(),
                created_at: Some(chrono::Utc::now()),
                updated_at: None,
            };
            s.orders.push(order.clone());
            Ok(order)
        })
    }

    async fn my_orders(&self, token: &SecretString) -> ClientResult<Vec<Order>> {
        self.authed("my_orders", token)?;
        Ok(self.with(|s| s.orders.clone()))
    }

    async fn all_orders(&self, token: &SecretString) -> ClientResult<Vec<Order>> {
        self.authed("all_orders", token)?;
        Ok(self.with(|s| s.orders.clone()))
    }

    async fn authorise_delivery(
        &self,
        token: &SecretString,
        order_id: OrderId,
        payment_details: &PaymentDetails,
    ) -> ClientResult<DeliveryReceipt> {
        self.authed("authorise_delivery", token)?;
        self.with(|s| {
            let order = s
                .orders
                .iter_mut()
                .find(|o| o.id == order_id)
                .ok_or_else(|| ClientError::NotFound("Order not found".to_string()))?;
            order.status = OrderStatus::from_code(5);
            order.payment_details = payment_details.clone();
            Ok(DeliveryReceipt {
                success: true,
                message: format!("Order {} marked as delivered", order_id),
            })
        })
    }

    async fn ingest_products(
        &self,
        token: &SecretString,
        upload: SpreadsheetUpload,
    ) -> ClientResult<IngestReport> {
        self.authed("ingest_products", token)?;
        self.with(|s| s.uploads.push(upload.file_name.clone()));
        Ok(IngestReport {
            success: true,
            products_added: 3,
            products_updated: 1,
            total_processed: 4,
            message: None,
        })
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub fn product(id: ProductId, name: &str, price: i64) -> Product {
    serde_json::from_value(serde_json::json!({
        "product_id": id,
        "product_name": name,
        "product_category": "Vegetables",
        "product_price": price,
        "stock_quantity": 50,
        "images": [format!("https://img.example.com/{}.jpg", id)],
    }))
    .unwrap()
}

pub fn customer() -> User {
    User {
        id: 7,
        name: "Asha Patil".to_string(),
        email: "asha@example.com".to_string(),
        location: Some("Pune".to_string()),
        contact_number: Some("9876543210".to_string()),
        role: Role::Customer,
    }
}

pub fn admin() -> User {
    User {
        id: 1,
        name: "Mandi Admin".to_string(),
        email: "admin@example.com".to_string(),
        role: Role::Admin,
        ..customer()
    }
}

pub fn processing_order(id: OrderId) -> Order {
    Order {
        id,
        user_id: Some(7),
        products: vec![OrderLine {
            product_id: 1,
            product_name: Some("Tomatoes".to_string()),
            quantity: 2,
            price: 40,
        }],
        total_rupees: 130,
        status: OrderStatus::Processing,
        delivery_address: "Asha Patil, 12 Market Road".to_string(),
        payment_details: PaymentDetails::default(),
        created_at: None,
        updated_at: None,
    }
}

pub struct Harness {
    pub backend: Arc<FakeBackend>,
    pub store: Arc<MemorySessionStore>,
    pub navigator: Arc<RecordingNavigator>,
    pub app: Storefront,
}

pub fn harness() -> Harness {
    let backend = FakeBackend::new();
    let store = Arc::new(MemorySessionStore::new());
    let navigator = Arc::new(RecordingNavigator::new());
    let app = Storefront::new(
        &ClientConfig::default(),
        backend.clone(),
        store.clone(),
        navigator.clone(),
    );
    Harness {
        backend,
        store,
        navigator,
        app,
    }
}

/// A harness with the customer already signed in.
pub async fn signed_in() -> Harness {
    let h = harness();
    h.app
        .session
        .login(&Credentials::new("asha@example.com", PASSWORD))
        .await
        .unwrap();
    h
}

/// Same, as the admin.
pub async fn signed_in_admin() -> Harness {
    let h = harness();
    h.backend.with(|s| s.user = Some(admin()));
    h.app
        .session
        .login(&Credentials::new("admin@example.com", PASSWORD))
        .await
        .unwrap();
    h
}
