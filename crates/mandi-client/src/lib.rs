//! # mandi-client: Storefront Client for Farmers Mandi
//!
//! Everything that talks to the backend or touches disk: the REST API, the
//! persisted session, the cart mirror and the services built on them.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Storefront Services                            │
//! │                                                                         │
//! │   Catalog    CartSynchronizer    Checkout    Orders   Profile   Admin   │
//! │      │              │               │           │        │        │     │
//! │      │              └───────────────┴─────┬─────┴────────┴────────┘     │
//! │      │                                    ▼                             │
//! │      │                           ┌─────────────────┐    ┌───────────┐   │
//! │      │                           │  SessionHolder  │───►│ Navigator │   │
//! │      │                           │  token + user   │    └───────────┘   │
//! │      │                           └───┬─────────┬───┘                    │
//! │      │                               │         ▼                        │
//! │      │                               │   ┌──────────────┐               │
//! │      │                               │   │ SessionStore │ session.json  │
//! │      ▼                               ▼   └──────────────┘               │
//! │   ┌─────────────────────────────────────┐                               │
//! │   │     StorefrontApi (HttpApi)         │──► REST backend               │
//! │   └─────────────────────────────────────┘                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`api`] - The backend contract as a trait, plus request/response types
//! - [`http`] - `reqwest` implementation of the contract
//! - [`config`] - `client.toml` loading with env overrides
//! - [`store`] - Persisted session storage
//! - [`session`] - Session holder and the login-required rule
//! - [`navigator`] - Where the presentation layer should send the user
//! - [`cart_sync`] - Optimistic cart mirror
//! - [`checkout`], [`catalog`], [`orders`], [`profile`], [`admin`] - Page services

// =============================================================================
// Module Declarations
// =============================================================================

pub mod admin;
pub mod api;
pub mod cart_sync;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod http;
pub mod navigator;
pub mod orders;
pub mod profile;
pub mod session;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use admin::{Admin, AdminOrderBook};
pub use api::{Credentials, ProfileUpdate, SignupRequest, StorefrontApi};
pub use cart_sync::CartSynchronizer;
pub use catalog::Catalog;
pub use checkout::{Checkout, CheckoutOutcome};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpApi;
pub use navigator::{Destination, Navigator, NoOpNavigator, RecordingNavigator};
pub use orders::{OrderBook, Orders};
pub use profile::Profile;
pub use session::{SessionHolder, SignupOutcome};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore};

use std::sync::Arc;

use tracing::info;

// =============================================================================
// Storefront
// =============================================================================

/// Every service wired to one session.
#[derive(Debug, Clone)]
pub struct Storefront {
    pub session: Arc<SessionHolder>,
    pub catalog: Arc<Catalog>,
    pub cart: Arc<CartSynchronizer>,
    pub checkout: Arc<Checkout>,
    pub orders: Arc<Orders>,
    pub profile: Arc<Profile>,
    pub admin: Arc<Admin>,
}

impl Storefront {
    /// Wires the services around an API and a session store.
    pub fn new(
        config: &ClientConfig,
        api: Arc<dyn StorefrontApi>,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let session = Arc::new(SessionHolder::new(
            Arc::clone(&api),
            store,
            navigator,
            config.session.clone(),
        ));
        let cart = Arc::new(CartSynchronizer::new(
            Arc::clone(&session),
            config.delivery_policy(),
        ));

        Storefront {
            catalog: Arc::new(Catalog::new(api)),
            checkout: Arc::new(Checkout::new(Arc::clone(&session), Arc::clone(&cart))),
            orders: Arc::new(Orders::new(Arc::clone(&session))),
            profile: Arc::new(Profile::new(Arc::clone(&session))),
            admin: Arc::new(Admin::new(Arc::clone(&session))),
            cart,
            session,
        }
    }

    /// Connects to the configured backend with the session file on disk.
    pub fn connect(config: &ClientConfig, navigator: Arc<dyn Navigator>) -> ClientResult<Self> {
        config.validate()?;
        let api = Arc::new(HttpApi::new(config)?);
        let store = Arc::new(FileSessionStore::new(config.session_path()?));

        info!(base_url = %config.api.base_url, "Storefront client ready");
        Ok(Self::new(config, api, store, navigator))
    }
}
