//! # mandi-core: Pure Business Logic for the Farmers Mandi Storefront
//!
//! This crate holds the storefront rules the client needs before it talks to
//! the backend: money arithmetic, the local cart model, delivery pricing,
//! order status transitions and input validation. It has zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Farmers Mandi Client Architecture                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/cli (presentation)                      │   │
//! │  │    products ──► cart ──► checkout ──► orders ──► admin         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    mandi-client (I/O)                           │   │
//! │  │    SessionHolder, CartSynchronizer, Checkout, HttpApi          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ mandi-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │   Cart    │  │   rules   │  │   │
//! │  │   │  Order    │  │ Delivery  │  │ CartItem  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Wire-level domain types (Product, Order, User, ...)
//! - [`money`] - Money type with integer arithmetic (paise, no floats)
//! - [`cart`] - Local cart mirror and its totals
//! - [`checkout`] - Delivery pricing and order drafts
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use mandi_core::cart::{Cart, CartItem};
//! use mandi_core::checkout::DeliveryPolicy;
//! use mandi_core::money::Money;
//!
//! let mut cart = Cart::new();
//! cart.upsert(CartItem::new(1, "Tomatoes", Money::from_rupees(40)), 2).unwrap();
//!
//! let totals = cart.totals(&DeliveryPolicy::default());
//! assert_eq!(totals.subtotal, Money::from_rupees(80));
//! assert_eq!(totals.delivery_fee, Money::from_rupees(50));
//! assert_eq!(totals.total, Money::from_rupees(130));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartItem, CartTotals};
pub use checkout::{CheckoutDetails, DeliveryPolicy, OrderDraft};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct products allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single product in the cart.
///
/// Guards against typing 1000 instead of 10.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Flat delivery fee in rupees for orders at or below the free threshold.
pub const DEFAULT_DELIVERY_FEE_RUPEES: i64 = 50;

/// Orders with a subtotal strictly above this many rupees ship free.
pub const DEFAULT_FREE_DELIVERY_THRESHOLD_RUPEES: i64 = 500;

/// Unit shown for produce when the backend does not say otherwise.
pub const DEFAULT_UNIT: &str = "kg";
