//! # Checkout Rules
//!
//! Delivery pricing, checkout form details and the order draft submitted
//! to `POST /order`.
//!
//! ## Pricing
//! ```text
//! subtotal = Σ unit_price × quantity
//! fee      = 0                if subtotal > free_above
//!            flat fee         otherwise
//! total    = subtotal + fee
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::{Cart, CartTotals};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{OrderLine, PaymentDetails, PaymentMethod, UserId};
use crate::validation::{validate_email, validate_phone, validate_required};
use crate::{DEFAULT_DELIVERY_FEE_RUPEES, DEFAULT_FREE_DELIVERY_THRESHOLD_RUPEES};

// =============================================================================
// Delivery Policy
// =============================================================================

/// Flat delivery fee, waived above a subtotal threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DeliveryPolicy {
    pub fee: Money,
    /// Subtotals strictly above this ship free.
    pub free_above: Money,
}

impl DeliveryPolicy {
    pub fn new(fee: Money, free_above: Money) -> Self {
        DeliveryPolicy { fee, free_above }
    }

    /// Fee charged for a given subtotal. An empty subtotal still shows the
    /// fee; checkout refuses empty carts.
    pub fn fee_for(&self, subtotal: Money) -> Money {
        if subtotal > self.free_above {
            Money::zero()
        } else {
            self.fee
        }
    }
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        DeliveryPolicy {
            fee: Money::from_rupees(DEFAULT_DELIVERY_FEE_RUPEES),
            free_above: Money::from_rupees(DEFAULT_FREE_DELIVERY_THRESHOLD_RUPEES),
        }
    }
}

// =============================================================================
// Checkout Details
// =============================================================================

/// What the shopper fills in at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckoutDetails {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub payment_method: PaymentMethod,
}

impl CheckoutDetails {
    /// Checks that every field is filled in, returning a trimmed copy.
    pub fn validate(&self) -> CoreResult<CheckoutDetails> {
        Ok(CheckoutDetails {
            full_name: validate_required("full name", &self.full_name)?,
            email: validate_email(&self.email)?,
            phone: validate_phone(&self.phone)?,
            address: validate_required("address", &self.address)?,
            city: validate_required("city", &self.city)?,
            state: validate_required("state", &self.state)?,
            zip_code: validate_required("zip code", &self.zip_code)?,
            payment_method: self.payment_method,
        })
    }

    /// Single-line address stored on the order.
    pub fn delivery_address(&self) -> String {
        format!(
            "{}, {}, {}, {} {} (Phone: {})",
            self.full_name, self.address, self.city, self.state, self.zip_code, self.phone
        )
    }
}

// =============================================================================
// Order Draft
// =============================================================================

/// The body of `POST /order`.
///
/// Line prices and the total are whole rupees, as the backend stores them.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct OrderDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,

    pub products: Vec<OrderLine>,

    pub subtotal: i64,

    pub delivery_fee: i64,

    pub total_order_price: i64,

    pub delivery_address: String,

    #[ts(type = "unknown")]
    pub payment_details: PaymentDetails,
}

impl OrderDraft {
    /// Builds the order for the current cart.
    ///
    /// ## Errors
    /// - `EmptyCart` when there is nothing to order
    /// - `Validation` when a checkout field is missing
    pub fn from_cart(
        cart: &Cart,
        details: &CheckoutDetails,
        policy: &DeliveryPolicy,
        user_id: Option<UserId>,
    ) -> CoreResult<OrderDraft> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let details = details.validate()?;
        let totals: CartTotals = cart.totals(policy);

        let products = cart
            .items()
            .iter()
            .map(|item| OrderLine {
                product_id: item.product_id,
                product_name: Some(item.name.clone()),
                quantity: item.quantity,
                price: item.unit_price.rupees(),
            })
            .collect();

        Ok(OrderDraft {
            user_id,
            products,
            subtotal: totals.subtotal.rupees(),
            delivery_fee: totals.delivery_fee.rupees(),
            total_order_price: totals.total.rupees(),
            delivery_address: details.delivery_address(),
            payment_details: PaymentDetails::for_method(details.payment_method),
        })
    }

    pub fn total(&self) -> Money {
        Money::from_rupees(self.total_order_price)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
