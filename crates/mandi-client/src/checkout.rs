//! # Checkout
//!
//! Turns the synchronized cart into an order.
//!
//! ```text
//! cart.cart() ──► OrderDraft::from_cart ──► EmptyCart / Validation (no request)
//!                        │
//!                        ▼
//!              POST /cart  [local lines]     server copy matches what was shown
//!                        │
//!                        ▼
//!              POST /order [draft]  ──────── failure: error returned, cart kept
//!                        │
//!                        ▼
//!              cart.clear() ──► navigate(Orders)
//! ```

use std::sync::Arc;

use mandi_core::{Cart, CheckoutDetails, Order, OrderDraft};
use tracing::{info, instrument, warn};

use crate::cart_sync::CartSynchronizer;
use crate::error::ClientResult;
use crate::navigator::Destination;
use crate::session::SessionHolder;

/// What a successful checkout produced.
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub order: Order,
    /// The body that was submitted.
    pub draft: OrderDraft,
    pub destination: Destination,
}

pub struct Checkout {
    session: Arc<SessionHolder>,
    cart: Arc<CartSynchronizer>,
}

impl Checkout {
    pub fn new(session: Arc<SessionHolder>, cart: Arc<CartSynchronizer>) -> Self {
        Checkout { session, cart }
    }

    /// Builds the order from the local cart without sending anything.
    pub async fn preview(&self, details: &CheckoutDetails) -> ClientResult<OrderDraft> {
        self.draft_for(&self.cart.cart(), details).await
    }

    async fn draft_for(&self, cart: &Cart, details: &CheckoutDetails) -> ClientResult<OrderDraft> {
        let user_id = self.session.current_user().await.map(|u| u.id);
        let draft = OrderDraft::from_cart(cart, details, self.cart.policy(), user_id)?;
        Ok(draft)
    }

    /// Submits the order and clears the cart.
    ///
    /// A failed submit leaves the cart as it was. A failure to clear the
    /// cart afterwards is logged; the order stands.
    #[instrument(skip(self, details))]
    pub async fn place_order(&self, details: &CheckoutDetails) -> ClientResult<CheckoutOutcome> {
        // One snapshot, so the pushed lines and the draft agree.
        let snapshot = self.cart.cart();
        let draft = self.draft_for(&snapshot, details).await?;
        let lines = snapshot.wire_lines();

        let submitted = draft.clone();
        let order = self
            .session
            .with_token(|api, token| async move {
                api.replace_cart(&token, &lines).await?;
                api.place_order(&token, &submitted).await
            })
            .await?;

        info!(
            order_id = order.id,
            total = %order.total(),
            lines = draft.products.len(),
            "Order placed"
        );

        if let Err(e) = self.cart.clear().await {
            warn!(order_id = order.id, error = %e, "Order placed but cart not cleared");
            self.cart.reset();
        }

        self.session.navigator().navigate(Destination::Orders);

        Ok(CheckoutOutcome {
            order,
            draft,
            destination: Destination::Orders,
        })
    }
}

impl std::fmt::Debug for Checkout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Checkout")
            .field("cart", &self.cart)
            .finish_non_exhaustive()
    }
}
