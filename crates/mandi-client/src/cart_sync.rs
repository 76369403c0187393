//! # Cart Synchronizer
//!
//! Mirrors the server-held cart into a local view the presentation layer
//! reads from.
//!
//! ## Local cache, server authoritative, revert on error
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Synchronizer Operations                         │
//! │                                                                         │
//! │  Action           Local View (immediate)      Backend                   │
//! │  ──────           ──────────────────────      ───────                   │
//! │                                                                         │
//! │  fetch() ───────► (unchanged) ──────────────► GET /cart                 │
//! │                   items = server lines ◄────── (404 → empty)            │
//! │                                                                         │
//! │  set_quantity() ► items[i].qty = n ─────────► POST /cart [all lines]    │
//! │  add()          ► insert snapshot ──────────► POST /cart [all lines]    │
//! │  remove()       ► items.remove(i) ──────────► POST /cart/remove_item    │
//! │  clear()        ► items.clear() ────────────► POST /cart/clear          │
//! │                                                                         │
//! │  On failure: last_error = message, then fetch() to drop the change.     │
//! │  On success: the local view is kept as is.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! The view sits behind a `std::sync::Mutex` that is only held inside
//! short closures, never across a request. Overlapping mutations are not
//! sequenced: each sends the line set as it was when it ran, and the
//! backend keeps whichever arrives last.

use std::sync::{Arc, Mutex, PoisonError};

use mandi_core::validation::validate_quantity;
use mandi_core::{
    Cart, CartItem, CartLine, CartTotals, CoreError, DeliveryPolicy, Product, ProductId,
    ServerCart,
};
use tracing::{debug, info, warn};

use crate::error::ClientResult;
use crate::session::SessionHolder;

pub const LOAD_FAILED: &str = "Failed to load your cart. Please try again.";
pub const ADD_FAILED: &str = "Failed to add item to your cart. Please try again.";
pub const UPDATE_FAILED: &str = "Failed to update your cart. Please try again.";
pub const REMOVE_FAILED: &str = "Failed to remove item from your cart. Please try again.";
pub const CLEAR_FAILED: &str = "Failed to clear your cart. Please try again.";

#[derive(Debug, Default)]
struct CartView {
    cart: Cart,
    in_flight: usize,
    last_error: Option<String>,
}

/// Keeps `in_flight` accurate however the operation ends.
struct Busy<'a>(&'a CartSynchronizer);

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        self.0
            .with_view_mut(|v| v.in_flight = v.in_flight.saturating_sub(1));
    }
}

/// The client-side cart service.
pub struct CartSynchronizer {
    session: Arc<SessionHolder>,
    policy: DeliveryPolicy,
    view: Mutex<CartView>,
}

impl CartSynchronizer {
    pub fn new(session: Arc<SessionHolder>, policy: DeliveryPolicy) -> Self {
        CartSynchronizer {
            session,
            policy,
            view: Mutex::new(CartView::default()),
        }
    }

    // =========================================================================
    // Read Accessors
    // =========================================================================

    pub fn items(&self) -> Vec<CartItem> {
        self.with_view(|v| v.cart.items().to_vec())
    }

    /// Snapshot of the local cart.
    pub fn cart(&self) -> Cart {
        self.with_view(|v| v.cart.clone())
    }

    pub fn totals(&self) -> CartTotals {
        self.with_view(|v| v.cart.totals(&self.policy))
    }

    pub fn is_loading(&self) -> bool {
        self.with_view(|v| v.in_flight > 0)
    }

    /// Message from the last failed operation, cleared when the next one
    /// starts.
    pub fn last_error(&self) -> Option<String> {
        self.with_view(|v| v.last_error.clone())
    }

    pub fn policy(&self) -> &DeliveryPolicy {
        &self.policy
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Replaces the local view with the server's cart.
    ///
    /// Without a session this is a no-op returning the current items. An
    /// expired session is signed out and the local view emptied.
    pub async fn fetch(&self) -> ClientResult<Vec<CartItem>> {
        if self.session.session().await.is_none() {
            debug!("No session, skipping cart fetch");
            return Ok(self.items());
        }

        let _busy = self.begin();
        match self.load_remote().await {
            Ok(items) => {
                let count = items.len();
                self.with_view_mut(|v| v.cart.replace(items));
                debug!(lines = count, "Cart fetched");
                Ok(self.items())
            }
            Err(e) => {
                if !self.session.is_authenticated().await {
                    self.with_view_mut(|v| v.cart.clear());
                }
                self.set_error(LOAD_FAILED);
                Err(e)
            }
        }
    }

    /// Sets a line's quantity; 0 removes it.
    ///
    /// The local view changes first, then the whole line set is sent.
    pub async fn set_quantity(&self, product_id: ProductId, quantity: i64) -> ClientResult<()> {
        self.ensure_session().await?;
        let _busy = self.begin();

        let lines = self.mutate(|cart| cart.set_quantity(product_id, quantity))?;
        debug!(product_id, quantity, "Cart quantity changed locally");

        let result = self.push_lines(lines).await;
        self.settle(result, UPDATE_FAILED).await
    }

    /// Puts `quantity` of a product in the cart, replacing any quantity
    /// already there.
    pub async fn add(&self, product: &Product, quantity: i64) -> ClientResult<()> {
        validate_quantity(quantity)?;
        self.ensure_session().await?;
        let _busy = self.begin();

        let lines = self.mutate(|cart| cart.upsert(CartItem::from_product(product), quantity))?;
        debug!(product_id = product.id, quantity, "Product added locally");

        let result = self.push_lines(lines).await;
        self.settle(result, ADD_FAILED).await
    }

    /// Drops a product from the cart.
    pub async fn remove(&self, product_id: ProductId) -> ClientResult<()> {
        self.ensure_session().await?;
        let _busy = self.begin();

        self.mutate(|cart| cart.remove(product_id).map(|_| ()))?;
        debug!(product_id, "Product removed locally");

        let result = self
            .session
            .with_token(|api, token| async move {
                match api.remove_cart_item(&token, product_id).await {
                    Err(e) if e.is_not_found() => Ok(()),
                    other => other.map(|_| ()),
                }
            })
            .await;
        self.settle(result, REMOVE_FAILED).await
    }

    /// Empties the cart locally and remotely.
    pub async fn clear(&self) -> ClientResult<()> {
        self.ensure_session().await?;
        let _busy = self.begin();

        self.mutate(|cart| {
            cart.clear();
            Ok(())
        })?;

        let result = self
            .session
            .with_token(|api, token| async move {
                match api.clear_cart(&token).await {
                    // No cart on the server is already empty.
                    Err(e) if e.is_not_found() => Ok(()),
                    other => other,
                }
            })
            .await;
        self.settle(result, CLEAR_FAILED).await?;

        info!("Cart cleared");
        Ok(())
    }

    /// Empties the local view without telling the backend.
    pub fn reset(&self) {
        self.with_view_mut(|v| {
            v.cart.clear();
            v.last_error = None;
        });
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn ensure_session(&self) -> ClientResult<()> {
        let token = self.session.require_token().await;
        self.session.observe(token).await.map(|_| ())
    }

    /// Applies a change to the local cart and returns the resulting lines.
    fn mutate<F>(&self, change: F) -> ClientResult<Vec<CartLine>>
    where
        F: FnOnce(&mut Cart) -> Result<(), CoreError>,
    {
        self.with_view_mut(|v| {
            v.last_error = None;
            change(&mut v.cart)?;
            Ok(v.cart.wire_lines())
        })
    }

    async fn push_lines(&self, lines: Vec<CartLine>) -> ClientResult<()> {
        self.session
            .with_token(|api, token| async move {
                api.replace_cart(&token, &lines).await.map(|_| ())
            })
            .await
    }

    /// Success keeps the optimistic view; failure records the message and
    /// re-fetches to discard it.
    async fn settle(&self, result: ClientResult<()>, message: &str) -> ClientResult<()> {
        let err = match result {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };

        warn!(error = %err, "Cart change rejected, reverting");
        self.set_error(message);
        self.revert().await;
        Err(err)
    }

    async fn revert(&self) {
        if !self.session.is_authenticated().await {
            // Signed out by the failure itself; nothing to show.
            self.with_view_mut(|v| v.cart.clear());
            return;
        }

        match self.load_remote().await {
            Ok(items) => self.with_view_mut(|v| v.cart.replace(items)),
            Err(e) => warn!(error = %e, "Cart re-fetch after failure also failed"),
        }
    }

    async fn load_remote(&self) -> ClientResult<Vec<CartItem>> {
        let server = self
            .session
            .with_token(|api, token| async move {
                match api.cart(&token).await {
                    // The backend has no cart until the first write.
                    Err(e) if e.is_not_found() => Ok(ServerCart::default()),
                    other => other,
                }
            })
            .await?;

        Ok(self.enrich(server.products).await)
    }

    /// Turns server lines into displayable items.
    ///
    /// Details come from the local snapshot when the product is already
    /// known, otherwise from the catalog. If both fail the placeholder
    /// name and a zero price are used.
    async fn enrich(&self, lines: Vec<CartLine>) -> Vec<CartItem> {
        let known = self.cart();
        let mut items = Vec::with_capacity(lines.len());

        for line in lines.iter().filter(|l| l.quantity > 0) {
            if let Some(existing) = known.get(line.product_id) {
                items.push(CartItem {
                    quantity: line.quantity,
                    ..existing.clone()
                });
                continue;
            }

            if !CartItem::needs_details(line) {
                items.push(CartItem::from_line(line));
                continue;
            }

            let mut item = CartItem::from_line(line);
            match self.session.api().product(line.product_id).await {
                Ok(product) => item.refresh_from(&product),
                Err(e) => {
                    warn!(product_id = line.product_id, error = %e, "Product details unavailable")
                }
            }
            items.push(item);
        }

        items
    }

    fn begin(&self) -> Busy<'_> {
        self.with_view_mut(|v| v.in_flight += 1);
        Busy(self)
    }

    fn set_error(&self, message: &str) {
        self.with_view_mut(|v| v.last_error = Some(message.to_string()));
    }

    fn with_view<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&CartView) -> R,
    {
        let view = self.view.lock().unwrap_or_else(PoisonError::into_inner);
        f(&view)
    }

    fn with_view_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut CartView) -> R,
    {
        let mut view = self.view.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut view)
    }
}

impl std::fmt::Debug for CartSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.with_view(|v| {
            f.debug_struct("CartSynchronizer")
                .field("items", &v.cart.item_count())
                .field("in_flight", &v.in_flight)
                .field("last_error", &v.last_error)
                .finish_non_exhaustive()
        })
    }
}
