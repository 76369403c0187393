//! # Cart Model
//!
//! The local mirror of the server-held cart.
//!
//! ## Cart Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Action                  Method                  Local Change           │
//! │  ──────                  ──────                  ────────────           │
//! │                                                                         │
//! │  Add to cart ───────────► upsert(item, n) ──────► insert or set qty    │
//! │                                                                         │
//! │  Change quantity ───────► set_quantity(id, n) ──► items[i].qty = n     │
//! │                            (n == 0) ────────────► items.remove(i)      │
//! │                                                                         │
//! │  Click remove ──────────► remove(id) ───────────► items.remove(i)      │
//! │                                                                         │
//! │  Server reply ──────────► replace(items) ───────► items = server copy  │
//! │                                                                         │
//! │  Push to server ────────► wire_lines() ─────────► [{product_id, qty}]  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Items are unique by `product_id`
//! - Every held line has quantity in `1..=MAX_ITEM_QUANTITY`
//! - At most `MAX_CART_ITEMS` distinct products

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::checkout::DeliveryPolicy;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{CartLine, Product, ProductId};
use crate::{DEFAULT_UNIT, MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Cart Item
// =============================================================================

/// A line in the cart with the product details needed to render it.
///
/// The name and price are a snapshot: the server cart only stores ids and
/// quantities, so the details come from the catalog when the line is added
/// or enriched after a fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub unit: String,
    pub category: Option<String>,
    pub image: Option<String>,
    pub quantity: i64,
}

impl CartItem {
    /// Creates a snapshot with no quantity yet. The cart assigns it.
    pub fn new(product_id: ProductId, name: impl Into<String>, unit_price: Money) -> Self {
        CartItem {
            product_id,
            name: name.into(),
            unit_price,
            unit: DEFAULT_UNIT.to_string(),
            category: None,
            image: None,
            quantity: 0,
        }
    }

    /// Snapshot of a catalog product.
    pub fn from_product(product: &Product) -> Self {
        CartItem {
            product_id: product.id,
            name: product.name.clone(),
            unit_price: product.price(),
            unit: product.unit().to_string(),
            category: Some(product.category.clone()).filter(|c| !c.is_empty()),
            image: product.primary_image().map(str::to_string),
            quantity: 0,
        }
    }

    /// Line for a product whose details could not be loaded.
    pub fn placeholder(product_id: ProductId) -> Self {
        CartItem::new(product_id, "Product", Money::zero())
    }

    /// Line from a server cart entry, using whatever details it carried.
    pub fn from_line(line: &CartLine) -> Self {
        let mut item = CartItem::placeholder(line.product_id);
        if let Some(name) = line.product_name.as_ref().filter(|n| !n.is_empty()) {
            item.name = name.clone();
        }
        if let Some(price) = line.price {
            item.unit_price = Money::from_rupees(price);
        }
        item.quantity = line.quantity;
        item
    }

    /// Whether the server entry lacked the details needed for display.
    pub fn needs_details(line: &CartLine) -> bool {
        line.product_name.is_none() || line.price.is_none()
    }

    /// Unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    /// Copies display details from the catalog, keeping the quantity.
    pub fn refresh_from(&mut self, product: &Product) {
        let quantity = self.quantity;
        *self = CartItem::from_product(product);
        self.quantity = quantity;
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The client-side cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Sets the quantity of `item`, inserting its snapshot when the product
    /// is not yet in the cart. A quantity of 0 removes the line.
    pub fn upsert(&mut self, item: CartItem, quantity: i64) -> CoreResult<()> {
        check_quantity(quantity)?;

        if quantity == 0 {
            self.items.retain(|i| i.product_id != item.product_id);
            return Ok(());
        }

        if let Some(existing) = self.find_mut(item.product_id) {
            existing.quantity = quantity;
            return Ok(());
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        self.items.push(CartItem { quantity, ..item });
        Ok(())
    }

    /// Updates the quantity of a product already in the cart.
    ///
    /// ## Behavior
    /// - 0 removes the line
    /// - Negative or above `MAX_ITEM_QUANTITY` is rejected untouched
    /// - Unknown product is an error
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: i64) -> CoreResult<()> {
        check_quantity(quantity)?;

        if quantity == 0 {
            return self.remove(product_id).map(|_| ());
        }

        match self.find_mut(product_id) {
            Some(item) => {
                item.quantity = quantity;
                Ok(())
            }
            None => Err(CoreError::ProductNotInCart(product_id)),
        }
    }

    /// Removes a product's line, returning it.
    pub fn remove(&mut self, product_id: ProductId) -> CoreResult<CartItem> {
        let index = self
            .items
            .iter()
            .position(|i| i.product_id == product_id)
            .ok_or(CoreError::ProductNotInCart(product_id))?;
        Ok(self.items.remove(index))
    }

    /// Replaces all lines with the server's view. Zero or negative lines
    /// are dropped; duplicate products keep the last entry.
    pub fn replace(&mut self, items: Vec<CartItem>) {
        self.items.clear();
        for item in items.into_iter().filter(|i| i.quantity > 0) {
            match self.find_mut(item.product_id) {
                Some(existing) => *existing = item,
                None => self.items.push(item),
            }
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn get(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    pub fn contains(&self, product_id: ProductId) -> bool {
        self.get(product_id).is_some()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// The full line-item set in the shape `POST /cart` expects.
    pub fn wire_lines(&self) -> Vec<CartLine> {
        self.items
            .iter()
            .map(|i| CartLine::new(i.product_id, i.quantity))
            .collect()
    }

    /// Number of distinct products.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of all quantities.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Σ unit price × quantity.
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Totals under the given delivery pricing.
    pub fn totals(&self, policy: &DeliveryPolicy) -> CartTotals {
        let subtotal = self.subtotal();
        let delivery_fee = policy.fee_for(subtotal);
        CartTotals {
            item_count: self.item_count(),
            total_quantity: self.total_quantity(),
            subtotal,
            delivery_fee,
            total: subtotal + delivery_fee,
        }
    }

    fn find_mut(&mut self, product_id: ProductId) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|i| i.product_id == product_id)
    }
}

fn check_quantity(quantity: i64) -> CoreResult<()> {
    if quantity < 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        }
        .into());
    }
    if quantity > MAX_ITEM_QUANTITY {
        return Err(CoreError::QuantityTooLarge {
            requested: quantity,
            max: MAX_ITEM_QUANTITY,
        });
    }
    Ok(())
}

/// Cart totals summary for display and order submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub total: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: ProductId, rupees: i64) -> CartItem {
        CartItem::new(id, format!("Product {}", id), Money::from_rupees(rupees))
    }

    #[test]
    fn test_upsert_inserts_then_sets() {
        let mut cart = Cart::new();
        cart.upsert(item(1, 40), 2).unwrap();
        cart.upsert(item(1, 40), 5).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_quantity(), 5);
        assert_eq!(cart.subtotal(), Money::from_rupees(200));
    }

    #[test]
    fn test_zero_quantity_removes_line() {
        let mut cart = Cart::new();
        cart.upsert(item(1, 40), 2).unwrap();
        cart.upsert(item(2, 70), 1).unwrap();

        cart.set_quantity(1, 0).unwrap();

        assert!(!cart.contains(1));
        assert_eq!(cart.subtotal(), Money::from_rupees(70));
    }

    #[test]
    fn test_subtotal_matches_sum_over_remaining_lines() {
        let mut cart = Cart::new();
        let changes = [(1, 40, 3), (2, 25, 4), (3, 120, 1), (2, 25, 0), (1, 40, 2)];

        for (id, price, qty) in changes {
            cart.upsert(item(id, price), qty).unwrap();
            let expected: i64 = cart
                .items()
                .iter()
                .map(|i| i.unit_price.paise() * i.quantity)
                .sum();
            assert_eq!(cart.subtotal().paise(), expected);
            assert!(cart.items().iter().all(|i| i.quantity >= 1));
        }

        assert_eq!(cart.subtotal(), Money::from_rupees(40 * 2 + 120));
    }

    #[test]
    fn test_negative_quantity_rejected_without_change() {
        let mut cart = Cart::new();
        cart.upsert(item(1, 40), 2).unwrap();

        let err = cart.set_quantity(1, -1).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(cart.get(1).unwrap().quantity, 2);
    }

    #[test]
    fn test_quantity_limit() {
        let mut cart = Cart::new();
        let err = cart.upsert(item(1, 40), MAX_ITEM_QUANTITY + 1).unwrap_err();
        assert!(matches!(err, CoreError::QuantityTooLarge { .. }));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_cart_size_limit() {
        let mut cart = Cart::new();
        for id in 0..MAX_CART_ITEMS as i64 {
            cart.upsert(item(id, 1), 1).unwrap();
        }

        let err = cart.upsert(item(10_000, 1), 1).unwrap_err();
        assert!(matches!(err, CoreError::CartTooLarge { .. }));

        // Existing lines can still change.
        cart.upsert(item(0, 1), 3).unwrap();
    }

    #[test]
    fn test_set_quantity_unknown_product() {
        let mut cart = Cart::new();
        let err = cart.set_quantity(9, 1).unwrap_err();
        assert!(matches!(err, CoreError::ProductNotInCart(9)));
    }

    #[test]
    fn test_replace_drops_zero_lines_and_duplicates() {
        let mut cart = Cart::new();
        let mut a = item(1, 40);
        a.quantity = 2;
        let mut b = item(2, 10);
        b.quantity = 0;
        let mut c = item(1, 40);
        c.quantity = 4;

        cart.replace(vec![a, b, c]);

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.get(1).unwrap().quantity, 4);
    }

    #[test]
    fn test_from_line_defaults() {
        let line = CartLine::new(5, 3);
        let item = CartItem::from_line(&line);

        assert_eq!(item.name, "Product");
        assert_eq!(item.unit_price, Money::zero());
        assert_eq!(item.unit, "kg");
        assert_eq!(item.quantity, 3);
        assert!(CartItem::needs_details(&line));
    }

    #[test]
    fn test_wire_lines() {
        let mut cart = Cart::new();
        cart.upsert(item(1, 40), 2).unwrap();
        cart.upsert(item(7, 10), 1).unwrap();

        assert_eq!(cart.wire_lines(), vec![CartLine::new(1, 2), CartLine::new(7, 1)]);
    }

    #[test]
    fn test_totals_with_delivery_fee() {
        let mut cart = Cart::new();
        cart.upsert(CartItem::new(1, "Tomatoes", Money::from_rupees(40)), 2)
            .unwrap();

        let totals = cart.totals(&DeliveryPolicy::default());
        assert_eq!(totals.subtotal, Money::from_rupees(80));
        assert_eq!(totals.delivery_fee, Money::from_rupees(50));
        assert_eq!(totals.total, Money::from_rupees(130));
    }

    #[test]
    fn test_empty_cart_totals_show_delivery_fee() {
        let totals = Cart::new().totals(&DeliveryPolicy::default());
        assert_eq!(totals.item_count, 0);
        assert_eq!(totals.subtotal, Money::zero());
        assert_eq!(totals.delivery_fee, Money::from_rupees(50));
        assert_eq!(totals.total, Money::from_rupees(50));
    }
}
