//! Command implementations and terminal output.

pub mod account;
pub mod admin;
pub mod auth;
pub mod config;
pub mod shop;

use mandi_client::{Destination, Navigator};
use mandi_core::{Order, Product};

/// Turns navigation requests into hints on stderr.
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, destination: Destination) {
        match destination {
            Destination::Login => eprintln!("Please sign in with `mandi login`."),
            Destination::Orders => eprintln!("Track it with `mandi orders`."),
        }
    }
}

// =============================================================================
// Output
// =============================================================================

pub fn print_products(products: &[Product]) {
    if products.is_empty() {
        println!("No products found.");
        return;
    }

    for p in products {
        let stock = if p.stock_quantity > 0 {
            format!("{} in stock", p.stock_quantity)
        } else {
            "out of stock".to_string()
        };
        println!(
            "{:>5}  {:<30} {:>10}/{}  {:<14} {}",
            p.id,
            p.name,
            p.price().to_string(),
            p.unit(),
            p.category,
            stock
        );
    }
}

pub fn print_order(order: &Order) {
    let placed = order
        .created_at
        .map(|t| t.format("%d %b %Y").to_string())
        .unwrap_or_else(|| "-".to_string());

    println!(
        "Order #{}  {}  {}  {}  paid by {}",
        order.id,
        placed,
        order.status,
        order.total(),
        order.payment_method_label()
    );
    for line in &order.products {
        println!(
            "    {} x {} @ {} = {}",
            line.quantity,
            line.display_name(),
            line.unit_price(),
            line.line_total()
        );
    }
    if !order.delivery_address.is_empty() {
        println!("    deliver to: {}", order.delivery_address);
    }
}

pub fn print_orders(title: &str, orders: &[Order]) {
    println!("{} ({})", title, orders.len());
    for order in orders {
        print_order(order);
    }
}
