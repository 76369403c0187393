//! Catalog, cart, checkout and order pages.

use clap::Args;
use mandi_client::{ClientError, ClientResult, Storefront};
use mandi_core::{CheckoutDetails, PaymentMethod};

use super::{print_order, print_orders, print_products};

pub async fn products(app: &Storefront, skip: i64, limit: i64) -> ClientResult<()> {
    print_products(&app.catalog.list(skip, limit).await?);
    Ok(())
}

pub async fn category(app: &Storefront, name: &str) -> ClientResult<()> {
    print_products(&app.catalog.by_category(name).await?);
    Ok(())
}

pub async fn search(app: &Storefront, query: &str) -> ClientResult<()> {
    print_products(&app.catalog.search(query).await?);
    Ok(())
}

// =============================================================================
// Cart
// =============================================================================

pub async fn add(app: &Storefront, product_id: i64, quantity: i64) -> ClientResult<()> {
    let product = app.catalog.get(product_id).await?;
    if !product.has_stock_for(quantity) {
        eprintln!(
            "Only {} of {} in stock; the order may be rejected.",
            product.stock_quantity, product.name
        );
    }
    app.cart.add(&product, quantity).await
}

pub fn print_cart(app: &Storefront) {
    let items = app.cart.items();
    if items.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for item in &items {
        println!(
            "{:>5}  {:<30} {:>4} {} x {} = {}",
            item.product_id,
            item.name,
            item.quantity,
            item.unit,
            item.unit_price,
            item.line_total()
        );
    }

    let totals = app.cart.totals();
    println!("Subtotal:  {}", totals.subtotal);
    if totals.delivery_fee.is_zero() {
        println!("Delivery:  free");
    } else {
        println!("Delivery:  {}", totals.delivery_fee);
    }
    println!("Total:     {}", totals.total);
}

// =============================================================================
// Checkout
// =============================================================================

/// Delivery and payment details. Name, email and phone default to the
/// profile.
#[derive(Args)]
pub struct CheckoutArgs {
    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    email: Option<String>,

    #[arg(long)]
    phone: Option<String>,

    /// Street address (defaults to the profile location)
    #[arg(long)]
    address: Option<String>,

    #[arg(long)]
    city: String,

    #[arg(long)]
    state: String,

    #[arg(long)]
    zip: String,

    /// cash, upi or card
    #[arg(long, default_value = "cash")]
    payment: PaymentMethod,
}

pub async fn checkout(app: &Storefront, args: CheckoutArgs) -> ClientResult<()> {
    let user = app
        .session
        .current_user()
        .await
        .ok_or(ClientError::NotAuthenticated)?;
    app.cart.fetch().await?;

    let details = CheckoutDetails {
        full_name: args.name.unwrap_or(user.name),
        email: args.email.unwrap_or(user.email),
        phone: args.phone.or(user.contact_number).unwrap_or_default(),
        address: args.address.or(user.location).unwrap_or_default(),
        city: args.city,
        state: args.state,
        zip_code: args.zip,
        payment_method: args.payment,
    };

    print_cart(app);
    let outcome = app.checkout.place_order(&details).await?;

    println!();
    println!("Order placed.");
    print_order(&outcome.order);
    Ok(())
}

pub async fn orders(app: &Storefront) -> ClientResult<()> {
    let book = app.orders.my_orders().await?;
    if book.is_empty() {
        println!("You have no orders yet.");
        return Ok(());
    }

    print_orders("Current orders", &book.current);
    println!();
    print_orders("Order history", &book.history);
    Ok(())
}
