//! Admin order and product management.

use std::path::Path;

use mandi_client::{ClientError, ClientResult, Storefront};
use mandi_core::PaymentDetails;

use super::print_orders;

pub async fn orders(app: &Storefront) -> ClientResult<()> {
    let book = app.admin.all_orders().await?;

    print_orders("Pending", &book.pending);
    println!();
    print_orders("Delivered", &book.delivered);
    if !book.failed.is_empty() {
        println!();
        print_orders("Failed", &book.failed);
    }
    Ok(())
}

pub async fn deliver(app: &Storefront, order_id: i64, payment: Option<String>) -> ClientResult<()> {
    let book = app.admin.all_orders().await?;
    let order = book
        .pending
        .iter()
        .chain(&book.delivered)
        .chain(&book.failed)
        .find(|o| o.id == order_id)
        .ok_or_else(|| ClientError::NotFound(format!("Order {} not found", order_id)))?;

    let payment_details = payment
        .as_deref()
        .map(PaymentDetails::from_note)
        .unwrap_or_else(|| order.payment_details.clone());

    let receipt = app.admin.authorise_delivery(order, payment_details).await?;
    if receipt.message.is_empty() {
        println!("Order {} marked as delivered.", order_id);
    } else {
        println!("{}", receipt.message);
    }
    Ok(())
}

pub async fn ingest(app: &Storefront, file: &Path) -> ClientResult<()> {
    let report = app.admin.ingest_products(file).await?;

    if let Some(message) = &report.message {
        println!("{}", message);
    }
    println!(
        "Added {}, updated {}, processed {}.",
        report.products_added, report.products_updated, report.total_processed
    );
    if !report.success {
        return Err(ClientError::Api {
            status: 200,
            detail: report
                .message
                .unwrap_or_else(|| "Product upload failed.".to_string()),
        });
    }
    Ok(())
}
