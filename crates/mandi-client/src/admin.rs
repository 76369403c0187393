//! # Admin
//!
//! Order management and product ingestion for admin accounts.
//!
//! ```text
//! ┌───────────────────────┬────────────────────────────────────────────────┐
//! │ Operation             │ Client-side guard                              │
//! ├───────────────────────┼────────────────────────────────────────────────┤
//! │ all_orders()          │ signed in                                      │
//! │ authorise_delivery()  │ admin role, order is Processing                │
//! │ ingest_products()     │ admin role, .xlsx/.xls file that can be read   │
//! └───────────────────────┴────────────────────────────────────────────────┘
//! ```
//!
//! The backend enforces the role too; its 403 maps to
//! [`ClientError::Forbidden`] and sends the user to log in.

use std::path::Path;
use std::sync::Arc;

use mandi_core::validation::validate_spreadsheet_name;
use mandi_core::{IngestReport, Order, OrderStatus, PaymentDetails};
use tracing::{debug, info, instrument};

use crate::api::{DeliveryReceipt, SpreadsheetUpload};
use crate::error::{ClientError, ClientResult, PERMISSION_DENIED_MESSAGE};
use crate::orders::sort_newest_first;
use crate::session::SessionHolder;

/// Every order in the store, grouped for the admin order page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminOrderBook {
    pub pending: Vec<Order>,
    pub delivered: Vec<Order>,
    pub failed: Vec<Order>,
}

impl AdminOrderBook {
    /// Groups by status, newest first. Unknown statuses are left out.
    pub fn from_orders(mut orders: Vec<Order>) -> Self {
        sort_newest_first(&mut orders);

        let mut book = AdminOrderBook::default();
        for order in orders {
            match order.status {
                OrderStatus::Processing => book.pending.push(order),
                OrderStatus::Delivered => book.delivered.push(order),
                OrderStatus::Failed => book.failed.push(order),
                OrderStatus::Unknown(code) => {
                    debug!(order_id = order.id, code, "Skipping order with unknown status")
                }
            }
        }
        book
    }
}

pub struct Admin {
    session: Arc<SessionHolder>,
}

impl Admin {
    pub fn new(session: Arc<SessionHolder>) -> Self {
        Admin { session }
    }

    pub async fn all_orders(&self) -> ClientResult<AdminOrderBook> {
        let orders = self
            .session
            .with_token(|api, token| async move { api.all_orders(&token).await })
            .await?;

        let book = AdminOrderBook::from_orders(orders);
        debug!(
            pending = book.pending.len(),
            delivered = book.delivered.len(),
            failed = book.failed.len(),
            "Admin orders loaded"
        );
        Ok(book)
    }

    /// Marks a processing order delivered.
    ///
    /// ## Errors
    /// - `Forbidden` when the signed-in user is not an admin
    /// - `Core(InvalidStatusTransition)` when the order is not processing
    #[instrument(skip(self, order, payment_details), fields(order_id = order.id))]
    pub async fn authorise_delivery(
        &self,
        order: &Order,
        payment_details: PaymentDetails,
    ) -> ClientResult<DeliveryReceipt> {
        self.require_admin().await?;
        order.ensure_transition(OrderStatus::Delivered)?;

        let order_id = order.id;
        let receipt = self
            .session
            .with_token(|api, token| async move {
                api.authorise_delivery(&token, order_id, &payment_details)
                    .await
            })
            .await?;

        info!(order_id, message = %receipt.message, "Delivery authorised");
        Ok(receipt)
    }

    /// Uploads a product spreadsheet.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub async fn ingest_products(&self, path: impl AsRef<Path>) -> ClientResult<IngestReport> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        validate_spreadsheet_name(&file_name)?;
        self.require_admin().await?;

        let bytes = tokio::fs::read(path).await?;
        let upload = SpreadsheetUpload { file_name, bytes };

        let report = self
            .session
            .with_token(|api, token| async move { api.ingest_products(&token, upload).await })
            .await?;

        info!(
            added = report.products_added,
            updated = report.products_updated,
            total = report.total_processed,
            "Products ingested"
        );
        Ok(report)
    }

    /// Non-admins are refused before any request goes out.
    async fn require_admin(&self) -> ClientResult<()> {
        let token = self.session.require_token().await.map(|_| ());
        self.session.observe(token).await?;

        if self.session.is_admin().await {
            Ok(())
        } else {
            self.session
                .observe(Err(ClientError::Forbidden(
                    PERMISSION_DENIED_MESSAGE.to_string(),
                )))
                .await
        }
    }
}

impl std::fmt::Debug for Admin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Admin").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: i64, code: i64) -> Order {
        serde_json::from_value(serde_json::json!({
            "order_id": id,
            "total_order_price": 100,
            "order_status": code,
        }))
        .unwrap()
    }

    #[test]
    fn test_admin_order_book_groups() {
        let book = AdminOrderBook::from_orders(vec![
            order(1, 2),
            order(2, 5),
            order(3, 1),
            order(4, 0),
            order(5, 2),
            order(6, 42),
        ]);

        assert_eq!(
            book.pending.iter().map(|o| o.id).collect::<Vec<_>>(),
            vec![5, 1]
        );
        assert_eq!(book.delivered.len(), 2);
        assert_eq!(book.failed.len(), 1);
    }
}
