//! # Orders
//!
//! The signed-in customer's orders, split the way the order page shows
//! them: what is still on its way, and everything that has finished.

use std::sync::Arc;

use mandi_core::{Order, OrderStatus};
use tracing::debug;

use crate::error::ClientResult;
use crate::session::SessionHolder;

/// A customer's orders, newest first in each list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderBook {
    /// Processing orders.
    pub current: Vec<Order>,
    /// Delivered and failed orders.
    pub history: Vec<Order>,
}

impl OrderBook {
    /// Splits orders by status.
    ///
    /// Orders with a status code the client does not know go to history.
    pub fn from_orders(mut orders: Vec<Order>) -> Self {
        sort_newest_first(&mut orders);
        let (current, history) = orders.into_iter().partition(|o| o.status.is_open());
        OrderBook { current, history }
    }

    pub fn len(&self) -> usize {
        self.current.len() + self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Newest first; orders without a timestamp fall back to id order.
pub(crate) fn sort_newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

pub struct Orders {
    session: Arc<SessionHolder>,
}

impl Orders {
    pub fn new(session: Arc<SessionHolder>) -> Self {
        Orders { session }
    }

    pub async fn my_orders(&self) -> ClientResult<OrderBook> {
        let orders = self
            .session
            .with_token(|api, token| async move { api.my_orders(&token).await })
            .await?;

        let book = OrderBook::from_orders(orders);
        debug!(
            current = book.current.len(),
            history = book.history.len(),
            "Orders loaded"
        );
        Ok(book)
    }

    /// Payment method text for an order row.
    pub fn payment_method(order: &Order) -> String {
        order.payment_method_label()
    }

    /// Status text for an order row.
    pub fn status_label(status: OrderStatus) -> &'static str {
        status.label()
    }
}

impl std::fmt::Debug for Orders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orders").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mandi_core::PaymentDetails;

    fn order(id: i64, status: OrderStatus, day: u32) -> Order {
        Order {
            id,
            user_id: Some(7),
            products: Vec::new(),
            total_rupees: 130,
            status,
            delivery_address: "Pune".to_string(),
            payment_details: PaymentDetails::default(),
            created_at: Utc.with_ymd_and_hms(2024, 3, day, 10, 0, 0).single(),
            updated_at: None,
        }
    }

    #[test]
    fn test_order_book_split() {
        let book = OrderBook::from_orders(vec![
            order(1, OrderStatus::Delivered, 1),
            order(2, OrderStatus::Processing, 2),
            order(3, OrderStatus::Failed, 3),
            order(4, OrderStatus::Processing, 4),
            order(5, OrderStatus::Unknown(9), 5),
        ]);

        let ids = |orders: &[Order]| orders.iter().map(|o| o.id).collect::<Vec<_>>();
        assert_eq!(ids(&book.current), vec![4, 2]);
        assert_eq!(ids(&book.history), vec![5, 3, 1]);
        assert_eq!(book.len(), 5);
    }

    #[test]
    fn test_payment_method_text() {
        let mut o = order(1, OrderStatus::Processing, 1);
        assert_eq!(Orders::payment_method(&o), "Pending");

        o.payment_details = PaymentDetails(serde_json::json!({ "payment_method": "upi" }));
        assert_eq!(Orders::payment_method(&o), "upi");

        o.payment_details = PaymentDetails(serde_json::json!({ "txn": "abc" }));
        assert_eq!(Orders::payment_method(&o), "Online");
    }
}
