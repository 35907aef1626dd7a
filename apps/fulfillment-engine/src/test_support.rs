//! Shared fixtures for unit tests.

use crate::domain::order_management::{
    CreateOrderCommand, CustomerSnapshot, LineItem, Order, ShippingAddress, ShippingMethod,
};
use crate::domain::policy::BusinessPolicy;
use crate::domain::shared::{Money, OrderNumber, Quantity, Timestamp};

pub fn t0() -> Timestamp {
    Timestamp::parse("2026-03-01T10:00:00Z").unwrap()
}

pub fn address() -> ShippingAddress {
    ShippingAddress {
        recipient: "Ada Lovelace".to_string(),
        line1: "12 Garden Row".to_string(),
        line2: None,
        city: "Portland".to_string(),
        region: Some("OR".to_string()),
        postal_code: "97201".to_string(),
        country: "US".to_string(),
    }
}

/// Chamomile x2 at 24.99 and ashwagandha x1 at 34.99, standard shipping.
pub fn create_command() -> CreateOrderCommand {
    CreateOrderCommand {
        customer: CustomerSnapshot::new("Ada Lovelace", "ada@example.com"),
        items: vec![
            LineItem::new(
                "chamomile",
                "Chamomile Tea",
                Money::from_minor(2499),
                Quantity::new(2).unwrap(),
            ),
            LineItem::new(
                "ashwagandha",
                "Ashwagandha Root",
                Money::from_minor(3499),
                Quantity::ONE,
            ),
        ],
        shipping_address: Some(address()),
        shipping_method: ShippingMethod::Standard,
        notes: None,
    }
}

pub fn pending_order(number: &str, created_at: Timestamp) -> Order {
    Order::create(
        create_command(),
        OrderNumber::new(number),
        &BusinessPolicy::default(),
        created_at,
    )
    .unwrap()
}
