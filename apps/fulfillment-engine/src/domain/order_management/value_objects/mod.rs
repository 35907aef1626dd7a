//! Value Objects for Order Management

mod address;
mod customer;
mod fulfillment_event;
mod line_item;
mod order_status;
mod order_totals;
mod payment_status;
mod reasons;
mod settlement;
mod shipping_method;

pub use address::ShippingAddress;
pub use customer::CustomerSnapshot;
pub use fulfillment_event::{FulfillmentEvent, FulfillmentEventKind};
pub use line_item::LineItem;
pub use order_status::OrderStatus;
pub use order_totals::{OrderTotals, PricingSnapshot};
pub use payment_status::PaymentStatus;
pub use reasons::CancelReason;
pub use settlement::{PaymentConfirmation, RefundReceipt, RefundRecord, RefundRequest, Settlement};
pub use shipping_method::ShippingMethod;
