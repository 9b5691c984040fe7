// ticketing_app/src/models/mod.rs

//! Order documents and their line items.

pub mod order;
pub mod order_item;

pub use order::{Order, OrderStatus, PayApproach};
pub use order_item::{NewOrderItem, OrderItem};
