//! Order module - the storefront order as the payment flow sees it.

mod aggregate;
mod status;

pub use aggregate::{LineItem, Order, GUEST_CUSTOMER_ID};
pub use status::OrderStatus;
