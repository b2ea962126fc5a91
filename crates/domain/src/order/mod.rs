//! Order workflows and related types.

mod filter;
mod placement;
mod service;
mod transition;

pub use filter::OrderListQuery;
pub use service::OrderService;

use common::{CustomerId, MenuItemId, OrderId, OrderStatus, RestaurantId};
use serde::{Deserialize, Serialize};
use store::{LineItemDetail, OrderRecord, StoreError};
use thiserror::Error;

/// One cart entry submitted for order placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub menu_item_id: MenuItemId,
    pub quantity: u32,
}

/// An order header together with its display line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetail {
    pub order: OrderRecord,
    pub restaurant_name: String,
    pub items: Vec<LineItemDetail>,
}

/// Errors that can occur during order operations.
///
/// Validation variants carry a field tag (see [`OrderError::field_tag`]) and
/// always abort the enclosing transaction with full rollback; the remaining
/// variants classify permission, not-found and infrastructure failures.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The submitted cart has no lines.
    #[error("At least one item is required.")]
    EmptyCart,

    /// The customer profile has no phone number.
    #[error("Phone number is required for placing order. Please update it.")]
    PhoneRequired,

    /// The customer profile is missing address fields.
    #[error("Please update complete address first. Missing fields: {missing}.")]
    IncompleteAddress { missing: String },

    /// A cart line requested a zero quantity.
    #[error("Invalid quantity for item: {item_id}")]
    InvalidQuantity { item_id: MenuItemId },

    /// The referenced menu item does not exist or is not orderable.
    #[error("Invalid item id: {item_id}")]
    InvalidItem { item_id: MenuItemId },

    /// The cart mixes items from more than one restaurant.
    #[error("Select all items from same restaurant")]
    MixedRestaurants,

    /// Requested quantity exceeds the available stock.
    #[error("Not enough quantity available for item: {item_name}")]
    InsufficientQuantity { item_name: String },

    /// The order total exceeds the customer's balance.
    #[error("Not enough balance")]
    InsufficientBalance,

    /// The order is in a state that forbids the requested transition.
    #[error("Order cannot be updated. Current status is: {current}")]
    NotUpdatable { current: OrderStatus },

    /// Customers may only cancel their orders.
    #[error("User can only cancel order.")]
    CustomerOnlyCancel,

    /// The actor is neither the order's customer nor the restaurant owner.
    #[error("You do not have permission to perform this action.")]
    Forbidden,

    /// Order does not exist, or the actor may not learn that it does.
    #[error("Order not found: {order_id}")]
    OrderNotFound { order_id: OrderId },

    /// The acting customer does not exist.
    #[error("Customer not found: {customer_id}")]
    CustomerNotFound { customer_id: CustomerId },

    /// Restaurant does not exist or is inactive.
    #[error("Restaurant not found: {restaurant_id}")]
    RestaurantNotFound { restaurant_id: RestaurantId },

    /// A storage fault; the operation rolled back and may be retried.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl OrderError {
    /// Returns the logical field this validation error is tagged with, or
    /// `None` for permission/not-found/infrastructure errors.
    pub fn field_tag(&self) -> Option<&'static str> {
        match self {
            OrderError::EmptyCart => Some("items"),
            OrderError::PhoneRequired
            | OrderError::IncompleteAddress { .. }
            | OrderError::InsufficientBalance => Some("Profile"),
            OrderError::InvalidQuantity { .. }
            | OrderError::InvalidItem { .. }
            | OrderError::MixedRestaurants
            | OrderError::InsufficientQuantity { .. } => Some("Items"),
            OrderError::NotUpdatable { .. } | OrderError::CustomerOnlyCancel => Some("status"),
            OrderError::Forbidden
            | OrderError::OrderNotFound { .. }
            | OrderError::CustomerNotFound { .. }
            | OrderError::RestaurantNotFound { .. }
            | OrderError::Store(_) => None,
        }
    }

    /// Returns true for user-correctable validation failures.
    pub fn is_validation(&self) -> bool {
        self.field_tag().is_some()
    }
}
