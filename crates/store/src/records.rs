//! Row records persisted by the storage layer.

use chrono::{DateTime, Utc};
use common::{CustomerId, LineItemId, MenuItemId, Money, OrderId, OrderStatus, RestaurantId};
use serde::{Deserialize, Serialize};

/// A customer row.
///
/// Owned by the registration collaborator; the order workflows only mutate
/// `balance` (debit on placement, credit on cancellation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub id: CustomerId,
    pub username: String,
    pub email: String,
    /// Ten-digit contact number; required before the customer can order.
    pub phone_number: Option<String>,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    /// Spendable balance; never negative.
    pub balance: Money,
}

impl CustomerRecord {
    /// Formats the delivery address snapshot stored on new orders.
    pub fn formatted_address(&self) -> String {
        format!(
            "{}, {}, {}, {}",
            self.street_address, self.city, self.state, self.zipcode
        )
    }
}

/// A restaurant row. Owned by the restaurant-management collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestaurantRecord {
    pub id: RestaurantId,
    pub name: String,
    /// Soft-delete flag; inactive restaurants cannot take orders.
    pub is_active: bool,
    pub owner_id: CustomerId,
}

/// A menu item row.
///
/// `quantity` is the available stock, decremented during order placement
/// under an exclusive row lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItemRecord {
    pub id: MenuItemId,
    pub restaurant_id: RestaurantId,
    pub name: String,
    pub price: Money,
    pub quantity: u32,
}

/// An order header row.
///
/// Created atomically with its line items; after finalization, `status` is
/// the only mutable field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: OrderId,
    pub status: OrderStatus,
    /// Fixed at creation; every line item's menu item belongs to it.
    pub restaurant_id: RestaurantId,
    pub customer_id: CustomerId,
    pub order_datetime: DateTime<Utc>,
    /// Sum of line item price × quantity, fixed at creation.
    pub total_amount: Money,
    /// Delivery address snapshot taken from the customer profile.
    pub address: String,
    /// Contact phone snapshot taken from the customer profile.
    pub contact: String,
}

/// An order line item row.
///
/// `price` is the unit price snapshot at purchase time and never reflects
/// later menu changes. The display name is not snapshotted; reads resolve it
/// through the menu item reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemRecord {
    pub id: LineItemId,
    pub order_id: OrderId,
    pub menu_item_id: MenuItemId,
    pub price: Money,
    pub quantity: u32,
}

/// A line item joined with its menu item's current name, as returned by
/// read paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemDetail {
    pub id: LineItemId,
    pub item_name: String,
    pub price: Money,
    pub quantity: u32,
}
