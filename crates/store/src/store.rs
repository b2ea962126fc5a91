//! Storage trait contract.

use async_trait::async_trait;
use common::{CustomerId, MenuItemId, OrderId, RestaurantId};

use crate::Result;
use crate::records::{
    CustomerRecord, LineItemDetail, LineItemRecord, MenuItemRecord, OrderRecord, RestaurantRecord,
};

/// Storage backend for the order workflows.
///
/// Plain reads run at read-committed isolation outside any transaction. All
/// read-then-write access goes through [`Storage::begin`], which opens an
/// atomic transaction scope with exclusive row locking.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Opens a transaction scope.
    ///
    /// Writes made through the returned handle become visible only on
    /// [`StorageTx::commit`]; dropping the handle (or calling
    /// [`StorageTx::rollback`]) discards them all.
    async fn begin(&self) -> Result<Box<dyn StorageTx>>;

    /// Fetches a customer by id.
    async fn customer(&self, id: CustomerId) -> Result<Option<CustomerRecord>>;

    /// Fetches a restaurant by id.
    async fn restaurant(&self, id: RestaurantId) -> Result<Option<RestaurantRecord>>;

    /// Fetches a menu item by id.
    async fn menu_item(&self, id: MenuItemId) -> Result<Option<MenuItemRecord>>;

    /// Fetches an order header by id.
    async fn order(&self, id: OrderId) -> Result<Option<OrderRecord>>;

    /// Fetches an order's line items joined with current menu item names,
    /// in insertion order.
    async fn line_items_for_order(&self, id: OrderId) -> Result<Vec<LineItemDetail>>;

    /// Fetches a customer's orders, oldest first.
    async fn orders_for_customer(&self, id: CustomerId) -> Result<Vec<OrderRecord>>;

    /// Fetches a restaurant's orders, oldest first.
    async fn orders_for_restaurant(&self, id: RestaurantId) -> Result<Vec<OrderRecord>>;

    /// Inserts or replaces a customer row.
    ///
    /// Write path of the registration collaborator; the order workflows never
    /// call this.
    async fn put_customer(&self, record: CustomerRecord) -> Result<()>;

    /// Inserts or replaces a restaurant row (restaurant-management
    /// collaborator).
    async fn put_restaurant(&self, record: RestaurantRecord) -> Result<()>;

    /// Inserts or replaces a menu item row (menu-management collaborator).
    async fn put_menu_item(&self, record: MenuItemRecord) -> Result<()>;
}

/// An open atomic transaction with select-for-update semantics.
///
/// The `*_for_update` reads take an exclusive lock on the returned row; the
/// lock is held until the transaction commits or rolls back, blocking any
/// concurrent transaction's locking read of the same row.
#[async_trait]
pub trait StorageTx: Send {
    /// Locks and fetches a customer row.
    async fn customer_for_update(&mut self, id: CustomerId) -> Result<Option<CustomerRecord>>;

    /// Locks and fetches a menu item row.
    async fn menu_item_for_update(&mut self, id: MenuItemId) -> Result<Option<MenuItemRecord>>;

    /// Locks and fetches an order header row.
    async fn order_for_update(&mut self, id: OrderId) -> Result<Option<OrderRecord>>;

    /// Fetches a restaurant row inside the transaction (no lock; restaurant
    /// rows are never written by the order workflows).
    async fn restaurant(&mut self, id: RestaurantId) -> Result<Option<RestaurantRecord>>;

    /// Stages a new order header.
    async fn insert_order(&mut self, record: &OrderRecord) -> Result<()>;

    /// Stages a new line item.
    async fn insert_line_item(&mut self, record: &LineItemRecord) -> Result<()>;

    /// Stages a menu item stock level. The row must already be locked via
    /// [`StorageTx::menu_item_for_update`].
    async fn update_menu_item_quantity(&mut self, id: MenuItemId, quantity: u32) -> Result<()>;

    /// Stages a customer row update. The row must already be locked via
    /// [`StorageTx::customer_for_update`].
    async fn update_customer(&mut self, record: &CustomerRecord) -> Result<()>;

    /// Stages an order header update. The row must already be locked via
    /// [`StorageTx::order_for_update`] or staged by
    /// [`StorageTx::insert_order`].
    async fn update_order(&mut self, record: &OrderRecord) -> Result<()>;

    /// Atomically publishes every staged write.
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Discards every staged write and releases all locks.
    async fn rollback(self: Box<Self>) -> Result<()>;
}
