use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use common::{CustomerId, MenuItemId, OrderId, RestaurantId};

use crate::records::{
    CustomerRecord, LineItemDetail, LineItemRecord, MenuItemRecord, OrderRecord, RestaurantRecord,
};
use crate::store::{Storage, StorageTx};
use crate::{Result, StoreError};

#[derive(Debug, Clone, Default)]
struct Tables {
    customers: HashMap<CustomerId, CustomerRecord>,
    restaurants: HashMap<RestaurantId, RestaurantRecord>,
    menu_items: HashMap<MenuItemId, MenuItemRecord>,
    orders: HashMap<OrderId, OrderRecord>,
    line_items: Vec<LineItemRecord>,
}

impl Tables {
    fn line_item_details(&self, order_id: OrderId) -> Vec<LineItemDetail> {
        self.line_items
            .iter()
            .filter(|li| li.order_id == order_id)
            .map(|li| LineItemDetail {
                id: li.id,
                item_name: self
                    .menu_items
                    .get(&li.menu_item_id)
                    .map(|m| m.name.clone())
                    .unwrap_or_default(),
                price: li.price,
                quantity: li.quantity,
            })
            .collect()
    }

    fn orders_where(&self, mut pred: impl FnMut(&OrderRecord) -> bool) -> Vec<OrderRecord> {
        let mut orders: Vec<_> = self.orders.values().filter(|o| pred(o)).cloned().collect();
        orders.sort_by_key(|o| o.order_datetime);
        orders
    }
}

/// In-memory storage implementation for testing and local development.
///
/// All tables live behind a single mutex. [`Storage::begin`] holds the mutex
/// for the life of the transaction, so transactions execute one at a time —
/// a trivially correct realization of the exclusive row-lock contract.
/// Writes are staged on a working copy and published on commit.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStorage {
    /// Creates a new empty in-memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.tables.lock().await.orders.len()
    }

    /// Returns the total number of line items stored.
    pub async fn line_item_count(&self) -> usize {
        self.tables.lock().await.line_items.len()
    }

    /// Clears all tables.
    pub async fn clear(&self) {
        let mut tables = self.tables.lock().await;
        *tables = Tables::default();
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn begin(&self) -> Result<Box<dyn StorageTx>> {
        let guard = self.tables.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTx { guard, working }))
    }

    async fn customer(&self, id: CustomerId) -> Result<Option<CustomerRecord>> {
        Ok(self.tables.lock().await.customers.get(&id).cloned())
    }

    async fn restaurant(&self, id: RestaurantId) -> Result<Option<RestaurantRecord>> {
        Ok(self.tables.lock().await.restaurants.get(&id).cloned())
    }

    async fn menu_item(&self, id: MenuItemId) -> Result<Option<MenuItemRecord>> {
        Ok(self.tables.lock().await.menu_items.get(&id).cloned())
    }

    async fn order(&self, id: OrderId) -> Result<Option<OrderRecord>> {
        Ok(self.tables.lock().await.orders.get(&id).cloned())
    }

    async fn line_items_for_order(&self, id: OrderId) -> Result<Vec<LineItemDetail>> {
        Ok(self.tables.lock().await.line_item_details(id))
    }

    async fn orders_for_customer(&self, id: CustomerId) -> Result<Vec<OrderRecord>> {
        Ok(self
            .tables
            .lock()
            .await
            .orders_where(|o| o.customer_id == id))
    }

    async fn orders_for_restaurant(&self, id: RestaurantId) -> Result<Vec<OrderRecord>> {
        Ok(self
            .tables
            .lock()
            .await
            .orders_where(|o| o.restaurant_id == id))
    }

    async fn put_customer(&self, record: CustomerRecord) -> Result<()> {
        self.tables.lock().await.customers.insert(record.id, record);
        Ok(())
    }

    async fn put_restaurant(&self, record: RestaurantRecord) -> Result<()> {
        self.tables
            .lock()
            .await
            .restaurants
            .insert(record.id, record);
        Ok(())
    }

    async fn put_menu_item(&self, record: MenuItemRecord) -> Result<()> {
        self.tables
            .lock()
            .await
            .menu_items
            .insert(record.id, record);
        Ok(())
    }
}

struct MemoryTx {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
}

#[async_trait]
impl StorageTx for MemoryTx {
    async fn customer_for_update(&mut self, id: CustomerId) -> Result<Option<CustomerRecord>> {
        Ok(self.working.customers.get(&id).cloned())
    }

    async fn menu_item_for_update(&mut self, id: MenuItemId) -> Result<Option<MenuItemRecord>> {
        Ok(self.working.menu_items.get(&id).cloned())
    }

    async fn order_for_update(&mut self, id: OrderId) -> Result<Option<OrderRecord>> {
        Ok(self.working.orders.get(&id).cloned())
    }

    async fn restaurant(&mut self, id: RestaurantId) -> Result<Option<RestaurantRecord>> {
        Ok(self.working.restaurants.get(&id).cloned())
    }

    async fn insert_order(&mut self, record: &OrderRecord) -> Result<()> {
        self.working.orders.insert(record.id, record.clone());
        Ok(())
    }

    async fn insert_line_item(&mut self, record: &LineItemRecord) -> Result<()> {
        self.working.line_items.push(record.clone());
        Ok(())
    }

    async fn update_menu_item_quantity(&mut self, id: MenuItemId, quantity: u32) -> Result<()> {
        match self.working.menu_items.get_mut(&id) {
            Some(item) => {
                item.quantity = quantity;
                Ok(())
            }
            None => Err(StoreError::Decode(format!("unknown menu item: {id}"))),
        }
    }

    async fn update_customer(&mut self, record: &CustomerRecord) -> Result<()> {
        self.working.customers.insert(record.id, record.clone());
        Ok(())
    }

    async fn update_order(&mut self, record: &OrderRecord) -> Result<()> {
        self.working.orders.insert(record.id, record.clone());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let MemoryTx { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        // Dropping the guard releases the lock; the working copy is discarded.
        Ok(())
    }
}
