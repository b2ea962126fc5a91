//! Order service providing the API surface for order operations.

use std::time::Instant;

use common::{CustomerId, OrderId, OrderStatus, RestaurantId};
use store::{OrderRecord, Storage};

use super::{CartLine, OrderDetail, OrderError, OrderListQuery, placement, transition};

/// Service for placing orders, transitioning their status and reading them
/// back with permission enforcement.
pub struct OrderService<S> {
    storage: S,
}

impl<S: Storage> OrderService<S> {
    /// Creates a new order service on the given storage.
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Returns a reference to the underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Places an order for the customer's cart.
    ///
    /// Atomic: on any error no order, line item, stock decrement or balance
    /// debit survives.
    #[tracing::instrument(skip(self))]
    pub async fn place_order(
        &self,
        customer_id: CustomerId,
        lines: &[CartLine],
    ) -> Result<OrderDetail, OrderError> {
        let started = Instant::now();
        let result = placement::place_order(&self.storage, customer_id, lines).await;

        match &result {
            Ok(detail) => {
                metrics::counter!("orders_placed_total").increment(1);
                metrics::histogram!("order_placement_duration_seconds")
                    .record(started.elapsed().as_secs_f64());
                tracing::info!(
                    order_id = %detail.order.id,
                    total = %detail.order.total_amount,
                    items = detail.items.len(),
                    "order placed"
                );
            }
            Err(err) if err.is_validation() => {
                metrics::counter!("orders_rejected_total").increment(1);
                tracing::info!(error = %err, "order rejected");
            }
            Err(err) => {
                tracing::warn!(error = %err, "order placement failed");
            }
        }

        result
    }

    /// Transitions an order to a new status on behalf of an actor.
    ///
    /// Cancellation credits the order total back to the customer's balance in
    /// the same transaction.
    #[tracing::instrument(skip(self))]
    pub async fn update_status(
        &self,
        actor_id: CustomerId,
        order_id: OrderId,
        new_status: OrderStatus,
    ) -> Result<OrderRecord, OrderError> {
        let result = transition::update_status(&self.storage, actor_id, order_id, new_status).await;

        if let Ok(order) = &result {
            metrics::counter!("order_status_updates_total").increment(1);
            tracing::info!(order_id = %order.id, status = %order.status, "order status updated");
        }

        result
    }

    /// Loads an order with its line items.
    ///
    /// Only the order's customer and the restaurant owner may read it; other
    /// actors get a not-found so the order's existence is not leaked.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(
        &self,
        actor_id: CustomerId,
        order_id: OrderId,
    ) -> Result<OrderDetail, OrderError> {
        let order = self
            .storage
            .order(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound { order_id })?;

        let restaurant = self
            .storage
            .restaurant(order.restaurant_id)
            .await?
            .ok_or(OrderError::OrderNotFound { order_id })?;

        if order.customer_id != actor_id && restaurant.owner_id != actor_id {
            return Err(OrderError::OrderNotFound { order_id });
        }

        let items = self.storage.line_items_for_order(order_id).await?;
        Ok(OrderDetail {
            order,
            restaurant_name: restaurant.name,
            items,
        })
    }

    /// Lists the customer's own orders, oldest first, with search and
    /// ordering applied.
    #[tracing::instrument(skip(self))]
    pub async fn list_for_customer(
        &self,
        customer_id: CustomerId,
        query: &OrderListQuery,
    ) -> Result<Vec<OrderDetail>, OrderError> {
        let orders = self.storage.orders_for_customer(customer_id).await?;
        let details = self.load_details(orders).await?;
        Ok(query.apply(details))
    }

    /// Lists a restaurant's orders for its owner, oldest first.
    #[tracing::instrument(skip(self))]
    pub async fn list_for_restaurant(
        &self,
        actor_id: CustomerId,
        restaurant_id: RestaurantId,
    ) -> Result<Vec<OrderDetail>, OrderError> {
        let restaurant = self
            .storage
            .restaurant(restaurant_id)
            .await?
            .filter(|r| r.is_active)
            .ok_or(OrderError::RestaurantNotFound { restaurant_id })?;

        if restaurant.owner_id != actor_id {
            return Err(OrderError::Forbidden);
        }

        let orders = self.storage.orders_for_restaurant(restaurant_id).await?;
        self.load_details(orders).await
    }

    async fn load_details(&self, orders: Vec<OrderRecord>) -> Result<Vec<OrderDetail>, OrderError> {
        let mut details = Vec::with_capacity(orders.len());
        for order in orders {
            let restaurant_name = self
                .storage
                .restaurant(order.restaurant_id)
                .await?
                .map(|r| r.name)
                .unwrap_or_default();
            let items = self.storage.line_items_for_order(order.id).await?;
            details.push(OrderDetail {
                order,
                restaurant_name,
                items,
            });
        }
        Ok(details)
    }
}

#[cfg(test)]
mod tests {
    use common::{MenuItemId, Money};
    use store::{CustomerRecord, InMemoryStorage, MenuItemRecord, RestaurantRecord};

    use super::*;

    async fn seed_customer(storage: &InMemoryStorage, balance: Money) -> CustomerRecord {
        let customer = CustomerRecord {
            id: CustomerId::new(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            phone_number: Some("5551234567".to_string()),
            street_address: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            zipcode: "62701".to_string(),
            balance,
        };
        storage.put_customer(customer.clone()).await.unwrap();
        customer
    }

    async fn seed_restaurant(storage: &InMemoryStorage, owner_id: CustomerId) -> RestaurantRecord {
        let restaurant = RestaurantRecord {
            id: RestaurantId::new(),
            name: "Pasta Place".to_string(),
            is_active: true,
            owner_id,
        };
        storage.put_restaurant(restaurant.clone()).await.unwrap();
        restaurant
    }

    async fn seed_item(
        storage: &InMemoryStorage,
        restaurant_id: RestaurantId,
        name: &str,
        price_cents: i64,
        quantity: u32,
    ) -> MenuItemRecord {
        let item = MenuItemRecord {
            id: MenuItemId::new(),
            restaurant_id,
            name: name.to_string(),
            price: Money::from_cents(price_cents),
            quantity,
        };
        storage.put_menu_item(item.clone()).await.unwrap();
        item
    }

    struct Fixture {
        storage: InMemoryStorage,
        service: OrderService<InMemoryStorage>,
        customer: CustomerRecord,
        owner: CustomerRecord,
        restaurant: RestaurantRecord,
        item: MenuItemRecord,
    }

    /// Customer with $100, one restaurant, one $10.00 item with stock 5.
    async fn fixture() -> Fixture {
        let storage = InMemoryStorage::new();
        let customer = seed_customer(&storage, Money::from_dollars(100)).await;
        let mut owner = seed_customer(&storage, Money::zero()).await;
        owner.email = "owner@example.com".to_string();
        storage.put_customer(owner.clone()).await.unwrap();
        let restaurant = seed_restaurant(&storage, owner.id).await;
        let item = seed_item(&storage, restaurant.id, "Carbonara", 1000, 5).await;
        let service = OrderService::new(storage.clone());
        Fixture {
            storage,
            service,
            customer,
            owner,
            restaurant,
            item,
        }
    }

    fn cart(item_id: MenuItemId, quantity: u32) -> Vec<CartLine> {
        vec![CartLine {
            menu_item_id: item_id,
            quantity,
        }]
    }

    #[tokio::test]
    async fn place_order_debits_balance_and_stock() {
        let f = fixture().await;

        let detail = f
            .service
            .place_order(f.customer.id, &cart(f.item.id, 3))
            .await
            .unwrap();

        assert_eq!(detail.order.status, OrderStatus::InProgress);
        assert_eq!(detail.order.total_amount, Money::from_dollars(30));
        assert_eq!(detail.order.contact, "5551234567");
        assert_eq!(detail.order.address, "1 Main St, Springfield, IL, 62701");
        assert_eq!(detail.restaurant_name, "Pasta Place");
        assert_eq!(detail.items.len(), 1);
        assert_eq!(detail.items[0].price, Money::from_cents(1000));
        assert_eq!(detail.items[0].quantity, 3);

        let stock = f.storage.menu_item(f.item.id).await.unwrap().unwrap();
        assert_eq!(stock.quantity, 2);
        let balance = f.storage.customer(f.customer.id).await.unwrap().unwrap();
        assert_eq!(balance.balance, Money::from_dollars(70));
    }

    #[tokio::test]
    async fn place_order_empty_cart_rejected() {
        let f = fixture().await;
        let err = f.service.place_order(f.customer.id, &[]).await.unwrap_err();
        assert!(matches!(err, OrderError::EmptyCart));
    }

    #[tokio::test]
    async fn place_order_requires_phone_number() {
        let f = fixture().await;
        let mut customer = f.customer.clone();
        customer.phone_number = None;
        f.storage.put_customer(customer.clone()).await.unwrap();

        let err = f
            .service
            .place_order(customer.id, &cart(f.item.id, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::PhoneRequired));

        // An empty string counts as missing too.
        customer.phone_number = Some(String::new());
        f.storage.put_customer(customer.clone()).await.unwrap();
        let err = f
            .service
            .place_order(customer.id, &cart(f.item.id, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::PhoneRequired));
    }

    #[tokio::test]
    async fn place_order_reports_missing_address_fields_in_order() {
        let f = fixture().await;
        let mut customer = f.customer.clone();
        customer.state = String::new();
        customer.city = String::new();
        f.storage.put_customer(customer.clone()).await.unwrap();

        let err = f
            .service
            .place_order(customer.id, &cart(f.item.id, 1))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Please update complete address first. Missing fields: state, city."
        );
    }

    #[tokio::test]
    async fn place_order_unknown_item_rejected() {
        let f = fixture().await;
        let bogus = MenuItemId::new();
        let err = f
            .service
            .place_order(f.customer.id, &cart(bogus, 1))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), format!("Invalid item id: {bogus}"));
        assert_eq!(f.storage.order_count().await, 0);
    }

    #[tokio::test]
    async fn inactive_restaurant_reported_as_invalid_item() {
        let f = fixture().await;
        let mut restaurant = f.restaurant.clone();
        restaurant.is_active = false;
        f.storage.put_restaurant(restaurant).await.unwrap();

        let err = f
            .service
            .place_order(f.customer.id, &cart(f.item.id, 1))
            .await
            .unwrap_err();
        // Same message as an unknown item id.
        assert_eq!(err.to_string(), format!("Invalid item id: {}", f.item.id));
    }

    #[tokio::test]
    async fn zero_quantity_rejected() {
        let f = fixture().await;
        let err = f
            .service
            .place_order(f.customer.id, &cart(f.item.id, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidQuantity { .. }));
        assert_eq!(f.storage.order_count().await, 0);
    }

    #[tokio::test]
    async fn mixed_restaurants_rejected_and_rolled_back() {
        let f = fixture().await;
        let other_owner = seed_customer(&f.storage, Money::zero()).await;
        let other_restaurant = seed_restaurant(&f.storage, other_owner.id).await;
        let other_item = seed_item(&f.storage, other_restaurant.id, "Burger", 900, 5).await;

        let lines = vec![
            CartLine {
                menu_item_id: f.item.id,
                quantity: 1,
            },
            CartLine {
                menu_item_id: other_item.id,
                quantity: 1,
            },
        ];
        let err = f
            .service
            .place_order(f.customer.id, &lines)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::MixedRestaurants));

        // The first line's reservation must not survive the rollback.
        assert_eq!(f.storage.order_count().await, 0);
        assert_eq!(f.storage.line_item_count().await, 0);
        let stock = f.storage.menu_item(f.item.id).await.unwrap().unwrap();
        assert_eq!(stock.quantity, 5);
    }

    #[tokio::test]
    async fn insufficient_stock_rejected() {
        let f = fixture().await;
        let err = f
            .service
            .place_order(f.customer.id, &cart(f.item.id, 6))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Not enough quantity available for item: Carbonara"
        );
    }

    #[tokio::test]
    async fn insufficient_balance_rolls_back_inventory() {
        let f = fixture().await;
        let mut customer = f.customer.clone();
        customer.balance = Money::from_dollars(20);
        f.storage.put_customer(customer.clone()).await.unwrap();

        let err = f
            .service
            .place_order(customer.id, &cart(f.item.id, 3))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::InsufficientBalance));

        let stock = f.storage.menu_item(f.item.id).await.unwrap().unwrap();
        assert_eq!(stock.quantity, 5);
        let balance = f.storage.customer(customer.id).await.unwrap().unwrap();
        assert_eq!(balance.balance, Money::from_dollars(20));
        assert_eq!(f.storage.order_count().await, 0);
    }

    #[tokio::test]
    async fn same_item_twice_reserves_cumulatively() {
        let f = fixture().await;
        let lines = vec![
            CartLine {
                menu_item_id: f.item.id,
                quantity: 2,
            },
            CartLine {
                menu_item_id: f.item.id,
                quantity: 2,
            },
        ];

        let detail = f.service.place_order(f.customer.id, &lines).await.unwrap();
        assert_eq!(detail.items.len(), 2);
        assert_eq!(detail.order.total_amount, Money::from_dollars(40));

        let stock = f.storage.menu_item(f.item.id).await.unwrap().unwrap();
        assert_eq!(stock.quantity, 1);
    }

    #[tokio::test]
    async fn line_item_price_is_a_snapshot_but_name_is_live() {
        let f = fixture().await;
        let detail = f
            .service
            .place_order(f.customer.id, &cart(f.item.id, 1))
            .await
            .unwrap();

        let mut item = f.item.clone();
        item.price = Money::from_cents(9999);
        item.name = "Carbonara Deluxe".to_string();
        f.storage.put_menu_item(item).await.unwrap();

        let reloaded = f
            .service
            .get_order(f.customer.id, detail.order.id)
            .await
            .unwrap();
        assert_eq!(reloaded.items[0].price, Money::from_cents(1000));
        assert_eq!(reloaded.items[0].item_name, "Carbonara Deluxe");
    }

    #[tokio::test]
    async fn customer_cancel_refunds_balance_once() {
        let f = fixture().await;
        let detail = f
            .service
            .place_order(f.customer.id, &cart(f.item.id, 3))
            .await
            .unwrap();

        let order = f
            .service
            .update_status(f.customer.id, detail.order.id, OrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);

        let customer = f.storage.customer(f.customer.id).await.unwrap().unwrap();
        assert_eq!(customer.balance, Money::from_dollars(100));

        // Reserved stock stays reserved on cancellation.
        let stock = f.storage.menu_item(f.item.id).await.unwrap().unwrap();
        assert_eq!(stock.quantity, 2);

        // A second cancellation fails and must not refund again.
        let err = f
            .service
            .update_status(f.customer.id, detail.order.id, OrderStatus::Cancelled)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Order cannot be updated. Current status is: Cancelled"
        );
        let customer = f.storage.customer(f.customer.id).await.unwrap().unwrap();
        assert_eq!(customer.balance, Money::from_dollars(100));
    }

    #[tokio::test]
    async fn customer_may_only_cancel() {
        let f = fixture().await;
        let detail = f
            .service
            .place_order(f.customer.id, &cart(f.item.id, 1))
            .await
            .unwrap();

        let err = f
            .service
            .update_status(f.customer.id, detail.order.id, OrderStatus::Dispatched)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::CustomerOnlyCancel));
    }

    #[tokio::test]
    async fn customer_cannot_cancel_dispatched_order() {
        let f = fixture().await;
        let detail = f
            .service
            .place_order(f.customer.id, &cart(f.item.id, 1))
            .await
            .unwrap();
        f.service
            .update_status(f.owner.id, detail.order.id, OrderStatus::Dispatched)
            .await
            .unwrap();

        let err = f
            .service
            .update_status(f.customer.id, detail.order.id, OrderStatus::Cancelled)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Order cannot be updated. Current status is: Dispatched"
        );
    }

    #[tokio::test]
    async fn owner_runs_the_full_lifecycle() {
        let f = fixture().await;
        let detail = f
            .service
            .place_order(f.customer.id, &cart(f.item.id, 1))
            .await
            .unwrap();

        let order = f
            .service
            .update_status(f.owner.id, detail.order.id, OrderStatus::Dispatched)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Dispatched);

        let order = f
            .service
            .update_status(f.owner.id, detail.order.id, OrderStatus::Delivered)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Delivered);

        // Delivered is terminal for everyone.
        let err = f
            .service
            .update_status(f.owner.id, detail.order.id, OrderStatus::Cancelled)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Order cannot be updated. Current status is: Delivered"
        );
    }

    #[tokio::test]
    async fn owner_may_deliver_straight_from_in_progress() {
        let f = fixture().await;
        let detail = f
            .service
            .place_order(f.customer.id, &cart(f.item.id, 1))
            .await
            .unwrap();

        let order = f
            .service
            .update_status(f.owner.id, detail.order.id, OrderStatus::Delivered)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Delivered);
    }

    #[tokio::test]
    async fn owner_cancel_refunds_the_customer() {
        let f = fixture().await;
        let detail = f
            .service
            .place_order(f.customer.id, &cart(f.item.id, 2))
            .await
            .unwrap();

        f.service
            .update_status(f.owner.id, detail.order.id, OrderStatus::Cancelled)
            .await
            .unwrap();

        let customer = f.storage.customer(f.customer.id).await.unwrap().unwrap();
        assert_eq!(customer.balance, Money::from_dollars(100));
    }

    #[tokio::test]
    async fn stranger_cannot_update_order() {
        let f = fixture().await;
        let detail = f
            .service
            .place_order(f.customer.id, &cart(f.item.id, 1))
            .await
            .unwrap();

        let stranger = seed_customer(&f.storage, Money::zero()).await;
        let err = f
            .service
            .update_status(stranger.id, detail.order.id, OrderStatus::Cancelled)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::Forbidden));
    }

    #[tokio::test]
    async fn update_status_unknown_order() {
        let f = fixture().await;
        let err = f
            .service
            .update_status(f.customer.id, OrderId::new(), OrderStatus::Cancelled)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::OrderNotFound { .. }));
    }

    #[tokio::test]
    async fn get_order_hides_existence_from_strangers() {
        let f = fixture().await;
        let detail = f
            .service
            .place_order(f.customer.id, &cart(f.item.id, 1))
            .await
            .unwrap();

        assert!(
            f.service
                .get_order(f.customer.id, detail.order.id)
                .await
                .is_ok()
        );
        assert!(f.service.get_order(f.owner.id, detail.order.id).await.is_ok());

        let stranger = seed_customer(&f.storage, Money::zero()).await;
        let err = f
            .service
            .get_order(stranger.id, detail.order.id)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::OrderNotFound { .. }));
    }

    #[tokio::test]
    async fn get_order_reads_are_idempotent() {
        let f = fixture().await;
        let detail = f
            .service
            .place_order(f.customer.id, &cart(f.item.id, 2))
            .await
            .unwrap();

        let first = f
            .service
            .get_order(f.customer.id, detail.order.id)
            .await
            .unwrap();
        let second = f
            .service
            .get_order(f.customer.id, detail.order.id)
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn list_for_customer_returns_only_own_orders() {
        let f = fixture().await;
        f.service
            .place_order(f.customer.id, &cart(f.item.id, 1))
            .await
            .unwrap();

        let other = seed_customer(&f.storage, Money::from_dollars(50)).await;
        f.service
            .place_order(other.id, &cart(f.item.id, 1))
            .await
            .unwrap();

        let listing = f
            .service
            .list_for_customer(f.customer.id, &OrderListQuery::default())
            .await
            .unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].order.customer_id, f.customer.id);
    }

    #[tokio::test]
    async fn list_for_restaurant_enforces_ownership() {
        let f = fixture().await;
        f.service
            .place_order(f.customer.id, &cart(f.item.id, 1))
            .await
            .unwrap();

        let listing = f
            .service
            .list_for_restaurant(f.owner.id, f.restaurant.id)
            .await
            .unwrap();
        assert_eq!(listing.len(), 1);

        let err = f
            .service
            .list_for_restaurant(f.customer.id, f.restaurant.id)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::Forbidden));

        let err = f
            .service
            .list_for_restaurant(f.owner.id, RestaurantId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::RestaurantNotFound { .. }));
    }
}
