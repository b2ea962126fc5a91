use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use common::{
    CustomerId, LineItemId, MenuItemId, Money, OrderId, OrderStatus, ParseOrderStatusError,
    RestaurantId,
};

use crate::records::{
    CustomerRecord, LineItemDetail, LineItemRecord, MenuItemRecord, OrderRecord, RestaurantRecord,
};
use crate::store::{Storage, StorageTx};
use crate::{Result, StoreError};

/// PostgreSQL-backed storage implementation.
///
/// Exclusive row locks are taken with `SELECT … FOR UPDATE`; each
/// [`Storage::begin`] maps to one database transaction, so a rollback (or a
/// dropped handle) reverts every staged write.
#[derive(Clone)]
pub struct PostgresStorage {
    pool: PgPool,
}

impl PostgresStorage {
    /// Creates a new PostgreSQL storage on the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn parse_status(raw: &str) -> Result<OrderStatus> {
    raw.parse()
        .map_err(|e: ParseOrderStatusError| StoreError::Decode(e.to_string()))
}

fn row_to_customer(row: PgRow) -> Result<CustomerRecord> {
    Ok(CustomerRecord {
        id: CustomerId::from_uuid(row.try_get::<Uuid, _>("id")?),
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        phone_number: row.try_get("phone_number")?,
        street_address: row.try_get("street_address")?,
        city: row.try_get("city")?,
        state: row.try_get("state")?,
        zipcode: row.try_get("zipcode")?,
        balance: Money::from_cents(row.try_get("balance_cents")?),
    })
}

fn row_to_restaurant(row: PgRow) -> Result<RestaurantRecord> {
    Ok(RestaurantRecord {
        id: RestaurantId::from_uuid(row.try_get::<Uuid, _>("id")?),
        name: row.try_get("name")?,
        is_active: row.try_get("is_active")?,
        owner_id: CustomerId::from_uuid(row.try_get::<Uuid, _>("owner_id")?),
    })
}

fn row_to_menu_item(row: PgRow) -> Result<MenuItemRecord> {
    Ok(MenuItemRecord {
        id: MenuItemId::from_uuid(row.try_get::<Uuid, _>("id")?),
        restaurant_id: RestaurantId::from_uuid(row.try_get::<Uuid, _>("restaurant_id")?),
        name: row.try_get("name")?,
        price: Money::from_cents(row.try_get("price_cents")?),
        quantity: row.try_get::<i32, _>("quantity")? as u32,
    })
}

fn row_to_order(row: PgRow) -> Result<OrderRecord> {
    Ok(OrderRecord {
        id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
        status: parse_status(row.try_get::<String, _>("status")?.as_str())?,
        restaurant_id: RestaurantId::from_uuid(row.try_get::<Uuid, _>("restaurant_id")?),
        customer_id: CustomerId::from_uuid(row.try_get::<Uuid, _>("customer_id")?),
        order_datetime: row.try_get("order_datetime")?,
        total_amount: Money::from_cents(row.try_get("total_amount_cents")?),
        address: row.try_get("address")?,
        contact: row.try_get("contact")?,
    })
}

fn row_to_line_item_detail(row: PgRow) -> Result<LineItemDetail> {
    Ok(LineItemDetail {
        id: LineItemId::from_uuid(row.try_get::<Uuid, _>("id")?),
        item_name: row.try_get("item_name")?,
        price: Money::from_cents(row.try_get("price_cents")?),
        quantity: row.try_get::<i32, _>("quantity")? as u32,
    })
}

const SELECT_CUSTOMER: &str = "SELECT id, username, email, phone_number, street_address, city, \
                               state, zipcode, balance_cents FROM customers WHERE id = $1";
const SELECT_RESTAURANT: &str = "SELECT id, name, is_active, owner_id FROM restaurants WHERE id = $1";
const SELECT_MENU_ITEM: &str =
    "SELECT id, restaurant_id, name, price_cents, quantity FROM menu_items WHERE id = $1";
const SELECT_ORDER: &str = "SELECT id, status, restaurant_id, customer_id, order_datetime, \
                            total_amount_cents, address, contact FROM orders WHERE id = $1";

#[async_trait]
impl Storage for PostgresStorage {
    async fn begin(&self) -> Result<Box<dyn StorageTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PostgresTx { tx }))
    }

    async fn customer(&self, id: CustomerId) -> Result<Option<CustomerRecord>> {
        let row = sqlx::query(SELECT_CUSTOMER)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_customer).transpose()
    }

    async fn restaurant(&self, id: RestaurantId) -> Result<Option<RestaurantRecord>> {
        let row = sqlx::query(SELECT_RESTAURANT)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_restaurant).transpose()
    }

    async fn menu_item(&self, id: MenuItemId) -> Result<Option<MenuItemRecord>> {
        let row = sqlx::query(SELECT_MENU_ITEM)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_menu_item).transpose()
    }

    async fn order(&self, id: OrderId) -> Result<Option<OrderRecord>> {
        let row = sqlx::query(SELECT_ORDER)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_order).transpose()
    }

    async fn line_items_for_order(&self, id: OrderId) -> Result<Vec<LineItemDetail>> {
        let rows = sqlx::query(
            r#"
            SELECT oi.id, mi.name AS item_name, oi.price_cents, oi.quantity
            FROM order_items oi
            JOIN menu_items mi ON mi.id = oi.menu_item_id
            WHERE oi.order_id = $1
            ORDER BY oi.seq ASC
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_line_item_detail).collect()
    }

    async fn orders_for_customer(&self, id: CustomerId) -> Result<Vec<OrderRecord>> {
        let rows = sqlx::query(
            "SELECT id, status, restaurant_id, customer_id, order_datetime, total_amount_cents, \
             address, contact FROM orders WHERE customer_id = $1 ORDER BY order_datetime ASC",
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_order).collect()
    }

    async fn orders_for_restaurant(&self, id: RestaurantId) -> Result<Vec<OrderRecord>> {
        let rows = sqlx::query(
            "SELECT id, status, restaurant_id, customer_id, order_datetime, total_amount_cents, \
             address, contact FROM orders WHERE restaurant_id = $1 ORDER BY order_datetime ASC",
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_order).collect()
    }

    async fn put_customer(&self, record: CustomerRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO customers (id, username, email, phone_number, street_address, city, state, zipcode, balance_cents)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE SET
                username = EXCLUDED.username,
                email = EXCLUDED.email,
                phone_number = EXCLUDED.phone_number,
                street_address = EXCLUDED.street_address,
                city = EXCLUDED.city,
                state = EXCLUDED.state,
                zipcode = EXCLUDED.zipcode,
                balance_cents = EXCLUDED.balance_cents
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(&record.username)
        .bind(&record.email)
        .bind(&record.phone_number)
        .bind(&record.street_address)
        .bind(&record.city)
        .bind(&record.state)
        .bind(&record.zipcode)
        .bind(record.balance.cents())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn put_restaurant(&self, record: RestaurantRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO restaurants (id, name, is_active, owner_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                is_active = EXCLUDED.is_active,
                owner_id = EXCLUDED.owner_id
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(&record.name)
        .bind(record.is_active)
        .bind(record.owner_id.as_uuid())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn put_menu_item(&self, record: MenuItemRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO menu_items (id, restaurant_id, name, price_cents, quantity)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                restaurant_id = EXCLUDED.restaurant_id,
                name = EXCLUDED.name,
                price_cents = EXCLUDED.price_cents,
                quantity = EXCLUDED.quantity
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.restaurant_id.as_uuid())
        .bind(&record.name)
        .bind(record.price.cents())
        .bind(record.quantity as i32)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

struct PostgresTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StorageTx for PostgresTx {
    async fn customer_for_update(&mut self, id: CustomerId) -> Result<Option<CustomerRecord>> {
        let row = sqlx::query(
            "SELECT id, username, email, phone_number, street_address, city, state, zipcode, \
             balance_cents FROM customers WHERE id = $1 FOR UPDATE",
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await?;
        row.map(row_to_customer).transpose()
    }

    async fn menu_item_for_update(&mut self, id: MenuItemId) -> Result<Option<MenuItemRecord>> {
        let row = sqlx::query(
            "SELECT id, restaurant_id, name, price_cents, quantity FROM menu_items \
             WHERE id = $1 FOR UPDATE",
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await?;
        row.map(row_to_menu_item).transpose()
    }

    async fn order_for_update(&mut self, id: OrderId) -> Result<Option<OrderRecord>> {
        let row = sqlx::query(
            "SELECT id, status, restaurant_id, customer_id, order_datetime, total_amount_cents, \
             address, contact FROM orders WHERE id = $1 FOR UPDATE",
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await?;
        row.map(row_to_order).transpose()
    }

    async fn restaurant(&mut self, id: RestaurantId) -> Result<Option<RestaurantRecord>> {
        let row = sqlx::query(SELECT_RESTAURANT)
            .bind(id.as_uuid())
            .fetch_optional(&mut *self.tx)
            .await?;
        row.map(row_to_restaurant).transpose()
    }

    async fn insert_order(&mut self, record: &OrderRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, status, restaurant_id, customer_id, order_datetime, total_amount_cents, address, contact)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.status.as_str())
        .bind(record.restaurant_id.as_uuid())
        .bind(record.customer_id.as_uuid())
        .bind(record.order_datetime)
        .bind(record.total_amount.cents())
        .bind(&record.address)
        .bind(&record.contact)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn insert_line_item(&mut self, record: &LineItemRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO order_items (id, order_id, menu_item_id, price_cents, quantity)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.order_id.as_uuid())
        .bind(record.menu_item_id.as_uuid())
        .bind(record.price.cents())
        .bind(record.quantity as i32)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn update_menu_item_quantity(&mut self, id: MenuItemId, quantity: u32) -> Result<()> {
        sqlx::query("UPDATE menu_items SET quantity = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(quantity as i32)
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    async fn update_customer(&mut self, record: &CustomerRecord) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE customers
            SET username = $2, email = $3, phone_number = $4, street_address = $5,
                city = $6, state = $7, zipcode = $8, balance_cents = $9
            WHERE id = $1
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(&record.username)
        .bind(&record.email)
        .bind(&record.phone_number)
        .bind(&record.street_address)
        .bind(&record.city)
        .bind(&record.state)
        .bind(&record.zipcode)
        .bind(record.balance.cents())
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn update_order(&mut self, record: &OrderRecord) -> Result<()> {
        sqlx::query(
            "UPDATE orders SET status = $2, total_amount_cents = $3, address = $4, contact = $5 \
             WHERE id = $1",
        )
        .bind(record.id.as_uuid())
        .bind(record.status.as_str())
        .bind(record.total_amount.cents())
        .bind(&record.address)
        .bind(&record.contact)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
