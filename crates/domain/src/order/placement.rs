//! Order placement transaction.
//!
//! Validates the customer profile and cart, reserves stock and debits the
//! balance, creating the order header and line items inside one storage
//! transaction. Any failure rolls every write back; on success one order,
//! its line items, the stock decrements and the balance debit commit
//! together.

use chrono::Utc;
use common::{CustomerId, LineItemId, Money, OrderId, OrderStatus};
use store::{
    CustomerRecord, LineItemDetail, LineItemRecord, MenuItemRecord, OrderRecord, Storage,
    StorageTx,
};

use super::{CartLine, OrderDetail, OrderError};

/// Profile address fields required before ordering, in reporting order.
const REQUIRED_ADDRESS_FIELDS: [(&str, fn(&CustomerRecord) -> &str); 4] = [
    ("street_address", |c| &c.street_address),
    ("state", |c| &c.state),
    ("city", |c| &c.city),
    ("zipcode", |c| &c.zipcode),
];

pub(super) async fn place_order<S: Storage>(
    storage: &S,
    customer_id: CustomerId,
    lines: &[CartLine],
) -> Result<OrderDetail, OrderError> {
    if lines.is_empty() {
        return Err(OrderError::EmptyCart);
    }

    let mut tx = storage.begin().await?;
    match build_order(tx.as_mut(), customer_id, lines).await {
        Ok(detail) => {
            tx.commit().await?;
            Ok(detail)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!(error = %rollback_err, "rollback failed after placement error");
            }
            Err(err)
        }
    }
}

async fn build_order(
    tx: &mut dyn StorageTx,
    customer_id: CustomerId,
    lines: &[CartLine],
) -> Result<OrderDetail, OrderError> {
    let mut customer = tx
        .customer_for_update(customer_id)
        .await?
        .ok_or(OrderError::CustomerNotFound { customer_id })?;

    let contact = match customer.phone_number.as_deref() {
        Some(phone) if !phone.is_empty() => phone.to_string(),
        _ => return Err(OrderError::PhoneRequired),
    };

    let missing: Vec<&str> = REQUIRED_ADDRESS_FIELDS
        .iter()
        .filter(|(_, field)| field(&customer).is_empty())
        .map(|(name, _)| *name)
        .collect();
    if !missing.is_empty() {
        return Err(OrderError::IncompleteAddress {
            missing: missing.join(", "),
        });
    }

    let Some((first, rest)) = lines.split_first() else {
        return Err(OrderError::EmptyCart);
    };

    // The first item fixes the order's restaurant; the header is created
    // right away with a zero placeholder total.
    let first_item = lock_menu_item(tx, first).await?;
    let restaurant = tx
        .restaurant(first_item.restaurant_id)
        .await?
        .ok_or(OrderError::InvalidItem {
            item_id: first.menu_item_id,
        })?;
    if !restaurant.is_active {
        // Same message as an unknown item: the restaurant's status is not
        // leaked to the customer.
        return Err(OrderError::InvalidItem {
            item_id: first.menu_item_id,
        });
    }

    let mut order = OrderRecord {
        id: OrderId::new(),
        status: OrderStatus::InProgress,
        restaurant_id: restaurant.id,
        customer_id: customer.id,
        order_datetime: Utc::now(),
        total_amount: Money::zero(),
        address: String::new(),
        contact: String::new(),
    };
    tx.insert_order(&order).await?;

    let mut items = Vec::with_capacity(lines.len());
    items.push(reserve_line(tx, order.id, first_item, first.quantity).await?);

    for line in rest {
        let item = lock_menu_item(tx, line).await?;
        if item.restaurant_id != order.restaurant_id {
            return Err(OrderError::MixedRestaurants);
        }
        items.push(reserve_line(tx, order.id, item, line.quantity).await?);
    }

    let total = items.iter().fold(Money::zero(), |acc, item| {
        acc + item.price.multiply(item.quantity)
    });

    order.total_amount = total;
    order.contact = contact;
    order.address = customer.formatted_address();
    tx.update_order(&order).await?;

    if customer.balance < total {
        return Err(OrderError::InsufficientBalance);
    }
    customer.balance -= total;
    tx.update_customer(&customer).await?;

    Ok(OrderDetail {
        order,
        restaurant_name: restaurant.name,
        items,
    })
}

async fn lock_menu_item(
    tx: &mut dyn StorageTx,
    line: &CartLine,
) -> Result<MenuItemRecord, OrderError> {
    tx.menu_item_for_update(line.menu_item_id)
        .await?
        .ok_or(OrderError::InvalidItem {
            item_id: line.menu_item_id,
        })
}

/// Creates the line item with its price snapshot and persists the stock
/// decrement. The menu item row is already locked by the caller.
async fn reserve_line(
    tx: &mut dyn StorageTx,
    order_id: OrderId,
    item: MenuItemRecord,
    quantity: u32,
) -> Result<LineItemDetail, OrderError> {
    if quantity == 0 {
        return Err(OrderError::InvalidQuantity { item_id: item.id });
    }
    if item.quantity < quantity {
        return Err(OrderError::InsufficientQuantity {
            item_name: item.name,
        });
    }

    let record = LineItemRecord {
        id: LineItemId::new(),
        order_id,
        menu_item_id: item.id,
        price: item.price,
        quantity,
    };
    tx.insert_line_item(&record).await?;
    tx.update_menu_item_quantity(item.id, item.quantity - quantity)
        .await?;

    Ok(LineItemDetail {
        id: record.id,
        item_name: item.name,
        price: item.price,
        quantity,
    })
}
