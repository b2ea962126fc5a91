//! Order status transition.
//!
//! Applies a requested status under an exclusive lock on the order row.
//! Customers may only cancel their own in-progress orders; the restaurant
//! owner may set any status on orders that are not yet terminal. Cancelling
//! credits the full order total back to the customer's balance in the same
//! transaction. Stock reserved by the order is not restored.

use common::{CustomerId, OrderId, OrderStatus};
use store::{OrderRecord, Storage, StorageTx};

use super::OrderError;

pub(super) async fn update_status<S: Storage>(
    storage: &S,
    actor_id: CustomerId,
    order_id: OrderId,
    new_status: OrderStatus,
) -> Result<OrderRecord, OrderError> {
    let mut tx = storage.begin().await?;
    match apply_transition(tx.as_mut(), actor_id, order_id, new_status).await {
        Ok(order) => {
            tx.commit().await?;
            Ok(order)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!(error = %rollback_err, "rollback failed after transition error");
            }
            Err(err)
        }
    }
}

async fn apply_transition(
    tx: &mut dyn StorageTx,
    actor_id: CustomerId,
    order_id: OrderId,
    new_status: OrderStatus,
) -> Result<OrderRecord, OrderError> {
    let mut order = tx
        .order_for_update(order_id)
        .await?
        .ok_or(OrderError::OrderNotFound { order_id })?;

    let restaurant = tx
        .restaurant(order.restaurant_id)
        .await?
        .ok_or(OrderError::OrderNotFound { order_id })?;

    let is_owner = restaurant.owner_id == actor_id;
    if !is_owner && order.customer_id != actor_id {
        return Err(OrderError::Forbidden);
    }

    if order.status.is_terminal() {
        return Err(OrderError::NotUpdatable {
            current: order.status,
        });
    }

    if !is_owner {
        // The customer path: only in-progress orders, only to Cancelled.
        if order.status != OrderStatus::InProgress {
            return Err(OrderError::NotUpdatable {
                current: order.status,
            });
        }
        if new_status != OrderStatus::Cancelled {
            return Err(OrderError::CustomerOnlyCancel);
        }
    }

    order.status = new_status;

    if new_status == OrderStatus::Cancelled {
        // Full refund regardless of fulfillment progress.
        let mut customer = tx
            .customer_for_update(order.customer_id)
            .await?
            .ok_or(OrderError::CustomerNotFound {
                customer_id: order.customer_id,
            })?;
        customer.balance += order.total_amount;
        tx.update_customer(&customer).await?;
    }

    tx.update_order(&order).await?;
    Ok(order)
}
