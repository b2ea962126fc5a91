//! Customer spends report — total spent per customer at a restaurant.

use std::collections::{BTreeMap, HashMap};

use common::{CustomerId, Money, RestaurantId};
use serde::Serialize;
use store::Storage;

use crate::{DateRange, Result};

/// Total order spend for one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerSpend {
    pub user_email: String,
    pub total_amount_spent: Money,
}

/// Sums order totals per customer email, optionally restricted to an
/// inclusive date range. Results are sorted by email.
pub async fn customer_spends<S: Storage>(
    storage: &S,
    restaurant_id: RestaurantId,
    range: Option<DateRange>,
) -> Result<Vec<CustomerSpend>> {
    let orders = storage.orders_for_restaurant(restaurant_id).await?;

    let mut emails: HashMap<CustomerId, String> = HashMap::new();
    let mut totals: BTreeMap<String, Money> = BTreeMap::new();

    for order in orders {
        if let Some(range) = &range
            && !range.contains(order.order_datetime)
        {
            continue;
        }

        let email = match emails.get(&order.customer_id) {
            Some(email) => email.clone(),
            None => {
                let email = storage
                    .customer(order.customer_id)
                    .await?
                    .map(|c| c.email)
                    .unwrap_or_default();
                emails.insert(order.customer_id, email.clone());
                email
            }
        };

        *totals.entry(email).or_insert_with(Money::zero) += order.total_amount;
    }

    Ok(totals
        .into_iter()
        .map(|(user_email, total_amount_spent)| CustomerSpend {
            user_email,
            total_amount_spent,
        })
        .collect())
}
