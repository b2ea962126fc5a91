//! Customer favorites report — each customer's most-ordered item.

use std::collections::{BTreeMap, HashMap};

use common::{CustomerId, RestaurantId};
use serde::Serialize;
use store::Storage;

use crate::Result;

/// The item a customer has ordered most at a restaurant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerFavorite {
    pub email: String,
    pub item_name: String,
    pub item_count: u64,
}

/// Picks, per customer email, the item appearing on the most of their order
/// lines (ties broken by item name). Results are sorted by email.
pub async fn customer_favorites<S: Storage>(
    storage: &S,
    restaurant_id: RestaurantId,
) -> Result<Vec<CustomerFavorite>> {
    let orders = storage.orders_for_restaurant(restaurant_id).await?;

    let mut emails: HashMap<CustomerId, String> = HashMap::new();
    // email -> item name -> number of order lines
    let mut counts: BTreeMap<String, BTreeMap<String, u64>> = BTreeMap::new();

    for order in orders {
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

        for item in storage.line_items_for_order(order.id).await? {
            *counts
                .entry(email.clone())
                .or_default()
                .entry(item.item_name)
                .or_insert(0) += 1;
        }
    }

    let favorites = counts
        .into_iter()
        .filter_map(|(email, items)| {
            // BTreeMap iterates names in order, so the strict comparison
            // keeps the alphabetically first name on ties.
            items
                .into_iter()
                .fold(None::<(String, u64)>, |best, (name, count)| match best {
                    Some((_, best_count)) if best_count >= count => best,
                    _ => Some((name, count)),
                })
                .map(|(item_name, item_count)| CustomerFavorite {
                    email,
                    item_name,
                    item_count,
                })
        })
        .collect();

    Ok(favorites)
}
