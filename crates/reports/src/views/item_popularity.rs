//! Item popularity report — distinct customers per menu item.

use std::collections::{BTreeMap, HashSet};

use common::{CustomerId, RestaurantId};
use serde::Serialize;
use store::Storage;

use crate::Result;

/// Distinct-customer count for one menu item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemPopularity {
    pub item: String,
    pub orders: u64,
}

/// Counts, per item name, how many distinct customers have ordered it.
/// Results are sorted ascending by count, then by item name.
pub async fn item_popularity<S: Storage>(
    storage: &S,
    restaurant_id: RestaurantId,
) -> Result<Vec<ItemPopularity>> {
    let orders = storage.orders_for_restaurant(restaurant_id).await?;

    let mut buyers: BTreeMap<String, HashSet<CustomerId>> = BTreeMap::new();
    for order in orders {
        for item in storage.line_items_for_order(order.id).await? {
            buyers
                .entry(item.item_name)
                .or_default()
                .insert(order.customer_id);
        }
    }

    let mut popularity: Vec<ItemPopularity> = buyers
        .into_iter()
        .map(|(item, customers)| ItemPopularity {
            item,
            orders: customers.len() as u64,
        })
        .collect();
    popularity.sort_by(|a, b| a.orders.cmp(&b.orders).then_with(|| a.item.cmp(&b.item)));

    Ok(popularity)
}
