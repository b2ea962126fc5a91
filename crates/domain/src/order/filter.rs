//! Search and ordering for order listings.

use serde::Deserialize;

use super::OrderDetail;

/// Listing parameters accepted by the order list endpoints.
///
/// `search` is a case-insensitive substring match over the restaurant name,
/// item names and the formatted total. `ordering` names a sort key —
/// `total_amount`, `restaurant_name` or `order_datetime` — with a `-` prefix
/// for descending; unknown keys leave the creation-time order untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OrderListQuery {
    pub search: Option<String>,
    pub ordering: Option<String>,
}

impl OrderListQuery {
    /// Applies the query to an already-loaded listing.
    pub fn apply(&self, mut details: Vec<OrderDetail>) -> Vec<OrderDetail> {
        if let Some(term) = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
        {
            let needle = term.to_lowercase();
            details.retain(|detail| matches_search(detail, &needle));
        }

        if let Some(ordering) = self.ordering.as_deref() {
            let (key, descending) = match ordering.strip_prefix('-') {
                Some(key) => (key, true),
                None => (ordering, false),
            };
            let sorted = match key {
                "total_amount" => {
                    details.sort_by_key(|d| d.order.total_amount);
                    true
                }
                "restaurant_name" => {
                    details.sort_by(|a, b| a.restaurant_name.cmp(&b.restaurant_name));
                    true
                }
                "order_datetime" => {
                    details.sort_by_key(|d| d.order.order_datetime);
                    true
                }
                _ => false,
            };
            if sorted && descending {
                details.reverse();
            }
        }

        details
    }
}

fn matches_search(detail: &OrderDetail, needle: &str) -> bool {
    detail.restaurant_name.to_lowercase().contains(needle)
        || detail
            .items
            .iter()
            .any(|item| item.item_name.to_lowercase().contains(needle))
        || detail.order.total_amount.to_string().contains(needle)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use common::{CustomerId, LineItemId, Money, OrderId, OrderStatus, RestaurantId};
    use store::{LineItemDetail, OrderRecord};

    use super::*;

    fn detail(restaurant: &str, item: &str, total_cents: i64) -> OrderDetail {
        OrderDetail {
            order: OrderRecord {
                id: OrderId::new(),
                status: OrderStatus::InProgress,
                restaurant_id: RestaurantId::new(),
                customer_id: CustomerId::new(),
                order_datetime: Utc::now(),
                total_amount: Money::from_cents(total_cents),
                address: String::new(),
                contact: String::new(),
            },
            restaurant_name: restaurant.to_string(),
            items: vec![LineItemDetail {
                id: LineItemId::new(),
                item_name: item.to_string(),
                price: Money::from_cents(total_cents),
                quantity: 1,
            }],
        }
    }

    #[test]
    fn search_matches_restaurant_and_item_names() {
        let listing = vec![
            detail("Pasta Place", "Carbonara", 1200),
            detail("Burger Barn", "Smash Burger", 900),
        ];

        let query = OrderListQuery {
            search: Some("pasta".to_string()),
            ordering: None,
        };
        let filtered = query.apply(listing.clone());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].restaurant_name, "Pasta Place");

        let query = OrderListQuery {
            search: Some("burger".to_string()),
            ordering: None,
        };
        assert_eq!(query.apply(listing).len(), 1);
    }

    #[test]
    fn search_matches_total_display() {
        let listing = vec![detail("Pasta Place", "Carbonara", 1234)];
        let query = OrderListQuery {
            search: Some("$12.34".to_string()),
            ordering: None,
        };
        assert_eq!(query.apply(listing).len(), 1);
    }

    #[test]
    fn blank_search_is_ignored() {
        let listing = vec![detail("Pasta Place", "Carbonara", 1200)];
        let query = OrderListQuery {
            search: Some("   ".to_string()),
            ordering: None,
        };
        assert_eq!(query.apply(listing).len(), 1);
    }

    #[test]
    fn ordering_by_total_and_descending() {
        let listing = vec![
            detail("A", "x", 3000),
            detail("B", "y", 1000),
            detail("C", "z", 2000),
        ];

        let query = OrderListQuery {
            search: None,
            ordering: Some("total_amount".to_string()),
        };
        let sorted = query.apply(listing.clone());
        let totals: Vec<i64> = sorted.iter().map(|d| d.order.total_amount.cents()).collect();
        assert_eq!(totals, vec![1000, 2000, 3000]);

        let query = OrderListQuery {
            search: None,
            ordering: Some("-total_amount".to_string()),
        };
        let sorted = query.apply(listing);
        let totals: Vec<i64> = sorted.iter().map(|d| d.order.total_amount.cents()).collect();
        assert_eq!(totals, vec![3000, 2000, 1000]);
    }

    #[test]
    fn unknown_ordering_key_keeps_input_order() {
        let listing = vec![detail("A", "x", 3000), detail("B", "y", 1000)];
        let query = OrderListQuery {
            search: None,
            ordering: Some("-bogus".to_string()),
        };
        let sorted = query.apply(listing);
        assert_eq!(sorted[0].restaurant_name, "A");
        assert_eq!(sorted[1].restaurant_name, "B");
    }
}
