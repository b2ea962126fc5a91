//! Report views over a restaurant's order history.

mod customer_favorites;
mod customer_spends;
mod item_popularity;

pub use customer_favorites::{CustomerFavorite, customer_favorites};
pub use customer_spends::{CustomerSpend, customer_spends};
pub use item_popularity::{ItemPopularity, item_popularity};
