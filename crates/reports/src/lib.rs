//! Read-only sales reports over order history.
//!
//! Every view here consumes committed order data through the
//! [`store::Storage`] read methods and never mutates anything; cancelled
//! orders remain part of the history and are included.

mod date_range;
mod error;
pub mod views;

pub use date_range::DateRange;
pub use error::{ReportError, Result};
pub use views::{
    CustomerFavorite, CustomerSpend, ItemPopularity, customer_favorites, customer_spends,
    item_popularity,
};
