//! Storage layer for the food-ordering service.
//!
//! The order workflows are check-then-act sequences (stock check then
//! decrement, balance check then debit), so every row they read and then
//! write must be held under an exclusive lock inside one atomic transaction.
//! [`Storage::begin`] opens that transaction scope as a [`StorageTx`] handle;
//! dropping the handle without committing discards all of its writes.
//!
//! Two implementations share the contract: [`PostgresStorage`] (row locks via
//! `SELECT … FOR UPDATE`) and [`InMemoryStorage`] (transactions serialized
//! behind a single mutex), so domain logic and tests run against either.

mod error;
mod memory;
mod postgres;
mod records;
mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryStorage;
pub use postgres::PostgresStorage;
pub use records::{
    CustomerRecord, LineItemDetail, LineItemRecord, MenuItemRecord, OrderRecord, RestaurantRecord,
};
pub use store::{Storage, StorageTx};
