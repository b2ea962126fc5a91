//! Domain layer for the food-ordering service.
//!
//! This crate owns the two transactional workflows with real invariants:
//! - order placement: validate the cart, lock inventory and balance, create
//!   the order aggregate and debit the customer as one atomic unit;
//! - status transition: enforce the per-role state machine and credit the
//!   balance back on cancellation.
//!
//! Everything runs against the [`store::Storage`] contract, so the same
//! logic drives PostgreSQL in production and in-memory storage in tests.

pub mod order;

pub use order::{CartLine, OrderDetail, OrderError, OrderListQuery, OrderService};
