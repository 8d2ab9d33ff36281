//! wsync-reconcile
//!
//! Offer reconciliation core.
//!
//! Given the supplier's remnants feed and the set of offer identifiers a
//! marketplace knows about, compute the exact stock and price update records
//! to push, and partition them into endpoint-sized batches.
//!
//! Deterministic, pure logic. No IO. No marketplace calls.

mod batch;
mod engine;
mod price;
mod types;

pub use batch::chunk;
pub use engine::{
    build_price_updates, build_stock_updates, reconcile, resolve_quantity, Reconciliation,
    QTY_OVER_TEN, QTY_OVER_TEN_STOCK, QTY_RESERVED, QTY_RESERVED_STOCK,
};
pub use price::normalize_price;
pub use types::*;
