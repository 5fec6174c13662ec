//! Stock availability module.
//!
//! This crate contains the stock guard policy consulted before an order's
//! committed quantities grow, the post-sale decrement of the cached
//! availability snapshot, and the backend computation that produces that
//! snapshot. Pure domain logic: no IO, no dialogs.

pub mod availability;
pub mod guard;
pub mod snapshot;

pub use availability::{
    LocationId, LocationTree, PosStockConfig, Quant, annotate_products, available_by_product,
};
pub use guard::{Decision, DEFAULT_EPSILON, GuardSettings, StockGuard, Violation};
pub use snapshot::{StockDecrement, apply_sale};
