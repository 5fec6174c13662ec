//! POS order module.
//!
//! Orders and order lines as held by the POS client, together with the default
//! line mutations the client performs (add, set quantity, merge) and the
//! per-product quantity aggregation the stock guard reads.

pub mod order;

pub use order::{Order, OrderLine, OrderState, SyncState};
