//! Product snapshot module.
//!
//! Products as the POS client sees them after data loading: identity, display
//! name, storable classification and the cached available quantity for the POS
//! stock location. No IO; the snapshot is handed in by the host.

pub mod index;
pub mod product;

pub use index::{ProductIndex, ProductRef};
pub use product::{AVAILABLE_QTY_FIELD, Product, ProductType};
