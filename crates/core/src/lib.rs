//! `stockguard-core`: shared building blocks for the POS stock guard.
//!
//! This crate contains **pure domain** primitives (no host or IO concerns).

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{LineId, OrderId, ProductId};
