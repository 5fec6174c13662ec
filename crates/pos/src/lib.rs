//! POS call-site adapters for the stock guard.
//!
//! Each adapter wraps one extension point of the host POS client: it consults
//! the [`StockGuard`](stockguard_inventory::StockGuard) and either blocks the
//! action (dialog or [`Rejection`]) or hands control to the host's own
//! behavior, passed in as a `next` delegate.
//!
//! - payment validation: host checks first, then the stock check
//! - quantity change and line merge: stock check first, then the host
//! - add-to-order: stock check first, then the host
//! - after a paid, synced validation: host continuation first, then the
//!   availability snapshot is decremented

pub mod adapters;
pub mod config;
pub mod host;
pub mod i18n;
pub mod session;

pub use adapters::PosStockGuard;
pub use adapters::add_line::AddLineOptions;
pub use adapters::quantity::QuantityInput;
pub use config::GuardConfig;
pub use host::{DefaultNumberParser, Dialogs, NumberParser, PaymentHost, Rejection};
pub use i18n::{Locale, Translator};
pub use session::PosSession;
