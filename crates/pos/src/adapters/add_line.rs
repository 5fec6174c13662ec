//! Add-to-order entry point.

use stockguard_core::{LineId, ProductId};
use stockguard_inventory::Decision;
use stockguard_products::ProductRef;
use stockguard_sales::Order;

use super::PosStockGuard;
use crate::i18n;
use crate::session::PosSession;

#[derive(Debug, Clone, PartialEq)]
pub struct AddLineOptions {
    /// Requested quantity; 1 when unspecified.
    pub quantity: Option<f64>,
    /// Let the host fold the quantity into an existing line.
    pub merge: bool,
}

impl Default for AddLineOptions {
    fn default() -> Self {
        Self {
            quantity: None,
            merge: true,
        }
    }
}

impl AddLineOptions {
    pub fn quantity(quantity: f64) -> Self {
        Self {
            quantity: Some(quantity),
            ..Self::default()
        }
    }

    pub fn requested(&self) -> f64 {
        self.quantity.unwrap_or(1.0)
    }
}

impl PosStockGuard {
    /// Guarded add-to-order.
    ///
    /// A blocked request shows a dialog and returns `None` without creating
    /// an order or a line. Otherwise the current order (created on demand) is
    /// handed to `next`, which owns line creation and merging.
    pub fn add_line<F>(
        &self,
        session: &mut PosSession,
        product: ProductRef,
        options: AddLineOptions,
        next: F,
    ) -> Option<LineId>
    where
        F: FnOnce(&mut Order, ProductId, &AddLineOptions) -> Option<LineId>,
    {
        let product_id = product.product_id();

        match session.products().resolve(&product) {
            Some(resolved) => {
                let decision =
                    self.guard
                        .check_addition(session.current_order(), resolved, options.quantity);
                if let Decision::Block(violation) = decision {
                    tracing::warn!(
                        %product_id,
                        requested = violation.requested,
                        available = violation.available,
                        "add to order blocked: not enough stock"
                    );
                    self.alert_violation(i18n::ADD_LINE_BODY, &violation);
                    return None;
                }
            }
            None => {
                tracing::debug!(%product_id, "product not in snapshot; stock check skipped");
            }
        }

        let order = session.get_or_create_order();
        next(order, product_id, &options)
    }
}
