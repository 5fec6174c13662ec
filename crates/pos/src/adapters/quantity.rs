//! Line quantity setter and line merge.

use std::collections::HashSet;

use stockguard_core::LineId;
use stockguard_inventory::Decision;
use stockguard_products::ProductIndex;
use stockguard_sales::Order;

use super::PosStockGuard;
use crate::host::Rejection;
use crate::i18n;

/// New quantity as entered: a number, or text from the numpad.
#[derive(Debug, Clone, PartialEq)]
pub enum QuantityInput {
    Number(f64),
    Text(String),
}

impl From<f64> for QuantityInput {
    fn from(value: f64) -> Self {
        QuantityInput::Number(value)
    }
}

impl From<&str> for QuantityInput {
    fn from(value: &str) -> Self {
        QuantityInput::Text(value.to_string())
    }
}

impl From<String> for QuantityInput {
    fn from(value: String) -> Self {
        QuantityInput::Text(value)
    }
}

impl PosStockGuard {
    /// Numeric target of a quantity input. Empty text clears the line (0);
    /// unparsable text yields `None`, which [`Self::set_quantity`] rejects.
    pub fn target_quantity(&self, input: &QuantityInput) -> Option<f64> {
        match input {
            QuantityInput::Number(value) => Some(*value),
            QuantityInput::Text(text) if text.trim().is_empty() => Some(0.0),
            QuantityInput::Text(text) => self.parser.parse(text),
        }
    }

    /// Guarded quantity change of one line.
    ///
    /// A blocked change returns a [`Rejection`] and `next` is never called, so
    /// none of the host's own side effects (rounding, refunds, prices) run.
    /// Text the parser cannot read is rejected the same way: a quantity the
    /// guard cannot evaluate never reaches the host.
    pub fn set_quantity<F>(
        &self,
        order: &mut Order,
        products: &ProductIndex,
        line_id: LineId,
        input: QuantityInput,
        next: F,
    ) -> Result<(), Rejection>
    where
        F: FnOnce(&mut Order, LineId, QuantityInput) -> Result<(), Rejection>,
    {
        let Some(quantity) = self.target_quantity(&input) else {
            tracing::warn!(%line_id, ?input, "quantity change rejected: unparsable quantity");
            let text = match &input {
                QuantityInput::Text(text) => text.as_str(),
                QuantityInput::Number(_) => "",
            };
            return Err(self.invalid_quantity(text));
        };

        let decision =
            self.guard
                .check_quantity_change(order, products, line_id, quantity, &HashSet::new());
        if let Decision::Block(violation) = decision {
            tracing::warn!(
                %line_id,
                product_id = %violation.product_id,
                requested = violation.requested,
                available = violation.available,
                "quantity change blocked: not enough stock"
            );
            return Err(self.rejection(i18n::QUANTITY_BODY, &violation));
        }

        next(order, line_id, input)
    }

    /// Guarded merge of `source` into `target`.
    ///
    /// The merged quantity is checked as a quantity change of `target` with
    /// `source` excluded from the other lines, so the source quantity is
    /// counted once, inside the merged total.
    pub fn merge_lines<F>(
        &self,
        order: &mut Order,
        products: &ProductIndex,
        target: LineId,
        source: LineId,
        next: F,
    ) -> Result<(), Rejection>
    where
        F: FnOnce(&mut Order, LineId, LineId) -> Result<(), Rejection>,
    {
        let merged = match (order.line(target), order.line(source)) {
            (Some(target_line), Some(source_line)) => {
                Some(target_line.quantity() + source_line.quantity())
            }
            _ => None,
        };

        if let Some(quantity) = merged {
            let excluded = HashSet::from([source]);
            let decision =
                self.guard
                    .check_quantity_change(order, products, target, quantity, &excluded);
            if let Decision::Block(violation) = decision {
                tracing::warn!(
                    %target,
                    %source,
                    product_id = %violation.product_id,
                    requested = violation.requested,
                    "line merge blocked: not enough stock"
                );
                return Err(self.rejection(i18n::QUANTITY_BODY, &violation));
            }
        }

        next(order, target, source)
    }
}
