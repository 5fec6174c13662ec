//! Payment validation and the post-validation stock update.

use chrono::Utc;

use stockguard_core::{DomainError, OrderId};
use stockguard_inventory::{StockDecrement, apply_sale};

use super::PosStockGuard;
use crate::host::PaymentHost;
use crate::i18n;
use crate::session::PosSession;

impl PosStockGuard {
    /// Guarded order validation.
    ///
    /// The host's own checks run first; the stock check only runs when they
    /// pass. All violating products are reported together in one dialog and
    /// the whole validation fails. An order the session does not hold fails
    /// without a dialog.
    pub async fn validate_order<H>(&self, session: &PosSession, order_id: OrderId, host: &H) -> bool
    where
        H: PaymentHost + ?Sized,
    {
        let Some(order) = session.order(order_id) else {
            tracing::debug!(%order_id, "order not in session; validation failed");
            return false;
        };

        if !host.validate_order(order).await {
            tracing::debug!(%order_id, "host validation failed; stock check skipped");
            return false;
        }

        let violations = self.guard.check_order(order, session.products());
        if violations.is_empty() {
            return true;
        }

        tracing::warn!(
            %order_id,
            violations = violations.len(),
            "payment blocked: not enough stock"
        );

        let line_template = self.translate(i18n::PAYMENT_LINE);
        let mut body = self.translate(i18n::PAYMENT_HEADER);
        for violation in &violations {
            body.push('\n');
            body.push_str(&i18n::fill(&line_template, violation));
        }
        self.dialogs
            .alert(&self.translate(i18n::TITLE_NOT_ENOUGH_STOCK), &body);

        false
    }

    /// Run the host's post-validation continuation, then decrement the cached
    /// availability by what the order sold, if the order ended up paid and
    /// synced.
    ///
    /// Errors from the host are returned unchanged and leave the snapshot
    /// untouched.
    pub async fn finalize_validation<H>(
        &self,
        session: &mut PosSession,
        order_id: OrderId,
        host: &H,
    ) -> anyhow::Result<Vec<StockDecrement>>
    where
        H: PaymentHost + ?Sized,
    {
        let (order, products) = session
            .order_with_products_mut(order_id)
            .ok_or_else(|| DomainError::not_found(format!("order {order_id}")))?;

        host.finalize_validation(order).await?;

        if !order.is_paid_and_synced() {
            tracing::debug!(
                %order_id,
                state = ?order.state(),
                sync = ?order.sync_state(),
                "order not paid and synced; stock snapshot unchanged"
            );
            return Ok(Vec::new());
        }

        Ok(apply_sale(order, products, Utc::now()))
    }
}
