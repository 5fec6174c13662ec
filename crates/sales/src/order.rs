use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use stockguard_core::{DomainError, DomainResult, LineId, OrderId, ProductId};

/// Order state lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderState {
    #[default]
    Draft,
    Paid,
}

/// Outcome of pushing the order to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    #[default]
    Pending,
    Synced,
    Failed,
}

/// Order line: product and quantity.
///
/// Negative quantities are refunds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    id: LineId,
    product_id: ProductId,
    quantity: f64,
}

impl OrderLine {
    pub fn new(product_id: ProductId, quantity: f64) -> Self {
        Self {
            id: LineId::new(),
            product_id,
            quantity,
        }
    }

    pub fn id_typed(&self) -> LineId {
        self.id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }
}

/// POS order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    state: OrderState,
    sync: SyncState,
    lines: Vec<OrderLine>,
}

impl Default for Order {
    fn default() -> Self {
        Self::new()
    }
}

impl Order {
    pub fn new() -> Self {
        Self {
            id: OrderId::new(),
            state: OrderState::Draft,
            sync: SyncState::Pending,
            lines: Vec::new(),
        }
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn state(&self) -> OrderState {
        self.state
    }

    pub fn sync_state(&self) -> SyncState {
        self.sync
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn line(&self, line_id: LineId) -> Option<&OrderLine> {
        self.lines.iter().find(|line| line.id == line_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn is_modifiable(&self) -> bool {
        matches!(self.state, OrderState::Draft)
    }

    /// Paid and pushed to the backend.
    pub fn is_paid_and_synced(&self) -> bool {
        self.state == OrderState::Paid && self.sync == SyncState::Synced
    }

    pub fn mark_paid(&mut self) {
        self.state = OrderState::Paid;
    }

    pub fn set_sync_state(&mut self, sync: SyncState) {
        self.sync = sync;
    }

    /// Sum of line quantities for `product_id`, skipping the lines in `excluded`.
    pub fn quantity_for_product(&self, product_id: ProductId, excluded: &HashSet<LineId>) -> f64 {
        self.lines
            .iter()
            .filter(|line| line.product_id == product_id && !excluded.contains(&line.id))
            .map(|line| line.quantity)
            .sum()
    }

    /// Total quantity per product across all lines, in ascending product id order.
    pub fn quantities_by_product(&self) -> BTreeMap<ProductId, f64> {
        let mut totals = BTreeMap::new();
        for line in &self.lines {
            *totals.entry(line.product_id).or_insert(0.0) += line.quantity;
        }
        totals
    }

    /// Add `quantity` of a product, merging into the last line when it is for
    /// the same product and `merge` is set. Returns the line that holds it.
    pub fn add_product(
        &mut self,
        product_id: ProductId,
        quantity: f64,
        merge: bool,
    ) -> DomainResult<LineId> {
        self.ensure_modifiable()?;
        ensure_finite(quantity)?;

        if merge {
            if let Some(last) = self.lines.last_mut() {
                if last.product_id == product_id {
                    last.quantity += quantity;
                    return Ok(last.id);
                }
            }
        }

        let line = OrderLine::new(product_id, quantity);
        let id = line.id;
        self.lines.push(line);
        Ok(id)
    }

    pub fn set_line_quantity(&mut self, line_id: LineId, quantity: f64) -> DomainResult<()> {
        self.ensure_modifiable()?;
        ensure_finite(quantity)?;

        let line = self.line_mut(line_id)?;
        line.quantity = quantity;
        Ok(())
    }

    /// Fold `source` into `target`: the quantities are added and the source line
    /// is dropped.
    pub fn merge_lines(&mut self, target: LineId, source: LineId) -> DomainResult<()> {
        self.ensure_modifiable()?;
        if target == source {
            return Err(DomainError::invariant("cannot merge a line into itself"));
        }

        let source_line = self
            .line(source)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("order line {source}")))?;
        let target_line = self.line_mut(target)?;
        if target_line.product_id != source_line.product_id {
            return Err(DomainError::invariant(
                "only lines of the same product can be merged",
            ));
        }

        target_line.quantity += source_line.quantity;
        self.lines.retain(|line| line.id != source);
        Ok(())
    }

    fn line_mut(&mut self, line_id: LineId) -> DomainResult<&mut OrderLine> {
        self.lines
            .iter_mut()
            .find(|line| line.id == line_id)
            .ok_or_else(|| DomainError::not_found(format!("order line {line_id}")))
    }

    fn ensure_modifiable(&self) -> DomainResult<()> {
        if !self.is_modifiable() {
            return Err(DomainError::invariant(
                "cannot modify order once it is paid",
            ));
        }
        Ok(())
    }
}

fn ensure_finite(quantity: f64) -> DomainResult<()> {
    if !quantity.is_finite() {
        return Err(DomainError::validation("quantity must be a finite number"));
    }
    Ok(())
}
