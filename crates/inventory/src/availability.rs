//! Availability snapshot computation at data-load time.
//!
//! The backend sums on-hand quantities of the POS source location (children
//! included) per product and publishes the result on every storable product
//! record as `pos_available_qty`. Non-storable products get an explicit
//! `null`, and when the POS has no source location no product gets the field
//! at all, so the client never mistakes "unknown" for "zero".

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use stockguard_core::{DomainError, DomainResult, ProductId};
use stockguard_products::AVAILABLE_QTY_FIELD;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(pub u64);

impl core::fmt::Display for LocationId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Stock location hierarchy (child -> parent).
#[derive(Debug, Clone, Default)]
pub struct LocationTree {
    parents: HashMap<LocationId, Option<LocationId>>,
}

impl LocationTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, location: LocationId, parent: Option<LocationId>) {
        self.parents.insert(location, parent);
    }

    /// Whether `location` is `ancestor` or sits somewhere below it.
    pub fn is_child_of(&self, location: LocationId, ancestor: LocationId) -> bool {
        let mut seen = HashSet::new();
        let mut current = Some(location);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            if !seen.insert(id) {
                return false;
            }
            current = self.parents.get(&id).copied().flatten();
        }
        false
    }
}

/// The parts of the POS configuration the snapshot depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosStockConfig {
    pub company_id: u64,
    /// Default source location of the POS operation type.
    pub picking_source_location: Option<LocationId>,
    /// Stock location of the POS warehouse.
    pub warehouse_stock_location: Option<LocationId>,
}

impl PosStockConfig {
    pub fn source_location(&self) -> Option<LocationId> {
        self.picking_source_location.or(self.warehouse_stock_location)
    }
}

/// On-hand quantity of a product in one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quant {
    pub product_id: ProductId,
    pub location_id: LocationId,
    pub company_id: u64,
    pub quantity: f64,
}

/// On-hand quantity per product in the POS source location and its children.
///
/// `None` when the configuration has no source location.
pub fn available_by_product(
    quants: &[Quant],
    locations: &LocationTree,
    config: &PosStockConfig,
) -> Option<HashMap<ProductId, f64>> {
    let source = config.source_location()?;

    let mut totals = HashMap::new();
    for quant in quants {
        if quant.company_id != config.company_id {
            continue;
        }
        if !locations.is_child_of(quant.location_id, source) {
            continue;
        }
        *totals.entry(quant.product_id).or_insert(0.0) += quant.quantity;
    }
    Some(totals)
}

/// Publish `pos_available_qty` on loaded product records.
///
/// Storable products (`is_storable`, or the legacy `type == "product"`) get
/// their summed quantity, 0 when no quant matched; others get `null`.
pub fn annotate_products(
    records: &mut [Value],
    quants: &[Quant],
    locations: &LocationTree,
    config: &PosStockConfig,
) -> DomainResult<()> {
    if records.is_empty() {
        return Ok(());
    }
    let Some(totals) = available_by_product(quants, locations, config) else {
        tracing::warn!(
            company_id = config.company_id,
            "POS has no stock source location; availability not published"
        );
        return Ok(());
    };

    for record in records.iter_mut() {
        let map = record
            .as_object_mut()
            .ok_or_else(|| DomainError::malformed("product record must be an object"))?;
        let product_id = map
            .get("id")
            .and_then(Value::as_u64)
            .map(ProductId::new)
            .ok_or_else(|| DomainError::malformed("product record without integer `id`"))?;

        let is_storable = map.get("is_storable").and_then(Value::as_bool).unwrap_or(false)
            || map.get("type").and_then(Value::as_str) == Some("product");

        let value = if is_storable {
            Value::from(totals.get(&product_id).copied().unwrap_or(0.0))
        } else {
            Value::Null
        };
        map.insert(AVAILABLE_QTY_FIELD.to_string(), value);
    }

    Ok(())
}
