use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use stockguard_core::{DomainError, DomainResult, ProductId};

/// Key under which the backend publishes the available quantity of a product
/// at the POS stock location.
pub const AVAILABLE_QTY_FIELD: &str = "pos_available_qty";

/// Product type as published by the backend.
///
/// `Product` is the legacy "storable" type; newer backends publish `Consu`
/// together with an explicit `is_storable` flag instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    #[default]
    Consu,
    Service,
    Combo,
    Product,
}

impl ProductType {
    fn from_field(value: &str) -> Self {
        match value {
            "service" => ProductType::Service,
            "combo" => ProductType::Combo,
            "product" => ProductType::Product,
            _ => ProductType::Consu,
        }
    }
}

/// Product as loaded into the POS session.
///
/// The available quantity can live in two places: a direct attribute and the
/// raw backing record the product was built from. Always go through
/// [`Product::resolve_available_quantity`] and
/// [`Product::write_available_quantity`] so readers and writers agree.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    id: ProductId,
    name: String,
    display_name: Option<String>,
    product_type: ProductType,
    is_storable: bool,
    available_qty: Option<f64>,
    raw: Option<Map<String, Value>>,
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            display_name: None,
            product_type: ProductType::default(),
            is_storable: false,
            available_qty: None,
            raw: None,
        }
    }

    /// Build a product from a raw record as published by the backend.
    ///
    /// The record is kept as the raw mirror; the direct availability attribute
    /// stays unset until something writes it.
    pub fn from_record(record: Map<String, Value>) -> DomainResult<Self> {
        let id = record
            .get("id")
            .and_then(Value::as_u64)
            .map(ProductId::new)
            .ok_or_else(|| DomainError::malformed("product record without integer `id`"))?;

        let name = record
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let display_name = record
            .get("display_name")
            .and_then(Value::as_str)
            .map(str::to_string);
        let product_type = record
            .get("type")
            .and_then(Value::as_str)
            .map(ProductType::from_field)
            .unwrap_or_default();
        let is_storable = record
            .get("is_storable")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        Ok(Self {
            id,
            name,
            display_name,
            product_type,
            is_storable,
            available_qty: None,
            raw: Some(record),
        })
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_type(mut self, product_type: ProductType) -> Self {
        self.product_type = product_type;
        self
    }

    pub fn storable(mut self, is_storable: bool) -> Self {
        self.is_storable = is_storable;
        self
    }

    pub fn with_available_qty(mut self, qty: Option<f64>) -> Self {
        self.available_qty = qty;
        self
    }

    pub fn with_raw(mut self, raw: Map<String, Value>) -> Self {
        self.raw = Some(raw);
        self
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Name shown to the cashier: display name, falling back to the internal name.
    pub fn label(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.name,
        }
    }

    pub fn product_type(&self) -> ProductType {
        self.product_type
    }

    /// Whether inventory is tracked for this product.
    pub fn is_storable(&self) -> bool {
        self.is_storable || self.product_type == ProductType::Product
    }

    pub fn raw(&self) -> Option<&Map<String, Value>> {
        self.raw.as_ref()
    }

    /// Cached available quantity, from the direct attribute or the raw mirror.
    ///
    /// `None` means the product is not tracked at the POS location, which is
    /// different from zero stock.
    pub fn resolve_available_quantity(&self) -> Option<f64> {
        self.available_qty.or_else(|| {
            self.raw
                .as_ref()
                .and_then(|raw| raw.get(AVAILABLE_QTY_FIELD))
                .and_then(Value::as_f64)
        })
    }

    /// Available quantity the stock guard applies to, if any.
    pub fn tracked_available(&self) -> Option<f64> {
        if !self.is_storable() {
            return None;
        }
        self.resolve_available_quantity()
    }

    /// Overwrite the cached available quantity in every location it is cached.
    pub fn write_available_quantity(&mut self, qty: f64) {
        self.available_qty = Some(qty);
        if let Some(raw) = self.raw.as_mut() {
            raw.insert(AVAILABLE_QTY_FIELD.to_string(), Value::from(qty));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test record must be an object"),
        }
    }

    #[test]
    fn from_record_reads_identity_and_classification() {
        let product = Product::from_record(record(json!({
            "id": 7,
            "name": "Cola",
            "display_name": "[C01] Cola",
            "type": "consu",
            "is_storable": true,
            "pos_available_qty": 12.0,
        })))
        .unwrap();

        assert_eq!(product.id_typed(), ProductId::new(7));
        assert_eq!(product.label(), "[C01] Cola");
        assert!(product.is_storable());
        assert_eq!(product.resolve_available_quantity(), Some(12.0));
    }

    #[test]
    fn from_record_rejects_missing_id() {
        let err = Product::from_record(record(json!({ "name": "Cola" }))).unwrap_err();
        match err {
            DomainError::Malformed(_) => {}
            other => panic!("Expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn legacy_product_type_counts_as_storable() {
        let product = Product::new(ProductId::new(1), "Chair").with_type(ProductType::Product);
        assert!(product.is_storable());

        let service = Product::new(ProductId::new(2), "Repair").with_type(ProductType::Service);
        assert!(!service.is_storable());
    }

    #[test]
    fn label_falls_back_to_internal_name() {
        let product = Product::new(ProductId::new(1), "chair");
        assert_eq!(product.label(), "chair");

        let empty_display = Product::new(ProductId::new(1), "chair").with_display_name("");
        assert_eq!(empty_display.label(), "chair");
    }

    #[test]
    fn null_availability_is_absent_not_zero() {
        let product = Product::from_record(record(json!({
            "id": 3,
            "name": "Gift wrap",
            "is_storable": true,
            "pos_available_qty": null,
        })))
        .unwrap();

        assert_eq!(product.resolve_available_quantity(), None);
        assert_eq!(product.tracked_available(), None);
    }

    #[test]
    fn direct_attribute_wins_over_raw_mirror() {
        let product = Product::new(ProductId::new(1), "Cola")
            .with_raw(record(json!({ "pos_available_qty": 3.0 })))
            .with_available_qty(Some(8.0));

        assert_eq!(product.resolve_available_quantity(), Some(8.0));
    }

    #[test]
    fn non_storable_product_is_not_tracked() {
        let product = Product::new(ProductId::new(1), "Coffee").with_available_qty(Some(0.0));
        assert_eq!(product.tracked_available(), None);
    }

    #[test]
    fn write_updates_direct_attribute_and_raw_mirror() {
        let mut product = Product::from_record(record(json!({
            "id": 1,
            "name": "Cola",
            "is_storable": true,
            "pos_available_qty": 5.0,
        })))
        .unwrap();

        product.write_available_quantity(2.0);

        assert_eq!(product.resolve_available_quantity(), Some(2.0));
        let mirrored = product
            .raw()
            .and_then(|raw| raw.get(AVAILABLE_QTY_FIELD))
            .and_then(Value::as_f64);
        assert_eq!(mirrored, Some(2.0));
    }

    #[test]
    fn write_without_raw_record_sets_direct_attribute_only() {
        let mut product = Product::new(ProductId::new(1), "Cola").storable(true);
        product.write_available_quantity(4.0);

        assert!(product.raw().is_none());
        assert_eq!(product.tracked_available(), Some(4.0));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: after a write, both cache locations hold the written value.
            #[test]
            fn write_keeps_cache_locations_in_sync(
                initial in 0.0f64..10_000.0,
                written in 0.0f64..10_000.0,
            ) {
                let mut product = Product::from_record(record(json!({
                    "id": 1,
                    "name": "Cola",
                    "is_storable": true,
                    "pos_available_qty": initial,
                })))
                .unwrap();

                product.write_available_quantity(written);

                let mirrored = product
                    .raw()
                    .and_then(|raw| raw.get(AVAILABLE_QTY_FIELD))
                    .and_then(Value::as_f64);
                prop_assert_eq!(product.resolve_available_quantity(), Some(written));
                prop_assert_eq!(mirrored, Some(written));
            }
        }
    }
}
