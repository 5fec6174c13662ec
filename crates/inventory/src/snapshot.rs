//! Post-sale update of the cached availability snapshot.

use chrono::{DateTime, Utc};
use serde::Serialize;

use stockguard_core::ProductId;
use stockguard_products::ProductIndex;
use stockguard_sales::Order;

/// One decrement applied to a product's cached available quantity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockDecrement {
    pub product_id: ProductId,
    pub product_name: String,
    pub before: f64,
    pub after: f64,
    pub sold: f64,
    pub occurred_at: DateTime<Utc>,
}

impl core::fmt::Display for StockDecrement {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}/{}: {} -> {} (sold: {})",
            self.product_name, self.product_id, self.before, self.after, self.sold
        )
    }
}

/// Subtract the quantities sold by `order` from the cached availability of
/// every storable, tracked product it contains. New values are floored at zero
/// and written to every cache location of the product.
///
/// Unconditional: callers decide when a sale is final.
pub fn apply_sale(
    order: &Order,
    products: &mut ProductIndex,
    occurred_at: DateTime<Utc>,
) -> Vec<StockDecrement> {
    let mut applied = Vec::new();
    let snapshot_loaded_at = products.loaded_at();

    for (product_id, sold) in order.quantities_by_product() {
        if sold <= 0.0 {
            continue;
        }
        let Some(product) = products.get_mut(product_id) else {
            continue;
        };
        let Some(before) = product.tracked_available() else {
            continue;
        };

        let after = (before - sold).max(0.0);
        product.write_available_quantity(after);

        let decrement = StockDecrement {
            product_id,
            product_name: product.label().to_string(),
            before,
            after,
            sold,
            occurred_at,
        };
        tracing::info!(
            %product_id,
            before,
            after,
            sold,
            %snapshot_loaded_at,
            "stock snapshot decremented: {decrement}"
        );
        applied.push(decrement);
    }

    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use stockguard_products::{AVAILABLE_QTY_FIELD, Product};

    fn tracked(id: u64, available: f64) -> Product {
        Product::new(ProductId::new(id), format!("P{id}"))
            .storable(true)
            .with_available_qty(Some(available))
    }

    fn available(products: &ProductIndex, id: u64) -> Option<f64> {
        products
            .get(ProductId::new(id))
            .and_then(Product::resolve_available_quantity)
    }

    #[test]
    fn decrements_by_quantity_sold() {
        let mut products = ProductIndex::from_products([tracked(1, 5.0)], Utc::now());
        let mut order = Order::new();
        order.add_product(ProductId::new(1), 2.0, false).unwrap();
        order.add_product(ProductId::new(1), 1.0, false).unwrap();

        let applied = apply_sale(&order, &mut products, Utc::now());

        assert_eq!(available(&products, 1), Some(2.0));
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].sold, 3.0);
        assert_eq!(applied[0].to_string(), "P1/1: 5 -> 2 (sold: 3)");
    }

    #[test]
    fn floors_at_zero() {
        let mut products = ProductIndex::from_products([tracked(1, 2.0)], Utc::now());
        let mut order = Order::new();
        order.add_product(ProductId::new(1), 5.0, false).unwrap();

        apply_sale(&order, &mut products, Utc::now());
        assert_eq!(available(&products, 1), Some(0.0));
    }

    #[test]
    fn skips_untracked_non_storable_and_unknown_products() {
        let mut products = ProductIndex::from_products(
            [
                Product::new(ProductId::new(1), "Service").with_available_qty(Some(5.0)),
                Product::new(ProductId::new(2), "Untracked").storable(true),
            ],
            Utc::now(),
        );
        let mut order = Order::new();
        order.add_product(ProductId::new(1), 1.0, false).unwrap();
        order.add_product(ProductId::new(2), 1.0, false).unwrap();
        order.add_product(ProductId::new(3), 1.0, false).unwrap();

        let applied = apply_sale(&order, &mut products, Utc::now());

        assert!(applied.is_empty());
        assert_eq!(available(&products, 1), Some(5.0));
        assert_eq!(available(&products, 2), None);
    }

    #[test]
    fn net_refunds_leave_stock_untouched() {
        let mut products = ProductIndex::from_products([tracked(1, 5.0)], Utc::now());
        let mut order = Order::new();
        order.add_product(ProductId::new(1), -2.0, false).unwrap();

        assert!(apply_sale(&order, &mut products, Utc::now()).is_empty());
        assert_eq!(available(&products, 1), Some(5.0));
    }

    #[test]
    fn raw_mirror_receives_the_same_value() {
        let raw = match json!({ "pos_available_qty": 5.0 }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let product = Product::new(ProductId::new(1), "Cola")
            .storable(true)
            .with_raw(raw);
        let mut products = ProductIndex::from_products([product], Utc::now());
        let mut order = Order::new();
        order.add_product(ProductId::new(1), 4.0, false).unwrap();

        apply_sale(&order, &mut products, Utc::now());

        let product = products.get(ProductId::new(1)).unwrap();
        let mirrored = product
            .raw()
            .and_then(|raw| raw.get(AVAILABLE_QTY_FIELD))
            .and_then(Value::as_f64);
        assert_eq!(mirrored, Some(1.0));
        assert_eq!(product.resolve_available_quantity(), Some(1.0));
    }
}
