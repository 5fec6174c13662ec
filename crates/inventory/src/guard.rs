//! Stock availability guard.
//!
//! The guard decides whether a prospective committed quantity of a product may
//! proceed given the product's cached available quantity. Rules, in order:
//!
//! 1. Non-storable products and products without an availability snapshot are
//!    unrestricted (absence of data is not zero stock).
//! 2. Only net additions are gated; decreases and refunds always pass.
//! 3. With no stock left (`available <= 0`) any addition is blocked.
//! 4. Otherwise an addition is blocked when the prospective total exceeds the
//!    available quantity by more than `epsilon`. Equal is allowed.

use std::collections::HashSet;

use serde::Serialize;

use stockguard_core::{DomainError, DomainResult, LineId, ProductId};
use stockguard_products::{Product, ProductIndex};
use stockguard_sales::Order;

/// Tolerance absorbing floating-point noise in quantity sums.
pub const DEFAULT_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuardSettings {
    epsilon: f64,
}

impl GuardSettings {
    pub fn new(epsilon: f64) -> DomainResult<Self> {
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(DomainError::validation(format!(
                "epsilon must be a finite non-negative number (got {epsilon})"
            )));
        }
        Ok(Self { epsilon })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
}

impl Default for GuardSettings {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
        }
    }
}

/// A product whose prospective committed quantity exceeds its availability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub product_id: ProductId,
    pub product_name: String,
    /// Prospective total committed quantity that triggered the violation.
    pub requested: f64,
    pub available: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum Decision {
    Allow,
    Block(Violation),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn violation(&self) -> Option<&Violation> {
        match self {
            Decision::Allow => None,
            Decision::Block(violation) => Some(violation),
        }
    }

    pub fn into_violation(self) -> Option<Violation> {
        match self {
            Decision::Allow => None,
            Decision::Block(violation) => Some(violation),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StockGuard {
    settings: GuardSettings,
}

impl StockGuard {
    pub fn new(settings: GuardSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> GuardSettings {
        self.settings
    }

    /// Decide whether `product` may reach `prospective_total` committed units
    /// through a change of `delta` units.
    pub fn evaluate(&self, product: &Product, prospective_total: f64, delta: f64) -> Decision {
        let Some(available) = product.tracked_available() else {
            return Decision::Allow;
        };
        if delta <= 0.0 {
            return Decision::Allow;
        }

        if available <= 0.0 || prospective_total - available > self.settings.epsilon {
            return Decision::Block(Violation {
                product_id: product.id_typed(),
                product_name: product.label().to_string(),
                requested: prospective_total,
                available,
            });
        }

        Decision::Allow
    }

    /// Payment-time check: every product of the order, one violation per
    /// offending product (ascending product id).
    pub fn check_order(&self, order: &Order, products: &ProductIndex) -> Vec<Violation> {
        order
            .quantities_by_product()
            .into_iter()
            .filter_map(|(product_id, total)| {
                let Some(product) = products.get(product_id) else {
                    tracing::debug!(%product_id, "product not in snapshot; stock check skipped");
                    return None;
                };
                self.evaluate(product, total, total).into_violation()
            })
            .collect()
    }

    /// Quantity-set check for one line.
    ///
    /// Lines in `excluded` (merge sources about to disappear) do not count
    /// towards the other lines' quantity.
    pub fn check_quantity_change(
        &self,
        order: &Order,
        products: &ProductIndex,
        line_id: LineId,
        new_quantity: f64,
        excluded: &HashSet<LineId>,
    ) -> Decision {
        let Some(line) = order.line(line_id) else {
            tracing::debug!(%line_id, "line not in order; stock check skipped");
            return Decision::Allow;
        };
        let Some(product) = products.get(line.product_id()) else {
            tracing::debug!(product_id = %line.product_id(), "product not in snapshot; stock check skipped");
            return Decision::Allow;
        };

        let others: f64 = order
            .lines()
            .iter()
            .filter(|other| {
                other.product_id() == line.product_id()
                    && other.id_typed() != line_id
                    && !excluded.contains(&other.id_typed())
            })
            .map(|other| other.quantity())
            .sum();

        self.evaluate(product, others + new_quantity, new_quantity - line.quantity())
    }

    /// Add-line check: quantity already on the order (if any) plus `requested`
    /// (1 when unspecified).
    pub fn check_addition(
        &self,
        order: Option<&Order>,
        product: &Product,
        requested: Option<f64>,
    ) -> Decision {
        let requested = requested.unwrap_or(1.0);
        let committed = order
            .map(|order| order.quantity_for_product(product.id_typed(), &HashSet::new()))
            .unwrap_or(0.0);

        self.evaluate(product, committed + requested, requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn tracked(id: u64, name: &str, available: f64) -> Product {
        Product::new(ProductId::new(id), name)
            .storable(true)
            .with_available_qty(Some(available))
    }

    fn index(products: impl IntoIterator<Item = Product>) -> ProductIndex {
        ProductIndex::from_products(products, Utc::now())
    }

    fn guard() -> StockGuard {
        StockGuard::default()
    }

    #[test]
    fn settings_reject_negative_or_non_finite_epsilon() {
        assert!(GuardSettings::new(-1e-6).is_err());
        assert!(GuardSettings::new(f64::NAN).is_err());
        assert!(GuardSettings::new(f64::INFINITY).is_err());
        assert_eq!(GuardSettings::new(1e-9).unwrap().epsilon(), 1e-9);
    }

    #[test]
    fn untracked_products_are_always_allowed() {
        let untracked = Product::new(ProductId::new(1), "Gift card").storable(true);
        assert!(guard().evaluate(&untracked, 1_000.0, 1_000.0).is_allowed());

        let consumable = Product::new(ProductId::new(2), "Napkin").with_available_qty(Some(0.0));
        assert!(guard().evaluate(&consumable, 10.0, 10.0).is_allowed());
    }

    #[test]
    fn equal_to_available_is_allowed() {
        let product = tracked(1, "Cola", 5.0);
        assert!(guard().evaluate(&product, 5.0, 1.0).is_allowed());
    }

    #[test]
    fn rounding_noise_within_epsilon_is_allowed() {
        let product = tracked(1, "Flour (kg)", 0.3);
        // 0.1 + 0.2 = 0.30000000000000004
        assert!(guard().evaluate(&product, 0.1 + 0.2, 0.2).is_allowed());
    }

    #[test]
    fn exceeding_available_is_blocked_with_details() {
        let product = tracked(1, "Cola", 5.0).with_display_name("[C01] Cola");

        let decision = guard().evaluate(&product, 6.0, 1.0);
        assert_eq!(
            decision.violation(),
            Some(&Violation {
                product_id: ProductId::new(1),
                product_name: "[C01] Cola".to_string(),
                requested: 6.0,
                available: 5.0,
            })
        );
    }

    #[test]
    fn zero_stock_blocks_any_addition() {
        let product = tracked(1, "Cola", 0.0);
        assert!(!guard().evaluate(&product, 1.0, 1.0).is_allowed());
        // Even when the order total stays non-positive because of a refund line.
        assert!(!guard().evaluate(&product, -2.0, 1.0).is_allowed());
    }

    #[test]
    fn decreases_are_allowed_without_stock() {
        let product = tracked(1, "Cola", 0.0);
        assert!(guard().evaluate(&product, 3.0, -1.0).is_allowed());
        assert!(guard().evaluate(&product, 4.0, 0.0).is_allowed());
    }

    #[test]
    fn check_order_reports_every_violating_product() {
        let products = index([
            tracked(1, "Cola", 5.0),
            tracked(2, "Chips", 1.0),
            tracked(3, "Water", 10.0),
        ]);
        let mut order = Order::new();
        order.add_product(ProductId::new(2), 1.0, false).unwrap();
        order.add_product(ProductId::new(1), 4.0, false).unwrap();
        order.add_product(ProductId::new(2), 1.0, false).unwrap();
        order.add_product(ProductId::new(1), 2.0, false).unwrap();
        order.add_product(ProductId::new(3), 10.0, false).unwrap();

        let violations = guard().check_order(&order, &products);
        let summary: Vec<_> = violations
            .iter()
            .map(|v| (v.product_id.get(), v.requested, v.available))
            .collect();
        assert_eq!(summary, vec![(1, 6.0, 5.0), (2, 2.0, 1.0)]);
    }

    #[test]
    fn check_order_skips_unknown_products_and_refunds() {
        let products = index([tracked(1, "Cola", 0.0)]);
        let mut order = Order::new();
        order.add_product(ProductId::new(1), -2.0, false).unwrap();
        order.add_product(ProductId::new(42), 100.0, false).unwrap();

        assert!(guard().check_order(&order, &products).is_empty());
    }

    #[test]
    fn quantity_change_counts_other_lines_of_the_product() {
        let products = index([tracked(1, "Cola", 5.0)]);
        let mut order = Order::new();
        order.add_product(ProductId::new(1), 3.0, false).unwrap();
        let edited = order.add_product(ProductId::new(1), 1.0, false).unwrap();

        let none = HashSet::new();
        assert!(guard().check_quantity_change(&order, &products, edited, 2.0, &none).is_allowed());

        let decision = guard().check_quantity_change(&order, &products, edited, 3.0, &none);
        assert_eq!(decision.violation().map(|v| v.requested), Some(6.0));
    }

    #[test]
    fn quantity_change_to_same_value_is_allowed() {
        let products = index([tracked(1, "Cola", 5.0)]);
        let mut order = Order::new();
        let line = order.add_product(ProductId::new(1), 5.0, false).unwrap();

        let decision = guard().check_quantity_change(&order, &products, line, 5.0, &HashSet::new());
        assert!(decision.is_allowed());
    }

    #[test]
    fn excluded_lines_are_not_counted() {
        let products = index([tracked(1, "Cola", 5.0)]);
        let mut order = Order::new();
        let target = order.add_product(ProductId::new(1), 2.0, false).unwrap();
        let source = order.add_product(ProductId::new(1), 3.0, false).unwrap();

        let blocked = guard().check_quantity_change(&order, &products, target, 5.0, &HashSet::new());
        assert!(!blocked.is_allowed());

        let merged =
            guard().check_quantity_change(&order, &products, target, 5.0, &HashSet::from([source]));
        assert!(merged.is_allowed());
    }

    #[test]
    fn addition_defaults_to_one_unit() {
        let product = tracked(1, "Cola", 5.0);
        let mut order = Order::new();
        order.add_product(ProductId::new(1), 4.0, false).unwrap();

        assert!(guard().check_addition(Some(&order), &product, None).is_allowed());

        order.add_product(ProductId::new(1), 1.0, true).unwrap();
        let decision = guard().check_addition(Some(&order), &product, None);
        assert_eq!(decision.violation().map(|v| v.requested), Some(6.0));
    }

    #[test]
    fn addition_without_order_starts_from_zero() {
        let product = tracked(1, "Cola", 2.0);
        assert!(guard().check_addition(None, &product, Some(2.0)).is_allowed());
        assert!(!guard().check_addition(None, &product, Some(3.0)).is_allowed());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                ..ProptestConfig::default()
            })]

            /// Property: an addition R > 0 is allowed iff A > 0 and C + R - A <= epsilon.
            #[test]
            fn addition_allowed_iff_within_availability(
                available in -5.0f64..50.0,
                committed in 0.0f64..50.0,
                requested in 0.001f64..50.0,
            ) {
                let product = tracked(1, "Cola", available);
                let decision = guard().evaluate(&product, committed + requested, requested);

                let expected = available > 0.0
                    && committed + requested - available <= DEFAULT_EPSILON;
                prop_assert_eq!(decision.is_allowed(), expected);
            }

            /// Property: untracked products never trigger the guard.
            #[test]
            fn untracked_never_blocks(
                storable in any::<bool>(),
                total in -100.0f64..100.0,
                delta in -100.0f64..100.0,
            ) {
                let product = Product::new(ProductId::new(1), "Bag").storable(storable);
                prop_assert!(guard().evaluate(&product, total, delta).is_allowed());
            }

            /// Property: decreasing a line is allowed whatever the stock level.
            #[test]
            fn decreases_always_allowed(
                available in -10.0f64..10.0,
                current in 0.0f64..100.0,
                decrease in 0.0f64..100.0,
            ) {
                let products = index([tracked(1, "Cola", available)]);
                let mut order = Order::new();
                let line = order.add_product(ProductId::new(1), current, false).unwrap();

                let decision = guard().check_quantity_change(
                    &order,
                    &products,
                    line,
                    current - decrease,
                    &HashSet::new(),
                );
                prop_assert!(decision.is_allowed());
            }
        }
    }
}
