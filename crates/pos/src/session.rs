//! POS session state the adapters operate on.

use stockguard_core::{DomainError, DomainResult, OrderId};
use stockguard_products::ProductIndex;
use stockguard_sales::Order;

/// Loaded products plus the open orders of one POS session.
#[derive(Debug, Clone)]
pub struct PosSession {
    products: ProductIndex,
    orders: Vec<Order>,
    selected: Option<OrderId>,
}

impl PosSession {
    pub fn new(products: ProductIndex) -> Self {
        Self {
            products,
            orders: Vec::new(),
            selected: None,
        }
    }

    pub fn products(&self) -> &ProductIndex {
        &self.products
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn order(&self, order_id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|order| order.id_typed() == order_id)
    }

    pub fn order_mut(&mut self, order_id: OrderId) -> Option<&mut Order> {
        self.orders.iter_mut().find(|order| order.id_typed() == order_id)
    }

    /// Borrow one order mutably alongside the product snapshot.
    pub fn order_with_products_mut(
        &mut self,
        order_id: OrderId,
    ) -> Option<(&mut Order, &mut ProductIndex)> {
        let order = self
            .orders
            .iter_mut()
            .find(|order| order.id_typed() == order_id)?;
        Some((order, &mut self.products))
    }

    /// Add an order and make it the current one.
    pub fn add_order(&mut self, order: Order) -> OrderId {
        let id = order.id_typed();
        self.orders.push(order);
        self.selected = Some(id);
        id
    }

    pub fn select_order(&mut self, order_id: OrderId) -> DomainResult<()> {
        if self.order(order_id).is_none() {
            return Err(DomainError::not_found(format!("order {order_id}")));
        }
        self.selected = Some(order_id);
        Ok(())
    }

    pub fn current_order(&self) -> Option<&Order> {
        self.selected.and_then(|id| self.order(id))
    }

    pub fn current_order_mut(&mut self) -> Option<&mut Order> {
        let id = self.selected?;
        self.order_mut(id)
    }

    /// The current order, creating and selecting a new one if there is none.
    pub fn get_or_create_order(&mut self) -> &mut Order {
        let existing = self
            .selected
            .and_then(|id| self.orders.iter().position(|order| order.id_typed() == id));

        let position = match existing {
            Some(position) => position,
            None => {
                let order = Order::new();
                tracing::debug!(order_id = %order.id_typed(), "new order created");
                self.selected = Some(order.id_typed());
                self.orders.push(order);
                self.orders.len() - 1
            }
        };
        &mut self.orders[position]
    }
}
