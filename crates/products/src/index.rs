//! Product lookup for the POS session.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use stockguard_core::{DomainError, DomainResult, ProductId};

use crate::product::Product;

/// Product input of an add-to-order request: either a product record the
/// caller already holds or a raw identifier to resolve through the index.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductRef {
    Record(Product),
    Id(ProductId),
}

impl ProductRef {
    pub fn product_id(&self) -> ProductId {
        match self {
            ProductRef::Record(product) => product.id_typed(),
            ProductRef::Id(id) => *id,
        }
    }
}

impl From<ProductId> for ProductRef {
    fn from(value: ProductId) -> Self {
        ProductRef::Id(value)
    }
}

impl From<Product> for ProductRef {
    fn from(value: Product) -> Self {
        ProductRef::Record(value)
    }
}

/// Products loaded into the session, keyed by id.
///
/// The availability values they carry are a snapshot taken at `loaded_at`; the
/// index never refreshes them on its own.
#[derive(Debug, Clone)]
pub struct ProductIndex {
    products: HashMap<ProductId, Product>,
    loaded_at: DateTime<Utc>,
}

impl ProductIndex {
    pub fn new(loaded_at: DateTime<Utc>) -> Self {
        Self {
            products: HashMap::new(),
            loaded_at,
        }
    }

    pub fn from_products(products: impl IntoIterator<Item = Product>, loaded_at: DateTime<Utc>) -> Self {
        let mut index = Self::new(loaded_at);
        for product in products {
            index.insert(product);
        }
        index
    }

    /// Build the index from the product list of a POS data payload (a JSON
    /// array of product records).
    pub fn from_json(payload: &Value, loaded_at: DateTime<Utc>) -> DomainResult<Self> {
        let records = payload
            .as_array()
            .ok_or_else(|| DomainError::malformed("product payload must be an array"))?;

        let mut index = Self::new(loaded_at);
        for record in records {
            let map = record
                .as_object()
                .cloned()
                .ok_or_else(|| DomainError::malformed("product record must be an object"))?;
            index.insert(Product::from_record(map)?);
        }

        tracing::debug!(products = index.len(), %loaded_at, "product snapshot loaded");
        Ok(index)
    }

    /// Insert or replace a product.
    pub fn insert(&mut self, product: Product) -> Option<Product> {
        self.products.insert(product.id_typed(), product)
    }

    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.products.get(&id)
    }

    pub fn get_mut(&mut self, id: ProductId) -> Option<&mut Product> {
        self.products.get_mut(&id)
    }

    /// Normalize an add-to-order product input to the indexed product.
    ///
    /// A record the index does not know is returned as-is; an unknown id
    /// resolves to `None`.
    pub fn resolve<'a>(&'a self, product: &'a ProductRef) -> Option<&'a Product> {
        match product {
            ProductRef::Record(record) => self.get(record.id_typed()).or(Some(record)),
            ProductRef::Id(id) => self.get(*id),
        }
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
