use serde::Serialize;

use super::{EntityId, PartialUpdate};

/// A product in the catalog. `price` and `stock` are never negative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogItem {
    pub id: EntityId,
    pub name: String,
    pub price: f64,
    pub stock: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCatalogItem {
    pub name: String,
    pub price: f64,
    pub stock: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogItemPatch {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i64>,
}

impl PartialUpdate for CatalogItemPatch {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none() && self.stock.is_none()
    }
}
