//! Product catalog with persisted overrides.
//!
//! The manager starts from a saved snapshot when one loads cleanly and from
//! the built-in list otherwise. After that the in-memory list is the only
//! source of truth: every update writes a full snapshot, and nothing is
//! re-read until the next manager is built.

pub mod defaults;
pub mod snapshot;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

pub use defaults::default_products;
pub use snapshot::{FileSnapshotStore, MemorySnapshotStore, SnapshotStore};

use crate::config::CatalogConfig;
use crate::errors::CatalogError;

pub const DEFAULT_SNAPSHOT_KEY: &str = "bumable_products";

/// A product. Prices are in minor currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub regular_price: u32,
    #[serde(default)]
    pub sale_price: Option<u32>,
    #[serde(default)]
    pub on_sale: bool,
    pub image: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub in_stock: bool,
    #[serde(default)]
    pub stock_count: u32,
    #[serde(default)]
    pub available_sizes: Vec<String>,
}

impl Product {
    /// Sale price while on sale, otherwise the regular price. A zero sale
    /// price counts as no sale price.
    pub fn current_price(&self) -> u32 {
        match self.active_sale_price() {
            Some(sale) => sale,
            None => self.regular_price,
        }
    }

    /// Whole-percent discount, 0 when not on sale.
    pub fn discount_percent(&self) -> i64 {
        match self.active_sale_price() {
            Some(sale) if self.regular_price > 0 => {
                ((1.0 - f64::from(sale) / f64::from(self.regular_price)) * 100.0).round() as i64
            }
            _ => 0,
        }
    }

    fn active_sale_price(&self) -> Option<u32> {
        self.sale_price.filter(|sale| self.on_sale && *sale > 0)
    }
}

/// Fields to merge into a product. `None` leaves the field as is;
/// `sale_price: Some(None)` (JSON `null`) clears the sale price.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regular_price: Option<u32>,
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub sale_price: Option<Option<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_sale: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_sizes: Option<Vec<String>>,
}

impl ProductUpdate {
    fn apply(self, product: &mut Product) {
        if let Some(v) = self.name {
            product.name = v;
        }
        if let Some(v) = self.regular_price {
            product.regular_price = v;
        }
        if let Some(v) = self.sale_price {
            product.sale_price = v;
        }
        if let Some(v) = self.on_sale {
            product.on_sale = v;
        }
        if let Some(v) = self.image {
            product.image = v;
        }
        if let Some(v) = self.category {
            product.category = v;
        }
        if let Some(v) = self.description {
            product.description = v;
        }
        if let Some(v) = self.in_stock {
            product.in_stock = v;
        }
        if let Some(v) = self.stock_count {
            product.stock_count = v;
        }
        if let Some(v) = self.available_sizes {
            product.available_sizes = v;
        }
    }
}

/// A key that is present maps to `Some`, even when its value is `null`.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub struct CatalogManager<S> {
    products: Vec<Product>,
    store: S,
    key: String,
}

impl CatalogManager<FileSnapshotStore> {
    pub fn from_config(config: &CatalogConfig) -> Self {
        Self::with_key(
            FileSnapshotStore::new(config.snapshot_dir.clone()),
            config.snapshot_key.clone(),
        )
    }
}

impl<S: SnapshotStore> CatalogManager<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, DEFAULT_SNAPSHOT_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let products = load_snapshot(&store, &key).unwrap_or_else(default_products);
        Self {
            products,
            store,
            key,
        }
    }

    pub fn list_all(&self) -> &[Product] {
        &self.products
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Exact, case-sensitive category match.
    pub fn list_by_category(&self, category: &str) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.category == category)
            .collect()
    }

    /// Merge `update` into the product and persist. False when `id` is unknown.
    pub fn update(&mut self, id: &str, update: ProductUpdate) -> bool {
        let Some(product) = self.products.iter_mut().find(|p| p.id == id) else {
            return false;
        };
        update.apply(product);
        self.persist();
        true
    }

    /// Drop the snapshot and go back to the built-in list.
    pub fn reset_to_defaults(&mut self) {
        self.products = default_products();
        if let Err(e) = self.store.remove(&self.key) {
            warn!(key = %self.key, error = %e, "failed to remove catalog snapshot");
        }
    }

    fn persist(&self) {
        let result = serde_json::to_string(&self.products)
            .map_err(CatalogError::from)
            .and_then(|json| self.store.save(&self.key, &json));
        match result {
            Ok(()) => debug!(key = %self.key, count = self.products.len(), "catalog snapshot saved"),
            Err(e) => warn!(key = %self.key, error = %e, "failed to save catalog snapshot"),
        }
    }
}

fn load_snapshot<S: SnapshotStore>(store: &S, key: &str) -> Option<Vec<Product>> {
    let contents = match store.load(key) {
        Ok(Some(contents)) => contents,
        Ok(None) => return None,
        Err(e) => {
            warn!(key, error = %e, "failed to read catalog snapshot; using defaults");
            return None;
        }
    };
    match serde_json::from_str(&contents) {
        Ok(products) => Some(products),
        Err(e) => {
            warn!(key, error = %e, "malformed catalog snapshot; using defaults");
            None
        }
    }
}
