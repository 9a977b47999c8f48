//! Catalog types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use kicks_core::{Money, ProductId};

/// A catalog product.
///
/// `stock` is the aggregate across sizes when the product has size rows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub description: String,
    pub price: Money,
    /// Pre-discount price, shown struck through when present.
    pub original_price: Option<Money>,
    pub image_url: Option<String>,
    pub stock: i32,
    pub is_active: bool,
    pub is_new: bool,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Percentage off the original price, rounded down.
    #[must_use]
    pub fn discount_percent(&self) -> Option<u32> {
        let original = self.original_price?;
        if !original.is_positive() || original <= self.price {
            return None;
        }
        let off = (original - self.price).amount() * Decimal::ONE_HUNDRED / original.amount();
        off.trunc().to_u32()
    }
}

/// Stock for one size of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSize {
    pub size: String,
    pub stock: i32,
}

/// Product with its size breakdown and image gallery.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub discount_percent: Option<u32>,
    pub images: Vec<String>,
    pub sizes: Vec<ProductSize>,
}

/// The fields checkout reads from a locked product row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockedProduct {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    pub stock: i32,
    pub is_active: bool,
    /// Sold by size: every order line must name one.
    pub has_sizes: bool,
}

/// A product to add to the catalog.
///
/// When `sizes` is non-empty the aggregate stock is their sum and `stock` is
/// ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub brand: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub price: Money,
    #[serde(default)]
    pub original_price: Option<Money>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default)]
    pub sizes: Vec<ProductSize>,
}

impl NewProduct {
    /// Aggregate stock to store: the size total when sized, else `stock`.
    #[must_use]
    pub fn aggregate_stock(&self) -> i32 {
        if self.sizes.is_empty() {
            self.stock
        } else {
            self.sizes.iter().map(|s| s.stock).sum()
        }
    }
}

/// Catalog listing filters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub brand: Option<String>,
    /// Case-insensitive substring of name or brand.
    pub search: Option<String>,
    #[serde(rename = "new")]
    pub is_new: Option<bool>,
}
