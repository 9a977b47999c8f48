//! Catalog repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use kicks_core::{Money, ProductId};

use super::RepositoryError;
use crate::models::{NewProduct, Product, ProductDetail, ProductFilter, ProductSize};

const PRODUCT_COLUMNS: &str = "id, name, brand, category, description, price, original_price, \
                               image_url, stock, is_active, is_new, created_at";

#[derive(Debug, sqlx::FromRow)]
pub(super) struct ProductRow {
    id: ProductId,
    name: String,
    brand: String,
    category: String,
    description: String,
    price: Money,
    original_price: Option<Money>,
    image_url: Option<String>,
    stock: i32,
    is_active: bool,
    is_new: bool,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            brand: row.brand,
            category: row.category,
            description: row.description,
            price: row.price,
            original_price: row.original_price,
            image_url: row.image_url,
            stock: row.stock,
            is_active: row.is_active,
            is_new: row.is_new,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductWithImagesRow {
    #[sqlx(flatten)]
    product: ProductRow,
    images: Vec<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct ProductSizeRow {
    size: String,
    stock: i32,
}

/// Build an `ILIKE` pattern matching `term` anywhere, with wildcards escaped.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Repository for catalog reads and seeding.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List active products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.products \
             WHERE is_active \
               AND ($1::text IS NULL OR lower(category) = lower($1)) \
               AND ($2::text IS NULL OR lower(brand) = lower($2)) \
               AND ($3::text IS NULL OR name ILIKE $3 OR brand ILIKE $3) \
               AND ($4::boolean IS NULL OR is_new = $4) \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(non_blank(filter.category.as_ref()))
        .bind(non_blank(filter.brand.as_ref()))
        .bind(non_blank(filter.search.as_ref()).map(contains_pattern))
        .bind(filter.is_new)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Get an active product with its sizes and image gallery.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_detail(
        &self,
        id: ProductId,
    ) -> Result<Option<ProductDetail>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductWithImagesRow>(&format!(
            "SELECT {PRODUCT_COLUMNS}, images FROM storefront.products \
             WHERE id = $1 AND is_active"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let sizes = sqlx::query_as::<_, ProductSizeRow>(
            r"
            SELECT size, stock
            FROM storefront.product_sizes
            WHERE product_id = $1
            ORDER BY size
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(|r| ProductSize {
            size: r.size,
            stock: r.stock,
        })
        .collect();

        let product = Product::from(row.product);
        Ok(Some(ProductDetail {
            discount_percent: product.discount_percent(),
            product,
            images: row.images,
            sizes,
        }))
    }

    /// Distinct brands of active products, alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn brands(&self) -> Result<Vec<String>, RepositoryError> {
        let brands = sqlx::query_scalar::<_, String>(
            r"
            SELECT DISTINCT brand
            FROM storefront.products
            WHERE is_active
            ORDER BY brand
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(brands)
    }

    /// Number of products, active or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM storefront.products")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Insert a product and its sizes in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a size is listed twice.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, product: &NewProduct) -> Result<ProductId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query_scalar::<_, ProductId>(
            r"
            INSERT INTO storefront.products
                (name, brand, category, description, price, original_price,
                 image_url, images, stock, is_new)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            ",
        )
        .bind(&product.name)
        .bind(&product.brand)
        .bind(&product.category)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.original_price)
        .bind(product.image_url.as_deref())
        .bind(&product.images)
        .bind(product.aggregate_stock())
        .bind(product.is_new)
        .fetch_one(&mut *tx)
        .await?;

        for size in &product.sizes {
            sqlx::query(
                r"
                INSERT INTO storefront.product_sizes (product_id, size, stock)
                VALUES ($1, $2, $3)
                ",
            )
            .bind(id)
            .bind(&size.size)
            .bind(size.stock)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                RepositoryError::conflict_on_unique(e, &format!("duplicate size {}", size.size))
            })?;
        }

        tx.commit().await?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("jordan"), "%jordan%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn test_blank_filters_are_ignored() {
        let blank = "  ".to_owned();
        let brand = " Nike ".to_owned();
        assert_eq!(non_blank(Some(&blank)), None);
        assert_eq!(non_blank(Some(&brand)), Some("Nike"));
        assert_eq!(non_blank(None), None);
    }
}
