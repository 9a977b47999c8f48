//! Catalog seeding.
//!
//! A catalog file is a YAML list of products in the same shape the API
//! accepts: `name`, `brand`, `category`, `price`, optional `originalPrice`,
//! `imageUrl`, `images`, `isNew`, and either `stock` or a `sizes` list whose
//! stocks add up to the aggregate.

use std::path::Path;

use kicks_storefront::db::ProductRepository;
use kicks_storefront::models::NewProduct;

use super::{CommandError, connect};

/// Demo catalog shipped with the CLI.
const DEMO_CATALOG: &str = include_str!("../../data/catalog.yaml");

/// Parse and check a catalog.
fn parse_catalog(content: &str) -> Result<Vec<NewProduct>, CommandError> {
    let products: Vec<NewProduct> =
        serde_yaml::from_str(content).map_err(|e| CommandError::Catalog(e.to_string()))?;

    for product in &products {
        if product.name.trim().is_empty() {
            return Err(CommandError::Catalog("product without a name".to_owned()));
        }
        if !product.price.is_positive() {
            return Err(CommandError::Catalog(format!(
                "{}: price must be positive",
                product.name
            )));
        }
        if product.stock < 0 || product.sizes.iter().any(|s| s.stock < 0) {
            return Err(CommandError::Catalog(format!(
                "{}: stock cannot be negative",
                product.name
            )));
        }
    }

    Ok(products)
}

/// Insert a catalog, each product with its sizes in one transaction.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or an insert fails.
/// Refuses to seed a non-empty catalog unless `force` is set.
pub async fn catalog(file: Option<&Path>, force: bool) -> Result<(), CommandError> {
    let content = match file {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading catalog from file");
            tokio::fs::read_to_string(path).await?
        }
        None => DEMO_CATALOG.to_owned(),
    };
    let products = parse_catalog(&content)?;
    tracing::info!(products = products.len(), "Parsed catalog");

    let (_, pool) = connect().await?;
    let repo = ProductRepository::new(&pool);

    let existing = repo.count().await?;
    if existing > 0 && !force {
        return Err(CommandError::Catalog(format!(
            "catalog already has {existing} products; pass --force to add anyway"
        )));
    }

    for product in &products {
        let id = repo.create(product).await?;
        tracing::info!(
            product_id = %id,
            name = %product.name,
            stock = product.aggregate_stock(),
            "Inserted product"
        );
    }

    tracing::info!("Seeding complete! {} products inserted", products.len());
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_catalog_parses() {
        let products = parse_catalog(DEMO_CATALOG).unwrap();
        assert!(!products.is_empty());
        for product in &products {
            if !product.sizes.is_empty() {
                let total: i32 = product.sizes.iter().map(|s| s.stock).sum();
                assert_eq!(product.aggregate_stock(), total, "{}", product.name);
            }
        }
    }

    #[test]
    fn test_rejects_non_positive_price() {
        let yaml = r#"
- name: Free Shoe
  brand: Nobody
  category: lifestyle
  price: "0"
"#;
        assert!(matches!(parse_catalog(yaml), Err(CommandError::Catalog(_))));
    }

    #[test]
    fn test_rejects_negative_size_stock() {
        let yaml = r#"
- name: Broken
  brand: Nobody
  category: running
  price: "1000"
  sizes:
    - { size: "42", stock: -1 }
"#;
        assert!(parse_catalog(yaml).is_err());
    }
}
