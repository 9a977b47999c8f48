//! Catalog handlers.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use kicks_core::ProductId;

use super::{ApiPath, ApiQuery, Success, success};
use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::models::{Product, ProductDetail, ProductFilter};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProductsResponse {
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub product: ProductDetail,
}

#[derive(Debug, Serialize)]
pub struct BrandsResponse {
    pub brands: Vec<String>,
}

/// List active products.
///
/// GET /api/products?category=&brand=&search=&new=
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<ProductFilter>,
) -> Result<Json<Success<ProductsResponse>>> {
    let products = ProductRepository::new(state.pool()).list(&filter).await?;
    Ok(success(ProductsResponse { products }))
}

/// Product detail with size breakdown and image gallery.
///
/// GET /api/products/{id}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<Success<ProductResponse>>> {
    let product = ProductRepository::new(state.pool())
        .get_detail(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_owned()))?;
    Ok(success(ProductResponse { product }))
}

/// Distinct brands of active products.
///
/// GET /api/products/brands
pub async fn brands(State(state): State<AppState>) -> Result<Json<Success<BrandsResponse>>> {
    let brands = ProductRepository::new(state.pool()).brands().await?;
    Ok(success(BrandsResponse { brands }))
}
