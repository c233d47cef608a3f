//! # Catalog & Reference Data Routes
//!
//! Read-only listings the frontend needs to build a sale: products,
//! categories, customers, and payment methods. All straight repository
//! pass-throughs.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use fiado_core::{Category, Customer, PaymentMethod, Product};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProductsQuery {
    pub category_id: Option<String>,
}

/// GET /catalog/products?categoryId=...
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let catalog = state.db.catalog();
    let products = match query.category_id.as_deref() {
        Some(category_id) => catalog.list_products_in_category(category_id).await?,
        None => catalog.list_products().await?,
    };
    Ok(Json(products))
}

/// GET /catalog/categories
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = state.db.catalog().list_categories().await?;
    Ok(Json(categories))
}

/// GET /customers
pub async fn list_customers(
    State(state): State<AppState>,
) -> Result<Json<Vec<Customer>>, ApiError> {
    let customers = state.db.customers().list().await?;
    Ok(Json(customers))
}

/// GET /payment-methods
pub async fn list_payment_methods(
    State(state): State<AppState>,
) -> Result<Json<Vec<PaymentMethod>>, ApiError> {
    let methods = state.db.payment_methods().list().await?;
    Ok(Json(methods))
}
