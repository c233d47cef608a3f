//! # HTTP Routes
//!
//! Route table for the Fiado API.
//!
//! ```text
//! GET    /health
//!
//! GET    /catalog/products
//! GET    /catalog/categories
//! GET    /customers
//! GET    /payment-methods
//!
//! POST   /sales/sessions                          open a composition session
//! GET    /sales/sessions/{id}                     current draft view
//! POST   /sales/sessions/{id}/items               add product
//! DELETE /sales/sessions/{id}/items/{product_id}  remove product
//! PUT    /sales/sessions/{id}/installments        set installment count
//! DELETE /sales/sessions/{id}/installments        clear installment plan
//! POST   /sales/sessions/{id}/commit              persist the sale
//! DELETE /sales/sessions/{id}                     cancel the session
//!
//! GET    /sales                                   recent sales
//! GET    /sales/{id}                              sale detail
//!
//! GET    /reports/dashboard
//! GET    /reports/debtors
//! ```

use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod catalog;
pub mod reports;
pub mod sales;

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/catalog/products", get(catalog::list_products))
        .route("/catalog/categories", get(catalog::list_categories))
        .route("/customers", get(catalog::list_customers))
        .route("/payment-methods", get(catalog::list_payment_methods))
        .route("/sales/sessions", post(sales::open_session))
        .route(
            "/sales/sessions/{id}",
            get(sales::view_session).delete(sales::cancel_session),
        )
        .route("/sales/sessions/{id}/items", post(sales::add_item))
        .route(
            "/sales/sessions/{id}/items/{product_id}",
            delete(sales::remove_item),
        )
        .route(
            "/sales/sessions/{id}/installments",
            put(sales::set_installments).delete(sales::clear_installments),
        )
        .route("/sales/sessions/{id}/commit", post(sales::commit_session))
        .route("/sales", get(sales::list_sales))
        .route("/sales/{id}", get(sales::sale_detail))
        .route("/reports/dashboard", get(reports::dashboard))
        .route("/reports/debtors", get(reports::debtors))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Liveness probe: checks the database can answer.
async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Json<serde_json::Value> {
    let db_ok = state.db.health_check().await;
    Json(serde_json::json!({
        "status": if db_ok { "ok" } else { "degraded" },
        "database": db_ok,
        "openSessions": state.sessions.len(),
    }))
}
