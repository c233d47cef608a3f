//! # Sale Routes
//!
//! The composition session lifecycle and committed-sale reads.
//!
//! ## Session Flow
//! ```text
//! POST /sales/sessions
//!   → snapshot the catalog, open a SaleComposer
//! POST   .../items, DELETE .../items/{pid}
//! PUT    .../installments, DELETE .../installments
//!   → mutate the composer; every response is the full draft view
//! POST   .../commit
//!   → build the payload, persist atomically, close the session
//! DELETE /sales/sessions/{id}
//!   → cancel; nothing was ever persisted
//! ```
//! Composer mutations run synchronously under the session lock. The commit
//! handler is the only place that awaits on behalf of a session, and it
//! holds the `committing` flag (not the lock) across that await.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use fiado_core::{
    Installment, LineItem, Sale, SaleInstallment, SaleItem, MAX_DRAFT_ITEMS, MAX_INSTALLMENTS,
};

use crate::error::ApiError;
use crate::state::{AppState, Session};

// =============================================================================
// DTOs
// =============================================================================

/// The full state of one composition session, returned by every session
/// endpoint so the frontend never has to diff.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: Uuid,
    pub composed_on: NaiveDate,
    pub items: Vec<LineItem>,
    pub total_cents: i64,
    pub installments: Vec<Installment>,
    pub stock_error: Option<String>,
}

impl SessionView {
    fn new(id: Uuid, session: &Session) -> Self {
        SessionView {
            session_id: id,
            composed_on: session.composer.composed_on(),
            items: session.composer.items().to_vec(),
            total_cents: session.composer.total().cents(),
            installments: session.composer.installment_plan().to_vec(),
            stock_error: session.composer.stock_error().map(str::to_string),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetInstallmentsRequest {
    pub count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRequest {
    pub customer_id: String,
    pub payment_method_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ListSalesQuery {
    pub limit: Option<i64>,
}

/// A committed sale with its items and installments.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleDetail {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
    pub installments: Vec<SaleInstallment>,
}

fn session_not_found(id: Uuid) -> ApiError {
    ApiError::not_found("Session", &id.to_string())
}

// =============================================================================
// Session Handlers
// =============================================================================

/// POST /sales/sessions
pub async fn open_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    let snapshot = state.db.catalog().list_products().await?;
    let id = state.sessions.open(snapshot);

    let view = state
        .sessions
        .with_session(id, |s| SessionView::new(id, s))
        .ok_or_else(|| session_not_found(id))?;

    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /sales/sessions/{id}
pub async fn view_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let view = state
        .sessions
        .with_session(id, |s| SessionView::new(id, s))
        .ok_or_else(|| session_not_found(id))?;

    Ok(Json(view))
}

/// POST /sales/sessions/{id}/items
pub async fn add_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let view = state
        .sessions
        .with_session(id, |session| {
            if session.committing {
                return Err(ApiError::session_busy());
            }

            let product = session
                .snapshot
                .iter()
                .find(|p| p.id == req.product_id)
                .cloned()
                .ok_or_else(|| ApiError::not_found("Product", &req.product_id))?;

            let is_new_line = !session
                .composer
                .items()
                .iter()
                .any(|i| i.product_id == product.id);
            if is_new_line && session.composer.items().len() >= MAX_DRAFT_ITEMS {
                return Err(ApiError::validation(format!(
                    "A sale cannot have more than {MAX_DRAFT_ITEMS} distinct products"
                )));
            }

            session.composer.add_product(&product, req.quantity)?;
            Ok(SessionView::new(id, session))
        })
        .ok_or_else(|| session_not_found(id))??;

    Ok(Json(view))
}

/// DELETE /sales/sessions/{id}/items/{product_id}
pub async fn remove_item(
    State(state): State<AppState>,
    Path((id, product_id)): Path<(Uuid, String)>,
) -> Result<Json<SessionView>, ApiError> {
    let view = state
        .sessions
        .with_session(id, |session| {
            if session.committing {
                return Err(ApiError::session_busy());
            }
            // Removing an absent product is a no-op by contract
            session.composer.remove_product(&product_id);
            Ok(SessionView::new(id, session))
        })
        .ok_or_else(|| session_not_found(id))??;

    Ok(Json(view))
}

/// PUT /sales/sessions/{id}/installments
pub async fn set_installments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetInstallmentsRequest>,
) -> Result<Json<SessionView>, ApiError> {
    if req.count > MAX_INSTALLMENTS {
        return Err(ApiError::validation(format!(
            "Installment count cannot exceed {MAX_INSTALLMENTS}"
        )));
    }

    let view = state
        .sessions
        .with_session(id, |session| {
            if session.committing {
                return Err(ApiError::session_busy());
            }
            session.composer.set_installments(req.count)?;
            Ok(SessionView::new(id, session))
        })
        .ok_or_else(|| session_not_found(id))??;

    Ok(Json(view))
}

/// DELETE /sales/sessions/{id}/installments
pub async fn clear_installments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let view = state
        .sessions
        .with_session(id, |session| {
            if session.committing {
                return Err(ApiError::session_busy());
            }
            session.composer.clear_installments();
            Ok(SessionView::new(id, session))
        })
        .ok_or_else(|| session_not_found(id))??;

    Ok(Json(view))
}

/// POST /sales/sessions/{id}/commit
pub async fn commit_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CommitRequest>,
) -> Result<(StatusCode, Json<Sale>), ApiError> {
    let customer = state
        .db
        .customers()
        .get_by_id(&req.customer_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Customer", &req.customer_id))?;

    let method = state
        .db
        .payment_methods()
        .get_by_id(&req.payment_method_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Payment method", &req.payment_method_id))?;

    // Claim the session for this commit. A second submit while the insert
    // below is in flight hits the committing flag and gets a 409 instead
    // of a duplicate sale.
    let draft = state
        .sessions
        .with_session(id, |session| {
            if session.committing {
                return Err(ApiError::session_busy());
            }
            let draft = session.composer.build_payload(&customer.id, &method)?;
            session.committing = true;
            Ok(draft)
        })
        .ok_or_else(|| session_not_found(id))??;

    match state.db.sales().commit(&draft).await {
        Ok(sale) => {
            state.sessions.remove(id);
            info!(session_id = %id, sale_id = %sale.id, "Sale committed, session closed");
            Ok((StatusCode::CREATED, Json(sale)))
        }
        Err(err) => {
            // The draft is intact; the user can adjust quantities and retry
            state.sessions.release_commit(id);
            Err(err.into())
        }
    }
}

/// DELETE /sales/sessions/{id}
pub async fn cancel_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.sessions.remove(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(session_not_found(id))
    }
}

// =============================================================================
// Committed-Sale Handlers
// =============================================================================

/// GET /sales
pub async fn list_sales(
    State(state): State<AppState>,
    Query(query): Query<ListSalesQuery>,
) -> Result<Json<Vec<Sale>>, ApiError> {
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let sales = state.db.sales().list_recent(limit).await?;
    Ok(Json(sales))
}

/// GET /sales/{id}
pub async fn sale_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SaleDetail>, ApiError> {
    let sale = state
        .db
        .sales()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sale", &id))?;

    let items = state.db.sales().items(&id).await?;
    let installments = state.db.sales().installments(&id).await?;

    Ok(Json(SaleDetail {
        sale,
        items,
        installments,
    }))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::SessionStore;
    use fiado_core::PaymentStatus;
    use fiado_db::{Database, DbConfig};

    struct Fixture {
        state: AppState,
        cafe_id: String,
        customer_id: String,
        prazo_id: String,
        dinheiro_id: String,
    }

    async fn fixture() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let cafe = db.catalog().create_product("Café 500g", None, 1250, 5).await.unwrap();
        let customer = db.customers().create("Maria Silva", None, None).await.unwrap();
        let prazo = db.payment_methods().create("A Prazo", true).await.unwrap();
        let dinheiro = db.payment_methods().create("Dinheiro", false).await.unwrap();

        Fixture {
            state: AppState {
                db,
                sessions: SessionStore::new(),
            },
            cafe_id: cafe.id,
            customer_id: customer.id,
            prazo_id: prazo.id,
            dinheiro_id: dinheiro.id,
        }
    }

    async fn open(f: &Fixture) -> Uuid {
        let (status, Json(view)) = open_session(State(f.state.clone())).await.unwrap();
        assert_eq!(status, StatusCode::CREATED);
        view.session_id
    }

    #[tokio::test]
    async fn test_full_installment_sale_flow() {
        let f = fixture().await;
        let id = open(&f).await;

        let Json(view) = add_item(
            State(f.state.clone()),
            Path(id),
            Json(AddItemRequest {
                product_id: f.cafe_id.clone(),
                quantity: 4,
            }),
        )
        .await
        .unwrap();
        assert_eq!(view.total_cents, 5000);

        let Json(view) = set_installments(
            State(f.state.clone()),
            Path(id),
            Json(SetInstallmentsRequest { count: 3 }),
        )
        .await
        .unwrap();
        assert_eq!(view.installments.len(), 3);
        assert_eq!(
            view.installments.iter().map(|i| i.amount_cents).sum::<i64>(),
            5000
        );

        let (status, Json(sale)) = commit_session(
            State(f.state.clone()),
            Path(id),
            Json(CommitRequest {
                customer_id: f.customer_id.clone(),
                payment_method_id: f.prazo_id.clone(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(sale.payment_status, PaymentStatus::Pending);

        // Session is gone after a successful commit
        assert!(f.state.sessions.is_empty());

        // Detail endpoint shows the frozen items and the plan
        let Json(detail) = sale_detail(State(f.state.clone()), Path(sale.id.clone()))
            .await
            .unwrap();
        assert_eq!(detail.items.len(), 1);
        assert_eq!(detail.items[0].name_snapshot, "Café 500g");
        assert_eq!(detail.installments.len(), 3);
    }

    #[tokio::test]
    async fn test_add_item_rejects_over_snapshot_stock() {
        let f = fixture().await;
        let id = open(&f).await;

        // Stock is 5; 6 in one go must fail and leave the draft empty
        let err = add_item(
            State(f.state.clone()),
            Path(id),
            Json(AddItemRequest {
                product_id: f.cafe_id.clone(),
                quantity: 6,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);

        let Json(view) = view_session(State(f.state.clone()), Path(id)).await.unwrap();
        assert!(view.items.is_empty());
        assert!(view.stock_error.is_some());
    }

    #[tokio::test]
    async fn test_commit_stock_conflict_keeps_session_open() {
        let f = fixture().await;

        // Two sessions race for the same 5 units
        let first = open(&f).await;
        let second = open(&f).await;

        for id in [first, second] {
            add_item(
                State(f.state.clone()),
                Path(id),
                Json(AddItemRequest {
                    product_id: f.cafe_id.clone(),
                    quantity: 4,
                }),
            )
            .await
            .unwrap();
        }

        let commit = |id| {
            commit_session(
                State(f.state.clone()),
                Path(id),
                Json(CommitRequest {
                    customer_id: f.customer_id.clone(),
                    payment_method_id: f.dinheiro_id.clone(),
                }),
            )
        };

        commit(first).await.unwrap();

        let err = commit(second).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::StockConflict);

        // The losing session survives for the user to adjust and retry
        let Json(view) = view_session(State(f.state.clone()), Path(second)).await.unwrap();
        assert_eq!(view.items.len(), 1);
    }

    #[tokio::test]
    async fn test_commit_requires_plan_for_installment_method() {
        let f = fixture().await;
        let id = open(&f).await;

        add_item(
            State(f.state.clone()),
            Path(id),
            Json(AddItemRequest {
                product_id: f.cafe_id.clone(),
                quantity: 1,
            }),
        )
        .await
        .unwrap();

        let err = commit_session(
            State(f.state.clone()),
            Path(id),
            Json(CommitRequest {
                customer_id: f.customer_id.clone(),
                payment_method_id: f.prazo_id.clone(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);

        // Failed validation must not leave the session claimed
        let Json(view) = view_session(State(f.state.clone()), Path(id)).await.unwrap();
        assert_eq!(view.items.len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_session() {
        let f = fixture().await;
        let id = open(&f).await;

        let status = cancel_session(State(f.state.clone()), Path(id)).await.unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let err = view_session(State(f.state.clone()), Path(id)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_set_installments_clamps_count() {
        let f = fixture().await;
        let id = open(&f).await;

        let err = set_installments(
            State(f.state.clone()),
            Path(id),
            Json(SetInstallmentsRequest {
                count: MAX_INSTALLMENTS + 1,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
