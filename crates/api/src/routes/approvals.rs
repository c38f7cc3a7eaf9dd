//! Approver inbox.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use serde_json::json;

use reimburse_db::repositories::ExpenseRepository;

use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Creates approval routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/approvals/pending", get(pending_approvals))
}

/// GET /approvals/pending
///
/// Pending rows assigned to the caller on expenses still awaiting a decision.
async fn pending_approvals(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let repo = ExpenseRepository::new((*state.db).clone());
    let items = repo.pending_approvals(auth.actor()).await?;
    Ok(Json(json!({ "data": items })))
}
