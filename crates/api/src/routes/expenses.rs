//! Expense routes: filing, listing, submission and approver decisions.

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use reimburse_core::workflow::ApprovalAction;
use reimburse_db::repositories::{CreateExpenseInput, ExpenseRepository, WorkflowRepository};

use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Creates expense routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses).post(create_expense))
        .route("/expenses/{id}", get(get_expense))
        .route("/expenses/{id}/submit", post(submit_expense))
        .route("/expenses/{id}/act", patch(act_on_expense))
}

/// Request body for filing an expense.
#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    /// Amount in `currency`.
    pub amount: Decimal,
    /// ISO 4217 code.
    pub currency: String,
    /// Amount in the company currency.
    pub converted_amount: Option<Decimal>,
    /// Category label.
    pub category: String,
    /// Free text description.
    pub description: Option<String>,
    /// Date the expense was incurred.
    pub expense_date: NaiveDate,
    /// Owner remarks.
    pub remarks: Option<String>,
}

/// Request body for an approver decision.
#[derive(Debug, Deserialize)]
pub struct ActRequest {
    /// `approve` or `reject`.
    pub action: ApprovalAction,
    /// Optional comment stored on the approval row.
    pub comment: Option<String>,
}

/// POST /expenses
async fn create_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<CreateExpenseRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let repo = ExpenseRepository::new((*state.db).clone());

    let detail = repo
        .create(
            auth.actor(),
            CreateExpenseInput {
                amount: payload.amount,
                currency: payload.currency,
                converted_amount: payload.converted_amount,
                category: payload.category,
                description: payload.description,
                expense_date: payload.expense_date,
                remarks: payload.remarks,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(detail)))
}

/// GET /expenses
async fn list_expenses(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let repo = ExpenseRepository::new((*state.db).clone());
    let expenses = repo.list_visible(auth.actor()).await?;
    Ok(Json(json!({ "data": expenses })))
}

/// GET /expenses/{id}
async fn get_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = id?;
    let repo = ExpenseRepository::new((*state.db).clone());
    let detail = repo.get(auth.actor(), id).await?;
    Ok(Json(detail))
}

/// POST /expenses/{id}/submit
async fn submit_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = id?;
    let repo = WorkflowRepository::new((*state.db).clone());
    let expense = repo.submit(auth.actor(), id).await?;
    Ok(Json(expense))
}

/// PATCH /expenses/{id}/act
async fn act_on_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ActRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let repo = WorkflowRepository::new((*state.db).clone());
    let outcome = repo
        .act(auth.actor(), id, payload.action, payload.comment)
        .await?;
    Ok(Json(outcome))
}
