//! Approval rule registry routes. Admin only.

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use reimburse_core::rules::ApprovalFlowStep;
use reimburse_db::repositories::{
    ApprovalRuleRepository, CreateApprovalRuleInput, UpdateApprovalRuleInput,
};

use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Creates approval rule routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/approval-rules", get(list_rules).post(create_rule))
        .route(
            "/approval-rules/{id}",
            get(get_rule).put(update_rule).delete(delete_rule),
        )
}

const fn default_true() -> bool {
    true
}

/// One explicit approver step.
#[derive(Debug, Deserialize)]
pub struct StepRequest {
    /// Position in the chain, 1-based.
    pub step_order: i32,
    /// User who approves at this step.
    pub approver_id: Uuid,
    /// Stored flag.
    #[serde(default = "default_true")]
    pub is_required: bool,
}

impl From<StepRequest> for ApprovalFlowStep {
    fn from(s: StepRequest) -> Self {
        Self {
            step_order: s.step_order,
            approver_id: s.approver_id,
            is_required: s.is_required,
        }
    }
}

/// Request body for creating a rule.
#[derive(Debug, Deserialize)]
pub struct CreateRuleRequest {
    /// Rule name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Route to the owner's manager instead of the steps.
    #[serde(default = "default_true")]
    pub is_manager_default_approver: bool,
    /// Stored completion percentage.
    pub min_approval_percentage: Option<Decimal>,
    /// Explicit steps.
    #[serde(default)]
    pub steps: Vec<StepRequest>,
}

/// Request body for updating a rule. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateRuleRequest {
    /// New name.
    pub name: Option<String>,
    /// New description, `null` clears it.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub description: Option<Option<String>>,
    /// New manager-default flag.
    pub is_manager_default_approver: Option<bool>,
    /// New percentage, `null` clears it.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub min_approval_percentage: Option<Option<Decimal>>,
    /// Replacement steps.
    pub steps: Option<Vec<StepRequest>>,
}

/// GET /approval-rules
async fn list_rules(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let repo = ApprovalRuleRepository::new((*state.db).clone());
    let rules = repo.list_rules(auth.actor()).await?;
    Ok(Json(json!({ "data": rules })))
}

/// POST /approval-rules
async fn create_rule(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<CreateRuleRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let repo = ApprovalRuleRepository::new((*state.db).clone());

    let rule = repo
        .create_rule(
            auth.actor(),
            CreateApprovalRuleInput {
                name: payload.name,
                description: payload.description,
                is_manager_default_approver: payload.is_manager_default_approver,
                min_approval_percentage: payload.min_approval_percentage,
                steps: payload.steps.into_iter().map(Into::into).collect(),
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(rule)))
}

/// GET /approval-rules/{id}
async fn get_rule(
    State(state): State<AppState>,
    auth: AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = id?;
    let repo = ApprovalRuleRepository::new((*state.db).clone());
    let rule = repo.get_rule(auth.actor(), id).await?;
    Ok(Json(rule))
}

/// PUT /approval-rules/{id}
async fn update_rule(
    State(state): State<AppState>,
    auth: AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateRuleRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let repo = ApprovalRuleRepository::new((*state.db).clone());

    let rule = repo
        .update_rule(
            auth.actor(),
            id,
            UpdateApprovalRuleInput {
                name: payload.name,
                description: payload.description,
                is_manager_default_approver: payload.is_manager_default_approver,
                min_approval_percentage: payload.min_approval_percentage,
                steps: payload
                    .steps
                    .map(|steps| steps.into_iter().map(Into::into).collect()),
            },
        )
        .await?;

    Ok(Json(rule))
}

/// DELETE /approval-rules/{id}
async fn delete_rule(
    State(state): State<AppState>,
    auth: AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = id?;
    let repo = ApprovalRuleRepository::new((*state.db).clone());
    repo.delete_rule(auth.actor(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
