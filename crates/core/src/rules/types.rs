//! Approval rule types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One explicit step of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalFlowStep {
    /// Position in the chain, unique within the rule and at least 1.
    pub step_order: i32,
    /// User who approves at this step.
    pub approver_id: Uuid,
    /// Stored and returned; resolution does not consult it.
    pub is_required: bool,
}

/// A company-scoped approval policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRule {
    /// Rule ID.
    pub id: Uuid,
    /// Owning company.
    pub company_id: Uuid,
    /// Rule name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// When true the owner's manager is the single approver and `steps` is ignored.
    pub is_manager_default_approver: bool,
    /// Stored and returned; resolution does not consult it.
    pub min_approval_percentage: Option<Decimal>,
    /// Explicit steps, ascending by `step_order`.
    pub steps: Vec<ApprovalFlowStep>,
    /// Creation time, first key of rule precedence.
    pub created_at: DateTime<Utc>,
}
