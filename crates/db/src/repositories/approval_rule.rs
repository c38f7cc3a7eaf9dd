//! Approval Rule Repository
//!
//! Company-scoped CRUD for approval rules and their flow steps. A rule and
//! its steps are always written in one transaction.

use std::collections::HashSet;

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use reimburse_core::identity::Actor;
use reimburse_core::rules::{ApprovalFlowStep, ApprovalRule, RuleDraft, RuleError, RuleValidator};
use reimburse_core::workflow::WorkflowError;

use crate::entities::{
    approval_flow_steps,
    approval_rules::{self, ActiveModel, Entity as ApprovalRuleEntity, Model as ApprovalRuleModel},
    expenses,
};
use crate::repositories::user::company_user_ids;

/// Errors that can occur during approval rule operations.
#[derive(Debug, Error)]
pub enum ApprovalRuleError {
    /// Authorization failure.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// Approval rule not found in the actor's company.
    #[error("Approval rule {0} not found")]
    NotFound(Uuid),

    /// Rule definition failed validation.
    #[error(transparent)]
    Invalid(#[from] RuleError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl ApprovalRuleError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Workflow(e) => e.status_code(),
            Self::NotFound(_) => 404,
            Self::Invalid(_) => 400,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Workflow(e) => e.error_code(),
            Self::NotFound(_) => "NOT_FOUND",
            Self::Invalid(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

/// A rule row with its steps, ascending by step order.
#[derive(Debug, Clone, Serialize)]
pub struct RuleWithSteps {
    /// The rule.
    #[serde(flatten)]
    pub rule: ApprovalRuleModel,
    /// Its explicit steps.
    pub steps: Vec<approval_flow_steps::Model>,
}

impl RuleWithSteps {
    /// Converts into the engine's rule type.
    #[must_use]
    pub fn to_domain(&self) -> ApprovalRule {
        ApprovalRule {
            id: self.rule.id,
            company_id: self.rule.company_id,
            name: self.rule.name.clone(),
            description: self.rule.description.clone(),
            is_manager_default_approver: self.rule.is_manager_default_approver,
            min_approval_percentage: self.rule.min_approval_percentage,
            steps: self
                .steps
                .iter()
                .map(|s| ApprovalFlowStep {
                    step_order: s.step_order,
                    approver_id: s.approver_id,
                    is_required: s.is_required,
                })
                .collect(),
            created_at: self.rule.created_at.into(),
        }
    }
}

/// Input for creating an approval rule.
#[derive(Debug, Clone)]
pub struct CreateApprovalRuleInput {
    /// Name of the approval rule.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Route to the owner's manager instead of explicit steps.
    pub is_manager_default_approver: bool,
    /// Stored completion percentage.
    pub min_approval_percentage: Option<Decimal>,
    /// Explicit steps.
    pub steps: Vec<ApprovalFlowStep>,
}

/// Input for updating an approval rule.
#[derive(Debug, Clone, Default)]
pub struct UpdateApprovalRuleInput {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<Option<String>>,
    /// New manager-default flag.
    pub is_manager_default_approver: Option<bool>,
    /// New percentage.
    pub min_approval_percentage: Option<Option<Decimal>>,
    /// Replacement steps; applied only when the updated rule is not manager-default.
    pub steps: Option<Vec<ApprovalFlowStep>>,
}

/// Repository for approval rule operations.
#[derive(Debug, Clone)]
pub struct ApprovalRuleRepository {
    db: DatabaseConnection,
}

impl ApprovalRuleRepository {
    /// Creates a new ApprovalRuleRepository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new approval rule with its steps.
    pub async fn create_rule(
        &self,
        actor: &Actor,
        input: CreateApprovalRuleInput,
    ) -> Result<RuleWithSteps, ApprovalRuleError> {
        actor.ensure_admin("manage approval rules")?;
        RuleValidator::validate(&RuleDraft {
            name: &input.name,
            min_approval_percentage: input.min_approval_percentage,
            steps: &input.steps,
        })?;

        let txn = self.db.begin().await?;
        ensure_approvers_in_company(&txn, actor.company_id, &input.steps).await?;

        let now = chrono::Utc::now().into();
        let rule = ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(actor.company_id),
            name: Set(input.name.trim().to_string()),
            description: Set(input.description),
            is_manager_default_approver: Set(input.is_manager_default_approver),
            min_approval_percentage: Set(input.min_approval_percentage),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let steps = insert_steps(&txn, rule.id, &input.steps).await?;
        txn.commit().await?;

        tracing::info!(rule_id = %rule.id, company_id = %rule.company_id, steps = steps.len(), "Approval rule created");
        Ok(RuleWithSteps { rule, steps })
    }

    /// Lists the company's rules in selection order.
    pub async fn list_rules(&self, actor: &Actor) -> Result<Vec<RuleWithSteps>, ApprovalRuleError> {
        actor.ensure_admin("manage approval rules")?;
        Ok(load_rules(&self.db, actor.company_id).await?)
    }

    /// Gets a specific approval rule by ID.
    pub async fn get_rule(
        &self,
        actor: &Actor,
        rule_id: Uuid,
    ) -> Result<RuleWithSteps, ApprovalRuleError> {
        actor.ensure_admin("manage approval rules")?;
        find_rule(&self.db, actor.company_id, rule_id).await
    }

    /// Updates an approval rule.
    ///
    /// Absent fields keep their value. Steps are replaced only when `steps`
    /// is supplied and the updated rule is not manager-default.
    pub async fn update_rule(
        &self,
        actor: &Actor,
        rule_id: Uuid,
        input: UpdateApprovalRuleInput,
    ) -> Result<RuleWithSteps, ApprovalRuleError> {
        actor.ensure_admin("manage approval rules")?;

        let txn = self.db.begin().await?;
        let existing = find_rule(&txn, actor.company_id, rule_id).await?;

        let name = input.name.unwrap_or_else(|| existing.rule.name.clone());
        let description = input
            .description
            .unwrap_or_else(|| existing.rule.description.clone());
        let manager_default = input
            .is_manager_default_approver
            .unwrap_or(existing.rule.is_manager_default_approver);
        let pct = input
            .min_approval_percentage
            .unwrap_or(existing.rule.min_approval_percentage);
        let replacement = input.steps.filter(|_| !manager_default);

        RuleValidator::validate(&RuleDraft {
            name: &name,
            min_approval_percentage: pct,
            steps: replacement.as_deref().unwrap_or_default(),
        })?;

        let mut rule: ActiveModel = existing.rule.into();
        rule.name = Set(name.trim().to_string());
        rule.description = Set(description);
        rule.is_manager_default_approver = Set(manager_default);
        rule.min_approval_percentage = Set(pct);
        rule.updated_at = Set(chrono::Utc::now().into());
        let rule = rule.update(&txn).await?;

        let steps = if let Some(new_steps) = replacement {
            ensure_approvers_in_company(&txn, actor.company_id, &new_steps).await?;
            approval_flow_steps::Entity::delete_many()
                .filter(approval_flow_steps::Column::RuleId.eq(rule_id))
                .exec(&txn)
                .await?;
            insert_steps(&txn, rule_id, &new_steps).await?
        } else {
            existing.steps
        };
        txn.commit().await?;

        tracing::info!(rule_id = %rule_id, "Approval rule updated");
        Ok(RuleWithSteps { rule, steps })
    }

    /// Deletes a rule and its steps.
    ///
    /// Expenses routed through the rule keep their approval rows; their rule
    /// reference is cleared.
    pub async fn delete_rule(&self, actor: &Actor, rule_id: Uuid) -> Result<(), ApprovalRuleError> {
        actor.ensure_admin("manage approval rules")?;

        let txn = self.db.begin().await?;
        find_rule(&txn, actor.company_id, rule_id).await?;

        let detached = expenses::Entity::update_many()
            .col_expr(expenses::Column::RuleId, sea_orm::sea_query::Expr::value(Option::<Uuid>::None))
            .filter(expenses::Column::RuleId.eq(rule_id))
            .exec(&txn)
            .await?;
        approval_flow_steps::Entity::delete_many()
            .filter(approval_flow_steps::Column::RuleId.eq(rule_id))
            .exec(&txn)
            .await?;
        ApprovalRuleEntity::delete_by_id(rule_id).exec(&txn).await?;
        txn.commit().await?;

        tracing::info!(rule_id = %rule_id, detached_expenses = detached.rows_affected, "Approval rule deleted");
        Ok(())
    }
}

/// Loads every rule of a company with its steps, oldest first.
pub(crate) async fn load_rules<C>(conn: &C, company_id: Uuid) -> Result<Vec<RuleWithSteps>, sea_orm::DbErr>
where
    C: ConnectionTrait,
{
    let rows = ApprovalRuleEntity::find()
        .filter(approval_rules::Column::CompanyId.eq(company_id))
        .order_by_asc(approval_rules::Column::CreatedAt)
        .order_by_asc(approval_rules::Column::Id)
        .find_with_related(approval_flow_steps::Entity)
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(rule, mut steps)| {
            steps.sort_by_key(|s| s.step_order);
            RuleWithSteps { rule, steps }
        })
        .collect())
}

async fn find_rule<C>(conn: &C, company_id: Uuid, rule_id: Uuid) -> Result<RuleWithSteps, ApprovalRuleError>
where
    C: ConnectionTrait,
{
    let rule = ApprovalRuleEntity::find_by_id(rule_id)
        .filter(approval_rules::Column::CompanyId.eq(company_id))
        .one(conn)
        .await?
        .ok_or(ApprovalRuleError::NotFound(rule_id))?;

    let steps = approval_flow_steps::Entity::find()
        .filter(approval_flow_steps::Column::RuleId.eq(rule_id))
        .order_by_asc(approval_flow_steps::Column::StepOrder)
        .all(conn)
        .await?;

    Ok(RuleWithSteps { rule, steps })
}

async fn ensure_approvers_in_company<C>(
    conn: &C,
    company_id: Uuid,
    steps: &[ApprovalFlowStep],
) -> Result<(), ApprovalRuleError>
where
    C: ConnectionTrait,
{
    if steps.is_empty() {
        return Ok(());
    }
    let members: HashSet<Uuid> = company_user_ids(conn, company_id).await?.into_iter().collect();
    RuleValidator::validate_approvers_in_company(steps, &members)?;
    Ok(())
}

async fn insert_steps<C>(
    conn: &C,
    rule_id: Uuid,
    steps: &[ApprovalFlowStep],
) -> Result<Vec<approval_flow_steps::Model>, sea_orm::DbErr>
where
    C: ConnectionTrait,
{
    let mut ordered: Vec<&ApprovalFlowStep> = steps.iter().collect();
    ordered.sort_by_key(|s| s.step_order);

    let mut inserted = Vec::with_capacity(ordered.len());
    for step in ordered {
        let model = approval_flow_steps::ActiveModel {
            id: Set(Uuid::new_v4()),
            rule_id: Set(rule_id),
            step_order: Set(step.step_order),
            approver_id: Set(step.approver_id),
            is_required: Set(step.is_required),
        }
        .insert(conn)
        .await?;
        inserted.push(model);
    }
    Ok(inserted)
}
