//! Expense repository: creation with its approval chain, and scoped reads.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use uuid::Uuid;

use reimburse_core::identity::{Actor, Role};
use reimburse_core::rules::{ExpenseCandidate, FirstRuleSelector, RuleSelector};
use reimburse_core::visibility::{VisibilityFilter, VisibilityScope};
use reimburse_core::workflow::{ChainBuilder, WorkflowError};

use crate::entities::{
    expense_approvals, expenses,
    sea_orm_active_enums::{ApprovalStatus, ExpenseStatus},
};
use crate::repositories::approval_rule::load_rules;
use crate::repositories::user::team_member_ids;

pub(crate) fn db_err(e: DbErr) -> WorkflowError {
    WorkflowError::Database(e.to_string())
}

/// Input for creating an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseInput {
    /// Amount, strictly positive.
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Amount in the company currency, supplied by the caller.
    pub converted_amount: Option<Decimal>,
    /// Expense category.
    pub category: String,
    /// Free text description.
    pub description: Option<String>,
    /// When the expense was incurred.
    pub expense_date: NaiveDate,
    /// Owner remarks.
    pub remarks: Option<String>,
}

/// An expense with its approval rows, ascending by step order.
#[derive(Debug, Clone, Serialize)]
pub struct ExpenseDetail {
    /// The expense.
    #[serde(flatten)]
    pub expense: expenses::Model,
    /// Its approval chain.
    pub approvals: Vec<expense_approvals::Model>,
}

/// A pending approval row assigned to the actor.
#[derive(Debug, Clone, Serialize)]
pub struct PendingApproval {
    /// The actor's approval row.
    pub approval: expense_approvals::Model,
    /// The expense awaiting the decision.
    pub expense: expenses::Model,
}

/// Expense repository.
#[derive(Clone)]
pub struct ExpenseRepository {
    db: DatabaseConnection,
    selector: Arc<dyn RuleSelector>,
}

impl std::fmt::Debug for ExpenseRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpenseRepository").finish_non_exhaustive()
    }
}

impl ExpenseRepository {
    /// Creates a repository that routes expenses through the company's first rule.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_selector(db, Arc::new(FirstRuleSelector))
    }

    /// Creates a repository with a custom rule selector.
    #[must_use]
    pub fn with_selector(db: DatabaseConnection, selector: Arc<dyn RuleSelector>) -> Self {
        Self { db, selector }
    }

    /// Creates a draft expense owned by the actor and builds its approval chain.
    ///
    /// The expense and its approval rows are inserted in one transaction.
    /// When no rule applies, or a manager-default rule meets an owner without
    /// a manager, the expense is created without approval rows.
    pub async fn create(
        &self,
        actor: &Actor,
        input: CreateExpenseInput,
    ) -> Result<ExpenseDetail, WorkflowError> {
        actor.ensure_can_create_expense()?;
        let currency = validate_input(&input)?;
        let category = input.category.trim().to_string();

        let txn = self.db.begin().await.map_err(db_err)?;

        let rules: Vec<_> = load_rules(&txn, actor.company_id)
            .await
            .map_err(db_err)?
            .iter()
            .map(super::approval_rule::RuleWithSteps::to_domain)
            .collect();
        let candidate = ExpenseCandidate {
            owner_id: actor.id,
            amount: input.amount,
            currency: &currency,
            category: &category,
        };
        let rule = self.selector.select(&rules, &candidate);
        let chain = rule
            .map(|r| ChainBuilder::build(r, actor.manager_id))
            .unwrap_or_default();

        let now = chrono::Utc::now().into();
        let expense = expenses::ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(actor.company_id),
            owner_id: Set(actor.id),
            rule_id: Set(rule.map(|r| r.id)),
            amount: Set(input.amount),
            currency: Set(currency.clone()),
            converted_amount: Set(input.converted_amount),
            category: Set(category.clone()),
            description: Set(input.description),
            expense_date: Set(input.expense_date),
            status: Set(ExpenseStatus::Draft),
            remarks: Set(input.remarks),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        let mut approvals = Vec::with_capacity(chain.len());
        for planned in &chain {
            let row = expense_approvals::ActiveModel {
                id: Set(Uuid::new_v4()),
                expense_id: Set(expense.id),
                approver_id: Set(planned.approver_id),
                step_order: Set(planned.step_order),
                status: Set(ApprovalStatus::Pending),
                comment: Set(None),
                acted_at: Set(None),
                created_at: Set(now),
            }
            .insert(&txn)
            .await
            .map_err(db_err)?;
            approvals.push(row);
        }

        txn.commit().await.map_err(db_err)?;

        tracing::info!(
            expense_id = %expense.id,
            owner_id = %actor.id,
            rule_id = ?expense.rule_id,
            approvers = approvals.len(),
            "Expense created"
        );
        Ok(ExpenseDetail { expense, approvals })
    }

    /// Lists the expenses the actor may see, newest first.
    pub async fn list_visible(&self, actor: &Actor) -> Result<Vec<expenses::Model>, WorkflowError> {
        let scope = visibility_scope(&self.db, actor).await?;

        let mut query = expenses::Entity::find()
            .filter(expenses::Column::CompanyId.eq(scope.company_id()));
        if let VisibilityScope::Owners { owner_ids, .. } = &scope {
            query = query.filter(expenses::Column::OwnerId.is_in(owner_ids.iter().copied()));
        }

        query
            .order_by_desc(expenses::Column::CreatedAt)
            .order_by_desc(expenses::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Gets one expense with its approval chain.
    ///
    /// Expenses outside the actor's visibility are reported as not found.
    pub async fn get(&self, actor: &Actor, expense_id: Uuid) -> Result<ExpenseDetail, WorkflowError> {
        let scope = visibility_scope(&self.db, actor).await?;

        let expense = expenses::Entity::find_by_id(expense_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .filter(|e| scope.permits(e.company_id, e.owner_id))
            .ok_or(WorkflowError::expense_not_found(expense_id))?;

        let approvals = load_approvals(&self.db, expense_id).await.map_err(db_err)?;
        Ok(ExpenseDetail { expense, approvals })
    }

    /// The actor's pending approval rows on pending expenses.
    pub async fn pending_approvals(&self, actor: &Actor) -> Result<Vec<PendingApproval>, WorkflowError> {
        let rows = expense_approvals::Entity::find()
            .filter(expense_approvals::Column::ApproverId.eq(actor.id))
            .filter(expense_approvals::Column::Status.eq(ApprovalStatus::Pending))
            .find_also_related(expenses::Entity)
            .filter(expenses::Column::Status.eq(ExpenseStatus::Pending))
            .filter(expenses::Column::CompanyId.eq(actor.company_id))
            .order_by_asc(expenses::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .filter_map(|(approval, expense)| {
                expense.map(|expense| PendingApproval { approval, expense })
            })
            .collect())
    }
}

/// Visibility scope of the actor, loading a manager's team.
pub(crate) async fn visibility_scope<C>(conn: &C, actor: &Actor) -> Result<VisibilityScope, WorkflowError>
where
    C: ConnectionTrait,
{
    let team = match actor.role {
        Role::Manager => team_member_ids(conn, actor.company_id, actor.id)
            .await
            .map_err(db_err)?,
        Role::Admin | Role::Employee => Vec::new(),
    };
    Ok(VisibilityFilter::scope(actor, &team))
}

/// Approval rows of an expense, ascending by step order.
pub(crate) async fn load_approvals<C>(
    conn: &C,
    expense_id: Uuid,
) -> Result<Vec<expense_approvals::Model>, DbErr>
where
    C: ConnectionTrait,
{
    expense_approvals::Entity::find()
        .filter(expense_approvals::Column::ExpenseId.eq(expense_id))
        .order_by_asc(expense_approvals::Column::StepOrder)
        .all(conn)
        .await
}

/// Checks the input and returns the normalized currency code.
fn validate_input(input: &CreateExpenseInput) -> Result<String, WorkflowError> {
    if input.amount <= Decimal::ZERO {
        return Err(WorkflowError::Validation(
            "Amount must be greater than zero".to_string(),
        ));
    }
    if input.converted_amount.is_some_and(|c| c < Decimal::ZERO) {
        return Err(WorkflowError::Validation(
            "Converted amount cannot be negative".to_string(),
        ));
    }
    if input.category.trim().is_empty() {
        return Err(WorkflowError::Validation("Category is required".to_string()));
    }

    let currency = input.currency.trim().to_uppercase();
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(WorkflowError::Validation(format!(
            "Invalid currency code: {}",
            input.currency
        )));
    }
    Ok(currency)
}
