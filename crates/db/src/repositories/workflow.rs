//! Workflow repository for expense state transitions.
//!
//! Submit and act run as single transactions that start by locking the
//! expense row, so concurrent approvers resolve the expense one at a time.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use uuid::Uuid;

use reimburse_core::identity::Actor;
use reimburse_core::workflow::{ApprovalAction, WorkflowError, WorkflowService};

use crate::entities::{
    expense_approvals,
    expenses,
    sea_orm_active_enums::{ApprovalStatus, ExpenseStatus},
};
use crate::repositories::expense::{db_err, visibility_scope};

/// Result of an approver's action.
#[derive(Debug, Clone, Serialize)]
pub struct ActOutcome {
    /// The expense after resolution.
    pub expense: expenses::Model,
    /// The actor's updated approval row.
    pub approval: expense_approvals::Model,
}

/// Workflow repository for expense state transitions.
#[derive(Debug, Clone)]
pub struct WorkflowRepository {
    db: DatabaseConnection,
}

impl WorkflowRepository {
    /// Creates a new workflow repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Submits a draft expense for approval.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Expense is not visible to the actor
    /// - Actor does not own the expense
    /// - Expense is not in draft status
    /// - Expense has no approval rows
    /// - Database operation fails
    pub async fn submit(&self, actor: &Actor, expense_id: Uuid) -> Result<expenses::Model, WorkflowError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let expense = expenses::Entity::find_by_id(expense_id)
            .filter(expenses::Column::CompanyId.eq(actor.company_id))
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(WorkflowError::expense_not_found(expense_id))?;

        if expense.owner_id != actor.id {
            let scope = visibility_scope(&txn, actor).await?;
            if !scope.permits(expense.company_id, expense.owner_id) {
                return Err(WorkflowError::expense_not_found(expense_id));
            }
            return Err(WorkflowError::Forbidden {
                role: actor.role,
                action: "submit an expense they do not own",
            });
        }

        let approval_count = expense_approvals::Entity::find()
            .filter(expense_approvals::Column::ExpenseId.eq(expense_id))
            .count(&txn)
            .await
            .map_err(db_err)?;
        let approval_count = usize::try_from(approval_count).unwrap_or(usize::MAX);

        let new_status = WorkflowService::submit(expense.status.into(), approval_count)?;

        let mut active: expenses::ActiveModel = expense.into();
        active.status = Set(ExpenseStatus::from(new_status));
        active.updated_at = Set(chrono::Utc::now().into());
        let updated = active.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        tracing::info!(expense_id = %expense_id, approvers = approval_count, "Expense submitted");
        Ok(updated)
    }

    /// Records an approver's decision and resolves the expense.
    ///
    /// The approver's row is updated and the expense status recomputed over
    /// all rows inside one transaction holding the expense row lock.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Expense is not found in the actor's company
    /// - Actor holds no approval row for the expense
    /// - Actor already acted
    /// - Expense is not pending
    /// - Database operation fails
    pub async fn act(
        &self,
        actor: &Actor,
        expense_id: Uuid,
        action: ApprovalAction,
        comment: Option<String>,
    ) -> Result<ActOutcome, WorkflowError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let expense = expenses::Entity::find_by_id(expense_id)
            .filter(expenses::Column::CompanyId.eq(actor.company_id))
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(WorkflowError::expense_not_found(expense_id))?;

        let row = expense_approvals::Entity::find()
            .filter(expense_approvals::Column::ExpenseId.eq(expense_id))
            .filter(expense_approvals::Column::ApproverId.eq(actor.id))
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(WorkflowError::NotAnApprover {
                expense_id,
                user_id: actor.id,
            })?;

        let decision = WorkflowService::act(expense.status.into(), row.status.into(), action, comment)?;

        let mut active: expense_approvals::ActiveModel = row.into();
        active.status = Set(ApprovalStatus::from(decision.status));
        active.comment = Set(decision.comment);
        active.acted_at = Set(Some(decision.acted_at.into()));
        let approval = active.update(&txn).await.map_err(db_err)?;

        let expense = resolve_expense(&txn, expense).await.map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;

        tracing::info!(
            expense_id = %expense_id,
            approver_id = %actor.id,
            decision = ?approval.status,
            expense_status = ?expense.status,
            "Approval recorded"
        );
        Ok(ActOutcome { expense, approval })
    }
}

/// Recomputes the expense status from all of its approval rows and persists
/// a change. The caller holds the expense row lock.
pub(crate) async fn resolve_expense<C>(conn: &C, expense: expenses::Model) -> Result<expenses::Model, DbErr>
where
    C: ConnectionTrait,
{
    let statuses: Vec<ApprovalStatus> = expense_approvals::Entity::find()
        .select_only()
        .column(expense_approvals::Column::Status)
        .filter(expense_approvals::Column::ExpenseId.eq(expense.id))
        .into_tuple()
        .all(conn)
        .await?;
    let resolved = ExpenseStatus::from(WorkflowService::resolve(statuses.into_iter().map(Into::into)));

    if resolved == expense.status {
        return Ok(expense);
    }
    let mut active: expenses::ActiveModel = expense.into();
    active.status = Set(resolved);
    active.updated_at = Set(chrono::Utc::now().into());
    active.update(conn).await
}
