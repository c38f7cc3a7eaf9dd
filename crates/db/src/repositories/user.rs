//! User repository: actor loading, teams and the admin user directory.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, SqlErr,
    TransactionTrait,
};
use thiserror::Error;
use uuid::Uuid;

use reimburse_core::identity::{Actor, Role};
use reimburse_core::workflow::WorkflowError;

use crate::entities::{
    expense_approvals, expenses,
    sea_orm_active_enums::{ExpenseStatus, UserRole},
    users,
};
use crate::repositories::workflow::resolve_expense;

/// Errors that can occur during user directory operations.
#[derive(Debug, Error)]
pub enum UserError {
    /// Authorization failure.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// The requested manager is not a user of the company.
    #[error("Manager {0} not found in this company")]
    ManagerNotFound(Uuid),

    /// Another user already holds the email.
    #[error("Email {0} is already registered")]
    EmailTaken(String),

    /// Input failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl UserError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Workflow(e) => e.status_code(),
            Self::ManagerNotFound(_) | Self::Validation(_) => 400,
            Self::EmailTaken(_) => 409,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Workflow(e) => e.error_code(),
            Self::ManagerNotFound(_) | Self::Validation(_) => "VALIDATION_ERROR",
            Self::EmailTaken(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Login email, unique across the system.
    pub email: String,
    /// Role in the company.
    pub role: Role,
    /// Direct manager, if any.
    pub manager_id: Option<Uuid>,
}

/// User repository.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Loads the acting user for an authenticated request.
    ///
    /// Returns `None` when the user is unknown, inactive, or belongs to a
    /// different company than the token claims.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn load_actor(&self, user_id: Uuid, company_id: Uuid) -> Result<Option<Actor>, DbErr> {
        let user = users::Entity::find_by_id(user_id)
            .filter(users::Column::CompanyId.eq(company_id))
            .filter(users::Column::IsActive.eq(true))
            .one(&self.db)
            .await?;

        Ok(user.map(|u| to_actor(&u)))
    }

    /// Lists every user of the admin's company.
    pub async fn list_users(&self, actor: &Actor) -> Result<Vec<users::Model>, UserError> {
        actor.ensure_admin("list users")?;

        Ok(users::Entity::find()
            .filter(users::Column::CompanyId.eq(actor.company_id))
            .order_by_asc(users::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Creates a manager or employee in the admin's company.
    pub async fn create_user(&self, actor: &Actor, input: NewUser) -> Result<users::Model, UserError> {
        actor.ensure_admin("create users")?;
        actor.ensure_assignable(input.role)?;

        self.insert(actor.company_id, input).await
    }

    /// Lists the manager's direct reports.
    pub async fn team(&self, actor: &Actor) -> Result<Vec<users::Model>, UserError> {
        actor.ensure_manager("view a team")?;

        Ok(users::Entity::find()
            .filter(users::Column::CompanyId.eq(actor.company_id))
            .filter(users::Column::ManagerId.eq(actor.id))
            .order_by_asc(users::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Deletes a manager or employee of the admin's company.
    ///
    /// The user's own expenses go with them, as do their approval rows and
    /// rule steps; direct reports lose their manager. Pending expenses of
    /// other owners that the user was approving are resolved again over the
    /// remaining rows.
    pub async fn delete_user(&self, actor: &Actor, user_id: Uuid) -> Result<(), UserError> {
        actor.ensure_admin("delete users")?;

        let txn = self.db.begin().await?;
        let user = users::Entity::find_by_id(user_id)
            .filter(users::Column::CompanyId.eq(actor.company_id))
            .one(&txn)
            .await?
            .ok_or(WorkflowError::NotFound {
                entity: "User",
                id: user_id,
            })?;
        if user.role == UserRole::Admin {
            return Err(UserError::Validation(
                "Cannot delete admin accounts".to_string(),
            ));
        }

        let awaiting: Vec<Uuid> = expense_approvals::Entity::find()
            .select_only()
            .column(expense_approvals::Column::ExpenseId)
            .join(JoinType::InnerJoin, expense_approvals::Relation::Expenses.def())
            .filter(expense_approvals::Column::ApproverId.eq(user_id))
            .filter(expenses::Column::Status.eq(ExpenseStatus::Pending))
            .filter(expenses::Column::OwnerId.ne(user_id))
            .into_tuple()
            .all(&txn)
            .await?;

        let mut locked = Vec::with_capacity(awaiting.len());
        for expense_id in awaiting {
            if let Some(expense) = expenses::Entity::find_by_id(expense_id)
                .lock_exclusive()
                .one(&txn)
                .await?
            {
                locked.push(expense);
            }
        }

        users::Entity::delete_by_id(user_id).exec(&txn).await?;

        let mut resolved = 0_usize;
        for expense in locked {
            let before = expense.status;
            if resolve_expense(&txn, expense).await?.status != before {
                resolved += 1;
            }
        }
        txn.commit().await?;

        tracing::info!(user_id = %user_id, company_id = %actor.company_id, resolved_expenses = resolved, "User deleted");
        Ok(())
    }

    /// Inserts a user of any role without an acting admin.
    ///
    /// Used to bootstrap a company's first admin; request handlers go through
    /// [`Self::create_user`].
    pub async fn insert(&self, company_id: Uuid, input: NewUser) -> Result<users::Model, UserError> {
        let name = input.name.trim();
        let email = input.email.trim().to_lowercase();
        if name.is_empty() {
            return Err(UserError::Validation("Name is required".to_string()));
        }
        if !email.contains('@') {
            return Err(UserError::Validation(format!("Invalid email: {email}")));
        }

        if let Some(manager_id) = input.manager_id {
            let exists = users::Entity::find_by_id(manager_id)
                .filter(users::Column::CompanyId.eq(company_id))
                .count(&self.db)
                .await?;
            if exists == 0 {
                return Err(UserError::ManagerNotFound(manager_id));
            }
        }

        let now = chrono::Utc::now().into();
        let user = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(company_id),
            name: Set(name.to_string()),
            email: Set(email.clone()),
            role: Set(UserRole::from(input.role)),
            manager_id: Set(input.manager_id),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => UserError::EmailTaken(email),
            _ => UserError::Database(e),
        })?;

        tracing::info!(user_id = %user.id, company_id = %company_id, role = %input.role, "User created");
        Ok(user)
    }
}

/// Converts a user row into the acting identity.
pub(crate) fn to_actor(user: &users::Model) -> Actor {
    Actor {
        id: user.id,
        company_id: user.company_id,
        role: user.role.into(),
        manager_id: user.manager_id,
    }
}

/// IDs of the manager's direct reports (one hop).
pub(crate) async fn team_member_ids<C>(conn: &C, company_id: Uuid, manager_id: Uuid) -> Result<Vec<Uuid>, DbErr>
where
    C: ConnectionTrait,
{
    users::Entity::find()
        .select_only()
        .column(users::Column::Id)
        .filter(users::Column::CompanyId.eq(company_id))
        .filter(users::Column::ManagerId.eq(manager_id))
        .into_tuple::<Uuid>()
        .all(conn)
        .await
}

/// IDs of every user in the company.
pub(crate) async fn company_user_ids<C>(conn: &C, company_id: Uuid) -> Result<Vec<Uuid>, DbErr>
where
    C: ConnectionTrait,
{
    users::Entity::find()
        .select_only()
        .column(users::Column::Id)
        .filter(users::Column::CompanyId.eq(company_id))
        .into_tuple::<Uuid>()
        .all(conn)
        .await
}
