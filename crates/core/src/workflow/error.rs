//! Workflow error types for the expense approval engine.
//!
//! Every failure an engine operation can report, with the HTTP status and
//! machine-readable code the transport layer exposes.

use thiserror::Error;
use uuid::Uuid;

use crate::identity::Role;
use crate::rules::RuleError;
use crate::workflow::types::{ApprovalStatus, ExpenseStatus};

/// Errors that can occur during workflow operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The actor's role or ownership does not allow the operation.
    #[error("Role {role} is not allowed to {action}")]
    Forbidden {
        /// The actor's role.
        role: Role,
        /// What was attempted.
        action: &'static str,
    },

    /// Entity absent, or outside the actor's company or visibility scope.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of entity looked up.
        entity: &'static str,
        /// The identifier that was looked up.
        id: Uuid,
    },

    /// The expense is not in a status that allows the transition.
    #[error("{reason} (current status: {status})")]
    InvalidState {
        /// Current expense status.
        status: ExpenseStatus,
        /// Which rule the transition broke.
        reason: &'static str,
    },

    /// Submit attempted on an expense without approval rows.
    #[error("Expense has no approval flow; contact an admin")]
    NoApprovalFlow,

    /// The actor holds no approval row for the expense.
    #[error("User {user_id} is not an approver of expense {expense_id}")]
    NotAnApprover {
        /// The expense.
        expense_id: Uuid,
        /// The acting user.
        user_id: Uuid,
    },

    /// The actor's approval row is already terminal.
    #[error("You already acted on this expense ({status})")]
    AlreadyActed {
        /// Status recorded by the earlier action.
        status: ApprovalStatus,
    },

    /// Input failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl WorkflowError {
    /// Shorthand for a `NotFound` on an expense.
    #[must_use]
    pub const fn expense_not_found(id: Uuid) -> Self {
        Self::NotFound {
            entity: "Expense",
            id,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Forbidden { .. } | Self::NotAnApprover { .. } => 403,
            Self::NotFound { .. } => 404,
            Self::InvalidState { .. } | Self::AlreadyActed { .. } => 409,
            Self::NoApprovalFlow => 422,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Forbidden { .. } => "FORBIDDEN",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::InvalidState { .. } => "INVALID_STATE",
            Self::NoApprovalFlow => "NO_APPROVAL_FLOW",
            Self::NotAnApprover { .. } => "NOT_AN_APPROVER",
            Self::AlreadyActed { .. } => "ALREADY_ACTED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<RuleError> for WorkflowError {
    fn from(err: RuleError) -> Self {
        Self::Validation(err.to_string())
    }
}
