//! Roles, acting users and authorization checkpoints.
//!
//! Every engine operation starts with one of the `Actor::ensure_*` checks.
//! Roles form a closed set and each check matches it exhaustively, so a new
//! role fails closed until it is granted explicitly.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::workflow::error::WorkflowError;

/// User role inside a company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Manages users and approval rules, sees every company expense.
    Admin,
    /// Files expenses and sees the expenses of direct reports.
    Manager,
    /// Files and sees own expenses.
    Employee,
}

impl Role {
    /// Parse a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "manager" => Some(Self::Manager),
            "employee" => Some(Self::Employee),
            _ => None,
        }
    }

    /// Returns the string representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Employee => "employee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The authenticated user an operation runs on behalf of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// User ID.
    pub id: Uuid,
    /// Company the user belongs to.
    pub company_id: Uuid,
    /// User's role.
    pub role: Role,
    /// Direct manager, if any.
    pub manager_id: Option<Uuid>,
}

impl Actor {
    /// Only employees and managers file expenses.
    pub fn ensure_can_create_expense(&self) -> Result<(), WorkflowError> {
        match self.role {
            Role::Employee | Role::Manager => Ok(()),
            Role::Admin => Err(self.forbidden("create expenses")),
        }
    }

    /// Rule registry and user directory are admin-only.
    pub fn ensure_admin(&self, action: &'static str) -> Result<(), WorkflowError> {
        match self.role {
            Role::Admin => Ok(()),
            Role::Manager | Role::Employee => Err(self.forbidden(action)),
        }
    }

    /// Team views are manager-only.
    pub fn ensure_manager(&self, action: &'static str) -> Result<(), WorkflowError> {
        match self.role {
            Role::Manager => Ok(()),
            Role::Admin | Role::Employee => Err(self.forbidden(action)),
        }
    }

    /// Roles an admin may assign when creating a user.
    pub fn ensure_assignable(&self, role: Role) -> Result<(), WorkflowError> {
        match role {
            Role::Manager | Role::Employee => Ok(()),
            Role::Admin => Err(WorkflowError::Validation(
                "Cannot create another admin user".to_string(),
            )),
        }
    }

    fn forbidden(&self, action: &'static str) -> WorkflowError {
        WorkflowError::Forbidden {
            role: self.role,
            action,
        }
    }
}
