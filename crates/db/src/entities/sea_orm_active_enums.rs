//! String-backed enums stored in entity columns.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use reimburse_core::identity::Role;
use reimburse_core::workflow::{
    ApprovalStatus as CoreApprovalStatus, ExpenseStatus as CoreExpenseStatus,
};

/// Role column of `users`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "manager")]
    Manager,
    #[sea_orm(string_value = "employee")]
    Employee,
}

/// Status column of `expenses`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ExpenseStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Status column of `expense_approvals`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl From<UserRole> for Role {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Admin => Self::Admin,
            UserRole::Manager => Self::Manager,
            UserRole::Employee => Self::Employee,
        }
    }
}

impl From<Role> for UserRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => Self::Admin,
            Role::Manager => Self::Manager,
            Role::Employee => Self::Employee,
        }
    }
}

impl From<ExpenseStatus> for CoreExpenseStatus {
    fn from(status: ExpenseStatus) -> Self {
        match status {
            ExpenseStatus::Draft => Self::Draft,
            ExpenseStatus::Pending => Self::Pending,
            ExpenseStatus::Approved => Self::Approved,
            ExpenseStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<CoreExpenseStatus> for ExpenseStatus {
    fn from(status: CoreExpenseStatus) -> Self {
        match status {
            CoreExpenseStatus::Draft => Self::Draft,
            CoreExpenseStatus::Pending => Self::Pending,
            CoreExpenseStatus::Approved => Self::Approved,
            CoreExpenseStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<ApprovalStatus> for CoreApprovalStatus {
    fn from(status: ApprovalStatus) -> Self {
        match status {
            ApprovalStatus::Pending => Self::Pending,
            ApprovalStatus::Approved => Self::Approved,
            ApprovalStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<CoreApprovalStatus> for ApprovalStatus {
    fn from(status: CoreApprovalStatus) -> Self {
        match status {
            CoreApprovalStatus::Pending => Self::Pending,
            CoreApprovalStatus::Approved => Self::Approved,
            CoreApprovalStatus::Rejected => Self::Rejected,
        }
    }
}
