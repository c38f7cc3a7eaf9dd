//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod approval_rule;
pub mod company;
pub mod expense;
pub mod user;
pub mod workflow;

pub use approval_rule::{
    ApprovalRuleError, ApprovalRuleRepository, CreateApprovalRuleInput, RuleWithSteps,
    UpdateApprovalRuleInput,
};
pub use company::CompanyRepository;
pub use expense::{CreateExpenseInput, ExpenseDetail, ExpenseRepository, PendingApproval};
pub use user::{NewUser, UserError, UserRepository};
pub use workflow::{ActOutcome, WorkflowRepository};
