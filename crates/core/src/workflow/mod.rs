//! Expense approval workflow.
//!
//! This module implements the expense lifecycle state machine and the
//! approval chain built for each expense.
//!
//! # Modules
//!
//! - `types` - Workflow domain types (ExpenseStatus, ApprovalStatus, ApprovalAction)
//! - `error` - Workflow error taxonomy
//! - `service` - State transition and resolution logic
//! - `chain` - Approval chain construction

pub mod chain;
pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod chain_props;
#[cfg(test)]
mod service_props;

pub use chain::{ChainBuilder, MANAGER_STEP_ORDER, PlannedApproval};
pub use error::WorkflowError;
pub use service::WorkflowService;
pub use types::{ApprovalAction, ApprovalDecision, ApprovalStatus, ExpenseStatus};
