//! Approval rule registry domain.
//!
//! Rule definitions, their validation, and the selector that picks the rule
//! a new expense is routed through.

pub mod error;
pub mod selector;
pub mod types;
pub mod validation;

pub use error::RuleError;
pub use selector::{ExpenseCandidate, FirstRuleSelector, RuleSelector};
pub use types::{ApprovalFlowStep, ApprovalRule};
pub use validation::{RuleDraft, RuleValidator};
