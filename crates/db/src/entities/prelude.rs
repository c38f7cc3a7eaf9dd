//! Entity re-exports.

pub use super::approval_flow_steps::Entity as ApprovalFlowSteps;
pub use super::approval_rules::Entity as ApprovalRules;
pub use super::companies::Entity as Companies;
pub use super::expense_approvals::Entity as ExpenseApprovals;
pub use super::expenses::Entity as Expenses;
pub use super::users::Entity as Users;
