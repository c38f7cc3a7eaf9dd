//! Rule validation errors.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Reasons a rule definition is rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuleError {
    /// Name is empty or whitespace.
    #[error("Rule name is required")]
    NameRequired,

    /// Percentage outside 0 to 100.
    #[error("Minimum approval percentage must be between 0 and 100, got {0}")]
    PercentageOutOfRange(Decimal),

    /// Step order below 1.
    #[error("Step order must be at least 1, got {0}")]
    InvalidStepOrder(i32),

    /// Two steps share a step order.
    #[error("Step order {0} is used more than once")]
    DuplicateStepOrder(i32),

    /// The same approver appears in two steps.
    #[error("Approver {0} appears in more than one step")]
    DuplicateApprover(Uuid),

    /// The approver is not a user of the rule's company.
    #[error("Approver {0} does not belong to this company")]
    ApproverOutsideCompany(Uuid),
}
