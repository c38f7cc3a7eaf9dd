//! Rule definition checks run before a rule is written.

use std::collections::HashSet;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::rules::error::RuleError;
use crate::rules::types::ApprovalFlowStep;

/// The writable part of a rule, as submitted by an admin.
#[derive(Debug, Clone)]
pub struct RuleDraft<'a> {
    /// Rule name.
    pub name: &'a str,
    /// Completion percentage, if any.
    pub min_approval_percentage: Option<Decimal>,
    /// Explicit steps.
    pub steps: &'a [ApprovalFlowStep],
}

/// Stateless rule validator.
pub struct RuleValidator;

impl RuleValidator {
    /// Validate name, percentage and step structure.
    pub fn validate(draft: &RuleDraft<'_>) -> Result<(), RuleError> {
        if draft.name.trim().is_empty() {
            return Err(RuleError::NameRequired);
        }
        if let Some(pct) = draft.min_approval_percentage
            && (pct < Decimal::ZERO || pct > Decimal::ONE_HUNDRED)
        {
            return Err(RuleError::PercentageOutOfRange(pct));
        }
        Self::validate_steps(draft.steps)
    }

    /// Step orders are at least 1 and unique; approvers are distinct.
    pub fn validate_steps(steps: &[ApprovalFlowStep]) -> Result<(), RuleError> {
        let mut orders = HashSet::new();
        let mut approvers = HashSet::new();
        for step in steps {
            if step.step_order < 1 {
                return Err(RuleError::InvalidStepOrder(step.step_order));
            }
            if !orders.insert(step.step_order) {
                return Err(RuleError::DuplicateStepOrder(step.step_order));
            }
            if !approvers.insert(step.approver_id) {
                return Err(RuleError::DuplicateApprover(step.approver_id));
            }
        }
        Ok(())
    }

    /// Every step approver must be among `company_users`.
    pub fn validate_approvers_in_company(
        steps: &[ApprovalFlowStep],
        company_users: &HashSet<Uuid>,
    ) -> Result<(), RuleError> {
        steps
            .iter()
            .find(|s| !company_users.contains(&s.approver_id))
            .map_or(Ok(()), |s| {
                Err(RuleError::ApproverOutsideCompany(s.approver_id))
            })
    }
}
