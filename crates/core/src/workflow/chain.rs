//! Approval chain construction.
//!
//! Turns the rule selected for a new expense into the approval rows that
//! are inserted alongside it.

use uuid::Uuid;

use crate::rules::ApprovalRule;

/// Step order given to the single row of a manager-default chain.
pub const MANAGER_STEP_ORDER: i32 = 1;

/// An approval row to be created, still pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedApproval {
    /// User who must act on the expense.
    pub approver_id: Uuid,
    /// Position in the chain.
    pub step_order: i32,
}

/// Builds approval chains from rules.
pub struct ChainBuilder;

impl ChainBuilder {
    /// Materialize the chain for an expense.
    ///
    /// A manager-default rule yields one row for the owner's manager, or none
    /// when the owner has no manager. Otherwise every step yields one row,
    /// ascending by `step_order`.
    #[must_use]
    pub fn build(rule: &ApprovalRule, owner_manager: Option<Uuid>) -> Vec<PlannedApproval> {
        if rule.is_manager_default_approver {
            return owner_manager
                .map(|approver_id| PlannedApproval {
                    approver_id,
                    step_order: MANAGER_STEP_ORDER,
                })
                .into_iter()
                .collect();
        }

        let mut chain: Vec<PlannedApproval> = rule
            .steps
            .iter()
            .map(|step| PlannedApproval {
                approver_id: step.approver_id,
                step_order: step.step_order,
            })
            .collect();
        chain.sort_by_key(|p| p.step_order);
        chain
    }
}
