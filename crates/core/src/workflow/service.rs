//! Workflow service for expense state transitions.
//!
//! This module implements the state machine that moves an expense from
//! draft to its final status and records each approver's decision.

use chrono::Utc;

use crate::workflow::error::WorkflowError;
use crate::workflow::types::{ApprovalAction, ApprovalDecision, ApprovalStatus, ExpenseStatus};

/// Stateless service for expense workflow transitions.
///
/// Persistence (row locking, writing the decision, storing the recomputed
/// status) belongs to the caller; every method here is a pure check.
pub struct WorkflowService;

impl WorkflowService {
    /// Submit a draft expense for approval.
    ///
    /// # Arguments
    /// * `current_status` - The current status of the expense
    /// * `approval_count` - Number of approval rows built for the expense
    ///
    /// # Returns
    /// * `Ok(ExpenseStatus::Pending)` if the transition is valid
    /// * `Err(WorkflowError::InvalidState)` if not in Draft status
    /// * `Err(WorkflowError::NoApprovalFlow)` if the expense has no approvers
    pub fn submit(
        current_status: ExpenseStatus,
        approval_count: usize,
    ) -> Result<ExpenseStatus, WorkflowError> {
        if current_status != ExpenseStatus::Draft {
            return Err(WorkflowError::InvalidState {
                status: current_status,
                reason: "Only draft expenses can be submitted",
            });
        }
        if approval_count == 0 {
            return Err(WorkflowError::NoApprovalFlow);
        }
        Ok(ExpenseStatus::Pending)
    }

    /// Validate an approver's action and produce the decision to persist.
    ///
    /// The approver's own row is checked before the expense, so acting twice
    /// always reports `AlreadyActed`. A blank comment is stored as `None`.
    pub fn act(
        expense_status: ExpenseStatus,
        approval_status: ApprovalStatus,
        action: ApprovalAction,
        comment: Option<String>,
    ) -> Result<ApprovalDecision, WorkflowError> {
        if approval_status.is_terminal() {
            return Err(WorkflowError::AlreadyActed {
                status: approval_status,
            });
        }
        if expense_status != ExpenseStatus::Pending {
            return Err(WorkflowError::InvalidState {
                status: expense_status,
                reason: "Only pending expenses can be acted on",
            });
        }

        Ok(ApprovalDecision {
            status: action.resulting_status(),
            comment: comment
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            acted_at: Utc::now(),
        })
    }

    /// Resolve the expense status from all of its approval rows.
    ///
    /// Any rejection wins; otherwise every row approved means approved;
    /// anything else stays pending. An empty set stays pending too, since a
    /// pending expense always carries at least one row.
    pub fn resolve<I>(statuses: I) -> ExpenseStatus
    where
        I: IntoIterator<Item = ApprovalStatus>,
    {
        let mut seen = false;
        let mut all_approved = true;
        for status in statuses {
            seen = true;
            match status {
                ApprovalStatus::Rejected => return ExpenseStatus::Rejected,
                ApprovalStatus::Pending => all_approved = false,
                ApprovalStatus::Approved => {}
            }
        }

        if seen && all_approved {
            ExpenseStatus::Approved
        } else {
            ExpenseStatus::Pending
        }
    }

    /// Check if a status transition is valid.
    ///
    /// Valid transitions:
    /// - Draft → Pending (submit)
    /// - Pending → Approved (last approval)
    /// - Pending → Rejected (any rejection)
    #[must_use]
    pub fn is_valid_transition(from: ExpenseStatus, to: ExpenseStatus) -> bool {
        matches!(
            (from, to),
            (ExpenseStatus::Draft, ExpenseStatus::Pending)
                | (
                    ExpenseStatus::Pending,
                    ExpenseStatus::Approved | ExpenseStatus::Rejected
                )
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_from_draft() {
        let result = WorkflowService::submit(ExpenseStatus::Draft, 2);
        assert_eq!(result.unwrap(), ExpenseStatus::Pending);
    }

    #[test]
    fn test_submit_from_non_draft_fails() {
        for status in [
            ExpenseStatus::Pending,
            ExpenseStatus::Approved,
            ExpenseStatus::Rejected,
        ] {
            let result = WorkflowService::submit(status, 1);
            assert!(matches!(
                result,
                Err(WorkflowError::InvalidState { status: s, .. }) if s == status
            ));
        }
    }

    #[test]
    fn test_submit_without_approvers_fails() {
        let result = WorkflowService::submit(ExpenseStatus::Draft, 0);
        assert!(matches!(result, Err(WorkflowError::NoApprovalFlow)));
    }

    #[test]
    fn test_submit_checks_status_before_flow() {
        let result = WorkflowService::submit(ExpenseStatus::Approved, 0);
        assert!(matches!(result, Err(WorkflowError::InvalidState { .. })));
    }

    #[test]
    fn test_act_approve() {
        let decision = WorkflowService::act(
            ExpenseStatus::Pending,
            ApprovalStatus::Pending,
            ApprovalAction::Approve,
            Some("ok".to_string()),
        )
        .unwrap();
        assert_eq!(decision.status, ApprovalStatus::Approved);
        assert_eq!(decision.comment.as_deref(), Some("ok"));
    }

    #[test]
    fn test_act_blank_comment_dropped() {
        let decision = WorkflowService::act(
            ExpenseStatus::Pending,
            ApprovalStatus::Pending,
            ApprovalAction::Reject,
            Some("   ".to_string()),
        )
        .unwrap();
        assert_eq!(decision.status, ApprovalStatus::Rejected);
        assert_eq!(decision.comment, None);
    }

    #[test]
    fn test_act_twice_fails() {
        let result = WorkflowService::act(
            ExpenseStatus::Rejected,
            ApprovalStatus::Rejected,
            ApprovalAction::Approve,
            None,
        );
        assert!(matches!(
            result,
            Err(WorkflowError::AlreadyActed {
                status: ApprovalStatus::Rejected
            })
        ));
    }

    #[test]
    fn test_act_on_draft_fails() {
        let result = WorkflowService::act(
            ExpenseStatus::Draft,
            ApprovalStatus::Pending,
            ApprovalAction::Reject,
            None,
        );
        assert!(matches!(result, Err(WorkflowError::InvalidState { .. })));
    }

    #[test]
    fn test_resolve() {
        use ApprovalStatus::{Approved, Pending, Rejected};
        assert_eq!(WorkflowService::resolve([Approved, Approved]), ExpenseStatus::Approved);
        assert_eq!(WorkflowService::resolve([Approved, Pending]), ExpenseStatus::Pending);
        assert_eq!(WorkflowService::resolve([Pending, Rejected]), ExpenseStatus::Rejected);
        assert_eq!(WorkflowService::resolve([]), ExpenseStatus::Pending);
    }

    #[test]
    fn test_valid_transitions() {
        assert!(WorkflowService::is_valid_transition(
            ExpenseStatus::Draft,
            ExpenseStatus::Pending
        ));
        assert!(WorkflowService::is_valid_transition(
            ExpenseStatus::Pending,
            ExpenseStatus::Rejected
        ));
        assert!(!WorkflowService::is_valid_transition(
            ExpenseStatus::Draft,
            ExpenseStatus::Approved
        ));
        assert!(!WorkflowService::is_valid_transition(
            ExpenseStatus::Approved,
            ExpenseStatus::Pending
        ));
    }
}
