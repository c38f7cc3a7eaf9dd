//! Property-based tests for WorkflowService.

use proptest::prelude::*;

use crate::workflow::error::WorkflowError;
use crate::workflow::service::WorkflowService;
use crate::workflow::types::{ApprovalAction, ApprovalStatus, ExpenseStatus};

fn arb_expense_status() -> impl Strategy<Value = ExpenseStatus> {
    prop_oneof![
        Just(ExpenseStatus::Draft),
        Just(ExpenseStatus::Pending),
        Just(ExpenseStatus::Approved),
        Just(ExpenseStatus::Rejected),
    ]
}

fn arb_approval_status() -> impl Strategy<Value = ApprovalStatus> {
    prop_oneof![
        Just(ApprovalStatus::Pending),
        Just(ApprovalStatus::Approved),
        Just(ApprovalStatus::Rejected),
    ]
}

fn arb_action() -> impl Strategy<Value = ApprovalAction> {
    prop_oneof![Just(ApprovalAction::Approve), Just(ApprovalAction::Reject)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Any rejection resolves to Rejected, wherever it sits.
    #[test]
    fn prop_any_rejection_wins(
        mut rows in prop::collection::vec(arb_approval_status(), 0..8),
        pos in any::<prop::sample::Index>(),
    ) {
        let idx = pos.index(rows.len() + 1);
        rows.insert(idx, ApprovalStatus::Rejected);
        prop_assert_eq!(WorkflowService::resolve(rows), ExpenseStatus::Rejected);
    }

    /// Resolution does not depend on row order.
    #[test]
    fn prop_resolve_order_independent(
        rows in prop::collection::vec(arb_approval_status(), 0..10),
    ) {
        let forward = WorkflowService::resolve(rows.iter().copied());
        let backward = WorkflowService::resolve(rows.iter().rev().copied());
        prop_assert_eq!(forward, backward);
    }

    /// All approved resolves to Approved; one pending keeps it Pending.
    #[test]
    fn prop_all_approved(n in 1usize..10, pending_at in any::<prop::sample::Index>()) {
        let mut rows = vec![ApprovalStatus::Approved; n];
        prop_assert_eq!(WorkflowService::resolve(rows.clone()), ExpenseStatus::Approved);

        let idx = pending_at.index(n);
        rows[idx] = ApprovalStatus::Pending;
        prop_assert_eq!(WorkflowService::resolve(rows), ExpenseStatus::Pending);
    }

    /// A terminal row can never be acted on again.
    #[test]
    fn prop_terminal_row_rejects_second_act(
        expense in arb_expense_status(),
        action in arb_action(),
        row in prop_oneof![Just(ApprovalStatus::Approved), Just(ApprovalStatus::Rejected)],
    ) {
        let result = WorkflowService::act(expense, row, action, None);
        prop_assert!(
            matches!(result, Err(WorkflowError::AlreadyActed { status }) if status == row),
            "expected AlreadyActed"
        );
    }

    /// Every successful transition is a forward edge of the lifecycle.
    #[test]
    fn prop_transitions_only_move_forward(
        from in arb_expense_status(),
        rows in prop::collection::vec(arb_approval_status(), 1..6),
    ) {
        if let Ok(to) = WorkflowService::submit(from, rows.len()) {
            prop_assert!(WorkflowService::is_valid_transition(from, to));
        }
        if from == ExpenseStatus::Pending {
            let to = WorkflowService::resolve(rows);
            prop_assert!(to == from || WorkflowService::is_valid_transition(from, to));
        }
    }
}
