//! Property-based tests for ChainBuilder.

use chrono::Utc;
use proptest::prelude::*;
use uuid::Uuid;

use crate::rules::{ApprovalFlowStep, ApprovalRule};
use crate::workflow::chain::ChainBuilder;

fn arb_uuid() -> impl Strategy<Value = Uuid> {
    any::<u128>().prop_map(Uuid::from_u128)
}

/// Steps with distinct step orders in arbitrary sequence.
fn arb_steps() -> impl Strategy<Value = Vec<ApprovalFlowStep>> {
    prop::collection::btree_set(1i32..50, 0..8)
        .prop_flat_map(|orders| {
            let orders: Vec<i32> = orders.into_iter().collect();
            let n = orders.len();
            (Just(orders), prop::collection::vec(arb_uuid(), n))
        })
        .prop_map(|(orders, approvers)| {
            orders
                .into_iter()
                .zip(approvers)
                .map(|(step_order, approver_id)| ApprovalFlowStep {
                    step_order,
                    approver_id,
                    is_required: true,
                })
                .collect::<Vec<_>>()
        })
        .prop_shuffle()
}

fn rule(manager_default: bool, steps: Vec<ApprovalFlowStep>) -> ApprovalRule {
    ApprovalRule {
        id: Uuid::nil(),
        company_id: Uuid::nil(),
        name: "rule".to_string(),
        description: None,
        is_manager_default_approver: manager_default,
        min_approval_percentage: None,
        steps,
        created_at: Utc::now(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Explicit rules produce one row per step, ascending, step orders kept.
    #[test]
    fn prop_one_row_per_step(steps in arb_steps(), manager in prop::option::of(arb_uuid())) {
        let chain = ChainBuilder::build(&rule(false, steps.clone()), manager);
        prop_assert_eq!(chain.len(), steps.len());
        prop_assert!(chain.windows(2).all(|w| w[0].step_order < w[1].step_order));
        for planned in &chain {
            let found = steps
                .iter()
                .any(|s| s.step_order == planned.step_order && s.approver_id == planned.approver_id);
            prop_assert!(found);
        }
    }

    /// Manager-default rules produce exactly as many rows as there are managers.
    #[test]
    fn prop_manager_default(steps in arb_steps(), manager in prop::option::of(arb_uuid())) {
        let chain = ChainBuilder::build(&rule(true, steps), manager);
        prop_assert_eq!(chain.len(), usize::from(manager.is_some()));
        if let Some(m) = manager {
            prop_assert_eq!(chain[0].approver_id, m);
            prop_assert_eq!(chain[0].step_order, 1);
        }
    }
}
