//! Rule selection for new expenses.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::rules::types::ApprovalRule;

/// The expense attributes a selector may match on.
#[derive(Debug, Clone, Copy)]
pub struct ExpenseCandidate<'a> {
    /// Expense owner.
    pub owner_id: Uuid,
    /// Amount in the expense currency.
    pub amount: Decimal,
    /// ISO currency code.
    pub currency: &'a str,
    /// Expense category.
    pub category: &'a str,
}

/// Picks the rule an expense is routed through.
pub trait RuleSelector: Send + Sync {
    /// Select from the company's rules, or `None` when no rule applies.
    fn select<'r>(
        &self,
        rules: &'r [ApprovalRule],
        expense: &ExpenseCandidate<'_>,
    ) -> Option<&'r ApprovalRule>;
}

/// Selects the oldest rule of the company, ties broken by id.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstRuleSelector;

impl RuleSelector for FirstRuleSelector {
    fn select<'r>(
        &self,
        rules: &'r [ApprovalRule],
        _expense: &ExpenseCandidate<'_>,
    ) -> Option<&'r ApprovalRule> {
        rules.iter().min_by_key(|r| (r.created_at, r.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;

    fn rule(id: u128, age_secs: i64) -> ApprovalRule {
        ApprovalRule {
            id: Uuid::from_u128(id),
            company_id: Uuid::nil(),
            name: format!("rule-{id}"),
            description: None,
            is_manager_default_approver: true,
            min_approval_percentage: None,
            steps: vec![],
            created_at: Utc::now() - Duration::seconds(age_secs),
        }
    }

    fn candidate() -> ExpenseCandidate<'static> {
        ExpenseCandidate {
            owner_id: Uuid::new_v4(),
            amount: dec!(42.50),
            currency: "USD",
            category: "Travel",
        }
    }

    #[test]
    fn test_no_rules() {
        assert!(FirstRuleSelector.select(&[], &candidate()).is_none());
    }

    #[test]
    fn test_oldest_rule_wins() {
        let rules = vec![rule(1, 10), rule(2, 100), rule(3, 50)];
        let selected = FirstRuleSelector.select(&rules, &candidate()).unwrap();
        assert_eq!(selected.id, Uuid::from_u128(2));
    }

    #[test]
    fn test_tie_broken_by_id() {
        let mut a = rule(7, 0);
        let mut b = rule(3, 0);
        let now = Utc::now();
        a.created_at = now;
        b.created_at = now;
        let rules = vec![a, b];
        let selected = FirstRuleSelector.select(&rules, &candidate()).unwrap();
        assert_eq!(selected.id, Uuid::from_u128(3));
    }
}
