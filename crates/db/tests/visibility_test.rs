//! Integration tests for role-scoped expense reads.

mod common;

use std::collections::HashSet;

use rust_decimal_macros::dec;

use common::{expense_input, setup_org};
use reimburse_core::identity::Role;
use reimburse_core::workflow::WorkflowError;
use reimburse_db::repositories::{CompanyRepository, ExpenseRepository, UserRepository};

#[tokio::test]
async fn test_visibility_by_role() {
    let org = setup_org().await;
    let expenses = ExpenseRepository::new(org.db.clone());

    let m = expenses.create(&org.manager, expense_input(dec!(1.00))).await.unwrap();
    let a = expenses.create(&org.alice, expense_input(dec!(2.00))).await.unwrap();
    let b = expenses.create(&org.bob, expense_input(dec!(3.00))).await.unwrap();
    let c = expenses.create(&org.carol, expense_input(dec!(4.00))).await.unwrap();

    let ids = |list: Vec<reimburse_db::entities::expenses::Model>| -> HashSet<_> {
        list.into_iter().map(|e| e.id).collect()
    };

    let manager_view = ids(expenses.list_visible(&org.manager).await.unwrap());
    assert_eq!(
        manager_view,
        [m.expense.id, a.expense.id, b.expense.id]
            .into_iter()
            .collect::<HashSet<_>>()
    );

    let alice_view = ids(expenses.list_visible(&org.alice).await.unwrap());
    assert_eq!(alice_view, HashSet::from([a.expense.id]));

    let admin_view = ids(expenses.list_visible(&org.admin).await.unwrap());
    assert_eq!(admin_view.len(), 4);
    assert!(admin_view.contains(&c.expense.id));
}

#[tokio::test]
async fn test_get_outside_scope_is_not_found() {
    let org = setup_org().await;
    let expenses = ExpenseRepository::new(org.db.clone());
    let c = expenses.create(&org.carol, expense_input(dec!(4.00))).await.unwrap();

    let by_manager = expenses.get(&org.manager, c.expense.id).await;
    assert!(matches!(by_manager, Err(WorkflowError::NotFound { .. })));

    let by_admin = expenses.get(&org.admin, c.expense.id).await.unwrap();
    assert_eq!(by_admin.expense.owner_id, org.carol.id);
}

#[tokio::test]
async fn test_other_company_is_invisible() {
    let org = setup_org().await;
    let expenses = ExpenseRepository::new(org.db.clone());
    let a = expenses.create(&org.alice, expense_input(dec!(2.00))).await.unwrap();

    let other = CompanyRepository::new(org.db.clone())
        .create("Globex", "EUR", None)
        .await
        .unwrap();
    let outsider =
        common::add_user(&UserRepository::new(org.db.clone()), other.id, "Olga", Role::Admin, None).await;

    assert!(expenses.list_visible(&outsider).await.unwrap().is_empty());
    assert!(matches!(
        expenses.get(&outsider, a.expense.id).await,
        Err(WorkflowError::NotFound { .. })
    ));
}
