//! `SeaORM` entity definitions.

pub mod prelude;

pub mod approval_flow_steps;
pub mod approval_rules;
pub mod companies;
pub mod expense_approvals;
pub mod expenses;
pub mod sea_orm_active_enums;
pub mod users;
