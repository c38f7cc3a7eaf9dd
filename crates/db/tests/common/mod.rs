//! Shared fixtures for database integration tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use reimburse_core::identity::{Actor, Role};
use reimburse_core::rules::ApprovalFlowStep;
use reimburse_db::migration::{Migrator, MigratorTrait};
use reimburse_shared::DatabaseConfig;
use reimburse_db::repositories::{
    ApprovalRuleRepository, CompanyRepository, CreateApprovalRuleInput, CreateExpenseInput,
    NewUser, UserRepository,
};

/// Postgres connection for tests that need real row locks, taken from
/// `DATABASE_URL` or `REIMBURSE__DATABASE__URL`. `None` when neither is set
/// or the server is unreachable.
pub async fn postgres_db() -> Option<DatabaseConnection> {
    let url = std::env::var("DATABASE_URL")
        .or_else(|_| std::env::var("REIMBURSE__DATABASE__URL"))
        .ok()
        .filter(|url| url.starts_with("postgres"))?;
    let config = DatabaseConfig {
        url,
        max_connections: 16,
        min_connections: 1,
    };
    let db = match reimburse_db::connect(&config).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Skipping test - database not available: {e}");
            return None;
        }
    };
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    Some(db)
}

/// In-memory SQLite with all migrations applied.
pub async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

/// One company with an admin, a manager with two reports, and a loner.
pub struct Org {
    pub db: DatabaseConnection,
    pub company_id: Uuid,
    pub admin: Actor,
    pub manager: Actor,
    pub alice: Actor,
    pub bob: Actor,
    pub carol: Actor,
}

pub async fn setup_org() -> Org {
    setup_org_on(setup_db().await).await
}

/// Seeds a fresh company into an already migrated database.
pub async fn setup_org_on(db: DatabaseConnection) -> Org {
    let company = CompanyRepository::new(db.clone())
        .create(&format!("Acme {}", Uuid::new_v4()), "usd", Some("US"))
        .await
        .expect("Failed to create company");

    let users = UserRepository::new(db.clone());
    let admin = add_user(&users, company.id, "Ada Admin", Role::Admin, None).await;
    let manager = add_user(&users, company.id, "Max Manager", Role::Manager, None).await;
    let alice = add_user(&users, company.id, "Alice", Role::Employee, Some(manager.id)).await;
    let bob = add_user(&users, company.id, "Bob", Role::Employee, Some(manager.id)).await;
    let carol = add_user(&users, company.id, "Carol", Role::Employee, None).await;

    Org {
        db,
        company_id: company.id,
        admin,
        manager,
        alice,
        bob,
        carol,
    }
}

pub async fn add_user(
    users: &UserRepository,
    company_id: Uuid,
    name: &str,
    role: Role,
    manager_id: Option<Uuid>,
) -> Actor {
    let email = format!(
        "{}.{}@example.com",
        name.to_lowercase().replace(' ', "."),
        Uuid::new_v4().simple()
    );
    let model = users
        .insert(
            company_id,
            NewUser {
                name: name.to_string(),
                email,
                role,
                manager_id,
            },
        )
        .await
        .expect("Failed to create user");

    Actor {
        id: model.id,
        company_id: model.company_id,
        role: model.role.into(),
        manager_id: model.manager_id,
    }
}

pub fn step(step_order: i32, approver_id: Uuid) -> ApprovalFlowStep {
    ApprovalFlowStep {
        step_order,
        approver_id,
        is_required: true,
    }
}

pub async fn manager_default_rule(org: &Org) -> Uuid {
    ApprovalRuleRepository::new(org.db.clone())
        .create_rule(
            &org.admin,
            CreateApprovalRuleInput {
                name: "Manager approves".to_string(),
                description: None,
                is_manager_default_approver: true,
                min_approval_percentage: None,
                steps: vec![],
            },
        )
        .await
        .expect("Failed to create rule")
        .rule
        .id
}

pub async fn explicit_rule(org: &Org, approvers: &[Uuid]) -> Uuid {
    let steps = approvers
        .iter()
        .zip(1..)
        .map(|(id, order)| step(order, *id))
        .collect();
    ApprovalRuleRepository::new(org.db.clone())
        .create_rule(
            &org.admin,
            CreateApprovalRuleInput {
                name: "Explicit chain".to_string(),
                description: Some("Named approvers".to_string()),
                is_manager_default_approver: false,
                min_approval_percentage: None,
                steps,
            },
        )
        .await
        .expect("Failed to create rule")
        .rule
        .id
}

pub fn expense_input(amount: Decimal) -> CreateExpenseInput {
    CreateExpenseInput {
        amount,
        currency: "USD".to_string(),
        converted_amount: None,
        category: "Travel".to_string(),
        description: Some("Client visit".to_string()),
        expense_date: NaiveDate::from_ymd_opt(2026, 2, 14).expect("valid date"),
        remarks: None,
    }
}
