//! Demo data seeder.
//!
//! Creates one company with an admin, two managers and their reports, plus
//! a manager-default rule and a two-step finance rule. Skips everything when
//! the demo company already exists.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use rust_decimal::Decimal;
use uuid::Uuid;

use reimburse_core::identity::{Actor, Role};
use reimburse_core::rules::ApprovalFlowStep;
use reimburse_db::repositories::{
    ApprovalRuleRepository, CompanyRepository, CreateApprovalRuleInput, NewUser, UserRepository,
};
use reimburse_shared::AppConfig;

const DEMO_COMPANY: &str = "Demo Travel Co";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    println!("Connecting to database...");
    let db = reimburse_db::connect(&config.database)
        .await
        .context("Failed to connect to database")?;

    let companies = CompanyRepository::new(db.clone());
    if companies.find_by_name(DEMO_COMPANY).await?.is_some() {
        println!("  Demo company already exists, skipping...");
        return Ok(());
    }

    println!("Seeding company...");
    let company = companies.create(DEMO_COMPANY, "USD", Some("US")).await?;

    println!("Seeding users...");
    let users = UserRepository::new(db.clone());
    let admin = seed_user(&users, company.id, "Avery Admin", Role::Admin, None).await?;
    let ops = seed_user(&users, company.id, "Morgan Ops", Role::Manager, None).await?;
    let finance = seed_user(&users, company.id, "Riley Finance", Role::Manager, None).await?;
    for name in ["Sam Field", "Jordan Sales"] {
        seed_user(&users, company.id, name, Role::Employee, Some(ops.id)).await?;
    }

    println!("Seeding approval rules...");
    let rules = ApprovalRuleRepository::new(db);
    rules
        .create_rule(
            &admin,
            CreateApprovalRuleInput {
                name: "Manager approves".to_string(),
                description: Some("Direct manager signs off".to_string()),
                is_manager_default_approver: true,
                min_approval_percentage: None,
                steps: Vec::new(),
            },
        )
        .await?;
    rules
        .create_rule(
            &admin,
            CreateApprovalRuleInput {
                name: "Finance review".to_string(),
                description: Some("Operations then finance".to_string()),
                is_manager_default_approver: false,
                min_approval_percentage: Some(Decimal::ONE_HUNDRED),
                steps: vec![
                    ApprovalFlowStep {
                        step_order: 1,
                        approver_id: ops.id,
                        is_required: true,
                    },
                    ApprovalFlowStep {
                        step_order: 2,
                        approver_id: finance.id,
                        is_required: true,
                    },
                ],
            },
        )
        .await?;

    println!("Seeding complete! Company id: {}", company.id);
    Ok(())
}

async fn seed_user(
    users: &UserRepository,
    company_id: Uuid,
    name: &str,
    role: Role,
    manager_id: Option<Uuid>,
) -> anyhow::Result<Actor> {
    let email = format!("{}@demo.reimburse.dev", name.to_lowercase().replace(' ', "."));
    let user = users
        .insert(
            company_id,
            NewUser {
                name: name.to_string(),
                email: email.clone(),
                role,
                manager_id,
            },
        )
        .await?;
    println!("  Created {role}: {email}");

    Ok(Actor {
        id: user.id,
        company_id,
        role,
        manager_id,
    })
}
