//! In-process harness for route tests.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use chrono::{DateTime, Duration, Utc};
use http_body_util::BodyExt;
use jsonwebtoken::{EncodingKey, Header, encode};
use sea_orm::{Database, DatabaseConnection};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use reimburse_core::identity::Role;
use reimburse_db::migration::{Migrator, MigratorTrait};
use reimburse_db::repositories::{
    ApprovalRuleRepository, CompanyRepository, CreateApprovalRuleInput, NewUser, UserRepository,
};
use reimburse_shared::{Claims, JwtConfig, JwtService};

use crate::{AppState, create_router};

const SECRET: &str = "route-test-secret";

/// A router over a fresh in-memory database holding one company with an
/// admin, a manager and one employee reporting to the manager.
pub(crate) struct TestApp {
    router: Router,
    db: DatabaseConnection,
    pub company_id: Uuid,
    pub admin: Uuid,
    pub manager: Uuid,
    pub alice: Uuid,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to open in-memory database");
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        let company = CompanyRepository::new(db.clone())
            .create("Acme", "USD", Some("US"))
            .await
            .expect("Failed to create company");

        let users = UserRepository::new(db.clone());
        let admin = insert_user(&users, company.id, "admin", Role::Admin, None).await;
        let manager = insert_user(&users, company.id, "manager", Role::Manager, None).await;
        let alice = insert_user(&users, company.id, "alice", Role::Employee, Some(manager)).await;

        let state = AppState {
            db: Arc::new(db.clone()),
            jwt_service: Arc::new(JwtService::new(&JwtConfig {
                secret: SECRET.to_string(),
            })),
        };

        Self {
            router: create_router(state),
            db,
            company_id: company.id,
            admin,
            manager,
            alice,
        }
    }

    /// Signs a token for a user of the test company.
    pub fn token(&self, user_id: Uuid) -> String {
        self.token_for_company(user_id, self.company_id)
    }

    pub fn token_for_company(&self, user_id: Uuid, company_id: Uuid) -> String {
        sign(&Claims::new(user_id, company_id, Utc::now() + Duration::hours(1)))
    }

    pub fn token_expiring(&self, user_id: Uuid, expires_at: DateTime<Utc>) -> String {
        sign(&Claims::new(user_id, self.company_id, expires_at))
    }

    /// Installs a manager-default rule as the company's first rule.
    pub async fn manager_default_rule(&self) {
        let admin = UserRepository::new(self.db.clone())
            .load_actor(self.admin, self.company_id)
            .await
            .expect("Failed to load admin")
            .expect("Admin missing");
        ApprovalRuleRepository::new(self.db.clone())
            .create_rule(
                &admin,
                CreateApprovalRuleInput {
                    name: "Manager approves".to_string(),
                    description: None,
                    is_manager_default_approver: true,
                    min_approval_percentage: None,
                    steps: Vec::new(),
                },
            )
            .await
            .expect("Failed to create rule");
    }

    /// Sends a request and returns the status with the parsed JSON body
    /// (`Value::Null` when the body is empty).
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }
}

async fn insert_user(
    users: &UserRepository,
    company_id: Uuid,
    name: &str,
    role: Role,
    manager_id: Option<Uuid>,
) -> Uuid {
    users
        .insert(
            company_id,
            NewUser {
                name: name.to_string(),
                email: format!("{name}@acme.test"),
                role,
                manager_id,
            },
        )
        .await
        .expect("Failed to create user")
        .id
}

fn sign(claims: &Claims) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("Failed to sign token")
}
