//! User directory and team routes.

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use reimburse_core::identity::Role;
use reimburse_db::repositories::{NewUser, UserRepository};

use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Creates user routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", delete(delete_user))
        .route("/team", get(team))
}

/// Request body for creating a user.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// `manager` or `employee`.
    pub role: Role,
    /// Direct manager in the same company.
    pub manager_id: Option<Uuid>,
}

/// GET /users
async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let repo = UserRepository::new((*state.db).clone());
    let users = repo.list_users(auth.actor()).await?;
    Ok(Json(json!({ "data": users })))
}

/// POST /users
async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let repo = UserRepository::new((*state.db).clone());

    let user = repo
        .create_user(
            auth.actor(),
            NewUser {
                name: payload.name,
                email: payload.email,
                role: payload.role,
                manager_id: payload.manager_id,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// DELETE /users/{id}
async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = id?;
    let repo = UserRepository::new((*state.db).clone());
    repo.delete_user(auth.actor(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /team
async fn team(State(state): State<AppState>, auth: AuthUser) -> Result<impl IntoResponse, ApiError> {
    let repo = UserRepository::new((*state.db).clone());
    let members = repo.team(auth.actor()).await?;
    Ok(Json(json!({ "data": members })))
}

#[cfg(test)]
mod integration_tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::test_support::TestApp;

    #[tokio::test]
    async fn test_admin_creates_employee() {
        let app = TestApp::new().await;
        let (status, user) = app
            .send(
                Method::POST,
                "/api/v1/users",
                Some(&app.token(app.admin)),
                Some(json!({
                    "name": "Dana",
                    "email": "Dana@Example.com",
                    "role": "employee",
                    "manager_id": app.manager
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(user["email"], "dana@example.com");
        assert_eq!(user["role"], "employee");

        let (status, body) = app
            .send(
                Method::POST,
                "/api/v1/users",
                Some(&app.token(app.admin)),
                Some(json!({
                    "name": "Dana Again",
                    "email": "dana@example.com",
                    "role": "employee"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_team_is_manager_only() {
        let app = TestApp::new().await;

        let (status, team) = app
            .send(Method::GET, "/api/v1/team", Some(&app.token(app.manager)), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(team["data"].as_array().map(Vec::len), Some(1));

        let (status, _) = app
            .send(Method::GET, "/api/v1/team", Some(&app.token(app.alice)), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_employee_cannot_list_users() {
        let app = TestApp::new().await;
        let (status, _) = app
            .send(Method::GET, "/api/v1/users", Some(&app.token(app.alice)), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_delete_user_over_http() {
        let app = TestApp::new().await;
        let token = app.token(app.admin);

        let (status, body) = app
            .send(Method::DELETE, &format!("/api/v1/users/{}", app.admin), Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");

        let (status, _) = app
            .send(Method::DELETE, &format!("/api/v1/users/{}", app.alice), Some(&app.token(app.manager)), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = app
            .send(Method::DELETE, &format!("/api/v1/users/{}", app.alice), Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = app
            .send(Method::DELETE, &format!("/api/v1/users/{}", app.alice), Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "NOT_FOUND");

        let (status, _) = app
            .send(Method::GET, "/api/v1/expenses", Some(&app.token(app.alice)), None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
