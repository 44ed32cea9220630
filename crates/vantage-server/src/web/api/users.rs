use crate::state::AppState;
use crate::web::api::middleware::AdminUser;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;
use vantage_common::models::auth::{Role, User};
use vantage_db::UserRow;

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: Role,
}

fn parse_user_id(id: &str) -> Result<Uuid, axum::response::Response> {
    id.parse::<Uuid>().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Invalid user ID"})),
        )
            .into_response()
    })
}

fn to_users(rows: &[UserRow]) -> anyhow::Result<Vec<User>> {
    rows.iter().map(UserRow::to_user).collect()
}

/// GET /api/admin/users - List users
#[tracing::instrument(skip(state, _admin))]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(query): Query<ListUsersQuery>,
) -> impl IntoResponse {
    let limit = query.limit.clamp(1, 200);
    let offset = query.offset.max(0);

    let users = match state
        .users
        .list(limit, offset)
        .await
        .and_then(|rows| to_users(&rows))
    {
        Ok(u) => u,
        Err(e) => {
            tracing::error!("Failed to list users: {:#}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Internal server error"})),
            )
                .into_response();
        }
    };

    Json(users).into_response()
}

/// GET /api/admin/users/{id} - Get user detail
#[tracing::instrument(skip(state, _admin))]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let user_id = match parse_user_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.users.get_by_id(user_id).await {
        Ok(Some(row)) => match row.to_user() {
            Ok(user) => Json(user).into_response(),
            Err(e) => {
                tracing::error!("Failed to read user {}: {:#}", user_id, e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "Internal server error"})),
                )
                    .into_response()
            }
        },
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "User not found"})),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to get user: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Internal server error"})),
            )
                .into_response()
        }
    }
}

/// PUT /api/admin/users/{id}/role - Change a user's role
#[tracing::instrument(skip(state, admin, req))]
pub async fn set_user_role(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(id): Path<String>,
    Json(req): Json<SetRoleRequest>,
) -> impl IntoResponse {
    let user_id = match parse_user_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    // Admins cannot demote themselves.
    if admin.0.id == user_id.to_string() && req.role != Role::Admin {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Cannot remove your own admin role"})),
        )
            .into_response();
    }

    match state.users.set_role(user_id, req.role).await {
        Ok(Some(row)) => match row.to_user() {
            Ok(user) => {
                tracing::info!(user_id = %user_id, role = %req.role, "Changed user role");
                Json(user).into_response()
            }
            Err(e) => {
                tracing::error!("Failed to read user {}: {:#}", user_id, e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "Internal server error"})),
                )
                    .into_response()
            }
        },
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "User not found"})),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to update role: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Internal server error"})),
            )
                .into_response()
        }
    }
}
