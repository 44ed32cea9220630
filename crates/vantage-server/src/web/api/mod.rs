pub mod auth;
pub mod middleware;
pub mod users;

use crate::session::AUTH_COOKIE_NAME;
use crate::state::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Json, Router, routing::get, routing::post, routing::put};
use serde_json::json;
use std::sync::Arc;

/// GET /api/config -- public endpoint returning auth settings for the UI
async fn get_config(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "login_path": state.protector.login_path(),
        "cookie_name": AUTH_COOKIE_NAME,
    }))
}

pub fn build_api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        // Public config endpoint
        .route("/config", get(get_config))
        // Auth routes
        .route("/auth/login", post(auth::login))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        // Admin-only user management
        .route("/admin/users", get(users::list_users))
        .route("/admin/users/{id}", get(users::get_user))
        .route("/admin/users/{id}/role", put(users::set_user_role))
        .with_state(state)
}
