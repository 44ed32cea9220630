use crate::auth::{hash_password, verify_password, verify_unknown_account};
use crate::state::AppState;
use crate::web::api::middleware::AuthUser;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use vantage_common::models::auth::{Identity, Role};
use vantage_common::validation::is_valid_email;
use vantage_db::{CreateUserError, NewUser};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn user_body(identity: &Identity) -> serde_json::Value {
    json!({
        "id": identity.id,
        "email": identity.email,
        "name": identity.name,
        "role": identity.role,
    })
}

fn invalid_login() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": "Invalid email or password"})),
    )
        .into_response()
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": "Internal server error"})),
    )
        .into_response()
}

fn email_in_use() -> Response {
    (
        StatusCode::CONFLICT,
        Json(json!({"error": "Email already in use"})),
    )
        .into_response()
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({"error": message}))).into_response()
}

/// Issue a token for `identity` and attach it to `jar` as the session cookie
fn start_session(state: &AppState, jar: CookieJar, identity: &Identity) -> Result<CookieJar, Response> {
    let token = state.codec.issue(identity).map_err(|e| {
        tracing::error!("Failed to create session token: {:#}", e);
        internal_error()
    })?;
    let mut session = state.session(jar);
    session.store(&token);
    Ok(session.into_inner())
}

/// POST /api/auth/login
#[tracing::instrument(skip(state, jar, req))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Response {
    let email = normalize_email(&req.email);

    // Unknown email and wrong password get the same answer.
    let row = match state.users.get_by_email(&email).await {
        Ok(Some(row)) => row,
        Ok(None) => {
            verify_unknown_account(&req.password);
            return invalid_login();
        }
        Err(e) => {
            tracing::error!("DB error during login: {:#}", e);
            return internal_error();
        }
    };

    match verify_password(&req.password, &row.password_hash) {
        Ok(true) => {}
        Ok(false) => return invalid_login(),
        Err(e) => {
            tracing::error!("Password verification error: {:#}", e);
            return internal_error();
        }
    }

    let user = match row.to_user() {
        Ok(u) => u,
        Err(e) => {
            tracing::error!("Stored user is unusable: {:#}", e);
            return internal_error();
        }
    };
    let identity = user.identity();

    let jar = match start_session(&state, jar, &identity) {
        Ok(jar) => jar,
        Err(response) => return response,
    };

    if let Err(e) = state.users.touch_last_login(user.user_id).await {
        tracing::warn!("Failed to record login time: {:#}", e);
    }

    tracing::info!(user_id = %identity.id, "User logged in");
    (jar, Json(json!({"user": user_body(&identity)}))).into_response()
}

/// POST /api/auth/signup
#[tracing::instrument(skip(state, jar, req))]
pub async fn signup(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<SignupRequest>,
) -> Response {
    let email = normalize_email(&req.email);
    let name = req.name.trim();

    if !is_valid_email(&email) {
        return bad_request("Invalid email address");
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return bad_request("Password must be at least 6 characters");
    }
    if name.is_empty() {
        return bad_request("Name is required");
    }

    match state.users.get_by_email(&email).await {
        Ok(None) => {}
        Ok(Some(_)) => return email_in_use(),
        Err(e) => {
            tracing::error!("DB error during signup: {:#}", e);
            return internal_error();
        }
    }

    let password_hash = match hash_password(&req.password) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!("Failed to hash password: {:#}", e);
            return internal_error();
        }
    };

    let row = match state
        .users
        .create(NewUser {
            email,
            name: name.to_string(),
            password_hash,
            role: Role::User,
            profile_image: None,
        })
        .await
    {
        Ok(row) => row,
        // Lost a race with a concurrent signup for the same address
        Err(CreateUserError::DuplicateEmail(_)) => return email_in_use(),
        Err(e) => {
            tracing::error!("Failed to create user: {:#}", e);
            return internal_error();
        }
    };

    let identity = match row.to_user() {
        Ok(u) => u.identity(),
        Err(e) => {
            tracing::error!("Created user is unusable: {:#}", e);
            return internal_error();
        }
    };

    let jar = match start_session(&state, jar, &identity) {
        Ok(jar) => jar,
        Err(response) => return response,
    };

    tracing::info!(user_id = %identity.id, "User signed up");
    (
        StatusCode::CREATED,
        jar,
        Json(json!({"user": user_body(&identity)})),
    )
        .into_response()
}

/// POST /api/auth/logout
#[tracing::instrument(skip(state, jar))]
pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let mut session = state.session(jar);
    session.clear();
    (session.into_inner(), Json(json!({"status": "ok"}))).into_response()
}

/// GET /api/auth/me
#[tracing::instrument(skip(auth))]
pub async fn me(auth: AuthUser) -> impl IntoResponse {
    Json(json!({"user": auth.0}))
}
