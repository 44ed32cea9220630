use crate::auth::{AuthError, TokenCodec};
use crate::session::{CookieStore, SessionStore};
use crate::state::AppState;
use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use serde_json::json;
use std::sync::Arc;
use vantage_common::models::auth::{Identity, Role};

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::AuthenticationRequired | AuthError::InvalidCredential => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::InsufficientPermission => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::Configuration => "Internal server error".to_string(),
            ref other => other.to_string(),
        };
        (self.status(), Json(json!({"error": message}))).into_response()
    }
}

/// Check the token held by `session` against `allowed`.
///
/// Returns the caller's identity, or the rejection that should short-circuit
/// the handler. Reads only; calling it twice gives the same verdict.
pub fn guard<C: CookieStore>(
    session: &SessionStore<C>,
    codec: &TokenCodec,
    allowed: &[Role],
) -> Result<Identity, AuthError> {
    let token = session.read().ok_or(AuthError::AuthenticationRequired)?;

    let identity = codec.decode(&token).map_err(|e| {
        tracing::debug!("Rejected session credential: {}", e);
        AuthError::InvalidCredential
    })?;

    if !allowed.contains(&identity.role) {
        return Err(AuthError::InsufficientPermission);
    }
    Ok(identity)
}

/// Extractor for any signed-in caller, regardless of role
#[derive(Debug)]
pub struct AuthUser(pub Identity);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let session = state.session(CookieJar::from_headers(&parts.headers));
        guard(&session, &state.codec, Role::ALL).map(AuthUser)
    }
}

/// Extractor that only admits the `admin` role
#[derive(Debug)]
pub struct AdminUser(pub Identity);

impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let session = state.session(CookieJar::from_headers(&parts.headers));
        guard(&session, &state.codec, &[Role::Admin]).map(AdminUser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{AUTH_COOKIE_NAME, MemoryCookies};

    fn codec() -> TokenCodec {
        TokenCodec::new("guard-secret").unwrap()
    }

    fn session(cookies: MemoryCookies) -> SessionStore<MemoryCookies> {
        SessionStore::new(cookies, true)
    }

    fn anonymous() -> SessionStore<MemoryCookies> {
        session(MemoryCookies::new())
    }

    fn session_for(codec: &TokenCodec, role: Role) -> SessionStore<MemoryCookies> {
        let token = codec
            .issue(&Identity {
                id: "u-1".to_string(),
                email: "a@b.com".to_string(),
                name: "Ada".to_string(),
                role,
                profile_image: None,
            })
            .unwrap();
        session(MemoryCookies::with(AUTH_COOKIE_NAME, &token))
    }

    #[test]
    fn test_no_cookie_is_authentication_required() {
        let err = guard(&anonymous(), &codec(), &[Role::Admin]).unwrap_err();
        assert_eq!(err, AuthError::AuthenticationRequired);
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_bad_cookie_is_invalid_credential() {
        let bad = session(MemoryCookies::with(AUTH_COOKIE_NAME, "not-a-token"));
        let err = guard(&bad, &codec(), Role::ALL).unwrap_err();
        assert_eq!(err, AuthError::InvalidCredential);
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_user_role_on_admin_endpoint_is_forbidden() {
        let codec = codec();
        let err = guard(&session_for(&codec, Role::User), &codec, &[Role::Admin]).unwrap_err();
        assert_eq!(err, AuthError::InsufficientPermission);
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_unauthenticated_and_forbidden_are_distinguishable() {
        let codec = codec();
        let missing = guard(&anonymous(), &codec, &[Role::Admin]).unwrap_err();
        let forbidden = guard(&session_for(&codec, Role::User), &codec, &[Role::Admin]).unwrap_err();
        assert_ne!(missing, forbidden);
        assert_ne!(missing.status(), forbidden.status());
        assert_ne!(missing.to_string(), forbidden.to_string());
    }

    #[test]
    fn test_allowed_roles() {
        let codec = codec();
        let admin = guard(&session_for(&codec, Role::Admin), &codec, &[Role::Admin]).unwrap();
        assert_eq!(admin.role, Role::Admin);
        let user = guard(&session_for(&codec, Role::User), &codec, Role::ALL).unwrap();
        assert_eq!(user.role, Role::User);
    }

    #[test]
    fn test_guard_is_idempotent() {
        let codec = codec();
        let cases = [
            anonymous(),
            session(MemoryCookies::with(AUTH_COOKIE_NAME, "junk")),
            session_for(&codec, Role::User),
            session_for(&codec, Role::Admin),
        ];
        for session in cases {
            let first = guard(&session, &codec, &[Role::Admin]);
            let second = guard(&session, &codec, &[Role::Admin]);
            assert_eq!(first, second);
            assert!(session.into_inner().writes().is_empty());
        }
    }

    #[test]
    fn test_empty_cookie_is_authentication_required() {
        let empty = session(MemoryCookies::with(AUTH_COOKIE_NAME, ""));
        let err = guard(&empty, &codec(), Role::ALL).unwrap_err();
        assert_eq!(err, AuthError::AuthenticationRequired);
    }

    #[test]
    fn test_configuration_error_hides_detail() {
        let response = AuthError::Configuration.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
