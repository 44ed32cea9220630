//! Navigation gate for the admin console.
//!
//! Each navigation starts out *checking*: the path is matched against the
//! protected prefixes and, if one applies, the identity behind the session
//! credential (if it decoded) is compared with the prefix's allow-list. The outcome is either
//! [`Navigation::Allowed`] or [`Navigation::Redirecting`]; both are terminal
//! and nothing is carried over to the next navigation.

use crate::session::current_identity;
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use std::sync::Arc;
use vantage_common::models::auth::{Identity, Role};

/// Public login page unauthenticated navigations are sent to
pub const LOGIN_PATH: &str = "/login";

/// Root of the admin console
pub const ADMIN_PREFIX: &str = "/admin";

/// Outcome of one navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Allowed,
    Redirecting { to: String },
}

#[derive(Debug, Clone)]
pub struct ProtectedPrefix {
    pub prefix: String,
    pub allowed: Vec<Role>,
}

impl ProtectedPrefix {
    /// `/admin` covers `/admin` and `/admin/...` but not `/administrator`.
    fn covers(&self, path: &str) -> bool {
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouteProtector {
    prefixes: Vec<ProtectedPrefix>,
    login_path: String,
}

impl RouteProtector {
    pub fn new(prefixes: Vec<ProtectedPrefix>, login_path: impl Into<String>) -> Self {
        Self {
            prefixes,
            login_path: login_path.into(),
        }
    }

    /// `/admin` restricted to admins, redirecting to `/login`
    pub fn admin_console() -> Self {
        Self::new(
            vec![ProtectedPrefix {
                prefix: ADMIN_PREFIX.to_string(),
                allowed: vec![Role::Admin],
            }],
            LOGIN_PATH,
        )
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Decide a navigation to `path`. `identity` is the verified caller, or
    /// `None` when the credential is absent or does not decode.
    pub fn decide(&self, path: &str, identity: Option<&Identity>) -> Navigation {
        let Some(protected) = self.prefixes.iter().find(|p| p.covers(path)) else {
            return Navigation::Allowed;
        };

        let Some(identity) = identity else {
            return self.redirect();
        };

        if protected.allowed.contains(&identity.role) {
            Navigation::Allowed
        } else {
            self.redirect()
        }
    }

    fn redirect(&self) -> Navigation {
        Navigation::Redirecting {
            to: self.login_path.clone(),
        }
    }
}

/// Middleware running [`RouteProtector::decide`] before any route handler.
///
/// Must be layered on the outermost router so it sees the full request path.
pub async fn protect_routes(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let identity = current_identity(&state.session(jar), &state.codec);
    match state.protector.decide(request.uri().path(), identity.as_ref()) {
        Navigation::Allowed => next.run(request).await,
        Navigation::Redirecting { to } => {
            tracing::debug!(path = %request.uri().path(), "Redirecting navigation to login");
            Redirect::to(&to).into_response()
        }
    }
}
