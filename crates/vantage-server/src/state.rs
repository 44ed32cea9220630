use crate::auth::{AuthError, TokenCodec, hash_password};
use crate::config::ServerConfig;
use crate::session::{CookieStore, SessionStore};
use crate::web::protect::RouteProtector;
use anyhow::{Context, Result};
use std::sync::Arc;
use vantage_common::models::auth::Role;
use vantage_db::{NewUser, UserStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub config: Arc<ServerConfig>,
    pub codec: Arc<TokenCodec>,
    pub protector: Arc<RouteProtector>,
}

impl AppState {
    /// Create a new app state. Fails if the signing secret is not configured.
    pub fn new(users: Arc<dyn UserStore>, config: ServerConfig) -> Result<Self, AuthError> {
        let codec = TokenCodec::new(&config.auth.jwt_secret)?;
        Ok(Self {
            users,
            config: Arc::new(config),
            codec: Arc::new(codec),
            protector: Arc::new(RouteProtector::admin_console()),
        })
    }

    /// Session adapter over `cookies` using this deployment's cookie flags
    pub fn session<C: CookieStore>(&self, cookies: C) -> SessionStore<C> {
        SessionStore::new(cookies, self.config.profile.is_production())
    }

    /// Create the configured initial admin unless a user with that email
    /// already exists. Returns whether a user was created.
    pub async fn seed_initial_admin(&self) -> Result<bool> {
        let Some(initial) = &self.config.auth.initial_admin else {
            return Ok(false);
        };
        let email = initial.email.trim().to_lowercase();

        if self.users.get_by_email(&email).await?.is_some() {
            tracing::info!("Initial admin '{}' already exists, skipping seed", email);
            return Ok(false);
        }

        let password_hash =
            hash_password(&initial.password).context("Failed to hash initial admin password")?;
        self.users
            .create(NewUser {
                email: email.clone(),
                name: initial.name.clone(),
                password_hash,
                role: Role::Admin,
                profile_image: None,
            })
            .await
            .context("Failed to create initial admin")?;
        tracing::info!("Created initial admin: {}", email);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AuthConfig, InitialUserConfig, Profile};
    use vantage_db::MemoryUserStore;

    fn test_config(secret: &str, initial_admin: Option<InitialUserConfig>) -> ServerConfig {
        ServerConfig {
            listen: "127.0.0.1:0".to_string(),
            profile: Profile::Development,
            db: None,
            auth: AuthConfig {
                jwt_secret: secret.to_string(),
                initial_admin,
            },
        }
    }

    #[test]
    fn test_new_fails_without_secret() {
        let result = AppState::new(Arc::new(MemoryUserStore::new()), test_config("", None));
        assert_eq!(result.err(), Some(AuthError::Configuration));
    }

    #[tokio::test]
    async fn test_seed_initial_admin_once() {
        let initial = InitialUserConfig {
            email: "Admin@Example.com".to_string(),
            password: "changeme".to_string(),
            name: "Administrator".to_string(),
        };
        let state = AppState::new(
            Arc::new(MemoryUserStore::new()),
            test_config("secret", Some(initial)),
        )
        .unwrap();

        assert!(state.seed_initial_admin().await.unwrap());
        assert!(!state.seed_initial_admin().await.unwrap());

        let row = state
            .users
            .get_by_email("admin@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.role, "admin");
        assert!(crate::auth::verify_password("changeme", &row.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_seed_without_initial_admin_is_noop() {
        let state = AppState::new(
            Arc::new(MemoryUserStore::new()),
            test_config("secret", None),
        )
        .unwrap();
        assert!(!state.seed_initial_admin().await.unwrap());
        assert!(state.users.list(10, 0).await.unwrap().is_empty());
    }
}
