use crate::repos::user::{CreateUserError, NewUser, UserRepo, UserRow};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;
use vantage_common::models::auth::Role;

/// Query/mutate access to user records.
///
/// The server only talks to this trait, so it can run against Postgres in
/// production and an in-memory table in tests and local development.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with [`CreateUserError::DuplicateEmail`] if the email is taken.
    async fn create(&self, new_user: NewUser) -> std::result::Result<UserRow, CreateUserError>;

    async fn get_by_email(&self, email: &str) -> Result<Option<UserRow>>;

    async fn get_by_id(&self, user_id: Uuid) -> Result<Option<UserRow>>;

    async fn touch_last_login(&self, user_id: Uuid) -> Result<()>;

    /// Returns the updated row, or `None` if no such user exists.
    async fn set_role(&self, user_id: Uuid, role: Role) -> Result<Option<UserRow>>;

    /// Newest first.
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<UserRow>>;
}

/// Postgres-backed store
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, new_user: NewUser) -> std::result::Result<UserRow, CreateUserError> {
        UserRepo::create(&self.pool, Uuid::new_v4(), &new_user).await
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        UserRepo::get_by_email(&self.pool, email).await
    }

    async fn get_by_id(&self, user_id: Uuid) -> Result<Option<UserRow>> {
        UserRepo::get_by_id(&self.pool, user_id).await
    }

    async fn touch_last_login(&self, user_id: Uuid) -> Result<()> {
        UserRepo::touch_last_login(&self.pool, user_id).await
    }

    async fn set_role(&self, user_id: Uuid, role: Role) -> Result<Option<UserRow>> {
        UserRepo::set_role(&self.pool, user_id, role).await
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<UserRow>> {
        UserRepo::list(&self.pool, limit, offset).await
    }
}

/// Process-local store; contents are lost on restart
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<UserRow>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, new_user: NewUser) -> std::result::Result<UserRow, CreateUserError> {
        // Check and insert under one write lock
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == new_user.email) {
            return Err(CreateUserError::DuplicateEmail(new_user.email));
        }
        let row = UserRow {
            user_id: Uuid::new_v4(),
            email: new_user.email,
            name: new_user.name,
            password_hash: new_user.password_hash,
            role: new_user.role.as_str().to_string(),
            profile_image: new_user.profile_image,
            created_at: Utc::now(),
            last_login_at: None,
        };
        users.push(row.clone());
        Ok(row)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn get_by_id(&self, user_id: Uuid) -> Result<Option<UserRow>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.user_id == user_id).cloned())
    }

    async fn touch_last_login(&self, user_id: Uuid) -> Result<()> {
        let mut users = self.users.write().await;
        if let Some(user) = users.iter_mut().find(|u| u.user_id == user_id) {
            user.last_login_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn set_role(&self, user_id: Uuid, role: Role) -> Result<Option<UserRow>> {
        let mut users = self.users.write().await;
        Ok(users
            .iter_mut()
            .find(|u| u.user_id == user_id)
            .map(|user| {
                user.role = role.as_str().to_string();
                user.clone()
            }))
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<UserRow>> {
        let users = self.users.read().await;
        // Insertion order is creation order; reverse for newest first.
        Ok(users
            .iter()
            .rev()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}
