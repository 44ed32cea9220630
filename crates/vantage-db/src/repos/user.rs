use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;
use vantage_common::models::auth::{Role, User};

const USER_COLUMNS: &str =
    "user_id, email, name, password_hash, role, profile_image, created_at, last_login_at";

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: String,
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl UserRow {
    /// Client-safe view of the row. Fails if the stored role is not a known value.
    pub fn to_user(&self) -> Result<User> {
        let role: Role = self
            .role
            .parse()
            .map_err(|e| anyhow::anyhow!("User {} has {}", self.user_id, e))?;
        Ok(User {
            user_id: self.user_id,
            email: self.email.clone(),
            name: self.name.clone(),
            role,
            profile_image: self.profile_image.clone(),
            created_at: self.created_at,
            last_login_at: self.last_login_at,
        })
    }
}

/// Fields needed to insert a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: Role,
    pub profile_image: Option<String>,
}

/// Why inserting a user failed
#[derive(Debug, Error)]
pub enum CreateUserError {
    #[error("email '{0}' is already registered")]
    DuplicateEmail(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub struct UserRepo;

impl UserRepo {
    /// Insert a user. A clash on the unique email index surfaces as
    /// [`CreateUserError::DuplicateEmail`], including when two inserts race.
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        new_user: &NewUser,
    ) -> std::result::Result<UserRow, CreateUserError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (user_id, email, name, password_hash, role, profile_image) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {USER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(&new_user.email)
        .bind(&new_user.name)
        .bind(&new_user.password_hash)
        .bind(new_user.role.as_str())
        .bind(&new_user.profile_image)
        .fetch_one(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                CreateUserError::DuplicateEmail(new_user.email.clone())
            }
            other => CreateUserError::Other(
                anyhow::Error::new(other).context("Failed to create user"),
            ),
        })?;
        Ok(row)
    }

    pub async fn get_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by email")?;
        Ok(row)
    }

    pub async fn get_by_id(pool: &PgPool, user_id: Uuid) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by id")?;
        Ok(row)
    }

    pub async fn touch_last_login(pool: &PgPool, user_id: Uuid) -> Result<()> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await
            .context("Failed to update last_login_at")?;
        Ok(())
    }

    pub async fn set_role(pool: &PgPool, user_id: Uuid, role: Role) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET role = $2 WHERE user_id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(role.as_str())
        .fetch_optional(pool)
        .await
        .context("Failed to update user role")?;
        Ok(row)
    }

    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<UserRow>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("Failed to list users")?;
        Ok(rows)
    }
}
