use anyhow::{Context, Result};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::sync::LazyLock;
use thiserror::Error;
use vantage_common::models::auth::{Claims, Identity};
use vantage_common::validation::validate_claims;

/// Session token lifetime: 7 days
pub const TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Failure classes of the auth layer.
///
/// `Configuration` is fatal and only produced at startup. The rest are
/// per-request outcomes that map onto 401/403 responses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("JWT signing secret is not configured")]
    Configuration,
    #[error("Authentication required")]
    AuthenticationRequired,
    #[error("Invalid or expired credential")]
    InvalidCredential,
    #[error("Insufficient permission")]
    InsufficientPermission,
}

/// A token that must not be trusted.
///
/// Bad signatures, malformed tokens, expiry and payload shape errors all
/// produce this one type; the reason is kept for debug logging only.
#[derive(Debug, Clone, Error)]
#[error("invalid token: {reason}")]
pub struct InvalidToken {
    reason: String,
}

impl InvalidToken {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Hash a password using argon2id
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
    Ok(hash.to_string())
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("Invalid password hash: {}", e))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Hash of a throwaway password, checked when a login names no account so
/// that both login failures cost one argon2 verification.
static UNKNOWN_ACCOUNT_HASH: LazyLock<String> = LazyLock::new(|| {
    hash_password("unknown-account").unwrap_or_else(|e| {
        tracing::error!("Failed to prepare unknown-account hash: {:#}", e);
        String::new()
    })
});

/// Verify `password` against [`UNKNOWN_ACCOUNT_HASH`]. Never succeeds.
pub fn verify_unknown_account(password: &str) {
    let _ = verify_password(password, &UNKNOWN_ACCOUNT_HASH);
}

/// Issues and verifies HS256 session tokens with a single server-held secret.
///
/// Built once at startup; the secret is never re-read afterwards.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: &str) -> std::result::Result<Self, AuthError> {
        if secret.trim().is_empty() {
            return Err(AuthError::Configuration);
        }

        // Expiry is checked by hand in `decode_at` so the boundary is exact
        // and testable against a supplied clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    /// Create a session token for `identity`, valid for [`TOKEN_TTL_SECS`]
    pub fn issue(&self, identity: &Identity) -> Result<String> {
        self.issue_at(identity, chrono::Utc::now().timestamp())
    }

    pub fn issue_at(&self, identity: &Identity, now: i64) -> Result<String> {
        let claims = Claims::for_identity(identity, now, now + TOKEN_TTL_SECS);
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .context("Failed to create session token")
    }

    /// Verify a token and return the identity it asserts
    pub fn decode(&self, token: &str) -> std::result::Result<Identity, InvalidToken> {
        self.decode_at(token, chrono::Utc::now().timestamp())
    }

    /// Valid while `now <= exp`.
    pub fn decode_at(&self, token: &str, now: i64) -> std::result::Result<Identity, InvalidToken> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| InvalidToken::new(e.to_string()))?;

        if now > data.claims.exp {
            return Err(InvalidToken::new("token expired"));
        }

        validate_claims(&data.claims).map_err(|e| InvalidToken::new(e.to_string()))
    }
}
