use crate::models::auth::{Claims, Identity, Role};
use thiserror::Error;

/// Why a verified token payload was still refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("id must be a non-empty string")]
    MissingId,
    #[error("email is not a well-formed address")]
    InvalidEmail,
    #[error("role must be one of: user, admin")]
    InvalidRole,
    #[error("name must be a non-empty string")]
    MissingName,
}

/// Loose structural check for an email address: `local@domain.tld`,
/// no whitespace, exactly one `@`, and no empty domain labels.
pub fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
}

/// Check the shape of a decoded payload and project it into an [`Identity`].
pub fn validate_claims(claims: &Claims) -> Result<Identity, PayloadError> {
    if claims.id.trim().is_empty() {
        return Err(PayloadError::MissingId);
    }
    if !is_valid_email(&claims.email) {
        return Err(PayloadError::InvalidEmail);
    }
    let role: Role = claims
        .role
        .parse()
        .map_err(|_| PayloadError::InvalidRole)?;
    if claims.name.trim().is_empty() {
        return Err(PayloadError::MissingName);
    }

    Ok(Identity {
        id: claims.id.clone(),
        email: claims.email.clone(),
        name: claims.name.clone(),
        role,
        profile_image: claims.profile_image.clone(),
    })
}
