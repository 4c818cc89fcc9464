//! Field checks run before any mutation. Rules run in a fixed order and the
//! first failure wins.

use thiserror::Error;

use super::repo_types::UserInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("id must be positive")]
    NonPositiveId,
    #[error("name cannot be empty")]
    EmptyName,
    #[error("email cannot be empty")]
    EmptyEmail,
    #[error("invalid email format")]
    InvalidEmail,
    #[error("password cannot be empty")]
    EmptyPassword,
}

pub fn validate_id(id: i64) -> Result<(), ValidationError> {
    if id <= 0 {
        return Err(ValidationError::NonPositiveId);
    }
    Ok(())
}

/// Name, email, email shape, password. Syntactic only: an `@` somewhere.
pub fn validate_user(input: &UserInput) -> Result<(), ValidationError> {
    if input.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if input.email.trim().is_empty() {
        return Err(ValidationError::EmptyEmail);
    }
    if !input.email.contains('@') {
        return Err(ValidationError::InvalidEmail);
    }
    if input.password.trim().is_empty() {
        return Err(ValidationError::EmptyPassword);
    }
    Ok(())
}

pub fn validate_update(id: i64, input: &UserInput) -> Result<(), ValidationError> {
    validate_id(id)?;
    validate_user(input)
}

pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::EmptyEmail);
    }
    if password.trim().is_empty() {
        return Err(ValidationError::EmptyPassword);
    }
    Ok(())
}
