use bcrypt::{hash, verify, DEFAULT_COST};

use crate::errors::{AppError, AppResult};

const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;

/// Hashes a password with bcrypt after checking strength requirements.
pub fn hash_password(password: &str) -> AppResult<String> {
    validate_password_strength(password)?;

    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    verify(password, hash)
        .map_err(|e| AppError::InternalError(format!("Password verification failed: {}", e)))
}

/// Minimum 8 and maximum 128 characters, with at least one digit, one
/// lowercase and one uppercase letter. The maximum guards against the
/// bcrypt input limit.
fn validate_password_strength(password: &str) -> AppResult<()> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::FieldValidation {
            field: "Password".to_string(),
            message: format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH),
        });
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(AppError::FieldValidation {
            field: "Password".to_string(),
            message: format!("Password must be at most {} characters", MAX_PASSWORD_LENGTH),
        });
    }

    let has_digit = password.chars().any(|c| c.is_numeric());
    let has_lowercase = password.chars().any(|c| c.is_lowercase());
    let has_uppercase = password.chars().any(|c| c.is_uppercase());

    if !has_digit || !has_lowercase || !has_uppercase {
        return Err(AppError::FieldValidation {
            field: "Password".to_string(),
            message: "Password must contain at least one digit, one lowercase letter, and one uppercase letter".to_string(),
        });
    }

    Ok(())
}
