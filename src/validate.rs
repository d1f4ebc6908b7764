//! Local form checks. Everything here runs before any network call; a
//! failure never reaches the auth service.

use thiserror::Error;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const CODE_LEN: usize = 6;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("El nombre completo es obligatorio")]
    NameRequired,

    #[error("El correo electrónico es obligatorio")]
    EmailRequired,

    #[error("Por favor ingresa un correo electrónico válido")]
    InvalidEmail,

    #[error("La contraseña es obligatoria")]
    PasswordRequired,

    #[error("Debes confirmar tu contraseña")]
    ConfirmationRequired,

    #[error("La contraseña debe tener al menos 6 caracteres")]
    PasswordTooShort,

    #[error("Las contraseñas no coinciden")]
    PasswordMismatch,

    #[error("El código de verificación es obligatorio")]
    CodeRequired,

    #[error("El código debe tener 6 dígitos")]
    CodeLength,

    #[error("La nueva contraseña es obligatoria")]
    NewPasswordRequired,

    #[error("La confirmación de contraseña es obligatoria")]
    NewPasswordConfirmationRequired,
}

/// Matches `^[^\s@]+@[^\s@]+\.[^\s@]+$`.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::EmailRequired);
    }
    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

/// Keeps the digits of `input`, capped at [`CODE_LEN`]. Applied on every
/// keystroke, so the stored code never holds anything else.
pub fn sanitize_code(input: &str) -> String {
    input
        .chars()
        .filter(char::is_ascii_digit)
        .take(CODE_LEN)
        .collect()
}

pub fn validate_code(code: &str) -> Result<(), ValidationError> {
    if code.trim().is_empty() {
        return Err(ValidationError::CodeRequired);
    }
    if code.len() != CODE_LEN || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::CodeLength);
    }
    Ok(())
}

pub fn validate_new_password(
    new_password: &str,
    confirm_password: &str,
) -> Result<(), ValidationError> {
    if new_password.is_empty() {
        return Err(ValidationError::NewPasswordRequired);
    }
    if new_password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    if confirm_password.is_empty() {
        return Err(ValidationError::NewPasswordConfirmationRequired);
    }
    if new_password != confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::EmailRequired);
    }
    if password.is_empty() {
        return Err(ValidationError::PasswordRequired);
    }
    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

pub fn validate_registration(
    name: &str,
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::NameRequired);
    }
    if email.trim().is_empty() {
        return Err(ValidationError::EmailRequired);
    }
    if password.is_empty() {
        return Err(ValidationError::PasswordRequired);
    }
    if confirm_password.is_empty() {
        return Err(ValidationError::ConfirmationRequired);
    }
    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    if password != confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}
