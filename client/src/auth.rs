use thiserror::Error;

use crate::session::{Session, StorageError};
use crate::stat::{ApiClient, ApiError};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill in every field")]
    MissingField,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Password must be at least 6 characters")]
    PasswordTooShort,
    #[error("Please choose a category")]
    MissingCategory,
    #[error("Please enter a valid amount")]
    InvalidAmount,
    #[error("Please enter a category name")]
    MissingName,
    #[error("Invalid date (use YYYY-MM-DD)")]
    InvalidDate,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("could not store session: {0}")]
    Storage(#[from] StorageError),
}

pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(ValidationError::MissingField);
    }
    Ok(())
}

pub fn validate_signup(email: &str, password: &str, confirm: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() || password.is_empty() || confirm.is_empty() {
        return Err(ValidationError::MissingField);
    }
    if password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

/// Sign-up / sign-in / sign-out against the API, keeping the session in step.
pub struct AuthFlow<'a> {
    pub api: &'a ApiClient,
    pub session: &'a mut Session,
}

impl<'a> AuthFlow<'a> {
    pub fn new(api: &'a ApiClient, session: &'a mut Session) -> Self {
        Self { api, session }
    }

    pub async fn sign_up(&self, email: &str, password: &str, confirm: &str) -> Result<(), AuthError> {
        validate_signup(email, password, confirm)?;
        self.api.sign_up(email.trim(), password).await?;
        Ok(())
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<(), AuthError> {
        validate_login(email, password)?;
        let email = email.trim();
        let resp = self.api.log_in(email, password).await?;
        self.session.sign_in(&resp.access_token, email)?;
        Ok(())
    }

    pub fn sign_out(&mut self) -> Result<(), AuthError> {
        self.session.sign_out()?;
        Ok(())
    }
}
