use async_trait::async_trait;

use crate::http::{
    error::ApiError,
    models::{Ack, AuthResponse, RegisterResponse, UserProfile},
};

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError>;
    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisterResponse, ApiError>;
    async fn current_user(&self) -> Result<UserProfile, ApiError>;
}

/// The four password-recovery calls. The server is the only authority on
/// whether an email exists or a code is right.
#[async_trait]
pub trait RecoveryApi: Send + Sync {
    async fn request_password_reset(&self, email: &str) -> Result<Ack, ApiError>;
    async fn verify_reset_code(&self, email: &str, code: &str) -> Result<Ack, ApiError>;
    async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<Ack, ApiError>;
    async fn resend_reset_code(&self, email: &str) -> Result<Ack, ApiError>;
}
