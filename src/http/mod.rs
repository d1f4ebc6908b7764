pub mod error;
pub mod models;
pub mod traits;

use async_trait::async_trait;
use reqwest::{
    Client, Method,
    header::{CONTENT_TYPE, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{config::AppConfig, session::Session};

use self::{
    error::{ApiError, FALLBACK_MESSAGE},
    models::{
        Ack, AuthResponse, EmailRequest, LoginRequest, MeResponse, RegisterRequest,
        RegisterResponse, ResetPasswordRequest, UserProfile, VerifyCodeRequest,
    },
    traits::{AuthApi, RecoveryApi},
};

const APPLICATION_JSON: &str = "application/json";

/// Client for the Ánima auth service. Every call goes through
/// [`ApiService::request`], which owns the JSON and error conventions.
pub struct ApiService {
    client: Client,
    base_url: String,
    session: Session,
}

impl ApiService {
    pub fn new(config: &AppConfig, session: Session) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn request<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .client
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));

        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }

        if let Some(body) = body {
            request = request.body(serde_json::to_vec(body)?);
        }

        tracing::debug!(%method, path, "sending request");
        let response = request.send().await?;
        let status = response.status();

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains(APPLICATION_JSON));

        let body: Option<Value> = if is_json {
            match response.json::<Value>().await {
                Ok(value) => Some(value),
                Err(e) if status.is_success() => return Err(e.into()),
                Err(_) => None,
            }
        } else {
            None
        };

        if !status.is_success() {
            let message = body
                .as_ref()
                .and_then(|b| b.get("message"))
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .unwrap_or(FALLBACK_MESSAGE)
                .to_string();
            tracing::info!(%method, path, status = status.as_u16(), %message, "request rejected");
            return Err(ApiError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let body = body.unwrap_or_else(|| Value::Object(Default::default()));
        Ok(serde_json::from_value(body)?)
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::POST, path, Some(body)).await
    }
}

#[async_trait]
impl AuthApi for ApiService {
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        self.post(
            "/auth/login",
            &LoginRequest {
                email: email.trim(),
                password,
            },
        )
        .await
    }

    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisterResponse, ApiError> {
        self.post(
            "/auth/register",
            &RegisterRequest {
                name: name.trim(),
                email: email.trim(),
                password,
            },
        )
        .await
    }

    async fn current_user(&self) -> Result<UserProfile, ApiError> {
        let response: MeResponse = self
            .request::<(), _>(Method::GET, "/auth/me", None)
            .await?;
        Ok(response.user)
    }
}

#[async_trait]
impl RecoveryApi for ApiService {
    async fn request_password_reset(&self, email: &str) -> Result<Ack, ApiError> {
        self.post(
            "/auth/password/request-reset",
            &EmailRequest {
                email: email.trim(),
            },
        )
        .await
    }

    async fn verify_reset_code(&self, email: &str, code: &str) -> Result<Ack, ApiError> {
        self.post(
            "/auth/password/verify-code",
            &VerifyCodeRequest {
                email: email.trim(),
                code,
            },
        )
        .await
    }

    async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<Ack, ApiError> {
        self.post(
            "/auth/password/reset-password",
            &ResetPasswordRequest {
                email: email.trim(),
                code,
                new_password,
            },
        )
        .await
    }

    async fn resend_reset_code(&self, email: &str) -> Result<Ack, ApiError> {
        self.post(
            "/auth/password/resend-code",
            &EmailRequest {
                email: email.trim(),
            },
        )
        .await
    }
}
