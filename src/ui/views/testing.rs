//! Fakes shared by the view tests.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use flume::Receiver;
use ratatui::crossterm::event::{KeyCode, KeyEvent};
use serde_json::json;

use crate::{
    config::AppConfig,
    event::events::Event,
    http::{
        error::ApiError,
        models::{Ack, AuthResponse, RegisterResponse, UserProfile},
        traits::{AuthApi, RecoveryApi},
    },
    session::{Session, token::make_token},
    ui::{context::AppContext, state::AppState, traits::View},
};

#[derive(Clone, Default)]
pub struct FakeApi {
    calls: Arc<Mutex<Vec<String>>>,
    failure: Option<ApiError>,
}

impl FakeApi {
    pub fn failing(error: ApiError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, call: String) -> Result<(), ApiError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
        match &self.failure {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

pub fn user() -> UserProfile {
    UserProfile {
        id: Some("1".into()),
        name: Some("Ana".into()),
        email: Some("ana@x.io".into()),
        ..UserProfile::default()
    }
}

pub fn valid_token() -> String {
    make_token(&json!({ "user_id": "1", "exp": 4_102_444_800i64 }))
}

#[async_trait]
impl AuthApi for FakeApi {
    async fn login(&self, email: &str, _password: &str) -> Result<AuthResponse, ApiError> {
        self.record(format!("login {email}"))?;
        Ok(AuthResponse {
            token: valid_token(),
            user: user(),
            message: None,
        })
    }

    async fn register(
        &self,
        name: &str,
        email: &str,
        _password: &str,
    ) -> Result<RegisterResponse, ApiError> {
        self.record(format!("register {name} {email}"))?;
        Ok(RegisterResponse::default())
    }

    async fn current_user(&self) -> Result<UserProfile, ApiError> {
        self.record("me".into())?;
        Ok(user())
    }
}

#[async_trait]
impl RecoveryApi for FakeApi {
    async fn request_password_reset(&self, email: &str) -> Result<Ack, ApiError> {
        self.record(format!("request-reset {email}"))?;
        Ok(Ack::default())
    }

    async fn verify_reset_code(&self, email: &str, code: &str) -> Result<Ack, ApiError> {
        self.record(format!("verify-code {email} {code}"))?;
        Ok(Ack::default())
    }

    async fn reset_password(
        &self,
        email: &str,
        code: &str,
        _new_password: &str,
    ) -> Result<Ack, ApiError> {
        self.record(format!("reset-password {email} {code}"))?;
        Ok(Ack::default())
    }

    async fn resend_reset_code(&self, email: &str) -> Result<Ack, ApiError> {
        self.record(format!("resend-code {email}"))?;
        Ok(Ack::default())
    }
}

pub fn context(api: FakeApi) -> (AppContext, Receiver<Event>) {
    let (tx, rx) = flume::unbounded();
    let ctx = AppContext::new(Arc::new(api), Session::in_memory(), AppConfig::default(), tx);
    (ctx, rx)
}

pub async fn type_text(view: &mut dyn View, state: &AppState, ctx: &AppContext, text: &str) {
    for c in text.chars() {
        view.handle_input(KeyEvent::from(KeyCode::Char(c)), state, ctx)
            .await;
    }
}
