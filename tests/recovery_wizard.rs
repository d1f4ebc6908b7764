use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use anima::{
    config::Timings,
    event::events::Event,
    http::{
        error::{ApiError, CONNECTION_MESSAGE},
        models::Ack,
        traits::RecoveryApi,
    },
    notice::NoticeKind,
    recovery::{RecoveryEvent, RecoveryOp, RecoveryStep, RecoveryWizard, Submission},
    ui::state::Route,
    validate::ValidationError,
};
use async_trait::async_trait;
use flume::Receiver;
use tokio::time::Instant;

#[derive(Default)]
struct ScriptedApi {
    calls: Mutex<Vec<String>>,
    failures: Mutex<Vec<(RecoveryOp, ApiError)>>,
}

impl ScriptedApi {
    fn fail(&self, op: RecoveryOp, error: ApiError) {
        self.failures.lock().unwrap().push((op, error));
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(&self, op: RecoveryOp, call: String) -> Result<Ack, ApiError> {
        self.calls.lock().unwrap().push(call);
        let mut failures = self.failures.lock().unwrap();
        match failures.iter().position(|(o, _)| *o == op) {
            Some(i) => Err(failures.remove(i).1),
            None => Ok(Ack::default()),
        }
    }
}

#[async_trait]
impl RecoveryApi for ScriptedApi {
    async fn request_password_reset(&self, email: &str) -> Result<Ack, ApiError> {
        self.answer(RecoveryOp::RequestReset, format!("request-reset {email}"))
    }

    async fn verify_reset_code(&self, email: &str, code: &str) -> Result<Ack, ApiError> {
        self.answer(RecoveryOp::VerifyCode, format!("verify-code {email} {code}"))
    }

    async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<Ack, ApiError> {
        self.answer(
            RecoveryOp::ResetPassword,
            format!("reset-password {email} {code} {new_password}"),
        )
    }

    async fn resend_reset_code(&self, email: &str) -> Result<Ack, ApiError> {
        self.answer(RecoveryOp::ResendCode, format!("resend-code {email}"))
    }
}

fn wizard() -> (RecoveryWizard, Receiver<Event>, Arc<ScriptedApi>) {
    let api = Arc::new(ScriptedApi::default());
    let (tx, rx) = flume::unbounded();
    let wizard = RecoveryWizard::new(api.clone(), tx, Timings::default());
    (wizard, rx, api)
}

/// Receives the next event and feeds recovery events back to the wizard.
async fn pump(wizard: &mut RecoveryWizard, rx: &Receiver<Event>) -> Event {
    let event = rx.recv_async().await.expect("event channel closed");
    if let Event::Recovery(recovery) = &event {
        wizard.on_event(recovery);
    }
    event
}

async fn reach_code_step(wizard: &mut RecoveryWizard, rx: &Receiver<Event>) {
    wizard.set_email("ana@x.io");
    assert_eq!(wizard.submit_email(), Submission::Dispatched);
    pump(wizard, rx).await;
    pump(wizard, rx).await;
    assert_eq!(wizard.step(), RecoveryStep::Code);
}

async fn reach_password_step(wizard: &mut RecoveryWizard, rx: &Receiver<Event>) {
    reach_code_step(wizard, rx).await;
    wizard.set_verification_code("123456");
    assert_eq!(wizard.submit_code(), Submission::Dispatched);
    pump(wizard, rx).await;
    pump(wizard, rx).await;
    assert_eq!(wizard.step(), RecoveryStep::NewPassword);
}

#[tokio::test(start_paused = true)]
async fn malformed_email_is_rejected_without_a_request() {
    let (mut wizard, rx, api) = wizard();

    wizard.set_email("ana@x");
    assert_eq!(
        wizard.submit_email(),
        Submission::Rejected(ValidationError::InvalidEmail)
    );

    let notice = wizard.notice().unwrap();
    assert_eq!(notice.kind, NoticeKind::Error);
    assert_eq!(notice.title, "Error de validación");
    assert!(!wizard.is_loading());
    assert!(api.calls().is_empty());
    assert!(rx.is_empty());
}

#[tokio::test(start_paused = true)]
async fn accepted_email_advances_after_two_seconds() {
    let (mut wizard, rx, api) = wizard();

    wizard.set_email("ana@x.io");
    assert_eq!(wizard.submit_email(), Submission::Dispatched);
    assert!(wizard.is_loading());

    pump(&mut wizard, &rx).await;
    let shown_at = Instant::now();
    assert!(!wizard.is_loading());
    assert!(wizard.is_busy());
    assert_eq!(wizard.step(), RecoveryStep::Email);
    let notice = wizard.notice().unwrap();
    assert_eq!(notice.title, "¡Código enviado!");
    assert!(notice.message.contains("ana@x.io"));

    let event = pump(&mut wizard, &rx).await;
    assert!(matches!(
        event,
        Event::Recovery(RecoveryEvent::DelayElapsed(RecoveryOp::RequestReset))
    ));
    assert_eq!(shown_at.elapsed(), Duration::from_millis(2000));
    assert_eq!(wizard.step(), RecoveryStep::Code);
    assert!(wizard.notice().is_none());
    assert!(!wizard.is_busy());
    assert_eq!(api.calls(), vec!["request-reset ana@x.io"]);
}

#[tokio::test(start_paused = true)]
async fn submissions_are_exclusive_while_a_call_is_in_flight() {
    let (mut wizard, rx, api) = wizard();

    wizard.set_email("ana@x.io");
    assert_eq!(wizard.submit_email(), Submission::Dispatched);
    assert_eq!(wizard.submit_email(), Submission::Busy);
    assert!(!wizard.go_back());

    pump(&mut wizard, &rx).await;
    assert_eq!(wizard.submit_email(), Submission::Busy);
    pump(&mut wizard, &rx).await;

    assert_eq!(wizard.submit_email(), Submission::Ignored);
    assert_eq!(api.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn code_input_is_sanitized_as_typed() {
    let (mut wizard, _rx, _api) = wizard();

    wizard.set_verification_code("12a34 5");
    assert_eq!(wizard.form().verification_code, "12345");
    wizard.set_verification_code("9876543210");
    assert_eq!(wizard.form().verification_code, "987654");
}

#[tokio::test(start_paused = true)]
async fn short_code_is_rejected_locally() {
    let (mut wizard, rx, api) = wizard();
    reach_code_step(&mut wizard, &rx).await;

    wizard.set_verification_code("123");
    assert_eq!(
        wizard.submit_code(),
        Submission::Rejected(ValidationError::CodeLength)
    );
    assert_eq!(api.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn wrong_code_keeps_the_step_and_the_input() {
    let (mut wizard, rx, api) = wizard();
    reach_code_step(&mut wizard, &rx).await;
    api.fail(
        RecoveryOp::VerifyCode,
        ApiError::Service {
            status: 400,
            message: "Código inválido o expirado".into(),
        },
    );

    wizard.set_verification_code("654321");
    assert_eq!(wizard.submit_code(), Submission::Dispatched);
    pump(&mut wizard, &rx).await;

    assert_eq!(wizard.step(), RecoveryStep::Code);
    assert_eq!(wizard.form().verification_code, "654321");
    let notice = wizard.notice().unwrap();
    assert_eq!(notice.title, "Código incorrecto");
    assert_eq!(notice.message, "Código inválido o expirado");
    assert!(!wizard.is_busy());

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(rx.is_empty());
}

#[tokio::test(start_paused = true)]
async fn verified_code_advances_after_one_and_a_half_seconds() {
    let (mut wizard, rx, _api) = wizard();
    reach_code_step(&mut wizard, &rx).await;

    wizard.set_verification_code("123456");
    wizard.submit_code();
    pump(&mut wizard, &rx).await;
    assert_eq!(wizard.notice().unwrap().title, "¡Código verificado!");

    let shown_at = Instant::now();
    pump(&mut wizard, &rx).await;
    assert_eq!(shown_at.elapsed(), Duration::from_millis(1500));
    assert_eq!(wizard.step(), RecoveryStep::NewPassword);
}

#[tokio::test(start_paused = true)]
async fn resend_is_unlimited_and_never_changes_the_step() {
    let (mut wizard, rx, api) = wizard();
    reach_code_step(&mut wizard, &rx).await;

    for _ in 0..3 {
        assert_eq!(wizard.resend_code(), Submission::Dispatched);
        pump(&mut wizard, &rx).await;
        assert_eq!(wizard.step(), RecoveryStep::Code);
        let notice = wizard.notice().unwrap();
        assert_eq!(notice.kind, NoticeKind::Info);
        assert_eq!(notice.title, "Código reenviado");
        assert!(!wizard.is_busy());
    }

    assert_eq!(
        api.calls()
            .iter()
            .filter(|c| c.starts_with("resend-code"))
            .count(),
        3
    );
}

#[tokio::test(start_paused = true)]
async fn resend_outside_the_code_step_is_ignored() {
    let (mut wizard, _rx, api) = wizard();
    assert_eq!(wizard.resend_code(), Submission::Ignored);
    assert!(api.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn password_rules_are_checked_before_the_reset_call() {
    let (mut wizard, rx, api) = wizard();
    reach_password_step(&mut wizard, &rx).await;

    wizard.set_new_password("abc");
    wizard.set_confirm_password("abc");
    assert_eq!(
        wizard.submit_new_password(),
        Submission::Rejected(ValidationError::PasswordTooShort)
    );

    wizard.set_new_password("abcdef");
    wizard.set_confirm_password("abcdeg");
    assert_eq!(
        wizard.submit_new_password(),
        Submission::Rejected(ValidationError::PasswordMismatch)
    );
    assert_eq!(api.calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn successful_reset_navigates_to_login_after_two_and_a_half_seconds() {
    let (mut wizard, rx, api) = wizard();
    reach_password_step(&mut wizard, &rx).await;

    wizard.set_new_password("nueva-clave");
    wizard.set_confirm_password("nueva-clave");
    assert_eq!(wizard.submit_new_password(), Submission::Dispatched);
    pump(&mut wizard, &rx).await;
    assert_eq!(wizard.notice().unwrap().title, "¡Contraseña actualizada!");

    let shown_at = Instant::now();
    pump(&mut wizard, &rx).await;
    let event = rx.recv_async().await.unwrap();
    assert!(matches!(event, Event::Navigate(Route::Login)));
    assert_eq!(shown_at.elapsed(), Duration::from_millis(2500));
    assert_eq!(
        api.calls().last().unwrap(),
        "reset-password ana@x.io 123456 nueva-clave"
    );
}

#[tokio::test(start_paused = true)]
async fn failed_reset_keeps_both_password_fields() {
    let (mut wizard, rx, api) = wizard();
    reach_password_step(&mut wizard, &rx).await;
    api.fail(
        RecoveryOp::ResetPassword,
        ApiError::Network("connection refused".into()),
    );

    wizard.set_new_password("nueva-clave");
    wizard.set_confirm_password("nueva-clave");
    wizard.submit_new_password();
    pump(&mut wizard, &rx).await;

    assert_eq!(wizard.step(), RecoveryStep::NewPassword);
    assert_eq!(wizard.form().new_password, "nueva-clave");
    assert_eq!(wizard.form().confirm_password, "nueva-clave");
    let notice = wizard.notice().unwrap();
    assert_eq!(notice.title, "No se pudo cambiar la contraseña");
    assert_eq!(notice.message, CONNECTION_MESSAGE);
}

#[tokio::test(start_paused = true)]
async fn back_walks_one_step_and_stops_at_email() {
    let (mut wizard, rx, _api) = wizard();
    assert!(!wizard.go_back());

    reach_password_step(&mut wizard, &rx).await;
    assert!(wizard.go_back());
    assert_eq!(wizard.step(), RecoveryStep::Code);
    assert!(wizard.go_back());
    assert_eq!(wizard.step(), RecoveryStep::Email);
    assert!(!wizard.go_back());
    assert_eq!(wizard.form().email, "ana@x.io");
}

#[tokio::test(start_paused = true)]
async fn dropping_the_wizard_cancels_the_pending_transition() {
    let (mut wizard, rx, _api) = wizard();

    wizard.set_email("ana@x.io");
    wizard.submit_email();
    pump(&mut wizard, &rx).await;
    drop(wizard);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(rx.is_empty());
}

#[tokio::test(start_paused = true)]
async fn edits_while_busy_never_change_the_address_used_later() {
    let (mut wizard, rx, api) = wizard();

    wizard.set_email("ana@x.io");
    assert_eq!(wizard.submit_email(), Submission::Dispatched);
    assert!(!wizard.set_email("other@y.io"));
    pump(&mut wizard, &rx).await;
    assert!(!wizard.set_email("third@z.io"));
    assert!(!wizard.set_verification_code("999999"));
    pump(&mut wizard, &rx).await;

    assert_eq!(wizard.step(), RecoveryStep::Code);
    assert_eq!(wizard.form().email, "ana@x.io");
    assert_eq!(wizard.accepted_email(), Some("ana@x.io"));
    assert!(!wizard.set_email("other@y.io"));
    assert_eq!(wizard.form().verification_code, "");

    assert!(wizard.set_verification_code("123456"));
    wizard.submit_code();
    assert!(!wizard.set_verification_code("000000"));
    pump(&mut wizard, &rx).await;
    pump(&mut wizard, &rx).await;
    assert!(wizard.go_back());
    wizard.resend_code();
    pump(&mut wizard, &rx).await;

    assert_eq!(
        api.calls(),
        vec![
            "request-reset ana@x.io",
            "verify-code ana@x.io 123456",
            "resend-code ana@x.io",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn rejected_request_leaves_no_accepted_address() {
    let (mut wizard, rx, api) = wizard();
    api.fail(
        RecoveryOp::RequestReset,
        ApiError::Service {
            status: 404,
            message: "Usuario no encontrado".into(),
        },
    );

    wizard.set_email("nadie@x.io");
    wizard.submit_email();
    pump(&mut wizard, &rx).await;

    assert_eq!(wizard.step(), RecoveryStep::Email);
    assert_eq!(wizard.accepted_email(), None);
    assert!(wizard.set_email("ana@x.io"));
}
