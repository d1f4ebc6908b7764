//! Password-recovery wizard: Email → Code → NewPassword.
//!
//! The wizard only runs cheap local checks; whether an email exists or a
//! code is right is decided by the server through [`RecoveryApi`]. Network
//! calls and display delays run as tasks that report back through the app
//! event channel, and [`RecoveryWizard::on_event`] applies their outcome.

pub mod step;

use std::{sync::Arc, time::Duration};

use flume::Sender;

use crate::{
    config::Timings,
    event::events::Event,
    http::{error::ApiError, traits::RecoveryApi},
    notice::Notice,
    ui::state::Route,
    util::task::TaskManager,
    validate::{self, ValidationError},
};

pub use step::{RecoveryOp, RecoveryStep};

const ADVANCE_TASK: &str = "advance";

#[derive(Debug, Clone)]
pub enum RecoveryEvent {
    Responded {
        op: RecoveryOp,
        outcome: Result<(), ApiError>,
    },
    DelayElapsed(RecoveryOp),
}

/// What happened to a submit request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Dispatched,
    Rejected(ValidationError),
    /// A call is in flight or a step transition is pending.
    Busy,
    /// The action does not apply to the current step.
    Ignored,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryForm {
    pub email: String,
    pub verification_code: String,
    pub new_password: String,
    pub confirm_password: String,
}

pub struct RecoveryWizard {
    step: RecoveryStep,
    form: RecoveryForm,
    is_loading: bool,
    pending: Option<RecoveryOp>,
    /// Address of the reset request in flight.
    submitted_email: Option<String>,
    /// Address the server accepted. Every later call goes to it.
    accepted_email: String,
    notice: Option<Notice>,
    api: Arc<dyn RecoveryApi>,
    event_tx: Sender<Event>,
    timings: Timings,
    tasks: TaskManager,
}

impl RecoveryWizard {
    pub fn new(api: Arc<dyn RecoveryApi>, event_tx: Sender<Event>, timings: Timings) -> Self {
        Self {
            step: RecoveryStep::Email,
            form: RecoveryForm::default(),
            is_loading: false,
            pending: None,
            submitted_email: None,
            accepted_email: String::new(),
            notice: None,
            api,
            event_tx,
            timings,
            tasks: TaskManager::new(),
        }
    }

    pub fn step(&self) -> RecoveryStep {
        self.step
    }

    pub fn form(&self) -> &RecoveryForm {
        &self.form
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// True while submit, resend and back must stay disabled.
    pub fn is_busy(&self) -> bool {
        self.is_loading || self.pending.is_some()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// The email that later steps act on, once a reset request succeeded.
    pub fn accepted_email(&self) -> Option<&str> {
        Some(self.accepted_email.as_str()).filter(|e| !e.is_empty())
    }

    /// Form edits are dropped while a call or a step change is pending.
    fn editable(&self, field: &str) -> bool {
        if self.is_busy() {
            tracing::debug!(field, "ignoring edit while busy");
            return false;
        }
        true
    }

    /// Only editable on the Email step.
    pub fn set_email(&mut self, email: impl Into<String>) -> bool {
        if self.step != RecoveryStep::Email || !self.editable("email") {
            return false;
        }
        self.form.email = email.into();
        true
    }

    /// Stores the digits of `input` only.
    pub fn set_verification_code(&mut self, input: &str) -> bool {
        if !self.editable("verification_code") {
            return false;
        }
        self.form.verification_code = validate::sanitize_code(input);
        true
    }

    pub fn set_new_password(&mut self, password: impl Into<String>) -> bool {
        if !self.editable("new_password") {
            return false;
        }
        self.form.new_password = password.into();
        true
    }

    pub fn set_confirm_password(&mut self, password: impl Into<String>) -> bool {
        if !self.editable("confirm_password") {
            return false;
        }
        self.form.confirm_password = password.into();
        true
    }

    pub fn submit_email(&mut self) -> Submission {
        if self.step != RecoveryStep::Email {
            return Submission::Ignored;
        }
        if self.is_busy() {
            return Submission::Busy;
        }
        if let Err(e) = validate::validate_email(&self.form.email) {
            return self.reject(e);
        }

        let api = self.api.clone();
        let email = self.form.email.clone();
        self.submitted_email = Some(email.clone());
        self.dispatch(RecoveryOp::RequestReset, async move {
            api.request_password_reset(&email).await.map(|_| ())
        });
        Submission::Dispatched
    }

    pub fn submit_code(&mut self) -> Submission {
        if self.step != RecoveryStep::Code {
            return Submission::Ignored;
        }
        if self.is_busy() {
            return Submission::Busy;
        }
        if let Err(e) = validate::validate_code(&self.form.verification_code) {
            return self.reject(e);
        }

        let api = self.api.clone();
        let email = self.accepted_email.clone();
        let code = self.form.verification_code.clone();
        self.dispatch(RecoveryOp::VerifyCode, async move {
            api.verify_reset_code(&email, &code).await.map(|_| ())
        });
        Submission::Dispatched
    }

    /// Always permitted during the Code step; there is no cooldown.
    pub fn resend_code(&mut self) -> Submission {
        if self.step != RecoveryStep::Code {
            return Submission::Ignored;
        }
        if self.is_busy() {
            return Submission::Busy;
        }

        let api = self.api.clone();
        let email = self.accepted_email.clone();
        self.dispatch(RecoveryOp::ResendCode, async move {
            api.resend_reset_code(&email).await.map(|_| ())
        });
        Submission::Dispatched
    }

    pub fn submit_new_password(&mut self) -> Submission {
        if self.step != RecoveryStep::NewPassword {
            return Submission::Ignored;
        }
        if self.is_busy() {
            return Submission::Busy;
        }
        if let Err(e) =
            validate::validate_new_password(&self.form.new_password, &self.form.confirm_password)
        {
            return self.reject(e);
        }

        let api = self.api.clone();
        let email = self.accepted_email.clone();
        let code = self.form.verification_code.clone();
        let password = self.form.new_password.clone();
        self.dispatch(RecoveryOp::ResetPassword, async move {
            api.reset_password(&email, &code, &password)
                .await
                .map(|_| ())
        });
        Submission::Dispatched
    }

    /// Returns whether the step changed.
    pub fn go_back(&mut self) -> bool {
        if self.is_busy() {
            return false;
        }
        match self.step.previous() {
            Some(previous) => {
                self.step = previous;
                true
            }
            None => false,
        }
    }

    pub fn on_event(&mut self, event: &RecoveryEvent) {
        match event {
            RecoveryEvent::Responded { op, outcome } => {
                if !self.is_loading {
                    tracing::debug!(?op, "ignoring response with no call in flight");
                    return;
                }
                self.is_loading = false;
                let submitted = self.submitted_email.take();

                match outcome {
                    Ok(()) => {
                        tracing::info!(?op, "recovery call accepted");
                        if let Some(email) = submitted {
                            self.form.email = email.clone();
                            self.accepted_email = email;
                        }
                        self.notice = Some(self.success_notice(*op));
                        if let Some(delay) = self.delay_for(*op) {
                            self.schedule_advance(*op, delay);
                        }
                    }
                    Err(e) => {
                        tracing::info!(?op, "recovery call failed: {e}");
                        self.notice = Some(Notice::error(op.error_title(), e.user_message()));
                    }
                }
            }
            RecoveryEvent::DelayElapsed(op) => {
                if self.pending != Some(*op) {
                    return;
                }
                self.pending = None;

                match op.next_step() {
                    Some(next) => {
                        self.step = next;
                        self.notice = None;
                    }
                    None => {
                        let _ = self.event_tx.send(Event::Navigate(Route::Login));
                    }
                }
            }
        }
    }

    fn reject(&mut self, error: ValidationError) -> Submission {
        self.notice = Some(Notice::from(&error));
        Submission::Rejected(error)
    }

    fn dispatch<F>(&mut self, op: RecoveryOp, call: F)
    where
        F: Future<Output = Result<(), ApiError>> + Send + 'static,
    {
        self.is_loading = true;
        let tx = self.event_tx.clone();
        self.tasks.spawn(op.task_key(), async move {
            let outcome = call.await;
            let _ = tx.send(Event::Recovery(RecoveryEvent::Responded { op, outcome }));
        });
    }

    fn schedule_advance(&mut self, op: RecoveryOp, delay: Duration) {
        self.pending = Some(op);
        let sleep = tokio::time::sleep(delay);
        let tx = self.event_tx.clone();
        self.tasks.spawn(ADVANCE_TASK, async move {
            sleep.await;
            let _ = tx.send(Event::Recovery(RecoveryEvent::DelayElapsed(op)));
        });
    }

    fn delay_for(&self, op: RecoveryOp) -> Option<Duration> {
        match op {
            RecoveryOp::RequestReset => Some(self.timings.code_sent_delay),
            RecoveryOp::VerifyCode => Some(self.timings.code_verified_delay),
            RecoveryOp::ResetPassword => Some(self.timings.password_reset_delay),
            RecoveryOp::ResendCode => None,
        }
    }

    fn success_notice(&self, op: RecoveryOp) -> Notice {
        let email = self.accepted_email.trim();
        match op {
            RecoveryOp::RequestReset => Notice::success(
                "¡Código enviado!",
                format!("Se ha enviado un código de verificación a {email}"),
            ),
            RecoveryOp::VerifyCode => Notice::success(
                "¡Código verificado!",
                "Ahora puedes establecer tu nueva contraseña.",
            ),
            RecoveryOp::ResetPassword => Notice::success(
                "¡Contraseña actualizada!",
                "Tu contraseña ha sido cambiada exitosamente. Serás redirigido al login.",
            ),
            RecoveryOp::ResendCode => Notice::info(
                "Código reenviado",
                format!("Se ha enviado un nuevo código de verificación a {email}"),
            ),
        }
    }
}
