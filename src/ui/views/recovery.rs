use async_trait::async_trait;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};

use crate::{
    event::events::Event,
    recovery::{RecoveryStep, RecoveryWizard, Submission},
    ui::{
        components::{
            notice_popup::NoticePopup, spinner::Spinner, stepper::Stepper, text_field::TextField,
        },
        context::AppContext,
        state::{AppState, Route},
        traits::{Action, View},
        util::centered_rect,
    },
    util::colors,
    validate::CODE_LEN,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Email,
    Code,
    NewPassword,
    ConfirmPassword,
}

pub struct Recovery {
    wizard: RecoveryWizard,
    email: TextField,
    code: TextField,
    new_password: TextField,
    confirm_password: TextField,
    focus: Field,
}

impl Recovery {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            wizard: RecoveryWizard::new(
                ctx.recovery.clone(),
                ctx.event_tx.clone(),
                ctx.config.timings,
            ),
            email: TextField::new("Correo electrónico").placeholder("tu@email.com"),
            code: TextField::new("Código de verificación")
                .placeholder("123456")
                .max_len(CODE_LEN),
            new_password: TextField::new("Nueva contraseña").masked(),
            confirm_password: TextField::new("Confirmar contraseña").masked(),
            focus: Field::Email,
        }
    }

    pub fn wizard(&self) -> &RecoveryWizard {
        &self.wizard
    }

    fn focus_for(step: RecoveryStep) -> Field {
        match step {
            RecoveryStep::Email => Field::Email,
            RecoveryStep::Code => Field::Code,
            RecoveryStep::NewPassword => Field::NewPassword,
        }
    }

    fn sync_focus(&mut self) {
        let expected = Self::focus_for(self.wizard.step());
        let on_step = match self.wizard.step() {
            RecoveryStep::NewPassword => {
                matches!(self.focus, Field::NewPassword | Field::ConfirmPassword)
            }
            _ => self.focus == expected,
        };
        if !on_step {
            self.focus = expected;
        }
    }

    fn field_mut(&mut self) -> &mut TextField {
        match self.focus {
            Field::Email => &mut self.email,
            Field::Code => &mut self.code,
            Field::NewPassword => &mut self.new_password,
            Field::ConfirmPassword => &mut self.confirm_password,
        }
    }

    /// Pushes the focused field into the wizard form.
    fn commit_field(&mut self) {
        let stored = match self.focus {
            Field::Email => self.wizard.set_email(self.email.value()),
            Field::Code => self.wizard.set_verification_code(self.code.value()),
            Field::NewPassword => self.wizard.set_new_password(self.new_password.value()),
            Field::ConfirmPassword => self
                .wizard
                .set_confirm_password(self.confirm_password.value()),
        };
        if stored || self.focus == Field::Code {
            self.sync_fields();
        }
    }

    /// Mirrors the wizard form back into the text fields.
    fn sync_fields(&mut self) {
        let form = self.wizard.form();
        self.email.set_value(form.email.clone());
        self.code.set_value(form.verification_code.clone());
        self.new_password.set_value(form.new_password.clone());
        self.confirm_password.set_value(form.confirm_password.clone());
    }

    fn submit(&mut self) -> Submission {
        let submission = match self.wizard.step() {
            RecoveryStep::Email => self.wizard.submit_email(),
            RecoveryStep::Code => self.wizard.submit_code(),
            RecoveryStep::NewPassword => self.wizard.submit_new_password(),
        };
        tracing::debug!(?submission, step = ?self.wizard.step(), "recovery submit");
        submission
    }

    fn step_copy(&self) -> (&'static str, String, &'static str) {
        match self.wizard.step() {
            RecoveryStep::Email => (
                "Recuperar contraseña",
                "Ingresa tu correo electrónico y te enviaremos un código de verificación."
                    .to_string(),
                "[ Enter ] Enviar código",
            ),
            RecoveryStep::Code => (
                "Verificar código",
                format!(
                    "Hemos enviado un código de 6 dígitos a {}",
                    self.wizard.form().email.trim()
                ),
                "[ Enter ] Verificar código",
            ),
            RecoveryStep::NewPassword => (
                "Nueva contraseña",
                "Establece una nueva contraseña segura para tu cuenta.".to_string(),
                "[ Enter ] Cambiar contraseña",
            ),
        }
    }
}

#[async_trait]
impl View for Recovery {
    fn render(&mut self, f: &mut Frame, area: Rect, _state: &AppState, _ctx: &AppContext) {
        let card = centered_rect(60, 18, area);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(2),
                Constraint::Length(2),
            ])
            .split(card);

        f.render_widget(Stepper::new(self.wizard.step()), chunks[0]);

        let (title, subtitle, button) = self.step_copy();
        f.render_widget(
            Paragraph::new(Span::styled(
                title,
                Style::default()
                    .fg(colors::PRIMARY)
                    .add_modifier(Modifier::BOLD),
            ))
            .centered(),
            chunks[1],
        );
        f.render_widget(
            Paragraph::new(subtitle)
                .wrap(Wrap { trim: true })
                .centered(),
            chunks[2],
        );

        let buf = f.buffer_mut();
        match self.wizard.step() {
            RecoveryStep::Email => self.email.render(chunks[3], buf, true),
            RecoveryStep::Code => {
                self.code.render(chunks[3], buf, true);
                Paragraph::new("¿No recibiste el código? Ctrl+R para reenviar")
                    .style(Style::default().fg(colors::NEUTRAL))
                    .centered()
                    .render(chunks[4], buf);
            }
            RecoveryStep::NewPassword => {
                self.new_password
                    .render(chunks[3], buf, self.focus == Field::NewPassword);
                self.confirm_password
                    .render(chunks[4], buf, self.focus == Field::ConfirmPassword);
            }
        }

        if self.wizard.is_loading() {
            f.render_widget(
                Spinner::default()
                    .with_style(Style::default().fg(colors::PRIMARY))
                    .with_label("Procesando..."),
                chunks[5],
            );
        } else {
            let style = if self.wizard.is_busy() {
                Style::default().fg(colors::NEUTRAL)
            } else {
                Style::default().fg(colors::PRIMARY)
            };
            f.render_widget(Paragraph::new(button).style(style).centered(), chunks[5]);
        }

        let back = if self.wizard.step() == RecoveryStep::Email {
            "Esc volver al inicio de sesión"
        } else {
            "Esc ← Volver"
        };
        f.render_widget(
            Paragraph::new(Line::from(back))
                .style(Style::default().fg(colors::NEUTRAL))
                .centered(),
            chunks[6],
        );

        if let Some(notice) = self.wizard.notice() {
            f.render_widget(NoticePopup::new(notice), area);
        }
    }

    async fn handle_input(
        &mut self,
        key: KeyEvent,
        _state: &AppState,
        _ctx: &AppContext,
    ) -> Option<Action> {
        if self.wizard.notice().is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.wizard.dismiss_notice();
            }
            return None;
        }

        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => {
                if self.wizard.step() == RecoveryStep::Email && !self.wizard.is_busy() {
                    return Some(Action::Navigate(Route::Login));
                }
                if self.wizard.go_back() {
                    self.sync_focus();
                }
            }
            (KeyCode::Char('r'), KeyModifiers::CONTROL) => {
                self.wizard.resend_code();
            }
            (KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down, _) => {
                self.focus = match self.focus {
                    Field::NewPassword => Field::ConfirmPassword,
                    Field::ConfirmPassword => Field::NewPassword,
                    other => other,
                };
            }
            (KeyCode::Enter, _) => {
                self.submit();
            }
            _ if self.wizard.is_busy() => {}
            _ => {
                if self.field_mut().handle_key(key) {
                    self.commit_field();
                }
            }
        }
        None
    }

    async fn on_event(&mut self, event: &Event, _ctx: &AppContext) {
        if let Event::Recovery(event) = event {
            self.wizard.on_event(event);
            self.sync_focus();
            self.sync_fields();
        }
    }

    fn on_paste(&mut self, text: &str) {
        if self.wizard.is_busy() {
            return;
        }
        self.field_mut().insert_str(text);
        self.commit_field();
    }

    fn hints(&self) -> &'static str {
        match self.wizard.step() {
            RecoveryStep::Code => "· Enter verificar · Ctrl+R reenviar · Esc volver",
            RecoveryStep::NewPassword => "· Tab cambiar campo · Enter cambiar · Esc volver",
            RecoveryStep::Email => "· Enter enviar código · Esc volver",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::views::testing::{FakeApi, context, type_text};

    #[tokio::test(start_paused = true)]
    async fn typed_code_keeps_digits_only() {
        let api = FakeApi::default();
        let (ctx, rx) = context(api.clone());
        let mut view = Recovery::new(&ctx);
        let state = AppState::default();

        type_text(&mut view, &state, &ctx, "ana@x.io").await;
        view.handle_input(KeyEvent::from(KeyCode::Enter), &state, &ctx)
            .await;
        for _ in 0..2 {
            let event = rx.recv_async().await.unwrap();
            view.on_event(&event, &ctx).await;
        }
        assert_eq!(view.wizard().step(), RecoveryStep::Code);

        type_text(&mut view, &state, &ctx, "12a-34 5678").await;
        assert_eq!(view.wizard().form().verification_code, "123456");
        assert_eq!(view.code.value(), "123456");
    }

    #[tokio::test(start_paused = true)]
    async fn typing_is_ignored_while_the_request_is_in_flight() {
        let api = FakeApi::default();
        let (ctx, rx) = context(api.clone());
        let mut view = Recovery::new(&ctx);
        let state = AppState::default();

        type_text(&mut view, &state, &ctx, "ana@x.io").await;
        view.handle_input(KeyEvent::from(KeyCode::Enter), &state, &ctx)
            .await;
        type_text(&mut view, &state, &ctx, "zz").await;
        view.on_paste("other");
        assert_eq!(view.email.value(), "ana@x.io");
        assert_eq!(view.wizard().form().email, "ana@x.io");

        for _ in 0..2 {
            let event = rx.recv_async().await.unwrap();
            view.on_event(&event, &ctx).await;
        }
        assert_eq!(view.wizard().step(), RecoveryStep::Code);
        assert_eq!(api.calls(), vec!["request-reset ana@x.io".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn escape_on_the_first_step_returns_to_login() {
        let (ctx, _rx) = context(FakeApi::default());
        let mut view = Recovery::new(&ctx);

        let action = view
            .handle_input(KeyEvent::from(KeyCode::Esc), &AppState::default(), &ctx)
            .await;
        assert_eq!(action, Some(Action::Navigate(Route::Login)));
    }
}
