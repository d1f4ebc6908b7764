use async_trait::async_trait;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::Paragraph,
};

use crate::{
    event::events::Event,
    http::{error::ApiError, models::RegisterResponse},
    notice::Notice,
    ui::{
        components::{notice_popup::NoticePopup, spinner::Spinner, text_field::TextField},
        context::AppContext,
        state::{AppState, Route},
        traits::{Action, View},
        util::centered_rect,
    },
    util::{colors, task::TaskManager},
    validate,
};

const NAME: usize = 0;
const EMAIL: usize = 1;
const PASSWORD: usize = 2;
const CONFIRM: usize = 3;

pub struct Register {
    fields: [TextField; 4],
    focus: usize,
    notice: Option<Notice>,
    is_loading: bool,
    redirecting: bool,
    tasks: TaskManager,
}

impl Default for Register {
    fn default() -> Self {
        Self {
            fields: [
                TextField::new("Nombre completo"),
                TextField::new("Correo electrónico").placeholder("tu@correo.com"),
                TextField::new("Contraseña").masked(),
                TextField::new("Confirmar contraseña").masked(),
            ],
            focus: NAME,
            notice: None,
            is_loading: false,
            redirecting: false,
            tasks: TaskManager::new(),
        }
    }
}

impl Register {
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    fn submit(&mut self, ctx: &AppContext) {
        if self.is_loading || self.redirecting {
            return;
        }

        let name = self.fields[NAME].value().trim().to_string();
        let email = self.fields[EMAIL].value().trim().to_string();
        let password = self.fields[PASSWORD].value().to_string();
        if let Err(e) = validate::validate_registration(
            &name,
            &email,
            &password,
            self.fields[CONFIRM].value(),
        ) {
            self.notice = Some(e.into());
            return;
        }

        self.is_loading = true;
        let auth = ctx.auth.clone();
        let tx = ctx.event_tx.clone();
        self.tasks.spawn("register", async move {
            let outcome = auth.register(&name, &email, &password).await;
            let _ = tx.send(Event::RegisterFinished(outcome));
        });
    }

    fn on_finished(&mut self, outcome: &Result<RegisterResponse, ApiError>, ctx: &AppContext) {
        if !self.is_loading {
            return;
        }
        self.is_loading = false;

        match outcome {
            Ok(_) => {
                tracing::info!("account created");
                self.notice = Some(Notice::success(
                    "¡Registro exitoso!",
                    "Tu cuenta ha sido creada correctamente. Serás redirigido al inicio de sesión.",
                ));
                self.redirecting = true;

                let sleep = tokio::time::sleep(ctx.config.timings.auth_redirect_delay);
                let tx = ctx.event_tx.clone();
                self.tasks.spawn("redirect", async move {
                    sleep.await;
                    let _ = tx.send(Event::Navigate(Route::Login));
                });
            }
            Err(e) if e.is_network() => {
                self.notice = Some(Notice::error("Error de conexión", e.user_message()));
            }
            Err(e) => {
                self.notice = Some(Notice::error(
                    "Error al registrarse",
                    e.message_or("No se pudo crear la cuenta"),
                ));
            }
        }
    }
}

#[async_trait]
impl View for Register {
    fn render(&mut self, f: &mut Frame, area: Rect, _state: &AppState, _ctx: &AppContext) {
        let form = centered_rect(48, 19, area);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(2),
                Constraint::Length(1),
            ])
            .split(form);

        f.render_widget(
            Paragraph::new("Crea tu cuenta")
                .style(
                    Style::default()
                        .fg(colors::PRIMARY)
                        .add_modifier(Modifier::BOLD),
                )
                .centered(),
            chunks[0],
        );

        for (i, field) in self.fields.iter().enumerate() {
            field.render(chunks[1 + i], f.buffer_mut(), i == self.focus);
        }

        if self.is_loading {
            f.render_widget(
                Spinner::default()
                    .with_style(Style::default().fg(colors::PRIMARY))
                    .with_label("Creando cuenta..."),
                chunks[5],
            );
        } else {
            f.render_widget(
                Paragraph::new("[ Enter ] Registrarse")
                    .style(Style::default().fg(colors::PRIMARY))
                    .centered(),
                chunks[5],
            );
        }

        f.render_widget(
            Paragraph::new("¿Ya tienes cuenta? Ctrl+L")
                .style(Style::default().fg(colors::NEUTRAL))
                .centered(),
            chunks[6],
        );

        if let Some(notice) = &self.notice {
            f.render_widget(NoticePopup::new(notice), area);
        }
    }

    async fn handle_input(
        &mut self,
        key: KeyEvent,
        _state: &AppState,
        ctx: &AppContext,
    ) -> Option<Action> {
        if self.notice.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.notice = None;
            }
            return None;
        }

        let len = self.fields.len();
        match (key.code, key.modifiers) {
            (KeyCode::Char('l'), KeyModifiers::CONTROL) | (KeyCode::Esc, _) => {
                Some(Action::Navigate(Route::Login))
            }
            (KeyCode::Tab | KeyCode::Down, _) => {
                self.focus = (self.focus + 1) % len;
                None
            }
            (KeyCode::BackTab | KeyCode::Up, _) => {
                self.focus = (self.focus + len - 1) % len;
                None
            }
            (KeyCode::Enter, _) => {
                self.submit(ctx);
                None
            }
            _ => {
                self.fields[self.focus].handle_key(key);
                None
            }
        }
    }

    async fn on_event(&mut self, event: &Event, ctx: &AppContext) {
        if let Event::RegisterFinished(outcome) = event {
            self.on_finished(outcome, ctx);
        }
    }

    fn on_paste(&mut self, text: &str) {
        self.fields[self.focus].insert_str(text);
    }

    fn hints(&self) -> &'static str {
        "· Tab cambiar campo · Enter registrarse · Esc volver"
    }
}
