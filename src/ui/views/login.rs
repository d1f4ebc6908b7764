use async_trait::async_trait;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::{
    event::events::Event,
    http::{error::ApiError, models::AuthResponse},
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

const EMAIL: usize = 0;
const PASSWORD: usize = 1;

pub struct Login {
    fields: [TextField; 2],
    focus: usize,
    notice: Option<Notice>,
    is_loading: bool,
    redirecting: bool,
    tasks: TaskManager,
}

impl Default for Login {
    fn default() -> Self {
        Self {
            fields: [
                TextField::new("Correo electrónico").placeholder("tu@correo.com"),
                TextField::new("Contraseña").masked(),
            ],
            focus: EMAIL,
            notice: None,
            is_loading: false,
            redirecting: false,
            tasks: TaskManager::new(),
        }
    }
}

impl Login {
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    fn submit(&mut self, ctx: &AppContext) {
        if self.is_loading || self.redirecting {
            return;
        }

        let email = self.fields[EMAIL].value().trim().to_string();
        let password = self.fields[PASSWORD].value().to_string();
        if let Err(e) = validate::validate_login(&email, &password) {
            self.notice = Some(e.into());
            return;
        }

        self.is_loading = true;
        let auth = ctx.auth.clone();
        let tx = ctx.event_tx.clone();
        self.tasks.spawn("login", async move {
            let outcome = auth.login(&email, &password).await;
            let _ = tx.send(Event::LoginFinished(outcome));
        });
    }

    fn on_finished(&mut self, outcome: &Result<AuthResponse, ApiError>, ctx: &AppContext) {
        if !self.is_loading {
            return;
        }
        self.is_loading = false;

        match outcome {
            Ok(response) => {
                if let Err(e) = ctx.session.save(&response.token, &response.user) {
                    tracing::error!("failed to persist session: {e}");
                    self.notice = Some(Notice::error(
                        "Error al iniciar sesión",
                        "No se pudo guardar la sesión",
                    ));
                    return;
                }
                tracing::info!("logged in");
                self.notice = Some(Notice::success(
                    "¡Inicio de sesión exitoso!",
                    "Bienvenido de nuevo. Serás redirigido a la aplicación principal.",
                ));
                self.redirecting = true;

                let sleep = tokio::time::sleep(ctx.config.timings.auth_redirect_delay);
                let tx = ctx.event_tx.clone();
                self.tasks.spawn("redirect", async move {
                    sleep.await;
                    let _ = tx.send(Event::Navigate(Route::Home));
                });
            }
            Err(e) if e.is_network() => {
                self.notice = Some(Notice::error("Error de conexión", e.user_message()));
            }
            Err(e) => {
                self.notice = Some(Notice::error("Error al iniciar sesión", e.user_message()));
            }
        }
    }
}

#[async_trait]
impl View for Login {
    fn render(&mut self, f: &mut Frame, area: Rect, _state: &AppState, _ctx: &AppContext) {
        let form = centered_rect(48, 14, area);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(2),
                Constraint::Length(2),
            ])
            .split(form);

        f.render_widget(
            Paragraph::new(Line::from(vec![
                Span::raw("Bienvenido de nuevo a "),
                Span::styled(
                    "Ánima",
                    Style::default()
                        .fg(colors::PRIMARY)
                        .add_modifier(Modifier::BOLD),
                ),
            ]))
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
                    .with_label("Iniciando sesión..."),
                chunks[3],
            );
        } else {
            f.render_widget(
                Paragraph::new("[ Enter ] Iniciar sesión")
                    .style(Style::default().fg(colors::PRIMARY))
                    .centered(),
                chunks[3],
            );
        }

        f.render_widget(
            Paragraph::new(vec![
                Line::from("¿No tienes cuenta? Ctrl+R"),
                Line::from("¿Olvidaste tu contraseña? Ctrl+F"),
            ])
            .style(Style::default().fg(colors::NEUTRAL))
            .centered(),
            chunks[4],
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

        match (key.code, key.modifiers) {
            (KeyCode::Char('r'), KeyModifiers::CONTROL) => Some(Action::Navigate(Route::Register)),
            (KeyCode::Char('f'), KeyModifiers::CONTROL) => Some(Action::Navigate(Route::Recovery)),
            (KeyCode::Tab | KeyCode::Down, _) | (KeyCode::BackTab | KeyCode::Up, _) => {
                self.focus = (self.focus + 1) % self.fields.len();
                None
            }
            (KeyCode::Enter, _) => {
                self.submit(ctx);
                None
            }
            (KeyCode::Esc, _) => Some(Action::Quit),
            _ => {
                self.fields[self.focus].handle_key(key);
                None
            }
        }
    }

    async fn on_event(&mut self, event: &Event, ctx: &AppContext) {
        if let Event::LoginFinished(outcome) = event {
            self.on_finished(outcome, ctx);
        }
    }

    fn on_paste(&mut self, text: &str) {
        self.fields[self.focus].insert_str(text);
    }

    fn hints(&self) -> &'static str {
        "· Tab cambiar campo · Enter entrar · Ctrl+R registro · Ctrl+F recuperar · Esc salir"
    }
}
