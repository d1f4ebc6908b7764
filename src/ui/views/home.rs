use async_trait::async_trait;
use chrono::Local;
use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::{
    capture::analysis::CATALOG,
    event::events::Event,
    http::models::UserProfile,
    notice::Notice,
    ui::{
        components::notice_popup::NoticePopup,
        context::AppContext,
        state::{AppState, Route},
        traits::{Action, View},
    },
    util::{colors, task::TaskManager},
};

#[derive(Default)]
pub struct Home {
    user: Option<UserProfile>,
    scroll: u16,
    confirm_logout: bool,
    logging_out: bool,
    tasks: TaskManager,
}

impl Home {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            user: ctx.session.user(),
            ..Self::default()
        }
    }

    pub fn scroll_offset(&self) -> u16 {
        self.scroll
    }

    pub fn is_confirming_logout(&self) -> bool {
        self.confirm_logout
    }

    fn scroll_by(&mut self, delta: i16, ctx: &AppContext) {
        if ctx.scroll.is_locked() {
            return;
        }
        let last = u16::try_from(self.body().len().saturating_sub(1)).unwrap_or(u16::MAX);
        self.scroll = self.scroll.saturating_add_signed(delta).min(last);
    }

    fn start_logout(&mut self, ctx: &AppContext) {
        self.confirm_logout = false;
        if self.logging_out {
            return;
        }
        self.logging_out = true;
        ctx.notify(Notice::info("Sesión", "Cerrando sesión..."));

        let sleep = tokio::time::sleep(ctx.config.timings.logout_delay);
        let tx = ctx.event_tx.clone();
        self.tasks.spawn("logout", async move {
            sleep.await;
            let _ = tx.send(Event::LogoutElapsed);
        });
    }

    fn end_session(&mut self, ctx: &AppContext) {
        if let Err(e) = ctx.session.logout() {
            tracing::error!("failed to clear session: {e}");
        }
        let _ = ctx.event_tx.send(Event::Navigate(Route::Login));
    }

    fn body(&self) -> Vec<Line<'static>> {
        let heading = Style::default()
            .fg(colors::PRIMARY)
            .add_modifier(Modifier::BOLD);
        let muted = Style::default().fg(colors::NEUTRAL);
        let user = self.user.clone().unwrap_or_default();

        let mut lines = vec![
            Line::from(Span::styled(
                format!("¡Hola, {}!", user.display_name()),
                heading,
            )),
            Line::from("¿Cómo te sientes hoy? Deja que Ánima elija la música por ti."),
            Line::from(""),
            Line::from(Span::styled("Tu perfil", heading)),
        ];

        let field = |label: &str, value: Option<&str>| {
            Line::from(vec![
                Span::styled(format!("  {label}: "), muted),
                Span::raw(value.unwrap_or("-").to_string()),
            ])
        };
        lines.push(field("Correo", user.email.as_deref()));
        lines.push(field("Miembro desde", user.created_at.as_deref()));
        lines.push(field("Último acceso", user.last_login.as_deref()));
        lines.push(Line::from(""));

        lines.push(Line::from(Span::styled("Estados de ánimo", heading)));
        for (label, icon, _) in CATALOG {
            lines.push(Line::from(format!("  {icon}  {label}")));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Pulsa c para analizar tu emoción con la cámara o una imagen.",
            Style::default().fg(colors::ACCENT),
        )));
        lines
    }
}

#[async_trait]
impl View for Home {
    async fn on_mount(&mut self, ctx: &AppContext) {
        let auth = ctx.auth.clone();
        let tx = ctx.event_tx.clone();
        self.tasks.spawn("profile", async move {
            let outcome = auth.current_user().await;
            let _ = tx.send(Event::ProfileFetched(outcome));
        });
    }

    fn render(&mut self, f: &mut Frame, area: Rect, _state: &AppState, _ctx: &AppContext) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(1)])
            .split(area);

        let header = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(1), Constraint::Length(10)])
            .split(chunks[0]);

        f.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(
                    "Ánima",
                    Style::default()
                        .fg(colors::PRIMARY)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    "   [p] Perfil  [s] Configuración  [x] Salir",
                    Style::default().fg(colors::NEUTRAL),
                ),
            ]))
            .block(Block::default().borders(Borders::BOTTOM)),
            header[0],
        );
        f.render_widget(
            Paragraph::new(Local::now().format("%H:%M").to_string())
                .block(Block::default().borders(Borders::BOTTOM))
                .right_aligned(),
            header[1],
        );

        let body = Paragraph::new(self.body())
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0));
        f.render_widget(body, chunks[1]);

        if self.confirm_logout {
            let notice = Notice::info("Cerrar sesión", "¿Estás seguro que deseas cerrar sesión?");
            f.render_widget(
                NoticePopup::new(&notice).hint("Enter confirmar · Esc cancelar"),
                area,
            );
        }
    }

    async fn handle_input(
        &mut self,
        key: KeyEvent,
        _state: &AppState,
        ctx: &AppContext,
    ) -> Option<Action> {
        if self.confirm_logout {
            match key.code {
                KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('s') => self.start_logout(ctx),
                KeyCode::Esc | KeyCode::Char('n') => self.confirm_logout = false,
                _ => {}
            }
            return None;
        }

        match key.code {
            KeyCode::Char('c') => return Some(Action::OpenCapture),
            KeyCode::Char('p') => ctx.notify(Notice::info("Perfil", "Abriendo perfil...")),
            KeyCode::Char('s') => {
                ctx.notify(Notice::info("Configuración", "Abriendo configuración..."))
            }
            KeyCode::Char('x') => self.confirm_logout = !self.logging_out,
            KeyCode::Char('q') => return Some(Action::Quit),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_by(1, ctx),
            KeyCode::Up | KeyCode::Char('k') => self.scroll_by(-1, ctx),
            KeyCode::Char('g') => self.scroll = 0,
            _ => {}
        }
        None
    }

    async fn on_event(&mut self, event: &Event, ctx: &AppContext) {
        match event {
            Event::ProfileFetched(Ok(user)) => {
                if let Err(e) = ctx.session.update_user(user) {
                    tracing::warn!("failed to store profile: {e}");
                }
                self.user = Some(user.clone());
            }
            Event::ProfileFetched(Err(e)) if e.is_unauthorized() => {
                tracing::info!("session rejected by the server");
                ctx.notify(Notice::error("Sesión", "Tu sesión ha expirado. Inicia sesión de nuevo."));
                self.end_session(ctx);
            }
            Event::ProfileFetched(Err(e)) => {
                tracing::warn!("profile refresh failed: {e}");
            }
            Event::LogoutElapsed if self.logging_out => {
                self.logging_out = false;
                self.end_session(ctx);
            }
            _ => {}
        }
    }

    fn on_scroll(&mut self, delta: i16, ctx: &AppContext) {
        self.scroll_by(delta, ctx);
    }

    fn hints(&self) -> &'static str {
        "· c analizar emoción · j/k desplazar · p perfil · s configuración · x salir · q cerrar"
    }
}
