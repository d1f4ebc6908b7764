use std::path::PathBuf;

use async_trait::async_trait;
use directories::BaseDirs;
use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::{
    capture::{
        AnalysisPhase, CameraRequest, CaptureSession, Preview,
        image::{ImageSource, StillImage},
    },
    event::events::Event,
    notice::Notice,
    ui::{
        components::{spinner::Spinner, text_field::TextField},
        context::AppContext,
        state::AppState,
        traits::{Action, View},
        util::centered_rect,
    },
    util::colors,
};

/// The "Análisis de Emoción" modal. Dropping it closes the session, which
/// releases the camera and the page scroll lock.
pub struct CaptureModal {
    session: CaptureSession,
    path_prompt: Option<TextField>,
    list_state: ListState,
}

impl CaptureModal {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            session: CaptureSession::open(ctx.capture.clone(), ctx.event_tx.clone(), &ctx.scroll),
            path_prompt: None,
            list_state: ListState::default(),
        }
    }

    pub fn session(&self) -> &CaptureSession {
        &self.session
    }

    fn describe(image: &StillImage) -> String {
        let origin = match image.source() {
            ImageSource::Camera => "Foto capturada".to_string(),
            ImageSource::Upload(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Imagen subida".to_string()),
        };
        format!("{origin} ({}, {} KB)", image.mime(), image.len().div_ceil(1024))
    }

    fn render_preview(&self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(colors::NEUTRAL));

        let lines = match (self.session.camera_request(), self.session.preview()) {
            (Some(CameraRequest::Start), _) => vec![
                Line::from("📷"),
                Line::from("Activando cámara..."),
            ],
            (Some(CameraRequest::Capture), _) => vec![
                Line::from("📸"),
                Line::from("Capturando foto..."),
            ],
            (None, Preview::Placeholder) => vec![
                Line::from("📷"),
                Line::from("Activa tu cámara para comenzar"),
            ],
            (None, Preview::Live) => vec![
                Line::from(Span::styled(
                    "● Cámara activa",
                    Style::default().fg(colors::ERROR),
                )),
                Line::from("Pulsa espacio para capturar"),
            ],
            (None, Preview::Still(image)) => {
                vec![Line::from("🖼"), Line::from(Self::describe(image))]
            }
        };

        f.render_widget(
            Paragraph::new(lines)
                .block(block)
                .wrap(Wrap { trim: true })
                .centered(),
            area,
        );
    }

    fn render_analysis(&mut self, f: &mut Frame, area: Rect) {
        match self.session.phase() {
            AnalysisPhase::Idle => {
                f.render_widget(
                    Paragraph::new("Captura o sube una foto para analizar tu emoción.")
                        .style(Style::default().fg(colors::NEUTRAL))
                        .wrap(Wrap { trim: true }),
                    area,
                );
            }
            AnalysisPhase::CapturedAwaitingResult => {
                f.render_widget(
                    Spinner::default()
                        .with_style(Style::default().fg(colors::PRIMARY))
                        .with_label("Analizando..."),
                    area,
                );
            }
            AnalysisPhase::ResultReady => {
                let Some(emotion) = self.session.result() else {
                    return;
                };
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Length(3),
                        Constraint::Length(1),
                        Constraint::Min(1),
                    ])
                    .split(area);

                f.render_widget(
                    Paragraph::new(vec![
                        Line::from(Span::styled(
                            format!("{}  {}", emotion.icon, emotion.label),
                            Style::default()
                                .fg(colors::PRIMARY)
                                .add_modifier(Modifier::BOLD),
                        )),
                        Line::from(format!("Confianza: {}", emotion.confidence_label())),
                    ]),
                    chunks[0],
                );
                f.render_widget(
                    Paragraph::new("Recomendaciones musicales:")
                        .style(Style::default().add_modifier(Modifier::BOLD)),
                    chunks[1],
                );

                let items: Vec<ListItem> = self
                    .session
                    .playlist()
                    .iter()
                    .map(|track| ListItem::new(format!("♪ {track}")))
                    .collect();
                if !items.is_empty() && self.list_state.selected().is_none() {
                    self.list_state.select(Some(0));
                }
                let list = List::new(items)
                    .highlight_style(
                        Style::default()
                            .fg(colors::ACCENT)
                            .add_modifier(Modifier::BOLD),
                    )
                    .highlight_symbol("▶ ");
                f.render_stateful_widget(list, chunks[2], &mut self.list_state);
            }
        }
    }

    fn move_selection(&mut self, forward: bool) {
        let len = self.session.playlist().len();
        if len == 0 {
            return;
        }
        let i = self.list_state.selected().map_or(0, |i| {
            if forward {
                (i + 1).min(len - 1)
            } else {
                i.saturating_sub(1)
            }
        });
        self.list_state.select(Some(i));
    }

    async fn handle_prompt(&mut self, key: KeyEvent) {
        let Some(prompt) = self.path_prompt.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.path_prompt = None,
            KeyCode::Enter => {
                let raw = prompt.value().trim().trim_matches(['"', '\'']).to_string();
                self.path_prompt = None;
                if raw.is_empty() {
                    return;
                }
                self.list_state.select(None);
                self.session.upload_image(&expand_home(&raw)).await;
            }
            _ => {
                prompt.handle_key(key);
            }
        }
    }
}

/// Expands a leading `~/` the way a shell would.
fn expand_home(raw: &str) -> PathBuf {
    match (raw.strip_prefix("~/"), BaseDirs::new()) {
        (Some(rest), Some(dirs)) => dirs.home_dir().join(rest),
        _ => PathBuf::from(raw),
    }
}

#[async_trait]
impl View for CaptureModal {
    fn render(&mut self, f: &mut Frame, area: Rect, _state: &AppState, _ctx: &AppContext) {
        let modal = centered_rect(76, 22, area);
        f.render_widget(Clear, modal);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(colors::PRIMARY))
            .style(Style::default().bg(colors::BACKGROUND))
            .title(" Análisis de Emoción ")
            .title_bottom(" Esc cerrar ");
        let inner = block.inner(modal);
        f.render_widget(block, modal);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(3),
            ])
            .split(inner);
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(rows[0]);

        self.render_preview(f, columns[0]);
        let analysis_area = Rect {
            x: columns[1].x + 2,
            width: columns[1].width.saturating_sub(2),
            ..columns[1]
        };
        self.render_analysis(f, analysis_area);

        let mut controls = Vec::new();
        if !self.session.has_camera() && self.session.camera_request().is_none() {
            controls.push(Span::styled("[a] Activar Cámara  ", Style::default().fg(colors::PRIMARY)));
        }
        controls.push(Span::styled(
            "[espacio] Capturar Foto  ",
            Style::default().fg(colors::SECONDARY),
        ));
        controls.push(Span::styled("[u] Subir Imagen", Style::default().fg(colors::ACCENT)));
        if self.session.phase() != AnalysisPhase::Idle {
            controls.push(Span::styled(
                "  [r] Reiniciar",
                Style::default().fg(colors::NEUTRAL),
            ));
        }
        f.render_widget(Paragraph::new(Line::from(controls)), rows[1]);

        if let Some(prompt) = &self.path_prompt {
            prompt.render(rows[2], f.buffer_mut(), true);
        }
    }

    async fn handle_input(
        &mut self,
        key: KeyEvent,
        _state: &AppState,
        ctx: &AppContext,
    ) -> Option<Action> {
        if self.path_prompt.is_some() {
            self.handle_prompt(key).await;
            return None;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.session.close();
                return Some(Action::CloseOverlay);
            }
            KeyCode::Char('a') => {
                self.session.start_camera();
            }
            KeyCode::Char(' ') | KeyCode::Char('f') => {
                self.list_state.select(None);
                self.session.capture();
            }
            KeyCode::Char('u') => {
                self.path_prompt = Some(
                    TextField::new("Ruta de la imagen (Enter subir · Esc cancelar)")
                        .placeholder("~/foto.jpg"),
                );
            }
            KeyCode::Char('r') => {
                self.list_state.select(None);
                self.session.reset();
            }
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(true),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(false),
            KeyCode::Enter if self.session.phase() == AnalysisPhase::ResultReady => {
                if let Some(track) = self
                    .list_state
                    .selected()
                    .and_then(|i| self.session.playlist().get(i))
                {
                    tracing::info!(%track, "play requested");
                    ctx.notify(Notice::info("Música", "Reproduciendo canción..."));
                }
            }
            _ => {}
        }
        None
    }

    async fn on_event(&mut self, event: &Event, _ctx: &AppContext) {
        match event {
            Event::Camera(camera) => self.session.on_camera_event(camera),
            Event::AnalysisFinished {
                generation,
                outcome,
            } => self.session.on_analysis_finished(*generation, outcome),
            _ => {}
        }
    }

    fn on_paste(&mut self, text: &str) {
        if let Some(prompt) = self.path_prompt.as_mut() {
            prompt.insert_str(text);
        }
    }

    fn hints(&self) -> &'static str {
        "· a cámara · espacio capturar · u subir · j/k canción · Enter reproducir · Esc cerrar"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        capture::{
            CaptureDeps,
            analysis::{SimulatedClassifier, StaticPlaylists},
            camera::{CameraStream, MediaDevices},
            error::CaptureError,
        },
        ui::views::testing::{FakeApi, context},
    };

    /// A camera that never finishes opening.
    struct StalledCamera;

    #[async_trait]
    impl MediaDevices for StalledCamera {
        async fn open_camera(&self) -> Result<Box<dyn CameraStream>, CaptureError> {
            std::future::pending().await
        }
    }

    fn stalled_deps() -> CaptureDeps {
        CaptureDeps {
            devices: Arc::new(StalledCamera),
            classifier: Arc::new(SimulatedClassifier::new(std::time::Duration::from_secs(2))),
            playlists: Arc::new(StaticPlaylists),
        }
    }

    #[test]
    fn home_prefix_is_expanded() {
        assert_eq!(expand_home("/tmp/a.png"), PathBuf::from("/tmp/a.png"));
        if let Some(dirs) = BaseDirs::new() {
            assert_eq!(expand_home("~/a.png"), dirs.home_dir().join("a.png"));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn escape_closes_the_session_and_the_overlay() {
        let (ctx, _rx) = context(FakeApi::default());
        let mut modal = CaptureModal::new(&ctx);
        assert!(ctx.scroll.is_locked());

        let action = modal
            .handle_input(KeyEvent::from(KeyCode::Esc), &AppState::default(), &ctx)
            .await;
        assert_eq!(action, Some(Action::CloseOverlay));
        assert!(!modal.session().is_open());
        assert!(!ctx.scroll.is_locked());
    }

    #[tokio::test(start_paused = true)]
    async fn upload_prompt_swallows_keys_until_cancelled() {
        let (ctx, _rx) = context(FakeApi::default());
        let mut modal = CaptureModal::new(&ctx);
        let state = AppState::default();

        modal.handle_input(KeyEvent::from(KeyCode::Char('u')), &state, &ctx).await;
        let action = modal
            .handle_input(KeyEvent::from(KeyCode::Char('q')), &state, &ctx)
            .await;
        assert_eq!(action, None);
        assert!(modal.session().is_open());

        modal.handle_input(KeyEvent::from(KeyCode::Esc), &state, &ctx).await;
        let action = modal
            .handle_input(KeyEvent::from(KeyCode::Char('q')), &state, &ctx)
            .await;
        assert_eq!(action, Some(Action::CloseOverlay));
    }

    #[tokio::test(start_paused = true)]
    async fn camera_keys_return_while_the_device_hangs() {
        let (ctx, _rx) = context(FakeApi::default());
        let ctx = ctx.with_capture(stalled_deps());
        let mut modal = CaptureModal::new(&ctx);
        let state = AppState::default();
        let pressed_at = tokio::time::Instant::now();

        modal.handle_input(KeyEvent::from(KeyCode::Char('a')), &state, &ctx).await;
        assert_eq!(modal.session().camera_request(), Some(CameraRequest::Start));
        modal.handle_input(KeyEvent::from(KeyCode::Char(' ')), &state, &ctx).await;
        assert_eq!(modal.session().camera_request(), Some(CameraRequest::Capture));
        assert_eq!(pressed_at.elapsed(), std::time::Duration::ZERO);

        let action = modal
            .handle_input(KeyEvent::from(KeyCode::Esc), &state, &ctx)
            .await;
        assert_eq!(action, Some(Action::CloseOverlay));
        assert_eq!(modal.session().camera_request(), None);
        assert!(!ctx.scroll.is_locked());
    }
}
