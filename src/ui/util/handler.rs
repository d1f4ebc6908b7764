use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};
use tokio::time::Instant;
use tracing::debug;

use crate::{
    event::events::Event,
    ui::{
        app::App,
        traits::Action,
        tui::{TerminalEvent, Tui},
    },
};

pub struct EventHandler;

impl EventHandler {
    pub async fn handle_events(app: &mut App, tui: &mut Tui) -> color_eyre::Result<bool> {
        let mut should_render = false;
        if let Some(evt) = tui.next().await
            && Self::handle_event(app, evt, tui).await?
        {
            should_render = true;
        }

        while let Ok(evt) = app.event_rx.try_recv() {
            Self::handle_action(app, evt).await;
            should_render = true;
        }

        Ok(should_render)
    }

    pub async fn handle_event(
        app: &mut App,
        evt: TerminalEvent,
        tui: &mut Tui,
    ) -> color_eyre::Result<bool> {
        match evt {
            TerminalEvent::Init => app.mount_current().await,
            TerminalEvent::Quit | TerminalEvent::Closed => app.should_quit = true,
            TerminalEvent::FocusGained => {
                app.state.ui.has_focus = true;
                tui.clear()?;
            }
            TerminalEvent::FocusLost => app.state.ui.has_focus = false,
            TerminalEvent::Key(key) => Self::handle_key_event(app, key).await,
            TerminalEvent::Mouse(mouse) => Self::handle_mouse_event(app, mouse),
            TerminalEvent::Paste(text) => app.router.handle_paste(&text),
            TerminalEvent::Tick => {
                app.state.toasts.prune(Instant::now());
                return Ok(app.state.ui.has_focus);
            }
            _ => {}
        }

        Ok(true)
    }

    pub async fn handle_action(app: &mut App, evt: Event) {
        app.router.on_event(&evt, &app.ctx).await;

        match evt {
            Event::Navigate(route) => app.navigate(route).await,
            Event::Notify(notice) => {
                let ttl = app.ctx.config.timings.toast_ttl;
                app.state.toasts.push(notice, ttl);
            }
            Event::Quit => app.should_quit = true,
            _ => {}
        }
    }

    async fn handle_key_event(app: &mut App, evt: KeyEvent) {
        if evt.kind != KeyEventKind::Press {
            return;
        }
        if evt.code == KeyCode::Char('c') && evt.modifiers == KeyModifiers::CONTROL {
            app.should_quit = true;
            return;
        }

        if let Some(action) = app.router.handle_input(evt, &app.state, &app.ctx).await {
            Self::dispatch_action(app, action).await;
        }
    }

    pub async fn dispatch_action(app: &mut App, action: Action) {
        debug!(?action, "dispatching");
        match action {
            Action::Quit => app.should_quit = true,
            Action::Navigate(route) => app.navigate(route).await,
            Action::OpenCapture => app.open_capture(),
            Action::CloseOverlay => app.router.clear_overlay(),
            Action::None => {}
        }
    }

    fn handle_mouse_event(app: &mut App, evt: MouseEvent) {
        match evt.kind {
            MouseEventKind::ScrollUp => app.router.handle_scroll(-1, &app.ctx),
            MouseEventKind::ScrollDown => app.router.handle_scroll(1, &app.ctx),
            _ => {}
        }
    }
}
