use std::sync::Arc;

use flume::Receiver;
use ratatui::Frame;

use crate::{
    config::AppConfig,
    event::events::Event,
    http::ApiService,
    session::{Session, store::FileStore},
    util::log::data_dir,
};

use super::{
    context::AppContext,
    layout::AppLayout,
    router::Router,
    state::{AppState, Route},
    tui::{self, TerminalEvent},
    util::handler::EventHandler,
    views::{self, CaptureModal},
};

const SESSION_FILE: &str = "session.json";

pub struct App {
    pub event_rx: Receiver<Event>,
    pub ctx: AppContext,
    pub state: AppState,
    pub router: Router,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: AppConfig) -> color_eyre::Result<Self> {
        let (event_tx, event_rx) = flume::unbounded();
        let store = FileStore::open(data_dir().join(SESSION_FILE))?;
        let session = Session::new(Arc::new(store));
        let api = Arc::new(ApiService::new(&config, session.clone())?);
        tracing::info!(api = api.base_url(), "starting");

        let ctx = AppContext::new(api, session, config, event_tx);
        Ok(Self::with_context(ctx, event_rx))
    }

    pub fn with_context(ctx: AppContext, event_rx: Receiver<Event>) -> Self {
        let route = Self::resolve(Route::Home, &ctx);
        let router = Router::new(route, views::build(route, &ctx));

        let mut state = AppState::default();
        state.ui.current_route = route;
        state.ui.has_focus = true;

        Self {
            event_rx,
            ctx,
            state,
            router,
            should_quit: false,
        }
    }

    /// Protected routes fall back to Login without a valid session.
    fn resolve(route: Route, ctx: &AppContext) -> Route {
        if route.is_protected() && !ctx.session.is_authenticated() {
            Route::Login
        } else {
            route
        }
    }

    pub async fn navigate(&mut self, route: Route) {
        let route = Self::resolve(route, &self.ctx);
        tracing::info!(?route, "navigate");

        let mut view = views::build(route, &self.ctx);
        view.on_mount(&self.ctx).await;
        self.router.replace(route, view);
        self.state.ui.current_route = route;
    }

    pub async fn mount_current(&mut self) {
        self.router.active_view_mut().on_mount(&self.ctx).await;
    }

    pub fn open_capture(&mut self) {
        if self.router.has_overlay() {
            return;
        }
        let modal = CaptureModal::new(&self.ctx);
        self.router.set_overlay(Box::new(modal));
    }

    pub async fn run(&mut self) -> color_eyre::Result<()> {
        let mut tui = tui::Tui::new()?
            .tick_rate(self.ctx.config.tick_rate)
            .paste(true)
            .mouse(true);
        tui.enter()?;

        EventHandler::handle_event(self, TerminalEvent::Init, &mut tui).await?;
        while !self.should_quit {
            tui.draw(|f| {
                self.ui(f);
            })?;

            EventHandler::handle_events(self, &mut tui).await?;
        }

        self.router.clear_overlay();
        tui.exit()?;
        Ok(())
    }

    fn ui(&mut self, frame: &mut Frame) {
        if self.state.ui.has_focus {
            AppLayout::new(self).render(frame, frame.area());
        }
    }
}
