use crate::event::events::Event;
use crate::ui::context::AppContext;
use crate::ui::state::{AppState, Route};
use crate::ui::traits::{Action, View};
use ratatui::Frame;
use ratatui::crossterm::event::KeyEvent;
use ratatui::layout::Rect;

/// One page at a time plus an optional modal drawn over it. Input goes to
/// the modal when there is one; events go to both.
pub struct Router {
    route: Route,
    page: Box<dyn View>,
    overlay: Option<Box<dyn View>>,
}

impl Router {
    pub fn new(route: Route, page: Box<dyn View>) -> Self {
        Self {
            route,
            page,
            overlay: None,
        }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    /// Swaps the page. The old page and any modal are dropped, which aborts
    /// their pending tasks.
    pub fn replace(&mut self, route: Route, page: Box<dyn View>) {
        self.overlay = None;
        self.route = route;
        self.page = page;
    }

    pub fn set_overlay(&mut self, view: Box<dyn View>) {
        self.overlay = Some(view);
    }

    pub fn clear_overlay(&mut self) {
        self.overlay = None;
    }

    pub fn has_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    pub fn active_view_mut(&mut self) -> &mut Box<dyn View> {
        match self.overlay.as_mut() {
            Some(overlay) => overlay,
            None => &mut self.page,
        }
    }

    pub fn hints(&self) -> &'static str {
        match &self.overlay {
            Some(overlay) => overlay.hints(),
            None => self.page.hints(),
        }
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, state: &AppState, ctx: &AppContext) {
        self.page.render(f, area, state, ctx);
        if let Some(overlay) = &mut self.overlay {
            overlay.render(f, area, state, ctx);
        }
    }

    pub async fn handle_input(
        &mut self,
        key: KeyEvent,
        state: &AppState,
        ctx: &AppContext,
    ) -> Option<Action> {
        self.active_view_mut().handle_input(key, state, ctx).await
    }

    pub fn handle_paste(&mut self, text: &str) {
        self.active_view_mut().on_paste(text);
    }

    /// Wheel events always reach the page underneath, like a browser body.
    pub fn handle_scroll(&mut self, delta: i16, ctx: &AppContext) {
        self.page.on_scroll(delta, ctx);
    }

    pub async fn on_event(&mut self, event: &Event, ctx: &AppContext) {
        self.page.on_event(event, ctx).await;

        if let Some(overlay) = &mut self.overlay {
            overlay.on_event(event, ctx).await;
        }
    }
}
