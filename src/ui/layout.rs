use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::{ui::app::App, util::colors};

pub struct AppLayout<'a> {
    pub app: &'a mut App,
}

impl<'a> AppLayout<'a> {
    pub fn new(app: &'a mut App) -> Self {
        Self { app }
    }

    pub fn render(self, f: &mut Frame, area: Rect) {
        let buf = f.buffer_mut();
        buf.set_style(area, Style::new().bg(colors::BACKGROUND));

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(area);

        let main_area = chunks[0];
        let footer_area = chunks[1];

        let route = self.app.router.route();
        let content_block = Block::default()
            .borders(Borders::ALL)
            .border_set(border::ROUNDED)
            .border_style(Style::default().fg(colors::SECONDARY))
            .title(Line::from(vec![
                Span::styled(" 🎵 Anima ", Style::default().fg(colors::PRIMARY)),
                Span::raw(format!("· {} ", route.title())),
            ]))
            .title_alignment(Alignment::Center);

        let content_inner = content_block.inner(main_area);
        f.render_widget(content_block, main_area);

        self.app
            .router
            .render(f, content_inner, &self.app.state, &self.app.ctx);

        let hints = self.app.router.hints();
        let footer = Paragraph::new(Line::from(vec![
            Span::styled(" Ctrl+C salir ", Style::default().fg(colors::NEUTRAL)),
            Span::styled(hints, Style::default().fg(colors::NEUTRAL)),
        ]));
        f.render_widget(footer, footer_area);

        self.app.state.toasts.render(area, f.buffer_mut());
    }
}
