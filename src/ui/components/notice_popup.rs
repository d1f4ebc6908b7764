use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget, Wrap},
};

use crate::{notice::Notice, ui::util::centered_rect, util::colors};

/// Centered dialog for a form notice. The owner decides how it closes.
pub struct NoticePopup<'a> {
    notice: &'a Notice,
    hint: &'a str,
}

impl<'a> NoticePopup<'a> {
    pub fn new(notice: &'a Notice) -> Self {
        Self {
            notice,
            hint: "Enter para cerrar",
        }
    }

    pub fn hint(mut self, hint: &'a str) -> Self {
        self.hint = hint;
        self
    }
}

impl Widget for NoticePopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rect = centered_rect(52, 8, area);
        let color = colors::notice(self.notice.kind);

        Clear.render(rect, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(color))
            .style(Style::default().bg(colors::BACKGROUND));

        let text = vec![
            Line::from(vec![
                Span::raw(format!("{} ", self.notice.kind.icon())),
                Span::styled(
                    self.notice.title.as_str(),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(""),
            Line::from(self.notice.message.as_str()),
            Line::from(""),
            Line::from(Span::styled(self.hint, Style::default().fg(colors::NEUTRAL))),
        ];

        Paragraph::new(text)
            .block(block)
            .wrap(Wrap { trim: true })
            .centered()
            .render(rect, buf);
    }
}
