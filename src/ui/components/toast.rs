use std::time::Duration;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};
use tokio::time::Instant;

use crate::{notice::Notice, util::colors};

const MAX_VISIBLE: usize = 3;
const TOAST_WIDTH: u16 = 44;
const TOAST_HEIGHT: u16 = 4;

#[derive(Debug, Clone)]
pub struct Toast {
    pub notice: Notice,
    expires_at: Instant,
}

/// Self-dismissing notices stacked in the top-right corner.
#[derive(Debug, Default)]
pub struct ToastStack {
    toasts: Vec<Toast>,
}

impl ToastStack {
    pub fn push(&mut self, notice: Notice, ttl: Duration) {
        tracing::debug!(title = %notice.title, "toast");
        self.toasts.push(Toast {
            notice,
            expires_at: Instant::now() + ttl,
        });
    }

    /// Drops expired toasts. Returns whether anything changed.
    pub fn prune(&mut self, now: Instant) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.expires_at > now);
        before != self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        let width = TOAST_WIDTH.min(area.width);
        let x = area.x + area.width.saturating_sub(width + 1);

        for (i, toast) in self.toasts.iter().rev().take(MAX_VISIBLE).enumerate() {
            let y = area.y + 1 + i as u16 * TOAST_HEIGHT;
            if y + TOAST_HEIGHT > area.bottom() {
                break;
            }
            let rect = Rect::new(x, y, width, TOAST_HEIGHT);
            let color = colors::notice(toast.notice.kind);

            Clear.render(rect, buf);
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color));
            let text = vec![
                Line::from(vec![
                    Span::raw(format!("{} ", toast.notice.kind.icon())),
                    Span::styled(
                        toast.notice.title.as_str(),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(toast.notice.message.as_str()),
            ];
            Paragraph::new(text)
                .block(block)
                .wrap(Wrap { trim: true })
                .render(rect, buf);
        }
    }
}
