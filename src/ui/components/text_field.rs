use ratatui::{
    buffer::Buffer,
    crossterm::event::{KeyCode, KeyEvent, KeyModifiers},
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::util::colors;

/// Single-line input. Password fields render bullets instead of text.
#[derive(Debug, Clone)]
pub struct TextField {
    label: &'static str,
    placeholder: &'static str,
    value: String,
    masked: bool,
    max_len: Option<usize>,
}

impl TextField {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            placeholder: "",
            value: String::new(),
            masked: false,
            max_len: None,
        }
    }

    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    pub fn placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        if let Some(max) = self.max_len {
            self.value = self.value.chars().take(max).collect();
        }
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    pub fn insert_str(&mut self, text: &str) {
        for c in text.chars().filter(|c| !c.is_control()) {
            self.push(c);
        }
    }

    fn push(&mut self, c: char) {
        if self
            .max_len
            .is_some_and(|max| self.value.chars().count() >= max)
        {
            return;
        }
        self.value.push(c);
    }

    /// Returns whether the value changed.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                let changed = !self.value.is_empty();
                self.value.clear();
                changed
            }
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                let before = self.value.len();
                self.push(c);
                before != self.value.len()
            }
            KeyCode::Backspace => self.value.pop().is_some(),
            _ => false,
        }
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer, focused: bool) {
        let border = if focused {
            Style::default().fg(colors::PRIMARY)
        } else {
            Style::default().fg(colors::NEUTRAL)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(Span::styled(
                self.label,
                Style::default().add_modifier(Modifier::BOLD),
            ));

        let shown = if self.masked {
            "•".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        };

        let inner_width = area.width.saturating_sub(2) as usize;
        let line = if shown.is_empty() && !focused {
            Line::from(Span::styled(
                self.placeholder,
                Style::default().fg(colors::NEUTRAL),
            ))
        } else {
            // Keep the end of long values visible.
            let mut visible = shown.as_str();
            while visible.width() + 1 > inner_width && !visible.is_empty() {
                let mut chars = visible.chars();
                chars.next();
                visible = chars.as_str();
            }
            let mut spans = vec![Span::raw(visible.to_string())];
            if focused {
                spans.push(Span::styled("▏", Style::default().fg(colors::PRIMARY)));
            }
            Line::from(spans)
        };

        Paragraph::new(line).block(block).render(area, buf);
    }
}
