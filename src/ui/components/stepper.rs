use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::{recovery::RecoveryStep, util::colors};

/// "① Correo ── ② Código ── ③ Nueva contraseña", with finished steps
/// checked off.
pub struct Stepper {
    current: RecoveryStep,
}

impl Stepper {
    pub fn new(current: RecoveryStep) -> Self {
        Self { current }
    }
}

impl Widget for Stepper {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut spans = Vec::new();
        for (i, step) in RecoveryStep::ALL.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" ── ", Style::default().fg(colors::NEUTRAL)));
            }

            let (marker, style) = if step.number() < self.current.number() {
                ("✓".to_string(), Style::default().fg(colors::SUCCESS))
            } else if *step == self.current {
                (
                    step.number().to_string(),
                    Style::default()
                        .fg(colors::PRIMARY)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                (step.number().to_string(), Style::default().fg(colors::NEUTRAL))
            };
            spans.push(Span::styled(format!("[{marker}] {}", step.label()), style));
        }

        Paragraph::new(Line::from(spans))
            .centered()
            .render(area, buf);
    }
}
