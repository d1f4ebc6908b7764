use ratatui::style::Color;

use crate::notice::NoticeKind;

pub const PRIMARY: Color = Color::from_u32(0x00b48cff);
pub const SECONDARY: Color = Color::from_u32(0x006c4bd1);
pub const NEUTRAL: Color = Color::from_u32(0x00404040);
pub const BACKGROUND: Color = Color::from_u32(0x000d0d12);
pub const ACCENT: Color = Color::from_u32(0x00ffb86c);

pub const ERROR: Color = Color::from_u32(0x00ff6b6b);
pub const SUCCESS: Color = Color::from_u32(0x0051cf66);
pub const INFO: Color = Color::from_u32(0x004dabf7);

pub fn notice(kind: NoticeKind) -> Color {
    match kind {
        NoticeKind::Error => ERROR,
        NoticeKind::Success => SUCCESS,
        NoticeKind::Info => INFO,
    }
}
