use crate::card::ImageStatus;
use ratatui::style::Color;

pub const BRAND: Color = Color::Rgb(102, 126, 234);
pub const BRAND_DEEP: Color = Color::Rgb(118, 75, 162);
pub const MUTED: Color = Color::Rgb(148, 163, 184);
pub const SUBTLE: Color = Color::Rgb(100, 116, 139);
pub const PANEL_BG: Color = Color::Rgb(30, 41, 59);
pub const STATUS_BG: Color = Color::Rgb(15, 23, 42);
pub const PRICE: Color = Color::Rgb(34, 197, 94);
pub const RATING: Color = Color::Rgb(250, 204, 21);
pub const DISABLED: Color = Color::Rgb(71, 85, 105);

/// Badge color by match confidence
pub fn color_for_score(score: f64) -> Color {
    if score >= 0.8 {
        Color::Rgb(34, 197, 94)
    } else if score >= 0.6 {
        Color::Rgb(234, 179, 8)
    } else {
        MUTED
    }
}

pub fn image_label(status: ImageStatus) -> Option<(&'static str, Color)> {
    match status {
        ImageStatus::Absent => None,
        ImageStatus::Pending => Some(("\u{2026} loading image", SUBTLE)),
        ImageStatus::Loaded => Some(("\u{25A3} image", BRAND)),
        ImageStatus::Failed => Some(("\u{2715} image unavailable", Color::Rgb(248, 113, 113))),
        ImageStatus::Unchecked => Some(("\u{25A2} image (press o)", SUBTLE)),
    }
}
