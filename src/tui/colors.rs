//! Color constants for the terminal user interface.

use ratatui::style::Color;

use crate::fields::Status;
use crate::palette::PaletteColour;

/// Header and status bar accent
pub const DEEP_BLUE: Color = Color::Rgb(30, 58, 138);
/// Background of the row a tag is being dragged over
pub const DROP_TARGET: Color = Color::Rgb(120, 90, 0);
/// Used for in-progress and in-review tasks
pub const GOLD: Color = Color::Rgb(255, 215, 0);
/// Used for done tasks
pub const MUTED: Color = Color::DarkGray;

/// Terminal colour for a palette entry.
pub fn tag_color(colour: PaletteColour) -> Color {
    match colour {
        PaletteColour::Red => Color::Rgb(239, 68, 68),
        PaletteColour::Green => Color::Rgb(34, 197, 94),
        PaletteColour::Purple => Color::Rgb(168, 85, 247),
        PaletteColour::Blue => Color::Rgb(59, 130, 246),
        PaletteColour::Orange => Color::Rgb(249, 115, 22),
        PaletteColour::Pink => Color::Rgb(236, 72, 153),
        PaletteColour::Sky => Color::Rgb(14, 165, 233),
        PaletteColour::Emerald => Color::Rgb(16, 185, 129),
        PaletteColour::Amber => Color::Rgb(245, 158, 11),
        PaletteColour::Indigo => Color::Rgb(99, 102, 241),
    }
}

pub fn status_color(status: Status) -> Color {
    match status {
        Status::Todo => Color::White,
        Status::InProgress | Status::InReview => GOLD,
        Status::Done => MUTED,
    }
}
