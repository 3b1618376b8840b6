//! Built-in themes, looked up by name with [`get_preset`].
//!
//! `terminal` is the default and only uses ANSI palette indices, so it follows
//! whatever colors the user's terminal is configured with.

use super::{Metrics, Theme};
use crate::types::{BorderStyle, Color};

// =============================================================================
// Terminal
// =============================================================================

/// ANSI palette only. Same as `Theme::default()`.
pub fn terminal() -> Theme {
    Theme {
        name: "terminal".to_string(),
        primary: Color::Ansi(12), // bright blue
        accent: Color::Ansi(11),  // bright yellow
        text: Color::Reset,
        text_muted: Color::Ansi(8),
        text_disabled: Color::Ansi(8),
        background: Color::Reset,
        surface: Color::Reset,
        border: Color::Ansi(7),
        border_focus: Color::Ansi(12),
        metrics: Metrics::default(),
    }
}

// =============================================================================
// Dracula
// =============================================================================

/// Dark purple background, rounded borders.
pub fn dracula() -> Theme {
    Theme {
        name: "dracula".to_string(),
        primary: Color::from_rgb_int(0xbd93f9),
        accent: Color::from_rgb_int(0xf1fa8c),
        text: Color::from_rgb_int(0xf8f8f2),
        text_muted: Color::from_rgb_int(0x6272a4),
        text_disabled: Color::from_rgb_int(0x44475a),
        background: Color::from_rgb_int(0x282a36),
        surface: Color::from_rgb_int(0x44475a),
        border: Color::from_rgb_int(0x6272a4),
        border_focus: Color::from_rgb_int(0xbd93f9),
        metrics: Metrics {
            border: BorderStyle::Rounded,
            ..Metrics::default()
        },
    }
}

// =============================================================================
// Nord
// =============================================================================

pub fn nord() -> Theme {
    Theme {
        name: "nord".to_string(),
        primary: Color::from_rgb_int(0x88c0d0),
        accent: Color::from_rgb_int(0xd08770),
        text: Color::from_rgb_int(0xeceff4),
        text_muted: Color::from_rgb_int(0x4c566a),
        text_disabled: Color::from_rgb_int(0x434c5e),
        background: Color::from_rgb_int(0x2e3440),
        surface: Color::from_rgb_int(0x3b4252),
        border: Color::from_rgb_int(0x4c566a),
        border_focus: Color::from_rgb_int(0x88c0d0),
        metrics: Metrics::default(),
    }
}

/// Look up a preset by name.
pub fn get_preset(name: &str) -> Option<Theme> {
    match name {
        "terminal" => Some(terminal()),
        "dracula" => Some(dracula()),
        "nord" => Some(nord()),
        _ => None,
    }
}
