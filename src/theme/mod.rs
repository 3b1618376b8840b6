//! Theme System for ember-tui.
//!
//! A theme is a plain value object: a palette of semantic colors plus a few
//! geometric defaults. It is threaded explicitly through construction and the
//! draw pass; there is no global theme.
//!
//! Widgets never read palette fields directly. They ask for a [`StyleRole`]
//! and get a fully resolved [`Style`] back, so a preset can change how a role
//! looks (colors, attributes) without touching widget code.
//!
//! # Example
//!
//! ```
//! use ember_tui::theme::{self, StyleRole};
//!
//! let dracula = theme::dracula();
//! let border = dracula.style(StyleRole::FocusedBorder);
//! assert_eq!(border.fg, dracula.border_focus);
//! ```

mod presets;

pub use presets::*;

use crate::types::{Attr, BorderStyle, Color, Style};

// =============================================================================
// Style roles
// =============================================================================

/// Named style lookups consumed by widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleRole {
    /// Body text.
    Text,
    /// Highlighted (focused or selected) content.
    Selected,
    /// Pane border without focus inside.
    Border,
    /// Pane border while focus is inside the pane.
    FocusedBorder,
    /// Pane title.
    Title,
    /// Editable input field.
    Input,
    /// Drawn cursor cell.
    Cursor,
    /// Inactive content.
    Disabled,
}

// =============================================================================
// Metrics
// =============================================================================

/// Geometric defaults used to seed widget construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    /// Horizontal cells per logical unit.
    pub cell_width: u16,
    /// Vertical cells per logical unit.
    pub cell_height: u16,
    /// Inner padding of panes, in cells.
    pub padding: u16,
    /// Default pane border.
    pub border: BorderStyle,
    /// Default gap between layout slots.
    pub gap: u16,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            cell_width: 1,
            cell_height: 1,
            padding: 0,
            border: BorderStyle::Single,
            gap: 0,
        }
    }
}

// =============================================================================
// Theme
// =============================================================================

/// Semantic palette plus geometric defaults.
///
/// Colors are organized into groups:
/// - Main: primary, accent
/// - Text: text, text_muted, text_disabled
/// - Background: background, surface
/// - Border: border, border_focus
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    /// Theme name (e.g., "dracula").
    pub name: String,

    /// Primary brand color.
    pub primary: Color,
    /// Accent for highlights.
    pub accent: Color,

    /// Primary text color.
    pub text: Color,
    /// Muted/secondary text.
    pub text_muted: Color,
    /// Disabled/inactive text.
    pub text_disabled: Color,

    /// Primary background.
    pub background: Color,
    /// Surface behind inputs and selected rows.
    pub surface: Color,

    /// Default border color.
    pub border: Color,
    /// Focused border color.
    pub border_focus: Color,

    pub metrics: Metrics,
}

impl Default for Theme {
    fn default() -> Self {
        terminal()
    }
}

impl Theme {
    /// Create a new theme with every color set to the terminal default.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primary: Color::Reset,
            accent: Color::Reset,
            text: Color::Reset,
            text_muted: Color::Reset,
            text_disabled: Color::Reset,
            background: Color::Reset,
            surface: Color::Reset,
            border: Color::Reset,
            border_focus: Color::Reset,
            metrics: Metrics::default(),
        }
    }

    /// Replace the geometric defaults.
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Resolve a role to a concrete style.
    pub fn style(&self, role: StyleRole) -> Style {
        let base = Style::new(self.text, self.background);
        match role {
            StyleRole::Text => base,
            StyleRole::Selected => Style::new(self.background, self.primary).attrs(Attr::BOLD),
            StyleRole::Border => base.fg(self.border),
            StyleRole::FocusedBorder => base.fg(self.border_focus),
            StyleRole::Title => base.fg(self.accent).attrs(Attr::BOLD),
            StyleRole::Input => base.bg(self.surface),
            StyleRole::Cursor => base.bg(self.surface).attrs(Attr::INVERSE),
            StyleRole::Disabled => base.fg(self.text_disabled),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
