//! Drawing and event contexts handed to widgets.

use unicode_width::UnicodeWidthChar;

use crate::app::{AppHandle, Command};
use crate::surface::{CONTINUATION, Surface};
use crate::theme::{StyleRole, Theme};
use crate::types::{BorderStyle, Interaction, Rect, Style};

use super::WidgetId;

// =============================================================================
// Canvas
// =============================================================================

/// Clipped view of a surface.
///
/// Every write outside the clip rect is dropped, so widgets can draw without
/// checking their own bounds.
pub struct Canvas<'a> {
    surface: &'a mut dyn Surface,
    clip: Rect,
}

impl<'a> Canvas<'a> {
    pub fn new(surface: &'a mut dyn Surface, clip: Rect) -> Self {
        Self { surface, clip }
    }

    pub fn clip(&self) -> Rect {
        self.clip
    }

    /// Write one cell.
    pub fn set(&mut self, x: u16, y: u16, ch: char, style: Style) {
        if self.clip.contains(x, y) {
            self.surface.set_content(x, y, ch, style);
        }
    }

    /// Print `text` starting at (x, y) on one row.
    ///
    /// Stops at the clip edge and never splits a double-width character.
    /// Returns the number of columns advanced.
    pub fn print(&mut self, x: u16, y: u16, text: &str, style: Style) -> u16 {
        let right = self.clip.right();
        let mut col = x;
        for ch in text.chars() {
            let width = ch.width().unwrap_or(0) as u16;
            if width == 0 {
                continue;
            }
            if col.saturating_add(width) > right {
                break;
            }
            self.set(col, y, ch, style);
            if width == 2 {
                self.set(col + 1, y, CONTINUATION, style);
            }
            col += width;
        }
        col - x
    }

    /// Fill a rect with one character.
    pub fn fill(&mut self, rect: Rect, ch: char, style: Style) {
        let rect = rect.intersection(&self.clip);
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                self.surface.set_content(x, y, ch, style);
            }
        }
    }

    /// Draw a border along the edge of `rect`.
    pub fn border(&mut self, rect: Rect, border: BorderStyle, style: Style) {
        if border == BorderStyle::None || rect.width < 2 || rect.height < 2 {
            return;
        }
        let (h, v, tl, tr, br, bl) = border.chars();
        let right = rect.right() - 1;
        let bottom = rect.bottom() - 1;
        for x in rect.x + 1..right {
            self.set(x, rect.y, h, style);
            self.set(x, bottom, h, style);
        }
        for y in rect.y + 1..bottom {
            self.set(rect.x, y, v, style);
            self.set(right, y, v, style);
        }
        self.set(rect.x, rect.y, tl, style);
        self.set(right, rect.y, tr, style);
        self.set(right, bottom, br, style);
        self.set(rect.x, bottom, bl, style);
    }
}

/// Display width of a string in terminal cells.
pub fn string_width(text: &str) -> u16 {
    text.chars()
        .map(|c| c.width().unwrap_or(0) as u16)
        .fold(0u16, u16::saturating_add)
}

// =============================================================================
// DrawContext
// =============================================================================

/// Per-widget information for one draw call.
pub struct DrawContext<'a> {
    pub theme: &'a Theme,
    /// The widget's rect.
    pub area: Rect,
    /// The widget itself holds focus.
    pub focused: bool,
    /// Focus is on the widget or one of its descendants.
    pub focus_within: bool,
    pub interaction: Interaction,
}

impl DrawContext<'_> {
    pub fn style(&self, role: StyleRole) -> Style {
        self.theme.style(role)
    }
}

// =============================================================================
// EventContext
// =============================================================================

/// Handed to [`Widget::handle_event`](super::Widget::handle_event).
///
/// Widgets mutate their own fields directly. Anything touching the rest of the
/// tree goes through [`dispatch`](EventContext::dispatch) and runs after the
/// current event is done.
pub struct EventContext<'a> {
    id: WidgetId,
    area: Rect,
    app: Option<&'a AppHandle>,
    interaction: Interaction,
}

impl<'a> EventContext<'a> {
    pub fn new(id: WidgetId, area: Rect, app: Option<&'a AppHandle>, interaction: Interaction) -> Self {
        Self { id, area, app, interaction }
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn app(&self) -> Option<&'a AppHandle> {
        self.app
    }

    /// Enqueue a command. Returns false when there is no application or the
    /// command was dropped.
    pub fn dispatch(&self, command: Command) -> bool {
        self.app.is_some_and(|app| app.dispatch(command))
    }

    pub fn queue_redraw(&self) {
        if let Some(app) = self.app {
            app.queue_redraw();
        }
    }

    pub fn stop(&self) {
        if let Some(app) = self.app {
            app.stop();
        }
    }

    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    pub fn set_interaction(&mut self, interaction: Interaction) {
        self.interaction = interaction;
    }
}
