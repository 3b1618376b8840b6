//! Pane - bordered container holding exactly one child.
//!
//! A pane draws its border and title, then hands the inset area to its
//! content. Panes are the only thing a layout accepts.
//!
//! When the pane holds something focusable and is numbered, the title is
//! rendered as `[n] title` and `nav_modifier + n` jumps focus into the pane.

use std::any::Any;

use crate::layout::SlotSpec;
use crate::theme::{StyleRole, Theme};
use crate::types::{BorderStyle, Rect};

use super::{Canvas, DrawContext, Role, Widget};

pub struct Pane {
    title: String,
    border: BorderStyle,
    padding: u16,
    nav_index: u8,
}

impl Pane {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            border: BorderStyle::Single,
            padding: 0,
            nav_index: 0,
        }
    }

    /// Pane seeded with the theme's border and padding.
    pub fn themed(title: impl Into<String>, theme: &Theme) -> Self {
        Self::new(title)
            .border(theme.metrics.border)
            .padding(theme.metrics.padding)
    }

    pub fn border(mut self, border: BorderStyle) -> Self {
        self.border = border;
        self
    }

    pub fn padding(mut self, padding: u16) -> Self {
        self.padding = padding;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Title as drawn, including the navigation prefix.
    pub fn display_title(&self) -> String {
        match (self.nav_index, self.title.is_empty()) {
            (0, _) => self.title.clone(),
            (n, true) => format!("[{n}]"),
            (n, false) => format!("[{n}] {}", self.title),
        }
    }
}

impl Widget for Pane {
    fn draw(&self, canvas: &mut Canvas<'_>, ctx: &DrawContext<'_>) {
        let area = ctx.area;
        canvas.fill(area, ' ', ctx.style(StyleRole::Text));

        let border_role = if ctx.focus_within {
            StyleRole::FocusedBorder
        } else {
            StyleRole::Border
        };
        canvas.border(area, self.border, ctx.style(border_role));

        let title = self.display_title();
        if title.is_empty() || area.width < 3 {
            return;
        }
        let x = area.x + self.border.thickness();
        canvas.print(x, area.y, &title, ctx.style(StyleRole::Title));
    }

    fn role(&self) -> Role {
        Role::Pane
    }

    fn arrange(&mut self, area: Rect, slots: &[SlotSpec]) -> Vec<Rect> {
        vec![area.inset(self.content_inset()); slots.len()]
    }

    fn content_inset(&self) -> u16 {
        self.border.thickness() + self.padding
    }

    fn set_nav_index(&mut self, index: u8) {
        self.nav_index = index;
    }

    fn nav_index(&self) -> u8 {
        self.nav_index
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
