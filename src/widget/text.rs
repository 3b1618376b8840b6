//! Text - static multi-line label.

use std::any::Any;

use crate::theme::StyleRole;

use super::{Canvas, DrawContext, Widget, string_width};

pub struct Text {
    content: String,
    role: StyleRole,
}

impl Text {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            role: StyleRole::Text,
        }
    }

    /// Draw with a different theme role (e.g. `Disabled` for hints).
    pub fn style_role(mut self, role: StyleRole) -> Self {
        self.role = role;
        self
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }
}

impl Widget for Text {
    fn draw(&self, canvas: &mut Canvas<'_>, ctx: &DrawContext<'_>) {
        let style = ctx.style(self.role);
        let area = ctx.area;
        for (row, line) in self.content.lines().enumerate() {
            if row as u16 >= area.height {
                break;
            }
            canvas.print(area.x, area.y + row as u16, line, style);
        }
    }

    fn measure(&self) -> Option<(u16, u16)> {
        let width = self.content.lines().map(string_width).max().unwrap_or(0);
        let height = self.content.lines().count() as u16;
        Some((width, height))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
