//! Button - focusable label activated with Enter or Space.

use std::any::Any;

use crate::event::{Event, KeyCode, KeyModifiers};
use crate::theme::StyleRole;
use crate::types::Interaction;

use super::{Canvas, DrawContext, EventContext, Widget, string_width};

type PressHandler = Box<dyn FnMut(&mut EventContext<'_>) + Send>;

pub struct Button {
    label: String,
    enabled: bool,
    presses: u32,
    on_press: Option<PressHandler>,
}

impl Button {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            enabled: true,
            presses: 0,
            on_press: None,
        }
    }

    /// Callback run inside the event loop on activation.
    pub fn on_press(mut self, handler: impl FnMut(&mut EventContext<'_>) + Send + 'static) -> Self {
        self.on_press = Some(Box::new(handler));
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// Disabled buttons are skipped by focus traversal.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn presses(&self) -> u32 {
        self.presses
    }

    fn press(&mut self, ctx: &mut EventContext<'_>) {
        self.presses += 1;
        ctx.set_interaction(Interaction::Interacted);
        if let Some(handler) = self.on_press.as_mut() {
            handler(ctx);
        }
    }
}

impl Widget for Button {
    fn draw(&self, canvas: &mut Canvas<'_>, ctx: &DrawContext<'_>) {
        let role = match (self.enabled, ctx.interaction) {
            (false, _) => StyleRole::Disabled,
            (true, Interaction::Normal) => StyleRole::Text,
            (true, _) => StyleRole::Selected,
        };
        let text = format!("[ {} ]", self.label);
        canvas.print(ctx.area.x, ctx.area.y, &text, ctx.style(role));
    }

    fn handle_event(&mut self, event: &Event, ctx: &mut EventContext<'_>) -> bool {
        let Event::Key(key) = event else { return false };
        if !self.enabled || key.modifiers != KeyModifiers::NONE {
            return false;
        }
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.press(ctx);
                true
            }
            _ => false,
        }
    }

    fn focusable(&self) -> bool {
        self.enabled
    }

    fn measure(&self) -> Option<(u16, u16)> {
        Some((string_width(&self.label) + 4, 1))
    }

    fn cursor_blink(&self) -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
