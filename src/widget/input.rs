//! TextInput - single-line editable text field.
//!
//! # Features
//!
//! - Cursor navigation (arrows, home, end, ctrl+arrows by word)
//! - Text editing (backspace, delete, ctrl+w, ctrl+u)
//! - Bracketed paste (newlines dropped)
//! - Placeholder text
//! - Horizontal scrolling that keeps the cursor visible
//! - Submit callback on Enter

use std::any::Any;

use crate::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use crate::theme::StyleRole;
use crate::types::{Interaction, Rect};

use super::{Canvas, DrawContext, EventContext, Widget, string_width};

type SubmitHandler = Box<dyn FnMut(&str, &mut EventContext<'_>) + Send>;

pub struct TextInput {
    /// Stored as chars so the cursor is a plain index.
    value: Vec<char>,
    cursor: usize,
    placeholder: String,
    max_length: usize,
    on_submit: Option<SubmitHandler>,
}

// =============================================================================
// Word Boundary Helpers
// =============================================================================

/// Start of the word before `pos`.
fn find_word_start(chars: &[char], pos: usize) -> usize {
    let mut i = pos.min(chars.len());
    while i > 0 && !chars[i - 1].is_alphanumeric() {
        i -= 1;
    }
    while i > 0 && chars[i - 1].is_alphanumeric() {
        i -= 1;
    }
    i
}

/// End of the word after `pos`.
fn find_word_end(chars: &[char], pos: usize) -> usize {
    let len = chars.len();
    let mut i = pos.min(len);
    while i < len && !chars[i].is_alphanumeric() {
        i += 1;
    }
    while i < len && chars[i].is_alphanumeric() {
        i += 1;
    }
    i
}

/// First visible char index so the cursor stays inside `width` columns.
fn scroll_offset(cursor: usize, width: u16) -> usize {
    let width = width.max(1) as usize;
    // One column is reserved for the cursor past the last char
    (cursor + 1).saturating_sub(width)
}

impl TextInput {
    pub fn new() -> Self {
        Self {
            value: Vec::new(),
            cursor: 0,
            placeholder: String::new(),
            max_length: 0,
            on_submit: None,
        }
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Maximum number of characters (0 = unlimited).
    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.set_value(value);
        self
    }

    /// Callback run inside the event loop when Enter is pressed.
    pub fn on_submit(mut self, handler: impl FnMut(&str, &mut EventContext<'_>) + Send + 'static) -> Self {
        self.on_submit = Some(Box::new(handler));
        self
    }

    pub fn value(&self) -> String {
        self.value.iter().collect()
    }

    /// Replace the value and move the cursor to the end.
    pub fn set_value(&mut self, value: &str) {
        self.value = value.chars().collect();
        if self.max_length > 0 {
            self.value.truncate(self.max_length);
        }
        self.cursor = self.value.len();
    }

    pub fn cursor_position(&self) -> usize {
        self.cursor
    }

    fn insert(&mut self, text: &str) {
        for ch in text.chars().filter(|c| !c.is_control()) {
            if self.max_length > 0 && self.value.len() >= self.max_length {
                break;
            }
            self.value.insert(self.cursor, ch);
            self.cursor += 1;
        }
    }

    fn delete_range(&mut self, start: usize, end: usize) {
        self.value.drain(start..end);
        self.cursor = start;
    }

    fn edit(&mut self, key: &KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let len = self.value.len();
        match key.code {
            KeyCode::Char('w') if ctrl => {
                let start = find_word_start(&self.value, self.cursor);
                self.delete_range(start, self.cursor);
            }
            KeyCode::Char('u') if ctrl => self.delete_range(0, self.cursor),
            KeyCode::Char('a') if ctrl => self.cursor = 0,
            KeyCode::Char('e') if ctrl => self.cursor = len,
            KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                // Consumed even when full so the key does not bubble
                let mut buf = [0u8; 4];
                self.insert(c.encode_utf8(&mut buf));
            }
            KeyCode::Backspace if self.cursor > 0 => self.delete_range(self.cursor - 1, self.cursor),
            KeyCode::Backspace => {}
            KeyCode::Delete if self.cursor < len => {
                self.value.remove(self.cursor);
            }
            KeyCode::Delete => {}
            KeyCode::Left if ctrl => self.cursor = find_word_start(&self.value, self.cursor),
            KeyCode::Right if ctrl => self.cursor = find_word_end(&self.value, self.cursor),
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(len),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = len,
            _ => return false,
        }
        true
    }

    fn submit(&mut self, ctx: &mut EventContext<'_>) {
        ctx.set_interaction(Interaction::Interacted);
        let value = self.value();
        if let Some(handler) = self.on_submit.as_mut() {
            handler(&value, ctx);
        }
    }
}

impl Default for TextInput {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for TextInput {
    fn draw(&self, canvas: &mut Canvas<'_>, ctx: &DrawContext<'_>) {
        let area = ctx.area;
        if area.is_empty() {
            return;
        }
        canvas.fill(Rect::new(area.x, area.y, area.width, 1), ' ', ctx.style(StyleRole::Input));

        if self.value.is_empty() {
            canvas.print(area.x, area.y, &self.placeholder, ctx.style(StyleRole::Disabled));
            return;
        }
        let offset = scroll_offset(self.cursor, area.width);
        let visible: String = self.value[offset..].iter().collect();
        canvas.print(area.x, area.y, &visible, ctx.style(StyleRole::Input));
    }

    fn handle_event(&mut self, event: &Event, ctx: &mut EventContext<'_>) -> bool {
        match event {
            Event::Key(key) if key.code == KeyCode::Enter && key.modifiers.is_empty() => {
                self.submit(ctx);
                true
            }
            Event::Key(key) => {
                let handled = self.edit(key);
                if handled {
                    ctx.set_interaction(Interaction::Selected);
                }
                handled
            }
            Event::Paste(text) => {
                let single_line: String = text.lines().collect::<Vec<_>>().join(" ");
                self.insert(&single_line);
                true
            }
            Event::Resize { .. } => false,
        }
    }

    fn focusable(&self) -> bool {
        true
    }

    fn measure(&self) -> Option<(u16, u16)> {
        let width = string_width(&self.value()).max(string_width(&self.placeholder));
        Some((width.saturating_add(1), 1))
    }

    fn cursor(&self, area: Rect) -> Option<(u16, u16)> {
        if area.is_empty() {
            return None;
        }
        let offset = scroll_offset(self.cursor, area.width);
        let column: u16 = self.value[offset..self.cursor]
            .iter()
            .map(|c| unicode_width::UnicodeWidthChar::width(*c).unwrap_or(0) as u16)
            .sum();
        Some((area.x + column.min(area.width - 1), area.y))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
