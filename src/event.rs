//! Input events.
//!
//! Surfaces translate their native input (crossterm, scripted test input)
//! into [`Event`] so routing only ever handles one event shape.

use crossterm::event as ct;

pub use crossterm::event::{KeyCode, KeyModifiers};

/// A key press with modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyEvent {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Plain key without modifiers.
    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    pub const fn alt(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::ALT)
    }

    /// Check whether this event is the given chord.
    ///
    /// Shift is ignored for character keys since terminals fold it into the
    /// character itself (`'A'` arrives with or without SHIFT depending on the
    /// terminal). `BackTab` and `Shift+Tab` are treated as the same chord.
    pub fn matches(&self, chord: &KeyEvent) -> bool {
        if is_back_tab(self) && is_back_tab(chord) {
            return true;
        }
        if self.code != chord.code {
            return false;
        }
        match self.code {
            KeyCode::Char(_) => {
                let mask = !KeyModifiers::SHIFT;
                (self.modifiers & mask) == (chord.modifiers & mask)
            }
            _ => self.modifiers == chord.modifiers,
        }
    }

    /// Digit `1..=9` pressed with exactly `modifier`, if any.
    pub fn nav_digit(&self, modifier: KeyModifiers) -> Option<u8> {
        if self.modifiers != modifier {
            return None;
        }
        match self.code {
            KeyCode::Char(c @ '1'..='9') => Some(c as u8 - b'0'),
            _ => None,
        }
    }
}

fn is_back_tab(key: &KeyEvent) -> bool {
    key.code == KeyCode::BackTab
        || (key.code == KeyCode::Tab && key.modifiers.contains(KeyModifiers::SHIFT))
}

/// Toolkit input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Keyboard input.
    Key(KeyEvent),
    /// Surface was resized. Widgets are not resized directly; the next render
    /// pass lays the tree out against the new dimensions.
    Resize { width: u16, height: u16 },
    /// Bracketed paste.
    Paste(String),
}

impl Event {
    pub fn key(code: KeyCode) -> Self {
        Self::Key(KeyEvent::plain(code))
    }

    pub fn key_with(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self::Key(KeyEvent::new(code, modifiers))
    }

    pub fn as_key(&self) -> Option<&KeyEvent> {
        match self {
            Self::Key(key) => Some(key),
            _ => None,
        }
    }
}

/// Convert a crossterm event. Returns `None` for events the toolkit does not
/// route (mouse, focus reporting, key release/repeat).
pub fn from_crossterm(event: ct::Event) -> Option<Event> {
    match event {
        ct::Event::Key(key) => {
            if key.kind == ct::KeyEventKind::Release {
                return None;
            }
            Some(Event::Key(KeyEvent::new(key.code, key.modifiers)))
        }
        ct::Event::Resize(width, height) => Some(Event::Resize { width, height }),
        ct::Event::Paste(text) => Some(Event::Paste(text)),
        _ => None,
    }
}
