//! Application configuration.
//!
//! [`AppConfig`] tunes the event loop (frame rate, queue capacities, poll
//! interval) and [`KeyMap`] names the globally intercepted keys.
//!
//! # Example
//!
//! ```
//! use ember_tui::AppConfig;
//! use std::time::Duration;
//!
//! let config = AppConfig::default()
//!     .frame_rate(60)
//!     .poll_interval(Duration::from_millis(20))
//!     .handle_signals(false);
//! assert_eq!(config.frame_interval(), Duration::from_micros(16_666));
//! ```

use std::time::Duration;

use crate::event::{KeyCode, KeyEvent, KeyModifiers};

/// Frame rate override.
pub const FPS_ENV: &str = "EMBER_FPS";
/// Set to any non-empty value other than `0` to skip OS signal handling.
pub const NO_SIGNALS_ENV: &str = "EMBER_NO_SIGNALS";

// =============================================================================
// KeyMap
// =============================================================================

/// Keys intercepted by the event loop before the focused widget sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyMap {
    /// Hard interrupt. Always stops the application.
    pub interrupt: KeyEvent,
    /// Move focus forward.
    pub focus_next: KeyEvent,
    /// Move focus backward.
    pub focus_prev: KeyEvent,
    /// Close the active modal, or stop when none is open.
    pub escape: KeyEvent,
    /// Modifier that, combined with a digit, jumps to a numbered pane.
    pub nav_modifier: KeyModifiers,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            interrupt: KeyEvent::ctrl('c'),
            focus_next: KeyEvent::plain(KeyCode::Tab),
            focus_prev: KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT),
            escape: KeyEvent::plain(KeyCode::Esc),
            nav_modifier: KeyModifiers::ALT,
        }
    }
}

// =============================================================================
// AppConfig
// =============================================================================

/// Event loop configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub frame_rate: u32,
    pub command_capacity: usize,
    pub event_capacity: usize,
    pub poll_interval: Duration,
    pub keymap: KeyMap,
    pub handle_signals: bool,
    /// Cursor blink toggles per second. Zero disables blinking.
    pub cursor_blink: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            frame_rate: 30,
            command_capacity: 256,
            event_capacity: 64,
            poll_interval: Duration::from_millis(50),
            keymap: KeyMap::default(),
            handle_signals: true,
            cursor_blink: 2,
        }
    }
}

impl AppConfig {
    /// Defaults overlaid with `EMBER_FPS` and `EMBER_NO_SIGNALS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(fps) = lookup(FPS_ENV).and_then(|v| v.trim().parse::<u32>().ok()) {
            config = config.frame_rate(fps);
        }
        if let Some(flag) = lookup(NO_SIGNALS_ENV) {
            let flag = flag.trim();
            if !flag.is_empty() && flag != "0" {
                config.handle_signals = false;
            }
        }
        config
    }

    /// Frames per second for the render tick. Clamped to `1..=240`.
    pub fn frame_rate(mut self, fps: u32) -> Self {
        self.frame_rate = fps.clamp(1, 240);
        self
    }

    /// Capacity of the command queue. At least one.
    pub fn command_capacity(mut self, capacity: usize) -> Self {
        self.command_capacity = capacity.max(1);
        self
    }

    /// Capacity of the input event queue. At least one.
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    /// How long the input poller blocks before re-checking for shutdown.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn keymap(mut self, keymap: KeyMap) -> Self {
        self.keymap = keymap;
        self
    }

    /// Whether to install SIGINT/SIGTERM/SIGHUP handlers (unix only).
    pub fn handle_signals(mut self, enabled: bool) -> Self {
        self.handle_signals = enabled;
        self
    }

    /// Cursor blink rate in toggles per second.
    pub fn cursor_blink(mut self, rate: u32) -> Self {
        self.cursor_blink = rate;
        self
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.frame_rate.max(1) as u64)
    }

    /// `None` when blinking is disabled.
    pub fn blink_interval(&self) -> Option<Duration> {
        (self.cursor_blink > 0).then(|| Duration::from_micros(1_000_000 / self.cursor_blink as u64))
    }
}
