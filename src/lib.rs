//! # ember-tui
//!
//! Retained-mode terminal widget toolkit.
//!
//! ## Architecture
//!
//! Widgets live in an arena ([`widget::WidgetTree`]) owned by a single event
//! loop ([`Application`]). The loop is the only code that mutates the tree,
//! focus, or layout; every other thread posts [`Command`]s through an
//! [`AppHandle`].
//!
//! ```text
//! input ─▶ routing ─▶ focused widget ─▶ ancestors (modal-bounded)
//!                          │
//!                     Command queue ─▶ loop executes ─▶ mark_dirty ─▶ redraw
//!                                                                     │
//!                              layout (top-down) ─▶ draw ─▶ present ◀─┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Geometry and style values (Rect, Color, Style, BorderStyle)
//! - [`layout`] - Fixed/proportional size solver
//! - [`widget`] - Widget trait, arena, built-in widgets
//! - [`focus`] - Focus traversal and modal scoping
//! - [`app`] - Event loop, commands, routing, render pass
//! - [`surface`] - Terminal and in-memory surfaces
//! - [`theme`] - Style roles and presets
//! - [`config`] - Loop tuning and key bindings
//! - [`logging`] - File-backed tracing setup

pub mod app;
pub mod config;
pub mod error;
pub mod event;
pub mod focus;
pub mod layout;
pub mod logging;
pub mod surface;
pub mod theme;
pub mod types;
pub mod widget;

pub use app::{AppHandle, Application, Command, Context};
pub use config::{AppConfig, KeyMap};
pub use error::{Error, Result};
pub use event::{Event, KeyCode, KeyEvent, KeyModifiers};
pub use focus::FocusManager;
pub use theme::{StyleRole, Theme};
pub use types::*;
pub use widget::{Element, Widget, WidgetId, WidgetTree};
