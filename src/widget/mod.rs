//! Widget System - the component contract and the widget arena
//!
//! Every node in the UI is a [`Widget`] trait object stored in a
//! [`WidgetTree`]. The tree owns all per-node state (rect, visibility, focus,
//! dirty flag, interaction state, parent link); the trait only carries
//! behavior. Back-references are [`WidgetId`] keys resolved through the tree,
//! so a removed widget leaves no dangling reference behind.
//!
//! # Roles
//!
//! - [`Role::Leaf`] - holds no children (text, buttons, inputs)
//! - [`Role::Pane`] - holds exactly one child, draws a border
//! - [`Role::Layout`] - holds up to [`LAYOUT_CAPACITY`] panes and splits its
//!   area among them
//!
//! # Example
//!
//! ```
//! use ember_tui::widget::{Element, Layout, Pane, Text, WidgetTree};
//! use ember_tui::layout::{Orientation, Size};
//!
//! let mut tree = WidgetTree::new();
//! let root = tree
//!     .set_root(
//!         Element::new(Layout::new(Orientation::Horizontal))
//!             .child(Element::new(Pane::new("left")).size(Size::Fixed(10)).child(Element::new(Text::new("a"))))
//!             .child(Element::new(Pane::new("right")).child(Element::new(Text::new("b")))),
//!     )
//!     .unwrap();
//! assert_eq!(tree.children(root).len(), 2);
//! ```

mod button;
mod canvas;
mod element;
mod input;
mod layout;
mod pane;
mod text;
mod tree;

pub use button::Button;
pub use canvas::{Canvas, DrawContext, EventContext, string_width};
pub use element::Element;
pub use input::TextInput;
pub use layout::Layout;
pub use pane::Pane;
pub use text::Text;
pub use tree::{Node, WidgetState, WidgetTree};

use std::any::Any;

use crate::app::AppHandle;
use crate::event::{Event, KeyEvent};
use crate::layout::SlotSpec;
use crate::types::Rect;

slotmap::new_key_type! {
    /// Generational key of a widget in a [`WidgetTree`].
    pub struct WidgetId;
}

/// Maximum number of panes a layout holds.
pub const LAYOUT_CAPACITY: usize = 10;

/// Structural role of a widget, enforced when mounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Leaf,
    Pane,
    Layout,
}

/// Behavior of a tree node.
///
/// Only [`draw`](Widget::draw) and the `Any` accessors are required. The
/// `Any` accessors are always `self`; they let callers downcast through
/// [`WidgetTree::downcast_mut`].
pub trait Widget: Any + Send {
    /// Paint into `canvas`. The canvas is clipped to the widget's rect.
    fn draw(&self, canvas: &mut Canvas<'_>, ctx: &DrawContext<'_>);

    /// Handle an input event. Return true when consumed.
    fn handle_event(&mut self, _event: &Event, _ctx: &mut EventContext<'_>) -> bool {
        false
    }

    /// Whether the widget accepts focus. Visibility is checked separately.
    fn focusable(&self) -> bool {
        false
    }

    fn role(&self) -> Role {
        Role::Leaf
    }

    /// Containers: split `area` among children described by `slots`.
    ///
    /// Must return one rect per slot.
    fn arrange(&mut self, area: Rect, slots: &[SlotSpec]) -> Vec<Rect> {
        vec![area; slots.len()]
    }

    /// Preferred (width, height), if the widget has one.
    fn measure(&self) -> Option<(u16, u16)> {
        None
    }

    /// Cursor position while focused, in absolute cells.
    fn cursor(&self, _area: Rect) -> Option<(u16, u16)> {
        None
    }

    /// Whether the cursor should blink.
    fn cursor_blink(&self) -> bool {
        true
    }

    /// Claim a key before global navigation sees it.
    fn captures_key(&self, _key: &KeyEvent) -> bool {
        false
    }

    fn on_focus(&mut self) {}

    fn on_blur(&mut self) {}

    /// Called when the widget becomes reachable from an application.
    fn on_attach(&mut self, _app: &AppHandle) {}

    /// Cells between the widget's edge and its content on every side.
    fn content_inset(&self) -> u16 {
        0
    }

    /// Panes: navigation index shown before the title (0 = none).
    fn set_nav_index(&mut self, _index: u8) {}

    fn nav_index(&self) -> u8 {
        0
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}
