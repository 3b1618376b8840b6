//! Input routing.
//!
//! Each event goes through the consumers below in order; the first one that
//! handles it stops the walk.
//!
//! 1. Interrupt chord: stops the application, always.
//! 2. Global navigation (focus next/prev, modifier+digit), unless the focused
//!    widget claims the key through [`Widget::captures_key`](crate::widget::Widget::captures_key).
//! 3. The focused widget.
//! 4. Its ancestors, nearest first, up to and including the active modal
//!    root. Nothing outside the modal ever sees the event.
//! 5. Escape: closes the active modal, or stops when there is none.

use tracing::{debug, trace};

use crate::config::KeyMap;
use crate::event::{Event, KeyEvent};

use super::Context;

/// Route one input event. Returns true when something consumed it.
pub(crate) fn route_event(ctx: &mut Context<'_>, keymap: &KeyMap, event: &Event) -> bool {
    if let Event::Key(key) = event {
        if key.matches(&keymap.interrupt) {
            debug!("interrupt key");
            ctx.stop();
            return true;
        }
        if !focused_captures(ctx, key) && navigate(ctx, keymap, key) {
            return true;
        }
    }

    if dispatch_to_focus_chain(ctx, event) {
        return true;
    }

    if let Event::Key(key) = event {
        if key.matches(&keymap.escape) {
            if ctx.clear_modal_root() {
                debug!("escape closed modal");
            } else {
                debug!("escape with no modal, stopping");
                ctx.stop();
            }
            return true;
        }
    }
    false
}

fn focused_captures(ctx: &Context<'_>, key: &KeyEvent) -> bool {
    ctx.focused()
        .and_then(|id| ctx.tree.widget(id))
        .is_some_and(|widget| widget.captures_key(key))
}

fn navigate(ctx: &mut Context<'_>, keymap: &KeyMap, key: &KeyEvent) -> bool {
    if key.matches(&keymap.focus_next) {
        ctx.focus_next();
        return true;
    }
    if key.matches(&keymap.focus_prev) {
        ctx.focus_prev();
        return true;
    }
    match key.nav_digit(keymap.nav_modifier) {
        Some(index) => ctx.focus_nav_index(index),
        None => false,
    }
}

/// Offer the event to the focused widget, then bubble it up the parent
/// chain without leaving the active modal.
fn dispatch_to_focus_chain(ctx: &mut Context<'_>, event: &Event) -> bool {
    let Some(focused) = ctx.focused() else { return false };
    let boundary = ctx.modal_root();

    let mut current = Some(focused);
    while let Some(id) = current {
        if ctx.tree.handle_event(id, event) {
            trace!(?id, bubbled = id != focused, "event handled");
            return true;
        }
        if Some(id) == boundary {
            break;
        }
        current = ctx.tree.parent(id);
    }
    false
}

// =============================================================================
// TESTS
// =============================================================================
