//! Deferred mutations executed by the event loop.

use std::fmt;

use tracing::warn;

use crate::widget::{Element, Widget, WidgetId};

use super::Context;

type UpdateFn = Box<dyn FnOnce(&mut dyn Widget) + Send>;
type RunFn = Box<dyn FnOnce(&mut Context<'_>) + Send>;

/// A state change requested from outside the loop (or from inside a widget
/// handler) and applied later, in FIFO order, by the loop itself.
pub enum Command {
    /// Move focus. `None` clears it. Refused silently for targets that cannot
    /// take focus.
    SetFocus(Option<WidgetId>),
    /// Mutate one widget in place. The widget is marked dirty afterwards.
    Update { target: WidgetId, apply: UpdateFn },
    /// Mount a pane at the end of a layout.
    AddPane { layout: WidgetId, pane: Element },
    /// Remove a pane (or any widget) with its subtree.
    RemovePane(WidgetId),
    /// Renumber panes for digit navigation.
    RecomputeNavIndices,
    SetVisible(WidgetId, bool),
    /// Trap focus inside a subtree.
    SetModalRoot(WidgetId),
    /// Close the innermost modal and restore the focus it saved.
    ClearModalRoot,
    /// Move focus off a widget that was just hidden.
    RefocusAfterHide(WidgetId),
    /// Arbitrary closure with full access to the loop state.
    Run(RunFn),
}

impl Command {
    /// Update of a widget of concrete type `W`. A type mismatch is logged
    /// and the closure is not run.
    pub fn update<W: Widget>(target: WidgetId, apply: impl FnOnce(&mut W) + Send + 'static) -> Self {
        Command::Update {
            target,
            apply: Box::new(move |widget: &mut dyn Widget| {
                match widget.as_any_mut().downcast_mut::<W>() {
                    Some(widget) => apply(widget),
                    None => warn!(
                        ?target,
                        expected = std::any::type_name::<W>(),
                        "update target has a different widget type"
                    ),
                }
            }),
        }
    }

    pub fn run(f: impl FnOnce(&mut Context<'_>) + Send + 'static) -> Self {
        Command::Run(Box::new(f))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::SetFocus(_) => "SetFocus",
            Command::Update { .. } => "Update",
            Command::AddPane { .. } => "AddPane",
            Command::RemovePane(_) => "RemovePane",
            Command::RecomputeNavIndices => "RecomputeNavIndices",
            Command::SetVisible(..) => "SetVisible",
            Command::SetModalRoot(_) => "SetModalRoot",
            Command::ClearModalRoot => "ClearModalRoot",
            Command::RefocusAfterHide(_) => "RefocusAfterHide",
            Command::Run(_) => "Run",
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::SetFocus(target) => f.debug_tuple("SetFocus").field(target).finish(),
            Command::Update { target, .. } => f.debug_struct("Update").field("target", target).finish_non_exhaustive(),
            Command::AddPane { layout, pane } => f
                .debug_struct("AddPane")
                .field("layout", layout)
                .field("widgets", &pane.count())
                .finish(),
            Command::RemovePane(id) => f.debug_tuple("RemovePane").field(id).finish(),
            Command::SetVisible(id, visible) => f.debug_tuple("SetVisible").field(id).field(visible).finish(),
            Command::SetModalRoot(id) => f.debug_tuple("SetModalRoot").field(id).finish(),
            Command::RefocusAfterHide(id) => f.debug_tuple("RefocusAfterHide").field(id).finish(),
            other => f.write_str(other.name()),
        }
    }
}
