//! Loop-side view of the application state.
//!
//! A [`Context`] exists only while the event loop is executing a command, so
//! holding one proves the caller is on the owning thread. It is the single
//! place where tree, focus, and modal state are mutated together.

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::focus::FocusManager;
use crate::theme::Theme;
use crate::widget::{Element, WidgetId, WidgetTree};

use super::{AppHandle, Command};

pub struct Context<'a> {
    pub(crate) tree: &'a mut WidgetTree,
    pub(crate) focus: &'a mut FocusManager,
    pub(crate) handle: &'a AppHandle,
    pub(crate) theme: &'a Theme,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        tree: &'a mut WidgetTree,
        focus: &'a mut FocusManager,
        handle: &'a AppHandle,
        theme: &'a Theme,
    ) -> Self {
        Self { tree, focus, handle, theme }
    }

    pub fn tree(&self) -> &WidgetTree {
        &*self.tree
    }

    /// Direct tree access. Focus is repaired after the command returns, but
    /// hiding widgets should go through [`set_visible`](Self::set_visible).
    pub fn tree_mut(&mut self) -> &mut WidgetTree {
        &mut *self.tree
    }

    pub fn handle(&self) -> &AppHandle {
        self.handle
    }

    pub fn theme(&self) -> &Theme {
        self.theme
    }

    pub fn stop(&self) {
        self.handle.stop();
    }

    // =========================================================================
    // Focus
    // =========================================================================

    pub fn focused(&self) -> Option<WidgetId> {
        self.focus.focused()
    }

    pub fn modal_root(&self) -> Option<WidgetId> {
        self.focus.modal_root()
    }

    pub fn set_focus(&mut self, target: Option<WidgetId>) -> bool {
        self.focus.set_focus(self.tree, target)
    }

    pub fn focus_next(&mut self) -> bool {
        self.focus.cycle(self.tree, true)
    }

    pub fn focus_prev(&mut self) -> bool {
        self.focus.cycle(self.tree, false)
    }

    pub fn set_modal_root(&mut self, root: WidgetId) -> bool {
        self.focus.set_modal_root(self.tree, root)
    }

    pub fn clear_modal_root(&mut self) -> bool {
        self.focus.clear_modal_root(self.tree)
    }

    /// Focus the first focusable widget inside the pane numbered `index`.
    pub fn focus_nav_index(&mut self, index: u8) -> bool {
        let Some(pane) = self.tree.pane_by_nav_index(index) else { return false };
        if let Some(scope) = self.focus.scope(self.tree) {
            if !self.tree.is_within(pane, scope) {
                return false;
            }
        }
        self.focus.focus_within(self.tree, pane)
    }

    // =========================================================================
    // Tree
    // =========================================================================

    /// Replace the root. Focus and modal state start over.
    pub fn set_root(&mut self, element: Element) -> Result<WidgetId> {
        let root = self.tree.set_root(element)?;
        self.focus.reset();
        self.focus.focus_first(self.tree);
        self.tree.assign_nav_indices();
        Ok(root)
    }

    pub fn add_pane(&mut self, layout: WidgetId, pane: Element) -> Result<WidgetId> {
        self.tree.add_pane(layout, pane)
    }

    pub fn remove(&mut self, id: WidgetId) -> Result<()> {
        self.tree.remove(id)?;
        self.focus.ensure_focus(self.tree);
        Ok(())
    }

    /// Change visibility. Hiding schedules a focus repair that runs after
    /// the current command, or right away when the queue cannot take it.
    pub fn set_visible(&mut self, id: WidgetId, visible: bool) -> Result<()> {
        if !self.tree.contains(id) {
            return Err(Error::UnknownWidget(id));
        }
        if self.tree.set_visible(id, visible)
            && !visible
            && !self.handle.dispatch(Command::RefocusAfterHide(id))
        {
            self.focus.refocus_after_hide(self.tree, id);
        }
        Ok(())
    }

    // =========================================================================
    // Command execution
    // =========================================================================

    /// Apply one command. Failures are logged, never propagated: a bad
    /// command must not bring the loop down.
    pub(crate) fn execute(&mut self, command: Command) {
        debug!(command = command.name(), "executing command");
        if let Err(err) = self.apply(command) {
            warn!(%err, "command failed");
        }
    }

    fn apply(&mut self, command: Command) -> Result<()> {
        match command {
            Command::SetFocus(target) => {
                if !self.set_focus(target) {
                    debug!(?target, "focus request ignored");
                }
            }
            Command::Update { target, apply } => {
                let widget = self.tree.widget_mut(target).ok_or(Error::UnknownWidget(target))?;
                apply(widget);
                // The update may change focusability or measured size
                self.tree.touch();
                self.tree.mark_dirty(target);
                self.focus.ensure_focus(self.tree);
            }
            Command::AddPane { layout, pane } => {
                self.add_pane(layout, pane)?;
            }
            Command::RemovePane(id) => self.remove(id)?,
            Command::RecomputeNavIndices => self.tree.assign_nav_indices(),
            Command::SetVisible(id, visible) => self.set_visible(id, visible)?,
            Command::SetModalRoot(root) => {
                if !self.tree.contains(root) {
                    return Err(Error::UnknownWidget(root));
                }
                self.set_modal_root(root);
            }
            Command::ClearModalRoot => {
                self.clear_modal_root();
            }
            Command::RefocusAfterHide(id) => {
                self.focus.refocus_after_hide(self.tree, id);
            }
            Command::Run(f) => {
                f(self);
                self.focus.ensure_focus(self.tree);
            }
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Orientation;
    use crate::widget::{Button, Layout, Pane, Text};

    struct Fixture {
        tree: WidgetTree,
        focus: FocusManager,
        handle: AppHandle,
        channels: crate::app::handle::Channels,
        theme: Theme,
        a: WidgetId,
        b: WidgetId,
    }

    impl Fixture {
        fn ctx(&mut self) -> Context<'_> {
            Context::new(&mut self.tree, &mut self.focus, &self.handle, &self.theme)
        }

        fn run(&mut self, command: Command) {
            self.ctx().execute(command);
        }

        /// Execute everything the previous commands queued.
        fn drain(&mut self) {
            while let Ok(command) = self.channels.commands.try_recv() {
                self.run(command);
            }
        }
    }

    fn setup() -> Fixture {
        let (handle, channels) = AppHandle::new(16);
        let mut tree = WidgetTree::new();
        let root = tree
            .set_root(
                Element::new(Layout::new(Orientation::Horizontal))
                    .child(Element::new(Pane::new("a")).child(Element::new(Button::new("a"))))
                    .child(Element::new(Pane::new("b")).child(Element::new(Button::new("b")))),
            )
            .unwrap();
        tree.set_application(handle.clone());
        let order = tree.preorder(root);
        let mut focus = FocusManager::new();
        focus.focus_first(&mut tree);
        Fixture {
            tree,
            focus,
            handle,
            channels,
            theme: Theme::default(),
            a: order[2],
            b: order[4],
        }
    }

    #[test]
    fn test_set_focus_command() {
        let mut f = setup();
        assert_eq!(f.focus.focused(), Some(f.a));
        f.run(Command::SetFocus(Some(f.b)));
        assert_eq!(f.focus.focused(), Some(f.b));
        f.run(Command::SetFocus(None));
        assert_eq!(f.focus.focused(), None);
    }

    #[test]
    fn test_update_marks_dirty() {
        let mut f = setup();
        let root = f.tree.root().unwrap();
        f.tree.clear_dirty(root);
        f.run(Command::update::<Button>(f.b, |b| b.set_label("renamed")));
        assert_eq!(f.tree.downcast_ref::<Button>(f.b).unwrap().label(), "renamed");
        assert!(f.tree.is_dirty(root));
    }

    #[test]
    fn test_update_wrong_type_is_ignored() {
        let mut f = setup();
        f.run(Command::update::<Text>(f.b, |t| t.set_content("x")));
        assert_eq!(f.tree.downcast_ref::<Button>(f.b).unwrap().label(), "b");
    }

    #[test]
    fn test_disabling_focused_button_moves_focus() {
        let mut f = setup();
        f.run(Command::update::<Button>(f.a, |b| b.set_enabled(false)));
        assert_eq!(f.focus.focused(), Some(f.b));
    }

    #[test]
    fn test_hide_queues_refocus() {
        let mut f = setup();
        let pane_a = f.tree.parent(f.a).unwrap();
        f.run(Command::SetVisible(pane_a, false));
        // Deferred: focus is repaired by the queued command
        assert_eq!(f.focus.focused(), Some(f.a));
        f.drain();
        assert_eq!(f.focus.focused(), Some(f.b));
    }

    #[test]
    fn test_hide_refocuses_now_when_queue_full() {
        let mut f = setup();
        while f.handle.dispatch(Command::ClearModalRoot) {}
        let pane_a = f.tree.parent(f.a).unwrap();
        f.run(Command::SetVisible(pane_a, false));
        assert_eq!(f.focus.focused(), Some(f.b));
    }

    #[test]
    fn test_add_and_remove_pane() {
        let mut f = setup();
        let root = f.tree.root().unwrap();
        let pane = Element::new(Pane::new("c")).child(Element::new(Button::new("c")));
        f.run(Command::AddPane { layout: root, pane });
        assert_eq!(f.tree.children(root).len(), 3);

        let pane_a = f.tree.parent(f.a).unwrap();
        f.run(Command::RemovePane(pane_a));
        assert!(!f.tree.contains(f.a));
        assert_eq!(f.focus.focused(), Some(f.b));
    }

    #[test]
    fn test_failed_command_leaves_state() {
        let mut f = setup();
        let before = f.tree.len();
        f.run(Command::AddPane { layout: f.a, pane: Element::new(Pane::new("x")) });
        assert_eq!(f.tree.len(), before);
    }

    #[test]
    fn test_modal_commands() {
        let mut f = setup();
        let pane_b = f.tree.parent(f.b).unwrap();
        f.run(Command::SetModalRoot(pane_b));
        assert_eq!(f.focus.focused(), Some(f.b));
        f.run(Command::SetFocus(Some(f.a)));
        assert_eq!(f.focus.focused(), Some(f.b));
        f.run(Command::ClearModalRoot);
        assert_eq!(f.focus.focused(), Some(f.a));
    }

    #[test]
    fn test_run_closure_and_nav_indices() {
        let mut f = setup();
        f.run(Command::RecomputeNavIndices);
        f.run(Command::run(|ctx| {
            assert!(ctx.focus_nav_index(2));
        }));
        assert_eq!(f.focus.focused(), Some(f.b));
    }
}
