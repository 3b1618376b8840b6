//! Focus System - keyboard navigation and modal scoping
//!
//! Manages focus state and navigation:
//! - the focused widget (at most one)
//! - focus cycling over the focusable widgets of the active scope
//! - modal scopes that trap cycling and bubbling inside a subtree
//! - focus restoration when a modal closes or the focused widget is hidden
//!
//! Traversal is a preorder DFS that skips hidden subtrees. The list of
//! focusable widgets is memoized per scope root and dropped wholesale whenever
//! the tree's generation moves (structure or visibility changed) or a modal
//! opens or closes.
//!
//! All methods take the [`WidgetTree`] explicitly; the manager only stores
//! ids, and ids of removed widgets simply stop resolving.

use std::collections::HashMap;

use tracing::debug;

use crate::widget::{WidgetId, WidgetTree};

/// One open modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ModalScope {
    root: WidgetId,
    /// Focus at the moment the modal opened.
    previous: Option<WidgetId>,
}

#[derive(Debug, Default)]
pub struct FocusManager {
    focused: Option<WidgetId>,
    /// Innermost modal last.
    modals: Vec<ModalScope>,
    cache: HashMap<WidgetId, Vec<WidgetId>>,
    cache_generation: u64,
}

impl FocusManager {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // State
    // =========================================================================

    pub fn focused(&self) -> Option<WidgetId> {
        self.focused
    }

    /// Innermost active modal root.
    pub fn modal_root(&self) -> Option<WidgetId> {
        self.modals.last().map(|m| m.root)
    }

    /// Focus saved by the innermost modal.
    pub fn previous(&self) -> Option<WidgetId> {
        self.modals.last().and_then(|m| m.previous)
    }

    pub fn modal_depth(&self) -> usize {
        self.modals.len()
    }

    /// Root of the active scope: the innermost modal, else the tree root.
    pub fn scope(&self, tree: &WidgetTree) -> Option<WidgetId> {
        self.modals
            .iter()
            .rev()
            .map(|m| m.root)
            .find(|root| tree.contains(*root))
            .or_else(|| tree.root())
    }

    /// Drop every cached focus list.
    pub fn invalidate(&mut self) {
        self.cache.clear();
    }

    /// Forget focus and modal state. Used when the root is replaced.
    pub fn reset(&mut self) {
        self.focused = None;
        self.modals.clear();
        self.invalidate();
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// First focusable widget under `start` in preorder, skipping hidden
    /// subtrees.
    pub fn find_first_focusable(&self, tree: &WidgetTree, start: WidgetId) -> Option<WidgetId> {
        if !tree.is_effectively_visible(start) {
            return None;
        }
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            if !tree.is_visible(id) {
                continue;
            }
            if tree.widget(id).is_some_and(|w| w.focusable()) {
                return Some(id);
            }
            stack.extend(tree.children(id).iter().rev());
        }
        None
    }

    /// Every focusable widget under `scope` in preorder.
    pub fn focusable_widgets(&mut self, tree: &WidgetTree, scope: WidgetId) -> &[WidgetId] {
        if self.cache_generation != tree.generation() {
            self.cache.clear();
            self.cache_generation = tree.generation();
        }
        self.cache
            .entry(scope)
            .or_insert_with(|| collect_focusable(tree, scope))
    }

    /// Neighbor of `current` in the focus cycle of `scope`.
    ///
    /// Wraps at both ends. When `current` is not in the list, forward lands
    /// on the first widget and backward on the last.
    pub fn find_next_focus(
        &mut self,
        tree: &WidgetTree,
        current: Option<WidgetId>,
        scope: WidgetId,
        forward: bool,
    ) -> Option<WidgetId> {
        let list = self.focusable_widgets(tree, scope);
        if list.is_empty() {
            return None;
        }
        let len = list.len();
        // Not in the list counts as position -1
        let next = match (current.and_then(|c| list.iter().position(|id| *id == c)), forward) {
            (None, true) => 0,
            (None, false) => (2 * len - 2) % len,
            (Some(pos), true) => (pos + 1) % len,
            (Some(pos), false) => (pos + len - 1) % len,
        };
        Some(list[next])
    }

    // =========================================================================
    // Focus changes
    // =========================================================================

    /// Move focus to `target`.
    ///
    /// Returns true if focus changed. Already focused, hidden, non-focusable,
    /// and out-of-scope targets are ignored. `None` clears focus.
    pub fn set_focus(&mut self, tree: &mut WidgetTree, target: Option<WidgetId>) -> bool {
        if target == self.focused {
            return false;
        }
        if let Some(id) = target {
            if !tree.is_focusable(id) {
                return false;
            }
            if let Some(modal) = self.modal_root() {
                if tree.contains(modal) && !tree.is_within(id, modal) {
                    return false;
                }
            }
        }

        if let Some(old) = self.focused.take() {
            tree.blur(old);
        }
        if let Some(new) = target {
            tree.focus(new);
        }
        self.focused = target;
        debug!(focused = ?target, "focus changed");
        true
    }

    /// Step focus forward or backward inside the active scope.
    pub fn cycle(&mut self, tree: &mut WidgetTree, forward: bool) -> bool {
        let Some(scope) = self.scope(tree) else { return false };
        let next = self.find_next_focus(tree, self.focused, scope, forward);
        match next {
            Some(id) => self.set_focus(tree, Some(id)),
            None => false,
        }
    }

    /// Focus the first focusable widget inside `container`.
    pub fn focus_within(&mut self, tree: &mut WidgetTree, container: WidgetId) -> bool {
        match self.find_first_focusable(tree, container) {
            Some(id) => self.set_focus(tree, Some(id)),
            None => false,
        }
    }

    /// Focus the first focusable widget of the active scope.
    pub fn focus_first(&mut self, tree: &mut WidgetTree) -> bool {
        let Some(scope) = self.scope(tree) else { return false };
        let first = self.find_first_focusable(tree, scope);
        self.set_focus(tree, first)
    }

    // =========================================================================
    // Modal scope
    // =========================================================================

    /// Trap focus inside `root`.
    ///
    /// The current focus is saved for [`clear_modal_root`](Self::clear_modal_root).
    /// If focus is outside the modal it moves to the modal's first focusable
    /// widget (or nowhere, if it has none). Opening a modal while another is
    /// active nests it.
    pub fn set_modal_root(&mut self, tree: &mut WidgetTree, root: WidgetId) -> bool {
        if !tree.contains(root) || self.modal_root() == Some(root) {
            return false;
        }
        self.modals.push(ModalScope { root, previous: self.focused });
        self.invalidate();

        let inside = self.focused.is_some_and(|f| tree.is_within(f, root));
        if !inside {
            let first = self.find_first_focusable(tree, root);
            if first.is_none() {
                if let Some(old) = self.focused.take() {
                    tree.blur(old);
                }
            } else {
                self.set_focus(tree, first);
            }
        }
        debug!(?root, depth = self.modals.len(), "modal opened");
        true
    }

    /// Close the innermost modal and restore the focus saved when it opened,
    /// if that widget is still focusable. Otherwise focus the first focusable
    /// widget of the scope that is active again.
    pub fn clear_modal_root(&mut self, tree: &mut WidgetTree) -> bool {
        let Some(scope) = self.modals.pop() else { return false };
        self.invalidate();

        let restored = scope
            .previous
            .filter(|id| tree.is_focusable(*id))
            .is_some_and(|id| {
                self.focused == Some(id) || self.set_focus(tree, Some(id))
            });
        if !restored {
            let fallback = self
                .scope(tree)
                .and_then(|outer| self.find_first_focusable(tree, outer));
            if fallback.is_none() {
                if let Some(old) = self.focused.take() {
                    tree.blur(old);
                }
            } else {
                self.set_focus(tree, fallback);
            }
        }
        debug!(modal = ?scope.root, focused = ?self.focused, "modal closed");
        true
    }

    // =========================================================================
    // Recovery
    // =========================================================================

    /// Reassign focus after `hidden` was made invisible, if focus is unset or
    /// was on (or inside) the hidden widget.
    pub fn refocus_after_hide(&mut self, tree: &mut WidgetTree, hidden: WidgetId) -> bool {
        let stale = match self.focused {
            None => true,
            Some(f) => f == hidden || tree.is_within(f, hidden) || !tree.is_focusable(f),
        };
        if !stale {
            return false;
        }
        self.reassign(tree)
    }

    /// Repair state after arbitrary mutation: forget removed modal roots and
    /// move focus off widgets that were removed or can no longer take it.
    pub fn ensure_focus(&mut self, tree: &mut WidgetTree) {
        let before = self.modals.len();
        self.modals.retain(|m| tree.contains(m.root));
        if self.modals.len() != before {
            self.invalidate();
        }
        match self.focused {
            Some(f) if !tree.contains(f) => {
                self.focused = None;
                self.reassign(tree);
            }
            Some(f) if !tree.is_focusable(f) => {
                self.reassign(tree);
            }
            _ => {}
        }
    }

    fn reassign(&mut self, tree: &mut WidgetTree) -> bool {
        let target = self
            .scope(tree)
            .and_then(|scope| self.find_first_focusable(tree, scope));
        match target {
            Some(id) => self.set_focus(tree, Some(id)),
            None => {
                if let Some(old) = self.focused.take() {
                    tree.blur(old);
                    return true;
                }
                false
            }
        }
    }
}

fn collect_focusable(tree: &WidgetTree, scope: WidgetId) -> Vec<WidgetId> {
    let mut out = Vec::new();
    if !tree.is_effectively_visible(scope) {
        return out;
    }
    let mut stack = vec![scope];
    while let Some(id) = stack.pop() {
        if !tree.is_visible(id) {
            continue;
        }
        if tree.widget(id).is_some_and(|w| w.focusable()) {
            out.push(id);
        }
        stack.extend(tree.children(id).iter().rev());
    }
    out
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Orientation;
    use crate::widget::{Button, Element, Layout, Pane, Text};
    use proptest::prelude::*;

    fn pane_with(child: Element) -> Element {
        Element::new(Pane::new("p")).child(child)
    }

    /// layout[ pane[a], pane[b], pane[layout[ pane[c], pane[text] ]] ]
    struct Fixture {
        tree: WidgetTree,
        focus: FocusManager,
        a: WidgetId,
        b: WidgetId,
        c: WidgetId,
        modal: WidgetId,
        text: WidgetId,
    }

    fn setup() -> Fixture {
        let mut tree = WidgetTree::new();
        let root = tree
            .set_root(
                Element::new(Layout::new(Orientation::Horizontal))
                    .child(pane_with(Element::new(Button::new("a"))))
                    .child(pane_with(Element::new(Button::new("b"))))
                    .child(pane_with(
                        Element::new(Layout::new(Orientation::Vertical))
                            .child(pane_with(Element::new(Button::new("c"))))
                            .child(pane_with(Element::new(Text::new("t")))),
                    )),
            )
            .unwrap();
        let order = tree.preorder(root);
        let label = |tree: &WidgetTree, l: &str| {
            *order
                .iter()
                .find(|id| tree.downcast_ref::<Button>(**id).is_some_and(|b| b.label() == l))
                .unwrap()
        };
        let a = label(&tree, "a");
        let b = label(&tree, "b");
        let c = label(&tree, "c");
        let modal = tree.parent(tree.parent(c).unwrap()).unwrap();
        let text = *order.iter().find(|id| tree.downcast_ref::<Text>(**id).is_some()).unwrap();
        Fixture { tree, focus: FocusManager::new(), a, b, c, modal, text }
    }

    #[test]
    fn test_initial_state() {
        let f = setup();
        assert_eq!(f.focus.focused(), None);
        assert_eq!(f.focus.modal_root(), None);
        assert_eq!(f.focus.scope(&f.tree), f.tree.root());
    }

    #[test]
    fn test_find_first_focusable() {
        let f = setup();
        let root = f.tree.root().unwrap();
        assert_eq!(f.focus.find_first_focusable(&f.tree, root), Some(f.a));
        assert_eq!(f.focus.find_first_focusable(&f.tree, f.modal), Some(f.c));
        assert_eq!(f.focus.find_first_focusable(&f.tree, f.text), None);
    }

    #[test]
    fn test_cycle_wraps() {
        let mut f = setup();
        assert!(f.focus.cycle(&mut f.tree, true));
        assert_eq!(f.focus.focused(), Some(f.a));
        f.focus.cycle(&mut f.tree, true);
        f.focus.cycle(&mut f.tree, true);
        assert_eq!(f.focus.focused(), Some(f.c));
        f.focus.cycle(&mut f.tree, true);
        assert_eq!(f.focus.focused(), Some(f.a));
        f.focus.cycle(&mut f.tree, false);
        assert_eq!(f.focus.focused(), Some(f.c));
    }

    #[test]
    fn test_backward_from_nothing_steps_from_before_first() {
        let mut f = setup();
        f.focus.cycle(&mut f.tree, false);
        assert_eq!(f.focus.focused(), Some(f.b));

        // Single focusable: -2 mod 1 lands on it
        let mut tree = WidgetTree::new();
        let root = tree.set_root(pane_with(Element::new(Button::new("only")))).unwrap();
        let only = tree.children(root)[0];
        let mut focus = FocusManager::new();
        assert_eq!(focus.find_next_focus(&tree, None, root, false), Some(only));
    }

    #[test]
    fn test_backward_from_nothing_with_four() {
        let mut tree = WidgetTree::new();
        let root = tree
            .set_root(
                Element::new(Layout::new(Orientation::Horizontal))
                    .children(["w", "x", "y", "z"].map(|l| pane_with(Element::new(Button::new(l))))),
            )
            .unwrap();
        let mut focus = FocusManager::new();
        let list = focus.focusable_widgets(&tree, root).to_vec();
        assert_eq!(list.len(), 4);
        assert_eq!(focus.find_next_focus(&tree, None, root, false), Some(list[2]));
        assert_eq!(focus.find_next_focus(&tree, None, root, true), Some(list[0]));
    }

    #[test]
    fn test_set_focus_guards() {
        let mut f = setup();
        assert!(f.focus.set_focus(&mut f.tree, Some(f.a)));
        assert!(!f.focus.set_focus(&mut f.tree, Some(f.a)));

        // Not focusable
        assert!(!f.focus.set_focus(&mut f.tree, Some(f.text)));
        assert_eq!(f.focus.focused(), Some(f.a));

        // Invisible
        f.tree.set_visible(f.b, false);
        assert!(!f.focus.set_focus(&mut f.tree, Some(f.b)));
        assert_eq!(f.focus.focused(), Some(f.a));
        assert!(f.tree.is_focused(f.a));
        assert!(!f.tree.is_focused(f.b));

        // None is allowed
        assert!(f.focus.set_focus(&mut f.tree, None));
        assert!(!f.tree.is_focused(f.a));
    }

    #[test]
    fn test_hidden_widgets_leave_the_cycle() {
        let mut f = setup();
        let root = f.tree.root().unwrap();
        assert_eq!(f.focus.focusable_widgets(&f.tree, root).len(), 3);
        f.tree.set_visible(f.modal, false);
        assert_eq!(f.focus.focusable_widgets(&f.tree, root), &[f.a, f.b]);
    }

    #[test]
    fn test_cache_reused_until_generation_moves() {
        let mut f = setup();
        let root = f.tree.root().unwrap();
        f.focus.focusable_widgets(&f.tree, root);
        assert_eq!(f.focus.cache.len(), 1);
        f.focus.focusable_widgets(&f.tree, f.modal);
        assert_eq!(f.focus.cache.len(), 2);

        f.tree.set_visible(f.b, false);
        assert_eq!(f.focus.focusable_widgets(&f.tree, root).len(), 2);
        assert_eq!(f.focus.cache.len(), 1);
    }

    #[test]
    fn test_hide_reassigns_focus() {
        let mut f = setup();
        f.focus.set_focus(&mut f.tree, Some(f.b));
        f.tree.set_visible(f.b, false);
        assert!(f.focus.refocus_after_hide(&mut f.tree, f.b));
        assert_eq!(f.focus.focused(), Some(f.a));
        assert!(!f.tree.is_focused(f.b));
    }

    #[test]
    fn test_hide_container_reassigns_focus() {
        let mut f = setup();
        f.focus.set_focus(&mut f.tree, Some(f.c));
        f.tree.set_visible(f.modal, false);
        assert!(f.focus.refocus_after_hide(&mut f.tree, f.modal));
        assert_eq!(f.focus.focused(), Some(f.a));
    }

    #[test]
    fn test_hide_elsewhere_keeps_focus() {
        let mut f = setup();
        f.focus.set_focus(&mut f.tree, Some(f.a));
        f.tree.set_visible(f.b, false);
        assert!(!f.focus.refocus_after_hide(&mut f.tree, f.b));
        assert_eq!(f.focus.focused(), Some(f.a));
    }

    #[test]
    fn test_hide_last_focusable_clears_focus() {
        let mut f = setup();
        f.focus.set_focus(&mut f.tree, Some(f.a));
        let root = f.tree.root().unwrap();
        f.tree.set_visible(root, false);
        f.focus.refocus_after_hide(&mut f.tree, root);
        assert_eq!(f.focus.focused(), None);
    }

    #[test]
    fn test_modal_scopes_cycle() {
        let mut f = setup();
        f.focus.set_focus(&mut f.tree, Some(f.a));
        assert!(f.focus.set_modal_root(&mut f.tree, f.modal));
        // Focus moved inside the modal
        assert_eq!(f.focus.focused(), Some(f.c));
        assert_eq!(f.focus.previous(), Some(f.a));

        for _ in 0..5 {
            f.focus.cycle(&mut f.tree, true);
            assert!(f.tree.is_within(f.focus.focused().unwrap(), f.modal));
        }
        // Outside targets are refused while trapped
        assert!(!f.focus.set_focus(&mut f.tree, Some(f.b)));
        assert_eq!(f.focus.focused(), Some(f.c));
    }

    #[test]
    fn test_clear_modal_restores_previous() {
        let mut f = setup();
        f.focus.set_focus(&mut f.tree, Some(f.b));
        f.focus.set_modal_root(&mut f.tree, f.modal);
        assert!(f.focus.clear_modal_root(&mut f.tree));
        assert_eq!(f.focus.focused(), Some(f.b));
        assert_eq!(f.focus.modal_root(), None);
        assert!(!f.focus.clear_modal_root(&mut f.tree));
    }

    #[test]
    fn test_clear_modal_falls_back_when_previous_gone() {
        let mut f = setup();
        f.focus.set_focus(&mut f.tree, Some(f.b));
        f.focus.set_modal_root(&mut f.tree, f.modal);
        f.tree.set_visible(f.b, false);
        f.focus.clear_modal_root(&mut f.tree);
        assert_eq!(f.focus.focused(), Some(f.a));
    }

    #[test]
    fn test_nested_modals() {
        let mut f = setup();
        f.focus.set_focus(&mut f.tree, Some(f.a));
        let c_pane = f.tree.parent(f.c).unwrap();
        f.focus.set_modal_root(&mut f.tree, f.modal);
        f.focus.set_modal_root(&mut f.tree, c_pane);
        assert_eq!(f.focus.modal_depth(), 2);
        assert_eq!(f.focus.scope(&f.tree), Some(c_pane));

        f.focus.clear_modal_root(&mut f.tree);
        assert_eq!(f.focus.scope(&f.tree), Some(f.modal));
        assert_eq!(f.focus.focused(), Some(f.c));

        f.focus.clear_modal_root(&mut f.tree);
        assert_eq!(f.focus.focused(), Some(f.a));
    }

    #[test]
    fn test_ensure_focus_after_removal() {
        let mut f = setup();
        f.focus.set_focus(&mut f.tree, Some(f.c));
        f.focus.set_modal_root(&mut f.tree, f.modal);
        let modal_pane = f.tree.parent(f.modal).unwrap();
        f.tree.remove(modal_pane).unwrap();
        f.focus.ensure_focus(&mut f.tree);
        assert_eq!(f.focus.modal_root(), None);
        assert_eq!(f.focus.focused(), Some(f.a));
    }

    // =========================================================================
    // Properties
    // =========================================================================

    fn build(visible: &[bool]) -> (WidgetTree, FocusManager) {
        let mut tree = WidgetTree::new();
        let panes = visible.iter().enumerate().map(|(i, shown)| {
            let pane = pane_with(Element::new(Button::new(i.to_string())));
            if *shown { pane } else { pane.hidden() }
        });
        tree.set_root(Element::new(Layout::new(Orientation::Vertical)).children(panes))
            .unwrap();
        (tree, FocusManager::new())
    }

    proptest! {
        #[test]
        fn prop_forward_cycle_returns_to_start(
            visible in prop::collection::vec(any::<bool>(), 1..10),
            start in 0usize..10,
        ) {
            let (mut tree, mut focus) = build(&visible);
            let root = tree.root().unwrap();
            let list = focus.focusable_widgets(&tree, root).to_vec();
            prop_assume!(!list.is_empty());
            let first = list[start % list.len()];
            focus.set_focus(&mut tree, Some(first));

            let mut seen = Vec::new();
            for _ in 0..list.len() {
                focus.cycle(&mut tree, true);
                seen.push(focus.focused().unwrap());
            }
            prop_assert_eq!(focus.focused(), Some(first));
            seen.sort();
            let mut expected = list.clone();
            expected.sort();
            prop_assert_eq!(seen, expected);
        }

        #[test]
        fn prop_forward_then_backward_is_identity(
            visible in prop::collection::vec(any::<bool>(), 1..10),
            start in 0usize..10,
        ) {
            let (mut tree, mut focus) = build(&visible);
            let root = tree.root().unwrap();
            let list = focus.focusable_widgets(&tree, root).to_vec();
            prop_assume!(!list.is_empty());
            let first = list[start % list.len()];
            focus.set_focus(&mut tree, Some(first));

            focus.cycle(&mut tree, true);
            focus.cycle(&mut tree, false);
            prop_assert_eq!(focus.focused(), Some(first));
        }

        #[test]
        fn prop_modal_never_escapes(
            steps in prop::collection::vec(any::<bool>(), 1..30),
        ) {
            let mut f = setup();
            f.focus.set_focus(&mut f.tree, Some(f.a));
            f.focus.set_modal_root(&mut f.tree, f.modal);
            for forward in steps {
                f.focus.cycle(&mut f.tree, forward);
                let focused = f.focus.focused().unwrap();
                prop_assert!(f.tree.is_within(focused, f.modal));
            }
        }
    }
}
