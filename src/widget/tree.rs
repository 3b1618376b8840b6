//! Widget arena.
//!
//! All widgets live in one [`SlotMap`] owned by the event loop. Parent links
//! and every external reference (focused widget, modal root) are [`WidgetId`]
//! keys, so removing a subtree invalidates them instead of leaving them
//! dangling.

use slotmap::SlotMap;
use tracing::debug;

use crate::app::AppHandle;
use crate::error::{Error, Result};
use crate::event::Event;
use crate::layout::{Size, SlotSpec};
use crate::surface::Surface;
use crate::theme::Theme;
use crate::types::{Interaction, Rect};

use super::{Canvas, DrawContext, Element, EventContext, LAYOUT_CAPACITY, Role, Widget, WidgetId};

/// Per-node state managed by the tree on behalf of the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetState {
    pub rect: Rect,
    pub visible: bool,
    pub focused: bool,
    pub dirty: bool,
    pub interaction: Interaction,
}

impl Default for WidgetState {
    fn default() -> Self {
        Self {
            rect: Rect::default(),
            visible: true,
            focused: false,
            dirty: true,
            interaction: Interaction::Normal,
        }
    }
}

/// Arena entry.
pub struct Node {
    widget: Box<dyn Widget>,
    state: WidgetState,
    parent: Option<WidgetId>,
    children: Vec<WidgetId>,
    size: Size,
}

impl Node {
    pub fn widget(&self) -> &dyn Widget {
        self.widget.as_ref()
    }

    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    pub fn size(&self) -> Size {
        self.size
    }
}

/// Owner of every widget in an application.
#[derive(Default)]
pub struct WidgetTree {
    nodes: SlotMap<WidgetId, Node>,
    root: Option<WidgetId>,
    app: Option<AppHandle>,
    generation: u64,
}

impl WidgetTree {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Structure
    // =========================================================================

    pub fn root(&self) -> Option<WidgetId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: WidgetId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Bumped on every structural or visibility change. Caches compare
    /// against it to know when to rebuild.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn touch(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Replace the whole tree. The previous root subtree is dropped.
    pub fn set_root(&mut self, element: Element) -> Result<WidgetId> {
        validate_subtree(&element)?;
        if let Some(old) = self.root.take() {
            self.remove_subtree(old);
        }
        let id = self.insert(element, None);
        self.root = Some(id);
        self.touch();
        self.queue_redraw();
        debug!(?id, widgets = self.nodes.len(), "root replaced");
        Ok(id)
    }

    /// Adopt `element` as the last child of `parent`.
    ///
    /// Role rules are checked for the whole subtree before anything is
    /// inserted, so a failed mount leaves the tree untouched.
    pub fn mount(&mut self, parent: WidgetId, element: Element) -> Result<WidgetId> {
        let node = self.nodes.get(parent).ok_or(Error::UnknownWidget(parent))?;
        check_child(parent, node.widget.role(), node.children.len(), element.role())?;
        validate_subtree(&element)?;

        let id = self.insert(element, Some(parent));
        self.nodes[parent].children.push(id);
        self.touch();
        self.mark_dirty(parent);
        Ok(id)
    }

    /// Mount a pane into a layout.
    pub fn add_pane(&mut self, layout: WidgetId, pane: Element) -> Result<WidgetId> {
        let node = self.nodes.get(layout).ok_or(Error::UnknownWidget(layout))?;
        if node.widget.role() != Role::Layout {
            return Err(Error::NotAContainer(layout));
        }
        self.mount(layout, pane)
    }

    /// Replace the content of a pane, dropping the previous child.
    pub fn set_content(&mut self, pane: WidgetId, content: Element) -> Result<WidgetId> {
        let node = self.nodes.get(pane).ok_or(Error::UnknownWidget(pane))?;
        if node.widget.role() != Role::Pane {
            return Err(Error::NotAPane(pane));
        }
        check_child(pane, Role::Pane, 0, content.role())?;
        validate_subtree(&content)?;

        let old: Vec<WidgetId> = self.nodes[pane].children.drain(..).collect();
        for child in old {
            self.remove_subtree(child);
        }
        let id = self.insert(content, Some(pane));
        self.nodes[pane].children.push(id);
        self.touch();
        self.mark_dirty(pane);
        Ok(id)
    }

    /// Remove a widget and its subtree.
    pub fn remove(&mut self, id: WidgetId) -> Result<()> {
        let node = self.nodes.get(id).ok_or(Error::UnknownWidget(id))?;
        match node.parent {
            Some(parent) => {
                if let Some(parent_node) = self.nodes.get_mut(parent) {
                    parent_node.children.retain(|child| *child != id);
                }
                self.mark_dirty(parent);
            }
            None => {
                if self.root == Some(id) {
                    self.root = None;
                }
            }
        }
        self.remove_subtree(id);
        self.touch();
        self.queue_redraw();
        Ok(())
    }

    fn insert(&mut self, element: Element, parent: Option<WidgetId>) -> WidgetId {
        let Element { mut widget, size, visible, children } = element;
        if let Some(app) = &self.app {
            widget.on_attach(app);
        }
        let id = self.nodes.insert(Node {
            widget,
            state: WidgetState { visible, ..WidgetState::default() },
            parent,
            children: Vec::with_capacity(children.len()),
            size,
        });
        for child in children {
            let child_id = self.insert(child, Some(id));
            self.nodes[id].children.push(child_id);
        }
        id
    }

    fn remove_subtree(&mut self, id: WidgetId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(current) {
                stack.extend(node.children);
            }
        }
    }

    // =========================================================================
    // Relations
    // =========================================================================

    pub fn children(&self, id: WidgetId) -> &[WidgetId] {
        self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    /// Whether `id` is `ancestor` or lies in its subtree.
    pub fn is_within(&self, id: WidgetId, ancestor: WidgetId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Preorder walk of the subtree rooted at `start`.
    pub fn preorder(&self, start: WidgetId) -> Vec<WidgetId> {
        let mut out = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else { continue };
            out.push(id);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    // =========================================================================
    // Widget access
    // =========================================================================

    pub fn widget(&self, id: WidgetId) -> Option<&dyn Widget> {
        self.nodes.get(id).map(|n| n.widget.as_ref())
    }

    pub fn widget_mut(&mut self, id: WidgetId) -> Option<&mut dyn Widget> {
        self.nodes.get_mut(id).map(|n| n.widget.as_mut())
    }

    pub fn downcast_ref<T: Widget>(&self, id: WidgetId) -> Option<&T> {
        self.widget(id)?.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Widget>(&mut self, id: WidgetId) -> Option<&mut T> {
        self.widget_mut(id)?.as_any_mut().downcast_mut::<T>()
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    pub fn set_rect(&mut self, id: WidgetId, rect: Rect) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.state.rect = rect;
        }
    }

    pub fn rect(&self, id: WidgetId) -> Rect {
        self.nodes.get(id).map(|n| n.state.rect).unwrap_or_default()
    }

    /// Size constraint of `id` within its parent layout.
    pub fn set_size(&mut self, id: WidgetId, size: Size) {
        let Some(node) = self.nodes.get_mut(id) else { return };
        if node.size == size {
            return;
        }
        node.size = size;
        if let Some(parent) = node.parent {
            self.mark_dirty(parent);
        }
    }

    /// Lay the tree out top-down inside `area`.
    pub fn layout(&mut self, area: Rect) {
        let Some(root) = self.root else { return };
        self.set_rect(root, area);
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else { continue };
            if node.children.is_empty() {
                continue;
            }
            let rect = node.state.rect;
            let children = node.children.clone();
            let slots: Vec<SlotSpec> = children
                .iter()
                .filter_map(|child| {
                    let node = self.nodes.get(*child)?;
                    Some(SlotSpec {
                        size: node.size,
                        visible: node.state.visible,
                        measured: self.measure(*child),
                    })
                })
                .collect();

            let rects = self.nodes[id].widget.arrange(rect, &slots);
            for (child, child_rect) in children.iter().zip(rects) {
                self.set_rect(*child, child_rect);
            }
            stack.extend(children);
        }
    }

    /// Preferred size of a widget. Panes without their own measurement
    /// report their content's size plus their inset.
    pub fn measure(&self, id: WidgetId) -> Option<(u16, u16)> {
        let node = self.nodes.get(id)?;
        if let Some(size) = node.widget.measure() {
            return Some(size);
        }
        if node.widget.role() != Role::Pane {
            return None;
        }
        let (width, height) = self.measure(*node.children.first()?)?;
        let inset = node.widget.content_inset().saturating_mul(2);
        Some((width.saturating_add(inset), height.saturating_add(inset)))
    }

    // =========================================================================
    // Visibility
    // =========================================================================

    /// Set the widget's own visibility flag. Returns true if it changed.
    pub fn set_visible(&mut self, id: WidgetId, visible: bool) -> bool {
        let Some(node) = self.nodes.get_mut(id) else { return false };
        if node.state.visible == visible {
            return false;
        }
        node.state.visible = visible;
        let parent = node.parent;
        self.touch();
        self.mark_dirty(id);
        if let Some(parent) = parent {
            self.mark_dirty(parent);
        }
        true
    }

    pub fn is_visible(&self, id: WidgetId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.state.visible)
    }

    /// Own flag AND every ancestor's flag.
    pub fn is_effectively_visible(&self, id: WidgetId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let Some(node) = self.nodes.get(node_id) else { return false };
            if !node.state.visible {
                return false;
            }
            current = node.parent;
        }
        true
    }

    // =========================================================================
    // Focus flags
    // =========================================================================

    /// Self-reported focusable and effectively visible.
    pub fn is_focusable(&self, id: WidgetId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.widget.focusable()) && self.is_effectively_visible(id)
    }

    pub fn is_focused(&self, id: WidgetId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.state.focused)
    }

    /// Set the focus flag and notify the widget. Focus bookkeeping belongs to
    /// [`FocusManager`](crate::focus::FocusManager); call this through it.
    pub fn focus(&mut self, id: WidgetId) {
        let Some(node) = self.nodes.get_mut(id) else { return };
        if node.state.focused {
            return;
        }
        node.state.focused = true;
        node.state.interaction = Interaction::Selected;
        node.widget.on_focus();
        self.mark_dirty(id);
    }

    pub fn blur(&mut self, id: WidgetId) {
        let Some(node) = self.nodes.get_mut(id) else { return };
        if !node.state.focused {
            return;
        }
        node.state.focused = false;
        node.state.interaction = Interaction::Normal;
        node.widget.on_blur();
        self.mark_dirty(id);
    }

    pub fn interaction(&self, id: WidgetId) -> Interaction {
        self.nodes.get(id).map(|n| n.state.interaction).unwrap_or_default()
    }

    pub fn set_interaction(&mut self, id: WidgetId, interaction: Interaction) {
        let Some(node) = self.nodes.get_mut(id) else { return };
        if node.state.interaction != interaction {
            node.state.interaction = interaction;
            self.mark_dirty(id);
        }
    }

    // =========================================================================
    // Dirty tracking
    // =========================================================================

    /// Flag the widget and request a redraw. Ancestors are not touched;
    /// [`is_dirty`](Self::is_dirty) folds descendants in instead.
    pub fn mark_dirty(&mut self, id: WidgetId) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.state.dirty = true;
            self.queue_redraw();
        }
    }

    /// Own flag OR any descendant's flag.
    pub fn is_dirty(&self, id: WidgetId) -> bool {
        self.preorder(id)
            .into_iter()
            .any(|node| self.nodes.get(node).is_some_and(|n| n.state.dirty))
    }

    /// Clear the flag on `id` and every descendant.
    pub fn clear_dirty(&mut self, id: WidgetId) {
        for node in self.preorder(id) {
            if let Some(node) = self.nodes.get_mut(node) {
                node.state.dirty = false;
            }
        }
    }

    // =========================================================================
    // Application back-reference
    // =========================================================================

    /// Attach the tree to an application and notify every widget.
    pub fn set_application(&mut self, app: AppHandle) {
        for node in self.nodes.values_mut() {
            node.widget.on_attach(&app);
        }
        self.app = Some(app);
    }

    pub fn app(&self) -> Option<&AppHandle> {
        self.app.as_ref()
    }

    fn queue_redraw(&self) {
        if let Some(app) = &self.app {
            app.queue_redraw();
        }
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Offer `event` to a single widget. Handled events mark it dirty.
    pub fn handle_event(&mut self, id: WidgetId, event: &Event) -> bool {
        let app = self.app.as_ref();
        let Some(node) = self.nodes.get_mut(id) else { return false };
        let mut ctx = EventContext::new(id, node.state.rect, app, node.state.interaction);
        let handled = node.widget.handle_event(event, &mut ctx);
        let interaction = ctx.interaction();
        let changed = node.state.interaction != interaction;
        node.state.interaction = interaction;
        if handled || changed {
            self.mark_dirty(id);
        }
        handled
    }

    // =========================================================================
    // Navigation indices
    // =========================================================================

    /// Number panes 1..=9 in document order. Only effectively visible panes
    /// holding something focusable get a number; the rest get 0.
    pub fn assign_nav_indices(&mut self) {
        let Some(root) = self.root else { return };
        let mut next = 1u8;
        for id in self.preorder(root) {
            if self.nodes[id].widget.role() != Role::Pane {
                continue;
            }
            let eligible = next <= 9
                && self.is_effectively_visible(id)
                && self.preorder(id).into_iter().any(|w| self.is_focusable(w));
            let index = if eligible { next } else { 0 };
            if eligible {
                next += 1;
            }
            let node = &mut self.nodes[id];
            if node.widget.nav_index() != index {
                node.widget.set_nav_index(index);
                self.mark_dirty(id);
            }
        }
    }

    /// Pane carrying navigation index `index`, if any.
    pub fn pane_by_nav_index(&self, index: u8) -> Option<WidgetId> {
        if index == 0 {
            return None;
        }
        let root = self.root?;
        self.preorder(root).into_iter().find(|id| {
            let node = &self.nodes[*id];
            node.widget.role() == Role::Pane && node.widget.nav_index() == index
        })
    }

    // =========================================================================
    // Drawing
    // =========================================================================

    /// Draw every effectively visible widget, parents before children.
    pub fn draw(&self, surface: &mut dyn Surface, theme: &Theme, focused: Option<WidgetId>) {
        let Some(root) = self.root else { return };
        let (width, height) = surface.size();
        let clip = Rect::new(0, 0, width, height);
        self.draw_node(root, surface, theme, focused, clip);
    }

    fn draw_node(
        &self,
        id: WidgetId,
        surface: &mut dyn Surface,
        theme: &Theme,
        focused: Option<WidgetId>,
        parent_clip: Rect,
    ) {
        let Some(node) = self.nodes.get(id) else { return };
        if !node.state.visible {
            return;
        }
        let clip = node.state.rect.intersection(&parent_clip);
        let ctx = DrawContext {
            theme,
            area: node.state.rect,
            focused: node.state.focused,
            focus_within: focused.is_some_and(|f| self.is_within(f, id)),
            interaction: node.state.interaction,
        };
        {
            let mut canvas = Canvas::new(surface, clip);
            node.widget.draw(&mut canvas, &ctx);
        }
        for child in &node.children {
            self.draw_node(*child, surface, theme, focused, clip);
        }
    }
}

// =============================================================================
// Role validation
// =============================================================================

fn check_child(parent: WidgetId, parent_role: Role, existing: usize, child_role: Role) -> Result<()> {
    match parent_role {
        Role::Leaf => Err(Error::NotAContainer(parent)),
        Role::Pane if existing >= 1 => Err(Error::PaneOccupied(parent)),
        Role::Pane => Ok(()),
        Role::Layout if child_role != Role::Pane => Err(Error::NotAPane(parent)),
        Role::Layout if existing >= LAYOUT_CAPACITY => Err(Error::LayoutFull(parent, LAYOUT_CAPACITY)),
        Role::Layout => Ok(()),
    }
}

/// Check an element's own children against its role, recursively.
///
/// Detached elements have no id yet, so errors carry the default (null) key.
fn validate_subtree(element: &Element) -> Result<()> {
    let role = element.role();
    for (existing, child) in element.children.iter().enumerate() {
        check_child(WidgetId::default(), role, existing, child.role())?;
        validate_subtree(child)?;
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
