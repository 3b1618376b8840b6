//! Detached widget subtrees.

use crate::layout::Size;

use super::{Role, Widget};

/// A widget plus its children, not yet part of any tree.
///
/// Elements are built bottom-up and handed to
/// [`WidgetTree::mount`](super::WidgetTree::mount) or
/// [`WidgetTree::set_root`](super::WidgetTree::set_root), which adopt the
/// whole subtree in one step.
pub struct Element {
    pub(crate) widget: Box<dyn Widget>,
    pub(crate) size: Size,
    pub(crate) visible: bool,
    pub(crate) children: Vec<Element>,
}

impl Element {
    pub fn new(widget: impl Widget) -> Self {
        Self::boxed(Box::new(widget))
    }

    pub fn boxed(widget: Box<dyn Widget>) -> Self {
        Self {
            widget,
            size: Size::default(),
            visible: true,
            children: Vec::new(),
        }
    }

    /// Size constraint used when this element sits in a layout slot.
    pub fn size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    /// Start hidden.
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn role(&self) -> Role {
        self.widget.role()
    }

    /// Number of widgets in the subtree.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Element::count).sum::<usize>()
    }
}

impl std::fmt::Debug for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Element")
            .field("role", &self.role())
            .field("size", &self.size)
            .field("visible", &self.visible)
            .field("children", &self.children)
            .finish()
    }
}
