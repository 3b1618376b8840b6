//! Render pass.

use std::io;

use tracing::trace;

use crate::surface::Surface;
use crate::theme::Theme;
use crate::types::Rect;
use crate::widget::{WidgetId, WidgetTree};

/// What the focused widget wants from the terminal cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CursorRequest {
    pub x: u16,
    pub y: u16,
    pub blink: bool,
}

/// Cursor requested by the focused widget at its current rect.
pub(crate) fn cursor_request(tree: &WidgetTree, focused: Option<WidgetId>) -> Option<CursorRequest> {
    let id = focused?;
    let widget = tree.widget(id)?;
    let (x, y) = widget.cursor(tree.rect(id))?;
    Some(CursorRequest { x, y, blink: widget.cursor_blink() })
}

/// Lay out, draw, and present one frame.
///
/// Dirty flags are cleared only after the frame was presented; a failed
/// `show` leaves them set so the next pass retries.
pub(crate) fn render_frame(
    tree: &mut WidgetTree,
    surface: &mut dyn Surface,
    theme: &Theme,
    focused: Option<WidgetId>,
    blink_visible: bool,
) -> io::Result<()> {
    surface.hide_cursor();

    let (width, height) = surface.size();
    tree.layout(Rect::new(0, 0, width, height));

    surface.clear();
    tree.draw(surface, theme, focused);

    if let Some(cursor) = cursor_request(tree, focused) {
        if !cursor.blink || blink_visible {
            surface.show_cursor(cursor.x, cursor.y);
        }
    }

    surface.show()?;

    if let Some(root) = tree.root() {
        tree.clear_dirty(root);
    }
    trace!(width, height, "frame presented");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Orientation;
    use crate::surface::MemorySurface;
    use crate::widget::{Element, Layout, Pane, Text, TextInput};

    fn setup() -> (WidgetTree, WidgetId) {
        let mut tree = WidgetTree::new();
        let root = tree
            .set_root(
                Element::new(Layout::new(Orientation::Vertical))
                    .child(Element::new(Pane::new("hello")).child(Element::new(Text::new("body"))))
                    .child(Element::new(Pane::new("form")).child(Element::new(TextInput::new()))),
            )
            .unwrap();
        let input = tree.preorder(root)[4];
        (tree, input)
    }

    #[test]
    fn test_frame_draws_and_clears_dirty() {
        let (mut tree, _) = setup();
        let mut surface = MemorySurface::new(20, 8);
        let handle = surface.handle();
        let root = tree.root().unwrap();
        assert!(tree.is_dirty(root));

        render_frame(&mut tree, &mut surface, &Theme::default(), None, true).unwrap();
        assert!(!tree.is_dirty(root));
        assert!(handle.contains("hello"));
        assert!(handle.contains("body"));
        assert_eq!(handle.frames(), 1);
        assert_eq!(handle.cursor(), None);
    }

    #[test]
    fn test_cursor_follows_blink_phase() {
        let (mut tree, input) = setup();
        tree.focus(input);
        let mut surface = MemorySurface::new(20, 8);
        let handle = surface.handle();

        render_frame(&mut tree, &mut surface, &Theme::default(), Some(input), true).unwrap();
        let rect = tree.rect(input);
        assert_eq!(handle.cursor(), Some((rect.x, rect.y)));

        render_frame(&mut tree, &mut surface, &Theme::default(), Some(input), false).unwrap();
        assert_eq!(handle.cursor(), None);
    }

    #[test]
    fn test_layout_follows_surface_size() {
        let (mut tree, _) = setup();
        let mut surface = MemorySurface::new(20, 8);
        render_frame(&mut tree, &mut surface, &Theme::default(), None, true).unwrap();
        assert_eq!(tree.rect(tree.root().unwrap()), Rect::new(0, 0, 20, 8));

        surface.sync_size(30, 10);
        render_frame(&mut tree, &mut surface, &Theme::default(), None, true).unwrap();
        assert_eq!(tree.rect(tree.root().unwrap()), Rect::new(0, 0, 30, 10));
    }
}
