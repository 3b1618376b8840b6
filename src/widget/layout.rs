//! Layout - splits its area among up to ten panes.
//!
//! The arrangement is cached and only recomputed when the layout's own area,
//! its parameters (orientation, gap, alignment), or the slot list (sizes,
//! visibility) change. Measurements only count under a non-stretch
//! alignment, so with the default alignment content changes inside a pane
//! never trigger a recompute.

use std::any::Any;

use crate::layout::{Alignment, LayoutParams, Orientation, SlotSpec, split};
use crate::types::Rect;

use super::{Canvas, DrawContext, Role, Widget};

#[derive(Debug, Clone, PartialEq)]
struct Arrangement {
    area: Rect,
    params: LayoutParams,
    slots: Vec<SlotSpec>,
    rects: Vec<Rect>,
}

#[derive(Debug, Default)]
pub struct Layout {
    params: LayoutParams,
    cache: Option<Arrangement>,
    recomputations: u64,
}

impl Layout {
    pub fn new(orientation: Orientation) -> Self {
        Self {
            params: LayoutParams { orientation, ..LayoutParams::default() },
            ..Self::default()
        }
    }

    pub fn horizontal() -> Self {
        Self::new(Orientation::Horizontal)
    }

    pub fn vertical() -> Self {
        Self::new(Orientation::Vertical)
    }

    pub fn gap(mut self, gap: u16) -> Self {
        self.params.gap = gap;
        self
    }

    pub fn alignment(mut self, alignment: Alignment) -> Self {
        self.params.alignment = alignment;
        self
    }

    pub fn params(&self) -> LayoutParams {
        self.params
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.params.orientation = orientation;
    }

    pub fn set_gap(&mut self, gap: u16) {
        self.params.gap = gap;
    }

    pub fn set_alignment(&mut self, alignment: Alignment) {
        self.params.alignment = alignment;
    }

    /// How many times the arrangement has been computed.
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }
}

impl Widget for Layout {
    fn draw(&self, _canvas: &mut Canvas<'_>, _ctx: &DrawContext<'_>) {}

    fn role(&self) -> Role {
        Role::Layout
    }

    fn arrange(&mut self, area: Rect, slots: &[SlotSpec]) -> Vec<Rect> {
        let LayoutParams { orientation, gap, alignment } = self.params;
        // Stretch ignores measurements; keep them out of the cache key
        let slots: Vec<SlotSpec> = slots
            .iter()
            .map(|slot| match alignment {
                Alignment::Stretch => SlotSpec { measured: None, ..*slot },
                _ => *slot,
            })
            .collect();

        if let Some(cached) = &self.cache {
            if cached.area == area && cached.params == self.params && cached.slots == slots {
                return cached.rects.clone();
            }
        }

        let rects = split(area, &slots, orientation, gap, alignment);
        self.recomputations += 1;
        self.cache = Some(Arrangement {
            area,
            params: self.params,
            slots,
            rects: rects.clone(),
        });
        rects
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
