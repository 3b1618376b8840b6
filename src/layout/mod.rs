//! Layout Module - proportional split of a rectangle among slots
//!
//! A layout converts an ordered list of slot constraints plus an orientation,
//! a gap and a cross-axis alignment into one rectangle per slot.
//!
//! # Algorithm
//!
//! 1. Partition the main axis into fixed sizes, gaps (`gap * (n - 1)`), and
//!    the remaining space.
//! 2. Every proportional slot gets `floor(remaining * weight / total_weight)`.
//! 3. The rounding remainder goes entirely to the *last* proportional slot.
//! 4. Rects are clamped to the parent area; overflowing slots collapse to
//!    zero area instead of going negative.
//!
//! The solver is a pure function. Caching lives in the `Layout` widget, which
//! only recomputes when its area, parameters, or slot list change.
//!
//! # Example
//!
//! ```
//! use ember_tui::layout::{split, Alignment, Orientation, SlotSpec, Size};
//! use ember_tui::Rect;
//!
//! let slots = [
//!     SlotSpec::new(Size::Fixed(5)),
//!     SlotSpec::new(Size::Proportional(1)),
//!     SlotSpec::new(Size::Fixed(5)),
//! ];
//! let rects = split(Rect::new(0, 0, 21, 3), &slots, Orientation::Horizontal, 1, Alignment::Stretch);
//! let widths: Vec<u16> = rects.iter().map(|r| r.width).collect();
//! assert_eq!(widths, vec![5, 9, 5]);
//! ```

mod solver;

pub use solver::{solve, split};

// =============================================================================
// Size constraint
// =============================================================================

/// Main-axis size constraint of a layout slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Size {
    /// Exact number of cells.
    Fixed(u16),
    /// Share of the space left after fixed slots and gaps. A weight of zero
    /// counts as one.
    Proportional(u16),
}

impl Default for Size {
    fn default() -> Self {
        Self::Proportional(1)
    }
}

impl Size {
    pub(crate) fn weight(&self) -> Option<u32> {
        match self {
            Self::Fixed(_) => None,
            Self::Proportional(w) => Some((*w).max(1) as u32),
        }
    }
}

// =============================================================================
// Orientation & alignment
// =============================================================================

/// Main axis of a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    /// Slots flow left to right.
    #[default]
    Horizontal,
    /// Slots flow top to bottom.
    Vertical,
}

/// Cross-axis placement of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Alignment {
    /// Fill the whole cross extent.
    #[default]
    Stretch,
    Start,
    Center,
    End,
}

/// Layout parameters that invalidate a cached arrangement when changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LayoutParams {
    pub orientation: Orientation,
    pub gap: u16,
    pub alignment: Alignment,
}

// =============================================================================
// Slot spec
// =============================================================================

/// What the solver needs to know about one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotSpec {
    pub size: Size,
    /// Whether the slot takes part in the split. Hidden slots receive a
    /// zero-area rect and consume neither space nor a gap.
    pub visible: bool,
    /// Preferred (width, height) of the slot's widget. Non-stretch
    /// alignments use the cross-axis component.
    pub measured: Option<(u16, u16)>,
}

impl SlotSpec {
    pub const fn new(size: Size) -> Self {
        Self { size, visible: true, measured: None }
    }

    pub const fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub const fn with_measured(mut self, width: u16, height: u16) -> Self {
        self.measured = Some((width, height));
        self
    }
}

impl Default for SlotSpec {
    fn default() -> Self {
        Self::new(Size::default())
    }
}
