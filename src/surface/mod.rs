//! Terminal surface abstraction.
//!
//! A [`Surface`] is a grid of character cells plus a cursor. The event loop
//! owns it exclusively; input is read through a separate [`EventSource`] so
//! the poller thread never contends with the render pass.
//!
//! Two implementations ship with the crate:
//! - [`CrosstermSurface`] - raw mode, alternate screen, diffed output
//! - [`MemorySurface`] - headless grid with scripted input, for tests

mod terminal;
mod memory;

pub use terminal::CrosstermSurface;
pub use memory::{MemoryHandle, MemorySurface};

use std::io;
use std::time::Duration;

use crate::event::Event;
use crate::types::Style;

/// Marks the right half of a double-width character. Renderers skip it.
pub const CONTINUATION: char = '\0';

/// One character cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub style: Style,
}

impl Default for Cell {
    fn default() -> Self {
        Self { ch: ' ', style: Style::default() }
    }
}

/// Character-cell output device.
pub trait Surface: Send {
    /// Prepare the device. Called once before the first frame.
    fn init(&mut self) -> io::Result<()>;

    /// Restore the device. Called once during shutdown.
    fn finalize(&mut self) -> io::Result<()>;

    /// Current size as (width, height).
    fn size(&self) -> (u16, u16);

    /// Adopt a new size after the device reported a resize.
    fn sync_size(&mut self, width: u16, height: u16);

    /// Reset every cell of the back buffer.
    fn clear(&mut self);

    /// Write one cell. Out-of-bounds writes are ignored.
    fn set_content(&mut self, x: u16, y: u16, ch: char, style: Style);

    /// Present the back buffer.
    fn show(&mut self) -> io::Result<()>;

    fn hide_cursor(&mut self);

    fn show_cursor(&mut self, x: u16, y: u16);

    /// Hand out the input side. Returns `None` once taken.
    fn take_event_source(&mut self) -> Option<Box<dyn EventSource>>;
}

/// Input side of a surface, driven from the poller thread.
pub trait EventSource: Send {
    /// Wait up to `timeout` for one event.
    ///
    /// `Ok(None)` means nothing arrived (or the input was not something the
    /// toolkit routes). `Err` means the source is closed for good.
    fn poll_event(&mut self, timeout: Duration) -> io::Result<Option<Event>>;
}

/// Row-major cell buffer shared by both surfaces.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CellBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width as usize * height as usize],
        }
    }

    pub(crate) fn width(&self) -> u16 {
        self.width
    }

    pub(crate) fn height(&self) -> u16 {
        self.height
    }

    pub(crate) fn resize(&mut self, width: u16, height: u16) {
        *self = Self::new(width, height);
    }

    pub(crate) fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    pub(crate) fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get(y as usize * self.width as usize + x as usize)
    }

    pub(crate) fn set(&mut self, x: u16, y: u16, ch: char, style: Style) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = y as usize * self.width as usize + x as usize;
        self.cells[index] = Cell { ch, style };
    }

    /// Row as text, continuation cells dropped.
    pub(crate) fn line(&self, y: u16) -> String {
        (0..self.width)
            .filter_map(|x| self.get(x, y))
            .filter(|c| c.ch != CONTINUATION)
            .map(|c| c.ch)
            .collect()
    }
}
