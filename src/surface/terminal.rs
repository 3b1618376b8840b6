//! Crossterm-backed surface for real terminals.
//!
//! Output is double buffered and diffed: `show` compares the back buffer to
//! the last presented frame and only writes cells that changed, wrapped in a
//! synchronized update so the terminal paints the frame atomically.
//!
//! # Algorithm
//!
//! 1. Begin synchronized update
//! 2. For each cell of the back buffer:
//!    - If the previous frame has the same size and the cell is unchanged: skip
//!    - Otherwise: move there (unless already adjacent), apply style, print
//! 3. Place or hide the cursor
//! 4. End synchronized update, flush once
//! 5. Keep the back buffer as the previous frame

use std::io::{self, BufWriter, Stdout, Write};
use std::time::Duration;

use crossterm::style::{self as cstyle, Attribute, SetAttribute, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{self, BeginSynchronizedUpdate, EndSynchronizedUpdate};
use crossterm::{cursor, event as ct, execute, queue};

use super::{CONTINUATION, Cell, CellBuffer, EventSource, Surface};
use crate::event::{Event, from_crossterm};
use crate::types::{Attr, Color, Style};

/// Surface drawing to stdout through crossterm.
pub struct CrosstermSurface {
    out: BufWriter<Stdout>,
    back: CellBuffer,
    previous: Option<CellBuffer>,
    cursor: Option<(u16, u16)>,
    active: bool,
    events_taken: bool,
}

impl CrosstermSurface {
    /// Create a surface sized to the current terminal. Nothing is written to
    /// the terminal until [`Surface::init`].
    pub fn new() -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self {
            out: BufWriter::with_capacity(64 * 1024, io::stdout()),
            back: CellBuffer::new(width, height),
            previous: None,
            cursor: None,
            active: false,
            events_taken: false,
        })
    }

    /// Forget the previous frame so the next `show` repaints everything.
    pub fn invalidate(&mut self) {
        self.previous = None;
    }

    fn restore(&mut self) -> io::Result<()> {
        // Best-effort: try every step even if one fails
        let mut first_err: Option<io::Error> = None;
        if let Err(err) = execute!(
            self.out,
            SetAttribute(Attribute::Reset),
            cursor::Show,
            ct::DisableBracketedPaste,
            terminal::LeaveAlternateScreen
        ) {
            first_err.get_or_insert(err);
        }
        if let Err(err) = terminal::disable_raw_mode() {
            first_err.get_or_insert(err);
        }
        self.active = false;
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn write_cell(&mut self, cell: &Cell, current: &mut Option<Style>) -> io::Result<()> {
        if *current != Some(cell.style) {
            queue!(
                self.out,
                SetAttribute(Attribute::Reset),
                SetForegroundColor(to_crossterm(cell.style.fg)),
                SetBackgroundColor(to_crossterm(cell.style.bg))
            )?;
            for attr in attributes(cell.style.attrs) {
                queue!(self.out, SetAttribute(attr))?;
            }
            *current = Some(cell.style);
        }
        queue!(self.out, cstyle::Print(cell.ch))
    }
}

impl Surface for CrosstermSurface {
    fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.out,
            terminal::EnterAlternateScreen,
            ct::EnableBracketedPaste,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All)
        )?;
        self.active = true;
        self.invalidate();
        Ok(())
    }

    fn finalize(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.restore()
    }

    fn size(&self) -> (u16, u16) {
        (self.back.width(), self.back.height())
    }

    fn sync_size(&mut self, width: u16, height: u16) {
        self.back.resize(width, height);
        self.invalidate();
    }

    fn clear(&mut self) {
        self.back.clear();
    }

    fn set_content(&mut self, x: u16, y: u16, ch: char, style: Style) {
        self.back.set(x, y, ch, style);
    }

    fn show(&mut self) -> io::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate, cursor::Hide)?;
        if self.previous.is_none() {
            queue!(self.out, terminal::Clear(terminal::ClearType::All))?;
        }

        let back = std::mem::replace(&mut self.back, CellBuffer::new(0, 0));
        let mut current_style = None;
        let mut next_pos: Option<(u16, u16)> = None;
        for y in 0..back.height() {
            for x in 0..back.width() {
                let Some(cell) = back.get(x, y) else { continue };
                if cell.ch == CONTINUATION {
                    continue;
                }
                let changed = match &self.previous {
                    Some(prev) => prev.get(x, y) != Some(cell),
                    None => true,
                };
                if !changed {
                    continue;
                }
                if next_pos != Some((x, y)) {
                    queue!(self.out, cursor::MoveTo(x, y))?;
                }
                self.write_cell(cell, &mut current_style)?;
                let advance = unicode_width::UnicodeWidthChar::width(cell.ch).unwrap_or(1).max(1) as u16;
                next_pos = Some((x.saturating_add(advance), y));
            }
        }
        queue!(self.out, SetAttribute(Attribute::Reset))?;

        if let Some((x, y)) = self.cursor {
            queue!(self.out, cursor::MoveTo(x, y), cursor::Show)?;
        }
        queue!(self.out, EndSynchronizedUpdate)?;
        self.out.flush()?;

        self.previous = Some(back.clone());
        self.back = back;
        Ok(())
    }

    fn hide_cursor(&mut self) {
        self.cursor = None;
    }

    fn show_cursor(&mut self, x: u16, y: u16) {
        self.cursor = Some((x, y));
    }

    fn take_event_source(&mut self) -> Option<Box<dyn EventSource>> {
        if self.events_taken {
            return None;
        }
        self.events_taken = true;
        Some(Box::new(CrosstermEvents))
    }
}

impl Drop for CrosstermSurface {
    fn drop(&mut self) {
        if self.active {
            let _ = self.restore();
        }
    }
}

/// Reads crossterm's global input queue.
struct CrosstermEvents;

impl EventSource for CrosstermEvents {
    fn poll_event(&mut self, timeout: Duration) -> io::Result<Option<Event>> {
        if !ct::poll(timeout)? {
            return Ok(None);
        }
        Ok(from_crossterm(ct::read()?))
    }
}

fn to_crossterm(color: Color) -> cstyle::Color {
    match color {
        Color::Reset => cstyle::Color::Reset,
        Color::Ansi(index) => cstyle::Color::AnsiValue(index),
        Color::Rgb(r, g, b) => cstyle::Color::Rgb { r, g, b },
    }
}

fn attributes(attrs: Attr) -> impl Iterator<Item = Attribute> {
    [
        (Attr::BOLD, Attribute::Bold),
        (Attr::DIM, Attribute::Dim),
        (Attr::ITALIC, Attribute::Italic),
        (Attr::UNDERLINE, Attribute::Underlined),
        (Attr::INVERSE, Attribute::Reverse),
    ]
    .into_iter()
    .filter(move |(flag, _)| attrs.contains(*flag))
    .map(|(_, attr)| attr)
}
