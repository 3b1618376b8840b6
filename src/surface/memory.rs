//! Headless surface for tests and scripted sessions.
//!
//! The surface itself moves into the event loop; a cloned [`MemoryHandle`]
//! stays with the test to feed input and inspect what was presented.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use super::{CellBuffer, EventSource, Surface};
use crate::event::Event;
use crate::types::Style;

#[derive(Debug)]
struct Shared {
    back: CellBuffer,
    /// Last presented frame.
    front: CellBuffer,
    cursor: Option<(u16, u16)>,
    presented_cursor: Option<(u16, u16)>,
    frames: usize,
    initialized: bool,
    finalized: bool,
}

/// In-memory [`Surface`].
pub struct MemorySurface {
    shared: Arc<Mutex<Shared>>,
    input: Arc<Mutex<Option<Sender<Event>>>>,
    events: Option<Receiver<Event>>,
    fail_init: bool,
}

/// Test-side view of a [`MemorySurface`].
#[derive(Clone)]
pub struct MemoryHandle {
    shared: Arc<Mutex<Shared>>,
    input: Arc<Mutex<Option<Sender<Event>>>>,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    // A panicking test thread must not hide the frame from the others
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MemorySurface {
    pub fn new(width: u16, height: u16) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            shared: Arc::new(Mutex::new(Shared {
                back: CellBuffer::new(width, height),
                front: CellBuffer::new(width, height),
                cursor: None,
                presented_cursor: None,
                frames: 0,
                initialized: false,
                finalized: false,
            })),
            input: Arc::new(Mutex::new(Some(tx))),
            events: Some(rx),
            fail_init: false,
        }
    }

    /// Make `init` fail, for exercising startup errors.
    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    pub fn handle(&self) -> MemoryHandle {
        MemoryHandle {
            shared: Arc::clone(&self.shared),
            input: Arc::clone(&self.input),
        }
    }
}

impl Surface for MemorySurface {
    fn init(&mut self) -> io::Result<()> {
        if self.fail_init {
            return Err(io::Error::other("memory surface configured to fail"));
        }
        lock(&self.shared).initialized = true;
        Ok(())
    }

    fn finalize(&mut self) -> io::Result<()> {
        lock(&self.shared).finalized = true;
        Ok(())
    }

    fn size(&self) -> (u16, u16) {
        let shared = lock(&self.shared);
        (shared.back.width(), shared.back.height())
    }

    fn sync_size(&mut self, width: u16, height: u16) {
        lock(&self.shared).back.resize(width, height);
    }

    fn clear(&mut self) {
        lock(&self.shared).back.clear();
    }

    fn set_content(&mut self, x: u16, y: u16, ch: char, style: Style) {
        lock(&self.shared).back.set(x, y, ch, style);
    }

    fn show(&mut self) -> io::Result<()> {
        let mut shared = lock(&self.shared);
        shared.front = shared.back.clone();
        shared.presented_cursor = shared.cursor;
        shared.frames += 1;
        Ok(())
    }

    fn hide_cursor(&mut self) {
        lock(&self.shared).cursor = None;
    }

    fn show_cursor(&mut self, x: u16, y: u16) {
        lock(&self.shared).cursor = Some((x, y));
    }

    fn take_event_source(&mut self) -> Option<Box<dyn EventSource>> {
        self.events
            .take()
            .map(|rx| Box::new(MemoryEvents { rx }) as Box<dyn EventSource>)
    }
}

struct MemoryEvents {
    rx: Receiver<Event>,
}

impl EventSource for MemoryEvents {
    fn poll_event(&mut self, timeout: Duration) -> io::Result<Option<Event>> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "input closed"))
            }
        }
    }
}

impl MemoryHandle {
    /// Queue an input event. Returns false once input is closed.
    pub fn send(&self, event: Event) -> bool {
        let input = self.input.lock().unwrap_or_else(|p| p.into_inner());
        match input.as_ref() {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        }
    }

    /// Close the input stream. The event loop treats this as a stop request.
    pub fn close_input(&self) {
        self.input.lock().unwrap_or_else(|p| p.into_inner()).take();
    }

    /// Presented frame as text, one string per row.
    pub fn lines(&self) -> Vec<String> {
        let shared = lock(&self.shared);
        (0..shared.front.height()).map(|y| shared.front.line(y)).collect()
    }

    /// Whether any presented row contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }

    /// Style of a presented cell.
    pub fn style_at(&self, x: u16, y: u16) -> Option<Style> {
        lock(&self.shared).front.get(x, y).map(|c| c.style)
    }

    /// Cursor position in the last presented frame.
    pub fn cursor(&self) -> Option<(u16, u16)> {
        lock(&self.shared).presented_cursor
    }

    /// Number of frames presented so far.
    pub fn frames(&self) -> usize {
        lock(&self.shared).frames
    }

    pub fn is_initialized(&self) -> bool {
        lock(&self.shared).initialized
    }

    pub fn is_finalized(&self) -> bool {
        lock(&self.shared).finalized
    }
}
