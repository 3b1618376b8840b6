//! Cross-thread handle to a running application.
//!
//! Every producer outside the event loop (input poller, signal thread, timers,
//! widget callbacks) talks to the loop through an [`AppHandle`]. None of the
//! methods block.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use tracing::{debug, warn};

use crate::widget::{Widget, WidgetId};

use super::Command;

struct Shared {
    commands: Sender<Command>,
    redraw: Sender<()>,
    /// Dropped exactly once by `stop`. Receivers observe disconnection.
    stop: Mutex<Option<Sender<()>>>,
    stopping: AtomicBool,
}

/// Receiving ends owned by the event loop.
pub(crate) struct Channels {
    pub commands: Receiver<Command>,
    pub redraw: Receiver<()>,
    pub stop: Receiver<()>,
}

/// Cheap, cloneable, thread-safe handle to an application.
#[derive(Clone)]
pub struct AppHandle {
    shared: Arc<Shared>,
}

impl AppHandle {
    /// Handle plus the loop's receivers. The command queue holds at most
    /// `command_capacity` pending commands.
    pub(crate) fn new(command_capacity: usize) -> (Self, Channels) {
        let (commands_tx, commands_rx) = bounded(command_capacity.max(1));
        // Capacity one: a pending signal means a redraw is already queued
        let (redraw_tx, redraw_rx) = bounded(1);
        let (stop_tx, stop_rx) = bounded(0);
        let handle = Self {
            shared: Arc::new(Shared {
                commands: commands_tx,
                redraw: redraw_tx,
                stop: Mutex::new(Some(stop_tx)),
                stopping: AtomicBool::new(false),
            }),
        };
        let channels = Channels {
            commands: commands_rx,
            redraw: redraw_rx,
            stop: stop_rx,
        };
        (handle, channels)
    }

    /// Enqueue a command for the event loop.
    ///
    /// Never blocks. Returns false if the command was dropped, either because
    /// the application is stopping (silently) or the queue is full (logged).
    pub fn dispatch(&self, command: Command) -> bool {
        if self.is_stopping() {
            return false;
        }
        match self.shared.commands.try_send(command) {
            Ok(()) => true,
            Err(TrySendError::Full(command)) => {
                warn!(?command, "command queue full, dropping command");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Dispatch a typed update of widget `target`.
    pub fn update<W: Widget>(
        &self,
        target: WidgetId,
        apply: impl FnOnce(&mut W) + Send + 'static,
    ) -> bool {
        self.dispatch(Command::update(target, apply))
    }

    /// Dispatch a closure that runs with full access to the loop state.
    pub fn run(&self, f: impl FnOnce(&mut super::Context<'_>) + Send + 'static) -> bool {
        self.dispatch(Command::run(f))
    }

    /// Request a render pass. Repeated requests before the loop drains the
    /// signal collapse into one.
    pub fn queue_redraw(&self) {
        let _ = self.shared.redraw.try_send(());
    }

    /// Begin termination. Safe to call any number of times from any thread.
    pub fn stop(&self) {
        let sender = self
            .shared
            .stop
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if sender.is_some() {
            self.shared.stopping.store(true, Ordering::SeqCst);
            debug!("stop requested");
        }
    }

    pub fn is_stopping(&self) -> bool {
        self.shared.stopping.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for AppHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppHandle")
            .field("pending_commands", &self.shared.commands.len())
            .field("stopping", &self.is_stopping())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::TryRecvError;

    fn setup() -> (AppHandle, Channels) {
        AppHandle::new(2)
    }

    #[test]
    fn test_redraw_coalesces() {
        let (handle, channels) = setup();
        for _ in 0..5 {
            handle.queue_redraw();
        }
        assert_eq!(channels.redraw.len(), 1);
        assert!(channels.redraw.try_recv().is_ok());
        assert_eq!(channels.redraw.try_recv(), Err(TryRecvError::Empty));

        handle.queue_redraw();
        assert_eq!(channels.redraw.len(), 1);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (handle, channels) = setup();
        assert_eq!(channels.stop.try_recv(), Err(TryRecvError::Empty));

        handle.stop();
        assert!(handle.is_stopping());
        assert_eq!(channels.stop.try_recv(), Err(TryRecvError::Disconnected));

        handle.clone().stop();
        assert!(handle.is_stopping());
        assert_eq!(channels.stop.try_recv(), Err(TryRecvError::Disconnected));
    }

    #[test]
    fn test_dispatch_fifo() {
        let (handle, channels) = setup();
        assert!(handle.dispatch(Command::RecomputeNavIndices));
        assert!(handle.dispatch(Command::ClearModalRoot));
        assert!(matches!(channels.commands.try_recv(), Ok(Command::RecomputeNavIndices)));
        assert!(matches!(channels.commands.try_recv(), Ok(Command::ClearModalRoot)));
    }

    #[test]
    fn test_full_queue_drops() {
        let (handle, channels) = setup();
        assert!(handle.dispatch(Command::RecomputeNavIndices));
        assert!(handle.dispatch(Command::RecomputeNavIndices));
        assert!(!handle.dispatch(Command::ClearModalRoot));
        assert_eq!(channels.commands.len(), 2);
    }

    #[test]
    fn test_dispatch_after_stop_is_dropped() {
        let (handle, channels) = setup();
        handle.stop();
        assert!(!handle.dispatch(Command::RecomputeNavIndices));
        assert!(channels.commands.is_empty());
    }
}
