//! Application - the event loop that owns all UI state
//!
//! One loop, running on the thread that calls [`Application::run`], owns the
//! widget tree, the focus manager, and the surface. Everything else talks to
//! it through an [`AppHandle`]:
//!
//! ```text
//! input thread ──Event──▶ ┐
//! signal thread ──stop──▶ │
//! timers/widgets ─Command─▶ ├─ select! ─▶ route / execute / render
//! mark_dirty ───redraw──▶ │
//! frame tick ─────────────▶ ┘
//! ```
//!
//! The tree is never locked. It is only reachable from the loop, and
//! producers on other threads can only enqueue [`Command`]s.
//!
//! # Example
//!
//! ```no_run
//! use ember_tui::{AppConfig, Application, Theme};
//! use ember_tui::layout::Orientation;
//! use ember_tui::surface::CrosstermSurface;
//! use ember_tui::widget::{Button, Element, Layout, Pane};
//!
//! # fn main() -> ember_tui::Result<()> {
//! let surface = CrosstermSurface::new()?;
//! let mut app = Application::new(surface, Theme::default(), AppConfig::from_env());
//! let quit = app.handle();
//! app.set_root(
//!     Element::new(Layout::new(Orientation::Horizontal)).child(
//!         Element::new(Pane::new("demo"))
//!             .child(Element::new(Button::new("quit").on_press(move |_| quit.stop()))),
//!     ),
//! )?;
//! app.run()
//! # }
//! ```

mod blink;
mod command;
mod context;
mod handle;
mod render;
mod routing;

pub use command::Command;
pub use context::Context;
pub use handle::AppHandle;

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, bounded, never, select, tick};
use tracing::{debug, error, info, trace, warn};

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::event::Event;
use crate::focus::FocusManager;
use crate::surface::{EventSource, Surface};
use crate::theme::Theme;
use crate::widget::{Element, WidgetId, WidgetTree};

use blink::BlinkManager;
use handle::Channels;

pub struct Application {
    tree: WidgetTree,
    focus: FocusManager,
    theme: Theme,
    config: AppConfig,
    /// `None` once shut down, so nothing draws to a restored terminal.
    surface: Option<Box<dyn Surface>>,
    handle: AppHandle,
    channels: Channels,
    blink: BlinkManager,
    /// A redraw was requested but throttled to the next tick.
    redraw_pending: bool,
    last_frame: Option<Instant>,
}

impl Application {
    pub fn new(surface: impl Surface + 'static, theme: Theme, config: AppConfig) -> Self {
        let (handle, channels) = AppHandle::new(config.command_capacity);
        let blink = BlinkManager::new(config.blink_interval(), Instant::now());
        Self {
            tree: WidgetTree::new(),
            focus: FocusManager::new(),
            theme,
            config,
            surface: Some(Box::new(surface)),
            handle,
            channels,
            blink,
            redraw_pending: false,
            last_frame: None,
        }
    }

    /// Handle for other threads and widget callbacks.
    pub fn handle(&self) -> AppHandle {
        self.handle.clone()
    }

    pub fn tree(&self) -> &WidgetTree {
        &self.tree
    }

    /// Direct tree access. Only meaningful before [`run`](Self::run); once the
    /// loop is running, mutate through commands.
    pub fn tree_mut(&mut self) -> &mut WidgetTree {
        &mut self.tree
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn focused(&self) -> Option<WidgetId> {
        self.focus.focused()
    }

    /// Install the root widget. Focus and modal state are reset.
    pub fn set_root(&mut self, element: Element) -> Result<WidgetId> {
        let root = self.tree.set_root(element)?;
        self.focus.reset();
        Ok(root)
    }

    // =========================================================================
    // Run
    // =========================================================================

    /// Initialize the surface and run until stopped.
    ///
    /// Returns [`Error::SurfaceInit`] if the surface cannot start; nothing is
    /// spawned in that case. The surface is finalized on every other exit.
    pub fn run(&mut self) -> Result<()> {
        let Some(surface) = self.surface.as_mut() else {
            return Err(Error::SurfaceInit(std::io::Error::other("application already ran")));
        };
        if let Err(err) = surface.init() {
            error!(%err, "surface initialization failed");
            self.handle.stop();
            self.surface = None;
            return Err(Error::SurfaceInit(err));
        }
        info!(frame_rate = self.config.frame_rate, "application started");

        let (events, poller) = match surface.take_event_source() {
            Some(source) => {
                let (tx, rx) = bounded(self.config.event_capacity);
                match spawn_poller(source, tx, self.channels.stop.clone(), self.config.poll_interval) {
                    Ok(thread) => (rx, Some(thread)),
                    Err(err) => {
                        self.shutdown(None, None);
                        return Err(err);
                    }
                }
            }
            None => {
                debug!("surface has no event source");
                (never(), None)
            }
        };

        let signals = if self.config.handle_signals {
            spawn_signal_thread(self.handle.clone())
        } else {
            None
        };

        self.tree.set_application(self.handle.clone());
        if self.focus.focused().is_none() {
            self.focus.focus_first(&mut self.tree);
        }
        self.tree.assign_nav_indices();

        let result = self.render().and_then(|()| self.event_loop(events));
        self.shutdown(poller, signals);
        info!("application stopped");
        result
    }

    fn event_loop(&mut self, events: Receiver<Event>) -> Result<()> {
        let ticker = tick(self.config.frame_interval());
        let stop = self.channels.stop.clone();
        let commands = self.channels.commands.clone();
        let redraw = self.channels.redraw.clone();
        let closed = never();
        let mut input_open = true;

        loop {
            let input = if input_open { &events } else { &closed };
            select! {
                recv(stop) -> _ => break,
                recv(commands) -> command => {
                    if let Ok(command) = command {
                        self.execute(command);
                    }
                }
                recv(redraw) -> _ => self.request_render()?,
                recv(input) -> event => match event {
                    Ok(event) => self.on_event(event),
                    Err(_) => {
                        info!("input source closed, stopping");
                        input_open = false;
                        self.handle.stop();
                    }
                },
                recv(ticker) -> _ => self.on_tick()?,
            }
        }
        Ok(())
    }

    // =========================================================================
    // Loop steps
    // =========================================================================

    fn context(&mut self) -> Context<'_> {
        Context::new(&mut self.tree, &mut self.focus, &self.handle, &self.theme)
    }

    fn execute(&mut self, command: Command) {
        let before = self.focus.focused();
        self.context().execute(command);
        self.after_focus_change(before);
    }

    fn on_event(&mut self, event: Event) {
        trace!(?event, "input event");
        if let Event::Resize { width, height } = event {
            if let Some(surface) = self.surface.as_mut() {
                surface.sync_size(width, height);
            }
            debug!(width, height, "resized");
            self.handle.queue_redraw();
            return;
        }

        let before = self.focus.focused();
        let keymap = self.config.keymap;
        let handled = routing::route_event(&mut self.context(), &keymap, &event);
        if !handled {
            trace!(?event, "event not handled");
        }
        self.after_focus_change(before);
    }

    fn after_focus_change(&mut self, before: Option<WidgetId>) {
        if self.focus.focused() != before {
            self.blink.reset(Instant::now());
        }
    }

    /// Render now, or leave it to the next tick when the last frame is more
    /// recent than the frame interval.
    fn request_render(&mut self) -> Result<()> {
        let throttled = self
            .last_frame
            .is_some_and(|last| last.elapsed() < self.config.frame_interval());
        if throttled {
            self.redraw_pending = true;
            return Ok(());
        }
        self.render()
    }

    fn on_tick(&mut self) -> Result<()> {
        let cursor = render::cursor_request(&self.tree, self.focus.focused());
        let blinked = match cursor {
            Some(request) if request.blink => self.blink.tick(Instant::now()),
            _ => false,
        };
        let dirty = self.tree.root().is_some_and(|root| self.tree.is_dirty(root));
        if dirty || blinked || self.redraw_pending {
            self.render()?;
        }
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let Some(surface) = self.surface.as_mut() else { return Ok(()) };
        render::render_frame(
            &mut self.tree,
            surface.as_mut(),
            &self.theme,
            self.focus.focused(),
            self.blink.is_visible(),
        )
        .map_err(|err| {
            error!(%err, "render failed");
            Error::Io(err)
        })?;
        self.redraw_pending = false;
        self.last_frame = Some(Instant::now());
        Ok(())
    }

    // =========================================================================
    // Shutdown
    // =========================================================================

    fn shutdown(&mut self, poller: Option<JoinHandle<()>>, signals: Option<SignalThread>) {
        self.handle.stop();
        self.blink.stop();
        if let Some(signals) = signals {
            signals.close();
        }
        if let Some(mut surface) = self.surface.take() {
            if let Err(err) = surface.finalize() {
                warn!(%err, "surface finalize failed");
            }
        }
        if let Some(poller) = poller {
            if poller.join().is_err() {
                warn!("input thread panicked");
            }
        }
    }
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("widgets", &self.tree.len())
            .field("focused", &self.focus.focused())
            .field("theme", &self.theme.name)
            .field("running", &self.surface.is_some())
            .finish()
    }
}

// =============================================================================
// Background threads
// =============================================================================

/// Forward events from `source` until stopped or the source closes.
///
/// Dropping `events` on exit is how the loop learns the source closed.
fn spawn_poller(
    mut source: Box<dyn EventSource>,
    events: Sender<Event>,
    stop: Receiver<()>,
    poll_interval: Duration,
) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("ember-input".into())
        .spawn(move || {
            loop {
                if stop.try_recv().is_err_and(|e| e.is_disconnected()) {
                    break;
                }
                match source.poll_event(poll_interval) {
                    Ok(Some(event)) => {
                        select! {
                            send(events, event) -> sent => if sent.is_err() { break },
                            recv(stop) -> _ => break,
                        }
                    }
                    Ok(None) => {}
                    Err(err) => {
                        debug!(%err, "input source closed");
                        break;
                    }
                }
            }
            trace!("input thread exiting");
        })
        .map_err(|err| Error::ThreadSpawn("input", err))
}

#[cfg(unix)]
struct SignalThread {
    handle: signal_hook::iterator::Handle,
    thread: JoinHandle<()>,
}

#[cfg(unix)]
impl SignalThread {
    fn close(self) {
        self.handle.close();
        if self.thread.join().is_err() {
            warn!("signal thread panicked");
        }
    }
}

/// Turn SIGINT, SIGTERM, and SIGHUP into a stop request. Failing to install
/// the handlers is logged and otherwise ignored.
#[cfg(unix)]
fn spawn_signal_thread(app: AppHandle) -> Option<SignalThread> {
    use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = match Signals::new([SIGINT, SIGTERM, SIGHUP]) {
        Ok(signals) => signals,
        Err(err) => {
            warn!(%err, "could not install signal handlers");
            return None;
        }
    };
    let handle = signals.handle();
    let thread = thread::Builder::new()
        .name("ember-signals".into())
        .spawn(move || {
            for signal in signals.forever() {
                info!(signal, "termination signal received");
                app.stop();
            }
        });
    match thread {
        Ok(thread) => Some(SignalThread { handle, thread }),
        Err(err) => {
            warn!(%err, "could not spawn signal thread");
            handle.close();
            None
        }
    }
}

#[cfg(not(unix))]
struct SignalThread;

#[cfg(not(unix))]
impl SignalThread {
    fn close(self) {}
}

#[cfg(not(unix))]
fn spawn_signal_thread(_app: AppHandle) -> Option<SignalThread> {
    None
}
