//! End-to-end tests: a real event loop on a background thread, driven through
//! a `MemorySurface`.

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::bounded;
use ember_tui::layout::Orientation;
use ember_tui::surface::{MemoryHandle, MemorySurface};
use ember_tui::widget::{Button, Element, Layout, Pane, Text, TextInput};
use ember_tui::{
    AppConfig, AppHandle, Application, Command, Context, Error, Event, KeyCode, KeyModifiers,
    Result, Theme, WidgetId,
};

const TIMEOUT: Duration = Duration::from_secs(3);

// =============================================================================
// Harness
// =============================================================================

struct Ids {
    left: WidgetId,
    alpha: WidgetId,
    right: WidgetId,
    beta: WidgetId,
    input: WidgetId,
    text: WidgetId,
}

struct Harness {
    screen: MemoryHandle,
    app: AppHandle,
    ids: Ids,
    thread: JoinHandle<(Application, Result<()>)>,
}

fn config() -> AppConfig {
    AppConfig::default()
        .frame_rate(120)
        .poll_interval(Duration::from_millis(5))
        .handle_signals(false)
        .cursor_blink(0)
}

/// layout[ pane left[alpha], pane right[ layout[ pane beta[beta], pane form[input], pane note[text] ] ] ]
fn tree() -> Element {
    Element::new(Layout::horizontal())
        .child(Element::new(Pane::new("left")).child(Element::new(Button::new("alpha"))))
        .child(
            Element::new(Pane::new("right")).child(
                Element::new(Layout::new(Orientation::Vertical))
                    .child(Element::new(Pane::new("beta")).child(Element::new(Button::new("beta"))))
                    .child(Element::new(Pane::new("form")).child(Element::new(TextInput::new())))
                    .child(Element::new(Pane::new("note")).child(Element::new(Text::new("hello")))),
            ),
        )
}

fn start() -> Harness {
    start_with(tree())
}

fn start_with(root: Element) -> Harness {
    let surface = MemorySurface::new(60, 16);
    let screen = surface.handle();
    let mut application = Application::new(surface, Theme::default(), config());
    let root = application.set_root(root).unwrap();
    let order = application.tree().preorder(root);
    let ids = Ids {
        left: order[1],
        alpha: order[2],
        right: order[3],
        beta: order[6],
        input: order[8],
        text: order[10],
    };
    let app = application.handle();
    let thread = thread::spawn(move || {
        let result = application.run();
        (application, result)
    });
    assert!(eventually(|| screen.frames() > 0), "no first frame");
    Harness { screen, app, ids, thread }
}

impl Harness {
    fn send(&self, event: Event) {
        assert!(self.screen.send(event));
    }

    fn key(&self, code: KeyCode) {
        self.send(Event::key(code));
    }

    fn focused(&self) -> Option<WidgetId> {
        query(&self.app, |ctx| ctx.focused()).flatten()
    }

    fn focus_becomes(&self, expected: WidgetId) -> bool {
        eventually(|| self.focused() == Some(expected))
    }

    fn join(self) -> (Application, Result<()>) {
        assert!(eventually(|| self.thread.is_finished()), "event loop did not stop");
        self.thread.join().unwrap()
    }
}

/// Run `f` inside the loop and wait for its result.
fn query<T: Send + 'static>(
    app: &AppHandle,
    f: impl FnOnce(&mut Context<'_>) -> T + Send + 'static,
) -> Option<T> {
    let (tx, rx) = bounded(1);
    let sent = app.run(move |ctx| {
        let _ = tx.send(f(ctx));
    });
    if !sent {
        return None;
    }
    rx.recv_timeout(TIMEOUT).ok()
}

fn eventually(mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + TIMEOUT;
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    check()
}

// =============================================================================
// Startup and shutdown
// =============================================================================

#[test]
fn test_first_frame_focus_and_nav_indices() {
    let h = start();
    assert!(h.screen.is_initialized());
    assert!(h.focus_becomes(h.ids.alpha));
    assert!(h.screen.contains("[1] left"));
    assert!(h.screen.contains("[3] beta"));
    assert!(h.screen.contains("hello"));
    h.app.stop();
    let (_, result) = h.join();
    assert!(result.is_ok());
}

#[test]
fn test_surface_init_failure_is_fatal() {
    let surface = MemorySurface::new(10, 4).failing_init();
    let screen = surface.handle();
    let mut app = Application::new(surface, Theme::default(), config());
    app.set_root(tree()).unwrap();
    let handle = app.handle();

    assert!(matches!(app.run(), Err(Error::SurfaceInit(_))));
    assert!(!screen.is_initialized());
    assert_eq!(screen.frames(), 0);
    assert!(!handle.dispatch(Command::RecomputeNavIndices));
}

#[test]
fn test_ctrl_c_stops_and_finalizes() {
    let h = start();
    let screen = h.screen.clone();
    let app = h.app.clone();
    h.send(Event::key_with(KeyCode::Char('c'), KeyModifiers::CONTROL));
    let (_, result) = h.join();
    assert!(result.is_ok());
    assert!(screen.is_finalized());
    assert!(app.is_stopping());
    assert!(!app.dispatch(Command::RecomputeNavIndices));
}

#[test]
fn test_escape_without_modal_stops() {
    let h = start();
    h.key(KeyCode::Esc);
    let (_, result) = h.join();
    assert!(result.is_ok());
}

#[test]
fn test_closed_input_stops() {
    let h = start();
    h.screen.close_input();
    let (_, result) = h.join();
    assert!(result.is_ok());
}

#[test]
fn test_stop_twice_from_another_thread() {
    let h = start();
    let app = h.app.clone();
    thread::spawn(move || {
        app.stop();
        app.stop();
    })
    .join()
    .unwrap();
    let (_, result) = h.join();
    assert!(result.is_ok());
}

#[test]
fn test_button_callback_can_stop() {
    let root = Element::new(Layout::horizontal())
        .child(Element::new(Pane::new("left")).child(Element::new(Button::new("quit").on_press(|ctx| ctx.stop()))));
    let surface = MemorySurface::new(30, 5);
    let screen = surface.handle();
    let mut app = Application::new(surface, Theme::default(), config());
    app.set_root(root).unwrap();
    let thread = thread::spawn(move || app.run());
    assert!(eventually(|| screen.frames() > 0));

    screen.send(Event::key(KeyCode::Enter));
    assert!(eventually(|| thread.is_finished()));
    assert!(thread.join().unwrap().is_ok());
}

// =============================================================================
// Focus
// =============================================================================

#[test]
fn test_tab_cycles_focus() {
    let h = start();
    assert!(h.focus_becomes(h.ids.alpha));
    h.key(KeyCode::Tab);
    assert!(h.focus_becomes(h.ids.beta));
    h.key(KeyCode::Tab);
    assert!(h.focus_becomes(h.ids.input));
    h.key(KeyCode::Tab);
    assert!(h.focus_becomes(h.ids.alpha));
    h.send(Event::key_with(KeyCode::BackTab, KeyModifiers::SHIFT));
    assert!(h.focus_becomes(h.ids.input));
    h.app.stop();
    h.join();
}

#[test]
fn test_nav_digit_jumps() {
    let h = start();
    h.send(Event::key_with(KeyCode::Char('4'), KeyModifiers::ALT));
    assert!(h.focus_becomes(h.ids.input));
    h.send(Event::key_with(KeyCode::Char('3'), KeyModifiers::ALT));
    assert!(h.focus_becomes(h.ids.beta));
    h.app.stop();
    h.join();
}

#[test]
fn test_set_focus_command_guards() {
    let h = start();
    let text = h.ids.text;
    assert!(h.app.dispatch(Command::SetFocus(Some(text))));
    // Non-focusable target is ignored
    assert_eq!(h.focused(), Some(h.ids.alpha));

    assert!(h.app.dispatch(Command::SetFocus(Some(h.ids.beta))));
    assert!(h.focus_becomes(h.ids.beta));
    h.app.stop();
    h.join();
}

#[test]
fn test_modal_traps_focus_and_escape_restores() {
    let h = start();
    assert!(h.focus_becomes(h.ids.alpha));
    let right = h.ids.right;
    assert_eq!(query(&h.app, move |ctx| ctx.set_modal_root(right)), Some(true));
    assert!(h.focus_becomes(h.ids.beta));

    for _ in 0..4 {
        h.key(KeyCode::Tab);
    }
    // Tab count is even, so focus is back on the first widget in the modal
    assert!(h.focus_becomes(h.ids.beta));
    assert_ne!(h.focused(), Some(h.ids.alpha));

    h.key(KeyCode::Esc);
    assert!(h.focus_becomes(h.ids.alpha));
    assert_eq!(query(&h.app, |ctx| ctx.modal_root()), Some(None));
    assert!(!h.app.is_stopping());

    h.app.stop();
    h.join();
}

#[test]
fn test_hiding_focused_pane_moves_focus() {
    let h = start();
    assert!(h.focus_becomes(h.ids.alpha));
    assert!(h.app.dispatch(Command::SetVisible(h.ids.left, false)));
    assert!(h.focus_becomes(h.ids.beta));
    assert!(eventually(|| !h.screen.contains("left")));
    h.app.stop();
    h.join();
}

#[test]
fn test_removing_focused_pane_moves_focus() {
    let h = start();
    let left = h.ids.left;
    let alpha = h.ids.alpha;
    assert!(h.focus_becomes(alpha));
    assert!(h.app.dispatch(Command::RemovePane(left)));
    assert!(h.focus_becomes(h.ids.beta));
    h.app.stop();

    let (app, _) = h.join();
    assert!(!app.tree().contains(left));
    assert!(!app.tree().contains(alpha));
    let root = app.tree().root().unwrap();
    assert_eq!(app.tree().preorder(root).len(), app.tree().len());
}

// =============================================================================
// Input, commands, rendering
// =============================================================================

#[test]
fn test_typing_reaches_focused_input() {
    let h = start();
    h.send(Event::key_with(KeyCode::Char('4'), KeyModifiers::ALT));
    assert!(h.focus_becomes(h.ids.input));
    for c in "xyz".chars() {
        h.key(KeyCode::Char(c));
    }
    assert!(eventually(|| h.screen.contains("xyz")));
    let input = h.ids.input;
    let value = query(&h.app, move |ctx| {
        ctx.tree().downcast_ref::<TextInput>(input).map(TextInput::value)
    });
    assert_eq!(value.flatten().as_deref(), Some("xyz"));
    h.app.stop();
    h.join();
}

#[test]
fn test_update_from_another_thread_redraws() {
    let h = start();
    let app = h.app.clone();
    let text = h.ids.text;
    thread::spawn(move || app.update::<Text>(text, |t| t.set_content("from worker")))
        .join()
        .unwrap();
    assert!(eventually(|| h.screen.contains("from worker")));
    h.app.stop();
    h.join();
}

#[test]
fn test_add_pane_and_recompute_indices() {
    let h = start();
    let layout = query(&h.app, |ctx| ctx.tree().root()).flatten().unwrap();
    let pane = Element::new(Pane::new("extra")).child(Element::new(Button::new("gamma")));
    assert!(h.app.dispatch(Command::AddPane { layout, pane }));
    assert!(h.app.dispatch(Command::RecomputeNavIndices));
    assert!(eventually(|| h.screen.contains("[5] extra")));
    h.app.stop();
    h.join();
}

#[test]
fn test_resize_relayouts_on_next_frame() {
    let h = start();
    h.send(Event::Resize { width: 40, height: 10 });
    assert!(eventually(|| h.screen.lines().len() == 10));
    let rect = query(&h.app, |ctx| {
        let root = ctx.tree().root()?;
        Some(ctx.tree().rect(root))
    })
    .flatten()
    .unwrap();
    assert_eq!((rect.width, rect.height), (40, 10));
    h.app.stop();
    h.join();
}

#[test]
fn test_idle_loop_does_not_redraw() {
    let h = start();
    assert!(h.focus_becomes(h.ids.alpha));
    // Let pending redraws settle
    thread::sleep(Duration::from_millis(100));
    let frames = h.screen.frames();
    thread::sleep(Duration::from_millis(100));
    assert_eq!(h.screen.frames(), frames);
    h.app.stop();
    h.join();
}
