//! Showcase - panes, focus, a modal, and a background worker
//!
//! Demonstrates:
//! - Nested layouts with fixed and proportional panes
//! - Tab / Shift+Tab focus cycling and Alt+digit pane jumps
//! - A text input whose submit updates another widget through a command
//! - A help pane opened as a modal (Esc closes it)
//! - A worker thread updating a clock through the application handle
//!
//! Run with: cargo run --example showcase [terminal|dracula|nord]
//! Logs go to `$TMPDIR/ember-tui/logs`; set `EMBER_LOG=debug` for more.

use std::thread;
use std::time::{Duration, Instant};

use ember_tui::layout::Size;
use ember_tui::surface::CrosstermSurface;
use ember_tui::theme::get_preset;
use ember_tui::widget::{Button, Element, Layout, Pane, Text, TextInput};
use ember_tui::{AppConfig, Application, BorderStyle, Command, StyleRole, logging};

const HELP: &str = "Tab / Shift+Tab  cycle focus\n\
                    Alt+1..9         jump to pane\n\
                    Enter / Space    press button\n\
                    Esc              close help, or quit\n\
                    Ctrl+C           quit";

fn main() -> ember_tui::Result<()> {
    let _logging = logging::init_file_logging(logging::default_log_dir(), "ember_tui=info");

    let theme = std::env::args()
        .nth(1)
        .and_then(|name| get_preset(&name))
        .unwrap_or_default();

    let surface = CrosstermSurface::new()?;
    let mut app = Application::new(surface, theme.clone(), AppConfig::from_env());
    let handle = app.handle();

    // Skeleton first so the callbacks below can capture widget ids
    let root = app.set_root(Element::new(Layout::horizontal().gap(1)))?;
    let tree = app.tree_mut();

    let menu = tree.add_pane(root, Element::new(Pane::themed("menu", &theme)).size(Size::Fixed(24)))?;
    let main = tree.add_pane(root, Element::new(Pane::themed("main", &theme)))?;

    let content = tree.set_content(main, Element::new(Layout::vertical()))?;
    let form = tree.add_pane(content, Element::new(Pane::themed("name", &theme)).size(Size::Fixed(3)))?;
    let greeting_pane = tree.add_pane(content, Element::new(Pane::themed("greeting", &theme)))?;
    let greeting = tree.set_content(greeting_pane, Element::new(Text::new("Type a name and press Enter.")))?;
    let clock_pane = tree.add_pane(content, Element::new(Pane::themed("uptime", &theme)).size(Size::Fixed(3)))?;
    let clock = tree.set_content(clock_pane, Element::new(Text::new("0s").style_role(StyleRole::Title)))?;

    let help = tree.add_pane(
        content,
        Element::new(Pane::themed("help", &theme)).size(Size::Fixed(9)).hidden(),
    )?;
    let help_body = tree.set_content(help, Element::new(Layout::vertical()))?;
    let help_text = tree.add_pane(help_body, Element::new(Pane::new("keys").border(BorderStyle::None)))?;
    tree.set_content(help_text, Element::new(Text::new(HELP)))?;
    let close_pane = tree.add_pane(
        help_body,
        Element::new(Pane::new("").border(BorderStyle::None)).size(Size::Fixed(1)),
    )?;
    tree.set_content(
        close_pane,
        Element::new(Button::new("close").on_press(move |ctx| {
            ctx.dispatch(Command::SetVisible(help, false));
            ctx.dispatch(Command::ClearModalRoot);
        })),
    )?;

    tree.set_content(
        form,
        Element::new(
            TextInput::new()
                .placeholder("your name")
                .max_length(40)
                .on_submit(move |value, ctx| {
                    let message = if value.trim().is_empty() {
                        "Nobody there?".to_string()
                    } else {
                        format!("Hello, {}!", value.trim())
                    };
                    ctx.dispatch(Command::update::<Text>(greeting, move |text| text.set_content(message)));
                }),
        ),
    )?;

    let buttons = tree.set_content(menu, Element::new(Layout::vertical()))?;
    let help_button = tree.add_pane(buttons, Element::new(Pane::new("")).size(Size::Fixed(3)))?;
    tree.set_content(
        help_button,
        Element::new(Button::new("help").on_press(move |ctx| {
            ctx.dispatch(Command::run(move |ctx| {
                if ctx.modal_root() == Some(help) {
                    return;
                }
                if ctx.set_visible(help, true).is_ok() {
                    ctx.set_modal_root(help);
                }
            }));
        })),
    )?;
    let quit_pane = tree.add_pane(buttons, Element::new(Pane::new("")).size(Size::Fixed(3)))?;
    tree.set_content(quit_pane, Element::new(Button::new("quit").on_press(|ctx| ctx.stop())))?;

    // Worker: only ever talks to the loop through the handle
    let started = Instant::now();
    let worker = thread::spawn(move || {
        while !handle.is_stopping() {
            let secs = started.elapsed().as_secs();
            handle.update::<Text>(clock, move |text| text.set_content(format!("{secs}s")));
            thread::sleep(Duration::from_millis(250));
        }
    });

    let result = app.run();
    let _ = worker.join();
    result
}
