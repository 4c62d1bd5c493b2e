//! spacefeed: browse a daily astronomy photo feed in the terminal.
//!
//! ## Architecture overview
//!
//! ```text
//!                 FetchMsg    ┌──────────────┐  draw()  ┌──────────┐
//! ┌──────────┐  (channel)     │    app.rs    │ ───────► │  ui.rs   │
//! │ fetch.rs │ ─────────────► │ ┌──────────┐ │          │ (render) │
//! │  (task)  │                │ │controller│ │          └──────────┘
//! └──────────┘ ◄───────────── │ └──────────┘ │
//!       │       spawn(cursor) └──────────────┘
//!       ▼                            ▲
//! ┌──────────┐                       │ handle_key_event()
//! │ source/  │                  ┌──────────┐
//! │ (HTTP)   │                  │ input.rs │
//! └──────────┘                  └──────────┘
//! ```
//!
//! * **`source/`**: the `PhotoSource` trait, wire types, and the HTTP
//!   implementation.
//! * **`controller`**: cursor, accumulated feed, single-flight paging state.
//! * **`fetch`**: runs one page request on a tokio task.
//! * **`app`**: UI state around the controller, including the scroll sensor.
//! * **`ui`**: pure rendering: reads `App` state and draws widgets.
//! * **`input`**: maps key events to `App` mutations.
//! * **`config`**: TOML settings file.
//! * **`main`**: wires everything together: parse args, load config, set up
//!   logging and the terminal, and run the event loop.

mod app;
mod config;
mod controller;
mod error;
mod fetch;
mod input;
mod source;
mod ui;

use std::io::{self, Write};
use std::path::Path;
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::EnvFilter;

use app::App;
use config::Config;
use controller::{FeedController, LoadOutcome};
use fetch::FetchMsg;
use source::{ApiSource, PhotoSource};

// ---------------------------------------------------------------------------
// RAII terminal guard: restores the terminal even on panic
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Install a panic hook that restores the terminal before printing the
/// panic message.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

// ---------------------------------------------------------------------------
// Arguments and logging
// ---------------------------------------------------------------------------

#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    /// Overrides the configured API base URL.
    api_url: Option<String>,
    /// Headless mode: print this many pages and exit.
    print_pages: Option<usize>,
}

const USAGE: &str = "usage: spacefeed [--print <pages>] [API_URL]";

fn parse_args<I>(args: I) -> Result<Args>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = Args::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--print" | "-p" => {
                let value = args.next().context(USAGE)?;
                let pages = value
                    .parse()
                    .with_context(|| format!("invalid page count {value:?}"))?;
                parsed.print_pages = Some(pages);
            }
            "--help" | "-h" => bail!(USAGE),
            flag if flag.starts_with('-') => bail!("unknown option {flag:?}\n{USAGE}"),
            url if parsed.api_url.is_none() => parsed.api_url = Some(url.to_string()),
            _ => bail!(USAGE),
        }
    }

    Ok(parsed)
}

/// Send logs to a file; the terminal belongs to the UI.
fn init_logging(log_path: &str) -> Result<()> {
    let path = Path::new(log_path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {log_path}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args(std::env::args().skip(1))?;
    let config = Config::load()?;
    init_logging(&config.log_path)?;

    let api_url = args.api_url.unwrap_or_else(|| config.api_url.clone());
    let api = ApiSource::new(&api_url)?;
    tracing::info!(api = api.base_url(), "starting spacefeed");
    let source: Arc<dyn PhotoSource> = Arc::new(api);

    let feed = FeedController::new(config.start_cursor()?);

    match args.print_pages {
        Some(pages) => print_pages(feed, source.as_ref(), pages).await,
        // The UI loop blocks on terminal input, so take this worker off the
        // async scheduler while it runs.
        None => tokio::task::block_in_place(|| run_tui(feed, source, config.prefetch_margin)),
    }
}

/// Load `pages` pages one after another and print every photo.
async fn print_pages(mut feed: FeedController, source: &dyn PhotoSource, pages: usize) -> Result<()> {
    let mut out = io::stdout();
    let mut printed = 0;

    for _ in 0..pages {
        let outcome = feed
            .load_more(source)
            .await
            .with_context(|| format!("fetching page at {}", feed.cursor()))?;

        for photo in &feed.items()[printed..] {
            writeln!(out, "{}  {}  {}", photo.date, photo.title, photo.url)?;
        }
        printed = feed.items().len();

        if outcome == LoadOutcome::Exhausted {
            break;
        }
    }

    Ok(())
}

/// Merge settled fetches, then start a new fetch if the pending trigger is
/// accepted.  Returns whether a fetch was started.
fn pump(
    app: &mut App,
    rx: &mpsc::Receiver<FetchMsg>,
    source: &Arc<dyn PhotoSource>,
    tx: &mpsc::Sender<FetchMsg>,
) -> bool {
    while let Ok(msg) = rx.try_recv() {
        app.handle_fetch(msg);
    }

    let Some(cursor) = app.next_trigger().and_then(|t| app.feed.request(t)) else {
        return false;
    };
    app.mark_loading();
    fetch::spawn(Arc::clone(source), cursor, tx.clone());
    true
}

/// Interactive terminal UI.
///
/// Synchronous: it blocks on `event::poll` between ticks.  Call it from
/// `block_in_place` on a multi-threaded runtime so fetch tasks keep running.
fn run_tui(feed: FeedController, source: Arc<dyn PhotoSource>, prefetch_margin: usize) -> Result<()> {
    install_panic_hook();

    let (tx, rx) = mpsc::channel();

    // -- terminal setup (Drop restores on exit or panic) ---------------------
    let mut guard = TerminalGuard::new()?;
    let mut app = App::new(feed, prefetch_margin);

    // -- main event loop -----------------------------------------------------
    // Runs at ~10 fps (100 ms tick).  Each iteration:
    //   1. Merge any settled fetches and offer the pending trigger (manual
    //      or scroll sensor) to the controller; start a fetch if it accepts.
    //   2. Render the UI.
    //   3. Poll for keyboard input (up to tick_rate).
    let tick_rate = Duration::from_millis(100);

    loop {
        // 1. Fetch results and triggers
        pump(&mut app, &rx, &source, &tx);

        // 2. Render
        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        // 3. Handle input
        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                input::handle_key_event(&mut app, key);
            }
        }

        if app.quit {
            break;
        }
    }

    tracing::info!(photos = app.items().len(), "exiting");
    // `guard` is dropped here, restoring the terminal.
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::tests::{page, ScriptedSource};
    use crate::source::Cursor;

    fn args(list: &[&str]) -> Result<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn no_arguments_means_tui_with_configured_url() {
        assert_eq!(args(&[]).unwrap(), Args::default());
    }

    #[test]
    fn positional_argument_is_api_url() {
        let parsed = args(&["http://example.com"]).unwrap();
        assert_eq!(parsed.api_url.as_deref(), Some("http://example.com"));
        assert_eq!(parsed.print_pages, None);
    }

    #[test]
    fn print_flag_takes_page_count() {
        let parsed = args(&["--print", "3", "http://example.com"]).unwrap();
        assert_eq!(parsed.print_pages, Some(3));
        assert_eq!(parsed.api_url.as_deref(), Some("http://example.com"));
    }

    #[test]
    fn bad_arguments_are_rejected() {
        assert!(args(&["--print"]).is_err());
        assert!(args(&["--print", "many"]).is_err());
        assert!(args(&["--verbose"]).is_err());
        assert!(args(&["a", "b"]).is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn pump_runs_fetches_from_a_blocking_loop() {
        let scripted = Arc::new(ScriptedSource::new().then_ok(page("c1", &["a", "b"])));
        let source: Arc<dyn PhotoSource> = scripted.clone();
        let (tx, rx) = mpsc::channel();
        // Zero margin: once two photos are in, the sensor stays quiet.
        let mut app = App::new(FeedController::new(Cursor::new("c0")), 0);

        let app = tokio::task::block_in_place(move || {
            assert!(pump(&mut app, &rx, &source, &tx));
            // Second tick while the first fetch is outstanding starts nothing.
            assert!(!pump(&mut app, &rx, &source, &tx));

            for _ in 0..200 {
                if !app.feed.in_flight() {
                    break;
                }
                std::thread::sleep(Duration::from_millis(10));
                pump(&mut app, &rx, &source, &tx);
            }
            app
        });

        assert_eq!(app.items().len(), 2);
        assert_eq!(scripted.request_count(), 1);
    }

    #[tokio::test]
    async fn print_pages_stops_at_exhaustion() {
        let source = ScriptedSource::new()
            .then_ok(page("c1", &["a"]))
            .then_ok(page("c2", &[]));
        let feed = FeedController::new(Cursor::new("c0"));

        print_pages(feed, &source, 5).await.unwrap();

        assert_eq!(source.request_count(), 2);
    }

    #[tokio::test]
    async fn print_pages_propagates_failure() {
        let source = ScriptedSource::new().then_err(500);
        let feed = FeedController::new(Cursor::new("c0"));

        let err = print_pages(feed, &source, 1).await.unwrap_err();
        assert!(err.to_string().contains("fetching page at c0"));
    }
}
