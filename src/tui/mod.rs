//! TUI interface using ratatui
//!
//! Provides an interactive terminal user interface for:
//! - Choosing a site
//! - Searching its cleaning instructions
//! - Reading one instruction in any presentation mode

mod app;
mod ui;
mod widgets;

pub use app::{App, Command, DocumentList, Effect, FetchResult, RequestId, Screen};

use crate::catalog::SciSource;
use crate::render::ViewMode;
use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::debug;

/// Runs fetch commands in the background and reports their results
pub struct Fetcher {
    source: Arc<dyn SciSource>,
    runtime: Handle,
    tx: UnboundedSender<FetchResult>,
}

impl Fetcher {
    /// Create a fetcher and the receiver its results arrive on
    pub fn new(
        source: Arc<dyn SciSource>,
        runtime: Handle,
    ) -> (Self, UnboundedReceiver<FetchResult>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                source,
                runtime,
                tx,
            },
            rx,
        )
    }

    /// Spawn the fetch for `command`
    pub fn dispatch(&self, command: Command) -> JoinHandle<()> {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();

        debug!("Dispatching {:?}", command);
        self.runtime.spawn(async move {
            let result = match command {
                Command::LoadSites => FetchResult::Sites(source.summarize_sites().await),
                Command::LoadDocuments { request, site_id } => FetchResult::Documents {
                    request,
                    result: source.fetch_documents(Some(&site_id)).await,
                },
            };
            // The receiver is gone once the UI has exited
            let _ = tx.send(result);
        })
    }
}

/// Run the TUI application
pub fn run(source: Arc<dyn SciSource>, runtime: Handle, mode: ViewMode) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (fetcher, mut results) = Fetcher::new(source, runtime);
    let mut app = App::new(mode);

    // Run the main loop
    let result = run_app(&mut terminal, &mut app, &fetcher, &mut results);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

/// Main application loop
fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    fetcher: &Fetcher,
    results: &mut UnboundedReceiver<FetchResult>,
) -> Result<()> {
    fetcher.dispatch(app.start());

    loop {
        // Apply settled fetches
        loop {
            match results.try_recv() {
                Ok(result) => app.apply_fetch(result),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        // Draw UI
        terminal.draw(|f| ui::draw(f, app))?;

        // Handle input
        if !event::poll(Duration::from_millis(100))? {
            app.on_tick();
            continue;
        }

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            // Global keybindings
            match (key.modifiers, key.code) {
                (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
                    return Ok(());
                }
                (KeyModifiers::CONTROL, KeyCode::Char('q')) => {
                    return Ok(());
                }
                _ => {}
            }

            // Pass to app
            match app.handle_key(key) {
                Effect::None => {}
                Effect::Fetch(command) => {
                    fetcher.dispatch(command);
                }
                Effect::Quit => return Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SciCatalog;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn catalog() -> Arc<dyn SciSource> {
        let store = MemoryStore::default()
            .with_document(
                "companies/t1/standard_cleaning_instructions",
                "a",
                json!({ "siteId": "S1", "siteName": "Slow Plant", "section": { "title": "Apple" } }),
            )
            .with_document(
                "companies/t1/standard_cleaning_instructions",
                "b",
                json!({ "siteId": "S2", "siteName": "Fast Plant", "section": { "title": "Banana" } }),
            )
            .with_delay("S1", Duration::from_millis(200));

        Arc::new(SciCatalog::new(Arc::new(store), "t1").unwrap())
    }

    #[tokio::test]
    async fn test_later_selection_wins_over_slow_fetch() {
        let (fetcher, mut results) = Fetcher::new(catalog(), Handle::current());
        let mut app = App::new(ViewMode::Elegant);

        fetcher.dispatch(app.start()).await.unwrap();
        app.apply_fetch(results.recv().await.unwrap());
        assert_eq!(app.sites.len(), 2);

        let slow_index = app.sites.iter().position(|s| s.id == "S1").unwrap();
        let fast_index = app.sites.iter().position(|s| s.id == "S2").unwrap();

        let slow = fetcher.dispatch(app.select_site(slow_index).unwrap());
        app.back();
        let fast = fetcher.dispatch(app.select_site(fast_index).unwrap());

        fast.await.unwrap();
        slow.await.unwrap();
        while let Ok(result) = results.try_recv() {
            app.apply_fetch(result);
        }

        match app.screen {
            Screen::Documents(ref list) => {
                assert_eq!(list.site.id, "S2");
                let titles: Vec<&str> = list.visible().into_iter().map(|d| d.title()).collect();
                assert_eq!(titles, vec!["Banana"]);
            }
            _ => panic!("not on the document list"),
        }
    }
}
