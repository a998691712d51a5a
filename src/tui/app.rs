//! TUI application state and logic

use crate::catalog::filter_by_title;
use crate::model::{Sci, Site};
use crate::render::{render_document, ViewMode};
use crate::store::StoreError;
use crossterm::event::{KeyCode, KeyEvent};
use tracing::{debug, error, info};

/// Identifier of an issued document fetch, increasing with every request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

/// Fetch the event loop performs on behalf of the app
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Load the site summary
    LoadSites,
    /// Load the documents of one site
    LoadDocuments { request: RequestId, site_id: String },
}

/// A settled fetch, reported back to the app
#[derive(Debug)]
pub enum FetchResult {
    Sites(Result<Vec<Site>, StoreError>),
    Documents {
        request: RequestId,
        result: Result<Vec<Sci>, StoreError>,
    },
}

/// What the event loop should do after a key press
#[derive(Debug, PartialEq, Eq)]
pub enum Effect {
    None,
    Fetch(Command),
    Quit,
}

/// Documents of the selected site
#[derive(Debug, Clone)]
pub struct DocumentList {
    /// Selected site
    pub site: Site,
    /// Fetch whose result this list accepts
    pub request: RequestId,
    /// Fetched documents, `None` while loading
    pub documents: Option<Vec<Sci>>,
    /// Title search term
    pub search: String,
    /// Whether key presses edit the search term
    pub searching: bool,
    /// Index into the filtered documents
    pub selected: usize,
}

impl DocumentList {
    fn new(site: Site, request: RequestId) -> Self {
        Self {
            site,
            request,
            documents: None,
            search: String::new(),
            searching: false,
            selected: 0,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.documents.is_none()
    }

    /// Number of fetched documents, before filtering
    pub fn total(&self) -> usize {
        self.documents.as_ref().map_or(0, Vec::len)
    }

    /// Documents matching the search term
    pub fn visible(&self) -> Vec<&Sci> {
        match self.documents {
            Some(ref docs) => filter_by_title(docs, &self.search),
            None => Vec::new(),
        }
    }
}

/// The screen currently shown; exactly one at a time
#[derive(Debug, Clone)]
pub enum Screen {
    /// Waiting for the site summary
    Loading,
    /// Site cards
    Sites { selected: usize },
    /// Document cards of one site
    Documents(DocumentList),
    /// A single document; the list is kept for the way back
    Detail {
        list: DocumentList,
        document: Box<Sci>,
        scroll: u16,
        /// Rendered line count, the same in every mode
        lines: u16,
    },
}

/// Main TUI application
pub struct App {
    /// Current screen
    pub screen: Screen,
    /// Site summary, fetched once
    pub sites: Vec<Site>,
    /// Presentation mode of the detail view
    pub mode: ViewMode,
    /// Whether the help overlay is shown
    pub show_help: bool,
    /// Animation tick for loading indicators
    pub tick: usize,
    next_request: u64,
}

impl App {
    /// Create a new app in the loading state
    pub fn new(mode: ViewMode) -> Self {
        Self {
            screen: Screen::Loading,
            sites: Vec::new(),
            mode,
            show_help: false,
            tick: 0,
            next_request: 0,
        }
    }

    /// Fetch to issue when the app starts
    pub fn start(&self) -> Command {
        Command::LoadSites
    }

    /// Advance loading animations
    pub fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    /// Handle a key event
    pub fn handle_key(&mut self, key: KeyEvent) -> Effect {
        if self.show_help {
            self.show_help = false;
            return Effect::None;
        }

        if let Screen::Documents(ref mut list) = self.screen {
            if list.searching {
                Self::handle_search_key(list, key);
                return Effect::None;
            }
        }

        if key.code == KeyCode::Char('?') {
            self.show_help = true;
            return Effect::None;
        }

        match self.screen {
            Screen::Loading => self.handle_loading_key(key),
            Screen::Sites { .. } => self.handle_sites_key(key),
            Screen::Documents(_) => self.handle_documents_key(key),
            Screen::Detail { .. } => self.handle_detail_key(key),
        }
    }

    /// Handle keys while the site summary loads
    fn handle_loading_key(&mut self, key: KeyEvent) -> Effect {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Effect::Quit,
            _ => Effect::None,
        }
    }

    /// Handle keys in site selection
    fn handle_sites_key(&mut self, key: KeyEvent) -> Effect {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Effect::Quit,
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Enter => {
                if let Screen::Sites { selected } = self.screen {
                    if let Some(command) = self.select_site(selected) {
                        return Effect::Fetch(command);
                    }
                }
            }
            _ => {}
        }
        Effect::None
    }

    /// Handle keys in the document list
    fn handle_documents_key(&mut self, key: KeyEvent) -> Effect {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc | KeyCode::Backspace => self.back(),
            KeyCode::Char('/') => {
                if let Screen::Documents(ref mut list) = self.screen {
                    list.searching = true;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Enter => {
                if let Screen::Documents(ref list) = self.screen {
                    let selected = list.selected;
                    self.open_document(selected);
                }
            }
            _ => {}
        }
        Effect::None
    }

    /// Handle keys while editing the search term
    fn handle_search_key(list: &mut DocumentList, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => list.searching = false,
            KeyCode::Backspace => {
                list.search.pop();
                list.selected = 0;
            }
            KeyCode::Char(c) => {
                list.search.push(c);
                list.selected = 0;
            }
            _ => {}
        }
    }

    /// Handle keys in the detail view
    fn handle_detail_key(&mut self, key: KeyEvent) -> Effect {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc | KeyCode::Backspace => self.back(),
            KeyCode::Tab | KeyCode::Char('m') => self.set_mode(self.mode.next()),
            KeyCode::Char('1') => self.set_mode(ViewMode::Classic),
            KeyCode::Char('2') => self.set_mode(ViewMode::Elegant),
            KeyCode::Char('3') => self.set_mode(ViewMode::Opus),
            KeyCode::Up | KeyCode::Char('k') => self.scroll(-1),
            KeyCode::Down | KeyCode::Char('j') => self.scroll(1),
            KeyCode::PageUp => self.scroll(-10),
            KeyCode::PageDown => self.scroll(10),
            _ => {}
        }
        Effect::None
    }

    /// Select a site by index and request its documents
    pub fn select_site(&mut self, index: usize) -> Option<Command> {
        let site = self.sites.get(index)?.clone();

        self.next_request += 1;
        let request = RequestId(self.next_request);
        let command = Command::LoadDocuments {
            request,
            site_id: site.id.clone(),
        };

        info!("Opening site {} ({})", site.name, site.id);
        self.screen = Screen::Documents(DocumentList::new(site, request));
        Some(command)
    }

    /// Open a document by its index among the visible documents
    pub fn open_document(&mut self, index: usize) {
        let screen = std::mem::replace(&mut self.screen, Screen::Loading);
        self.screen = match screen {
            Screen::Documents(list) => {
                let document = list.visible().get(index).map(|sci| (*sci).clone());
                match document {
                    Some(document) => {
                        let view = render_document(&document, &list.site.name, self.mode);
                        let lines = u16::try_from(super::ui::document_lines(&view).len())
                            .unwrap_or(u16::MAX);
                        Screen::Detail {
                            list,
                            document: Box::new(document),
                            scroll: 0,
                            lines,
                        }
                    }
                    None => Screen::Documents(list),
                }
            }
            other => other,
        };
    }

    /// Return to the previous screen
    ///
    /// Leaving a document keeps the fetched list; leaving a list discards it.
    pub fn back(&mut self) {
        let screen = std::mem::replace(&mut self.screen, Screen::Loading);
        self.screen = match screen {
            Screen::Detail { list, .. } => Screen::Documents(list),
            Screen::Documents(list) => Screen::Sites {
                selected: self
                    .sites
                    .iter()
                    .position(|s| s.id == list.site.id)
                    .unwrap_or(0),
            },
            other => other,
        };
    }

    /// Replace the search term of the document list
    pub fn set_search(&mut self, term: &str) {
        if let Screen::Documents(ref mut list) = self.screen {
            list.search = term.to_string();
            list.selected = 0;
        }
    }

    /// Switch the presentation mode
    pub fn set_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
    }

    /// Apply a settled fetch to the current state
    pub fn apply_fetch(&mut self, result: FetchResult) {
        match result {
            FetchResult::Sites(result) => {
                self.sites = result.unwrap_or_else(|e| {
                    error!("Failed to fetch sites: {}", e);
                    Vec::new()
                });
                if matches!(self.screen, Screen::Loading) {
                    self.screen = Screen::Sites { selected: 0 };
                }
            }
            FetchResult::Documents { request, result } => match self.screen {
                Screen::Documents(ref mut list) if list.request == request => {
                    let documents = result.unwrap_or_else(|e| {
                        error!("Failed to fetch SCIs for {}: {}", list.site.id, e);
                        Vec::new()
                    });
                    list.documents = Some(documents);
                    list.selected = 0;
                }
                _ => debug!("Discarding stale document fetch {:?}", request),
            },
        }
    }

    /// Move the cursor of the current list
    fn move_selection(&mut self, delta: isize) {
        let (selected, len) = match self.screen {
            Screen::Sites { ref mut selected } => (selected, self.sites.len()),
            Screen::Documents(ref mut list) => {
                let len = list.visible().len();
                (&mut list.selected, len)
            }
            _ => return,
        };

        if len == 0 {
            *selected = 0;
        } else {
            *selected = selected.saturating_add_signed(delta).min(len - 1);
        }
    }

    /// Scroll the detail view, keeping the last line on screen
    fn scroll(&mut self, delta: i16) {
        if let Screen::Detail {
            ref mut scroll,
            lines,
            ..
        } = self.screen
        {
            *scroll = scroll
                .saturating_add_signed(delta)
                .min(lines.saturating_sub(1));
        }
    }

    /// Site owning the screen, if any
    pub fn current_site(&self) -> Option<&Site> {
        match self.screen {
            Screen::Documents(ref list) | Screen::Detail { ref list, .. } => Some(&list.site),
            _ => None,
        }
    }
}
