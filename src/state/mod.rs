use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::sync::mpsc;

use crate::debounce::{Debouncer, Settled, DEBOUNCE_WINDOW};
use crate::fetch::RecordSource;
use crate::filter::{filter_records, Criteria, SearchField, StatusFilter};
use crate::pagination::{self, PageView, PAGE_SIZE};
use crate::record::{normalize_records, Record};

/// Shown to the user when the dataset could not be loaded.
pub const LOAD_ERROR_MESSAGE: &str = "Failed to load food trucks";

#[derive(Clone, Debug)]
pub enum LoadState {
    Loading,
    Ready(Arc<[Record]>),
    Error(String),
}

/// The user-controlled view parameters. Never mutated in place: every event
/// produces a new snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryState {
    pub search_field: SearchField,
    pub raw_search: String,
    pub effective_search: String,
    pub status: StatusFilter,
    pub page: usize,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            search_field: SearchField::default(),
            raw_search: String::new(),
            effective_search: String::new(),
            status: StatusFilter::default(),
            page: 1,
        }
    }
}

impl QueryState {
    /// A snapshot whose search text is already in effect.
    pub fn new(search_field: SearchField, search: impl Into<String>, status: StatusFilter) -> Self {
        let search = search.into();
        Self {
            search_field,
            raw_search: search.clone(),
            effective_search: search,
            status,
            page: 1,
        }
    }

    pub fn criteria(&self) -> Criteria<'_> {
        Criteria {
            field: self.search_field,
            term: &self.effective_search,
            status: self.status,
        }
    }

    /// Switching fields clears the typed text.
    pub fn with_search_field(&self, search_field: SearchField) -> Self {
        Self {
            search_field,
            raw_search: String::new(),
            page: 1,
            ..self.clone()
        }
    }

    pub fn with_raw_search(&self, raw_search: impl Into<String>) -> Self {
        Self {
            raw_search: raw_search.into(),
            page: 1,
            ..self.clone()
        }
    }

    pub fn with_effective_search(&self, effective_search: impl Into<String>) -> Self {
        Self {
            effective_search: effective_search.into(),
            page: 1,
            ..self.clone()
        }
    }

    pub fn with_status(&self, status: StatusFilter) -> Self {
        Self {
            status,
            page: 1,
            ..self.clone()
        }
    }

    pub fn with_page(&self, page: usize, total_pages: usize) -> Self {
        Self {
            page: pagination::clamp_page(page, total_pages),
            ..self.clone()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    SetSearchField(SearchField),
    SetSearchText(String),
    SetStatus(StatusFilter),
    NextPage,
    PreviousPage,
    GoToPage(usize),
    Reload,
    Quit,
}

/// What the caller should do after an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Throw the session away and start over from the fetch.
    Reload,
    Quit,
}

/// The filtered set for the current query.
#[derive(Debug)]
pub struct Listing<'a> {
    pub query: &'a QueryState,
    pub matches: Vec<&'a Record>,
}

impl<'a> Listing<'a> {
    pub fn total_pages(&self) -> usize {
        pagination::total_pages(self.matches.len(), PAGE_SIZE)
    }

    pub fn page(&self) -> PageView<'_, &'a Record> {
        let page = pagination::clamp_page(self.query.page, self.total_pages());
        pagination::paginate(&self.matches, page, PAGE_SIZE)
    }
}

#[derive(Debug)]
pub enum Screen<'a> {
    Loading,
    Error(&'a str),
    Ready(Listing<'a>),
}

/// One load of the dataset and everything the user does with it.
///
/// Dropping the session cancels a pending search update.
pub struct Session {
    load: LoadState,
    query: QueryState,
    debouncer: Debouncer<String>,
    settled: mpsc::UnboundedReceiver<Settled<String>>,
}

impl Session {
    pub fn new(query: QueryState) -> Self {
        Self::with_window(query, DEBOUNCE_WINDOW)
    }

    pub fn with_window(query: QueryState, window: Duration) -> Self {
        let (debouncer, settled) = Debouncer::new(window);
        Self {
            load: LoadState::Loading,
            query,
            debouncer,
            settled,
        }
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn records(&self) -> Option<&[Record]> {
        match &self.load {
            LoadState::Ready(records) => Some(records.as_ref()),
            _ => None,
        }
    }

    pub fn search_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Fetches and normalizes the dataset. Only the first call has any
    /// effect; a session never leaves `Ready` or `Error`.
    pub async fn load<S: RecordSource>(&mut self, source: &S) {
        if !matches!(self.load, LoadState::Loading) {
            warn!("ignoring load request, dataset already settled");
            return;
        }
        self.load = match source.fetch_records().await {
            Ok(values) => {
                let records = normalize_records(values);
                info!("loaded {} permits", records.len());
                LoadState::Ready(records.into())
            }
            Err(e) => {
                error!("{e}");
                LoadState::Error(LOAD_ERROR_MESSAGE.to_string())
            }
        };
    }

    pub fn dispatch(&mut self, action: Action) -> Flow {
        let total_pages = match self.screen() {
            Screen::Ready(listing) => Some(listing.total_pages()),
            _ => None,
        };
        let query = &self.query;
        let next = match (action, total_pages) {
            (Action::Quit, _) => return Flow::Quit,
            (Action::Reload, _) => {
                self.debouncer.cancel();
                return Flow::Reload;
            }
            (action, None) => {
                debug!("ignoring {action:?} while the dataset is not ready");
                return Flow::Continue;
            }
            (Action::SetSearchField(field), Some(_)) => {
                let next = query.with_search_field(field);
                if next.raw_search != query.raw_search {
                    self.debouncer.schedule(next.raw_search.clone());
                }
                next
            }
            (Action::SetSearchText(text), Some(_)) => {
                if text != query.raw_search {
                    self.debouncer.schedule(text.clone());
                }
                query.with_raw_search(text)
            }
            (Action::SetStatus(status), Some(_)) => query.with_status(status),
            (Action::NextPage, Some(total)) => {
                query.with_page(pagination::next_page(query.page, total), total)
            }
            (Action::PreviousPage, Some(total)) => {
                query.with_page(pagination::previous_page(query.page), total)
            }
            (Action::GoToPage(page), Some(total)) => query.with_page(page, total),
        };
        debug!("query -> {next:?}");
        self.query = next;
        Flow::Continue
    }

    /// Waits for the debounced search text. Pending forever while nothing is
    /// scheduled, which makes it safe to use as a `select!` branch.
    pub async fn next_settled(&mut self) -> Option<Settled<String>> {
        self.settled.recv().await
    }

    /// Applies a debounced search text; returns whether the query changed.
    pub fn apply_settled(&mut self, settled: Settled<String>) -> bool {
        let Some(term) = self.debouncer.settle(settled) else {
            return false;
        };
        if self.records().is_none() {
            return false;
        }
        debug!("search term settled: {term:?}");
        self.query = self.query.with_effective_search(term);
        true
    }

    pub fn screen(&self) -> Screen<'_> {
        match &self.load {
            LoadState::Loading => Screen::Loading,
            LoadState::Error(message) => Screen::Error(message.as_str()),
            LoadState::Ready(records) => Screen::Ready(Listing {
                query: &self.query,
                matches: filter_records(records, &self.query.criteria()),
            }),
        }
    }
}
