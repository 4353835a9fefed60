//! List-view search state machine.
//!
//! A [`SearchOrchestrator`] owns one list's [`SearchRequest`], re-fetches
//! through a [`PageSource`] whenever the request changes, and publishes the
//! resulting [`SearchState`] on a `watch` channel. Every fetch is numbered;
//! only the newest one may write state, and starting a fetch aborts the
//! previous one.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::runtime::Handle;
use tokio::sync::watch;

use crate::domain::envelope::ResponseEnvelope;
use crate::domain::page::Page;
use crate::domain::search::{FilterValue, SearchRequest, SortDirection};
use crate::errors::{ErrorEnvelope, ErrorKind};
use crate::models::auth::TokenProvider;
use crate::pagination::{PageLinks, PaginationState};
use crate::proxy::{
    AbortHandle, AbortSignal, HttpMethod, ProxyRequestExecutor, RequestOptions, Transport,
};
use crate::query;
use crate::resources::{Action, ResourceConfig};

/// When keyword edits reach the upstream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SearchTrigger {
    /// Every keyword change fetches at once.
    #[default]
    Immediate,
    /// Keyword changes fetch after this much quiet time.
    Debounced(Duration),
    /// Keyword changes wait for [`SearchOrchestrator::search`].
    Explicit,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SearchPhase {
    #[default]
    Idle,
    Loading,
    Loaded,
    Errored,
}

/// Snapshot of one list view.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchState<T> {
    pub search_request: SearchRequest,
    pub items: Vec<T>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub pagination: PaginationState,
    pub phase: SearchPhase,
}

impl<T> SearchState<T> {
    fn new(search_request: SearchRequest) -> Self {
        let pagination = PaginationState::empty(search_request.page_size);
        Self {
            search_request,
            items: Vec::new(),
            is_loading: false,
            error: None,
            pagination,
            phase: SearchPhase::Idle,
        }
    }

    /// Link window for a pager widget, built from the 1-based request index.
    pub fn page_links(&self) -> PageLinks {
        PageLinks::new(self.search_request.page_index, self.pagination.total_pages)
    }

    fn start_loading(&mut self) {
        self.is_loading = true;
        self.phase = SearchPhase::Loading;
    }

    fn apply(&mut self, envelope: ResponseEnvelope<Page<T>>) {
        self.is_loading = false;
        match envelope.into_result() {
            Ok(page) => {
                self.pagination = PaginationState::from_page(&page);
                self.items = page.content;
                self.error = None;
                self.phase = SearchPhase::Loaded;
            }
            Err(error) => {
                self.items = Vec::new();
                self.pagination = PaginationState::empty(self.search_request.page_size);
                self.error = Some(error.message);
                self.phase = SearchPhase::Errored;
            }
        }
    }
}

/// Produces one page for a request.
pub trait PageSource<T>: Send + Sync + 'static {
    fn fetch_page(
        &self,
        request: SearchRequest,
        signal: AbortSignal,
    ) -> impl Future<Output = ResponseEnvelope<Page<T>>> + Send;
}

/// [`PageSource`] backed by a configured resource's search endpoint.
pub struct ResourceSource<X, P> {
    executor: Arc<ProxyRequestExecutor<X>>,
    resource: ResourceConfig,
    tokens: P,
}

impl<X, P> ResourceSource<X, P> {
    pub fn new(
        executor: Arc<ProxyRequestExecutor<X>>,
        resource: ResourceConfig,
        tokens: P,
    ) -> Self {
        Self {
            executor,
            resource,
            tokens,
        }
    }
}

impl<T, X, P> PageSource<T> for ResourceSource<X, P>
where
    T: DeserializeOwned + Send + 'static,
    X: Transport + 'static,
    P: TokenProvider + Send + Sync + 'static,
{
    async fn fetch_page(
        &self,
        request: SearchRequest,
        signal: AbortSignal,
    ) -> ResponseEnvelope<Page<T>> {
        let endpoint = self.resource.search_endpoint(&query::encode(&request));
        let options = RequestOptions::new(self.resource.success_message(Action::Search))
            .require_auth(self.resource.requires_auth(Action::Search))
            .abort(signal);

        let envelope = self
            .executor
            .execute(HttpMethod::Get, &endpoint, None, &self.tokens, options)
            .await;

        let message = envelope.message.clone();
        match envelope.into_result() {
            Ok(data) => match serde_json::from_value::<Page<T>>(data) {
                Ok(page) => ResponseEnvelope::ok(page, message),
                Err(err) => {
                    log::error!("Unexpected page shape from {endpoint}: {err}");
                    ErrorEnvelope::new(ErrorKind::DefaultError)
                        .with_message("Invalid response from upstream service")
                        .into()
                }
            },
            Err(error) => error.into(),
        }
    }
}

#[derive(Default)]
struct Control {
    sequence: u64,
    in_flight: Option<AbortHandle>,
}

/// Search, filter, sort and paging handlers for one list view.
///
/// Handlers spawn fetches on the runtime passed to [`new`](Self::new), so
/// they may be called from any thread.
pub struct SearchOrchestrator<T, S> {
    runtime: Handle,
    source: Arc<S>,
    trigger: SearchTrigger,
    state: Arc<watch::Sender<SearchState<T>>>,
    control: Arc<Mutex<Control>>,
    _items: PhantomData<fn() -> T>,
}

impl<T, S> SearchOrchestrator<T, S>
where
    T: Clone + Send + Sync + 'static,
    S: PageSource<T>,
{
    /// Idle orchestrator; call [`load`](Self::load) for the first fetch.
    pub fn new(
        runtime: Handle,
        source: S,
        initial: SearchRequest,
        trigger: SearchTrigger,
    ) -> Self {
        let (state, _) = watch::channel(SearchState::new(initial));
        Self {
            runtime,
            source: Arc::new(source),
            trigger,
            state: Arc::new(state),
            control: Arc::new(Mutex::new(Control::default())),
            _items: PhantomData,
        }
    }

    pub fn state(&self) -> SearchState<T> {
        self.state.borrow().clone()
    }

    pub fn request(&self) -> SearchRequest {
        self.state.borrow().search_request.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState<T>> {
        self.state.subscribe()
    }

    pub fn load(&self) {
        self.dispatch(None);
    }

    /// Re-issues the current request unchanged.
    pub fn refresh(&self) {
        self.dispatch(None);
    }

    /// Explicit search: back to the first page, keep everything else.
    pub fn search(&self) {
        self.update(SearchRequest::first_page);
        self.dispatch(None);
    }

    /// Updates the keyword without resetting the page.
    pub fn set_keyword(&self, keyword: &str) {
        self.update(|request| request.keyword(keyword));
        match self.trigger {
            SearchTrigger::Immediate => self.dispatch(None),
            SearchTrigger::Debounced(delay) => self.dispatch(Some(delay)),
            SearchTrigger::Explicit => {}
        }
    }

    /// Moves to the 1-based `page_index`.
    pub fn set_page(&self, page_index: u32) {
        self.update(|request| request.page(page_index));
        self.dispatch(None);
    }

    pub fn set_page_size(&self, page_size: u32) {
        self.update(|request| request.page_size(page_size).first_page());
        self.dispatch(None);
    }

    pub fn set_filter(&self, key: &str, value: impl Into<FilterValue>) {
        let value = value.into();
        self.update(|request| request.filter(key, value).first_page());
        self.dispatch(None);
    }

    /// Sorts by `field`; direction defaults to ascending.
    pub fn set_sort(&self, field: &str, direction: Option<SortDirection>) {
        let direction = direction.unwrap_or_default();
        self.update(|request| request.sort(field, direction).first_page());
        self.dispatch(None);
    }

    fn update(&self, change: impl FnOnce(SearchRequest) -> SearchRequest) {
        self.state.send_modify(|state| {
            state.search_request = change(state.search_request.clone());
        });
    }

    fn dispatch(&self, delay: Option<Duration>) {
        let (handle, signal) = AbortHandle::pair();

        let (sequence, request) = {
            let mut control = lock(&self.control);
            if let Some(previous) = control.in_flight.replace(handle) {
                previous.abort();
            }
            control.sequence += 1;

            let mut request = None;
            self.state.send_modify(|state| {
                state.start_loading();
                request = Some(state.search_request.clone());
            });
            (control.sequence, request.unwrap_or_default())
        };

        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);
        let control = Arc::clone(&self.control);

        self.runtime.spawn(async move {
            if let Some(delay) = delay {
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = signal.aborted() => return,
                }
            }

            let envelope = source.fetch_page(request, signal).await;

            let control = lock(&control);
            if control.sequence != sequence {
                log::debug!(
                    "Discarding stale search result #{sequence}, latest is #{}",
                    control.sequence
                );
                return;
            }
            if !envelope.success {
                log::warn!("Search failed: {}", envelope.message);
            }
            state.send_modify(|state| state.apply(envelope));
        });
    }
}

impl<T, S> Drop for SearchOrchestrator<T, S> {
    fn drop(&mut self) {
        if let Some(in_flight) = lock(&self.control).in_flight.take() {
            in_flight.abort();
        }
    }
}

fn lock(control: &Mutex<Control>) -> MutexGuard<'_, Control> {
    control.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
