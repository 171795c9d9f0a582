//! The list + filters + detail controller behind every management page.

use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;

use crate::{
    error::ApiError,
    notice::{Notice, Notifier},
    resources::{GatewayState, Operation, ReferenceData, Resource, ensure_supported},
};

pub mod debounce;
pub mod query;

pub use debounce::Debouncer;
pub use query::ListQuery;

/// Confirm
///
/// The explicit user confirmation that must precede a delete. `Sync` so a pending delete
/// can move between tasks.
pub trait Confirm: Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool + Sync> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Result of a create/update/delete issued through the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The server accepted the change and the list has been re-fetched.
    Applied,
    /// The user declined the confirmation; nothing was sent.
    Cancelled,
    /// The server (or the network) refused, or the resource has no such operation. Carries
    /// the message shown to the user.
    Failed(String),
}

/// ListState
///
/// What a page renders. Snapshots are taken with `ListDetailController::state`.
pub struct ListState<R: Resource> {
    pub items: Vec<R::Summary>,
    pub reference: ReferenceData,
    pub query: ListQuery,
    pub loading: bool,
    /// At least one list fetch has succeeded; from then on failures keep the stale rows.
    pub loaded: bool,
    /// Only set when the very first load failed and there is nothing to fall back to.
    pub error: Option<String>,
    pub selected: Option<R::Id>,
    pub detail: Option<R::Detail>,
    pub detail_loading: bool,
}

impl<R: Resource> Default for ListState<R> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            reference: ReferenceData::default(),
            query: ListQuery::default(),
            loading: false,
            loaded: false,
            error: None,
            selected: None,
            detail: None,
            detail_loading: false,
        }
    }
}

impl<R: Resource> Clone for ListState<R> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            reference: self.reference.clone(),
            query: self.query.clone(),
            loading: self.loading,
            loaded: self.loaded,
            error: self.error.clone(),
            selected: self.selected.clone(),
            detail: self.detail.clone(),
            detail_loading: self.detail_loading,
        }
    }
}

struct Inner<R: Resource> {
    gateway: GatewayState<R>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<ListState<R>>,
    // Every list fetch takes the next number; only the newest may write the rows.
    list_generation: AtomicU64,
    detail_generation: AtomicU64,
    debouncer: Debouncer,
    closed: AtomicBool,
    revision: watch::Sender<u64>,
}

impl<R: Resource> Inner<R> {
    fn touch(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Marks the list as loading and tags the fetch about to start.
    fn begin_list(&self) -> (u64, ListQuery) {
        let query = {
            let mut state = self.state.lock();
            state.loading = true;
            state.query.clone()
        };
        let generation = self.list_generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.touch();
        (generation, query)
    }

    fn finish_list(&self, generation: u64, result: Result<Vec<R::Summary>, ApiError>) {
        if self.is_closed() {
            tracing::debug!(resource = R::NAME, "list response arrived after teardown, ignored");
            return;
        }
        if generation != self.list_generation.load(Ordering::SeqCst) {
            tracing::debug!(resource = R::NAME, generation, "stale list response discarded");
            return;
        }

        let failure = {
            let mut state = self.state.lock();
            state.loading = false;
            match result {
                Ok(items) => {
                    state.items = items;
                    state.loaded = true;
                    state.error = None;
                    None
                }
                Err(e) => {
                    let message = e.user_message(&format!("Could not load {}.", R::NAME));
                    if !state.loaded {
                        state.items.clear();
                        state.error = Some(message.clone());
                    }
                    Some(message)
                }
            }
        };

        if let Some(message) = failure {
            self.notifier.notify(Notice::error(message));
        }
        self.touch();
    }

    async fn refresh(&self) {
        let (generation, query) = self.begin_list();
        let result = self.gateway.list(&query).await;
        self.finish_list(generation, result);
    }
}

/// ListDetailController
///
/// One instance per mounted page, parameterised by the page's `Resource`.
///
/// * Mount loads the filter reference data and the first page of rows concurrently.
/// * Free-text search is debounced; filter changes and "clear filters" fetch immediately.
/// * Every fetch sends the full query and is tagged with a generation number, so a slow
///   response can never overwrite a newer one.
/// * Mutations re-fetch the list with the active filters on success; failures leave the rows
///   untouched and surface the server's reason through the notifier.
/// * Dropping the controller (or calling `shutdown`) cancels the pending search and makes any
///   in-flight response a no-op.
pub struct ListDetailController<R: Resource> {
    inner: Arc<Inner<R>>,
}

impl<R: Resource> ListDetailController<R> {
    pub fn new(gateway: GatewayState<R>, notifier: Arc<dyn Notifier>, debounce: Duration) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                gateway,
                notifier,
                state: Mutex::new(ListState::default()),
                list_generation: AtomicU64::new(0),
                detail_generation: AtomicU64::new(0),
                debouncer: Debouncer::new(debounce),
                closed: AtomicBool::new(false),
                revision,
            }),
        }
    }

    /// Starts from a non-default query, e.g. a page size.
    pub fn with_query(self, query: ListQuery) -> Self {
        self.inner.state.lock().query = query;
        self
    }

    pub fn state(&self) -> ListState<R> {
        self.inner.state.lock().clone()
    }

    pub fn query(&self) -> ListQuery {
        self.inner.state.lock().query.clone()
    }

    /// A receiver that ticks on every state change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    /// mount
    ///
    /// Fetches the reference data and the initial list at the same time and returns once
    /// both have resolved.
    pub async fn mount(&self) {
        let (generation, query) = self.inner.begin_list();
        let (reference, list) = tokio::join!(
            self.inner.gateway.reference_data(),
            self.inner.gateway.list(&query)
        );

        if self.inner.is_closed() {
            return;
        }

        match reference {
            Ok(reference) => self.inner.state.lock().reference = reference,
            Err(e) => self
                .inner
                .notifier
                .notify(Notice::error(e.user_message("Could not load filter options."))),
        }
        self.inner.finish_list(generation, list);
    }

    /// set_search
    ///
    /// Records the search text and schedules a debounced fetch. A keystroke inside the delay
    /// window replaces the pending fetch; the one that finally fires reads the query at that
    /// moment, so it always carries the latest text.
    pub fn set_search(&self, text: &str) {
        self.inner.state.lock().query.search = text.to_string();
        self.inner.touch();

        let inner = Arc::clone(&self.inner);
        self.inner.debouncer.schedule(async move {
            inner.refresh().await;
        });
    }

    /// set_filter
    ///
    /// Selects a filter value (empty clears it) and fetches immediately with the full query.
    /// A pending debounced search is dropped: this fetch already carries the current text.
    pub async fn set_filter(&self, key: &str, value: &str) {
        if !R::FILTER_KEYS.contains(&key) {
            tracing::warn!(resource = R::NAME, key, "ignoring unknown filter");
            return;
        }
        self.inner.state.lock().query.set_filter(key, value);
        self.inner.debouncer.cancel();
        self.inner.refresh().await;
    }

    /// clear_filters
    ///
    /// Resets the search text and every filter in one update, then fetches exactly once.
    pub async fn clear_filters(&self) {
        self.inner.state.lock().query.clear();
        self.inner.debouncer.cancel();
        self.inner.refresh().await;
    }

    /// Re-fetches the list with the current query.
    pub async fn refresh(&self) {
        self.inner.refresh().await;
    }

    /// select
    ///
    /// Loads one entity's full detail. Independent of the list: the rows are not re-fetched.
    /// If another row is selected before this one resolves, this response is dropped.
    /// Resources without a detail endpoint leave the selection alone and raise a notice.
    pub async fn select(&self, id: R::Id) {
        if let Err(e) = ensure_supported::<R>(Operation::Detail) {
            self.inner
                .notifier
                .notify(Notice::error(e.user_message("Could not load the selected record.")));
            return;
        }
        let generation = self.inner.detail_generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.inner.state.lock();
            state.selected = Some(id.clone());
            state.detail_loading = true;
        }
        self.inner.touch();

        let result = self.inner.gateway.detail(&id).await;

        if self.inner.is_closed()
            || generation != self.inner.detail_generation.load(Ordering::SeqCst)
        {
            return;
        }

        let failure = {
            let mut state = self.inner.state.lock();
            state.detail_loading = false;
            match result {
                Ok(detail) => {
                    state.detail = Some(detail);
                    None
                }
                Err(e) => Some(e.user_message("Could not load the selected record.")),
            }
        };
        if let Some(message) = failure {
            self.inner.notifier.notify(Notice::error(message));
        }
        self.inner.touch();
    }

    pub fn clear_selection(&self) {
        {
            let mut state = self.inner.state.lock();
            state.selected = None;
            state.detail = None;
            state.detail_loading = false;
        }
        self.inner.detail_generation.fetch_add(1, Ordering::SeqCst);
        self.inner.touch();
    }

    pub async fn create(&self, input: &R::Create) -> MutationOutcome {
        let result = self.inner.gateway.create(input).await;
        self.after_mutation(result, "Created.", "Could not save the new record.")
            .await
    }

    pub async fn update(&self, key: &R::UpdateKey, input: &R::Update) -> MutationOutcome {
        let result = self.inner.gateway.update(key, input).await;
        self.after_mutation(result, "Changes saved.", "Could not save the changes.")
            .await
    }

    /// delete
    ///
    /// Asks `confirm` first and sends nothing if the user declines. A refusal from the server
    /// (e.g. a record still referenced elsewhere) is shown verbatim and changes nothing locally.
    /// Deleting the selected row also clears the selection.
    pub async fn delete(&self, id: &R::Id, label: &str, confirm: &dyn Confirm) -> MutationOutcome {
        let fallback = format!("Could not delete \"{label}\".");
        if let Err(e) = ensure_supported::<R>(Operation::Delete) {
            return self.after_mutation(Err(e), "Deleted.", &fallback).await;
        }

        let prompt = format!("Delete \"{label}\" (ID: {id})?");
        if !confirm.confirm(&prompt) {
            return MutationOutcome::Cancelled;
        }
        let result = self.inner.gateway.delete(id).await;

        if result.is_ok() {
            let was_selected = self.inner.state.lock().selected.as_ref() == Some(id);
            if was_selected {
                self.clear_selection();
            }
        }
        self.after_mutation(result, "Deleted.", &fallback).await
    }

    async fn after_mutation(
        &self,
        result: Result<(), ApiError>,
        success: &str,
        fallback: &str,
    ) -> MutationOutcome {
        match result {
            Ok(()) => {
                self.inner.notifier.notify(Notice::success(success));
                self.inner.refresh().await;
                MutationOutcome::Applied
            }
            Err(e) => {
                let message = e.user_message(fallback);
                tracing::warn!(resource = R::NAME, "mutation rejected: {}", e);
                self.inner.notifier.notify(Notice::error(message.clone()));
                MutationOutcome::Failed(message)
            }
        }
    }

    /// Tears the controller down: the pending search is cancelled and responses still in
    /// flight will be ignored when they land.
    pub fn shutdown(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        self.inner.debouncer.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.is_closed()
    }
}

impl<R: Resource> Drop for ListDetailController<R> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
