//! Client side state of the book summary app.
//!
//! Search and summary fetching are tracked independently. Every dispatch takes
//! a new request token for its concern and a response is only committed while
//! its token is still the latest one, so a slow stale response can never
//! overwrite the result of a newer request.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;

use booksummary_api::api::{BookSearchResult, BookSummary};

use crate::summary_api::SummaryApi;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SummaryState {
    pub current_book: Option<BookSummary>,
    pub search_results: Vec<BookSearchResult>,
    pub search_status: RequestStatus,
    pub search_error: Option<String>,
    pub summary_status: RequestStatus,
    pub summary_error: Option<String>,
}

impl SummaryState {
    pub fn is_searching(&self) -> bool {
        self.search_status == RequestStatus::Pending
    }

    pub fn is_loading(&self) -> bool {
        self.summary_status == RequestStatus::Pending
    }
}

#[derive(Default)]
struct StoreInner {
    state: SummaryState,
    latest_search: u64,
    latest_summary: u64,
}

#[derive(Clone)]
pub struct SummaryStore {
    inner: Arc<RwLock<StoreInner>>,
    api: Arc<dyn SummaryApi + Send + Sync>,
    changes: Arc<watch::Sender<u64>>,
}

impl SummaryStore {
    pub fn new(api: Arc<dyn SummaryApi + Send + Sync>) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            inner: Arc::new(Default::default()),
            api,
            changes: Arc::new(changes),
        }
    }

    pub fn snapshot(&self) -> SummaryState {
        self.inner.read().state.clone()
    }

    /// Receiver whose value (a revision counter) changes after every state update
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    pub async fn search_books(&self, query: &str) {
        let token = self.update(|inner| {
            inner.latest_search += 1;
            inner.state.search_status = RequestStatus::Pending;
            inner.state.search_error = None;
            inner.latest_search
        });

        let result = self.api.search_books(query).await;

        self.update(|inner| {
            if inner.latest_search != token {
                tracing::debug!("Dropping stale search response {} for {:?}", token, query);
                return;
            }
            match result {
                Ok(books) => {
                    inner.state.search_results = books;
                    inner.state.search_status = RequestStatus::Succeeded;
                }
                Err(err) => {
                    tracing::warn!("Search for {:?} failed: {:#}", query, err);
                    inner.state.search_error = Some(err.to_string());
                    inner.state.search_status = RequestStatus::Failed;
                }
            }
        });
    }

    pub async fn fetch_summary(&self, book_title: &str) {
        let token = self.update(|inner| {
            inner.latest_summary += 1;
            inner.state.summary_status = RequestStatus::Pending;
            inner.state.summary_error = None;
            inner.latest_summary
        });

        let result = self.api.fetch_summary(book_title).await;

        self.update(|inner| {
            if inner.latest_summary != token {
                tracing::debug!(
                    "Dropping stale summary response {} for {:?}",
                    token,
                    book_title
                );
                return;
            }
            match result {
                Ok(summary) => {
                    inner.state.current_book = Some(summary);
                    inner.state.summary_status = RequestStatus::Succeeded;
                }
                Err(err) => {
                    tracing::warn!("Summary of {:?} failed: {:#}", book_title, err);
                    inner.state.summary_error = Some(err.to_string());
                    inner.state.summary_status = RequestStatus::Failed;
                }
            }
        });
    }

    /// Forgets the current book; a summary fetch still in flight will not be committed
    pub fn clear_summary(&self) {
        self.update(|inner| {
            inner.latest_summary += 1;
            inner.state.current_book = None;
            inner.state.summary_error = None;
            inner.state.summary_status = RequestStatus::Idle;
        });
    }

    fn update<T>(&self, apply: impl FnOnce(&mut StoreInner) -> T) -> T {
        let result = apply(&mut self.inner.write());
        self.changes.send_modify(|revision| *revision += 1);
        result
    }
}

#[cfg(test)]
mod store_tests {
    use std::collections::HashMap;

    use anyhow::anyhow;
    use parking_lot::Mutex;
    use tokio::sync::oneshot;

    use super::*;

    type Pending<T> = Mutex<HashMap<String, oneshot::Receiver<anyhow::Result<T>>>>;

    /// Api whose answers are released by the test through oneshot senders
    #[derive(Default)]
    struct ControlledApi {
        searches: Pending<Vec<BookSearchResult>>,
        summaries: Pending<BookSummary>,
    }

    impl ControlledApi {
        fn expect_search(&self, query: &str) -> oneshot::Sender<anyhow::Result<Vec<BookSearchResult>>> {
            let (sender, receiver) = oneshot::channel();
            self.searches.lock().insert(query.to_string(), receiver);
            sender
        }

        fn expect_summary(&self, title: &str) -> oneshot::Sender<anyhow::Result<BookSummary>> {
            let (sender, receiver) = oneshot::channel();
            self.summaries.lock().insert(title.to_string(), receiver);
            sender
        }
    }

    #[async_trait::async_trait]
    impl SummaryApi for ControlledApi {
        async fn search_books(&self, query: &str) -> anyhow::Result<Vec<BookSearchResult>> {
            let receiver = self
                .searches
                .lock()
                .remove(query)
                .ok_or_else(|| anyhow!("unexpected search {query}"))?;
            receiver.await?
        }

        async fn fetch_summary(&self, book_title: &str) -> anyhow::Result<BookSummary> {
            let receiver = self
                .summaries
                .lock()
                .remove(book_title)
                .ok_or_else(|| anyhow!("unexpected summary {book_title}"))?;
            receiver.await?
        }
    }

    fn book(title: &str) -> BookSearchResult {
        BookSearchResult {
            title: title.to_string(),
            author: "Author".to_string(),
            year: "2020".to_string(),
            pages: "200 pages".to_string(),
            rating: "4.0".to_string(),
            rating_count: "1k+ ratings".to_string(),
            tags: vec![],
            cover_image: None,
        }
    }

    fn summary(title: &str) -> BookSummary {
        BookSummary {
            title: title.to_string(),
            author: "Author".to_string(),
            year: None,
            read_time: None,
            cover_image: None,
            idea_in_brief: "Idea".to_string(),
            key_takeaways: vec!["Takeaway".to_string()],
            full_summary: None,
            plot_summary: None,
            characters: None,
            plot_devices: None,
            analysis: None,
            faq: None,
        }
    }

    fn store_with(api: &Arc<ControlledApi>) -> SummaryStore {
        SummaryStore::new(api.clone())
    }

    /// Waits until the dispatched action has reached its pending phase
    async fn until(store: &SummaryStore, condition: impl Fn(&SummaryState) -> bool) {
        let mut changes = store.subscribe();
        while !condition(&store.snapshot()) {
            changes.changed().await.expect("Store dropped");
        }
    }

    #[tokio::test]
    async fn test_search_goes_through_pending_to_succeeded() {
        let api = Arc::new(ControlledApi::default());
        let store = store_with(&api);
        assert_eq!(store.snapshot(), SummaryState::default());

        let release = api.expect_search("dune");
        let task = tokio::spawn({
            let store = store.clone();
            async move { store.search_books("dune").await }
        });
        until(&store, SummaryState::is_searching).await;
        assert_eq!(store.snapshot().search_error, None);

        release.send(Ok(vec![book("Dune")])).unwrap();
        task.await.unwrap();

        let state = store.snapshot();
        assert_eq!(state.search_status, RequestStatus::Succeeded);
        assert!(!state.is_searching());
        assert_eq!(state.search_results, vec![book("Dune")]);
    }

    #[tokio::test]
    async fn test_failure_stores_message_and_next_dispatch_clears_it() {
        let api = Arc::new(ControlledApi::default());
        let store = store_with(&api);

        api.expect_search("x")
            .send(Err(anyhow!("Query is required")))
            .unwrap();
        store.search_books("x").await;
        let state = store.snapshot();
        assert_eq!(state.search_status, RequestStatus::Failed);
        assert_eq!(state.search_error.as_deref(), Some("Query is required"));

        let release = api.expect_search("y");
        let task = tokio::spawn({
            let store = store.clone();
            async move { store.search_books("y").await }
        });
        until(&store, SummaryState::is_searching).await;
        assert_eq!(store.snapshot().search_error, None);
        release.send(Ok(vec![])).unwrap();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_stale_search_response_never_overwrites_newer_one() {
        let api = Arc::new(ControlledApi::default());
        let store = store_with(&api);

        let release_old = api.expect_search("old");
        let release_new = api.expect_search("new");

        let old = tokio::spawn({
            let store = store.clone();
            async move { store.search_books("old").await }
        });
        until(&store, SummaryState::is_searching).await;
        let new = tokio::spawn({
            let store = store.clone();
            async move { store.search_books("new").await }
        });
        // Both dispatched once the api has taken both receivers
        while !api.searches.lock().is_empty() {
            tokio::task::yield_now().await;
        }

        release_new.send(Ok(vec![book("New")])).unwrap();
        new.await.unwrap();
        release_old.send(Ok(vec![book("Old")])).unwrap();
        old.await.unwrap();

        let state = store.snapshot();
        assert_eq!(state.search_results, vec![book("New")]);
        assert_eq!(state.search_status, RequestStatus::Succeeded);
    }

    #[tokio::test]
    async fn test_stale_error_does_not_mark_newer_search_failed() {
        let api = Arc::new(ControlledApi::default());
        let store = store_with(&api);

        let release_old = api.expect_search("old");
        let release_new = api.expect_search("new");
        let old = tokio::spawn({
            let store = store.clone();
            async move { store.search_books("old").await }
        });
        until(&store, SummaryState::is_searching).await;
        let new = tokio::spawn({
            let store = store.clone();
            async move { store.search_books("new").await }
        });
        while !api.searches.lock().is_empty() {
            tokio::task::yield_now().await;
        }

        release_old.send(Err(anyhow!("too slow"))).unwrap();
        old.await.unwrap();
        let state = store.snapshot();
        assert!(state.is_searching());
        assert_eq!(state.search_error, None);

        release_new.send(Ok(vec![book("New")])).unwrap();
        new.await.unwrap();
        assert_eq!(store.snapshot().search_status, RequestStatus::Succeeded);
    }

    #[tokio::test]
    async fn test_search_and_summary_are_independent() {
        let api = Arc::new(ControlledApi::default());
        let store = store_with(&api);

        let release_search = api.expect_search("dune");
        let search = tokio::spawn({
            let store = store.clone();
            async move { store.search_books("dune").await }
        });
        until(&store, SummaryState::is_searching).await;

        api.expect_summary("Dune")
            .send(Err(anyhow!("Failed to generate book summary.")))
            .unwrap();
        store.fetch_summary("Dune").await;

        let state = store.snapshot();
        assert!(state.is_searching());
        assert_eq!(state.summary_status, RequestStatus::Failed);
        assert_eq!(
            state.summary_error.as_deref(),
            Some("Failed to generate book summary.")
        );
        assert_eq!(state.search_error, None);

        release_search.send(Ok(vec![book("Dune")])).unwrap();
        search.await.unwrap();
        assert_eq!(store.snapshot().summary_status, RequestStatus::Failed);
    }

    #[tokio::test]
    async fn test_fetch_summary_then_clear() {
        let api = Arc::new(ControlledApi::default());
        let store = store_with(&api);

        api.expect_summary("Dune").send(Ok(summary("Dune"))).unwrap();
        store.fetch_summary("Dune").await;
        let state = store.snapshot();
        assert_eq!(state.current_book, Some(summary("Dune")));
        assert_eq!(state.summary_status, RequestStatus::Succeeded);

        store.clear_summary();
        let state = store.snapshot();
        assert_eq!(state.current_book, None);
        assert_eq!(state.summary_error, None);
        assert_eq!(state.summary_status, RequestStatus::Idle);
    }

    #[tokio::test]
    async fn test_clear_summary_discards_fetch_in_flight() {
        let api = Arc::new(ControlledApi::default());
        let store = store_with(&api);

        let release = api.expect_summary("Dune");
        let fetch = tokio::spawn({
            let store = store.clone();
            async move { store.fetch_summary("Dune").await }
        });
        until(&store, SummaryState::is_loading).await;

        store.clear_summary();
        release.send(Ok(summary("Dune"))).unwrap();
        fetch.await.unwrap();

        assert_eq!(store.snapshot().current_book, None);
        assert!(!store.snapshot().is_loading());
    }

    #[tokio::test]
    async fn test_subscribers_see_every_phase() {
        let api = Arc::new(ControlledApi::default());
        let store = store_with(&api);
        let mut changes = store.subscribe();

        api.expect_search("dune").send(Ok(vec![])).unwrap();
        store.search_books("dune").await;

        assert!(changes.has_changed().unwrap());
        assert_eq!(*changes.borrow_and_update(), 2);
    }
}
