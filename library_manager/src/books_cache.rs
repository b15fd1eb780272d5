//! The single cached copy of the books collection.
//!
//! There is exactly one entry, keyed [`BOOKS_COLLECTION_KEY`] and filled only by
//! [`BooksTransport::list_books`]. Nothing writes the snapshot locally: after a mutation the
//! caller has to go through [`BooksCache::revalidate`] and the next render shows what the
//! server returned.

use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;

use crate::api::Book;
use crate::transport::{BooksTransport, TransportError};

pub const BOOKS_COLLECTION_KEY: &str = "books-collection";

type FetchResult = Result<Vec<Book>, Arc<TransportError>>;
type InFlightFetch = Shared<BoxFuture<'static, FetchResult>>;

#[derive(Debug, Clone)]
pub enum CacheStatus {
    /// Nothing fetched yet
    Idle,
    Loading,
    Success(Vec<Book>),
    Failed(Arc<TransportError>),
}

#[derive(Default)]
struct CacheEntry {
    records: Option<Vec<Book>>,
    error: Option<Arc<TransportError>>,
    /// Number of fetches started so far, the in-flight fetch carries its own number
    started: u64,
    in_flight: Option<(u64, InFlightFetch)>,
}

impl CacheEntry {
    fn start_fetch(
        &mut self,
        key: &'static str,
        transport: Arc<dyn BooksTransport>,
        entry: Arc<Mutex<CacheEntry>>,
    ) -> InFlightFetch {
        tracing::debug!("Fetching {}", key);
        let fetch = fetch_collection(key, transport, entry).boxed().shared();
        self.started += 1;
        self.in_flight = Some((self.started, fetch.clone()));
        fetch
    }
}

pub struct BooksCache {
    key: &'static str,
    transport: Arc<dyn BooksTransport>,
    entry: Arc<Mutex<CacheEntry>>,
}

impl BooksCache {
    pub fn new(transport: Arc<dyn BooksTransport>) -> Self {
        Self {
            key: BOOKS_COLLECTION_KEY,
            transport,
            entry: Default::default(),
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Last successfully fetched collection, kept even if a later fetch failed
    pub fn records(&self) -> Option<Vec<Book>> {
        self.entry.lock().records.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.entry.lock().in_flight.is_some()
    }

    /// Failure of the last fetch, cleared by the next successful one
    pub fn error(&self) -> Option<Arc<TransportError>> {
        self.entry.lock().error.clone()
    }

    pub fn status(&self) -> CacheStatus {
        let entry = self.entry.lock();
        if entry.in_flight.is_some() {
            CacheStatus::Loading
        } else if let Some(error) = &entry.error {
            CacheStatus::Failed(error.clone())
        } else if let Some(records) = &entry.records {
            CacheStatus::Success(records.clone())
        } else {
            CacheStatus::Idle
        }
    }

    /// Performs the first fetch, does nothing once the cache holds data or an error
    pub async fn load(&self) -> Result<(), Arc<TransportError>> {
        let idle = {
            let entry = self.entry.lock();
            entry.records.is_none() && entry.error.is_none()
        };
        if idle {
            self.revalidate().await
        } else {
            Ok(())
        }
    }

    /// Fetches the collection again and replaces the snapshot on success.
    /// A call made while a fetch is in flight waits for that fetch instead of starting another one
    pub async fn revalidate(&self) -> Result<(), Arc<TransportError>> {
        let fetch = {
            let mut entry = self.entry.lock();
            match &entry.in_flight {
                Some((_, fetch)) => {
                    tracing::debug!("Joining in-flight fetch of {}", self.key);
                    fetch.clone()
                }
                None => entry.start_fetch(self.key, self.transport.clone(), self.entry.clone()),
            }
        };
        fetch.await.map(|_| ())
    }

    /// Like [`BooksCache::revalidate`], for callers that just changed the collection on the
    /// server. A fetch already in flight may have been answered before the change, so it is
    /// only joined if it started after this call; otherwise it is awaited and a new one started
    pub async fn revalidate_after_mutation(&self) -> Result<(), Arc<TransportError>> {
        let observed = self.entry.lock().started;
        loop {
            let (fetch, fresh) = {
                let mut entry = self.entry.lock();
                match &entry.in_flight {
                    Some((number, fetch)) => (fetch.clone(), *number > observed),
                    None => (
                        entry.start_fetch(self.key, self.transport.clone(), self.entry.clone()),
                        true,
                    ),
                }
            };
            if fresh {
                return fetch.await.map(|_| ());
            }
            tracing::debug!("Waiting for stale fetch of {} to finish", self.key);
            // its outcome is superseded by the fetch started on the next iteration
            let _ = fetch.await;
        }
    }
}

/// Applies its own outcome to the entry, so the snapshot is updated even if the caller
/// that started the fetch stops waiting for it
async fn fetch_collection(
    key: &'static str,
    transport: Arc<dyn BooksTransport>,
    entry: Arc<Mutex<CacheEntry>>,
) -> FetchResult {
    let result = transport.list_books().await.map_err(Arc::new);

    let mut entry = entry.lock();
    entry.in_flight = None;
    match &result {
        Ok(books) => {
            tracing::debug!("Fetched {} books into {}", books.len(), key);
            entry.records = Some(books.clone());
            entry.error = None;
        }
        Err(err) => {
            tracing::error!("Error fetching books: {}", err);
            entry.error = Some(err.clone());
        }
    }
    result
}

#[cfg(test)]
mod books_cache_tests {
    use futures_util::poll;

    use crate::api::Book;
    use crate::books_cache::{BooksCache, CacheStatus, BOOKS_COLLECTION_KEY};
    use crate::test_support::{sample_books, RecordingTransport};
    use crate::transport::BooksTransport;

    #[tokio::test]
    async fn test_initial_state_is_idle() {
        let transport = RecordingTransport::with_books(sample_books());
        let cache = BooksCache::new(transport.clone());

        assert_eq!(cache.key(), BOOKS_COLLECTION_KEY);
        assert!(matches!(cache.status(), CacheStatus::Idle));
        assert_eq!(cache.records(), None);
        assert!(cache.error().is_none());
        assert!(!cache.is_loading());
        assert_eq!(transport.list_calls(), 0);
    }

    #[tokio::test]
    async fn test_load_fetches_once() {
        let transport = RecordingTransport::with_books(sample_books());
        let cache = BooksCache::new(transport.clone());

        cache.load().await.expect("Failed to load");
        cache.load().await.expect("Failed to load");

        assert_eq!(transport.list_calls(), 1);
        assert_eq!(cache.records(), Some(sample_books()));
        assert!(matches!(cache.status(), CacheStatus::Success(books) if books == sample_books()));
    }

    #[tokio::test]
    async fn test_is_loading_while_fetch_in_flight() {
        let transport = RecordingTransport::with_books(sample_books());
        let cache = BooksCache::new(transport.clone());

        let revalidation = cache.revalidate();
        tokio::pin!(revalidation);
        assert!(poll!(&mut revalidation).is_pending());
        assert!(cache.is_loading());
        assert!(matches!(cache.status(), CacheStatus::Loading));

        revalidation.await.expect("Failed to revalidate");
        assert!(!cache.is_loading());
    }

    #[tokio::test]
    async fn test_concurrent_revalidations_share_one_fetch() {
        let transport = RecordingTransport::with_books(sample_books());
        let cache = BooksCache::new(transport.clone());

        let (first, second) = tokio::join!(cache.revalidate(), cache.revalidate());

        assert!(first.is_ok());
        assert!(second.is_ok());
        assert_eq!(transport.list_calls(), 1);

        cache.revalidate().await.expect("Failed to revalidate");
        assert_eq!(transport.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_sets_error_and_next_success_clears_it() {
        let transport = RecordingTransport::with_books(sample_books());
        let cache = BooksCache::new(transport.clone());

        transport.fail_list(true);
        assert!(cache.load().await.is_err());
        assert!(matches!(cache.status(), CacheStatus::Failed(_)));
        assert_eq!(cache.records(), None);
        assert!(cache.error().is_some());

        // an errored cache is not idle, loading again does not refetch
        cache.load().await.expect("load after failure is a no-op");
        assert_eq!(transport.list_calls(), 1);

        transport.fail_list(false);
        cache.revalidate().await.expect("Failed to revalidate");
        assert!(cache.error().is_none());
        assert_eq!(cache.records(), Some(sample_books()));
    }

    #[tokio::test]
    async fn test_failed_revalidation_keeps_previous_snapshot() {
        let transport = RecordingTransport::with_books(sample_books());
        let cache = BooksCache::new(transport.clone());
        cache.load().await.unwrap();

        transport.fail_list(true);
        assert!(cache.revalidate().await.is_err());

        assert_eq!(cache.records(), Some(sample_books()));
        assert!(matches!(cache.status(), CacheStatus::Failed(_)));
    }

    #[tokio::test]
    /// A fetch answered before a book was added must not be the refresh that follows the add
    async fn test_revalidate_after_mutation_skips_fetch_started_before() {
        let transport = RecordingTransport::with_books(sample_books());
        let cache = BooksCache::new(transport.clone());

        let stale = cache.revalidate();
        tokio::pin!(stale);
        assert!(poll!(&mut stale).is_pending());

        transport
            .add_book(&Book {
                title: "Book 3".to_string(),
                ..Book::default()
            })
            .await
            .expect("Failed to add book");

        let (stale_result, fresh_result) =
            tokio::join!(&mut stale, cache.revalidate_after_mutation());

        assert!(stale_result.is_ok());
        assert!(fresh_result.is_ok());
        assert_eq!(transport.list_calls(), 2);
        assert_eq!(cache.records().map(|books| books.len()), Some(3));
    }

    #[tokio::test]
    async fn test_revalidate_after_mutation_joins_fetch_started_after() {
        let transport = RecordingTransport::with_books(sample_books());
        let cache = BooksCache::new(transport.clone());

        let refresh = cache.revalidate_after_mutation();
        tokio::pin!(refresh);
        assert!(poll!(&mut refresh).is_pending());

        let (first, second) = tokio::join!(&mut refresh, cache.revalidate());

        assert!(first.is_ok());
        assert!(second.is_ok());
        assert_eq!(transport.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_fetch_finishes_when_starter_is_dropped() {
        let transport = RecordingTransport::with_books(sample_books());
        let cache = BooksCache::new(transport.clone());

        {
            let abandoned = cache.revalidate();
            tokio::pin!(abandoned);
            assert!(poll!(&mut abandoned).is_pending());
        }
        assert!(cache.is_loading());

        cache.revalidate().await.expect("Failed to revalidate");
        assert_eq!(transport.list_calls(), 1);
        assert_eq!(cache.records(), Some(sample_books()));
    }
}
