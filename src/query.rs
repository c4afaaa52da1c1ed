//! Async query abstraction for data fetching.
//!
//! Inspired by TanStack Query, a `Query<T>` owns the last successfully fetched
//! value together with the loading and error state of the fetches feeding it.
//!
//! Fetches run as spawned tasks and report back over a channel; the owner
//! calls [`Query::poll`] from its event loop tick. Concurrent fetches are
//! neither deduplicated nor cancelled: results are applied in the order they
//! arrive, so the last one to arrive wins.
//!
//! A result handed in through [`Query::resolve`] supersedes every fetch
//! started before it. Those fetches still count as in flight until they
//! report, but their results are dropped.
//!
//! A failed fetch never discards data. `data()` keeps returning the previous
//! value and `error()` reports the failure until the next success.
//!
//! # Example
//!
//! ```ignore
//! let store = client.clone();
//! let mut query = Query::new(move || {
//!     let store = store.clone();
//!     async move { store.list().await.map_err(|e| e.to_string()) }
//! });
//!
//! query.fetch();
//!
//! // In event loop tick
//! if query.poll() {
//!     // State changed, trigger re-render
//! }
//! ```

use chrono::{DateTime, Local};
use std::future::Future;
use std::pin::Pin;
use tokio::sync::mpsc;
use tracing::debug;

/// A boxed future that returns a Result<T, String>
type BoxFuture<T> = Pin<Box<dyn Future<Output = Result<T, String>> + Send>>;

/// A factory function that creates futures for fetching data
type FetcherFn<T> = Box<dyn Fn() -> BoxFuture<T> + Send + Sync>;

/// Async query for data fetching with state management.
pub struct Query<T> {
  data: Option<T>,
  error: Option<String>,
  fetcher: FetcherFn<T>,
  tx: mpsc::UnboundedSender<(u64, Result<T, String>)>,
  rx: mpsc::UnboundedReceiver<(u64, Result<T, String>)>,
  in_flight: usize,
  /// Stamp of the most recently started fetch
  generation: u64,
  /// Fetches stamped at or below this are stale
  floor: u64,
  fetched_at: Option<DateTime<Local>>,
}

impl<T: Send + 'static> Query<T> {
  /// Create a new query with the given fetcher function.
  ///
  /// The fetcher is a closure that returns a future. It will be called
  /// each time `fetch()` or `refetch()` starts a request.
  pub fn new<F, Fut>(fetcher: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    let (tx, rx) = mpsc::unbounded_channel();
    Self {
      data: None,
      error: None,
      fetcher: Box::new(move || Box::pin(fetcher())),
      tx,
      rx,
      in_flight: 0,
      generation: 0,
      floor: 0,
      fetched_at: None,
    }
  }

  /// Last successfully fetched value
  pub fn data(&self) -> Option<&T> {
    self.data.as_ref()
  }

  /// Message of the most recent failure, cleared by the next success
  pub fn error(&self) -> Option<&str> {
    self.error.as_deref()
  }

  /// Whether any fetch is in flight
  pub fn is_loading(&self) -> bool {
    self.in_flight > 0
  }

  /// Wall clock time of the last successful fetch
  pub fn fetched_at(&self) -> Option<DateTime<Local>> {
    self.fetched_at
  }

  /// Record a failure that did not come from this query's own fetcher.
  /// Data is kept.
  pub fn set_error(&mut self, error: impl Into<String>) {
    self.error = Some(error.into());
  }

  /// Start fetching data if not already loading.
  pub fn fetch(&mut self) {
    if self.is_loading() {
      return;
    }
    self.start_fetch();
  }

  /// Start another fetch even if one is already in flight.
  pub fn refetch(&mut self) {
    self.start_fetch();
  }

  /// Apply a result fetched by someone else, e.g. a mutation that refetched
  /// after succeeding. Fetches already in flight can no longer overwrite it.
  pub fn resolve(&mut self, result: Result<T, String>) {
    self.floor = self.generation;
    self.apply(result);
  }

  /// Success replaces the data wholesale and clears the error; failure keeps
  /// the data and records the error.
  fn apply(&mut self, result: Result<T, String>) {
    match result {
      Ok(data) => {
        self.data = Some(data);
        self.error = None;
        self.fetched_at = Some(Local::now());
      }
      Err(error) => {
        self.error = Some(error);
      }
    }
  }

  /// Poll for results from pending fetches.
  ///
  /// Returns `true` if the state changed (data arrived or error occurred).
  /// Call this in your event loop tick handler.
  pub fn poll(&mut self) -> bool {
    let mut changed = false;
    while let Ok((generation, result)) = self.rx.try_recv() {
      changed |= self.finish(generation, result);
    }
    changed
  }

  /// Wait until every in-flight fetch has delivered its result.
  pub async fn settle(&mut self) {
    while self.in_flight > 0 {
      match self.rx.recv().await {
        Some((generation, result)) => {
          self.finish(generation, result);
        }
        None => break,
      }
    }
  }

  /// Returns `true` if the loading state or the data changed
  fn finish(&mut self, generation: u64, result: Result<T, String>) -> bool {
    self.in_flight = self.in_flight.saturating_sub(1);
    if generation <= self.floor {
      debug!(generation, floor = self.floor, "dropping superseded fetch");
      return self.in_flight == 0;
    }
    self.apply(result);
    true
  }

  /// Internal: start the fetch operation
  fn start_fetch(&mut self) {
    self.in_flight += 1;
    self.generation += 1;
    let generation = self.generation;

    let tx = self.tx.clone();
    let future = (self.fetcher)();
    tokio::spawn(async move {
      let result = future.await;
      // Receiver lives as long as the query itself
      let _ = tx.send((generation, result));
    });
  }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Query<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("data", &self.data)
      .field("error", &self.error)
      .field("in_flight", &self.in_flight)
      .field("generation", &self.generation)
      .field("fetched_at", &self.fetched_at)
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicU32, Ordering};
  use std::sync::Arc;
  use std::time::Duration;

  #[tokio::test]
  async fn test_query_success() {
    let mut query = Query::new(|| async { Ok::<_, String>(vec![1, 2, 3]) });

    assert!(query.data().is_none());
    assert!(!query.is_loading());

    query.fetch();
    assert!(query.is_loading());

    query.settle().await;
    assert!(!query.is_loading());
    assert_eq!(query.data(), Some(&vec![1, 2, 3]));
    assert!(query.error().is_none());
    assert!(query.fetched_at().is_some());
  }

  #[tokio::test]
  async fn test_poll_picks_up_result() {
    let mut query = Query::new(|| async { Ok::<_, String>(7) });
    query.fetch();

    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(query.poll());
    assert_eq!(query.data(), Some(&7));
    assert!(!query.poll());
  }

  #[tokio::test]
  async fn test_error_keeps_previous_data() {
    let calls = Arc::new(AtomicU32::new(0));
    let calls_clone = calls.clone();

    let mut query = Query::new(move || {
      let n = calls_clone.fetch_add(1, Ordering::SeqCst);
      async move {
        if n == 0 {
          Ok(vec!["a"])
        } else {
          Err("Something went wrong".to_string())
        }
      }
    });

    query.fetch();
    query.settle().await;
    assert_eq!(query.data(), Some(&vec!["a"]));

    query.refetch();
    query.settle().await;
    assert_eq!(query.data(), Some(&vec!["a"]));
    assert_eq!(query.error(), Some("Something went wrong"));
  }

  #[tokio::test]
  async fn test_success_clears_error() {
    let mut query = Query::new(|| async { Ok::<_, String>(1) });
    query.set_error("earlier failure");

    query.fetch();
    query.settle().await;
    assert!(query.error().is_none());
  }

  #[tokio::test]
  async fn test_fetch_while_loading_is_noop() {
    let calls = Arc::new(AtomicU32::new(0));
    let calls_clone = calls.clone();

    let mut query = Query::new(move || {
      calls_clone.fetch_add(1, Ordering::SeqCst);
      async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok::<_, String>(42)
      }
    });

    query.fetch();
    query.fetch();
    query.settle().await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_refetch_races_and_last_arrival_wins() {
    let counter = Arc::new(AtomicU32::new(0));
    let counter_clone = counter.clone();

    // First request is slow, second is fast: the slow one arrives last
    let mut query = Query::new(move || {
      let n = counter_clone.fetch_add(1, Ordering::SeqCst);
      async move {
        let delay = if n == 0 { 60 } else { 5 };
        tokio::time::sleep(Duration::from_millis(delay)).await;
        Ok::<_, String>(n)
      }
    });

    query.fetch();
    query.refetch();
    assert!(query.is_loading());

    query.settle().await;
    assert_eq!(counter.load(Ordering::SeqCst), 2);
    assert_eq!(query.data(), Some(&0));
  }

  #[tokio::test]
  async fn test_resolve_applies_external_result() {
    let mut query = Query::new(|| async { Ok::<_, String>(0) });
    query.resolve(Ok(9));
    assert_eq!(query.data(), Some(&9));
    assert!(!query.is_loading());

    query.resolve(Err("down".to_string()));
    assert_eq!(query.data(), Some(&9));
    assert_eq!(query.error(), Some("down"));
  }

  #[tokio::test]
  async fn test_resolve_supersedes_fetch_in_flight() {
    let mut query = Query::new(|| async {
      tokio::time::sleep(Duration::from_millis(30)).await;
      Ok::<_, String>(1)
    });

    query.refetch();
    query.resolve(Ok(2));
    assert!(query.is_loading());

    query.settle().await;
    assert!(!query.is_loading());
    assert_eq!(query.data(), Some(&2));

    // Fetches started afterwards apply as usual
    query.refetch();
    query.settle().await;
    assert_eq!(query.data(), Some(&1));
  }
}
