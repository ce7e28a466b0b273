//! Test fixtures: sources and probes.

use futures::{stream, Stream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// An infinite asynchronous source yielding `0, 1, 2, ...`.
pub fn naturals() -> impl Stream<Item = u64> + Send + 'static {
    stream::unfold(0u64, |next| async move {
        tokio::task::yield_now().await;
        Some((next, next + 1))
    })
}

/// A shareable counter for observing how often a stage runs.
#[derive(Debug, Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    /// Creates a counter at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the counter.
    pub fn tick(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    /// Returns the current count.
    #[must_use]
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Installs a test subscriber honouring `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
