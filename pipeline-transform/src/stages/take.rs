//! Truncation with early release of upstream.

use super::{ItemStream, Stage, StageKind};
use futures::{stream, StreamExt};

/// Yields at most `count` items.
///
/// Once the last item has been handed downstream the upstream stream is
/// dropped, so sources holding handles (readers, channels) are released
/// without waiting for the consumer to finish. A count of zero never
/// polls upstream.
#[derive(Debug, Clone, Copy)]
pub struct TakeStage {
    count: usize,
}

impl TakeStage {
    /// Creates a new take stage.
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self { count }
    }
}

impl<'a, T> Stage<'a, T, T> for TakeStage
where
    T: Send + 'a,
{
    fn kind(&self) -> StageKind {
        StageKind::Take
    }

    fn apply(self, input: ItemStream<'a, T>) -> ItemStream<'a, T> {
        if self.count == 0 {
            return stream::empty().boxed();
        }

        stream::unfold((Some(input), self.count), |(upstream, remaining)| async move {
            let mut upstream = upstream?;
            let item = upstream.next().await?;
            let remaining = remaining - 1;
            let upstream = (remaining > 0 && item.is_ok()).then_some(upstream);
            Some((item, (upstream, remaining)))
        })
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PipelineError;
    use crate::stages::test_support::{drain, items};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counted_naturals<'a>(pulled: Arc<AtomicUsize>) -> ItemStream<'a, u64> {
        stream::iter(0u64..)
            .inspect(move |_| {
                pulled.fetch_add(1, Ordering::SeqCst);
            })
            .map(Ok::<u64, PipelineError>)
            .boxed()
    }

    #[tokio::test]
    async fn test_take_from_infinite() {
        let pulled = Arc::new(AtomicUsize::new(0));
        let out = drain(TakeStage::new(5).apply(counted_naturals(pulled.clone())))
            .await
            .unwrap();

        assert_eq!(out, vec![0, 1, 2, 3, 4]);
        assert_eq!(pulled.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_take_zero_never_pulls() {
        let pulled = Arc::new(AtomicUsize::new(0));
        let out = drain(TakeStage::new(0).apply(counted_naturals(pulled.clone())))
            .await
            .unwrap();

        assert!(out.is_empty());
        assert_eq!(pulled.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_take_more_than_available() {
        let out = drain(TakeStage::new(10).apply(items(vec![1, 2]))).await.unwrap();

        assert_eq!(out, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_take_drops_upstream_after_last_item() {
        struct DropFlag(Arc<AtomicUsize>);
        impl Drop for DropFlag {
            fn drop(&mut self) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let dropped = Arc::new(AtomicUsize::new(0));
        let guard = DropFlag(dropped.clone());
        let upstream = stream::iter(0u64..)
            .map(move |n| {
                let _keep = &guard;
                Ok::<u64, PipelineError>(n)
            })
            .boxed();

        let mut taken = TakeStage::new(2).apply(upstream);
        assert!(taken.next().await.is_some());
        assert_eq!(dropped.load(Ordering::SeqCst), 0);
        assert!(taken.next().await.is_some());
        assert_eq!(dropped.load(Ordering::SeqCst), 1);
        assert!(taken.next().await.is_none());
    }
}
