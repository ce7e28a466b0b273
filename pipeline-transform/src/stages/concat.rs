//! Appending extra items after upstream is drained.

use super::{ItemStream, Stage, StageKind};
use crate::errors::PipelineError;
use futures::{Stream, StreamExt};

/// Yields every upstream item, then every item of `tail`.
///
/// `tail` is not polled until upstream is exhausted.
pub struct ConcatStage<S> {
    tail: S,
}

impl<S> ConcatStage<S> {
    /// Creates a new concat stage.
    pub fn new(tail: S) -> Self {
        Self { tail }
    }
}

impl<'a, T, S> Stage<'a, T, T> for ConcatStage<S>
where
    T: Send + 'a,
    S: Stream<Item = Result<T, PipelineError>> + Send + 'a,
{
    fn kind(&self) -> StageKind {
        StageKind::Concat
    }

    fn apply(self, input: ItemStream<'a, T>) -> ItemStream<'a, T> {
        input.chain(self.tail).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::test_support::{drain, items};
    use futures::stream;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_concat_appends_in_order() {
        let stage = ConcatStage::new(items(vec![6, 7, 8]));
        let out = drain(stage.apply(items(vec![1, 2, 3, 4, 5]))).await.unwrap();

        assert_eq!(out, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[tokio::test]
    async fn test_concat_empty_tail() {
        let stage = ConcatStage::new(items(Vec::<i32>::new()));
        let out = drain(stage.apply(items(vec![1, 2]))).await.unwrap();

        assert_eq!(out, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_concat_tail_is_lazy() {
        let touched = Arc::new(AtomicBool::new(false));
        let flag = touched.clone();
        let tail = stream::once(async move {
            flag.store(true, Ordering::SeqCst);
            Ok::<i32, PipelineError>(9)
        });

        let mut out = ConcatStage::new(tail).apply(items(vec![1]));
        assert_eq!(out.next().await.unwrap().unwrap(), 1);
        assert!(!touched.load(Ordering::SeqCst));
        assert_eq!(out.next().await.unwrap().unwrap(), 9);
        assert!(touched.load(Ordering::SeqCst));
    }
}
