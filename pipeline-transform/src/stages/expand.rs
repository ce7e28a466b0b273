//! One-level expansion: `flat_map` and `flat`.

use super::{ItemStream, Stage, StageKind};
use crate::errors::PipelineError;
use futures::{stream, StreamExt, TryFutureExt, TryStreamExt};
use std::future::Future;

/// Applies a function to every item and yields each element of its result.
pub struct FlatMapStage<F> {
    func: F,
}

impl<F> FlatMapStage<F> {
    /// Creates a new flat-map stage.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<'a, In, Out, I, F, Fut> Stage<'a, In, Out> for FlatMapStage<F>
where
    In: Send + 'a,
    Out: Send + 'a,
    I: IntoIterator<Item = Out> + 'a,
    I::IntoIter: Send + 'a,
    F: FnMut(In) -> Fut + Send + 'a,
    Fut: Future<Output = anyhow::Result<I>> + Send + 'a,
{
    fn kind(&self) -> StageKind {
        StageKind::FlatMap
    }

    fn apply(self, input: ItemStream<'a, In>) -> ItemStream<'a, Out> {
        let mut func = self.func;
        input
            .and_then(move |item| func(item).map_err(|e| PipelineError::stage("flat_map", e)))
            .map_ok(expand::<Out, I>)
            .try_flatten()
            .boxed()
    }
}

/// Yields every element of each nested sequence, one level deep.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatStage;

impl<'a, In, Out> Stage<'a, In, Out> for FlatStage
where
    In: IntoIterator<Item = Out> + Send + 'a,
    In::IntoIter: Send + 'a,
    Out: Send + 'a,
{
    fn kind(&self) -> StageKind {
        StageKind::Flat
    }

    fn apply(self, input: ItemStream<'a, In>) -> ItemStream<'a, Out> {
        input.map_ok(expand::<Out, In>).try_flatten().boxed()
    }
}

fn expand<T, I>(nested: I) -> stream::Iter<std::iter::Map<I::IntoIter, fn(T) -> Result<T, PipelineError>>>
where
    I: IntoIterator<Item = T>,
{
    stream::iter(nested.into_iter().map(Ok as fn(T) -> Result<T, PipelineError>))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::OneOrMany;
    use crate::stages::test_support::{drain, items};
    use futures::future;

    #[tokio::test]
    async fn test_flat_map_expands() {
        let stage = FlatMapStage::new(|x: i32| future::ready(anyhow::Ok(vec![x, x * 2])));
        let out = drain(stage.apply(items(vec![1, 2, 3]))).await.unwrap();

        assert_eq!(out, vec![1, 2, 2, 4, 3, 6]);
    }

    #[tokio::test]
    async fn test_flat_map_empty_results() {
        let stage = FlatMapStage::new(|_: i32| future::ready(anyhow::Ok(Vec::<i32>::new())));
        let out = drain(stage.apply(items(vec![1, 2, 3]))).await.unwrap();

        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_flat_map_single_value() {
        let stage = FlatMapStage::new(|x: i32| async move { anyhow::Ok(Some(x * 2)) });
        let out = drain(stage.apply(items(vec![1, 2, 3]))).await.unwrap();

        assert_eq!(out, vec![2, 4, 6]);
    }

    #[tokio::test]
    async fn test_flat_map_failure_names_stage() {
        let stage = FlatMapStage::new(|x: i32| {
            future::ready(if x == 2 {
                Err(anyhow::anyhow!("Boom!"))
            } else {
                anyhow::Ok(vec![x; 2])
            })
        });
        let mut out = stage.apply(items(vec![1, 2, 3]));

        assert_eq!(out.next().await.unwrap().unwrap(), 1);
        assert_eq!(out.next().await.unwrap().unwrap(), 1);
        let err = out.next().await.unwrap().unwrap_err();
        assert_eq!(err.operation(), Some("flat_map"));
    }

    #[tokio::test]
    async fn test_flat_one_level() {
        let nested = vec![
            OneOrMany::one(1),
            OneOrMany::many([2, 3]),
            OneOrMany::many([4, 5]),
        ];
        let out: Vec<i32> = drain(FlatStage.apply(items(nested))).await.unwrap();

        assert_eq!(out, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_flat_keeps_inner_nesting() {
        let nested = vec![vec![vec![1], vec![2]], vec![vec![3]]];
        let out: Vec<Vec<i32>> = drain(FlatStage.apply(items(nested))).await.unwrap();

        assert_eq!(out, vec![vec![1], vec![2], vec![3]]);
    }
}
