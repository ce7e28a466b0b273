//! Predicate filtering and typed narrowing.

use super::{ItemStream, Stage, StageKind};
use crate::errors::PipelineError;
use futures::{future, StreamExt, TryStreamExt};
use std::future::Future;

/// Keeps the items for which a predicate resolves to `true`.
pub struct FilterStage<F> {
    predicate: F,
}

impl<F> FilterStage<F> {
    /// Creates a new filter stage.
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<'a, T, F, Fut> Stage<'a, T, T> for FilterStage<F>
where
    T: Send + 'a,
    F: FnMut(&T) -> Fut + Send + 'a,
    Fut: Future<Output = anyhow::Result<bool>> + Send + 'a,
{
    fn kind(&self) -> StageKind {
        StageKind::Filter
    }

    fn apply(self, input: ItemStream<'a, T>) -> ItemStream<'a, T> {
        let mut predicate = self.predicate;
        input
            .try_filter_map(move |item| {
                let verdict = predicate(&item);
                async move {
                    match verdict.await {
                        Ok(keep) => Ok(keep.then_some(item)),
                        Err(e) => Err(PipelineError::stage("filter", e)),
                    }
                }
            })
            .boxed()
    }
}

/// Converts items with a function, dropping those mapped to `None`.
///
/// This is the typed counterpart of a narrowing predicate: the output type
/// only contains the items that passed.
pub struct FilterMapStage<F> {
    func: F,
}

impl<F> FilterMapStage<F> {
    /// Creates a new filter-map stage.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<'a, In, Out, F> Stage<'a, In, Out> for FilterMapStage<F>
where
    In: Send + 'a,
    Out: Send + 'a,
    F: FnMut(In) -> Option<Out> + Send + 'a,
{
    fn kind(&self) -> StageKind {
        StageKind::FilterMap
    }

    fn apply(self, input: ItemStream<'a, In>) -> ItemStream<'a, Out> {
        let mut func = self.func;
        input
            .try_filter_map(move |item| future::ready(Ok(func(item))))
            .boxed()
    }
}
