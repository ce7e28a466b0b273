//! Element-wise transformation.

use super::{ItemStream, Stage, StageKind};
use crate::errors::PipelineError;
use futures::{StreamExt, TryFutureExt, TryStreamExt};
use std::future::Future;

/// Applies a (possibly suspending, possibly failing) function to every item.
///
/// Each future is awaited before the next item is pulled from upstream.
pub struct MapStage<F> {
    func: F,
}

impl<F> MapStage<F> {
    /// Creates a new map stage.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<'a, In, Out, F, Fut> Stage<'a, In, Out> for MapStage<F>
where
    In: Send + 'a,
    Out: Send + 'a,
    F: FnMut(In) -> Fut + Send + 'a,
    Fut: Future<Output = anyhow::Result<Out>> + Send + 'a,
{
    fn kind(&self) -> StageKind {
        StageKind::Map
    }

    fn apply(self, input: ItemStream<'a, In>) -> ItemStream<'a, Out> {
        let mut func = self.func;
        input
            .and_then(move |item| func(item).map_err(|e| PipelineError::stage("map", e)))
            .boxed()
    }
}
