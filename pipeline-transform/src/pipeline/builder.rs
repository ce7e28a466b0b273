//! Chainable stage operations.
//!
//! Every method here appends exactly one stage and returns the extended
//! handle. No item is pulled until a terminal consumer (or any other
//! poller) drives the pipeline.
//!
//! Callbacks come in three flavours: plain closures (`map`), closures
//! returning a future (`map_async`), and closures returning a future of a
//! `Result` (`try_map`). Errors from the last kind abort the pass with
//! [`PipelineError::Stage`](crate::errors::PipelineError::Stage).

use super::engine::Pipeline;
use crate::errors::{PipelineError, Result};
use crate::events::get_event_sink;
use crate::stages::{
    BatchStage, ConcatStage, FilterMapStage, FilterStage, FlatMapStage, FlatStage, ForEachStage,
    InspectStage, MapStage, TakeStage,
};
use futures::{future, stream, FutureExt, Stream, StreamExt};
use std::fmt::Debug;
use std::future::Future;

impl<'a, T: Send + 'a> Pipeline<'a, T> {
    /// Transforms every item.
    pub fn map<U, F>(self, mut func: F) -> Pipeline<'a, U>
    where
        U: Send + 'a,
        F: FnMut(T) -> U + Send + 'a,
    {
        self.pipe(MapStage::new(move |item| future::ready(anyhow::Ok(func(item)))))
    }

    /// Transforms every item with a suspending function.
    pub fn map_async<U, F, Fut>(self, mut func: F) -> Pipeline<'a, U>
    where
        U: Send + 'a,
        F: FnMut(T) -> Fut + Send + 'a,
        Fut: Future<Output = U> + Send + 'a,
    {
        self.pipe(MapStage::new(move |item| func(item).map(anyhow::Ok)))
    }

    /// Transforms every item with a suspending, fallible function.
    pub fn try_map<U, E, F, Fut>(self, mut func: F) -> Pipeline<'a, U>
    where
        U: Send + 'a,
        E: Into<anyhow::Error> + 'a,
        F: FnMut(T) -> Fut + Send + 'a,
        Fut: Future<Output = std::result::Result<U, E>> + Send + 'a,
    {
        self.pipe(MapStage::new(move |item| func(item).map(into_stage_result)))
    }

    /// Maps every item to a sequence and yields its elements.
    ///
    /// Return `Some(value)` or `[value]` to yield a single value.
    pub fn flat_map<I, F>(self, mut func: F) -> Pipeline<'a, I::Item>
    where
        I: IntoIterator + Send + 'a,
        I::IntoIter: Send + 'a,
        I::Item: Send + 'a,
        F: FnMut(T) -> I + Send + 'a,
    {
        self.pipe(FlatMapStage::new(move |item| future::ready(anyhow::Ok(func(item)))))
    }

    /// Like [`flat_map`](Self::flat_map) with a suspending function.
    pub fn flat_map_async<I, F, Fut>(self, mut func: F) -> Pipeline<'a, I::Item>
    where
        I: IntoIterator + Send + 'a,
        I::IntoIter: Send + 'a,
        I::Item: Send + 'a,
        F: FnMut(T) -> Fut + Send + 'a,
        Fut: Future<Output = I> + Send + 'a,
    {
        self.pipe(FlatMapStage::new(move |item| func(item).map(anyhow::Ok)))
    }

    /// Like [`flat_map`](Self::flat_map) with a suspending, fallible function.
    pub fn try_flat_map<I, E, F, Fut>(self, mut func: F) -> Pipeline<'a, I::Item>
    where
        I: IntoIterator + Send + 'a,
        I::IntoIter: Send + 'a,
        I::Item: Send + 'a,
        E: Into<anyhow::Error> + 'a,
        F: FnMut(T) -> Fut + Send + 'a,
        Fut: Future<Output = std::result::Result<I, E>> + Send + 'a,
    {
        self.pipe(FlatMapStage::new(move |item| func(item).map(into_stage_result)))
    }

    /// Expands nested sequences one level.
    ///
    /// Use [`OneOrMany`](crate::items::OneOrMany) items to mix nested
    /// sequences with lone values.
    pub fn flat(self) -> Pipeline<'a, T::Item>
    where
        T: IntoIterator,
        T::IntoIter: Send + 'a,
        T::Item: Send + 'a,
    {
        self.pipe(FlatStage)
    }

    /// Keeps items matching `predicate`.
    #[must_use]
    pub fn filter<F>(self, mut predicate: F) -> Self
    where
        F: FnMut(&T) -> bool + Send + 'a,
    {
        self.pipe(FilterStage::new(move |item: &T| future::ready(anyhow::Ok(predicate(item)))))
    }

    /// Keeps items matching a suspending predicate.
    ///
    /// The returned future must not borrow the item; copy what it needs.
    #[must_use]
    pub fn filter_async<F, Fut>(self, mut predicate: F) -> Self
    where
        F: FnMut(&T) -> Fut + Send + 'a,
        Fut: Future<Output = bool> + Send + 'a,
    {
        self.pipe(FilterStage::new(move |item: &T| predicate(item).map(anyhow::Ok)))
    }

    /// Keeps items matching a suspending, fallible predicate.
    #[must_use]
    pub fn try_filter<E, F, Fut>(self, mut predicate: F) -> Self
    where
        E: Into<anyhow::Error> + 'a,
        F: FnMut(&T) -> Fut + Send + 'a,
        Fut: Future<Output = std::result::Result<bool, E>> + Send + 'a,
    {
        self.pipe(FilterStage::new(move |item: &T| predicate(item).map(into_stage_result)))
    }

    /// Keeps and converts the items for which `func` returns `Some`.
    ///
    /// The narrowing form of `filter`: `filter_map(|v| v.as_array().cloned())`
    /// yields only the arrays, typed as such.
    pub fn filter_map<U, F>(self, func: F) -> Pipeline<'a, U>
    where
        U: Send + 'a,
        F: FnMut(T) -> Option<U> + Send + 'a,
    {
        self.pipe(FilterMapStage::new(func))
    }

    /// Appends the items of `values` once upstream is exhausted.
    ///
    /// Pass an array to append individual values: `concat([6, 7, 8])`.
    #[must_use]
    pub fn concat<I>(self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'a,
    {
        let tail = stream::iter(values.into_iter().map(Ok::<T, PipelineError>));
        self.pipe(ConcatStage::new(tail))
    }

    /// Appends the items of an asynchronous stream once upstream is exhausted.
    #[must_use]
    pub fn concat_stream<S>(self, values: S) -> Self
    where
        S: Stream<Item = T> + Send + 'a,
    {
        self.pipe(ConcatStage::new(values.map(Ok::<T, PipelineError>)))
    }

    /// Appends the output of another pipeline once upstream is exhausted.
    ///
    /// `other` is wired only when this pipeline's upstream is drained.
    #[must_use]
    pub fn concat_pipeline(self, other: Self) -> Self {
        self.pipe(ConcatStage::new(other))
    }

    /// Calls `func` with every item for its side effect.
    #[must_use]
    pub fn for_each<F>(self, func: F) -> Self
    where
        F: FnMut(&T) + Send + 'a,
    {
        self.pipe(ForEachStage::new(func))
    }

    /// Reports every item, tagged with `labels`, to the event sink.
    ///
    /// Uses the sink attached with `with_event_sink`, or the process-wide
    /// sink otherwise.
    #[must_use]
    pub fn inspect<L>(self, labels: impl IntoIterator<Item = L>) -> Self
    where
        T: Debug,
        L: Into<String>,
    {
        let sink = self.event_sink().unwrap_or_else(get_event_sink);
        let event_type = self.config().inspect_event_type.clone();
        let labels = labels.into_iter().map(Into::into).collect();
        self.pipe(InspectStage::new(labels, event_type, sink))
    }

    /// Groups items into vectors of `size`, keeping a trailing partial group.
    ///
    /// # Errors
    ///
    /// Returns an argument error if `size` is zero.
    pub fn batch(self, size: usize) -> Result<Pipeline<'a, Vec<T>>> {
        Ok(self.pipe(BatchStage::new(size)?))
    }

    /// Yields at most `count` items, then stops pulling from upstream.
    #[must_use]
    pub fn take(self, count: usize) -> Self {
        self.pipe(TakeStage::new(count))
    }
}

fn into_stage_result<U, E>(result: std::result::Result<U, E>) -> anyhow::Result<U>
where
    E: Into<anyhow::Error>,
{
    result.map_err(Into::into)
}
