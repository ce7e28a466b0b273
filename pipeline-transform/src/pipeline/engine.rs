//! The pipeline handle and its pull engine.
//!
//! A [`Pipeline`] stores its source and stages as a deferred wiring closure.
//! Nothing is composed until the first poll: at that point the closure
//! folds every stage over the source, left to right, and the resulting
//! stream is driven one item at a time by whoever polls the pipeline.

use super::SourceKind;
use crate::config::PipelineConfig;
use crate::errors::PipelineError;
use crate::events::EventSink;
use crate::stages::{ItemStream, Stage, StageKind};
use futures::stream::{self, FusedStream};
use futures::{Stream, StreamExt};
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tracing::{debug, warn};
use uuid::Uuid;

/// Deferred composition of source and stages.
pub(super) type Wiring<'a, T> = Box<dyn FnOnce() -> ItemStream<'a, T> + Send + 'a>;

enum PassState<'a, T> {
    /// Built but never polled.
    Pending(Wiring<'a, T>),
    /// Wired and streaming.
    Running(ItemStream<'a, T>),
    /// Exhausted or aborted.
    Finished,
}

impl<T> PassState<'_, T> {
    fn label(&self) -> &'static str {
        match self {
            Self::Pending(_) => "pending",
            Self::Running(_) => "running",
            Self::Finished => "finished",
        }
    }
}

/// A lazily evaluated chain of stages over a source.
///
/// Builder methods consume the handle and return a new one with the stage
/// appended, so a pipeline can be neither forked nor consumed twice. The
/// handle is itself a [`Stream`] of `Result<T, PipelineError>`: polling it
/// wires the pass and pulls items through every stage on demand. After the
/// first error the stream is finished.
pub struct Pipeline<'a, T> {
    config: PipelineConfig,
    sink: Option<Arc<dyn EventSink>>,
    source_kind: SourceKind,
    stages: Vec<StageKind>,
    state: PassState<'a, T>,
    run_id: Option<Uuid>,
    yielded: usize,
}

impl<'a, T> Pipeline<'a, T> {
    pub(super) fn from_wiring(source_kind: SourceKind, wiring: Wiring<'a, T>) -> Self {
        Self {
            config: PipelineConfig::default(),
            sink: None,
            source_kind,
            stages: Vec::new(),
            state: PassState::Pending(wiring),
            run_id: None,
            yielded: 0,
        }
    }

    /// Replaces the pipeline configuration.
    #[must_use]
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the pipeline name used in logs.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Routes `inspect` records added after this call to `sink`.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Returns how the source was classified.
    #[must_use]
    pub fn source_kind(&self) -> SourceKind {
        self.source_kind
    }

    /// Returns the stages in execution order.
    #[must_use]
    pub fn stages(&self) -> &[StageKind] {
        &self.stages
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Returns true once the pass has been wired.
    #[must_use]
    pub fn is_started(&self) -> bool {
        !matches!(self.state, PassState::Pending(_))
    }

    /// Returns the identifier of the current pass, once started.
    #[must_use]
    pub fn run_id(&self) -> Option<Uuid> {
        self.run_id
    }

    pub(super) fn event_sink(&self) -> Option<Arc<dyn EventSink>> {
        self.sink.clone()
    }

    /// Assigns the run id. Returns false when the pass was already running
    /// and a stage has just been appended to it.
    fn begin_pass(&mut self) -> bool {
        if self.run_id.is_some() {
            return false;
        }
        let run_id = *self.run_id.insert(Uuid::new_v4());
        if self.config.trace_passes {
            debug!(
                pipeline = %self.config.name,
                run_id = %run_id,
                source = %self.source_kind,
                stages = ?self.stages.iter().map(StageKind::as_str).collect::<Vec<_>>(),
                "Pipeline pass started"
            );
        }
        true
    }

    fn finish_pass(&mut self) {
        self.state = PassState::Finished;
        if self.config.trace_passes {
            debug!(
                pipeline = %self.config.name,
                run_id = %self.run_id.unwrap_or_default(),
                items = self.yielded,
                "Pipeline pass completed"
            );
        }
    }

    fn abort_pass(&mut self, err: &PipelineError) {
        self.state = PassState::Finished;
        if self.config.trace_passes {
            warn!(
                pipeline = %self.config.name,
                run_id = %self.run_id.unwrap_or_default(),
                items = self.yielded,
                error = %err,
                "Pipeline pass aborted"
            );
        }
    }
}

impl<'a, T: Send + 'a> Pipeline<'a, T> {
    /// Appends a stage. Nothing runs until the pipeline is polled.
    ///
    /// If the pipeline is already streaming, the remaining items flow
    /// through the new stage.
    pub fn pipe<U, S>(self, stage: S) -> Pipeline<'a, U>
    where
        U: Send + 'a,
        S: Stage<'a, T, U>,
    {
        let Self {
            config,
            sink,
            source_kind,
            mut stages,
            state,
            run_id,
            yielded,
        } = self;

        stages.push(stage.kind());
        let upstream: Wiring<'a, T> = match state {
            PassState::Pending(wiring) => wiring,
            PassState::Running(items) => Box::new(move || items),
            PassState::Finished => Box::new(|| stream::empty().boxed()),
        };

        Pipeline {
            config,
            sink,
            source_kind,
            stages,
            state: PassState::Pending(Box::new(move || stage.apply(upstream()))),
            run_id,
            yielded,
        }
    }

    /// Converts the pipeline into a boxed item stream.
    pub fn into_stream(self) -> ItemStream<'a, T> {
        self.boxed()
    }

    /// Drives the pipeline from synchronous code.
    ///
    /// Each `next` blocks the current thread until the item is ready. Stage
    /// functions that need a runtime (timers, tokio IO) must not be used
    /// with this iterator.
    pub fn into_blocking_iter(self) -> impl Iterator<Item = Result<T, PipelineError>> + 'a {
        futures::executor::block_on_stream(self)
    }
}

impl<T> Stream for Pipeline<'_, T> {
    type Item = Result<T, PipelineError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if matches!(this.state, PassState::Pending(_)) {
            if let PassState::Pending(wiring) = std::mem::replace(&mut this.state, PassState::Finished) {
                this.begin_pass();
                this.state = PassState::Running(wiring());
            }
        }

        let PassState::Running(items) = &mut this.state else {
            return Poll::Ready(None);
        };

        match items.poll_next_unpin(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Some(Ok(item))) => {
                this.yielded += 1;
                Poll::Ready(Some(Ok(item)))
            }
            Poll::Ready(Some(Err(err))) => {
                this.abort_pass(&err);
                Poll::Ready(Some(Err(err)))
            }
            Poll::Ready(None) => {
                this.finish_pass();
                Poll::Ready(None)
            }
        }
    }
}

impl<T> FusedStream for Pipeline<'_, T> {
    fn is_terminated(&self) -> bool {
        matches!(self.state, PassState::Finished)
    }
}

impl<T> fmt::Debug for Pipeline<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.config.name)
            .field("source", &self.source_kind)
            .field("stages", &self.stages)
            .field("state", &self.state.label())
            .field("run_id", &self.run_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::{MapStage, TakeStage};
    use futures::{future, TryStreamExt};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_wiring_is_deferred_until_first_poll() {
        let wired = Arc::new(AtomicUsize::new(0));
        let flag = wired.clone();
        let mut pipeline = Pipeline::from_wiring(
            SourceKind::Iterable,
            Box::new(move || {
                flag.fetch_add(1, Ordering::SeqCst);
                stream::iter(vec![Ok::<i32, PipelineError>(1), Ok(2)]).boxed()
            }),
        );

        assert!(!pipeline.is_started());
        assert_eq!(wired.load(Ordering::SeqCst), 0);

        assert_eq!(pipeline.try_next().await.unwrap(), Some(1));
        assert!(pipeline.is_started());
        assert!(pipeline.run_id().is_some());
        assert_eq!(wired.load(Ordering::SeqCst), 1);

        assert_eq!(pipeline.try_next().await.unwrap(), Some(2));
        assert_eq!(pipeline.try_next().await.unwrap(), None);
        assert!(pipeline.is_terminated());
        assert_eq!(wired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_pipe_records_stage_order() {
        let pipeline = Pipeline::from_iterable(vec![1, 2, 3])
            .pipe(MapStage::new(|x: i32| future::ready(anyhow::Ok(x + 1))))
            .pipe(TakeStage::new(2));

        assert_eq!(pipeline.stages(), &[StageKind::Map, StageKind::Take]);
        assert_eq!(pipeline.to_vec().await.unwrap(), vec![2, 3]);
    }

    #[tokio::test]
    async fn test_pipe_onto_running_pass_continues_it() {
        let mut pipeline = Pipeline::from_iterable(vec![1, 2, 3, 4]);
        assert_eq!(pipeline.try_next().await.unwrap(), Some(1));

        let rest = pipeline.map(|x| x * 10).to_vec().await.unwrap();
        assert_eq!(rest, vec![20, 30, 40]);
    }

    #[tokio::test]
    async fn test_pipe_onto_finished_pass_is_empty() {
        let mut pipeline = Pipeline::from_iterable(vec![1]);
        while pipeline.try_next().await.unwrap().is_some() {}

        assert!(pipeline.map(|x| x + 1).to_vec().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_error_finishes_pass() {
        let mut pipeline = Pipeline::from_iterable(vec![1, 2, 3]).try_map(|x| async move {
            if x == 2 {
                anyhow::bail!("Boom!");
            }
            Ok(x)
        });

        assert_eq!(pipeline.try_next().await.unwrap(), Some(1));
        assert!(pipeline.try_next().await.is_err());
        assert!(pipeline.is_terminated());
        assert!(pipeline.next().await.is_none());
    }

    #[tokio::test]
    async fn test_pass_starts_once_when_extended() {
        let mut pipeline = Pipeline::from_iterable(vec![1, 2, 3]);
        assert_eq!(pipeline.try_next().await.unwrap(), Some(1));
        let run_id = pipeline.run_id();

        let mut extended = pipeline.map(|x| x + 1);
        assert!(!extended.begin_pass());
        assert_eq!(extended.run_id(), run_id);
        assert_eq!(extended.try_next().await.unwrap(), Some(3));
        assert_eq!(extended.run_id(), run_id);
    }

    #[test]
    fn test_begin_pass_assigns_run_id_once() {
        let mut pipeline = Pipeline::from_iterable(vec![1]);

        assert!(pipeline.begin_pass());
        let run_id = pipeline.run_id();
        assert!(run_id.is_some());
        assert!(!pipeline.begin_pass());
        assert_eq!(pipeline.run_id(), run_id);
    }

    #[test]
    fn test_blocking_iter() {
        let items: Vec<i32> = Pipeline::from_iterable(vec![1, 2, 3])
            .map(|x| x * 2)
            .into_blocking_iter()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(items, vec![2, 4, 6]);
    }

    #[test]
    fn test_debug_output() {
        let pipeline = Pipeline::from_iterable(vec![1]).named("ingest").map(|x| x);
        let rendered = format!("{pipeline:?}");

        assert!(rendered.contains("ingest"));
        assert!(rendered.contains("Map"));
        assert!(rendered.contains("pending"));
    }
}
