//! Pass-through stages with side effects.

use super::{ItemStream, Stage, StageKind};
use crate::errors::PipelineError;
use crate::events::EventSink;
use futures::{StreamExt, TryStreamExt};
use serde_json::{json, Value};
use std::fmt::Debug;
use std::sync::Arc;

/// Calls a function with a reference to every item, then yields the item.
pub struct ForEachStage<F> {
    func: F,
}

impl<F> ForEachStage<F> {
    /// Creates a new for-each stage.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<'a, T, F> Stage<'a, T, T> for ForEachStage<F>
where
    T: Send + 'a,
    F: FnMut(&T) + Send + 'a,
{
    fn kind(&self) -> StageKind {
        StageKind::ForEach
    }

    fn apply(self, input: ItemStream<'a, T>) -> ItemStream<'a, T> {
        input.inspect_ok(self.func).boxed()
    }
}

/// Reports every item to an [`EventSink`], then yields the item.
pub struct InspectStage {
    labels: Value,
    event_type: String,
    sink: Arc<dyn EventSink>,
}

impl InspectStage {
    /// Creates a new inspect stage.
    pub fn new(labels: Vec<String>, event_type: impl Into<String>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            labels: Value::from(labels),
            event_type: event_type.into(),
            sink,
        }
    }
}

impl<'a, T> Stage<'a, T, T> for InspectStage
where
    T: Debug + Send + 'a,
{
    fn kind(&self) -> StageKind {
        StageKind::Inspect
    }

    fn apply(self, input: ItemStream<'a, T>) -> ItemStream<'a, T> {
        let Self {
            labels,
            event_type,
            sink,
        } = self;

        input
            .and_then(move |item| {
                let sink = Arc::clone(&sink);
                let event_type = event_type.clone();
                let data = json!({ "labels": labels.clone(), "item": format!("{item:?}") });
                async move {
                    sink.emit(&event_type, Some(data)).await;
                    Ok::<T, PipelineError>(item)
                }
            })
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{CollectingEventSink, MockEventSink};
    use crate::stages::test_support::{drain, items};

    #[tokio::test]
    async fn test_for_each_sees_every_item() {
        let mut seen = Vec::new();
        let out = drain(ForEachStage::new(|x: &i32| seen.push(*x)).apply(items(vec![1, 2, 3])))
            .await
            .unwrap();

        assert_eq!(out, vec![1, 2, 3]);
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_inspect_records_labels_and_item() {
        let sink = Arc::new(CollectingEventSink::new());
        let stage = InspectStage::new(vec!["initial".into(), "x".into()], "pipeline.inspect", sink.clone());
        let out = drain(stage.apply(items(vec!["a", "b"]))).await.unwrap();

        assert_eq!(out, vec!["a", "b"]);
        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].0, "pipeline.inspect");
        assert_eq!(
            events[1].1,
            Some(json!({ "labels": ["initial", "x"], "item": "\"b\"" }))
        );
    }

    #[tokio::test]
    async fn test_inspect_emits_once_per_item() {
        let mut mock = MockEventSink::new();
        mock.expect_emit()
            .withf(|event_type, data| event_type.to_string() == "probe" && data.is_some())
            .times(3)
            .returning(|_, _| ());

        let stage = InspectStage::new(vec![], "probe", Arc::new(mock));
        let out = drain(stage.apply(items(vec![1, 2, 3]))).await.unwrap();

        assert_eq!(out, vec![1, 2, 3]);
    }
}
