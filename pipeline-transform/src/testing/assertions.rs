//! Test assertions for pipeline output.

use crate::errors::PipelineError;
use crate::pipeline::Pipeline;
use std::fmt::Debug;

/// Asserts that the pipeline yields exactly `expected`, in order.
pub async fn assert_yields<'a, T>(pipeline: Pipeline<'a, T>, expected: &[T])
where
    T: Debug + PartialEq + Send + 'a,
{
    match pipeline.to_vec().await {
        Ok(items) => assert_eq!(
            items.as_slice(),
            expected,
            "Pipeline yielded {items:?}, expected {expected:?}"
        ),
        Err(err) => panic!("Expected pipeline to yield {expected:?}, got error: {err}"),
    }
}

/// Asserts that `result` is a stage failure raised by `operation`.
pub fn assert_stage_failed<T: Debug>(result: &Result<T, PipelineError>, operation: &str) {
    match result {
        Err(PipelineError::Stage(err)) => assert_eq!(
            err.operation, operation,
            "Expected stage '{}' to fail, but '{}' did",
            operation, err.operation
        ),
        other => panic!("Expected stage '{operation}' to fail, got {other:?}"),
    }
}
