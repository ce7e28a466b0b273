//! Grouping contiguous items.

use super::{ItemStream, Stage, StageKind};
use crate::errors::{ArgumentError, PipelineError};
use futures::stream::TryChunksError;
use futures::{StreamExt, TryStreamExt};
use std::num::NonZeroUsize;

/// Groups items into vectors of `size`, yielding a trailing partial group.
#[derive(Debug, Clone, Copy)]
pub struct BatchStage {
    size: NonZeroUsize,
}

impl BatchStage {
    /// Creates a new batch stage.
    ///
    /// # Errors
    ///
    /// Returns an argument error if `size` is zero.
    pub fn new(size: usize) -> Result<Self, PipelineError> {
        let size = NonZeroUsize::new(size).ok_or_else(|| ArgumentError::non_positive("batch", "size"))?;
        Ok(Self { size })
    }

    /// Returns the group size.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size.get()
    }
}

impl<'a, T> Stage<'a, T, Vec<T>> for BatchStage
where
    T: Send + 'a,
{
    fn kind(&self) -> StageKind {
        StageKind::Batch
    }

    fn apply(self, input: ItemStream<'a, T>) -> ItemStream<'a, Vec<T>> {
        // The partially filled group is discarded when upstream fails.
        input
            .try_chunks(self.size())
            .map_err(|TryChunksError(_, err)| err)
            .boxed()
    }
}
