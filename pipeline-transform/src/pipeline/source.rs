//! Pipeline constructors.
//!
//! The source is classified when the pipeline is created: a synchronous
//! iterable, an asynchronous stream (fallible or not), a raw byte buffer or
//! an async byte reader. Every kind ends up as the same item stream feeding
//! the first stage.

use super::engine::Pipeline;
use crate::errors::{ArgumentError, PipelineError, Result};
use futures::{stream, Stream, StreamExt, TryStream, TryStreamExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::io::{AsyncRead, AsyncReadExt};

/// How a pipeline's source was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// A synchronous iterable (vector, array, range, iterator).
    Iterable,
    /// An asynchronous stream.
    Stream,
    /// An in-memory byte buffer.
    Bytes,
    /// An async byte reader.
    Reader,
}

impl SourceKind {
    /// Returns the kind name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Iterable => "iterable",
            Self::Stream => "stream",
            Self::Bytes => "bytes",
            Self::Reader => "reader",
        }
    }

    /// Returns true if pulling from this source may suspend.
    #[must_use]
    pub fn is_async(&self) -> bool {
        matches!(self, Self::Stream | Self::Reader)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'a, T: Send + 'a> Pipeline<'a, T> {
    /// Creates a pipeline over a synchronous iterable.
    ///
    /// The iterator may be infinite; it is only advanced as items are pulled.
    pub fn from_iterable<I>(iterable: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'a,
    {
        let iter = iterable.into_iter();
        Self::from_wiring(
            SourceKind::Iterable,
            Box::new(move || stream::iter(iter.map(Ok::<T, PipelineError>)).boxed()),
        )
    }

    /// Creates a pipeline over an asynchronous stream.
    pub fn from_stream<S>(source: S) -> Self
    where
        S: Stream<Item = T> + Send + 'a,
    {
        Self::from_wiring(
            SourceKind::Stream,
            Box::new(move || source.map(Ok::<T, PipelineError>).boxed()),
        )
    }

    /// Creates a pipeline over a fallible asynchronous stream.
    ///
    /// A source error is yielded as [`PipelineError::Source`] and ends the pass.
    pub fn from_try_stream<S, E>(source: S) -> Self
    where
        S: TryStream<Ok = T, Error = E> + Send + 'a,
        E: Into<anyhow::Error> + 'a,
    {
        Self::from_wiring(
            SourceKind::Stream,
            Box::new(move || source.map_err(PipelineError::from_source).boxed()),
        )
    }
}

impl<'a> Pipeline<'a, Vec<u8>> {
    /// Creates a pipeline over an in-memory byte buffer.
    ///
    /// The buffer is yielded as a single chunk; an empty buffer yields nothing.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        let chunk = (!bytes.is_empty()).then_some(bytes);
        Self::from_wiring(
            SourceKind::Bytes,
            Box::new(move || stream::iter(chunk.map(Ok::<Vec<u8>, PipelineError>)).boxed()),
        )
    }

    /// Creates a pipeline reading chunks of at most `chunk_size` bytes.
    ///
    /// Read errors surface as [`PipelineError::Io`]. The reader is dropped
    /// when the pass ends, including early termination by `take` or a
    /// short-circuiting consumer.
    ///
    /// # Errors
    ///
    /// Returns an argument error if `chunk_size` is zero.
    pub fn from_reader<R>(reader: R, chunk_size: usize) -> Result<Self>
    where
        R: AsyncRead + Send + Unpin + 'a,
    {
        if chunk_size == 0 {
            return Err(ArgumentError::non_positive("from_reader", "chunk_size").into());
        }

        Ok(Self::from_wiring(
            SourceKind::Reader,
            Box::new(move || {
                stream::try_unfold(reader, move |reader| read_chunk(reader, chunk_size)).boxed()
            }),
        ))
    }
}

async fn read_chunk<R>(mut reader: R, chunk_size: usize) -> Result<Option<(Vec<u8>, R)>>
where
    R: AsyncRead + Unpin,
{
    let mut chunk = vec![0u8; chunk_size];
    let read = reader.read(&mut chunk).await?;
    if read == 0 {
        return Ok(None);
    }
    chunk.truncate(read);
    Ok(Some((chunk, reader)))
}

impl<'a, T: Send + 'a> From<Vec<T>> for Pipeline<'a, T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_iterable(items)
    }
}
