//! Stage trait and implementations.
//!
//! A stage transforms one item stream into another. The builder never
//! depends on a stage's concrete type: it only calls [`Stage::apply`] when a
//! pass is wired, and records [`Stage::kind`] for introspection.

mod batch;
mod concat;
mod expand;
mod filter;
mod map;
mod take;
mod tap;

pub use batch::BatchStage;
pub use concat::ConcatStage;
pub use expand::{FlatMapStage, FlatStage};
pub use filter::{FilterMapStage, FilterStage};
pub use map::MapStage;
pub use take::TakeStage;
pub use tap::{ForEachStage, InspectStage};

use crate::errors::PipelineError;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A boxed stream of fallible items; the currency passed between stages.
pub type ItemStream<'a, T> = BoxStream<'a, Result<T, PipelineError>>;

/// The shape of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// One output per input.
    Map,
    /// Keeps items matching a predicate.
    Filter,
    /// Keeps and converts items for which a function returns `Some`.
    FilterMap,
    /// Expands the result of a function one level.
    FlatMap,
    /// Expands nested sequences one level.
    Flat,
    /// Appends extra items after upstream is drained.
    Concat,
    /// Side effect per item, item passed through.
    ForEach,
    /// Diagnostic record per item, item passed through.
    Inspect,
    /// Groups contiguous items.
    Batch,
    /// Truncates the stream.
    Take,
}

impl StageKind {
    /// Returns the operation name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Map => "map",
            Self::Filter => "filter",
            Self::FilterMap => "filter_map",
            Self::FlatMap => "flat_map",
            Self::Flat => "flat",
            Self::Concat => "concat",
            Self::ForEach => "for_each",
            Self::Inspect => "inspect",
            Self::Batch => "batch",
            Self::Take => "take",
        }
    }

    /// Returns true if the stage can emit a different number of items than it reads.
    #[must_use]
    pub fn changes_cardinality(&self) -> bool {
        !matches!(self, Self::Map | Self::ForEach | Self::Inspect)
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for pipeline stages.
///
/// `apply` runs once per pass, when the pull chain is wired. It must not
/// poll `input`: all per-item work happens lazily inside the returned
/// stream.
pub trait Stage<'a, In, Out>: Send + 'a {
    /// Returns the shape of the stage.
    fn kind(&self) -> StageKind;

    /// Wraps the upstream item stream.
    fn apply(self, input: ItemStream<'a, In>) -> ItemStream<'a, Out>;
}
