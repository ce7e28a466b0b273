//! # Pipeline Transform
//!
//! Lazy, chainable, pull-based transformation pipelines over synchronous
//! iterators and asynchronous streams.
//!
//! Pipeline Transform provides:
//!
//! - **Lazy composition**: stages are recorded by the builder and wired only
//!   when a consumer first pulls
//! - **Single-pass execution**: every item flows through the whole chain before
//!   the next one is read
//! - **Async stages**: per-item work may suspend without breaking ordering
//! - **Short-circuiting consumers**: `find`, `some`, `every`, `includes` and
//!   `take` stop pulling as soon as the answer is known
//! - **Event-driven observability**: `inspect` reports items to an event sink
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pipeline_transform::prelude::*;
//!
//! let evens = Pipeline::from_iterable(1..=10)
//!     .map(|x| x * 2)
//!     .filter(|x| *x > 5)
//!     .take(3)
//!     .to_vec()
//!     .await?;
//!
//! assert_eq!(evens, vec![6, 8, 10]);
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod errors;
pub mod events;
pub mod items;
pub mod pipeline;
pub mod stages;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::PipelineConfig;
    pub use crate::errors::{ArgumentError, ErrorInfo, PipelineError, Result, StageError};
    pub use crate::events::{
        get_event_sink, set_event_sink, CollectingEventSink, EventSink, LoggingEventSink,
        NoOpEventSink,
    };
    pub use crate::items::OneOrMany;
    pub use crate::pipeline::{Pipeline, SourceKind};
    pub use crate::stages::{ItemStream, Stage, StageKind};
}
