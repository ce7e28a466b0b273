//! Pipeline building and execution.
//!
//! This module provides:
//! - Source classification and constructors
//! - Chainable stage operations (the builder)
//! - The lazy pull engine
//! - Terminal consumers

mod builder;
mod engine;
mod source;
mod terminal;


pub use engine::Pipeline;
pub use source::SourceKind;
