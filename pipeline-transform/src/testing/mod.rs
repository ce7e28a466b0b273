//! Testing utilities for pipelines.
//!
//! This module provides:
//! - Infinite and counted sources
//! - Side-effect probes for counting pulls
//! - Failing stage functions
//! - Assertions over pipeline output

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{assert_stage_failed, assert_yields};
pub use fixtures::{init_tracing, naturals, Counter};
pub use mocks::{fail_on, fail_reducer_on};
