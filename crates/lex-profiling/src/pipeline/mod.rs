//! Pipeline module.
//!
//! This module provides the profiling job and its progress reporting.

mod job;
pub mod progress;

pub use job::{ProfilingJob, ProfilingJobBuilder};
pub use progress::{ClosureProgressReporter, ProfilingStage, ProgressReporter, ProgressUpdate};
