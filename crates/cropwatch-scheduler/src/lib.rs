//! cropwatch-scheduler: the daily partition key space.
//!
//! Defines which partition keys exist and which upstream partitions each
//! asset depends on. The scheduler never runs anything itself; callers use
//! it to enumerate work and to resolve dependencies before materializing.
//!
//! # Dependency graph
//!
//! ```text
//! raw(N)     ── no upstream
//! change(N)  ── raw(N - 1 day)      (NoPredecessor when N == start)
//! ```

pub mod error;
pub mod partitions;

pub use error::{SchedulerError, SchedulerResult};
pub use partitions::{DailyPartitions, KeySpace};
