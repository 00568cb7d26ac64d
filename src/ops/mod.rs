//! High-level operations.
//!
//! One module per task family. Every operation takes the explicit
//! [`TaskContext`]; [`tasks::standard_graph`] wires them into the task DAG.

pub mod assets;
pub mod bundles;
pub mod clean;
pub mod context;
pub mod generate;
pub mod inject;
pub mod lint;
pub mod tasks;
pub mod watch;

pub use context::TaskContext;
pub use tasks::{standard_graph, DEFAULT_TASK};
pub use watch::{watch, WatchBatch, WatchRules};
