//! Named tasks and their scheduling.
//!
//! A [`TaskGraph`] declares tasks; [`plan`] turns a request into ordered
//! levels; [`TaskExecutor`] runs each level on the rayon pool.

pub mod executor;
pub mod plan;
pub mod task;

pub use executor::{RunSummary, TaskExecutor};
pub use plan::{plan, Plan};
pub use task::{Step, Task, TaskAction, TaskGraph};
