//! sluice - a manifest-driven front-end asset pipeline runner
//!
//! This crate provides the library behind the `sluice` binary: manifest
//! loading, per-bundle pipelines, the revision ledger and the task graph.
//! Compilers, minifiers and linters are external tools driven through
//! [`tools`].

pub mod core;
pub mod graph;
pub mod ops;
pub mod pipeline;
pub mod tools;
pub mod util;

/// Test utilities and fake tools for sluice unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides in-process tools and project fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{
    dependency::{AssetType, Dependency},
    error::AssetError,
    manifest::Manifest,
    options::{BuildOptions, FailurePolicy},
};

pub use graph::{Task, TaskGraph};
pub use ops::TaskContext;
pub use util::context::GlobalContext;
