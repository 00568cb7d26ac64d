//! Core data structures for sluice.
//!
//! This module contains the foundational types used throughout sluice:
//! - The asset manifest and its bundles
//! - Build options and the failure policy
//! - The classified error type

pub mod dependency;
pub mod error;
pub mod manifest;
pub mod options;

pub use dependency::{AssetType, Dependency};
pub use error::{AssetError, ErrorKind};
pub use manifest::Manifest;
pub use options::{BuildOptions, FailurePolicy};
