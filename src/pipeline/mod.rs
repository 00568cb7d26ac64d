//! Bundle pipelines.
//!
//! - [`factory`] builds the ordered stage list for one bundle
//! - [`stage`] executes stages over in-memory files
//! - [`runner`] runs every bundle of a type and writes the outputs
//! - [`ledger`] records fingerprinted names in the revision manifest
//! - [`reload`] and [`events`] report writes to listeners

pub mod asset;
pub mod events;
pub mod factory;
pub mod ledger;
pub mod reload;
pub mod runner;
pub mod sourcemap;
pub mod stage;

pub use asset::AssetFile;
pub use events::{BuildEvent, MessageFormat};
pub use factory::{build_pipeline, PipelineSettings};
pub use ledger::RevisionLedger;
pub use reload::{ReloadEvent, ReloadHub};
pub use runner::{BundleRunner, CombinedOutput};
pub use stage::{FileFilter, Pipeline, PipelineOutput, Stage, StageEnv, ToolRole};
