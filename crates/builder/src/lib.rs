#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Build orchestration for kiln
//!
//! This crate sequences a native library build against prebuilt dependency
//! packages: it maps resolved dependency artifacts into build-system cache
//! variables, then drives patch -> configure -> build -> install through
//! external tools, collecting the produced artifacts at the end.
//!
//! The external collaborators (build driver, patch tool, source fetcher)
//! sit behind traits so the pipeline can be exercised without a toolchain.

pub mod artifacts;
pub mod cmake;
pub mod context;
pub mod fetch;
pub mod manifest;
pub mod patch;
pub mod pipeline;
pub mod variables;

pub use artifacts::collect_artifacts;
pub use cmake::{BuildDriver, CMakeDriver};
pub use context::{BuildContext, CommandResult};
pub use fetch::{HttpFetcher, SourceFetcher};
pub use manifest::{DependencySpec, ProjectManifest};
pub use patch::{Patcher, SystemPatcher};
pub use pipeline::Builder;
pub use variables::build_variables;
