pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::cli::LocalStorage;
pub use crate::config::toml_config::TomlConfig;

pub use crate::core::{etl::EtlEngine, pipeline::LoopListPipeline};
pub use crate::domain::model::{Cell, CleanResult, CleanRules, OutputTargets, Sheet};
pub use crate::utils::error::{EtlError, Result};
