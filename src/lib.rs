pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use app::pipelines::plot_pipeline::PlotPipeline;
pub use config::cli::LocalStorage;
#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::toml_config::TomlConfig;

pub use core::engine::PlotEngine;
pub use domain::model::{ColorSource, CoordinateRecord, LoadStatus, MalformedRecordPolicy};
pub use utils::error::{PlotError, Result};
