pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{LocalStorage, TomlConfig};

pub use crate::core::{
    fetcher::ManifestFetcher, icon_probe::IconProber, manifest_builder::ManifestBuilder,
    pipeline::ViewerPipeline, renderer::TileRenderer, viewer::ViewerEngine,
};
pub use domain::model::{FailurePolicy, IconRecord, Manifest, Tile};
pub use utils::error::{Result, ViewerError};
