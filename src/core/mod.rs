pub mod fetcher;
pub mod icon_probe;
pub mod manifest_builder;
pub mod pipeline;
pub mod renderer;
pub mod viewer;

pub use crate::domain::model::{FailurePolicy, IconRecord, Manifest, PageState, RenderedPage, Tile};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
