pub mod classifier;
pub mod clustering;
pub mod engine;
pub mod output;
pub mod parser;
pub mod render;

pub use crate::domain::model::{CoordinateRecord, ExtractResult, RenderPlan};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
