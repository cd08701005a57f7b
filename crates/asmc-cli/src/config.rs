//! Layered command configuration: CLI flags, then `-S` overrides, then the TOML file, then defaults.

mod builder;
mod defaults;
mod file;
mod models;

pub use builder::{build_clustering_config, build_extraction_config};
pub use models::{ClusteringAppConfig, ExtractionAppConfig};
