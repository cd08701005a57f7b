use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileExtractionConfig {
    pub reference_chain: Option<char>,
    pub target_chain: Option<char>,
    pub distance_cutoff: Option<f64>,
    pub pose: Option<String>,
    pub min_coverage: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileClusteringConfig {
    pub epsilon: Option<f64>,
    pub min_samples: Option<usize>,
    pub substitution_matrix: Option<PathBuf>,
    pub write_distances: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub extraction: Option<FileExtractionConfig>,
    pub clustering: Option<FileClusteringConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::parsing(path, e))
    }

    /// Loads `path` when given, or starts from an empty configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Applies `-S key=value` overrides on top of the file values.
    pub fn apply_set_values(mut self, set_values: &[String]) -> Result<Self> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let key = key.trim();
            let value_str = value_str.trim();

            match key {
                "extraction.reference-chain" => {
                    self.extraction.get_or_insert_with(Default::default).reference_chain =
                        Some(parse_value(key, value_str, "character")?);
                }
                "extraction.target-chain" => {
                    self.extraction.get_or_insert_with(Default::default).target_chain =
                        Some(parse_value(key, value_str, "character")?);
                }
                "extraction.distance-cutoff" => {
                    self.extraction.get_or_insert_with(Default::default).distance_cutoff =
                        Some(parse_value(key, value_str, "float")?);
                }
                "extraction.pose" => {
                    self.extraction.get_or_insert_with(Default::default).pose = Some(value_str.to_string());
                }
                "extraction.min-coverage" => {
                    self.extraction.get_or_insert_with(Default::default).min_coverage =
                        Some(parse_value(key, value_str, "integer")?);
                }
                "clustering.epsilon" => {
                    self.clustering.get_or_insert_with(Default::default).epsilon =
                        Some(parse_value(key, value_str, "float")?);
                }
                "clustering.min-samples" => {
                    self.clustering.get_or_insert_with(Default::default).min_samples =
                        Some(parse_value(key, value_str, "integer")?);
                }
                "clustering.substitution-matrix" => {
                    self.clustering.get_or_insert_with(Default::default).substitution_matrix =
                        Some(PathBuf::from(value_str));
                }
                "clustering.write-distances" => {
                    self.clustering.get_or_insert_with(Default::default).write_distances =
                        Some(parse_value(key, value_str, "boolean")?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(self)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value)))
}
