use crate::core::io::matrix::SubstitutionMatrix;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_DISTANCE_CUTOFF: f64 = 4.0;
pub const DEFAULT_MIN_COVERAGE: usize = 0;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// How residue pairs for the rigid superposition are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PoseStrategy {
    /// The first `k` CA atoms of each chain, `k` being the smaller CA count.
    Positional,
    /// Identical residue pairs from a global alignment of the two CA sequences.
    #[default]
    SequenceAligned,
}

impl fmt::Display for PoseStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoseStrategy::Positional => write!(f, "positional"),
            PoseStrategy::SequenceAligned => write!(f, "sequence-aligned"),
        }
    }
}

impl FromStr for PoseStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positional" => Ok(PoseStrategy::Positional),
            "sequence-aligned" | "sequence_aligned" | "aligned" => Ok(PoseStrategy::SequenceAligned),
            other => Err(ConfigError::InvalidParameter {
                name: "pose",
                reason: format!("unknown pose strategy '{}'", other),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructuralConfig {
    pub distance_cutoff: f64,
    pub pose: PoseStrategy,
}

impl Default for StructuralConfig {
    fn default() -> Self {
        Self {
            distance_cutoff: DEFAULT_DISTANCE_CUTOFF,
            pose: PoseStrategy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractionConfig {
    pub structural: StructuralConfig,
    /// Minimum number of resolved positions for a motif to enter the set.
    pub min_coverage: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            structural: StructuralConfig::default(),
            min_coverage: DEFAULT_MIN_COVERAGE,
        }
    }
}

#[derive(Default)]
pub struct ExtractionConfigBuilder {
    distance_cutoff: Option<f64>,
    pose: Option<PoseStrategy>,
    min_coverage: Option<usize>,
}

impl ExtractionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn distance_cutoff(mut self, cutoff: f64) -> Self {
        self.distance_cutoff = Some(cutoff);
        self
    }
    pub fn pose(mut self, pose: PoseStrategy) -> Self {
        self.pose = Some(pose);
        self
    }
    pub fn min_coverage(mut self, min_coverage: usize) -> Self {
        self.min_coverage = Some(min_coverage);
        self
    }

    pub fn build(self) -> Result<ExtractionConfig, ConfigError> {
        let distance_cutoff = self.distance_cutoff.unwrap_or(DEFAULT_DISTANCE_CUTOFF);
        if !distance_cutoff.is_finite() || distance_cutoff <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "distance_cutoff",
                reason: format!("must be a positive number of Ångström, got {}", distance_cutoff),
            });
        }
        Ok(ExtractionConfig {
            structural: StructuralConfig {
                distance_cutoff,
                pose: self.pose.unwrap_or_default(),
            },
            min_coverage: self.min_coverage.unwrap_or(DEFAULT_MIN_COVERAGE),
        })
    }
}

/// Per-pair motif scoring used to fill the dissimilarity matrix.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Scoring {
    /// Fraction of mismatching positions; placeholders never match.
    #[default]
    Identity,
    /// Normalized substitution score distance.
    Substitution(SubstitutionMatrix),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusteringConfig {
    pub epsilon: f64,
    pub min_samples: usize,
    pub scoring: Scoring,
}

#[derive(Default)]
pub struct ClusteringConfigBuilder {
    epsilon: Option<f64>,
    min_samples: Option<usize>,
    scoring: Option<Scoring>,
}

impl ClusteringConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = Some(epsilon);
        self
    }
    pub fn min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = Some(min_samples);
        self
    }
    pub fn scoring(mut self, scoring: Scoring) -> Self {
        self.scoring = Some(scoring);
        self
    }

    pub fn build(self) -> Result<ClusteringConfig, ConfigError> {
        let epsilon = self
            .epsilon
            .ok_or(ConfigError::MissingParameter("epsilon"))?;
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "epsilon",
                reason: format!("must be a finite, non-negative number, got {}", epsilon),
            });
        }
        let min_samples = self
            .min_samples
            .ok_or(ConfigError::MissingParameter("min_samples"))?;
        if min_samples == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "min_samples",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(ClusteringConfig {
            epsilon,
            min_samples,
            scoring: self.scoring.unwrap_or_default(),
        })
    }
}
