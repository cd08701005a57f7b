use asmc::engine::config::{DEFAULT_DISTANCE_CUTOFF, DEFAULT_MIN_COVERAGE, PoseStrategy};

pub struct DefaultsConfig {
    pub reference_chain: char,
    pub distance_cutoff: f64,
    pub pose: PoseStrategy,
    pub min_coverage: usize,
    pub epsilon: f64,
    pub min_samples: usize,
    pub write_distances: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            reference_chain: 'A',
            distance_cutoff: DEFAULT_DISTANCE_CUTOFF,
            pose: PoseStrategy::default(),
            min_coverage: DEFAULT_MIN_COVERAGE,
            epsilon: 0.5,
            min_samples: 3,
            write_distances: false,
        }
    }
}
