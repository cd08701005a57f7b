use asmc::engine::config as core_config;

pub struct ExtractionAppConfig {
    pub reference_chain: char,
    pub target_chain: Option<char>,
    pub core_config: core_config::ExtractionConfig,
}

pub struct ClusteringAppConfig {
    pub write_distances: bool,
    pub core_config: core_config::ClusteringConfig,
}
