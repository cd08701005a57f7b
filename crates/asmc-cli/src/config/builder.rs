use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::{ClusteringAppConfig, ExtractionAppConfig};
use crate::cli::{ClusterArgs, ExtractArgs};
use crate::error::{CliError, Result};
use asmc::core::io::matrix::SubstitutionMatrix;
use asmc::engine::config as core_config;
use asmc::engine::config::PoseStrategy;
use std::path::Path;
use tracing::info;

pub fn build_extraction_config(args: &ExtractArgs) -> Result<ExtractionAppConfig> {
    let defaults = DefaultsConfig::default();
    let file_config = FileConfig::load(args.config.as_deref())?.apply_set_values(&args.set_values)?;
    let file = file_config.extraction.unwrap_or_default();

    let pose = match (args.pose, file.pose.as_deref()) {
        (Some(pose), _) => pose,
        (None, Some(name)) => name
            .parse::<PoseStrategy>()
            .map_err(|e| CliError::Config(e.to_string()))?,
        (None, None) => defaults.pose,
    };

    let core_config = core_config::ExtractionConfigBuilder::new()
        .distance_cutoff(
            args.distance_cutoff
                .or(file.distance_cutoff)
                .unwrap_or(defaults.distance_cutoff),
        )
        .pose(pose)
        .min_coverage(
            args.min_coverage
                .or(file.min_coverage)
                .unwrap_or(defaults.min_coverage),
        )
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(ExtractionAppConfig {
        reference_chain: args
            .reference_chain
            .or(file.reference_chain)
            .unwrap_or(defaults.reference_chain),
        target_chain: args.target_chain.or(file.target_chain),
        core_config,
    })
}

pub fn build_clustering_config(args: &ClusterArgs) -> Result<ClusteringAppConfig> {
    let defaults = DefaultsConfig::default();
    let file_config = FileConfig::load(args.config.as_deref())?.apply_set_values(&args.set_values)?;
    let file = file_config.clustering.unwrap_or_default();

    let scoring = match args
        .substitution_matrix
        .as_deref()
        .or(file.substitution_matrix.as_deref())
    {
        Some(path) => core_config::Scoring::Substitution(load_substitution_matrix(path)?),
        None => core_config::Scoring::Identity,
    };

    let core_config = core_config::ClusteringConfigBuilder::new()
        .epsilon(args.epsilon.or(file.epsilon).unwrap_or(defaults.epsilon))
        .min_samples(
            args.min_samples
                .or(file.min_samples)
                .unwrap_or(defaults.min_samples),
        )
        .scoring(scoring)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(ClusteringAppConfig {
        write_distances: args.write_distances
            || file.write_distances.unwrap_or(defaults.write_distances),
        core_config,
    })
}

fn load_substitution_matrix(path: &Path) -> Result<SubstitutionMatrix> {
    info!("Loading substitution matrix from {:?}", path);
    SubstitutionMatrix::read_from_path(path).map_err(|e| CliError::parsing(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::TargetInput;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn base_extract_args() -> ExtractArgs {
        ExtractArgs {
            reference_pdb: PathBuf::from("ref.pdb"),
            reference_sites: "10,12".to_string(),
            reference_chain: None,
            targets: TargetInput {
                target_pdb: None,
                target_dir: Some(PathBuf::from("targets")),
                target_fasta: None,
                target_msa: None,
            },
            msa_reference: None,
            target_chain: None,
            output: PathBuf::from("out"),
            distance_cutoff: None,
            pose: None,
            min_coverage: None,
            config: None,
            set_values: vec![],
        }
    }

    fn base_cluster_args() -> ClusterArgs {
        ClusterArgs {
            input: PathBuf::from("motifs.fasta"),
            output_dir: PathBuf::from("out"),
            epsilon: None,
            min_samples: None,
            substitution_matrix: None,
            write_distances: false,
            config: None,
            set_values: vec![],
        }
    }

    #[test]
    fn extraction_defaults_apply_without_file() {
        let app = build_extraction_config(&base_extract_args()).unwrap();
        assert_eq!(app.reference_chain, 'A');
        assert_eq!(app.target_chain, None);
        assert_eq!(app.core_config.structural.distance_cutoff, 4.0);
        assert_eq!(app.core_config.structural.pose, PoseStrategy::SequenceAligned);
        assert_eq!(app.core_config.min_coverage, 0);
    }

    #[test]
    fn cli_beats_set_values_which_beat_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("asmc.toml");
        fs::write(
            &path,
            "[extraction]\ndistance-cutoff = 5.0\nmin-coverage = 1\npose = \"positional\"\nreference-chain = \"B\"\n",
        )
        .unwrap();

        let mut args = base_extract_args();
        args.config = Some(path);
        args.set_values = vec!["extraction.min-coverage=2".to_string()];
        args.distance_cutoff = Some(3.0);

        let app = build_extraction_config(&args).unwrap();
        assert_eq!(app.core_config.structural.distance_cutoff, 3.0);
        assert_eq!(app.core_config.min_coverage, 2);
        assert_eq!(app.core_config.structural.pose, PoseStrategy::Positional);
        assert_eq!(app.reference_chain, 'B');
    }

    #[test]
    fn invalid_values_surface_as_config_errors() {
        let mut args = base_extract_args();
        args.distance_cutoff = Some(-1.0);
        assert!(matches!(build_extraction_config(&args), Err(CliError::Config(_))));

        let mut args = base_extract_args();
        args.set_values = vec!["extraction.pose=sideways".to_string()];
        assert!(matches!(build_extraction_config(&args), Err(CliError::Config(_))));

        let mut args = base_cluster_args();
        args.min_samples = Some(0);
        assert!(matches!(build_clustering_config(&args), Err(CliError::Config(_))));
    }

    #[test]
    fn clustering_defaults_and_substitution_matrix() {
        let app = build_clustering_config(&base_cluster_args()).unwrap();
        assert_eq!(app.core_config.epsilon, 0.5);
        assert_eq!(app.core_config.min_samples, 3);
        assert_eq!(app.core_config.scoring, core_config::Scoring::Identity);
        assert!(!app.write_distances);

        let dir = tempdir().unwrap();
        let matrix = dir.path().join("toy.mat");
        fs::write(&matrix, "   A  C\nA  4  0\nC  0  9\n").unwrap();
        let mut args = base_cluster_args();
        args.set_values = vec![
            format!("clustering.substitution-matrix={}", matrix.display()),
            "clustering.write-distances=true".to_string(),
        ];
        let app = build_clustering_config(&args).unwrap();
        assert!(matches!(app.core_config.scoring, core_config::Scoring::Substitution(_)));
        assert!(app.write_distances);
    }

    #[test]
    fn missing_substitution_matrix_is_a_parsing_error() {
        let mut args = base_cluster_args();
        args.substitution_matrix = Some(PathBuf::from("/nonexistent/matrix.mat"));
        assert!(matches!(
            build_clustering_config(&args),
            Err(CliError::FileParsing { .. })
        ));
    }
}
