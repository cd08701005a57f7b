use super::progress_handler;
use crate::cli::ClusterArgs;
use crate::config::build_clustering_config;
use crate::error::{CliError, Result};
use asmc::core::io::fasta::FastaFile;
use asmc::core::io::tables::{write_distance_matrix, write_rows_to_path};
use asmc::core::io::traits::SequenceProvider;
use asmc::engine::progress::ProgressReporter;
use asmc::workflows::cluster;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;

const SUMMARY_FILE: &str = "cluster_summary.tsv";
const DISTANCES_FILE: &str = "distances.tsv";
const LOGO_DIR: &str = "logos";

/// Name of the groups table, keyed by the clustering parameters.
pub fn groups_file_name(epsilon: f64, min_samples: usize) -> String {
    format!("groups_{}_min_{}.tsv", epsilon, min_samples)
}

pub fn run(args: ClusterArgs, show_progress: bool) -> Result<()> {
    let app = build_clustering_config(&args)?;
    let config = &app.core_config;

    info!("Loading motifs from {:?}", &args.input);
    let records = FastaFile::read_from_path(&args.input).map_err(|e| CliError::parsing(&args.input, e))?;
    let motifs = cluster::motifs_from_records(records)?;
    if motifs.is_empty() {
        return Err(CliError::Argument(format!(
            "No motifs found in {}",
            args.input.display()
        )));
    }
    println!(
        "Clustering {} motif(s) of length {} (epsilon = {}, min samples = {})",
        motifs.len(),
        motifs.motif_length().unwrap_or(0),
        config.epsilon,
        config.min_samples
    );

    let handler = progress_handler(show_progress);
    let reporter = ProgressReporter::with_callback(handler.get_callback());
    let result = cluster::run(&motifs, config, &reporter);

    let out_dir = &args.output_dir;
    fs::create_dir_all(out_dir.join(LOGO_DIR))?;

    let groups_path = out_dir.join(groups_file_name(config.epsilon, config.min_samples));
    write_rows_to_path(result.group_rows(&motifs), &groups_path)
        .map_err(|e| CliError::output(&groups_path, e))?;

    let summary_path = out_dir.join(SUMMARY_FILE);
    write_rows_to_path(result.summary_rows(), &summary_path)
        .map_err(|e| CliError::output(&summary_path, e))?;

    for (cluster_id, table) in result.logo_tables() {
        let logo_path = logo_path(out_dir, cluster_id);
        write_rows_to_path(table.to_rows(), &logo_path).map_err(|e| CliError::output(&logo_path, e))?;
    }

    if app.write_distances {
        let distances_path = out_dir.join(DISTANCES_FILE);
        let file = File::create(&distances_path).map_err(|e| CliError::output(&distances_path, e))?;
        write_distance_matrix(result.matrix.ids(), result.matrix.values(), BufWriter::new(file))
            .map_err(|e| CliError::output(&distances_path, e))?;
    }

    println!(
        "Found {} cluster(s); {} motif(s) labelled as noise.",
        result.assignment.cluster_count(),
        result.assignment.noise_count()
    );
    for profile in &result.profiles {
        println!(
            "  Cluster {}: {} member(s), consensus {}, mean conservation {:.2}",
            profile.cluster,
            profile.members,
            profile.consensus(),
            profile.mean_conservation()
        );
    }
    println!("Groups table written to: {}", groups_path.display());
    Ok(())
}

fn logo_path(out_dir: &Path, cluster_id: usize) -> PathBuf {
    out_dir.join(LOGO_DIR).join(format!("cluster_{}.tsv", cluster_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use asmc::core::io::tables::{GroupRow, LogoRow, read_rows_from_path};
    use tempfile::tempdir;

    fn args(input: PathBuf, output_dir: PathBuf) -> ClusterArgs {
        ClusterArgs {
            input,
            output_dir,
            epsilon: Some(0.1),
            min_samples: Some(2),
            substitution_matrix: None,
            write_distances: true,
            config: None,
            set_values: vec![],
        }
    }

    #[test]
    fn groups_file_name_matches_parameters() {
        assert_eq!(groups_file_name(0.25, 2), "groups_0.25_min_2.tsv");
        assert_eq!(groups_file_name(0.5, 3), "groups_0.5_min_3.tsv");
    }

    #[test]
    fn writes_every_table() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("motifs.fasta");
        fs::write(
            &input,
            ">a\nSHD\n>b\nSHD\n>c\nSHD\n>d\nKRE\n>e\nKRE\n>f\nWWW\n",
        )
        .unwrap();
        let out = dir.path().join("out");

        run(args(input, out.clone()), false).unwrap();

        let groups: Vec<GroupRow> = read_rows_from_path(&out.join("groups_0.1_min_2.tsv")).unwrap();
        let labels: Vec<i64> = groups.iter().map(|g| g.cluster).collect();
        assert_eq!(labels, vec![0, 0, 0, 1, 1, -1]);

        let logo: Vec<LogoRow> = read_rows_from_path(&logo_path(&out, 0)).unwrap();
        assert_eq!(logo.len(), 3);
        assert!(out.join(SUMMARY_FILE).is_file());
        assert!(out.join(DISTANCES_FILE).is_file());
        assert!(!logo_path(&out, 2).exists());
    }

    #[test]
    fn empty_input_is_rejected() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("empty.fasta");
        fs::write(&input, "").unwrap();
        let result = run(args(input, dir.path().join("out")), false);
        assert!(matches!(result, Err(CliError::Argument(_))));
    }
}
