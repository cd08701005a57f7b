use crate::core::io::tables::{ClusterSummaryRow, GroupRow};
use crate::core::io::traits::SequenceRecord;
use crate::core::models::motif::{Motif, MotifSet};
use crate::engine::clustering::{ClusterAssignment, ClusterLabel, dbscan};
use crate::engine::config::ClusteringConfig;
use crate::engine::consensus::{ConsensusProfile, LogoTable, cluster_profiles};
use crate::engine::dissimilarity::{DissimilarityMatrix, build_matrix};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct ClusteringResult {
    pub matrix: DissimilarityMatrix,
    pub assignment: ClusterAssignment,
    pub profiles: Vec<ConsensusProfile>,
}

impl ClusteringResult {
    /// One row per motif, in motif set order.
    pub fn group_rows(&self, motifs: &MotifSet) -> Vec<GroupRow> {
        self.assignment
            .iter()
            .map(|(id, label)| GroupRow {
                id: id.to_string(),
                active_site: motifs.get(id).map(Motif::to_string).unwrap_or_default(),
                cluster: label.as_i64(),
            })
            .collect()
    }

    /// One row per cluster, followed by a noise row when any motif was left unclustered.
    pub fn summary_rows(&self) -> Vec<ClusterSummaryRow> {
        let mut rows: Vec<ClusterSummaryRow> = self
            .profiles
            .iter()
            .map(|profile| ClusterSummaryRow {
                cluster: profile.cluster as i64,
                members: profile.members,
                consensus: profile.consensus(),
                mean_conservation: format!("{:.3}", profile.mean_conservation()),
                conserved_positions: conserved_positions(profile),
            })
            .collect();

        let noise = self.assignment.noise_count();
        if noise > 0 {
            rows.push(ClusterSummaryRow {
                cluster: ClusterLabel::Noise.as_i64(),
                members: noise,
                consensus: "-".to_string(),
                mean_conservation: "-".to_string(),
                conserved_positions: "-".to_string(),
            });
        }
        rows
    }

    /// Frequency tables of every cluster, keyed by cluster id.
    pub fn logo_tables(&self) -> Vec<(usize, LogoTable)> {
        self.profiles
            .iter()
            .map(|profile| (profile.cluster, profile.logo_table()))
            .collect()
    }
}

fn conserved_positions(profile: &ConsensusProfile) -> String {
    let positions = profile.highly_conserved();
    if positions.is_empty() {
        return "-".to_string();
    }
    positions
        .iter()
        .map(|p| (p + 1).to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Builds a motif set from sequence records, keeping record order.
///
/// # Errors
///
/// Fails on duplicate identifiers or motifs of differing length.
pub fn motifs_from_records(records: impl IntoIterator<Item = SequenceRecord>) -> Result<MotifSet, EngineError> {
    let mut motifs = MotifSet::new();
    for record in records {
        motifs.insert(record.id, Motif::from(record.sequence.as_str()))?;
    }
    Ok(motifs)
}

/// Clusters a motif set and profiles every resulting cluster.
#[instrument(skip_all, name = "clustering_workflow")]
pub fn run(motifs: &MotifSet, config: &ClusteringConfig, reporter: &ProgressReporter) -> ClusteringResult {
    info!(
        motifs = motifs.len(),
        epsilon = config.epsilon,
        min_samples = config.min_samples,
        "Starting motif clustering."
    );

    reporter.report(Progress::PhaseStart {
        name: "Dissimilarity Matrix",
    });
    let matrix = build_matrix(motifs, &config.scoring);
    reporter.report(Progress::PhaseFinish);

    reporter.report(Progress::PhaseStart { name: "Clustering" });
    let assignment = dbscan(&matrix, config.epsilon, config.min_samples);
    let profiles = cluster_profiles(motifs, &assignment);
    reporter.report(Progress::PhaseFinish);

    info!(
        clusters = assignment.cluster_count(),
        noise = assignment.noise_count(),
        "Clustering complete."
    );
    reporter.report(Progress::Message(format!(
        "Found {} cluster(s) and {} noise motif(s).",
        assignment.cluster_count(),
        assignment.noise_count()
    )));

    ClusteringResult {
        matrix,
        assignment,
        profiles,
    }
}
