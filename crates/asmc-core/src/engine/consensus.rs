use super::clustering::ClusterAssignment;
use crate::core::io::tables::LogoRow;
use crate::core::models::motif::{Motif, MotifSet, PLACEHOLDER};
use std::collections::BTreeMap;
use thiserror::Error;

/// A majority residue must exceed this share of observations to become the consensus.
pub const CONSENSUS_THRESHOLD: f64 = 0.5;
/// Positions whose conservation exceeds this value are reported as highly conserved.
pub const HIGH_CONSERVATION_THRESHOLD: f64 = 0.8;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProfileError {
    #[error("Logo table positions are 1-based, found position 0")]
    ZeroPosition,
    #[error("Invalid frequency {value} for residue '{residue}' at position {position}")]
    InvalidFrequency {
        position: usize,
        residue: char,
        value: f64,
    },
}

/// Residue tally at one motif position.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionProfile {
    pub counts: BTreeMap<char, usize>,
    pub observations: usize,
    pub consensus: char,
    pub conservation: f64,
}

impl PositionProfile {
    fn from_counts(counts: BTreeMap<char, usize>) -> Self {
        let observations: usize = counts.values().sum();
        // Iterating in residue order with a strict comparison keeps the
        // alphabetically first residue on ties.
        let mut majority: Option<(char, usize)> = None;
        for (&residue, &count) in &counts {
            if majority.is_none_or(|(_, best)| count > best) {
                majority = Some((residue, count));
            }
        }

        let (consensus, conservation) = match majority {
            Some((residue, count)) if observations > 0 => {
                let share = count as f64 / observations as f64;
                let consensus = if share > CONSENSUS_THRESHOLD {
                    residue
                } else {
                    PLACEHOLDER
                };
                (consensus, share)
            }
            _ => (PLACEHOLDER, 0.0),
        };

        Self {
            counts,
            observations,
            consensus,
            conservation,
        }
    }
}

/// Summary of one cluster's motifs.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsensusProfile {
    pub cluster: usize,
    pub members: usize,
    pub positions: Vec<PositionProfile>,
}

impl ConsensusProfile {
    /// Tallies the non-placeholder residues of `motifs` position by position.
    pub fn from_motifs<'a>(cluster: usize, motifs: impl IntoIterator<Item = &'a Motif>) -> Self {
        let mut tallies: Vec<BTreeMap<char, usize>> = Vec::new();
        let mut members = 0;
        for motif in motifs {
            members += 1;
            if tallies.len() < motif.len() {
                tallies.resize_with(motif.len(), BTreeMap::new);
            }
            for (position, &residue) in motif.residues().iter().enumerate() {
                if residue != PLACEHOLDER {
                    *tallies[position].entry(residue).or_insert(0) += 1;
                }
            }
        }
        Self {
            cluster,
            members,
            positions: tallies.into_iter().map(PositionProfile::from_counts).collect(),
        }
    }

    pub fn consensus(&self) -> String {
        self.positions.iter().map(|p| p.consensus).collect()
    }

    pub fn conservation(&self) -> Vec<f64> {
        self.positions.iter().map(|p| p.conservation).collect()
    }

    pub fn mean_conservation(&self) -> f64 {
        if self.positions.is_empty() {
            return 0.0;
        }
        self.positions.iter().map(|p| p.conservation).sum::<f64>() / self.positions.len() as f64
    }

    /// 0-based positions with conservation above [`HIGH_CONSERVATION_THRESHOLD`].
    pub fn highly_conserved(&self) -> Vec<usize> {
        self.positions
            .iter()
            .enumerate()
            .filter(|(_, p)| p.conservation > HIGH_CONSERVATION_THRESHOLD)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn logo_table(&self) -> LogoTable {
        LogoTable::from_profile(self)
    }
}

/// One profile per cluster, in cluster id order. Noise is not profiled.
pub fn cluster_profiles(motifs: &MotifSet, assignment: &ClusterAssignment) -> Vec<ConsensusProfile> {
    (0..assignment.cluster_count())
        .map(|cluster| {
            let members = assignment
                .members(cluster)
                .into_iter()
                .filter_map(|i| motifs.get(&assignment.ids()[i]));
            ConsensusProfile::from_motifs(cluster, members)
        })
        .collect()
}

/// Per-position residue frequencies, each position summing to one (or empty).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LogoTable {
    positions: Vec<BTreeMap<char, f64>>,
}

impl LogoTable {
    pub fn from_profile(profile: &ConsensusProfile) -> Self {
        let positions = profile
            .positions
            .iter()
            .map(|p| {
                p.counts
                    .iter()
                    .map(|(&residue, &count)| (residue, count as f64 / p.observations as f64))
                    .collect()
            })
            .collect();
        Self { positions }
    }

    /// Rebuilds a table from `(position, residue, frequency)` rows and renormalizes it.
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a LogoRow>) -> Result<Self, ProfileError> {
        let mut positions: Vec<BTreeMap<char, f64>> = Vec::new();
        for row in rows {
            if row.position == 0 {
                return Err(ProfileError::ZeroPosition);
            }
            if !row.frequency.is_finite() || row.frequency < 0.0 {
                return Err(ProfileError::InvalidFrequency {
                    position: row.position,
                    residue: row.residue,
                    value: row.frequency,
                });
            }
            if positions.len() < row.position {
                positions.resize_with(row.position, BTreeMap::new);
            }
            *positions[row.position - 1].entry(row.residue).or_insert(0.0) += row.frequency;
        }
        let mut table = Self { positions };
        table.normalize();
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn frequency(&self, position: usize, residue: char) -> f64 {
        self.positions
            .get(position)
            .and_then(|p| p.get(&residue))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn positions(&self) -> &[BTreeMap<char, f64>] {
        &self.positions
    }

    /// Element-wise sum followed by per-position renormalization.
    ///
    /// Tables of different length are padded; missing positions contribute nothing.
    pub fn merge(&self, other: &LogoTable) -> LogoTable {
        let mut merged = self.clone();
        if merged.positions.len() < other.positions.len() {
            merged.positions.resize_with(other.positions.len(), BTreeMap::new);
        }
        for (target, source) in merged.positions.iter_mut().zip(&other.positions) {
            for (&residue, &frequency) in source {
                *target.entry(residue).or_insert(0.0) += frequency;
            }
        }
        merged.normalize();
        merged
    }

    pub fn merge_all<'a>(tables: impl IntoIterator<Item = &'a LogoTable>) -> LogoTable {
        tables
            .into_iter()
            .fold(LogoTable::default(), |acc, table| acc.merge(table))
    }

    fn normalize(&mut self) {
        for position in &mut self.positions {
            let total: f64 = position.values().sum();
            if total > 0.0 {
                for frequency in position.values_mut() {
                    *frequency /= total;
                }
            }
        }
    }

    pub fn to_rows(&self) -> Vec<LogoRow> {
        self.positions
            .iter()
            .enumerate()
            .flat_map(|(i, position)| {
                position.iter().map(move |(&residue, &frequency)| LogoRow {
                    position: i + 1,
                    residue,
                    frequency,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::clustering::dbscan;
    use crate::engine::config::Scoring;
    use crate::engine::dissimilarity::build_matrix;

    fn motifs(list: &[&str]) -> Vec<Motif> {
        list.iter().map(|m| Motif::from(*m)).collect()
    }

    #[test]
    fn majority_above_half_becomes_consensus() {
        let profile = ConsensusProfile::from_motifs(0, &motifs(&["A", "A", "A", "G"]));
        assert_eq!(profile.members, 4);
        assert_eq!(profile.consensus(), "A");
        assert!((profile.conservation()[0] - 0.75).abs() < 1e-12);
    }

    #[test]
    fn even_split_yields_placeholder_and_alphabetical_majority() {
        let profile = ConsensusProfile::from_motifs(0, &motifs(&["G", "A", "G", "A"]));
        assert_eq!(profile.consensus(), "X");
        assert!((profile.conservation()[0] - 0.5).abs() < 1e-12);
        assert_eq!(profile.positions[0].counts.get(&'A'), Some(&2));
    }

    #[test]
    fn placeholders_are_not_observations() {
        let profile = ConsensusProfile::from_motifs(0, &motifs(&["SX", "SX", "HX"]));
        assert_eq!(profile.consensus(), "SX");
        assert_eq!(profile.positions[1].observations, 0);
        assert_eq!(profile.conservation()[1], 0.0);
        assert!((profile.mean_conservation() - (2.0 / 3.0) / 2.0).abs() < 1e-12);
    }

    #[test]
    fn highly_conserved_positions_exceed_threshold() {
        let profile = ConsensusProfile::from_motifs(
            0,
            &motifs(&["SHD", "SHD", "SHE", "SHE", "SKD"]),
        );
        assert_eq!(profile.highly_conserved(), vec![0]);
        assert_eq!(profile.consensus(), "SHD");
    }

    #[test]
    fn profiles_follow_cluster_order_and_skip_noise() {
        let mut set = MotifSet::new();
        for (id, m) in [("a", "SHD"), ("b", "SHD"), ("c", "KRE"), ("d", "KRQ"), ("e", "WWW")] {
            set.insert(id, Motif::from(m)).unwrap();
        }
        let assignment = dbscan(&build_matrix(&set, &Scoring::Identity), 0.34, 2);
        let profiles = cluster_profiles(&set, &assignment);
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].consensus(), "SHD");
        assert_eq!(profiles[1].members, 2);
        assert_eq!(profiles[1].consensus(), "KRX");
    }

    #[test]
    fn logo_table_holds_normalized_frequencies() {
        let profile = ConsensusProfile::from_motifs(0, &motifs(&["AX", "AC", "GC", "AC"]));
        let table = profile.logo_table();
        assert_eq!(table.len(), 2);
        assert!((table.frequency(0, 'A') - 0.75).abs() < 1e-12);
        assert!((table.frequency(0, 'G') - 0.25).abs() < 1e-12);
        assert_eq!(table.frequency(1, 'C'), 1.0);
        assert_eq!(table.frequency(1, 'X'), 0.0);
    }

    #[test]
    fn merge_sums_then_renormalizes_and_pads() {
        let a = ConsensusProfile::from_motifs(0, &motifs(&["A", "A", "A", "G"])).logo_table();
        let b = ConsensusProfile::from_motifs(1, &motifs(&["GC", "GC"])).logo_table();
        let merged = a.merge(&b);
        assert_eq!(merged.len(), 2);
        // Position 1: A 0.75, G 0.25 + 1.0 -> renormalized over 2.0.
        assert!((merged.frequency(0, 'A') - 0.375).abs() < 1e-12);
        assert!((merged.frequency(0, 'G') - 0.625).abs() < 1e-12);
        assert_eq!(merged.frequency(1, 'C'), 1.0);

        let all = LogoTable::merge_all([&a, &b]);
        assert_eq!(all, merged);
    }

    #[test]
    fn rows_round_trip_and_are_validated() {
        let table = ConsensusProfile::from_motifs(0, &motifs(&["AC", "GC"])).logo_table();
        let rows = table.to_rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].position, 1);
        assert_eq!(LogoTable::from_rows(&rows).unwrap(), table);

        let zero = LogoRow {
            position: 0,
            residue: 'A',
            frequency: 1.0,
        };
        assert_eq!(LogoTable::from_rows([&zero]), Err(ProfileError::ZeroPosition));

        let negative = LogoRow {
            position: 1,
            residue: 'A',
            frequency: -0.5,
        };
        assert!(matches!(
            LogoTable::from_rows([&negative]),
            Err(ProfileError::InvalidFrequency { .. })
        ));
    }
}
