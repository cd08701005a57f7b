use super::dissimilarity::DissimilarityMatrix;
use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClusterLabel {
    Cluster(usize),
    Noise,
}

impl ClusterLabel {
    /// Integer form used in output tables, with noise as `-1`.
    pub fn as_i64(self) -> i64 {
        match self {
            ClusterLabel::Cluster(id) => id as i64,
            ClusterLabel::Noise => -1,
        }
    }

    pub fn is_noise(self) -> bool {
        self == ClusterLabel::Noise
    }
}

impl fmt::Display for ClusterLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i64())
    }
}

/// A cluster label for every target of the matrix, in matrix order.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterAssignment {
    ids: Vec<String>,
    labels: Vec<ClusterLabel>,
    cluster_count: usize,
}

impl ClusterAssignment {
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn labels(&self) -> &[ClusterLabel] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn cluster_count(&self) -> usize {
        self.cluster_count
    }

    pub fn noise_count(&self) -> usize {
        self.labels.iter().filter(|l| l.is_noise()).count()
    }

    pub fn label_of(&self, id: &str) -> Option<ClusterLabel> {
        self.ids.iter().position(|i| i == id).map(|i| self.labels[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ClusterLabel)> {
        self.ids.iter().map(String::as_str).zip(self.labels.iter().copied())
    }

    /// Indices of the members of `cluster`, in matrix order.
    pub fn members(&self, cluster: usize) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|&(_, &l)| l == ClusterLabel::Cluster(cluster))
            .map(|(i, _)| i)
            .collect()
    }
}

fn region_query(matrix: &DissimilarityMatrix, point: usize, epsilon: f64) -> Vec<usize> {
    (0..matrix.len())
        .filter(|&j| matrix.get(point, j) <= epsilon)
        .collect()
}

/// DBSCAN over a precomputed dissimilarity matrix.
///
/// The neighbourhood of a point is every point within `epsilon`, itself included.
/// A point with at least `min_samples` neighbours is a core point; clusters grow from
/// core points in index order and are numbered in order of discovery. Points reachable
/// from no core point are noise. A border point reachable from several clusters joins
/// the one discovered first.
#[instrument(skip_all, name = "dbscan")]
pub fn dbscan(matrix: &DissimilarityMatrix, epsilon: f64, min_samples: usize) -> ClusterAssignment {
    let n = matrix.len();
    let mut labels: Vec<Option<ClusterLabel>> = vec![None; n];
    let mut cluster_count = 0;

    for point in 0..n {
        if labels[point].is_some() {
            continue;
        }
        let neighbours = region_query(matrix, point, epsilon);
        if neighbours.len() < min_samples {
            labels[point] = Some(ClusterLabel::Noise);
            continue;
        }

        let cluster = ClusterLabel::Cluster(cluster_count);
        cluster_count += 1;
        labels[point] = Some(cluster);

        let mut queue: VecDeque<usize> = neighbours.into_iter().collect();
        while let Some(q) = queue.pop_front() {
            match labels[q] {
                Some(ClusterLabel::Noise) => {
                    labels[q] = Some(cluster);
                }
                Some(ClusterLabel::Cluster(_)) => continue,
                None => {
                    labels[q] = Some(cluster);
                    let expansion = region_query(matrix, q, epsilon);
                    if expansion.len() >= min_samples {
                        queue.extend(expansion);
                    }
                }
            }
        }
    }

    let labels: Vec<ClusterLabel> = labels
        .into_iter()
        .map(|l| l.unwrap_or(ClusterLabel::Noise))
        .collect();
    let assignment = ClusterAssignment {
        ids: matrix.ids().to_vec(),
        labels,
        cluster_count,
    };
    debug!(
        points = n,
        clusters = assignment.cluster_count(),
        noise = assignment.noise_count(),
        "DBSCAN finished."
    );
    assignment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::Scoring;
    use crate::engine::dissimilarity::build_matrix;
    use crate::core::models::motif::{Motif, MotifSet};
    use nalgebra::DMatrix;
    use std::collections::BTreeSet;

    fn motifs(entries: &[(&str, &str)]) -> MotifSet {
        let mut set = MotifSet::new();
        for (id, m) in entries {
            set.insert(*id, Motif::from(*m)).unwrap();
        }
        set
    }

    fn cluster(entries: &[(&str, &str)], epsilon: f64, min_samples: usize) -> ClusterAssignment {
        dbscan(&build_matrix(&motifs(entries), &Scoring::Identity), epsilon, min_samples)
    }

    fn membership(assignment: &ClusterAssignment) -> BTreeSet<BTreeSet<String>> {
        (0..assignment.cluster_count())
            .map(|c| {
                assignment
                    .members(c)
                    .into_iter()
                    .map(|i| assignment.ids()[i].clone())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn two_identical_groups_and_an_outlier() {
        let assignment = cluster(
            &[("A", "SHD"), ("B", "SHD"), ("C", "SHD"), ("D", "KRE"), ("E", "KRE"), ("F", "WWW")],
            0.1,
            2,
        );
        let labels: Vec<i64> = assignment.labels().iter().map(|l| l.as_i64()).collect();
        assert_eq!(labels, vec![0, 0, 0, 1, 1, -1]);
        assert_eq!(assignment.cluster_count(), 2);
        assert_eq!(assignment.noise_count(), 1);
        assert_eq!(assignment.label_of("F"), Some(ClusterLabel::Noise));
    }

    #[test]
    fn eight_identical_motifs_form_one_cluster_and_singletons_are_noise() {
        let mut entries: Vec<(String, &str)> = (0..8).map(|i| (format!("same_{}", i), "SHDKE")).collect();
        entries.insert(3, ("odd_1".to_string(), "AGCTW"));
        entries.push(("odd_2".to_string(), "WWMRY"));
        let borrowed: Vec<(&str, &str)> = entries.iter().map(|(id, m)| (id.as_str(), *m)).collect();

        let assignment = cluster(&borrowed, 0.1, 3);
        assert_eq!(assignment.cluster_count(), 1);
        assert_eq!(assignment.noise_count(), 2);
        assert_eq!(assignment.members(0), vec![0, 1, 2, 4, 5, 6, 7, 8]);
        assert_eq!(assignment.label_of("odd_1"), Some(ClusterLabel::Noise));
        assert_eq!(assignment.label_of("odd_2"), Some(ClusterLabel::Noise));
    }

    #[test]
    fn placeholders_keep_sparse_motifs_apart() {
        let assignment = cluster(&[("P", "SXD"), ("Q", "SXD"), ("R", "SHD")], 0.34, 2);
        // P-Q differ by 1/3 (placeholder never matches), as do P-R and Q-R.
        assert_eq!(assignment.cluster_count(), 1);
        assert_eq!(assignment.members(0), vec![0, 1, 2]);

        let strict = cluster(&[("P", "SXD"), ("Q", "SXD"), ("R", "SHD")], 0.3, 2);
        assert_eq!(strict.cluster_count(), 0);
        assert_eq!(strict.noise_count(), 3);
    }

    #[test]
    fn min_samples_counts_the_point_itself() {
        let assignment = cluster(&[("a", "SHD"), ("b", "KRE")], 0.0, 1);
        assert_eq!(assignment.cluster_count(), 2);
        assert_eq!(assignment.noise_count(), 0);

        let pairless = cluster(&[("a", "SHD"), ("b", "KRE")], 0.0, 2);
        assert_eq!(pairless.noise_count(), 2);
    }

    #[test]
    fn border_points_join_but_do_not_expand() {
        // 0-1-2 chain: 0 and 2 are only reachable through 1.
        let ids = vec!["a".to_string(), "b".to_string(), "c".to_string(), "d".to_string()];
        let values = DMatrix::from_row_slice(
            4,
            4,
            &[
                0.0, 0.2, 0.9, 0.9, //
                0.2, 0.0, 0.2, 0.9, //
                0.9, 0.2, 0.0, 0.2, //
                0.9, 0.9, 0.2, 0.0,
            ],
        );
        let matrix = DissimilarityMatrix::from_parts(ids, values);
        let assignment = dbscan(&matrix, 0.25, 3);
        // Only b and c are core; a and d are border points of the single cluster.
        assert_eq!(assignment.cluster_count(), 1);
        assert_eq!(assignment.noise_count(), 0);

        let assignment = dbscan(&matrix, 0.25, 4);
        assert_eq!(assignment.cluster_count(), 0);
    }

    #[test]
    fn empty_and_singleton_inputs_are_total() {
        let empty = cluster(&[], 0.5, 2);
        assert!(empty.is_empty());
        assert_eq!(empty.cluster_count(), 0);

        let single = cluster(&[("only", "SHD")], 0.5, 2);
        assert_eq!(single.labels(), &[ClusterLabel::Noise]);
    }

    #[test]
    fn membership_is_stable_under_permutation() {
        let entries = [
            ("A", "SHDK"),
            ("B", "SHDK"),
            ("C", "SHDR"),
            ("D", "KREW"),
            ("E", "KREW"),
            ("F", "KRQW"),
            ("G", "WWWW"),
        ];
        let base = membership(&cluster(&entries, 0.3, 2));
        assert_eq!(base.len(), 2);

        let mut permuted = entries.to_vec();
        permuted.reverse();
        permuted.swap(1, 4);
        assert_eq!(membership(&cluster(&permuted, 0.3, 2)), base);
    }

    #[test]
    fn label_display_uses_minus_one_for_noise() {
        assert_eq!(ClusterLabel::Noise.to_string(), "-1");
        assert_eq!(ClusterLabel::Cluster(3).to_string(), "3");
    }
}
