use super::config::Scoring;
use crate::core::io::matrix::SubstitutionMatrix;
use crate::core::models::motif::{Motif, MotifSet, PLACEHOLDER};
use nalgebra::DMatrix;
use tracing::{debug, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Pairwise motif dissimilarities in `[0, 1]`, symmetric with a zero diagonal.
#[derive(Debug, Clone, PartialEq)]
pub struct DissimilarityMatrix {
    ids: Vec<String>,
    values: DMatrix<f64>,
}

impl DissimilarityMatrix {
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[(i, j)]
    }

    #[cfg(test)]
    pub(crate) fn from_parts(ids: Vec<String>, values: DMatrix<f64>) -> Self {
        Self { ids, values }
    }
}

/// `1 - matches / L`, where placeholders never count as a match.
pub fn identity_dissimilarity(a: &Motif, b: &Motif) -> f64 {
    let length = a.len().max(b.len());
    if length == 0 {
        return 0.0;
    }
    let matches = a
        .residues()
        .iter()
        .zip(b.residues())
        .filter(|&(&x, &y)| x == y && x != PLACEHOLDER)
        .count();
    1.0 - matches as f64 / length as f64
}

fn substitution_score(a: &Motif, b: &Motif, matrix: &SubstitutionMatrix) -> i64 {
    a.residues()
        .iter()
        .zip(b.residues())
        .filter(|&(&x, &y)| x != PLACEHOLDER && y != PLACEHOLDER)
        .filter_map(|(&x, &y)| matrix.score(x, y))
        .map(i64::from)
        .sum()
}

/// `1 - s(a, b) / max(s(a, a), s(b, b))`, clamped to `[0, 1]`.
///
/// Positions where either motif holds the placeholder, or a residue the matrix does
/// not know, contribute nothing. A non-positive normaliser gives the maximum distance.
pub fn substitution_dissimilarity(a: &Motif, b: &Motif, matrix: &SubstitutionMatrix) -> f64 {
    let normaliser = substitution_score(a, a, matrix).max(substitution_score(b, b, matrix));
    if normaliser <= 0 {
        return 1.0;
    }
    let score = substitution_score(a, b, matrix);
    (1.0 - score as f64 / normaliser as f64).clamp(0.0, 1.0)
}

/// Motif residues as bytes with the placeholder as `0`. Motifs only ever hold ASCII.
fn encode(motif: &Motif) -> Vec<u8> {
    motif
        .residues()
        .iter()
        .map(|&c| if c == PLACEHOLDER { 0 } else { c as u8 })
        .collect()
}

#[inline]
fn encoded_identity(a: &[u8], b: &[u8], length: usize) -> f64 {
    let matches = a.iter().zip(b).filter(|&(&x, &y)| x == y && x != 0).count();
    1.0 - matches as f64 / length as f64
}

/// Builds the full dissimilarity matrix over a motif set, in set order.
///
/// Each row's upper triangle is computed independently (in parallel with the
/// `parallel` feature) and mirrored afterwards.
#[instrument(skip_all, name = "dissimilarity_matrix")]
pub fn build_matrix(motifs: &MotifSet, scoring: &Scoring) -> DissimilarityMatrix {
    let ids: Vec<String> = motifs.ids().map(str::to_string).collect();
    let n = ids.len();
    let entries: Vec<&Motif> = motifs.motifs().collect();
    let length = motifs.motif_length().unwrap_or(0);

    let row_upper = |i: usize| -> Vec<f64> {
        ((i + 1)..n)
            .map(|j| match scoring {
                Scoring::Identity => identity_dissimilarity(entries[i], entries[j]),
                Scoring::Substitution(matrix) => {
                    substitution_dissimilarity(entries[i], entries[j], matrix)
                }
            })
            .collect()
    };

    let rows: Vec<Vec<f64>> = match scoring {
        Scoring::Identity if length > 0 => {
            let encoded: Vec<Vec<u8>> = entries.iter().map(|m| encode(m)).collect();
            let encoded_row = |i: usize| -> Vec<f64> {
                ((i + 1)..n)
                    .map(|j| encoded_identity(&encoded[i], &encoded[j], length))
                    .collect()
            };

            #[cfg(not(feature = "parallel"))]
            let rows: Vec<Vec<f64>> = (0..n).map(encoded_row).collect();

            #[cfg(feature = "parallel")]
            let rows: Vec<Vec<f64>> = (0..n).into_par_iter().map(encoded_row).collect();

            rows
        }
        _ => {
            #[cfg(not(feature = "parallel"))]
            let rows: Vec<Vec<f64>> = (0..n).map(row_upper).collect();

            #[cfg(feature = "parallel")]
            let rows: Vec<Vec<f64>> = (0..n).into_par_iter().map(row_upper).collect();

            rows
        }
    };

    let mut values = DMatrix::zeros(n, n);
    for (i, row) in rows.into_iter().enumerate() {
        for (offset, d) in row.into_iter().enumerate() {
            let j = i + 1 + offset;
            values[(i, j)] = d;
            values[(j, i)] = d;
        }
    }

    debug!(motifs = n, motif_length = length, "Dissimilarity matrix built.");
    DissimilarityMatrix { ids, values }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn set(motifs: &[(&str, &str)]) -> MotifSet {
        let mut set = MotifSet::new();
        for (id, m) in motifs {
            set.insert(*id, Motif::from(*m)).unwrap();
        }
        set
    }

    fn toy_matrix() -> SubstitutionMatrix {
        let text = "   A  C  G  S\nA  4  0  0  1\nC  0  9 -3 -1\nG  0 -3  6  0\nS  1 -1  0  4\n";
        SubstitutionMatrix::read_from(&mut Cursor::new(text.as_bytes())).unwrap()
    }

    #[test]
    fn identity_counts_placeholder_positions_as_mismatches() {
        assert_eq!(identity_dissimilarity(&Motif::from("SHD"), &Motif::from("SHD")), 0.0);
        assert!((identity_dissimilarity(&Motif::from("SHD"), &Motif::from("SHE")) - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(identity_dissimilarity(&Motif::from("XXX"), &Motif::from("XXX")), 1.0);
        assert!((identity_dissimilarity(&Motif::from("SXD"), &Motif::from("SXD")) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn matrix_is_symmetric_bounded_with_zero_diagonal() {
        let motifs = set(&[("a", "SHD"), ("b", "SHE"), ("c", "XXX"), ("d", "WWW"), ("e", "SXD")]);
        let matrix = build_matrix(&motifs, &Scoring::Identity);
        assert_eq!(matrix.len(), 5);
        assert_eq!(matrix.ids()[3], "d");
        for i in 0..5 {
            assert_eq!(matrix.get(i, i), 0.0);
            for j in 0..5 {
                let d = matrix.get(i, j);
                assert!((0.0..=1.0).contains(&d));
                assert_eq!(d, matrix.get(j, i));
            }
        }
        assert!((matrix.get(0, 1) - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(matrix.get(0, 3), 1.0);
        assert_eq!(matrix.get(2, 3), 1.0);
    }

    #[test]
    fn encoded_and_direct_identity_agree() {
        let motifs = set(&[("a", "SHDKX"), ("b", "SHEKX"), ("c", "AHDXX"), ("d", "SHDKW")]);
        let matrix = build_matrix(&motifs, &Scoring::Identity);
        let entries: Vec<&Motif> = motifs.motifs().collect();
        for i in 0..4 {
            for j in 0..4 {
                if i != j {
                    let direct = identity_dissimilarity(entries[i], entries[j]);
                    assert!((matrix.get(i, j) - direct).abs() < 1e-12);
                }
            }
        }
    }

    #[test]
    fn non_ascii_residues_score_as_placeholders_on_both_paths() {
        let motifs = set(&[("a", "SÉD"), ("b", "SÉD"), ("c", "SHD")]);
        let matrix = build_matrix(&motifs, &Scoring::Identity);
        let entries: Vec<&Motif> = motifs.motifs().collect();
        assert!((matrix.get(0, 1) - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(matrix.get(0, 1), identity_dissimilarity(entries[0], entries[1]));
        assert_eq!(matrix.get(0, 2), identity_dissimilarity(entries[0], entries[2]));
    }

    #[test]
    fn five_position_motifs_without_matches_are_maximally_distant() {
        let a = Motif::from("SHDKE");
        let b = Motif::from("AGCTW");
        assert_eq!(identity_dissimilarity(&a, &b), 1.0);
        let motifs = set(&[("a", "SHDKE"), ("b", "AGCTW")]);
        assert_eq!(build_matrix(&motifs, &Scoring::Identity).get(0, 1), 1.0);
    }

    #[test]
    fn empty_and_singleton_sets_are_handled() {
        assert!(build_matrix(&MotifSet::new(), &Scoring::Identity).is_empty());
        let single = build_matrix(&set(&[("only", "SHD")]), &Scoring::Identity);
        assert_eq!(single.len(), 1);
        assert_eq!(single.get(0, 0), 0.0);
    }

    #[test]
    fn substitution_dissimilarity_normalizes_by_self_score() {
        let m = toy_matrix();
        // s(AC, AC) = 13, s(AS, AS) = 8, s(AC, AS) = 4 + (-1) = 3
        let d = substitution_dissimilarity(&Motif::from("AC"), &Motif::from("AS"), &m);
        assert!((d - (1.0 - 3.0 / 13.0)).abs() < 1e-12);
        assert_eq!(substitution_dissimilarity(&Motif::from("AC"), &Motif::from("AC"), &m), 0.0);
    }

    #[test]
    fn substitution_dissimilarity_is_clamped_and_handles_placeholders() {
        let m = toy_matrix();
        // s(C, G) = -3 < 0 would give a value above one.
        assert_eq!(substitution_dissimilarity(&Motif::from("C"), &Motif::from("G"), &m), 1.0);
        assert_eq!(substitution_dissimilarity(&Motif::from("XX"), &Motif::from("XX"), &m), 1.0);
        // Unknown residues contribute nothing.
        assert_eq!(substitution_dissimilarity(&Motif::from("AW"), &Motif::from("AW"), &m), 0.0);
    }

    #[test]
    fn substitution_scoring_fills_matrix() {
        let motifs = set(&[("a", "AC"), ("b", "AS"), ("c", "AC")]);
        let matrix = build_matrix(&motifs, &Scoring::Substitution(toy_matrix()));
        assert_eq!(matrix.get(0, 2), 0.0);
        assert!((matrix.get(0, 1) - (1.0 - 3.0 / 13.0)).abs() < 1e-12);
        assert_eq!(matrix.get(1, 0), matrix.get(0, 1));
    }
}
