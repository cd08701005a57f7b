//! Mapping of reference active-site residues onto a target.
//!
//! Resolvers share the [`CorrespondenceResolver`] trait. The
//! [`structural::StructuralResolver`] superimposes CA traces and picks the nearest
//! target residue. The [`sequence::SequenceResolver`] reads the target residue from a
//! global alignment column, and the [`msa::MsaResolver`] reads it from a precomputed
//! multiple alignment. All emit one entry per site residue, in site order.

pub mod msa;
pub mod sequence;
pub mod structural;

use super::config::PoseStrategy;
use super::error::EngineError;
use super::reference::Reference;
use crate::core::utils::alignment::GAP;

/// What a single reference site residue maps to in the target.
#[derive(Debug, Clone, PartialEq)]
pub enum Correspondence {
    /// Nearest target CA after superposition, within the distance cutoff.
    Structural {
        target_residue: isize,
        residue_type: char,
        distance: f64,
    },
    /// Target character in the alignment column of the reference residue; may be a gap.
    Aligned { target_char: char, column: usize },
    Unmatched,
}

impl Correspondence {
    /// The resolved target residue type, or `None` for gaps and unmatched residues.
    pub fn residue(&self) -> Option<char> {
        match *self {
            Correspondence::Structural { residue_type, .. } => Some(residue_type),
            Correspondence::Aligned { target_char, .. } if target_char != GAP => Some(target_char),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.residue().is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SiteCorrespondence {
    pub reference_residue: isize,
    pub kind: Correspondence,
}

/// Details of the rigid fit used by the structural resolver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuperpositionSummary {
    pub rmsd: f64,
    pub pose_pairs: usize,
    pub strategy: PoseStrategy,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CorrespondenceMap {
    pub entries: Vec<SiteCorrespondence>,
    pub superposition: Option<SuperpositionSummary>,
}

impl CorrespondenceMap {
    pub fn get(&self, reference_residue: isize) -> Option<&Correspondence> {
        self.entries
            .iter()
            .find(|e| e.reference_residue == reference_residue)
            .map(|e| &e.kind)
    }

    pub fn resolved_count(&self) -> usize {
        self.entries.iter().filter(|e| e.kind.is_resolved()).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Structurally matched entries as `(reference_residue, target_residue, residue_type, distance)`.
    pub fn structural_matches(&self) -> impl Iterator<Item = (isize, isize, char, f64)> + '_ {
        self.entries.iter().filter_map(|e| match e.kind {
            Correspondence::Structural {
                target_residue,
                residue_type,
                distance,
            } => Some((e.reference_residue, target_residue, residue_type, distance)),
            _ => None,
        })
    }
}

/// Maps the reference active site onto one target.
///
/// Implementations are stateless with respect to the target so that many targets
/// can be resolved concurrently against one shared [`Reference`].
pub trait CorrespondenceResolver: Sync {
    type Target: ?Sized;

    fn resolve(
        &self,
        reference: &Reference,
        target: &Self::Target,
    ) -> Result<CorrespondenceMap, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> CorrespondenceMap {
        CorrespondenceMap {
            entries: vec![
                SiteCorrespondence {
                    reference_residue: 10,
                    kind: Correspondence::Structural {
                        target_residue: 11,
                        residue_type: 'S',
                        distance: 0.5,
                    },
                },
                SiteCorrespondence {
                    reference_residue: 12,
                    kind: Correspondence::Aligned {
                        target_char: GAP,
                        column: 4,
                    },
                },
                SiteCorrespondence {
                    reference_residue: 34,
                    kind: Correspondence::Unmatched,
                },
            ],
            superposition: None,
        }
    }

    #[test]
    fn gaps_and_unmatched_entries_are_unresolved() {
        let map = map();
        assert_eq!(map.len(), 3);
        assert_eq!(map.resolved_count(), 1);
        assert_eq!(map.get(10).and_then(|c| c.residue()), Some('S'));
        assert_eq!(map.get(12).and_then(|c| c.residue()), None);
        assert_eq!(map.get(99), None);
    }

    #[test]
    fn structural_matches_lists_only_structural_entries() {
        let matches: Vec<_> = map().structural_matches().collect();
        assert_eq!(matches, vec![(10, 11, 'S', 0.5)]);
    }
}
