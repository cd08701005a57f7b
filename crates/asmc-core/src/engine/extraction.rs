use super::correspondence::CorrespondenceMap;
use crate::core::models::motif::{Motif, PLACEHOLDER};
use crate::core::models::site::ReferenceSite;

/// Outcome of turning one correspondence map into a motif.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Accepted(Motif),
    /// The motif resolved fewer positions than the coverage policy demands.
    Rejected { motif: Motif, resolved: usize },
}

impl Extraction {
    pub fn motif(&self) -> &Motif {
        match self {
            Extraction::Accepted(motif) | Extraction::Rejected { motif, .. } => motif,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Extraction::Accepted(_))
    }
}

/// Builds fixed-length motifs in site order and applies the coverage policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct MotifExtractor {
    min_coverage: usize,
}

impl MotifExtractor {
    pub fn new(min_coverage: usize) -> Self {
        Self { min_coverage }
    }

    pub fn min_coverage(&self) -> usize {
        self.min_coverage
    }

    pub fn extract(&self, map: &CorrespondenceMap, site: &ReferenceSite) -> Extraction {
        let motif = motif_from_map(map, site);
        let resolved = motif.resolved_count();
        if resolved >= self.min_coverage {
            Extraction::Accepted(motif)
        } else {
            Extraction::Rejected { motif, resolved }
        }
    }
}

/// One character per site residue; unmatched and gapped positions become the placeholder.
pub fn motif_from_map(map: &CorrespondenceMap, site: &ReferenceSite) -> Motif {
    Motif::new(site.residues().iter().map(|&number| {
        map.get(number)
            .and_then(|c| c.residue())
            .unwrap_or(PLACEHOLDER)
    }))
}
