use super::{
    Correspondence, CorrespondenceMap, CorrespondenceResolver, SiteCorrespondence,
    SuperpositionSummary,
};
use crate::core::models::chain::Chain;
use crate::core::utils::alignment::global_align;
use crate::core::utils::geometry::{NeighborIndex, fit_rigid, nearest};
use crate::engine::config::{PoseStrategy, StructuralConfig};
use crate::engine::error::EngineError;
use crate::engine::reference::Reference;
use nalgebra::Point3;
use tracing::{debug, warn};

const MIN_ALIGNED_POSE_PAIRS: usize = 3;
const KD_TREE_MIN_CANDIDATES: usize = 256;

/// Resolves site residues by superimposing the target chain onto the reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralResolver {
    config: StructuralConfig,
}

impl StructuralResolver {
    pub fn new(config: StructuralConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StructuralConfig {
        &self.config
    }

    /// Index pairs `(reference_ca, target_ca)` used for the rigid fit.
    fn pose_pairs(&self, reference: &Reference, target_codes: &[char]) -> (Vec<(usize, usize)>, PoseStrategy) {
        if self.config.pose == PoseStrategy::SequenceAligned {
            match global_align(reference.ca_codes(), target_codes) {
                Ok(alignment) => {
                    let pairs = alignment.identical_pairs();
                    if pairs.len() >= MIN_ALIGNED_POSE_PAIRS {
                        return (pairs, PoseStrategy::SequenceAligned);
                    }
                    warn!(
                        identical_pairs = pairs.len(),
                        "Too few identical residues to anchor the superposition; falling back to positional pairing."
                    );
                }
                Err(e) => warn!("CA sequence alignment failed ({}); falling back to positional pairing.", e),
            }
        }
        let k = reference.ca_codes().len().min(target_codes.len());
        ((0..k).map(|i| (i, i)).collect(), PoseStrategy::Positional)
    }
}

impl CorrespondenceResolver for StructuralResolver {
    type Target = Chain;

    fn resolve(&self, reference: &Reference, target: &Chain) -> Result<CorrespondenceMap, EngineError> {
        target.require_ca()?;

        let mut target_numbers = Vec::new();
        let mut target_codes = Vec::new();
        let mut target_coordinates = Vec::new();
        for (residue, position) in target.ca_residues() {
            target_numbers.push(residue.number);
            target_codes.push(residue.code);
            target_coordinates.push(position);
        }

        let (pairs, strategy) = self.pose_pairs(reference, &target_codes);
        let (fixed, moving): (Vec<Point3<f64>>, Vec<Point3<f64>>) = pairs
            .iter()
            .map(|&(r, t)| (reference.ca_coordinates()[r], target_coordinates[t]))
            .unzip();

        let superposition = fit_rigid(&fixed, &moving)?;
        debug!(
            chain = %target.id,
            pose_pairs = pairs.len(),
            %strategy,
            rmsd = superposition.rmsd,
            "Target superimposed onto reference."
        );

        let moved = superposition.transform.apply_all(&target_coordinates);
        let index = (moved.len() >= KD_TREE_MIN_CANDIDATES).then(|| NeighborIndex::new(&moved));

        let cutoff = self.config.distance_cutoff;
        let entries = reference
            .site()
            .residues()
            .iter()
            .zip(reference.site_coordinates())
            .map(|(&number, site_ca)| {
                let closest = match &index {
                    Some(index) => index.nearest(site_ca),
                    None => nearest(site_ca, &moved),
                };
                let kind = match closest {
                    Some((i, distance)) if distance <= cutoff => Correspondence::Structural {
                        target_residue: target_numbers[i],
                        residue_type: target_codes[i],
                        distance,
                    },
                    Some((i, distance)) => {
                        debug!(
                            reference_residue = number,
                            nearest_target = target_numbers[i],
                            distance,
                            cutoff,
                            "No target residue within cutoff."
                        );
                        Correspondence::Unmatched
                    }
                    None => Correspondence::Unmatched,
                };
                SiteCorrespondence {
                    reference_residue: number,
                    kind,
                }
            })
            .collect();

        Ok(CorrespondenceMap {
            entries,
            superposition: Some(SuperpositionSummary {
                rmsd: superposition.rmsd,
                pose_pairs: pairs.len(),
                strategy,
            }),
        })
    }
}
