use super::error::EngineError;
use crate::core::models::chain::{Chain, Structure};
use crate::core::models::site::{DefinitionError, ReferenceSite};
use nalgebra::Point3;
use std::collections::BTreeMap;
use tracing::debug;

/// The reference chain together with the validated active site defined on it.
///
/// Construction checks that every site residue exists in the chain and carries a
/// CA atom. Once built, the reference is read-only and shared by all resolvers.
#[derive(Debug, Clone)]
pub struct Reference {
    site: ReferenceSite,
    chain_id: char,
    ca_numbers: Vec<isize>,
    ca_codes: Vec<char>,
    ca_coordinates: Vec<Point3<f64>>,
    site_coordinates: Vec<Point3<f64>>,
    sequence: Vec<char>,
    numbering: Vec<isize>,
}

impl Reference {
    /// Validates `site` against `chain`.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::ResidueNotInReference`] for the first site residue
    /// that is missing from the chain or has no CA atom.
    pub fn new(site: ReferenceSite, chain: &Chain) -> Result<Self, DefinitionError> {
        let mut site_coordinates = Vec::with_capacity(site.len());
        for &number in site.residues() {
            let ca = chain
                .residue(number)
                .and_then(|r| r.ca)
                .ok_or(DefinitionError::ResidueNotInReference {
                    chain_id: chain.id,
                    residue_number: number,
                })?;
            site_coordinates.push(ca);
        }

        let mut ca_numbers = Vec::new();
        let mut ca_codes = Vec::new();
        let mut ca_coordinates = Vec::new();
        for (residue, position) in chain.ca_residues() {
            ca_numbers.push(residue.number);
            ca_codes.push(residue.code);
            ca_coordinates.push(position);
        }

        // Sequence numbering: first occurrence of each number, standard residues only.
        let mut by_number: BTreeMap<isize, char> = BTreeMap::new();
        for residue in chain.residues().iter().filter(|r| r.is_standard()) {
            by_number.entry(residue.number).or_insert(residue.code);
        }
        let (numbering, sequence): (Vec<isize>, Vec<char>) = by_number.into_iter().unzip();

        debug!(
            chain = %chain.id,
            ca_residues = ca_numbers.len(),
            sequence_length = sequence.len(),
            site_size = site.len(),
            "Reference validated."
        );

        Ok(Self {
            chain_id: chain.id,
            site,
            ca_numbers,
            ca_codes,
            ca_coordinates,
            site_coordinates,
            sequence,
            numbering,
        })
    }

    /// Picks the site's chain from `structure` and validates the site against it.
    pub fn from_structure(site: ReferenceSite, structure: &Structure) -> Result<Self, EngineError> {
        let chain = structure.chain(site.chain_id())?;
        chain.require_ca()?;
        Ok(Self::new(site, chain)?)
    }

    pub fn site(&self) -> &ReferenceSite {
        &self.site
    }

    pub fn chain_id(&self) -> char {
        self.chain_id
    }

    /// Residue numbers of the CA-bearing residues, in chain order.
    pub fn ca_numbers(&self) -> &[isize] {
        &self.ca_numbers
    }

    /// One-letter types of the CA-bearing residues, in chain order.
    pub fn ca_codes(&self) -> &[char] {
        &self.ca_codes
    }

    pub fn ca_coordinates(&self) -> &[Point3<f64>] {
        &self.ca_coordinates
    }

    /// CA coordinate of each site residue, in site order.
    pub fn site_coordinates(&self) -> &[Point3<f64>] {
        &self.site_coordinates
    }

    /// Standard-residue sequence sorted by residue number.
    pub fn sequence(&self) -> &[char] {
        &self.sequence
    }

    /// Residue number of each [`sequence`](Self::sequence) character.
    pub fn numbering(&self) -> &[isize] {
        &self.numbering
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::residue::ResidueRecord;

    fn chain() -> Chain {
        Chain::with_residues(
            'A',
            vec![
                ResidueRecord::new(12, 'H', Some(Point3::new(3.8, 0.0, 0.0))),
                ResidueRecord::new(10, 'S', Some(Point3::new(0.0, 0.0, 0.0))),
                ResidueRecord::new(11, 'X', Some(Point3::new(1.9, 1.0, 0.0))),
                ResidueRecord::new(13, 'D', None),
            ],
        )
    }

    #[test]
    fn builds_coordinates_and_sorted_sequence() {
        let site = ReferenceSite::new('A', vec![12, 10]).unwrap();
        let reference = Reference::new(site, &chain()).unwrap();

        assert_eq!(reference.site_coordinates()[0], Point3::new(0.0, 0.0, 0.0));
        assert_eq!(reference.site_coordinates()[1], Point3::new(3.8, 0.0, 0.0));
        assert_eq!(reference.ca_numbers(), &[12, 10, 11]);
        assert_eq!(reference.ca_codes(), &['H', 'S', 'X']);
        assert_eq!(reference.sequence(), &['S', 'H', 'D']);
        assert_eq!(reference.numbering(), &[10, 12, 13]);
    }

    #[test]
    fn site_residue_without_ca_is_fatal() {
        let site = ReferenceSite::new('A', vec![10, 13]).unwrap();
        assert_eq!(
            Reference::new(site, &chain()).unwrap_err(),
            DefinitionError::ResidueNotInReference {
                chain_id: 'A',
                residue_number: 13
            }
        );
    }

    #[test]
    fn missing_site_residue_is_fatal() {
        let site = ReferenceSite::new('A', vec![99]).unwrap();
        assert!(matches!(
            Reference::new(site, &chain()),
            Err(DefinitionError::ResidueNotInReference {
                residue_number: 99,
                ..
            })
        ));
    }

    #[test]
    fn from_structure_uses_site_chain() {
        let structure = Structure::from_chains(vec![chain()]);
        let site = ReferenceSite::new('B', vec![10]).unwrap();
        assert!(matches!(
            Reference::from_structure(site, &structure),
            Err(EngineError::Structure { .. })
        ));

        let site = ReferenceSite::new('A', vec![10]).unwrap();
        assert_eq!(Reference::from_structure(site, &structure).unwrap().chain_id(), 'A');
    }
}
