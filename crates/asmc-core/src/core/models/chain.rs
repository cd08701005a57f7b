use super::residue::ResidueRecord;
use nalgebra::Point3;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StructureError {
    #[error("Chain '{0}' not found in structure")]
    ChainNotFound(char),

    #[error("Structure contains no chains")]
    Empty,

    #[error("Chain '{chain_id}' has no residues with a usable CA atom")]
    NoUsableResidues { chain_id: char },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    pub id: char,                            // Chain identifier (e.g., 'A', 'B')
    pub(crate) residues: Vec<ResidueRecord>, // Residues in file order
}

impl Chain {
    pub fn new(id: char) -> Self {
        Self {
            id,
            residues: Vec::new(),
        }
    }

    pub fn with_residues(id: char, residues: Vec<ResidueRecord>) -> Self {
        Self { id, residues }
    }

    pub fn push(&mut self, residue: ResidueRecord) {
        self.residues.push(residue);
    }

    pub fn residues(&self) -> &[ResidueRecord] {
        &self.residues
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    /// Returns the first residue carrying the given number.
    pub fn residue(&self, number: isize) -> Option<&ResidueRecord> {
        self.residues.iter().find(|r| r.number == number)
    }

    /// Residues that carry a CA coordinate, in chain order.
    pub fn ca_residues(&self) -> impl Iterator<Item = (&ResidueRecord, Point3<f64>)> {
        self.residues
            .iter()
            .filter_map(|r| r.ca.map(|position| (r, position)))
    }

    /// Fails with [`StructureError::NoUsableResidues`] when no residue has a CA atom.
    pub fn require_ca(&self) -> Result<(), StructureError> {
        if self.ca_residues().next().is_none() {
            Err(StructureError::NoUsableResidues { chain_id: self.id })
        } else {
            Ok(())
        }
    }
}

/// An ordered collection of chains, as produced by a structure provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Structure {
    chains: Vec<Chain>,
}

impl Structure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_chains(chains: Vec<Chain>) -> Self {
        Self { chains }
    }

    pub fn add_chain(&mut self, chain: Chain) {
        self.chains.push(chain);
    }

    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    pub fn chain(&self, id: char) -> Result<&Chain, StructureError> {
        self.chains
            .iter()
            .find(|c| c.id == id)
            .ok_or(StructureError::ChainNotFound(id))
    }

    pub fn first_chain(&self) -> Result<&Chain, StructureError> {
        self.chains.first().ok_or(StructureError::Empty)
    }

    /// Resolves an explicit chain id, or falls back to the first chain when none is given.
    pub fn select_chain(&self, id: Option<char>) -> Result<&Chain, StructureError> {
        match id {
            Some(id) => self.chain(id),
            None => self.first_chain(),
        }
    }
}
