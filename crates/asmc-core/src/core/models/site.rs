use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("Active-site definition is empty")]
    Empty,

    #[error("Active-site definition contains a non-numeric residue number: '{0}'")]
    NonNumeric(String),

    #[error("Active-site definition lists residue {0} more than once")]
    Duplicate(isize),

    #[error("No valid active-site record found in {source_name}")]
    NoRecord { source_name: String },

    #[error("Active-site residue {residue_number} has no CA atom in reference chain '{chain_id}'")]
    ResidueNotInReference {
        chain_id: char,
        residue_number: isize,
    },
}

/// The residue positions that make up the active site on the reference structure.
///
/// Residue numbers are strictly increasing and the set is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSite {
    chain_id: char,
    residues: Vec<isize>,
}

impl ReferenceSite {
    /// Validates and sorts a list of residue numbers.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::Empty`] for an empty list and
    /// [`DefinitionError::Duplicate`] when a residue number occurs twice.
    pub fn new(chain_id: char, mut residues: Vec<isize>) -> Result<Self, DefinitionError> {
        if residues.is_empty() {
            return Err(DefinitionError::Empty);
        }
        residues.sort_unstable();
        if let Some(pair) = residues.windows(2).find(|w| w[0] == w[1]) {
            return Err(DefinitionError::Duplicate(pair[0]));
        }
        Ok(Self { chain_id, residues })
    }

    pub fn chain_id(&self) -> char {
        self.chain_id
    }

    pub fn residues(&self) -> &[isize] {
        &self.residues
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    pub fn contains(&self, residue_number: isize) -> bool {
        self.residues.binary_search(&residue_number).is_ok()
    }

    /// Position of a residue number within the site, in site order.
    pub fn position_of(&self, residue_number: isize) -> Option<usize> {
        self.residues.binary_search(&residue_number).ok()
    }
}
