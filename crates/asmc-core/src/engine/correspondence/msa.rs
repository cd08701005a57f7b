use super::{Correspondence, CorrespondenceMap, CorrespondenceResolver, SiteCorrespondence};
use crate::core::io::msa::MsaError;
use crate::core::utils::alignment::GAP;
use crate::engine::error::EngineError;
use crate::engine::reference::Reference;
use std::collections::HashMap;
use tracing::debug;

/// Resolves site residues by reading fixed columns of a precomputed alignment.
///
/// The columns come from the reference row: its n-th residue is the n-th residue of
/// the reference sequence. Every other row is read at those same columns.
#[derive(Debug, Clone)]
pub struct MsaResolver {
    column_of: HashMap<isize, usize>,
    width: usize,
}

impl MsaResolver {
    /// Locates the alignment column of every reference residue through `reference_row`.
    ///
    /// # Errors
    ///
    /// Returns [`MsaError::ReferenceRowMismatch`] when the row's residue count differs
    /// from the reference sequence length.
    pub fn new(reference: &Reference, reference_row: &str) -> Result<Self, MsaError> {
        let numbering = reference.numbering();
        let residues = reference_row.chars().filter(|&c| !is_gap(c)).count();
        if residues != numbering.len() {
            return Err(MsaError::ReferenceRowMismatch {
                expected: numbering.len(),
                found: residues,
            });
        }

        let mismatched = reference_row
            .chars()
            .filter(|&c| !is_gap(c))
            .zip(reference.sequence())
            .filter(|&(a, &b)| !a.eq_ignore_ascii_case(&b))
            .count();
        if mismatched > 0 {
            debug!(mismatched, "Reference row differs from the reference chain sequence.");
        }

        let column_of = reference_row
            .chars()
            .enumerate()
            .filter(|&(_, c)| !is_gap(c))
            .map(|(column, _)| column)
            .zip(numbering)
            .map(|(column, &number)| (number, column))
            .collect();

        Ok(Self {
            column_of,
            width: reference_row.chars().count(),
        })
    }

    /// Alignment column of a reference residue.
    pub fn column(&self, reference_residue: isize) -> Option<usize> {
        self.column_of.get(&reference_residue).copied()
    }
}

fn is_gap(c: char) -> bool {
    c == GAP || c == '.'
}

impl CorrespondenceResolver for MsaResolver {
    type Target = str;

    fn resolve(&self, reference: &Reference, target: &str) -> Result<CorrespondenceMap, EngineError> {
        let row: Vec<char> = target
            .chars()
            .map(|c| if is_gap(c) { GAP } else { c.to_ascii_uppercase() })
            .collect();
        if row.len() != self.width {
            return Err(MsaError::WidthMismatch {
                expected: self.width,
                found: row.len(),
            }
            .into());
        }

        let entries = reference
            .site()
            .residues()
            .iter()
            .map(|&number| {
                let kind = match self.column(number) {
                    Some(column) => Correspondence::Aligned {
                        target_char: row[column],
                        column,
                    },
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
            superposition: None,
        })
    }
}
