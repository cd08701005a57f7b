use super::{Correspondence, CorrespondenceMap, CorrespondenceResolver, SiteCorrespondence};
use crate::core::utils::alignment::{GAP, global_align};
use crate::engine::error::EngineError;
use crate::engine::reference::Reference;
use std::collections::HashMap;
use tracing::trace;

/// Resolves site residues through a global alignment of the target sequence
/// against the reference chain sequence.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceResolver;

impl SequenceResolver {
    pub fn new() -> Self {
        Self
    }
}

/// Upper-cases a raw sequence and drops whitespace and `*` terminators.
pub fn normalize_sequence(raw: &str) -> Vec<char> {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '*')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

impl CorrespondenceResolver for SequenceResolver {
    type Target = str;

    fn resolve(&self, reference: &Reference, target: &str) -> Result<CorrespondenceMap, EngineError> {
        let target = normalize_sequence(target);
        let alignment = global_align(reference.sequence(), &target)?;

        // Alignment column of every reference residue number.
        let numbering = reference.numbering();
        let mut column_of: HashMap<isize, usize> = HashMap::with_capacity(numbering.len());
        let mut reference_index = 0;
        for (column, &c) in alignment.reference.iter().enumerate() {
            if c != GAP {
                column_of.insert(numbering[reference_index], column);
                reference_index += 1;
            }
        }

        let entries = reference
            .site()
            .residues()
            .iter()
            .map(|&number| {
                let kind = match column_of.get(&number) {
                    Some(&column) => Correspondence::Aligned {
                        target_char: alignment.target[column],
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

        trace!(score = alignment.score, columns = alignment.len(), "Target sequence aligned.");

        Ok(CorrespondenceMap {
            entries,
            superposition: None,
        })
    }
}
