use super::fasta::{FastaError, FastaFile};
use super::traits::{SequenceProvider, SequenceRecord};
use crate::core::utils::alignment::GAP;
use std::collections::HashSet;
use std::io::BufRead;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MsaError {
    #[error("Failed to read alignment: {0}")]
    Fasta(#[from] FastaError),
    #[error("Alignment holds no sequences")]
    Empty,
    #[error("Row '{id}' has {found} columns, but the alignment is {expected} columns wide")]
    RaggedRow {
        id: String,
        expected: usize,
        found: usize,
    },
    #[error("Row has {found} columns, but the alignment is {expected} columns wide")]
    WidthMismatch { expected: usize, found: usize },
    #[error("Sequence '{0}' appears more than once in the alignment")]
    DuplicateIdentifier(String),
    #[error("Reference row '{0}' is not in the alignment")]
    MissingReferenceRow(String),
    #[error("Reference row holds {found} residues, but the reference chain has {expected}")]
    ReferenceRowMismatch { expected: usize, found: usize },
}

/// A precomputed multiple sequence alignment in aligned FASTA form.
///
/// Rows keep file order and share one width. Both `-` and `.` are read as gaps and
/// stored as `-`.
#[derive(Debug, Clone)]
pub struct MultipleAlignment {
    rows: Vec<SequenceRecord>,
    width: usize,
}

impl MultipleAlignment {
    pub fn from_records(records: Vec<SequenceRecord>) -> Result<Self, MsaError> {
        let width = records.first().ok_or(MsaError::Empty)?.sequence.chars().count();
        let mut seen = HashSet::with_capacity(records.len());
        let mut rows = Vec::with_capacity(records.len());

        for mut record in records {
            if !seen.insert(record.id.clone()) {
                return Err(MsaError::DuplicateIdentifier(record.id));
            }
            record.sequence = record
                .sequence
                .chars()
                .map(|c| if c == '.' { GAP } else { c })
                .collect();
            let found = record.sequence.chars().count();
            if found != width {
                return Err(MsaError::RaggedRow {
                    id: record.id,
                    expected: width,
                    found,
                });
            }
            rows.push(record);
        }

        Ok(Self { rows, width })
    }

    pub fn read_from(reader: &mut impl BufRead) -> Result<Self, MsaError> {
        Self::from_records(FastaFile::read_from(reader)?)
    }

    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self, MsaError> {
        Self::from_records(FastaFile::read_from_path(path)?)
    }

    pub fn rows(&self) -> &[SequenceRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of alignment columns.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn row(&self, id: &str) -> Option<&SequenceRecord> {
        self.rows.iter().find(|r| r.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read(text: &str) -> Result<MultipleAlignment, MsaError> {
        MultipleAlignment::read_from(&mut Cursor::new(text.as_bytes()))
    }

    #[test]
    fn reads_rows_in_file_order_and_normalizes_gaps() {
        let msa = read(">ref\nAC-DE\n>t1 some protein\nac.de\n>t2\n-CKD\nE\n").unwrap();
        assert_eq!(msa.len(), 3);
        assert_eq!(msa.width(), 5);
        let ids: Vec<&str> = msa.rows().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["ref", "t1", "t2"]);
        assert_eq!(msa.row("t1").unwrap().sequence, "AC-DE");
        assert_eq!(msa.row("t2").unwrap().sequence, "-CKDE");
        assert!(msa.row("absent").is_none());
    }

    #[test]
    fn ragged_rows_are_rejected() {
        match read(">ref\nACDE\n>short\nACD\n") {
            Err(MsaError::RaggedRow { id, expected, found }) => {
                assert_eq!(id, "short");
                assert_eq!((expected, found), (4, 3));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn empty_and_duplicate_inputs_are_rejected() {
        assert!(matches!(read(""), Err(MsaError::Empty)));
        assert!(matches!(
            read(">a\nAC\n>a\nAC\n"),
            Err(MsaError::DuplicateIdentifier(id)) if id == "a"
        ));
    }
}
