use crate::core::models::site::{DefinitionError, ReferenceSite};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SiteFileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid active-site definition: {0}")]
    Definition(#[from] DefinitionError),
}

/// One `structure<TAB>chain<TAB>n1,n2,...` line of an active-site file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteRecord {
    pub structure: String,
    pub chain_id: Option<char>,
    pub residues: Vec<isize>,
}

impl SiteRecord {
    /// Validates the record as a reference site, using `fallback_chain` when the
    /// record leaves the chain column blank.
    pub fn into_reference_site(self, fallback_chain: char) -> Result<ReferenceSite, DefinitionError> {
        ReferenceSite::new(self.chain_id.unwrap_or(fallback_chain), self.residues)
    }
}

/// Per-residue detail written below a site record as comment lines.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteDetail {
    pub residue_number: isize,
    pub residue_type: char,
    pub distance: f64,
}

/// Parses a comma-separated residue list such as `"10, 12,34"`.
///
/// # Errors
///
/// Returns [`DefinitionError::Empty`] for blank input and
/// [`DefinitionError::NonNumeric`] for any item that is not an integer.
pub fn parse_residue_list(text: &str) -> Result<Vec<isize>, DefinitionError> {
    if text.trim().is_empty() {
        return Err(DefinitionError::Empty);
    }
    text.split(',')
        .map(|item| {
            let item = item.trim();
            item.parse::<isize>()
                .map_err(|_| DefinitionError::NonNumeric(item.to_string()))
        })
        .collect()
}

pub struct SiteFile;

impl SiteFile {
    /// Reads the first valid record; blank lines and `#` comments are skipped.
    ///
    /// Lines with fewer than three tab-separated fields are not records. The first
    /// line that has them is parsed and returned, and a malformed residue list on
    /// that line is an error rather than a reason to keep scanning.
    pub fn read_from(reader: &mut impl BufRead, source_name: &str) -> Result<SiteRecord, SiteFileError> {
        for line_res in reader.lines() {
            let line = line_res?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 3 {
                continue;
            }
            let residues = parse_residue_list(fields[2])?;
            return Ok(SiteRecord {
                structure: fields[0].trim().to_string(),
                chain_id: fields[1].trim().chars().next(),
                residues,
            });
        }
        Err(DefinitionError::NoRecord {
            source_name: source_name.to_string(),
        }
        .into())
    }

    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<SiteRecord, SiteFileError> {
        let path = path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);
        Self::read_from(&mut reader, &path.to_string_lossy())
    }

    /// Writes a record preceded by `# ` comment lines and followed by its details.
    ///
    /// A record without residues is written as a comment only, so the file holds
    /// no record line. A record with distinct residues reads back unchanged.
    pub fn write_to(
        record: &SiteRecord,
        comments: &[String],
        details: &[SiteDetail],
        writer: &mut impl Write,
    ) -> Result<(), SiteFileError> {
        for comment in comments {
            writeln!(writer, "# {}", comment)?;
        }
        writeln!(writer, "#")?;
        writeln!(writer, "# Format: Structure[TAB]Chain[TAB]Residue_numbers")?;
        writeln!(writer, "#")?;

        if record.residues.is_empty() {
            writeln!(writer, "# No active-site residues matched in {}", record.structure)?;
        } else {
            let residues = record
                .residues
                .iter()
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
                .join(",");
            let chain = record.chain_id.map(String::from).unwrap_or_default();
            writeln!(writer, "{}\t{}\t{}", record.structure, chain, residues)?;
        }

        if !details.is_empty() {
            writeln!(writer)?;
            writeln!(writer, "# Detailed residue information:")?;
            writeln!(writer, "# ResNum\tResType\tDistance(Å)")?;
            for detail in details {
                writeln!(
                    writer,
                    "# {}\t{}\t{:.2}",
                    detail.residue_number, detail.residue_type, detail.distance
                )?;
            }
        }
        Ok(())
    }
}
