use super::traits::StructureProvider;
use crate::core::models::chain::{Chain, Structure};
use crate::core::models::residue::ResidueRecord;
use nalgebra::Point3;
use std::collections::HashMap;
use std::io::{self, BufRead};
use thiserror::Error;

const DEFAULT_CHAIN_ID: char = 'A';
const MIN_ATOM_LINE_LEN: usize = 54;

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: PdbParseErrorKind },
    #[error("Missing required record: {0}")]
    MissingRecord(String),
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Line is too short for an ATOM record (must be at least {MIN_ATOM_LINE_LEN} chars)")]
    LineTooShort,
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("").trim()
}

fn parse_coordinate(line: &str, line_num: usize, start: usize, end: usize) -> Result<f64, PdbError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidFloat {
            columns: format!("{}-{}", start + 1, end),
            value: value.into(),
        },
    })
}

/// Reader for the CA trace of PDB `ATOM` records.
///
/// Only the first model is read and `HETATM` records are ignored, so hetero
/// residues never appear in the resulting chains. Residues are keyed by chain,
/// sequence number and insertion code; the first CA seen for a residue wins.
pub struct PdbFile;

impl StructureProvider for PdbFile {
    type Error = PdbError;

    fn read_from(reader: &mut impl BufRead) -> Result<Structure, Self::Error> {
        let mut chains: Vec<Chain> = Vec::new();
        let mut chain_index: HashMap<char, usize> = HashMap::new();
        let mut current_key: Option<(char, isize, char)> = None;
        let mut atom_count = 0usize;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            match slice_and_trim(&line, 0, 6) {
                "ATOM" => {}
                "ENDMDL" | "END" => break,
                _ => continue,
            }

            if line.len() < MIN_ATOM_LINE_LEN {
                return Err(PdbError::Parse {
                    line: line_num,
                    kind: PdbParseErrorKind::LineTooShort,
                });
            }

            let atom_name = slice_and_trim(&line, 12, 16);
            let res_name = slice_and_trim(&line, 17, 20);
            let chain_id = line
                .get(21..22)
                .and_then(|s| s.chars().next())
                .filter(|c| !c.is_whitespace())
                .unwrap_or(DEFAULT_CHAIN_ID);
            let res_seq_str = slice_and_trim(&line, 22, 26);
            let res_seq: isize = res_seq_str.parse().map_err(|_| PdbError::Parse {
                line: line_num,
                kind: PdbParseErrorKind::InvalidInt {
                    columns: "23-26".into(),
                    value: res_seq_str.into(),
                },
            })?;
            let insertion_code = line.get(26..27).and_then(|s| s.chars().next()).unwrap_or(' ');
            atom_count += 1;

            let chain_pos = *chain_index.entry(chain_id).or_insert_with(|| {
                chains.push(Chain::new(chain_id));
                chains.len() - 1
            });
            let chain = &mut chains[chain_pos];

            let key = (chain_id, res_seq, insertion_code);
            if current_key != Some(key) {
                chain.push(ResidueRecord::from_three_letter(res_seq, res_name, None));
                current_key = Some(key);
            }

            if atom_name == "CA" {
                let x = parse_coordinate(&line, line_num, 30, 38)?;
                let y = parse_coordinate(&line, line_num, 38, 46)?;
                let z = parse_coordinate(&line, line_num, 46, 54)?;
                if let Some(residue) = chain.residues.last_mut() {
                    if residue.ca.is_none() {
                        residue.ca = Some(Point3::new(x, y, z));
                    }
                }
            }
        }

        if atom_count == 0 {
            return Err(PdbError::MissingRecord("ATOM records".into()));
        }
        Ok(Structure::from_chains(chains))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn atom_line(serial: usize, name: &str, res: &str, chain: char, seq: isize, xyz: [f64; 3]) -> String {
        format!(
            "ATOM  {:>5} {:<4} {:>3} {}{:>4}    {:>8.3}{:>8.3}{:>8.3}  1.00  0.00           C",
            serial, name, res, chain, seq, xyz[0], xyz[1], xyz[2]
        )
    }

    fn read(content: &str) -> Result<Structure, PdbError> {
        PdbFile::read_from(&mut Cursor::new(content.as_bytes()))
    }

    #[test]
    fn reads_ca_trace_per_chain() {
        let content = [
            atom_line(1, "N", "SER", 'A', 10, [0.0, 0.0, 0.0]),
            atom_line(2, "CA", "SER", 'A', 10, [1.0, 2.0, 3.0]),
            atom_line(3, "CA", "HIS", 'A', 11, [4.0, 5.0, 6.0]),
            "TER".to_string(),
            atom_line(4, "CA", "GLY", 'B', 1, [7.0, 8.0, 9.0]),
        ]
        .join("\n");
        let structure = read(&content).unwrap();
        assert_eq!(structure.chains().len(), 2);

        let a = structure.chain('A').unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(a.residues()[0].number, 10);
        assert_eq!(a.residues()[0].code, 'S');
        assert_eq!(a.residues()[0].ca, Some(Point3::new(1.0, 2.0, 3.0)));
        assert_eq!(a.residues()[1].code, 'H');

        let b = structure.chain('B').unwrap();
        assert_eq!(b.residues()[0].ca, Some(Point3::new(7.0, 8.0, 9.0)));
    }

    #[test]
    fn residues_without_ca_are_kept_without_coordinate() {
        let content = [
            atom_line(1, "N", "ALA", 'A', 1, [0.0, 0.0, 0.0]),
            atom_line(2, "CA", "LYS", 'A', 2, [1.0, 0.0, 0.0]),
        ]
        .join("\n");
        let structure = read(&content).unwrap();
        let chain = structure.chain('A').unwrap();
        assert_eq!(chain.len(), 2);
        assert!(chain.residues()[0].ca.is_none());
        assert!(chain.residues()[1].ca.is_some());
    }

    #[test]
    fn hetatm_records_and_later_models_are_ignored() {
        let content = [
            "MODEL        1".to_string(),
            atom_line(1, "CA", "ALA", 'A', 1, [0.0, 0.0, 0.0]),
            atom_line(2, "O", "HOH", 'A', 500, [9.0, 9.0, 9.0]).replacen("ATOM  ", "HETATM", 1),
            "ENDMDL".to_string(),
            "MODEL        2".to_string(),
            atom_line(3, "CA", "GLY", 'A', 2, [1.0, 0.0, 0.0]),
        ]
        .join("\n");
        let structure = read(&content).unwrap();
        assert_eq!(structure.chain('A').unwrap().len(), 1);
    }

    #[test]
    fn unknown_residue_names_map_to_x() {
        let content = atom_line(1, "CA", "MSE", 'A', 1, [0.0, 0.0, 0.0]);
        let structure = read(&content).unwrap();
        assert_eq!(structure.chain('A').unwrap().residues()[0].code, 'X');
    }

    #[test]
    fn invalid_coordinate_reports_line_number() {
        let mut bad = atom_line(1, "CA", "ALA", 'A', 1, [0.0, 0.0, 0.0]);
        bad.replace_range(30..38, "  abc.de");
        let content = format!("REMARK test\n{}", bad);
        match read(&content) {
            Err(PdbError::Parse {
                line,
                kind: PdbParseErrorKind::InvalidFloat { .. },
            }) => assert_eq!(line, 2),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn file_without_atoms_is_an_error() {
        assert!(matches!(
            read("REMARK nothing here\nEND\n"),
            Err(PdbError::MissingRecord(_))
        ));
    }
}
