use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: MatrixParseErrorKind },
    #[error("Matrix has no column header")]
    MissingHeader,
    #[error("Residue '{0}' has no row in the matrix")]
    MissingRow(char),
}

#[derive(Debug, Error)]
pub enum MatrixParseErrorKind {
    #[error("Expected {expected} scores, found {found}")]
    WrongColumnCount { expected: usize, found: usize },
    #[error("Invalid score '{0}'")]
    InvalidScore(String),
    #[error("Column header symbol '{0}' is not a single character")]
    InvalidSymbol(String),
    #[error("Residue '{0}' appears twice")]
    DuplicateSymbol(char),
}

/// A residue substitution scoring matrix such as BLOSUM62.
///
/// Read from the NCBI text layout: `#` comment lines, a header line of column
/// symbols, then one row per symbol starting with the row symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct SubstitutionMatrix {
    index: HashMap<char, usize>,
    size: usize,
    scores: Vec<i32>,
}

impl SubstitutionMatrix {
    pub fn read_from(reader: &mut impl BufRead) -> Result<Self, MatrixError> {
        let mut columns: Option<Vec<char>> = None;
        let mut rows: HashMap<char, Vec<i32>> = HashMap::new();

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let mut tokens = trimmed.split_whitespace();
            let Some(header) = &columns else {
                let symbols = tokens
                    .map(|t| single_char(t, line_num))
                    .collect::<Result<Vec<_>, _>>()?;
                columns = Some(symbols);
                continue;
            };

            let symbol = match tokens.next() {
                Some(t) => single_char(t, line_num)?,
                None => continue,
            };
            let symbol = symbol.to_ascii_uppercase();
            let scores = tokens
                .map(|t| {
                    t.parse::<i32>().map_err(|_| MatrixError::Parse {
                        line: line_num,
                        kind: MatrixParseErrorKind::InvalidScore(t.to_string()),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            if scores.len() != header.len() {
                return Err(MatrixError::Parse {
                    line: line_num,
                    kind: MatrixParseErrorKind::WrongColumnCount {
                        expected: header.len(),
                        found: scores.len(),
                    },
                });
            }
            if rows.insert(symbol, scores).is_some() {
                return Err(MatrixError::Parse {
                    line: line_num,
                    kind: MatrixParseErrorKind::DuplicateSymbol(symbol),
                });
            }
        }

        let columns = columns.ok_or(MatrixError::MissingHeader)?;
        let size = columns.len();
        let mut index = HashMap::with_capacity(size);
        let mut scores = vec![0; size * size];
        for (i, &symbol) in columns.iter().enumerate() {
            let symbol = symbol.to_ascii_uppercase();
            let row = rows.get(&symbol).ok_or(MatrixError::MissingRow(symbol))?;
            scores[i * size..(i + 1) * size].copy_from_slice(row);
            index.insert(symbol, i);
        }

        Ok(Self { index, size, scores })
    }

    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self, MatrixError> {
        let mut reader = BufReader::new(File::open(path)?);
        Self::read_from(&mut reader)
    }

    /// Score for substituting `a` by `b`, or `None` if either residue is not in the matrix.
    pub fn score(&self, a: char, b: char) -> Option<i32> {
        let i = *self.index.get(&a.to_ascii_uppercase())?;
        let j = *self.index.get(&b.to_ascii_uppercase())?;
        Some(self.scores[i * self.size + j])
    }

    pub fn contains(&self, residue: char) -> bool {
        self.index.contains_key(&residue.to_ascii_uppercase())
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

fn single_char(token: &str, line: usize) -> Result<char, MatrixError> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(MatrixError::Parse {
            line,
            kind: MatrixParseErrorKind::InvalidSymbol(token.to_string()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SMALL: &str = "# toy matrix\n   A  C  G\nA  4  0 -1\nC  0  9 -3\nG -1 -3  6\n";

    fn read(content: &str) -> Result<SubstitutionMatrix, MatrixError> {
        SubstitutionMatrix::read_from(&mut Cursor::new(content.as_bytes()))
    }

    #[test]
    fn reads_ncbi_layout() {
        let m = read(SMALL).unwrap();
        assert_eq!(m.size(), 3);
        assert_eq!(m.score('A', 'A'), Some(4));
        assert_eq!(m.score('C', 'G'), Some(-3));
        assert_eq!(m.score('g', 'a'), Some(-1));
        assert_eq!(m.score('A', 'W'), None);
        assert!(m.contains('c'));
    }

    #[test]
    fn row_order_does_not_matter() {
        let m = read("   A  C\nC  0  9\nA  4  0\n").unwrap();
        assert_eq!(m.score('A', 'A'), Some(4));
        assert_eq!(m.score('C', 'C'), Some(9));
    }

    #[test]
    fn wrong_column_count_is_rejected() {
        match read("   A  C\nA  4\nC  0  9\n") {
            Err(MatrixError::Parse {
                line: 2,
                kind: MatrixParseErrorKind::WrongColumnCount { expected: 2, found: 1 },
            }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn invalid_score_and_missing_rows_are_rejected() {
        assert!(matches!(
            read("   A\nA  x\n"),
            Err(MatrixError::Parse {
                kind: MatrixParseErrorKind::InvalidScore(_),
                ..
            })
        ));
        assert!(matches!(read("   A  C\nA  4  0\n"), Err(MatrixError::MissingRow('C'))));
        assert!(matches!(read("# nothing\n"), Err(MatrixError::MissingHeader)));
    }
}
