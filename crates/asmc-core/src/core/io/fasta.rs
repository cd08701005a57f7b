use super::traits::{SequenceProvider, SequenceRecord};
use crate::core::models::motif::MotifSet;
use std::io::{self, BufRead, Write};
use thiserror::Error;

const LINE_WIDTH: usize = 60;

#[derive(Debug, Error)]
pub enum FastaError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: FastaParseErrorKind,
    },
}

#[derive(Debug, Error)]
pub enum FastaParseErrorKind {
    #[error("Sequence data found before the first '>' header")]
    SequenceBeforeHeader,
    #[error("Header line has no identifier")]
    EmptyIdentifier,
}

/// Reader and writer for FASTA sequence files.
///
/// The record identifier is the first whitespace-delimited token of the header;
/// the remainder becomes the description. Sequence lines are concatenated,
/// upper-cased, and stripped of whitespace and `*` terminators.
pub struct FastaFile;

impl SequenceProvider for FastaFile {
    type Error = FastaError;

    fn read_from(reader: &mut impl BufRead) -> Result<Vec<SequenceRecord>, Self::Error> {
        let mut records = Vec::new();
        let mut current: Option<SequenceRecord> = None;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;
            let trimmed = line.trim();

            if trimmed.is_empty() || trimmed.starts_with(';') {
                continue;
            }

            if let Some(header) = trimmed.strip_prefix('>') {
                if let Some(record) = current.take() {
                    records.push(record);
                }
                let header = header.trim();
                let (id, description) = match header.split_once(char::is_whitespace) {
                    Some((id, rest)) => (id, rest.trim()),
                    None => (header, ""),
                };
                if id.is_empty() {
                    return Err(FastaError::Parse {
                        line: line_num,
                        kind: FastaParseErrorKind::EmptyIdentifier,
                    });
                }
                current = Some(SequenceRecord {
                    id: id.to_string(),
                    description: description.to_string(),
                    sequence: String::new(),
                });
                continue;
            }

            let Some(record) = current.as_mut() else {
                return Err(FastaError::Parse {
                    line: line_num,
                    kind: FastaParseErrorKind::SequenceBeforeHeader,
                });
            };
            record.sequence.extend(
                trimmed
                    .chars()
                    .filter(|c| !c.is_whitespace() && *c != '*')
                    .map(|c| c.to_ascii_uppercase()),
            );
        }

        if let Some(record) = current {
            records.push(record);
        }
        Ok(records)
    }
}

impl FastaFile {
    /// Writes records with their description on the header line, wrapping sequences.
    pub fn write_to<'a>(
        records: impl IntoIterator<Item = &'a SequenceRecord>,
        writer: &mut impl Write,
    ) -> Result<(), FastaError> {
        for record in records {
            if record.description.is_empty() {
                writeln!(writer, ">{}", record.id)?;
            } else {
                writeln!(writer, ">{} {}", record.id, record.description)?;
            }
            write_wrapped(writer, &record.sequence)?;
        }
        Ok(())
    }

    /// Writes every motif of the set, in insertion order, as one FASTA record.
    pub fn write_motifs(motifs: &MotifSet, writer: &mut impl Write) -> Result<(), FastaError> {
        for (id, motif) in motifs.iter() {
            writeln!(
                writer,
                ">{} Active site residues ({} positions)",
                id,
                motif.len()
            )?;
            write_wrapped(writer, &motif.to_string())?;
        }
        Ok(())
    }
}

fn write_wrapped(writer: &mut impl Write, sequence: &str) -> io::Result<()> {
    let bytes = sequence.as_bytes();
    if bytes.is_empty() {
        return writeln!(writer);
    }
    for chunk in bytes.chunks(LINE_WIDTH) {
        writer.write_all(chunk)?;
        writeln!(writer)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::motif::Motif;
    use std::io::Cursor;

    fn read(content: &str) -> Result<Vec<SequenceRecord>, FastaError> {
        FastaFile::read_from(&mut Cursor::new(content.as_bytes()))
    }

    #[test]
    fn reads_multi_line_records_in_order() {
        let records = read(">sp|P1 first protein\nmkta\nYIAK*\n\n>P2\nGG SS\n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "sp|P1");
        assert_eq!(records[0].description, "first protein");
        assert_eq!(records[0].sequence, "MKTAYIAK");
        assert_eq!(records[1].id, "P2");
        assert_eq!(records[1].description, "");
        assert_eq!(records[1].sequence, "GGSS");
    }

    #[test]
    fn header_without_sequence_yields_empty_record() {
        let records = read(">empty\n>full\nAC\n").unwrap();
        assert_eq!(records[0].sequence, "");
        assert_eq!(records[1].sequence, "AC");
    }

    #[test]
    fn sequence_before_header_is_rejected() {
        match read("ACDE\n>p\nAC\n") {
            Err(FastaError::Parse {
                line: 1,
                kind: FastaParseErrorKind::SequenceBeforeHeader,
            }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn header_without_identifier_is_rejected() {
        assert!(matches!(
            read(">   \nAC\n"),
            Err(FastaError::Parse {
                kind: FastaParseErrorKind::EmptyIdentifier,
                ..
            })
        ));
    }

    #[test]
    fn long_sequences_are_wrapped_on_write() {
        let record = SequenceRecord::new("p", "A".repeat(LINE_WIDTH + 5));
        let mut out = Vec::new();
        FastaFile::write_to([&record], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].len(), LINE_WIDTH);
        assert_eq!(lines[2].len(), 5);

        let reread = read(&text).unwrap();
        assert_eq!(reread[0].sequence, record.sequence);
    }

    #[test]
    fn motifs_are_written_with_position_count() {
        let mut motifs = MotifSet::new();
        motifs.insert("t1", Motif::from("SHD")).unwrap();
        motifs.insert("t2", Motif::from("SXD")).unwrap();
        let mut out = Vec::new();
        FastaFile::write_motifs(&motifs, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            ">t1 Active site residues (3 positions)\nSHD\n>t2 Active site residues (3 positions)\nSXD\n"
        );
    }
}
