use nalgebra::DMatrix;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("I/O error for '{path}': {source}")]
    Io { path: String, source: io::Error },
    #[error("Table error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Distance matrix has {rows}x{cols} entries for {ids} identifiers")]
    ShapeMismatch { ids: usize, rows: usize, cols: usize },
}

/// One line of the groups table: a target, its motif and cluster label (`-1` for noise).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRow {
    pub id: String,
    pub active_site: String,
    pub cluster: i64,
}

/// One line of the structural extraction summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionSummaryRow {
    #[serde(rename = "Structure")]
    pub structure: String,
    #[serde(rename = "Chain")]
    pub chain: String,
    #[serde(rename = "RMSD(Å)")]
    pub rmsd: String,
    #[serde(rename = "N_Sites")]
    pub n_sites: usize,
    #[serde(rename = "Residue_Positions")]
    pub residue_positions: String,
    #[serde(rename = "Residue_Types")]
    pub residue_types: String,
}

/// One line of the cluster summary. Noise is reported as cluster `-1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummaryRow {
    pub cluster: i64,
    pub members: usize,
    pub consensus: String,
    pub mean_conservation: String,
    pub conserved_positions: String,
}

/// One `(position, residue, frequency)` cell of a logo frequency table. Positions are 1-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogoRow {
    pub position: usize,
    pub residue: char,
    pub frequency: f64,
}

fn tsv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new().delimiter(b'\t').from_writer(writer)
}

/// Serializes rows as a tab-delimited table with a header line.
pub fn write_rows<T: Serialize>(
    rows: impl IntoIterator<Item = T>,
    writer: impl Write,
) -> Result<(), TableError> {
    let mut wtr = tsv_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn write_rows_to_path<T: Serialize>(
    rows: impl IntoIterator<Item = T>,
    path: &Path,
) -> Result<(), TableError> {
    let file = File::create(path).map_err(|e| TableError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;
    write_rows(rows, file)
}

/// Reads a tab-delimited table with a header line.
pub fn read_rows<T: DeserializeOwned>(reader: impl Read) -> Result<Vec<T>, TableError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .comment(Some(b'#'))
        .from_reader(reader);
    let mut rows = Vec::new();
    for result in rdr.deserialize::<T>() {
        rows.push(result?);
    }
    Ok(rows)
}

pub fn read_rows_from_path<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, TableError> {
    let file = File::open(path).map_err(|e| TableError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;
    read_rows(file)
}

/// Writes a square matrix with identifiers as both the header line and the first column.
pub fn write_distance_matrix(
    ids: &[String],
    matrix: &DMatrix<f64>,
    writer: impl Write,
) -> Result<(), TableError> {
    if matrix.nrows() != ids.len() || matrix.ncols() != ids.len() {
        return Err(TableError::ShapeMismatch {
            ids: ids.len(),
            rows: matrix.nrows(),
            cols: matrix.ncols(),
        });
    }

    let mut wtr = tsv_writer(writer);
    let mut header = Vec::with_capacity(ids.len() + 1);
    header.push("id".to_string());
    header.extend(ids.iter().cloned());
    wtr.write_record(&header)?;

    for (i, id) in ids.iter().enumerate() {
        let mut record = Vec::with_capacity(ids.len() + 1);
        record.push(id.clone());
        record.extend((0..ids.len()).map(|j| format!("{:.4}", matrix[(i, j)])));
        wtr.write_record(&record)?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}
