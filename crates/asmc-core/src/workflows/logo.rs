use crate::core::io::tables::{LogoRow, read_rows_from_path};
use crate::engine::consensus::LogoTable;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use std::path::PathBuf;
use tracing::{debug, info, instrument};

/// Reads every logo frequency table and merges them into one renormalized table.
#[instrument(skip_all, name = "logo_merge_workflow")]
pub fn merge_files(paths: &[PathBuf], reporter: &ProgressReporter) -> Result<LogoTable, EngineError> {
    reporter.report(Progress::PhaseStart { name: "Logo Merge" });
    reporter.report(Progress::TaskStart {
        total_steps: paths.len() as u64,
    });

    let mut tables = Vec::with_capacity(paths.len());
    for path in paths {
        let rows: Vec<LogoRow> = read_rows_from_path(path)?;
        let table = LogoTable::from_rows(&rows)?;
        debug!(path = %path.display(), positions = table.len(), "Logo table loaded.");
        tables.push(table);
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);

    let merged = LogoTable::merge_all(&tables);
    reporter.report(Progress::PhaseFinish);
    info!(tables = tables.len(), positions = merged.len(), "Logo tables merged.");
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::tables::write_rows_to_path;
    use tempfile::tempdir;

    fn row(position: usize, residue: char, frequency: f64) -> LogoRow {
        LogoRow {
            position,
            residue,
            frequency,
        }
    }

    #[test]
    fn merges_tables_from_disk() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.tsv");
        let b = dir.path().join("b.tsv");
        write_rows_to_path(vec![row(1, 'A', 0.75), row(1, 'G', 0.25)], &a).unwrap();
        write_rows_to_path(vec![row(1, 'G', 1.0), row(2, 'C', 1.0)], &b).unwrap();

        let merged = merge_files(&[a, b], &ProgressReporter::new()).unwrap();
        assert_eq!(merged.len(), 2);
        assert!((merged.frequency(0, 'A') - 0.375).abs() < 1e-12);
        assert!((merged.frequency(0, 'G') - 0.625).abs() < 1e-12);
        assert_eq!(merged.frequency(1, 'C'), 1.0);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let result = merge_files(&[dir.path().join("absent.tsv")], &ProgressReporter::new());
        assert!(matches!(result, Err(EngineError::Table { .. })));
    }

    #[test]
    fn invalid_rows_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.tsv");
        write_rows_to_path(vec![row(0, 'A', 1.0)], &path).unwrap();
        let result = merge_files(&[path], &ProgressReporter::new());
        assert!(matches!(result, Err(EngineError::Profile { .. })));
    }

    #[test]
    fn no_inputs_give_an_empty_table() {
        assert!(merge_files(&[], &ProgressReporter::new()).unwrap().is_empty());
    }
}
