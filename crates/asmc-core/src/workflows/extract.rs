use crate::core::io::msa::{MsaError, MultipleAlignment};
use crate::core::io::pdb::PdbFile;
use crate::core::io::sites::{SiteDetail, SiteRecord};
use crate::core::io::tables::ExtractionSummaryRow;
use crate::core::io::traits::{SequenceRecord, StructureProvider};
use crate::core::models::chain::Structure;
use crate::core::models::motif::{Motif, MotifSet};
use crate::engine::config::ExtractionConfig;
use crate::engine::correspondence::msa::MsaResolver;
use crate::engine::correspondence::sequence::SequenceResolver;
use crate::engine::correspondence::structural::StructuralResolver;
use crate::engine::correspondence::{CorrespondenceMap, CorrespondenceResolver};
use crate::engine::error::EngineError;
use crate::engine::extraction::{Extraction, MotifExtractor};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::reference::Reference;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Debug, Clone)]
pub enum StructureSource {
    Path(PathBuf),
    Loaded(Structure),
}

/// A target structure, optionally restricted to one chain (the first chain otherwise).
#[derive(Debug, Clone)]
pub struct StructureTarget {
    pub id: String,
    pub source: StructureSource,
    pub chain: Option<char>,
}

impl StructureTarget {
    /// A file-backed target named after the file stem.
    pub fn from_path(path: impl AsRef<Path>, chain: Option<char>) -> Self {
        let path = path.as_ref();
        let id = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        Self {
            id,
            source: StructureSource::Path(path.to_path_buf()),
            chain,
        }
    }

    pub fn loaded(id: impl Into<String>, structure: Structure, chain: Option<char>) -> Self {
        Self {
            id: id.into(),
            source: StructureSource::Loaded(structure),
            chain,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceTarget {
    pub id: String,
    pub sequence: String,
}

impl From<SequenceRecord> for SequenceTarget {
    fn from(record: SequenceRecord) -> Self {
        Self {
            id: record.id,
            sequence: record.sequence,
        }
    }
}

/// A target that was resolved, whether or not its motif passed the coverage policy.
#[derive(Debug, Clone)]
pub struct ExtractionRecord {
    pub id: String,
    pub chain_id: Option<char>,
    pub extraction: Extraction,
    pub correspondence: CorrespondenceMap,
}

impl ExtractionRecord {
    pub fn motif(&self) -> &Motif {
        self.extraction.motif()
    }

    /// The matched target residues in active-site file form, each listed once, with
    /// one detail per matched reference residue.
    pub fn site_entry(&self, structure_name: &str) -> (SiteRecord, Vec<SiteDetail>) {
        let details: Vec<SiteDetail> = self
            .correspondence
            .structural_matches()
            .map(|(_, target_residue, residue_type, distance)| SiteDetail {
                residue_number: target_residue,
                residue_type,
                distance,
            })
            .collect();
        let mut residues: Vec<isize> = Vec::with_capacity(details.len());
        for detail in &details {
            if !residues.contains(&detail.residue_number) {
                residues.push(detail.residue_number);
            }
        }
        let record = SiteRecord {
            structure: structure_name.to_string(),
            chain_id: self.chain_id,
            residues,
        };
        (record, details)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFailure {
    pub id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    /// Accepted motifs, in target input order.
    pub motifs: MotifSet,
    /// Every successfully resolved target, in input order.
    pub records: Vec<ExtractionRecord>,
    pub failures: Vec<TargetFailure>,
}

impl ExtractionReport {
    pub fn rejected(&self) -> impl Iterator<Item = &ExtractionRecord> {
        self.records.iter().filter(|r| !r.extraction.is_accepted())
    }

    /// Structural summary table rows, reference first.
    pub fn summary_rows(&self, reference_name: &str, reference: &Reference) -> Vec<ExtractionSummaryRow> {
        let site = reference.site();
        let mut rows = Vec::with_capacity(self.records.len() + 1);
        rows.push(ExtractionSummaryRow {
            structure: reference_name.to_string(),
            chain: reference.chain_id().to_string(),
            rmsd: "0.00".to_string(),
            n_sites: site.len(),
            residue_positions: join(site.residues().iter()),
            residue_types: "-".to_string(),
        });

        for record in &self.records {
            let matches: Vec<(isize, char)> = record
                .correspondence
                .structural_matches()
                .map(|(_, target, residue_type, _)| (target, residue_type))
                .collect();
            rows.push(ExtractionSummaryRow {
                structure: record.id.clone(),
                chain: record.chain_id.map(String::from).unwrap_or_else(|| "-".to_string()),
                rmsd: record
                    .correspondence
                    .superposition
                    .as_ref()
                    .map(|s| format!("{:.2}", s.rmsd))
                    .unwrap_or_else(|| "-".to_string()),
                n_sites: matches.len(),
                residue_positions: join(matches.iter().map(|(n, _)| n)),
                residue_types: join(matches.iter().map(|(_, c)| c)),
            });
        }
        rows
    }
}

fn join<T: ToString>(items: impl Iterator<Item = T>) -> String {
    items.map(|i| i.to_string()).collect::<Vec<_>>().join(",")
}

type Resolved = Result<(Option<char>, CorrespondenceMap), EngineError>;

/// Resolves every target, then merges results into the report in input order.
fn run_batch<T, F>(
    targets: &[T],
    id_of: impl Fn(&T) -> &str,
    resolve: F,
    reference: &Reference,
    config: &ExtractionConfig,
    reporter: &ProgressReporter,
) -> ExtractionReport
where
    T: Sync,
    F: Fn(&T) -> Resolved + Sync,
{
    reporter.report(Progress::TaskStart {
        total_steps: targets.len() as u64,
    });

    let work = |target: &T| -> Resolved {
        let result = resolve(target);
        reporter.report(Progress::TaskIncrement);
        result
    };

    #[cfg(not(feature = "parallel"))]
    let results: Vec<Resolved> = targets.iter().map(work).collect();

    #[cfg(feature = "parallel")]
    let results: Vec<Resolved> = targets.par_iter().map(work).collect();

    reporter.report(Progress::TaskFinish);

    let extractor = MotifExtractor::new(config.min_coverage);
    let mut report = ExtractionReport::default();

    for (target, result) in targets.iter().zip(results) {
        let id = id_of(target).to_string();
        let (chain_id, correspondence) = match result {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!(id = %id, "Skipping target: {}", e);
                record_failure(&mut report, reporter, id, e.to_string());
                continue;
            }
        };

        let extraction = extractor.extract(&correspondence, reference.site());
        match &extraction {
            Extraction::Accepted(motif) => {
                if let Err(e) = report.motifs.insert(id.clone(), motif.clone()) {
                    warn!(id = %id, "Skipping target: {}", e);
                    record_failure(&mut report, reporter, id, e.to_string());
                    continue;
                }
            }
            Extraction::Rejected { resolved, .. } => {
                info!(
                    id = %id,
                    resolved,
                    required = extractor.min_coverage(),
                    "Motif rejected by the coverage policy."
                );
            }
        }

        report.records.push(ExtractionRecord {
            id,
            chain_id,
            extraction,
            correspondence,
        });
    }

    report
}

fn record_failure(report: &mut ExtractionReport, reporter: &ProgressReporter, id: String, reason: String) {
    reporter.report(Progress::TargetFailed {
        id: id.clone(),
        reason: reason.clone(),
    });
    report.failures.push(TargetFailure { id, reason });
}

/// Extracts motifs from target structures by superposition onto the reference.
#[instrument(skip_all, name = "structure_extraction_workflow")]
pub fn run_structures(
    reference: &Reference,
    targets: &[StructureTarget],
    config: &ExtractionConfig,
    reporter: &ProgressReporter,
) -> ExtractionReport {
    reporter.report(Progress::PhaseStart {
        name: "Structural Extraction",
    });
    info!(
        targets = targets.len(),
        cutoff = config.structural.distance_cutoff,
        pose = %config.structural.pose,
        "Starting structural motif extraction."
    );

    let resolver = StructuralResolver::new(config.structural);
    let report = run_batch(
        targets,
        |t| t.id.as_str(),
        |target| {
            let loaded;
            let structure = match &target.source {
                StructureSource::Path(path) => {
                    loaded = PdbFile::read_from_path(path).map_err(|e| EngineError::StructureFile {
                        path: path.to_string_lossy().to_string(),
                        source: e,
                    })?;
                    &loaded
                }
                StructureSource::Loaded(structure) => structure,
            };
            let chain = structure.select_chain(target.chain)?;
            let map = resolver.resolve(reference, chain)?;
            Ok((Some(chain.id), map))
        },
        reference,
        config,
        reporter,
    );

    reporter.report(Progress::PhaseFinish);
    info!(
        accepted = report.motifs.len(),
        rejected = report.rejected().count(),
        failed = report.failures.len(),
        "Structural extraction complete."
    );
    report
}

/// Extracts motifs from raw target sequences by global alignment to the reference sequence.
#[instrument(skip_all, name = "sequence_extraction_workflow")]
pub fn run_sequences(
    reference: &Reference,
    targets: &[SequenceTarget],
    config: &ExtractionConfig,
    reporter: &ProgressReporter,
) -> ExtractionReport {
    reporter.report(Progress::PhaseStart {
        name: "Sequence Extraction",
    });
    info!(
        targets = targets.len(),
        reference_length = reference.sequence().len(),
        "Starting sequence motif extraction."
    );

    let resolver = SequenceResolver::new();
    let report = run_batch(
        targets,
        |t| t.id.as_str(),
        |target| Ok((None, resolver.resolve(reference, target.sequence.as_str())?)),
        reference,
        config,
        reporter,
    );

    reporter.report(Progress::PhaseFinish);
    info!(
        accepted = report.motifs.len(),
        total = targets.len(),
        "Sequence extraction complete."
    );
    report
}

/// Extracts motifs from every row of a precomputed multiple alignment.
///
/// Site columns are located through the row named `reference_id`, which is itself
/// extracted like any other row. Rows keep alignment order.
///
/// # Errors
///
/// Fails when the reference row is missing or does not spell the reference chain.
#[instrument(skip_all, name = "alignment_extraction_workflow")]
pub fn run_alignment(
    reference: &Reference,
    alignment: &MultipleAlignment,
    reference_id: &str,
    config: &ExtractionConfig,
    reporter: &ProgressReporter,
) -> Result<ExtractionReport, EngineError> {
    let reference_row = alignment
        .row(reference_id)
        .ok_or_else(|| MsaError::MissingReferenceRow(reference_id.to_string()))?;
    let resolver = MsaResolver::new(reference, &reference_row.sequence)?;

    reporter.report(Progress::PhaseStart {
        name: "Alignment Extraction",
    });
    info!(
        rows = alignment.len(),
        columns = alignment.width(),
        reference_row = reference_id,
        "Starting alignment motif extraction."
    );

    let targets: Vec<SequenceTarget> = alignment.rows().iter().cloned().map(SequenceTarget::from).collect();
    let report = run_batch(
        &targets,
        |t| t.id.as_str(),
        |target| Ok((None, resolver.resolve(reference, target.sequence.as_str())?)),
        reference,
        config,
        reporter,
    );

    reporter.report(Progress::PhaseFinish);
    info!(
        accepted = report.motifs.len(),
        total = targets.len(),
        "Alignment extraction complete."
    );
    Ok(report)
}
