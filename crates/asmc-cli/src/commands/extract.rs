use super::progress_handler;
use crate::cli::ExtractArgs;
use crate::config::{ExtractionAppConfig, build_extraction_config};
use crate::error::{CliError, Result};
use asmc::core::io::fasta::FastaFile;
use asmc::core::io::msa::MultipleAlignment;
use asmc::core::io::pdb::PdbFile;
use asmc::core::io::sites::{SiteFile, parse_residue_list};
use asmc::core::io::tables::write_rows_to_path;
use asmc::core::io::traits::{SequenceProvider, StructureProvider};
use asmc::core::models::site::ReferenceSite;
use asmc::engine::error::EngineError;
use asmc::engine::progress::ProgressReporter;
use asmc::engine::reference::Reference;
use asmc::workflows::extract::{
    self, ExtractionRecord, ExtractionReport, SequenceTarget, StructureTarget,
};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const SUMMARY_FILE: &str = "active_sites_summary.tsv";
const MOTIFS_FILE: &str = "motifs.fasta";

pub fn run(args: ExtractArgs, show_progress: bool) -> Result<()> {
    let app = build_extraction_config(&args)?;
    let reference = load_reference(&args, &app)?;
    println!(
        "Reference {} chain {}: {} active-site residue(s) [{}]",
        args.reference_pdb.display(),
        reference.chain_id(),
        reference.site().len(),
        join(reference.site().residues())
    );

    let handler = progress_handler(show_progress);
    let reporter = ProgressReporter::with_callback(handler.get_callback());

    let targets = &args.targets;
    if let Some(path) = &targets.target_pdb {
        run_single_structure(&args, &app, &reference, path, &reporter)
    } else if let Some(dir) = &targets.target_dir {
        run_structure_directory(&args, &app, &reference, dir, &reporter)
    } else if let Some(path) = &targets.target_fasta {
        run_sequence_file(&args, &app, &reference, path, &reporter)
    } else if let Some(path) = &targets.target_msa {
        run_alignment_file(&args, &app, &reference, path, &reporter)
    } else {
        Err(CliError::Argument(
            "One of --target-pdb, --target-dir, --target-fasta or --target-msa is required."
                .to_string(),
        ))
    }
}

/// A site file path if one exists, otherwise a comma-separated residue list.
fn load_site(definition: &str, fallback_chain: char) -> Result<ReferenceSite> {
    let path = Path::new(definition);
    let site = if path.is_file() {
        info!("Reading active-site definition from {:?}", path);
        let record = SiteFile::read_from_path(path).map_err(|e| CliError::parsing(path, e))?;
        record
            .into_reference_site(fallback_chain)
            .map_err(EngineError::from)?
    } else {
        let residues = parse_residue_list(definition).map_err(EngineError::from)?;
        ReferenceSite::new(fallback_chain, residues).map_err(EngineError::from)?
    };
    Ok(site)
}

fn load_reference(args: &ExtractArgs, app: &ExtractionAppConfig) -> Result<Reference> {
    let site = load_site(&args.reference_sites, app.reference_chain)?;
    info!("Loading reference structure from {:?}", &args.reference_pdb);
    let structure = PdbFile::read_from_path(&args.reference_pdb)
        .map_err(|e| CliError::parsing(&args.reference_pdb, e))?;
    Ok(Reference::from_structure(site, &structure)?)
}

fn run_single_structure(
    args: &ExtractArgs,
    app: &ExtractionAppConfig,
    reference: &Reference,
    path: &Path,
    reporter: &ProgressReporter,
) -> Result<()> {
    let targets = vec![StructureTarget::from_path(path, app.target_chain)];
    let report = extract::run_structures(reference, &targets, &app.core_config, reporter);

    if let Some(failure) = report.failures.first() {
        return Err(CliError::Argument(format!(
            "Target '{}' could not be processed: {}",
            failure.id, failure.reason
        )));
    }
    let Some(record) = report.records.first() else {
        return Err(CliError::Argument(format!(
            "No result was produced for {}",
            path.display()
        )));
    };

    write_site_file(args, app, record, &file_name(path), &args.output)?;
    print_record(record);
    println!("Active-site file written to: {}", args.output.display());
    Ok(())
}

fn run_structure_directory(
    args: &ExtractArgs,
    app: &ExtractionAppConfig,
    reference: &Reference,
    dir: &Path,
    reporter: &ProgressReporter,
) -> Result<()> {
    let paths = pdb_files_in(dir)?;
    if paths.is_empty() {
        return Err(CliError::Argument(format!(
            "No PDB files found in {}",
            dir.display()
        )));
    }
    println!("Processing {} target structure(s) from {}", paths.len(), dir.display());

    let targets: Vec<StructureTarget> = paths
        .iter()
        .map(|p| StructureTarget::from_path(p, app.target_chain))
        .collect();
    let report = extract::run_structures(reference, &targets, &app.core_config, reporter);

    fs::create_dir_all(&args.output)?;
    let names: HashMap<&str, String> = targets
        .iter()
        .zip(&paths)
        .map(|(target, path)| (target.id.as_str(), file_name(path)))
        .collect();
    for record in &report.records {
        let structure_name = names
            .get(record.id.as_str())
            .cloned()
            .unwrap_or_else(|| record.id.clone());
        let out = args.output.join(format!("{}_active_sites.txt", record.id));
        if let Err(e) = write_site_file(args, app, record, &structure_name, &out) {
            warn!(id = %record.id, "Failed to write active-site file: {}", e);
        }
    }

    let summary_path = args.output.join(SUMMARY_FILE);
    write_rows_to_path(
        report.summary_rows(&file_name(&args.reference_pdb), reference),
        &summary_path,
    )
    .map_err(|e| CliError::output(&summary_path, e))?;
    write_motifs(&report, &args.output.join(MOTIFS_FILE))?;

    print_report(&report, targets.len());
    println!("Results written to: {}", args.output.display());
    Ok(())
}

fn run_sequence_file(
    args: &ExtractArgs,
    app: &ExtractionAppConfig,
    reference: &Reference,
    path: &Path,
    reporter: &ProgressReporter,
) -> Result<()> {
    let records = FastaFile::read_from_path(path).map_err(|e| CliError::parsing(path, e))?;
    if records.is_empty() {
        return Err(CliError::Argument(format!(
            "No sequences found in {}",
            path.display()
        )));
    }
    println!("Processing {} target sequence(s) from {}", records.len(), path.display());

    let targets: Vec<SequenceTarget> = records.into_iter().map(SequenceTarget::from).collect();
    let report = extract::run_sequences(reference, &targets, &app.core_config, reporter);

    write_motifs(&report, &args.output)?;
    print_report(&report, targets.len());
    println!("Motifs written to: {}", args.output.display());
    Ok(())
}

fn run_alignment_file(
    args: &ExtractArgs,
    app: &ExtractionAppConfig,
    reference: &Reference,
    path: &Path,
    reporter: &ProgressReporter,
) -> Result<()> {
    let alignment = MultipleAlignment::read_from_path(path).map_err(|e| CliError::parsing(path, e))?;
    let reference_id = msa_reference_id(args);
    println!(
        "Processing {} aligned sequence(s) from {} (reference row '{}')",
        alignment.len(),
        path.display(),
        reference_id
    );

    let report = extract::run_alignment(reference, &alignment, &reference_id, &app.core_config, reporter)?;

    write_motifs(&report, &args.output)?;
    print_report(&report, alignment.len());
    println!("Motifs written to: {}", args.output.display());
    Ok(())
}

fn msa_reference_id(args: &ExtractArgs) -> String {
    args.msa_reference.clone().unwrap_or_else(|| {
        args.reference_pdb
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    })
}

/// Every `*.pdb` file directly inside `dir`, sorted by name.
fn pdb_files_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_pdb = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdb"));
        if path.is_file() && is_pdb {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn write_site_file(
    args: &ExtractArgs,
    app: &ExtractionAppConfig,
    record: &ExtractionRecord,
    structure_name: &str,
    out: &Path,
) -> Result<()> {
    let (site, details) = record.site_entry(structure_name);
    let mut comments = vec![
        format!("Active sites extracted from {}", structure_name),
        format!("Reference: {}", file_name(&args.reference_pdb)),
    ];
    if let Some(superposition) = &record.correspondence.superposition {
        comments.push(format!(
            "RMSD: {:.2} Å over {} CA pairs ({})",
            superposition.rmsd, superposition.pose_pairs, superposition.strategy
        ));
    }
    comments.push(format!(
        "Distance cutoff: {:.1} Å",
        app.core_config.structural.distance_cutoff
    ));
    if let Some(chain) = record.chain_id {
        comments.push(format!("Chain: {}", chain));
    }

    let file = File::create(out).map_err(|e| CliError::output(out, e))?;
    let mut writer = BufWriter::new(file);
    SiteFile::write_to(&site, &comments, &details, &mut writer).map_err(|e| CliError::output(out, e))
}

fn write_motifs(report: &ExtractionReport, out: &Path) -> Result<()> {
    let file = File::create(out).map_err(|e| CliError::output(out, e))?;
    let mut writer = BufWriter::new(file);
    FastaFile::write_motifs(&report.motifs, &mut writer).map_err(|e| CliError::output(out, e))
}

fn print_record(record: &ExtractionRecord) {
    if let Some(superposition) = &record.correspondence.superposition {
        println!("RMSD: {:.2} Å", superposition.rmsd);
    }
    println!(
        "Motif: {} ({}/{} positions resolved)",
        record.motif(),
        record.motif().resolved_count(),
        record.motif().len()
    );
}

fn print_report(report: &ExtractionReport, total: usize) {
    println!(
        "Extracted {} motif(s) from {} target(s): {} rejected by coverage, {} failed.",
        report.motifs.len(),
        total,
        report.rejected().count(),
        report.failures.len()
    );
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

fn join(residues: &[isize]) -> String {
    residues
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn site_definition_accepts_lists_and_files() {
        let site = load_site("34, 10,12", 'B').unwrap();
        assert_eq!(site.chain_id(), 'B');
        assert_eq!(site.residues(), &[10, 12, 34]);

        let dir = tempdir().unwrap();
        let path = dir.path().join("sites.txt");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "# comment\nref.pdb\tC\t5,7").unwrap();
        let site = load_site(path.to_str().unwrap(), 'A').unwrap();
        assert_eq!(site.chain_id(), 'C');
        assert_eq!(site.residues(), &[5, 7]);

        assert!(matches!(
            load_site("10,abc", 'A'),
            Err(CliError::AsmcCore(EngineError::Definition { .. }))
        ));
    }

    fn extract_args(extra: &[&str]) -> ExtractArgs {
        let mut argv = vec!["asmc", "extract", "-r", "data/1abc.pdb", "-s", "10", "-o", "out.fasta"];
        argv.extend(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Extract(args) => args,
            _ => panic!("Expected 'extract' subcommand"),
        }
    }

    #[test]
    fn alignment_reference_row_defaults_to_reference_stem() {
        assert_eq!(msa_reference_id(&extract_args(&["-a", "family.aln"])), "1abc");
        assert_eq!(
            msa_reference_id(&extract_args(&["-a", "family.aln", "--msa-reference", "ref_row"])),
            "ref_row"
        );
    }

    #[test]
    fn pdb_files_are_listed_in_name_order() {
        let dir = tempdir().unwrap();
        for name in ["b.pdb", "a.PDB", "notes.txt", "c.pdb"] {
            File::create(dir.path().join(name)).unwrap();
        }
        fs::create_dir(dir.path().join("nested.pdb")).unwrap();

        let names: Vec<String> = pdb_files_in(dir.path())
            .unwrap()
            .iter()
            .map(|p| file_name(p))
            .collect();
        assert_eq!(names, vec!["a.PDB", "b.pdb", "c.pdb"]);
    }
}
