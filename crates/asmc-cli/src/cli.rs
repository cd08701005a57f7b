use asmc::engine::config::PoseStrategy;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "ASMC CLI - Extract active-site motifs from related proteins and cluster them by similarity.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract active-site motifs from target structures or sequences.
    Extract(ExtractArgs),
    /// Cluster a motif FASTA file with DBSCAN and summarize every cluster.
    Cluster(ClusterArgs),
    /// Merge sequence logo frequency tables into one table.
    MergeLogos(MergeLogosArgs),
}

/// Arguments for the `extract` subcommand.
#[derive(Args, Debug)]
pub struct ExtractArgs {
    // --- Reference ---
    /// Reference PDB structure carrying the annotated active site.
    #[arg(short = 'r', long, required = true, value_name = "PATH")]
    pub reference_pdb: PathBuf,

    /// Active-site definition: a site file or comma-separated residue numbers (e.g. '10,12,34').
    #[arg(short = 's', long, required = true, value_name = "FILE_OR_LIST")]
    pub reference_sites: String,

    /// Reference chain, used when the site definition does not name one [default: A].
    #[arg(short = 'c', long, value_name = "CHAR")]
    pub reference_chain: Option<char>,

    // --- Targets ---
    #[command(flatten)]
    pub targets: TargetInput,

    /// Identifier of the reference row in the alignment [default: reference PDB file stem].
    #[arg(long, value_name = "ID", requires = "target_msa")]
    pub msa_reference: Option<String>,

    /// Chain to read from every target structure (the first chain otherwise).
    #[arg(long, value_name = "CHAR")]
    pub target_chain: Option<char>,

    /// Output file (single structure, FASTA or alignment input) or directory (directory input).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    // --- Extraction Overrides ---
    /// Override the maximum CA distance (Å) for a structural residue match.
    #[arg(long, value_name = "FLOAT")]
    pub distance_cutoff: Option<f64>,

    /// Override how superposition pairs are chosen.
    #[arg(long, value_name = "STRATEGY")]
    pub pose: Option<PoseStrategy>,

    /// Override the minimum number of resolved positions a motif needs to be kept.
    #[arg(long, value_name = "INT")]
    pub min_coverage: Option<usize>,

    /// Path to a configuration file in TOML format.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S extraction.distance-cutoff=3.5
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Exactly one kind of target input.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct TargetInput {
    /// A single target PDB structure.
    #[arg(short = 't', long, value_name = "PATH")]
    pub target_pdb: Option<PathBuf>,

    /// A directory of target PDB structures (every '*.pdb' file).
    #[arg(short = 'd', long, value_name = "DIR")]
    pub target_dir: Option<PathBuf>,

    /// Target protein sequences in FASTA format.
    #[arg(short = 'f', long, value_name = "PATH")]
    pub target_fasta: Option<PathBuf>,

    /// A precomputed multiple sequence alignment (aligned FASTA) holding the reference row.
    #[arg(short = 'a', long, value_name = "PATH")]
    pub target_msa: Option<PathBuf>,
}

/// Arguments for the `cluster` subcommand.
#[derive(Args, Debug)]
pub struct ClusterArgs {
    /// Motif FASTA file, one fixed-length motif per target.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Directory receiving the groups, summary and logo tables.
    #[arg(short, long, required = true, value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Override the DBSCAN neighbourhood radius.
    #[arg(short, long, value_name = "FLOAT")]
    pub epsilon: Option<f64>,

    /// Override the DBSCAN core point threshold (the point itself included).
    #[arg(short, long, value_name = "INT")]
    pub min_samples: Option<usize>,

    /// Score motif pairs with a substitution matrix (NCBI format) instead of identity.
    #[arg(long, value_name = "PATH")]
    pub substitution_matrix: Option<PathBuf>,

    /// Also write the full dissimilarity matrix.
    #[arg(long)]
    pub write_distances: bool,

    /// Path to a configuration file in TOML format.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S clustering.min-samples=2
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `merge-logos` subcommand.
#[derive(Args, Debug)]
pub struct MergeLogosArgs {
    /// Logo frequency tables to merge.
    #[arg(required = true, value_name = "PATH")]
    pub inputs: Vec<PathBuf>,

    /// Path for the merged table.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,
}
