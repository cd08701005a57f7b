//! Provides input/output collaborators for the pipeline.
//!
//! Readers turn PDB, FASTA, aligned FASTA, active-site and substitution matrix files
//! into core models; writers emit motif FASTA files and tab-delimited result tables. Structure
//! and sequence readers share the trait-based interface in [`traits`].

pub mod fasta;
pub mod matrix;
pub mod msa;
pub mod pdb;
pub mod sites;
pub mod tables;
pub mod traits;
