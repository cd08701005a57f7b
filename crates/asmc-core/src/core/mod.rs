//! # Core Module
//!
//! This module provides the fundamental data structures and kernels of ASMC, the
//! active-site motif extraction and clustering library.
//!
//! ## Overview
//!
//! Everything here is free of pipeline state. The [`models`] describe residues,
//! chains, the reference active site and extracted motifs. The [`utils`] hold the
//! geometric and alignment kernels the correspondence resolvers are built on, and
//! [`io`] reads and writes the file formats the pipeline exchanges with the outside.
//!
//! ## Architecture
//!
//! - **Data Models** ([`models`]) - Residue records, chains, reference sites, motifs
//! - **Kernels** ([`utils`]) - Kabsch superposition, nearest-neighbour search, global alignment
//! - **File I/O** ([`io`]) - PDB, FASTA, active-site files, substitution matrices, result tables

pub mod io;
pub mod models;
pub mod utils;
