//! # ASMC Core Library
//!
//! Active-site motif extraction and clustering for families of related proteins.
//!
//! Given a reference structure with annotated active-site residues, the library finds
//! the corresponding residues in target structures or sequences, condenses each target
//! into a fixed-length motif, and groups the motifs with density-based clustering.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Structure`, `ReferenceSite`,
//!   `MotifSet`), geometric and alignment primitives, and readers and writers for PDB,
//!   FASTA, substitution matrix and tab-separated table files.
//!
//! - **[`engine`]: The Logic Core.** Correspondence resolution (structural superposition
//!   or sequence alignment), motif extraction, the dissimilarity matrix, DBSCAN and
//!   consensus profiling, together with configuration, errors and progress reporting.
//!
//! - **[`workflows`]: The Public API.** Batch procedures that tie `engine` and `core`
//!   together: extracting motifs from many targets, clustering a motif set, and merging
//!   sequence logo tables.

pub mod core;
pub mod engine;
pub mod workflows;
