//! # Engine Module
//!
//! This module implements the residue-correspondence and motif-clustering engine
//! of ASMC.
//!
//! ## Overview
//!
//! The engine turns a validated [`reference::Reference`] and a set of targets into
//! motifs, and motifs into clusters. Every stage is a pure function of its inputs;
//! shared state is limited to the immutable reference and the motif set, which is
//! only read once extraction has finished.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Cutoffs, pose strategy, coverage and clustering parameters
//! - **Reference** ([`reference`]) - The validated reference chain and active site
//! - **Correspondence** ([`correspondence`]) - Structural and sequence resolvers behind one trait
//! - **Extraction** ([`extraction`]) - Fixed-length motifs and the coverage policy
//! - **Dissimilarity** ([`dissimilarity`]) - Identity and substitution-matrix distance matrices
//! - **Clustering** ([`clustering`]) - DBSCAN over a precomputed matrix
//! - **Consensus** ([`consensus`]) - Per-cluster profiles and mergeable logo tables
//! - **Progress Monitoring** ([`progress`]) - Progress reporting callbacks
//! - **Error Handling** ([`error`]) - The aggregated engine error type

pub mod clustering;
pub mod config;
pub mod consensus;
pub mod correspondence;
pub mod dissimilarity;
pub mod error;
pub mod extraction;
pub mod progress;
pub mod reference;
