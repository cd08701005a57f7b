//! # Workflows Module
//!
//! High-level entry points that run a complete ASMC step over a batch of inputs.
//!
//! ## Overview
//!
//! Each workflow takes fully loaded inputs and a configuration, drives the engine
//! components and reports progress through a [`ProgressReporter`](crate::engine::progress::ProgressReporter).
//! Per-target problems are collected in the returned report and never abort a batch;
//! only failures that make the whole step meaningless surface as errors.
//!
//! ## Architecture
//!
//! - **Extraction** ([`extract`]) - Motif extraction from structures (superposition and
//!   nearest-neighbour matching) or raw sequences (global alignment).
//! - **Clustering** ([`cluster`]) - Dissimilarity matrix, DBSCAN and per-cluster
//!   consensus profiles with their output tables.
//! - **Logo merging** ([`logo`]) - Combining per-cluster frequency tables.

pub mod cluster;
pub mod extract;
pub mod logo;
