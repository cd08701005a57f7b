//! # Core Models Module
//!
//! Plain data structures shared by every stage of the pipeline.
//!
//! ## Key Components
//!
//! - [`residue`] - Residue records (number, one-letter type, optional CA coordinate)
//! - [`chain`] - Chains and structures as ordered residue collections
//! - [`site`] - The validated reference active-site definition
//! - [`motif`] - Per-target motifs and the insertion-ordered motif set
//!
//! ## Usage
//!
//! ```ignore
//! use asmc::core::models::{chain::Chain, residue::ResidueRecord, site::ReferenceSite};
//!
//! let site = ReferenceSite::new('A', vec![34, 10, 12])?;
//! let mut chain = Chain::new('A');
//! chain.push(ResidueRecord::from_three_letter(10, "SER", Some(Point3::new(0.0, 0.0, 0.0))));
//! ```

pub mod chain;
pub mod motif;
pub mod residue;
pub mod site;
