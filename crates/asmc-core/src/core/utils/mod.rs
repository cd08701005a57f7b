//! Stateless numerical kernels: rigid superposition, nearest-neighbour search and
//! pairwise global sequence alignment.

pub mod alignment;
pub mod geometry;
