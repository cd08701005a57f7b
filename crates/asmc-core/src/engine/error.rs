use thiserror::Error;

use super::config::ConfigError;
use super::consensus::ProfileError;
use crate::core::io::msa::MsaError;
use crate::core::io::pdb::PdbError;
use crate::core::io::tables::TableError;
use crate::core::models::chain::StructureError;
use crate::core::models::motif::MotifError;
use crate::core::models::site::DefinitionError;
use crate::core::utils::alignment::AlignmentError;
use crate::core::utils::geometry::GeometryError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Invalid active-site definition: {source}")]
    Definition {
        #[from]
        source: DefinitionError,
    },

    #[error("Structure error: {source}")]
    Structure {
        #[from]
        source: StructureError,
    },

    #[error("Superposition failed: {source}")]
    Geometry {
        #[from]
        source: GeometryError,
    },

    #[error("Sequence alignment failed: {source}")]
    Alignment {
        #[from]
        source: AlignmentError,
    },

    #[error("Multiple alignment error: {source}")]
    Msa {
        #[from]
        source: MsaError,
    },

    #[error("Motif set error: {source}")]
    Motif {
        #[from]
        source: MotifError,
    },

    #[error("Logo table error: {source}")]
    Profile {
        #[from]
        source: ProfileError,
    },

    #[error("Failed to read structure '{path}': {source}")]
    StructureFile { path: String, source: PdbError },

    #[error("Table I/O failed: {source}")]
    Table {
        #[from]
        source: TableError,
    },
}
