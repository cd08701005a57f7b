use nalgebra::Point3;
use phf::{Map, phf_map};

/// One-letter code used for residues whose three-letter name is not a standard amino acid.
pub const UNKNOWN_RESIDUE_CODE: char = 'X';

#[rustfmt::skip]
static THREE_TO_ONE: Map<&'static str, char> = phf_map! {
    "ALA" => 'A', "CYS" => 'C', "ASP" => 'D', "GLU" => 'E',
    "PHE" => 'F', "GLY" => 'G', "HIS" => 'H', "ILE" => 'I',
    "LYS" => 'K', "LEU" => 'L', "MET" => 'M', "ASN" => 'N',
    "PRO" => 'P', "GLN" => 'Q', "ARG" => 'R', "SER" => 'S',
    "THR" => 'T', "VAL" => 'V', "TRP" => 'W', "TYR" => 'Y',
    // Common protonation-state aliases
    "HSE" => 'H', "HSD" => 'H', "HSP" => 'H', "HIE" => 'H', "HID" => 'H', "HIP" => 'H',
};

/// Converts a three-letter residue name to its one-letter code.
///
/// Returns `None` for anything that is not one of the twenty standard amino acids
/// (or a histidine protonation alias).
pub fn three_to_one(name: &str) -> Option<char> {
    THREE_TO_ONE.get(name.trim().to_ascii_uppercase().as_str()).copied()
}

/// A single residue as handed over by a structure provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ResidueRecord {
    pub number: isize,          // Residue sequence number from the source file
    pub code: char,             // One-letter residue type, `X` when unknown
    pub ca: Option<Point3<f64>>, // Alpha-carbon coordinate, if the residue has one
}

impl ResidueRecord {
    pub fn new(number: isize, code: char, ca: Option<Point3<f64>>) -> Self {
        Self {
            number,
            code: code.to_ascii_uppercase(),
            ca,
        }
    }

    /// Builds a record from a three-letter residue name, mapping unknown names to `X`.
    pub fn from_three_letter(number: isize, name: &str, ca: Option<Point3<f64>>) -> Self {
        Self::new(
            number,
            three_to_one(name).unwrap_or(UNKNOWN_RESIDUE_CODE),
            ca,
        )
    }

    pub fn has_ca(&self) -> bool {
        self.ca.is_some()
    }

    pub fn is_standard(&self) -> bool {
        self.code != UNKNOWN_RESIDUE_CODE
    }
}
