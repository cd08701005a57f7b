use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Character written for motif positions without a resolved residue.
pub const PLACEHOLDER: char = 'X';

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MotifError {
    #[error("Target '{0}' already has a motif in the set")]
    DuplicateIdentifier(String),

    #[error("Motif for '{id}' has length {found}, but the set holds motifs of length {expected}")]
    LengthMismatch {
        id: String,
        expected: usize,
        found: usize,
    },
}

/// The residues found at the active-site positions of one target, in reference order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Motif {
    residues: Vec<char>,
}

impl Motif {
    /// Builds a motif, upper-casing residues and mapping gaps (`-`, `.`) and any
    /// non-ASCII character to the placeholder.
    pub fn new(residues: impl IntoIterator<Item = char>) -> Self {
        Self {
            residues: residues
                .into_iter()
                .map(|c| match c {
                    '-' | '.' => PLACEHOLDER,
                    c if !c.is_ascii() => PLACEHOLDER,
                    c => c.to_ascii_uppercase(),
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    pub fn residues(&self) -> &[char] {
        &self.residues
    }

    pub fn get(&self, position: usize) -> Option<char> {
        self.residues.get(position).copied()
    }

    pub fn is_resolved_at(&self, position: usize) -> bool {
        self.get(position).is_some_and(|c| c != PLACEHOLDER)
    }

    /// Number of positions holding a real residue rather than the placeholder.
    pub fn resolved_count(&self) -> usize {
        self.residues.iter().filter(|&&c| c != PLACEHOLDER).count()
    }
}

impl fmt::Display for Motif {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.residues {
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

impl From<&str> for Motif {
    fn from(s: &str) -> Self {
        Motif::new(s.chars())
    }
}

/// Motifs keyed by target identifier, kept in insertion order.
///
/// All motifs in a set share one length, fixed by the first insertion.
#[derive(Debug, Clone, Default)]
pub struct MotifSet {
    entries: Vec<(String, Motif)>,
    index: HashMap<String, usize>,
}

impl MotifSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, motif: Motif) -> Result<(), MotifError> {
        let id = id.into();
        if self.index.contains_key(&id) {
            return Err(MotifError::DuplicateIdentifier(id));
        }
        if let Some(expected) = self.motif_length() {
            if motif.len() != expected {
                return Err(MotifError::LengthMismatch {
                    id,
                    expected,
                    found: motif.len(),
                });
            }
        }
        self.index.insert(id.clone(), self.entries.len());
        self.entries.push((id, motif));
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Motif> {
        self.index.get(id).map(|&i| &self.entries[i].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Common motif length, or `None` for an empty set.
    pub fn motif_length(&self) -> Option<usize> {
        self.entries.first().map(|(_, m)| m.len())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Motif)> {
        self.entries.iter().map(|(id, m)| (id.as_str(), m))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    pub fn motifs(&self) -> impl Iterator<Item = &Motif> {
        self.entries.iter().map(|(_, m)| m)
    }

    pub fn entry(&self, index: usize) -> Option<(&str, &Motif)> {
        self.entries.get(index).map(|(id, m)| (id.as_str(), m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_maps_gaps_to_placeholder_and_uppercases() {
        let motif = Motif::new("a-c.".chars());
        assert_eq!(motif.to_string(), "AXCX");
        assert_eq!(motif.resolved_count(), 2);
        assert!(motif.is_resolved_at(0));
        assert!(!motif.is_resolved_at(1));
        assert!(!motif.is_resolved_at(10));
    }

    #[test]
    fn new_maps_non_ascii_residues_to_placeholder() {
        let motif = Motif::from("sÉdÄ");
        assert_eq!(motif.to_string(), "SXDX");
        assert_eq!(motif.resolved_count(), 2);
    }

    #[test]
    fn insert_preserves_insertion_order() {
        let mut set = MotifSet::new();
        set.insert("t2", Motif::from("ACD")).unwrap();
        set.insert("t1", Motif::from("ACE")).unwrap();
        set.insert("t3", Motif::from("XXX")).unwrap();
        let ids: Vec<&str> = set.ids().collect();
        assert_eq!(ids, vec!["t2", "t1", "t3"]);
        assert_eq!(set.get("t1"), Some(&Motif::from("ACE")));
        assert_eq!(set.motif_length(), Some(3));
    }

    #[test]
    fn insert_rejects_duplicate_identifier() {
        let mut set = MotifSet::new();
        set.insert("t1", Motif::from("AC")).unwrap();
        assert_eq!(
            set.insert("t1", Motif::from("GG")),
            Err(MotifError::DuplicateIdentifier("t1".to_string()))
        );
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn insert_rejects_length_mismatch() {
        let mut set = MotifSet::new();
        set.insert("t1", Motif::from("ACD")).unwrap();
        let result = set.insert("t2", Motif::from("AC"));
        assert!(matches!(
            result,
            Err(MotifError::LengthMismatch {
                expected: 3,
                found: 2,
                ..
            })
        ));
    }

    #[test]
    fn empty_set_has_no_motif_length() {
        assert_eq!(MotifSet::new().motif_length(), None);
    }
}
