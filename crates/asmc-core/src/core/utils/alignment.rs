use thiserror::Error;

pub const GAP: char = '-';

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AlignmentError {
    #[error("Cannot align an empty {0} sequence")]
    EmptySequence(&'static str),
}

/// One optimal global alignment of a reference against a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalAlignment {
    pub reference: Vec<char>, // Aligned reference track, gaps as `-`
    pub target: Vec<char>,    // Aligned target track, gaps as `-`
    pub score: u32,
}

impl GlobalAlignment {
    pub fn len(&self) -> usize {
        self.reference.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reference.is_empty()
    }

    /// Index pairs `(reference_index, target_index)` of columns holding the same residue
    /// on both tracks, indexed into the ungapped input sequences.
    pub fn identical_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        let (mut ri, mut ti) = (0, 0);
        for (&r, &t) in self.reference.iter().zip(&self.target) {
            if r != GAP && t != GAP && r == t {
                pairs.push((ri, ti));
            }
            if r != GAP {
                ri += 1;
            }
            if t != GAP {
                ti += 1;
            }
        }
        pairs
    }
}

#[derive(Clone, Copy)]
enum Step {
    Diagonal,
    GapInTarget,
    GapInReference,
}

/// Global alignment scoring identical characters 1 and everything else (mismatches, gaps) 0.
///
/// The traceback keeps a single alignment and, among equally scoring moves, prefers
/// the diagonal, then a gap in the target, then a gap in the reference.
///
/// # Errors
///
/// Returns [`AlignmentError::EmptySequence`] if either sequence is empty.
pub fn global_align(reference: &[char], target: &[char]) -> Result<GlobalAlignment, AlignmentError> {
    if reference.is_empty() {
        return Err(AlignmentError::EmptySequence("reference"));
    }
    if target.is_empty() {
        return Err(AlignmentError::EmptySequence("target"));
    }

    let n = reference.len();
    let m = target.len();
    let width = m + 1;
    let mut scores = vec![0u32; (n + 1) * width];

    for i in 1..=n {
        for j in 1..=m {
            let matched = u32::from(reference[i - 1] == target[j - 1]);
            let diagonal = scores[(i - 1) * width + (j - 1)] + matched;
            let up = scores[(i - 1) * width + j];
            let left = scores[i * width + (j - 1)];
            scores[i * width + j] = diagonal.max(up).max(left);
        }
    }

    let mut aligned_reference = Vec::with_capacity(n + m);
    let mut aligned_target = Vec::with_capacity(n + m);
    let (mut i, mut j) = (n, m);

    while i > 0 || j > 0 {
        let current = scores[i * width + j];
        let step = if i > 0 && j > 0 {
            let matched = u32::from(reference[i - 1] == target[j - 1]);
            if current == scores[(i - 1) * width + (j - 1)] + matched {
                Step::Diagonal
            } else if current == scores[(i - 1) * width + j] {
                Step::GapInTarget
            } else {
                Step::GapInReference
            }
        } else if i > 0 {
            Step::GapInTarget
        } else {
            Step::GapInReference
        };

        match step {
            Step::Diagonal => {
                aligned_reference.push(reference[i - 1]);
                aligned_target.push(target[j - 1]);
                i -= 1;
                j -= 1;
            }
            Step::GapInTarget => {
                aligned_reference.push(reference[i - 1]);
                aligned_target.push(GAP);
                i -= 1;
            }
            Step::GapInReference => {
                aligned_reference.push(GAP);
                aligned_target.push(target[j - 1]);
                j -= 1;
            }
        }
    }

    aligned_reference.reverse();
    aligned_target.reverse();

    Ok(GlobalAlignment {
        reference: aligned_reference,
        target: aligned_target,
        score: scores[n * width + m],
    })
}
