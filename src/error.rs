//! Error taxonomy for rejected diagrams.
//!
//! Both error kinds describe an invalid input diagram, never a transient
//! condition: the caller rejects that knot and moves on.

use thiserror::Error;

/// Result type for width computations.
pub type Result<T> = std::result::Result<T, WidthError>;

/// A Gauss code that is structurally invalid.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MalformedCodeError {
    /// No crossing visits were found.
    #[error("Gauss code is empty")]
    Empty,

    /// A token could not be read as a signed or `O`/`U`-tagged label.
    #[error("invalid token {token:?} at visit {position}")]
    InvalidToken {
        /// Index of the visit the token would have produced.
        position: usize,
        /// The offending text.
        token: String,
    },

    /// Crossing labels start at 1.
    #[error("crossing label 0 at visit {position}")]
    ZeroLabel {
        /// Index of the visit.
        position: usize,
    },

    /// A label did not occur exactly twice.
    #[error("crossing {label} occurs {count} times (expected 2)")]
    LabelMultiplicity {
        /// The crossing label.
        label: u32,
        /// Number of occurrences.
        count: usize,
    },

    /// Both visits of a crossing carry the same over/under tag.
    #[error("crossing {label} needs one over and one under visit")]
    AmbiguousPass {
        /// The crossing label.
        label: u32,
    },

    /// Tagged visits of a crossing disagree on its handedness.
    #[error("crossing {label} has conflicting handedness marks")]
    HandednessMismatch {
        /// The crossing label.
        label: u32,
    },

    /// Fewer crossings than any nontrivial knot diagram has.
    #[error("diagram has {found} crossings; at least {minimum} are required")]
    TooFewCrossings {
        /// Distinct crossings in the code.
        found: usize,
        /// Minimum accepted.
        minimum: usize,
    },
}

/// Crossing records that do not describe a diagram.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InconsistentDictionaryError {
    /// The under-pass enters and leaves the crossing on the same strand.
    #[error("crossing {label} has an under-pass that does not separate two strands")]
    DegenerateCrossing {
        /// The crossing label.
        label: u32,
    },

    /// A crossing references a strand outside the diagram.
    #[error("crossing {label} references strand {strand} of {strand_count}")]
    StrandOutOfRange {
        /// The crossing label.
        label: u32,
        /// The out-of-range strand index.
        strand: usize,
        /// Number of strands in the diagram.
        strand_count: usize,
    },

    /// Two crossing records share a label.
    #[error("crossing {label} is defined twice")]
    DuplicateLabel {
        /// The crossing label.
        label: u32,
    },
}

/// Any reason a knot is rejected before the seed search runs.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum WidthError {
    /// The Gauss code failed to parse.
    #[error("malformed Gauss code: {0}")]
    MalformedCode(#[from] MalformedCodeError),

    /// The parsed code is not a consistent diagram traversal.
    #[error("inconsistent knot dictionary: {0}")]
    InconsistentDictionary(#[from] InconsistentDictionaryError),

    /// The knot-list row holding the code is malformed.
    #[error("invalid knot-list row: {0}")]
    InvalidEntry(#[from] KnotEntryError),
}

/// A knot list that could not be read.
#[derive(Debug, Error)]
pub enum KnotListError {
    /// The list could not be read from disk.
    #[error("cannot read knot list: {0}")]
    Io(#[from] std::io::Error),
}

/// A single knot-list row that cannot be decided. The rest of the list is unaffected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum KnotEntryError {
    /// An expected-width field was neither 28 nor 32.
    #[error("line {line}: expected width {value:?} is not 28 or 32")]
    InvalidWidth {
        /// 1-based line number.
        line: usize,
        /// The offending field.
        value: String,
    },

    /// A line had more than three `|`-separated fields.
    #[error("line {line}: expected `name | code` or `name | width | code`")]
    TooManyFields {
        /// 1-based line number.
        line: usize,
    },
}
