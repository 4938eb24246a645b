//! Errors raised while building a fold compound

use thiserror::Error;

pub type FoldResult<T> = Result<T, FoldError>;

/// Invalid input or a sequence too long to index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FoldError {
    /// A sequence (or every sequence of an alignment) was empty.
    #[error("sequence length must be greater than 0")]
    EmptySequence,
    /// Alignment rows or reference structures disagree in length.
    #[error("{what} has length {found}, expected {expected}")]
    LengthMismatch {
        what: String,
        expected: usize,
        found: usize,
    },
    /// A structure or constraint string closes a bracket that was never opened,
    /// or leaves one open.
    #[error("unbalanced brackets in {0}")]
    UnbalancedBrackets(String),
    /// A structure string contains something other than `(`, `)` and `.`.
    #[error("unknown symbol '{symbol}' at position {position} of structure")]
    UnknownStructureSymbol { symbol: char, position: usize },
    /// n² would not fit into the signed integer range used for indexing.
    #[error("sequence length {length} exceeds addressable range (max {max})")]
    SequenceTooLong { length: usize, max: usize },
    /// A recurrence tried to write a distance class outside the stored window.
    #[error("distance class ({k}, {l}) lies outside the stored window")]
    OutsideWindow { k: usize, l: usize },
}

impl FoldError {
    pub(crate) fn length_mismatch(what: impl Into<String>, expected: usize, found: usize) -> Self {
        Self::LengthMismatch {
            what: what.into(),
            expected,
            found,
        }
    }

    /// Bad input: empty sequences, ragged alignments, malformed structures.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptySequence
                | Self::LengthMismatch { .. }
                | Self::UnbalancedBrackets(_)
                | Self::UnknownStructureSymbol { .. }
        )
    }

    /// The sequence is too long for triangular index arithmetic.
    pub fn is_size_limit(&self) -> bool {
        matches!(self, Self::SequenceTooLong { .. })
    }
}
