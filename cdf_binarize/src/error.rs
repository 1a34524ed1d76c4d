// cdf_binarize/src/error.rs

use thiserror::Error;

/// Error type for batch construction, validation and binarization.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CdfError {
    /// The CDF table and the length list have different cardinalities.
    #[error("Shape mismatch: {cdfs} CDFs but {lengths} lengths")]
    ShapeMismatch { cdfs: usize, lengths: usize },

    /// An index needed by the conversion lies outside the data it addresses.
    #[error("Index out of range: {what} index {index} for CDF {item} (available {available})")]
    IndexOutOfRange {
        what: &'static str,
        item: usize,
        index: usize,
        available: usize,
    },

    /// A CDF shorter than two entries cannot hold a zero step and an escape slot.
    #[error("CDF {item} has length {length}, at least 2 is required")]
    LengthTooShort { item: usize, length: usize },

    /// `offset + 1` must address an entry before the escape slot.
    #[error("CDF {item}: offset {offset} requires offset + 1 < length ({length})")]
    OffsetOutOfRange {
        item: usize,
        offset: usize,
        length: usize,
    },

    /// A CDF entry lies outside [0, 1].
    #[error("CDF {item}: entry {position} = {value} is not a probability")]
    ValueOutOfRange {
        item: usize,
        position: usize,
        value: f64,
    },

    /// A cumulative entry decreases.
    #[error("CDF {item}: entry {position} = {value} is below the previous entry {previous}")]
    NonMonotonic {
        item: usize,
        position: usize,
        value: f64,
        previous: f64,
    },

    /// `cdf[offset]` exceeds one half, so the distribution cannot be symmetric around zero.
    #[error("CDF {item}: P(X<0) = {value} exceeds 0.5 at offset {offset}")]
    AsymmetricOffset { item: usize, offset: usize, value: f64 },

    /// A binarization needs at least a zero probability and an escape probability.
    #[error("Probability list has {count} entries, at least 2 are required")]
    InvalidProbabilityCount { count: usize },

    /// The bin list ended before the symbol was complete.
    #[error("Bin list ended after {consumed} bins")]
    TruncatedBins { consumed: usize },

    /// A context bin was found where a bypass bin was expected, or the reverse.
    #[error("Bin {position}: expected a {expected} bin")]
    UnexpectedBinKind {
        position: usize,
        expected: &'static str,
    },

    /// The Exp-Golomb escape value does not fit the symbol range.
    #[error("Escape code at bin {position} exceeds the symbol range")]
    EscapeOverflow { position: usize },
}
