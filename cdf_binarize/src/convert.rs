// cdf_binarize/src/convert.rs

use contracts::{debug_ensures, requires};
use rayon::prelude::*;

use crate::batch::CdfBatch;
use crate::config::{ConversionConfig, ValidationMode};
use crate::error::CdfError;
use crate::offset::CdfOffset;

/// Conditional binary probabilities derived from one CDF.
///
/// `probabilities` holds `P(X = 0)`, then `P(|X| = k | |X| >= k)` for `k = 1, 2, ...`, then the
/// escape probability given that no earlier decision matched.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryProbabilities {
    pub probabilities: Vec<f64>,
    /// The remaining mass reached zero (or below) before the escape step. Every later magnitude
    /// probability is then `0.0` and the escape probability is `1.0`.
    pub exhausted: bool,
    /// The escape ratio exceeded 1.0, or was NaN, and was replaced by 1.0.
    pub escape_clamped: bool,
}

impl BinaryProbabilities {
    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    /// True when the sequence came out of a fallback branch rather than a consistent CDF.
    pub fn is_degenerate(&self) -> bool {
        self.exhausted || self.escape_clamped
    }

    /// # Panics
    ///
    /// The accessors below assume the two-entry minimum every converted sequence has and panic on
    /// a shorter, hand-built `probabilities`.
    pub fn zero_probability(&self) -> f64 {
        self.probabilities[0]
    }

    pub fn magnitude_probabilities(&self) -> &[f64] {
        &self.probabilities[1..self.probabilities.len() - 1]
    }

    pub fn escape_probability(&self) -> f64 {
        self.probabilities[self.probabilities.len() - 1]
    }
}

/// Number of `k >= 1` satisfying `offset + k + 1 < length - 1`.
pub fn magnitude_steps(length: usize, offset: usize) -> usize {
    length.saturating_sub(offset).saturating_sub(3)
}

/// Tracks the probability mass not yet claimed by an earlier decision.
struct RemainingMass {
    mass: f64,
    exhausted: bool,
}

impl RemainingMass {
    fn new() -> Self {
        RemainingMass {
            mass: 1.0,
            exhausted: false,
        }
    }

    /// Conditional probability of `claimed` given everything earlier was ruled out.
    fn claim(&mut self, claimed: f64) -> f64 {
        if self.mass > 0.0 {
            let probability = claimed / self.mass;
            self.mass -= claimed;
            probability
        } else {
            self.exhausted = true;
            0.0
        }
    }
}

/// Converts a single CDF into its chain of conditional binary probabilities.
///
/// `cdf[offset]` is `P(X < 0)` and `cdf[length - 1]` is the escape mass. The CDF is assumed
/// symmetric around zero, so the mass of `|X| = k` is twice the one-sided mass of `X = k`.
/// Inconsistent CDFs never fail: once the remaining mass is used up, magnitude probabilities
/// fall back to `0.0` and the escape probability to `1.0`.
///
/// # Panics
///
/// Panics unless `2 <= length <= cdf.len()` and `offset + 1 < length`.
/// [`CdfBatch`] checks these before conversion.
///
/// # Examples
///
/// ```
/// use cdf_binarize::convert_cdf;
///
/// let probs = convert_cdf(&[0.1, 0.3, 0.5, 0.7, 0.9, 0.1], 6, 2);
/// assert_eq!(probs.len(), 3);
/// assert!((probs.escape_probability() - 0.25).abs() < 1e-12);
/// ```
#[requires(length >= 2, "a CDF needs a zero step and an escape slot")]
#[requires(length <= cdf.len(), "length must not exceed the CDF")]
#[requires(offset < length.saturating_sub(1), "offset + 1 must precede the escape slot")]
#[debug_ensures(ret.probabilities.len() == magnitude_steps(length, offset) + 2)]
pub fn convert_cdf(cdf: &[f64], length: usize, offset: usize) -> BinaryProbabilities {
    let steps = magnitude_steps(length, offset);
    let mut probabilities = Vec::with_capacity(steps + 2);
    let mut remaining = RemainingMass::new();

    let p_zero = cdf[offset + 1] - cdf[offset];
    probabilities.push(remaining.claim(p_zero));

    for k in 1..=steps {
        let p_one_side = cdf[offset + k + 1] - cdf[offset + k];
        probabilities.push(remaining.claim(2.0 * p_one_side));
    }

    // The escape slot stores the tail mass directly.
    let p_escape = cdf[length - 1];
    let mut escape_clamped = false;
    let escape = if remaining.mass > 0.0 {
        let ratio = p_escape / remaining.mass;
        escape_clamped = ratio.is_nan() || ratio > 1.0;
        ratio.min(1.0)
    } else {
        remaining.exhausted = true;
        1.0
    };
    probabilities.push(escape);

    tracing::trace!(
        length,
        offset,
        steps,
        remaining = remaining.mass,
        "converted CDF"
    );

    BinaryProbabilities {
        probabilities,
        exhausted: remaining.exhausted,
        escape_clamped,
    }
}

/// Converts every CDF of a batch, preserving input order.
///
/// With [`ValidationMode::Strict`] the numeric preconditions are checked first; otherwise
/// inconsistent CDFs produce degenerate sequences and a warning.
///
/// # Examples
///
/// ```
/// use cdf_binarize::{convert_batch, CdfBatch, ConversionConfig};
///
/// let batch = CdfBatch::new(
///     vec![vec![0.05, 0.2, 0.4, 0.6, 0.8, 0.95, 0.05], vec![0.1, 0.3, 0.5, 0.7, 0.9, 0.1]],
///     vec![7, 6],
///     2,
/// )
/// .unwrap();
/// let converted = convert_batch(&batch, &ConversionConfig::default()).unwrap();
/// assert_eq!(converted[0].len(), 4);
/// assert_eq!(converted[1].len(), 3);
/// ```
pub fn convert_batch(
    batch: &CdfBatch,
    config: &ConversionConfig,
) -> Result<Vec<BinaryProbabilities>, CdfError> {
    if config.validation == ValidationMode::Strict {
        batch.validate_numeric(config.tolerance)?;
    }

    tracing::debug!(
        cdfs = batch.len(),
        validation = ?config.validation,
        parallel = config.parallel,
        "converting CDF batch"
    );

    let converted: Vec<BinaryProbabilities> = if config.parallel {
        let items: Vec<(&[f64], usize, usize)> = batch.iter().collect();
        items
            .par_iter()
            .map(|&(cdf, length, offset)| convert_cdf(cdf, length, offset))
            .collect()
    } else {
        batch
            .iter()
            .map(|(cdf, length, offset)| convert_cdf(cdf, length, offset))
            .collect()
    };

    for (item, probs) in converted.iter().enumerate() {
        if probs.exhausted {
            tracing::warn!(
                item,
                offset = batch.offset_at(item),
                "probability mass exhausted before the escape step"
            );
        } else if probs.escape_clamped {
            tracing::warn!(item, "escape probability clamped to 1.0");
        }
    }

    Ok(converted)
}

/// One-call conversion of a CDF table, its lengths and a shared or per-item offset.
///
/// # Examples
///
/// ```
/// use cdf_binarize::convert_cdf_to_binary_probs;
///
/// let probs = convert_cdf_to_binary_probs(
///     vec![vec![0.1, 0.3, 0.5, 0.7, 0.9, 0.1]],
///     vec![6],
///     vec![2],
/// )
/// .unwrap();
/// assert_eq!(probs[0].len(), 3);
/// ```
pub fn convert_cdf_to_binary_probs(
    cdfs: Vec<Vec<f64>>,
    lengths: Vec<usize>,
    offset: impl Into<CdfOffset>,
) -> Result<Vec<Vec<f64>>, CdfError> {
    let batch = CdfBatch::new(cdfs, lengths, offset)?;
    let converted = convert_batch(&batch, &ConversionConfig::default())?;
    Ok(converted
        .into_iter()
        .map(|probs| probs.probabilities)
        .collect())
}
