// cdf_binarize/src/binarization.rs

//! Binarization of integer symbols against a conditional probability chain.
//!
//! A symbol `v` is laid out as a truncated unary code over `|v|`, one context-coded decision per
//! explicit probability ("stop here" is `true`), with the sign sent as a bypass bin right after the
//! zero decision. Magnitudes past the last explicit probability take the escape path, an order-0
//! Exp-Golomb code of the remainder in bypass bins. Turning the bins into bits is left to the
//! binary coder.

use crate::convert::BinaryProbabilities;
use crate::error::CdfError;
use crate::probability::{clamp_fixed, quantize_sequence};

/// One binary decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bin {
    /// Decision coded with `probability` (scaled by FIXED_SCALE) of being `true`.
    Context { value: bool, probability: u32 },
    /// Equiprobable decision.
    Bypass(bool),
}

impl Bin {
    pub fn value(&self) -> bool {
        match *self {
            Bin::Context { value, .. } => value,
            Bin::Bypass(value) => value,
        }
    }
}

/// Lays out `value` as bins using the fixed-point probabilities `probs`.
///
/// The last entry of `probs` is the escape probability and is never coded; reaching it implies
/// escape.
///
/// # Errors
///
/// Returns `InvalidProbabilityCount` if `probs` has fewer than two entries.
///
/// # Examples
///
/// ```
/// use cdf_binarize::{binarize, Bin};
///
/// let bins = binarize(0, &[13107, 32768, 32768]).unwrap();
/// assert_eq!(bins, vec![Bin::Context { value: true, probability: 13107 }]);
/// ```
pub fn binarize(value: i32, probs: &[u32]) -> Result<Vec<Bin>, CdfError> {
    if probs.len() < 2 {
        return Err(CdfError::InvalidProbabilityCount { count: probs.len() });
    }

    let magnitude = value.unsigned_abs() as u64;
    let explicit_limit = probs.len() - 1;
    let mut bins = Vec::with_capacity(explicit_limit + 2);

    for (k, &prob) in probs[..explicit_limit].iter().enumerate() {
        let probability = clamp_fixed(prob);
        if magnitude == k as u64 {
            bins.push(Bin::Context {
                value: true,
                probability,
            });
            return Ok(bins);
        }

        bins.push(Bin::Context {
            value: false,
            probability,
        });
        if k == 0 {
            bins.push(Bin::Bypass(value < 0));
        }
    }

    push_exp_golomb(&mut bins, magnitude - explicit_limit as u64);
    Ok(bins)
}

/// Quantizes `probs` and binarizes `value` against the result.
pub fn binarize_symbol(value: i32, probs: &BinaryProbabilities) -> Result<Vec<Bin>, CdfError> {
    binarize(value, &quantize_sequence(probs))
}

/// Order-0 Exp-Golomb: `floor(log2(rem + 1))` zeros, then `rem + 1` MSB first.
fn push_exp_golomb(bins: &mut Vec<Bin>, remainder: u64) {
    let coded = remainder + 1;
    let log2 = 63 - coded.leading_zeros();

    bins.extend((0..log2).map(|_| Bin::Bypass(false)));
    bins.extend((0..=log2).rev().map(|bit| Bin::Bypass((coded >> bit) & 1 == 1)));
}

/// Sequential reader that checks each bin has the kind the layout expects.
struct BinReader<I> {
    bins: I,
    consumed: usize,
}

impl<I: Iterator<Item = Bin>> BinReader<I> {
    fn next_bin(&mut self) -> Result<Bin, CdfError> {
        let bin = self.bins.next().ok_or(CdfError::TruncatedBins {
            consumed: self.consumed,
        })?;
        self.consumed += 1;
        Ok(bin)
    }

    fn context(&mut self) -> Result<bool, CdfError> {
        match self.next_bin()? {
            Bin::Context { value, .. } => Ok(value),
            Bin::Bypass(_) => Err(CdfError::UnexpectedBinKind {
                position: self.consumed - 1,
                expected: "context",
            }),
        }
    }

    fn bypass(&mut self) -> Result<bool, CdfError> {
        match self.next_bin()? {
            Bin::Bypass(value) => Ok(value),
            Bin::Context { .. } => Err(CdfError::UnexpectedBinKind {
                position: self.consumed - 1,
                expected: "bypass",
            }),
        }
    }
}

/// Reads a symbol back from bins laid out by [`binarize`] with `prob_count` probabilities.
///
/// # Errors
///
/// * `InvalidProbabilityCount` if `prob_count < 2`.
/// * `TruncatedBins` if the bins end before the symbol does.
/// * `UnexpectedBinKind` if a context and a bypass bin are swapped.
/// * `EscapeOverflow` if the escape code does not fit an `i32`.
pub fn debinarize(
    bins: impl IntoIterator<Item = Bin>,
    prob_count: usize,
) -> Result<i32, CdfError> {
    if prob_count < 2 {
        return Err(CdfError::InvalidProbabilityCount { count: prob_count });
    }

    let mut reader = BinReader {
        bins: bins.into_iter(),
        consumed: 0,
    };
    let explicit_limit = prob_count - 1;
    let mut negative = false;

    for k in 0..explicit_limit {
        if reader.context()? {
            return signed(k as u64, negative, reader.consumed);
        }
        if k == 0 {
            negative = reader.bypass()?;
        }
    }

    let mut log2 = 0u32;
    while !reader.bypass()? {
        log2 += 1;
        if log2 > 32 {
            return Err(CdfError::EscapeOverflow {
                position: reader.consumed,
            });
        }
    }

    let mut coded = 1u64;
    for _ in 0..log2 {
        coded = (coded << 1) | reader.bypass()? as u64;
    }

    let magnitude = (explicit_limit as u64).saturating_add(coded - 1);
    signed(magnitude, negative, reader.consumed)
}

fn signed(magnitude: u64, negative: bool, position: usize) -> Result<i32, CdfError> {
    let value = if negative {
        -(magnitude as i128)
    } else {
        magnitude as i128
    };
    i32::try_from(value).map_err(|_| CdfError::EscapeOverflow { position })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    use crate::convert::convert_cdf;
    use crate::probability::FIXED_SCALE;

    const PROBS: [u32; 3] = [13107, 32768, 32768];

    fn context(value: bool, probability: u32) -> Bin {
        Bin::Context { value, probability }
    }

    #[test]
    fn test_zero_is_one_bin() {
        assert_eq!(binarize(0, &PROBS).unwrap(), vec![context(true, 13107)]);
    }

    #[test]
    fn test_sign_follows_zero_decision() {
        assert_eq!(
            binarize(-1, &PROBS).unwrap(),
            vec![
                context(false, 13107),
                Bin::Bypass(true),
                context(true, 32768)
            ]
        );
        assert_eq!(
            binarize(1, &PROBS).unwrap(),
            vec![
                context(false, 13107),
                Bin::Bypass(false),
                context(true, 32768)
            ]
        );
    }

    #[test]
    fn test_escape_at_limit_codes_zero_remainder() {
        // |2| reaches the escape slot with remainder 0, coded as a single '1'.
        assert_eq!(
            binarize(2, &PROBS).unwrap(),
            vec![
                context(false, 13107),
                Bin::Bypass(false),
                context(false, 32768),
                Bin::Bypass(true)
            ]
        );
    }

    #[test]
    fn test_escape_exp_golomb_suffix() {
        // Remainder 1 -> coded 2 = '10' behind one prefix zero.
        assert_eq!(
            binarize(-3, &PROBS).unwrap(),
            vec![
                context(false, 13107),
                Bin::Bypass(true),
                context(false, 32768),
                Bin::Bypass(false),
                Bin::Bypass(true),
                Bin::Bypass(false)
            ]
        );
        // Remainder 5 -> coded 6 = '110' behind two prefix zeros.
        let bins = binarize(7, &PROBS).unwrap();
        let escape: Vec<bool> = bins[3..].iter().map(Bin::value).collect();
        assert_eq!(escape, vec![false, false, true, true, false]);
    }

    #[test]
    fn test_probabilities_are_clamped() {
        let bins = binarize(1, &[0, FIXED_SCALE, 7]).unwrap();
        assert_eq!(bins[0], context(false, 1));
        assert_eq!(bins[2], context(true, FIXED_SCALE - 1));
    }

    #[test]
    fn test_rejects_short_probability_list() {
        assert_eq!(
            binarize(0, &[100]),
            Err(CdfError::InvalidProbabilityCount { count: 1 })
        );
        assert_eq!(
            debinarize(Vec::<Bin>::new(), 1),
            Err(CdfError::InvalidProbabilityCount { count: 1 })
        );
    }

    #[test]
    fn test_debinarize_truncated() {
        let mut bins = binarize(-3, &PROBS).unwrap();
        bins.pop();
        assert_eq!(
            debinarize(bins, PROBS.len()),
            Err(CdfError::TruncatedBins { consumed: 5 })
        );
    }

    #[test]
    fn test_debinarize_wrong_kind() {
        let bins = vec![Bin::Bypass(false)];
        assert_eq!(
            debinarize(bins, 3),
            Err(CdfError::UnexpectedBinKind {
                position: 0,
                expected: "context"
            })
        );
    }

    #[test]
    fn test_debinarize_escape_overflow() {
        let mut bins = vec![context(false, 1), Bin::Bypass(false)];
        bins.extend(std::iter::repeat(Bin::Bypass(false)).take(40));
        assert!(matches!(
            debinarize(bins, 2),
            Err(CdfError::EscapeOverflow { .. })
        ));
    }

    #[test]
    fn test_extreme_values() {
        for value in [i32::MIN, i32::MAX, i32::MIN + 1] {
            let bins = binarize(value, &PROBS).unwrap();
            assert_eq!(debinarize(bins, PROBS.len()).unwrap(), value);
        }
    }

    #[test]
    fn test_binarize_symbol_uses_quantized_chain() {
        let probs = convert_cdf(&[0.05, 0.2, 0.4, 0.6, 0.8, 0.95, 0.05], 7, 2);
        let bins = binarize_symbol(-1, &probs).unwrap();
        assert_eq!(
            bins,
            vec![
                context(false, 13107),
                Bin::Bypass(true),
                context(true, 32768)
            ]
        );
    }

    proptest! {
        #[test]
        fn test_debinarize_recovers_value(
            value in any::<i32>(),
            probs in proptest::collection::vec(0u32..=FIXED_SCALE, 2usize..20)
        ) {
            let bins = binarize(value, &probs).unwrap();
            let context_bins = bins.iter().filter(|b| matches!(b, Bin::Context { .. })).count();
            prop_assert!(context_bins <= probs.len() - 1);
            prop_assert_eq!(debinarize(bins, probs.len()).unwrap(), value);
        }
    }
}
