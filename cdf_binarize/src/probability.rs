// cdf_binarize/src/probability.rs

use contracts::ensures;

use crate::convert::BinaryProbabilities;

/// Fixed-point scaling factor.
/// Must be consistent with the binary coder consuming the probabilities.
pub const FIXED_SCALE: u32 = 1 << 16;

/// Clamps a fixed-point probability to `1 <= prob <= FIXED_SCALE - 1`.
///
/// Probabilities of exactly 0 or `FIXED_SCALE` would collapse a binary coder's interval.
pub fn clamp_fixed(prob: u32) -> u32 {
    prob.clamp(1, FIXED_SCALE - 1)
}

/// Converts a probability to fixed point, scaled by FIXED_SCALE.
///
/// # Arguments
///
/// * `probability` - Probability in [0, 1]. Values outside are clamped; NaN maps to the minimum.
///
/// # Returns
///
/// * `u32` - Rounded fixed-point probability in `[1, FIXED_SCALE - 1]`.
///
/// # Examples
///
/// ```
/// use cdf_binarize::{quantize_probability, FIXED_SCALE};
///
/// assert_eq!(quantize_probability(0.5), FIXED_SCALE / 2);
/// assert_eq!(quantize_probability(1.0), FIXED_SCALE - 1);
/// ```
#[ensures(ret >= 1 && ret < FIXED_SCALE)]
pub fn quantize_probability(probability: f64) -> u32 {
    let scaled = (probability * FIXED_SCALE as f64).round();
    if probability.is_nan() || scaled < 1.0 {
        1
    } else if scaled >= FIXED_SCALE as f64 {
        FIXED_SCALE - 1
    } else {
        scaled as u32
    }
}

/// Converts a fixed-point probability back to floating point.
pub fn dequantize_probability(prob_fixed: u32) -> f64 {
    prob_fixed as f64 / FIXED_SCALE as f64
}

/// Quantizes a whole conditional probability chain.
pub fn quantize_sequence(probs: &BinaryProbabilities) -> Vec<u32> {
    probs
        .probabilities
        .iter()
        .map(|&p| quantize_probability(p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    use crate::convert::convert_cdf;

    #[test]
    fn test_probability_clamping_low() {
        assert_eq!(quantize_probability(0.0), 1);
        assert_eq!(quantize_probability(-0.25), 1);
        // 0.000001 * 65536 rounds to 0.
        assert_eq!(quantize_probability(0.000001), 1);
    }

    #[test]
    fn test_probability_clamping_high() {
        assert_eq!(quantize_probability(1.0), FIXED_SCALE - 1); // 65535
        assert_eq!(quantize_probability(2.0), FIXED_SCALE - 1);
        assert_eq!(quantize_probability(f64::INFINITY), FIXED_SCALE - 1);
    }

    #[test]
    fn test_probability_normal() {
        // 0.75 * 65536 = 49152
        assert_eq!(quantize_probability(0.75), 49152);
        // 0.2 * 65536 = 13107.2, rounded down
        assert_eq!(quantize_probability(0.2), 13107);
    }

    #[test]
    fn test_probability_nan() {
        assert_eq!(quantize_probability(f64::NAN), 1);
    }

    #[test]
    fn test_clamp_fixed() {
        assert_eq!(clamp_fixed(0), 1);
        assert_eq!(clamp_fixed(FIXED_SCALE), FIXED_SCALE - 1);
        assert_eq!(clamp_fixed(1234), 1234);
    }

    #[test]
    fn test_quantize_mock_sequence() {
        let probs = convert_cdf(&[0.05, 0.2, 0.4, 0.6, 0.8, 0.95, 0.05], 7, 2);
        assert_eq!(quantize_sequence(&probs), vec![13107, 32768, 49152, 32768]);
    }

    proptest! {
        #[test]
        fn test_quantize_within_half_step(p in 0.0f64..=1.0) {
            let fixed = quantize_probability(p);
            prop_assert!(fixed >= 1 && fixed < FIXED_SCALE);
            let error = (dequantize_probability(fixed) - p).abs();
            prop_assert!(error <= 1.0 / FIXED_SCALE as f64);
        }
    }
}
