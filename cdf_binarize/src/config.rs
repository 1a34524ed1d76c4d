// cdf_binarize/src/config.rs

/// Slack allowed by the strict numeric checks.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// How much checking a batch receives before conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Shape and index checks only. Numerically inconsistent CDFs convert to degenerate sequences.
    #[default]
    Structural,
    /// Additionally rejects entries outside [0, 1], decreasing entries and `cdf[offset] > 0.5`.
    Strict,
}

/// Options for [`convert_batch`](crate::convert::convert_batch).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionConfig {
    pub validation: ValidationMode,
    pub tolerance: f64,
    /// Convert CDFs on the rayon thread pool. Output order is unaffected.
    pub parallel: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        ConversionConfig {
            validation: ValidationMode::Structural,
            tolerance: DEFAULT_TOLERANCE,
            parallel: false,
        }
    }
}

impl ConversionConfig {
    pub fn with_validation(mut self, validation: ValidationMode) -> Self {
        self.validation = validation;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
