// cdf_binarize/src/lib.rs

//! CDF Binarization Library
//!
//! This library decomposes integer-valued symmetric distributions, given as CDF tables with an
//! escape slot, into chains of conditional binary probabilities for a binary entropy coder.

pub mod batch;
pub mod binarization;
pub mod config;
pub mod convert;
pub mod error;
pub mod offset;
pub mod probability;

pub use batch::CdfBatch;
pub use binarization::{binarize, binarize_symbol, debinarize, Bin};
pub use config::{ConversionConfig, ValidationMode, DEFAULT_TOLERANCE};
pub use convert::{
    convert_batch, convert_cdf, convert_cdf_to_binary_probs, magnitude_steps, BinaryProbabilities,
};
pub use error::CdfError;
pub use offset::CdfOffset;
pub use probability::{
    clamp_fixed, dequantize_probability, quantize_probability, quantize_sequence, FIXED_SCALE,
};
