// cdf_binarize_demo/src/main.rs

use cdf_binarize::{
    binarize_symbol, convert_batch, quantize_sequence, Bin, CdfBatch, ConversionConfig,
    ValidationMode,
};
use ndarray::array;
use tracing_subscriber::EnvFilter;

/// Helper function to print bins as `c0`/`c1` (context) and `b0`/`b1` (bypass).
///
/// # Arguments
///
/// * `bins` - Bins to print.
fn print_bins(bins: &[Bin]) {
    for bin in bins {
        match bin {
            Bin::Context { value, .. } => print!("c{} ", *value as u8),
            Bin::Bypass(value) => print!("b{} ", *value as u8),
        }
    }
    println!();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Two symmetric-ish CDFs with an escape mass in the last slot. The second row is one cell
    // shorter and padded.
    let table = array![
        [0.05, 0.2, 0.4, 0.6, 0.8, 0.95, 0.05],
        [0.1, 0.3, 0.5, 0.7, 0.9, 0.1, 0.0],
    ];
    let lengths = vec![7, 6];
    let offset = 2; // Index of P(X<0)

    let batch = CdfBatch::from_table(table.view(), lengths, offset)?;
    let config = ConversionConfig::default().with_validation(ValidationMode::Strict);
    let converted = convert_batch(&batch, &config)?;

    println!("Converted binary probabilities:");
    for (idx, probs) in converted.iter().enumerate() {
        println!("List {}: {:?}", idx, probs.probabilities);
        println!("  fixed point: {:?}", quantize_sequence(probs));
        if probs.is_degenerate() {
            println!("  (degenerate: mass exhausted or escape clamped)");
        }
    }

    println!("Bins against list 0:");
    for value in [0, -1, 2, 5, -9] {
        print!("{:>4}: ", value);
        print_bins(&binarize_symbol(value, &converted[0])?);
    }

    Ok(())
}
