//! Uniform random downsampling.
//!
//! Large uploads are sampled once, before the first validation step,
//! purely to bound pipeline latency.

use clif_model::{QcError, Result};
use polars::prelude::{BooleanChunked, DataFrame, NewChunkedArray};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Keeps roughly `fraction` of the rows, chosen uniformly at random.
///
/// The seed makes a session's sample reproducible. Fractions at or above
/// 1.0 return the frame unchanged.
pub fn downsample(data: &DataFrame, fraction: f64, seed: u64) -> Result<DataFrame> {
    if fraction >= 1.0 {
        return Ok(data.clone());
    }
    let fraction = fraction.max(0.0);
    let mut rng = StdRng::seed_from_u64(seed);
    let keep: Vec<bool> = (0..data.height())
        .map(|_| rng.random::<f64>() < fraction)
        .collect();
    let mask = BooleanChunked::from_slice("sample".into(), &keep);
    let sampled = data.filter(&mask).map_err(QcError::dataframe)?;
    debug!(
        rows = data.height(),
        sampled = sampled.height(),
        fraction,
        "downsampled frame"
    );
    Ok(sampled)
}
