//! Density sampling over an arbitrary `[min, max]` interval.
//!
//! For each of `n` evenly spaced positions t ∈ [0, 1]:
//!
//! ```text
//! ln f(t) = (α−1)·ln t + (β−1)·ln(1−t) − ln B(α, β)
//! y       = exp(ln f(t)) / (max − min)
//! x       = min + t·(max − min)
//! ```
//!
//! `t` is clamped into [1e-6, 1−1e-6] only for the logarithms; the reported `x`
//! still spans the full interval. Dividing by the span makes the curve integrate
//! to ≈1 over the original interval.

use serde::{Deserialize, Serialize};

use crate::constants::{DENSITY_SAMPLE_COUNT, X_EPSILON};
use crate::shape::map_to_shape_parameters;
use crate::types::Distribution;

use super::log_gamma::ln_beta;

/// One sample of a density curve.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct DensityPoint {
    pub x: f64,
    pub y: f64,
}

/// Sample the density for `(min, max, mode, confidence)` at `n` points, ascending in `x`.
///
/// A zero-width or inverted interval (`min ≥ max`, a non-finite bound, or a
/// span that overflows) yields `n` points at `min` with density 0. Any individual non-finite or negative
/// sample is replaced by 0.
pub fn sample_density(min: f64, max: f64, mode: f64, confidence: f64, n: usize) -> Vec<DensityPoint> {
    let span = max - min;
    if !(min.is_finite() && span.is_finite()) || min >= max {
        let x = if min.is_finite() { min } else { 0.0 };
        return vec![DensityPoint { x, y: 0.0 }; n];
    }

    let params = map_to_shape_parameters((mode - min) / span, confidence);
    let ln_norm = ln_beta(params.alpha, params.beta);

    (0..n)
        .map(|i| {
            let t = if n == 1 {
                0.5
            } else {
                i as f64 / (n - 1) as f64
            };
            let tc = t.clamp(X_EPSILON, 1.0 - X_EPSILON);
            let log_density =
                (params.alpha - 1.0) * tc.ln() + (params.beta - 1.0) * (1.0 - tc).ln() - ln_norm;
            let y = log_density.exp() / span;
            DensityPoint {
                x: min + t * span,
                y: if y.is_finite() && y >= 0.0 { y } else { 0.0 },
            }
        })
        .collect()
}

/// Sample a concrete distribution at the default resolution.
pub fn sample_distribution(dist: &Distribution) -> Vec<DensityPoint> {
    sample_density(
        dist.min,
        dist.max,
        dist.mode,
        dist.confidence,
        DENSITY_SAMPLE_COUNT,
    )
}
