//! Shape-parameter mapping: (normalized mode, confidence) → (α, β).
//!
//! κ = 4 + (c/100)·K, α = m·(κ−2) + 1, β = (1−m)·(κ−2) + 1.
//! Since κ ≥ 4, both parameters are strictly greater than 1 and the density is
//! unimodal with its peak at `m`.

use crate::constants::{
    CONCENTRATION_FLOOR, CONCENTRATION_K, CONFIDENCE_MAX, CONFIDENCE_MIN, MODE_EPSILON,
};
use crate::types::BetaParams;

/// Concentration κ for a confidence in [1, 100]. Out-of-range input is clamped.
pub fn concentration(confidence: f64) -> f64 {
    let c = if confidence.is_nan() {
        CONFIDENCE_MIN
    } else {
        confidence.clamp(CONFIDENCE_MIN, CONFIDENCE_MAX)
    };
    CONCENTRATION_FLOOR + (c / 100.0) * CONCENTRATION_K
}

/// Map a normalized mode and a confidence to shape parameters.
///
/// Never fails: `mode` is clamped into [0.01, 0.99] (NaN maps to 0.5) and
/// `confidence` into [1, 100].
pub fn map_to_shape_parameters(mode: f64, confidence: f64) -> BetaParams {
    let m = if mode.is_nan() {
        0.5
    } else {
        mode.clamp(MODE_EPSILON, 1.0 - MODE_EPSILON)
    };
    let kappa = concentration(confidence);
    BetaParams {
        alpha: m * (kappa - 2.0) + 1.0,
        beta: (1.0 - m) * (kappa - 2.0) + 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_exceed_one() {
        for &m in &[-1.0, 0.0, 0.01, 0.3, 0.5, 0.99, 1.0, 2.0] {
            for &c in &[-5.0, 1.0, 50.0, 100.0, 500.0] {
                let p = map_to_shape_parameters(m, c);
                assert!(p.alpha > 1.0 && p.beta > 1.0, "m={m} c={c} -> {p:?}");
            }
        }
    }

    #[test]
    fn test_peak_at_mode() {
        let p = map_to_shape_parameters(0.3, 70.0);
        assert!((p.mode() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_concentration_range() {
        assert!((concentration(100.0) - 24.0).abs() < 1e-12);
        assert!((concentration(1.0) - 4.2).abs() < 1e-12);
        assert!((concentration(1000.0) - 24.0).abs() < 1e-12);
    }

    #[test]
    fn test_symmetric_at_half() {
        let p = map_to_shape_parameters(0.5, 40.0);
        assert!((p.alpha - p.beta).abs() < 1e-12);
    }

    #[test]
    fn test_nan_inputs_stay_valid() {
        let p = map_to_shape_parameters(f64::NAN, f64::NAN);
        assert!(p.alpha.is_finite() && p.beta.is_finite());
        assert!((p.alpha - p.beta).abs() < 1e-12);
    }
}
