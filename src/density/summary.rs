//! Summary statistics of a sampled density curve.
//!
//! Everything is computed by trapezoid integration over the sample points and
//! then normalized by the curve's own mass.

use serde::Serialize;

use super::sampler::DensityPoint;

/// Mass, moments and quantiles of a curve.
#[derive(Clone, Copy, PartialEq, Debug, Serialize)]
pub struct CurveSummary {
    /// Trapezoid integral of the curve (≈1 for a non-degenerate curve, 0 otherwise).
    pub mass: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub p5: f64,
    pub p50: f64,
    pub p95: f64,
}

/// Summarize a curve. Returns `None` for an empty curve.
///
/// A zero-mass curve (degenerate interval) collapses every statistic onto the
/// first sample position with zero spread.
pub fn summarize_curve(points: &[DensityPoint]) -> Option<CurveSummary> {
    let first = points.first()?;

    // Cumulative trapezoid mass at each point.
    let mut cumulative = Vec::with_capacity(points.len());
    let mut mass = 0.0;
    let mut first_moment = 0.0;
    let mut second_moment = 0.0;
    cumulative.push(0.0);
    for w in points.windows(2) {
        let dx = w[1].x - w[0].x;
        mass += 0.5 * (w[0].y + w[1].y) * dx;
        first_moment += 0.5 * (w[0].x * w[0].y + w[1].x * w[1].y) * dx;
        second_moment += 0.5 * (w[0].x * w[0].x * w[0].y + w[1].x * w[1].x * w[1].y) * dx;
        cumulative.push(mass);
    }

    if mass <= 0.0 || !mass.is_finite() {
        return Some(CurveSummary {
            mass: 0.0,
            mean: first.x,
            std_dev: 0.0,
            p5: first.x,
            p50: first.x,
            p95: first.x,
        });
    }

    let mean = first_moment / mass;
    let variance = (second_moment / mass - mean * mean).max(0.0);
    let quantile = |q: f64| quantile_at(points, &cumulative, q * mass);

    Some(CurveSummary {
        mass,
        mean,
        std_dev: variance.sqrt(),
        p5: quantile(0.05),
        p50: quantile(0.50),
        p95: quantile(0.95),
    })
}

/// Position where the cumulative mass first reaches `target`, interpolated
/// linearly inside the crossing segment.
fn quantile_at(points: &[DensityPoint], cumulative: &[f64], target: f64) -> f64 {
    let idx = cumulative.partition_point(|&c| c < target);
    if idx == 0 {
        return points[0].x;
    }
    if idx >= points.len() {
        return points[points.len() - 1].x;
    }
    let (c0, c1) = (cumulative[idx - 1], cumulative[idx]);
    let (x0, x1) = (points[idx - 1].x, points[idx].x);
    if c1 <= c0 {
        return x1;
    }
    x0 + (target - c0) / (c1 - c0) * (x1 - x0)
}
