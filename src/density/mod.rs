//! Density curves for the bounded elicitation distribution.
//!
//! A curve is a fixed number of `(x, y)` points over `[min, max]` whose
//! trapezoid integral is ≈1. All arithmetic runs in log space so that large
//! shape parameters never overflow the gamma function.
//!
//! - [`log_gamma`]: Lanczos log-gamma and log-beta
//! - [`sampler`]: `(min, max, mode, confidence)` → curve
//! - [`summary`]: mass, moments and quantiles of a sampled curve

pub mod log_gamma;
pub mod sampler;
pub mod summary;

pub use sampler::{sample_density, sample_distribution, DensityPoint};
pub use summary::{summarize_curve, CurveSummary};
