//! Model constants and session-file column names.
//!
//! Maps the model's notation to concrete values:
//! - K = [`CONCENTRATION_K`] = 20 (confidence → concentration gain)
//! - κ = 4 + (c/100)·K, so κ ∈ [4.2, 24] over the confidence range
//! - N = [`DENSITY_SAMPLE_COUNT`] = 101 sample points per curve
//!
//! All values are process-wide and immutable. Nothing here is a runtime option.

use crate::types::{Defaults, Distribution};

/// Concentration gain: how peaked the curve becomes at confidence 100.
///
/// κ = 4 + (c/100)·K. Larger K gives narrower curves at high confidence.
pub const CONCENTRATION_K: f64 = 20.0;

/// Floor of the concentration κ. Keeps both shape parameters strictly above 1.
pub const CONCENTRATION_FLOOR: f64 = 4.0;

/// Default number of points in a sampled density curve.
pub const DENSITY_SAMPLE_COUNT: usize = 101;

/// Normalized mode is clamped into [MODE_EPSILON, 1 - MODE_EPSILON].
pub const MODE_EPSILON: f64 = 0.01;

/// Sample positions are clamped into [X_EPSILON, 1 - X_EPSILON] before `ln`.
pub const X_EPSILON: f64 = 1e-6;

/// Lower bound of min/mode/max (percent).
pub const VALUE_MIN: f64 = 0.0;

/// Upper bound of min/mode/max (percent).
pub const VALUE_MAX: f64 = 100.0;

/// Lower bound of confidence.
pub const CONFIDENCE_MIN: f64 = 1.0;

/// Upper bound of confidence.
pub const CONFIDENCE_MAX: f64 = 100.0;

/// Default distribution for the baseline arm (no intervention).
pub const DEFAULT_BASELINE: Distribution = Distribution {
    min: 0.0,
    max: 30.0,
    mode: 15.0,
    confidence: 100.0,
};

/// Default distribution for the treatment arm. Narrower and lower than the
/// baseline: with the intervention, less is lost.
pub const DEFAULT_TREATMENT: Distribution = Distribution {
    min: 0.0,
    max: 15.0,
    mode: 5.0,
    confidence: 100.0,
};

/// Both defaults, as consumed by the sparse model and the constraint enforcer.
pub const DEFAULTS: Defaults = Defaults {
    baseline: DEFAULT_BASELINE,
    treatment: DEFAULT_TREATMENT,
};

// ── Session file columns ──

pub const COL_SCENARIO_ID: &str = "scenario_id";
pub const COL_SCENARIO_GROUP: &str = "scenario_group";
pub const COL_COMMENT: &str = "comment";

pub const COL_BASELINE_MIN: &str = "baseline_min";
pub const COL_BASELINE_MAX: &str = "baseline_max";
pub const COL_BASELINE_MODE: &str = "baseline_mode";
pub const COL_BASELINE_CONFIDENCE: &str = "baseline_confidence";
pub const COL_TREATMENT_MIN: &str = "treatment_min";
pub const COL_TREATMENT_MAX: &str = "treatment_max";
pub const COL_TREATMENT_MODE: &str = "treatment_mode";
pub const COL_TREATMENT_CONFIDENCE: &str = "treatment_confidence";

/// The eight distribution columns, in file order.
pub const DISTRIBUTION_COLUMNS: [&str; 8] = [
    COL_BASELINE_MIN,
    COL_BASELINE_MAX,
    COL_BASELINE_MODE,
    COL_BASELINE_CONFIDENCE,
    COL_TREATMENT_MIN,
    COL_TREATMENT_MAX,
    COL_TREATMENT_MODE,
    COL_TREATMENT_CONFIDENCE,
];

/// Substring (case-insensitive) that marks the yield column.
pub const YIELD_MARKER: &str = "yield";

/// Bare scenario field names. Never attributes, though no file column carries them.
pub const RESERVED_FIELD_NAMES: [&str; 2] = ["id", "group"];

/// True if `key` names a column that can never be a scenario attribute.
pub fn is_reserved_column(key: &str) -> bool {
    key == COL_SCENARIO_ID
        || key == COL_SCENARIO_GROUP
        || key == COL_COMMENT
        || DISTRIBUTION_COLUMNS.contains(&key)
        || RESERVED_FIELD_NAMES.contains(&key)
}
