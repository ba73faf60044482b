//! Constraint enforcement for per-field edits of a sparse scenario pair.
//!
//! Two invariants hold after every edit, on realized values:
//!
//! 1. Ordering within each arm: `0 ≤ min ≤ mode ≤ max ≤ 100`, `1 ≤ confidence ≤ 100`.
//! 2. Dominance across arms: `treatment.f ≤ baseline.f` for f ∈ {min, mode, max}.
//!
//! An edit never fails. The value is clamped into the legal range for its field,
//! neighbouring fields are dragged along (raising min drags mode up, lowering max
//! drags mode down), and a baseline change cascades into the treatment arm. The
//! result is written back through [`reduce`](crate::sparse::reduce), so a field
//! that lands on its default becomes unset again.

use serde::Serialize;

use crate::constants::{CONFIDENCE_MAX, CONFIDENCE_MIN, DEFAULTS, VALUE_MAX, VALUE_MIN};
use crate::sparse::{realize_pair, reduce_pair};
use crate::types::{Arm, Defaults, Distribution, Field, ScenarioDistribution, SparseScenarioDistribution};

/// A single field edit.
#[derive(Clone, Copy, PartialEq, Debug, Serialize)]
pub struct Edit {
    pub arm: Arm,
    pub field: Field,
    pub value: f64,
}

impl Edit {
    pub fn new(arm: Arm, field: Field, value: f64) -> Self {
        Self { arm, field, value }
    }
}

/// Apply `edit` against the process-wide defaults.
pub fn apply_edit(pair: &SparseScenarioDistribution, edit: Edit) -> SparseScenarioDistribution {
    apply_edit_with(pair, edit, &DEFAULTS)
}

/// Apply `edit` against explicit defaults. A NaN value leaves the pair unchanged.
pub fn apply_edit_with(
    pair: &SparseScenarioDistribution,
    edit: Edit,
    defaults: &Defaults,
) -> SparseScenarioDistribution {
    if edit.value.is_nan() {
        return *pair;
    }

    let mut realized = realize_pair(pair, defaults);
    set_ordered(realized.arm_mut(edit.arm), edit.field, edit.value);

    if edit.arm == Arm::Treatment && edit.field.is_location() {
        let cap = realized.baseline.get(edit.field);
        if realized.treatment.get(edit.field) > cap {
            realized.treatment.set(edit.field, cap);
        }
    }

    settle(&mut realized);
    reduce_pair(&realized, defaults)
}

/// Put one field back to its default, keeping both invariants.
///
/// Routed through [`apply_edit_with`] with the default value, so the field ends
/// up unset unless a neighbouring constraint forces it elsewhere.
pub fn reset_field(
    pair: &SparseScenarioDistribution,
    arm: Arm,
    field: Field,
    defaults: &Defaults,
) -> SparseScenarioDistribution {
    let value = defaults.arm(arm).get(field);
    apply_edit_with(pair, Edit::new(arm, field, value), defaults)
}

/// Settle an arbitrary pair (e.g. freshly imported) into a legal configuration.
///
/// Legal pairs come back unchanged apart from `reduce` normalization.
pub fn enforce(pair: &SparseScenarioDistribution, defaults: &Defaults) -> SparseScenarioDistribution {
    let mut realized = realize_pair(pair, defaults);
    settle(&mut realized);
    reduce_pair(&realized, defaults)
}

/// A broken invariant on a realized pair.
#[derive(Clone, Copy, PartialEq, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// A field lies outside its absolute bounds.
    OutOfBounds { arm: Arm, field: Field, value: f64 },
    /// `min ≤ mode ≤ max` does not hold within an arm.
    Unordered { arm: Arm },
    /// Treatment exceeds baseline for a location field.
    Dominance { field: Field, baseline: f64, treatment: f64 },
}

/// List every invariant the realized pair breaks. Empty for a legal pair.
pub fn violations(pair: &SparseScenarioDistribution, defaults: &Defaults) -> Vec<Violation> {
    let realized = realize_pair(pair, defaults);
    let mut out = Vec::new();

    for arm in Arm::ALL {
        let d = realized.arm(arm);
        for field in Field::ALL {
            let value = d.get(field);
            let (lo, hi) = field_bounds(field);
            if !(lo..=hi).contains(&value) {
                out.push(Violation::OutOfBounds { arm, field, value });
            }
        }
        if !d.is_ordered() {
            out.push(Violation::Unordered { arm });
        }
    }

    for field in Field::LOCATION {
        let baseline = realized.baseline.get(field);
        let treatment = realized.treatment.get(field);
        if treatment > baseline {
            out.push(Violation::Dominance {
                field,
                baseline,
                treatment,
            });
        }
    }
    out
}

// ── Internals ──

fn field_bounds(field: Field) -> (f64, f64) {
    match field {
        Field::Confidence => (CONFIDENCE_MIN, CONFIDENCE_MAX),
        _ => (VALUE_MIN, VALUE_MAX),
    }
}

/// `v` limited to `[lo, hi]`. Unlike `f64::clamp` this never panics: an empty
/// range (`lo > hi`) yields `hi`.
#[inline]
fn bound(v: f64, lo: f64, hi: f64) -> f64 {
    v.max(lo).min(hi)
}

/// Write `value` into `field` using the intra-arm ordering rules.
fn set_ordered(d: &mut Distribution, field: Field, value: f64) {
    match field {
        Field::Min => {
            let v = bound(value, VALUE_MIN, d.max);
            d.min = v;
            if v > d.mode {
                d.mode = v;
            }
        }
        Field::Max => {
            let v = bound(value, d.min, VALUE_MAX);
            d.max = v;
            if v < d.mode {
                d.mode = v;
            }
        }
        Field::Mode => d.mode = bound(value, d.min, d.max),
        Field::Confidence => d.confidence = bound(value, CONFIDENCE_MIN, CONFIDENCE_MAX),
    }
}

/// Clamp one arm into absolute bounds and restore `min ≤ mode ≤ max`.
fn settle_arm(d: &mut Distribution) {
    d.min = bound(d.min, VALUE_MIN, VALUE_MAX);
    d.max = bound(d.max, d.min, VALUE_MAX);
    d.mode = bound(d.mode, d.min, d.max);
    d.confidence = bound(d.confidence, CONFIDENCE_MIN, CONFIDENCE_MAX);
}

/// Restore both invariants. No-op on a legal pair.
fn settle(r: &mut ScenarioDistribution) {
    settle_arm(&mut r.baseline);
    settle_arm(&mut r.treatment);

    // Cascade baseline caps into treatment, then repair treatment ordering.
    // Only lowering happens here, so dominance survives the repair.
    for field in Field::LOCATION {
        let cap = r.baseline.get(field);
        if r.treatment.get(field) > cap {
            r.treatment.set(field, cap);
        }
    }
    let t = &mut r.treatment;
    t.mode = t.mode.min(t.max);
    t.min = t.min.min(t.mode);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEFAULT_BASELINE, DEFAULT_TREATMENT};
    use crate::sparse::realize;
    use crate::types::SparseDistribution;

    fn edit(pair: &SparseScenarioDistribution, arm: Arm, field: Field, v: f64) -> SparseScenarioDistribution {
        apply_edit(pair, Edit::new(arm, field, v))
    }

    fn base(pair: &SparseScenarioDistribution) -> Distribution {
        realize(&pair.baseline, &DEFAULT_BASELINE)
    }

    fn treat(pair: &SparseScenarioDistribution) -> Distribution {
        realize(&pair.treatment, &DEFAULT_TREATMENT)
    }

    #[test]
    fn test_lower_baseline_max_drags_mode() {
        let pair = edit(&SparseScenarioDistribution::default(), Arm::Baseline, Field::Max, 10.0);
        let b = base(&pair);
        assert_eq!(b.max, 10.0);
        assert_eq!(b.mode, 10.0);
        assert_eq!(pair.baseline.max, Some(10.0));
        assert_eq!(pair.baseline.mode, Some(10.0));
    }

    #[test]
    fn test_raise_baseline_min_drags_mode() {
        let pair = edit(&SparseScenarioDistribution::default(), Arm::Baseline, Field::Min, 20.0);
        let b = base(&pair);
        assert_eq!(b.min, 20.0);
        assert_eq!(b.mode, 20.0);
        assert_eq!(b.max, 30.0);
    }

    #[test]
    fn test_baseline_min_clamped_to_max() {
        let pair = edit(&SparseScenarioDistribution::default(), Arm::Baseline, Field::Min, 80.0);
        let b = base(&pair);
        assert_eq!(b.min, 30.0);
        assert_eq!(b.mode, 30.0);
    }

    #[test]
    fn test_baseline_mode_clamped_into_range() {
        let pair = edit(&SparseScenarioDistribution::default(), Arm::Baseline, Field::Mode, 99.0);
        assert_eq!(base(&pair).mode, 30.0);
        let pair = edit(&pair, Arm::Baseline, Field::Mode, -4.0);
        assert_eq!(base(&pair).mode, 0.0);
    }

    #[test]
    fn test_baseline_cascades_into_treatment() {
        // Default treatment max is 15: lowering baseline max to 8 caps it.
        let pair = edit(&SparseScenarioDistribution::default(), Arm::Baseline, Field::Max, 8.0);
        let t = treat(&pair);
        assert_eq!(t.max, 8.0);
        assert!(t.mode <= 8.0);
        assert!(t.min <= t.mode);
    }

    #[test]
    fn test_cascade_keeps_treatment_ordered() {
        // Default treatment mode is 5; baseline mode down to 2 also drags it.
        let pair = edit(&SparseScenarioDistribution::default(), Arm::Baseline, Field::Mode, 2.0);
        let t = treat(&pair);
        assert_eq!(t.mode, 2.0);
        assert!(t.min <= t.mode && t.mode <= t.max);
    }

    #[test]
    fn test_treatment_capped_by_baseline() {
        let pair = edit(&SparseScenarioDistribution::default(), Arm::Treatment, Field::Max, 60.0);
        assert_eq!(treat(&pair).max, 30.0);
        let pair = edit(&pair, Arm::Treatment, Field::Mode, 25.0);
        assert_eq!(treat(&pair).mode, 15.0);
    }

    #[test]
    fn test_treatment_min_capped_by_baseline_min() {
        let pair = edit(&SparseScenarioDistribution::default(), Arm::Baseline, Field::Min, 4.0);
        let pair = edit(&pair, Arm::Treatment, Field::Min, 9.0);
        let t = treat(&pair);
        assert_eq!(t.min, 4.0);
        assert!(t.mode >= t.min);
    }

    #[test]
    fn test_confidence_clamped_and_independent() {
        let pair = edit(&SparseScenarioDistribution::default(), Arm::Baseline, Field::Confidence, 0.0);
        assert_eq!(base(&pair).confidence, 1.0);
        assert_eq!(treat(&pair).confidence, DEFAULT_TREATMENT.confidence);
        let pair = edit(&pair, Arm::Treatment, Field::Confidence, 250.0);
        assert_eq!(treat(&pair).confidence, 100.0);
        assert_eq!(pair.treatment.confidence, None);
    }

    #[test]
    fn test_value_equal_to_default_collapses() {
        let pair = edit(&SparseScenarioDistribution::default(), Arm::Baseline, Field::Mode, 12.0);
        assert_eq!(pair.baseline.mode, Some(12.0));
        let pair = edit(&pair, Arm::Baseline, Field::Mode, DEFAULT_BASELINE.mode);
        assert_eq!(pair.baseline.mode, None);
    }

    #[test]
    fn test_nan_edit_is_ignored() {
        let pair = edit(&SparseScenarioDistribution::default(), Arm::Baseline, Field::Min, 3.0);
        assert_eq!(edit(&pair, Arm::Baseline, Field::Max, f64::NAN), pair);
    }

    #[test]
    fn test_reset_field() {
        let pair = edit(&SparseScenarioDistribution::default(), Arm::Baseline, Field::Max, 50.0);
        let pair = edit(&pair, Arm::Baseline, Field::Mode, 40.0);
        let pair = reset_field(&pair, Arm::Baseline, Field::Max, &DEFAULTS);
        let b = base(&pair);
        assert_eq!(pair.baseline.max, None);
        assert_eq!(b.mode, 30.0);
        assert!(b.is_ordered());
    }

    #[test]
    fn test_enforce_repairs_imported_pair() {
        let pair = SparseScenarioDistribution {
            baseline: SparseDistribution {
                min: Some(50.0),
                max: Some(20.0),
                mode: Some(120.0),
                confidence: Some(0.0),
            },
            treatment: SparseDistribution::UNSET.with(Field::Min, 70.0),
        };
        assert!(!violations(&pair, &DEFAULTS).is_empty());
        let fixed = enforce(&pair, &DEFAULTS);
        assert!(violations(&fixed, &DEFAULTS).is_empty(), "{:?}", violations(&fixed, &DEFAULTS));
    }

    #[test]
    fn test_violations_on_legal_pair() {
        assert!(violations(&SparseScenarioDistribution::default(), &DEFAULTS).is_empty());
        let pair = SparseScenarioDistribution {
            baseline: SparseDistribution::UNSET,
            treatment: SparseDistribution::UNSET.with(Field::Max, 40.0),
        };
        let v = violations(&pair, &DEFAULTS);
        assert_eq!(
            v,
            vec![Violation::Dominance {
                field: Field::Max,
                baseline: 30.0,
                treatment: 40.0
            }]
        );
    }
}
