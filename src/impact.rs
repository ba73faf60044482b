//! Absolute impact from percentage outcomes and the yield column.
//!
//! Outcomes are elicited as percentages. When the session has a yield column
//! and a scenario's yield cell is numeric, each arm's expected percentage is
//! turned into an absolute quantity: `yield · mean / 100`. The avoided amount is
//! baseline minus treatment.

use serde::Serialize;

use crate::constants::DEFAULTS;
use crate::session::Session;
use crate::shape::map_to_shape_parameters;
use crate::sparse::realize_pair;
use crate::types::{Defaults, Distribution, Scenario, SparseScenarioDistribution};

/// Expected value of a concrete distribution on its own scale.
///
/// Uses the analytic mean `min + (max−min)·α/(α+β)`. A zero-width interval
/// returns `min`.
pub fn expected_value(d: &Distribution) -> f64 {
    if !(d.min.is_finite() && d.max.is_finite()) || d.min >= d.max {
        return d.min;
    }
    let span = d.max - d.min;
    let params = map_to_shape_parameters((d.mode - d.min) / span, d.confidence);
    d.min + span * params.mean()
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ArmImpact {
    /// Expected outcome, percent.
    pub mean_percent: f64,
    /// Expected outcome in yield units, when a numeric yield is known.
    pub absolute: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScenarioImpact {
    pub scenario_id: String,
    pub yield_value: Option<f64>,
    pub baseline: ArmImpact,
    pub treatment: ArmImpact,
    /// Baseline mean minus treatment mean, percent.
    pub avoided_percent: f64,
    pub avoided_absolute: Option<f64>,
}

/// Impact of one scenario. `yield_column` is the session's detected column, if any.
pub fn scenario_impact(
    scenario: &Scenario,
    pair: &SparseScenarioDistribution,
    yield_column: Option<&str>,
    defaults: &Defaults,
) -> ScenarioImpact {
    let realized = realize_pair(pair, defaults);
    let yield_value = yield_column
        .and_then(|col| scenario.attributes.get(col))
        .and_then(|v| v.as_number());

    let arm = |d: &Distribution| {
        let mean_percent = expected_value(d);
        ArmImpact {
            mean_percent,
            absolute: yield_value.map(|y| y * mean_percent / 100.0),
        }
    };
    let baseline = arm(&realized.baseline);
    let treatment = arm(&realized.treatment);
    let avoided_percent = baseline.mean_percent - treatment.mean_percent;

    ScenarioImpact {
        scenario_id: scenario.id.clone(),
        yield_value,
        baseline,
        treatment,
        avoided_percent,
        avoided_absolute: yield_value.map(|y| y * avoided_percent / 100.0),
    }
}

/// Impact of every scenario in session order.
pub fn session_impacts(session: &Session) -> Vec<ScenarioImpact> {
    session
        .scenarios
        .iter()
        .map(|s| {
            let pair = session.distribution(&s.id).copied().unwrap_or_default();
            scenario_impact(s, &pair, session.yield_column.as_deref(), &DEFAULTS)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_BASELINE;
    use crate::types::AttributeValue;

    #[test]
    fn test_expected_value_symmetric() {
        // Default baseline is symmetric around 15.
        assert!((expected_value(&DEFAULT_BASELINE) - 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_expected_value_degenerate() {
        let d = Distribution {
            min: 8.0,
            max: 8.0,
            mode: 8.0,
            confidence: 50.0,
        };
        assert_eq!(expected_value(&d), 8.0);
    }

    #[test]
    fn test_absolute_impact_with_yield() {
        let mut s = Scenario::new("s1", "A");
        s.set_attribute("yield_t", 200.0);
        let imp = scenario_impact(
            &s,
            &SparseScenarioDistribution::default(),
            Some("yield_t"),
            &DEFAULTS,
        );
        assert_eq!(imp.yield_value, Some(200.0));
        let b = imp.baseline.absolute.unwrap();
        assert!((b - 30.0).abs() < 1e-9, "15% of 200 = 30, got {b}");
        assert!(imp.avoided_percent > 0.0);
        let avoided = imp.avoided_absolute.unwrap();
        assert!((avoided - 200.0 * imp.avoided_percent / 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_text_yield_has_no_absolute() {
        let mut s = Scenario::new("s1", "A");
        s.attributes
            .insert("yield".to_string(), AttributeValue::from("unknown"));
        let imp = scenario_impact(&s, &SparseScenarioDistribution::default(), Some("yield"), &DEFAULTS);
        assert_eq!(imp.yield_value, None);
        assert_eq!(imp.baseline.absolute, None);
        assert_eq!(imp.avoided_absolute, None);
    }
}
