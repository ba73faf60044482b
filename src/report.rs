//! Whole-session batch report.
//!
//! Every scenario is realized, both arms are sampled and summarized, and the
//! yield impact is attached. Scenarios are independent, so the work is spread
//! over the rayon pool; output order matches session order.

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::constants::DEFAULTS;
use crate::constraints::{violations, Violation};
use crate::density::{sample_distribution, summarize_curve, CurveSummary, DensityPoint};
use crate::impact::{scenario_impact, ScenarioImpact};
use crate::session::{Completion, Session};
use crate::sparse::{is_scenario_complete, realize_pair};
use crate::types::{Defaults, Distribution, Scenario, SparseScenarioDistribution};

/// One arm of one scenario: realized parameters, curve and its summary.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ArmReport {
    pub distribution: Distribution,
    pub summary: Option<CurveSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub curve: Vec<DensityPoint>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScenarioReport {
    pub scenario_id: String,
    pub group: String,
    pub edited: bool,
    pub baseline: ArmReport,
    pub treatment: ArmReport,
    pub impact: ScenarioImpact,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionReport {
    pub yield_column: Option<String>,
    pub completion: Completion,
    pub scenarios: Vec<ScenarioReport>,
}

fn arm_report(d: Distribution, with_curve: bool) -> ArmReport {
    let curve = sample_distribution(&d);
    ArmReport {
        distribution: d,
        summary: summarize_curve(&curve),
        curve: if with_curve { curve } else { Vec::new() },
    }
}

/// Report for a single scenario against explicit defaults.
pub fn scenario_report(
    scenario: &Scenario,
    pair: &SparseScenarioDistribution,
    yield_column: Option<&str>,
    defaults: &Defaults,
    with_curves: bool,
) -> ScenarioReport {
    let realized = realize_pair(pair, defaults);
    ScenarioReport {
        scenario_id: scenario.id.clone(),
        group: scenario.group.clone(),
        edited: is_scenario_complete(pair),
        baseline: arm_report(realized.baseline, with_curves),
        treatment: arm_report(realized.treatment, with_curves),
        impact: scenario_impact(scenario, pair, yield_column, defaults),
        violations: violations(pair, defaults),
    }
}

/// Report every scenario in the session. `with_curves` keeps the sampled points.
pub fn build_report(session: &Session, with_curves: bool) -> SessionReport {
    let yield_column = session.yield_column.as_deref();
    let scenarios: Vec<ScenarioReport> = session
        .scenarios
        .par_iter()
        .map(|s| {
            let pair = session.distribution(&s.id).copied().unwrap_or_default();
            scenario_report(s, &pair, yield_column, &DEFAULTS, with_curves)
        })
        .collect();

    debug!(scenarios = scenarios.len(), with_curves, "built session report");
    SessionReport {
        yield_column: session.yield_column.clone(),
        completion: session.completion(),
        scenarios,
    }
}
