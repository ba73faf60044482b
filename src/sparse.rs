//! Sparse distribution model: merge with defaults, strip defaults, completion.
//!
//! `realize(reduce(d, defs), defs) == d` holds for every concrete `d`: `reduce`
//! only drops fields that compare equal to their default, and `realize` puts
//! exactly that default back.

use crate::types::{
    Defaults, Distribution, Field, ScenarioDistribution, SparseDistribution,
    SparseScenarioDistribution,
};

/// Field-wise `value ?? default`.
pub fn realize(sparse: &SparseDistribution, defaults: &Distribution) -> Distribution {
    Distribution {
        min: sparse.min.unwrap_or(defaults.min),
        max: sparse.max.unwrap_or(defaults.max),
        mode: sparse.mode.unwrap_or(defaults.mode),
        confidence: sparse.confidence.unwrap_or(defaults.confidence),
    }
}

/// Field-wise `value == default ? unset : value`.
pub fn reduce(concrete: &Distribution, defaults: &Distribution) -> SparseDistribution {
    let mut out = SparseDistribution::UNSET;
    for field in Field::ALL {
        let value = concrete.get(field);
        if value != defaults.get(field) {
            out.set(field, Some(value));
        }
    }
    out
}

/// True iff at least one field is set.
pub fn is_edited(sparse: &SparseDistribution) -> bool {
    Field::ALL.iter().any(|&f| sparse.get(f).is_some())
}

/// True iff either arm has been edited.
pub fn is_scenario_complete(pair: &SparseScenarioDistribution) -> bool {
    is_edited(&pair.baseline) || is_edited(&pair.treatment)
}

/// Realize both arms against their own defaults.
pub fn realize_pair(pair: &SparseScenarioDistribution, defaults: &Defaults) -> ScenarioDistribution {
    ScenarioDistribution {
        baseline: realize(&pair.baseline, &defaults.baseline),
        treatment: realize(&pair.treatment, &defaults.treatment),
    }
}

/// Reduce both arms against their own defaults.
pub fn reduce_pair(pair: &ScenarioDistribution, defaults: &Defaults) -> SparseScenarioDistribution {
    SparseScenarioDistribution {
        baseline: reduce(&pair.baseline, &defaults.baseline),
        treatment: reduce(&pair.treatment, &defaults.treatment),
    }
}
