//! Core data structures: concrete and sparse distributions, scenarios, shape parameters.
//!
//! The central pair is [`Distribution`] (fully concrete) and [`SparseDistribution`]
//! (each field either set by the user or unset). Unset means "use the default for
//! this field", never zero. Conversion between the two lives in [`crate::sparse`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::constants::is_reserved_column;
use crate::session::codec::canonical_comment;

// ── Arm and field selectors ──

/// Which of the two outcome conditions a distribution describes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arm {
    Baseline,
    Treatment,
}

impl Arm {
    pub const ALL: [Arm; 2] = [Arm::Baseline, Arm::Treatment];

    pub fn as_str(&self) -> &'static str {
        match self {
            Arm::Baseline => "baseline",
            Arm::Treatment => "treatment",
        }
    }
}

impl fmt::Display for Arm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the four parameters of a distribution.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Min,
    Max,
    Mode,
    Confidence,
}

impl Field {
    /// File column order: min, max, mode, confidence.
    pub const ALL: [Field; 4] = [Field::Min, Field::Max, Field::Mode, Field::Confidence];

    /// Fields that take part in ordering and dominance.
    pub const LOCATION: [Field; 3] = [Field::Min, Field::Mode, Field::Max];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Min => "min",
            Field::Max => "max",
            Field::Mode => "mode",
            Field::Confidence => "confidence",
        }
    }

    pub fn is_location(&self) -> bool {
        !matches!(self, Field::Confidence)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Distributions ──

/// Fully concrete distribution.
///
/// Invariant (maintained by [`crate::constraints`]): `0 ≤ min ≤ mode ≤ max ≤ 100`
/// and `1 ≤ confidence ≤ 100`.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct Distribution {
    pub min: f64,
    pub max: f64,
    pub mode: f64,
    pub confidence: f64,
}

impl Distribution {
    pub fn get(&self, field: Field) -> f64 {
        match field {
            Field::Min => self.min,
            Field::Max => self.max,
            Field::Mode => self.mode,
            Field::Confidence => self.confidence,
        }
    }

    pub fn set(&mut self, field: Field, value: f64) {
        match field {
            Field::Min => self.min = value,
            Field::Max => self.max = value,
            Field::Mode => self.mode = value,
            Field::Confidence => self.confidence = value,
        }
    }

    /// True if `min ≤ mode ≤ max`.
    pub fn is_ordered(&self) -> bool {
        self.min <= self.mode && self.mode <= self.max
    }
}

/// User-facing distribution where every field may be unset.
#[derive(Clone, Copy, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct SparseDistribution {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mode: Option<f64>,
    pub confidence: Option<f64>,
}

impl SparseDistribution {
    /// All fields unset.
    pub const UNSET: SparseDistribution = SparseDistribution {
        min: None,
        max: None,
        mode: None,
        confidence: None,
    };

    pub fn get(&self, field: Field) -> Option<f64> {
        match field {
            Field::Min => self.min,
            Field::Max => self.max,
            Field::Mode => self.mode,
            Field::Confidence => self.confidence,
        }
    }

    pub fn set(&mut self, field: Field, value: Option<f64>) {
        match field {
            Field::Min => self.min = value,
            Field::Max => self.max = value,
            Field::Mode => self.mode = value,
            Field::Confidence => self.confidence = value,
        }
    }

    /// Builder-style setter, handy when constructing fixtures.
    pub fn with(mut self, field: Field, value: f64) -> Self {
        self.set(field, Some(value));
        self
    }
}

/// Concrete baseline/treatment pair.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct ScenarioDistribution {
    pub baseline: Distribution,
    pub treatment: Distribution,
}

impl ScenarioDistribution {
    pub fn arm(&self, arm: Arm) -> &Distribution {
        match arm {
            Arm::Baseline => &self.baseline,
            Arm::Treatment => &self.treatment,
        }
    }

    pub fn arm_mut(&mut self, arm: Arm) -> &mut Distribution {
        match arm {
            Arm::Baseline => &mut self.baseline,
            Arm::Treatment => &mut self.treatment,
        }
    }
}

/// Sparse baseline/treatment pair, one per scenario.
///
/// Invariant (enforced by [`crate::constraints::apply_edit`]): realized treatment
/// min/mode/max never exceed the realized baseline values.
#[derive(Clone, Copy, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct SparseScenarioDistribution {
    pub baseline: SparseDistribution,
    pub treatment: SparseDistribution,
}

impl SparseScenarioDistribution {
    pub fn arm(&self, arm: Arm) -> &SparseDistribution {
        match arm {
            Arm::Baseline => &self.baseline,
            Arm::Treatment => &self.treatment,
        }
    }

    pub fn arm_mut(&mut self, arm: Arm) -> &mut SparseDistribution {
        match arm {
            Arm::Baseline => &mut self.baseline,
            Arm::Treatment => &mut self.treatment,
        }
    }
}

/// Per-arm default distributions.
#[derive(Clone, Copy, PartialEq, Debug, Serialize)]
pub struct Defaults {
    pub baseline: Distribution,
    pub treatment: Distribution,
}

impl Defaults {
    pub fn arm(&self, arm: Arm) -> &Distribution {
        match arm {
            Arm::Baseline => &self.baseline,
            Arm::Treatment => &self.treatment,
        }
    }
}

// ── Shape parameters ──

/// Shape parameters (α, β) of a bounded unimodal distribution. Derived, never persisted.
#[derive(Clone, Copy, PartialEq, Debug, Serialize)]
pub struct BetaParams {
    pub alpha: f64,
    pub beta: f64,
}

impl BetaParams {
    /// κ = α + β.
    pub fn concentration(&self) -> f64 {
        self.alpha + self.beta
    }

    /// Mean on the unit interval: α / (α + β).
    pub fn mean(&self) -> f64 {
        self.alpha / (self.alpha + self.beta)
    }

    /// Mode on the unit interval. Well defined because both parameters exceed 1.
    pub fn mode(&self) -> f64 {
        (self.alpha - 1.0) / (self.alpha + self.beta - 2.0)
    }
}

// ── Scenarios ──

/// A scenario attribute cell: numeric when the cell parses as a number, text otherwise.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Number(f64),
    Text(String),
}

impl AttributeValue {
    /// Number when `cell` lexically parses as a finite one, text otherwise.
    pub fn parse(cell: &str) -> Self {
        match cell.parse::<f64>() {
            Ok(v) if v.is_finite() => AttributeValue::Number(v),
            _ => AttributeValue::Text(cell.to_string()),
        }
    }

    /// The value as a session file reads it back. `None` for an empty text.
    pub fn canonical(&self) -> Option<AttributeValue> {
        let cell = self.to_string();
        (!cell.is_empty()).then(|| AttributeValue::parse(&cell))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            AttributeValue::Text(_) => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Number(n) => write!(f, "{}", n),
            AttributeValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for AttributeValue {
    fn from(n: f64) -> Self {
        AttributeValue::Number(n)
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Text(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::Text(s)
    }
}

/// One row of the session: identity, grouping, free text and attributes.
///
/// Reserved column names never appear as attribute keys.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub group: String,
    pub comment: Option<String>,
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl Scenario {
    pub fn new(id: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            group: group.into(),
            comment: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Attach a comment in its stored form. A comment that is empty once its
    /// commas are dropped is no comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = canonical_comment(&comment.into());
        self
    }

    /// Insert an attribute as a session file reads it back: numeric text
    /// becomes a number and an empty text removes the key. The key is trimmed.
    ///
    /// Returns false (and leaves the scenario unchanged) when `key` is blank or
    /// a reserved column name.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> bool {
        let key = key.into();
        let key = key.trim();
        if key.is_empty() || is_reserved_column(key) {
            return false;
        }
        match value.into().canonical() {
            Some(v) => {
                self.attributes.insert(key.to_string(), v);
            }
            None => {
                self.attributes.remove(key);
            }
        }
        true
    }

    /// Bring a directly built scenario into stored form: comment and
    /// attributes as [`with_comment`](Self::with_comment) and
    /// [`set_attribute`](Self::set_attribute) would store them. Blank and
    /// reserved keys are dropped.
    pub fn canonicalize(&mut self) {
        self.comment = self.comment.as_deref().and_then(canonical_comment);
        for (key, value) in std::mem::take(&mut self.attributes) {
            self.set_attribute(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distribution_get_set() {
        let mut d = Distribution {
            min: 1.0,
            max: 9.0,
            mode: 4.0,
            confidence: 50.0,
        };
        for (i, f) in Field::ALL.iter().enumerate() {
            d.set(*f, i as f64);
            assert_eq!(d.get(*f), i as f64);
        }
    }

    #[test]
    fn test_beta_params_moments() {
        let p = BetaParams {
            alpha: 3.0,
            beta: 5.0,
        };
        assert_eq!(p.concentration(), 8.0);
        assert!((p.mean() - 0.375).abs() < 1e-12);
        assert!((p.mode() - 2.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_reserved_attribute_rejected() {
        let mut s = Scenario::new("s1", "A");
        assert!(!s.set_attribute("baseline_min", 3.0));
        assert!(!s.set_attribute("scenario_group", "B"));
        assert!(s.set_attribute("loc", "north"));
        assert_eq!(s.attributes.len(), 1);
    }

    #[test]
    fn test_attribute_stored_as_read_back() {
        let mut s = Scenario::new("s1", "A");
        assert!(s.set_attribute(" area ", "12"));
        assert_eq!(s.attributes.get("area"), Some(&AttributeValue::Number(12.0)));
        assert!(s.set_attribute("yield", f64::INFINITY));
        assert_eq!(s.attributes.get("yield"), Some(&AttributeValue::from("inf")));
        assert!(s.set_attribute("area", ""));
        assert!(!s.attributes.contains_key("area"));
        assert!(!s.set_attribute("  ", "x"));
    }

    #[test]
    fn test_empty_comment_is_none() {
        assert_eq!(Scenario::new("s1", "A").with_comment("").comment, None);
        assert_eq!(Scenario::new("s1", "A").with_comment(",,").comment, None);
        assert_eq!(
            Scenario::new("s1", "A").with_comment("a, b\r\n").comment.as_deref(),
            Some("a b\n")
        );
    }

    #[test]
    fn test_canonicalize_direct_fields() {
        let mut s = Scenario::new("s1", "A");
        s.comment = Some(String::new());
        s.attributes.insert("note".to_string(), AttributeValue::from(""));
        s.attributes.insert("n".to_string(), AttributeValue::from("3"));
        s.canonicalize();
        assert_eq!(s.comment, None);
        assert!(!s.attributes.contains_key("note"));
        assert_eq!(s.attributes.get("n"), Some(&AttributeValue::Number(3.0)));
    }

    #[test]
    fn test_attribute_value_display() {
        assert_eq!(AttributeValue::Number(5.0).to_string(), "5");
        assert_eq!(AttributeValue::Number(2.5).to_string(), "2.5");
        assert_eq!(AttributeValue::from("north").to_string(), "north");
    }
}
