//! Host-owned session state and its file codec.
//!
//! A [`Session`] is the only mutable state in the crate. Every scenario owns
//! exactly one [`SparseScenarioDistribution`]: both are created together
//! (fresh or duplicated) and removed together. Distribution edits go through
//! [`crate::constraints`] so both invariants hold after each call.
//!
//! - [`codec`]: session ⇄ comma-separated text
//! - [`csv`]: record-level reader/writer

pub mod codec;
pub mod csv;

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::constants::{is_reserved_column, DEFAULTS};
use crate::constraints::{apply_edit_with, reset_field, Edit};
use crate::error::{CodecError, SessionError};
use crate::sparse::is_scenario_complete;
use crate::types::{Arm, AttributeValue, Field, Scenario, SparseScenarioDistribution};

pub use codec::{decode_session, detect_yield_column, distribution_column, encode_session};

/// Scenarios, their sparse distributions, and the detected yield column.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Session {
    pub scenarios: Vec<Scenario>,
    pub distributions: HashMap<String, SparseScenarioDistribution>,
    pub yield_column: Option<String>,
}

/// How many scenarios have at least one edited field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Completion {
    pub complete: usize,
    pub total: usize,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a session file into a fresh session.
    pub fn from_csv(text: &str) -> Result<Self, CodecError> {
        decode_session(text)
    }

    /// Replace this session with the decoded file. On failure `self` is untouched.
    pub fn load_csv(&mut self, text: &str) -> Result<(), CodecError> {
        *self = decode_session(text)?;
        Ok(())
    }

    /// Encode the session. Fails when there are no scenarios.
    pub fn to_csv(&self) -> Result<String, CodecError> {
        encode_session(&self.scenarios, &self.distributions)
    }

    pub fn scenario(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }

    pub fn distribution(&self, id: &str) -> Option<&SparseScenarioDistribution> {
        self.distributions.get(id)
    }

    fn position(&self, id: &str) -> Result<usize, SessionError> {
        self.scenarios
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| SessionError::UnknownScenario(id.to_string()))
    }

    /// Append a scenario with an all-unset distribution. The comment and
    /// attributes are stored as a session file would read them back.
    pub fn add_scenario(&mut self, mut scenario: Scenario) -> Result<(), SessionError> {
        if scenario.id.trim().is_empty() {
            return Err(SessionError::BlankScenarioId);
        }
        if self.scenario(&scenario.id).is_some() {
            return Err(SessionError::DuplicateScenarioId(scenario.id));
        }
        for key in scenario.attributes.keys() {
            if key.trim().is_empty() {
                return Err(SessionError::BlankAttributeKey);
            }
            if is_reserved_column(key.trim()) {
                return Err(SessionError::ReservedAttribute(key.clone()));
            }
        }
        scenario.canonicalize();
        self.distributions
            .insert(scenario.id.clone(), SparseScenarioDistribution::default());
        self.scenarios.push(scenario);
        self.refresh_yield_column();
        Ok(())
    }

    /// Copy a scenario (attributes, comment, group, distribution) under a fresh id,
    /// placed right after the original. Returns the new id.
    pub fn duplicate_scenario(&mut self, id: &str) -> Result<String, SessionError> {
        let pos = self.position(id)?;
        let new_id = self.fresh_copy_id(id);

        let mut copy = self.scenarios[pos].clone();
        copy.id = new_id.clone();
        let pair = self.distributions.get(id).copied().unwrap_or_default();

        self.scenarios.insert(pos + 1, copy);
        self.distributions.insert(new_id.clone(), pair);
        debug!(source = id, copy = %new_id, "duplicated scenario");
        Ok(new_id)
    }

    fn fresh_copy_id(&self, id: &str) -> String {
        let mut candidate = format!("{id}_copy");
        let mut n = 2;
        while self.scenario(&candidate).is_some() {
            candidate = format!("{id}_copy{n}");
            n += 1;
        }
        candidate
    }

    /// Remove a scenario together with its distribution.
    pub fn delete_scenario(&mut self, id: &str) -> Result<Scenario, SessionError> {
        let pos = self.position(id)?;
        let removed = self.scenarios.remove(pos);
        self.distributions.remove(id);
        self.refresh_yield_column();
        Ok(removed)
    }

    /// Set (or overwrite) an attribute on one scenario. An empty text value
    /// removes the attribute.
    pub fn set_attribute(
        &mut self,
        id: &str,
        key: &str,
        value: impl Into<AttributeValue>,
    ) -> Result<(), SessionError> {
        let pos = self.position(id)?;
        if !self.scenarios[pos].set_attribute(key, value) {
            return Err(if key.trim().is_empty() {
                SessionError::BlankAttributeKey
            } else {
                SessionError::ReservedAttribute(key.to_string())
            });
        }
        self.refresh_yield_column();
        Ok(())
    }

    /// Apply one field edit through the constraint enforcer.
    pub fn edit(&mut self, id: &str, edit: Edit) -> Result<SparseScenarioDistribution, SessionError> {
        self.update(id, |pair| apply_edit_with(pair, edit, &DEFAULTS))
    }

    /// Put one field back to its default through the constraint enforcer.
    pub fn reset(
        &mut self,
        id: &str,
        arm: Arm,
        field: Field,
    ) -> Result<SparseScenarioDistribution, SessionError> {
        self.update(id, |pair| reset_field(pair, arm, field, &DEFAULTS))
    }

    fn update(
        &mut self,
        id: &str,
        f: impl FnOnce(&SparseScenarioDistribution) -> SparseScenarioDistribution,
    ) -> Result<SparseScenarioDistribution, SessionError> {
        self.position(id)?;
        let current = self.distributions.get(id).copied().unwrap_or_default();
        let next = f(&current);
        self.distributions.insert(id.to_string(), next);
        Ok(next)
    }

    /// Distinct groups in first-seen order.
    pub fn groups(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for s in &self.scenarios {
            if !out.contains(&s.group.as_str()) {
                out.push(&s.group);
            }
        }
        out
    }

    pub fn scenarios_in_group<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a Scenario> + 'a {
        self.scenarios.iter().filter(move |s| s.group == group)
    }

    pub fn completion(&self) -> Completion {
        let complete = self
            .scenarios
            .iter()
            .filter(|s| {
                self.distributions
                    .get(&s.id)
                    .is_some_and(is_scenario_complete)
            })
            .count();
        Completion {
            complete,
            total: self.scenarios.len(),
        }
    }

    /// First matching attribute key in the order a saved file lists its
    /// columns, so a reloaded session detects the same one.
    fn refresh_yield_column(&mut self) {
        let mut keys: Vec<&str> = self
            .scenarios
            .iter()
            .flat_map(|s| s.attributes.keys().map(String::as_str))
            .collect();
        keys.sort_unstable();
        keys.dedup();
        self.yield_column = detect_yield_column(&keys);
    }
}
