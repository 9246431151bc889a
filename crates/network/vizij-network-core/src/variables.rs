//! Live condition and parameter tables of a network instance.

use hashbrown::HashMap;

use crate::definition::NetworkDefinition;

/// Named conditions (bools) and parameters (floats) read by node logic.
///
/// Unknown names read as `false` / `0.0`. Parameters are not clamped to their
/// declared range.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Variables {
    conditions: HashMap<String, bool>,
    parameters: HashMap<String, f32>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn condition(&self, name: &str) -> bool {
        self.conditions.get(name).copied().unwrap_or(false)
    }

    pub fn set_condition(&mut self, name: &str, value: bool) {
        match self.conditions.get_mut(name) {
            Some(slot) => *slot = value,
            None => {
                self.conditions.insert(name.to_owned(), value);
            }
        }
    }

    #[inline]
    pub fn parameter(&self, name: &str) -> f32 {
        self.parameters.get(name).copied().unwrap_or(0.0)
    }

    pub fn set_parameter(&mut self, name: &str, value: f32) {
        match self.parameters.get_mut(name) {
            Some(slot) => *slot = value,
            None => {
                self.parameters.insert(name.to_owned(), value);
            }
        }
    }

    pub fn conditions(&self) -> &HashMap<String, bool> {
        &self.conditions
    }

    pub fn parameters(&self) -> &HashMap<String, f32> {
        &self.parameters
    }

    /// True if every listed condition is set.
    pub fn all_true(&self, names: &[String]) -> bool {
        names.iter().all(|n| self.condition(n))
    }

    /// True if no listed condition is set.
    pub fn all_false(&self, names: &[String]) -> bool {
        !names.iter().any(|n| self.condition(n))
    }

    /// Copy the definition's declared defaults in, keeping any value that is
    /// already present.
    pub fn seed_defaults(&mut self, network: &NetworkDefinition) {
        for (name, value) in &network.conditions {
            self.conditions.entry(name.clone()).or_insert(*value);
        }
        for (name, p) in &network.parameters {
            self.parameters.entry(name.clone()).or_insert(p.default);
        }
    }
}
