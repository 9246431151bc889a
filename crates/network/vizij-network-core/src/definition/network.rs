use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use super::NodeDefinition;
use crate::error::NetworkError;

/// Authored bounds and default for one blend parameter.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkDefinitionParameter {
    pub min: f32,
    pub max: f32,
    pub default: f32,
}

impl NetworkDefinitionParameter {
    pub fn new(min: f32, max: f32, default: f32) -> Self {
        Self { min, max, default }
    }
}

impl Default for NetworkDefinitionParameter {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 1.0,
            default: 0.0,
        }
    }
}

/// A loaded animation network: declared conditions and parameters plus the
/// root of the node tree.
///
/// Never mutated once loaded; hot-reload replaces the whole value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkDefinition {
    /// Declared condition flags and their default values.
    #[serde(default)]
    pub conditions: HashMap<String, bool>,
    #[serde(default)]
    pub parameters: HashMap<String, NetworkDefinitionParameter>,
    #[serde(default)]
    pub root: Option<NodeDefinition>,
}

impl NetworkDefinition {
    pub fn new(root: impl Into<NodeDefinition>) -> Self {
        Self {
            conditions: HashMap::new(),
            parameters: HashMap::new(),
            root: Some(root.into()),
        }
    }

    pub fn with_condition(mut self, name: impl Into<String>, default: bool) -> Self {
        self.conditions.insert(name.into(), default);
        self
    }

    pub fn with_parameter(
        mut self,
        name: impl Into<String>,
        parameter: NetworkDefinitionParameter,
    ) -> Self {
        self.parameters.insert(name.into(), parameter);
        self
    }

    /// Parse and validate a definition from its JSON data model.
    pub fn from_json(raw: &str) -> Result<Self, NetworkError> {
        let def: NetworkDefinition = serde_json::from_str(raw)?;
        def.validate()?;
        Ok(def)
    }

    /// Check structural invariants: a root exists, every parameter range is
    /// ordered and contains its default, and every state machine in the tree
    /// refers only to its own declared states.
    pub fn validate(&self) -> Result<(), NetworkError> {
        for (name, p) in &self.parameters {
            if !(p.min <= p.max) || p.default < p.min || p.default > p.max {
                return Err(NetworkError::InvalidParameterRange {
                    name: name.clone(),
                    min: p.min,
                    max: p.max,
                });
            }
        }

        let root = self.root.as_ref().ok_or(NetworkError::MissingRoot)?;
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            match node {
                NodeDefinition::PlayClip(_) => {}
                NodeDefinition::Blend(blend) => {
                    stack.extend(blend.child_a.iter());
                    stack.extend(blend.child_b.iter());
                }
                NodeDefinition::StateMachine(sm) => {
                    sm.validate()?;
                    stack.extend(sm.states.values().map(|s| &s.child));
                }
            }
        }
        Ok(())
    }
}
