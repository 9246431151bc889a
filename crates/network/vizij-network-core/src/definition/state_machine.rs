use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

use super::NodeDefinition;
use crate::error::NetworkError;
use crate::types::SlotBlendMode;

/// A guarded, timed edge out of a state.
///
/// A transition fires when it is selected by a trigger it lists (or, for a
/// transition listing no triggers, by the condition-only pass), every entry of
/// `conditions` is true and every entry of `negative_conditions` is false.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateMachineTransition {
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub negative_conditions: Vec<String>,
    #[serde(default)]
    pub triggers: HashSet<String>,
    /// Blend time between the old and new state, in seconds.
    #[serde(default)]
    pub duration_seconds: f32,
    pub target: String,
    /// State to start in if `target` is itself (or contains) a state machine.
    #[serde(default)]
    pub override_default_state: Option<String>,
    #[serde(default)]
    pub slot_blend_mode: SlotBlendMode,
}

impl StateMachineTransition {
    pub fn to(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Default::default()
        }
    }

    pub fn on_trigger(mut self, trigger: impl Into<String>) -> Self {
        self.triggers.insert(trigger.into());
        self
    }

    pub fn when(mut self, condition: impl Into<String>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    pub fn unless(mut self, condition: impl Into<String>) -> Self {
        self.negative_conditions.push(condition.into());
        self
    }

    pub fn over(mut self, duration_seconds: f32) -> Self {
        self.duration_seconds = duration_seconds;
        self
    }

    pub fn with_override_default_state(mut self, state: impl Into<String>) -> Self {
        self.override_default_state = Some(state.into());
        self
    }

    pub fn with_slot_blend_mode(mut self, mode: SlotBlendMode) -> Self {
        self.slot_blend_mode = mode;
        self
    }
}

/// A named state: the node to play while in it and its outgoing transitions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateMachineState {
    pub child: NodeDefinition,
    /// Evaluated in authored order; the first matching transition wins.
    #[serde(default)]
    pub transitions: Vec<StateMachineTransition>,
}

impl StateMachineState {
    pub fn new(child: impl Into<NodeDefinition>) -> Self {
        Self {
            child: child.into(),
            transitions: Vec::new(),
        }
    }

    pub fn with_transition(mut self, transition: StateMachineTransition) -> Self {
        self.transitions.push(transition);
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateMachineDefinition {
    pub default_state: String,
    pub states: HashMap<String, StateMachineState>,
}

impl StateMachineDefinition {
    pub fn new(default_state: impl Into<String>) -> Self {
        Self {
            default_state: default_state.into(),
            states: HashMap::new(),
        }
    }

    pub fn with_state(mut self, name: impl Into<String>, state: StateMachineState) -> Self {
        self.states.insert(name.into(), state);
        self
    }

    #[inline]
    pub fn state(&self, name: &str) -> Option<&StateMachineState> {
        self.states.get(name)
    }

    #[inline]
    pub fn has_state(&self, name: &str) -> bool {
        self.states.contains_key(name)
    }

    pub(crate) fn validate(&self) -> Result<(), NetworkError> {
        if !self.has_state(&self.default_state) {
            return Err(NetworkError::UnknownDefaultState {
                default_state: self.default_state.clone(),
            });
        }
        for (name, state) in &self.states {
            for transition in &state.transitions {
                if !self.has_state(&transition.target) {
                    return Err(NetworkError::UnknownTransitionTarget {
                        state: name.clone(),
                        target: transition.target.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
