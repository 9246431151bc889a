use serde::{Deserialize, Serialize};

use super::NodeDefinition;

/// Two-input blend driven by a network parameter.
///
/// A mix of 0 weights `child_a` fully, a mix of 1 weights `child_b` fully.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BlendDefinition {
    #[serde(default)]
    pub child_a: Option<NodeDefinition>,
    #[serde(default)]
    pub child_b: Option<NodeDefinition>,
    /// Name of the network parameter holding the mix value.
    pub mix_parameter_id: String,
    /// Scale each child's playback rate so both progress through their
    /// clips at the same normalized rate.
    #[serde(default)]
    pub synchronize_time: bool,
}

impl BlendDefinition {
    pub fn new(
        child_a: Option<NodeDefinition>,
        child_b: Option<NodeDefinition>,
        mix_parameter_id: impl Into<String>,
    ) -> Self {
        Self {
            child_a,
            child_b,
            mix_parameter_id: mix_parameter_id.into(),
            synchronize_time: false,
        }
    }

    pub fn synchronized(mut self, synchronize_time: bool) -> Self {
        self.synchronize_time = synchronize_time;
        self
    }
}
