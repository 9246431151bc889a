use serde::{Deserialize, Serialize};

/// Leaf node: plays one named clip from the network's data.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayClipDefinition {
    /// Clip name, resolved against the data interface by the backend.
    pub name: String,
    /// Event dispatched when the clip completes a pass.
    #[serde(default)]
    pub on_complete_event_name: Option<String>,
    #[serde(default)]
    pub looping: bool,
    /// Authored events are suppressed while the accumulated blend weight of
    /// this clip is below this threshold.
    #[serde(default)]
    pub event_mix_threshold: f32,
}

impl PlayClipDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn on_complete(mut self, event_name: impl Into<String>) -> Self {
        self.on_complete_event_name = Some(event_name.into());
        self
    }

    pub fn event_mix_threshold(mut self, threshold: f32) -> Self {
        self.event_mix_threshold = threshold;
        self
    }
}
