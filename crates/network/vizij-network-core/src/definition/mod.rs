//! Immutable, shared network definitions.
//!
//! A [`NetworkDefinition`] is loaded once and shared (via `Arc`) by every
//! [`NetworkInstance`](crate::network::NetworkInstance) playing it. Node
//! definitions form a tree of [`NodeDefinition`] values; each variant holds its
//! payload behind an `Arc` so runtime instances can keep a cheap handle to the
//! definition that produced them.

mod blend;
mod network;
mod play_clip;
mod state_machine;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::backend::NetworkBackend;
use crate::instance::{
    BlendInstance, CreateContext, NodeCreateData, NodeInstance, PlayClipInstance,
    StateMachineInstance,
};
use crate::types::NodeType;

pub use blend::BlendDefinition;
pub use network::{NetworkDefinition, NetworkDefinitionParameter};
pub use play_clip::PlayClipDefinition;
pub use state_machine::{StateMachineDefinition, StateMachineState, StateMachineTransition};

/// One authored node of a network graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeDefinition {
    PlayClip(Arc<PlayClipDefinition>),
    Blend(Arc<BlendDefinition>),
    StateMachine(Arc<StateMachineDefinition>),
}

impl NodeDefinition {
    #[inline]
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeDefinition::PlayClip(_) => NodeType::PlayClip,
            NodeDefinition::Blend(_) => NodeType::Blend,
            NodeDefinition::StateMachine(_) => NodeType::StateMachine,
        }
    }

    /// Manufacture the runtime counterpart of this definition (and, recursively,
    /// of its children).
    pub fn create_instance<B: NetworkBackend>(
        &self,
        ctx: CreateContext<'_, B>,
        create: &NodeCreateData,
    ) -> NodeInstance<B> {
        match self {
            NodeDefinition::PlayClip(def) => {
                NodeInstance::PlayClip(PlayClipInstance::new(Arc::clone(def), ctx, create))
            }
            NodeDefinition::Blend(def) => {
                NodeInstance::Blend(Box::new(BlendInstance::new(Arc::clone(def), ctx, create)))
            }
            NodeDefinition::StateMachine(def) => NodeInstance::StateMachine(Box::new(
                StateMachineInstance::new(Arc::clone(def), ctx, create),
            )),
        }
    }
}

impl From<PlayClipDefinition> for NodeDefinition {
    fn from(def: PlayClipDefinition) -> Self {
        NodeDefinition::PlayClip(Arc::new(def))
    }
}

impl From<BlendDefinition> for NodeDefinition {
    fn from(def: BlendDefinition) -> Self {
        NodeDefinition::Blend(Arc::new(def))
    }
}

impl From<StateMachineDefinition> for NodeDefinition {
    fn from(def: StateMachineDefinition) -> Self {
        NodeDefinition::StateMachine(Arc::new(def))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_json_is_tagged_by_type() {
        let raw = r#"{
            "type": "blend",
            "child_a": { "type": "play_clip", "name": "Walk", "looping": true },
            "child_b": { "type": "play_clip", "name": "Run" },
            "mix_parameter_id": "Speed",
            "synchronize_time": true
        }"#;
        let node: NodeDefinition = serde_json::from_str(raw).expect("node json");
        assert_eq!(node.node_type(), NodeType::Blend);
        let NodeDefinition::Blend(blend) = &node else {
            panic!("expected blend");
        };
        assert!(blend.synchronize_time);
        assert_eq!(blend.mix_parameter_id, "Speed");
        match blend.child_a.as_ref() {
            Some(NodeDefinition::PlayClip(clip)) => {
                assert_eq!(clip.name, "Walk");
                assert!(clip.looping);
            }
            other => panic!("unexpected child a {other:?}"),
        }
        assert_eq!(
            blend.child_b.as_ref().map(NodeDefinition::node_type),
            Some(NodeType::PlayClip)
        );
    }
}
