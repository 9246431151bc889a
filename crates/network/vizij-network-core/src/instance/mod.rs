//! Runtime node instances.
//!
//! A [`NodeInstance`] tree mirrors the [`NodeDefinition`](crate::definition::NodeDefinition)
//! tree it was created from. Instances are exclusively owned by one
//! [`NetworkInstance`](crate::network::NetworkInstance) and are rebuilt from
//! scratch whenever the network is (re)resolved.

mod blend;
mod play_clip;
mod state_machine;

use std::cell::RefCell;

use hashbrown::HashSet;

use crate::backend::NetworkBackend;
use crate::event::EventInterface;
use crate::types::{DonePlaying, NodeType};
use crate::variables::Variables;

pub use blend::BlendInstance;
pub use play_clip::PlayClipInstance;
pub use state_machine::StateMachineInstance;

/// Creation-time options handed down a freshly instantiated subtree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeCreateData {
    /// Start state for state machines in the subtree, used when it names one
    /// of their states.
    pub override_default_state: Option<String>,
}

impl NodeCreateData {
    pub fn with_override(state: impl Into<String>) -> Self {
        Self {
            override_default_state: Some(state.into()),
        }
    }
}

/// What node constructors may read.
pub struct CreateContext<'a, B: NetworkBackend> {
    pub data: &'a B::Data,
    /// Key of the owning network, for diagnostics.
    pub label: &'a str,
}

impl<'a, B: NetworkBackend> CreateContext<'a, B> {
    pub fn new(data: &'a B::Data, label: &'a str) -> Self {
        Self { data, label }
    }
}

impl<B: NetworkBackend> Clone for CreateContext<'_, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: NetworkBackend> Copy for CreateContext<'_, B> {}

/// Per-tick view of the owning network handed down the node tree.
pub struct TickContext<'a, B: NetworkBackend> {
    pub variables: &'a Variables,
    pub data: &'a B::Data,
    pub state: &'a mut B::State,
    pub events: Option<&'a RefCell<dyn EventInterface>>,
    pub label: &'a str,
}

impl<'a, B: NetworkBackend> TickContext<'a, B> {
    /// Context for instantiating nodes mid-tick (state changes).
    #[inline]
    pub fn create_context(&self) -> CreateContext<'a, B> {
        CreateContext {
            data: self.data,
            label: self.label,
        }
    }

    /// Forward an event to the network's event interface, if any.
    pub fn dispatch_event(&self, name: &str, int_arg: i32, float_arg: f32, string_arg: &str) {
        if let Some(events) = self.events {
            events
                .borrow_mut()
                .dispatch_event(name, int_arg, float_arg, string_arg);
        }
    }
}

/// A runtime graph node.
pub enum NodeInstance<B: NetworkBackend> {
    PlayClip(PlayClipInstance<B>),
    Blend(Box<BlendInstance<B>>),
    StateMachine(Box<StateMachineInstance<B>>),
}

impl<B: NetworkBackend> NodeInstance<B> {
    #[inline]
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeInstance::PlayClip(_) => NodeType::PlayClip,
            NodeInstance::Blend(_) => NodeType::Blend,
            NodeInstance::StateMachine(_) => NodeType::StateMachine,
        }
    }

    /// Duration of the current clip (or the widest active child); 0.0 when
    /// unmeasurable.
    pub fn current_max_time(&self) -> f32 {
        match self {
            NodeInstance::PlayClip(n) => n.current_max_time(),
            NodeInstance::Blend(n) => n.current_max_time(),
            NodeInstance::StateMachine(n) => n.current_max_time(),
        }
    }

    /// Time until the named event next fires from the current playhead.
    ///
    /// Future blend weights and future state transitions are not accounted
    /// for.
    pub fn time_to_event(&self, event_name: &str) -> Option<f32> {
        match self {
            NodeInstance::PlayClip(n) => n.time_to_event(event_name),
            NodeInstance::Blend(n) => n.time_to_event(event_name),
            NodeInstance::StateMachine(n) => n.time_to_event(event_name),
        }
    }

    pub fn all_done_playing(&self) -> DonePlaying {
        match self {
            NodeInstance::PlayClip(n) => n.all_done_playing(),
            NodeInstance::Blend(n) => n.all_done_playing(),
            NodeInstance::StateMachine(n) => n.all_done_playing(),
        }
    }

    pub fn is_in_state_transition(&self) -> bool {
        match self {
            NodeInstance::PlayClip(_) => false,
            NodeInstance::Blend(n) => n.is_in_state_transition(),
            NodeInstance::StateMachine(n) => n.is_in_state_transition(),
        }
    }

    /// Queue a trigger on every reachable state machine. Applied on the next
    /// tick.
    pub fn trigger_transition(&mut self, name: &str) {
        match self {
            NodeInstance::PlayClip(_) => {}
            NodeInstance::Blend(n) => n.trigger_transition(name),
            NodeInstance::StateMachine(n) => n.trigger_transition(name),
        }
    }

    /// Advance this subtree. `alpha` is the accumulated weight from ancestors;
    /// `blend_discrete_state` gates application of discrete slot state.
    /// Returns true if pose-affecting data advanced.
    pub fn tick(
        &mut self,
        ctx: &mut TickContext<'_, B>,
        delta_time_seconds: f32,
        alpha: f32,
        blend_discrete_state: bool,
    ) -> bool {
        match self {
            NodeInstance::PlayClip(n) => {
                n.tick(ctx, delta_time_seconds, alpha, blend_discrete_state)
            }
            NodeInstance::Blend(n) => n.tick(ctx, delta_time_seconds, alpha, blend_discrete_state),
            NodeInstance::StateMachine(n) => {
                n.tick(ctx, delta_time_seconds, alpha, blend_discrete_state)
            }
        }
    }

    pub fn as_play_clip(&self) -> Option<&PlayClipInstance<B>> {
        match self {
            NodeInstance::PlayClip(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_blend(&self) -> Option<&BlendInstance<B>> {
        match self {
            NodeInstance::Blend(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_state_machine(&self) -> Option<&StateMachineInstance<B>> {
        match self {
            NodeInstance::StateMachine(n) => Some(n),
            _ => None,
        }
    }

    pub(crate) fn collect_viable_triggers(&self, variables: &Variables, out: &mut HashSet<String>) {
        match self {
            NodeInstance::PlayClip(_) => {}
            NodeInstance::Blend(n) => {
                for child in [n.child_a(), n.child_b()].into_iter().flatten() {
                    child.collect_viable_triggers(variables, out);
                }
            }
            NodeInstance::StateMachine(n) => {
                n.collect_viable_triggers(variables, out);
                if let Some(child) = n.new_node() {
                    child.collect_viable_triggers(variables, out);
                }
            }
        }
    }

    /// Walk the dominant path: a state machine's current state, a blend's
    /// heavier child.
    pub(crate) fn append_state_path(
        &self,
        variables: &Variables,
        path: &mut Vec<String>,
        id: &mut u32,
    ) {
        match self {
            NodeInstance::PlayClip(_) => {}
            NodeInstance::Blend(n) => {
                let prefer_b = n.current_mix(variables) >= 0.5;
                let (first, second) = if prefer_b {
                    (n.child_b(), n.child_a())
                } else {
                    (n.child_a(), n.child_b())
                };
                if let Some(child) = first.or(second) {
                    child.append_state_path(variables, path, id);
                }
            }
            NodeInstance::StateMachine(n) => {
                let Some(name) = n.new_id() else {
                    return;
                };
                path.push(name.to_string());
                hash_combine(id, n.transition_count());
                if let Some(child) = n.new_node() {
                    child.append_state_path(variables, path, id);
                }
            }
        }
    }
}

#[inline]
pub(crate) fn hash_combine(seed: &mut u32, value: u32) {
    *seed ^= value
        .wrapping_add(0x9e37_79b9)
        .wrapping_add(*seed << 6)
        .wrapping_add(*seed >> 2);
}
