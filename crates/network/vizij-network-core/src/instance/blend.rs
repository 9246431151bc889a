use std::sync::Arc;

use super::{CreateContext, NodeCreateData, NodeInstance, TickContext};
use crate::backend::NetworkBackend;
use crate::definition::BlendDefinition;
use crate::types::DonePlaying;
use crate::variables::Variables;

/// Runtime two-input blend.
pub struct BlendInstance<B: NetworkBackend> {
    def: Arc<BlendDefinition>,
    child_a: Option<NodeInstance<B>>,
    child_b: Option<NodeInstance<B>>,
}

impl<B: NetworkBackend> BlendInstance<B> {
    pub fn new(def: Arc<BlendDefinition>, ctx: CreateContext<'_, B>, create: &NodeCreateData) -> Self {
        let child_a = def.child_a.as_ref().map(|c| c.create_instance(ctx, create));
        let child_b = def.child_b.as_ref().map(|c| c.create_instance(ctx, create));
        Self {
            def,
            child_a,
            child_b,
        }
    }

    #[inline]
    pub fn definition(&self) -> &Arc<BlendDefinition> {
        &self.def
    }

    #[inline]
    pub fn child_a(&self) -> Option<&NodeInstance<B>> {
        self.child_a.as_ref()
    }

    #[inline]
    pub fn child_b(&self) -> Option<&NodeInstance<B>> {
        self.child_b.as_ref()
    }

    /// Current value of the mix parameter (unclamped, 0.0 if unset).
    #[inline]
    pub fn current_mix(&self, variables: &Variables) -> f32 {
        variables.parameter(&self.def.mix_parameter_id)
    }

    pub fn current_max_time(&self) -> f32 {
        let a = self.child_a.as_ref().map_or(0.0, NodeInstance::current_max_time);
        let b = self.child_b.as_ref().map_or(0.0, NodeInstance::current_max_time);
        a.max(b)
    }

    pub fn time_to_event(&self, event_name: &str) -> Option<f32> {
        let a = self.child_a.as_ref().and_then(|c| c.time_to_event(event_name));
        let b = self.child_b.as_ref().and_then(|c| c.time_to_event(event_name));
        match (a, b) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn all_done_playing(&self) -> DonePlaying {
        [self.child_a.as_ref(), self.child_b.as_ref()]
            .into_iter()
            .flatten()
            .fold(DonePlaying::IDLE, |acc, c| acc.combine(c.all_done_playing()))
    }

    pub fn is_in_state_transition(&self) -> bool {
        self.child_a.as_ref().is_some_and(NodeInstance::is_in_state_transition)
            || self.child_b.as_ref().is_some_and(NodeInstance::is_in_state_transition)
    }

    pub fn trigger_transition(&mut self, name: &str) {
        if let Some(a) = self.child_a.as_mut() {
            a.trigger_transition(name);
        }
        if let Some(b) = self.child_b.as_mut() {
            b.trigger_transition(name);
        }
    }

    pub fn tick(
        &mut self,
        ctx: &mut TickContext<'_, B>,
        delta_time_seconds: f32,
        alpha: f32,
        blend_discrete_state: bool,
    ) -> bool {
        let mix = self.current_mix(ctx.variables);

        let mut dt_a = delta_time_seconds;
        let mut dt_b = delta_time_seconds;
        if self.def.synchronize_time {
            if let (Some(a), Some(b)) = (self.child_a.as_ref(), self.child_b.as_ref()) {
                let time_a = a.current_max_time();
                let time_b = b.current_max_time();
                let target = time_a + (time_b - time_a) * mix;
                if target > 0.0 {
                    dt_a = delta_time_seconds * (time_a / target);
                    dt_b = delta_time_seconds * (time_b / target);
                }
            }
        }

        // Both children tick every frame; no short-circuit.
        let mut advanced = false;
        if let Some(a) = self.child_a.as_mut() {
            advanced |= a.tick(ctx, dt_a, (1.0 - mix) * alpha, blend_discrete_state);
        }
        if let Some(b) = self.child_b.as_mut() {
            advanced |= b.tick(ctx, dt_b, mix * alpha, blend_discrete_state);
        }
        advanced
    }
}
