use std::sync::Arc;

use hashbrown::HashSet;
use log::{debug, trace, warn};

use super::{CreateContext, NodeCreateData, NodeInstance, TickContext};
use crate::backend::NetworkBackend;
use crate::definition::StateMachineDefinition;
use crate::types::{clamp01, DonePlaying, SlotBlendMode};
use crate::variables::Variables;

/// Runtime state machine.
///
/// At most two states are live: `new` (the current state) and, while a timed
/// transition is blending, `old` (the state being left). Interrupting a
/// transition with another one drops whatever `old` held; there is no deeper
/// history.
pub struct StateMachineInstance<B: NetworkBackend> {
    def: Arc<StateMachineDefinition>,
    pending_triggers: Vec<String>,
    old: Option<NodeInstance<B>>,
    new: Option<NodeInstance<B>>,
    old_id: Option<String>,
    new_id: Option<String>,
    in_transition_time: f32,
    transition_target_time: f32,
    transition_count: u32,
    slot_blend_mode: SlotBlendMode,
}

impl<B: NetworkBackend> StateMachineInstance<B> {
    pub fn new(
        def: Arc<StateMachineDefinition>,
        ctx: CreateContext<'_, B>,
        create: &NodeCreateData,
    ) -> Self {
        let start = match create.override_default_state.as_deref() {
            Some(state) if def.has_state(state) => state.to_string(),
            _ => def.default_state.clone(),
        };
        let mut instance = Self {
            def,
            pending_triggers: Vec::new(),
            old: None,
            new: None,
            old_id: None,
            new_id: None,
            in_transition_time: 0.0,
            transition_target_time: 0.0,
            transition_count: 0,
            slot_blend_mode: SlotBlendMode::None,
        };
        instance.goto_state(ctx, &start, create);
        instance
    }

    #[inline]
    pub fn definition(&self) -> &Arc<StateMachineDefinition> {
        &self.def
    }

    #[inline]
    pub fn old_node(&self) -> Option<&NodeInstance<B>> {
        self.old.as_ref()
    }

    #[inline]
    pub fn new_node(&self) -> Option<&NodeInstance<B>> {
        self.new.as_ref()
    }

    #[inline]
    pub fn old_id(&self) -> Option<&str> {
        self.old_id.as_deref()
    }

    #[inline]
    pub fn new_id(&self) -> Option<&str> {
        self.new_id.as_deref()
    }

    /// Number of state changes since construction (including the initial one).
    #[inline]
    pub fn transition_count(&self) -> u32 {
        self.transition_count
    }

    #[inline]
    pub fn slot_blend_mode(&self) -> SlotBlendMode {
        self.slot_blend_mode
    }

    #[inline]
    pub fn pending_triggers(&self) -> &[String] {
        &self.pending_triggers
    }

    /// Progress of the current transition in [0, 1]. A zero-length transition
    /// reads as 0.
    #[inline]
    pub fn transition_alpha(&self) -> f32 {
        clamp01(self.in_transition_time / self.transition_target_time)
    }

    /// Both an old and a new state are live.
    #[inline]
    pub fn is_in_state_transition(&self) -> bool {
        self.old.is_some() && self.new.is_some()
    }

    #[inline]
    fn in_transition(&self) -> bool {
        self.is_in_state_transition() && self.in_transition_time < self.transition_target_time
    }

    pub fn current_max_time(&self) -> f32 {
        self.new.as_ref().map_or(0.0, NodeInstance::current_max_time)
    }

    pub fn time_to_event(&self, event_name: &str) -> Option<f32> {
        self.new.as_ref().and_then(|n| n.time_to_event(event_name))
    }

    pub fn all_done_playing(&self) -> DonePlaying {
        [self.new.as_ref(), self.old.as_ref()]
            .into_iter()
            .flatten()
            .fold(DonePlaying::IDLE, |acc, n| acc.combine(n.all_done_playing()))
    }

    pub fn trigger_transition(&mut self, name: &str) {
        self.pending_triggers.push(name.to_string());
        if let Some(new) = self.new.as_mut() {
            new.trigger_transition(name);
        }
    }

    /// Triggers that would currently cause a transition out of the current
    /// state. Condition-only transitions are not listed.
    pub fn viable_triggers(&self, variables: &Variables) -> HashSet<String> {
        let mut out = HashSet::new();
        self.collect_viable_triggers(variables, &mut out);
        out
    }

    pub(crate) fn collect_viable_triggers(&self, variables: &Variables, out: &mut HashSet<String>) {
        let Some(state) = self.new_id.as_deref().and_then(|id| self.def.state(id)) else {
            return;
        };
        for transition in &state.transitions {
            if transition.triggers.is_empty()
                || !variables.all_true(&transition.conditions)
                || !variables.all_false(&transition.negative_conditions)
            {
                continue;
            }
            out.extend(transition.triggers.iter().cloned());
        }
    }

    pub fn tick(
        &mut self,
        ctx: &mut TickContext<'_, B>,
        delta_time_seconds: f32,
        alpha: f32,
        blend_discrete_state: bool,
    ) -> bool {
        self.check_transitions(ctx);

        let mut mix = 1.0;
        if self.in_transition() {
            self.in_transition_time += delta_time_seconds;
            mix = self.transition_alpha();
        }
        if !self.in_transition() {
            self.old = None;
            self.old_id = None;
        }

        let mut ticked = false;
        let old_present = self.old.is_some();
        if let Some(old) = self.old.as_mut() {
            let blend = blend_discrete_state && self.slot_blend_mode.source_blends();
            old.tick(ctx, delta_time_seconds, (1.0 - mix) * alpha, blend);
            ticked = true;
        }
        if let Some(new) = self.new.as_mut() {
            let blend =
                blend_discrete_state && (!old_present || self.slot_blend_mode.target_blends());
            new.tick(ctx, delta_time_seconds, mix * alpha, blend);
            ticked = true;
        }
        ticked
    }

    /// Apply pending triggers (in enqueue order) followed by one
    /// condition-only pass. For each, the first matching transition of the
    /// current state, in authored order, is taken.
    fn check_transitions(&mut self, ctx: &TickContext<'_, B>) {
        let create_ctx = ctx.create_context();
        let Some(current) = self.new_id.clone() else {
            debug!("network {} has no current state, entering default", ctx.label);
            let default_state = self.def.default_state.clone();
            self.goto_state(create_ctx, &default_state, &NodeCreateData::default());
            return;
        };

        let def = Arc::clone(&self.def);
        let mut state = def.state(&current);
        let mut triggers = std::mem::take(&mut self.pending_triggers);
        triggers.push(String::new());

        for trigger in &triggers {
            let Some(current_state) = state else {
                break;
            };
            let mut handled = false;
            for transition in &current_state.transitions {
                let selected = if trigger.is_empty() {
                    transition.triggers.is_empty()
                } else {
                    transition.triggers.contains(trigger)
                };
                if !selected
                    || !ctx.variables.all_true(&transition.conditions)
                    || !ctx.variables.all_false(&transition.negative_conditions)
                {
                    continue;
                }

                let create = NodeCreateData {
                    override_default_state: transition.override_default_state.clone(),
                };
                if self.goto_state(create_ctx, &transition.target, &create) {
                    self.transition_target_time = transition.duration_seconds;
                    self.slot_blend_mode = transition.slot_blend_mode;
                    state = def.state(&transition.target);
                    handled = true;
                    break;
                }
            }

            if handled {
                debug!(
                    "network {} state {} handled trigger '{}'",
                    ctx.label,
                    self.old_id.as_deref().unwrap_or(""),
                    trigger
                );
            } else if !trigger.is_empty() {
                debug!(
                    "network {} state {} dropped trigger '{}'",
                    ctx.label,
                    self.new_id.as_deref().unwrap_or(""),
                    trigger
                );
            }
        }

        triggers.clear();
        self.pending_triggers = triggers;
    }

    /// Make `name` the current state. Returns false, changing nothing, if
    /// `name` is not a state of this machine.
    fn goto_state(&mut self, ctx: CreateContext<'_, B>, name: &str, create: &NodeCreateData) -> bool {
        let def = Arc::clone(&self.def);
        let Some(state) = def.state(name) else {
            warn!(
                "network {} has no state '{}' (from {})",
                ctx.label,
                name,
                self.new_id.as_deref().unwrap_or("<none>")
            );
            return false;
        };

        if self.in_transition() {
            trace!(
                "network {} interrupting transition {} -> {} at alpha {}",
                ctx.label,
                self.old_id.as_deref().unwrap_or("<none>"),
                self.new_id.as_deref().unwrap_or("<none>"),
                self.transition_alpha()
            );
        }

        // The current state always becomes the baseline of the new transition.
        self.old = self.new.take();
        self.old_id = self.new_id.take();

        self.new = Some(state.child.create_instance(ctx, create));
        self.new_id = Some(name.to_string());
        self.in_transition_time = 0.0;
        self.transition_count = self.transition_count.wrapping_add(1);

        trace!(
            "network {} goto {} from {} (count {})",
            ctx.label,
            name,
            self.old_id.as_deref().unwrap_or("<none>"),
            self.transition_count
        );
        true
    }
}
