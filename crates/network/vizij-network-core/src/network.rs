//! Per-entity network driver.
//!
//! A [`NetworkInstance`] owns the live variable tables, the pending trigger
//! queue and the runtime node tree of one playing network. It resolves its
//! definition and data lazily, rebuilding everything when either is reloaded.

use std::fmt;
use std::sync::Arc;

use hashbrown::HashSet;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::backend::{DataInterface, NetworkBackend, StateInterface};
use crate::config::Config;
use crate::definition::NetworkDefinition;
use crate::event::SharedEventInterface;
use crate::instance::{CreateContext, NodeCreateData, NodeInstance, TickContext};
use crate::source::DefinitionSource;
use crate::types::DonePlaying;
use crate::variables::Variables;

/// Lifecycle phase of a [`NetworkInstance`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadyState {
    /// No definition yet.
    Unresolved,
    /// Definition acquired, waiting on data.
    NetworkResolved,
    /// Data acquired, state and root not built yet.
    DataResolved,
    Ready,
}

/// Dominant active state path, e.g. `"Locomotion/Run"`.
///
/// `id` changes whenever any state machine on the path re-enters a state, even
/// if the path string is unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatePath {
    pub path: String,
    pub id: u32,
}

pub struct NetworkInstance<B: NetworkBackend> {
    cfg: Config,
    handle: Arc<dyn DefinitionSource>,
    data: B::Data,
    events: Option<SharedEventInterface>,
    variables: Variables,
    triggers: Vec<String>,
    network: Option<Arc<NetworkDefinition>>,
    state: Option<B::State>,
    root: Option<NodeInstance<B>>,
    timestep_offset: f32,
    load_data_count: Option<u32>,
    load_network_count: Option<u32>,
}

impl<B: NetworkBackend> NetworkInstance<B> {
    pub fn new(cfg: Config, handle: Arc<dyn DefinitionSource>, data: B::Data) -> Self {
        let triggers = Vec::with_capacity(cfg.trigger_capacity);
        Self {
            cfg,
            handle,
            data,
            events: None,
            variables: Variables::new(),
            triggers,
            network: None,
            state: None,
            root: None,
            timestep_offset: 0.0,
            load_data_count: None,
            load_network_count: None,
        }
    }

    pub fn with_event_interface(mut self, events: SharedEventInterface) -> Self {
        self.events = Some(events);
        self
    }

    pub fn set_event_interface(&mut self, events: Option<SharedEventInterface>) {
        self.events = events;
    }

    /// A fresh instance of the same network and content, starting from this
    /// instance's condition and parameter values. The runtime tree is rebuilt
    /// lazily by the clone.
    pub fn clone_instance(&self) -> Self {
        let mut clone = Self::new(
            self.cfg.clone(),
            Arc::clone(&self.handle),
            self.data.clone_interface(),
        );
        clone.events = self.events.clone();
        clone.variables = self.variables.clone();
        clone
    }

    // --- Lifecycle ---

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.root.is_some() && self.state.is_some()
    }

    pub fn ready_state(&self) -> ReadyState {
        if self.is_ready() {
            ReadyState::Ready
        } else if self.network.is_some() && self.data.has_instance() {
            ReadyState::DataResolved
        } else if self.network.is_some() {
            ReadyState::NetworkResolved
        } else {
            ReadyState::Unresolved
        }
    }

    /// Advance resolution as far as currently possible. Returns whether the
    /// instance is ready to tick.
    pub fn check_state(&mut self) -> bool {
        if self.cfg.hot_reload {
            self.check_hot_reload();
        }

        let network = match self.network.as_ref() {
            Some(network) => Arc::clone(network),
            None => {
                let Some(network) = self.handle.get() else {
                    return false;
                };
                self.variables.seed_defaults(&network);
                self.load_network_count = Some(self.handle.total_loads_count());
                self.network = Some(Arc::clone(&network));
                debug!("network {} resolved definition", self.handle.key());
                network
            }
        };

        if !self.data.has_instance() {
            if !self.data.is_loading() {
                self.data.acquire_instance();
            }
            if !self.data.has_instance() {
                return false;
            }
            debug!("network {} resolved data", self.handle.key());
        }
        if self.load_data_count.is_none() {
            self.load_data_count = Some(self.data.total_loads_count());
        }

        if self.state.is_none() {
            let Some(state) = B::create_state(&self.data) else {
                return false;
            };
            self.state = Some(state);
        }

        if self.root.is_none() {
            let Some(root) = network.root.as_ref() else {
                return false;
            };
            let ctx = CreateContext::new(&self.data, self.handle.key());
            self.root = Some(root.create_instance(ctx, &NodeCreateData::default()));
            debug!("network {} ready", self.handle.key());
        }

        true
    }

    fn check_hot_reload(&mut self) {
        let network_stale = self
            .load_network_count
            .is_some_and(|count| count != self.handle.total_loads_count());
        let data_stale = self
            .load_data_count
            .is_some_and(|count| count != self.data.total_loads_count());
        if network_stale || data_stale {
            debug!(
                "network {} reloaded (network: {}, data: {}), rebuilding",
                self.handle.key(),
                network_stale,
                data_stale
            );
            self.reset();
        }
    }

    /// Tear down the runtime tree, state, data and definition. Variables and
    /// queued triggers are kept; the next `check_state` resolves again.
    pub fn reset(&mut self) {
        self.root = None;
        self.state = None;
        self.data.release_instance();
        self.network = None;
        self.load_data_count = None;
        self.load_network_count = None;
    }

    // --- Per-frame ---

    pub fn tick(&mut self, delta_time_seconds: f32) {
        if !self.check_state() {
            return;
        }
        let (Some(root), Some(state)) = (self.root.as_mut(), self.state.as_mut()) else {
            return;
        };

        for trigger in self.triggers.drain(..) {
            root.trigger_transition(&trigger);
        }

        let mut dt = delta_time_seconds;
        if self.timestep_offset != 0.0 {
            dt += self.timestep_offset * root.current_max_time();
            self.timestep_offset = 0.0;
        }

        let advanced = {
            let mut ctx = TickContext {
                variables: &self.variables,
                data: &self.data,
                state: &mut *state,
                events: self.events.as_deref(),
                label: self.handle.key(),
            };
            root.tick(&mut ctx, dt, 1.0, true)
        };
        if advanced {
            state.tick(dt);
        }

        if let Some(events) = self.events.as_ref() {
            events.borrow_mut().tick(dt);
        }
    }

    /// Queue a trigger for the next tick.
    pub fn trigger_transition(&mut self, name: &str) {
        self.triggers.push(name.to_string());
    }

    /// Add a one-shot offset, as a fraction of the current max time, to the
    /// next tick's delta.
    pub fn add_timestep_offset(&mut self, offset: f32) {
        self.timestep_offset += offset;
    }

    // --- Variables ---

    #[inline]
    pub fn condition(&self, name: &str) -> bool {
        self.variables.condition(name)
    }

    pub fn set_condition(&mut self, name: &str, value: bool) {
        self.variables.set_condition(name, value);
    }

    #[inline]
    pub fn parameter(&self, name: &str) -> f32 {
        self.variables.parameter(name)
    }

    pub fn set_parameter(&mut self, name: &str, value: f32) {
        self.variables.set_parameter(name, value);
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    // --- Queries ---

    pub fn current_max_time(&self) -> f32 {
        self.root.as_ref().map_or(0.0, NodeInstance::current_max_time)
    }

    pub fn time_to_event(&self, event_name: &str) -> Option<f32> {
        self.root.as_ref().and_then(|r| r.time_to_event(event_name))
    }

    /// Not-ready networks report neither done nor looping.
    pub fn all_done_playing(&self) -> DonePlaying {
        self.root.as_ref().map_or(
            DonePlaying {
                done: false,
                looping: false,
            },
            NodeInstance::all_done_playing,
        )
    }

    pub fn is_in_state_transition(&self) -> bool {
        self.root
            .as_ref()
            .is_some_and(NodeInstance::is_in_state_transition)
    }

    pub fn active_state_path(&self) -> StatePath {
        let Some(root) = self.root.as_ref() else {
            return StatePath::default();
        };
        let mut names = Vec::new();
        let mut id = 0;
        root.append_state_path(&self.variables, &mut names, &mut id);
        StatePath {
            path: names.join("/"),
            id,
        }
    }

    /// Triggers that would cause a transition in any active state machine.
    pub fn viable_triggers(&self) -> HashSet<String> {
        let mut out = HashSet::new();
        if let Some(root) = self.root.as_ref() {
            root.collect_viable_triggers(&self.variables, &mut out);
        }
        out
    }

    // --- Accessors ---

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn network_handle(&self) -> &Arc<dyn DefinitionSource> {
        &self.handle
    }

    pub fn network(&self) -> Option<&Arc<NetworkDefinition>> {
        self.network.as_ref()
    }

    pub fn root(&self) -> Option<&NodeInstance<B>> {
        self.root.as_ref()
    }

    pub fn state(&self) -> Option<&B::State> {
        self.state.as_ref()
    }

    pub fn data(&self) -> &B::Data {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut B::Data {
        &mut self.data
    }

    pub fn pending_triggers(&self) -> &[String] {
        &self.triggers
    }

    pub fn timestep_offset(&self) -> f32 {
        self.timestep_offset
    }

    /// Data load generation observed when the data was acquired.
    pub fn load_data_count(&self) -> Option<u32> {
        self.load_data_count
    }

    /// Definition load generation observed when the definition was resolved.
    pub fn load_network_count(&self) -> Option<u32> {
        self.load_network_count
    }
}

impl<B: NetworkBackend> Drop for NetworkInstance<B> {
    fn drop(&mut self) {
        self.root = None;
        self.state = None;
        self.data.release_instance();
    }
}

impl<B: NetworkBackend> fmt::Debug for NetworkInstance<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkInstance")
            .field("key", &self.handle.key())
            .field("ready_state", &self.ready_state())
            .field("variables", &self.variables)
            .field("triggers", &self.triggers)
            .field("timestep_offset", &self.timestep_offset)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{
        BlendDefinition, NetworkDefinitionParameter, PlayClipDefinition, StateMachineDefinition,
        StateMachineState, StateMachineTransition,
    };
    use crate::source::ContentSlot;
    use crate::timeline::{Timeline, TimelineClipData, TimelineData, TimelineLibrary};

    fn library() -> TimelineLibrary {
        TimelineLibrary::default()
            .with_clip("idle", TimelineClipData::new(2.0))
            .with_clip("run", TimelineClipData::new(1.0))
            .with_clip("aim", TimelineClipData::new(1.0))
    }

    fn definition() -> NetworkDefinition {
        let locomotion = StateMachineDefinition::new("Idle")
            .with_state(
                "Idle",
                StateMachineState::new(PlayClipDefinition::new("idle").looping(true))
                    .with_transition(StateMachineTransition::to("Run").on_trigger("go")),
            )
            .with_state(
                "Run",
                StateMachineState::new(PlayClipDefinition::new("run").looping(true))
                    .with_transition(StateMachineTransition::to("Idle").on_trigger("stop").unless("Moving")),
            );
        let root = BlendDefinition::new(
            Some(locomotion.into()),
            Some(PlayClipDefinition::new("aim").looping(true).into()),
            "Aim",
        );
        NetworkDefinition::new(root)
            .with_condition("Moving", true)
            .with_parameter("Aim", NetworkDefinitionParameter::new(0.0, 1.0, 0.0))
    }

    fn instance() -> NetworkInstance<Timeline> {
        let handle = Arc::new(ContentSlot::loaded("net", definition()));
        let data = TimelineData::new(Arc::new(ContentSlot::loaded("clips", library())));
        NetworkInstance::new(Config::default(), handle, data)
    }

    #[test]
    fn resolves_in_one_check_when_content_is_loaded() {
        let mut net = instance();
        assert_eq!(net.ready_state(), ReadyState::Unresolved);
        assert!(net.check_state());
        assert_eq!(net.ready_state(), ReadyState::Ready);
        assert_eq!(net.load_network_count(), Some(1));
        assert_eq!(net.load_data_count(), Some(1));
        assert!(net.condition("Moving"));
    }

    #[test]
    fn state_path_follows_the_heavier_blend_child() {
        let mut net = instance();
        net.tick(0.016);
        let before = net.active_state_path();
        assert_eq!(before.path, "Idle");

        net.trigger_transition("go");
        net.tick(0.016);
        let after = net.active_state_path();
        assert_eq!(after.path, "Run");
        assert_ne!(before.id, after.id);

        // Mix >= 0.5 follows the plain clip, which has no states.
        net.set_parameter("Aim", 0.75);
        assert_eq!(net.active_state_path().path, "");
    }

    #[test]
    fn viable_triggers_cover_nested_machines() {
        let mut net = instance();
        net.tick(0.016);
        assert_eq!(net.viable_triggers().into_iter().collect::<Vec<_>>(), vec!["go"]);

        net.trigger_transition("go");
        net.tick(0.016);
        assert!(net.viable_triggers().is_empty());

        net.set_condition("Moving", false);
        assert!(net.viable_triggers().contains("stop"));
    }

    #[test]
    fn not_ready_queries_degrade_to_defaults() {
        let handle = Arc::new(ContentSlot::<NetworkDefinition>::new("pending"));
        let data = TimelineData::new(Arc::new(ContentSlot::new("clips")));
        let mut net: NetworkInstance<Timeline> = NetworkInstance::new(Config::default(), handle, data);
        net.tick(0.1);

        assert!(!net.is_ready());
        assert_eq!(net.current_max_time(), 0.0);
        assert_eq!(net.time_to_event("x"), None);
        assert!(!net.all_done_playing().done);
        assert!(!net.is_in_state_transition());
        assert_eq!(net.active_state_path(), StatePath::default());
    }

    #[test]
    fn reset_returns_to_unresolved_and_keeps_variables() {
        let mut net = instance();
        assert!(net.check_state());
        net.set_condition("Moving", false);
        net.reset();
        assert_eq!(net.ready_state(), ReadyState::Unresolved);
        assert!(!net.data().has_instance());
        assert!(net.check_state());
        assert!(!net.condition("Moving"));
    }
}
