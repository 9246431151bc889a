#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use vizij_network_core::{
    Config, ContentSlot, EventRecorder, NetworkDefinition, NetworkInstance, NodeInstance,
    StateMachineInstance, Timeline, TimelineData, TimelineLibrary,
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

pub fn network_fixture(key: &str) -> NetworkDefinition {
    let def: NetworkDefinition =
        vizij_test_fixtures::networks::load(key).expect("network fixture");
    def.validate().expect("valid network fixture");
    def
}

pub fn clip_fixture(key: &str) -> TimelineLibrary {
    let mut library: TimelineLibrary =
        vizij_test_fixtures::clip_libraries::load(key).expect("clip fixture");
    library.sort_events();
    library
}

/// Content slots and a recorder behind one network instance, so tests can
/// reload content and inspect events.
pub struct Rig {
    pub handle: Arc<ContentSlot<NetworkDefinition>>,
    pub clips: Arc<ContentSlot<TimelineLibrary>>,
    pub events: Rc<RefCell<EventRecorder>>,
    pub net: NetworkInstance<Timeline>,
}

impl Rig {
    pub fn from_slots(
        cfg: Config,
        handle: Arc<ContentSlot<NetworkDefinition>>,
        clips: Arc<ContentSlot<TimelineLibrary>>,
    ) -> Self {
        init_logging();
        let events = EventRecorder::shared();
        let net = NetworkInstance::new(cfg, handle.clone(), TimelineData::new(clips.clone()))
            .with_event_interface(events.clone());
        Self {
            handle,
            clips,
            events,
            net,
        }
    }

    pub fn loaded(def: NetworkDefinition, clips: TimelineLibrary) -> Self {
        Self::from_slots(
            Config::default(),
            Arc::new(ContentSlot::loaded("test-network", def)),
            Arc::new(ContentSlot::loaded("test-clips", clips)),
        )
    }

    /// Network and clip library from the fixture manifest.
    pub fn fixture(key: &str) -> Self {
        let clips_key = vizij_test_fixtures::networks::clips_key(key)
            .expect("fixture entry")
            .expect("fixture pairs a clip library");
        Self::from_slots(
            Config::default(),
            Arc::new(ContentSlot::loaded(key, network_fixture(key))),
            Arc::new(ContentSlot::loaded(clips_key.as_str(), clip_fixture(&clips_key))),
        )
    }

    pub fn event_names(&self) -> Vec<String> {
        self.events
            .borrow()
            .events()
            .iter()
            .map(|e| e.name.clone())
            .collect()
    }
}

pub fn root_machine(net: &NetworkInstance<Timeline>) -> &StateMachineInstance<Timeline> {
    net.root()
        .and_then(NodeInstance::as_state_machine)
        .expect("root state machine")
}

pub fn clip_time(node: &NodeInstance<Timeline>) -> f32 {
    node.as_play_clip().map(|c| c.clip().time()).expect("play clip")
}
