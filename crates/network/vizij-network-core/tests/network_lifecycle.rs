mod common;

use std::sync::Arc;

use common::{approx, clip_fixture, clip_time, network_fixture, root_machine, Rig};
use vizij_network_core::{
    ClipEvent, Config, ContentSlot, DataInterface, NetworkDefinition, PlayClipDefinition,
    ReadyState, StateInterface, TimelineClipData, TimelineLibrary,
};

// --- Resolution ---

#[test]
fn it_should_resolve_in_phases_as_content_arrives() {
    let handle = Arc::new(ContentSlot::<NetworkDefinition>::new("idle-run"));
    let clips = Arc::new(ContentSlot::<TimelineLibrary>::new("basic"));
    let mut rig = Rig::from_slots(Config::default(), handle.clone(), clips.clone());

    handle.begin_load();
    assert!(!rig.net.check_state());
    assert_eq!(rig.net.ready_state(), ReadyState::Unresolved);

    handle.store(network_fixture("idle-run"));
    clips.begin_load();
    assert!(!rig.net.check_state());
    assert_eq!(rig.net.ready_state(), ReadyState::NetworkResolved);
    assert!(!rig.net.data().has_instance());

    clips.store(clip_fixture("basic"));
    assert!(rig.net.check_state());
    assert_eq!(rig.net.ready_state(), ReadyState::Ready);
    assert!(rig.net.is_ready());
    assert_eq!(root_machine(&rig.net).new_id(), Some("Idle"));
}

#[test]
fn it_should_never_leave_unresolved_when_the_load_fails() {
    let handle = Arc::new(ContentSlot::<NetworkDefinition>::new("broken"));
    let clips = Arc::new(ContentSlot::loaded("basic", clip_fixture("basic")));
    let mut rig = Rig::from_slots(Config::default(), handle.clone(), clips);

    handle.begin_load();
    handle.fail_load();
    for _ in 0..3 {
        rig.net.tick(0.1);
    }
    assert_eq!(rig.net.ready_state(), ReadyState::Unresolved);
    assert!(rig.event_names().is_empty());
    assert_eq!(rig.events.borrow().ticks(), 0);
}

#[test]
fn it_should_keep_caller_values_when_seeding_defaults() {
    let def = network_fixture("locomotion");
    let mut rig = Rig::loaded(def, clip_fixture("basic"));

    rig.net.set_condition("Grounded", false);
    rig.net.set_parameter("Speed", 0.75);
    for _ in 0..3 {
        assert!(rig.net.check_state());
    }

    assert!(!rig.net.condition("Grounded"));
    assert!(!rig.net.condition("Moving"));
    approx(rig.net.parameter("Speed"), 0.75, 1e-6);
}

#[test]
fn it_should_hold_triggers_until_ready() {
    let handle = Arc::new(ContentSlot::<NetworkDefinition>::new("idle-run"));
    let clips = Arc::new(ContentSlot::loaded("basic", clip_fixture("basic")));
    let mut rig = Rig::from_slots(Config::default(), handle.clone(), clips);

    rig.net.trigger_transition("go");
    rig.net.tick(0.016);
    assert_eq!(rig.net.pending_triggers(), ["go".to_string()]);

    handle.store(network_fixture("idle-run"));
    rig.net.tick(0.016);
    assert!(rig.net.pending_triggers().is_empty());
    assert_eq!(root_machine(&rig.net).new_id(), Some("Run"));
}

// --- Hot reload ---

#[test]
fn it_should_rebuild_when_clip_data_reloads() {
    let mut rig = Rig::fixture("idle-run");
    rig.net.trigger_transition("go");
    rig.net.tick(0.5);
    assert_eq!(root_machine(&rig.net).new_id(), Some("Run"));
    assert_eq!(root_machine(&rig.net).transition_count(), 2);
    assert_eq!(rig.net.load_data_count(), Some(1));

    rig.clips.store(clip_fixture("basic"));
    assert!(rig.net.check_state());

    let machine = root_machine(&rig.net);
    assert_eq!(machine.new_id(), Some("Idle"));
    assert_eq!(machine.transition_count(), 1);
    assert_eq!(rig.net.load_data_count(), Some(2));
    assert_eq!(rig.net.state().map(|s| s.tick_count()), Some(0));
}

#[test]
fn it_should_rebuild_from_the_new_definition_when_the_network_reloads() {
    let mut rig = Rig::fixture("idle-run");
    rig.net.tick(0.1);
    let before = rig.net.network().cloned().expect("definition");

    let mut raw = network_fixture("idle-run");
    if let Some(vizij_network_core::NodeDefinition::StateMachine(sm)) = raw.root.as_mut() {
        Arc::make_mut(sm).default_state = "Run".into();
    }
    rig.handle.store(raw);
    rig.net.tick(0.1);

    let after = rig.net.network().cloned().expect("definition");
    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(rig.net.load_network_count(), Some(2));
    assert_eq!(rig.net.active_state_path().path, "Run");
}

#[test]
fn it_should_ignore_reloads_when_hot_reload_is_disabled() {
    let cfg = Config {
        hot_reload: false,
        ..Config::default()
    };
    let handle = Arc::new(ContentSlot::loaded("idle-run", network_fixture("idle-run")));
    let clips = Arc::new(ContentSlot::loaded("basic", clip_fixture("basic")));
    let mut rig = Rig::from_slots(cfg, handle, clips);

    rig.net.trigger_transition("go");
    rig.net.tick(0.5);
    rig.clips.store(clip_fixture("basic"));
    rig.net.tick(0.1);

    let machine = root_machine(&rig.net);
    assert_eq!(machine.new_id(), Some("Run"));
    assert_eq!(machine.transition_count(), 2);
    assert_eq!(rig.net.load_data_count(), Some(1));
}

// --- Tick ordering ---

#[test]
fn it_should_tick_state_only_when_the_graph_advances() {
    let mut rig = Rig::fixture("attack-events");
    for _ in 0..4 {
        rig.net.tick(0.5);
    }

    // Attack is one second long: only the first two ticks advance it.
    assert_eq!(rig.net.state().map(|s| s.tick_count()), Some(2));
    assert_eq!(rig.events.borrow().ticks(), 4);
    approx(rig.events.borrow().elapsed(), 2.0, 1e-6);
    assert_eq!(rig.event_names(), vec!["boom", "attack_done"]);
}

#[test]
fn it_should_apply_a_one_shot_timestep_offset() {
    let mut rig = Rig::fixture("idle-run");
    rig.net.add_timestep_offset(0.25);
    rig.net.add_timestep_offset(0.25);
    approx(rig.net.timestep_offset(), 0.5, 1e-6);

    // Idle is two seconds long, so the offset adds one second.
    rig.net.tick(0.1);
    let idle = root_machine(&rig.net).new_node().expect("current state");
    approx(clip_time(idle), 1.1, 1e-5);
    assert_eq!(rig.net.timestep_offset(), 0.0);

    rig.net.tick(0.1);
    let idle = root_machine(&rig.net).new_node().expect("current state");
    approx(clip_time(idle), 1.2, 1e-5);
}

#[test]
fn it_should_publish_pose_weights_through_the_state() {
    let mut rig = Rig::fixture("idle-run");
    rig.net.tick(0.1);
    let state = rig.net.state().expect("state");
    assert_eq!(state.weight("idle"), 1.0);
    assert_eq!(state.discrete_owner(), Some("idle"));
    assert_eq!(state.pose().len(), 1);

    let mut detached = state.clone();
    detached.tick(0.0);
    assert!(detached.pose().is_empty());
}

#[test]
fn it_should_finish_large_ticks_on_tiny_looping_clips() {
    let def = NetworkDefinition::new(
        PlayClipDefinition::new("blink")
            .looping(true)
            .on_complete("blinked"),
    );
    let clips = TimelineLibrary::default().with_clip(
        "blink",
        TimelineClipData::new(0.0001).with_event(ClipEvent::new(0.00005, "lid")),
    );
    let mut rig = Rig::loaded(def, clips);

    rig.net.tick(1.0 / 60.0);
    rig.net.tick(3600.0);

    let time = rig.net.root().map(clip_time).expect("root clip");
    assert!((0.0..0.0001).contains(&time), "time={time}");
    assert_eq!(rig.events.borrow().count("blinked"), 4);
    assert!(rig.net.all_done_playing().looping);
}

// --- Cloning ---

#[test]
fn it_should_clone_variables_but_not_runtime_state() {
    let mut rig = Rig::fixture("locomotion");
    rig.net.set_condition("Moving", true);
    rig.net.set_parameter("Speed", 0.4);
    rig.net.tick(0.5);
    assert_eq!(root_machine(&rig.net).new_id(), Some("Move"));

    let mut clone = rig.net.clone_instance();
    assert!(!clone.is_ready());
    assert!(clone.condition("Moving"));
    approx(clone.parameter("Speed"), 0.4, 1e-6);
    assert!(!clone.data().has_instance());

    clone.tick(0.016);
    assert!(clone.is_ready());
    assert_eq!(root_machine(&clone).new_id(), Some("Move"));
    assert_eq!(root_machine(&clone).transition_count(), 2);

    clone.set_condition("Moving", false);
    assert!(rig.net.condition("Moving"));
}

#[test]
fn it_should_share_the_event_interface_with_clones() {
    let mut rig = Rig::fixture("attack-events");
    let mut clone = rig.net.clone_instance();
    clone.add_timestep_offset(0.6);

    rig.net.tick(0.6);
    clone.tick(0.0);

    assert_eq!(rig.event_names(), vec!["boom", "boom"]);
    assert_eq!(rig.events.borrow().ticks(), 2);
}

// --- Diagnostics ---

#[test]
fn it_should_report_path_and_viable_triggers_through_nested_nodes() {
    let mut rig = Rig::fixture("locomotion");
    rig.net.tick(0.016);
    assert_eq!(rig.net.active_state_path().path, "Idle");
    let viable = rig.net.viable_triggers();
    assert!(viable.contains("jump"));
    assert_eq!(viable.len(), 1);

    rig.net.set_condition("Grounded", false);
    assert!(rig.net.viable_triggers().is_empty());

    rig.net.set_condition("Grounded", true);
    rig.net.trigger_transition("jump");
    rig.net.tick(0.016);
    let path = rig.net.active_state_path();
    assert_eq!(path.path, "Jump");
    assert!(rig.net.viable_triggers().contains("land"));
}
