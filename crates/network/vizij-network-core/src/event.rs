//! Event sink for node-dispatched named events.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Receives events dispatched by clip instances (authored clip events and
/// completion events).
pub trait EventInterface {
    fn dispatch_event(&mut self, name: &str, int_arg: i32, float_arg: f32, string_arg: &str);

    /// Called once per network tick, after all graph processing.
    fn tick(&mut self, _delta_time_seconds: f32) {}
}

/// Event interface shared between a network instance and its clones.
pub type SharedEventInterface = Rc<RefCell<dyn EventInterface>>;

/// One dispatched event, as captured by [`EventRecorder`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkEvent {
    pub name: String,
    pub int_arg: i32,
    pub float_arg: f32,
    pub string_arg: String,
}

/// Event interface that records everything it receives.
#[derive(Clone, Debug, Default)]
pub struct EventRecorder {
    events: Vec<NetworkEvent>,
    ticks: u32,
    elapsed: f32,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience for building a recorder already wrapped for sharing. The
    /// typed handle stays usable for inspection; pass a clone of it to
    /// [`NetworkInstance::set_event_interface`](crate::network::NetworkInstance::set_event_interface).
    pub fn shared() -> Rc<RefCell<EventRecorder>> {
        Rc::new(RefCell::new(EventRecorder::new()))
    }

    pub fn events(&self) -> &[NetworkEvent] {
        &self.events
    }

    pub fn names(&self) -> Vec<&str> {
        self.events.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.events.iter().filter(|e| e.name == name).count()
    }

    pub fn take(&mut self) -> Vec<NetworkEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of `tick` calls received.
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

impl EventInterface for EventRecorder {
    fn dispatch_event(&mut self, name: &str, int_arg: i32, float_arg: f32, string_arg: &str) {
        self.events.push(NetworkEvent {
            name: name.to_string(),
            int_arg,
            float_arg,
            string_arg: string_arg.to_string(),
        });
    }

    fn tick(&mut self, delta_time_seconds: f32) {
        self.ticks += 1;
        self.elapsed += delta_time_seconds;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_captures_events_and_ticks() {
        let recorder = EventRecorder::shared();
        let sink: SharedEventInterface = recorder.clone();
        sink.borrow_mut().dispatch_event("boom", 3, 0.5, "left");
        sink.borrow_mut().tick(0.25);

        let r = recorder.borrow();
        assert_eq!(r.names(), vec!["boom"]);
        assert_eq!(r.events()[0].int_arg, 3);
        assert_eq!(r.events()[0].string_arg, "left");
        assert_eq!(r.ticks(), 1);
        assert_eq!(r.elapsed(), 0.25);
    }
}
