//! Reference backend: keyframe-free timelines with authored events.
//!
//! Clips are just a duration plus an ordered list of events, which is enough
//! to drive every timing, event and completion query of the runtime without a
//! real skeleton. [`TimelineState`] records the weight each clip was applied
//! with, so blends and transitions can be observed.

use std::sync::Arc;

use hashbrown::HashMap;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::backend::{ClipInstance, DataInterface, NetworkBackend, StateInterface};
use crate::definition::PlayClipDefinition;
use crate::error::NetworkError;
use crate::instance::{CreateContext, NodeCreateData, TickContext};
use crate::source::ContentSlot;
use crate::types::DonePlaying;

/// One authored clip event.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClipEvent {
    pub time: f32,
    pub name: String,
    #[serde(default)]
    pub int_arg: i32,
    #[serde(default)]
    pub float_arg: f32,
    #[serde(default)]
    pub string_arg: String,
}

impl ClipEvent {
    pub fn new(time: f32, name: impl Into<String>) -> Self {
        Self {
            time,
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_args(mut self, int_arg: i32, float_arg: f32, string_arg: impl Into<String>) -> Self {
        self.int_arg = int_arg;
        self.float_arg = float_arg;
        self.string_arg = string_arg.into();
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineClipData {
    pub duration: f32,
    /// Sorted by time.
    #[serde(default)]
    pub events: Vec<ClipEvent>,
}

impl TimelineClipData {
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            events: Vec::new(),
        }
    }

    /// Insert an event, keeping the list sorted (stable for equal times).
    pub fn with_event(mut self, event: ClipEvent) -> Self {
        let at = self.events.partition_point(|e| e.time <= event.time);
        self.events.insert(at, event);
        self
    }

    fn sort_events(&mut self) {
        self.events.sort_by(|a, b| a.time.total_cmp(&b.time));
    }
}

/// All clips available to a network's data interface.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineLibrary {
    pub clips: HashMap<String, TimelineClipData>,
}

impl TimelineLibrary {
    pub fn with_clip(mut self, name: impl Into<String>, clip: TimelineClipData) -> Self {
        self.clips.insert(name.into(), clip);
        self
    }

    pub fn clip(&self, name: &str) -> Option<&TimelineClipData> {
        self.clips.get(name)
    }

    pub fn from_json(raw: &str) -> Result<Self, NetworkError> {
        let mut library: TimelineLibrary = serde_json::from_str(raw)?;
        library.sort_events();
        Ok(library)
    }

    /// Order every clip's events by time. Libraries deserialized without
    /// `from_json` must be sorted before use.
    pub fn sort_events(&mut self) {
        for clip in self.clips.values_mut() {
            clip.sort_events();
        }
    }
}

/// The timeline backend.
#[derive(Debug)]
pub enum Timeline {}

impl NetworkBackend for Timeline {
    type Data = TimelineData;
    type State = TimelineState;
    type Clip = TimelineClip;

    fn create_state(data: &TimelineData) -> Option<TimelineState> {
        data.library().map(|_| TimelineState::default())
    }

    fn create_clip(
        ctx: CreateContext<'_, Self>,
        def: &Arc<PlayClipDefinition>,
        _create: &NodeCreateData,
    ) -> TimelineClip {
        let library = ctx.data.library().cloned();
        if library.as_ref().and_then(|l| l.clip(&def.name)).is_none() {
            warn!("network {} has no clip '{}'", ctx.label, def.name);
        }
        TimelineClip::new(Arc::clone(def), library)
    }
}

/// Data interface over a shared clip-library slot.
pub struct TimelineData {
    slot: Arc<ContentSlot<TimelineLibrary>>,
    library: Option<Arc<TimelineLibrary>>,
}

impl TimelineData {
    pub fn new(slot: Arc<ContentSlot<TimelineLibrary>>) -> Self {
        Self {
            slot,
            library: None,
        }
    }

    /// The acquired library, if any.
    #[inline]
    pub fn library(&self) -> Option<&Arc<TimelineLibrary>> {
        self.library.as_ref()
    }

    #[inline]
    pub fn slot(&self) -> &Arc<ContentSlot<TimelineLibrary>> {
        &self.slot
    }
}

impl DataInterface for TimelineData {
    fn acquire_instance(&mut self) {
        if self.library.is_none() {
            self.library = self.slot.get();
        }
    }

    fn release_instance(&mut self) {
        self.library = None;
    }

    fn has_instance(&self) -> bool {
        self.library.is_some()
    }

    fn is_loading(&self) -> bool {
        self.slot.is_loading()
    }

    fn total_loads_count(&self) -> u32 {
        self.slot.total_loads_count()
    }

    fn clone_interface(&self) -> Self {
        Self::new(Arc::clone(&self.slot))
    }
}

/// One clip's contribution to a published pose.
#[derive(Clone, Debug, PartialEq)]
pub struct ClipSample {
    pub clip: String,
    pub time: f32,
    pub weight: f32,
    /// Applied with discrete slot state.
    pub discrete: bool,
}

/// Pose state: the clips applied since the last tick and their weights.
#[derive(Clone, Debug, Default)]
pub struct TimelineState {
    pending: Vec<ClipSample>,
    pending_discrete: Option<String>,
    pose: Vec<ClipSample>,
    discrete_owner: Option<String>,
    ticks: u32,
}

impl TimelineState {
    /// Accumulate one clip application for the next published pose. The last
    /// clip applied with discrete state owns it.
    pub fn apply(&mut self, clip: &str, time: f32, weight: f32, discrete: bool) {
        self.pending.push(ClipSample {
            clip: clip.to_string(),
            time,
            weight,
            discrete,
        });
        if discrete {
            self.pending_discrete = Some(clip.to_string());
        }
    }

    /// Samples of the last published pose.
    pub fn pose(&self) -> &[ClipSample] {
        &self.pose
    }

    /// Total weight of `clip` in the last published pose.
    pub fn weight(&self, clip: &str) -> f32 {
        self.pose
            .iter()
            .filter(|s| s.clip == clip)
            .map(|s| s.weight)
            .sum()
    }

    /// Whether `clip` was applied with discrete state in the last published
    /// pose.
    pub fn applied_discrete(&self, clip: &str) -> bool {
        self.pose.iter().any(|s| s.clip == clip && s.discrete)
    }

    pub fn discrete_owner(&self) -> Option<&str> {
        self.discrete_owner.as_deref()
    }

    pub fn tick_count(&self) -> u32 {
        self.ticks
    }
}

impl StateInterface for TimelineState {
    fn tick(&mut self, _delta_time_seconds: f32) {
        self.pose = std::mem::take(&mut self.pending);
        if let Some(owner) = self.pending_discrete.take() {
            self.discrete_owner = Some(owner);
        }
        self.ticks += 1;
    }
}

/// Playhead over one timeline clip.
pub struct TimelineClip {
    def: Arc<PlayClipDefinition>,
    library: Option<Arc<TimelineLibrary>>,
    time: f32,
    evaluated: bool,
    finished: bool,
}

impl TimelineClip {
    pub fn new(def: Arc<PlayClipDefinition>, library: Option<Arc<TimelineLibrary>>) -> Self {
        Self {
            def,
            library,
            time: 0.0,
            evaluated: false,
            finished: false,
        }
    }

    /// Current playhead, in seconds.
    #[inline]
    pub fn time(&self) -> f32 {
        self.time
    }

    fn data(&self) -> Option<&TimelineClipData> {
        self.library.as_ref()?.clip(&self.def.name)
    }

    /// Dispatch events in `(start, end]`, or `[0, end]` when `start` is 0.
    fn dispatch_range(&self, ctx: &TickContext<'_, Timeline>, start: f32, end: f32) {
        let Some(data) = self.data() else {
            return;
        };
        for e in &data.events {
            let after_start = if start == 0.0 { e.time >= 0.0 } else { e.time > start };
            if after_start && e.time <= end {
                ctx.dispatch_event(&e.name, e.int_arg, e.float_arg, &e.string_arg);
            }
        }
    }

    fn dispatch_complete(&self, ctx: &TickContext<'_, Timeline>) {
        if let Some(name) = self.def.on_complete_event_name.as_deref() {
            if !name.is_empty() {
                ctx.dispatch_event(name, 0, 0.0, "");
            }
        }
    }

    /// Advance a looping playhead by `dt`.
    ///
    /// Skipped whole cycles are folded into a single pass: at most the rest
    /// of the current cycle, one full cycle and the final partial cycle are
    /// evaluated, so a tick costs the same whatever `dt / max` is.
    fn advance_looping(&mut self, ctx: &TickContext<'_, Timeline>, max: f32, dt: f32, events: bool) {
        let start = self.time;
        let total = start + dt;
        if total < max {
            if events {
                self.dispatch_range(ctx, start, total);
            }
            self.time = total;
            return;
        }

        if events {
            self.dispatch_range(ctx, start, max);
        }
        self.dispatch_complete(ctx);

        if (total / max).floor() >= 2.0 {
            if events {
                self.dispatch_range(ctx, 0.0, max);
            }
            self.dispatch_complete(ctx);
        }

        let end = total.rem_euclid(max);
        // Landing exactly on a boundary leaves time-0 events for the next tick.
        if events && end > 0.0 {
            self.dispatch_range(ctx, 0.0, end);
        }
        self.time = if end < max { end } else { 0.0 };
    }

    fn advance_once(&mut self, ctx: &TickContext<'_, Timeline>, max: f32, dt: f32, events: bool) {
        if self.finished {
            return;
        }
        let end = (self.time + dt).min(max).max(0.0);
        if events {
            self.dispatch_range(ctx, self.time, end);
        }
        self.time = end;
        if self.time >= max {
            self.finished = true;
            self.dispatch_complete(ctx);
        }
    }
}

impl ClipInstance<Timeline> for TimelineClip {
    fn current_max_time(&self) -> f32 {
        self.data().map_or(0.0, |d| d.duration.max(0.0))
    }

    fn time_to_event(&self, event_name: &str) -> Option<f32> {
        let data = self.data()?;
        let mut matching = data.events.iter().filter(|e| e.name == event_name);
        if let Some(e) = matching.clone().find(|e| e.time > self.time) {
            return Some(e.time - self.time);
        }
        if self.def.looping {
            let max = self.current_max_time();
            return matching.next().map(|e| max - self.time + e.time);
        }
        None
    }

    fn all_done_playing(&self) -> DonePlaying {
        DonePlaying {
            done: !self.def.looping && self.finished,
            looping: self.def.looping,
        }
    }

    fn tick(
        &mut self,
        ctx: &mut TickContext<'_, Timeline>,
        delta_time_seconds: f32,
        alpha: f32,
        blend_discrete_state: bool,
    ) -> bool {
        let first = !self.evaluated;
        self.evaluated = true;

        let before = self.time;
        let was_finished = self.finished;
        if delta_time_seconds > 0.0 {
            let max = self.current_max_time();
            let events = alpha >= self.def.event_mix_threshold;
            if self.def.looping {
                if max > 0.0 {
                    self.advance_looping(ctx, max, delta_time_seconds, events);
                }
            } else {
                self.advance_once(ctx, max, delta_time_seconds, events);
            }
        }

        let advanced = first || self.time != before || self.finished != was_finished;
        if advanced {
            ctx.state
                .apply(&self.def.name, self.time, alpha, blend_discrete_state);
        }
        advanced
    }
}
