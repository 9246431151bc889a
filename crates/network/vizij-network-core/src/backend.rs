//! Engine-facing collaborator traits.
//!
//! The runtime graph is generic over a [`NetworkBackend`], which bundles the
//! engine's concrete data interface (skeleton/clip data), state interface
//! (evaluated pose) and clip player. Everything above the clip leaves is
//! engine-agnostic.

use std::sync::Arc;

use crate::definition::PlayClipDefinition;
use crate::instance::{CreateContext, NodeCreateData, TickContext};
use crate::types::DonePlaying;

/// Acquisition and release of the concrete pose/skeleton data.
///
/// Loading may complete asynchronously: `has_instance` can turn true between
/// two `check_state` calls, never during one.
pub trait DataInterface {
    /// Start (or complete) acquiring the data instance.
    fn acquire_instance(&mut self);
    fn release_instance(&mut self);
    fn has_instance(&self) -> bool;
    fn is_loading(&self) -> bool;
    /// Load-generation counter; any change means the underlying content was
    /// reloaded.
    fn total_loads_count(&self) -> u32;
    /// A fresh interface over the same content, without an acquired instance.
    fn clone_interface(&self) -> Self
    where
        Self: Sized;
}

/// The evaluated pose state of one network instance.
pub trait StateInterface {
    fn tick(&mut self, delta_time_seconds: f32);
}

/// Engine-specific playback of a single clip (the leaf of every network).
pub trait ClipInstance<B: NetworkBackend> {
    fn current_max_time(&self) -> f32;
    fn time_to_event(&self, event_name: &str) -> Option<f32>;
    fn all_done_playing(&self) -> DonePlaying;
    /// Advance playback, applying the clip to `ctx.state` with weight `alpha`.
    /// Returns true if pose-affecting data was advanced.
    fn tick(
        &mut self,
        ctx: &mut TickContext<'_, B>,
        delta_time_seconds: f32,
        alpha: f32,
        blend_discrete_state: bool,
    ) -> bool;
}

/// Binds the runtime graph to one engine's data, state and clip types.
pub trait NetworkBackend: Sized + 'static {
    type Data: DataInterface;
    type State: StateInterface;
    type Clip: ClipInstance<Self>;

    /// Build the pose state once data is available. `None` keeps the network
    /// in the data-resolved phase.
    fn create_state(data: &Self::Data) -> Option<Self::State>;

    fn create_clip(
        ctx: CreateContext<'_, Self>,
        def: &Arc<PlayClipDefinition>,
        create: &NodeCreateData,
    ) -> Self::Clip;
}
