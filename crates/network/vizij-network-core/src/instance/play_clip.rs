use std::sync::Arc;

use super::{CreateContext, NodeCreateData, TickContext};
use crate::backend::{ClipInstance, NetworkBackend};
use crate::definition::PlayClipDefinition;
use crate::types::DonePlaying;

/// Leaf node wrapping the backend's clip player.
pub struct PlayClipInstance<B: NetworkBackend> {
    def: Arc<PlayClipDefinition>,
    clip: B::Clip,
}

impl<B: NetworkBackend> PlayClipInstance<B> {
    pub fn new(
        def: Arc<PlayClipDefinition>,
        ctx: CreateContext<'_, B>,
        create: &NodeCreateData,
    ) -> Self {
        let clip = B::create_clip(ctx, &def, create);
        Self { def, clip }
    }

    #[inline]
    pub fn definition(&self) -> &Arc<PlayClipDefinition> {
        &self.def
    }

    #[inline]
    pub fn clip(&self) -> &B::Clip {
        &self.clip
    }

    #[inline]
    pub fn clip_mut(&mut self) -> &mut B::Clip {
        &mut self.clip
    }

    #[inline]
    pub fn current_max_time(&self) -> f32 {
        self.clip.current_max_time()
    }

    #[inline]
    pub fn time_to_event(&self, event_name: &str) -> Option<f32> {
        self.clip.time_to_event(event_name)
    }

    #[inline]
    pub fn all_done_playing(&self) -> DonePlaying {
        self.clip.all_done_playing()
    }

    pub fn tick(
        &mut self,
        ctx: &mut TickContext<'_, B>,
        delta_time_seconds: f32,
        alpha: f32,
        blend_discrete_state: bool,
    ) -> bool {
        self.clip
            .tick(ctx, delta_time_seconds, alpha, blend_discrete_state)
    }
}
