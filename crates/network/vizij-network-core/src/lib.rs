//! Vizij Network Core (engine-agnostic)
//!
//! Runtime for data-defined animation networks: trees of clip players, blends
//! and transition state machines evaluated once per frame for one animated
//! entity. Definitions are immutable and shared; each [`NetworkInstance`]
//! owns its condition/parameter tables, trigger queue and runtime node tree,
//! resolving its definition and data lazily and rebuilding on hot-reload.
//!
//! The engine plugs in through [`NetworkBackend`]; [`timeline`] is a complete
//! reference backend.

pub mod backend;
pub mod config;
pub mod definition;
pub mod error;
pub mod event;
pub mod instance;
pub mod network;
pub mod source;
pub mod timeline;
pub mod types;
pub mod variables;

// Re-exports for consumers (engine adapters)
pub use backend::{ClipInstance, DataInterface, NetworkBackend, StateInterface};
pub use config::Config;
pub use definition::{
    BlendDefinition, NetworkDefinition, NetworkDefinitionParameter, NodeDefinition,
    PlayClipDefinition, StateMachineDefinition, StateMachineState, StateMachineTransition,
};
pub use error::NetworkError;
pub use event::{EventInterface, EventRecorder, NetworkEvent, SharedEventInterface};
pub use instance::{
    BlendInstance, CreateContext, NodeCreateData, NodeInstance, PlayClipInstance,
    StateMachineInstance, TickContext,
};
pub use network::{NetworkInstance, ReadyState, StatePath};
pub use source::{ContentSlot, DefinitionSource};
pub use timeline::{
    ClipEvent, ClipSample, Timeline, TimelineClip, TimelineClipData, TimelineData,
    TimelineLibrary, TimelineState,
};
pub use types::{DonePlaying, NodeType, SlotBlendMode};
pub use variables::Variables;
