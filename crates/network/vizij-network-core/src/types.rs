//! Small closed enumerations and value types shared by definitions and instances.

use serde::{Deserialize, Serialize};

/// Tag identifying the kind of a node in an animation network.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Blend,
    PlayClip,
    StateMachine,
}

/// Policy for applying discrete (non-interpolable) slot/attachment state while a
/// state machine blends between its old and new states.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotBlendMode {
    /// Both the source and the target apply discrete state.
    #[default]
    None,
    /// Only the state being transitioned away from applies discrete state.
    OnlySource,
    /// Only the state being transitioned to applies discrete state.
    OnlyTarget,
}

impl SlotBlendMode {
    /// Whether the source (old) state may apply discrete state under this mode.
    #[inline]
    pub fn source_blends(self) -> bool {
        matches!(self, SlotBlendMode::None | SlotBlendMode::OnlySource)
    }

    /// Whether the target (new) state may apply discrete state under this mode.
    #[inline]
    pub fn target_blends(self) -> bool {
        matches!(self, SlotBlendMode::None | SlotBlendMode::OnlyTarget)
    }
}

/// Result of an "all done playing" query.
///
/// `done` is true iff every contributing one-shot clip has finished; `looping`
/// is true if any active clip loops.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonePlaying {
    pub done: bool,
    pub looping: bool,
}

impl DonePlaying {
    /// Neutral element for combining children: done, not looping.
    pub const IDLE: DonePlaying = DonePlaying {
        done: true,
        looping: false,
    };

    /// Fold another contributor into this result (AND on done, OR on looping).
    #[inline]
    pub fn combine(self, other: DonePlaying) -> DonePlaying {
        DonePlaying {
            done: self.done && other.done,
            looping: self.looping || other.looping,
        }
    }
}

impl Default for DonePlaying {
    fn default() -> Self {
        DonePlaying::IDLE
    }
}

/// Clamp `v` into [0, 1], mapping NaN to 0.
#[inline]
pub(crate) fn clamp01(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}
