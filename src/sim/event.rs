/// Events emitted by the session while processing intents and ticks.
/// The presentation layer consumes these for animation/sound.

use crate::domain::actor::{ActorId, GateId, SwitchId};
use crate::domain::rules::FinishBlocker;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Victory,
    Defeat,
}

/// Why a danger episode ended without a defeat.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ClearReason {
    /// The teammate stood on the episode tile with a protective tile state.
    Rescued { by: ActorId },
    /// The endangered actor walked off the tile on their own.
    MovedToSafety,
}

#[derive(Clone, PartialEq, Debug)]
pub enum GameEvent {
    DewSpawned { x: i32, y: i32 },
    DewCollected { x: i32, y: i32, remaining: usize },
    TileMoistened { x: i32, y: i32 },
    TileFolded { x: i32, y: i32, distinct: usize },
    SwitchActivated { switch: SwitchId, gate: GateId },
    DangerStarted { actor: ActorId, x: i32, y: i32 },
    DangerCleared { actor: ActorId, reason: ClearReason },
    GoalBlocked { actor: ActorId, unmet: Vec<FinishBlocker> },
    /// Cosmetic: a bounce tile reached by a bounce continuation.
    BounceAbsorbed { x: i32, y: i32 },
    Stepped { actor: ActorId },
    /// Soft-reject pushback off an unearned goal tile.
    Bumped { actor: ActorId },
    SessionEnded { outcome: Outcome, reason: String },
}
