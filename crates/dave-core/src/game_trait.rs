use serde::{Deserialize, Serialize};

use crate::input::InputSnapshot;

/// Core trait for a fixed-tick simulation driven by [`crate::frame::FrameDriver`].
///
/// The host owns timing, input sampling, audio and rendering; the game only
/// advances its own state, once per `update` call.
pub trait TickedGame: Send + Sync {
    /// Descriptive metadata for title screens and logs.
    fn metadata(&self) -> GameMetadata;

    /// Simulation tick rate in Hz.
    fn tick_rate(&self) -> f32 {
        60.0
    }

    /// Advance the simulation by exactly one tick. Returns the events raised
    /// during the tick, in the order they happened.
    fn update(&mut self, input: &InputSnapshot) -> Vec<GameEvent>;

    /// Serialize the complete simulation state (render snapshot).
    fn serialize_state(&self) -> Vec<u8>;

    /// Replace the simulation state with a previously serialized snapshot.
    /// Undecodable bytes leave the state untouched.
    fn apply_state(&mut self, state: &[u8]);

    /// Freeze the simulation; `update` becomes a no-op.
    fn pause(&mut self);

    /// Unfreeze the simulation after `pause`.
    fn resume(&mut self);

    /// Whether the play-through reached a terminal mode (game over or victory).
    fn is_finished(&self) -> bool;
}

/// Game metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMetadata {
    pub name: String,
    pub description: String,
    pub level_count: usize,
}

/// Fire-and-forget sound notifications for discrete gameplay moments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioCue {
    Jump,
    Pickup,
    KeyPickup,
    GunPickup,
    Thrust,
    Shot,
    EnemyDown,
    Death,
    LevelComplete,
    GameOver,
    Victory,
}

/// Events emitted by a game during update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A sound should be played; forwarded to the host's [`crate::frame::CueSink`].
    Cue(AudioCue),
    ScoreUpdate { score: u32 },
    LivesUpdate { lives: u32 },
    LevelStarted { level: usize },
    LevelComplete { level: usize },
    PlayerDied { lives_left: u32 },
    GameOver { score: u32 },
    Victory { score: u32 },
}

/// Generates the 4 boilerplate `TickedGame` methods shared by every game:
/// `serialize_state`, `apply_state`, `pause`, `resume`.
///
/// Requires the implementing struct to have `state: $StateType` and `paused: bool` fields.
/// With `accept: f`, a decoded snapshot is applied only when `f(&self, &snapshot)`
/// returns true.
#[macro_export]
macro_rules! ticked_game_boilerplate {
    (state_type: $StateType:ty) => {
        $crate::ticked_game_boilerplate!(state_type: $StateType, accept: |_, _| true);
    };
    (state_type: $StateType:ty, accept: $accept:expr) => {
        fn serialize_state(&self) -> Vec<u8> {
            rmp_serde::to_vec(&self.state).expect("game state serialization must succeed")
        }

        fn apply_state(&mut self, state: &[u8]) {
            if let Ok(s) = rmp_serde::from_slice::<$StateType>(state)
                && ($accept)(&*self, &s)
            {
                self.state = s;
            }
        }

        fn pause(&mut self) {
            self.paused = true;
        }

        fn resume(&mut self) {
            self.paused = false;
        }
    };
}
