use serde::{Deserialize, Serialize};

/// Logical input actions understood by the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Left,
    Right,
    Up,
    Down,
    Jump,
    Fire,
    /// Climb modifier: jetpack thrust while held.
    Thrust,
    /// Start or restart a play-through from the title, game-over or victory screen.
    Start,
}

const ACTION_COUNT: usize = 8;

impl Action {
    pub const ALL: [Action; ACTION_COUNT] = [
        Action::Left,
        Action::Right,
        Action::Up,
        Action::Down,
        Action::Jump,
        Action::Fire,
        Action::Thrust,
        Action::Start,
    ];

    const fn index(self) -> usize {
        match self {
            Action::Left => 0,
            Action::Right => 1,
            Action::Up => 2,
            Action::Down => 3,
            Action::Jump => 4,
            Action::Fire => 5,
            Action::Thrust => 6,
            Action::Start => 7,
        }
    }

    /// Edge-triggered actions are reported once per key-down, not while held.
    pub const fn is_edge_triggered(self) -> bool {
        matches!(self, Action::Jump | Action::Fire | Action::Start)
    }
}

/// Immutable input state for a single simulation tick.
///
/// `left`, `right`, `up`, `down` and `thrust` are held states. `jump`, `fire`
/// and `start` are true only on the first tick after the key went down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSnapshot {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub thrust: bool,
    pub jump: bool,
    pub fire: bool,
    pub start: bool,
}

impl InputSnapshot {
    /// Snapshot with only the given actions set.
    pub fn with(actions: &[Action]) -> Self {
        let mut snapshot = Self::default();
        for &action in actions {
            match action {
                Action::Left => snapshot.left = true,
                Action::Right => snapshot.right = true,
                Action::Up => snapshot.up = true,
                Action::Down => snapshot.down = true,
                Action::Thrust => snapshot.thrust = true,
                Action::Jump => snapshot.jump = true,
                Action::Fire => snapshot.fire = true,
                Action::Start => snapshot.start = true,
            }
        }
        snapshot
    }
}

/// Latches key events from the host between ticks.
///
/// Held state follows the latest key event. Edge flags are set on a
/// released-to-pressed transition and survive until the next
/// [`InputCollector::snapshot_for_tick`], so a press that lands between two
/// ticks is never lost and is never reported twice.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputCollector {
    down: [bool; ACTION_COUNT],
    pressed_edge: [bool; ACTION_COUNT],
}

impl InputCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key-down. Auto-repeat (down while already down) does not
    /// produce a new edge.
    pub fn key_down(&mut self, action: Action) {
        let i = action.index();
        if !self.down[i] {
            self.pressed_edge[i] = true;
        }
        self.down[i] = true;
    }

    /// Record a key-up. A pending edge is kept so a tap shorter than a tick still registers.
    pub fn key_up(&mut self, action: Action) {
        self.down[action.index()] = false;
    }

    pub fn is_down(&self, action: Action) -> bool {
        self.down[action.index()]
    }

    /// Release every held action and drop pending edges (focus loss).
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Produce the snapshot for the next tick and consume pending edges.
    pub fn snapshot_for_tick(&mut self) -> InputSnapshot {
        let held = |a: Action| self.down[a.index()];
        let edge = |a: Action| self.pressed_edge[a.index()];
        let snapshot = InputSnapshot {
            left: held(Action::Left),
            right: held(Action::Right),
            up: held(Action::Up),
            down: held(Action::Down),
            thrust: held(Action::Thrust),
            jump: edge(Action::Jump),
            fire: edge(Action::Fire),
            start: edge(Action::Start),
        };
        self.pressed_edge = [false; ACTION_COUNT];
        snapshot
    }
}
