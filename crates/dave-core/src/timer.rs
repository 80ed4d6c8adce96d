use serde::{Deserialize, Serialize};

/// A countdown measured in simulation ticks.
///
/// Used for anything that lasts a fixed number of ticks: invulnerability
/// windows, weapon cooldowns, projectile lifetimes and mode transitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    remaining: u32,
}

impl Countdown {
    pub fn new(ticks: u32) -> Self {
        Self { remaining: ticks }
    }

    /// An already-expired countdown.
    pub fn idle() -> Self {
        Self::default()
    }

    /// Advance by one tick. Returns true on the tick the countdown reaches zero.
    pub fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.remaining == 0
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}
