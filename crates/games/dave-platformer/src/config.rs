use serde::{Deserialize, Serialize};

use crate::physics::PhysicsConfig;
use crate::pickups::Grants;

/// Lives at the start of a play-through.
pub const START_LIVES: u32 = 3;
/// Enemy-contact immunity after a respawn, in ticks.
pub const RESPAWN_INVULNERABILITY: u32 = 50;
/// Length of the death pause before respawn, in ticks.
pub const DYING_TICKS: u32 = 60;
/// Length of the level-complete pause, in ticks.
pub const LEVEL_COMPLETE_TICKS: u32 = 120;
pub const GUN_AMMO_GRANT: u32 = 8;
pub const JETPACK_FUEL_GRANT: f32 = 500.0;
pub const JETPACK_FUEL_CAP: f32 = 900.0;

pub const MIN_TICK_RATE_HZ: f32 = 1.0;
pub const MAX_TICK_RATE_HZ: f32 = 1000.0;

pub const VIEW_WIDTH: f32 = 320.0;
pub const VIEW_HEIGHT: f32 = 208.0;

/// Errors from reading a game config.
#[derive(Debug)]
pub enum ConfigError {
    Parse(String),
    /// Parsed, but a value would break the simulation.
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "config parse error: {e}"),
            Self::Invalid(e) => write!(f, "invalid config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Lives, timers and pickup grants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub start_lives: u32,
    pub respawn_invulnerability: u32,
    pub dying_ticks: u32,
    pub level_complete_ticks: u32,
    pub gun_ammo_grant: u32,
    pub jetpack_fuel_grant: f32,
    pub jetpack_fuel_cap: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            start_lives: START_LIVES,
            respawn_invulnerability: RESPAWN_INVULNERABILITY,
            dying_ticks: DYING_TICKS,
            level_complete_ticks: LEVEL_COMPLETE_TICKS,
            gun_ammo_grant: GUN_AMMO_GRANT,
            jetpack_fuel_grant: JETPACK_FUEL_GRANT,
            jetpack_fuel_cap: JETPACK_FUEL_CAP,
        }
    }
}

impl SessionConfig {
    pub fn grants(&self) -> Grants {
        Grants {
            gun_ammo: self.gun_ammo_grant,
            jetpack_fuel: self.jetpack_fuel_grant,
            jetpack_fuel_cap: self.jetpack_fuel_cap,
        }
    }
}

/// Camera viewport in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            width: VIEW_WIDTH,
            height: VIEW_HEIGHT,
        }
    }
}

/// Top-level game configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformerConfig {
    pub physics: PhysicsConfig,
    pub session: SessionConfig,
    pub view: ViewConfig,
    pub tick_rate_hz: f32,
}

impl Default for PlatformerConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            session: SessionConfig::default(),
            view: ViewConfig::default(),
            tick_rate_hz: 60.0,
        }
    }
}

impl PlatformerConfig {
    /// Load config from a TOML file. Falls back to defaults if the file is missing
    /// or unparseable.
    pub fn load() -> Self {
        let path = std::env::var("DAVE_PLATFORMER_CONFIG")
            .unwrap_or_else(|_| "config/platformer.toml".to_string());
        Self::load_from(&path)
    }

    /// Missing files give defaults silently; unparseable or invalid ones log a
    /// warning and give defaults.
    pub fn load_from(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse {path}: {e}, using defaults");
                PlatformerConfig::default()
            }),
            Err(_) => PlatformerConfig::default(),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config = toml::from_str::<PlatformerConfig>(content)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Reject values the simulation cannot run with: non-finite numbers,
    /// non-positive speed limits or viewport sizes, and tick rates out of range.
    pub fn validate(&self) -> Result<(), String> {
        self.physics.validate()?;
        if !(MIN_TICK_RATE_HZ..=MAX_TICK_RATE_HZ).contains(&self.tick_rate_hz) {
            return Err(format!(
                "tick_rate_hz must be between {MIN_TICK_RATE_HZ} and {MAX_TICK_RATE_HZ}, got {}",
                self.tick_rate_hz
            ));
        }
        for (name, value) in [
            ("view.width", self.view.width),
            ("view.height", self.view.height),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("{name} must be a positive number, got {value}"));
            }
        }
        for (name, value) in [
            ("session.jetpack_fuel_grant", self.session.jetpack_fuel_grant),
            ("session.jetpack_fuel_cap", self.session.jetpack_fuel_cap),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} must be a non-negative number, got {value}"));
            }
        }
        Ok(())
    }
}
