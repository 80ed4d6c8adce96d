use std::path::PathBuf;

/// Default display refresh used to pace frames.
pub const DEFAULT_DISPLAY_HZ: f32 = 75.0;

/// Host settings, read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct RunnerConfig {
    /// TOML level pack; built-in stages when unset.
    pub levels: Option<PathBuf>,
    /// TOML input script; the demo script when unset.
    pub script: Option<PathBuf>,
    pub display_hz: f32,
    /// Pace frames on a wall-clock interval instead of synthetic frame times.
    pub realtime: bool,
    pub log_json: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            levels: None,
            script: None,
            display_hz: DEFAULT_DISPLAY_HZ,
            realtime: false,
            log_json: false,
        }
    }
}

impl RunnerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Empty or unparseable values keep defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup("DAVE_LEVELS")
            && !path.is_empty()
        {
            config.levels = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup("DAVE_SCRIPT")
            && !path.is_empty()
        {
            config.script = Some(PathBuf::from(path));
        }
        if let Some(val) = lookup("DAVE_DISPLAY_HZ")
            && let Ok(hz) = val.parse::<f32>()
            && hz.is_finite()
            && hz > 0.0
        {
            config.display_hz = hz;
        }
        if let Some(val) = lookup("DAVE_REALTIME") {
            config.realtime = is_truthy(&val);
        }
        if let Some(val) = lookup("DAVE_LOG_JSON") {
            config.log_json = is_truthy(&val);
        }

        config
    }
}

fn is_truthy(val: &str) -> bool {
    matches!(val.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
