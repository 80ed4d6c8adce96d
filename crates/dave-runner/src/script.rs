use std::path::Path;

use serde::{Deserialize, Serialize};

use dave_core::input::{Action, InputCollector};

/// Errors from loading an input script.
#[derive(Debug)]
pub enum ScriptError {
    Io(String),
    Parse(String),
}

impl std::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "script io error: {e}"),
            Self::Parse(e) => write!(f, "script parse error: {e}"),
        }
    }
}

impl std::error::Error for ScriptError {}

/// One stretch of display frames with a fixed set of held keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptStep {
    pub frames: u32,
    /// Keys held down for the whole step.
    #[serde(default)]
    pub hold: Vec<Action>,
    /// Keys tapped once on the first frame of the step.
    #[serde(default)]
    pub press: Vec<Action>,
}

impl ScriptStep {
    pub fn new(frames: u32, hold: &[Action], press: &[Action]) -> Self {
        Self {
            frames,
            hold: hold.to_vec(),
            press: press.to_vec(),
        }
    }
}

/// Scripted key events, replayed one display frame at a time.
///
/// ```toml
/// [[step]]
/// frames = 1
/// press = ["start"]
///
/// [[step]]
/// frames = 120
/// hold = ["right"]
/// press = ["jump"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputScript {
    #[serde(rename = "step", default)]
    pub steps: Vec<ScriptStep>,
}

impl InputScript {
    pub fn from_toml_str(content: &str) -> Result<Self, ScriptError> {
        toml::from_str(content).map_err(|e| ScriptError::Parse(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let content = std::fs::read_to_string(path).map_err(|e| ScriptError::Io(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Start a game and run through the opening of stage 1.
    pub fn demo() -> Self {
        use Action::*;
        Self {
            steps: vec![
                ScriptStep::new(10, &[], &[Start]),
                ScriptStep::new(60, &[Right], &[]),
                ScriptStep::new(40, &[Right], &[Jump]),
                ScriptStep::new(30, &[], &[]),
                ScriptStep::new(80, &[Right], &[Jump]),
                ScriptStep::new(50, &[Left], &[]),
                ScriptStep::new(90, &[Right], &[Jump]),
                ScriptStep::new(40, &[Down], &[]),
                ScriptStep::new(120, &[Right], &[Fire]),
            ],
        }
    }

    pub fn total_frames(&self) -> u64 {
        self.steps.iter().map(|s| u64::from(s.frames)).sum()
    }
}

/// Walks an [`InputScript`] and feeds its key events into an [`InputCollector`].
#[derive(Debug, Clone)]
pub struct ScriptPlayer {
    script: InputScript,
    step: usize,
    frame_in_step: u32,
    held: Vec<Action>,
}

impl ScriptPlayer {
    pub fn new(script: InputScript) -> Self {
        Self {
            script,
            step: 0,
            frame_in_step: 0,
            held: Vec::new(),
        }
    }

    /// Apply the key events for the next display frame. Returns false once the
    /// script is exhausted; every held key is released at that point.
    pub fn next_frame(&mut self, input: &mut InputCollector) -> bool {
        loop {
            let Some(step) = self.script.steps.get(self.step) else {
                for action in self.held.drain(..) {
                    input.key_up(action);
                }
                return false;
            };
            if self.frame_in_step < step.frames {
                break;
            }
            self.step += 1;
            self.frame_in_step = 0;
        }

        if self.frame_in_step == 0 {
            self.enter_step(input);
        }
        self.frame_in_step += 1;
        true
    }

    fn enter_step(&mut self, input: &mut InputCollector) {
        let Some(step) = self.script.steps.get(self.step) else {
            return;
        };
        for &action in &self.held {
            if !step.hold.contains(&action) {
                input.key_up(action);
            }
        }
        for &action in &step.hold {
            input.key_down(action);
        }
        for &action in &step.press {
            if step.hold.contains(&action) {
                continue;
            }
            input.key_down(action);
            input.key_up(action);
        }
        self.held.clone_from(&step.hold);
    }
}
