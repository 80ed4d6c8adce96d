use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use serde::Serialize;

use dave_core::frame::{CueSink, FrameDriver, Renderer};
use dave_core::game_trait::{AudioCue, GameEvent, TickedGame};
use dave_core::input::InputCollector;
use dave_platformer::{DaveSession, Mode};

use crate::script::{InputScript, ScriptPlayer};

/// Frame-time multipliers cycled by the simulated clock, so the tick
/// accumulator sees uneven deltas the way a real display produces them.
const FRAME_JITTER: [f64; 5] = [1.0, 0.9, 1.15, 0.95, 1.0];

/// Logs each rendered frame at trace level.
#[derive(Debug, Default)]
pub struct TracingRenderer {
    frames: u64,
}

impl TracingRenderer {
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer<DaveSession> for TracingRenderer {
    fn render(&mut self, game: &DaveSession, alpha: f32) {
        self.frames += 1;
        let camera = game.camera();
        let entities = game.entities();
        tracing::trace!(
            frame = self.frames,
            mode = ?game.mode(),
            camera_x = camera.x,
            camera_y = camera.y,
            player_facing = ?entities.first().map(|e| e.facing()),
            entities = entities.len(),
            tiles = game.visible_tiles().count(),
            pickups = game.visible_pickups().count(),
            alpha,
            "render"
        );
    }
}

/// Logs cues and counts them by name.
#[derive(Debug, Default)]
pub struct TracingCueSink {
    counts: BTreeMap<String, u32>,
}

impl TracingCueSink {
    pub fn counts(&self) -> &BTreeMap<String, u32> {
        &self.counts
    }

    pub fn count(&self, cue: AudioCue) -> u32 {
        self.counts.get(&format!("{cue:?}")).copied().unwrap_or(0)
    }
}

impl CueSink for TracingCueSink {
    fn cue(&mut self, cue: AudioCue) {
        tracing::debug!(?cue, "cue");
        *self.counts.entry(format!("{cue:?}")).or_insert(0) += 1;
    }
}

/// Outcome of a scripted run, printed as JSON by the binary.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub frames: u64,
    pub ticks: u64,
    pub dropped_backlog_ms: u64,
    pub score: u32,
    pub lives: u32,
    pub level: usize,
    pub mode: Mode,
    pub finished: bool,
    pub cues: BTreeMap<String, u32>,
    pub events: usize,
}

/// Owns a session and drives it one display frame at a time from a script.
pub struct Host {
    session: DaveSession,
    driver: FrameDriver,
    input: InputCollector,
    script: ScriptPlayer,
    cues: TracingCueSink,
    renderer: TracingRenderer,
    frames: u64,
    dropped_backlog: Duration,
    events: usize,
}

impl Host {
    pub fn new(session: DaveSession, script: InputScript) -> Self {
        let driver = FrameDriver::for_game(&session);
        Self {
            session,
            driver,
            input: InputCollector::new(),
            script: ScriptPlayer::new(script),
            cues: TracingCueSink::default(),
            renderer: TracingRenderer::default(),
            frames: 0,
            dropped_backlog: Duration::ZERO,
            events: 0,
        }
    }

    pub fn session(&self) -> &DaveSession {
        &self.session
    }

    pub fn cues(&self) -> &TracingCueSink {
        &self.cues
    }

    /// Run one display frame. Returns false without simulating once the script has ended.
    pub fn step(&mut self, frame_dt: Duration) -> bool {
        if !self.script.next_frame(&mut self.input) {
            return false;
        }

        let report = self.driver.frame(
            &mut self.session,
            &mut self.input,
            frame_dt,
            &mut self.cues,
            &mut self.renderer,
        );
        self.frames += 1;
        self.dropped_backlog += report.dropped_backlog;
        self.events += report.events.len();

        for event in &report.events {
            match event {
                GameEvent::ScoreUpdate { .. } | GameEvent::LivesUpdate { .. } => {
                    tracing::debug!(frame = self.frames, ?event, "hud");
                },
                _ => tracing::info!(frame = self.frames, ?event, "game event"),
            }
        }
        true
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            frames: self.frames,
            ticks: self.driver.total_ticks(),
            dropped_backlog_ms: self.dropped_backlog.as_millis() as u64,
            score: self.session.score(),
            lives: self.session.lives(),
            level: self.session.level_index(),
            mode: self.session.mode(),
            finished: self.session.is_finished(),
            cues: self.cues.counts().clone(),
            events: self.events,
        }
    }
}

/// Synthetic frame time for the `frame`-th display frame at `display_hz`.
pub fn simulated_frame_dt(frame: u64, display_hz: f32) -> Duration {
    let base = 1.0 / f64::from(display_hz.max(1.0));
    let jitter = FRAME_JITTER[(frame % FRAME_JITTER.len() as u64) as usize];
    Duration::from_secs_f64(base * jitter)
}

/// Replay the whole script as fast as possible on a synthetic clock.
pub fn run_simulated(host: &mut Host, display_hz: f32) -> RunSummary {
    tracing::info!(display_hz, "Running simulated frames");
    let mut frame = 0;
    while host.step(simulated_frame_dt(frame, display_hz)) {
        frame += 1;
    }
    host.summary()
}

/// Replay the script paced by a wall-clock interval at `display_hz`. Stops early on Ctrl-C.
pub async fn run_realtime(host: &mut Host, display_hz: f32) -> RunSummary {
    tracing::info!(display_hz, "Running realtime frames");
    let frame_interval = Duration::from_secs_f32(1.0 / display_hz.max(1.0));
    let mut interval = tokio::time::interval(frame_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut last = Instant::now();
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let now = Instant::now();
                let frame_dt = now.duration_since(last);
                last = now;
                if !host.step(frame_dt) {
                    break;
                }
            }
            _ = &mut shutdown => {
                tracing::info!("Interrupted, stopping run");
                break;
            }
        }
    }
    host.summary()
}
