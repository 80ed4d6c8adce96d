use std::time::Duration;

use crate::game_trait::{AudioCue, GameEvent, TickedGame};
use crate::input::InputCollector;

/// Frame deltas above this are treated as a stall (debugger, suspended tab).
pub const DEFAULT_MAX_FRAME_DELTA: Duration = Duration::from_millis(100);
/// Upper bound on simulation ticks run for one display frame.
pub const DEFAULT_MAX_TICKS_PER_FRAME: u32 = 10;

/// Receives sound cues. Implementations must not block.
pub trait CueSink {
    fn cue(&mut self, cue: AudioCue);
}

/// Discards every cue.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCueSink;

impl CueSink for NullCueSink {
    fn cue(&mut self, _cue: AudioCue) {}
}

impl CueSink for Vec<AudioCue> {
    fn cue(&mut self, cue: AudioCue) {
        self.push(cue);
    }
}

/// Draws the game after all ticks of a frame have run.
///
/// Takes the game by shared reference: rendering cannot mutate simulation state.
/// `alpha` is the fraction of a tick left in the accumulator, for interpolation.
pub trait Renderer<G: ?Sized> {
    fn render(&mut self, game: &G, alpha: f32);
}

/// Renders nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl<G: ?Sized> Renderer<G> for NullRenderer {
    fn render(&mut self, _game: &G, _alpha: f32) {}
}

/// 60 Hz, truncated to whole nanoseconds.
const DEFAULT_TICK_INTERVAL: Duration = Duration::from_nanos(16_666_666);

/// Tick length for `hz`, truncated to whole nanoseconds so that `n` ticks never
/// need more than `n / hz` seconds of accumulated frame time.
fn tick_interval(hz: f32) -> Option<Duration> {
    if !hz.is_finite() || hz <= 0.0 {
        return None;
    }
    let nanos = (1e9 / f64::from(hz)).floor();
    (nanos >= 1.0 && nanos < u64::MAX as f64).then(|| Duration::from_nanos(nanos as u64))
}

/// How many ticks a frame should run and what is left over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepPlan {
    pub ticks_to_run: u32,
    pub remaining_accumulator: Duration,
    pub dropped_backlog: Duration,
}

/// Split an accumulated frame time into whole fixed ticks.
///
/// When the tick cap is hit, the remaining backlog is dropped instead of
/// carried, so a long stall cannot cause a spiral of catch-up frames.
pub fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    if accumulator >= fixed_dt {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: accumulator,
        }
    } else {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: accumulator,
            dropped_backlog: Duration::ZERO,
        }
    }
}

/// Result of a single display frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub ticks_run: u32,
    pub dropped_backlog: Duration,
    /// Non-cue events raised during the frame's ticks, in order.
    pub events: Vec<GameEvent>,
}

/// Fixed-timestep accumulator decoupling simulation rate from display rate.
///
/// Each display frame adds its (clamped) wall-clock delta to the accumulator,
/// runs as many whole ticks as fit, then renders exactly once.
#[derive(Debug, Clone)]
pub struct FrameDriver {
    fixed_dt: Duration,
    max_frame_delta: Duration,
    max_ticks_per_frame: u32,
    accumulator: Duration,
    total_ticks: u64,
}

impl FrameDriver {
    /// Driver for the given tick rate. Rates with no representable tick length
    /// (non-finite, non-positive, or too slow or fast for whole nanoseconds)
    /// fall back to 60 Hz.
    pub fn new(tick_rate_hz: f32) -> Self {
        let fixed_dt = tick_interval(tick_rate_hz).unwrap_or(DEFAULT_TICK_INTERVAL);
        Self {
            fixed_dt,
            max_frame_delta: DEFAULT_MAX_FRAME_DELTA,
            max_ticks_per_frame: DEFAULT_MAX_TICKS_PER_FRAME,
            accumulator: Duration::ZERO,
            total_ticks: 0,
        }
    }

    /// Driver matching a game's own tick rate.
    pub fn for_game<G: TickedGame + ?Sized>(game: &G) -> Self {
        Self::new(game.tick_rate())
    }

    pub fn with_limits(mut self, max_frame_delta: Duration, max_ticks_per_frame: u32) -> Self {
        self.max_frame_delta = if max_frame_delta.is_zero() {
            DEFAULT_MAX_FRAME_DELTA
        } else {
            max_frame_delta
        };
        self.max_ticks_per_frame = max_ticks_per_frame.max(1);
        self
    }

    pub fn fixed_dt(&self) -> Duration {
        self.fixed_dt
    }

    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Interpolation factor in `[0, 1)` for the time left in the accumulator.
    pub fn alpha(&self) -> f32 {
        (self.accumulator.as_secs_f64() / self.fixed_dt.as_secs_f64()) as f32
    }

    /// Run one display frame: simulate whole ticks, forward cues, then render.
    pub fn frame<G: TickedGame + ?Sized>(
        &mut self,
        game: &mut G,
        input: &mut InputCollector,
        frame_dt: Duration,
        cues: &mut dyn CueSink,
        renderer: &mut dyn Renderer<G>,
    ) -> FrameReport {
        let clamped = frame_dt.min(self.max_frame_delta);
        self.accumulator = self.accumulator.saturating_add(clamped);

        let plan = plan_sim_steps(self.accumulator, self.fixed_dt, self.max_ticks_per_frame);
        self.accumulator = plan.remaining_accumulator;
        if !plan.dropped_backlog.is_zero() {
            tracing::warn!(
                dropped_ms = plan.dropped_backlog.as_millis() as u64,
                ticks = plan.ticks_to_run,
                "tick cap hit; dropping simulation backlog"
            );
        }

        let mut report = FrameReport {
            ticks_run: plan.ticks_to_run,
            dropped_backlog: plan.dropped_backlog,
            events: Vec::new(),
        };

        for _ in 0..plan.ticks_to_run {
            let snapshot = input.snapshot_for_tick();
            for event in game.update(&snapshot) {
                match event {
                    GameEvent::Cue(cue) => cues.cue(cue),
                    other => report.events.push(other),
                }
            }
            self.total_ticks += 1;
        }

        renderer.render(game, self.alpha());
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_trait::GameMetadata;
    use crate::input::{Action, InputSnapshot};

    #[test]
    fn plan_sim_steps_runs_expected_ticks_without_drop() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(48), fixed_dt, 5);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn plan_sim_steps_keeps_partial_tick() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(20), fixed_dt, 5);

        assert_eq!(result.ticks_to_run, 1);
        assert_eq!(result.remaining_accumulator, Duration::from_millis(4));
    }

    #[test]
    fn plan_sim_steps_drops_backlog_when_tick_cap_hit() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(120), fixed_dt, 3);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::from_millis(72));
    }

    /// Counts ticks and records the snapshots it saw.
    #[derive(Default)]
    struct Counter {
        ticks: u32,
        jumps_seen: u32,
        paused: bool,
        state: u32,
    }

    impl TickedGame for Counter {
        fn metadata(&self) -> GameMetadata {
            GameMetadata {
                name: "counter".to_string(),
                description: String::new(),
                level_count: 0,
            }
        }

        fn update(&mut self, input: &InputSnapshot) -> Vec<GameEvent> {
            if self.paused {
                return Vec::new();
            }
            self.ticks += 1;
            self.state = self.ticks;
            if input.jump {
                self.jumps_seen += 1;
                return vec![
                    GameEvent::Cue(AudioCue::Jump),
                    GameEvent::ScoreUpdate { score: self.ticks },
                ];
            }
            Vec::new()
        }

        crate::ticked_game_boilerplate!(state_type: u32);

        fn is_finished(&self) -> bool {
            false
        }
    }

    /// Records the tick count visible at each render.
    struct SeenTicks(Vec<u32>);

    impl Renderer<Counter> for SeenTicks {
        fn render(&mut self, game: &Counter, _alpha: f32) {
            self.0.push(game.ticks);
        }
    }

    #[test]
    fn display_rate_does_not_change_tick_count() {
        // One second of wall time at 60 Hz simulation, shown at several display rates.
        for (display_hz, frame_ms) in [(50, 20), (125, 8), (200, 5)] {
            let mut game = Counter::default();
            let mut driver = FrameDriver::new(60.0);
            let mut input = InputCollector::new();
            let frame = Duration::from_millis(frame_ms);
            for _ in 0..display_hz {
                driver.frame(&mut game, &mut input, frame, &mut NullCueSink, &mut NullRenderer);
            }
            assert_eq!(game.ticks, 60, "{display_hz} Hz display");
            assert_eq!(driver.total_ticks(), 60);
        }
    }

    #[test]
    fn render_happens_once_after_all_ticks() {
        let mut game = Counter::default();
        let mut driver = FrameDriver::new(60.0);
        let mut input = InputCollector::new();
        let mut seen = SeenTicks(Vec::new());

        let report = driver.frame(
            &mut game,
            &mut input,
            Duration::from_millis(50),
            &mut NullCueSink,
            &mut seen,
        );

        assert_eq!(report.ticks_run, 3);
        assert_eq!(seen.0, vec![3], "render sees the state after every tick");
    }

    #[test]
    fn held_jump_is_delivered_once_across_frames() {
        let mut game = Counter::default();
        let mut driver = FrameDriver::new(60.0);
        let mut input = InputCollector::new();
        let mut cues: Vec<AudioCue> = Vec::new();

        input.key_down(Action::Jump);
        let mut events = Vec::new();
        for _ in 0..10 {
            let report = driver.frame(
                &mut game,
                &mut input,
                Duration::from_millis(33),
                &mut cues,
                &mut NullRenderer,
            );
            events.extend(report.events);
        }

        assert_eq!(game.jumps_seen, 1);
        assert_eq!(cues, vec![AudioCue::Jump], "cues go to the sink");
        assert_eq!(events.len(), 1, "non-cue events land in the report");
    }

    #[test]
    fn press_during_zero_tick_frame_is_kept_for_next_tick() {
        let mut game = Counter::default();
        let mut driver = FrameDriver::new(60.0);
        let mut input = InputCollector::new();

        input.key_down(Action::Jump);
        input.key_up(Action::Jump);
        let report = driver.frame(
            &mut game,
            &mut input,
            Duration::from_millis(5),
            &mut NullCueSink,
            &mut NullRenderer,
        );
        assert_eq!(report.ticks_run, 0);

        driver.frame(
            &mut game,
            &mut input,
            Duration::from_millis(15),
            &mut NullCueSink,
            &mut NullRenderer,
        );
        assert_eq!(game.jumps_seen, 1);
    }

    #[test]
    fn stall_is_clamped_and_capped() {
        let mut game = Counter::default();
        let mut driver =
            FrameDriver::new(60.0).with_limits(Duration::from_millis(100), 4);
        let mut input = InputCollector::new();

        let report = driver.frame(
            &mut game,
            &mut input,
            Duration::from_secs(5),
            &mut NullCueSink,
            &mut NullRenderer,
        );

        assert_eq!(report.ticks_run, 4);
        assert!(report.dropped_backlog > Duration::ZERO);
        assert!(driver.alpha() < 1.0);
    }

    #[test]
    fn invalid_tick_rate_falls_back_to_60hz() {
        let expected = Duration::from_nanos(16_666_666);
        assert_eq!(FrameDriver::new(f32::NAN).fixed_dt(), expected);
        assert_eq!(FrameDriver::new(f32::INFINITY).fixed_dt(), expected);
        assert_eq!(FrameDriver::new(-5.0).fixed_dt(), expected);
        assert_eq!(FrameDriver::new(0.0).fixed_dt(), expected);
    }

    #[test]
    fn unrepresentable_tick_rate_falls_back_to_60hz() {
        let expected = Duration::from_nanos(16_666_666);
        assert_eq!(FrameDriver::new(1e-30).fixed_dt(), expected, "tick too long");
        assert_eq!(FrameDriver::new(1e30).fixed_dt(), expected, "tick under a nanosecond");
    }

    #[test]
    fn tick_interval_truncates_to_whole_nanos() {
        assert_eq!(FrameDriver::new(60.0).fixed_dt(), Duration::from_nanos(16_666_666));
        assert_eq!(FrameDriver::new(30.0).fixed_dt(), Duration::from_nanos(33_333_333));
        assert_eq!(FrameDriver::new(50.0).fixed_dt(), Duration::from_millis(20));
    }
}
