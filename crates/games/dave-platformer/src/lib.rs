pub mod collider;
pub mod config;
pub mod levels;
pub mod physics;
pub mod pickups;
pub mod scoring;
pub mod tiles;

use serde::{Deserialize, Serialize};

use dave_core::game_trait::{AudioCue, GameEvent, GameMetadata, TickedGame};
use dave_core::input::InputSnapshot;
use dave_core::ticked_game_boilerplate;
use dave_core::timer::Countdown;

use config::{PlatformerConfig, ViewConfig};
use levels::{LevelDef, LevelPack};
use physics::{
    BulletFate, BulletState, EnemyState, Entity, PlayerState, tick_bullet, tick_enemy,
    tick_player, try_fire,
};
use pickups::{Door, Pickup, PickupKind, door_locked, equip};
use tiles::{Marker, TileGrid, TileKind, parse_level};

/// Session modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Title,
    Playing,
    /// Frozen celebration before the next level loads.
    LevelComplete,
    /// Frozen death pause before the level reloads.
    Dying,
    GameOver,
    Victory,
}

/// Top-left corner of the viewport in level pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub x: f32,
    pub y: f32,
}

impl Camera {
    /// Centre on the player, clamped so the view never leaves the level.
    pub fn follow(player: &PlayerState, grid: &TileGrid, view: &ViewConfig) -> Self {
        let (cx, cy) = player.rect().center();
        let max_x = (grid.pixel_width() - view.width).max(0.0);
        let max_y = (grid.pixel_height() - view.height).max(0.0);
        Self {
            x: (cx - view.width / 2.0).clamp(0.0, max_x),
            y: (cy - view.height / 2.0).clamp(0.0, max_y),
        }
    }
}

/// Everything that belongs to the loaded level. Rebuilt from scratch on every
/// level load and respawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub name: String,
    pub grid: TileGrid,
    pub player: PlayerState,
    pub enemies: Vec<EnemyState>,
    pub pickups: Vec<Pickup>,
    pub door: Option<Door>,
    pub bullets: Vec<BulletState>,
    pub trophies_required: u32,
    pub trophies_collected: u32,
    pub camera: Camera,
}

impl Stage {
    pub fn load(def: &LevelDef, view: &ViewConfig) -> Self {
        let level = parse_level(&def.rows);
        let mut enemies = Vec::new();
        let mut pickups = Vec::new();
        for spawn in &level.spawns {
            match spawn.marker {
                Marker::Enemy(kind) => enemies.push(EnemyState::spawn(spawn.tx, spawn.ty, kind)),
                Marker::Pickup(kind) => pickups.push(Pickup::spawn(spawn.tx, spawn.ty, kind)),
                Marker::PlayerStart | Marker::Door => {},
            }
        }
        let trophies_required = pickups
            .iter()
            .filter(|p| p.kind == PickupKind::Trophy)
            .count() as u32;
        let (sx, sy) = level.player_start;
        let player = PlayerState::spawn(sx, sy);
        let camera = Camera::follow(&player, &level.grid, view);

        Self {
            name: def.name.clone(),
            door: level.door.map(|(tx, ty)| Door::spawn(tx, ty)),
            grid: level.grid,
            player,
            enemies,
            pickups,
            bullets: Vec::new(),
            trophies_required,
            trophies_collected: 0,
            camera,
        }
    }
}

/// Serializable session state: the render snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub mode: Mode,
    pub level_index: usize,
    pub score: u32,
    pub lives: u32,
    /// Ticks processed since construction, in any mode.
    pub tick: u64,
    /// Drives `Dying` and `LevelComplete`; idle otherwise.
    pub mode_timer: Countdown,
    pub stage: Stage,
}

/// How a playing tick ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlayOutcome {
    Continue,
    Died(DeathCause),
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeathCause {
    Hazard,
    Fall,
    Enemy,
}

/// The Dangerous Dave game session.
pub struct DaveSession {
    config: PlatformerConfig,
    levels: LevelPack,
    state: SessionState,
    paused: bool,
}

impl DaveSession {
    /// New session on the title screen. An empty pack is replaced by the built-in
    /// stages and an invalid config by the defaults.
    pub fn new(config: PlatformerConfig, levels: LevelPack) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                tracing::warn!("Invalid config: {e}, using defaults");
                PlatformerConfig::default()
            },
        };
        let levels = if levels.is_empty() {
            tracing::warn!("Level pack is empty, using built-in stages");
            LevelPack::builtin()
        } else {
            levels
        };
        let stage = Stage::load(&levels.levels[0], &config.view);
        let state = SessionState {
            mode: Mode::Title,
            level_index: 0,
            score: 0,
            lives: config.session.start_lives,
            tick: 0,
            mode_timer: Countdown::idle(),
            stage,
        };
        Self {
            config,
            levels,
            state,
            paused: false,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &PlatformerConfig {
        &self.config
    }

    pub fn levels(&self) -> &LevelPack {
        &self.levels
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn lives(&self) -> u32 {
        self.state.lives
    }

    pub fn level_index(&self) -> usize {
        self.state.level_index
    }

    pub fn stage(&self) -> &Stage {
        &self.state.stage
    }

    pub fn player(&self) -> &PlayerState {
        &self.state.stage.player
    }

    pub fn camera(&self) -> Camera {
        self.state.stage.camera
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Player, living enemies and bullets, in draw order.
    pub fn entities(&self) -> Vec<Entity<'_>> {
        let stage = &self.state.stage;
        let mut out = Vec::with_capacity(1 + stage.enemies.len() + stage.bullets.len());
        out.push(Entity::Player(&stage.player));
        out.extend(stage.enemies.iter().filter(|e| e.alive).map(Entity::Enemy));
        out.extend(stage.bullets.iter().map(Entity::Bullet));
        out
    }

    /// Uncollected pickups.
    pub fn visible_pickups(&self) -> impl Iterator<Item = &Pickup> + '_ {
        self.state.stage.pickups.iter().filter(|p| !p.collected)
    }

    /// Tiles inside the camera window.
    pub fn visible_tiles(&self) -> impl Iterator<Item = (i32, i32, TileKind)> + '_ {
        let cam = self.state.stage.camera;
        let view = &self.config.view;
        self.state
            .stage
            .grid
            .tiles_in_view(cam.x, cam.y, view.width, view.height)
    }

    /// Whether a decoded snapshot can be resumed by this session's level pack.
    fn accepts_snapshot(&self, snapshot: &SessionState) -> bool {
        let problem = if snapshot.level_index >= self.levels.len() {
            Some("level index outside the level pack")
        } else if !snapshot.stage.grid.is_well_formed() {
            Some("malformed tile grid")
        } else if matches!(snapshot.mode, Mode::Dying | Mode::LevelComplete)
            && !snapshot.mode_timer.is_active()
        {
            Some("timed mode without a running timer")
        } else {
            None
        };
        if let Some(problem) = problem {
            tracing::warn!(level = snapshot.level_index, "Rejected snapshot: {problem}");
        }
        problem.is_none()
    }

    /// Begin a fresh play-through from the first level.
    pub fn start(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        self.start_new_game(&mut events);
        events
    }

    fn start_new_game(&mut self, events: &mut Vec<GameEvent>) {
        self.state.score = 0;
        self.state.lives = self.config.session.start_lives;
        self.state.level_index = 0;
        tracing::info!(lives = self.state.lives, "Starting new game");
        events.push(GameEvent::ScoreUpdate { score: 0 });
        events.push(GameEvent::LivesUpdate {
            lives: self.state.lives,
        });
        self.load_level(0, events);
    }

    fn load_level(&mut self, index: usize, events: &mut Vec<GameEvent>) {
        let Some(def) = self.levels.get(index) else {
            return;
        };
        self.state.stage = Stage::load(def, &self.config.view);
        self.state.level_index = index;
        self.state.mode = Mode::Playing;
        self.state.mode_timer = Countdown::idle();
        tracing::info!(
            level = index,
            name = %self.state.stage.name,
            trophies = self.state.stage.trophies_required,
            enemies = self.state.stage.enemies.len(),
            "Level loaded"
        );
        events.push(GameEvent::LevelStarted { level: index });
    }

    fn lose_life(&mut self, cause: DeathCause, events: &mut Vec<GameEvent>) {
        self.state.lives = self.state.lives.saturating_sub(1);
        let lives_left = self.state.lives;
        tracing::info!(?cause, lives_left, "Player died");
        events.push(GameEvent::Cue(AudioCue::Death));
        events.push(GameEvent::PlayerDied { lives_left });
        events.push(GameEvent::LivesUpdate { lives: lives_left });

        if lives_left == 0 {
            self.state.mode = Mode::GameOver;
            self.state.mode_timer = Countdown::idle();
            tracing::info!(score = self.state.score, "Game over");
            events.push(GameEvent::Cue(AudioCue::GameOver));
            events.push(GameEvent::GameOver {
                score: self.state.score,
            });
        } else {
            self.state.mode = Mode::Dying;
            self.state.mode_timer = Countdown::new(self.config.session.dying_ticks.max(1));
        }
    }

    fn respawn(&mut self, events: &mut Vec<GameEvent>) {
        self.load_level(self.state.level_index, events);
        self.state.stage.player.invulnerable =
            Countdown::new(self.config.session.respawn_invulnerability);
    }

    fn complete_level(&mut self, events: &mut Vec<GameEvent>) {
        self.state.score += scoring::LEVEL_SCORE;
        let level = self.state.level_index;
        tracing::info!(level, score = self.state.score, "Level complete");
        events.push(GameEvent::Cue(AudioCue::LevelComplete));
        events.push(GameEvent::LevelComplete { level });
        events.push(GameEvent::ScoreUpdate {
            score: self.state.score,
        });
        self.state.mode = Mode::LevelComplete;
        self.state.mode_timer = Countdown::new(self.config.session.level_complete_ticks.max(1));
    }

    fn advance_level(&mut self, events: &mut Vec<GameEvent>) {
        let next = self.state.level_index + 1;
        if next >= self.levels.len() {
            self.state.mode = Mode::Victory;
            self.state.mode_timer = Countdown::idle();
            tracing::info!(score = self.state.score, "All levels cleared");
            events.push(GameEvent::Cue(AudioCue::Victory));
            events.push(GameEvent::Victory {
                score: self.state.score,
            });
        } else {
            self.load_level(next, events);
        }
    }

    fn tick_playing(&mut self, input: &InputSnapshot, events: &mut Vec<GameEvent>) -> PlayOutcome {
        let cfg = &self.config;
        let state = &mut self.state;
        let stage = &mut state.stage;

        let step = tick_player(&mut stage.player, input, &stage.grid, &cfg.physics);
        if step.jumped {
            events.push(GameEvent::Cue(AudioCue::Jump));
        }
        if step.thrust_started {
            events.push(GameEvent::Cue(AudioCue::Thrust));
        }
        if step.touched_hazard {
            return PlayOutcome::Died(DeathCause::Hazard);
        }
        if step.fell_out {
            return PlayOutcome::Died(DeathCause::Fall);
        }

        // Pickups
        let player_rect = stage.player.rect();
        let grants = cfg.session.grants();
        for pickup in stage.pickups.iter_mut().filter(|p| !p.collected) {
            if !pickup.rect.overlaps(&player_rect) {
                continue;
            }
            pickup.collected = true;
            equip(pickup.kind, &mut stage.player, &grants);
            match pickup.kind {
                PickupKind::Trophy => stage.trophies_collected += 1,
                PickupKind::ExtraLife => {
                    state.lives += 1;
                    events.push(GameEvent::LivesUpdate { lives: state.lives });
                },
                _ => {},
            }
            state.score += scoring::pickup_score(pickup.kind);
            tracing::debug!(kind = ?pickup.kind, score = state.score, "Pickup collected");
            events.push(GameEvent::Cue(pickup.kind.cue()));
            events.push(GameEvent::ScoreUpdate { score: state.score });
        }

        if input.fire
            && let Some(bullet) = try_fire(&mut stage.player, stage.bullets.len(), &cfg.physics)
        {
            tracing::debug!(ammo = stage.player.ammo, "Shot fired");
            stage.bullets.push(bullet);
            events.push(GameEvent::Cue(AudioCue::Shot));
        }

        if let Some(door) = stage.door.as_mut() {
            door.locked = door_locked(
                stage.player.has_key,
                stage.trophies_collected,
                stage.trophies_required,
            );
            if !door.locked && door.rect.overlaps(&stage.player.rect()) {
                return PlayOutcome::Completed;
            }
        }

        for enemy in &mut stage.enemies {
            if tick_enemy(enemy, &stage.grid, &cfg.physics) {
                tracing::debug!(kind = ?enemy.kind, "Enemy killed by hazard");
            }
        }

        if !stage.player.invulnerable.is_active() {
            let player_rect = stage.player.rect();
            if stage
                .enemies
                .iter()
                .any(|e| e.alive && e.rect().overlaps(&player_rect))
            {
                return PlayOutcome::Died(DeathCause::Enemy);
            }
        }

        let grid = &stage.grid;
        let enemies = &mut stage.enemies;
        stage.bullets.retain_mut(|bullet| match tick_bullet(bullet, grid, enemies) {
            BulletFate::Flying => true,
            BulletFate::HitEnemy(i) => {
                state.score += scoring::ENEMY_SCORE;
                tracing::debug!(enemy = i, score = state.score, "Enemy shot");
                events.push(GameEvent::Cue(AudioCue::EnemyDown));
                events.push(GameEvent::ScoreUpdate { score: state.score });
                false
            },
            BulletFate::Expired | BulletFate::LeftWorld | BulletFate::HitWall => false,
        });

        stage.camera = Camera::follow(&stage.player, &stage.grid, &cfg.view);
        PlayOutcome::Continue
    }
}

impl Default for DaveSession {
    fn default() -> Self {
        Self::new(PlatformerConfig::default(), LevelPack::builtin())
    }
}

impl TickedGame for DaveSession {
    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            name: "Dangerous Dave".to_string(),
            description: "Collect the trophies, grab the key, reach the door.".to_string(),
            level_count: self.levels.len(),
        }
    }

    fn tick_rate(&self) -> f32 {
        self.config.tick_rate_hz
    }

    fn update(&mut self, input: &InputSnapshot) -> Vec<GameEvent> {
        if self.paused {
            return Vec::new();
        }

        self.state.tick += 1;
        let mut events = Vec::new();

        match self.state.mode {
            Mode::Title | Mode::GameOver | Mode::Victory => {
                if input.start {
                    self.start_new_game(&mut events);
                }
            },
            Mode::Playing => match self.tick_playing(input, &mut events) {
                PlayOutcome::Continue => {},
                PlayOutcome::Died(cause) => self.lose_life(cause, &mut events),
                PlayOutcome::Completed => self.complete_level(&mut events),
            },
            Mode::Dying => {
                if self.state.mode_timer.tick() {
                    self.respawn(&mut events);
                }
            },
            Mode::LevelComplete => {
                if self.state.mode_timer.tick() {
                    self.advance_level(&mut events);
                }
            },
        }

        events
    }

    ticked_game_boilerplate!(state_type: SessionState, accept: Self::accepts_snapshot);

    fn is_finished(&self) -> bool {
        matches!(self.state.mode, Mode::GameOver | Mode::Victory)
    }
}
