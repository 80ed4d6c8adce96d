use serde::{Deserialize, Serialize};

use dave_core::input::InputSnapshot;
use dave_core::timer::Countdown;

use crate::collider::{Axis, Body, Rect, move_axis, overlaps_solid, probe_ground, touches};
use crate::tiles::{TILE_SIZE, TileGrid, TileKind};

// All rates are per tick, distances in pixels, y grows downward.

/// Downward acceleration added every tick.
pub const GRAVITY: f32 = 0.38;
/// Terminal falling speed.
pub const MAX_FALL_SPEED: f32 = 6.4;
/// Fastest upward speed (jump launch and jetpack).
pub const MAX_ASCENT_SPEED: f32 = 9.0;
/// Horizontal acceleration while a direction is held.
pub const RUN_ACCEL: f32 = 0.45;
pub const MAX_RUN_SPEED: f32 = 2.45;
/// Velocity multiplier per idle tick on the ground.
pub const GROUND_DRAG: f32 = 0.78;
/// Velocity multiplier per idle tick in the air.
pub const AIR_DRAG: f32 = 0.92;
/// Idle horizontal speeds below this snap to zero.
pub const IDLE_SNAP: f32 = 0.05;
pub const JUMP_VELOCITY: f32 = -7.2;
pub const LADDER_SPEED: f32 = 1.35;
pub const JETPACK_THRUST: f32 = 0.45;
/// Fuel consumed per thrusting tick.
pub const JETPACK_DRAIN: f32 = 1.0;
pub const MONSTER_SPEED: f32 = 0.95;
pub const FLYER_SPEED: f32 = 0.8;
/// Fastest upward speed for walking monsters.
pub const MONSTER_MAX_RISE: f32 = 8.0;
pub const BULLET_SPEED: f32 = 5.8;
/// Bullet lifetime in ticks.
pub const BULLET_LIFETIME: u32 = 95;
/// Ticks between shots.
pub const SHOOT_COOLDOWN: u32 = 12;
/// Most bullets alive at once.
pub const MAX_BULLETS: usize = 3;

pub const PLAYER_WIDTH: f32 = 12.0;
pub const PLAYER_HEIGHT: f32 = 14.0;
pub const CRAWLER_WIDTH: f32 = 12.0;
pub const CRAWLER_HEIGHT: f32 = 14.0;
pub const FLYER_WIDTH: f32 = 12.0;
pub const FLYER_HEIGHT: f32 = 8.0;
pub const BULLET_WIDTH: f32 = 4.0;
pub const BULLET_HEIGHT: f32 = 2.0;

/// Tunable movement constants, loadable from the `[physics]` TOML table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub max_fall_speed: f32,
    pub max_ascent_speed: f32,
    pub run_accel: f32,
    pub max_run_speed: f32,
    pub ground_drag: f32,
    pub air_drag: f32,
    pub idle_snap: f32,
    pub jump_velocity: f32,
    pub ladder_speed: f32,
    pub jetpack_thrust: f32,
    pub jetpack_drain: f32,
    pub monster_speed: f32,
    pub flyer_speed: f32,
    pub monster_max_rise: f32,
    pub bullet_speed: f32,
    pub bullet_lifetime: u32,
    pub shoot_cooldown: u32,
    pub max_bullets: usize,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            max_fall_speed: MAX_FALL_SPEED,
            max_ascent_speed: MAX_ASCENT_SPEED,
            run_accel: RUN_ACCEL,
            max_run_speed: MAX_RUN_SPEED,
            ground_drag: GROUND_DRAG,
            air_drag: AIR_DRAG,
            idle_snap: IDLE_SNAP,
            jump_velocity: JUMP_VELOCITY,
            ladder_speed: LADDER_SPEED,
            jetpack_thrust: JETPACK_THRUST,
            jetpack_drain: JETPACK_DRAIN,
            monster_speed: MONSTER_SPEED,
            flyer_speed: FLYER_SPEED,
            monster_max_rise: MONSTER_MAX_RISE,
            bullet_speed: BULLET_SPEED,
            bullet_lifetime: BULLET_LIFETIME,
            shoot_cooldown: SHOOT_COOLDOWN,
            max_bullets: MAX_BULLETS,
        }
    }
}

impl PhysicsConfig {
    /// Check that every value is finite and that speed limits and speeds are
    /// positive, so the per-tick clamps always have `min <= max`.
    pub fn validate(&self) -> Result<(), String> {
        let positive = [
            ("max_fall_speed", self.max_fall_speed),
            ("max_ascent_speed", self.max_ascent_speed),
            ("max_run_speed", self.max_run_speed),
            ("monster_max_rise", self.monster_max_rise),
            ("run_accel", self.run_accel),
            ("ladder_speed", self.ladder_speed),
            ("monster_speed", self.monster_speed),
            ("flyer_speed", self.flyer_speed),
            ("bullet_speed", self.bullet_speed),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("physics.{name} must be a positive number, got {value}"));
            }
        }
        let finite = [
            ("gravity", self.gravity),
            ("ground_drag", self.ground_drag),
            ("air_drag", self.air_drag),
            ("idle_snap", self.idle_snap),
            ("jump_velocity", self.jump_velocity),
            ("jetpack_thrust", self.jetpack_thrust),
            ("jetpack_drain", self.jetpack_drain),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(format!("physics.{name} must be finite, got {value}"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }
}

/// State of the player character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub body: Body,
    pub facing: Facing,
    pub on_ground: bool,
    pub on_ladder: bool,
    pub has_key: bool,
    pub has_gun: bool,
    pub ammo: u32,
    pub jetpack_fuel: f32,
    pub invulnerable: Countdown,
    pub shoot_cooldown: Countdown,
    /// Thrust was applied on the last tick.
    pub thrusting: bool,
}

impl PlayerState {
    /// Fresh player standing in the given tile.
    pub fn spawn(tx: u32, ty: u32) -> Self {
        Self {
            body: Body::new(
                tx as f32 * TILE_SIZE + 2.0,
                ty as f32 * TILE_SIZE + 1.0,
                PLAYER_WIDTH,
                PLAYER_HEIGHT,
            ),
            facing: Facing::Right,
            on_ground: false,
            on_ladder: false,
            has_key: false,
            has_gun: false,
            ammo: 0,
            jetpack_fuel: 0.0,
            invulnerable: Countdown::idle(),
            shoot_cooldown: Countdown::idle(),
            thrusting: false,
        }
    }

    pub fn rect(&self) -> Rect {
        self.body.rect()
    }
}

/// What happened to the player during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerStep {
    pub jumped: bool,
    /// Thrust started this tick (was not thrusting on the previous one).
    pub thrust_started: bool,
    pub touched_hazard: bool,
    pub fell_out: bool,
}

/// Advance the player by one tick: timers, input integration, sweep, hazards.
pub fn tick_player(
    p: &mut PlayerState,
    input: &InputSnapshot,
    grid: &TileGrid,
    cfg: &PhysicsConfig,
) -> PlayerStep {
    let mut step = PlayerStep::default();

    p.shoot_cooldown.tick();
    p.invulnerable.tick();

    // Horizontal
    if input.left {
        p.body.vx -= cfg.run_accel;
        p.facing = Facing::Left;
    }
    if input.right {
        p.body.vx += cfg.run_accel;
        p.facing = Facing::Right;
    }
    if !input.left && !input.right {
        p.body.vx *= if p.on_ground {
            cfg.ground_drag
        } else {
            cfg.air_drag
        };
        if p.body.vx.abs() < cfg.idle_snap {
            p.body.vx = 0.0;
        }
    }
    p.body.vx = p.body.vx.clamp(-cfg.max_run_speed, cfg.max_run_speed);

    // Vertical
    p.on_ladder = touches(&p.rect(), grid, TileKind::is_ladder);

    if input.jump && (p.on_ground || p.on_ladder) {
        p.body.vy = cfg.jump_velocity;
        p.on_ground = false;
        p.on_ladder = false;
        step.jumped = true;
    }

    let climbing = p.on_ladder && (input.up || input.down);
    if climbing {
        p.body.vy = 0.0;
        if input.up {
            p.body.vy -= cfg.ladder_speed;
        }
        if input.down {
            p.body.vy += cfg.ladder_speed;
        }
    } else {
        p.body.vy += cfg.gravity;
    }

    let thrusting = input.thrust && p.jetpack_fuel > 0.0;
    if thrusting {
        p.body.vy -= cfg.jetpack_thrust;
        p.jetpack_fuel = (p.jetpack_fuel - cfg.jetpack_drain).max(0.0);
    }
    step.thrust_started = thrusting && !p.thrusting;
    p.thrusting = thrusting;

    p.body.vy = p.body.vy.clamp(-cfg.max_ascent_speed, cfg.max_fall_speed);

    let (dx, dy) = (p.body.vx, p.body.vy);
    move_axis(&mut p.body, dx, Axis::X, grid);
    move_axis(&mut p.body, dy, Axis::Y, grid);
    p.on_ground = probe_ground(&p.body, grid);

    step.touched_hazard = touches(&p.rect(), grid, TileKind::is_hazard);
    step.fell_out = p.body.y > grid.pixel_height();
    step
}

/// Spawn a bullet from the player's muzzle if the gun is ready.
///
/// No-op without a gun, without ammo, during cooldown, or when `live_bullets`
/// already reached the cap.
pub fn try_fire(p: &mut PlayerState, live_bullets: usize, cfg: &PhysicsConfig) -> Option<BulletState> {
    if !p.has_gun || p.ammo == 0 || p.shoot_cooldown.is_active() || live_bullets >= cfg.max_bullets
    {
        return None;
    }
    p.ammo -= 1;
    p.shoot_cooldown = Countdown::new(cfg.shoot_cooldown);

    let x = match p.facing {
        Facing::Right => p.body.x + p.body.w,
        Facing::Left => p.body.x - BULLET_WIDTH,
    };
    let y = p.body.y + (p.body.h / 2.0).floor();
    let mut body = Body::new(x, y, BULLET_WIDTH, BULLET_HEIGHT);
    body.vx = p.facing.sign() * cfg.bullet_speed;
    Some(BulletState {
        body,
        life: Countdown::new(cfg.bullet_lifetime),
    })
}

/// Enemy behaviours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Walks under gravity and turns at walls and ledges.
    Crawler,
    /// Hovers at spawn height and turns at walls.
    Flyer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyState {
    pub body: Body,
    pub kind: EnemyKind,
    /// Patrol direction.
    pub heading: Facing,
    pub on_ground: bool,
    pub alive: bool,
}

impl EnemyState {
    /// New enemy in the given tile. Even columns start walking right.
    pub fn spawn(tx: u32, ty: u32, kind: EnemyKind) -> Self {
        let (w, h, y_offset) = match kind {
            EnemyKind::Crawler => (CRAWLER_WIDTH, CRAWLER_HEIGHT, 1.0),
            EnemyKind::Flyer => (FLYER_WIDTH, FLYER_HEIGHT, 4.0),
        };
        let heading = if tx % 2 == 0 {
            Facing::Right
        } else {
            Facing::Left
        };
        Self {
            body: Body::new(
                tx as f32 * TILE_SIZE + 2.0,
                ty as f32 * TILE_SIZE + y_offset,
                w,
                h,
            ),
            kind,
            heading,
            on_ground: false,
            alive: true,
        }
    }

    pub fn rect(&self) -> Rect {
        self.body.rect()
    }
}

/// Advance one enemy by one tick. Returns true if it died on a hazard this tick.
pub fn tick_enemy(e: &mut EnemyState, grid: &TileGrid, cfg: &PhysicsConfig) -> bool {
    if !e.alive {
        return false;
    }

    match e.kind {
        EnemyKind::Crawler => {
            e.body.vx = e.heading.sign() * cfg.monster_speed;
            e.body.vy = (e.body.vy + cfg.gravity).clamp(-cfg.monster_max_rise, cfg.max_fall_speed);

            let (dx, dy) = (e.body.vx, e.body.vy);
            if move_axis(&mut e.body, dx, Axis::X, grid) {
                e.heading = e.heading.flipped();
            }
            move_axis(&mut e.body, dy, Axis::Y, grid);
            e.on_ground = probe_ground(&e.body, grid);

            if e.on_ground {
                let lead_x = match e.heading {
                    Facing::Right => e.body.x + e.body.w + 1.0,
                    Facing::Left => e.body.x - 1.0,
                };
                let foot_y = e.body.y + e.body.h + 1.0;
                let tx = (lead_x / TILE_SIZE).floor() as i32;
                let ty = (foot_y / TILE_SIZE).floor() as i32;
                if !grid.is_solid(tx, ty) {
                    e.heading = e.heading.flipped();
                }
            }
        },
        EnemyKind::Flyer => {
            e.body.vx = e.heading.sign() * cfg.flyer_speed;
            let dx = e.body.vx;
            if move_axis(&mut e.body, dx, Axis::X, grid) {
                e.heading = e.heading.flipped();
            }
        },
    }

    if touches(&e.rect(), grid, TileKind::is_hazard) {
        e.alive = false;
        return true;
    }
    false
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletState {
    pub body: Body,
    pub life: Countdown,
}

impl BulletState {
    pub fn rect(&self) -> Rect {
        self.body.rect()
    }
}

/// Outcome of one bullet tick. Every variant except `Flying` removes the bullet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulletFate {
    Flying,
    Expired,
    LeftWorld,
    HitWall,
    /// Killed the enemy at this index.
    HitEnemy(usize),
}

/// Move a bullet in a straight line and test it against tiles and enemies.
pub fn tick_bullet(b: &mut BulletState, grid: &TileGrid, enemies: &mut [EnemyState]) -> BulletFate {
    b.body.x += b.body.vx;

    if b.life.tick() {
        return BulletFate::Expired;
    }
    if b.body.x + b.body.w < 0.0 || b.body.x > grid.pixel_width() {
        return BulletFate::LeftWorld;
    }
    if overlaps_solid(&b.rect(), grid) {
        return BulletFate::HitWall;
    }

    let rect = b.rect();
    if let Some((i, enemy)) = enemies
        .iter_mut()
        .enumerate()
        .find(|(_, e)| e.alive && e.rect().overlaps(&rect))
    {
        enemy.alive = false;
        return BulletFate::HitEnemy(i);
    }
    BulletFate::Flying
}

/// Read-only view over any entity, for renderers.
#[derive(Debug, Clone, Copy)]
pub enum Entity<'a> {
    Player(&'a PlayerState),
    Enemy(&'a EnemyState),
    Bullet(&'a BulletState),
}

impl Entity<'_> {
    pub fn rect(&self) -> Rect {
        match self {
            Entity::Player(p) => p.rect(),
            Entity::Enemy(e) => e.rect(),
            Entity::Bullet(b) => b.rect(),
        }
    }

    pub fn facing(&self) -> Facing {
        match self {
            Entity::Player(p) => p.facing,
            Entity::Enemy(e) => e.heading,
            Entity::Bullet(b) => {
                if b.body.vx < 0.0 {
                    Facing::Left
                } else {
                    Facing::Right
                }
            },
        }
    }
}
