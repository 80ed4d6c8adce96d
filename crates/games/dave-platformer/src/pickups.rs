use serde::{Deserialize, Serialize};

use dave_core::game_trait::AudioCue;

use crate::collider::Rect;
use crate::physics::PlayerState;
use crate::tiles::TILE_SIZE;

pub const PICKUP_SIZE: f32 = 12.0;
pub const DOOR_WIDTH: f32 = 14.0;
pub const DOOR_HEIGHT: f32 = 22.0;

/// Collectible item types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    /// Counts toward unlocking the door.
    Trophy,
    Key,
    /// Grants the gun and a clip of ammo.
    Gun,
    /// Adds jetpack fuel.
    Jetpack,
    Gem,
    ExtraLife,
}

impl PickupKind {
    pub fn cue(self) -> AudioCue {
        match self {
            PickupKind::Key => AudioCue::KeyPickup,
            PickupKind::Gun => AudioCue::GunPickup,
            _ => AudioCue::Pickup,
        }
    }
}

/// Pickup placed in a level. Collected pickups stay in the list so the
/// renderer can skip them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    pub kind: PickupKind,
    pub rect: Rect,
    pub collected: bool,
}

impl Pickup {
    pub fn spawn(tx: u32, ty: u32, kind: PickupKind) -> Self {
        Self {
            kind,
            rect: Rect::new(
                tx as f32 * TILE_SIZE + 2.0,
                ty as f32 * TILE_SIZE + 2.0,
                PICKUP_SIZE,
                PICKUP_SIZE,
            ),
            collected: false,
        }
    }
}

/// Amounts granted by equipment pickups.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grants {
    pub gun_ammo: u32,
    pub jetpack_fuel: f32,
    pub jetpack_fuel_cap: f32,
}

/// Apply a pickup's effect on the player's inventory. Trophy counts and lives
/// belong to the session and are not touched here.
pub fn equip(kind: PickupKind, player: &mut PlayerState, grants: &Grants) {
    match kind {
        PickupKind::Key => player.has_key = true,
        PickupKind::Gun => {
            player.has_gun = true;
            player.ammo = player.ammo.saturating_add(grants.gun_ammo);
        },
        PickupKind::Jetpack => {
            player.jetpack_fuel = (player.jetpack_fuel + grants.jetpack_fuel).min(grants.jetpack_fuel_cap);
        },
        PickupKind::Trophy | PickupKind::Gem | PickupKind::ExtraLife => {},
    }
}

/// Level exit. Overlapping it while unlocked completes the level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Door {
    pub rect: Rect,
    pub locked: bool,
}

impl Door {
    /// Door anchored on the given tile; it extends half a tile above it.
    pub fn spawn(tx: u32, ty: u32) -> Self {
        Self {
            rect: Rect::new(
                tx as f32 * TILE_SIZE + 1.0,
                ty as f32 * TILE_SIZE - 8.0,
                DOOR_WIDTH,
                DOOR_HEIGHT,
            ),
            locked: true,
        }
    }
}

/// The door opens exactly when the key is held and every trophy is collected.
pub fn door_locked(has_key: bool, trophies_collected: u32, trophies_required: u32) -> bool {
    !(has_key && trophies_collected >= trophies_required)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grants() -> Grants {
        Grants {
            gun_ammo: 8,
            jetpack_fuel: 500.0,
            jetpack_fuel_cap: 900.0,
        }
    }

    #[test]
    fn gun_grants_ammo_cumulatively() {
        let mut p = PlayerState::spawn(1, 1);
        equip(PickupKind::Gun, &mut p, &grants());
        equip(PickupKind::Gun, &mut p, &grants());
        assert!(p.has_gun);
        assert_eq!(p.ammo, 16);
    }

    #[test]
    fn jetpack_fuel_is_capped() {
        let mut p = PlayerState::spawn(1, 1);
        equip(PickupKind::Jetpack, &mut p, &grants());
        assert_eq!(p.jetpack_fuel, 500.0);
        equip(PickupKind::Jetpack, &mut p, &grants());
        assert_eq!(p.jetpack_fuel, 900.0);
    }

    #[test]
    fn score_only_pickups_leave_inventory_alone() {
        let mut p = PlayerState::spawn(1, 1);
        let before = p.clone();
        equip(PickupKind::Trophy, &mut p, &grants());
        equip(PickupKind::Gem, &mut p, &grants());
        equip(PickupKind::ExtraLife, &mut p, &grants());
        assert_eq!(p, before);
    }

    #[test]
    fn door_lock_truth_table() {
        assert!(door_locked(false, 0, 0));
        assert!(door_locked(false, 3, 3));
        assert!(door_locked(true, 2, 3));
        assert!(!door_locked(true, 3, 3));
        assert!(!door_locked(true, 0, 0), "no trophies required");
    }

    #[test]
    fn spawn_geometry() {
        let p = Pickup::spawn(3, 2, PickupKind::Key);
        assert_eq!(p.rect, Rect::new(50.0, 34.0, 12.0, 12.0));
        let d = Door::spawn(3, 2);
        assert_eq!(d.rect, Rect::new(49.0, 24.0, 14.0, 22.0));
        assert!(d.locked);
    }
}
