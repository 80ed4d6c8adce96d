use crate::pickups::PickupKind;

pub const TROPHY_SCORE: u32 = 100;
pub const KEY_SCORE: u32 = 400;
pub const GUN_SCORE: u32 = 200;
pub const JETPACK_SCORE: u32 = 150;
pub const GEM_SCORE: u32 = 100;
pub const EXTRA_LIFE_SCORE: u32 = 0;
/// Awarded when a bullet kills an enemy.
pub const ENEMY_SCORE: u32 = 250;
/// Awarded on touching an unlocked door.
pub const LEVEL_SCORE: u32 = 1000;

/// Score for collecting a pickup.
///
/// Scoring: trophy = 100, key = 400, gun = 200, jetpack = 150, gem = 100, extra life = 0.
pub fn pickup_score(kind: PickupKind) -> u32 {
    match kind {
        PickupKind::Trophy => TROPHY_SCORE,
        PickupKind::Key => KEY_SCORE,
        PickupKind::Gun => GUN_SCORE,
        PickupKind::Jetpack => JETPACK_SCORE,
        PickupKind::Gem => GEM_SCORE,
        PickupKind::ExtraLife => EXTRA_LIFE_SCORE,
    }
}
