use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::physics::EnemyKind;
use crate::pickups::PickupKind;

/// Tile edge length in pixels.
pub const TILE_SIZE: f32 = 16.0;

/// Smallest grid a level can produce (a solid ring around one open cell).
const MIN_DIMENSION: usize = 3;

/// Tile where the player starts when a level has no `P` marker.
pub const FALLBACK_SPAWN: (u32, u32) = (1, 1);

/// Persistent tile categories. Spawn markers never survive into the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    #[default]
    Empty,
    Solid,
    Ladder,
    Hazard,
}

impl TileKind {
    pub fn is_solid(self) -> bool {
        matches!(self, TileKind::Solid)
    }

    pub fn is_ladder(self) -> bool {
        matches!(self, TileKind::Ladder)
    }

    pub fn is_hazard(self) -> bool {
        matches!(self, TileKind::Hazard)
    }
}

/// What a level symbol stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Symbol {
    Tile(TileKind),
    Marker(Marker),
}

/// Spawn markers extracted from level text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Marker {
    PlayerStart,
    Pickup(PickupKind),
    Enemy(EnemyKind),
    Door,
}

fn classify(symbol: char) -> Symbol {
    match symbol {
        '#' => Symbol::Tile(TileKind::Solid),
        'H' => Symbol::Tile(TileKind::Ladder),
        'S' | '~' | 'F' => Symbol::Tile(TileKind::Hazard),
        'P' => Symbol::Marker(Marker::PlayerStart),
        'T' => Symbol::Marker(Marker::Pickup(PickupKind::Trophy)),
        'K' => Symbol::Marker(Marker::Pickup(PickupKind::Key)),
        'G' => Symbol::Marker(Marker::Pickup(PickupKind::Gun)),
        'J' => Symbol::Marker(Marker::Pickup(PickupKind::Jetpack)),
        'd' => Symbol::Marker(Marker::Pickup(PickupKind::Gem)),
        'L' => Symbol::Marker(Marker::Pickup(PickupKind::ExtraLife)),
        'M' => Symbol::Marker(Marker::Enemy(EnemyKind::Crawler)),
        'V' => Symbol::Marker(Marker::Enemy(EnemyKind::Flyer)),
        'D' => Symbol::Marker(Marker::Door),
        // '.' and anything unrecognised
        _ => Symbol::Tile(TileKind::Empty),
    }
}

/// Tile indices covered by the half-open pixel interval `[start, start + len)`.
pub fn tile_span(start: f32, len: f32) -> RangeInclusive<i32> {
    let first = (start / TILE_SIZE).floor() as i32;
    let last = ((start + len) / TILE_SIZE).ceil() as i32 - 1;
    first..=last
}

/// Static level geometry. Immutable after [`parse_level`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileGrid {
    /// Width in tiles.
    width: u32,
    /// Height in tiles.
    height: u32,
    /// Tile data stored row-major (y * width + x).
    tiles: Vec<TileKind>,
}

impl TileGrid {
    /// Grid from raw parts, unchecked.
    #[cfg(test)]
    pub(crate) fn from_raw(width: u32, height: u32, tiles: Vec<TileKind>) -> Self {
        Self {
            width,
            height,
            tiles,
        }
    }

    /// Tile at the given tile coordinate. Anything outside the grid is solid.
    pub fn tile_at(&self, tx: i32, ty: i32) -> TileKind {
        if tx < 0 || ty < 0 || tx >= self.width as i32 || ty >= self.height as i32 {
            return TileKind::Solid;
        }
        self.tiles
            .get(ty as usize * self.width as usize + tx as usize)
            .copied()
            .unwrap_or(TileKind::Solid)
    }

    /// Tile data matches the dimensions and meets the 3x3 minimum.
    pub fn is_well_formed(&self) -> bool {
        self.width >= 3
            && self.height >= 3
            && self.tiles.len() == self.width as usize * self.height as usize
    }

    pub fn is_solid(&self, tx: i32, ty: i32) -> bool {
        self.tile_at(tx, ty).is_solid()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_width(&self) -> f32 {
        self.width as f32 * TILE_SIZE
    }

    pub fn pixel_height(&self) -> f32 {
        self.height as f32 * TILE_SIZE
    }

    /// Every in-grid tile overlapping the pixel window, row by row.
    pub fn tiles_in_view(
        &self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
    ) -> impl Iterator<Item = (i32, i32, TileKind)> + '_ {
        let cols = tile_span(x, w);
        let rows = tile_span(y, h);
        let min_tx = (*cols.start()).max(0);
        let max_tx = (*cols.end()).min(self.width as i32 - 1);
        let min_ty = (*rows.start()).max(0);
        let max_ty = (*rows.end()).min(self.height as i32 - 1);
        (min_ty..=max_ty)
            .flat_map(move |ty| (min_tx..=max_tx).map(move |tx| (tx, ty, self.tile_at(tx, ty))))
    }
}

/// A spawn marker and the tile it was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spawn {
    pub tx: u32,
    pub ty: u32,
    pub marker: Marker,
}

/// A level after parsing: geometry plus the spawn records for entities.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLevel {
    pub grid: TileGrid,
    pub player_start: (u32, u32),
    /// Enemy and pickup markers in row-major order.
    pub spawns: Vec<Spawn>,
    /// Tile of the last `D` marker, if any.
    pub door: Option<(u32, u32)>,
}

/// Build a level from text rows.
///
/// Short rows are right-padded with empty tiles, the grid is grown to at
/// least 3x3, and the outermost ring is forced solid before markers are
/// read, so a marker on the border is lost. Never fails.
pub fn parse_level<S: AsRef<str>>(rows: &[S]) -> ParsedLevel {
    let source: Vec<Vec<char>> = rows.iter().map(|r| r.as_ref().chars().collect()).collect();
    let width = source
        .iter()
        .map(Vec::len)
        .max()
        .unwrap_or(0)
        .max(MIN_DIMENSION);
    let height = source.len().max(MIN_DIMENSION);

    let mut tiles = Vec::with_capacity(width * height);
    let mut spawns = Vec::new();
    let mut player_start = None;
    let mut door = None;

    for ty in 0..height {
        for tx in 0..width {
            let border = tx == 0 || ty == 0 || tx == width - 1 || ty == height - 1;
            if border {
                tiles.push(TileKind::Solid);
                continue;
            }
            let symbol = source
                .get(ty)
                .and_then(|row| row.get(tx))
                .copied()
                .unwrap_or('.');
            match classify(symbol) {
                Symbol::Tile(kind) => tiles.push(kind),
                Symbol::Marker(marker) => {
                    tiles.push(TileKind::Empty);
                    let (tx, ty) = (tx as u32, ty as u32);
                    match marker {
                        Marker::PlayerStart => player_start = Some((tx, ty)),
                        Marker::Door => door = Some((tx, ty)),
                        Marker::Pickup(_) | Marker::Enemy(_) => {
                            spawns.push(Spawn { tx, ty, marker });
                        },
                    }
                },
            }
        }
    }

    ParsedLevel {
        grid: TileGrid {
            width: width as u32,
            height: height as u32,
            tiles,
        },
        player_start: player_start.unwrap_or(FALLBACK_SPAWN),
        spawns,
        door,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsed_grids_are_well_formed() {
        assert!(parse_level(&["#####", "#P.D#", "#####"]).grid.is_well_formed());
        assert!(parse_level::<&str>(&[]).grid.is_well_formed());
    }

    #[test]
    fn short_tile_data_is_rejected_and_reads_solid() {
        let grid = TileGrid::from_raw(4, 4, vec![TileKind::Empty; 5]);
        assert!(!grid.is_well_formed());
        assert_eq!(grid.tile_at(1, 1), TileKind::Solid, "missing data never panics");
        assert_eq!(grid.tile_at(0, 1), TileKind::Empty);

        assert!(!TileGrid::from_raw(2, 2, vec![TileKind::Empty; 4]).is_well_formed());
    }

    #[test]
    fn out_of_bounds_is_solid() {
        let level = parse_level(&["#####", "#...#", "#####"]);
        let grid = &level.grid;
        assert_eq!(grid.tile_at(-1, 1), TileKind::Solid);
        assert_eq!(grid.tile_at(1, -1), TileKind::Solid);
        assert_eq!(grid.tile_at(5, 1), TileKind::Solid);
        assert_eq!(grid.tile_at(1, 3), TileKind::Solid);
        assert_eq!(grid.tile_at(2, 1), TileKind::Empty);
    }

    #[test]
    fn border_forced_solid_for_open_text() {
        let level = parse_level(&[".....", ".HS..", "....."]);
        let grid = &level.grid;
        for tx in 0..5 {
            assert!(grid.is_solid(tx, 0));
            assert!(grid.is_solid(tx, 2));
        }
        assert!(grid.is_solid(0, 1));
        assert!(grid.is_solid(4, 1));
        assert_eq!(grid.tile_at(1, 1), TileKind::Ladder);
        assert_eq!(grid.tile_at(2, 1), TileKind::Hazard);
    }

    #[test]
    fn short_rows_are_padded_with_empty() {
        let level = parse_level(&["########", "#..", "########", "########"]);
        assert_eq!(level.grid.width(), 8);
        assert_eq!(level.grid.height(), 4);
        assert_eq!(level.grid.tile_at(5, 1), TileKind::Empty);
        assert_eq!(level.grid.tile_at(7, 1), TileKind::Solid, "right border forced");
    }

    #[test]
    fn markers_become_empty_and_spawn_records() {
        let level = parse_level(&["#######", "#P.T.D#", "#.MKV.#", "#######"]);
        assert_eq!(level.player_start, (1, 1));
        assert_eq!(level.door, Some((5, 1)));
        for tx in 1..6 {
            assert_eq!(level.grid.tile_at(tx, 1), TileKind::Empty);
            assert_eq!(level.grid.tile_at(tx, 2), TileKind::Empty);
        }
        let markers: Vec<Marker> = level.spawns.iter().map(|s| s.marker).collect();
        assert_eq!(
            markers,
            vec![
                Marker::Pickup(PickupKind::Trophy),
                Marker::Enemy(EnemyKind::Crawler),
                Marker::Pickup(PickupKind::Key),
                Marker::Enemy(EnemyKind::Flyer),
            ]
        );
    }

    #[test]
    fn missing_player_marker_uses_fallback() {
        let level = parse_level(&["#####", "#...#", "#####"]);
        assert_eq!(level.player_start, FALLBACK_SPAWN);
        assert_eq!(level.door, None);
    }

    #[test]
    fn marker_on_border_is_lost() {
        let level = parse_level(&["##P##", "#...#", "##D##"]);
        assert_eq!(level.player_start, FALLBACK_SPAWN);
        assert_eq!(level.door, None);
        assert!(level.grid.is_solid(2, 0));
    }

    #[test]
    fn empty_input_yields_minimal_grid() {
        let rows: [&str; 0] = [];
        let level = parse_level(&rows);
        assert_eq!(level.grid.width(), 3);
        assert_eq!(level.grid.height(), 3);
        assert_eq!(level.grid.tile_at(1, 1), TileKind::Empty);
    }

    #[test]
    fn unknown_symbols_are_empty() {
        let level = parse_level(&["#####", "#?x!#", "#####"]);
        for tx in 1..4 {
            assert_eq!(level.grid.tile_at(tx, 1), TileKind::Empty);
        }
    }

    #[test]
    fn all_hazard_symbols_map_to_hazard() {
        let level = parse_level(&["#####", "#S~F#", "#####"]);
        for tx in 1..4 {
            assert!(level.grid.tile_at(tx, 1).is_hazard());
        }
    }

    #[test]
    fn tile_span_is_half_open() {
        assert_eq!(tile_span(0.0, 16.0), 0..=0);
        assert_eq!(tile_span(2.0, 12.0), 0..=0);
        assert_eq!(tile_span(10.0, 12.0), 0..=1);
        assert_eq!(tile_span(32.0, 0.5), 2..=2);
        assert_eq!(tile_span(-1.0, 2.0), -1..=0);
    }

    #[test]
    fn tiles_in_view_clamps_to_grid() {
        let level = parse_level(&["#####", "#...#", "#...#", "#####"]);
        let tiles: Vec<_> = level.grid.tiles_in_view(-40.0, -40.0, 1000.0, 1000.0).collect();
        assert_eq!(tiles.len(), 20);

        let window: Vec<_> = level.grid.tiles_in_view(16.0, 16.0, 16.0, 16.0).collect();
        assert_eq!(window, vec![(1, 1, TileKind::Empty)]);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn level_rows() -> impl Strategy<Value = Vec<String>> {
            prop::collection::vec("[#.HS~FPTKGJdLMVD?]{0,24}", 0..16)
        }

        proptest! {
            #[test]
            fn tile_at_outside_bounds_is_solid(
                rows in level_rows(),
                tx in -50i32..80,
                ty in -50i32..80,
            ) {
                let level = parse_level(&rows);
                let grid = &level.grid;
                let inside = tx >= 0 && ty >= 0
                    && tx < grid.width() as i32 && ty < grid.height() as i32;
                if !inside {
                    prop_assert_eq!(grid.tile_at(tx, ty), TileKind::Solid);
                }
            }

            #[test]
            fn parsed_border_is_always_solid(rows in level_rows()) {
                let level = parse_level(&rows);
                let grid = &level.grid;
                let (w, h) = (grid.width() as i32, grid.height() as i32);
                prop_assert!(w >= 3 && h >= 3);
                for tx in 0..w {
                    prop_assert!(grid.is_solid(tx, 0));
                    prop_assert!(grid.is_solid(tx, h - 1));
                }
                for ty in 0..h {
                    prop_assert!(grid.is_solid(0, ty));
                    prop_assert!(grid.is_solid(w - 1, ty));
                }
            }

            #[test]
            fn spawns_lie_on_empty_interior_tiles(rows in level_rows()) {
                let level = parse_level(&rows);
                for spawn in &level.spawns {
                    prop_assert_eq!(
                        level.grid.tile_at(spawn.tx as i32, spawn.ty as i32),
                        TileKind::Empty
                    );
                }
            }
        }
    }
}
