use serde::{Deserialize, Serialize};

use crate::tiles::{TILE_SIZE, TileGrid, TileKind, tile_span};

/// Axis-aligned box in pixels, y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Strict overlap: boxes that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

/// Position, size and velocity shared by every moving entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub vx: f32,
    pub vy: f32,
}

impl Body {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            x,
            y,
            w,
            h,
            vx: 0.0,
            vy: 0.0,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Move `body` by `delta` along one axis and resolve against solid tiles.
///
/// Every tile column (or row) the leading edge crosses is scanned nearest
/// first, so a delta larger than a tile cannot tunnel. On the first solid hit
/// the body is snapped flush against that tile, the velocity component on
/// this axis is zeroed, and `true` is returned.
pub fn move_axis(body: &mut Body, delta: f32, axis: Axis, grid: &TileGrid) -> bool {
    if delta == 0.0 {
        return false;
    }

    let (pos, size, cross) = match axis {
        Axis::X => (body.x, body.w, tile_span(body.y, body.h)),
        Axis::Y => (body.y, body.h, tile_span(body.x, body.w)),
    };

    let blocked = |line: i32| {
        cross.clone().any(|c| match axis {
            Axis::X => grid.is_solid(line, c),
            Axis::Y => grid.is_solid(c, line),
        })
    };

    let moved = pos + delta;
    let hit = if delta > 0.0 {
        let old_lead = pos + size;
        let new_lead = moved + size;
        let first = (old_lead / TILE_SIZE).floor() as i32;
        let last = (new_lead / TILE_SIZE).ceil() as i32 - 1;
        (first..=last)
            .find(|&line| blocked(line))
            .map(|line| line as f32 * TILE_SIZE - size)
    } else {
        let old_lead = pos;
        let new_lead = moved;
        let first = (old_lead / TILE_SIZE).ceil() as i32 - 1;
        let last = (new_lead / TILE_SIZE).floor() as i32;
        (last..=first)
            .rev()
            .find(|&line| blocked(line))
            .map(|line| (line + 1) as f32 * TILE_SIZE)
    };

    let (p, v) = match axis {
        Axis::X => (&mut body.x, &mut body.vx),
        Axis::Y => (&mut body.y, &mut body.vy),
    };
    match hit {
        Some(snapped) => {
            *p = snapped;
            *v = 0.0;
            true
        },
        None => {
            *p = moved;
            false
        },
    }
}

/// Whether any tile overlapped by `rect` satisfies `pred`.
pub fn touches(rect: &Rect, grid: &TileGrid, pred: impl Fn(TileKind) -> bool) -> bool {
    tile_span(rect.y, rect.h)
        .any(|ty| tile_span(rect.x, rect.w).any(|tx| pred(grid.tile_at(tx, ty))))
}

/// One-pixel strip directly beneath the body's feet intersects a solid tile.
pub fn probe_ground(body: &Body, grid: &TileGrid) -> bool {
    let feet = Rect::new(body.x, body.y + body.h, body.w, 1.0);
    touches(&feet, grid, TileKind::is_solid)
}

/// Whether `rect` overlaps any solid tile.
pub fn overlaps_solid(rect: &Rect, grid: &TileGrid) -> bool {
    touches(rect, grid, TileKind::is_solid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::parse_level;

    // Open room with a pillar at column 5 and a floor at row 6.
    fn room() -> TileGrid {
        parse_level(&[
            "##########",
            "#........#",
            "#....#...#",
            "#....#...#",
            "#....#...#",
            "#........#",
            "##########",
        ])
        .grid
    }

    #[test]
    fn rect_overlap_is_strict() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&Rect::new(9.0, 9.0, 5.0, 5.0)));
        assert!(!a.overlaps(&Rect::new(10.0, 0.0, 5.0, 5.0)), "shared edge");
        assert!(!a.overlaps(&Rect::new(0.0, 10.0, 5.0, 5.0)));
    }

    #[test]
    fn zero_delta_does_nothing() {
        let grid = room();
        let mut body = Body::new(20.0, 20.0, 12.0, 14.0);
        body.vx = 3.0;
        assert!(!move_axis(&mut body, 0.0, Axis::X, &grid));
        assert_eq!(body.x, 20.0);
        assert_eq!(body.vx, 3.0);
    }

    #[test]
    fn free_move_applies_full_delta() {
        let grid = room();
        let mut body = Body::new(20.0, 20.0, 12.0, 14.0);
        assert!(!move_axis(&mut body, 5.5, Axis::X, &grid));
        assert_eq!(body.x, 25.5);
    }

    #[test]
    fn moving_right_snaps_to_wall() {
        let grid = room();
        // Pillar occupies x in [80, 96) for rows 2..=4.
        let mut body = Body::new(66.0, 33.0, 12.0, 14.0);
        body.vx = 4.0;
        assert!(move_axis(&mut body, 4.0, Axis::X, &grid));
        assert_eq!(body.x, 80.0 - 12.0);
        assert_eq!(body.vx, 0.0);
    }

    #[test]
    fn moving_left_snaps_to_wall() {
        let grid = room();
        let mut body = Body::new(98.0, 33.0, 12.0, 14.0);
        body.vx = -4.0;
        assert!(move_axis(&mut body, -4.0, Axis::X, &grid));
        assert_eq!(body.x, 96.0);
        assert_eq!(body.vx, 0.0);
    }

    #[test]
    fn falling_lands_flush_on_floor() {
        let grid = room();
        let mut body = Body::new(20.0, 80.0, 12.0, 14.0);
        body.vy = 6.0;
        assert!(move_axis(&mut body, 6.0, Axis::Y, &grid));
        assert_eq!(body.y, 96.0 - 14.0);
        assert_eq!(body.vy, 0.0);
        assert!(probe_ground(&body, &grid));
    }

    #[test]
    fn rising_bumps_ceiling() {
        let grid = room();
        let mut body = Body::new(20.0, 18.0, 12.0, 14.0);
        body.vy = -7.0;
        assert!(move_axis(&mut body, -7.0, Axis::Y, &grid));
        assert_eq!(body.y, 16.0);
        assert_eq!(body.vy, 0.0);
    }

    #[test]
    fn large_delta_does_not_tunnel() {
        let grid = room();
        let mut body = Body::new(20.0, 33.0, 12.0, 14.0);
        assert!(move_axis(&mut body, 200.0, Axis::X, &grid));
        assert_eq!(body.x, 80.0 - 12.0, "stops at the first wall crossed");
    }

    #[test]
    fn passing_beside_pillar_is_free() {
        let grid = room();
        // Row 5 is open under the pillar.
        let mut body = Body::new(60.0, 81.0, 12.0, 14.0);
        assert!(!move_axis(&mut body, 40.0, Axis::X, &grid));
        assert_eq!(body.x, 100.0);
    }

    #[test]
    fn ground_probe_requires_contact() {
        let grid = room();
        let resting = Body::new(20.0, 82.0, 12.0, 14.0);
        assert!(probe_ground(&resting, &grid));
        let hovering = Body::new(20.0, 80.0, 12.0, 14.0);
        assert!(!probe_ground(&hovering, &grid));
    }

    #[test]
    fn touches_finds_ladder_in_span() {
        let grid = parse_level(&["#####", "#.H.#", "#####"]).grid;
        assert!(touches(&Rect::new(20.0, 18.0, 14.0, 12.0), &grid, TileKind::is_ladder));
        assert!(!touches(&Rect::new(17.0, 18.0, 14.0, 12.0), &grid, TileKind::is_ladder));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn sweep_never_ends_inside_solid(
                x in 17.0f32..140.0,
                y in 17.0f32..80.0,
                dx in -40.0f32..40.0,
                dy in -40.0f32..40.0,
            ) {
                let grid = room();
                let mut body = Body::new(x, y, 12.0, 14.0);
                prop_assume!(!overlaps_solid(&body.rect(), &grid));
                body.vx = dx;
                body.vy = dy;

                let hit_x = move_axis(&mut body, dx, Axis::X, &grid);
                prop_assert!(!overlaps_solid(&body.rect(), &grid));
                if hit_x {
                    prop_assert_eq!(body.vx, 0.0);
                }

                let hit_y = move_axis(&mut body, dy, Axis::Y, &grid);
                prop_assert!(!overlaps_solid(&body.rect(), &grid));
                if hit_y {
                    prop_assert_eq!(body.vy, 0.0);
                }
            }

            #[test]
            fn ground_probe_matches_definition(
                x in 17.0f32..140.0,
                y in 17.0f32..82.0,
            ) {
                let grid = room();
                let body = Body::new(x, y, 12.0, 14.0);
                let below = Rect::new(x, y + 14.0, 12.0, 1.0);
                let expected = tile_span(below.y, below.h).any(|ty| {
                    tile_span(below.x, below.w).any(|tx| grid.is_solid(tx, ty))
                });
                prop_assert_eq!(probe_ground(&body, &grid), expected);
            }
        }
    }
}
