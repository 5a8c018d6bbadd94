//! Board geometry
//!
//! Continuous positions are `Vec2` in cell units; grid cells are `IVec2`.
//! Collision bucketing floors continuous positions onto cells.

use std::ops::RangeInclusive;

use glam::{IVec2, Vec2};

use crate::consts::*;

/// Cell containing a continuous position
#[inline]
pub fn cell_of(pos: Vec2) -> IVec2 {
    pos.floor().as_ivec2()
}

/// Center of a cell in continuous coordinates
#[inline]
pub fn cell_center(cell: IVec2) -> Vec2 {
    cell.as_vec2() + Vec2::splat(0.5)
}

/// Whether a continuous position lies on the board
#[inline]
pub fn in_bounds(pos: Vec2) -> bool {
    pos.x >= 0.0 && pos.x < COLS as f32 && pos.y >= 0.0 && pos.y < ROWS as f32
}

/// Whether a cell lies on the board
#[inline]
pub fn cell_in_bounds(cell: IVec2) -> bool {
    (0..COLS).contains(&cell.x) && (0..ROWS).contains(&cell.y)
}

/// Lower-right corner reachable by anything confined to the player zone
#[inline]
pub fn zone_max() -> Vec2 {
    Vec2::new((COLS - 1) as f32, (ROWS - 1) as f32)
}

/// Upper-left corner of the player zone
#[inline]
pub fn zone_min() -> Vec2 {
    Vec2::new(0.0, PLAYER_ZONE_START as f32)
}

/// Clamp a position into the player zone (each axis independently)
#[inline]
pub fn clamp_to_zone(pos: Vec2) -> Vec2 {
    pos.clamp(zone_min(), zone_max())
}

/// Chebyshev proximity: both axes closer than `tolerance`
#[inline]
pub fn near(a: Vec2, b: Vec2, tolerance: f32) -> bool {
    (a - b).abs().max_element() < tolerance
}

/// Every cell inside a column/row rectangle (inclusive bounds)
pub fn cells_in(
    cols: RangeInclusive<i32>,
    rows: RangeInclusive<i32>,
) -> impl Iterator<Item = IVec2> {
    rows.flat_map(move |y| cols.clone().map(move |x| IVec2::new(x, y)))
}
