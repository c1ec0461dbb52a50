//! The static tile map and its two collision queries.
//!
//! Coordinates passed in are screen pixels; the grid's top-left corner sits
//! at (`MAP_OFFSET_X`, `MAP_OFFSET_Y`).

use thiserror::Error;

use crate::entities::Rect;

// ── Geometry ──────────────────────────────────────────────────────────────────

pub const TILE_SIZE: f64 = 32.0;
pub const GRID_WIDTH: usize = 13;
pub const GRID_HEIGHT: usize = 13;
pub const MAP_OFFSET_X: f64 = 48.0;
pub const MAP_OFFSET_Y: f64 = 16.0;

/// The eagle. Solid no matter what the layout holds at this cell.
pub const BASE_CELL: (usize, usize) = (12, 6);

/// Level 1 layout, one digit per tile code (see [`TileKind`]).
pub const LEVEL_1: [[u8; GRID_WIDTH]; GRID_HEIGHT] = [
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0],
    [0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0],
    [0, 1, 0, 1, 0, 1, 2, 1, 0, 1, 0, 1, 0],
    [0, 1, 0, 1, 0, 0, 0, 0, 0, 1, 0, 1, 0],
    [0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0],
    [0, 0, 0, 0, 0, 1, 0, 1, 0, 0, 0, 0, 0],
    [0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0],
    [0, 1, 0, 1, 0, 0, 0, 0, 0, 1, 0, 1, 0],
    [0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0],
    [0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 1, 1, 1, 0, 0, 0, 0, 0],
];

// ── Tiles ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileKind {
    Empty,
    Brick,
    Steel,
    Water,
    /// Drawn over tanks, never blocks anything.
    Forest,
    Base,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown tile code {0}")]
pub struct TileCodeError(pub u8);

impl TryFrom<u8> for TileKind {
    type Error = TileCodeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(TileKind::Empty),
            1 => Ok(TileKind::Brick),
            2 => Ok(TileKind::Steel),
            3 => Ok(TileKind::Water),
            4 => Ok(TileKind::Forest),
            5 => Ok(TileKind::Base),
            other => Err(TileCodeError(other)),
        }
    }
}

impl TileKind {
    pub fn blocks_movement(self) -> bool {
        matches!(
            self,
            TileKind::Brick | TileKind::Steel | TileKind::Water | TileKind::Base
        )
    }
}

/// Outcome of a bullet striking the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockHit {
    /// A brick was knocked out; the cell is now empty.
    Destroyed,
    /// Steel absorbed the shot.
    Blocked,
    NoEffect,
}

// ── Grid ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct TileGrid {
    cells: [[TileKind; GRID_WIDTH]; GRID_HEIGHT],
}

impl Default for TileGrid {
    fn default() -> Self {
        Self::filled(TileKind::Empty)
    }
}

impl TileGrid {
    pub fn filled(kind: TileKind) -> Self {
        Self {
            cells: [[kind; GRID_WIDTH]; GRID_HEIGHT],
        }
    }

    /// Build a grid from raw tile codes.
    pub fn from_codes(codes: &[[u8; GRID_WIDTH]; GRID_HEIGHT]) -> Result<Self, TileCodeError> {
        let mut grid = Self::default();
        for (row, line) in codes.iter().enumerate() {
            for (col, &code) in line.iter().enumerate() {
                grid.cells[row][col] = TileKind::try_from(code)?;
            }
        }
        Ok(grid)
    }

    pub fn level_1() -> Self {
        // LEVEL_1 only holds codes 0..=5.
        Self::from_codes(&LEVEL_1).unwrap_or_default()
    }

    pub fn tile(&self, row: usize, col: usize) -> Option<TileKind> {
        self.cells.get(row).and_then(|line| line.get(col)).copied()
    }

    pub fn set_tile(&mut self, row: usize, col: usize, kind: TileKind) {
        if let Some(cell) = self.cells.get_mut(row).and_then(|line| line.get_mut(col)) {
            *cell = kind;
        }
    }

    /// Row-major iteration for the renderer: `(row, col, kind)`.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, TileKind)> + '_ {
        self.cells.iter().enumerate().flat_map(|(row, line)| {
            line.iter()
                .enumerate()
                .map(move |(col, &kind)| (row, col, kind))
        })
    }

    /// The `(row, col)` under a screen pixel, or `None` off the map.
    pub fn cell_at(x: f64, y: f64) -> Option<(usize, usize)> {
        let map_x = x - MAP_OFFSET_X;
        let map_y = y - MAP_OFFSET_Y;
        if map_x < 0.0
            || map_y < 0.0
            || map_x >= GRID_WIDTH as f64 * TILE_SIZE
            || map_y >= GRID_HEIGHT as f64 * TILE_SIZE
        {
            return None;
        }
        Some((
            (map_y / TILE_SIZE).floor() as usize,
            (map_x / TILE_SIZE).floor() as usize,
        ))
    }

    /// Screen pixel of a tile's top-left corner.
    pub fn tile_origin(row: usize, col: usize) -> (f64, f64) {
        (
            MAP_OFFSET_X + col as f64 * TILE_SIZE,
            MAP_OFFSET_Y + row as f64 * TILE_SIZE,
        )
    }

    /// Corner-sampled solidity test. A corner off the map counts as solid.
    ///
    /// Only the four corners are checked, so a rect wider than a tile can
    /// straddle a one-tile obstacle without touching it.
    pub fn is_solid(&self, rect: &Rect) -> bool {
        rect.corners()
            .iter()
            .any(|&(x, y)| match Self::cell_at(x, y) {
                None => true,
                Some(cell) if cell == BASE_CELL => true,
                Some((row, col)) => self.cells[row][col].blocks_movement(),
            })
    }

    /// Resolve a bullet strike at the centre of `rect`.
    pub fn destroy_block(&mut self, rect: &Rect) -> BlockHit {
        let (cx, cy) = rect.center();
        let Some((row, col)) = Self::cell_at(cx, cy) else {
            return BlockHit::NoEffect;
        };
        match self.cells[row][col] {
            TileKind::Brick => {
                self.cells[row][col] = TileKind::Empty;
                BlockHit::Destroyed
            }
            TileKind::Steel => BlockHit::Blocked,
            _ => BlockHit::NoEffect,
        }
    }
}
