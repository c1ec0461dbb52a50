//! All game entity types: pure data plus the geometry each one occupies.

use crate::config::GameConfig;
use crate::grid::{TileGrid, TILE_SIZE};

// ── Sizes ─────────────────────────────────────────────────────────────────────

pub const TANK_SIZE: f64 = 28.0;
pub const BULLET_SIZE: f64 = 4.0;
/// How far ahead of the firer's centre a new bullet appears.
pub const BULLET_SPAWN_OFFSET: f64 = 16.0;
/// Enemies test their next position with a rect shrunk by this much per side.
pub const ENEMY_MOVE_INSET: f64 = 2.0;

/// Player spawn tile as `(row, col)`.
pub const PLAYER_SPAWN_TILE: (usize, usize) = (12, 4);
/// Enemy spawn tiles along the top row as `(row, col)`.
pub const ENEMY_SPAWN_TILES: [(usize, usize); 3] = [(0, 0), (0, 6), (0, 12)];

// ── Geometry ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Strict axis-aligned overlap; touching edges do not count.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }

    pub fn inset(&self, by: f64) -> Rect {
        Rect {
            x: self.x + by,
            y: self.y + by,
            w: self.w - 2.0 * by,
            h: self.h - 2.0 * by,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// The last pixel on each side is `x + w - 1`, not `x + w`.
    pub fn corners(&self) -> [(f64, f64); 4] {
        let right = self.x + self.w - 1.0;
        let bottom = self.y + self.h - 1.0;
        [
            (self.x, self.y),
            (right, self.y),
            (self.x, bottom),
            (right, bottom),
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

/// Unit vector per direction, indexed by discriminant. Screen y grows downward.
const UNIT_VECTORS: [(f64, f64); 4] = [(0.0, -1.0), (1.0, 0.0), (0.0, 1.0), (-1.0, 0.0)];

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    pub fn unit(self) -> (f64, f64) {
        UNIT_VECTORS[self as usize]
    }
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BulletOwner {
    Player,
    Enemy,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bullet {
    pub x: f64,
    pub y: f64,
    pub direction: Direction,
    pub owner: BulletOwner,
    /// Once false the bullet is dead for good and is purged at end of tick.
    pub active: bool,
}

impl Bullet {
    /// A bullet fired from a tank whose rect is `firer`.
    pub fn fired_from(firer: &Rect, direction: Direction, owner: BulletOwner) -> Self {
        let (cx, cy) = firer.center();
        let (dx, dy) = direction.unit();
        Bullet {
            x: cx - BULLET_SIZE / 2.0 + dx * BULLET_SPAWN_OFFSET,
            y: cy - BULLET_SIZE / 2.0 + dy * BULLET_SPAWN_OFFSET,
            direction,
            owner,
            active: true,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, BULLET_SIZE, BULLET_SIZE)
    }
}

// ── Tanks ─────────────────────────────────────────────────────────────────────

/// Top-left pixel of a tank parked in the middle of a tile.
pub fn tank_origin(row: usize, col: usize) -> (f64, f64) {
    let (x, y) = TileGrid::tile_origin(row, col);
    let margin = (TILE_SIZE - TANK_SIZE) / 2.0;
    (x + margin, y + margin)
}

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub x: f64,
    pub y: f64,
    pub facing: Direction,
    pub active: bool,
}

impl Player {
    pub fn at_spawn() -> Self {
        let (x, y) = tank_origin(PLAYER_SPAWN_TILE.0, PLAYER_SPAWN_TILE.1);
        Player {
            x,
            y,
            facing: Direction::Up,
            active: true,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, TANK_SIZE, TANK_SIZE)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub x: f64,
    pub y: f64,
    pub facing: Direction,
    pub active: bool,
    /// Countdown to the next chance of turning.
    pub move_timer_ms: f64,
    /// Countdown to the next shot.
    pub shoot_timer_ms: f64,
}

impl Enemy {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, TANK_SIZE, TANK_SIZE)
    }
}

// ── Master game state ─────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Running,
    /// Terminal. Ticks leave the state untouched from here on.
    GameOver,
}

/// Everything the simulation owns. Cloneable so `tick` can hand back a new
/// copy without mutating the caller's.
#[derive(Clone, Debug)]
pub struct GameState {
    pub grid: TileGrid,
    pub player: Player,
    /// In spawn order, which is also the hit-resolution order.
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Bullet>,
    /// Time accumulated toward the next enemy spawn.
    pub spawn_timer_ms: f64,
    pub status: GameStatus,
    pub score: u32,
    pub frame: u64,
    /// Simulated time, after clamping.
    pub elapsed_ms: f64,
    pub config: GameConfig,
}
