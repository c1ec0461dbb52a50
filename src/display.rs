//! Rendering layer: all terminal drawing lives here.
//!
//! Each function gets a writer and a read-only view of the game state. One
//! map tile is two terminal columns by one row, so a column covers 16 px
//! horizontally and a row covers 32 px vertically.

use std::io::Write;

use battle_city::entities::{Bullet, BulletOwner, Direction, GameState, GameStatus, TANK_SIZE};
use battle_city::grid::{
    TileKind, BASE_CELL, GRID_HEIGHT, GRID_WIDTH, MAP_OFFSET_X, MAP_OFFSET_Y, TILE_SIZE,
};
use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};

// ── Layout ────────────────────────────────────────────────────────────────────

/// Screen row of the board's top border (row 0 is the HUD).
const BOARD_TOP: u16 = 1;
const BOARD_LEFT: u16 = 0;
const COLS_PER_TILE: u16 = 2;
const PX_PER_COL: f64 = TILE_SIZE / COLS_PER_TILE as f64;
const BOARD_COLS: u16 = GRID_WIDTH as u16 * COLS_PER_TILE;
const BOARD_ROWS: u16 = GRID_HEIGHT as u16;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD: Color = Color::Yellow;
const C_BRICK: Color = Color::DarkRed;
const C_STEEL: Color = Color::Grey;
const C_WATER: Color = Color::Blue;
const C_FOREST: Color = Color::DarkGreen;
const C_BASE: Color = Color::White;
const C_PLAYER: Color = Color::Yellow;
const C_ENEMY: Color = Color::Grey;
const C_BULLET_PLAYER: Color = Color::Cyan;
const C_BULLET_ENEMY: Color = Color::Magenta;
const C_HINT: Color = Color::DarkGrey;

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, state: &GameState) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out)?;
    draw_hud(out, state)?;
    draw_terrain(out, state)?;

    for enemy in &state.enemies {
        draw_tank(out, enemy.x, enemy.y, enemy.facing, C_ENEMY)?;
    }
    if state.player.active {
        draw_tank(out, state.player.x, state.player.y, state.player.facing, C_PLAYER)?;
    }
    for bullet in &state.bullets {
        draw_bullet(out, bullet)?;
    }

    // Forest hides whatever is under it.
    draw_forest(out, state)?;
    draw_controls_hint(out)?;

    if state.status == GameStatus::GameOver {
        draw_game_over(out, state)?;
    }

    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, BOARD_TOP + BOARD_ROWS + 3))?;
    out.flush()?;
    Ok(())
}

// ── Coordinates ───────────────────────────────────────────────────────────────

/// Terminal cell of a map pixel, or `None` when it falls off the board.
fn screen_pos(x: f64, y: f64) -> Option<(u16, u16)> {
    let col = ((x - MAP_OFFSET_X) / PX_PER_COL).floor();
    let row = ((y - MAP_OFFSET_Y) / TILE_SIZE).floor();
    if col < 0.0 || row < 0.0 || col >= BOARD_COLS as f64 || row >= BOARD_ROWS as f64 {
        return None;
    }
    Some((BOARD_LEFT + 1 + col as u16, BOARD_TOP + 1 + row as u16))
}

fn tile_pos(row: usize, col: usize) -> (u16, u16) {
    (
        BOARD_LEFT + 1 + col as u16 * COLS_PER_TILE,
        BOARD_TOP + 1 + row as u16,
    )
}

// ── Border & HUD ──────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W) -> std::io::Result<()> {
    let w = BOARD_COLS as usize;
    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(BOARD_LEFT, BOARD_TOP))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w))))?;

    for row in 0..BOARD_ROWS {
        let y = BOARD_TOP + 1 + row;
        out.queue(cursor::MoveTo(BOARD_LEFT, y))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(BOARD_LEFT + BOARD_COLS + 1, y))?;
        out.queue(Print("│"))?;
    }

    out.queue(cursor::MoveTo(BOARD_LEFT, BOARD_TOP + BOARD_ROWS + 1))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w))))?;
    Ok(())
}

fn draw_hud<W: Write>(out: &mut W, state: &GameState) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(BOARD_LEFT + 1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD))?;
    out.queue(Print(format!(
        "Score:{:>6}  Enemies:{}/{}",
        state.score,
        state.enemies.len(),
        state.config.max_enemies
    )))?;
    Ok(())
}

// ── Terrain ───────────────────────────────────────────────────────────────────

fn draw_terrain<W: Write>(out: &mut W, state: &GameState) -> std::io::Result<()> {
    for (row, col, kind) in state.grid.cells() {
        let (glyph, color) = match kind {
            TileKind::Brick => ("▓▓", C_BRICK),
            TileKind::Steel => ("██", C_STEEL),
            TileKind::Water => ("≈≈", C_WATER),
            TileKind::Base => ("⌂⌂", C_BASE),
            TileKind::Empty | TileKind::Forest => continue,
        };
        let (x, y) = tile_pos(row, col);
        out.queue(cursor::MoveTo(x, y))?;
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(glyph))?;
    }

    // The eagle always shows, whatever the layout says about its cell.
    let (x, y) = tile_pos(BASE_CELL.0, BASE_CELL.1);
    out.queue(cursor::MoveTo(x, y))?;
    out.queue(style::SetForegroundColor(C_BASE))?;
    out.queue(Print("⌂⌂"))?;
    Ok(())
}

fn draw_forest<W: Write>(out: &mut W, state: &GameState) -> std::io::Result<()> {
    out.queue(style::SetForegroundColor(C_FOREST))?;
    for (row, col, _) in state
        .grid
        .cells()
        .filter(|&(_, _, kind)| kind == TileKind::Forest)
    {
        let (x, y) = tile_pos(row, col);
        out.queue(cursor::MoveTo(x, y))?;
        out.queue(Print("♣♣"))?;
    }
    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_tank<W: Write>(
    out: &mut W,
    x: f64,
    y: f64,
    facing: Direction,
    color: Color,
) -> std::io::Result<()> {
    // Snap to the nearest column pair so a tank parked on a tile covers
    // exactly that tile's two columns.
    let half = TANK_SIZE / 2.0;
    let left = x + half - TILE_SIZE / 2.0;
    let snapped = ((left - MAP_OFFSET_X) / PX_PER_COL).round() * PX_PER_COL + MAP_OFFSET_X;
    let Some((sx, sy)) = screen_pos(snapped, y + half) else {
        return Ok(());
    };

    let glyph = match facing {
        Direction::Up => "▲▲",
        Direction::Right => "▶▶",
        Direction::Down => "▼▼",
        Direction::Left => "◀◀",
    };
    out.queue(cursor::MoveTo(sx, sy))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(glyph))?;
    Ok(())
}

fn draw_bullet<W: Write>(out: &mut W, bullet: &Bullet) -> std::io::Result<()> {
    let (cx, cy) = bullet.rect().center();
    let Some((sx, sy)) = screen_pos(cx, cy) else {
        return Ok(());
    };
    let color = match bullet.owner {
        BulletOwner::Player => C_BULLET_PLAYER,
        BulletOwner::Enemy => C_BULLET_ENEMY,
    };
    out.queue(cursor::MoveTo(sx, sy))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print("•"))?;
    Ok(())
}

// ── Controls hint (below the board) ───────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(BOARD_LEFT + 1, BOARD_TOP + BOARD_ROWS + 2))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("Arrows / WASD : Move   SPACE : Fire   Q : Quit"))?;
    Ok(())
}

// ── Game-over overlay ─────────────────────────────────────────────────────────

fn draw_game_over<W: Write>(out: &mut W, state: &GameState) -> std::io::Result<()> {
    let score_line = format!("Final Score: {:>6}", state.score);
    let lines: [(&str, Color); 4] = [
        ("╔════════════════════╗", Color::Red),
        ("║     GAME  OVER     ║", Color::Red),
        ("╚════════════════════╝", Color::Red),
        (&score_line, Color::Yellow),
    ];

    let cx = BOARD_LEFT + 1 + BOARD_COLS / 2;
    let start_row = BOARD_TOP + 1 + BOARD_ROWS / 2 - 2;

    for (i, (msg, color)) in lines.iter().enumerate() {
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, start_row + i as u16))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }
    Ok(())
}
