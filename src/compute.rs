//! Game logic: one `tick` advances the whole battlefield by a clamped
//! slice of time.
//!
//! `tick` takes the current `GameState` by reference and returns a new one.
//! The step functions it is built from work on `&mut GameState` and are
//! public so each stage can be driven on its own. All randomness comes
//! through the injected RNG, so a seeded RNG gives a reproducible game.

use rand::Rng;

use crate::config::{GameConfig, TimerRange};
use crate::entities::{
    tank_origin, Bullet, BulletOwner, Direction, Enemy, GameState, GameStatus, Player, Rect,
    ENEMY_MOVE_INSET, ENEMY_SPAWN_TILES, TANK_SIZE,
};
use crate::grid::{BlockHit, TileGrid};
use crate::input::TickInput;

/// Score awarded per enemy destroyed.
pub const ENEMY_SCORE: u32 = 100;

// ── Constructors ─────────────────────────────────────────────────────────────

/// Level 1 with the player on its spawn tile and no enemies yet.
pub fn init_state(config: GameConfig) -> GameState {
    GameState {
        grid: TileGrid::level_1(),
        player: Player::at_spawn(),
        enemies: Vec::new(),
        bullets: Vec::new(),
        spawn_timer_ms: 0.0,
        status: GameStatus::Running,
        score: 0,
        frame: 0,
        elapsed_ms: 0.0,
        config,
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Bound the time fed into one tick. Garbage (negative, NaN) becomes zero.
pub fn clamp_dt(dt_ms: f64, max_ms: f64) -> f64 {
    if dt_ms.is_nan() || dt_ms <= 0.0 {
        0.0
    } else {
        dt_ms.min(max_ms)
    }
}

pub fn random_direction(rng: &mut impl Rng) -> Direction {
    Direction::ALL[rng.gen_range(0..Direction::ALL.len())]
}

pub fn roll_timer(range: TimerRange, rng: &mut impl Rng) -> f64 {
    rng.gen_range(range.min..=range.max)
}

fn step(x: f64, y: f64, direction: Direction, distance: f64) -> (f64, f64) {
    let (dx, dy) = direction.unit();
    (x + dx * distance, y + dy * distance)
}

fn active_enemy_count(state: &GameState) -> usize {
    state.enemies.iter().filter(|e| e.active).count()
}

// ── Player ───────────────────────────────────────────────────────────────────

/// Steer, move and fire the player from this tick's input.
///
/// Movement is all-or-nothing: a step that would end inside solid terrain or
/// another tank is dropped, though the facing still changes.
pub fn update_player(state: &mut GameState, input: &TickInput, dt: f64) {
    if !state.player.active {
        return;
    }

    if let Some(direction) = input.direction() {
        state.player.facing = direction;
        let (x, y) = step(
            state.player.x,
            state.player.y,
            direction,
            state.config.tank_speed * dt,
        );
        let tentative = Rect::new(x, y, TANK_SIZE, TANK_SIZE);
        let blocked = state.grid.is_solid(&tentative)
            || state
                .enemies
                .iter()
                .any(|e| e.active && tentative.overlaps(&e.rect()));
        if !blocked {
            state.player.x = x;
            state.player.y = y;
        }
    }

    if input.fire_pressed {
        let bullet = Bullet::fired_from(
            &state.player.rect(),
            state.player.facing,
            BulletOwner::Player,
        );
        state.bullets.push(bullet);
    }
}

// ── Enemies ──────────────────────────────────────────────────────────────────

/// Advance the spawn timer and, once it has run out, drop a new enemy onto
/// a free spawn tile. At the population cap, or with every spawn tile
/// occupied, the timer stays expired and the spawn is retried next tick.
pub fn spawn_enemy(state: &mut GameState, dt: f64, rng: &mut impl Rng) {
    state.spawn_timer_ms += dt;
    if state.spawn_timer_ms < state.config.enemy_spawn_interval_ms
        || active_enemy_count(state) >= state.config.max_enemies
    {
        return;
    }

    let free: Vec<(f64, f64)> = ENEMY_SPAWN_TILES
        .iter()
        .map(|&(row, col)| tank_origin(row, col))
        .filter(|&(x, y)| {
            let rect = Rect::new(x, y, TANK_SIZE, TANK_SIZE);
            let player_clear = !(state.player.active && rect.overlaps(&state.player.rect()));
            let enemies_clear = !state
                .enemies
                .iter()
                .any(|e| e.active && rect.overlaps(&e.rect()));
            player_clear && enemies_clear
        })
        .collect();
    if free.is_empty() {
        log::debug!("All spawn tiles occupied, deferring enemy spawn");
        return;
    }

    let (x, y) = free[rng.gen_range(0..free.len())];
    let enemy = Enemy {
        x,
        y,
        facing: Direction::Down,
        active: true,
        move_timer_ms: roll_timer(state.config.enemy_move_timer_ms, rng),
        shoot_timer_ms: roll_timer(state.config.enemy_shoot_timer_ms, rng),
    };
    state.enemies.push(enemy);
    state.spawn_timer_ms = 0.0;
    log::debug!(
        "Enemy spawned at ({x}, {y}); {} alive",
        active_enemy_count(state)
    );
}

/// Run every enemy's turn/shoot timers and try to move it one step.
///
/// Enemies go in collection order. Each one tests against positions as they
/// stand when its turn comes: the player has already moved this tick, and
/// enemies earlier in the list have too. Partners are deliberately not read
/// from a frozen start-of-tick snapshot; with one, two tanks could step into
/// the same gap during a tick and end up locked together.
pub fn update_enemies(state: &mut GameState, dt: f64, rng: &mut impl Rng) {
    let config = state.config;
    let player_rect = state.player.active.then(|| state.player.rect());

    for i in 0..state.enemies.len() {
        if !state.enemies[i].active {
            continue;
        }

        let enemy = &mut state.enemies[i];
        enemy.move_timer_ms -= dt;
        if enemy.move_timer_ms <= 0.0 {
            if rng.gen_bool(config.enemy_turn_chance) {
                enemy.facing = random_direction(rng);
            }
            enemy.move_timer_ms = roll_timer(config.enemy_move_timer_ms, rng);
        }

        enemy.shoot_timer_ms -= dt;
        if enemy.shoot_timer_ms <= 0.0 {
            let bullet = Bullet::fired_from(&enemy.rect(), enemy.facing, BulletOwner::Enemy);
            enemy.shoot_timer_ms = roll_timer(config.enemy_shoot_timer_ms, rng);
            state.bullets.push(bullet);
        }

        let enemy = &state.enemies[i];
        let (x, y) = step(enemy.x, enemy.y, enemy.facing, config.tank_speed * dt);
        let tentative = Rect::new(x, y, TANK_SIZE, TANK_SIZE).inset(ENEMY_MOVE_INSET);

        let blocked = state.grid.is_solid(&tentative)
            || player_rect.is_some_and(|p| tentative.overlaps(&p))
            || state
                .enemies
                .iter()
                .enumerate()
                .any(|(j, other)| j != i && other.active && tentative.overlaps(&other.rect()));

        let enemy = &mut state.enemies[i];
        if blocked {
            enemy.facing = random_direction(rng);
        } else {
            enemy.x = x;
            enemy.y = y;
        }
    }
}

// ── Bullets ──────────────────────────────────────────────────────────────────

/// Fly every live bullet. One that ends up in solid terrain (or off the map)
/// hits the tile under its centre and dies.
pub fn update_bullets(state: &mut GameState, dt: f64) {
    let distance = state.config.bullet_speed * dt;
    for bullet in state.bullets.iter_mut().filter(|b| b.active) {
        let (x, y) = step(bullet.x, bullet.y, bullet.direction, distance);
        bullet.x = x;
        bullet.y = y;

        let rect = bullet.rect();
        if state.grid.is_solid(&rect) {
            if state.grid.destroy_block(&rect) == BlockHit::Destroyed {
                log::debug!("Brick destroyed at ({x:.0}, {y:.0})");
            }
            bullet.active = false;
        }
    }
}

/// Settle bullet/tank hits once everything has moved.
///
/// A player bullet kills the first live enemy it overlaps, in spawn order,
/// and is spent. An enemy bullet overlapping the live player kills it.
/// Enemy bullets pass through other enemies.
pub fn resolve_hits(state: &mut GameState) {
    for bullet in state.bullets.iter_mut().filter(|b| b.active) {
        let rect = bullet.rect();
        match bullet.owner {
            BulletOwner::Player => {
                if let Some(enemy) = state
                    .enemies
                    .iter_mut()
                    .find(|e| e.active && e.rect().overlaps(&rect))
                {
                    enemy.active = false;
                    bullet.active = false;
                    state.score += ENEMY_SCORE;
                    log::debug!("Enemy destroyed; score {}", state.score);
                }
            }
            BulletOwner::Enemy => {
                if state.player.active && state.player.rect().overlaps(&rect) {
                    state.player.active = false;
                    bullet.active = false;
                    log::info!("Player destroyed");
                }
            }
        }
    }
}

/// Drop everything that went inactive this tick.
pub fn purge(state: &mut GameState) {
    state.bullets.retain(|b| b.active);
    state.enemies.retain(|e| e.active);
}

// ── Per-frame tick ───────────────────────────────────────────────────────────

/// Advance the simulation by `dt_ms` milliseconds, clamped to
/// `config.max_frame_ms`.
///
/// Order: player, spawn, enemies, bullets, hit resolution, purge. After the
/// player dies the status flips to `GameOver` and further ticks return the
/// state unchanged.
pub fn tick(state: &GameState, input: &TickInput, dt_ms: f64, rng: &mut impl Rng) -> GameState {
    if state.status == GameStatus::GameOver {
        return state.clone();
    }

    let dt = clamp_dt(dt_ms, state.config.max_frame_ms);
    let mut next = state.clone();
    next.frame += 1;
    next.elapsed_ms += dt;

    update_player(&mut next, input, dt);
    spawn_enemy(&mut next, dt, rng);
    update_enemies(&mut next, dt, rng);
    update_bullets(&mut next, dt);
    resolve_hits(&mut next);
    purge(&mut next);

    if !next.player.active {
        next.status = GameStatus::GameOver;
        log::info!(
            "Game over after {:.1}s, score {}",
            next.elapsed_ms / 1000.0,
            next.score
        );
    }

    next
}
