//! Keyboard state as the simulation sees it.
//!
//! The frontend feeds raw press/repeat/release notifications in; each frame
//! it takes a [`TickInput`] snapshot out. Terminals without key-release
//! reporting only ever send presses (OS key-repeat shows up as more
//! presses), so a key also counts as released once it has been silent for
//! longer than the hold window. Fire gets a longer window of its own: the OS
//! waits a few hundred milliseconds before the first auto-repeat, and a held
//! Fire must not look released during that pause.

use std::collections::{HashMap, HashSet};

use crate::entities::Direction;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Right,
    Down,
    Left,
    Fire,
}

/// What the player asked for during one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickInput {
    pub up: bool,
    pub right: bool,
    pub down: bool,
    pub left: bool,
    /// Rising edge of the fire key only; holding it does not re-fire.
    pub fire_pressed: bool,
}

impl TickInput {
    /// The single direction honoured this tick. Up > Right > Down > Left.
    pub fn direction(&self) -> Option<Direction> {
        if self.up {
            Some(Direction::Up)
        } else if self.right {
            Some(Direction::Right)
        } else if self.down {
            Some(Direction::Down)
        } else if self.left {
            Some(Direction::Left)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug)]
pub struct KeyboardState {
    /// Frame of the last press/repeat seen for each held key.
    key_frame: HashMap<Key, u64>,
    /// Keys that were down at the previous edge query.
    was_down: HashSet<Key>,
    hold_window: u64,
    fire_hold_window: u64,
}

impl KeyboardState {
    /// Fire shares `hold_window` until `with_fire_hold_window` gives it its own.
    pub fn new(hold_window: u64) -> Self {
        Self {
            key_frame: HashMap::new(),
            was_down: HashSet::new(),
            hold_window,
            fire_hold_window: hold_window,
        }
    }

    pub fn with_fire_hold_window(mut self, frames: u64) -> Self {
        self.fire_hold_window = frames;
        self
    }

    fn window_for(&self, key: Key) -> u64 {
        match key {
            Key::Fire => self.fire_hold_window,
            _ => self.hold_window,
        }
    }

    /// Record a press or an auto-repeat.
    pub fn press(&mut self, key: Key, frame: u64) {
        self.key_frame.insert(key, frame);
    }

    pub fn release(&mut self, key: Key) {
        self.key_frame.remove(&key);
    }

    pub fn is_down(&self, key: Key, frame: u64) -> bool {
        self.key_frame
            .get(&key)
            .map(|&last| frame.saturating_sub(last) <= self.window_for(key))
            .unwrap_or(false)
    }

    /// True only on the first query that sees `key` down after it was up.
    /// Call at most once per frame per key.
    pub fn just_pressed(&mut self, key: Key, frame: u64) -> bool {
        let down = self.is_down(key, frame);
        if down {
            // `insert` is true only when the key was not already down.
            self.was_down.insert(key)
        } else {
            self.was_down.remove(&key);
            false
        }
    }

    pub fn snapshot(&mut self, frame: u64) -> TickInput {
        TickInput {
            up: self.is_down(Key::Up, frame),
            right: self.is_down(Key::Right, frame),
            down: self.is_down(Key::Down, frame),
            left: self.is_down(Key::Left, frame),
            fire_pressed: self.just_pressed(Key::Fire, frame),
        }
    }
}
