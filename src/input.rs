//! Per-frame input
//!
//! Keyboard state is reduced to a [`FrameInput`] once per frame. Held keys
//! become movement axes; edge-triggered keys become one-shot flags. Nothing
//! is buffered between frames.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Keys the demos react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    A,
    D,
    W,
    S,
    R,
    Left,
    Right,
    Up,
    Down,
    Space,
}

/// Anything that can answer key queries for the current frame
pub trait InputSource {
    /// Key is held this frame
    fn is_down(&self, key: Key) -> bool;
    /// Key went down this frame
    fn is_pressed(&self, key: Key) -> bool;
}

/// Headless key state, driven by hand or by a replay
#[derive(Debug, Clone, Default)]
pub struct KeySet {
    down: HashSet<Key>,
    pressed: HashSet<Key>,
}

impl KeySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a key as going down; it stays held until released
    pub fn press(&mut self, key: Key) {
        if self.down.insert(key) {
            self.pressed.insert(key);
        }
    }

    pub fn release(&mut self, key: Key) {
        self.down.remove(&key);
        self.pressed.remove(&key);
    }

    /// Forget this frame's edges; held keys stay held
    pub fn end_frame(&mut self) {
        self.pressed.clear();
    }
}

impl InputSource for KeySet {
    fn is_down(&self, key: Key) -> bool {
        self.down.contains(&key)
    }

    fn is_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }
}

/// What the player asked for this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameInput {
    /// -1 (left) .. 1 (right)
    pub move_x: f32,
    /// -1 (away from the camera) .. 1 (toward it)
    pub move_z: f32,
    /// Launch the parked ball (one-shot)
    pub launch: bool,
    /// Restart the round (one-shot)
    pub reset: bool,
}

impl FrameInput {
    pub fn from_source<S: InputSource + ?Sized>(source: &S) -> Self {
        let held = |a: Key, b: Key| source.is_down(a) || source.is_down(b);
        Self {
            move_x: axis(held(Key::A, Key::Left), held(Key::D, Key::Right)),
            move_z: axis(held(Key::W, Key::Up), held(Key::S, Key::Down)),
            launch: source.is_pressed(Key::Space),
            reset: source.is_pressed(Key::R),
        }
    }
}

#[inline]
fn axis(negative: bool, positive: bool) -> f32 {
    match (negative, positive) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => 0.0,
    }
}
