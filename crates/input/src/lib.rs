//! Input snapshot: the already-polled state of mouse and keys for one frame.
//!
//! # Invariants
//! - Systems read input only through [`InputSnapshot`]; device polling stays
//!   with the frame driver.

pub mod key;

pub use key::{Key, ParseKeyError};

use glam::IVec2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Mouse position in window pixels (origin top-left) and button state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MouseState {
    pub position: IVec2,
    pub left: bool,
    pub right: bool,
}

/// Input state for a single frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSnapshot {
    pub mouse: MouseState,
    keys: BTreeSet<Key>,
}

impl InputSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot with `keys` held and the mouse at rest.
    pub fn with_keys(keys: impl IntoIterator<Item = Key>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Replace the mouse state.
    pub fn with_mouse(mut self, mouse: MouseState) -> Self {
        self.mouse = mouse;
        self
    }

    /// Mark `key` as held.
    pub fn press(&mut self, key: Key) {
        self.keys.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        self.keys.remove(&key);
    }

    /// Whether `key` is held this frame.
    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    /// Held keys in a stable order.
    pub fn pressed_keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.keys.iter().copied()
    }
}

pub fn crate_info() -> &'static str {
    "scenekit-input v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release() {
        let mut input = InputSnapshot::new();
        input.press(Key::W);
        assert!(input.is_key_pressed(Key::W));
        assert!(!input.is_key_pressed(Key::S));
        input.release(Key::W);
        assert!(!input.is_key_pressed(Key::W));
    }

    #[test]
    fn with_keys_and_mouse() {
        let input = InputSnapshot::with_keys([Key::A, Key::D]).with_mouse(MouseState {
            position: IVec2::new(10, 20),
            left: true,
            right: false,
        });
        let keys: Vec<Key> = input.pressed_keys().collect();
        assert_eq!(keys, vec![Key::A, Key::D]);
        assert!(input.mouse.left);
    }
}
