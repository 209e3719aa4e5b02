//! Input events and the scene-scoped input state
//!
//! The state is owned by the scene manager and reset on every scene switch,
//! so a key held while leaving one scene never leaks into the next.

use std::collections::HashSet;

use glam::Vec2;

use super::dom::WidgetEvent;

/// Keys that move up (thrust up in the lander)
pub const KEYS_UP: &[&str] = &["arrowup", "w"];
pub const KEYS_DOWN: &[&str] = &["arrowdown", "s"];
pub const KEYS_LEFT: &[&str] = &["arrowleft", "a"];
pub const KEYS_RIGHT: &[&str] = &["arrowright", "d"];

/// A single input event from the platform layer
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown(String),
    KeyUp(String),
    /// Pointer events in screen pixels
    PointerDown(Vec2),
    PointerMove(Vec2),
    PointerUp(Vec2),
    /// A DOM widget owned by the active scene fired
    Widget(WidgetEvent),
}

impl InputEvent {
    /// Key events are compared lowercased, like `KeyboardEvent.key.toLowerCase()`
    pub fn key_down(key: &str) -> Self {
        InputEvent::KeyDown(key.to_lowercase())
    }

    pub fn key_up(key: &str) -> Self {
        InputEvent::KeyUp(key.to_lowercase())
    }
}

/// Held keys and pointer state
#[derive(Debug, Clone, Default)]
pub struct InputState {
    keys: HashSet<String>,
    pointer: Vec2,
    pointer_down: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(key) => {
                self.keys.insert(key.to_lowercase());
            }
            InputEvent::KeyUp(key) => {
                self.keys.remove(&key.to_lowercase());
            }
            InputEvent::PointerDown(pos) => {
                self.pointer = *pos;
                self.pointer_down = true;
            }
            InputEvent::PointerMove(pos) => self.pointer = *pos,
            InputEvent::PointerUp(pos) => {
                self.pointer = *pos;
                self.pointer_down = false;
            }
            InputEvent::Widget(_) => {}
        }
    }

    pub fn pressed(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn any_pressed(&self, keys: &[&str]) -> bool {
        keys.iter().any(|k| self.keys.contains(*k))
    }

    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    pub fn is_pointer_down(&self) -> bool {
        self.pointer_down
    }

    pub fn held_count(&self) -> usize {
        self.keys.len()
    }

    /// Forget every held key and the pointer button
    pub fn reset(&mut self) {
        self.keys.clear();
        self.pointer_down = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_case_insensitive() {
        let mut input = InputState::new();
        input.apply(&InputEvent::key_down("ArrowUp"));
        assert!(input.pressed("arrowup"));
        assert!(input.any_pressed(KEYS_UP));
        input.apply(&InputEvent::KeyUp("ARROWUP".into()));
        assert!(!input.any_pressed(KEYS_UP));
    }

    #[test]
    fn test_reset_clears_held_state() {
        let mut input = InputState::new();
        input.apply(&InputEvent::key_down("d"));
        input.apply(&InputEvent::PointerDown(Vec2::new(3.0, 4.0)));
        input.reset();
        assert_eq!(input.held_count(), 0);
        assert!(!input.is_pointer_down());
        assert_eq!(input.pointer(), Vec2::new(3.0, 4.0));
    }
}
