//! Keyboard input state
//!
//! Raw device events are fed in by whoever owns the window (or by scripts and
//! tests in headless runs). Action components poll the state during `update`
//! through their hook context.

use std::collections::HashSet;

use winit::event::ElementState;
use winit::keyboard::KeyCode;

/// Per-key keyboard state with per-frame edges
#[derive(Debug, Default, Clone)]
pub struct InputState {
    // Keys currently held
    held: HashSet<KeyCode>,

    // Edges recorded since the last `end_frame`
    pressed_this_frame: HashSet<KeyCode>,
    released_this_frame: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a keyboard event coming from winit
    /// Returns true if the event was handled
    pub fn on_keyboard_input(&mut self, keycode: KeyCode, state: ElementState) -> bool {
        match state {
            ElementState::Pressed => self.press(keycode),
            ElementState::Released => self.release(keycode),
        }
        true
    }

    /// Record a key going down. Auto-repeat of a held key is not a new edge.
    pub fn press(&mut self, key: KeyCode) {
        if self.held.insert(key) {
            self.pressed_this_frame.insert(key);
        }
    }

    /// Record a key going up
    pub fn release(&mut self, key: KeyCode) {
        if self.held.remove(&key) {
            self.released_this_frame.insert(key);
        }
    }

    /// Is the key currently held
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    /// Did the key go down this frame
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.pressed_this_frame.contains(&key)
    }

    /// Did the key go up this frame
    pub fn key_released(&self, key: KeyCode) -> bool {
        self.released_this_frame.contains(&key)
    }

    /// Clear per-frame edges. Called by the runtime after the six phases.
    pub fn end_frame(&mut self) {
        self.pressed_this_frame.clear();
        self.released_this_frame.clear();
    }

    /// Forget everything, e.g. when the window loses focus
    pub fn reset(&mut self) {
        self.held.clear();
        self.end_frame();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_sets_edge_and_hold() {
        let mut input = InputState::new();
        input.press(KeyCode::KeyD);

        assert!(input.key_down(KeyCode::KeyD));
        assert!(input.key_pressed(KeyCode::KeyD));
        assert!(!input.key_released(KeyCode::KeyD));

        input.end_frame();
        assert!(input.key_down(KeyCode::KeyD));
        assert!(!input.key_pressed(KeyCode::KeyD));
    }

    #[test]
    fn test_release_edge() {
        let mut input = InputState::new();
        input.on_keyboard_input(KeyCode::KeyA, ElementState::Pressed);
        input.end_frame();
        input.on_keyboard_input(KeyCode::KeyA, ElementState::Released);

        assert!(!input.key_down(KeyCode::KeyA));
        assert!(input.key_released(KeyCode::KeyA));
    }

    #[test]
    fn test_repeat_press_is_not_a_new_edge() {
        let mut input = InputState::new();
        input.press(KeyCode::KeyQ);
        input.end_frame();
        input.press(KeyCode::KeyQ);

        assert!(!input.key_pressed(KeyCode::KeyQ));
    }

    #[test]
    fn test_release_without_press_is_ignored() {
        let mut input = InputState::new();
        input.release(KeyCode::KeyE);
        assert!(!input.key_released(KeyCode::KeyE));
    }

    #[test]
    fn test_reset() {
        let mut input = InputState::new();
        input.press(KeyCode::KeyR);
        input.reset();
        assert!(!input.key_down(KeyCode::KeyR));
        assert!(!input.key_pressed(KeyCode::KeyR));
    }
}
