//! Keyboard and pointer state tracking.

use std::collections::HashSet;

pub use winit::keyboard::KeyCode;

/// Input state accumulated from window events, sampled once per frame.
#[derive(Debug, Default)]
pub struct InputState {
    pressed_keys: HashSet<KeyCode>,
    just_pressed_keys: HashSet<KeyCode>,
    /// Pointer position in window coordinates
    pointer_position: (f32, f32),
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call at the beginning of each frame to clear per-frame state.
    pub fn begin_frame(&mut self) {
        self.just_pressed_keys.clear();
    }

    pub fn on_key_pressed(&mut self, key: KeyCode) {
        if self.pressed_keys.insert(key) {
            self.just_pressed_keys.insert(key);
        }
    }

    pub fn on_key_released(&mut self, key: KeyCode) {
        self.pressed_keys.remove(&key);
    }

    pub fn on_pointer_moved(&mut self, x: f32, y: f32) {
        self.pointer_position = (x, y);
    }

    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.pressed_keys.contains(&key)
    }

    /// True only on the frame the key went down.
    pub fn is_key_just_pressed(&self, key: KeyCode) -> bool {
        self.just_pressed_keys.contains(&key)
    }

    /// Pointer position in window coordinates.
    pub fn pointer_position(&self) -> (f32, f32) {
        self.pointer_position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn just_pressed_clears_at_frame_start() {
        let mut input = InputState::new();

        input.on_key_pressed(KeyCode::KeyW);
        assert!(input.is_key_pressed(KeyCode::KeyW));
        assert!(input.is_key_just_pressed(KeyCode::KeyW));

        input.begin_frame();
        assert!(input.is_key_pressed(KeyCode::KeyW));
        assert!(!input.is_key_just_pressed(KeyCode::KeyW));
    }

    #[test]
    fn repeat_events_do_not_retrigger_just_pressed() {
        let mut input = InputState::new();

        input.on_key_pressed(KeyCode::KeyA);
        input.begin_frame();
        input.on_key_pressed(KeyCode::KeyA);
        assert!(!input.is_key_just_pressed(KeyCode::KeyA));
    }

    #[test]
    fn release_clears_pressed_state() {
        let mut input = InputState::new();

        input.on_key_pressed(KeyCode::KeyD);
        input.on_key_released(KeyCode::KeyD);
        assert!(!input.is_key_pressed(KeyCode::KeyD));
    }

    #[test]
    fn pointer_position_tracks_latest_event() {
        let mut input = InputState::new();

        input.on_pointer_moved(120.0, 48.0);
        input.on_pointer_moved(121.5, 50.0);
        assert_eq!(input.pointer_position(), (121.5, 50.0));
    }
}
