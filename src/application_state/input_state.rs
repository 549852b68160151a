//! # Input State
//!
//! This module defines the input state types used by the input manager.
//! It provides enums and structs for representing the state of input devices.

use std::collections::HashMap;
use winit::{event::MouseButton, keyboard::KeyCode};

/// Represents the state of a key or button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RawInputState {
    /// Key/button is not pressed
    #[default]
    NotPressed,
    /// Key/button was just pressed this frame
    Pressed,
    /// Key/button has been held down for multiple frames
    Held,
    /// Key/button was just released this frame
    Released,
}

impl RawInputState {
    /// Determines if the input is actively down (either pressed or held)
    pub fn is_active(&self) -> bool {
        matches!(self, RawInputState::Pressed | RawInputState::Held)
    }

    /// Determines if the input was just pressed this frame
    pub fn is_just_pressed(&self) -> bool {
        matches!(self, RawInputState::Pressed)
    }

    /// Determines if the input was just released this frame
    pub fn is_just_released(&self) -> bool {
        matches!(self, RawInputState::Released)
    }

    /// Derives the transition from the previous and current down states.
    pub fn from_raw_states(previous: bool, current: bool) -> Self {
        match (previous, current) {
            (false, true) => RawInputState::Pressed,
            (true, true) => RawInputState::Held,
            (true, false) => RawInputState::Released,
            (false, false) => RawInputState::NotPressed,
        }
    }
}

/// A snapshot of the processed input states with state transitions.
///
/// Keys and buttons missing from the maps read as [`RawInputState::NotPressed`].
#[derive(Debug, Clone, Default)]
pub struct ProcessedInputState {
    /// Current state of all tracked keyboard keys
    pub keyboard_states: HashMap<KeyCode, RawInputState>,

    /// Current state of mouse buttons
    pub mouse_button_states: HashMap<MouseButton, RawInputState>,

    /// Mouse movement accumulated since the last frame (x, y)
    pub mouse_delta: Option<(f64, f64)>,
}

impl ProcessedInputState {
    /// Gets the state of a keyboard key
    pub fn get_key_state(&self, key: KeyCode) -> RawInputState {
        self.keyboard_states.get(&key).copied().unwrap_or_default()
    }

    /// Gets the state of a mouse button
    pub fn get_mouse_button_state(&self, button: MouseButton) -> RawInputState {
        self.mouse_button_states.get(&button).copied().unwrap_or_default()
    }

    /// Gets the mouse movement delta since the last frame
    pub fn get_mouse_delta(&self) -> Option<(f64, f64)> {
        self.mouse_delta
    }
}

/// Tracks the state of mouse buttons and movement.
#[derive(Debug, Default)]
pub struct MouseInput {
    /// Previous state of each mouse button (pressed/released)
    pub mouse_button_inputs_old: HashMap<MouseButton, bool>,
    /// Current state of each mouse button (pressed/released)
    pub mouse_button_inputs_new: HashMap<MouseButton, bool>,

    /// Mouse movement delta accumulated since the last frame (x, y)
    pub mouse_delta: Option<(f64, f64)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        assert_eq!(RawInputState::from_raw_states(false, true), RawInputState::Pressed);
        assert_eq!(RawInputState::from_raw_states(true, true), RawInputState::Held);
        assert_eq!(RawInputState::from_raw_states(true, false), RawInputState::Released);
        assert_eq!(RawInputState::from_raw_states(false, false), RawInputState::NotPressed);
        assert!(RawInputState::Held.is_active() && !RawInputState::Held.is_just_pressed());
    }

    #[test]
    fn test_untracked_inputs_are_not_pressed() {
        let input = ProcessedInputState::default();
        assert_eq!(input.get_key_state(KeyCode::KeyZ), RawInputState::NotPressed);
        assert_eq!(
            input.get_mouse_button_state(MouseButton::Middle),
            RawInputState::NotPressed
        );
        assert_eq!(input.get_mouse_delta(), None);
    }
}
