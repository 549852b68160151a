//! # Input Manager
//!
//! This module handles input processing for the application, including:
//! - Keyboard input state tracking
//! - Mouse button and motion tracking
//! - Turning raw events into per-frame transitions

use std::collections::HashMap;

use winit::{
    event::{ElementState, KeyEvent, MouseButton, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use super::input_state::{MouseInput, ProcessedInputState, RawInputState};

/// Every key the explorer reacts to.
pub const KEY_CODES: [KeyCode; 16] = [
    KeyCode::KeyW,
    KeyCode::KeyS,
    KeyCode::KeyA,
    KeyCode::KeyD,
    KeyCode::KeyQ,
    KeyCode::KeyE,
    KeyCode::Space,
    KeyCode::ShiftLeft,
    KeyCode::Escape,
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
];

const MOUSE_BUTTONS: [MouseButton; 3] = [MouseButton::Left, MouseButton::Right, MouseButton::Middle];

/// Manages the state of all input devices and processes input events.
///
/// Events update the "new" states as they arrive; once per frame
/// [`get_and_reset_processed_input`](Self::get_and_reset_processed_input)
/// compares them with the previous frame and rolls the states over.
#[derive(Debug)]
pub struct InputManager {
    /// Previous state of all tracked keyboard keys
    pub keyboard_inputs_old: HashMap<KeyCode, bool>,
    /// Current state of all tracked keyboard keys
    pub keyboard_inputs_new: HashMap<KeyCode, bool>,

    /// Current state of mouse inputs
    pub mouse_inputs: MouseInput,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    /// Creates a new InputManager with every tracked key and button released.
    pub fn new() -> Self {
        let keyboard_inputs_old: HashMap<KeyCode, bool> = KEY_CODES.iter().map(|key| (*key, false)).collect();
        let keyboard_inputs_new = keyboard_inputs_old.clone();

        let mouse_button_inputs_old: HashMap<MouseButton, bool> =
            MOUSE_BUTTONS.iter().map(|button| (*button, false)).collect();
        let mouse_inputs = MouseInput {
            mouse_button_inputs_new: mouse_button_inputs_old.clone(),
            mouse_button_inputs_old,
            mouse_delta: None,
        };

        Self {
            keyboard_inputs_old,
            keyboard_inputs_new,
            mouse_inputs,
        }
    }

    /// Updates the old state with the current state to prepare for the next frame.
    pub fn move_old_states(&mut self) {
        for (key, new_state) in self.keyboard_inputs_new.iter() {
            if let Some(old_state) = self.keyboard_inputs_old.get_mut(key) {
                *old_state = *new_state;
            }
        }

        for (button, new_state) in self.mouse_inputs.mouse_button_inputs_new.iter() {
            if let Some(old_state) = self.mouse_inputs.mouse_button_inputs_old.get_mut(button) {
                *old_state = *new_state;
            }
        }
    }

    /// Processes a window event and updates internal input state.
    ///
    /// # Arguments
    /// * `event` - The window event to process
    pub fn intake_input(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state,
                        physical_key: PhysicalKey::Code(key),
                        ..
                    },
                ..
            } => self.set_key(*key, *state == ElementState::Pressed),
            WindowEvent::MouseInput { button, state, .. } => {
                self.set_mouse_button(*button, *state == ElementState::Pressed)
            }
            WindowEvent::Focused(false) => self.release_all(),
            _ => {}
        }
    }

    /// Records a key going down or up. Untracked keys are ignored.
    pub fn set_key(&mut self, key: KeyCode, pressed: bool) {
        if let Some(key_state) = self.keyboard_inputs_new.get_mut(&key) {
            *key_state = pressed;
        }
    }

    /// Records a mouse button going down or up. Untracked buttons are ignored.
    pub fn set_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if let Some(button_state) = self.mouse_inputs.mouse_button_inputs_new.get_mut(&button) {
            *button_state = pressed;
        }
    }

    /// Adds raw mouse motion to this frame's delta.
    ///
    /// # Arguments
    /// * `delta` - The (x, y) motion reported by the device
    pub fn intake_mouse_motion(&mut self, delta: (f64, f64)) {
        let (x, y) = self.mouse_inputs.mouse_delta.unwrap_or((0.0, 0.0));
        self.mouse_inputs.mouse_delta = Some((x + delta.0, y + delta.1));
    }

    /// Marks every key and button as released, so nothing sticks after focus loss.
    pub fn release_all(&mut self) {
        self.keyboard_inputs_new.values_mut().for_each(|state| *state = false);
        self.mouse_inputs
            .mouse_button_inputs_new
            .values_mut()
            .for_each(|state| *state = false);
    }

    /// Creates a processed input state from the current raw boolean states.
    pub fn create_processed_input_state(&self) -> ProcessedInputState {
        let keyboard_states = self
            .keyboard_inputs_new
            .iter()
            .map(|(key, &new_state)| {
                let old_state = self.keyboard_inputs_old.get(key).copied().unwrap_or(false);
                (*key, RawInputState::from_raw_states(old_state, new_state))
            })
            .collect();

        let mouse_button_states = self
            .mouse_inputs
            .mouse_button_inputs_new
            .iter()
            .map(|(button, &new_state)| {
                let old_state = self
                    .mouse_inputs
                    .mouse_button_inputs_old
                    .get(button)
                    .copied()
                    .unwrap_or(false);
                (*button, RawInputState::from_raw_states(old_state, new_state))
            })
            .collect();

        ProcessedInputState {
            keyboard_states,
            mouse_button_states,
            mouse_delta: self.mouse_inputs.mouse_delta,
        }
    }

    /// Returns this frame's processed input and rolls the state over for the next one.
    pub fn get_and_reset_processed_input(&mut self) -> ProcessedInputState {
        let processed_input = self.create_processed_input_state();
        self.reset_inputs();
        processed_input
    }

    /// Rolls key and button states over and clears the mouse delta.
    pub fn reset_inputs(&mut self) {
        self.move_old_states();
        self.mouse_inputs.mouse_delta = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_hold_release() {
        let mut manager = InputManager::new();
        manager.set_key(KeyCode::KeyW, true);
        assert!(manager.get_and_reset_processed_input().get_key_state(KeyCode::KeyW).is_just_pressed());
        assert_eq!(
            manager.get_and_reset_processed_input().get_key_state(KeyCode::KeyW),
            RawInputState::Held
        );
        manager.set_key(KeyCode::KeyW, false);
        assert!(manager.get_and_reset_processed_input().get_key_state(KeyCode::KeyW).is_just_released());
        assert_eq!(
            manager.get_and_reset_processed_input().get_key_state(KeyCode::KeyW),
            RawInputState::NotPressed
        );
    }

    #[test]
    fn test_mouse_motion_accumulates_per_frame() {
        let mut manager = InputManager::new();
        manager.intake_mouse_motion((2.0, -1.0));
        manager.intake_mouse_motion((3.0, 4.0));
        assert_eq!(manager.get_and_reset_processed_input().mouse_delta, Some((5.0, 3.0)));
        assert_eq!(manager.get_and_reset_processed_input().mouse_delta, None);
    }

    #[test]
    fn test_untracked_key_is_ignored() {
        let mut manager = InputManager::new();
        manager.set_key(KeyCode::KeyZ, true);
        let input = manager.get_and_reset_processed_input();
        assert!(!input.keyboard_states.contains_key(&KeyCode::KeyZ));
    }

    #[test]
    fn test_release_all_after_focus_loss() {
        let mut manager = InputManager::new();
        manager.set_key(KeyCode::KeyA, true);
        manager.set_mouse_button(MouseButton::Left, true);
        manager.get_and_reset_processed_input();

        manager.intake_input(&WindowEvent::Focused(false));
        let input = manager.get_and_reset_processed_input();
        assert!(input.get_key_state(KeyCode::KeyA).is_just_released());
        assert!(input.get_mouse_button_state(MouseButton::Left).is_just_released());
    }
}
