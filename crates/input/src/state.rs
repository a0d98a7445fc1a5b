use crate::action::Action;
use glam::{Vec2, Vec3};
use std::collections::BTreeSet;
use tracing::debug;

/// Held actions, this frame's presses and accumulated mouse motion.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: BTreeSet<Action>,
    pressed: BTreeSet<Action>,
    mouse_delta: Vec2,
    ui_keyboard: bool,
    ui_mouse: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key repeat does not produce a second press edge.
    pub fn press(&mut self, action: Action) {
        if self.held.insert(action) {
            self.pressed.insert(action);
        }
    }

    pub fn release(&mut self, action: Action) {
        self.held.remove(&action);
    }

    /// Drop every held action, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.held.clear();
    }

    pub fn is_held(&self, action: Action) -> bool {
        self.held.contains(&action) && !self.suppressed(action)
    }

    /// Pressed since the last [`InputState::end_frame`].
    pub fn was_pressed(&self, action: Action) -> bool {
        self.pressed.contains(&action) && !self.suppressed(action)
    }

    pub fn add_mouse_delta(&mut self, delta: Vec2) {
        self.mouse_delta += delta;
    }

    /// Motion accumulated since the last call. Zero while the UI owns the mouse.
    pub fn take_mouse_delta(&mut self) -> Vec2 {
        let delta = std::mem::take(&mut self.mouse_delta);
        if self.ui_mouse { Vec2::ZERO } else { delta }
    }

    /// Local move direction as (right, up, forward), each in -1..=1.
    pub fn move_axes(&self) -> Vec3 {
        let axis = |pos: Action, neg: Action| {
            self.is_held(pos) as i32 as f32 - self.is_held(neg) as i32 as f32
        };
        Vec3::new(
            axis(Action::MoveRight, Action::MoveLeft),
            axis(Action::MoveUp, Action::MoveDown),
            axis(Action::MoveForward, Action::MoveBackward),
        )
    }

    pub fn set_ui_capture(&mut self, keyboard: bool, mouse: bool) {
        if (keyboard, mouse) != (self.ui_keyboard, self.ui_mouse) {
            debug!(keyboard, mouse, "ui input capture changed");
        }
        self.ui_keyboard = keyboard;
        self.ui_mouse = mouse;
    }

    pub fn end_frame(&mut self) {
        self.pressed.clear();
    }

    fn suppressed(&self, action: Action) -> bool {
        action.is_camera()
            && if action.is_mouse() {
                self.ui_mouse
            } else {
                self.ui_keyboard
            }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_is_edge_triggered() {
        let mut input = InputState::new();
        input.press(Action::RandomizeLights);
        assert!(input.was_pressed(Action::RandomizeLights));
        input.end_frame();
        assert!(!input.was_pressed(Action::RandomizeLights));
        // Repeat while held.
        input.press(Action::RandomizeLights);
        assert!(!input.was_pressed(Action::RandomizeLights));
        input.release(Action::RandomizeLights);
        input.press(Action::RandomizeLights);
        assert!(input.was_pressed(Action::RandomizeLights));
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut input = InputState::new();
        input.press(Action::MoveForward);
        input.press(Action::MoveLeft);
        assert_eq!(input.move_axes(), Vec3::new(-1.0, 0.0, 1.0));
        input.press(Action::MoveBackward);
        input.press(Action::MoveUp);
        assert_eq!(input.move_axes(), Vec3::new(-1.0, 1.0, 0.0));
        input.release_all();
        assert_eq!(input.move_axes(), Vec3::ZERO);
    }

    #[test]
    fn mouse_delta_accumulates_until_taken() {
        let mut input = InputState::new();
        input.add_mouse_delta(Vec2::new(2.0, 1.0));
        input.add_mouse_delta(Vec2::new(1.0, -3.0));
        assert_eq!(input.take_mouse_delta(), Vec2::new(3.0, -2.0));
        assert_eq!(input.take_mouse_delta(), Vec2::ZERO);
    }

    #[test]
    fn ui_capture_hides_camera_actions() {
        let mut input = InputState::new();
        input.press(Action::MoveForward);
        input.press(Action::Look);
        input.press(Action::ToggleUi);
        input.add_mouse_delta(Vec2::ONE);

        input.set_ui_capture(true, false);
        assert_eq!(input.move_axes(), Vec3::ZERO);
        assert!(input.is_held(Action::Look));
        assert!(input.was_pressed(Action::ToggleUi));

        input.set_ui_capture(false, true);
        assert!(!input.is_held(Action::Look));
        assert_eq!(input.take_mouse_delta(), Vec2::ZERO);
        assert_eq!(input.move_axes(), Vec3::new(0.0, 0.0, 1.0));

        input.set_ui_capture(false, false);
        assert!(input.is_held(Action::Look));
    }
}
