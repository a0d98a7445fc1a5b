use lumen_input::Action;
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

pub fn action_for_key(key: KeyCode) -> Option<Action> {
    Some(match key {
        KeyCode::KeyW => Action::MoveForward,
        KeyCode::KeyS => Action::MoveBackward,
        KeyCode::KeyA => Action::MoveLeft,
        KeyCode::KeyD => Action::MoveRight,
        KeyCode::Space => Action::MoveUp,
        KeyCode::KeyX => Action::MoveDown,
        KeyCode::ShiftLeft | KeyCode::ShiftRight => Action::Boost,
        KeyCode::ControlLeft | KeyCode::ControlRight => Action::Slow,
        KeyCode::Tab => Action::RandomizeLights,
        KeyCode::F1 => Action::ToggleUi,
        KeyCode::F2 => Action::ToggleSsao,
        KeyCode::Escape => Action::Quit,
        _ => return None,
    })
}

pub fn action_for_button(button: MouseButton) -> Option<Action> {
    match button {
        MouseButton::Left => Some(Action::Look),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_modifiers_map() {
        assert_eq!(action_for_key(KeyCode::ShiftRight), Some(Action::Boost));
        assert_eq!(action_for_key(KeyCode::ControlLeft), Some(Action::Slow));
        assert_eq!(action_for_key(KeyCode::KeyQ), None);
    }

    #[test]
    fn every_keyboard_action_has_a_key() {
        let keys = [
            KeyCode::KeyW,
            KeyCode::KeyS,
            KeyCode::KeyA,
            KeyCode::KeyD,
            KeyCode::Space,
            KeyCode::KeyX,
            KeyCode::ShiftLeft,
            KeyCode::ControlLeft,
            KeyCode::Tab,
            KeyCode::F1,
            KeyCode::F2,
            KeyCode::Escape,
        ];
        let mapped: Vec<Action> = keys.into_iter().filter_map(action_for_key).collect();
        for action in Action::ALL.into_iter().filter(|a| !a.is_mouse()) {
            assert!(mapped.contains(&action), "{action:?}");
        }
        assert_eq!(action_for_button(MouseButton::Left), Some(Action::Look));
    }
}
