/// Everything a key or mouse button can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    MoveForward,
    MoveBackward,
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    /// Faster camera movement while held.
    Boost,
    /// Slower camera movement while held.
    Slow,
    /// Mouse look while held.
    Look,
    RandomizeLights,
    ToggleSsao,
    ToggleUi,
    Quit,
}

impl Action {
    pub const ALL: [Action; 13] = [
        Action::MoveForward,
        Action::MoveBackward,
        Action::MoveLeft,
        Action::MoveRight,
        Action::MoveUp,
        Action::MoveDown,
        Action::Boost,
        Action::Slow,
        Action::Look,
        Action::RandomizeLights,
        Action::ToggleSsao,
        Action::ToggleUi,
        Action::Quit,
    ];

    /// Actions that steer the camera and yield to the UI.
    pub fn is_camera(self) -> bool {
        matches!(
            self,
            Action::MoveForward
                | Action::MoveBackward
                | Action::MoveLeft
                | Action::MoveRight
                | Action::MoveUp
                | Action::MoveDown
                | Action::Boost
                | Action::Slow
                | Action::Look
        )
    }

    /// Bound to a mouse button rather than a key.
    pub fn is_mouse(self) -> bool {
        self == Action::Look
    }

    pub fn label(self) -> &'static str {
        match self {
            Action::MoveForward => "move forward",
            Action::MoveBackward => "move backward",
            Action::MoveLeft => "move left",
            Action::MoveRight => "move right",
            Action::MoveUp => "move up",
            Action::MoveDown => "move down",
            Action::Boost => "boost",
            Action::Slow => "slow",
            Action::Look => "look",
            Action::RandomizeLights => "randomize lights",
            Action::ToggleSsao => "toggle SSAO",
            Action::ToggleUi => "toggle UI",
            Action::Quit => "quit",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_look_is_a_mouse_action() {
        let mouse: Vec<_> = Action::ALL.into_iter().filter(|a| a.is_mouse()).collect();
        assert_eq!(mouse, vec![Action::Look]);
    }

    #[test]
    fn toggles_are_not_camera_actions() {
        assert!(Action::Boost.is_camera());
        assert!(!Action::RandomizeLights.is_camera());
        assert!(!Action::ToggleUi.is_camera());
        assert!(!Action::Quit.is_camera());
    }
}
