//! Input for the demo: window events become actions, actions drive the camera.
//!
//! # Invariants
//! - Consumers read actions, never raw key codes.
//! - While the UI owns input, camera actions read as released.

pub mod action;
pub mod state;

pub use action::Action;
pub use state::InputState;

pub fn crate_info() -> &'static str {
    "lumen-input v0.1.0"
}
