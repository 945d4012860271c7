//! Scene Mutation API: the operations a host calls while the render loop runs.
//!
//! # Invariants
//! - Every operation is a synchronous, non-blocking write to the scene.
//! - Controllers only address the fixed sphere and ground entities.
//! - A controller exposes a capability set; hosts must not assume all
//!   operations exist.

mod action;
mod controls;

pub use action::{Action, MAX_REPEAT, parse_script};
pub use controls::{
    BallController, Capability, ControlError, MOVE_UP_STEP, MoveUp, RecolorBall, ResizeBall,
    RiseOnlyController, SceneControls, ToggleVisibility,
};

pub fn crate_info() -> &'static str {
    "spherescene-author v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("author"));
    }
}
