use glam::Vec3;
use spherescene_common::Color;
use spherescene_kernel::{GROUND, SPHERE, Scene, SceneError, SceneHandle};
use std::fmt;

/// Vertical distance added to the sphere by each `move_up` call.
pub const MOVE_UP_STEP: f32 = 0.05;

/// Errors from attaching controllers and dispatching actions.
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error("controller does not support {0}")]
    Unsupported(Capability),
    #[error("cannot parse action {input:?}: {reason}")]
    Parse { input: String, reason: String },
}

/// One independently exposable group of mutation operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    MoveUp,
    ResizeBall,
    RecolorBall,
    ToggleVisibility,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MoveUp => "move-up",
            Self::ResizeBall => "resize-ball",
            Self::RecolorBall => "recolor-ball",
            Self::ToggleVisibility => "toggle-visibility",
        })
    }
}

pub trait MoveUp {
    /// Raise the sphere by [`MOVE_UP_STEP`]. Repeated calls accumulate with
    /// no upper bound.
    fn move_up(&self);
}

pub trait ResizeBall {
    /// Set the sphere's scale to `(size, size, size)`. Any value is accepted,
    /// including zero and negatives.
    fn change_ball_size(&self, size: f32);
}

pub trait RecolorBall {
    /// Set the sphere's diffuse color. Components are clamped to `[0, 1]`.
    /// `a` is accepted for API compatibility and ignored: materials are opaque.
    fn change_ball_color(&self, r: f32, g: f32, b: f32, a: f32);
}

pub trait ToggleVisibility {
    fn set_ball_visible(&self, visible: bool);
    fn set_floor_visible(&self, visible: bool);
}

/// Object-safe view of a controller's capability set.
pub trait SceneControls: Send + Sync {
    /// Scene this controller writes to.
    fn scene(&self) -> &SceneHandle;

    fn as_move_up(&self) -> Option<&dyn MoveUp> {
        None
    }

    fn as_resize_ball(&self) -> Option<&dyn ResizeBall> {
        None
    }

    fn as_recolor_ball(&self) -> Option<&dyn RecolorBall> {
        None
    }

    fn as_toggle_visibility(&self) -> Option<&dyn ToggleVisibility> {
        None
    }

    fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::MoveUp => self.as_move_up().is_some(),
            Capability::ResizeBall => self.as_resize_ball().is_some(),
            Capability::RecolorBall => self.as_recolor_ball().is_some(),
            Capability::ToggleVisibility => self.as_toggle_visibility().is_some(),
        }
    }

    fn capabilities(&self) -> Vec<Capability> {
        [
            Capability::MoveUp,
            Capability::ResizeBall,
            Capability::RecolorBall,
            Capability::ToggleVisibility,
        ]
        .into_iter()
        .filter(|c| self.supports(*c))
        .collect()
    }
}

/// Apply one write. Controllers verify their targets on attach, so a failure
/// here means the scene was swapped underneath them; it is logged, not raised.
fn apply(scene: &SceneHandle, op: &str, write: impl FnOnce(&mut Scene) -> Result<(), SceneError>) {
    if let Err(e) = scene.with_mut(write) {
        tracing::warn!("{op} ignored: {e}");
    }
}

fn rise(scene: &SceneHandle) {
    apply(scene, "move_up", |s| {
        s.translate(SPHERE, Vec3::new(0.0, MOVE_UP_STEP, 0.0))
    });
}

/// Full controller: move, resize, recolor and visibility toggles.
///
/// Requires a sphere with a material.
#[derive(Debug, Clone)]
pub struct BallController {
    scene: SceneHandle,
}

impl BallController {
    pub fn attach(scene: SceneHandle) -> Result<Self, ControlError> {
        scene.with(|s| -> Result<(), SceneError> {
            s.get_entity(GROUND)?;
            let sphere = s.get_entity(SPHERE)?;
            if sphere.material.is_none() {
                return Err(SceneError::NoMaterial(sphere.id.clone()));
            }
            Ok(())
        })?;
        tracing::debug!("ball controller attached");
        Ok(Self { scene })
    }
}

impl MoveUp for BallController {
    fn move_up(&self) {
        rise(&self.scene);
    }
}

impl ResizeBall for BallController {
    fn change_ball_size(&self, size: f32) {
        apply(&self.scene, "change_ball_size", |s| {
            s.set_scale(SPHERE, Vec3::splat(size))
        });
    }
}

impl RecolorBall for BallController {
    fn change_ball_color(&self, r: f32, g: f32, b: f32, _a: f32) {
        apply(&self.scene, "change_ball_color", |s| {
            s.set_color(SPHERE, Color::new(r, g, b))
        });
    }
}

impl ToggleVisibility for BallController {
    fn set_ball_visible(&self, visible: bool) {
        apply(&self.scene, "set_ball_visible", |s| {
            s.set_visible(SPHERE, visible)
        });
    }

    fn set_floor_visible(&self, visible: bool) {
        apply(&self.scene, "set_floor_visible", |s| {
            s.set_visible(GROUND, visible)
        });
    }
}

impl SceneControls for BallController {
    fn scene(&self) -> &SceneHandle {
        &self.scene
    }

    fn as_move_up(&self) -> Option<&dyn MoveUp> {
        Some(self)
    }

    fn as_resize_ball(&self) -> Option<&dyn ResizeBall> {
        Some(self)
    }

    fn as_recolor_ball(&self) -> Option<&dyn RecolorBall> {
        Some(self)
    }

    fn as_toggle_visibility(&self) -> Option<&dyn ToggleVisibility> {
        Some(self)
    }
}

/// Minimal controller: the sphere can only be raised.
#[derive(Debug, Clone)]
pub struct RiseOnlyController {
    scene: SceneHandle,
}

impl RiseOnlyController {
    pub fn attach(scene: SceneHandle) -> Result<Self, ControlError> {
        scene.with(|s| s.get_entity(SPHERE).map(|_| ()))?;
        tracing::debug!("rise-only controller attached");
        Ok(Self { scene })
    }
}

impl MoveUp for RiseOnlyController {
    fn move_up(&self) {
        rise(&self.scene);
    }
}

impl SceneControls for RiseOnlyController {
    fn scene(&self) -> &SceneHandle {
        &self.scene
    }

    fn as_move_up(&self) -> Option<&dyn MoveUp> {
        Some(self)
    }
}
