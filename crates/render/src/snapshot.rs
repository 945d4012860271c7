use glam::Mat4;
use serde::Serialize;
use spherescene_common::{Camera, Color, EntityId, Geometry, Light, Transform};
use spherescene_kernel::Scene;

/// One visible entity, ready to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawItem {
    pub id: EntityId,
    pub geometry: Geometry,
    pub transform: Transform,
    /// `transform` as a model matrix.
    pub model: Mat4,
    /// Diffuse color; `None` draws with the renderer's default surface.
    pub color: Option<Color>,
}

/// Copy of everything a renderer needs for one frame.
///
/// Taken under the scene lock, consumed after it is released.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSnapshot {
    pub frame: u64,
    /// Scene revision the snapshot was taken at.
    pub revision: u64,
    pub camera: Camera,
    /// `camera` projection times view, for the engine's per-frame uniform.
    pub view_projection: Mat4,
    pub light: Light,
    /// Visible entities only, in id order.
    pub draws: Vec<DrawItem>,
}

impl FrameSnapshot {
    pub fn capture(scene: &Scene, frame: u64) -> Self {
        let draws = scene
            .entities()
            .filter(|e| e.visible)
            .map(|e| DrawItem {
                id: e.id.clone(),
                geometry: e.geometry(),
                transform: e.transform,
                model: e.transform.matrix(),
                color: e.color(),
            })
            .collect();
        Self {
            frame,
            revision: scene.revision(),
            camera: *scene.camera(),
            view_projection: scene.camera().view_projection(),
            light: *scene.light(),
            draws,
        }
    }

    pub fn draw(&self, id: &str) -> Option<&DrawItem> {
        self.draws.iter().find(|d| d.id.as_str() == id)
    }
}
