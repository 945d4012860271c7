use spherescene_common::{Color, EntityId, Geometry};
use spherescene_kernel::{Scene, Viewport};
use std::fmt;

/// Scene inspector for developer tooling.
///
/// Read-only queries against the scene for debugging and host UI.
pub struct SceneInspector;

impl SceneInspector {
    /// Produce a summary of the scene.
    pub fn summary(scene: &Scene) -> SceneSummary {
        SceneSummary {
            revision: scene.revision(),
            entity_count: scene.entity_count(),
            visible_count: scene.entities().filter(|e| e.visible).count(),
            pending_events: scene.events().len(),
            viewport: scene.viewport(),
            camera_aspect: scene.camera().aspect,
            light_intensity: scene.light().intensity,
        }
    }

    /// Details of one entity, or `None` if the id is unknown.
    pub fn inspect_entity(scene: &Scene, id: &str) -> Option<EntityInfo> {
        scene.get_entity(id).ok().map(|e| {
            let p = e.transform.position;
            let s = e.transform.scale;
            EntityInfo {
                id: e.id.clone(),
                geometry: e.geometry(),
                position: [p.x, p.y, p.z],
                scale: [s.x, s.y, s.z],
                visible: e.visible,
                color: e.color(),
            }
        })
    }

    /// Details of every entity in id order.
    pub fn list_entities(scene: &Scene) -> Vec<EntityInfo> {
        scene
            .entities()
            .filter_map(|e| Self::inspect_entity(scene, e.id.as_str()))
            .collect()
    }
}

/// Summary of scene state for the inspector.
#[derive(Debug, Clone)]
pub struct SceneSummary {
    pub revision: u64,
    pub entity_count: usize,
    pub visible_count: usize,
    pub pending_events: usize,
    pub viewport: Viewport,
    pub camera_aspect: f32,
    pub light_intensity: f32,
}

impl fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scene: revision={} entities={} visible={} pending_events={} viewport={}x{} aspect={:.2} light={:.2}",
            self.revision,
            self.entity_count,
            self.visible_count,
            self.pending_events,
            self.viewport.width,
            self.viewport.height,
            self.camera_aspect,
            self.light_intensity
        )
    }
}

/// Detailed info about a single entity.
#[derive(Debug, Clone)]
pub struct EntityInfo {
    pub id: EntityId,
    pub geometry: Geometry,
    pub position: [f32; 3],
    pub scale: [f32; 3],
    pub visible: bool,
    pub color: Option<Color>,
}

impl fmt::Display for EntityInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Entity [{}] {} pos=({:.2}, {:.2}, {:.2}) scale=({:.2}, {:.2}, {:.2}) visible={}",
            self.id,
            self.geometry,
            self.position[0],
            self.position[1],
            self.position[2],
            self.scale[0],
            self.scale[1],
            self.scale[2],
            self.visible,
        )?;
        if let Some(c) = self.color {
            write!(f, " color=({:.2}, {:.2}, {:.2})", c.r(), c.g(), c.b())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use spherescene_kernel::{GROUND, SPHERE};

    #[test]
    fn summary_default_scene() {
        let scene = Scene::default();
        let summary = SceneInspector::summary(&scene);
        assert_eq!(summary.revision, 0);
        assert_eq!(summary.entity_count, 2);
        assert_eq!(summary.visible_count, 2);
        assert_eq!(summary.pending_events, 0);
    }

    #[test]
    fn summary_after_mutations() {
        let mut scene = Scene::default();
        scene.set_visible(GROUND, false).unwrap();
        scene.set_scale(SPHERE, Vec3::splat(2.0)).unwrap();

        let summary = SceneInspector::summary(&scene);
        assert_eq!(summary.revision, 2);
        assert_eq!(summary.visible_count, 1);
        assert_eq!(summary.pending_events, 2);
    }

    #[test]
    fn inspect_entity_found() {
        let scene = Scene::default();
        let info = SceneInspector::inspect_entity(&scene, SPHERE).unwrap();
        assert_eq!(info.position, [0.0, 1.0, 0.0]);
        assert_eq!(info.scale, [1.0, 1.0, 1.0]);
        assert_eq!(info.color, Some(Color::WHITE));
        assert!(info.to_string().contains("color=(1.00, 1.00, 1.00)"));
    }

    #[test]
    fn inspect_entity_not_found() {
        let scene = Scene::default();
        assert!(SceneInspector::inspect_entity(&scene, "cube").is_none());
    }

    #[test]
    fn list_entities_in_id_order() {
        let scene = Scene::default();
        let infos = SceneInspector::list_entities(&scene);
        let ids: Vec<&str> = infos.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec![GROUND, SPHERE]);
        assert!(infos[0].color.is_none());
        assert!(!infos[0].to_string().contains("color="));
    }

    #[test]
    fn summary_display() {
        let summary = SceneInspector::summary(&Scene::default());
        let s = format!("{summary}");
        assert!(s.contains("revision=0"));
        assert!(s.contains("entities=2"));
        assert!(s.contains("viewport=1920x1080"));
    }

    #[test]
    fn summary_reports_viewport_after_reset() {
        let mut scene = Scene::default();
        scene.resize_viewport(640, 480);
        scene.reset();
        let summary = SceneInspector::summary(&scene);
        assert_eq!((summary.viewport.width, summary.viewport.height), (640, 480));
        assert!((summary.camera_aspect - 640.0 / 480.0).abs() < 1e-6);
    }
}
