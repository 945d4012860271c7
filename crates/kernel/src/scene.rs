use crate::config::{SceneConfig, Viewport};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use spherescene_common::{Camera, Color, EntityId, Geometry, Light, Material, Transform};
use std::collections::BTreeMap;

/// Id of the sphere entity.
pub const SPHERE: &str = "sphere";
/// Id of the ground entity.
pub const GROUND: &str = "ground";
/// Events kept before the oldest half of the log is discarded.
pub const EVENT_LOG_CAPACITY: usize = 1024;

/// Errors from scene operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("entity {0} not found")]
    NotFound(EntityId),
    #[error("entity {0} has no material")]
    NoMaterial(EntityId),
}

/// An event record produced by every mutation to the scene.
///
/// Each event carries the old and new value of the field it touched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneEvent {
    PositionChanged { id: EntityId, old: Vec3, new: Vec3 },
    ScaleChanged { id: EntityId, old: Vec3, new: Vec3 },
    ColorChanged { id: EntityId, old: Color, new: Color },
    VisibilityChanged { id: EntityId, visible: bool },
    ViewportResized { width: u32, height: u32 },
    /// Scene restored to its initial configuration.
    Reset,
}

/// One renderable object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub transform: Transform,
    pub visible: bool,
    pub material: Option<Material>,
    geometry: Geometry,
}

impl Entity {
    fn new(id: &str, geometry: Geometry, transform: Transform, material: Option<Material>) -> Self {
        Self {
            id: EntityId::new(id),
            transform,
            visible: true,
            material,
            geometry,
        }
    }

    /// Shape descriptor, fixed at creation.
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Diffuse color, if the entity has a material.
    pub fn color(&self) -> Option<Color> {
        self.material.map(|m| m.diffuse)
    }
}

/// The authoritative scene state.
///
/// Owns the sphere and ground entities plus the camera and light. All
/// mutations go through explicit operations; each one bumps `revision` and
/// appends to the event log. Uses BTreeMap for deterministic iteration order.
///
/// The event log holds at most [`EVENT_LOG_CAPACITY`] entries. Hosts that
/// care about every event must call [`Scene::drain_events`] before it fills;
/// the render loop does so every frame.
#[derive(Debug, Clone)]
pub struct Scene {
    entities: BTreeMap<EntityId, Entity>,
    camera: Camera,
    light: Light,
    revision: u64,
    events: Vec<SceneEvent>,
    /// Current output size; survives `reset`.
    viewport: Viewport,
    /// Layout the scene was built from, kept for `reset`.
    config: SceneConfig,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(SceneConfig::default())
    }
}

impl Scene {
    /// Build the demo scene: camera, light, sphere and ground.
    pub fn new(config: SceneConfig) -> Self {
        let mut scene = Self {
            entities: BTreeMap::new(),
            camera: config.camera,
            light: config.light,
            revision: 0,
            events: Vec::new(),
            viewport: config.viewport,
            config,
        };
        scene.populate();
        tracing::debug!(
            "scene built with {} entities, sphere material: {}",
            scene.entities.len(),
            scene.config.sphere.material
        );
        scene
    }

    fn populate(&mut self) {
        let cfg = &self.config;
        let sphere = Entity::new(
            SPHERE,
            Geometry::Sphere {
                diameter: cfg.sphere.diameter,
                segments: cfg.sphere.segments,
            },
            Transform::from_position(cfg.sphere.position),
            cfg.sphere.material.then_some(Material {
                diffuse: cfg.sphere.color,
            }),
        );
        let ground = Entity::new(
            GROUND,
            Geometry::Ground {
                width: cfg.ground.width,
                height: cfg.ground.height,
            },
            Transform::default(),
            None,
        );
        self.camera = cfg.camera;
        self.camera.aspect = self.viewport.aspect();
        self.light = cfg.light;
        self.entities.clear();
        self.entities.insert(sphere.id.clone(), sphere);
        self.entities.insert(ground.id.clone(), ground);
    }

    /// Current output size, as last set by `resize_viewport`.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn light(&self) -> &Light {
        &self.light
    }

    /// Number of mutations applied since construction.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Read-only access to all entities in id order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[SceneEvent] {
        &self.events
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn get_entity(&self, id: &str) -> Result<&Entity, SceneError> {
        self.entities
            .get(id)
            .ok_or_else(|| SceneError::NotFound(EntityId::new(id)))
    }

    fn entity_mut(&mut self, id: &str) -> Result<&mut Entity, SceneError> {
        self.entities
            .get_mut(id)
            .ok_or_else(|| SceneError::NotFound(EntityId::new(id)))
    }

    fn record(&mut self, event: SceneEvent) {
        tracing::debug!(revision = self.revision + 1, ?event, "scene mutated");
        self.revision += 1;
        if self.events.len() >= EVENT_LOG_CAPACITY {
            let dropped = EVENT_LOG_CAPACITY / 2;
            self.events.drain(..dropped);
            tracing::trace!(dropped, "event log full, oldest events discarded");
        }
        self.events.push(event);
    }

    pub fn set_position(&mut self, id: &str, position: Vec3) -> Result<(), SceneError> {
        let entity = self.entity_mut(id)?;
        let old = std::mem::replace(&mut entity.transform.position, position);
        let id = entity.id.clone();
        self.record(SceneEvent::PositionChanged {
            id,
            old,
            new: position,
        });
        Ok(())
    }

    /// Offset an entity's position by `delta`.
    pub fn translate(&mut self, id: &str, delta: Vec3) -> Result<(), SceneError> {
        let position = self.get_entity(id)?.transform.position + delta;
        self.set_position(id, position)
    }

    /// Set per-axis scale. Values are stored as given, including zero and
    /// negative components.
    pub fn set_scale(&mut self, id: &str, scale: Vec3) -> Result<(), SceneError> {
        let entity = self.entity_mut(id)?;
        let old = std::mem::replace(&mut entity.transform.scale, scale);
        let id = entity.id.clone();
        self.record(SceneEvent::ScaleChanged {
            id,
            old,
            new: scale,
        });
        Ok(())
    }

    /// Set the diffuse color of an entity's material.
    pub fn set_color(&mut self, id: &str, color: Color) -> Result<(), SceneError> {
        let entity = self.entity_mut(id)?;
        let Some(material) = entity.material.as_mut() else {
            return Err(SceneError::NoMaterial(entity.id.clone()));
        };
        let old = std::mem::replace(&mut material.diffuse, color);
        let id = entity.id.clone();
        self.record(SceneEvent::ColorChanged {
            id,
            old,
            new: color,
        });
        Ok(())
    }

    pub fn set_visible(&mut self, id: &str, visible: bool) -> Result<(), SceneError> {
        let entity = self.entity_mut(id)?;
        entity.visible = visible;
        let id = entity.id.clone();
        self.record(SceneEvent::VisibilityChanged { id, visible });
        Ok(())
    }

    /// Record a new output size and update the camera aspect ratio.
    pub fn resize_viewport(&mut self, width: u32, height: u32) {
        self.viewport.width = width;
        self.viewport.height = height;
        self.camera.aspect = self.viewport.aspect();
        self.record(SceneEvent::ViewportResized { width, height });
    }

    /// Restore entities, camera and light to the initial configuration.
    /// The current viewport is kept, so the camera aspect still matches the
    /// output. Revision keeps counting; the event log records the reset.
    pub fn reset(&mut self) {
        self.populate();
        self.record(SceneEvent::Reset);
    }
}
