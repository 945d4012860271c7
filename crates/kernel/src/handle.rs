use crate::scene::Scene;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// Shared, clonable handle to the one scene of a session.
///
/// The render loop and every caller of the mutation API hold a clone. Writers
/// take the lock for a single field assignment; the loop takes it only to
/// copy a frame snapshot, so neither side waits on rendering.
#[derive(Debug, Clone, Default)]
pub struct SceneHandle(Arc<RwLock<Scene>>);

impl SceneHandle {
    pub fn new(scene: Scene) -> Self {
        Self(Arc::new(RwLock::new(scene)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Scene> {
        self.0.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Scene> {
        self.0.write()
    }

    /// Run `f` with shared access.
    pub fn with<T>(&self, f: impl FnOnce(&Scene) -> T) -> T {
        f(&self.0.read())
    }

    /// Run `f` with exclusive access.
    pub fn with_mut<T>(&self, f: impl FnOnce(&mut Scene) -> T) -> T {
        f(&mut self.0.write())
    }
}

impl From<Scene> for SceneHandle {
    fn from(scene: Scene) -> Self {
        Self::new(scene)
    }
}
