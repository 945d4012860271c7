//! Scene Kernel: the single source of truth for everything rendered.
//!
//! # Invariants
//! - Exactly one sphere and one ground entity exist; none are created or
//!   destroyed after construction.
//! - All state mutations flow through explicit operations and bump the
//!   scene revision.
//! - Field writes are independent: changing visibility never touches
//!   position, scale or color.

pub mod config;
mod handle;
pub mod scene;

pub use config::{ConfigError, GroundConfig, SceneConfig, SphereConfig, Viewport};
pub use handle::SceneHandle;
pub use scene::{EVENT_LOG_CAPACITY, Entity, GROUND, SPHERE, Scene, SceneError, SceneEvent};
