//! Developer Tooling: read-only scene inspection for hosts and debugging.
//!
//! # Invariants
//! - Tools never mutate the scene.

mod inspector;

pub use inspector::{EntityInfo, SceneInspector, SceneSummary};

pub fn crate_info() -> &'static str {
    "spherescene-tools v0.1.0"
}
