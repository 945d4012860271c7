//! Shared value types used by every spherescene crate.
//!
//! # Invariants
//! - Value types are plain `Copy`/`Clone` data with no interior mutability.
//! - Color components are always within `[0, 1]`.

mod types;

pub use types::{Camera, Color, EntityId, Geometry, Light, Material, Transform};
