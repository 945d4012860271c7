//! Rendering Adapter: renderer-agnostic frame interface and the render loop.
//!
//! # Invariants
//! - Renderers never mutate scene state; they see a copied snapshot.
//! - The loop holds the scene lock only while taking that snapshot.
//! - The loop never stops on its own; the host stops it.

mod driver;
mod renderer;
mod snapshot;

pub use driver::{AutoRise, FramePacing, FrameUpdate, LoopState, RenderLoop, StopSignal};
pub use renderer::{Renderer, TextRenderer};
pub use snapshot::{DrawItem, FrameSnapshot};

pub fn crate_info() -> &'static str {
    "spherescene-render v0.1.0"
}
