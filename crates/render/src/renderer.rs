use crate::snapshot::FrameSnapshot;
use std::fmt::Write;

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// A renderer turns one frame snapshot into output. It never sees the live
/// scene, so it cannot mutate it.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame.
    fn render(&self, frame: &FrameSnapshot) -> Self::Output;
}

/// Text renderer: one human-readable block per frame.
///
/// Stands in for a GPU backend in the CLI host and in tests.
#[derive(Debug, Default)]
pub struct TextRenderer;

impl TextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for TextRenderer {
    type Output = String;

    fn render(&self, frame: &FrameSnapshot) -> String {
        let mut out = String::new();
        let cam = &frame.camera;
        // Writing into a String cannot fail.
        let _ = writeln!(
            out,
            "=== Frame {} (revision={}) ===",
            frame.frame, frame.revision
        );
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0} aspect={:.2}",
            cam.position.x,
            cam.position.y,
            cam.position.z,
            cam.target.x,
            cam.target.y,
            cam.target.z,
            cam.fov_degrees,
            cam.aspect
        );
        let _ = writeln!(
            out,
            "Light: dir=({:.1}, {:.1}, {:.1}) intensity={:.2}",
            frame.light.direction.x,
            frame.light.direction.y,
            frame.light.direction.z,
            frame.light.intensity
        );
        let _ = writeln!(out, "Draws: {}", frame.draws.len());

        for draw in &frame.draws {
            let (pos, scale) = (draw.transform.position, draw.transform.scale);
            let _ = write!(
                out,
                "  [{}] {} pos=({:.2}, {:.2}, {:.2}) scale=({:.2}, {:.2}, {:.2})",
                draw.id, draw.geometry, pos.x, pos.y, pos.z, scale.x, scale.y, scale.z
            );
            match draw.color {
                Some(c) => {
                    let _ = writeln!(out, " color=({:.2}, {:.2}, {:.2})", c.r(), c.g(), c.b());
                }
                None => out.push('\n'),
            }
        }

        out
    }
}
