use crate::renderer::Renderer;
use crate::snapshot::FrameSnapshot;
use glam::Vec3;
use spherescene_kernel::{SPHERE, Scene, SceneHandle};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Render loop lifecycle. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// Host-side stop switch for a render loop. Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Deterministic per-frame change applied before the frame is read.
pub trait FrameUpdate: Send {
    fn update(&mut self, scene: &mut Scene, frame: u64);
}

/// Raises the sphere by `step` every frame.
#[derive(Debug, Clone, Copy)]
pub struct AutoRise {
    pub step: f32,
}

impl FrameUpdate for AutoRise {
    fn update(&mut self, scene: &mut Scene, frame: u64) {
        if let Err(e) = scene.translate(SPHERE, Vec3::new(0.0, self.step, 0.0)) {
            tracing::warn!(frame, "auto rise skipped: {e}");
        }
    }
}

/// How long the loop waits between frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FramePacing {
    /// Yield the thread and go again as soon as the scheduler allows.
    #[default]
    Unpaced,
    /// Hold each frame to at least this duration.
    Interval(Duration),
}

impl FramePacing {
    /// Pacing for a target frame rate. Non-positive or non-finite rates are
    /// unpaced, as are rates so low their interval does not fit a `Duration`.
    pub fn fps(rate: f32) -> Self {
        if !(rate.is_finite() && rate > 0.0) {
            return Self::Unpaced;
        }
        match Duration::try_from_secs_f32(1.0 / rate) {
            Ok(interval) => Self::Interval(interval),
            Err(e) => {
                tracing::warn!(rate, "frame rate out of range, running unpaced: {e}");
                Self::Unpaced
            }
        }
    }

    fn wait(&self, frame_start: Instant) {
        match self {
            Self::Unpaced => std::thread::yield_now(),
            Self::Interval(interval) => {
                let elapsed = frame_start.elapsed();
                if elapsed < *interval {
                    std::thread::sleep(*interval - elapsed);
                }
            }
        }
    }
}

/// Drives a renderer from the shared scene, one snapshot per frame.
///
/// Each frame: apply the optional [`FrameUpdate`], copy a [`FrameSnapshot`]
/// under the scene lock, render the copy, then yield until the next frame.
/// The loop runs until its [`StopSignal`] fires.
pub struct RenderLoop<R: Renderer> {
    scene: SceneHandle,
    renderer: R,
    update: Option<Box<dyn FrameUpdate>>,
    pacing: FramePacing,
    stop: StopSignal,
    state: LoopState,
    frame: u64,
}

impl<R: Renderer> RenderLoop<R> {
    pub fn new(scene: SceneHandle, renderer: R) -> Self {
        Self {
            scene,
            renderer,
            update: None,
            pacing: FramePacing::default(),
            stop: StopSignal::new(),
            state: LoopState::Running,
            frame: 0,
        }
    }

    pub fn with_update(mut self, update: impl FrameUpdate + 'static) -> Self {
        self.update = Some(Box::new(update));
        self
    }

    pub fn with_pacing(mut self, pacing: FramePacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Signal the host uses to end the loop.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Number of frames rendered so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Render one frame and return the renderer's output.
    pub fn render_frame(&mut self) -> R::Output {
        let snapshot = self.take_snapshot();
        let output = self.renderer.render(&snapshot);
        tracing::trace!(frame = self.frame, draws = snapshot.draws.len(), "frame rendered");
        self.frame += 1;
        output
    }

    fn take_snapshot(&mut self) -> FrameSnapshot {
        let mut scene = self.scene.write();
        if let Some(update) = self.update.as_mut() {
            update.update(&mut scene, self.frame);
        }
        let events = scene.drain_events();
        if !events.is_empty() {
            tracing::debug!(
                frame = self.frame,
                revision = scene.revision(),
                "{} scene change(s) since last frame",
                events.len()
            );
        }
        FrameSnapshot::capture(&scene, self.frame)
    }

    /// Render until the stop signal fires, handing every frame to `present`.
    /// Returns the number of frames rendered by this call.
    pub fn run(&mut self, present: impl FnMut(R::Output)) -> u64 {
        self.run_until(None, present)
    }

    /// Render at most `frames` frames. Ends early if the stop signal fires;
    /// otherwise the loop stays `Running` and can be resumed.
    pub fn run_frames(&mut self, frames: u64, present: impl FnMut(R::Output)) -> u64 {
        self.run_until(Some(frames), present)
    }

    fn run_until(&mut self, limit: Option<u64>, mut present: impl FnMut(R::Output)) -> u64 {
        let _span = tracing::info_span!("render_loop").entered();
        let mut rendered = 0;
        if self.poll_running() {
            tracing::debug!(start_frame = self.frame, ?limit, "render loop running");
        }
        while self.poll_running() && limit.is_none_or(|n| rendered < n) {
            let frame_start = Instant::now();
            let output = self.render_frame();
            present(output);
            rendered += 1;
            self.pacing.wait(frame_start);
        }
        rendered
    }

    fn poll_running(&mut self) -> bool {
        if self.state == LoopState::Running && self.stop.is_stopped() {
            self.state = LoopState::Stopped;
            tracing::info!("render loop stopped after {} frames", self.frame);
        }
        self.state == LoopState::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spherescene_kernel::GROUND;
    use std::thread;

    /// Renderer that hands back the snapshot it was given.
    struct Capture;

    impl Renderer for Capture {
        type Output = FrameSnapshot;

        fn render(&self, frame: &FrameSnapshot) -> FrameSnapshot {
            frame.clone()
        }
    }

    fn sphere_y(frame: &FrameSnapshot) -> f32 {
        frame.draw(SPHERE).unwrap().transform.position.y
    }

    #[test]
    fn run_frames_renders_exact_count() {
        let mut lp = RenderLoop::new(SceneHandle::default(), Capture);
        let mut frames = Vec::new();
        assert_eq!(lp.run_frames(3, |f| frames.push(f.frame)), 3);
        assert_eq!(frames, vec![0, 1, 2]);
        assert_eq!(lp.frame(), 3);
        assert_eq!(lp.state(), LoopState::Running);

        lp.run_frames(2, |_| {});
        assert_eq!(lp.frame(), 5);
    }

    #[test]
    fn run_zero_frames_renders_nothing() {
        let mut lp = RenderLoop::new(SceneHandle::default(), Capture);
        let mut presented = 0;
        assert_eq!(lp.run_frames(0, |_| presented += 1), 0);
        assert_eq!(presented, 0);
        assert_eq!(lp.frame(), 0);
    }

    #[test]
    fn stop_signal_ends_run() {
        let mut lp = RenderLoop::new(SceneHandle::default(), Capture);
        let stop = lp.stop_signal();
        let rendered = lp.run(|f| {
            if f.frame == 4 {
                stop.stop();
            }
        });
        assert_eq!(rendered, 5);
        assert_eq!(lp.state(), LoopState::Stopped);
    }

    #[test]
    fn stopped_is_terminal() {
        let mut lp = RenderLoop::new(SceneHandle::default(), Capture);
        lp.stop_signal().stop();
        assert_eq!(lp.run_frames(10, |_| {}), 0);
        assert_eq!(lp.state(), LoopState::Stopped);
        assert_eq!(lp.run(|_| {}), 0);
        assert_eq!(lp.frame(), 0);
    }

    #[test]
    fn mutation_before_frame_is_visible_in_that_frame() {
        let handle = SceneHandle::default();
        let mut lp = RenderLoop::new(handle.clone(), Capture);
        let first = lp.render_frame();
        assert!(first.draw(GROUND).is_some());

        let writer = handle.clone();
        thread::spawn(move || writer.with_mut(|s| s.set_visible(GROUND, false)))
            .join()
            .unwrap()
            .unwrap();

        let second = lp.render_frame();
        assert!(second.draw(GROUND).is_none());
        assert_eq!(second.revision, 1);
        // Events are consumed by the loop.
        assert!(handle.read().events().is_empty());
    }

    #[test]
    fn concurrent_writer_converges() {
        let handle = SceneHandle::default();
        let mut lp = RenderLoop::new(handle.clone(), Capture);
        let done = Arc::new(AtomicBool::new(false));

        let writer = {
            let handle = handle.clone();
            let done = done.clone();
            thread::spawn(move || {
                for _ in 0..100 {
                    handle
                        .with_mut(|s| s.translate(SPHERE, Vec3::new(0.0, 1.0, 0.0)))
                        .unwrap();
                }
                done.store(true, Ordering::Release);
            })
        };

        let mut last_y = 0.0;
        while !done.load(Ordering::Acquire) {
            lp.run_frames(1, |f| last_y = sphere_y(&f));
        }
        writer.join().unwrap();
        assert!(last_y <= 101.0);

        let final_frame = lp.render_frame();
        assert_eq!(sphere_y(&final_frame), 101.0);
        assert_eq!(final_frame.revision, 100);
    }

    #[test]
    fn auto_rise_applies_before_read() {
        let mut lp =
            RenderLoop::new(SceneHandle::default(), Capture).with_update(AutoRise { step: 0.5 });
        let mut ys = Vec::new();
        lp.run_frames(3, |f| ys.push(sphere_y(&f)));
        assert_eq!(ys, vec![1.5, 2.0, 2.5]);
    }

    #[test]
    fn fps_pacing() {
        assert_eq!(FramePacing::fps(0.0), FramePacing::Unpaced);
        assert_eq!(FramePacing::fps(f32::NAN), FramePacing::Unpaced);
        let FramePacing::Interval(interval) = FramePacing::fps(50.0) else {
            panic!("expected an interval");
        };
        assert!((interval.as_secs_f64() - 0.02).abs() < 1e-6);
    }

    #[test]
    fn fps_too_low_for_duration_is_unpaced() {
        assert_eq!(FramePacing::fps(1e-30), FramePacing::Unpaced);
        assert_eq!(FramePacing::fps(f32::MIN_POSITIVE), FramePacing::Unpaced);
        assert!(matches!(FramePacing::fps(0.001), FramePacing::Interval(_)));
    }

    #[test]
    fn paced_loop_holds_frame_interval() {
        let mut lp = RenderLoop::new(SceneHandle::default(), Capture)
            .with_pacing(FramePacing::Interval(Duration::from_millis(10)));
        let start = Instant::now();
        lp.run_frames(3, |_| {});
        assert!(start.elapsed() >= Duration::from_millis(30));
    }
}
