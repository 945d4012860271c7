use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use spherescene_author::{
    Action, BallController, MOVE_UP_STEP, RiseOnlyController, SceneControls, parse_script,
};
use spherescene_kernel::{Scene, SceneConfig, SceneHandle};
use spherescene_render::{AutoRise, FramePacing, FrameSnapshot, RenderLoop, TextRenderer};
use spherescene_tools::SceneInspector;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "spherescene-cli", about = "Sphere scene demo host")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SceneArgs {
    /// YAML scene config; defaults to the built-in demo layout
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Build the sphere without a material and expose only move-up
    #[arg(long)]
    minimal: bool,

    /// Actions separated by ';', e.g. "size 3; up x4; floor off"
    #[arg(short, long, default_value = "")]
    script: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Run the render loop while a host thread applies the script
    Run {
        #[command(flatten)]
        scene: SceneArgs,
        /// Stop after this many frames; runs until killed when omitted
        #[arg(short, long)]
        frames: Option<u64>,
        /// Target frame rate; 0 renders as fast as possible
        #[arg(long, default_value = "60")]
        fps: f32,
        /// Delay between scripted actions, in milliseconds
        #[arg(long, default_value = "16")]
        action_delay_ms: u64,
        /// Raise the sphere automatically every frame
        #[arg(long)]
        auto_rise: bool,
    },
    /// Apply the script synchronously and print the resulting scene
    Inspect {
        #[command(flatten)]
        scene: SceneArgs,
        /// Print the frame snapshot as JSON
        #[arg(long)]
        json: bool,
    },
}

fn build_scene(args: &SceneArgs) -> Result<(SceneHandle, Box<dyn SceneControls>, Vec<Action>)> {
    let mut config = match &args.config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("loading scene config {}", path.display()))?,
        None => SceneConfig::default(),
    };
    if args.minimal {
        config.sphere.material = false;
    }
    let actions = parse_script(&args.script)?;

    let handle = SceneHandle::new(Scene::new(config));
    let controls: Box<dyn SceneControls> = if args.minimal {
        Box::new(RiseOnlyController::attach(handle.clone())?)
    } else {
        Box::new(BallController::attach(handle.clone())?)
    };
    tracing::info!(
        "scene ready; capabilities: {}",
        controls
            .capabilities()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );
    let unsupported: BTreeSet<String> = actions
        .iter()
        .filter_map(Action::required_capability)
        .filter(|c| !controls.supports(*c))
        .map(|c| c.to_string())
        .collect();
    if !unsupported.is_empty() {
        tracing::warn!(
            "script uses capabilities this controller lacks: {}",
            unsupported.into_iter().collect::<Vec<_>>().join(", ")
        );
    }
    Ok((handle, controls, actions))
}

fn apply_logged(action: &Action, controls: &dyn SceneControls) {
    if let Err(e) = action.apply(controls) {
        tracing::warn!(?action, "action rejected: {e}");
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("spherescene-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("kernel: revision={}", Scene::default().revision());
            println!("render: {}", spherescene_render::crate_info());
            println!("author: {}", spherescene_author::crate_info());
            println!("tools: {}", spherescene_tools::crate_info());
        }
        Commands::Run {
            scene,
            frames,
            fps,
            action_delay_ms,
            auto_rise,
        } => {
            let (handle, controls, actions) = build_scene(&scene)?;

            let mut render_loop =
                RenderLoop::new(handle.clone(), TextRenderer::new()).with_pacing(FramePacing::fps(fps));
            if auto_rise {
                render_loop = render_loop.with_update(AutoRise {
                    step: MOVE_UP_STEP,
                });
            }

            let delay = Duration::from_millis(action_delay_ms);
            let host = thread::spawn(move || {
                for action in &actions {
                    apply_logged(action, controls.as_ref());
                    thread::sleep(delay);
                }
                tracing::debug!("host script finished ({} actions)", actions.len());
            });

            tracing::info!(?frames, fps, "starting render loop");
            let mut last_frame = String::new();
            let present = |output: String| last_frame = output;
            let rendered = match frames {
                Some(limit) => render_loop.run_frames(limit, present),
                None => render_loop.run(present),
            };
            tracing::info!(rendered, "render loop finished");

            host.join()
                .map_err(|_| anyhow::anyhow!("host thread panicked"))?;
            print!("{last_frame}");
            println!("{}", SceneInspector::summary(&handle.read()));
        }
        Commands::Inspect { scene, json } => {
            let (handle, controls, actions) = build_scene(&scene)?;
            for action in &actions {
                apply_logged(action, controls.as_ref());
            }

            let scene = handle.read();
            if json {
                let snapshot = FrameSnapshot::capture(&scene, 0);
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                println!("{}", SceneInspector::summary(&scene));
                for info in SceneInspector::list_entities(&scene) {
                    println!("  {info}");
                }
            }
        }
    }

    Ok(())
}
