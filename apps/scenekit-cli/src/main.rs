use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::{IVec2, UVec2};
use scenekit_assets::MeshTable;
use scenekit_input::{InputSnapshot, Key, MouseState};
use scenekit_kernel::{Scene, SceneConfig, SceneMeshes};
use scenekit_render::{RecordingMeshRenderer, ShapeBatch, render_frame};
use scenekit_tools::{GameInfo, SceneInspector, panels};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "scenekit-cli", about = "Headless driver for the scenekit frame core")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Print the default scene configuration as JSON
    DefaultConfig,
    /// Run the reference scene for a number of frames
    Simulate {
        /// Scene configuration file (JSON); defaults reproduce the reference scene
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Number of frames to run
        #[arg(short, long, default_value = "60")]
        frames: u32,
        /// Seconds per frame
        #[arg(long, default_value = "0.016")]
        dt: f32,
        /// Keys held every frame, comma separated (W,A,S,D)
        #[arg(long, value_delimiter = ',')]
        hold: Vec<Key>,
        /// Pixels the mouse drags right per frame with the left button held
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        orbit: i32,
        /// Hold the right button so the cursor ray is picked every frame
        #[arg(long)]
        pick: bool,
        /// Press G on the first frame to toggle bone gizmos
        #[arg(long)]
        gizmos: bool,
        /// Window size as WIDTHxHEIGHT
        #[arg(long, default_value = "1280x720", value_parser = parse_window)]
        window: UVec2,
    },
}

fn parse_window(s: &str) -> Result<UVec2, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let w = w.trim().parse::<u32>().map_err(|e| format!("width: {e}"))?;
    let h = h.trim().parse::<u32>().map_err(|e| format!("height: {e}"))?;
    Ok(UVec2::new(w, h))
}

struct Script {
    hold: Vec<Key>,
    orbit: i32,
    pick: bool,
    gizmos: bool,
    window: UVec2,
}

impl Script {
    fn input(&self, frame: u32) -> InputSnapshot {
        let mut input = InputSnapshot::with_keys(self.hold.iter().copied());
        if self.gizmos && frame == 0 {
            input.press(Key::G);
        }
        let centre = self.window.as_ivec2() / 2;
        let frame = i32::try_from(frame).unwrap_or(i32::MAX);
        let drag = self.orbit.saturating_mul(frame);
        input.with_mouse(MouseState {
            position: IVec2::new(centre.x.saturating_add(drag), centre.y),
            left: self.orbit != 0,
            right: self.pick,
        })
    }
}

fn simulate(
    config: SceneConfig,
    frames: u32,
    dt: f32,
    script: &Script,
    verbose: bool,
) -> anyhow::Result<()> {
    let mut meshes = MeshTable::new();
    let slots = SceneMeshes::register_placeholders(&mut meshes)?;
    let mut scene = Scene::reference(config, meshes, slots)?;

    let mut renderer = RecordingMeshRenderer::new();
    let mut shapes = ShapeBatch::new();
    let mut last_report = None;

    for frame in 0..frames {
        let time = frame as f32 * dt;
        scene.update(time, dt, &script.input(frame))?;
        let report = render_frame(&mut scene, &mut renderer, &mut shapes, time, script.window)?;
        last_report = Some(report);
    }

    println!("{}", SceneInspector::summary(&scene));
    for id in SceneInspector::list_entities(&scene) {
        if let Some(info) = SceneInspector::inspect_entity(&scene, id) {
            println!("  {info}");
        }
    }
    println!("{}", GameInfo::of(&scene));
    println!(
        "Player: {} | Clip: {} | Gizmos: {}",
        panels::fsm_state_label(&scene),
        panels::clip_label(&scene),
        scene.settings.show_bone_gizmos
    );
    if let Some(anchor) = panels::label_anchor(&scene) {
        println!("Prop label at ({:.0}, {:.0})", anchor.x, anchor.y);
    }
    if let Some(ray) = scene.last_pick.mouse_ray {
        println!("Cursor ray: origin={} dir={}", ray.origin, ray.dir);
    }
    match last_report {
        Some(report) => println!("{report}"),
        None => println!("No frames rendered"),
    }
    if verbose {
        print!("{renderer}");
        println!("Debug lines: {}", shapes.last_flush().len());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("scenekit-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", scenekit_common::crate_info());
            println!("ecs: {}", scenekit_ecs::crate_info());
            println!("assets: {}", scenekit_assets::crate_info());
            println!("input: {}", scenekit_input::crate_info());
            println!("kernel: {}", scenekit_kernel::crate_info());
            println!("render: {}", scenekit_render::crate_info());
            println!("tools: {}", scenekit_tools::crate_info());
        }
        Commands::DefaultConfig => {
            println!("{}", SceneConfig::default().to_json_pretty()?);
        }
        Commands::Simulate {
            config,
            frames,
            dt,
            hold,
            orbit,
            pick,
            gizmos,
            window,
        } => {
            let config = match config {
                Some(path) => SceneConfig::from_json_file(&path)
                    .with_context(|| format!("loading scene config {}", path.display()))?,
                None => SceneConfig::default(),
            };
            tracing::info!(frames, dt, ?hold, orbit, "simulating reference scene");
            let script = Script {
                hold,
                orbit,
                pick,
                gizmos,
                window,
            };
            simulate(config, frames, dt, &script, cli.verbose)?;
        }
    }

    Ok(())
}
