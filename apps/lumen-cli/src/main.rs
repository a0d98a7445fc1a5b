use anyhow::Context;
use clap::{Parser, Subcommand};
use lumen_assets::{AssetSource, DirectoryAssets, ProceduralAssets};
use lumen_render::{
    DebugTextRenderer, DemoConfig, FlyCamera, FrameOptions, FramePlan, Renderer, Viewport,
    brdf_table,
};
use lumen_scene::Scene;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lumen-cli", about = "CLI tool for lumen frame pipeline inspection")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions
    Info,
    /// Print the frame pass list with its resource transitions
    Plan {
        #[arg(long)]
        no_ssao: bool,
        #[arg(long)]
        no_blur: bool,
        /// Include the light gizmo pass
        #[arg(long)]
        gizmos: bool,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Prepare one frame of the demo scene and print what would be drawn
    Scene {
        #[arg(short, long, default_value = "64")]
        lights: usize,
        #[arg(short, long, default_value = "0")]
        seed: u64,
        /// YAML config for render settings
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the split-sum BRDF table computed on the CPU
    Brdf {
        #[arg(long, default_value = "8")]
        size: u32,
        #[arg(long, default_value = "512")]
        samples: u32,
    },
    /// Bake image-based lighting on a headless GPU device
    Bake {
        /// Directory with sky faces; procedural sky if omitted
        #[arg(long)]
        assets: Option<PathBuf>,
        /// YAML config for IBL settings
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<DemoConfig> {
    match path {
        Some(path) => {
            DemoConfig::load(path).with_context(|| format!("load config {}", path.display()))
        }
        None => Ok(DemoConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("lumen-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", lumen_common::crate_info());
            println!("assets: {}", lumen_assets::crate_info());
            println!("scene: {}", lumen_scene::crate_info());
            println!("render: {}", lumen_render::crate_info());
            println!("render-wgpu: {}", lumen_render_wgpu::crate_info());
            println!("input: {}", lumen_input::crate_info());
        }
        Commands::Plan {
            no_ssao,
            no_blur,
            gizmos,
            json,
        } => {
            let plan = FramePlan::build(FrameOptions {
                ssao: !no_ssao,
                ssao_blur: !no_ssao && !no_blur,
                light_gizmos: gizmos,
                overlay: true,
            })?;
            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                print!("{plan}");
                println!(
                    "{} passes, {} transitions",
                    plan.passes().len(),
                    plan.transition_count()
                );
            }
        }
        Commands::Scene {
            lights,
            seed,
            config,
        } => {
            let config = load_config(config.as_ref())?;
            let scene = Scene::demo(lights, seed);
            scene.validate()?;
            let viewport = Viewport::new(config.window.width, config.window.height);
            let camera = FlyCamera {
                aspect: viewport.aspect(),
                ..FlyCamera::default()
            };
            let mut renderer = DebugTextRenderer::new(config.render, viewport)?;
            print!("{}", renderer.render(&scene, &camera)?);
        }
        Commands::Brdf { size, samples } => {
            anyhow::ensure!(size > 0 && samples > 0, "size and samples must be positive");
            println!("BRDF LUT {size}x{size}, {samples} samples (rows: roughness, cols: NdotV)");
            for (row, cells) in brdf_table(size, samples).iter().enumerate() {
                let roughness = (row as f32 + 0.5) / size as f32;
                let cells: Vec<String> = cells
                    .iter()
                    .map(|v| format!("({:.3}, {:.3})", v.x, v.y))
                    .collect();
                println!("r={roughness:.3}: {}", cells.join(" "));
            }
        }
        Commands::Bake { assets, config } => {
            let config = load_config(config.as_ref())?;
            let ibl = config.render.ibl;
            let procedural = ProceduralAssets::default().with_sky_face_size(ibl.environment_face_size);
            let source: Box<dyn AssetSource> = match assets {
                Some(dir) => Box::new(DirectoryAssets::new(dir).with_fallback(procedural)),
                None => Box::new(procedural),
            };
            let scene = Scene::demo(0, 0);
            let report = lumen_render_wgpu::bake_headless(source.as_ref(), scene.sky(), &ibl)
                .context("headless IBL bake")?;
            println!("adapter: {} ({})", report.adapter, report.backend);
            println!("draws: {}", report.draws);
            println!(
                "irradiance: {0}x{0} x 6",
                report.irradiance_face_size
            );
            let mips: Vec<String> = report
                .specular_mip_sizes
                .iter()
                .map(|s| s.to_string())
                .collect();
            println!(
                "specular: {} mips [{}]",
                report.specular_mip_sizes.len(),
                mips.join(", ")
            );
            println!("brdf lut: {0}x{0}", report.brdf_lut_size);
            println!("elapsed: {:.1} ms", report.elapsed.as_secs_f64() * 1000.0);
        }
    }

    Ok(())
}
