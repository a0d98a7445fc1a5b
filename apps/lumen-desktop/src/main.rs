mod app;
mod keys;
mod state;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use lumen_assets::{AssetSource, DirectoryAssets, ProceduralAssets};
use lumen_render::DemoConfig;
use lumen_scene::Scene;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use winit::event_loop::{ControlFlow, EventLoop};

#[derive(Parser)]
#[command(name = "lumen-desktop", about = "Lumen rendering demo")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of lights (overrides the config)
    #[arg(long)]
    lights: Option<usize>,

    /// Seed for light generation (overrides the config)
    #[arg(long)]
    seed: Option<u64>,

    /// Start with SSAO disabled
    #[arg(long)]
    no_ssao: bool,

    /// Directory with PNG textures and sky faces
    #[arg(long)]
    assets: Option<PathBuf>,
}

impl Cli {
    fn demo_config(&self) -> Result<DemoConfig> {
        let mut config = match &self.config {
            Some(path) => DemoConfig::load(path)
                .with_context(|| format!("load config {}", path.display()))?,
            None => DemoConfig::default(),
        };
        if let Some(lights) = self.lights {
            config.scene.light_count = lights;
        }
        if let Some(seed) = self.seed {
            config.scene.seed = seed;
        }
        if self.no_ssao {
            config.render.ssao.enabled = false;
        }
        if let Some(dir) = &self.assets {
            config.scene.asset_dir = Some(dir.clone());
        }
        config.validate().context("invalid settings")?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = cli.demo_config()?;
    tracing::info!(
        lights = config.scene.light_count,
        seed = config.scene.seed,
        ssao = config.render.ssao.enabled,
        "lumen-desktop starting"
    );

    let procedural =
        ProceduralAssets::default().with_sky_face_size(config.render.ibl.environment_face_size);
    let assets: Box<dyn AssetSource> = match &config.scene.asset_dir {
        Some(dir) => Box::new(DirectoryAssets::new(dir).with_fallback(procedural)),
        None => Box::new(procedural),
    };
    let scene = Scene::demo(config.scene.light_count, config.scene.seed);
    let state = state::AppState::new(
        scene,
        config.render,
        config.scene.seed,
        config.scene.spin_speed,
    );

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);
    let mut app = app::GpuApp::new(state, config, assets);
    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from(["lumen-desktop", "--lights", "5", "--seed", "9", "--no-ssao"]);
        let config = cli.demo_config().unwrap();
        assert_eq!(config.scene.light_count, 5);
        assert_eq!(config.scene.seed, 9);
        assert!(!config.render.ssao.enabled);
    }

    #[test]
    fn too_many_lights_is_rejected() {
        let cli = Cli::parse_from(["lumen-desktop", "--lights", "1000"]);
        assert!(cli.demo_config().is_err());
    }
}
