//! Command line options. Every flag can also be set through a `MORPHFIELD_*`
//! environment variable.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use asset::{MeshPrep, ModelSource, ModelSpec, Shape};
use clap::Parser;
use corelib::color::Palette;
use platform::RunConfig;
use platform::scene::AnimationSettings;

#[derive(Debug, Parser)]
#[command(name = "morphfield", version, about = "Scroll to morph a particle cloud between two models")]
pub struct Cli {
    /// Model shown at the top of the page (.obj, .gltf, .glb).
    #[arg(long, env = "MORPHFIELD_FROM")]
    pub from: Option<PathBuf>,

    /// Model shown at the bottom of the page (.obj, .gltf, .glb).
    #[arg(long, env = "MORPHFIELD_TO")]
    pub to: Option<PathBuf>,

    /// Built-in shape used when --from is not given.
    #[arg(long, default_value = "sphere", env = "MORPHFIELD_FROM_SHAPE")]
    pub from_shape: Shape,

    /// Built-in shape used when --to is not given.
    #[arg(long, default_value = "torus", env = "MORPHFIELD_TO_SHAPE")]
    pub to_shape: Shape,

    /// Particles in the morphing cloud.
    #[arg(long, default_value_t = 10_000, env = "MORPHFIELD_COUNT")]
    pub count: usize,

    /// Background particles.
    #[arg(long, default_value_t = 500, env = "MORPHFIELD_STARS")]
    pub stars: usize,

    /// Comma-separated particle colors (#rgb, #rrggbb or CSS names).
    #[arg(long, default_value = "purple,mediumpurple,plum", env = "MORPHFIELD_PALETTE")]
    pub palette: String,

    /// Seconds the morph lags behind the scroll position.
    #[arg(long, default_value_t = 2.0, env = "MORPHFIELD_SCRUB")]
    pub scrub: f32,

    /// Page height in viewport heights.
    #[arg(long, default_value_t = 3.0, env = "MORPHFIELD_PAGE_SCREENS")]
    pub page_screens: f32,

    /// Sprite size factor (pixels at unit distance).
    #[arg(long, default_value_t = 15.0, env = "MORPHFIELD_POINT_SIZE")]
    pub point_size: f32,

    /// auto | vulkan | dx12 | metal | gl
    #[arg(long, default_value = "auto", env = "MORPHFIELD_GPU_BACKEND")]
    pub gpu_backend: String,

    /// Window size as WIDTHxHEIGHT (logical pixels).
    #[arg(long, default_value = "1280x720", env = "MORPHFIELD_SIZE")]
    pub size: String,

    #[arg(long, env = "MORPHFIELD_SHOW_FPS")]
    pub show_fps: bool,

    /// Hide the header and hero text.
    #[arg(long, env = "MORPHFIELD_NO_OVERLAY")]
    pub no_overlay: bool,

    /// Seed for deterministic particle sampling.
    #[arg(long, env = "MORPHFIELD_SEED")]
    pub seed: Option<u64>,
}

impl Cli {
    pub fn into_run_config(self) -> Result<RunConfig> {
        let palette = Palette::parse_list(&self.palette)
            .with_context(|| format!("Invalid --palette '{}'", self.palette))?;
        if !(self.scrub >= 0.0 && self.scrub.is_finite()) {
            bail!("--scrub must be a non-negative number of seconds");
        }
        if !(self.point_size > 0.0 && self.point_size.is_finite()) {
            bail!("--point-size must be positive");
        }

        let mut config = RunConfig {
            backends: parse_backend(&self.gpu_backend),
            window_size: parse_size(&self.size)?,
            show_fps: self.show_fps,
            overlay: !self.no_overlay,
            point_size: self.point_size,
            animation: AnimationSettings {
                page_screens: self.page_screens.max(1.0),
                scrub_lag: self.scrub,
            },
            ..Default::default()
        };

        let scene = &mut config.scene;
        scene.first = model_spec(self.from, self.from_shape, MeshPrep::first_model());
        scene.second = model_spec(self.to, self.to_shape, MeshPrep::second_model());
        scene.cloud.count = self.count;
        scene.cloud.palette = palette.clone();
        scene.stars.count = self.stars;
        scene.stars.palette = palette;
        scene.seed = self.seed;
        Ok(config)
    }
}

fn model_spec(path: Option<PathBuf>, shape: Shape, prepare: MeshPrep) -> ModelSpec {
    let source = match path {
        Some(p) => ModelSource::File(p),
        None => ModelSource::Builtin(shape),
    };
    ModelSpec { source, prepare }
}

fn parse_backend(value: &str) -> wgpu::Backends {
    match value.to_ascii_lowercase().as_str() {
        "auto" => wgpu::Backends::all(),
        "vulkan" | "vk" => wgpu::Backends::VULKAN,
        "dx12" | "d3d12" => wgpu::Backends::DX12,
        "metal" | "mtl" => wgpu::Backends::METAL,
        "gl" | "opengl" | "gles" => wgpu::Backends::GL,
        other => {
            log::warn!("Unknown backend '{other}', falling back to auto.");
            wgpu::Backends::all()
        }
    }
}

fn parse_size(value: &str) -> Result<(u32, u32)> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .with_context(|| format!("Invalid --size '{value}': expected WIDTHxHEIGHT"))?;
    let w: u32 = w.trim().parse().with_context(|| format!("Invalid width in '{value}'"))?;
    let h: u32 = h.trim().parse().with_context(|| format!("Invalid height in '{value}'"))?;
    Ok((w.max(1), h.max(1)))
}
