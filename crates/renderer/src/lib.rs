//! Renderer: wgpu device/surface setup and the instanced particle pass.
//! wgpu = 23.x, winit = 0.30.x

pub mod pipeline;

use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use asset::Particle;
use corelib::camera::Camera;
use corelib::color::Rgb;
use wgpu::{
    BindGroup, Buffer, BufferUsages, CommandBuffer, CommandEncoder, CommandEncoderDescriptor,
    Device, DeviceDescriptor, Extent3d, Features, Instance, InstanceDescriptor, Limits, LoadOp,
    Operations, PowerPreference, PresentMode, Queue, RenderPassColorAttachment,
    RenderPassDescriptor, RenderPipeline, StoreOp, Surface, SurfaceConfiguration, SurfaceError,
    TextureDescriptor, TextureDimension, TextureFormat, TextureUsages, TextureView,
    TextureViewDescriptor, util::DeviceExt,
};
use winit::{dpi::PhysicalSize, window::Window};

pub use pipeline::Globals;
use pipeline::{DEPTH_FORMAT, QUAD_VERTICES};

/// Upper bound on the device pixel ratio used for sprite sizing.
pub const MAX_PIXEL_RATIO: f32 = 2.0;

pub fn clamp_pixel_ratio(scale_factor: f64) -> f32 {
    if !scale_factor.is_finite() || scale_factor <= 0.0 {
        return 1.0;
    }
    (scale_factor as f32).min(MAX_PIXEL_RATIO)
}

#[derive(Clone, Copy, Debug)]
pub struct GpuOptions {
    pub backends: wgpu::Backends,
    /// Multisample the particle pass (4x when the adapter supports it).
    pub antialias: bool,
    pub clear_color: Rgb,
    pub point_size: f32,
}

impl Default for GpuOptions {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            antialias: true,
            clear_color: Rgb::from_u8(8, 4, 14),
            point_size: 15.0,
        }
    }
}

/// Which instance buffer a particle upload replaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticleLayerKind {
    Starfield,
    MorphCloud,
}

struct ParticleLayer {
    buffer: Buffer,
    count: u32,
}

pub struct GpuState {
    // Surface
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,

    // Device/queue
    device: Device,
    queue: Queue,

    // Pipeline & geometry
    pipeline: RenderPipeline,
    starfield: Option<ParticleLayer>,
    morph_cloud: Option<ParticleLayer>,

    // Globals
    globals: Globals,
    globals_buf: Buffer,
    globals_bg: BindGroup,

    // Targets
    sample_count: u32,
    msaa_view: Option<TextureView>,
    depth_view: TextureView,
    clear_color: wgpu::Color,

    // Size cache
    width: u32,
    height: u32,
}

impl GpuState {
    /// Create GPU state bound to an Arc<Window>.
    pub async fn new(window: Arc<Window>, options: GpuOptions) -> Result<Self> {
        let PhysicalSize { width, height } = window.inner_size();
        let width = width.max(1);
        let height = height.max(1);

        let instance = Instance::new(InstanceDescriptor {
            backends: options.backends,
            ..Default::default()
        });
        let surface: Surface<'static> = instance
            .create_surface(window.clone())
            .context("create_surface failed")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow!("No suitable GPU adapter for {:?}", options.backends))?;
        let info = adapter.get_info();
        log::info!("Adapter: {} ({:?}, {:?})", info.name, info.backend, info.device_type);

        let (device, queue) = adapter
            .request_device(
                &DeviceDescriptor {
                    label: Some("Morphfield Device"),
                    required_features: Features::empty(),
                    required_limits: Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .context("request_device failed")?;

        // Surface format (prefer sRGB)
        let caps = surface.get_capabilities(&adapter);
        let surface_format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow!("Surface reports no supported formats"))?;
        log::info!("Surface format: {surface_format:?}");

        let surface_config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: PresentMode::AutoVsync,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let msaa_ok = adapter
            .get_texture_format_features(surface_format)
            .flags
            .sample_count_supported(4);
        let sample_count = if options.antialias && msaa_ok { 4 } else { 1 };
        if options.antialias && !msaa_ok {
            log::warn!("4x MSAA unsupported for {surface_format:?}; rendering without it");
        }

        let depth_view = create_depth_view(&device, &surface_config, sample_count);
        let msaa_view = create_msaa_view(&device, &surface_config, sample_count);

        // ==== Globals ====
        let globals = Globals {
            point_size: options.point_size,
            viewport: [width as f32, height as f32],
            ..Default::default()
        };
        let globals_bgl = pipeline::globals_layout(&device);
        let globals_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Globals UBO"),
            contents: bytemuck::bytes_of(&globals),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });
        let globals_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Globals BG"),
            layout: &globals_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buf.as_entire_binding(),
            }],
        });

        let pipeline =
            pipeline::create_particle_pipeline(&device, &globals_bgl, surface_format, sample_count);

        let c = options.clear_color;
        let clear_color = wgpu::Color {
            r: srgb_to_linear(c.r),
            g: srgb_to_linear(c.g),
            b: srgb_to_linear(c.b),
            a: 1.0,
        };

        Ok(Self {
            surface,
            surface_config,
            device,
            queue,
            pipeline,
            starfield: None,
            morph_cloud: None,
            globals,
            globals_buf,
            globals_bg,
            sample_count,
            msaa_view,
            depth_view,
            clear_color,
            width,
            height,
        })
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> TextureFormat {
        self.surface_config.format
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn particle_count(&self) -> u32 {
        [&self.starfield, &self.morph_cloud]
            .into_iter()
            .flatten()
            .map(|l| l.count)
            .sum()
    }

    /// Replace the instances of one layer. An empty slice removes the layer.
    pub fn upload_layer(&mut self, kind: ParticleLayerKind, particles: &[Particle]) {
        let layer = (!particles.is_empty()).then(|| ParticleLayer {
            buffer: self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(match kind {
                        ParticleLayerKind::Starfield => "Starfield VB",
                        ParticleLayerKind::MorphCloud => "Morph cloud VB",
                    }),
                    contents: bytemuck::cast_slice(particles),
                    usage: BufferUsages::VERTEX,
                }),
            count: particles.len() as u32,
        });
        log::debug!("Uploaded {kind:?}: {} particles", particles.len());
        match kind {
            ParticleLayerKind::Starfield => self.starfield = layer,
            ParticleLayerKind::MorphCloud => self.morph_cloud = layer,
        }
    }

    pub fn set_camera(&mut self, camera: &Camera) {
        self.globals.view = camera.view().to_cols_array_2d();
        self.globals.proj = camera.proj().to_cols_array_2d();
    }

    pub fn set_time(&mut self, seconds: f32) {
        self.globals.time = seconds;
    }

    pub fn set_progress(&mut self, progress: f32) {
        self.globals.progress = progress.clamp(0.0, 1.0);
    }

    pub fn globals(&self) -> &Globals {
        &self.globals
    }

    /// Resize: reconfigure surface & recreate depth/MSAA targets.
    pub fn resize(&mut self, width: u32, height: u32, scale_factor: f64) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.surface_config.width = self.width;
        self.surface_config.height = self.height;
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_view = create_depth_view(&self.device, &self.surface_config, self.sample_count);
        self.msaa_view = create_msaa_view(&self.device, &self.surface_config, self.sample_count);
        self.globals.viewport = [self.width as f32, self.height as f32];
        self.globals.pixel_ratio = clamp_pixel_ratio(scale_factor);
    }

    /// Render one frame: particles first, then `overlay` draws on top of the
    /// resolved frame. Command buffers returned by `overlay` are submitted
    /// ahead of the main encoder.
    pub fn render<F>(&mut self, overlay: F) -> Result<(), SurfaceError>
    where
        F: FnOnce(&Device, &Queue, &mut CommandEncoder, &TextureView) -> Vec<CommandBuffer>,
    {
        self.queue
            .write_buffer(&self.globals_buf, 0, bytemuck::bytes_of(&self.globals));

        let frame = self.surface.get_current_texture()?;
        let view = frame.texture.create_view(&Default::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("MainEncoder"),
            });

        {
            let (target, resolve_target) = match &self.msaa_view {
                Some(msaa) => (msaa, Some(&view)),
                None => (&view, None),
            };
            let mut rpass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("ParticlePass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: target,
                    resolve_target,
                    ops: Operations {
                        load: LoadOp::Clear(self.clear_color),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            rpass.set_pipeline(&self.pipeline);
            rpass.set_bind_group(0, &self.globals_bg, &[]);
            for layer in [&self.starfield, &self.morph_cloud].into_iter().flatten() {
                rpass.set_vertex_buffer(0, layer.buffer.slice(..));
                rpass.draw(0..QUAD_VERTICES, 0..layer.count);
            }
        }

        let extra = overlay(&self.device, &self.queue, &mut encoder, &view);

        self.queue
            .submit(extra.into_iter().chain(std::iter::once(encoder.finish())));
        frame.present();
        Ok(())
    }

    pub fn is_surface_lost(err: &SurfaceError) -> bool {
        matches!(err, SurfaceError::Lost | SurfaceError::Outdated)
    }

    pub fn recreate_surface(&mut self) {
        self.surface.configure(&self.device, &self.surface_config);
    }
}

fn srgb_to_linear(c: f32) -> f64 {
    let c = c as f64;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn render_target(
    device: &Device,
    sc: &SurfaceConfiguration,
    label: &str,
    format: TextureFormat,
    sample_count: u32,
) -> TextureView {
    let tex = device.create_texture(&TextureDescriptor {
        label: Some(label),
        size: Extent3d {
            width: sc.width.max(1),
            height: sc.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: TextureDimension::D2,
        format,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    tex.create_view(&TextureViewDescriptor::default())
}

/// Create a depth texture view matching the surface config.
fn create_depth_view(device: &Device, sc: &SurfaceConfiguration, sample_count: u32) -> TextureView {
    render_target(device, sc, "DepthTex", DEPTH_FORMAT, sample_count)
}

fn create_msaa_view(
    device: &Device,
    sc: &SurfaceConfiguration,
    sample_count: u32,
) -> Option<TextureView> {
    (sample_count > 1).then(|| render_target(device, sc, "MsaaColorTex", sc.format, sample_count))
}
