//! Platform layer: window, event loop, input and per-frame orchestration.
//!
//! The window opens immediately with an empty scene; models are loaded and
//! sampled on a worker thread and uploaded once they arrive.

pub mod clock;
pub mod input;
pub mod loading;
pub mod overlay;
pub mod scene;

use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::{Context, Result, anyhow};
use renderer::{GpuOptions, GpuState, ParticleLayerKind};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalPosition},
    event::{ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    keyboard::ModifiersState,
    window::{Window, WindowId},
};

use crate::clock::FrameClock;
use crate::input::{KeyAction, WheelAction, key_action, wheel_action};
use crate::loading::{AppEvent, LoadedScene, SceneRequest, spawn_loader};
use crate::overlay::{LandingContent, Overlay, OverlayFrame};
use crate::scene::{AnimationSettings, SceneAnimation};

/// Everything `run` needs, resolved from the command line.
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub backends: wgpu::Backends,
    /// Window inner size in logical pixels.
    pub window_size: (u32, u32),
    pub show_fps: bool,
    pub overlay: bool,
    pub point_size: f32,
    pub animation: AnimationSettings,
    pub scene: SceneRequest,
    pub content: LandingContent,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            window_size: (1280, 720),
            show_fps: false,
            overlay: true,
            point_size: 15.0,
            animation: AnimationSettings::default(),
            scene: SceneRequest::default(),
            content: LandingContent::default(),
        }
    }
}

/// Open the window and run until it is closed.
pub fn run(config: RunConfig) -> Result<()> {
    let event_loop = EventLoop::<AppEvent>::with_user_event()
        .build()
        .context("Failed to create event loop")?;
    let mut app = App::new(config, event_loop.create_proxy());

    event_loop
        .run_app(&mut app)
        .map_err(|e| anyhow!("Event loop error: {e:?}"))?;

    match app.fatal.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct App {
    config: RunConfig,
    proxy: EventLoopProxy<AppEvent>,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    overlay: Option<Overlay>,
    anim: Option<SceneAnimation>,
    clock: FrameClock,
    loader: Option<JoinHandle<()>>,
    cursor: Option<PhysicalPosition<f64>>,
    dragging: bool,
    modifiers: ModifiersState,
    fatal: Option<anyhow::Error>,
}

impl App {
    fn new(config: RunConfig, proxy: EventLoopProxy<AppEvent>) -> Self {
        Self {
            config,
            proxy,
            window: None,
            gpu: None,
            overlay: None,
            anim: None,
            clock: FrameClock::new(),
            loader: None,
            cursor: None,
            dragging: false,
            modifiers: ModifiersState::empty(),
            fatal: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let (w, h) = self.config.window_size;
        let attrs = Window::default_attributes()
            .with_title("Morphfield")
            .with_inner_size(LogicalSize::new(w.max(1), h.max(1)));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("Failed to create window")?,
        );
        let size = window.inner_size();
        let scale = window.scale_factor();
        log::info!(
            "Window created: {}x{} (scale factor {:.2})",
            size.width,
            size.height,
            scale
        );

        let options = GpuOptions {
            backends: self.config.backends,
            antialias: scale < 2.0,
            point_size: self.config.point_size,
            ..Default::default()
        };
        let mut gpu = pollster::block_on(GpuState::new(window.clone(), options))?;
        gpu.resize(size.width, size.height, scale);
        log::info!("MSAA samples: {}", gpu.sample_count());

        let logical = size.to_logical::<f32>(scale);
        let anim = SceneAnimation::new(
            self.config.animation,
            logical.height,
            logical.width / logical.height.max(1.0),
        );

        if self.config.overlay {
            self.overlay = Some(Overlay::new(
                &window,
                gpu.device(),
                gpu.surface_format(),
                self.config.content.clone(),
            ));
        }

        self.loader = Some(spawn_loader(self.config.scene.clone(), self.proxy.clone())?);
        self.clock = FrameClock::new();
        self.anim = Some(anim);
        self.gpu = Some(gpu);
        self.window = Some(window);
        Ok(())
    }

    fn resize(&mut self) {
        let (Some(window), Some(gpu), Some(anim)) = (&self.window, &mut self.gpu, &mut self.anim)
        else {
            return;
        };
        let size = window.inner_size();
        let scale = window.scale_factor();
        gpu.resize(size.width, size.height, scale);
        let logical = size.to_logical::<f32>(scale);
        if logical.height <= 0.0 {
            log::debug!("Window minimized; keeping scroll state");
            return;
        }
        anim.resize(logical.height, logical.width / logical.height);
        log::debug!("Resized: {}x{} @ {:.2}", size.width, size.height, scale);
    }

    fn scene_loaded(&mut self, scene: LoadedScene) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        gpu.upload_layer(ParticleLayerKind::Starfield, &scene.starfield);
        match scene.morph_cloud {
            Ok(cloud) => gpu.upload_layer(ParticleLayerKind::MorphCloud, &cloud),
            Err(err) => log::error!("Morph cloud unavailable, showing background only: {err:#}"),
        }
        log::info!("Particles on GPU: {}", gpu.particle_count());
        if let Some(handle) = self.loader.take() {
            if handle.join().is_err() {
                log::warn!("Scene loader thread panicked after delivering its result");
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (elapsed, dt) = self.clock.tick();
        let Self {
            window: Some(window),
            gpu: Some(gpu),
            anim: Some(anim),
            overlay,
            config,
            clock,
            ..
        } = self
        else {
            return;
        };

        let progress = anim.step(dt);
        gpu.set_time(elapsed);
        gpu.set_progress(progress);
        gpu.set_camera(&anim.camera);

        let frame = OverlayFrame {
            scroll_offset: anim.scroll().offset(),
            scroll_fraction: anim.scroll_fraction(),
            fps: config.show_fps.then(|| clock.fps()),
        };
        let (w, h) = gpu.size();
        let result = gpu.render(|device, queue, encoder, view| match overlay.as_mut() {
            Some(overlay) => overlay.paint(window, device, queue, encoder, view, [w, h], &frame),
            None => Vec::new(),
        });

        let out_of_memory = match result {
            Ok(()) => false,
            Err(e) if GpuState::is_surface_lost(&e) => {
                log::warn!("Surface {e:?}; reconfiguring");
                gpu.recreate_surface();
                false
            }
            Err(wgpu::SurfaceError::OutOfMemory) => true,
            Err(e) => {
                log::warn!("Skipped frame: {e:?}");
                false
            }
        };
        if out_of_memory {
            log::error!("GPU out of memory; exiting");
            self.fatal = Some(anyhow!("GPU out of memory"));
            event_loop.exit();
        }
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        if event.state != ElementState::Pressed {
            return;
        }
        match key_action(&event.logical_key) {
            Some(KeyAction::Exit) => {
                log::info!("Escape pressed. Exiting event loop.");
                event_loop.exit();
            }
            Some(KeyAction::Scroll(cmd)) => {
                if let Some(anim) = self.anim.as_mut() {
                    anim.apply(cmd);
                }
            }
            None => {}
        }
    }
}

impl ApplicationHandler<AppEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.init(event_loop) {
            log::error!("Startup failed: {err:#}");
            self.fatal = Some(err);
            event_loop.exit();
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: AppEvent) {
        match event {
            AppEvent::SceneLoaded(scene) => self.scene_loaded(*scene),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.clone() else {
            return;
        };
        let consumed = match self.overlay.as_mut() {
            Some(overlay) => overlay.on_window_event(&window, &event),
            None => false,
        };
        let pointer_on_ui = self.overlay.as_ref().is_some_and(Overlay::wants_pointer);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested. Exiting event loop.");
                event_loop.exit();
            }
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => self.resize(),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            WindowEvent::ModifiersChanged(m) => self.modifiers = m.state(),
            WindowEvent::MouseWheel { delta, .. } => {
                let ctrl = self.modifiers.control_key();
                let action = wheel_action(delta, window.scale_factor(), ctrl, consumed);
                if let (Some(action), Some(anim)) = (action, self.anim.as_mut()) {
                    match action {
                        WheelAction::Scroll(cmd) => anim.apply(cmd),
                        WheelAction::Zoom(factor) => anim.orbit_mut().dolly(factor),
                    }
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = state == ElementState::Pressed && !pointer_on_ui;
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let (true, Some(prev), Some(anim)) = (self.dragging, self.cursor, self.anim.as_mut()) {
                    let height = window.inner_size().height as f32;
                    anim.orbit_mut().rotate(
                        (position.x - prev.x) as f32,
                        (position.y - prev.y) as f32,
                        height,
                    );
                }
                self.cursor = Some(position);
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                self.dragging = false;
            }
            WindowEvent::KeyboardInput { event, .. } if !consumed => self.handle_key(event_loop, &event),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}
