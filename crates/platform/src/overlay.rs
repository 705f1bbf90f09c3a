//! egui overlay drawn over the particles: fixed navigation header, hero copy
//! that scrolls with the page, and a scroll-progress bar.

use egui::text::LayoutJob;
use egui::{Align, Color32, FontId, Id, Layout, RichText, TextFormat, pos2, vec2};
use wgpu::{
    CommandBuffer, CommandEncoder, Device, LoadOp, Operations, Queue, RenderPassColorAttachment,
    RenderPassDescriptor, StoreOp, TextureFormat, TextureView,
};
use winit::event::WindowEvent;
use winit::window::Window;

const TEXT: Color32 = Color32::from_rgb(236, 230, 245);
const EMPHASIS: Color32 = Color32::from_rgb(221, 160, 221);
const MUTED: Color32 = Color32::from_rgb(170, 160, 190);

/// A run of paragraph text, optionally emphasized.
#[derive(Clone, Debug, PartialEq)]
pub struct Span {
    pub text: String,
    pub emphasized: bool,
}

impl Span {
    fn plain(text: &str) -> Self {
        Self {
            text: text.into(),
            emphasized: false,
        }
    }

    fn strong(text: &str) -> Self {
        Self {
            text: text.into(),
            emphasized: true,
        }
    }
}

/// Copy shown on the landing page.
#[derive(Clone, Debug, PartialEq)]
pub struct LandingContent {
    pub logo: String,
    pub links: Vec<String>,
    pub headline: Vec<String>,
    pub paragraph: Vec<Span>,
}

impl Default for LandingContent {
    fn default() -> Self {
        Self {
            logo: "USTA".into(),
            links: vec!["Let's talk".into(), "Job".into(), "It".into()],
            headline: vec!["BOOST".into(), "YOUR".into(), "BRAND".into()],
            paragraph: vec![
                Span::plain("We create "),
                Span::strong("digital experience"),
                Span::plain(" at the intersection between "),
                Span::strong("design"),
                Span::plain(" and "),
                Span::strong("technology"),
                Span::plain(", helping our clients to "),
                Span::strong("imagine the future"),
                Span::plain(", today."),
            ],
        }
    }
}

/// Per-frame values the overlay needs.
#[derive(Clone, Copy, Debug, Default)]
pub struct OverlayFrame {
    /// Page scroll offset in logical pixels.
    pub scroll_offset: f32,
    /// Scroll position in [0, 1].
    pub scroll_fraction: f32,
    pub fps: Option<f32>,
}

/// Top of the hero block in screen space: it starts below the header and
/// moves up as the page scrolls.
pub fn hero_top(viewport_height: f32, scroll_offset: f32) -> f32 {
    viewport_height * 0.28 - scroll_offset
}

pub fn paragraph_job(spans: &[Span], wrap_width: f32) -> LayoutJob {
    let mut job = LayoutJob::default();
    for span in spans {
        let color = if span.emphasized { EMPHASIS } else { MUTED };
        job.append(
            &span.text,
            0.0,
            TextFormat {
                font_id: FontId::proportional(18.0),
                color,
                ..Default::default()
            },
        );
    }
    job.wrap.max_width = wrap_width;
    job
}

fn draw_landing(ctx: &egui::Context, content: &LandingContent, frame: &OverlayFrame) {
    egui::TopBottomPanel::top("nav")
        .frame(egui::Frame::none().inner_margin(egui::Margin::symmetric(32.0, 18.0)))
        .show_separator_line(false)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new(&content.logo).size(24.0).strong().color(TEXT));
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    if let Some(fps) = frame.fps {
                        ui.label(RichText::new(format!("{fps:.0} fps")).small().color(MUTED));
                        ui.add_space(24.0);
                    }
                    for link in content.links.iter().rev() {
                        ui.label(RichText::new(link).size(16.0).color(TEXT));
                        ui.add_space(20.0);
                    }
                });
            });
        });

    let screen = ctx.screen_rect();
    let width = (screen.width() * 0.45).clamp(280.0, 640.0);
    egui::Area::new(Id::new("hero"))
        .fixed_pos(pos2(48.0, hero_top(screen.height(), frame.scroll_offset)))
        .interactable(false)
        .order(egui::Order::Background)
        .show(ctx, |ui| {
            ui.set_max_width(width);
            for line in &content.headline {
                ui.label(RichText::new(line).size(72.0).strong().color(TEXT));
            }
            ui.add_space(16.0);
            ui.label(paragraph_job(&content.paragraph, width));
        });

    let bar_height = screen.height() * frame.scroll_fraction.clamp(0.0, 1.0);
    let painter = ctx.layer_painter(egui::LayerId::new(egui::Order::Foreground, Id::new("progress")));
    painter.rect_filled(
        egui::Rect::from_min_size(pos2(screen.right() - 3.0, screen.top()), vec2(3.0, bar_height)),
        0.0,
        EMPHASIS,
    );
}

pub struct Overlay {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
    content: LandingContent,
}

impl Overlay {
    pub fn new(window: &Window, device: &Device, format: TextureFormat, content: LandingContent) -> Self {
        let ctx = egui::Context::default();
        let mut visuals = egui::Visuals::dark();
        visuals.panel_fill = Color32::TRANSPARENT;
        visuals.window_fill = Color32::TRANSPARENT;
        ctx.set_visuals(visuals);

        let state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            Some(device.limits().max_texture_dimension_2d as usize),
        );
        let renderer = egui_wgpu::Renderer::new(device, format, None, 1, false);

        Self {
            ctx,
            state,
            renderer,
            content,
        }
    }

    /// Forward a window event; returns `true` if egui consumed it.
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    pub fn wants_pointer(&self) -> bool {
        self.ctx.wants_pointer_input()
    }

    #[allow(clippy::too_many_arguments)]
    pub fn paint(
        &mut self,
        window: &Window,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        target: &TextureView,
        size_in_pixels: [u32; 2],
        frame: &OverlayFrame,
    ) -> Vec<CommandBuffer> {
        let raw_input = self.state.take_egui_input(window);
        let content = &self.content;
        let output = self.ctx.run(raw_input, |ctx| draw_landing(ctx, content, frame));
        self.state
            .handle_platform_output(window, output.platform_output);

        let jobs = self.ctx.tessellate(output.shapes, output.pixels_per_point);
        for (id, delta) in &output.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, delta);
        }

        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels,
            pixels_per_point: output.pixels_per_point,
        };
        let commands = self
            .renderer
            .update_buffers(device, queue, encoder, &jobs, &screen);

        {
            let mut pass = encoder
                .begin_render_pass(&RenderPassDescriptor {
                    label: Some("OverlayPass"),
                    color_attachments: &[Some(RenderPassColorAttachment {
                        view: target,
                        resolve_target: None,
                        ops: Operations {
                            load: LoadOp::Load,
                            store: StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();
            self.renderer.render(&mut pass, &jobs, &screen);
        }

        for id in &output.textures_delta.free {
            self.renderer.free_texture(id);
        }
        commands
    }
}
