//! Particle render pipeline: instanced quads, additive blending, depth test
//! without depth writes.

use std::num::NonZeroU64;

use asset::Particle;
use bytemuck::{Pod, Zeroable};
use wgpu::{
    BindGroupLayout, BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingType, BlendComponent,
    BlendFactor, BlendOperation, BlendState, BufferBindingType, ColorTargetState, ColorWrites,
    DepthBiasState, DepthStencilState, Device, FragmentState, MultisampleState,
    PipelineLayoutDescriptor, RenderPipeline, RenderPipelineDescriptor, ShaderModuleDescriptor,
    ShaderSource, ShaderStages, TextureFormat, VertexBufferLayout, VertexState, VertexStepMode,
};

pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

/// Vertices per particle sprite (two triangles).
pub const QUAD_VERTICES: u32 = 6;

/// Per-frame uniform block (16-byte aligned, mirrors `Globals` in the shader).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct Globals {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub viewport: [f32; 2],
    pub time: f32,
    pub progress: f32,
    pub point_size: f32,
    pub pixel_ratio: f32,
    pub _pad: [f32; 2],
}

impl Default for Globals {
    fn default() -> Self {
        Self {
            view: glam::Mat4::IDENTITY.to_cols_array_2d(),
            proj: glam::Mat4::IDENTITY.to_cols_array_2d(),
            viewport: [1.0, 1.0],
            time: 0.0,
            progress: 0.0,
            point_size: 15.0,
            pixel_ratio: 1.0,
            _pad: [0.0; 2],
        }
    }
}

pub const PARTICLE_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: std::mem::size_of::<Particle>() as u64,
    step_mode: VertexStepMode::Instance,
    attributes: &wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x3,
        3 => Float32,
    ],
};

/// `src * src_alpha + dst`: overlapping particles brighten.
pub fn additive_blend() -> BlendState {
    let add = |src_factor| BlendComponent {
        src_factor,
        dst_factor: BlendFactor::One,
        operation: BlendOperation::Add,
    };
    BlendState {
        color: add(BlendFactor::SrcAlpha),
        alpha: add(BlendFactor::One),
    }
}

pub fn globals_layout(device: &Device) -> BindGroupLayout {
    device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some("Globals BGL"),
        entries: &[BindGroupLayoutEntry {
            binding: 0,
            visibility: ShaderStages::VERTEX | ShaderStages::FRAGMENT,
            ty: BindingType::Buffer {
                ty: BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: NonZeroU64::new(std::mem::size_of::<Globals>() as u64),
            },
            count: None,
        }],
    })
}

pub fn create_particle_pipeline(
    device: &Device,
    globals_bgl: &BindGroupLayout,
    color_format: TextureFormat,
    sample_count: u32,
) -> RenderPipeline {
    let shader = device.create_shader_module(ShaderModuleDescriptor {
        label: Some("Particles WGSL"),
        source: ShaderSource::Wgsl(include_str!("shaders/particles.wgsl").into()),
    });

    let layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some("Particles PipelineLayout"),
        bind_group_layouts: &[globals_bgl],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some("Particles Pipeline"),
        layout: Some(&layout),
        vertex: VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[PARTICLE_LAYOUT],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(ColorTargetState {
                format: color_format,
                blend: Some(additive_blend()),
                write_mask: ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        // Sprites face the camera, so no culling.
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: Some(DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: false,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: DepthBiasState::default(),
        }),
        multisample: MultisampleState {
            count: sample_count,
            ..Default::default()
        },
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn globals_match_shader_layout() {
        assert_eq!(std::mem::size_of::<Globals>(), 160);
        assert_eq!(std::mem::size_of::<Globals>() % 16, 0);
    }

    #[test]
    fn instance_layout_covers_particle() {
        let attrs = PARTICLE_LAYOUT.attributes;
        assert_eq!(attrs.len(), 4);
        assert_eq!(attrs[3].offset, 36);
        assert_eq!(PARTICLE_LAYOUT.array_stride, 40);
    }

    #[test]
    fn blend_is_additive() {
        let b = additive_blend();
        assert_eq!(b.color.src_factor, BlendFactor::SrcAlpha);
        assert_eq!(b.color.dst_factor, BlendFactor::One);
        assert_eq!(b.alpha.dst_factor, BlendFactor::One);
    }
}
