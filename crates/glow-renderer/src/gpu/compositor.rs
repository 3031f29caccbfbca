//! [`Compositor`] backed by wgpu textures.
//!
//! Every pass is recorded into one lazily created command encoder and sent
//! to the GPU on [`WgpuCompositor::submit`]. Each pass gets its own uniform
//! buffer, so passes batched into one submission never see each other's
//! parameters.

use std::collections::{HashMap, HashSet};

use glow_common::{Color, IdSequence, PhysicalSize, Rect, RendererError, TargetId};
use tracing::{debug, warn};
use wgpu::util::DeviceExt;

use super::context::GpuContext;
use super::uniforms::GlowUniforms;
use crate::host::{Compositor, ShaderPass, TargetDescriptor, TargetFormat, TargetInfo};
use crate::material::GlowMaterial;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;
/// Released temporaries kept around for reuse.
const POOL_LIMIT: usize = 8;

/// `src + dst` on every channel.
pub const ADDITIVE_BLENDING: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

fn texture_format(format: TargetFormat) -> wgpu::TextureFormat {
    match format {
        TargetFormat::Rgba16Float => wgpu::TextureFormat::Rgba16Float,
    }
}

fn clear_color(color: Color) -> wgpu::Color {
    let [r, g, b, a] = color.to_f32_array();
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: a as f64,
    }
}

/// Blur direction of one separable pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlurAxis {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PassKind {
    Copy,
    Threshold,
    Additive,
    Overlay,
    BlurHorizontal,
    BlurVertical,
}

impl PassKind {
    fn label(self) -> &'static str {
        match self {
            PassKind::Copy => "glow copy pass",
            PassKind::Threshold => "glow threshold pass",
            PassKind::Additive => "glow additive pass",
            PassKind::Overlay => "glow overlay pass",
            PassKind::BlurHorizontal => "glow blur h pass",
            PassKind::BlurVertical => "glow blur v pass",
        }
    }
}

impl From<ShaderPass> for PassKind {
    fn from(pass: ShaderPass) -> Self {
        match pass {
            ShaderPass::Threshold => PassKind::Threshold,
            ShaderPass::Additive => PassKind::Additive,
            ShaderPass::Overlay => PassKind::Overlay,
        }
    }
}

/// Pixel viewport in wgpu's top-left convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub flip: bool,
}

/// Convert a bottom-left-origin inset rectangle into a viewport clipped to
/// `target`. `None` when nothing of it is visible.
pub fn inset_viewport(rect: Rect, target: PhysicalSize) -> Option<Viewport> {
    let width = rect.width.abs();
    let height = rect.height.abs();
    let left = rect.x.min(rect.x + rect.width);
    let top = target.height as f32 - (rect.bottom() + height);

    let x0 = left.max(0.0);
    let y0 = top.max(0.0);
    let x1 = (left + width).min(target.width as f32);
    let y1 = (top + height).min(target.height as f32);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(Viewport {
        x: x0,
        y: y0,
        width: x1 - x0,
        height: y1 - y0,
        flip: rect.is_flipped(),
    })
}

struct GpuTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    _depth: Option<wgpu::Texture>,
    info: TargetInfo,
}

struct Pipelines {
    copy: wgpu::RenderPipeline,
    threshold: wgpu::RenderPipeline,
    additive: wgpu::RenderPipeline,
    overlay: wgpu::RenderPipeline,
    blur_h: wgpu::RenderPipeline,
    blur_v: wgpu::RenderPipeline,
}

impl Pipelines {
    fn get(&self, kind: PassKind) -> &wgpu::RenderPipeline {
        match kind {
            PassKind::Copy => &self.copy,
            PassKind::Threshold => &self.threshold,
            PassKind::Additive => &self.additive,
            PassKind::Overlay => &self.overlay,
            PassKind::BlurHorizontal => &self.blur_h,
            PassKind::BlurVertical => &self.blur_v,
        }
    }
}

pub struct WgpuCompositor {
    device: wgpu::Device,
    queue: wgpu::Queue,
    ids: IdSequence,
    targets: HashMap<TargetId, GpuTarget>,
    temporaries: HashSet<TargetId>,
    pool: Vec<GpuTarget>,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    pipelines: Pipelines,
    encoder: Option<wgpu::CommandEncoder>,
}

impl WgpuCompositor {
    pub fn new(context: GpuContext) -> Self {
        let GpuContext { device, queue, .. } = context;

        let glow_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("glow shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/glow.wgsl").into()),
        });
        let blur_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("glow blur shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/blur.wgsl").into()),
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("glow sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("glow bind group layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: std::num::NonZeroU64::new(
                            std::mem::size_of::<GlowUniforms>() as u64,
                        ),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("glow pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let create_pipeline = |label: &str,
                               module: &wgpu::ShaderModule,
                               entry_point: &str,
                               blend: Option<wgpu::BlendState>|
         -> wgpu::RenderPipeline {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module,
                    entry_point: Some("vs_main"),
                    buffers: &[],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module,
                    entry_point: Some(entry_point),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: wgpu::TextureFormat::Rgba16Float,
                        blend,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let pipelines = Pipelines {
            copy: create_pipeline("glow copy pipeline", &glow_shader, "fs_copy", None),
            threshold: create_pipeline("glow threshold pipeline", &glow_shader, "fs_threshold", None),
            additive: create_pipeline(
                "glow additive pipeline",
                &glow_shader,
                "fs_additive",
                Some(ADDITIVE_BLENDING),
            ),
            overlay: create_pipeline(
                "glow overlay pipeline",
                &glow_shader,
                "fs_overlay",
                Some(wgpu::BlendState::ALPHA_BLENDING),
            ),
            blur_h: create_pipeline("glow blur h pipeline", &blur_shader, "fs_blur_h", None),
            blur_v: create_pipeline("glow blur v pipeline", &blur_shader, "fs_blur_v", None),
        };

        Self {
            device,
            queue,
            ids: IdSequence::starting_at(1),
            targets: HashMap::new(),
            temporaries: HashSet::new(),
            pool: Vec::new(),
            bind_group_layout,
            sampler,
            pipelines,
            encoder: None,
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// The colour texture behind `id`, for the host to render into or
    /// present.
    pub fn texture(&self, id: TargetId) -> Result<&wgpu::Texture, RendererError> {
        self.targets
            .get(&id)
            .map(|t| &t.texture)
            .ok_or_else(|| RendererError::InvalidTarget(id.to_string()))
    }

    /// Send every pass recorded since the last submit to the GPU.
    pub fn submit(&mut self) {
        if let Some(encoder) = self.encoder.take() {
            self.queue.submit(Some(encoder.finish()));
        }
    }

    /// Block until the GPU has finished everything submitted so far.
    pub fn wait_idle(&self) {
        let _ = self.device.poll(wgpu::Maintain::Wait);
    }

    /// One separable blur pass from `source` into `destination`.
    pub fn blur_pass(
        &mut self,
        source: TargetId,
        destination: TargetId,
        axis: BlurAxis,
        spread: f32,
    ) {
        let Some(info) = self.target_info(source) else {
            warn!(%source, "blur pass skipped: unknown render target");
            return;
        };
        let uniforms = GlowUniforms::blur(info.size.width, info.size.height, spread);
        let kind = match axis {
            BlurAxis::Horizontal => PassKind::BlurHorizontal,
            BlurAxis::Vertical => PassKind::BlurVertical,
        };
        self.draw(kind, source, destination, &uniforms, None);
    }

    fn allocate(&self, desc: &TargetDescriptor) -> GpuTarget {
        let size = wgpu::Extent3d {
            width: desc.size.width.max(1),
            height: desc.size.height.max(1),
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(desc.label.as_str()),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: texture_format(desc.format),
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let depth = (desc.depth_bits > 0).then(|| {
            self.device.create_texture(&wgpu::TextureDescriptor {
                label: Some(desc.label.as_str()),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: DEPTH_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
        });
        GpuTarget {
            texture,
            view,
            _depth: depth,
            info: TargetInfo::from(desc),
        }
    }

    fn draw(
        &mut self,
        kind: PassKind,
        source: TargetId,
        destination: TargetId,
        uniforms: &GlowUniforms,
        viewport: Option<Viewport>,
    ) {
        if source == destination {
            warn!(%source, pass = kind.label(), "pass skipped: source and destination are the same target");
            return;
        }
        let (Some(src), Some(dst)) = (self.targets.get(&source), self.targets.get(&destination))
        else {
            warn!(%source, %destination, pass = kind.label(), "pass skipped: unknown render target");
            return;
        };

        let uniform_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("glow pass uniforms"),
                contents: bytemuck::bytes_of(uniforms),
                usage: wgpu::BufferUsages::UNIFORM,
            });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(kind.label()),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&src.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let device = &self.device;
        let encoder = self.encoder.get_or_insert_with(|| {
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("glow encoder"),
            })
        });
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(kind.label()),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &dst.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        if let Some(vp) = viewport {
            pass.set_viewport(vp.x, vp.y, vp.width, vp.height, 0.0, 1.0);
        }
        pass.set_pipeline(self.pipelines.get(kind));
        pass.set_bind_group(0, &bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}

impl Compositor for WgpuCompositor {
    fn create_target(&mut self, desc: &TargetDescriptor) -> TargetId {
        let target = self.allocate(desc);
        let id = self.ids.next_target();
        self.targets.insert(id, target);
        id
    }

    fn destroy_target(&mut self, id: TargetId) {
        if self.temporaries.contains(&id) {
            warn!(%id, "temporary targets must be released, not destroyed");
            return;
        }
        // In-flight commands keep the texture alive until they finish.
        self.targets.remove(&id);
    }

    fn target_info(&self, id: TargetId) -> Option<TargetInfo> {
        self.targets.get(&id).map(|t| t.info)
    }

    fn acquire_temporary(&mut self, desc: &TargetDescriptor) -> TargetId {
        let info = TargetInfo::from(desc);
        let target = match self.pool.iter().position(|t| t.info == info) {
            Some(index) => self.pool.swap_remove(index),
            None => self.allocate(desc),
        };
        let id = self.ids.next_target();
        self.targets.insert(id, target);
        self.temporaries.insert(id);
        id
    }

    fn release_temporary(&mut self, id: TargetId) {
        if !self.temporaries.remove(&id) {
            warn!(%id, "released a target that is not a live temporary");
            return;
        }
        if let Some(target) = self.targets.remove(&id) {
            if self.pool.len() < POOL_LIMIT {
                self.pool.push(target);
            } else {
                debug!(%id, "temporary pool full; dropping target");
            }
        }
    }

    fn clear(&mut self, target: TargetId, color: Color) {
        let Some(dst) = self.targets.get(&target) else {
            warn!(%target, "clear skipped: unknown render target");
            return;
        };
        let device = &self.device;
        let encoder = self.encoder.get_or_insert_with(|| {
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("glow encoder"),
            })
        });
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("glow clear pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &dst.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_color(color)),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
    }

    fn blit(&mut self, source: TargetId, destination: TargetId) {
        self.draw(
            PassKind::Copy,
            source,
            destination,
            &GlowUniforms::default(),
            None,
        );
    }

    fn blit_pass(
        &mut self,
        source: TargetId,
        destination: TargetId,
        material: &GlowMaterial,
        pass: ShaderPass,
    ) {
        let uniforms = GlowUniforms::from_material(material);
        self.draw(pass.into(), source, destination, &uniforms, None);
    }

    fn draw_inset(
        &mut self,
        source: TargetId,
        destination: TargetId,
        rect: Rect,
        material: &GlowMaterial,
        pass: ShaderPass,
    ) {
        let Some(info) = self.target_info(destination) else {
            warn!(%destination, "inset skipped: unknown render target");
            return;
        };
        let Some(viewport) = inset_viewport(rect, info.size) else {
            return;
        };
        let uniforms = GlowUniforms::from_material(material).flipped(viewport.flip);
        self.draw(pass.into(), source, destination, &uniforms, Some(viewport));
    }
}
