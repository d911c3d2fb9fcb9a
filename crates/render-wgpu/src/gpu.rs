use crate::shaders::{self, BufferKind, ShaderKey};
use fractaline_common::{BufferRole, GeometryBuffer, LayoutGeneration, Primitive};
use fractaline_gradient::{GpuColorStop, InterpolationSpace};
use fractaline_render::{
    Binding, BindingPlan, BindingResource, RenderError, ShadingStage, UniformTransform,
};
use std::collections::HashMap;
use wgpu::util::DeviceExt;

/// Bytes bound for a reserved storage slot: one `ColorStop`, which also covers
/// a `vec4<f32>` or `vec2<f32>` element.
const RESERVED_STORAGE_BYTES: usize = std::mem::size_of::<GpuColorStop>();
const RESERVED_UNIFORM_BYTES: usize = 16;

fn bytes<T: bytemuck::Pod>(data: &[T]) -> Vec<u8> {
    bytemuck::cast_slice(data).to_vec()
}

fn vec4_u32(x: u32) -> Vec<u8> {
    bytes(&[x, 0, 0, 0])
}

fn vec4_f32(x: f32) -> Vec<u8> {
    bytes(&[x, 0.0, 0.0, 0.0])
}

/// Contents of the buffer bound at `binding`.
///
/// Storage buffers may not be empty, so zero-length arrays are padded with
/// zeroes; the draw never reads them.
pub fn binding_contents(
    binding: &Binding<'_>,
    geometry: &GeometryBuffer,
    uniforms: &UniformTransform,
) -> Vec<u8> {
    let mut contents = match &binding.resource {
        BindingResource::Geometry { .. } => bytes(&geometry.homogeneous()),
        BindingResource::Colors(colors) => bytes(*colors),
        BindingResource::SplatColor { color, .. } => bytes(&[*color]),
        BindingResource::Transform => bytes(&[uniforms.to_gpu()]),
        BindingResource::ColorMode(code) => vec4_u32(*code),
        BindingResource::PointSize(size) => vec4_f32(*size),
        BindingResource::BaseColor(color) => bytes(&[*color]),
        BindingResource::GradientStops { stops, .. } => bytes(stops.as_slice()),
        BindingResource::GradientStopCount(n) => vec4_u32(*n),
        BindingResource::Reserved => Vec::new(),
    };
    if contents.is_empty() {
        let len = match shaders::buffer_kind(binding.role) {
            BufferKind::Storage => RESERVED_STORAGE_BYTES,
            BufferKind::Uniform => RESERVED_UNIFORM_BYTES,
        };
        contents.resize(len, 0);
    }
    contents
}

/// Group 0 layout for a generation: one entry per slot.
pub fn layout_entries(generation: LayoutGeneration) -> Vec<wgpu::BindGroupLayoutEntry> {
    generation
        .roles()
        .into_iter()
        .map(|(role, slot)| wgpu::BindGroupLayoutEntry {
            binding: slot,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: match shaders::buffer_kind(role) {
                    BufferKind::Storage => wgpu::BufferBindingType::Storage { read_only: true },
                    BufferKind::Uniform => wgpu::BufferBindingType::Uniform,
                },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        })
        .collect()
}

/// Vertices emitted for `point_count` points. Fails when the count does not
/// fit a single `u32` draw range.
pub fn vertex_count(primitive: Primitive, point_count: usize) -> Result<u32, RenderError> {
    let vertices = match primitive {
        // two triangles per point
        Primitive::Points => point_count.checked_mul(6),
        Primitive::Lines => Some(point_count),
    };
    vertices
        .and_then(|v| u32::try_from(v).ok())
        .ok_or(RenderError::TooManyVertices {
            points: point_count,
        })
}

fn pipeline_for<T>(pipelines: &HashMap<ShaderKey, T>, key: ShaderKey) -> Result<&T, RenderError> {
    pipelines.get(&key).ok_or_else(|| {
        tracing::error!(variant = %key.label(), "no pipeline compiled for plan");
        RenderError::MissingPipeline {
            variant: key.label(),
        }
    })
}

struct PlanPipeline {
    pipeline: wgpu::RenderPipeline,
    slots_layout: wgpu::BindGroupLayout,
}

/// wgpu renderer for binding plans.
///
/// Compiles one pipeline per [`ShaderKey`] up front; each frame uploads the
/// plan's buffers and binds them at the plan's slots.
pub struct WgpuPlanRenderer {
    pipelines: HashMap<ShaderKey, PlanPipeline>,
    viewport_buffer: wgpu::Buffer,
    viewport_bind_group: wgpu::BindGroup,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
    clear_color: wgpu::Color,
}

impl WgpuPlanRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let viewport_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("viewport_buffer"),
            contents: bytemuck::cast_slice(&viewport_data(width, height)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let viewport_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("viewport_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let viewport_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("viewport_bind_group"),
            layout: &viewport_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: viewport_buffer.as_entire_binding(),
            }],
        });

        let pipelines = ShaderKey::all()
            .into_iter()
            .map(|key| {
                let pipeline = create_pipeline(device, key, &viewport_layout, surface_format);
                (key, pipeline)
            })
            .collect();

        let depth_texture = Self::create_depth_texture(device, width, height);

        Self {
            pipelines,
            viewport_buffer,
            viewport_bind_group,
            depth_texture,
            surface_format,
            clear_color: wgpu::Color {
                r: 0.1,
                g: 0.1,
                b: 0.15,
                a: 1.0,
            },
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
        queue.write_buffer(
            &self.viewport_buffer,
            0,
            bytemuck::cast_slice(&viewport_data(width, height)),
        );
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    pub fn set_clear_color(&mut self, color: wgpu::Color) {
        self.clear_color = color;
    }

    /// Upload the plan's buffers and draw `geometry` into `target`.
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        plan: &BindingPlan<'_>,
        geometry: &GeometryBuffer,
        uniforms: &UniformTransform,
        primitive: Primitive,
    ) -> Result<(), RenderError> {
        if geometry.len() != plan.point_count() {
            return Err(RenderError::LengthMismatch {
                expected: plan.point_count(),
                actual: geometry.len(),
            });
        }

        let key = ShaderKey {
            generation: plan.generation(),
            primitive,
            space: plan.gradient_space().unwrap_or(InterpolationSpace::Rgb),
        };
        let plan_pipeline = pipeline_for(&self.pipelines, key)?;
        let vertices = vertex_count(primitive, plan.point_count())?;

        let buffers: Vec<wgpu::Buffer> = plan
            .bindings()
            .iter()
            .map(|binding| {
                let usage = match shaders::buffer_kind(binding.role) {
                    BufferKind::Storage => wgpu::BufferUsages::STORAGE,
                    BufferKind::Uniform => wgpu::BufferUsages::UNIFORM,
                };
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(binding.role.name()),
                    contents: &binding_contents(binding, geometry, uniforms),
                    usage,
                })
            })
            .collect();

        let entries: Vec<wgpu::BindGroupEntry<'_>> = plan
            .bindings()
            .iter()
            .zip(&buffers)
            .map(|(binding, buffer)| wgpu::BindGroupEntry {
                binding: binding.slot,
                resource: buffer.as_entire_binding(),
            })
            .collect();

        let slots_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("plan_bind_group"),
            layout: &plan_pipeline.slots_layout,
            entries: &entries,
        });

        tracing::debug!(
            variant = %key.label(),
            mode = %plan.mode(),
            vertices,
            "submitting plan"
        );

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("plan_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("plan_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            if vertices > 0 {
                pass.set_pipeline(&plan_pipeline.pipeline);
                pass.set_bind_group(0, &slots_bind_group, &[]);
                pass.set_bind_group(1, &self.viewport_bind_group, &[]);
                pass.draw(0..vertices, 0..1);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

fn viewport_data(width: u32, height: u32) -> [f32; 4] {
    [width.max(1) as f32, height.max(1) as f32, 0.0, 0.0]
}

fn create_pipeline(
    device: &wgpu::Device,
    key: ShaderKey,
    viewport_layout: &wgpu::BindGroupLayout,
    surface_format: wgpu::TextureFormat,
) -> PlanPipeline {
    let label = key.label();
    let entries = layout_entries(key.generation);
    let slots_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(&label),
        entries: &entries,
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&label),
        bind_group_layouts: &[&slots_layout, viewport_layout],
        push_constant_ranges: &[],
    });

    let source = shaders::plan_shader(key);
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    let topology = match key.primitive {
        Primitive::Points => wgpu::PrimitiveTopology::TriangleList,
        Primitive::Lines => wgpu::PrimitiveTopology::LineList,
    };

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[],
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: wgpu::TextureFormat::Depth32Float,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    });

    PlanPipeline {
        pipeline,
        slots_layout,
    }
}

/// One frame's worth of wgpu state, usable wherever a [`ShadingStage`] is.
pub struct WgpuFrame<'a> {
    pub renderer: &'a WgpuPlanRenderer,
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub target: &'a wgpu::TextureView,
    pub geometry: &'a GeometryBuffer,
    pub primitive: Primitive,
}

impl ShadingStage for WgpuFrame<'_> {
    type Output = Result<(), RenderError>;

    fn submit(&self, plan: &BindingPlan<'_>, uniforms: &UniformTransform) -> Self::Output {
        self.renderer.render(
            self.device,
            self.queue,
            self.target,
            plan,
            self.geometry,
            uniforms,
            self.primitive,
        )
    }
}
