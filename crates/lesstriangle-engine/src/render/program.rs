use crate::geometry::{GeometryBuffer, QuadVertex, QUAD_VERTEX_COUNT};
use crate::render::{RenderCtx, RenderTarget};
use crate::shader::{LinkedModule, ShaderProgram, UniformSlot};
use crate::uniform::{FrameState, FrameUniformBinder, UniformTable};

/// Per-slot uniform buffer size; every supported type fits in one vec4.
const UNIFORM_BUFFER_SIZE: u64 = 16;

/// Draws the full-screen quad with one linked shader program.
///
/// Frame uniforms are bound into the CPU-side [`UniformTable`] every frame and
/// only changed values are copied to the GPU. A program that failed to link
/// draws nothing, leaving the cleared frame visible.
pub struct ProgramRenderer {
    module: Option<LinkedModule>,
    uniforms: UniformTable,
    binder: FrameUniformBinder,
    geometry: GeometryBuffer,

    pipeline_format: Option<wgpu::TextureFormat>,
    resources: Option<ProgramResources>,
}

struct ProgramResources {
    pipeline: wgpu::RenderPipeline,

    /// One buffer per uniform, parallel to the table's slots.
    uniform_buffers: Vec<wgpu::Buffer>,

    /// Indexed by group number; gaps get an empty group.
    bind_groups: Vec<wgpu::BindGroup>,
}

impl ProgramRenderer {
    pub fn new(program: &ShaderProgram) -> Self {
        let module = program.linked_module().cloned();
        let uniforms = module.as_ref().map(UniformTable::for_module).unwrap_or_default();

        Self {
            module,
            uniforms,
            binder: FrameUniformBinder::new(),
            geometry: GeometryBuffer::new(),
            pipeline_format: None,
            resources: None,
        }
    }

    /// Whether the program linked and will draw.
    pub fn linked(&self) -> bool {
        self.module.is_some()
    }

    /// Current uniform values as last bound.
    pub fn uniforms(&self) -> &UniformTable {
        &self.uniforms
    }

    /// Binds `state` into the program's uniforms and draws the quad.
    ///
    /// The pass loads the existing color contents; clearing is the caller's job.
    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, state: &FrameState) {
        self.binder.bind(&mut self.uniforms, state);

        if self.module.is_none() {
            return;
        }

        self.ensure_pipeline(ctx);
        self.write_uniforms(ctx);

        let vbo = self.geometry.ensure_uploaded(ctx.device);
        let Some(res) = self.resources.as_ref() else { return };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("lesstriangle program pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(&res.pipeline);
        for (group, bind_group) in res.bind_groups.iter().enumerate() {
            rpass.set_bind_group(group as u32, bind_group, &[]);
        }
        rpass.set_vertex_buffer(0, vbo.slice(..));
        rpass.draw(0..QUAD_VERTEX_COUNT, 0..1);
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.resources.is_some() {
            return;
        }
        let Some(module) = self.module.as_ref() else { return };

        log::debug!(
            "building program pipeline for {:?} ({} uniform(s))",
            ctx.surface_format,
            module.uniforms().len()
        );

        self.resources = Some(ProgramResources::build(ctx, module));
        self.pipeline_format = Some(ctx.surface_format);

        // Fresh buffers are zeroed; push every known value again.
        self.uniforms.mark_all_dirty();
    }

    fn write_uniforms(&mut self, ctx: &RenderCtx<'_>) {
        let Some(res) = self.resources.as_ref() else { return };

        for index in self.uniforms.take_dirty() {
            let Some((_, Some(value))) = self.uniforms.entry(index) else { continue };
            let Some(buffer) = res.uniform_buffers.get(index) else { continue };
            ctx.queue.write_buffer(buffer, 0, value.as_bytes());
        }
    }
}

impl ProgramResources {
    fn build(ctx: &RenderCtx<'_>, module: &LinkedModule) -> Self {
        let device = ctx.device;
        let slots = module.uniforms();
        let groups = slots_by_group(slots);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("lesstriangle program shader"),
            source: wgpu::ShaderSource::Wgsl(module.source().into()),
        });

        let layouts: Vec<wgpu::BindGroupLayout> = groups
            .iter()
            .map(|members| {
                let entries: Vec<wgpu::BindGroupLayoutEntry> = members
                    .iter()
                    .map(|&i| wgpu::BindGroupLayoutEntry {
                        binding: slots[i].binding,
                        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: std::num::NonZeroU64::new(slots[i].ty.size()),
                        },
                        count: None,
                    })
                    .collect();

                device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("lesstriangle uniform bgl"),
                    entries: &entries,
                })
            })
            .collect();

        let uniform_buffers: Vec<wgpu::Buffer> = slots
            .iter()
            .map(|slot| {
                device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(slot.name.as_str()),
                    size: UNIFORM_BUFFER_SIZE,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                })
            })
            .collect();

        let bind_groups = groups
            .iter()
            .zip(&layouts)
            .map(|(members, layout)| {
                let entries: Vec<wgpu::BindGroupEntry<'_>> = members
                    .iter()
                    .map(|&i| wgpu::BindGroupEntry {
                        binding: slots[i].binding,
                        resource: uniform_buffers[i].as_entire_binding(),
                    })
                    .collect();

                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("lesstriangle uniform bind group"),
                    layout,
                    entries: &entries,
                })
            })
            .collect();

        let layout_refs: Vec<&wgpu::BindGroupLayout> = layouts.iter().collect();
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("lesstriangle program pipeline layout"),
            bind_group_layouts: &layout_refs,
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("lesstriangle program pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some(module.vertex_entry()),
                compilation_options: Default::default(),
                buffers: &[QuadVertex::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some(module.fragment_entry()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Self {
            pipeline,
            uniform_buffers,
            bind_groups,
        }
    }
}

/// Slot indices per bind group, indexed by group number. Groups below the
/// highest used one that hold no uniform are present and empty.
fn slots_by_group(slots: &[UniformSlot]) -> Vec<Vec<usize>> {
    let count = slots.iter().map(|s| s.group as usize + 1).max().unwrap_or(0);
    let mut groups = vec![Vec::new(); count];
    for (i, slot) in slots.iter().enumerate() {
        groups[slot.group as usize].push(i);
    }
    groups
}
