use anyhow::{anyhow, bail, ensure, Context, Result};
use glam::Mat4;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::device::{Gpu, SurfaceErrorAction, DEPTH_FORMAT};
use crate::frame::{DrawCall, FrameCmd, FrameList};
use crate::geometry::VertexData;
use crate::shader::{Attribute, Program, UniformBlock};
use crate::transform::{CanvasSize, Transforms};

use super::backend::{check_binding, check_draw, insert_binding};
use super::id::next_id;
use super::{AttributeBinding, BufferId, FrameStatus, ProgramId, RenderBackend};

/// Depth configuration a pipeline is built for.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum DepthState {
    /// The pass has no depth attachment.
    Detached,
    /// Depth attachment present, test off.
    Disabled,
    /// Less-than test with depth writes.
    Enabled,
}

impl DepthState {
    fn new(attached: bool, test_enabled: bool) -> Self {
        match (attached, test_enabled) {
            (false, _) => DepthState::Detached,
            (true, false) => DepthState::Disabled,
            (true, true) => DepthState::Enabled,
        }
    }

    fn stencil_state(self) -> Option<wgpu::DepthStencilState> {
        let (depth_write_enabled, depth_compare) = match self {
            DepthState::Detached => return None,
            DepthState::Disabled => (false, wgpu::CompareFunction::Always),
            DepthState::Enabled => (true, wgpu::CompareFunction::Less),
        };
        Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled,
            depth_compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        })
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct PipelineKey {
    format: wgpu::TextureFormat,
    depth: DepthState,
}

struct GpuUniforms {
    block: UniformBlock,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

struct GpuProgram {
    label: String,
    vertex: wgpu::ShaderModule,
    fragment: wgpu::ShaderModule,
    vertex_entry: String,
    fragment_entry: String,
    inputs: Vec<Attribute>,
    /// Sorted by location; vertex buffer slot = index.
    bindings: Vec<AttributeBinding>,
    uniforms: Option<GpuUniforms>,
    layout: wgpu::PipelineLayout,
    /// Built lazily per surface format and depth state.
    pipelines: Vec<(PipelineKey, wgpu::RenderPipeline)>,
}

impl GpuProgram {
    fn pipeline(&self, key: PipelineKey) -> Option<&wgpu::RenderPipeline> {
        self.pipelines
            .iter()
            .find_map(|(k, p)| (*k == key).then_some(p))
    }
}

struct GpuBuffer {
    buffer: wgpu::Buffer,
    components: u8,
    vertex_count: u32,
}

/// Backend that draws through wgpu onto the window surface.
pub struct WgpuBackend<'w> {
    gpu: Gpu<'w>,
    programs: Vec<GpuProgram>,
    buffers: Vec<GpuBuffer>,
}

impl<'w> WgpuBackend<'w> {
    pub fn new(gpu: Gpu<'w>) -> Self {
        Self {
            gpu,
            programs: Vec::new(),
            buffers: Vec::new(),
        }
    }

    /// Drawable size in physical pixels.
    pub fn canvas_size(&self) -> CanvasSize {
        let size = self.gpu.size();
        CanvasSize::new(size.width, size.height)
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.gpu.resize(size);
    }

    fn program(&self, id: ProgramId) -> Result<&GpuProgram> {
        self.programs
            .get(id.index())
            .with_context(|| format!("{id} does not exist"))
    }

    /// Resolves each matrix to its byte offset in the program's uniform buffer.
    fn uniform_writes(&self, id: ProgramId, transforms: &Transforms) -> Result<Vec<(u64, Mat4)>> {
        let program = self.program(id)?;
        let Some(uniforms) = &program.uniforms else {
            bail!("program `{}` has no uniform block", program.label);
        };

        transforms
            .named()
            .into_iter()
            .map(|(name, matrix)| {
                let member = uniforms.block.member(name).with_context(|| {
                    format!("program `{}` has no uniform `{name}`", program.label)
                })?;
                Ok((member.offset as u64, *matrix))
            })
            .collect()
    }

    fn write_uniforms(&self, id: ProgramId, writes: &[(u64, Mat4)]) {
        let Some(uniforms) = self.programs.get(id.index()).and_then(|p| p.uniforms.as_ref()) else {
            return;
        };
        for (offset, matrix) in writes {
            self.gpu.queue().write_buffer(
                &uniforms.buffer,
                *offset,
                bytemuck::cast_slice(&matrix.to_cols_array()),
            );
        }
    }

    fn check_draw(&self, call: &DrawCall) -> Result<()> {
        let program = self.program(call.program)?;
        check_draw(
            &program.label,
            &program.inputs,
            &program.bindings,
            |id| self.buffers.get(id.index()).map(|b| b.vertex_count),
            call,
        )
    }

    fn ensure_pipeline(&mut self, id: ProgramId, key: PipelineKey) -> Result<()> {
        let device = self.gpu.device();
        let program = self
            .programs
            .get_mut(id.index())
            .with_context(|| format!("{id} does not exist"))?;

        if program.pipeline(key).is_some() {
            return Ok(());
        }

        let attributes: Vec<[wgpu::VertexAttribute; 1]> = program
            .bindings
            .iter()
            .map(|b| {
                let format = b
                    .layout
                    .vertex_format()
                    .ok_or_else(|| anyhow!("unsupported attribute layout {:?}", b.layout))?;
                Ok([wgpu::VertexAttribute {
                    format,
                    offset: b.layout.offset,
                    shader_location: b.location,
                }])
            })
            .collect::<Result<_>>()?;

        let buffers: Vec<wgpu::VertexBufferLayout<'_>> = program
            .bindings
            .iter()
            .zip(&attributes)
            .map(|(b, attrs)| wgpu::VertexBufferLayout {
                array_stride: b.layout.byte_stride(),
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: attrs,
            })
            .collect();

        let label = format!("cubestage {} pipeline", program.label);
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label.as_str()),
            layout: Some(&program.layout),

            vertex: wgpu::VertexState {
                module: &program.vertex,
                entry_point: Some(program.vertex_entry.as_str()),
                compilation_options: Default::default(),
                buffers: &buffers,
            },

            fragment: Some(wgpu::FragmentState {
                module: &program.fragment,
                entry_point: Some(program.fragment_entry.as_str()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: key.format,
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

            depth_stencil: key.depth.stencil_state(),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::debug!("built pipeline for `{}` ({key:?})", program.label);
        program.pipelines.push((key, pipeline));
        Ok(())
    }
}

impl RenderBackend for WgpuBackend<'_> {
    fn create_program(&mut self, program: &Program) -> Result<ProgramId> {
        let id = ProgramId(next_id(self.programs.len())?);
        let device = self.gpu.device();

        let module = |stage: &crate::shader::CompiledStage| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(stage.label()),
                source: wgpu::ShaderSource::Wgsl(stage.text().to_owned().into()),
            })
        };
        let vertex = module(program.vertex());
        let fragment = module(program.fragment());

        let uniforms = match program.uniforms() {
            Some(block) => {
                ensure!(
                    block.group == 0,
                    "program `{}` places its uniforms in group {}; only group 0 is supported",
                    program.label(),
                    block.group
                );
                let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("cubestage uniforms bgl"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: block.binding,
                        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: wgpu::BufferSize::new(block.size as u64),
                        },
                        count: None,
                    }],
                });
                let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("cubestage uniforms ubo"),
                    size: block.size as u64,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("cubestage uniforms bind group"),
                    layout: &layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: block.binding,
                        resource: buffer.as_entire_binding(),
                    }],
                });
                Some((layout, GpuUniforms {
                    block: block.clone(),
                    buffer,
                    bind_group,
                }))
            }
            None => None,
        };

        let bind_group_layouts: Vec<&wgpu::BindGroupLayout> =
            uniforms.iter().map(|(layout, _)| layout).collect();
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("cubestage pipeline layout"),
            bind_group_layouts: &bind_group_layouts,
            immediate_size: 0,
        });

        self.programs.push(GpuProgram {
            label: program.label().to_string(),
            vertex,
            fragment,
            vertex_entry: program.vertex().entry_point_name().to_string(),
            fragment_entry: program.fragment().entry_point_name().to_string(),
            inputs: program.attributes().to_vec(),
            bindings: Vec::new(),
            uniforms: uniforms.map(|(_, u)| u),
            layout,
            pipelines: Vec::new(),
        });
        Ok(id)
    }

    fn upload(&mut self, label: &str, data: &VertexData) -> Result<BufferId> {
        let id = BufferId(next_id(self.buffers.len())?);
        let buffer = self
            .gpu
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: data.as_bytes(),
                usage: wgpu::BufferUsages::VERTEX,
            });
        self.buffers.push(GpuBuffer {
            buffer,
            components: data.components(),
            vertex_count: data.vertex_count(),
        });
        log::debug!("uploaded `{label}` as {id} ({} vertices)", data.vertex_count());
        Ok(id)
    }

    fn bind_attribute(&mut self, program: ProgramId, binding: AttributeBinding) -> Result<()> {
        let components = self
            .buffers
            .get(binding.buffer.index())
            .map(|b| b.components)
            .with_context(|| format!("{} does not exist", binding.buffer))?;

        let p = self
            .programs
            .get_mut(program.index())
            .with_context(|| format!("{program} does not exist"))?;
        check_binding(&p.label, &p.inputs, &binding, components)?;
        insert_binding(&mut p.bindings, binding);
        // Vertex layouts are baked into pipelines.
        p.pipelines.clear();
        Ok(())
    }

    fn submit(&mut self, frame: &FrameList) -> Result<FrameStatus> {
        let Some((clear, clear_depth)) = frame.clear_op() else {
            bail!("frame must start with a clear");
        };
        let depth_attached = clear_depth.is_some() || frame.depth_test_enabled();
        let format = self.gpu.surface_format();

        let mut draws: Vec<(DrawCall, PipelineKey)> = Vec::new();
        let mut uploads: Vec<(ProgramId, Vec<(u64, Mat4)>)> = Vec::new();
        let mut depth_test = false;
        for cmd in frame.items() {
            match cmd {
                FrameCmd::Clear { .. } => {}
                FrameCmd::EnableDepthTest => depth_test = true,
                FrameCmd::SetTransforms { program, transforms } => {
                    uploads.push((*program, self.uniform_writes(*program, transforms)?));
                }
                FrameCmd::Draw(call) => {
                    self.check_draw(call)?;
                    let key = PipelineKey {
                        format,
                        depth: DepthState::new(depth_attached, depth_test),
                    };
                    self.ensure_pipeline(call.program, key)?;
                    draws.push((*call, key));
                }
            }
        }

        let mut gpu_frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                return match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => Err(anyhow!("surface is no longer usable")),
                    _ => Ok(FrameStatus::Skipped),
                };
            }
        };

        // Uniforms change only for frames that reach the surface.
        for (id, writes) in &uploads {
            self.write_uniforms(*id, writes);
        }

        // Render pass borrows frame.encoder; dropped before present() takes the frame.
        {
            let depth_stencil_attachment =
                depth_attached.then(|| wgpu::RenderPassDepthStencilAttachment {
                    view: self.gpu.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_depth.unwrap_or(1.0)),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                });

            let mut rpass = gpu_frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("cubestage frame pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &gpu_frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            for (call, key) in &draws {
                let program = &self.programs[call.program.index()];
                let Some(pipeline) = program.pipeline(*key) else { continue };

                rpass.set_pipeline(pipeline);
                if let Some(uniforms) = &program.uniforms {
                    rpass.set_bind_group(0, &uniforms.bind_group, &[]);
                }
                for (slot, binding) in program.bindings.iter().enumerate() {
                    let buffer = &self.buffers[binding.buffer.index()].buffer;
                    rpass.set_vertex_buffer(slot as u32, buffer.slice(..));
                }
                rpass.draw(call.vertices(), 0..1);
            }
        }

        self.gpu.present(gpu_frame);
        Ok(FrameStatus::Presented)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_state_follows_attachment_then_test() {
        assert_eq!(DepthState::new(false, true), DepthState::Detached);
        assert_eq!(DepthState::new(true, false), DepthState::Disabled);
        assert_eq!(DepthState::new(true, true), DepthState::Enabled);
    }

    #[test]
    fn enabled_depth_tests_less_and_writes() {
        let state = DepthState::Enabled.stencil_state().unwrap();
        assert_eq!(state.depth_compare, wgpu::CompareFunction::Less);
        assert!(state.depth_write_enabled);
        assert_eq!(state.format, DEPTH_FORMAT);
    }

    #[test]
    fn disabled_depth_passes_everything_without_writes() {
        let state = DepthState::Disabled.stencil_state().unwrap();
        assert_eq!(state.depth_compare, wgpu::CompareFunction::Always);
        assert!(!state.depth_write_enabled);
        assert!(DepthState::Detached.stencil_state().is_none());
    }
}
