//! Hot-reloadable vertex/fragment program.
//!
//! A reload compiles each WGSL file into its own shader module, then links
//! them by building a render pipeline. Every step runs inside a validation
//! error scope so that bad sources surface as `ShaderError`s instead of
//! uncaptured device errors.
//!
//! State machine: `Unloaded -> Ready <-> Failed`. The previous program is
//! dropped as soon as a reload starts; a failed attempt never brings it back.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use quadlab_core::{PipelineStatus, ShaderUniforms, UniformSet};
use thiserror::Error;

use crate::layouts::BindLayouts;
use crate::vertex::vertex_layout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderKind {
    Vertex,
    Fragment,
}

impl ShaderKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Vertex => "vertex shader",
            Self::Fragment => "fragment shader",
        }
    }
}

impl fmt::Display for ShaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("failed to read {kind} `{}`: {source}", path.display())]
    Read {
        kind: ShaderKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not compile {kind} `{}`:\n{log}", path.display())]
    Compile {
        kind: ShaderKind,
        path: PathBuf,
        log: String,
    },
    #[error("program linking failed:\n{log}")]
    Link { log: String },
}

/// Per-program uniform buffer and the bind group pointing at it.
pub struct UniformTable {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    referenced: UniformSet,
}

impl UniformTable {
    fn new(device: &wgpu::Device, layouts: &BindLayouts, referenced: UniformSet) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Shader Uniform Buffer"),
            size: std::mem::size_of::<ShaderUniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shader Uniform Bind Group"),
            layout: &layouts.uniforms,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self {
            buffer,
            bind_group,
            referenced,
        }
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn referenced(&self) -> UniformSet {
        self.referenced
    }
}

pub struct ShaderProgram {
    pipeline: wgpu::RenderPipeline,
    uniforms: UniformTable,
}

impl ShaderProgram {
    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    pub fn uniforms(&self) -> &UniformTable {
        &self.uniforms
    }

    pub fn write_uniforms(&self, queue: &wgpu::Queue, values: &ShaderUniforms) {
        queue.write_buffer(&self.uniforms.buffer, 0, bytemuck::bytes_of(values));
    }
}

enum ProgramState {
    Unloaded,
    Ready(ShaderProgram),
    Failed,
}

pub struct ShaderPipeline {
    target_format: wgpu::TextureFormat,
    state: ProgramState,
}

impl ShaderPipeline {
    pub fn new(target_format: wgpu::TextureFormat) -> Self {
        Self {
            target_format,
            state: ProgramState::Unloaded,
        }
    }

    pub fn status(&self) -> PipelineStatus {
        match self.state {
            ProgramState::Unloaded => PipelineStatus::Unloaded,
            ProgramState::Ready(_) => PipelineStatus::Ready,
            ProgramState::Failed => PipelineStatus::Failed,
        }
    }

    /// The linked program, only while `Ready`.
    pub fn program(&self) -> Option<&ShaderProgram> {
        match &self.state {
            ProgramState::Ready(program) => Some(program),
            ProgramState::Unloaded | ProgramState::Failed => None,
        }
    }

    /// Drop the current program and mark the pipeline failed.
    pub fn invalidate(&mut self) {
        self.state = ProgramState::Failed;
    }

    pub fn reload(
        &mut self,
        device: &wgpu::Device,
        layouts: &BindLayouts,
        vert_path: &Path,
        frag_path: &Path,
    ) -> Result<(), ShaderError> {
        self.invalidate();

        let vert_source = read_source(ShaderKind::Vertex, vert_path)?;
        let vert_module = compile(device, ShaderKind::Vertex, vert_path, &vert_source)?;
        let frag_source = read_source(ShaderKind::Fragment, frag_path)?;
        let frag_module = compile(device, ShaderKind::Fragment, frag_path, &frag_source)?;

        let pipeline = link(
            device,
            layouts,
            self.target_format,
            &vert_module,
            &frag_module,
        )?;
        // Modules are not needed once the pipeline exists.
        drop(vert_module);
        drop(frag_module);

        let referenced = UniformSet::referenced_by(&[&vert_source, &frag_source]);
        for uniform in referenced.iter() {
            log::debug!("Uniform `{}` at offset {}", uniform, uniform.offset());
        }
        let uniforms = UniformTable::new(device, layouts, referenced);

        self.state = ProgramState::Ready(ShaderProgram { pipeline, uniforms });
        Ok(())
    }
}

fn read_source(kind: ShaderKind, path: &Path) -> Result<String, ShaderError> {
    fs::read_to_string(path).map_err(|source| ShaderError::Read {
        kind,
        path: path.to_path_buf(),
        source,
    })
}

fn compile(
    device: &wgpu::Device,
    kind: ShaderKind,
    path: &Path,
    source: &str,
) -> Result<wgpu::ShaderModule, ShaderError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(kind.label()),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    match pollster::block_on(device.pop_error_scope()) {
        Some(error) => Err(ShaderError::Compile {
            kind,
            path: path.to_path_buf(),
            log: error.to_string(),
        }),
        None => Ok(module),
    }
}

fn link(
    device: &wgpu::Device,
    layouts: &BindLayouts,
    target_format: wgpu::TextureFormat,
    vert_module: &wgpu::ShaderModule,
    frag_module: &wgpu::ShaderModule,
) -> Result<wgpu::RenderPipeline, ShaderError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Shader Program"),
        layout: Some(&layouts.pipeline),
        vertex: wgpu::VertexState {
            module: vert_module,
            entry_point: None,
            buffers: &[vertex_layout()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: frag_module,
            entry_point: None,
            targets: &[Some(wgpu::ColorTargetState {
                format: target_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    });
    match pollster::block_on(device.pop_error_scope()) {
        Some(error) => Err(ShaderError::Link {
            log: error.to_string(),
        }),
        None => Ok(pipeline),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_pipeline_is_unloaded() {
        let pipeline = ShaderPipeline::new(wgpu::TextureFormat::Bgra8Unorm);
        assert_eq!(pipeline.status(), PipelineStatus::Unloaded);
        assert!(pipeline.program().is_none());
    }

    #[test]
    fn invalidate_moves_to_failed() {
        let mut pipeline = ShaderPipeline::new(wgpu::TextureFormat::Bgra8Unorm);
        pipeline.invalidate();
        assert_eq!(pipeline.status(), PipelineStatus::Failed);
        assert!(pipeline.program().is_none());
    }

    #[test]
    fn missing_source_reports_kind_and_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.frag.wgsl");
        let err = read_source(ShaderKind::Fragment, &path).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("fragment shader"), "{message}");
        assert!(message.contains("gone.frag.wgsl"), "{message}");
    }

    #[test]
    fn compile_error_message_carries_log() {
        let err = ShaderError::Compile {
            kind: ShaderKind::Vertex,
            path: PathBuf::from("a.wgsl"),
            log: "expected `;`".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "could not compile vertex shader `a.wgsl`:\nexpected `;`"
        );
    }
}
