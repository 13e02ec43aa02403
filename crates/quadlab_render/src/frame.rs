//! One frame: upload uniforms, clear, draw the batch, optionally read back.

use quadlab_core::ShaderUniforms;

use crate::batch::GpuVertexBatch;
use crate::capture::{CaptureError, CapturedFrame, Readback};
use crate::gpu_context::GpuContext;
use crate::shader::ShaderPipeline;
use crate::texture::TextureStage;

/// Per-frame values sampled by the caller right before rendering.
#[derive(Debug, Clone, Copy)]
pub struct FrameInputs {
    /// Current framebuffer size in pixels.
    pub framebuffer: (u32, u32),
    /// Cursor in window coordinates, origin top-left.
    pub cursor: (f64, f64),
    pub time: f64,
}

/// Record the quad pass into a new encoder targeting `target`.
///
/// Uniforms are written and the batch drawn only while the pipeline holds a
/// linked program. Otherwise the pass just clears, to the sentinel color when
/// the last build failed.
pub fn encode_frame(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    target: &wgpu::TextureView,
    batch: &GpuVertexBatch,
    shaders: &ShaderPipeline,
    texture: &wgpu::BindGroup,
    inputs: FrameInputs,
) -> wgpu::CommandEncoder {
    let program = shaders.program();
    if let Some(program) = program {
        let uniforms = ShaderUniforms::for_frame(inputs.framebuffer, inputs.time, inputs.cursor);
        program.write_uniforms(queue, &uniforms);
    }

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Frame Encoder"),
    });

    let [r, g, b, a] = shaders.status().clear_color();
    {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Quad Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if let Some(program) = program {
            let count = batch.synced_len();
            if count > 0 {
                pass.set_pipeline(program.pipeline());
                pass.set_bind_group(0, program.uniforms().bind_group(), &[]);
                pass.set_bind_group(1, texture, &[]);
                pass.set_vertex_buffer(0, batch.buffer().slice(..));
                pass.draw(0..count, 0..1);
            }
        }
    }

    encoder
}

#[derive(Default)]
pub struct FrameDriver {
    capture_requested: bool,
}

impl FrameDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read back the next frame that reaches the screen.
    pub fn request_capture(&mut self) {
        self.capture_requested = true;
    }

    pub fn capture_pending(&self) -> bool {
        self.capture_requested
    }

    /// Render and present one frame. Returns the capture result when a
    /// screenshot was pending and this frame was presented.
    pub fn render(
        &mut self,
        gpu: &GpuContext,
        batch: &GpuVertexBatch,
        shaders: &ShaderPipeline,
        texture: &TextureStage,
        inputs: FrameInputs,
    ) -> Option<Result<CapturedFrame, CaptureError>> {
        // A skipped frame leaves the capture request for the next one.
        let (output, view) = gpu.begin_frame()?;

        let mut encoder = encode_frame(
            &gpu.device,
            &gpu.queue,
            &view,
            batch,
            shaders,
            texture.bind_group(),
            inputs,
        );

        let readback = if self.capture_requested {
            self.capture_requested = false;
            Some(if gpu.supports_capture {
                Readback::record(&gpu.device, &mut encoder, &output.texture)
            } else {
                Err(CaptureError::Unsupported)
            })
        } else {
            None
        };

        gpu.queue.submit(std::iter::once(encoder.finish()));

        let captured = readback.map(|recorded| recorded.and_then(|r| r.finish(&gpu.device)));
        output.present();
        captured
    }
}
