#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use quadlab_render::BindLayouts;
use wgpu::util::DeviceExt;

pub const VERT: &str = r#"
struct Uniforms {
    resolution: vec2<f32>,
    time: f32,
    mouse: vec2<f32>,
}

@group(0) @binding(0) var<uniform> u: Uniforms;

struct VsOut {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) color: vec4<f32>,
}

@vertex
fn main(
    @location(0) position: vec2<f32>,
    @location(1) uv: vec2<f32>,
    @location(2) color: vec4<f32>,
) -> VsOut {
    var out: VsOut;
    out.position = vec4<f32>(position, 0.0, 1.0);
    out.uv = uv;
    out.color = color;
    return out;
}
"#;

pub const FRAG: &str = r#"
struct Uniforms {
    resolution: vec2<f32>,
    time: f32,
    mouse: vec2<f32>,
}

@group(0) @binding(0) var<uniform> u: Uniforms;
@group(1) @binding(0) var tex: texture_2d<f32>;
@group(1) @binding(1) var samp: sampler;

@fragment
fn main(@location(0) uv: vec2<f32>, @location(1) color: vec4<f32>) -> @location(0) vec4<f32> {
    let pulse = 0.5 + 0.5 * sin(u.time);
    return textureSample(tex, samp, uv) * pulse + color;
}
"#;

/// Writes the interpolated vertex color unchanged.
pub const FRAG_VERTEX_COLOR: &str = r#"
@fragment
fn main(@location(0) uv: vec2<f32>, @location(1) color: vec4<f32>) -> @location(0) vec4<f32> {
    return color;
}
"#;

pub const FRAG_SYNTAX_ERROR: &str = r#"
@fragment
fn main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 0.0, 0.0, 1.0)
}
"#;

// Compiles on its own, but reads an output the vertex stage never writes.
pub const FRAG_LINK_ERROR: &str = r#"
@fragment
fn main(@location(5) extra: vec4<f32>) -> @location(0) vec4<f32> {
    return extra;
}
"#;

pub struct Headless {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub layouts: BindLayouts,
}

impl Headless {
    /// Texture bind group for group 1 that avoids clamp-to-border sampling, so
    /// it works on adapters without that feature.
    pub fn plain_texture(&self, rgba: [u8; 4]) -> wgpu::BindGroup {
        let texture = self.device.create_texture_with_data(
            &self.queue,
            &wgpu::TextureDescriptor {
                label: Some("test texture"),
                size: wgpu::Extent3d {
                    width: 1,
                    height: 1,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &rgba,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = self.device.create_sampler(&wgpu::SamplerDescriptor {
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("test texture bind group"),
            layout: &self.layouts.texture,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        })
    }

    /// Offscreen color target that can be copied out.
    pub fn render_target(&self, width: u32, height: u32) -> wgpu::Texture {
        self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("offscreen target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        })
    }
}

/// Request a device without a window. `None` when no adapter (with
/// `features`) is available.
pub fn headless(features: wgpu::Features) -> Option<Headless> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::default(),
        compatible_surface: None,
        force_fallback_adapter: false,
    }))?;
    if !adapter.features().contains(features) {
        return None;
    }
    let (device, queue) = pollster::block_on(adapter.request_device(
        &wgpu::DeviceDescriptor {
            label: Some("quadlab test device"),
            required_features: features,
            ..Default::default()
        },
        None,
    ))
    .ok()?;
    let layouts = BindLayouts::new(&device);
    Some(Headless {
        device,
        queue,
        layouts,
    })
}

pub fn write(dir: &Path, name: &str, source: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, source).unwrap();
    path
}
