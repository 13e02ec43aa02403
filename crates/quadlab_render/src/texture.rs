use std::path::{Path, PathBuf};

use thiserror::Error;
use wgpu::util::DeviceExt;

use crate::layouts::BindLayouts;

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("could not load image {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("image {} is {width}x{height}; the GPU allows at most {max}", path.display())]
    TooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max: u32,
    },
}

/// Linear filtering, clamp-to-border on both axes, no mipmaps.
pub fn sampler_descriptor() -> wgpu::SamplerDescriptor<'static> {
    wgpu::SamplerDescriptor {
        label: Some("Quad Texture Sampler"),
        address_mode_u: wgpu::AddressMode::ClampToBorder,
        address_mode_v: wgpu::AddressMode::ClampToBorder,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        border_color: Some(wgpu::SamplerBorderColor::TransparentBlack),
        ..Default::default()
    }
}

/// Decode any supported image file into RGBA8.
pub fn decode_rgba8(path: &Path) -> Result<image::RgbaImage, TextureError> {
    let image = image::open(path).map_err(|source| TextureError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image.to_rgba8())
}

/// Decode `path` and reject images larger than `max_dimension` on either
/// axis. Runs before any GPU state is touched.
pub fn load_checked(path: &Path, max_dimension: u32) -> Result<image::RgbaImage, TextureError> {
    let pixels = decode_rgba8(path)?;
    let (width, height) = pixels.dimensions();
    if width > max_dimension || height > max_dimension {
        return Err(TextureError::TooLarge {
            path: path.to_path_buf(),
            width,
            height,
            max: max_dimension,
        });
    }
    Ok(pixels)
}

pub struct GpuTexture {
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    pub size: (u32, u32),
}

impl GpuTexture {
    pub fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layouts: &BindLayouts,
        pixels: &[u8],
        width: u32,
        height: u32,
        label: &str,
    ) -> Self {
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            pixels,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&sampler_descriptor());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &layouts.texture,
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
        });
        Self {
            _texture: texture,
            bind_group,
            size: (width, height),
        }
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

/// The texture currently bound to the quad. Starts as a 1x1 white placeholder
/// so programs always have something to sample.
pub struct TextureStage {
    current: GpuTexture,
    source: Option<PathBuf>,
}

impl TextureStage {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, layouts: &BindLayouts) -> Self {
        let current = GpuTexture::from_rgba8(
            device,
            queue,
            layouts,
            &[255, 255, 255, 255],
            1,
            1,
            "placeholder_white",
        );
        Self {
            current,
            source: None,
        }
    }

    /// Replace the texture with the image at `path`. On error the current
    /// texture stays bound.
    pub fn reload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layouts: &BindLayouts,
        path: &Path,
    ) -> Result<(), TextureError> {
        let pixels = load_checked(path, device.limits().max_texture_dimension_2d)?;
        let (width, height) = pixels.dimensions();

        let label = path.display().to_string();
        // Assigning drops the previous GPU texture.
        self.current = GpuTexture::from_rgba8(
            device,
            queue,
            layouts,
            pixels.as_raw(),
            width,
            height,
            &label,
        );
        self.source = Some(path.to_path_buf());
        log::info!("Loaded texture {} ({}x{})", label, width, height);
        Ok(())
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        self.current.bind_group()
    }

    pub fn size(&self) -> (u32, u32) {
        self.current.size
    }

    /// Path of the loaded image, `None` while the placeholder is bound.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}
