//! Framebuffer readback for screenshots.
//!
//! The swapchain image is copied into a mappable buffer in the same submit as
//! the frame, then de-padded and converted to tightly packed RGBA8 rows,
//! top row first.

use std::path::{Path, PathBuf};
use std::sync::mpsc;

use thiserror::Error;

pub const SCREENSHOT_PATH: &str = "screenshot.png";

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("the surface does not allow reading back frames")]
    Unsupported,
    #[error("cannot capture surface format {0:?}")]
    Format(wgpu::TextureFormat),
    #[error("failed to map readback buffer: {0}")]
    Map(String),
    #[error("could not save {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChannelOrder {
    Rgba,
    Bgra,
}

fn channel_order(format: wgpu::TextureFormat) -> Option<ChannelOrder> {
    match format {
        wgpu::TextureFormat::Rgba8Unorm | wgpu::TextureFormat::Rgba8UnormSrgb => {
            Some(ChannelOrder::Rgba)
        }
        wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb => {
            Some(ChannelOrder::Bgra)
        }
        _ => None,
    }
}

/// Row pitch for texture-to-buffer copies.
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    (width * 4).div_ceil(align) * align
}

/// Strip row padding and swap to RGBA when the source is BGRA.
fn unpad_rows(data: &[u8], width: u32, height: u32, padded_row: u32, order: ChannelOrder) -> Vec<u8> {
    let row_bytes = (width * 4) as usize;
    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in data.chunks(padded_row as usize).take(height as usize) {
        let row = &row[..row_bytes];
        match order {
            ChannelOrder::Rgba => pixels.extend_from_slice(row),
            ChannelOrder::Bgra => {
                for px in row.chunks_exact(4) {
                    pixels.extend_from_slice(&[px[2], px[1], px[0], px[3]]);
                }
            }
        }
    }
    pixels
}

/// Tightly packed RGBA8 frame, top row first.
pub struct CapturedFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl CapturedFrame {
    pub fn save(&self, path: &Path) -> Result<(), CaptureError> {
        image::save_buffer(
            path,
            &self.pixels,
            self.width,
            self.height,
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|source| CaptureError::Save {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// A copy recorded into an encoder but not yet read back.
pub struct Readback {
    buffer: wgpu::Buffer,
    width: u32,
    height: u32,
    padded_row: u32,
    order: ChannelOrder,
}

impl Readback {
    /// Record a copy of `texture` into a fresh readback buffer. The texture
    /// must have been created with `COPY_SRC`.
    pub fn record(
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        texture: &wgpu::Texture,
    ) -> Result<Self, CaptureError> {
        let order = channel_order(texture.format()).ok_or(CaptureError::Format(texture.format()))?;

        let size = texture.size();
        let padded_row = padded_bytes_per_row(size.width);
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Screenshot Readback Buffer"),
            size: (padded_row * size.height) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        encoder.copy_texture_to_buffer(
            texture.as_image_copy(),
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row),
                    rows_per_image: Some(size.height),
                },
            },
            wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
        );

        Ok(Self {
            buffer,
            width: size.width,
            height: size.height,
            padded_row,
            order,
        })
    }

    /// Wait for the copy to land and pull the pixels out. Call after submit.
    pub fn finish(self, device: &wgpu::Device) -> Result<CapturedFrame, CaptureError> {
        let slice = self.buffer.slice(..);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = device.poll(wgpu::Maintain::Wait);

        match rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(err)) => return Err(CaptureError::Map(err.to_string())),
            Err(err) => return Err(CaptureError::Map(err.to_string())),
        }

        let pixels = {
            let data = slice.get_mapped_range();
            unpad_rows(&data, self.width, self.height, self.padded_row, self.order)
        };
        self.buffer.unmap();

        Ok(CapturedFrame {
            width: self.width,
            height: self.height,
            pixels,
        })
    }
}
