//! The uniform surface shader authors see: `resolution`, `time`, `mouse`.
//!
//! Both shader stages declare the same block at `@group(0) @binding(0)`:
//!
//! ```wgsl
//! struct Uniforms {
//!     resolution: vec2<f32>,
//!     time: f32,
//!     mouse: vec2<f32>,
//! }
//! @group(0) @binding(0) var<uniform> u: Uniforms;
//! ```

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Uniform {
    Resolution,
    Time,
    Mouse,
}

impl Uniform {
    pub const ALL: &'static [Uniform] = &[Uniform::Resolution, Uniform::Time, Uniform::Mouse];

    pub fn name(self) -> &'static str {
        match self {
            Self::Resolution => "resolution",
            Self::Time => "time",
            Self::Mouse => "mouse",
        }
    }

    /// Byte offset of the member inside the uniform block.
    pub fn offset(self) -> usize {
        match self {
            Self::Resolution => std::mem::offset_of!(ShaderUniforms, resolution),
            Self::Time => std::mem::offset_of!(ShaderUniforms, time),
            Self::Mouse => std::mem::offset_of!(ShaderUniforms, mouse),
        }
    }

    fn bit(self) -> u8 {
        match self {
            Self::Resolution => 1,
            Self::Time => 2,
            Self::Mouse => 4,
        }
    }
}

impl fmt::Display for Uniform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Host-side mirror of the uniform block.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShaderUniforms {
    pub resolution: [f32; 2],
    pub time: f32,
    _pad0: f32,
    pub mouse: [f32; 2],
    _pad1: [f32; 2],
}

impl ShaderUniforms {
    /// `framebuffer` is the size queried this frame, `cursor` the raw window
    /// position with a top-left origin.
    pub fn for_frame(framebuffer: (u32, u32), time: f64, cursor: (f64, f64)) -> Self {
        let (width, height) = framebuffer;
        Self {
            resolution: [width as f32, height as f32],
            time: time as f32,
            mouse: mouse_to_shader_space(cursor, height),
            ..Self::default()
        }
    }
}

/// Move the cursor into shader space, where the origin is bottom-left.
pub fn mouse_to_shader_space(cursor: (f64, f64), framebuffer_height: u32) -> [f32; 2] {
    let (x, y) = cursor;
    [x as f32, (framebuffer_height as f64 - y) as f32]
}

/// Which uniforms a program's sources read.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UniformSet(u8);

impl UniformSet {
    /// Collect uniform names used as a member access (`u.time`). Field names
    /// in the block's own struct declaration are not reads and are skipped.
    pub fn referenced_by(sources: &[&str]) -> Self {
        let mut set = Self::default();
        for source in sources {
            for after_dot in source.split('.').skip(1) {
                let member = after_dot.trim_start();
                let end = member
                    .find(|c: char| !(c.is_alphanumeric() || c == '_'))
                    .unwrap_or(member.len());
                if let Some(uniform) = Uniform::ALL.iter().find(|u| u.name() == &member[..end]) {
                    set.0 |= uniform.bit();
                }
            }
        }
        set
    }

    pub fn contains(self, uniform: Uniform) -> bool {
        self.0 & uniform.bit() != 0
    }

    pub fn iter(self) -> impl Iterator<Item = Uniform> {
        Uniform::ALL
            .iter()
            .copied()
            .filter(move |uniform| self.contains(*uniform))
    }
}
