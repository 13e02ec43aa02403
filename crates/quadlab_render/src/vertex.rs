use quadlab_core::Vertex;

/// Attribute locations: 0 = position, 1 = tex_coords, 2 = color.
pub fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: std::mem::offset_of!(Vertex, position) as wgpu::BufferAddress,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x2,
            },
            // tex_coords
            wgpu::VertexAttribute {
                offset: std::mem::offset_of!(Vertex, tex_coords) as wgpu::BufferAddress,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x2,
            },
            // color
            wgpu::VertexAttribute {
                offset: std::mem::offset_of!(Vertex, color) as wgpu::BufferAddress,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x4,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_covers_whole_vertex() {
        let layout = vertex_layout();
        assert_eq!(layout.array_stride, 32);
        let last = layout.attributes.last().unwrap();
        assert_eq!(last.offset + last.format.size(), layout.array_stride);
    }

    #[test]
    fn locations_are_sequential() {
        let layout = vertex_layout();
        for (i, attr) in layout.attributes.iter().enumerate() {
            assert_eq!(attr.shader_location, i as u32);
        }
    }
}
