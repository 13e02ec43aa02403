use quadlab_core::{Vertex, VertexBatch, VERTEX_CAPACITY};

/// Size of the GPU vertex buffer. Allocated once; never grows.
pub const VERTEX_BUFFER_BYTES: wgpu::BufferAddress =
    (VERTEX_CAPACITY * std::mem::size_of::<Vertex>()) as wgpu::BufferAddress;

/// A `VertexBatch` together with the GPU buffer it is mirrored into.
pub struct GpuVertexBatch {
    batch: VertexBatch,
    buffer: wgpu::Buffer,
    synced_len: usize,
}

impl GpuVertexBatch {
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Quad Vertex Buffer"),
            size: VERTEX_BUFFER_BYTES,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self {
            batch: VertexBatch::new(),
            buffer,
            synced_len: 0,
        }
    }

    pub fn batch(&self) -> &VertexBatch {
        &self.batch
    }

    /// Mutations are not visible to the GPU until `sync`.
    pub fn batch_mut(&mut self) -> &mut VertexBatch {
        &mut self.batch
    }

    /// Upload the populated prefix. Bytes past it keep whatever they held.
    pub fn sync(&mut self, queue: &wgpu::Queue) {
        let vertices = self.batch.vertices();
        if !vertices.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(vertices));
        }
        self.synced_len = vertices.len();
        log::debug!("Synced {} vertices to the GPU", self.synced_len);
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Vertex count as of the last `sync`.
    pub fn synced_len(&self) -> u32 {
        self.synced_len as u32
    }
}
