//! CPU side of the batched vertex renderer.
//!
//! `VertexBatch` is a fixed-capacity, append-only list of triangle vertices.
//! The GPU buffer mirroring it lives in `quadlab_render` and is allocated once
//! at `VERTEX_CAPACITY`; syncing uploads only the populated prefix.

use glam::{Vec2, Vec4};

pub const VERTEX_CAPACITY: usize = 8 * 1024;

pub const CHECKER_EVEN: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);
pub const CHECKER_ODD: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub tex_coords: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub fn new(position: Vec2, tex_coords: Vec2, color: Vec4) -> Self {
        Self {
            position: position.to_array(),
            tex_coords: tex_coords.to_array(),
            color: color.to_array(),
        }
    }
}

pub struct VertexBatch {
    vertices: Vec<Vertex>,
}

impl VertexBatch {
    pub fn new() -> Self {
        Self {
            vertices: Vec::with_capacity(VERTEX_CAPACITY),
        }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn remaining(&self) -> usize {
        VERTEX_CAPACITY - self.vertices.len()
    }

    /// Populated prefix, in push order.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Drop all vertices so the geometry can be rebuilt. Capacity is kept.
    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    /// Append one vertex.
    ///
    /// # Panics
    /// When the batch already holds `VERTEX_CAPACITY` vertices. The scene was
    /// sized wrong; this is not a recoverable condition.
    pub fn push_vertex(&mut self, position: Vec2, tex_coords: Vec2, color: Vec4) {
        assert!(
            self.vertices.len() < VERTEX_CAPACITY,
            "vertex batch overflow: capacity is {VERTEX_CAPACITY} vertices"
        );
        self.vertices.push(Vertex::new(position, tex_coords, color));
    }

    /// Two triangles covering the rectangle spanned by `p1` and `p2`.
    /// `p1` gets uv (0,0) and `p2` gets uv (1,1).
    pub fn push_quad(&mut self, p1: Vec2, p2: Vec2, color: Vec4) {
        let a = p1;
        let b = Vec2::new(p2.x, p1.y);
        let c = Vec2::new(p1.x, p2.y);
        let d = p2;

        self.push_vertex(a, Vec2::new(0.0, 0.0), color);
        self.push_vertex(b, Vec2::new(1.0, 0.0), color);
        self.push_vertex(c, Vec2::new(0.0, 1.0), color);

        self.push_vertex(b, Vec2::new(1.0, 0.0), color);
        self.push_vertex(c, Vec2::new(0.0, 1.0), color);
        self.push_vertex(d, Vec2::new(1.0, 1.0), color);
    }

    /// Split clip space [-1,1]x[-1,1] into an `n`x`n` grid of quads colored by
    /// cell parity.
    pub fn push_checkerboard(&mut self, n: u32) {
        let cell = 2.0 / n as f32;
        for y in 0..n {
            for x in 0..n {
                let p1 = Vec2::new(-1.0 + x as f32 * cell, -1.0 + y as f32 * cell);
                let p2 = Vec2::new(-1.0 + (x + 1) as f32 * cell, -1.0 + (y + 1) as f32 * cell);
                let color = if (x + y) % 2 == 0 {
                    CHECKER_EVEN
                } else {
                    CHECKER_ODD
                };
                self.push_quad(p1, p2, color);
            }
        }
    }

    /// Vertices needed for an `n`x`n` checkerboard.
    pub fn checkerboard_len(n: u32) -> usize {
        (n as usize).saturating_mul(n as usize).saturating_mul(6)
    }
}

impl Default for VertexBatch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pos(v: &Vertex) -> Vec2 {
        Vec2::from_array(v.position)
    }

    fn uv(v: &Vertex) -> Vec2 {
        Vec2::from_array(v.tex_coords)
    }

    #[test]
    fn vertex_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
        assert_eq!(std::mem::offset_of!(Vertex, tex_coords), 8);
        assert_eq!(std::mem::offset_of!(Vertex, color), 16);
    }

    #[test]
    fn new_batch_is_empty() {
        let batch = VertexBatch::new();
        assert!(batch.is_empty());
        assert_eq!(batch.remaining(), VERTEX_CAPACITY);
    }

    #[test]
    fn full_screen_quad_matches_corners() {
        let mut batch = VertexBatch::new();
        batch.push_quad(Vec2::new(-1.0, -1.0), Vec2::new(1.0, 1.0), Vec4::ZERO);
        let v = batch.vertices();
        assert_eq!(v.len(), 6);
        assert_eq!(pos(&v[0]), Vec2::new(-1.0, -1.0));
        assert_eq!(pos(&v[5]), Vec2::new(1.0, 1.0));
        assert_eq!(uv(&v[1]), Vec2::new(1.0, 0.0));
        assert_eq!(uv(&v[2]), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn fill_to_capacity_then_overflow_panics() {
        let mut batch = VertexBatch::new();
        for _ in 0..VERTEX_CAPACITY {
            batch.push_vertex(Vec2::ZERO, Vec2::ZERO, Vec4::ONE);
        }
        assert_eq!(batch.len(), VERTEX_CAPACITY);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            batch.push_vertex(Vec2::ZERO, Vec2::ZERO, Vec4::ONE);
        }));
        assert!(result.is_err());
    }

    #[test]
    #[should_panic(expected = "vertex batch overflow")]
    fn quad_crossing_capacity_panics() {
        let mut batch = VertexBatch::new();
        for _ in 0..VERTEX_CAPACITY - 3 {
            batch.push_vertex(Vec2::ZERO, Vec2::ZERO, Vec4::ONE);
        }
        batch.push_quad(Vec2::ZERO, Vec2::ONE, Vec4::ONE);
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut batch = VertexBatch::new();
        batch.push_checkerboard(2);
        batch.clear();
        assert!(batch.is_empty());
        assert_eq!(batch.remaining(), VERTEX_CAPACITY);
    }

    #[test]
    fn checkerboard_of_one_covers_clip_space() {
        let mut batch = VertexBatch::new();
        batch.push_checkerboard(1);
        let v = batch.vertices();
        assert_eq!(v.len(), 6);
        assert_eq!(pos(&v[0]), Vec2::new(-1.0, -1.0));
        assert_eq!(pos(&v[5]), Vec2::new(1.0, 1.0));
        assert_eq!(v[0].color, CHECKER_EVEN.to_array());
    }

    proptest! {
        #[test]
        fn quad_layout_holds_for_any_rectangle(
            x1 in -10.0f32..10.0, y1 in -10.0f32..10.0,
            x2 in -10.0f32..10.0, y2 in -10.0f32..10.0,
            r in 0.0f32..1.0, g in 0.0f32..1.0, b in 0.0f32..1.0, a in 0.0f32..1.0,
        ) {
            let p1 = Vec2::new(x1, y1);
            let p2 = Vec2::new(x2, y2);
            let color = Vec4::new(r, g, b, a);
            let mut batch = VertexBatch::new();
            batch.push_quad(p1, p2, color);

            let v = batch.vertices();
            prop_assert_eq!(v.len(), 6);

            let b_corner = Vec2::new(p2.x, p1.y);
            let c_corner = Vec2::new(p1.x, p2.y);
            let expected_pos = [p1, b_corner, c_corner, b_corner, c_corner, p2];
            let expected_uv = [
                Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0),
                Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0), Vec2::new(1.0, 1.0),
            ];
            for i in 0..6 {
                prop_assert_eq!(pos(&v[i]), expected_pos[i]);
                prop_assert_eq!(uv(&v[i]), expected_uv[i]);
                prop_assert_eq!(v[i].color, color.to_array());
            }
        }

        #[test]
        fn checkerboard_counts_and_parity(n in 1u32..=36) {
            let mut batch = VertexBatch::new();
            batch.push_checkerboard(n);
            prop_assert_eq!(batch.len(), VertexBatch::checkerboard_len(n));

            let quads: Vec<&[Vertex]> = batch.vertices().chunks(6).collect();
            prop_assert_eq!(quads.len(), (n * n) as usize);
            for (i, quad) in quads.iter().enumerate() {
                let x = i as u32 % n;
                let y = i as u32 / n;
                let expected = if (x + y) % 2 == 0 { CHECKER_EVEN } else { CHECKER_ODD };
                for vertex in quad.iter() {
                    prop_assert_eq!(vertex.color, expected.to_array());
                }
            }
        }
    }
}
