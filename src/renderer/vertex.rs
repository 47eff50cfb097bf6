//! Tessellated vertex format shared with the GPU surface

use bytemuck::{Pod, Zeroable};

/// Position in viewport points plus straight (non-premultiplied) RGBA
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4];

    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    /// Buffer layout for a triangle list of `Vertex`
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Shared scene colors
pub mod colors {
    pub const TRANSPARENT: [f32; 4] = [1.0, 1.0, 1.0, 0.0];
    pub const HIGHLIGHT: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    /// Warm white used for touch markers
    pub const GLOW: [f32; 4] = [1.0, 0.95, 0.85, 1.0];
    /// Night-sky backdrop the platform clears to
    pub const BACKGROUND: [f32; 4] = [0.03, 0.04, 0.09, 1.0];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layout_matches_struct() {
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
        let layout = Vertex::desc();
        assert_eq!(layout.array_stride, 24);
        assert_eq!(layout.attributes.len(), 2);
        assert_eq!(layout.attributes[1].offset, 8);
        assert_eq!(layout.attributes[1].format, wgpu::VertexFormat::Float32x4);
        assert_eq!(layout.attributes[1].shader_location, 1);
    }

    #[test]
    fn test_vertices_cast_to_bytes() {
        let verts = [Vertex::new(1.0, 2.0, colors::GLOW); 3];
        let bytes: &[u8] = bytemuck::cast_slice(&verts);
        assert_eq!(bytes.len(), 72);
    }
}
