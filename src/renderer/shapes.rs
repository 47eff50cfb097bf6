//! Triangle tessellation of draw primitives

use glam::Vec2;
use std::f32::consts::PI;

use super::primitives::{DrawList, DrawPrimitive, Shape};
use super::vertex::Vertex;

/// Tessellate a whole draw list into one triangle list, preserving order
pub fn tessellate(list: &DrawList, segments: u32) -> Vec<Vertex> {
    let segments = segments.max(3);
    let mut vertices = Vec::with_capacity(list.len() * segments as usize * 3);
    for primitive in list.iter() {
        vertices.extend(primitive_vertices(primitive, segments));
    }
    vertices
}

/// Vertices for one primitive
pub fn primitive_vertices(primitive: &DrawPrimitive, segments: u32) -> Vec<Vertex> {
    let center = primitive.bounds.center();
    let radii = primitive.bounds.half_extents();
    let (inner, outer) = match primitive.gradient {
        Some(g) => (g.inner, g.outer),
        None => (primitive.color, primitive.color),
    };

    match primitive.shape {
        Shape::Circle | Shape::Ellipse => ellipse(center, radii, inner, outer, segments),
        Shape::Ring { thickness } => {
            let inner_radii = (radii - Vec2::splat(thickness)).max(Vec2::ZERO);
            ring(center, inner_radii, radii, primitive.color, segments)
        }
    }
}

/// Point on an ellipse at parameter `theta`
#[inline]
fn on_ellipse(center: Vec2, radii: Vec2, theta: f32) -> Vec2 {
    Vec2::new(center.x + radii.x * theta.cos(), center.y + radii.y * theta.sin())
}

/// Generate vertices for a filled ellipse (circle when radii are equal).
///
/// `inner` colors the center, `outer` the rim, giving a radial gradient.
pub fn ellipse(
    center: Vec2,
    radii: Vec2,
    inner: [f32; 4],
    outer: [f32; 4],
    segments: u32,
) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;
        let p1 = on_ellipse(center, radii, theta1);
        let p2 = on_ellipse(center, radii, theta2);

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, inner));
        vertices.push(Vertex::new(p1.x, p1.y, outer));
        vertices.push(Vertex::new(p2.x, p2.y, outer));
    }

    vertices
}

/// Generate vertices for a ring band between two sets of radii
pub fn ring(
    center: Vec2,
    inner_radii: Vec2,
    outer_radii: Vec2,
    color: [f32; 4],
    segments: u32,
) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 6) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        let inner1 = on_ellipse(center, inner_radii, theta1);
        let outer1 = on_ellipse(center, outer_radii, theta1);
        let inner2 = on_ellipse(center, inner_radii, theta2);
        let outer2 = on_ellipse(center, outer_radii, theta2);

        // Two triangles per segment
        vertices.push(Vertex::new(inner1.x, inner1.y, color));
        vertices.push(Vertex::new(outer1.x, outer1.y, color));
        vertices.push(Vertex::new(inner2.x, inner2.y, color));

        vertices.push(Vertex::new(inner2.x, inner2.y, color));
        vertices.push(Vertex::new(outer1.x, outer1.y, color));
        vertices.push(Vertex::new(outer2.x, outer2.y, color));
    }

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::primitives::Layer;

    #[test]
    fn test_vertex_counts() {
        let mut list = DrawList::new();
        list.push(DrawPrimitive::circle(Layer::Body, Vec2::ZERO, 5.0, [1.0; 4]));
        list.push(DrawPrimitive::ring(Layer::Body, Vec2::ZERO, 5.0, 1.0, [1.0; 4]));
        let verts = tessellate(&list, 16);
        assert_eq!(verts.len(), 16 * 3 + 16 * 6);
    }

    #[test]
    fn test_segments_floor() {
        let mut list = DrawList::new();
        list.push(DrawPrimitive::circle(Layer::Body, Vec2::ZERO, 5.0, [1.0; 4]));
        assert_eq!(tessellate(&list, 0).len(), 9);
    }

    #[test]
    fn test_gradient_center_and_rim() {
        let p = DrawPrimitive::circle(Layer::Glow, Vec2::new(10.0, 10.0), 4.0, [0.0; 4])
            .with_gradient([1.0, 0.0, 0.0, 0.5], [0.0, 0.0, 1.0, 0.0]);
        let verts = primitive_vertices(&p, 8);
        assert_eq!(verts[0].position, [10.0, 10.0]);
        assert_eq!(verts[0].color, [1.0, 0.0, 0.0, 0.5]);
        assert_eq!(verts[1].color, [0.0, 0.0, 1.0, 0.0]);
        assert!((verts[1].position[0] - 14.0).abs() < 1e-4);
    }

    #[test]
    fn test_ellipse_respects_radii() {
        let verts = ellipse(Vec2::ZERO, Vec2::new(6.0, 2.0), [1.0; 4], [1.0; 4], 4);
        let max_x = verts.iter().map(|v| v.position[0].abs()).fold(0.0f32, f32::max);
        let max_y = verts.iter().map(|v| v.position[1].abs()).fold(0.0f32, f32::max);
        assert!((max_x - 6.0).abs() < 1e-4);
        assert!((max_y - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_ring_band_between_radii() {
        let p = DrawPrimitive::ring(Layer::Body, Vec2::ZERO, 10.0, 2.0, [1.0; 4]);
        for v in primitive_vertices(&p, 12) {
            let r = Vec2::from(v.position).length();
            assert!((8.0 - 1e-3..=10.0 + 1e-3).contains(&r));
        }
    }
}
