//! Draw primitives handed to the platform canvas
//!
//! Back-to-front order is part of the contract: glow behind bodies, highlights
//! in front.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::with_alpha;

/// Paint layer, drawn in ascending order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Layer {
    Glow,
    Body,
    Highlight,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Filled circle inscribed in the bounds
    Circle,
    /// Filled ellipse inscribed in the bounds
    Ellipse,
    /// Stroked circle; `thickness` extends inward from the bounds
    Ring { thickness: f32 },
}

/// Axis-aligned bounding rectangle (top-left origin)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn from_center(center: Vec2, half: Vec2) -> Self {
        Self {
            x: center.x - half.x,
            y: center.y - half.y,
            w: half.x * 2.0,
            h: half.y * 2.0,
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.w / 2.0, self.h / 2.0)
    }
}

/// Radial gradient from the center to the edge of the shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gradient {
    pub inner: [f32; 4],
    pub outer: [f32; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawPrimitive {
    pub layer: Layer,
    pub shape: Shape,
    pub bounds: Rect,
    pub color: [f32; 4],
    pub gradient: Option<Gradient>,
}

impl DrawPrimitive {
    pub fn circle(layer: Layer, center: Vec2, radius: f32, color: [f32; 4]) -> Self {
        Self {
            layer,
            shape: Shape::Circle,
            bounds: Rect::from_center(center, Vec2::splat(radius)),
            color,
            gradient: None,
        }
    }

    pub fn ellipse(layer: Layer, center: Vec2, radii: Vec2, color: [f32; 4]) -> Self {
        Self {
            layer,
            shape: Shape::Ellipse,
            bounds: Rect::from_center(center, radii),
            color,
            gradient: None,
        }
    }

    pub fn ring(layer: Layer, center: Vec2, radius: f32, thickness: f32, color: [f32; 4]) -> Self {
        Self {
            layer,
            shape: Shape::Ring {
                thickness: thickness.min(radius).max(0.0),
            },
            bounds: Rect::from_center(center, Vec2::splat(radius)),
            color,
            gradient: None,
        }
    }

    pub fn with_gradient(mut self, inner: [f32; 4], outer: [f32; 4]) -> Self {
        self.gradient = Some(Gradient { inner, outer });
        self
    }

    /// Fully transparent primitives can be skipped by the canvas
    pub fn is_visible(&self) -> bool {
        let gradient_alpha = self
            .gradient
            .map(|g| g.inner[3].max(g.outer[3]))
            .unwrap_or(0.0);
        self.color[3] > 0.0 || gradient_alpha > 0.0
    }

    fn scale_alpha(&mut self, factor: f32) {
        self.color = with_alpha(self.color, factor);
        if let Some(g) = self.gradient.as_mut() {
            g.inner = with_alpha(g.inner, factor);
            g.outer = with_alpha(g.outer, factor);
        }
    }
}

/// Ordered list of primitives for one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawList {
    primitives: Vec<DrawPrimitive>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            primitives: Vec::with_capacity(capacity),
        }
    }

    /// Queue a primitive; invisible ones are dropped
    pub fn push(&mut self, primitive: DrawPrimitive) {
        if primitive.is_visible() {
            self.primitives.push(primitive);
        }
    }

    /// Stable sort by layer, keeping submission order within a layer
    pub fn sort_layers(&mut self) {
        self.primitives.sort_by_key(|p| p.layer);
    }

    /// Multiply every alpha by `factor` (wind-down dimming)
    pub fn dim(&mut self, factor: f32) {
        let factor = factor.clamp(0.0, 1.0);
        if factor >= 1.0 {
            return;
        }
        for p in self.primitives.iter_mut() {
            p.scale_alpha(factor);
        }
    }

    pub fn primitives(&self) -> &[DrawPrimitive] {
        &self.primitives
    }

    pub fn iter(&self) -> impl Iterator<Item = &DrawPrimitive> {
        self.primitives.iter()
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_layers_is_stable() {
        let mut list = DrawList::new();
        list.push(DrawPrimitive::circle(Layer::Highlight, Vec2::ZERO, 1.0, [1.0; 4]));
        list.push(DrawPrimitive::circle(Layer::Body, Vec2::new(1.0, 0.0), 1.0, [1.0; 4]));
        list.push(DrawPrimitive::circle(Layer::Glow, Vec2::ZERO, 1.0, [1.0; 4]));
        list.push(DrawPrimitive::circle(Layer::Body, Vec2::new(2.0, 0.0), 1.0, [1.0; 4]));
        list.sort_layers();

        let layers: Vec<_> = list.iter().map(|p| p.layer).collect();
        assert_eq!(layers, vec![Layer::Glow, Layer::Body, Layer::Body, Layer::Highlight]);
        assert_eq!(list.primitives()[1].bounds.center().x, 1.0);
        assert_eq!(list.primitives()[2].bounds.center().x, 2.0);
    }

    #[test]
    fn test_invisible_dropped() {
        let mut list = DrawList::new();
        list.push(DrawPrimitive::circle(Layer::Body, Vec2::ZERO, 1.0, [1.0, 1.0, 1.0, 0.0]));
        assert!(list.is_empty());

        list.push(
            DrawPrimitive::circle(Layer::Glow, Vec2::ZERO, 1.0, [1.0, 1.0, 1.0, 0.0])
                .with_gradient([1.0, 1.0, 1.0, 0.3], [1.0, 1.0, 1.0, 0.0]),
        );
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_dim_scales_gradients() {
        let mut list = DrawList::new();
        list.push(
            DrawPrimitive::circle(Layer::Body, Vec2::ZERO, 1.0, [1.0, 1.0, 1.0, 0.8])
                .with_gradient([1.0, 1.0, 1.0, 0.5], [1.0, 1.0, 1.0, 1.0]),
        );
        list.dim(0.5);
        let p = list.primitives()[0];
        assert!((p.color[3] - 0.4).abs() < 1e-6);
        let g = p.gradient.unwrap();
        assert!((g.inner[3] - 0.25).abs() < 1e-6);
        assert!((g.outer[3] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_rect_roundtrip_center() {
        let r = Rect::from_center(Vec2::new(10.0, 20.0), Vec2::new(3.0, 4.0));
        assert_eq!(r.center(), Vec2::new(10.0, 20.0));
        assert_eq!(r.half_extents(), Vec2::new(3.0, 4.0));
        assert_eq!(r.w, 6.0);
    }

    #[test]
    fn test_ring_thickness_bounded() {
        let p = DrawPrimitive::ring(Layer::Body, Vec2::ZERO, 5.0, 9.0, [1.0; 4]);
        assert_eq!(p.shape, Shape::Ring { thickness: 5.0 });
    }

    #[test]
    fn test_json_has_layers() {
        let mut list = DrawList::new();
        list.push(DrawPrimitive::circle(Layer::Glow, Vec2::ZERO, 2.0, [1.0; 4]));
        let json = list.to_json().unwrap();
        assert!(json.contains("\"Glow\""));
        assert!(json.contains("\"Circle\""));
    }
}
