//! Rendering module
//!
//! The adapter turns scene state into an ordered `DrawList`; `shapes` can
//! tessellate that list into GPU vertices for surfaces that want triangles.

pub mod adapter;
pub mod primitives;
pub mod shapes;
pub mod vertex;

pub use adapter::render;
pub use primitives::{DrawList, DrawPrimitive, Gradient, Layer, Rect, Shape};
pub use shapes::tessellate;
pub use vertex::Vertex;
