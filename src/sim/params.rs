//! Per-scene simulation parameters
//!
//! Every scene runs the same integrator and pool; only these numbers differ.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::touch::TouchInteraction;

/// Uniform sampling range `[min, max)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// A degenerate span that always yields `value`
    pub const fn fixed(value: f32) -> Self {
        Self { min: value, max: value }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.max > self.min {
            rng.random_range(self.min..self.max)
        } else {
            self.min
        }
    }
}

/// Where ambient entities appear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnEdge {
    /// Just below the bottom edge (rising entities)
    Bottom,
    /// Just above the top edge (falling entities)
    Top,
    /// Uniformly inside the viewport
    Anywhere,
}

/// What happens when an entity reaches the viewport edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BoundaryPolicy {
    /// Reflect velocity, scaled by restitution
    Bounce { restitution: f32 },
    /// Reappear on the opposite edge
    Wrap,
    /// Pin to the edge with a reduced inward velocity
    SoftClamp { inward: f32 },
    /// Leave the viewport and get culled
    Remove,
}

/// Touch response of a scene
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchParams {
    pub mode: TouchInteraction,
    /// Radius before the sensitivity multiplier (points)
    pub base_radius: f32,
    /// Peak acceleration (points/s²)
    pub strength: f32,
}

/// Spawn policy ranges
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnParams {
    pub edge: SpawnEdge,
    /// Per-tick probability of an ambient spawn
    pub chance: f32,
    /// Entities per successful ambient spawn
    pub batch: u32,
    pub vx: Span,
    pub vy: Span,
    pub radius: Span,
    /// `None` = immortal
    pub lifetime: Option<Span>,
    pub hue: Span,
    pub saturation: f32,
    pub lightness: f32,
    pub alpha: Span,
    /// Entities per tap
    pub burst_count: u32,
    /// Burst cluster radius before the sensitivity multiplier
    pub burst_spread: f32,
    /// Outward speed of burst entities
    pub burst_speed: Span,
    pub burst_radius: Span,
    /// Burst entities always die so the pool shrinks back under capacity
    pub burst_lifetime: Span,
    /// Fill to capacity on the first tick with a real viewport
    pub prefill: bool,
}

/// Full parameter set for one scene
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneParams {
    /// Entity count at normal density
    pub base_count: u32,
    /// Constant acceleration (points/s², y down)
    pub gravity: Vec2,
    /// Velocity damping rate (1/s)
    pub damping: f32,
    pub max_speed: f32,
    /// Acceleration at full tilt
    pub tilt_gain: f32,
    /// Shake magnitude that must be exceeded before impulses apply
    pub shake_threshold: f32,
    pub shake_gain: f32,
    pub touch: Option<TouchParams>,
    pub boundary: BoundaryPolicy,
    pub spawn: SpawnParams,
    /// Wobble phase speed (radians/s)
    pub wobble_rate: f32,
    /// Radius growth (points/s), e.g. expanding ripples
    pub growth_rate: f32,
    /// Taps pop the entities under them
    pub pop_on_touch: bool,
    /// Record touch markers for rendering
    pub glow_trail: bool,
}
