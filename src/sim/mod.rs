//! Scene simulation engine
//!
//! Everything here is headless and deterministic for a given seed and input:
//! - Frame steps come from a `TickSource`, clamped by `SimClock`
//! - Seeded RNG only
//! - Entities iterate in spawn order
//! - No rendering or platform dependencies

pub mod clock;
pub mod driver;
pub mod integrator;
pub mod params;
pub mod pool;
pub mod state;
pub mod tick;
pub mod touch;

pub use clock::SimClock;
pub use driver::{FrameDriver, ScriptedTicks, TickSource, pump};
pub use integrator::{Forces, integrate, tilt_force};
pub use params::{BoundaryPolicy, SceneParams, Span, SpawnEdge, SpawnParams, TouchParams};
pub use pool::{EntityPool, capacity, is_battery_low};
pub use state::{Entity, SceneSimulation};
pub use tick::{TickInput, scene_capacity, tick};
pub use touch::{GlowTrail, InteractionPoint, TouchField, TouchInteraction, in_dead_zone};
