//! Scene state and core simulation types
//!
//! A `SceneSimulation` is built when a scene becomes active and dropped when it
//! goes away. It owns everything the scene needs; there are no globals.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::driver::FrameDriver;
use super::params::SceneParams;
use super::pool::EntityPool;
use super::tick::{TickInput, tick};
use super::touch::{GlowTrail, InteractionPoint};
use crate::consts::*;
use crate::scenes::SceneKind;
use crate::settings::Settings;

/// A simulated particle, bubble, snowflake, ball...
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub color: [f32; 4],
    /// Seconds since spawn
    pub age: f32,
    /// Seconds until culled (`f32::INFINITY` = immortal)
    pub lifetime: f32,
    /// Wobble phase (radians)
    pub phase: f32,
    pub hue: f32,
    /// Pop animation progress; `Some` once popping started
    pub pop: Option<f32>,
    /// Fading out after a capacity drop
    #[serde(default)]
    pub retiring: bool,
}

impl Entity {
    pub fn new(id: u32, pos: Vec2, vel: Vec2, radius: f32, color: [f32; 4]) -> Self {
        Self {
            id,
            pos,
            vel,
            radius: radius.max(MIN_RADIUS),
            color,
            age: 0.0,
            lifetime: f32::INFINITY,
            phase: 0.0,
            hue: 0.0,
            pop: None,
            retiring: false,
        }
    }

    pub fn with_lifetime(mut self, lifetime: f32) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn is_immortal(&self) -> bool {
        self.lifetime.is_infinite()
    }

    /// Opacity multiplier: fades over the last part of a finite life
    pub fn fade(&self) -> f32 {
        if self.retiring {
            return ((self.lifetime - self.age) / RETIRE_FADE).clamp(0.0, 1.0);
        }
        if !self.lifetime.is_finite() || self.lifetime <= 0.0 {
            return 1.0;
        }
        let remaining = (self.lifetime - self.age) / self.lifetime;
        (remaining / FADE_FRACTION).clamp(0.0, 1.0)
    }

    /// Fade out over `RETIRE_FADE` seconds from now
    pub fn retire(&mut self) {
        if !self.retiring {
            self.lifetime = self.age + RETIRE_FADE;
            self.retiring = true;
        }
    }

    /// Start popping (no-op if already popping)
    pub fn start_pop(&mut self) {
        if self.pop.is_none() {
            self.pop = Some(0.0);
        }
    }

    /// Pop animation has finished
    pub fn pop_finished(&self) -> bool {
        matches!(self.pop, Some(p) if p >= 1.0)
    }

    pub fn is_finite(&self) -> bool {
        self.pos.is_finite() && self.vel.is_finite() && self.radius.is_finite()
    }
}

/// One active scene: entity pool, clock, rng and input slots
#[derive(Debug, Clone)]
pub struct SceneSimulation {
    pub kind: SceneKind,
    pub params: SceneParams,
    pub pool: EntityPool,
    pub rng: Pcg32,
    /// Viewport size in points (zero during initial layout)
    pub viewport: Vec2,
    /// Current touch, written by input handlers
    pub interaction: InteractionPoint,
    /// Taps waiting for the next tick
    pub pending_taps: Vec<Vec2>,
    pub glow_trail: GlowTrail,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Scaled simulation time (seconds)
    pub elapsed: f32,
    /// Pool has been filled to capacity once
    pub prefilled: bool,
    driver: FrameDriver,
}

impl SceneSimulation {
    pub fn new(kind: SceneKind, seed: u64) -> Self {
        Self::with_params(kind, kind.params(), seed)
    }

    /// Build a scene with custom parameters (tests, tuning)
    pub fn with_params(kind: SceneKind, params: SceneParams, seed: u64) -> Self {
        Self {
            kind,
            params,
            pool: EntityPool::new(),
            rng: Pcg32::seed_from_u64(seed),
            viewport: Vec2::ZERO,
            interaction: InteractionPoint::default(),
            pending_taps: Vec::new(),
            glow_trail: GlowTrail::new(),
            time_ticks: 0,
            elapsed: 0.0,
            prefilled: false,
            driver: FrameDriver::new(),
        }
    }

    /// Update viewport size; negative or non-finite sizes count as zero
    pub fn resize(&mut self, width: f32, height: f32) {
        let sanitize = |v: f32| if v.is_finite() { v.max(0.0) } else { 0.0 };
        self.viewport = Vec2::new(sanitize(width), sanitize(height));
    }

    /// Zero-area viewports short-circuit spawn, update and draw
    pub fn has_viewport(&self) -> bool {
        self.viewport.x > 0.0 && self.viewport.y > 0.0
    }

    /// Touch down: becomes the interaction point and queues a tap
    pub fn touch_began(&mut self, point: Vec2) {
        if !self.has_viewport() {
            return;
        }
        if self.interaction.set(point, self.viewport) {
            self.pending_taps.push(point);
            if self.params.glow_trail {
                self.glow_trail.record(point);
            }
        }
    }

    /// Touch drag: moves the interaction point
    pub fn touch_moved(&mut self, point: Vec2) {
        if !self.has_viewport() {
            return;
        }
        if self.interaction.set(point, self.viewport) && self.params.glow_trail {
            self.glow_trail.record(point);
        }
    }

    pub fn touch_ended(&mut self) {
        self.interaction.clear();
    }

    /// Advance one display frame at timestamp `now` (seconds).
    ///
    /// Returns the scaled step that was simulated.
    pub fn frame(&mut self, now: f64, settings: &Settings, input: &TickInput) -> f32 {
        let dt = self.driver.frame_dt(now, input.animation_speed);
        tick(self, settings, input, dt);
        dt
    }

    /// Forget the previous frame time (e.g. after the view was hidden)
    pub fn reset_clock(&mut self) {
        self.driver.reset();
    }

    pub fn entities(&self) -> &[Entity] {
        self.pool.entities()
    }
}
