//! Per-entity integration
//!
//! Every scene uses this one pipeline. The step order is fixed:
//! constant force, tilt, shake, touch, damping + speed clamp, position, boundary.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::params::{BoundaryPolicy, SceneParams};
use super::state::Entity;
use super::touch::TouchField;
use crate::consts::TARGET_HZ;

/// Forces shared by every entity during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Forces {
    /// Constant acceleration (gravity / drift)
    pub constant: Vec2,
    /// Tilt acceleration
    pub tilt: Vec2,
    /// Shake magnitude past the threshold (0 = no shake this tick)
    pub shake: f32,
    pub touch: Option<TouchField>,
}

/// Tilt acceleration; exactly zero under reduced motion
pub fn tilt_force(tilt: Vec2, gain: f32, reduce_motion: bool) -> Vec2 {
    if reduce_motion || !tilt.is_finite() {
        return Vec2::ZERO;
    }
    tilt.clamp(Vec2::splat(-1.0), Vec2::splat(1.0)) * gain
}

/// Shake magnitude that triggers impulses, or 0 below the threshold
pub fn active_shake(shake: f32, threshold: f32) -> f32 {
    if shake.is_finite() && shake > threshold {
        shake
    } else {
        0.0
    }
}

/// Random-direction impulse scaled by shake magnitude, sized for one
/// frame at `TARGET_HZ`
pub fn shake_impulse<R: Rng + ?Sized>(rng: &mut R, shake: f32, gain: f32) -> Vec2 {
    if shake <= 0.0 {
        return Vec2::ZERO;
    }
    let angle = rng.random_range(0.0..TAU);
    let scale = rng.random_range(0.5..1.0);
    Vec2::new(angle.cos(), angle.sin()) * gain * shake * scale
}

/// Advance one entity by `dt`
pub fn integrate<R: Rng + ?Sized>(
    entity: &mut Entity,
    params: &SceneParams,
    forces: &Forces,
    viewport: Vec2,
    rng: &mut R,
    dt: f32,
) {
    // 1. Constant force
    entity.vel += forces.constant * dt;

    // 2. Tilt
    entity.vel += forces.tilt * dt;

    // 3. Shake, scaled to the step so the kick per second is rate-independent
    if dt > 0.0 {
        entity.vel += shake_impulse(rng, forces.shake, params.shake_gain) * (dt * TARGET_HZ);
    }

    // 4. Touch
    if let Some(touch) = &forces.touch {
        entity.vel += touch.acceleration(entity.pos) * dt;
    }

    // 5. Damping, then speed clamp
    entity.vel *= (1.0 - params.damping * dt).max(0.0);
    entity.vel = entity.vel.clamp_length_max(params.max_speed.max(0.0));

    // 6. Position
    entity.pos += entity.vel * dt;

    // 7. Boundary
    apply_boundary(entity, params.boundary, viewport);
}

/// Apply a boundary policy against a `viewport` anchored at the origin
pub fn apply_boundary(entity: &mut Entity, policy: BoundaryPolicy, viewport: Vec2) {
    let r = entity.radius;
    match policy {
        BoundaryPolicy::Bounce { restitution } => {
            bounce_axis(&mut entity.pos.x, &mut entity.vel.x, r, viewport.x, restitution);
            bounce_axis(&mut entity.pos.y, &mut entity.vel.y, r, viewport.y, restitution);
        }
        BoundaryPolicy::Wrap => {
            wrap_axis(&mut entity.pos.x, viewport.x);
            wrap_axis(&mut entity.pos.y, viewport.y);
        }
        BoundaryPolicy::SoftClamp { inward } => {
            soft_clamp_axis(&mut entity.pos.x, &mut entity.vel.x, r, viewport.x, inward);
            soft_clamp_axis(&mut entity.pos.y, &mut entity.vel.y, r, viewport.y, inward);
        }
        BoundaryPolicy::Remove => {}
    }
}

/// Allowed center range on one axis; collapses to the middle if too small
fn axis_bounds(radius: f32, size: f32) -> (f32, f32) {
    if size >= 2.0 * radius {
        (radius, size - radius)
    } else {
        (size / 2.0, size / 2.0)
    }
}

fn bounce_axis(pos: &mut f32, vel: &mut f32, radius: f32, size: f32, restitution: f32) {
    let (lo, hi) = axis_bounds(radius, size);
    if *pos < lo {
        *pos = lo;
        *vel = vel.abs() * restitution;
    } else if *pos > hi {
        *pos = hi;
        *vel = -vel.abs() * restitution;
    }
}

fn wrap_axis(pos: &mut f32, size: f32) {
    if size <= 0.0 {
        return;
    }
    // Only strictly outside; an entity sitting on the edge stays put
    if *pos < 0.0 || *pos > size {
        *pos = pos.rem_euclid(size);
    }
}

fn soft_clamp_axis(pos: &mut f32, vel: &mut f32, radius: f32, size: f32, inward: f32) {
    let (lo, hi) = axis_bounds(radius, size);
    if *pos < lo {
        *pos = lo;
        *vel = vel.abs() * inward;
    } else if *pos > hi {
        *pos = hi;
        *vel = -vel.abs() * inward;
    }
}
