//! Per-frame simulation tick
//!
//! Consumes deferred input, evaluates capacity, spawns, integrates and culls.
//! Settings are pulled fresh every call so changes apply on the next frame.

use std::f32::consts::TAU;

use glam::Vec2;

use super::integrator::{Forces, active_shake, integrate, tilt_force};
use super::params::SceneParams;
use super::pool::capacity;
use super::state::SceneSimulation;
use super::touch::{TouchField, effective_radius, in_dead_zone};
use crate::consts::*;
use crate::settings::Settings;

/// Device input sampled once per frame
#[derive(Debug, Clone)]
pub struct TickInput {
    /// Normalized gravity vector from the accelerometer, each axis in [-1, 1]
    pub tilt: Vec2,
    /// Instantaneous shake magnitude (>= 0)
    pub shake: f32,
    /// Remaining battery below the low threshold
    pub battery_low: bool,
    /// Global speed multiplier (wind-down), 0-1
    pub animation_speed: f32,
}

impl Default for TickInput {
    fn default() -> Self {
        Self {
            tilt: Vec2::ZERO,
            shake: 0.0,
            battery_low: false,
            animation_speed: 1.0,
        }
    }
}

/// Current capacity of a scene under the given settings
pub fn scene_capacity(params: &SceneParams, settings: &Settings, input: &TickInput) -> usize {
    capacity(
        params.base_count,
        settings.density.multiplier(),
        settings.effective_battery_low(input.battery_low),
    )
}

/// Advance the scene by one (already scaled) step
pub fn tick(scene: &mut SceneSimulation, settings: &Settings, input: &TickInput, dt: f32) {
    // Zero-area viewport: nothing to spawn into or draw on
    if !scene.has_viewport() {
        return;
    }

    let dt = if dt.is_finite() {
        dt.clamp(0.0, FRAME_CAP)
    } else {
        0.0
    };
    scene.time_ticks += 1;
    scene.elapsed += dt;

    let params = scene.params;
    let viewport = scene.viewport;
    let sensitivity = settings.effective_touch_sensitivity();
    let capacity = scene_capacity(&params, settings, input);
    let ambient = if settings.reduced_motion {
        REDUCED_MOTION_AMBIENT
    } else {
        1.0
    };

    if params.spawn.prefill && !scene.prefilled {
        let filled = scene
            .pool
            .prefill(&mut scene.rng, &params.spawn, viewport, capacity);
        scene.prefilled = true;
        log::info!("{} prefilled with {} entities", scene.kind.as_str(), filled);
    }

    // Taps queued by input handlers since the last frame
    let taps = std::mem::take(&mut scene.pending_taps);
    for tap in taps {
        handle_tap(scene, &params, tap, sensitivity, capacity);
    }

    scene
        .pool
        .spawn_ambient(&mut scene.rng, &params.spawn, viewport, capacity, ambient);

    let forces = Forces {
        constant: params.gravity * ambient,
        tilt: tilt_force(input.tilt, params.tilt_gain, settings.reduced_motion),
        shake: active_shake(input.shake, params.shake_threshold),
        touch: touch_field(scene, &params, sensitivity),
    };

    let SceneSimulation {
        pool,
        rng,
        glow_trail,
        ..
    } = scene;

    for entity in pool.entities_mut() {
        integrate(entity, &params, &forces, viewport, rng, dt);

        entity.age += dt;
        entity.phase = (entity.phase + params.wobble_rate * ambient * dt).rem_euclid(TAU);
        if params.growth_rate != 0.0 {
            entity.radius = (entity.radius + params.growth_rate * dt).max(MIN_RADIUS);
        }
        if let Some(progress) = entity.pop.as_mut() {
            *progress = (*progress + dt / POP_DURATION).min(1.0);
        }
    }

    glow_trail.advance(dt);

    pool.retire_excess(capacity);
    pool.cull(viewport, params.boundary);
    pool.enforce_hard_cap(capacity + BURST_ALLOWANCE);
}

/// Resolve the interaction slot into a force field for this tick
fn touch_field(scene: &SceneSimulation, params: &SceneParams, sensitivity: f32) -> Option<TouchField> {
    let touch = params.touch?;
    let point = scene.interaction.get()?;
    // The viewport may have shrunk since the touch was recorded
    if in_dead_zone(point, scene.viewport) {
        return None;
    }
    Some(TouchField {
        point,
        radius: effective_radius(touch.base_radius, sensitivity),
        strength: touch.strength,
        mode: touch.mode,
    })
}

/// Pop entities under the tap (if the scene pops) and spawn its burst
fn handle_tap(
    scene: &mut SceneSimulation,
    params: &SceneParams,
    tap: Vec2,
    sensitivity: f32,
    capacity: usize,
) {
    if params.pop_on_touch {
        let mut popped = 0;
        for entity in scene.pool.entities_mut() {
            if entity.pop.is_none() && entity.pos.distance(tap) <= entity.radius {
                entity.start_pop();
                popped += 1;
            }
        }
        if popped > 0 {
            log::debug!("Popped {} at ({:.0}, {:.0})", popped, tap.x, tap.y);
        }
    }

    if params.spawn.burst_count > 0 {
        let spread = params.spawn.burst_spread * sensitivity;
        scene.pool.spawn_burst(
            &mut scene.rng,
            &params.spawn,
            tap,
            params.spawn.burst_count as usize,
            spread,
            capacity,
        );
    }
}
