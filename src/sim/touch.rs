//! Touch interaction model
//!
//! Input callbacks write the current interaction point; the next tick reads it.
//! Both run on the same thread, so the slot needs no synchronization.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// How entities react to an active touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchInteraction {
    /// Pulled toward the point, stronger when closer (capped)
    Attract,
    /// Pushed away, linear falloff to zero at the radius
    Repel,
    /// Orbit the point with a slight inward pull
    Swirl,
}

/// Interaction radius after the sensitivity multiplier
#[inline]
pub fn effective_radius(base_radius: f32, touch_sensitivity: f32) -> f32 {
    (base_radius * touch_sensitivity).max(0.0)
}

/// True if `point` lies in the edge margin reserved for system gestures
pub fn in_dead_zone(point: Vec2, viewport: Vec2) -> bool {
    point.x < EDGE_DEAD_ZONE
        || point.y < EDGE_DEAD_ZONE
        || point.x > viewport.x - EDGE_DEAD_ZONE
        || point.y > viewport.y - EDGE_DEAD_ZONE
}

/// An active touch resolved for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchField {
    pub point: Vec2,
    pub radius: f32,
    pub strength: f32,
    pub mode: TouchInteraction,
}

impl TouchField {
    /// Acceleration this field applies to an entity at `pos`
    pub fn acceleration(&self, pos: Vec2) -> Vec2 {
        if self.radius <= 0.0 {
            return Vec2::ZERO;
        }

        let delta = self.point - pos;
        let raw_dist = delta.length();
        if raw_dist > self.radius {
            return Vec2::ZERO;
        }
        let dist = raw_dist.max(MIN_DISTANCE);
        // Unit vector toward the touch point
        let toward = delta / dist;

        match self.mode {
            TouchInteraction::Attract => {
                let falloff = (self.radius / dist).min(ATTRACT_FALLOFF_CAP);
                toward * self.strength * falloff
            }
            TouchInteraction::Repel => {
                let falloff = (self.radius - raw_dist) / self.radius;
                -toward * self.strength * falloff
            }
            TouchInteraction::Swirl => {
                let tangent = Vec2::new(-toward.y, toward.x);
                tangent * self.strength + toward * self.strength * SWIRL_INWARD
            }
        }
    }
}

/// The most recent active touch, if any
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InteractionPoint {
    point: Option<Vec2>,
}

impl InteractionPoint {
    /// Record a touch; points in the dead zone clear the slot instead.
    /// Returns whether the point was accepted.
    pub fn set(&mut self, point: Vec2, viewport: Vec2) -> bool {
        if in_dead_zone(point, viewport) {
            self.point = None;
            false
        } else {
            self.point = Some(point);
            true
        }
    }

    pub fn clear(&mut self) {
        self.point = None;
    }

    pub fn get(&self) -> Option<Vec2> {
        self.point
    }
}

/// A fading marker left by a recent touch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlowMarker {
    pub pos: Vec2,
    pub age: f32,
}

impl GlowMarker {
    /// Remaining intensity in 0-1
    pub fn intensity(&self) -> f32 {
        (1.0 - self.age / GLOW_LIFETIME).clamp(0.0, 1.0)
    }
}

/// Bounded ring of recent touch markers (newest last)
#[derive(Debug, Clone, Default)]
pub struct GlowTrail {
    markers: VecDeque<GlowMarker>,
}

impl GlowTrail {
    pub fn new() -> Self {
        Self {
            markers: VecDeque::with_capacity(GLOW_TRAIL_LEN),
        }
    }

    /// Add a marker unless the previous one is closer than `GLOW_SPACING`
    pub fn record(&mut self, pos: Vec2) {
        if let Some(last) = self.markers.back() {
            if last.pos.distance(pos) < GLOW_SPACING {
                return;
            }
        }
        if self.markers.len() == GLOW_TRAIL_LEN {
            self.markers.pop_front();
        }
        self.markers.push_back(GlowMarker { pos, age: 0.0 });
    }

    /// Age markers and drop the expired ones
    pub fn advance(&mut self, dt: f32) {
        for marker in self.markers.iter_mut() {
            marker.age += dt;
        }
        self.markers.retain(|m| m.age < GLOW_LIFETIME);
    }

    pub fn iter(&self) -> impl Iterator<Item = &GlowMarker> {
        self.markers.iter()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn clear(&mut self) {
        self.markers.clear();
    }
}
