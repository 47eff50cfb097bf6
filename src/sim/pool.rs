//! Entity pool: spawn, cull and capacity policy
//!
//! Entities are stored in spawn order, so the front of the vector is always the
//! oldest entity. Capacity is never cached; callers recompute it every tick.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::params::{BoundaryPolicy, SpawnEdge, SpawnParams};
use super::state::Entity;
use crate::consts::*;
use crate::hsla;

/// Steady-state entity cap for the current settings
pub fn capacity(base_count: u32, density_multiplier: f32, battery_low: bool) -> usize {
    let battery = if battery_low {
        BATTERY_SAVER_MULTIPLIER
    } else {
        1.0
    };
    let raw = (base_count as f32 * density_multiplier * battery).round();
    if raw.is_finite() && raw >= 1.0 {
        raw as usize
    } else {
        1
    }
}

/// Whether a battery level (0-1) counts as low
pub fn is_battery_low(level: f32) -> bool {
    level < LOW_BATTERY_LEVEL
}

/// Ordered collection of live entities
#[derive(Debug, Clone, Default)]
pub struct EntityPool {
    entities: Vec<Entity>,
    next_id: u32,
}

impl EntityPool {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            next_id: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Allocate a new entity ID
    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Insert a prepared entity, assigning it a fresh ID
    pub fn push(&mut self, mut entity: Entity) -> u32 {
        entity.id = self.next_entity_id();
        let id = entity.id;
        self.entities.push(entity);
        id
    }

    /// Probability-gated ambient spawn at the scene's spawn edge.
    ///
    /// Never spawns past `capacity`. Returns the number spawned.
    pub fn spawn_ambient<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        spawn: &SpawnParams,
        viewport: Vec2,
        capacity: usize,
        chance_scale: f32,
    ) -> usize {
        if self.entities.len() >= capacity {
            return 0;
        }
        let chance = spawn.chance * chance_scale;
        if !chance.is_finite() || !rng.random_bool(chance.clamp(0.0, 1.0) as f64) {
            return 0;
        }

        let room = capacity - self.entities.len();
        let count = (spawn.batch.max(1) as usize).min(room);
        for _ in 0..count {
            let entity = self.ambient_entity(rng, spawn, viewport);
            self.push(entity);
        }
        count
    }

    /// Fill the pool to `capacity` with entities anywhere in the viewport
    pub fn prefill<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        spawn: &SpawnParams,
        viewport: Vec2,
        capacity: usize,
    ) -> usize {
        let count = capacity.saturating_sub(self.entities.len());
        for _ in 0..count {
            let mut entity = self.ambient_entity(rng, spawn, viewport);
            entity.pos = Vec2::new(
                rng.random_range(0.0..=viewport.x),
                rng.random_range(0.0..=viewport.y),
            );
            // Stagger ages so a prefilled scene doesn't expire all at once
            if entity.lifetime.is_finite() {
                entity.age = rng.random_range(0.0..entity.lifetime * 0.8);
            }
            self.push(entity);
        }
        count
    }

    /// Spawn a cluster around a tap.
    ///
    /// Bounded by `capacity + BURST_ALLOWANCE` so bursts near the cap still show
    /// up, while the steady-state cap returns once they decay.
    pub fn spawn_burst<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        spawn: &SpawnParams,
        point: Vec2,
        count: usize,
        spread: f32,
        capacity: usize,
    ) -> usize {
        let limit = capacity + BURST_ALLOWANCE;
        let count = count.min(limit.saturating_sub(self.entities.len()));
        let spread = spread.max(0.0);

        for _ in 0..count {
            let angle = rng.random_range(0.0..TAU);
            let dir = Vec2::new(angle.cos(), angle.sin());
            // sqrt for uniform density over the disc
            let dist = spread * rng.random::<f32>().sqrt();
            let speed = spawn.burst_speed.sample(rng);

            let hue = spawn.hue.sample(rng);
            let color = hsla(hue, spawn.saturation, spawn.lightness, spawn.alpha.sample(rng));
            let mut entity = Entity::new(
                0,
                point + dir * dist,
                dir * speed,
                spawn.burst_radius.sample(rng),
                color,
            )
            .with_lifetime(spawn.burst_lifetime.sample(rng).max(MIN_DISTANCE));
            entity.hue = hue;
            entity.phase = rng.random_range(0.0..TAU);
            self.push(entity);
        }

        if count > 0 {
            log::debug!("Burst of {} at ({:.0}, {:.0})", count, point.x, point.y);
        }
        count
    }

    /// Remove expired, escaped, popped or degenerate entities.
    ///
    /// Returns the number removed.
    pub fn cull(&mut self, viewport: Vec2, boundary: BoundaryPolicy) -> usize {
        let before = self.entities.len();
        self.entities.retain(|e| {
            if e.age >= e.lifetime || e.pop_finished() || !e.is_finite() {
                return false;
            }
            if boundary == BoundaryPolicy::Remove {
                let margin = 2.0 * e.radius;
                let escaped = e.pos.x < -margin
                    || e.pos.y < -margin
                    || e.pos.x > viewport.x + margin
                    || e.pos.y > viewport.y + margin;
                return !escaped;
            }
            true
        });
        before - self.entities.len()
    }

    /// Give the oldest immortal entities a short lifetime when the pool holds
    /// more immortals than `capacity` allows (e.g. density was lowered).
    ///
    /// Returns the number retired.
    pub fn retire_excess(&mut self, capacity: usize) -> usize {
        let mortal = self.entities.iter().filter(|e| !e.is_immortal()).count();
        let excess = self
            .entities
            .len()
            .saturating_sub(capacity)
            .saturating_sub(mortal);
        if excess == 0 {
            return 0;
        }

        let mut retired = 0;
        for entity in self.entities.iter_mut().filter(|e| e.is_immortal()) {
            if retired == excess {
                break;
            }
            entity.retire();
            retired += 1;
        }
        retired
    }

    /// Drop the oldest entities past `hard_cap`. Returns the number dropped.
    ///
    /// Retiring entities are already on their way out and don't count.
    pub fn enforce_hard_cap(&mut self, hard_cap: usize) -> usize {
        let live = self.entities.iter().filter(|e| !e.retiring).count();
        let excess = live.saturating_sub(hard_cap);
        if excess == 0 {
            return 0;
        }
        log::warn!(
            "Entity pool over hard cap ({} > {}), dropping {} oldest",
            live,
            hard_cap,
            excess
        );
        let mut dropped = 0;
        self.entities.retain(|e| {
            if dropped < excess && !e.retiring {
                dropped += 1;
                false
            } else {
                true
            }
        });
        excess
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }

    fn ambient_entity<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        spawn: &SpawnParams,
        viewport: Vec2,
    ) -> Entity {
        let radius = spawn.radius.sample(rng).max(MIN_RADIUS);
        let pos = match spawn.edge {
            SpawnEdge::Bottom => Vec2::new(rng.random_range(0.0..=viewport.x), viewport.y + radius),
            SpawnEdge::Top => Vec2::new(rng.random_range(0.0..=viewport.x), -radius),
            SpawnEdge::Anywhere => Vec2::new(
                rng.random_range(0.0..=viewport.x),
                rng.random_range(0.0..=viewport.y),
            ),
        };
        let vel = Vec2::new(spawn.vx.sample(rng), spawn.vy.sample(rng));
        let hue = spawn.hue.sample(rng);
        let color = hsla(hue, spawn.saturation, spawn.lightness, spawn.alpha.sample(rng));

        let mut entity = Entity::new(0, pos, vel, radius, color);
        if let Some(lifetime) = spawn.lifetime {
            entity.lifetime = lifetime.sample(rng).max(MIN_DISTANCE);
        }
        entity.hue = hue;
        entity.phase = rng.random_range(0.0..TAU);
        entity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenes::SceneKind;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(42)
    }

    fn entity_at(pos: Vec2) -> Entity {
        Entity::new(0, pos, Vec2::ZERO, 4.0, [1.0; 4])
    }

    #[test]
    fn test_capacity_formula() {
        // 400 * 0.5 * 0.5
        assert_eq!(capacity(400, 0.5, true), 100);
        assert_eq!(capacity(400, 1.5, false), 600);
        assert_eq!(capacity(3, 0.5, false), 2);
        assert_eq!(capacity(1, 0.5, true), 1);
        assert_eq!(capacity(0, 1.0, false), 1);
    }

    #[test]
    fn test_battery_threshold() {
        assert!(is_battery_low(0.19));
        assert!(!is_battery_low(0.2));
    }

    #[test]
    fn test_burst_scenario() {
        let spawn = SceneKind::Snowglobe.params().spawn;
        let mut pool = EntityPool::new();
        let point = Vec2::new(100.0, 100.0);
        let spread = 30.0;

        let spawned = pool.spawn_burst(&mut rng(), &spawn, point, 8, spread, 30);
        assert_eq!(spawned, 8);
        assert_eq!(pool.len(), 8);
        for e in pool.iter() {
            assert!(e.pos.distance(point) <= spread + 1e-3);
            assert!(e.lifetime.is_finite());
        }
    }

    #[test]
    fn test_burst_respects_allowance() {
        let spawn = SceneKind::Snowglobe.params().spawn;
        let mut pool = EntityPool::new();
        for _ in 0..30 {
            pool.push(entity_at(Vec2::new(50.0, 50.0)));
        }
        let spawned = pool.spawn_burst(&mut rng(), &spawn, Vec2::new(100.0, 100.0), 80, 20.0, 30);
        assert_eq!(spawned, BURST_ALLOWANCE);
        assert_eq!(pool.len(), 30 + BURST_ALLOWANCE);

        // Nothing more fits
        let spawned = pool.spawn_burst(&mut rng(), &spawn, Vec2::new(100.0, 100.0), 8, 20.0, 30);
        assert_eq!(spawned, 0);
    }

    #[test]
    fn test_ambient_never_exceeds_capacity() {
        let mut spawn = SceneKind::Swirl.params().spawn;
        spawn.chance = 1.0;
        spawn.batch = 7;
        let mut pool = EntityPool::new();
        let mut r = rng();
        for _ in 0..20 {
            pool.spawn_ambient(&mut r, &spawn, Vec2::new(300.0, 500.0), 30, 1.0);
            assert!(pool.len() <= 30);
        }
        assert_eq!(pool.len(), 30);
    }

    #[test]
    fn test_ambient_bottom_edge() {
        let mut spawn = SceneKind::Bubbles.params().spawn;
        spawn.chance = 1.0;
        let mut pool = EntityPool::new();
        pool.spawn_ambient(&mut rng(), &spawn, Vec2::new(300.0, 500.0), 10, 1.0);
        for e in pool.iter() {
            assert!(e.pos.y > 500.0);
        }
    }

    #[test]
    fn test_ids_are_unique_and_ordered() {
        let mut pool = EntityPool::new();
        let a = pool.push(entity_at(Vec2::ZERO));
        let b = pool.push(entity_at(Vec2::ZERO));
        assert!(b > a);
    }

    #[test]
    fn test_cull_lifetime_pop_and_boundary() {
        let viewport = Vec2::new(300.0, 500.0);
        let mut pool = EntityPool::new();

        let mut expired = entity_at(Vec2::new(50.0, 50.0)).with_lifetime(1.0);
        expired.age = 1.0;
        pool.push(expired);

        let mut popped = entity_at(Vec2::new(50.0, 50.0));
        popped.pop = Some(1.0);
        pool.push(popped);

        // Rose off the top: y < -2r
        pool.push(entity_at(Vec2::new(50.0, -8.5)));
        // Just above the top but within 2r
        pool.push(entity_at(Vec2::new(50.0, -7.5)));

        let mut nan = entity_at(Vec2::new(50.0, 50.0));
        nan.vel = Vec2::new(f32::NAN, 0.0);
        pool.push(nan);

        let removed = pool.cull(viewport, BoundaryPolicy::Remove);
        assert_eq!(removed, 4);
        assert_eq!(pool.len(), 1);
        assert!((pool.entities()[0].pos.y + 7.5).abs() < 1e-5);
    }

    #[test]
    fn test_cull_keeps_offscreen_when_not_removal() {
        let mut pool = EntityPool::new();
        pool.push(entity_at(Vec2::new(-100.0, -100.0)));
        assert_eq!(pool.cull(Vec2::new(300.0, 500.0), BoundaryPolicy::Wrap), 0);
    }

    #[test]
    fn test_retire_excess_immortals() {
        let mut pool = EntityPool::new();
        for _ in 0..10 {
            pool.push(entity_at(Vec2::ZERO));
        }
        assert_eq!(pool.retire_excess(6), 4);
        let retired: Vec<_> = pool.iter().filter(|e| !e.is_immortal()).collect();
        assert_eq!(retired.len(), 4);
        // Oldest first
        assert_eq!(pool.entities()[0].lifetime, RETIRE_FADE);
        assert!(pool.entities()[9].is_immortal());

        // Already-mortal entities count toward the pending shrink
        assert_eq!(pool.retire_excess(6), 0);
    }

    #[test]
    fn test_hard_cap_drops_oldest() {
        let mut pool = EntityPool::new();
        for i in 0..12 {
            pool.push(entity_at(Vec2::new(i as f32, 0.0)));
        }
        assert_eq!(pool.enforce_hard_cap(10), 2);
        assert_eq!(pool.len(), 10);
        assert_eq!(pool.entities()[0].pos.x, 2.0);
    }

    #[test]
    fn test_hard_cap_skips_retiring() {
        let mut pool = EntityPool::new();
        for i in 0..12 {
            pool.push(entity_at(Vec2::new(i as f32, 0.0)));
        }
        assert_eq!(pool.retire_excess(4), 8);
        assert_eq!(pool.enforce_hard_cap(5), 0);
        assert_eq!(pool.len(), 12);

        pool.push(entity_at(Vec2::new(99.0, 0.0)));
        pool.push(entity_at(Vec2::new(100.0, 0.0)));
        // 6 live entities, cap 5: the oldest live one goes, retiring ones stay
        assert_eq!(pool.enforce_hard_cap(5), 1);
        assert_eq!(pool.len(), 13);
        assert!(pool.iter().all(|e| e.pos.x != 8.0));
        assert_eq!(pool.iter().filter(|e| e.retiring).count(), 8);
    }

    #[test]
    fn test_retired_fade_spans_retire_window() {
        let mut e = entity_at(Vec2::ZERO);
        e.age = 100.0;
        e.retire();
        assert_eq!(e.fade(), 1.0);
        e.age += RETIRE_FADE * 0.5;
        assert!((e.fade() - 0.5).abs() < 1e-4);
        e.age += RETIRE_FADE * 0.5;
        assert_eq!(e.fade(), 0.0);
    }

    #[test]
    fn test_prefill_inside_viewport() {
        let spawn = SceneKind::Snowglobe.params().spawn;
        let mut pool = EntityPool::new();
        let viewport = Vec2::new(300.0, 500.0);
        assert_eq!(pool.prefill(&mut rng(), &spawn, viewport, 25), 25);
        for e in pool.iter() {
            assert!(e.pos.x >= 0.0 && e.pos.x <= 300.0);
            assert!(e.pos.y >= 0.0 && e.pos.y <= 500.0);
        }
    }
}
