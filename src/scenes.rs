//! Scene catalogue
//!
//! Each scene is the generic engine plus one `SceneParams`. Visual differences
//! live in `renderer::adapter`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SettingsError};
use crate::sim::params::{BoundaryPolicy, SceneParams, Span, SpawnEdge, SpawnParams, TouchParams};
use crate::sim::touch::TouchInteraction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SceneKind {
    /// Drifting snow that swirls when the device is shaken
    #[default]
    Snowglobe,
    /// Rising bubbles that pop under a finger
    Bubbles,
    /// Colorful dust orbiting the finger
    Swirl,
    /// Soft balls bouncing under tilt-driven gravity
    BouncyBalls,
    /// Expanding rings left by taps
    Ripples,
}

impl SceneKind {
    /// Rotation order for auto-cycle
    pub const ALL: [SceneKind; 5] = [
        SceneKind::Snowglobe,
        SceneKind::Bubbles,
        SceneKind::Swirl,
        SceneKind::BouncyBalls,
        SceneKind::Ripples,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SceneKind::Snowglobe => "Snowglobe",
            SceneKind::Bubbles => "Bubbles",
            SceneKind::Swirl => "Swirl",
            SceneKind::BouncyBalls => "Bouncy Balls",
            SceneKind::Ripples => "Ripples",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "snowglobe" | "snow" => Ok(SceneKind::Snowglobe),
            "bubbles" => Ok(SceneKind::Bubbles),
            "swirl" | "particles" => Ok(SceneKind::Swirl),
            "bouncyballs" | "balls" => Ok(SceneKind::BouncyBalls),
            "ripples" => Ok(SceneKind::Ripples),
            _ => Err(SettingsError::UnknownScene(s.to_string())),
        }
    }

    /// Next scene in the rotation
    pub fn next(&self) -> SceneKind {
        let idx = Self::ALL.iter().position(|k| k == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn params(&self) -> SceneParams {
        match self {
            SceneKind::Snowglobe => SceneParams {
                base_count: 220,
                gravity: Vec2::new(0.0, 14.0),
                damping: 0.9,
                max_speed: 260.0,
                tilt_gain: 110.0,
                shake_threshold: 1.2,
                shake_gain: 40.0,
                touch: Some(TouchParams {
                    mode: TouchInteraction::Repel,
                    base_radius: 90.0,
                    strength: 600.0,
                }),
                boundary: BoundaryPolicy::Wrap,
                spawn: SpawnParams {
                    edge: SpawnEdge::Anywhere,
                    chance: 0.04,
                    batch: 2,
                    vx: Span::new(-6.0, 6.0),
                    vy: Span::new(8.0, 20.0),
                    radius: Span::new(1.5, 4.0),
                    lifetime: None,
                    hue: Span::new(190.0, 220.0),
                    saturation: 0.3,
                    lightness: 0.95,
                    alpha: Span::new(0.6, 0.95),
                    burst_count: 8,
                    burst_spread: 30.0,
                    burst_speed: Span::new(20.0, 60.0),
                    burst_radius: Span::new(1.5, 3.0),
                    burst_lifetime: Span::new(2.0, 4.0),
                    prefill: true,
                },
                wobble_rate: 1.5,
                growth_rate: 0.0,
                pop_on_touch: false,
                glow_trail: false,
            },
            SceneKind::Bubbles => SceneParams {
                base_count: 40,
                gravity: Vec2::new(0.0, -22.0),
                damping: 0.6,
                max_speed: 140.0,
                tilt_gain: 50.0,
                shake_threshold: 1.5,
                shake_gain: 25.0,
                touch: Some(TouchParams {
                    mode: TouchInteraction::Attract,
                    base_radius: 120.0,
                    strength: 90.0,
                }),
                boundary: BoundaryPolicy::Remove,
                spawn: SpawnParams {
                    edge: SpawnEdge::Bottom,
                    chance: 0.03,
                    batch: 1,
                    vx: Span::new(-8.0, 8.0),
                    vy: Span::new(-40.0, -20.0),
                    radius: Span::new(12.0, 34.0),
                    lifetime: Some(Span::new(12.0, 18.0)),
                    hue: Span::new(180.0, 300.0),
                    saturation: 0.7,
                    lightness: 0.75,
                    alpha: Span::new(0.35, 0.6),
                    burst_count: 3,
                    burst_spread: 20.0,
                    burst_speed: Span::new(10.0, 30.0),
                    burst_radius: Span::new(5.0, 10.0),
                    burst_lifetime: Span::new(3.0, 5.0),
                    prefill: false,
                },
                wobble_rate: 2.2,
                growth_rate: 0.0,
                pop_on_touch: true,
                glow_trail: false,
            },
            SceneKind::Swirl => SceneParams {
                base_count: 300,
                gravity: Vec2::ZERO,
                damping: 1.2,
                max_speed: 320.0,
                tilt_gain: 90.0,
                shake_threshold: 1.2,
                shake_gain: 60.0,
                touch: Some(TouchParams {
                    mode: TouchInteraction::Swirl,
                    base_radius: 160.0,
                    strength: 420.0,
                }),
                boundary: BoundaryPolicy::SoftClamp { inward: 0.3 },
                spawn: SpawnParams {
                    edge: SpawnEdge::Anywhere,
                    chance: 0.5,
                    batch: 4,
                    vx: Span::new(-15.0, 15.0),
                    vy: Span::new(-15.0, 15.0),
                    radius: Span::new(1.0, 3.0),
                    lifetime: Some(Span::new(4.0, 8.0)),
                    hue: Span::new(0.0, 360.0),
                    saturation: 0.85,
                    lightness: 0.65,
                    alpha: Span::new(0.7, 1.0),
                    burst_count: 12,
                    burst_spread: 12.0,
                    burst_speed: Span::new(40.0, 120.0),
                    burst_radius: Span::new(1.0, 2.5),
                    burst_lifetime: Span::new(1.0, 2.0),
                    prefill: false,
                },
                wobble_rate: 0.0,
                growth_rate: 0.0,
                pop_on_touch: false,
                glow_trail: true,
            },
            SceneKind::BouncyBalls => SceneParams {
                base_count: 12,
                gravity: Vec2::new(0.0, 400.0),
                damping: 0.15,
                max_speed: 900.0,
                tilt_gain: 500.0,
                shake_threshold: 1.0,
                shake_gain: 120.0,
                touch: Some(TouchParams {
                    mode: TouchInteraction::Repel,
                    base_radius: 140.0,
                    strength: 1400.0,
                }),
                boundary: BoundaryPolicy::Bounce { restitution: 0.82 },
                spawn: SpawnParams {
                    edge: SpawnEdge::Top,
                    chance: 0.04,
                    batch: 1,
                    vx: Span::new(-80.0, 80.0),
                    vy: Span::new(0.0, 40.0),
                    radius: Span::new(14.0, 28.0),
                    lifetime: None,
                    hue: Span::new(0.0, 360.0),
                    saturation: 0.75,
                    lightness: 0.6,
                    alpha: Span::fixed(1.0),
                    burst_count: 1,
                    burst_spread: 5.0,
                    burst_speed: Span::new(60.0, 160.0),
                    burst_radius: Span::new(12.0, 20.0),
                    burst_lifetime: Span::new(6.0, 9.0),
                    prefill: false,
                },
                wobble_rate: 0.0,
                growth_rate: 0.0,
                pop_on_touch: false,
                glow_trail: false,
            },
            SceneKind::Ripples => SceneParams {
                base_count: 24,
                gravity: Vec2::ZERO,
                damping: 2.0,
                max_speed: 60.0,
                tilt_gain: 0.0,
                shake_threshold: f32::MAX,
                shake_gain: 0.0,
                touch: None,
                boundary: BoundaryPolicy::Remove,
                spawn: SpawnParams {
                    edge: SpawnEdge::Anywhere,
                    chance: 0.02,
                    batch: 1,
                    vx: Span::fixed(0.0),
                    vy: Span::fixed(0.0),
                    radius: Span::new(4.0, 8.0),
                    lifetime: Some(Span::new(2.5, 3.5)),
                    hue: Span::new(170.0, 230.0),
                    saturation: 0.6,
                    lightness: 0.7,
                    alpha: Span::new(0.5, 0.8),
                    burst_count: 3,
                    burst_spread: 4.0,
                    burst_speed: Span::fixed(0.0),
                    burst_radius: Span::new(2.0, 6.0),
                    burst_lifetime: Span::new(2.0, 3.0),
                    prefill: false,
                },
                wobble_rate: 0.0,
                growth_rate: 45.0,
                pop_on_touch: false,
                glow_trail: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_cycles_all() {
        let mut kind = SceneKind::Snowglobe;
        for _ in 0..SceneKind::ALL.len() {
            kind = kind.next();
        }
        assert_eq!(kind, SceneKind::Snowglobe);
        assert_eq!(SceneKind::Ripples.next(), SceneKind::Snowglobe);
    }

    #[test]
    fn test_parse() {
        assert_eq!(SceneKind::parse("Bouncy-Balls").unwrap(), SceneKind::BouncyBalls);
        assert_eq!(SceneKind::parse("SNOW").unwrap(), SceneKind::Snowglobe);
        assert!(matches!(
            SceneKind::parse("lava"),
            Err(SettingsError::UnknownScene(_))
        ));
    }

    #[test]
    fn test_params_are_sane() {
        for kind in SceneKind::ALL {
            let p = kind.params();
            assert!(p.base_count > 0, "{:?}", kind);
            assert!(p.damping >= 0.0);
            assert!(p.max_speed > 0.0);
            assert!(p.spawn.radius.min > 0.0);
            assert!(p.spawn.burst_lifetime.min > 0.0, "bursts must decay in {:?}", kind);
            assert!((0.0..=1.0).contains(&p.spawn.chance));
        }
    }
}
