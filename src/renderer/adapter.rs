//! Scene state -> draw list
//!
//! Pure: takes the scene by shared reference and never mutates it. All
//! scene-specific look lives here; the simulation only knows positions,
//! radii and colors.

use glam::Vec2;

use super::primitives::{DrawList, DrawPrimitive, Layer};
use super::vertex::colors;
use crate::scenes::SceneKind;
use crate::sim::state::{Entity, SceneSimulation};
use crate::sim::touch::GlowTrail;
use crate::with_alpha;

/// Flakes larger than this get a soft halo
const SNOW_HALO_MIN_RADIUS: f32 = 3.0;
/// Radius of a fresh glow marker
const GLOW_MARKER_RADIUS: f32 = 28.0;

/// Build the frame's draw list for a scene
pub fn render(scene: &SceneSimulation) -> DrawList {
    if !scene.has_viewport() {
        return DrawList::new();
    }

    let mut list = DrawList::with_capacity(scene.pool.len() * 3 + scene.glow_trail.len());

    if scene.params.glow_trail {
        glow_trail(&mut list, &scene.glow_trail);
    }

    for entity in scene.entities() {
        match scene.kind {
            SceneKind::Snowglobe => snowflake(&mut list, entity),
            SceneKind::Bubbles => bubble(&mut list, entity),
            SceneKind::Swirl => mote(&mut list, entity),
            SceneKind::BouncyBalls => ball(&mut list, entity),
            SceneKind::Ripples => ripple(&mut list, entity),
        }
    }

    list.sort_layers();
    list
}

fn glow_trail(list: &mut DrawList, trail: &GlowTrail) {
    for marker in trail.iter() {
        let intensity = marker.intensity();
        let radius = GLOW_MARKER_RADIUS * (0.6 + 0.4 * intensity);
        list.push(
            DrawPrimitive::circle(Layer::Glow, marker.pos, radius, colors::TRANSPARENT)
                .with_gradient(with_alpha(colors::GLOW, 0.35 * intensity), colors::TRANSPARENT),
        );
    }
}

fn snowflake(list: &mut DrawList, e: &Entity) {
    let fade = e.fade();
    if e.radius > SNOW_HALO_MIN_RADIUS {
        list.push(
            DrawPrimitive::circle(Layer::Glow, e.pos, e.radius * 2.5, colors::TRANSPARENT)
                .with_gradient(with_alpha(e.color, 0.25 * fade), colors::TRANSPARENT),
        );
    }
    list.push(DrawPrimitive::circle(
        Layer::Body,
        e.pos,
        e.radius,
        with_alpha(e.color, fade),
    ));
}

fn bubble(list: &mut DrawList, e: &Entity) {
    let fade = e.fade();
    let wobble = Vec2::new(e.phase.sin() * e.radius * 0.15, 0.0);
    let center = e.pos + wobble;

    if let Some(progress) = e.pop {
        // Expanding, fading rim; nothing else survives the pop
        let radius = e.radius * (1.0 + 0.6 * progress);
        list.push(DrawPrimitive::ring(
            Layer::Body,
            center,
            radius,
            (e.radius * 0.1).max(1.5),
            with_alpha(e.color, fade * (1.0 - progress)),
        ));
        return;
    }

    list.push(
        DrawPrimitive::circle(Layer::Glow, center, e.radius * 1.3, colors::TRANSPARENT)
            .with_gradient(with_alpha(e.color, 0.12 * fade), colors::TRANSPARENT),
    );
    list.push(
        DrawPrimitive::circle(Layer::Body, center, e.radius, colors::TRANSPARENT)
            .with_gradient(with_alpha(e.color, 0.05 * fade), with_alpha(e.color, 0.5 * fade)),
    );
    list.push(DrawPrimitive::ring(
        Layer::Body,
        center,
        e.radius,
        (e.radius * 0.08).max(1.5),
        with_alpha(e.color, fade),
    ));
    list.push(DrawPrimitive::ellipse(
        Layer::Highlight,
        center + Vec2::new(-0.35, -0.35) * e.radius,
        Vec2::new(0.28, 0.18) * e.radius,
        with_alpha(colors::HIGHLIGHT, 0.7 * fade),
    ));
}

fn mote(list: &mut DrawList, e: &Entity) {
    let fade = e.fade();
    list.push(
        DrawPrimitive::circle(Layer::Glow, e.pos, e.radius * 3.0, colors::TRANSPARENT)
            .with_gradient(with_alpha(e.color, 0.2 * fade), colors::TRANSPARENT),
    );
    list.push(DrawPrimitive::circle(
        Layer::Body,
        e.pos,
        e.radius,
        with_alpha(e.color, fade),
    ));
}

fn ball(list: &mut DrawList, e: &Entity) {
    let fade = e.fade();
    let lighter = [
        (e.color[0] + 0.25).min(1.0),
        (e.color[1] + 0.25).min(1.0),
        (e.color[2] + 0.25).min(1.0),
        e.color[3],
    ];
    list.push(
        DrawPrimitive::circle(Layer::Body, e.pos, e.radius, with_alpha(e.color, fade))
            .with_gradient(with_alpha(lighter, fade), with_alpha(e.color, fade)),
    );
    list.push(DrawPrimitive::ellipse(
        Layer::Highlight,
        e.pos + Vec2::new(-0.3, -0.4) * e.radius,
        Vec2::new(0.35, 0.22) * e.radius,
        with_alpha(colors::HIGHLIGHT, 0.55 * fade),
    ));
}

fn ripple(list: &mut DrawList, e: &Entity) {
    // Ripples thin out over their whole life, not just the tail
    let life = if e.lifetime.is_finite() && e.lifetime > 0.0 {
        (1.0 - e.age / e.lifetime).clamp(0.0, 1.0)
    } else {
        1.0
    };
    list.push(DrawPrimitive::ring(
        Layer::Body,
        e.pos,
        e.radius,
        3.0 * life + 0.5,
        with_alpha(e.color, life),
    ));
    if e.radius > 12.0 {
        list.push(DrawPrimitive::ring(
            Layer::Body,
            e.pos,
            e.radius * 0.6,
            1.5 * life + 0.5,
            with_alpha(e.color, 0.5 * life),
        ));
    }
}
