//! Soothe - calming full-screen particle scenes
//!
//! Core modules:
//! - `sim`: Headless scene simulation (clock, entity pool, integrator, touch)
//! - `scenes`: Per-scene parameter presets
//! - `renderer`: Draw-list adapter and tessellation
//! - `session`: Active scene lifecycle and parental timers
//! - `platform`: Browser bindings

pub mod error;
pub mod platform;
pub mod renderer;
pub mod scenes;
pub mod session;
pub mod settings;
pub mod sim;
pub mod timers;

pub use error::SettingsError;
pub use scenes::SceneKind;
pub use session::Session;
pub use settings::{DensityPreset, Settings};

/// Engine configuration constants
pub mod consts {
    /// Target display refresh rate
    pub const TARGET_HZ: f32 = 60.0;
    /// Largest step a single frame may advance (1/15 s)
    pub const FRAME_CAP: f32 = 1.0 / 15.0;

    /// Screen-edge margin where touches are ignored (points)
    pub const EDGE_DEAD_ZONE: f32 = 15.0;
    /// Floor applied to distances before any division
    pub const MIN_DISTANCE: f32 = 1e-3;
    /// Smallest radius an entity may have
    pub const MIN_RADIUS: f32 = 0.25;

    /// Entities a burst may add above the steady-state capacity
    pub const BURST_ALLOWANCE: usize = 50;
    /// Battery level (0-1) below which battery saver halves capacity
    pub const LOW_BATTERY_LEVEL: f32 = 0.2;
    pub const BATTERY_SAVER_MULTIPLIER: f32 = 0.5;
    /// Seconds an over-capacity immortal entity takes to fade out
    pub const RETIRE_FADE: f32 = 1.0;

    /// Ambient motion scale under reduced motion
    pub const REDUCED_MOTION_AMBIENT: f32 = 0.1;

    /// Attraction falloff is `radius / dist`, capped here
    pub const ATTRACT_FALLOFF_CAP: f32 = 4.0;
    /// Inward pull applied by the swirl interaction, relative to strength
    pub const SWIRL_INWARD: f32 = 0.25;

    /// Pop animation duration (seconds)
    pub const POP_DURATION: f32 = 0.25;
    /// Fraction of a lifetime spent fading out
    pub const FADE_FRACTION: f32 = 0.2;

    /// Glow trail markers
    pub const GLOW_TRAIL_LEN: usize = 16;
    pub const GLOW_LIFETIME: f32 = 1.2;
    pub const GLOW_SPACING: f32 = 24.0;
}

/// Convert HSL (hue in degrees, s/l in 0-1) to an RGBA color
pub fn hsla(hue: f32, saturation: f32, lightness: f32, alpha: f32) -> [f32; 4] {
    let h = hue.rem_euclid(360.0) / 60.0;
    let s = saturation.clamp(0.0, 1.0);
    let l = lightness.clamp(0.0, 1.0);

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    [r + m, g + m, b + m, alpha.clamp(0.0, 1.0)]
}

/// Scale the alpha channel of a color
#[inline]
pub fn with_alpha(color: [f32; 4], factor: f32) -> [f32; 4] {
    [color[0], color[1], color[2], (color[3] * factor).clamp(0.0, 1.0)]
}
