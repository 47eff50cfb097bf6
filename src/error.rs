//! Configuration errors
//!
//! The simulation itself never fails; only loading, validating or saving settings can.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("touch sensitivity {0} outside 0.5..=2.0")]
    TouchSensitivity(f32),

    #[error("unknown density preset: {0}")]
    UnknownDensity(String),

    #[error("unknown scene: {0}")]
    UnknownScene(String),

    #[error("wind-down of {wind_down}s does not fit in a {session}s session")]
    WindDown { wind_down: u32, session: u32 },

    #[error("settings storage unavailable: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, SettingsError>;
