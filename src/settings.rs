//! User preferences read by every tick
//!
//! Persisted separately from anything else in LocalStorage. The simulation pulls
//! a fresh `&Settings` each frame, so edits apply without a scene restart.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SettingsError};

/// Entity density presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DensityPreset {
    Low,
    #[default]
    Normal,
    High,
}

impl DensityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            DensityPreset::Low => "Low",
            DensityPreset::Normal => "Normal",
            DensityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "low" => Ok(DensityPreset::Low),
            "normal" | "medium" | "med" => Ok(DensityPreset::Normal),
            "high" => Ok(DensityPreset::High),
            _ => Err(SettingsError::UnknownDensity(s.to_string())),
        }
    }

    /// Capacity multiplier for this preset
    pub fn multiplier(&self) -> f32 {
        match self {
            DensityPreset::Low => 0.5,
            DensityPreset::Normal => 1.0,
            DensityPreset::High => 1.5,
        }
    }
}

/// Valid range for the touch sensitivity multiplier
pub const TOUCH_SENSITIVITY_RANGE: std::ops::RangeInclusive<f32> = 0.5..=2.0;

/// Scene preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Simulation ===
    /// How many entities a scene keeps alive
    pub density: DensityPreset,
    /// Scales touch interaction radius and burst spread
    pub touch_sensitivity: f32,
    /// Halve capacity when the battery runs low
    pub battery_saver: bool,

    // === Accessibility ===
    /// Reduced motion (no tilt, minimal ambient drift)
    pub reduced_motion: bool,

    // === Parental timers ===
    /// Rotate to the next scene every N seconds
    pub auto_cycle_secs: Option<u32>,
    /// End the session after N minutes
    pub session_minutes: Option<u32>,
    /// Slow-motion period before the session ends
    pub wind_down_secs: u32,
    /// Relock the parental menu after N seconds unlocked
    pub parental_lock_secs: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            density: DensityPreset::Normal,
            touch_sensitivity: 1.0,
            battery_saver: true,

            reduced_motion: false,

            auto_cycle_secs: None,
            session_minutes: None,
            wind_down_secs: 30,
            parental_lock_secs: 60,
        }
    }
}

impl Settings {
    /// Create settings from a density preset
    pub fn from_preset(density: DensityPreset) -> Self {
        Self {
            density,
            ..Self::default()
        }
    }

    /// Check invariants that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if !TOUCH_SENSITIVITY_RANGE.contains(&self.touch_sensitivity) {
            return Err(SettingsError::TouchSensitivity(self.touch_sensitivity));
        }
        if let Some(minutes) = self.session_minutes {
            let session = minutes.saturating_mul(60);
            if self.wind_down_secs > session {
                return Err(SettingsError::WindDown {
                    wind_down: self.wind_down_secs,
                    session,
                });
            }
        }
        Ok(())
    }

    /// Parse and validate settings JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Touch sensitivity clamped into its valid range
    pub fn effective_touch_sensitivity(&self) -> f32 {
        self.touch_sensitivity
            .clamp(*TOUCH_SENSITIVITY_RANGE.start(), *TOUCH_SENSITIVITY_RANGE.end())
    }

    /// Whether the battery multiplier applies this tick
    pub fn effective_battery_low(&self, battery_low: bool) -> bool {
        self.battery_saver && battery_low
    }

    /// Session length in seconds, if limited
    pub fn session_secs(&self) -> Option<f64> {
        self.session_minutes.map(|m| m as f64 * 60.0)
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "soothe_settings";

    #[cfg(target_arch = "wasm32")]
    fn storage() -> Result<web_sys::Storage> {
        web_sys::window()
            .ok_or_else(|| SettingsError::Storage("no window".into()))?
            .local_storage()
            .map_err(|e| SettingsError::Storage(format!("{:?}", e)))?
            .ok_or_else(|| SettingsError::Storage("LocalStorage disabled".into()))
    }

    /// Stored settings, or defaults when nothing valid is stored
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let stored = Self::storage().and_then(|storage| {
            storage
                .get_item(Self::STORAGE_KEY)
                .map_err(|e| SettingsError::Storage(format!("{:?}", e)))
        });
        match stored {
            Ok(Some(json)) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring stored settings: {}", e),
            },
            Ok(None) => {}
            Err(e) => log::warn!("{}", e),
        }
        log::info!("Using default settings");
        Self::default()
    }

    /// Validate and write to LocalStorage
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) -> Result<()> {
        self.validate()?;
        let json = self.to_json()?;
        Self::storage()?
            .set_item(Self::STORAGE_KEY, &json)
            .map_err(|e| SettingsError::Storage(format!("{:?}", e)))?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Native builds keep settings in memory only
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) -> Result<()> {
        self.validate()
    }
}
