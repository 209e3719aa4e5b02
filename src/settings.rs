//! Game settings and live tunables
//!
//! Persisted in LocalStorage on web. The lander sliders write straight into
//! these values, so every setter clamps to the slider range.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Inclusive range a slider can produce
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderRange {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl SliderRange {
    pub const fn new(min: f32, max: f32, step: f32) -> Self {
        Self { min, max, step }
    }

    /// Clamp into range; non-finite input falls back to `min`
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_finite() {
            value.clamp(self.min, self.max)
        } else {
            self.min
        }
    }
}

pub const THRUST_RANGE: SliderRange = SliderRange::new(100.0, 1000.0, 1.0);
pub const GRAVITY_RANGE: SliderRange = SliderRange::new(0.0, 20.0, 0.1);
pub const MASS_RANGE: SliderRange = SliderRange::new(MIN_MASS, 10.0, 1.0);

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Lander tunables ===
    pub gravity: f32,
    pub thrust_force: f32,
    pub mass: f32,

    // === Audio ===
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,

    // === Accessibility ===
    /// Reduced motion (no thrust particles)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            thrust_force: DEFAULT_THRUST,
            mass: DEFAULT_MASS,

            music_volume: 0.5,
            muted: false,

            reduced_motion: false,
        }
    }
}

impl Settings {
    pub fn set_gravity(&mut self, value: f32) {
        self.gravity = GRAVITY_RANGE.clamp(value);
    }

    pub fn set_thrust_force(&mut self, value: f32) {
        self.thrust_force = THRUST_RANGE.clamp(value);
    }

    pub fn set_mass(&mut self, value: f32) {
        self.mass = MASS_RANGE.clamp(value);
    }

    /// Volume after mute
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.music_volume.clamp(0.0, 1.0)
        }
    }

    /// Thrust particles on/off
    pub fn particles_enabled(&self) -> bool {
        !self.reduced_motion
    }

    /// LocalStorage key
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    const STORAGE_KEY: &'static str = "lab_hub_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str::<Settings>(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings.sanitized();
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                match storage.set_item(Self::STORAGE_KEY, &json) {
                    Ok(()) => log::debug!("Settings saved"),
                    Err(e) => log::warn!("Failed to save settings: {:?}", e),
                }
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }

    /// Stored values may predate the current ranges
    ///
    /// Mass outside the slider range is kept (the default of 150 is heavier
    /// than the slider allows), only values the integrator can't use are fixed.
    pub fn sanitized(mut self) -> Self {
        self.gravity = GRAVITY_RANGE.clamp(self.gravity);
        self.thrust_force = THRUST_RANGE.clamp(self.thrust_force);
        self.mass = crate::sim::body::sanitize_mass(self.mass);
        self.music_volume = self.music_volume.clamp(0.0, 1.0);
        self
    }
}
