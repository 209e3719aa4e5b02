//! Lab Hub - a scene-driven 2D educational game
//!
//! Core modules:
//! - `sim`: Lander minigame simulation (body, collision judge, levels, particles, timers)
//! - `dialogue`: Branching dialogue scripts and the walker that plays them
//! - `scene`: Scene trait, lifecycle manager and the concrete scenes
//! - `world`: Hub world pieces (camera, player, interactables, indicator)
//! - `platform`: Input state, DOM host and asset cache
//! - `renderer`: Retained stage graph and WebGPU pipeline
//! - `menu`: Lab carousel and scene routing

pub mod audio;
pub mod dialogue;
pub mod error;
pub mod menu;
pub mod platform;
pub mod renderer;
pub mod scene;
pub mod settings;
pub mod sim;
pub mod world;

pub use error::{HubError, Result};
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Distance from the left/right/top screen edges that counts as out of bounds
    pub const EDGE_MARGIN: f32 = 15.0;
    /// Impact speeds strictly below this are a soft landing
    pub const SAFE_LANDING_SPEED: f32 = 50.0;
    /// Delay between a landing verdict and its consequence (seconds)
    pub const TRANSITION_DELAY: f32 = 1.5;
    /// Lifetime of a floating message (seconds)
    pub const MESSAGE_TTL: f32 = 2.0;

    /// Lander defaults
    pub const DEFAULT_GRAVITY: f32 = 1.6;
    pub const DEFAULT_THRUST: f32 = 300.0;
    pub const DEFAULT_MASS: f32 = 150.0;
    /// Smallest mass the integrator accepts (force / mass must stay finite)
    pub const MIN_MASS: f32 = 1.0;
    /// Lander sprite size (px)
    pub const LANDER_WIDTH: f32 = 40.0;
    pub const LANDER_HEIGHT: f32 = 40.0;
    /// Lander spawn height (px from the top)
    pub const SPAWN_Y: f32 = 50.0;

    /// Pad sprite width (px); the landing hitbox is 80% of it
    pub const PAD_WIDTH: f32 = 120.0;
    pub const PAD_HEIGHT: f32 = 30.0;
    pub const PAD_HITBOX_RATIO: f32 = 0.8;
    pub const PAD_HITBOX_HEIGHT: f32 = 10.0;

    /// Thrust particles
    pub const PARTICLE_SIZE: f32 = 4.0;
    /// Base particle speed in px/s (2 px per frame)
    pub const PARTICLE_SPEED: f32 = 120.0;
    pub const PARTICLE_LIFE: f32 = 0.5;
    pub const PARTICLE_COLOR: u32 = 0x87ceeb;
    /// Offset of the nozzle from the lander centre (px)
    pub const NOZZLE_OFFSET: f32 = 18.0;

    /// Hub player speed (5 px per frame)
    pub const PLAYER_SPEED: f32 = 300.0;
    pub const PLAYER_HEIGHT: f32 = 200.0;
    pub const PLAYER_WIDTH: f32 = 100.0;

    /// Camera smoothing factor (fraction of the remaining distance per tick)
    pub const CAMERA_LERP: f32 = 0.08;
}

/// Move `current` a fraction `t` of the way toward `target`
#[inline]
pub fn lerp(current: f32, target: f32, t: f32) -> f32 {
    current + (target - current) * t
}

/// Convert a 0xRRGGBB color to normalized RGBA
#[inline]
pub fn rgb(hex: u32, alpha: f32) -> [f32; 4] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
        alpha,
    ]
}

/// Screen or viewport size in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Scale a fractional (0..1) position to pixels
    #[inline]
    pub fn scale(&self, frac: Vec2) -> Vec2 {
        Vec2::new(frac.x * self.width, frac.y * self.height)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_moves_fraction() {
        assert!((lerp(0.0, 100.0, 0.08) - 8.0).abs() < 1e-5);
        assert_eq!(lerp(5.0, 5.0, 0.5), 5.0);
    }

    #[test]
    fn test_rgb_unpacks_channels() {
        let c = rgb(0xff8000, 0.5);
        assert_eq!(c[0], 1.0);
        assert!((c[1] - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c[2], 0.0);
        assert_eq!(c[3], 0.5);
    }

    #[test]
    fn test_viewport_scale() {
        let vp = Viewport::new(800.0, 600.0);
        assert_eq!(vp.scale(Vec2::new(0.5, 0.9)), Vec2::new(400.0, 540.0));
    }
}
