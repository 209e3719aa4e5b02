//! Lander body and its semi-implicit integrator

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use crate::consts::*;

/// Clamp a mass to something the integrator can divide by
pub fn sanitize_mass(mass: f32) -> f32 {
    if mass.is_finite() && mass >= MIN_MASS {
        mass
    } else {
        MIN_MASS
    }
}

/// Point mass driven by gravity and thrust
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Always >= MIN_MASS, see `set_mass`
    mass: f32,
    pub thrust_force: f32,
    /// Frozen after any verdict; only a level load clears it
    pub landed: bool,
    /// Sprite size used for bounds
    pub size: Vec2,
}

impl Body {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            mass: DEFAULT_MASS,
            thrust_force: DEFAULT_THRUST,
            landed: false,
            size: Vec2::new(LANDER_WIDTH, LANDER_HEIGHT),
        }
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn set_mass(&mut self, mass: f32) {
        let clean = sanitize_mass(mass);
        if clean != mass {
            log::warn!("Mass {} rejected, clamped to {}", mass, clean);
        }
        self.mass = clean;
    }

    /// Add force / mass to the velocity right away
    pub fn apply_force(&mut self, force: Vec2) {
        self.vel += force / self.mass;
    }

    /// Advance by `dt` seconds under `gravity` (no-op once landed)
    pub fn step(&mut self, dt: f32, gravity: f32) {
        if self.landed {
            return;
        }
        self.vel.y += gravity * dt;
        self.pos += self.vel * dt;
    }

    /// Bounding box centered on the position
    pub fn bounds(&self) -> Rect {
        Rect::from_center(self.pos, self.size)
    }

    /// Back to spawn: zero velocity, flying again
    pub fn reset(&mut self, pos: Vec2) {
        self.pos = pos;
        self.vel = Vec2::ZERO;
        self.landed = false;
    }

    /// Stop on a pad hitbox: freeze and sit the sprite on the hitbox center line
    pub fn settle_on(&mut self, pad: &Rect) {
        self.landed = true;
        self.vel = Vec2::ZERO;
        self.pos.y = pad.center().y - self.size.y / 2.0 + pad.height() / 2.0;
    }
}
