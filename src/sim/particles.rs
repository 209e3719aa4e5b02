//! Thrust particles
//!
//! Decorative only: never feed back into the simulation. Each particle owns a
//! stage node that is released the tick its life runs out.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::renderer::stage::{Node, NodeId, Stage};
use crate::rgb;

/// Spread of the exhaust cone (radians, total)
const SPREAD: f32 = std::f32::consts::FRAC_PI_4;

/// A single exhaust particle
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32,
    pub max_life: f32,
    node: NodeId,
}

/// Spawns, ages and releases thrust particles
#[derive(Debug)]
pub struct ParticleEmitter {
    particles: Vec<Particle>,
    rng: Pcg32,
    /// Reduced motion turns emission off
    pub enabled: bool,
}

impl ParticleEmitter {
    pub fn new(seed: u64) -> Self {
        Self {
            particles: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            enabled: true,
        }
    }

    /// Emit one particle at `origin` heading roughly along `dir`
    pub fn emit(&mut self, stage: &mut Stage, parent: NodeId, origin: Vec2, dir: Vec2) {
        if !self.enabled {
            return;
        }

        let base = dir.y.atan2(dir.x);
        let angle = base + (self.rng.random::<f32>() - 0.5) * SPREAD;
        let speed = PARTICLE_SPEED * (1.0 + self.rng.random::<f32>());

        let node = stage.add(
            parent,
            Node::circle(PARTICLE_SIZE)
                .at(origin)
                .color(rgb(PARTICLE_COLOR, 1.0))
                .z(8),
        );
        self.particles.push(Particle {
            pos: origin,
            vel: Vec2::new(angle.cos(), angle.sin()) * speed,
            life: PARTICLE_LIFE,
            max_life: PARTICLE_LIFE,
            node,
        });
    }

    /// Age, move and fade particles; release the dead ones
    pub fn update(&mut self, stage: &mut Stage, dt: f32) {
        self.particles.retain_mut(|p| {
            p.life -= dt;
            if p.life <= 0.0 {
                stage.release(p.node);
                return false;
            }
            p.pos += p.vel * dt;
            stage.set_position(p.node, p.pos);
            stage.set_alpha(p.node, p.life / p.max_life);
            true
        });
    }

    pub fn clear(&mut self, stage: &mut Stage) {
        for p in self.particles.drain(..) {
            stage.release(p.node);
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_particles_expire_and_release_nodes() {
        let mut stage = Stage::new();
        let root = stage.root();
        let mut emitter = ParticleEmitter::new(7);
        for _ in 0..5 {
            emitter.emit(&mut stage, root, Vec2::new(100.0, 100.0), Vec2::Y);
        }
        assert_eq!(emitter.len(), 5);
        assert_eq!(stage.len(), 6);

        emitter.update(&mut stage, 0.25);
        assert_eq!(emitter.len(), 5);

        emitter.update(&mut stage, 0.25);
        assert!(emitter.is_empty());
        assert_eq!(stage.len(), 1);
    }

    #[test]
    fn test_particles_head_along_direction() {
        let mut stage = Stage::new();
        let root = stage.root();
        let mut emitter = ParticleEmitter::new(42);
        for _ in 0..20 {
            emitter.emit(&mut stage, root, Vec2::ZERO, Vec2::Y);
        }
        for p in emitter.iter() {
            // Within the cone around +Y
            assert!(p.vel.y > 0.0);
            let angle = p.vel.x.atan2(p.vel.y).abs();
            assert!(angle <= SPREAD / 2.0 + 1e-4);
            let speed = p.vel.length();
            assert!(speed >= PARTICLE_SPEED - 1e-3 && speed <= PARTICLE_SPEED * 2.0 + 1e-3);
        }
    }

    #[test]
    fn test_disabled_emitter_spawns_nothing() {
        let mut stage = Stage::new();
        let root = stage.root();
        let mut emitter = ParticleEmitter::new(1);
        emitter.enabled = false;
        emitter.emit(&mut stage, root, Vec2::ZERO, Vec2::X);
        assert!(emitter.is_empty());
        assert_eq!(stage.len(), 1);
    }

    #[test]
    fn test_alpha_fades_with_life() {
        let mut stage = Stage::new();
        let root = stage.root();
        let mut emitter = ParticleEmitter::new(3);
        emitter.emit(&mut stage, root, Vec2::ZERO, Vec2::X);
        emitter.update(&mut stage, 0.25);
        let p = emitter.iter().next().unwrap();
        let alpha = stage.get(p.node).unwrap().alpha;
        assert!((alpha - 0.5).abs() < 1e-5);
    }
}
