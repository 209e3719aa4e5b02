//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position (screen pixels) and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Flat stand-in colors for sprites
pub mod colors {
    use crate::platform::assets::keys;

    pub const BACKGROUND: [f32; 4] = [0.02, 0.02, 0.05, 1.0];
    pub const LAB_WALL: [f32; 4] = [0.85, 0.88, 0.9, 1.0];
    pub const PLAYER: [f32; 4] = [0.35, 0.55, 0.95, 1.0];
    pub const PASTEUR: [f32; 4] = [0.45, 0.3, 0.2, 1.0];
    pub const MICROSCOPE: [f32; 4] = [0.3, 0.3, 0.35, 1.0];
    pub const INDICATOR: [f32; 4] = [1.0, 0.85, 0.2, 1.0];
    pub const LANDER: [f32; 4] = [0.9, 0.9, 0.9, 1.0];
    pub const PAD: [f32; 4] = [0.55, 0.55, 0.6, 1.0];
    pub const UNKNOWN: [f32; 4] = [1.0, 0.0, 1.0, 1.0];

    /// Color a sprite is drawn with until textures are uploaded
    pub fn for_texture(texture: &str) -> [f32; 4] {
        match texture {
            t if keys::BG_BIOLOGY.contains(&t) => LAB_WALL,
            keys::PLAYER => PLAYER,
            keys::PASTEUR => PASTEUR,
            keys::MICROSCOPE => MICROSCOPE,
            keys::INDICATOR => INDICATOR,
            keys::LANDER => LANDER,
            keys::PAD => PAD,
            _ => UNKNOWN,
        }
    }
}
