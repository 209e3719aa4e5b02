//! Triangle generation for stage draw items

use glam::Vec2;
use std::f32::consts::PI;

use super::stage::{DrawItem, Shape};
use super::vertex::{Vertex, colors};

/// Segments used for circles (particles are only a few pixels wide)
const CIRCLE_SEGMENTS: u32 = 12;

/// Generate vertices for an axis-aligned filled rectangle
pub fn rect(min: Vec2, size: Vec2, color: [f32; 4]) -> [Vertex; 6] {
    let max = min + size;
    [
        Vertex::new(min.x, min.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(max.x, max.y, color),
    ]
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Top-left corner of an anchored box; a flipped box mirrors its pivot
fn anchored_min(position: Vec2, size: Vec2, anchor: Vec2, flip_x: f32) -> Vec2 {
    let pivot_x = if flip_x < 0.0 { 1.0 - anchor.x } else { anchor.x };
    position - size * Vec2::new(pivot_x, anchor.y)
}

fn tint(base: [f32; 4], tint: [f32; 4]) -> [f32; 4] {
    [
        base[0] * tint[0],
        base[1] * tint[1],
        base[2] * tint[2],
        base[3] * tint[3],
    ]
}

/// Flatten draw items (already z-sorted) into a triangle list
// TODO: sample the preloaded images once textures are uploaded; sprites are flat quads for now
pub fn build(items: &[DrawItem]) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(items.len() * 6);
    for item in items {
        if item.color[3] <= 0.0 {
            continue;
        }
        match &item.shape {
            Shape::Group => {}
            Shape::Rect { size, anchor } => {
                let min = anchored_min(item.position, *size, *anchor, item.flip_x);
                vertices.extend(rect(min, *size, item.color));
            }
            Shape::Sprite {
                texture,
                size,
                anchor,
            } => {
                let min = anchored_min(item.position, *size, *anchor, item.flip_x);
                let color = tint(colors::for_texture(texture), item.color);
                vertices.extend(rect(min, *size, color));
            }
            Shape::Circle { radius } => {
                vertices.extend(circle(item.position, *radius, item.color, CIRCLE_SEGMENTS));
            }
        }
    }
    vertices
}
