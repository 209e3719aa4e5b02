//! Camera follower for the panoramic hub
//!
//! The world container is shifted left by the camera offset. The offset eases
//! toward centering the target and never shows past either edge of the world.

use crate::consts::CAMERA_LERP;
use crate::lerp;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Horizontal offset applied to the world container (always <= 0)
    pub offset: f32,
    pub viewport_width: f32,
    pub world_width: f32,
    pub smoothing: f32,
}

impl Camera {
    pub fn new(viewport_width: f32, world_width: f32) -> Self {
        Self {
            offset: 0.0,
            viewport_width,
            world_width,
            smoothing: CAMERA_LERP,
        }
    }

    /// Offset that centers `target_x`, kept inside the world
    pub fn desired(&self, target_x: f32) -> f32 {
        let min = -(self.world_width - self.viewport_width).max(0.0);
        (-target_x + self.viewport_width / 2.0).clamp(min, 0.0)
    }

    pub fn update(&mut self, target_x: f32) {
        self.offset = lerp(self.offset, self.desired(target_x), self.smoothing);
    }

    /// Jump straight to the target
    pub fn snap(&mut self, target_x: f32) {
        self.offset = self.desired(target_x);
    }

    pub fn screen_to_world(&self, screen_x: f32) -> f32 {
        screen_x - self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_moves_eight_percent_per_tick() {
        let mut cam = Camera::new(800.0, 3000.0);
        cam.update(1400.0);
        // desired = -1400 + 400 = -1000
        assert!((cam.offset - (-80.0)).abs() < 1e-4);
    }

    #[test]
    fn test_left_edge_clamp() {
        let cam = Camera::new(800.0, 3000.0);
        assert_eq!(cam.desired(100.0), 0.0);
    }

    #[test]
    fn test_right_edge_clamp() {
        let cam = Camera::new(800.0, 3000.0);
        assert_eq!(cam.desired(2990.0), -2200.0);
    }

    #[test]
    fn test_world_narrower_than_viewport_stays_put() {
        let mut cam = Camera::new(1200.0, 800.0);
        cam.update(700.0);
        assert_eq!(cam.offset, 0.0);
    }

    proptest! {
        #[test]
        fn prop_offset_stays_in_bounds(
            targets in prop::collection::vec(-1000.0f32..5000.0, 1..200),
        ) {
            let mut cam = Camera::new(800.0, 3000.0);
            for x in targets {
                cam.update(x);
                prop_assert!(cam.offset <= 0.0);
                prop_assert!(cam.offset >= -2200.0 - 1e-3);
            }
        }
    }
}
