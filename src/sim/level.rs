//! Level table and loader
//!
//! Levels are authored in fractional screen coordinates so a layout looks the
//! same at any resolution. Loading a level always releases the previous pad
//! and obstacles before building the new ones.

use glam::Vec2;

use super::collision::Rect;
use crate::Viewport;
use crate::consts::*;
use crate::platform::assets::keys;
use crate::renderer::stage::{Node, NodeId, Stage};
use crate::rgb;

/// An obstacle: fractional center, size in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleSpec {
    pub pos: Vec2,
    pub size: Vec2,
}

/// One level of the landing course
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelSpec {
    /// Fractional position of the pad anchor (bottom center of the pad sprite)
    pub pad: Vec2,
    pub obstacles: &'static [ObstacleSpec],
}

const fn obstacle(x: f32, y: f32, w: f32, h: f32) -> ObstacleSpec {
    ObstacleSpec {
        pos: Vec2::new(x, y),
        size: Vec2::new(w, h),
    }
}

/// The training course, tutorial first
pub const LEVELS: &[LevelSpec] = &[
    LevelSpec {
        pad: Vec2::new(0.5, 0.9),
        obstacles: &[],
    },
    LevelSpec {
        pad: Vec2::new(0.75, 0.9),
        obstacles: &[obstacle(0.5, 0.5, 600.0, 20.0)],
    },
    LevelSpec {
        pad: Vec2::new(0.25, 0.9),
        obstacles: &[obstacle(0.4, 0.6, 300.0, 20.0), obstacle(0.2, 0.3, 300.0, 20.0)],
    },
    LevelSpec {
        pad: Vec2::new(0.8, 0.9),
        obstacles: &[obstacle(0.9, 0.4, 20.0, 150.0), obstacle(0.6, 0.7, 20.0, 150.0)],
    },
];

/// Result of moving past the current level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the given level
    Next(usize),
    /// Finished the last level and wrapped to level 0
    CourseComplete,
}

/// Tracks the current level index; always in `[0, levels.len())`
#[derive(Debug, Clone)]
pub struct Course {
    levels: &'static [LevelSpec],
    current: usize,
}

impl Default for Course {
    fn default() -> Self {
        Self::new(LEVELS)
    }
}

impl Course {
    pub fn new(levels: &'static [LevelSpec]) -> Self {
        assert!(!levels.is_empty(), "a course needs at least one level");
        Self { levels, current: 0 }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn spec(&self) -> &LevelSpec {
        &self.levels[self.current]
    }

    /// Jump to a level, wrapping out-of-range indices
    pub fn select(&mut self, index: usize) {
        self.current = index % self.levels.len();
    }

    pub fn advance(&mut self) -> Advance {
        self.current += 1;
        if self.current >= self.levels.len() {
            self.current = 0;
            Advance::CourseComplete
        } else {
            Advance::Next(self.current)
        }
    }
}

/// The landing pad: sprite anchor plus the logical hitbox
#[derive(Debug, Clone)]
pub struct Pad {
    pub anchor: Vec2,
    pub hitbox: Rect,
    node: NodeId,
}

#[derive(Debug, Clone)]
pub struct Obstacle {
    pub bounds: Rect,
    node: NodeId,
}

/// Pad and obstacles of the loaded level, with their stage nodes
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub pad: Option<Pad>,
    pub obstacles: Vec<Obstacle>,
    obstacle_bounds: Vec<Rect>,
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Release the current layout, then materialize `spec` under `parent`
    pub fn load(&mut self, stage: &mut Stage, parent: NodeId, spec: &LevelSpec, screen: Viewport) {
        self.clear(stage);

        let anchor = screen.scale(spec.pad);
        let node = stage.add(
            parent,
            Node::sprite(keys::PAD, Vec2::new(PAD_WIDTH, PAD_HEIGHT))
                .anchor(Vec2::new(0.5, 1.0))
                .at(anchor)
                .color(rgb(0xb0b0c0, 1.0))
                .z(5),
        );
        let hitbox = Rect::from_center(
            anchor,
            Vec2::new(PAD_WIDTH * PAD_HITBOX_RATIO, PAD_HITBOX_HEIGHT),
        );
        self.pad = Some(Pad {
            anchor,
            hitbox,
            node,
        });

        for obs in spec.obstacles {
            let center = screen.scale(obs.pos);
            let node = stage.add(
                parent,
                Node::rect(obs.size)
                    .at(center)
                    .color(rgb(0xff0000, 0.35))
                    .z(4),
            );
            self.obstacles.push(Obstacle {
                bounds: Rect::from_center(center, obs.size),
                node,
            });
        }
        self.obstacle_bounds = self.obstacles.iter().map(|o| o.bounds).collect();
    }

    /// Release every node this layout owns
    pub fn clear(&mut self, stage: &mut Stage) {
        for obs in self.obstacles.drain(..) {
            stage.release(obs.node);
        }
        if let Some(pad) = self.pad.take() {
            stage.release(pad.node);
        }
        self.obstacle_bounds.clear();
    }

    pub fn obstacle_bounds(&self) -> &[Rect] {
        &self.obstacle_bounds
    }

    pub fn pad_hitbox(&self) -> Option<Rect> {
        self.pad.as_ref().map(|p| p.hitbox)
    }

    /// Obstacles plus the pad
    pub fn node_count(&self) -> usize {
        self.obstacles.len() + usize::from(self.pad.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_course_wraps_with_complete() {
        let mut course = Course::default();
        assert_eq!(course.advance(), Advance::Next(1));
        assert_eq!(course.advance(), Advance::Next(2));
        assert_eq!(course.advance(), Advance::Next(3));
        assert_eq!(course.advance(), Advance::CourseComplete);
        assert_eq!(course.current(), 0);
    }

    #[test]
    fn test_layout_scales_to_screen() {
        let mut stage = Stage::new();
        let root = stage.root();
        let mut layout = Layout::new();
        layout.load(&mut stage, root, &LEVELS[1], Viewport::new(1000.0, 800.0));

        let pad = layout.pad.as_ref().unwrap();
        assert_eq!(pad.anchor, Vec2::new(750.0, 720.0));
        assert_eq!(pad.hitbox.width(), PAD_WIDTH * PAD_HITBOX_RATIO);
        assert_eq!(pad.hitbox.center(), pad.anchor);

        let obs = layout.obstacle_bounds()[0];
        assert_eq!(obs.center(), Vec2::new(500.0, 400.0));
        assert_eq!(obs.width(), 600.0);
    }

    #[test]
    fn test_clear_releases_nodes() {
        let mut stage = Stage::new();
        let root = stage.root();
        let mut layout = Layout::new();
        layout.load(&mut stage, root, &LEVELS[3], Viewport::default());
        assert_eq!(stage.len(), 1 + 3);
        layout.clear(&mut stage);
        assert_eq!(stage.len(), 1);
        assert_eq!(layout.node_count(), 0);
    }

    proptest! {
        #[test]
        fn prop_reload_never_doubles(level in 0usize..4, repeats in 1usize..5) {
            let mut stage = Stage::new();
            let root = stage.root();
            let mut layout = Layout::new();
            for _ in 0..repeats {
                layout.load(&mut stage, root, &LEVELS[level], Viewport::default());
            }
            let expected = LEVELS[level].obstacles.len() + 1;
            prop_assert_eq!(layout.node_count(), expected);
            prop_assert_eq!(stage.len(), expected + 1);
        }
    }
}
