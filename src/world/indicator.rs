//! Floating "!" balloon over whatever the player should interact with next

use glam::Vec2;

use crate::platform::assets::keys;
use crate::renderer::stage::{Node, NodeId, Stage};
use crate::sim::collision::Rect;

/// Default height above the target's top edge
pub const DEFAULT_OFFSET_Y: f32 = -150.0;
const FLOAT_AMPLITUDE: f32 = 6.0;
/// Radians per millisecond
const FLOAT_SPEED: f32 = 0.003;
const SIZE: Vec2 = Vec2::new(48.0, 48.0);

#[derive(Debug)]
pub struct Indicator<A> {
    target: Option<(Vec2, A)>,
    offset_y: f32,
    elapsed_ms: f32,
    pos: Vec2,
    node: NodeId,
}

impl<A: Clone> Indicator<A> {
    pub fn new(stage: &mut Stage, parent: NodeId) -> Self {
        let node = stage.add(
            parent,
            Node::sprite(keys::INDICATOR, SIZE)
                .anchor(Vec2::new(0.5, 1.0))
                .z(50),
        );
        stage.set_visible(node, false);
        Self {
            target: None,
            offset_y: DEFAULT_OFFSET_Y,
            elapsed_ms: 0.0,
            pos: Vec2::ZERO,
            node,
        }
    }

    /// Hang `offset_y` from `anchor` (normally the target's top); clicking runs `action`
    pub fn set_target(&mut self, anchor: Vec2, offset_y: f32, action: A, stage: &mut Stage) {
        self.target = Some((anchor, action));
        self.offset_y = offset_y;
        self.place(stage);
    }

    pub fn hide(&mut self, stage: &mut Stage) {
        self.target = None;
        stage.set_visible(self.node, false);
    }

    pub fn is_visible(&self) -> bool {
        self.target.is_some()
    }

    pub fn position(&self) -> Vec2 {
        self.pos
    }

    pub fn update(&mut self, dt: f32, stage: &mut Stage) {
        self.elapsed_ms += dt * 1000.0;
        self.place(stage);
    }

    fn place(&mut self, stage: &mut Stage) {
        let Some((anchor, _)) = &self.target else {
            stage.set_visible(self.node, false);
            return;
        };
        let bob = (self.elapsed_ms * FLOAT_SPEED).sin() * FLOAT_AMPLITUDE;
        self.pos = Vec2::new(anchor.x, anchor.y + self.offset_y + bob);
        stage.set_position(self.node, self.pos);
        stage.set_visible(self.node, true);
    }

    /// The action if `world` is on the balloon
    pub fn hit(&self, world: Vec2) -> Option<A> {
        let (_, action) = self.target.as_ref()?;
        let min = Vec2::new(self.pos.x - SIZE.x / 2.0, self.pos.y - SIZE.y);
        Rect::new(min, min + SIZE)
            .contains(world)
            .then(|| action.clone())
    }
}
