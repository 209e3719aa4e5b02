//! Clickable things in the hub world (NPCs, props)

use glam::Vec2;

use crate::renderer::stage::{Node, NodeId, Stage};
use crate::sim::collision::Rect;

/// A world object that runs an action when clicked, while enabled
///
/// `A` is whatever the owning scene wants back: usually a small enum.
#[derive(Debug)]
pub struct Interactable<A> {
    pub name: &'static str,
    /// Bottom-center anchor in world space
    pub anchor: Vec2,
    pub size: Vec2,
    action: Option<A>,
    node: NodeId,
}

impl<A: Clone> Interactable<A> {
    /// Sprite anchored at its bottom center, disabled until `enable`
    pub fn new(
        stage: &mut Stage,
        parent: NodeId,
        name: &'static str,
        texture: &str,
        anchor: Vec2,
        size: Vec2,
    ) -> Self {
        let node = stage.add(
            parent,
            Node::sprite(texture, size)
                .anchor(Vec2::new(0.5, 1.0))
                .at(anchor)
                .z(10),
        );
        Self {
            name,
            anchor,
            size,
            action: None,
            node,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Replace whatever action was set before
    pub fn enable(&mut self, action: A) {
        self.action = Some(action);
    }

    pub fn disable(&mut self) {
        self.action = None;
    }

    pub fn is_enabled(&self) -> bool {
        self.action.is_some()
    }

    pub fn bounds(&self) -> Rect {
        let min = Vec2::new(self.anchor.x - self.size.x / 2.0, self.anchor.y - self.size.y);
        Rect::new(min, min + self.size)
    }

    /// Top-center, where an indicator hangs from
    pub fn top(&self) -> Vec2 {
        Vec2::new(self.anchor.x, self.anchor.y - self.size.y)
    }

    /// The action, if enabled and `world` is on the object
    pub fn hit(&self, world: Vec2) -> Option<A> {
        self.action
            .as_ref()
            .filter(|_| self.bounds().contains(world))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Act {
        Talk,
        Use,
    }

    fn prop_at(stage: &mut Stage) -> Interactable<Act> {
        let root = stage.root();
        Interactable::new(
            stage,
            root,
            "microscope",
            "m.png",
            Vec2::new(1500.0, 670.0),
            Vec2::new(120.0, 160.0),
        )
    }

    #[test]
    fn test_disabled_by_default() {
        let mut stage = Stage::new();
        let obj = prop_at(&mut stage);
        assert_eq!(obj.hit(Vec2::new(1500.0, 600.0)), None);
    }

    #[test]
    fn test_enable_replaces_previous_action() {
        let mut stage = Stage::new();
        let mut obj = prop_at(&mut stage);
        obj.enable(Act::Talk);
        obj.enable(Act::Use);
        assert_eq!(obj.hit(Vec2::new(1500.0, 600.0)), Some(Act::Use));
        obj.disable();
        assert_eq!(obj.hit(Vec2::new(1500.0, 600.0)), None);
    }

    #[test]
    fn test_hit_uses_bottom_anchor() {
        let mut stage = Stage::new();
        let mut obj = prop_at(&mut stage);
        obj.enable(Act::Use);
        assert!(obj.hit(Vec2::new(1500.0, 680.0)).is_none());
        assert!(obj.hit(Vec2::new(1445.0, 515.0)).is_some());
        assert_eq!(obj.top(), Vec2::new(1500.0, 510.0));
    }
}
