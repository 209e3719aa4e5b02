//! Retained stage graph
//!
//! Every drawable thing a scene owns is a node in this tree. Scenes attach
//! their nodes under a per-scene root; releasing a node releases its whole
//! subtree, which is how level reloads, particle expiry and scene teardown
//! give their render resources back.

use std::collections::HashMap;

use glam::Vec2;

use crate::sim::collision::Rect;

/// Handle to a node in the stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

/// What a node draws
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Invisible container that only positions its children
    Group,
    /// Filled rectangle; `anchor` is the normalized pivot (0.5, 0.5 = centered)
    Rect { size: Vec2, anchor: Vec2 },
    /// Filled circle centered on the node position
    Circle { radius: f32 },
    /// Textured quad. Textures are not decoded here, the key is drawn as a tinted rect.
    Sprite {
        texture: String,
        size: Vec2,
        anchor: Vec2,
    },
}

/// A single stage node
#[derive(Debug, Clone)]
pub struct Node {
    pub shape: Shape,
    /// Position relative to the parent
    pub position: Vec2,
    pub color: [f32; 4],
    pub alpha: f32,
    pub visible: bool,
    /// Draw order, higher on top
    pub z: i32,
    /// Horizontal flip (-1.0 faces left)
    pub flip_x: f32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn with_shape(shape: Shape) -> Self {
        Self {
            shape,
            position: Vec2::ZERO,
            color: [1.0; 4],
            alpha: 1.0,
            visible: true,
            z: 0,
            flip_x: 1.0,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn group() -> Self {
        Self::with_shape(Shape::Group)
    }

    pub fn rect(size: Vec2) -> Self {
        Self::with_shape(Shape::Rect {
            size,
            anchor: Vec2::splat(0.5),
        })
    }

    pub fn circle(radius: f32) -> Self {
        Self::with_shape(Shape::Circle { radius })
    }

    pub fn sprite(texture: impl Into<String>, size: Vec2) -> Self {
        Self::with_shape(Shape::Sprite {
            texture: texture.into(),
            size,
            anchor: Vec2::splat(0.5),
        })
    }

    pub fn at(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    pub fn z(mut self, z: i32) -> Self {
        self.z = z;
        self
    }

    /// Set the pivot for rect and sprite shapes
    pub fn anchor(mut self, pivot: Vec2) -> Self {
        match &mut self.shape {
            Shape::Rect { anchor, .. } | Shape::Sprite { anchor, .. } => *anchor = pivot,
            Shape::Group | Shape::Circle { .. } => {}
        }
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Local-space bounds of the drawn shape around `origin`
    fn bounds_at(&self, origin: Vec2) -> Option<Rect> {
        match &self.shape {
            Shape::Group => None,
            Shape::Rect { size, anchor } | Shape::Sprite { size, anchor, .. } => {
                let min = origin - *size * *anchor;
                Some(Rect::new(min, min + *size))
            }
            Shape::Circle { radius } => Some(Rect::from_center(origin, Vec2::splat(radius * 2.0))),
        }
    }
}

/// A flattened, world-space draw command
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub shape: Shape,
    pub position: Vec2,
    pub color: [f32; 4],
    pub z: i32,
    pub flip_x: f32,
}

/// The retained node tree
#[derive(Debug)]
pub struct Stage {
    nodes: HashMap<NodeId, Node>,
    root: NodeId,
    next_id: u32,
}

impl Default for Stage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage {
    pub fn new() -> Self {
        let root = NodeId(0);
        let mut nodes = HashMap::new();
        nodes.insert(root, Node::group());
        Self {
            nodes,
            root,
            next_id: 1,
        }
    }

    /// The stage root (never released)
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Attach a node under `parent`. A missing parent falls back to the root.
    pub fn add(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        let parent = if self.nodes.contains_key(&parent) {
            parent
        } else {
            log::warn!("Stage parent {:?} is gone, attaching to root", parent);
            self.root
        };

        let id = NodeId(self.next_id);
        self.next_id += 1;

        node.parent = Some(parent);
        node.children.clear();
        self.nodes.insert(id, node);
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(id);
        }
        id
    }

    /// Release a node and its whole subtree. Returns the number of nodes freed.
    pub fn release(&mut self, id: NodeId) -> usize {
        if id == self.root {
            return 0;
        }
        let Some(node) = self.nodes.get(&id) else {
            return 0;
        };

        if let Some(parent) = node.parent {
            if let Some(p) = self.nodes.get_mut(&parent) {
                p.children.retain(|c| *c != id);
            }
        }

        let mut freed = 0;
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(&next) {
                stack.extend(node.children);
                freed += 1;
            }
        }
        freed
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Live node count, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Number of nodes in the subtree rooted at `id` (0 if released)
    pub fn subtree_len(&self, id: NodeId) -> usize {
        let mut count = 0;
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.get(&next) {
                count += 1;
                stack.extend(node.children.iter().copied());
            }
        }
        count
    }

    pub fn set_position(&mut self, id: NodeId, position: Vec2) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.position = position;
        }
    }

    pub fn set_alpha(&mut self, id: NodeId, alpha: f32) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.alpha = alpha.clamp(0.0, 1.0);
        }
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.visible = visible;
        }
    }

    pub fn set_color(&mut self, id: NodeId, color: [f32; 4]) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.color = color;
        }
    }

    pub fn set_flip(&mut self, id: NodeId, flip_x: f32) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.flip_x = flip_x;
        }
    }

    /// Absolute position of a node (sum of the parent chain)
    pub fn world_position(&self, id: NodeId) -> Vec2 {
        let mut pos = Vec2::ZERO;
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            match self.nodes.get(&current) {
                Some(node) => {
                    pos += node.position;
                    cursor = node.parent;
                }
                None => break,
            }
        }
        pos
    }

    /// World-space bounds of a node's own shape
    pub fn world_bounds(&self, id: NodeId) -> Option<Rect> {
        let node = self.nodes.get(&id)?;
        node.bounds_at(self.world_position(id))
    }

    /// Flatten visible nodes into world-space draw items, sorted by z (stable)
    pub fn draw_list(&self) -> Vec<DrawItem> {
        let mut items = Vec::new();
        self.collect(self.root, Vec2::ZERO, 1.0, &mut items);
        items.sort_by_key(|item| item.z);
        items
    }

    fn collect(&self, id: NodeId, origin: Vec2, alpha: f32, out: &mut Vec<DrawItem>) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        if !node.visible {
            return;
        }

        let position = origin + node.position;
        let alpha = alpha * node.alpha;

        if node.shape != Shape::Group {
            let mut color = node.color;
            color[3] *= alpha;
            out.push(DrawItem {
                shape: node.shape.clone(),
                position,
                color,
                z: node.z,
                flip_x: node.flip_x,
            });
        }

        for child in &node.children {
            self.collect(*child, position, alpha, out);
        }
    }
}
