//! Hub player controller
//!
//! Keyboard walking, pointer dragging, world bounds and the idle/walk
//! animation switch. Positions are in world space (before the camera offset).

use glam::Vec2;

use crate::consts::*;
use crate::platform::assets::keys;
use crate::platform::input::{InputState, KEYS_DOWN, KEYS_LEFT, KEYS_RIGHT, KEYS_UP};
use crate::renderer::stage::{Node, NodeId, Stage};
use crate::sim::collision::Rect;

/// Walkable area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerBounds {
    pub min_y: f32,
    pub max_y: f32,
    pub world_width: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anim {
    Idle,
    Walk,
}

impl Anim {
    /// Animation frames advanced per 60 Hz tick
    pub fn speed(&self) -> f32 {
        match self {
            Anim::Idle => 0.05,
            Anim::Walk => 0.1,
        }
    }
}

#[derive(Debug)]
pub struct Player {
    pub pos: Vec2,
    /// 1.0 faces right, -1.0 faces left
    pub facing: f32,
    pub size: Vec2,
    pub bounds: PlayerBounds,
    anim: Anim,
    /// Fractional animation frame
    frame: f32,
    can_move: bool,
    dragging: bool,
    node: NodeId,
}

impl Player {
    pub fn new(stage: &mut Stage, parent: NodeId, bounds: PlayerBounds) -> Self {
        let pos = Vec2::new(300.0, (bounds.min_y + bounds.max_y) / 2.0);
        let size = Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT);
        let node = stage.add(parent, Node::sprite(keys::PLAYER, size).at(pos).z(20));
        let mut player = Self {
            pos,
            facing: 1.0,
            size,
            bounds,
            anim: Anim::Idle,
            frame: 0.0,
            can_move: true,
            dragging: false,
            node,
        };
        player.enforce_bounds();
        player
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn anim(&self) -> Anim {
        self.anim
    }

    pub fn frame(&self) -> f32 {
        self.frame
    }

    pub fn can_move(&self) -> bool {
        self.can_move
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn hitbox(&self) -> Rect {
        Rect::from_center(self.pos, self.size)
    }

    /// Walk, clamp and animate; returns true if the keyboard moved the player
    pub fn update(&mut self, input: &InputState, dt: f32, stage: &mut Stage) -> bool {
        if !self.can_move {
            return false;
        }

        let moving = !self.dragging && self.walk(input, dt);
        self.enforce_bounds();
        self.set_anim(if moving { Anim::Walk } else { Anim::Idle });
        self.frame += self.anim.speed() * dt * 60.0;
        self.sync(stage);
        moving
    }

    fn walk(&mut self, input: &InputState, dt: f32) -> bool {
        let step = PLAYER_SPEED * dt;
        let mut moving = false;
        if input.any_pressed(KEYS_UP) {
            self.pos.y -= step;
            moving = true;
        }
        if input.any_pressed(KEYS_DOWN) {
            self.pos.y += step;
            moving = true;
        }
        if input.any_pressed(KEYS_LEFT) {
            self.pos.x -= step;
            self.facing = -1.0;
            moving = true;
        }
        if input.any_pressed(KEYS_RIGHT) {
            self.pos.x += step;
            self.facing = 1.0;
            moving = true;
        }
        moving
    }

    fn enforce_bounds(&mut self) {
        let half = self.size.x / 2.0;
        let max_x = (self.bounds.world_width - half).max(half);
        self.pos.x = self.pos.x.clamp(half, max_x);
        self.pos.y = self.pos.y.clamp(self.bounds.min_y, self.bounds.max_y.max(self.bounds.min_y));
    }

    /// Switch animation only on change so the frame counter isn't reset every tick
    fn set_anim(&mut self, anim: Anim) {
        if self.anim != anim {
            self.anim = anim;
            self.frame = 0.0;
        }
    }

    fn sync(&self, stage: &mut Stage) {
        stage.set_position(self.node, self.pos);
        stage.set_flip(self.node, self.facing);
        stage.set_alpha(self.node, if self.dragging { 0.8 } else { 1.0 });
    }

    /// Pointer pressed at `world`; starts a drag if it hits the player
    pub fn pointer_down(&mut self, world: Vec2, stage: &mut Stage) -> bool {
        if !self.can_move || !self.hitbox().contains(world) {
            return false;
        }
        self.dragging = true;
        self.pos = world;
        self.sync(stage);
        true
    }

    pub fn pointer_move(&mut self, world: Vec2, stage: &mut Stage) {
        if self.dragging {
            self.pos = world;
            self.enforce_bounds();
            self.sync(stage);
        }
    }

    pub fn pointer_up(&mut self, stage: &mut Stage) {
        if self.dragging {
            self.dragging = false;
            self.sync(stage);
        }
    }

    /// Freeze for dialogue: held keys and drag are dropped, animation goes idle
    pub fn lock_movement(&mut self, input: &mut InputState, stage: &mut Stage) {
        self.can_move = false;
        input.reset();
        self.dragging = false;
        self.set_anim(Anim::Idle);
        self.sync(stage);
    }

    pub fn unlock_movement(&mut self) {
        self.can_move = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::input::InputEvent;

    fn bounds() -> PlayerBounds {
        PlayerBounds {
            min_y: 300.0,
            max_y: 640.0,
            world_width: 3000.0,
        }
    }

    fn setup() -> (Stage, Player, InputState) {
        let mut stage = Stage::new();
        let root = stage.root();
        let player = Player::new(&mut stage, root, bounds());
        (stage, player, InputState::new())
    }

    #[test]
    fn test_starts_mid_band() {
        let (_, player, _) = setup();
        assert_eq!(player.pos, Vec2::new(300.0, 470.0));
        assert_eq!(player.anim(), Anim::Idle);
    }

    #[test]
    fn test_walks_five_px_per_tick_and_faces() {
        let (mut stage, mut player, mut input) = setup();
        input.apply(&InputEvent::key_down("a"));
        assert!(player.update(&input, SIM_DT, &mut stage));
        assert!((player.pos.x - 295.0).abs() < 1e-3);
        assert_eq!(player.facing, -1.0);
        assert_eq!(player.anim(), Anim::Walk);
        assert_eq!(stage.get(player.node()).unwrap().flip_x, -1.0);
    }

    #[test]
    fn test_bounds_hold() {
        let (mut stage, mut player, mut input) = setup();
        input.apply(&InputEvent::key_down("arrowup"));
        input.apply(&InputEvent::key_down("arrowleft"));
        for _ in 0..200 {
            player.update(&input, SIM_DT, &mut stage);
        }
        assert_eq!(player.pos, Vec2::new(PLAYER_WIDTH / 2.0, 300.0));
    }

    #[test]
    fn test_lock_clears_keys_and_idles() {
        let (mut stage, mut player, mut input) = setup();
        input.apply(&InputEvent::key_down("d"));
        player.update(&input, SIM_DT, &mut stage);
        player.lock_movement(&mut input, &mut stage);
        assert_eq!(input.held_count(), 0);
        assert_eq!(player.anim(), Anim::Idle);
        let x = player.pos.x;
        input.apply(&InputEvent::key_down("d"));
        assert!(!player.update(&input, SIM_DT, &mut stage));
        assert_eq!(player.pos.x, x);
        player.unlock_movement();
        assert!(player.update(&input, SIM_DT, &mut stage));
    }

    #[test]
    fn test_drag_overrides_keyboard() {
        let (mut stage, mut player, mut input) = setup();
        assert!(player.pointer_down(player.pos, &mut stage));
        player.pointer_move(Vec2::new(900.0, 500.0), &mut stage);
        input.apply(&InputEvent::key_down("d"));
        assert!(!player.update(&input, SIM_DT, &mut stage));
        assert_eq!(player.pos, Vec2::new(900.0, 500.0));
        assert_eq!(stage.get(player.node()).unwrap().alpha, 0.8);
        player.pointer_up(&mut stage);
        assert!(!player.is_dragging());
    }

    #[test]
    fn test_pointer_off_player_does_not_drag() {
        let (mut stage, mut player, _) = setup();
        assert!(!player.pointer_down(Vec2::new(2000.0, 400.0), &mut stage));
        assert!(!player.is_dragging());
    }
}
