//! Landing minigame state
//!
//! Everything the lander needs between ticks: the body, the loaded level, the
//! exhaust particles and the deferred actions that follow a verdict.

use glam::Vec2;

use super::body::Body;
use super::collision::{FailReason, LandingGrade};
use super::level::{Advance, Course, Layout};
use super::particles::ParticleEmitter;
use super::timer::Timers;
use crate::Settings;
use crate::Viewport;
use crate::consts::*;
use crate::renderer::stage::{Node, NodeId, Stage};
use crate::rgb;

/// Where the current attempt stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandingPhase {
    Flying,
    /// Touched down; the consequence is pending on a timer
    Landed(LandingGrade),
    /// Showing the failure dialog until restart
    Failed(FailReason),
}

/// Work deferred by a verdict
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LandingAction {
    AdvanceLevel,
    Fail(FailReason),
    ExpireMessage(u32),
}

impl LandingAction {
    /// Actions that belong to the current attempt (not message expiry)
    fn is_attempt(&self) -> bool {
        matches!(self, LandingAction::AdvanceLevel | LandingAction::Fail(_))
    }
}

/// What a tick produced, for the scene to present
#[derive(Debug, Clone, PartialEq)]
pub enum LandingEvent {
    LevelLoaded(usize),
    /// Floating message; `color` is 0xRRGGBB
    Message { id: u32, text: String, color: u32 },
    MessageExpired(u32),
    Landed { impact: f32, grade: LandingGrade },
    Failed(FailReason),
    LevelComplete { next: usize },
    CourseComplete,
}

pub const MESSAGE_SUCCESS: u32 = 0x2ecc71;
pub const MESSAGE_ERROR: u32 = 0xe74c3c;
pub const MESSAGE_INFO: u32 = 0x3498db;

/// The landing minigame
#[derive(Debug)]
pub struct LandingState {
    pub body: Body,
    pub gravity: f32,
    pub course: Course,
    pub layout: Layout,
    pub particles: ParticleEmitter,
    pub timers: Timers<LandingAction>,
    pub screen: Viewport,
    pub phase: LandingPhase,
    /// Set once the last level has been cleared; reveals the sliders
    pub course_completed: bool,
    root: NodeId,
    lander: NodeId,
    next_message: u32,
}

impl LandingState {
    /// Build the minigame under `parent` and load level 0
    pub fn new(stage: &mut Stage, parent: NodeId, screen: Viewport, seed: u64) -> Self {
        let root = stage.add(parent, Node::group());
        let spawn = Self::spawn_point(screen);
        let lander = stage.add(
            root,
            Node::sprite(
                crate::platform::assets::keys::LANDER,
                Vec2::new(LANDER_WIDTH, LANDER_HEIGHT),
            )
            .at(spawn)
            .color(rgb(0xdddddd, 1.0))
            .z(10),
        );

        let mut state = Self {
            body: Body::new(spawn),
            gravity: DEFAULT_GRAVITY,
            course: Course::default(),
            layout: Layout::new(),
            particles: ParticleEmitter::new(seed),
            timers: Timers::new(),
            screen,
            phase: LandingPhase::Flying,
            course_completed: false,
            root,
            lander,
            next_message: 0,
        };
        state.load_level(stage, 0);
        state
    }

    pub fn spawn_point(screen: Viewport) -> Vec2 {
        Vec2::new(screen.width / 2.0, SPAWN_Y)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn lander_node(&self) -> NodeId {
        self.lander
    }

    /// Copy the slider-backed tunables into the live simulation
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.gravity = settings.gravity;
        self.body.thrust_force = settings.thrust_force;
        self.body.set_mass(settings.mass);
        self.particles.enabled = settings.particles_enabled();
    }

    /// Rebuild level `index` and put the lander back at spawn
    pub fn load_level(&mut self, stage: &mut Stage, index: usize) -> LandingEvent {
        self.timers.cancel_where(LandingAction::is_attempt);
        self.course.select(index);
        self.layout
            .load(stage, self.root, self.course.spec(), self.screen);
        self.particles.clear(stage);

        let spawn = Self::spawn_point(self.screen);
        self.body.reset(spawn);
        stage.set_position(self.lander, spawn);
        self.phase = LandingPhase::Flying;

        log::info!("Loaded landing level {}", self.course.current() + 1);
        LandingEvent::LevelLoaded(self.course.current())
    }

    pub fn restart_level(&mut self, stage: &mut Stage) -> LandingEvent {
        self.load_level(stage, self.course.current())
    }

    /// Move on after a soft landing
    pub fn advance(&mut self, stage: &mut Stage) -> Vec<LandingEvent> {
        let mut events = Vec::new();
        match self.course.advance() {
            Advance::Next(next) => {
                events.push(self.message(&format!("Level {}!", next + 1), MESSAGE_INFO));
                events.push(self.load_level(stage, next));
                events.push(LandingEvent::LevelComplete { next });
            }
            Advance::CourseComplete => {
                log::info!("Landing course complete");
                self.course_completed = true;
                events.push(self.message("Training complete!", MESSAGE_INFO));
                events.push(self.load_level(stage, 0));
                events.push(LandingEvent::CourseComplete);
            }
        }
        events
    }

    /// Queue a floating message that expires after `MESSAGE_TTL`
    pub fn message(&mut self, text: &str, color: u32) -> LandingEvent {
        self.next_message += 1;
        let id = self.next_message;
        self.timers
            .schedule(MESSAGE_TTL, LandingAction::ExpireMessage(id));
        LandingEvent::Message {
            id,
            text: text.to_string(),
            color,
        }
    }

    /// Release every node and drop pending timers
    pub fn teardown(&mut self, stage: &mut Stage) {
        let cancelled = self.timers.cancel_all();
        if cancelled > 0 {
            log::debug!("Cancelled {} landing timers", cancelled);
        }
        self.particles.clear(stage);
        self.layout.clear(stage);
        stage.release(self.root);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Stage, LandingState) {
        let mut stage = Stage::new();
        let root = stage.root();
        let state = LandingState::new(&mut stage, root, Viewport::new(800.0, 600.0), 1);
        (stage, state)
    }

    #[test]
    fn test_new_loads_level_zero_at_spawn() {
        let (_stage, state) = setup();
        assert_eq!(state.course.current(), 0);
        assert_eq!(state.body.pos, Vec2::new(400.0, SPAWN_Y));
        assert_eq!(state.layout.node_count(), 1);
        assert_eq!(state.phase, LandingPhase::Flying);
    }

    #[test]
    fn test_load_level_cancels_attempt_timers_only() {
        let (mut stage, mut state) = setup();
        state.message("hello", MESSAGE_INFO);
        state.timers.schedule(1.5, LandingAction::AdvanceLevel);
        state.load_level(&mut stage, 1);
        assert_eq!(state.timers.len(), 1);
        assert_eq!(state.layout.node_count(), 2);
    }

    #[test]
    fn test_advance_past_last_level_completes_course() {
        let (mut stage, mut state) = setup();
        state.load_level(&mut stage, 3);
        let events = state.advance(&mut stage);
        assert!(events.contains(&LandingEvent::CourseComplete));
        assert!(state.course_completed);
        assert_eq!(state.course.current(), 0);
    }

    #[test]
    fn test_teardown_releases_everything() {
        let (mut stage, mut state) = setup();
        state.message("bye", MESSAGE_INFO);
        state.teardown(&mut stage);
        assert_eq!(stage.len(), 1);
        assert!(state.timers.is_empty());
    }

    #[test]
    fn test_apply_settings_clamps_mass() {
        let (_stage, mut state) = setup();
        let settings = Settings {
            mass: 0.0,
            gravity: 9.8,
            ..Default::default()
        };
        state.apply_settings(&settings);
        assert_eq!(state.body.mass(), MIN_MASS);
        assert_eq!(state.gravity, 9.8);
    }
}
