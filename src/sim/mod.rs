//! Landing minigame simulation
//!
//! Gameplay logic for the lander lives here:
//! - Fixed timestep only
//! - Seeded RNG only (particles are the only consumer)
//! - Verdicts come back as values; the owning scene decides what to show
//!
//! Render nodes are created through the [`Stage`](crate::renderer::stage::Stage)
//! but nothing here knows about the GPU or the DOM.

pub mod body;
pub mod collision;
pub mod level;
pub mod particles;
pub mod state;
pub mod tick;
pub mod timer;

pub use body::Body;
pub use collision::{Arena, FailReason, LandingGrade, Rect, Verdict, grade_landing, judge};
pub use level::{Advance, Course, LEVELS, Layout, LevelSpec, ObstacleSpec};
pub use particles::{Particle, ParticleEmitter};
pub use state::{LandingAction, LandingEvent, LandingPhase, LandingState};
pub use tick::{ThrustInput, tick};
pub use timer::{TimerId, Timers};
