//! Collision and landing judge
//!
//! Runs once per tick after the integrator step. The checks are ordered and
//! the first match wins, so an edge violation always beats an obstacle hit and
//! a pad contact is evaluated before the floor.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::Body;
use crate::Viewport;
use crate::consts::{EDGE_MARGIN, SAFE_LANDING_SPEED};

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size / 2.0;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn half_width(&self) -> f32 {
        self.width() / 2.0
    }

    /// Strict overlap test (touching edges do not intersect)
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    pub fn translate(&self, offset: Vec2) -> Rect {
        Rect::new(self.min + offset, self.max + offset)
    }
}

/// Why a landing attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailReason {
    /// Left or right screen edge
    Edge,
    /// Flew above the ceiling margin
    TooHigh,
    /// Touched an obstacle
    Obstacle,
    /// Touched the pad outside its center span
    MissedPad,
    /// Dropped below the screen without touching the pad
    FellThrough,
    /// Landed on the pad too fast
    HardImpact,
}

impl FailReason {
    /// Text for the failure dialog
    pub fn message(&self) -> &'static str {
        match self {
            FailReason::Edge => "Watch the edges!",
            FailReason::TooHigh => "Too high!",
            FailReason::Obstacle => "Watch out for the obstacles!",
            FailReason::MissedPad => "Land in the middle of the pad!",
            FailReason::FellThrough => "Land on the pad!",
            FailReason::HardImpact => "Impact too strong!",
        }
    }
}

/// Outcome of a single judge pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    /// Nothing hit, keep flying
    Continue,
    /// Touched the pad inside its span; `impact` is the vertical speed at contact
    Landing { impact: f32 },
    Fail(FailReason),
}

/// Landing quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LandingGrade {
    Soft,
    Hard,
}

/// Soft only when strictly below the safe speed
pub fn grade_landing(impact: f32) -> LandingGrade {
    if impact < SAFE_LANDING_SPEED {
        LandingGrade::Soft
    } else {
        LandingGrade::Hard
    }
}

/// Static geometry the body is judged against
#[derive(Debug, Clone, Copy)]
pub struct Arena<'a> {
    pub screen: Viewport,
    pub obstacles: &'a [Rect],
    /// Pad landing hitbox
    pub pad: Option<Rect>,
}

/// Classify the body's current position
pub fn judge(body: &Body, arena: &Arena<'_>) -> Verdict {
    let pos = body.pos;
    let bounds = body.bounds();

    if pos.x < EDGE_MARGIN || pos.x > arena.screen.width - EDGE_MARGIN {
        return Verdict::Fail(FailReason::Edge);
    }
    if pos.y < EDGE_MARGIN {
        return Verdict::Fail(FailReason::TooHigh);
    }

    if arena.obstacles.iter().any(|obs| bounds.intersects(obs)) {
        return Verdict::Fail(FailReason::Obstacle);
    }

    if let Some(pad) = arena.pad {
        if bounds.intersects(&pad) {
            let centered = (pos.x - pad.center().x).abs() < pad.half_width();
            return if centered {
                Verdict::Landing { impact: body.vel.y }
            } else {
                Verdict::Fail(FailReason::MissedPad)
            };
        }
    }

    if pos.y > arena.screen.height - body.size.y / 2.0 {
        return Verdict::Fail(FailReason::FellThrough);
    }

    Verdict::Continue
}
