//! Fixed timestep simulation tick
//!
//! Thrust, integrate, judge, then age particles and fire due timers. The judge
//! only runs while the lander is flying; once a verdict lands the body is
//! frozen until the next level load.

use glam::Vec2;

use super::collision::{Arena, FailReason, LandingGrade, Verdict, grade_landing, judge};
use super::state::{
    LandingAction, LandingEvent, LandingPhase, LandingState, MESSAGE_ERROR, MESSAGE_SUCCESS,
};
use crate::consts::*;
use crate::platform::input::{InputState, KEYS_DOWN, KEYS_LEFT, KEYS_RIGHT, KEYS_UP};
use crate::renderer::stage::Stage;

/// Thrusters held during a tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThrustInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl ThrustInput {
    pub fn from_input(input: &InputState) -> Self {
        Self {
            up: input.any_pressed(KEYS_UP),
            down: input.any_pressed(KEYS_DOWN),
            left: input.any_pressed(KEYS_LEFT),
            right: input.any_pressed(KEYS_RIGHT),
        }
    }

    pub fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }

    /// (force direction, nozzle offset from the body center)
    fn thrusters(&self) -> impl Iterator<Item = (Vec2, Vec2)> {
        [
            (self.up, Vec2::NEG_Y),
            (self.down, Vec2::Y),
            (self.left, Vec2::NEG_X),
            (self.right, Vec2::X),
        ]
        .into_iter()
        .filter(|(on, _)| *on)
        // Exhaust leaves on the side opposite the push
        .map(|(_, dir)| (dir, -dir * NOZZLE_OFFSET))
    }
}

/// Advance the landing minigame by one fixed timestep
pub fn tick(
    state: &mut LandingState,
    stage: &mut Stage,
    input: &ThrustInput,
    dt: f32,
) -> Vec<LandingEvent> {
    let mut events = Vec::new();

    if !state.body.landed {
        let force = state.body.thrust_force;
        for (dir, nozzle) in input.thrusters() {
            state.body.apply_force(dir * force);
            let origin = state.body.pos + nozzle;
            state.particles.emit(stage, state.root(), origin, -dir);
        }

        state.body.step(dt, state.gravity);

        let verdict = {
            let arena = Arena {
                screen: state.screen,
                obstacles: state.layout.obstacle_bounds(),
                pad: state.layout.pad_hitbox(),
            };
            judge(&state.body, &arena)
        };

        match verdict {
            Verdict::Continue => {}
            Verdict::Fail(reason) => fail(state, reason, &mut events),
            Verdict::Landing { impact } => land(state, impact, &mut events),
        }
        if !matches!(state.phase, LandingPhase::Failed(_)) {
            stage.set_position(state.lander_node(), state.body.pos);
        }
    }

    state.particles.update(stage, dt);

    for action in state.timers.advance(dt) {
        match action {
            LandingAction::AdvanceLevel => events.extend(state.advance(stage)),
            LandingAction::Fail(reason) => fail(state, reason, &mut events),
            LandingAction::ExpireMessage(id) => events.push(LandingEvent::MessageExpired(id)),
        }
    }

    events
}

fn fail(state: &mut LandingState, reason: FailReason, events: &mut Vec<LandingEvent>) {
    log::debug!("Landing failed: {:?}", reason);
    state.body.landed = true;
    state.phase = LandingPhase::Failed(reason);
    events.push(LandingEvent::Failed(reason));
}

fn land(state: &mut LandingState, impact: f32, events: &mut Vec<LandingEvent>) {
    if let Some(pad) = state.layout.pad_hitbox() {
        state.body.settle_on(&pad);
    } else {
        state.body.landed = true;
    }

    let grade = grade_landing(impact);
    state.phase = LandingPhase::Landed(grade);
    events.push(LandingEvent::Landed { impact, grade });

    match grade {
        LandingGrade::Soft => {
            events.push(state.message("Perfect landing!", MESSAGE_SUCCESS));
            state
                .timers
                .schedule(TRANSITION_DELAY, LandingAction::AdvanceLevel);
        }
        LandingGrade::Hard => {
            let text = format!("Hard landing! (impact: {:.1})", impact);
            events.push(state.message(&text, MESSAGE_ERROR));
            state.timers.schedule(
                TRANSITION_DELAY,
                LandingAction::Fail(FailReason::HardImpact),
            );
        }
    }
}
