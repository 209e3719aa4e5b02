//! Physics lab: the lander minigame
//!
//! The simulation lives in [`crate::sim`]; this scene feeds it held keys,
//! turns its events into DOM widgets (floating messages, the failure dialog)
//! and exposes the tuning sliders once the course has been cleared.

use std::collections::HashMap;

use glam::Vec2;

use crate::error::Result;
use crate::platform::dom::{WidgetAction, WidgetEvent, WidgetId, WidgetKind};
use crate::platform::input::InputEvent;
use crate::renderer::stage::Node;
use crate::rgb;
use crate::settings::{GRAVITY_RANGE, MASS_RANGE, SliderRange, THRUST_RANGE};
use crate::sim::state::{MESSAGE_ERROR, MESSAGE_SUCCESS};
use crate::sim::{LandingEvent, LandingState, ThrustInput, tick};

use super::{Scene, SceneCommand, SceneContext};

const DEFAULT_SEED: u64 = 0x1a4d_e5ee;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tunable {
    Thrust,
    Gravity,
    Mass,
}

/// DOM side of the scene
#[derive(Debug)]
struct LandingUi {
    controls: WidgetId,
    sliders: Vec<(WidgetId, Tunable)>,
    fail_panel: WidgetId,
    fail_text: WidgetId,
    restart: WidgetId,
    message_layer: WidgetId,
    messages: HashMap<u32, WidgetId>,
}

#[derive(Debug)]
pub struct LandingScene {
    seed: u64,
    state: Option<LandingState>,
    ui: Option<LandingUi>,
}

impl Default for LandingScene {
    fn default() -> Self {
        Self::new()
    }
}

fn message_class(color: u32) -> &'static str {
    match color {
        MESSAGE_SUCCESS => "floating-message success",
        MESSAGE_ERROR => "floating-message error",
        _ => "floating-message info",
    }
}

impl LandingScene {
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    /// Seed for the exhaust particle spread
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            state: None,
            ui: None,
        }
    }

    pub fn state(&self) -> Option<&LandingState> {
        self.state.as_ref()
    }

    pub fn state_mut(&mut self) -> Option<&mut LandingState> {
        self.state.as_mut()
    }

    fn build_ui(ctx: &mut SceneContext<'_>) -> Result<LandingUi> {
        let owner = ctx.owner;
        let controls = ctx
            .dom
            .attach(owner, None, WidgetKind::panel("landing-controls"))?;
        let settings = &*ctx.settings;
        let slider = |label: &str, range: SliderRange, value: f32| WidgetKind::Slider {
            label: label.to_string(),
            min: range.min,
            max: range.max,
            step: range.step,
            value,
        };
        let specs = [
            (slider("Force", THRUST_RANGE, settings.thrust_force), Tunable::Thrust),
            (slider("Gravity", GRAVITY_RANGE, settings.gravity), Tunable::Gravity),
            (slider("Mass", MASS_RANGE, settings.mass), Tunable::Mass),
        ];
        let mut sliders = Vec::with_capacity(specs.len());
        for (kind, tunable) in specs {
            sliders.push((ctx.dom.attach(owner, Some(controls), kind)?, tunable));
        }
        ctx.dom.set_visible(controls, false);

        let fail_panel = ctx.dom.attach(owner, None, WidgetKind::panel("fail-dialog"))?;
        let fail_text = ctx
            .dom
            .attach(owner, Some(fail_panel), WidgetKind::text("", "fail-text"))?;
        let restart = ctx
            .dom
            .attach(owner, Some(fail_panel), WidgetKind::button("Restart", "restart"))?;
        ctx.dom.set_visible(fail_panel, false);

        let message_layer = ctx
            .dom
            .attach(owner, None, WidgetKind::panel("landing-messages"))?;

        Ok(LandingUi {
            controls,
            sliders,
            fail_panel,
            fail_text,
            restart,
            message_layer,
            messages: HashMap::new(),
        })
    }

    /// Reflect simulation events in the DOM
    fn present(&mut self, events: Vec<LandingEvent>, ctx: &mut SceneContext<'_>) {
        let Some(ui) = self.ui.as_mut() else {
            return;
        };
        for event in events {
            match event {
                LandingEvent::LevelLoaded(_) => ctx.dom.set_visible(ui.fail_panel, false),
                LandingEvent::Message { id, text, color } => {
                    match ctx.dom.attach(
                        ctx.owner,
                        Some(ui.message_layer),
                        WidgetKind::text(&text, message_class(color)),
                    ) {
                        Ok(widget) => {
                            ui.messages.insert(id, widget);
                        }
                        Err(err) => log::error!("Failed to show message: {}", err),
                    }
                }
                LandingEvent::MessageExpired(id) => {
                    if let Some(widget) = ui.messages.remove(&id) {
                        ctx.dom.detach(widget);
                    }
                }
                LandingEvent::Landed { impact, grade } => {
                    log::info!("Touchdown at {:.1} px/s ({:?})", impact, grade);
                }
                LandingEvent::Failed(reason) => {
                    ctx.dom.set_text(ui.fail_text, reason.message());
                    ctx.dom.set_visible(ui.fail_panel, true);
                }
                LandingEvent::LevelComplete { next } => {
                    log::info!("Level cleared, moving to level {}", next + 1);
                }
                LandingEvent::CourseComplete => ctx.dom.set_visible(ui.controls, true),
            }
        }
    }

    fn on_widget(&mut self, event: &WidgetEvent, ctx: &mut SceneContext<'_>) {
        let (Some(ui), Some(state)) = (self.ui.as_ref(), self.state.as_mut()) else {
            return;
        };
        match event.action {
            WidgetAction::Click if event.id == ui.restart => {
                let loaded = state.restart_level(ctx.stage);
                self.present(vec![loaded], ctx);
            }
            WidgetAction::Input(value) => {
                let Some(&(id, tunable)) = ui.sliders.iter().find(|(id, _)| *id == event.id)
                else {
                    return;
                };
                let settings = &mut *ctx.settings;
                let applied = match tunable {
                    Tunable::Thrust => {
                        settings.set_thrust_force(value);
                        settings.thrust_force
                    }
                    Tunable::Gravity => {
                        settings.set_gravity(value);
                        settings.gravity
                    }
                    Tunable::Mass => {
                        settings.set_mass(value);
                        settings.mass
                    }
                };
                settings.save();
                state.apply_settings(settings);
                ctx.dom.set_value(id, applied);
            }
            WidgetAction::Click => {}
        }
    }
}

impl Scene for LandingScene {
    fn key(&self) -> &'static str {
        "fisica"
    }

    fn setup(&mut self, ctx: &mut SceneContext<'_>) -> Result<()> {
        let vp = ctx.viewport();
        ctx.stage.add(
            ctx.root,
            Node::rect(Vec2::new(vp.width, vp.height))
                .anchor(Vec2::ZERO)
                .color(rgb(0x000000, 1.0))
                .z(-10),
        );

        let mut state = LandingState::new(ctx.stage, ctx.root, vp, self.seed);
        state.apply_settings(ctx.settings);
        self.state = Some(state);

        let ui = Self::build_ui(ctx)?;
        self.ui = Some(ui);
        Ok(())
    }

    fn update(&mut self, dt: f32, ctx: &mut SceneContext<'_>) -> SceneCommand {
        let Some(state) = self.state.as_mut() else {
            return SceneCommand::None;
        };
        let input = ThrustInput::from_input(ctx.input);
        let events = tick(state, ctx.stage, &input, dt);
        self.present(events, ctx);
        SceneCommand::None
    }

    fn handle_input(&mut self, event: &InputEvent, ctx: &mut SceneContext<'_>) -> SceneCommand {
        if let InputEvent::Widget(widget) = event {
            self.on_widget(widget, ctx);
        }
        SceneCommand::None
    }

    fn teardown(&mut self, ctx: &mut SceneContext<'_>) {
        if let Some(mut state) = self.state.take() {
            state.teardown(ctx.stage);
        }
        self.ui = None;
    }
}
