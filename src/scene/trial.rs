//! Trial room: interact, talk, then a DOM tap-square minigame
//!
//! The square walks through five colours, one per tap. The tap after the
//! last colour removes it and sends the player back to the lab menu.

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec2;

use crate::dialogue::{DialogueScript, DialogueWalker};
use crate::error::Result;
use crate::platform::assets::keys;
use crate::platform::dom::{WidgetAction, WidgetId, WidgetKind};
use crate::platform::input::InputEvent;
use crate::renderer::stage::Node;
use crate::sim::Timers;
use crate::world::indicator::DEFAULT_OFFSET_Y;
use crate::world::{Indicator, Interactable};

use super::{Scene, SceneCommand, SceneContext};

/// Square colour classes in tap order
pub const SQUARE_COLORS: [&str; 5] = ["pink", "sky", "purple", "gold", "lime"];
/// How long the square stays pressed in (seconds)
const PRESS_TIME: f32 = 0.1;
const PROP_SIZE: Vec2 = Vec2::new(120.0, 160.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StartDialogue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrialTimer {
    Release,
}

#[derive(Debug)]
struct TapSquare {
    id: WidgetId,
    taps: usize,
}

#[derive(Debug)]
struct TrialWorld {
    prop: Interactable<StartDialogue>,
    indicator: Indicator<StartDialogue>,
    walker: DialogueWalker,
}

#[derive(Debug, Default)]
pub struct TrialScene {
    world: Option<TrialWorld>,
    dialogue_finished: Rc<Cell<bool>>,
    square: Option<TapSquare>,
    timers: Timers<TrialTimer>,
    done: bool,
}

impl TrialScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn square(&self) -> Option<WidgetId> {
        self.square.as_ref().map(|s| s.id)
    }

    fn start_dialogue(&mut self, ctx: &mut SceneContext<'_>) {
        let Some(world) = self.world.as_mut() else {
            return;
        };
        if world.walker.is_active() {
            return;
        }
        let script = match ctx
            .assets
            .json::<DialogueScript>(keys::TRIAL_INTRO)
            .and_then(|script| script.validate().map(|_| script))
        {
            Ok(script) => script,
            Err(err) => {
                log::error!("Failed to load the trial dialogue: {}", err);
                return;
            }
        };

        world.indicator.hide(ctx.stage);
        let finished = self.dialogue_finished.clone();
        if let Err(err) = world
            .walker
            .start(script, ctx.dom, ctx.assets, move || finished.set(true))
        {
            log::error!("Trial dialogue aborted: {}", err);
        }
        self.after_dialogue(ctx);
    }

    /// Swap the prop for the tap square once the dialogue callback fired
    fn after_dialogue(&mut self, ctx: &mut SceneContext<'_>) {
        if !self.dialogue_finished.replace(false) {
            return;
        }
        if let Some(world) = self.world.as_mut() {
            world.prop.disable();
        }
        match ctx
            .dom
            .attach(ctx.owner, None, WidgetKind::button("", "tap-square"))
        {
            Ok(id) => {
                ctx.dom.set_class(id, SQUARE_COLORS[0], true);
                self.square = Some(TapSquare { id, taps: 0 });
                log::info!("Tap-square minigame started");
            }
            Err(err) => log::error!("Failed to create the tap square: {}", err),
        }
    }

    fn tap(&mut self, ctx: &mut SceneContext<'_>) -> SceneCommand {
        let Some(square) = self.square.as_mut() else {
            return SceneCommand::None;
        };
        square.taps += 1;
        ctx.dom.set_class(square.id, "pressed", true);
        self.timers.schedule(PRESS_TIME, TrialTimer::Release);

        if square.taps < SQUARE_COLORS.len() {
            ctx.dom
                .set_class(square.id, SQUARE_COLORS[square.taps - 1], false);
            ctx.dom.set_class(square.id, SQUARE_COLORS[square.taps], true);
            return SceneCommand::None;
        }

        ctx.dom.detach(square.id);
        self.square = None;
        self.timers.cancel_all();
        self.done = true;
        log::info!("Tap-square minigame finished");
        SceneCommand::ExitToMenu
    }
}

impl Scene for TrialScene {
    fn key(&self) -> &'static str {
        "teste"
    }

    fn setup(&mut self, ctx: &mut SceneContext<'_>) -> Result<()> {
        let vp = ctx.viewport();
        ctx.stage.add(
            ctx.root,
            Node::sprite(keys::BG_BIOLOGY[0], Vec2::new(vp.width, vp.height)).anchor(Vec2::ZERO),
        );

        // Centered on the screen, a little below the middle
        let anchor = Vec2::new(vp.width / 2.0, vp.height / 2.0 + 100.0 + PROP_SIZE.y / 2.0);
        let mut prop = Interactable::new(
            ctx.stage,
            ctx.root,
            "microscope",
            keys::MICROSCOPE,
            anchor,
            PROP_SIZE,
        );
        prop.enable(StartDialogue);

        let mut indicator = Indicator::new(ctx.stage, ctx.root);
        indicator.set_target(prop.top(), DEFAULT_OFFSET_Y, StartDialogue, ctx.stage);

        self.world = Some(TrialWorld {
            prop,
            indicator,
            walker: DialogueWalker::new(ctx.owner),
        });
        Ok(())
    }

    fn update(&mut self, dt: f32, ctx: &mut SceneContext<'_>) -> SceneCommand {
        for timer in self.timers.advance(dt) {
            match timer {
                TrialTimer::Release => {
                    if let Some(square) = &self.square {
                        ctx.dom.set_class(square.id, "pressed", false);
                    }
                }
            }
        }

        if let Some(world) = self.world.as_mut() {
            if !world.walker.is_active() {
                world.indicator.update(dt, ctx.stage);
            }
        }
        SceneCommand::None
    }

    fn handle_input(&mut self, event: &InputEvent, ctx: &mut SceneContext<'_>) -> SceneCommand {
        match event {
            InputEvent::Widget(widget) => {
                if self.square.as_ref().is_some_and(|s| s.id == widget.id)
                    && widget.action == WidgetAction::Click
                {
                    return self.tap(ctx);
                }
                if let Some(world) = self.world.as_mut() {
                    world.walker.handle_widget(widget, ctx.dom);
                }
                self.after_dialogue(ctx);
            }
            InputEvent::PointerDown(point) => {
                let hit = self.world.as_ref().and_then(|world| {
                    if world.walker.is_active() {
                        return None;
                    }
                    world.indicator.hit(*point).or_else(|| world.prop.hit(*point))
                });
                if hit.is_some() {
                    self.start_dialogue(ctx);
                }
            }
            _ => {}
        }
        SceneCommand::None
    }

    fn teardown(&mut self, ctx: &mut SceneContext<'_>) {
        self.timers.cancel_all();
        if let Some(square) = self.square.take() {
            ctx.dom.detach(square.id);
        }
        self.world = None;
        if !self.done {
            log::debug!("Trial scene left before the minigame finished");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Settings;
    use crate::platform::assets::AssetCache;
    use crate::platform::dom::HeadlessDom;
    use crate::scene::{SceneKey, SceneManager};

    const SCRIPT: &str = r#"{
        "actors": {
            "left": {"name": "Julia", "texture": "assets/characters/julia/julia-portrait.png"},
            "right": {"name": "Pasteur", "texture": "assets/characters/pasteur/pasteur-portrait.png"}
        },
        "nodes": {
            "start": {"text": "Try the square.", "speaker": "right", "next": "end"}
        }
    }"#;

    fn manager() -> SceneManager<HeadlessDom> {
        let mut assets = AssetCache::new(Vec::new());
        assets.insert_url(keys::PLAYER_PORTRAIT);
        assets.insert_url(keys::PASTEUR_PORTRAIT);
        assets.insert_json(keys::TRIAL_INTRO, SCRIPT).unwrap();
        let mut mgr = SceneManager::new(HeadlessDom::default(), assets, Settings::default());
        mgr.load_key(SceneKey::Trial);
        mgr
    }

    /// Click the prop, then the dialogue's continue area
    fn reach_square(mgr: &mut SceneManager<HeadlessDom>) -> WidgetId {
        // Prop spans y 380..540 on a 720 px viewport
        mgr.handle_input(InputEvent::PointerDown(Vec2::new(640.0, 460.0)));
        assert!(mgr.dom().contains_text("Try the square."));
        let area = mgr.dom().find_kind(|k| matches!(k, WidgetKind::ClickArea))[0];
        mgr.dom_mut().click(area);
        mgr.update(1.0 / 60.0);
        mgr.dom().find_kind(|k| {
            matches!(k, WidgetKind::Button { class, .. } if class == "tap-square")
        })[0]
    }

    #[test]
    fn test_dialogue_leads_to_square() {
        let mut mgr = manager();
        let square = reach_square(&mut mgr);
        assert!(mgr.dom().widget(square).unwrap().classes.contains(SQUARE_COLORS[0]));
    }

    #[test]
    fn test_press_effect_reverts() {
        let mut mgr = manager();
        let square = reach_square(&mut mgr);
        mgr.dom_mut().click(square);
        mgr.update(1.0 / 60.0);
        let classes = &mgr.dom().widget(square).unwrap().classes;
        assert!(classes.contains("pressed"));
        assert!(classes.contains(SQUARE_COLORS[1]));
        assert!(!classes.contains(SQUARE_COLORS[0]));

        for _ in 0..10 {
            mgr.update(1.0 / 60.0);
        }
        assert!(!mgr.dom().widget(square).unwrap().classes.contains("pressed"));
    }

    #[test]
    fn test_last_tap_exits_to_menu() {
        let mut mgr = manager();
        let square = reach_square(&mut mgr);
        let mut last = SceneCommand::None;
        for _ in 0..SQUARE_COLORS.len() {
            mgr.dom_mut().click(square);
            last = mgr.update(1.0 / 60.0);
        }
        assert_eq!(last, SceneCommand::ExitToMenu);
        assert!(mgr.is_empty());
        assert!(mgr.dom().is_empty());
    }

    #[test]
    fn test_leaving_mid_game_removes_square() {
        let mut mgr = manager();
        let square = reach_square(&mut mgr);
        mgr.dom_mut().click(square);
        mgr.update(1.0 / 60.0);
        mgr.load_key(SceneKey::Landing);
        assert!(mgr.dom().widget(square).is_none());
    }
}
