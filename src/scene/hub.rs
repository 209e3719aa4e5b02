//! Biology lab hub
//!
//! A panoramic room three screens wide. Talking to Pasteur plays the intro
//! dialogue; once it finishes the microscope becomes usable and the indicator
//! moves over to it.

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec2;

use crate::dialogue::{DialogueScript, DialogueWalker};
use crate::error::Result;
use crate::platform::assets::keys;
use crate::platform::input::InputEvent;
use crate::renderer::stage::{Node, NodeId};
use crate::world::indicator::DEFAULT_OFFSET_Y;
use crate::world::{Camera, Indicator, Interactable, Player, PlayerBounds};

use super::{Scene, SceneCommand, SceneContext};

const PASTEUR_X: f32 = 800.0;
const PASTEUR_SIZE: Vec2 = Vec2::new(150.0, 250.0);
const MICROSCOPE_X: f32 = 1500.0;
const MICROSCOPE_SIZE: Vec2 = Vec2::new(120.0, 160.0);
const MICROSCOPE_INDICATOR_Y: f32 = -20.0;
const WALK_MIN_Y: f32 = 300.0;
const WALK_BOTTOM_MARGIN: f32 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HubAction {
    TalkToPasteur,
    UseMicroscope,
}

/// Everything built in `setup`
#[derive(Debug)]
struct HubWorld {
    container: NodeId,
    camera: Camera,
    player: Player,
    pasteur: Interactable<HubAction>,
    microscope: Interactable<HubAction>,
    indicator: Indicator<HubAction>,
    walker: DialogueWalker,
}

#[derive(Debug, Default)]
pub struct BiologyHubScene {
    world: Option<HubWorld>,
    /// Set by the dialogue's completion callback
    intro_finished: Rc<Cell<bool>>,
    intro_done: bool,
    microscope_used: bool,
}

impl BiologyHubScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intro_done(&self) -> bool {
        self.intro_done
    }

    pub fn microscope_used(&self) -> bool {
        self.microscope_used
    }

    pub fn dialogue_active(&self) -> bool {
        self.world.as_ref().is_some_and(|w| w.walker.is_active())
    }

    fn run(&mut self, action: HubAction, ctx: &mut SceneContext<'_>) {
        let Some(world) = self.world.as_mut() else {
            return;
        };
        match action {
            HubAction::TalkToPasteur => {
                let script = ctx
                    .assets
                    .json::<DialogueScript>(keys::BIOLOGY_INTRO)
                    .and_then(|script| script.validate().map(|_| script));
                let script = match script {
                    Ok(script) => script,
                    Err(err) => {
                        log::error!("Failed to load the intro dialogue: {}", err);
                        return;
                    }
                };

                world.player.lock_movement(ctx.input, ctx.stage);
                world.indicator.hide(ctx.stage);
                let finished = self.intro_finished.clone();
                if let Err(err) =
                    world
                        .walker
                        .start(script, ctx.dom, ctx.assets, move || finished.set(true))
                {
                    log::error!("Intro dialogue aborted: {}", err);
                }
                self.finish_intro(ctx);
            }
            HubAction::UseMicroscope => {
                log::info!("Microscope selected");
                self.microscope_used = true;
                world.indicator.hide(ctx.stage);
            }
        }
    }

    /// Unlock the microscope once the intro callback has fired
    fn finish_intro(&mut self, ctx: &mut SceneContext<'_>) {
        let Some(world) = self.world.as_mut() else {
            return;
        };
        if self.intro_done || !self.intro_finished.get() {
            return;
        }
        self.intro_done = true;
        world.player.unlock_movement();
        world.pasteur.disable();
        world.microscope.enable(HubAction::UseMicroscope);
        world.indicator.set_target(
            world.microscope.top(),
            MICROSCOPE_INDICATOR_Y,
            HubAction::UseMicroscope,
            ctx.stage,
        );
        log::info!("Pasteur intro finished, microscope unlocked");
    }

    fn pointer_down(&mut self, screen: Vec2, ctx: &mut SceneContext<'_>) {
        let Some(world) = self.world.as_mut() else {
            return;
        };
        let point = Vec2::new(world.camera.screen_to_world(screen.x), screen.y);
        let action = world
            .indicator
            .hit(point)
            .or_else(|| world.microscope.hit(point))
            .or_else(|| world.pasteur.hit(point));
        match action {
            Some(action) => self.run(action, ctx),
            None => {
                world.player.pointer_down(point, ctx.stage);
            }
        }
    }
}

impl Scene for BiologyHubScene {
    fn key(&self) -> &'static str {
        "biologia"
    }

    fn setup(&mut self, ctx: &mut SceneContext<'_>) -> Result<()> {
        let vp = ctx.viewport();
        let stage = &mut *ctx.stage;
        let container = stage.add(ctx.root, Node::group());

        for (i, texture) in keys::BG_BIOLOGY.iter().enumerate() {
            stage.add(
                container,
                Node::sprite(*texture, Vec2::new(vp.width, vp.height))
                    .anchor(Vec2::ZERO)
                    .at(Vec2::new(i as f32 * vp.width, 0.0)),
            );
        }
        let world_width = keys::BG_BIOLOGY.len() as f32 * vp.width;

        let player = Player::new(
            stage,
            container,
            PlayerBounds {
                min_y: WALK_MIN_Y,
                max_y: vp.height - WALK_BOTTOM_MARGIN,
                world_width,
            },
        );

        let mut pasteur = Interactable::new(
            stage,
            container,
            "pasteur",
            keys::PASTEUR,
            Vec2::new(PASTEUR_X, vp.height - 20.0),
            PASTEUR_SIZE,
        );
        pasteur.enable(HubAction::TalkToPasteur);
        let microscope = Interactable::new(
            stage,
            container,
            "microscope",
            keys::MICROSCOPE,
            Vec2::new(MICROSCOPE_X, vp.height - 50.0),
            MICROSCOPE_SIZE,
        );

        let mut indicator = Indicator::new(stage, container);
        indicator.set_target(
            pasteur.top(),
            DEFAULT_OFFSET_Y,
            HubAction::TalkToPasteur,
            stage,
        );

        let mut camera = Camera::new(vp.width, world_width);
        camera.snap(player.pos.x);
        stage.set_position(container, Vec2::new(camera.offset, 0.0));

        self.world = Some(HubWorld {
            container,
            camera,
            player,
            pasteur,
            microscope,
            indicator,
            walker: DialogueWalker::new(ctx.owner),
        });
        Ok(())
    }

    fn update(&mut self, dt: f32, ctx: &mut SceneContext<'_>) -> SceneCommand {
        self.finish_intro(ctx);
        let Some(world) = self.world.as_mut() else {
            return SceneCommand::None;
        };
        if world.walker.is_active() {
            return SceneCommand::None;
        }

        world.player.update(ctx.input, dt, ctx.stage);
        world.camera.update(world.player.pos.x);
        ctx.stage
            .set_position(world.container, Vec2::new(world.camera.offset, 0.0));
        world.indicator.update(dt, ctx.stage);
        SceneCommand::None
    }

    fn handle_input(&mut self, event: &InputEvent, ctx: &mut SceneContext<'_>) -> SceneCommand {
        let Some(world) = self.world.as_mut() else {
            return SceneCommand::None;
        };
        if let InputEvent::Widget(widget) = event {
            world.walker.handle_widget(widget, ctx.dom);
            self.finish_intro(ctx);
            return SceneCommand::None;
        }
        if world.walker.is_active() {
            return SceneCommand::None;
        }

        match event {
            InputEvent::PointerDown(screen) => self.pointer_down(*screen, ctx),
            InputEvent::PointerMove(screen) => {
                let point = Vec2::new(world.camera.screen_to_world(screen.x), screen.y);
                world.player.pointer_move(point, ctx.stage);
            }
            InputEvent::PointerUp(_) => world.player.pointer_up(ctx.stage),
            _ => {}
        }
        SceneCommand::None
    }

    fn teardown(&mut self, _ctx: &mut SceneContext<'_>) {
        self.world = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Settings;
    use crate::platform::assets::AssetCache;
    use crate::platform::dom::{HeadlessDom, WidgetKind};
    use crate::scene::{EXIT_BUTTON_CLASS, SceneManager};

    const INTRO: &str = r#"{
        "actors": {
            "left": {"name": "Julia", "texture": "assets/characters/julia/julia-portrait.png"},
            "right": {"name": "Pasteur", "texture": "assets/characters/pasteur/pasteur-portrait.png"}
        },
        "nodes": {
            "start": {"text": "Welcome to my lab.", "speaker": "right", "next": "ask"},
            "ask": {"text": "Shall we begin?", "speaker": "right", "choices": [
                {"text": "Yes", "target": "end"}
            ]}
        }
    }"#;

    fn manager() -> SceneManager<HeadlessDom> {
        let mut assets = AssetCache::new(Vec::new());
        assets.insert_url(keys::PLAYER_PORTRAIT);
        assets.insert_url(keys::PASTEUR_PORTRAIT);
        assets.insert_json(keys::BIOLOGY_INTRO, INTRO).unwrap();
        let mut mgr = SceneManager::new(HeadlessDom::default(), assets, Settings::default());
        mgr.load_scene(Box::new(BiologyHubScene::new()));
        mgr
    }

    /// Screen point on Pasteur while the camera rests at the left edge
    fn pasteur_screen() -> Vec2 {
        Vec2::new(PASTEUR_X, 600.0)
    }

    fn click_through_dialogue(mgr: &mut SceneManager<HeadlessDom>) {
        for _ in 0..10 {
            let triggers = mgr.dom().find_kind(|k| match k {
                WidgetKind::ClickArea => true,
                WidgetKind::Button { class, .. } => class != EXIT_BUTTON_CLASS,
                _ => false,
            });
            let Some(first) = triggers.first() else {
                return;
            };
            mgr.dom_mut().click(*first);
            mgr.update(1.0 / 60.0);
        }
    }

    #[test]
    fn test_world_is_three_screens() {
        let mgr = manager();
        // stage root, scene root, container, 3 panels, player, 2 props, indicator
        assert_eq!(mgr.stage().len(), 10);
    }

    #[test]
    fn test_indicator_hangs_above_pasteur() {
        let mut scene = BiologyHubScene::new();
        let mut stage = crate::renderer::stage::Stage::new();
        let mut dom = HeadlessDom::default();
        let mut assets = AssetCache::new(Vec::new());
        let mut settings = Settings::default();
        let mut input = crate::platform::input::InputState::new();
        let root = stage.root();
        let mut ctx = SceneContext {
            stage: &mut stage,
            dom: &mut dom,
            assets: &mut assets,
            settings: &mut settings,
            input: &mut input,
            root,
            owner: crate::platform::dom::Owner(1),
        };
        scene.setup(&mut ctx).unwrap();

        let world = scene.world.as_ref().unwrap();
        let top = world.pasteur.top();
        assert_eq!(
            world.indicator.position(),
            Vec2::new(top.x, top.y + DEFAULT_OFFSET_Y)
        );
        assert!(!world.pasteur.bounds().contains(world.indicator.position()));
    }

    #[test]
    fn test_talking_opens_dialogue_and_freezes_player() {
        let mut mgr = manager();
        mgr.handle_input(InputEvent::PointerDown(pasteur_screen()));
        assert!(mgr.dom().contains_text("Welcome to my lab."));

        mgr.handle_input(InputEvent::key_down("d"));
        let before = mgr.stage().draw_list().len();
        mgr.update(1.0 / 60.0);
        assert_eq!(mgr.stage().draw_list().len(), before);
        assert!(mgr.dom().contains_text("Pasteur"));
    }

    #[test]
    fn test_finishing_intro_unlocks_microscope() {
        let mut mgr = manager();
        mgr.handle_input(InputEvent::PointerDown(pasteur_screen()));
        click_through_dialogue(&mut mgr);
        assert!(!mgr.dom().contains_text("Welcome to my lab."));

        // Pasteur no longer talks; clicking him starts a drag check instead
        mgr.handle_input(InputEvent::PointerDown(pasteur_screen()));
        assert!(!mgr.dom().contains_text("Welcome to my lab."));
    }

    #[test]
    fn test_missing_script_keeps_player_free() {
        let mut mgr = SceneManager::new(
            HeadlessDom::default(),
            AssetCache::new(Vec::new()),
            Settings::default(),
        );
        mgr.load_scene(Box::new(BiologyHubScene::new()));
        mgr.handle_input(InputEvent::PointerDown(pasteur_screen()));
        // Only the exit button
        assert_eq!(mgr.dom().len(), 1);
    }

    #[test]
    fn test_scene_state_through_flow() {
        let mut scene = BiologyHubScene::new();
        let mut stage = crate::renderer::stage::Stage::new();
        let mut dom = HeadlessDom::default();
        let mut assets = AssetCache::new(Vec::new());
        assets.insert_url(keys::PLAYER_PORTRAIT);
        assets.insert_url(keys::PASTEUR_PORTRAIT);
        assets.insert_json(keys::BIOLOGY_INTRO, INTRO).unwrap();
        let mut settings = Settings::default();
        let mut input = crate::platform::input::InputState::new();
        let root = stage.root();
        let mut ctx = SceneContext {
            stage: &mut stage,
            dom: &mut dom,
            assets: &mut assets,
            settings: &mut settings,
            input: &mut input,
            root,
            owner: crate::platform::dom::Owner(1),
        };
        scene.setup(&mut ctx).unwrap();
        scene.handle_input(&InputEvent::PointerDown(pasteur_screen()), &mut ctx);
        assert!(scene.dialogue_active());
        assert!(!scene.intro_done());

        for _ in 0..10 {
            let triggers = scene.world.as_ref().unwrap().walker.trigger_ids();
            let Some(first) = triggers.first() else {
                break;
            };
            let event = crate::platform::dom::WidgetEvent {
                id: *first,
                action: crate::platform::dom::WidgetAction::Click,
            };
            scene.handle_input(&InputEvent::Widget(event), &mut ctx);
        }
        assert!(scene.intro_done());
        assert!(!scene.dialogue_active());

        let world = scene.world.as_ref().unwrap();
        assert!(world.microscope.is_enabled());
        assert!(!world.pasteur.is_enabled());
        assert!(world.player.can_move());
        let target = world.indicator.position();
        assert_eq!(target.x, MICROSCOPE_X);
        assert!(target.y < world.microscope.top().y);

        let microscope = Vec2::new(MICROSCOPE_X, 720.0 - 100.0);
        scene.handle_input(&InputEvent::PointerDown(microscope), &mut ctx);
        assert!(scene.microscope_used());
    }
}
