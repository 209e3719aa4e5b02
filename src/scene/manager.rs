//! Scene lifecycle manager
//!
//! Owns the stage, the scene-scoped input state and the platform services,
//! and holds at most one active scene. Switching is synchronous: the old
//! scene's teardown, node release and widget detach all finish before the new
//! scene's setup runs.

use crate::Settings;
use crate::platform::assets::AssetCache;
use crate::platform::dom::{DomHost, Owner, WidgetAction, WidgetEvent, WidgetId, WidgetKind};
use crate::platform::input::{InputEvent, InputState};
use crate::renderer::stage::{Node, NodeId, Stage};

use super::{Scene, SceneCommand, SceneContext, SceneKey};

/// Class of the button that leaves any game scene for the menu
pub const EXIT_BUTTON_CLASS: &str = "game-exit-button";

struct Active {
    scene: Box<dyn Scene>,
    root: NodeId,
    owner: Owner,
    exit_button: Option<WidgetId>,
}

pub struct SceneManager<D: DomHost> {
    stage: Stage,
    input: InputState,
    dom: D,
    assets: AssetCache,
    settings: Settings,
    active: Option<Active>,
    next_owner: u32,
}

impl<D: DomHost + 'static> SceneManager<D> {
    pub fn new(dom: D, assets: AssetCache, settings: Settings) -> Self {
        Self {
            stage: Stage::new(),
            input: InputState::new(),
            dom,
            assets,
            settings,
            active: None,
            next_owner: 0,
        }
    }

    /// Tear down the current scene (if any), then set up `scene`
    pub fn load_scene(&mut self, scene: Box<dyn Scene>) {
        self.unload();

        self.next_owner += 1;
        let owner = Owner(self.next_owner);
        let root = self.stage.add(self.stage.root(), Node::group());
        log::info!("Entering scene: {}", scene.key());
        self.active = Some(Active {
            scene,
            root,
            owner,
            exit_button: None,
        });

        if let Some(Err(err)) = self.with_active(|scene, ctx| scene.setup(ctx)) {
            log::error!("Scene setup failed: {}", err);
        }

        // Tagged with the scene's owner so detach_all takes it along
        match self
            .dom
            .attach(owner, None, WidgetKind::button("Exit", EXIT_BUTTON_CLASS))
        {
            Ok(id) => {
                if let Some(active) = self.active.as_mut() {
                    active.exit_button = Some(id);
                }
            }
            Err(err) => log::error!("Failed to mount the exit button: {}", err),
        }
    }

    pub fn load_key(&mut self, key: SceneKey) {
        self.load_scene(key.build());
    }

    /// Tear down the active scene and go back to empty
    pub fn unload(&mut self) {
        self.with_active(|scene, ctx| scene.teardown(ctx));
        if let Some(old) = self.active.take() {
            let nodes = self.stage.release(old.root);
            let widgets = self.dom.detach_all(old.owner);
            log::info!(
                "Left scene: {} ({} nodes, {} widgets released)",
                old.scene.key(),
                nodes,
                widgets
            );
        }
        self.input.reset();
    }

    /// Route pending widget events, then tick the active scene
    pub fn update(&mut self, dt: f32) -> SceneCommand {
        for event in self.dom.drain_events() {
            let command = if self.is_exit_click(&event) {
                SceneCommand::ExitToMenu
            } else {
                self.dispatch(&InputEvent::Widget(event))
            };
            if command != SceneCommand::None {
                // The rest were aimed at widgets of the scene we just left
                self.apply(command);
                return command;
            }
        }

        let command = self
            .with_active(|scene, ctx| scene.update(dt, ctx))
            .unwrap_or_default();
        self.apply(command);
        command
    }

    /// Record the event in the input state and hand it to the active scene
    pub fn handle_input(&mut self, event: InputEvent) -> SceneCommand {
        self.input.apply(&event);
        let command = self.dispatch(&event);
        self.apply(command);
        command
    }

    fn is_exit_click(&self, event: &WidgetEvent) -> bool {
        event.action == WidgetAction::Click
            && self
                .active
                .as_ref()
                .is_some_and(|a| a.exit_button == Some(event.id))
    }

    fn dispatch(&mut self, event: &InputEvent) -> SceneCommand {
        self.with_active(|scene, ctx| scene.handle_input(event, ctx))
            .unwrap_or_default()
    }

    fn apply(&mut self, command: SceneCommand) {
        match command {
            SceneCommand::None => {}
            SceneCommand::SwitchTo(key) => self.load_key(key),
            SceneCommand::ExitToMenu => self.unload(),
        }
    }

    fn with_active<R>(
        &mut self,
        f: impl FnOnce(&mut dyn Scene, &mut SceneContext<'_>) -> R,
    ) -> Option<R> {
        let active = self.active.as_mut()?;
        let mut ctx = SceneContext {
            stage: &mut self.stage,
            dom: &mut self.dom,
            assets: &mut self.assets,
            settings: &mut self.settings,
            input: &mut self.input,
            root: active.root,
            owner: active.owner,
        };
        Some(f(active.scene.as_mut(), &mut ctx))
    }

    pub fn active_key(&self) -> Option<&'static str> {
        self.active.as_ref().map(|a| a.scene.key())
    }

    pub fn active_owner(&self) -> Option<Owner> {
        self.active.as_ref().map(|a| a.owner)
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_none()
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    pub fn assets(&self) -> &AssetCache {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut AssetCache {
        &mut self.assets
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// The active scene's exit button, if it has one
    pub fn exit_button(&self) -> Option<WidgetId> {
        self.active.as_ref().and_then(|a| a.exit_button)
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::error::Result;
    use crate::platform::dom::{HeadlessDom, WidgetKind};

    type Log = Rc<RefCell<Vec<String>>>;

    /// Records lifecycle calls and owns one node and one widget
    struct Probe {
        name: &'static str,
        log: Log,
        switch_after: Option<(u32, SceneKey)>,
        ticks: u32,
    }

    impl Probe {
        fn boxed(name: &'static str, log: &Log) -> Box<dyn Scene> {
            Box::new(Probe {
                name,
                log: log.clone(),
                switch_after: None,
                ticks: 0,
            })
        }
    }

    impl Scene for Probe {
        fn key(&self) -> &'static str {
            self.name
        }

        fn setup(&mut self, ctx: &mut SceneContext<'_>) -> Result<()> {
            self.log.borrow_mut().push(format!("setup {}", self.name));
            ctx.stage.add(ctx.root, Node::group());
            ctx.dom
                .attach(ctx.owner, None, WidgetKind::button(self.name, ""))?;
            Ok(())
        }

        fn update(&mut self, _dt: f32, _ctx: &mut SceneContext<'_>) -> SceneCommand {
            self.ticks += 1;
            self.log.borrow_mut().push(format!("tick {}", self.name));
            match self.switch_after {
                Some((n, key)) if self.ticks >= n => SceneCommand::SwitchTo(key),
                _ => SceneCommand::None,
            }
        }

        fn teardown(&mut self, _ctx: &mut SceneContext<'_>) {
            self.log.borrow_mut().push(format!("teardown {}", self.name));
        }
    }

    fn manager() -> SceneManager<HeadlessDom> {
        SceneManager::new(
            HeadlessDom::default(),
            AssetCache::new(Vec::new()),
            Settings::default(),
        )
    }

    #[test]
    fn test_teardown_runs_before_next_setup() {
        let log: Log = Rc::default();
        let mut mgr = manager();
        mgr.load_scene(Probe::boxed("a", &log));
        mgr.update(1.0 / 60.0);
        mgr.load_scene(Probe::boxed("b", &log));
        mgr.update(1.0 / 60.0);
        assert_eq!(
            *log.borrow(),
            vec!["setup a", "tick a", "teardown a", "setup b", "tick b"]
        );
    }

    #[test]
    fn test_old_scene_resources_released() {
        let log: Log = Rc::default();
        let mut mgr = manager();
        mgr.load_scene(Probe::boxed("a", &log));
        let a = mgr.active_owner().unwrap();
        // probe button + exit button
        assert_eq!(mgr.dom().widget_count(a), 2);
        // stage root + scene root + probe node
        assert_eq!(mgr.stage().len(), 3);

        mgr.load_scene(Probe::boxed("b", &log));
        assert_eq!(mgr.dom().widget_count(a), 0);
        assert_eq!(mgr.stage().len(), 3);
        assert_eq!(mgr.active_key(), Some("b"));
    }

    #[test]
    fn test_input_reset_on_switch() {
        let log: Log = Rc::default();
        let mut mgr = manager();
        mgr.load_scene(Probe::boxed("a", &log));
        mgr.handle_input(InputEvent::key_down("w"));
        assert!(mgr.input().pressed("w"));
        mgr.load_scene(Probe::boxed("b", &log));
        assert!(!mgr.input().pressed("w"));
    }

    #[test]
    fn test_exit_to_menu_empties() {
        let log: Log = Rc::default();
        let mut mgr = manager();
        mgr.load_scene(Probe::boxed("a", &log));
        mgr.apply(SceneCommand::ExitToMenu);
        assert!(mgr.is_empty());
        assert_eq!(mgr.stage().len(), 1);
        assert_eq!(mgr.update(1.0 / 60.0), SceneCommand::None);
        assert_eq!(log.borrow().last().unwrap(), "teardown a");
    }

    #[test]
    fn test_exit_button_leaves_scene() {
        let log: Log = Rc::default();
        let mut mgr = manager();
        mgr.load_scene(Probe::boxed("a", &log));
        let exit = mgr.exit_button().unwrap();
        assert!(mgr.dom_mut().click(exit));
        assert_eq!(mgr.update(1.0 / 60.0), SceneCommand::ExitToMenu);
        assert!(mgr.is_empty());
        assert!(mgr.dom().is_empty());
        assert_eq!(mgr.stage().len(), 1);
        assert_eq!(log.borrow().last().unwrap(), "teardown a");
    }

    #[test]
    fn test_scene_requested_switch() {
        let log: Log = Rc::default();
        let mut mgr = manager();
        mgr.load_scene(Box::new(Probe {
            name: "a",
            log: log.clone(),
            switch_after: Some((2, SceneKey::Trial)),
            ticks: 0,
        }));
        assert_eq!(mgr.update(1.0 / 60.0), SceneCommand::None);
        assert_eq!(
            mgr.update(1.0 / 60.0),
            SceneCommand::SwitchTo(SceneKey::Trial)
        );
        assert_eq!(mgr.active_key(), Some("teste"));
        let ticks_of_a = log.borrow().iter().filter(|l| *l == "tick a").count();
        mgr.update(1.0 / 60.0);
        assert_eq!(
            log.borrow().iter().filter(|l| *l == "tick a").count(),
            ticks_of_a
        );
    }
}
