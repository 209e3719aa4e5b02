//! Scenes and their lifecycle
//!
//! A scene builds its render nodes under the root the manager hands it and
//! its DOM widgets under its [`Owner`]. The manager tears a scene down
//! completely (nodes, widgets, held input) before the next one is set up.

pub mod hub;
pub mod landing;
pub mod loader;
pub mod manager;
pub mod trial;

pub use hub::BiologyHubScene;
pub use landing::LandingScene;
pub use loader::LoaderScene;
pub use manager::{EXIT_BUTTON_CLASS, SceneManager};
pub use trial::TrialScene;

use crate::Settings;
use crate::Viewport;
use crate::error::{HubError, Result};
use crate::platform::assets::AssetCache;
use crate::platform::dom::{DomHost, Owner};
use crate::platform::input::{InputEvent, InputState};
use crate::renderer::stage::{NodeId, Stage};

/// Scenes that can be routed to by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneKey {
    BiologyHub,
    Landing,
    Trial,
}

impl SceneKey {
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "biologia" => Ok(SceneKey::BiologyHub),
            "fisica" => Ok(SceneKey::Landing),
            "teste" => Ok(SceneKey::Trial),
            other => Err(HubError::UnknownScene(other.to_string())),
        }
    }

    /// Like `parse`, but unknown names fall back to the biology hub
    pub fn route(name: &str) -> Self {
        Self::parse(name).unwrap_or_else(|err| {
            log::warn!("{}, falling back to the biology hub", err);
            SceneKey::BiologyHub
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            SceneKey::BiologyHub => "biologia",
            SceneKey::Landing => "fisica",
            SceneKey::Trial => "teste",
        }
    }

    /// A fresh instance of the scene
    pub fn build(self) -> Box<dyn Scene> {
        match self {
            SceneKey::BiologyHub => Box::new(BiologyHubScene::new()),
            SceneKey::Landing => Box::new(LandingScene::new()),
            SceneKey::Trial => Box::new(TrialScene::new()),
        }
    }
}

/// What a scene asks the manager to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SceneCommand {
    #[default]
    None,
    SwitchTo(SceneKey),
    /// Leave the scene system and show the lab menu
    ExitToMenu,
}

/// Everything a scene may touch during a callback
pub struct SceneContext<'a> {
    pub stage: &'a mut Stage,
    pub dom: &'a mut dyn DomHost,
    pub assets: &'a mut AssetCache,
    pub settings: &'a mut Settings,
    pub input: &'a mut InputState,
    /// Root node of this scene's render subtree
    pub root: NodeId,
    /// Owner tag for this scene's DOM widgets
    pub owner: Owner,
}

impl SceneContext<'_> {
    pub fn viewport(&self) -> Viewport {
        self.dom.viewport()
    }
}

/// A self-contained game screen
pub trait Scene {
    /// Short name for logs
    fn key(&self) -> &'static str;

    /// Build nodes and widgets. An error is logged by the manager and the
    /// scene stays loaded in whatever degraded state it reached.
    fn setup(&mut self, ctx: &mut SceneContext<'_>) -> Result<()>;

    /// Advance one fixed timestep
    fn update(&mut self, dt: f32, ctx: &mut SceneContext<'_>) -> SceneCommand;

    /// React to an input event (held-key state is already updated)
    fn handle_input(&mut self, _event: &InputEvent, _ctx: &mut SceneContext<'_>) -> SceneCommand {
        SceneCommand::None
    }

    /// Drop timers and anything the manager can't see. Nodes under the scene
    /// root and widgets tagged with the scene's owner are released afterwards.
    fn teardown(&mut self, _ctx: &mut SceneContext<'_>) {}
}
