//! Preload screen shown before the first real scene

use crate::error::Result;
use crate::platform::assets::LoadStatus;
use crate::platform::dom::{WidgetId, WidgetKind};

use super::{Scene, SceneCommand, SceneContext, SceneKey};

pub const FAILED_TEXT: &str = "Failed to load. Please reload the page.";

pub struct LoaderScene {
    target: SceneKey,
    label: Option<WidgetId>,
    halted: bool,
}

impl LoaderScene {
    /// Switches to `target` once the manifest is loaded
    pub fn new(target: SceneKey) -> Self {
        Self {
            target,
            label: None,
            halted: false,
        }
    }

    fn show(&self, ctx: &mut SceneContext<'_>, text: &str) {
        if let Some(label) = self.label {
            ctx.dom.set_text(label, text);
        }
    }
}

impl Scene for LoaderScene {
    fn key(&self) -> &'static str {
        "loader"
    }

    fn setup(&mut self, ctx: &mut SceneContext<'_>) -> Result<()> {
        let panel = ctx.dom.attach(ctx.owner, None, WidgetKind::panel("loader"))?;
        self.label = Some(ctx.dom.attach(
            ctx.owner,
            Some(panel),
            WidgetKind::text("Loading... 0%", "loader-text"),
        )?);
        ctx.assets.start_preload();
        Ok(())
    }

    fn update(&mut self, _dt: f32, ctx: &mut SceneContext<'_>) -> SceneCommand {
        if self.halted {
            return SceneCommand::None;
        }
        match ctx.assets.poll() {
            LoadStatus::Idle => SceneCommand::None,
            LoadStatus::Loading(fraction) => {
                self.show(ctx, &format!("Loading... {:.0}%", fraction * 100.0));
                SceneCommand::None
            }
            LoadStatus::Done => {
                self.show(ctx, "Ready!");
                log::info!("Assets ready, starting {}", self.target.name());
                SceneCommand::SwitchTo(self.target)
            }
            LoadStatus::Failed(reason) => {
                log::error!("Preload failed: {}", reason);
                self.show(ctx, FAILED_TEXT);
                self.halted = true;
                SceneCommand::None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Settings;
    use crate::platform::assets::{AssetCache, AssetEntry, AssetKind};
    use crate::platform::dom::HeadlessDom;
    use crate::scene::SceneManager;

    fn manager(manifest: Vec<AssetEntry>) -> SceneManager<HeadlessDom> {
        let assets = AssetCache::new(manifest).with_root(env!("CARGO_MANIFEST_DIR"));
        SceneManager::new(HeadlessDom::default(), assets, Settings::default())
    }

    #[test]
    fn test_switches_to_target_when_done() {
        let mut mgr = manager(vec![AssetEntry::new("a.png", AssetKind::Image)]);
        mgr.load_scene(Box::new(LoaderScene::new(SceneKey::Landing)));
        assert!(mgr.dom().contains_text("Loading..."));
        let command = mgr.update(1.0 / 60.0);
        assert_eq!(command, SceneCommand::SwitchTo(SceneKey::Landing));
        assert_eq!(mgr.active_key(), Some("fisica"));
    }

    #[test]
    fn test_failure_halts() {
        let mut mgr = manager(vec![AssetEntry::new(
            "assets/dialogues/missing.json",
            AssetKind::Json,
        )]);
        mgr.load_scene(Box::new(LoaderScene::new(SceneKey::Landing)));
        for _ in 0..5 {
            assert_eq!(mgr.update(1.0 / 60.0), SceneCommand::None);
        }
        assert_eq!(mgr.active_key(), Some("loader"));
        assert!(mgr.dom().contains_text(FAILED_TEXT));
    }
}
