//! Dialogue tree walker
//!
//! Plays a [`DialogueScript`] through DOM widgets: an overlay with both
//! portraits, the speaker's name and the line, plus either a click-anywhere
//! continue area or one button per choice. Triggers for a node are detached
//! before the next node's are attached, so a node can only be left once.

use crate::error::Result;
use crate::platform::assets::AssetCache;
use crate::platform::dom::{DomHost, Owner, WidgetAction, WidgetEvent, WidgetId, WidgetKind};

use super::script::{DialogueScript, END, START, Side, Step};

/// Widgets of the open overlay
#[derive(Debug, Clone, Copy)]
struct Overlay {
    root: WidgetId,
    left: WidgetId,
    right: WidgetId,
    name: WidgetId,
    text: WidgetId,
}

/// Walks one script at a time
pub struct DialogueWalker {
    owner: Owner,
    script: Option<DialogueScript>,
    current: Option<String>,
    overlay: Option<Overlay>,
    /// Live triggers and the node each one leads to
    triggers: Vec<(WidgetId, String)>,
    on_complete: Option<Box<dyn FnOnce()>>,
}

impl std::fmt::Debug for DialogueWalker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogueWalker")
            .field("owner", &self.owner)
            .field("current", &self.current)
            .field("triggers", &self.triggers)
            .finish_non_exhaustive()
    }
}

impl DialogueWalker {
    pub fn new(owner: Owner) -> Self {
        Self {
            owner,
            script: None,
            current: None,
            overlay: None,
            triggers: Vec::new(),
            on_complete: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.script.is_some()
    }

    pub fn current_key(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Widgets that currently move the dialogue on
    pub fn trigger_ids(&self) -> Vec<WidgetId> {
        self.triggers.iter().map(|(id, _)| *id).collect()
    }

    /// Open the overlay and show `"start"`
    ///
    /// A portrait that was never preloaded ends the dialogue right away (the
    /// callback still runs) and the error is returned for logging.
    pub fn start(
        &mut self,
        script: DialogueScript,
        dom: &mut dyn DomHost,
        assets: &AssetCache,
        on_complete: impl FnOnce() + 'static,
    ) -> Result<()> {
        if self.is_active() {
            log::warn!("Dialogue already running, ignoring start");
            return Ok(());
        }
        self.on_complete = Some(Box::new(on_complete));

        let portraits = assets
            .resolve(&script.actors.left.texture)
            .map(str::to_string)
            .and_then(|left| {
                assets
                    .resolve(&script.actors.right.texture)
                    .map(|right| (left, right.to_string()))
            });
        let (left_src, right_src) = match portraits {
            Ok(srcs) => srcs,
            Err(err) => {
                log::error!("Failed to load dialogue portraits: {}", err);
                self.end(dom);
                return Err(err);
            }
        };

        self.script = Some(script);
        match self.build_overlay(dom, left_src, right_src) {
            Ok(overlay) => self.overlay = Some(overlay),
            Err(err) => {
                log::error!("Failed to build dialogue overlay: {}", err);
                self.end(dom);
                return Err(err);
            }
        }

        self.show_node(START, dom);
        Ok(())
    }

    fn build_overlay(
        &self,
        dom: &mut dyn DomHost,
        left_src: String,
        right_src: String,
    ) -> Result<Overlay> {
        let root = dom.attach(self.owner, None, WidgetKind::panel("dialogue-overlay"))?;
        let left = dom.attach(
            self.owner,
            Some(root),
            WidgetKind::Image {
                src: left_src,
                class: "portrait left".into(),
            },
        )?;
        let right = dom.attach(
            self.owner,
            Some(root),
            WidgetKind::Image {
                src: right_src,
                class: "portrait right".into(),
            },
        )?;
        let name = dom.attach(self.owner, Some(root), WidgetKind::text("", "speaker-name"))?;
        let text = dom.attach(self.owner, Some(root), WidgetKind::text("", "dialogue-text"))?;
        Ok(Overlay {
            root,
            left,
            right,
            name,
            text,
        })
    }

    /// Show a node; `"end"` or an unknown key closes the dialogue
    pub fn show_node(&mut self, key: &str, dom: &mut dyn DomHost) {
        self.clear_triggers(dom);

        let (Some(script), Some(overlay)) = (&self.script, self.overlay) else {
            return;
        };
        let Some(node) = script.node(key).filter(|_| key != END) else {
            if key != END {
                log::warn!("Dialogue node \"{}\" not found, ending", key);
            }
            self.end(dom);
            return;
        };

        let speaking_left = node.speaker == Side::Left;
        dom.set_text(overlay.text, &node.text);
        dom.set_text(overlay.name, &script.actor(node.speaker).name);
        dom.set_class(overlay.left, "dimmed", !speaking_left);
        dom.set_class(overlay.right, "dimmed", speaking_left);

        let links: Vec<(WidgetKind, String)> = match node.step() {
            Step::Continue(next) => vec![(WidgetKind::ClickArea, next.to_string())],
            Step::Choose(choices) => choices
                .iter()
                .map(|c| (WidgetKind::button(&c.text, "choice"), c.target.clone()))
                .collect(),
        };

        self.current = Some(key.to_string());
        for (kind, target) in links {
            match dom.attach(self.owner, Some(overlay.root), kind) {
                Ok(id) => self.triggers.push((id, target)),
                Err(err) => {
                    log::error!("Failed to attach dialogue trigger: {}", err);
                    self.end(dom);
                    return;
                }
            }
        }
    }

    /// Route a widget event; true if it belonged to this dialogue
    pub fn handle_widget(&mut self, event: &WidgetEvent, dom: &mut dyn DomHost) -> bool {
        if event.action != WidgetAction::Click {
            return false;
        }
        let Some(target) = self
            .triggers
            .iter()
            .find(|(id, _)| *id == event.id)
            .map(|(_, target)| target.clone())
        else {
            return false;
        };
        self.show_node(&target, dom);
        true
    }

    fn clear_triggers(&mut self, dom: &mut dyn DomHost) {
        for (id, _) in self.triggers.drain(..) {
            dom.detach(id);
        }
    }

    /// Close the overlay and run the completion callback once
    pub fn end(&mut self, dom: &mut dyn DomHost) {
        self.clear_triggers(dom);
        if let Some(overlay) = self.overlay.take() {
            dom.detach(overlay.root);
        }
        self.script = None;
        self.current = None;
        if let Some(callback) = self.on_complete.take() {
            callback();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::dialogue::script::fixtures;
    use crate::error::HubError;
    use crate::platform::dom::HeadlessDom;

    const OWNER: Owner = Owner(7);

    fn assets() -> AssetCache {
        let mut assets = AssetCache::new(Vec::new());
        for key in ["julia.png", "pasteur.png", "a.png", "b.png"] {
            assets.insert_url(key);
        }
        assets
    }

    fn counter() -> (Rc<Cell<u32>>, impl FnOnce() + 'static) {
        let count = Rc::new(Cell::new(0));
        let inner = count.clone();
        (count, move || inner.set(inner.get() + 1))
    }

    /// Click the first trigger up to `max_steps` times
    fn walk_first(walker: &mut DialogueWalker, dom: &mut HeadlessDom, max_steps: usize) -> usize {
        let mut steps = 0;
        while walker.is_active() && steps < max_steps {
            let first = walker.trigger_ids()[0];
            dom.click(first);
            for event in dom.drain_events() {
                walker.handle_widget(&event, dom);
            }
            steps += 1;
        }
        steps
    }

    #[test]
    fn test_first_choice_walk_reaches_end() {
        let mut dom = HeadlessDom::default();
        let mut walker = DialogueWalker::new(OWNER);
        let (count, on_complete) = counter();
        let script = DialogueScript::from_json(fixtures::LINEAR).unwrap();
        walker.start(script, &mut dom, &assets(), on_complete).unwrap();

        assert_eq!(walker.current_key(), Some("start"));
        assert!(dom.contains_text("Hello!"));

        let steps = walk_first(&mut walker, &mut dom, 50);
        assert_eq!(steps, 3);
        assert!(!walker.is_active());
        assert_eq!(count.get(), 1);
        assert_eq!(dom.widget_count(OWNER), 0);
    }

    #[test]
    fn test_cycle_never_completes() {
        let mut dom = HeadlessDom::default();
        let mut walker = DialogueWalker::new(OWNER);
        let (count, on_complete) = counter();
        let script = DialogueScript::from_json(fixtures::CYCLE).unwrap();
        walker.start(script, &mut dom, &assets(), on_complete).unwrap();

        assert_eq!(walk_first(&mut walker, &mut dom, 100), 100);
        assert!(walker.is_active());
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_triggers_never_stack() {
        let mut dom = HeadlessDom::default();
        let mut walker = DialogueWalker::new(OWNER);
        let script = DialogueScript::from_json(fixtures::CYCLE).unwrap();
        walker.start(script, &mut dom, &assets(), || {}).unwrap();

        // overlay + 2 portraits + name + text + one trigger
        let baseline = dom.widget_count(OWNER);
        assert_eq!(baseline, 6);
        walk_first(&mut walker, &mut dom, 20);
        assert_eq!(dom.widget_count(OWNER), baseline);
        assert_eq!(walker.trigger_ids().len(), 1);
    }

    #[test]
    fn test_double_click_advances_once() {
        let mut dom = HeadlessDom::default();
        let mut walker = DialogueWalker::new(OWNER);
        let script = DialogueScript::from_json(fixtures::LINEAR).unwrap();
        walker.start(script, &mut dom, &assets(), || {}).unwrap();

        let area = walker.trigger_ids()[0];
        dom.click(area);
        dom.click(area);
        for event in dom.drain_events() {
            walker.handle_widget(&event, &mut dom);
        }
        assert_eq!(walker.current_key(), Some("ask"));
    }

    #[test]
    fn test_speaker_highlight() {
        let mut dom = HeadlessDom::default();
        let mut walker = DialogueWalker::new(OWNER);
        let script = DialogueScript::from_json(fixtures::LINEAR).unwrap();
        walker.start(script, &mut dom, &assets(), || {}).unwrap();

        let overlay = walker.overlay.unwrap();
        assert!(dom.widget(overlay.left).unwrap().classes.contains("dimmed"));
        assert!(!dom.widget(overlay.right).unwrap().classes.contains("dimmed"));
        assert_eq!(dom.widget(overlay.name).unwrap().text, "Pasteur");
    }

    #[test]
    fn test_missing_portrait_ends_with_error() {
        let mut dom = HeadlessDom::default();
        let mut walker = DialogueWalker::new(OWNER);
        let (count, on_complete) = counter();
        let script = DialogueScript::from_json(fixtures::LINEAR).unwrap();
        let err = walker
            .start(script, &mut dom, &AssetCache::new(Vec::new()), on_complete)
            .unwrap_err();
        assert!(matches!(err, HubError::AssetMissing(_)));
        assert!(!walker.is_active());
        assert_eq!(count.get(), 1);
        assert_eq!(dom.widget_count(OWNER), 0);
    }

    #[test]
    fn test_end_is_idempotent() {
        let mut dom = HeadlessDom::default();
        let mut walker = DialogueWalker::new(OWNER);
        let (count, on_complete) = counter();
        let script = DialogueScript::from_json(fixtures::LINEAR).unwrap();
        walker.start(script, &mut dom, &assets(), on_complete).unwrap();
        walker.end(&mut dom);
        walker.end(&mut dom);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_unknown_key_ends() {
        let mut dom = HeadlessDom::default();
        let mut walker = DialogueWalker::new(OWNER);
        let (count, on_complete) = counter();
        let script = DialogueScript::from_json(fixtures::LINEAR).unwrap();
        walker.start(script, &mut dom, &assets(), on_complete).unwrap();
        walker.show_node("nowhere", &mut dom);
        assert!(!walker.is_active());
        assert_eq!(count.get(), 1);
    }
}
