//! Lab selection carousel
//!
//! Six lab cards on an endless track. The track carries two clones of the
//! last cards before the first and two of the first cards after the last;
//! after a slide finishes on a clone the index jumps to the real card without
//! animating, so the loop looks seamless.

use crate::error::Result;
use crate::platform::dom::{DomHost, Owner, WidgetId, WidgetKind};
use crate::platform::input::InputEvent;
use crate::scene::SceneKey;

/// Cards cloned at each end of the track
pub const CLONE_COUNT: usize = 2;
/// Pointer travel (px) that turns a press into a drag
pub const DRAG_THRESHOLD: f32 = 5.0;
/// Length of a slide (seconds)
pub const SLIDE_TIME: f32 = 0.5;
/// Menu widgets never clash with scene owners, which start at 1
pub const MENU_OWNER: Owner = Owner(0);

const CARD_WIDTH: f32 = 300.0;
const CARD_SPACING: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lab {
    Chemistry,
    Physics,
    Biology,
    Dentistry,
    Medicine,
    ArtificialIntelligence,
}

impl Lab {
    pub const ALL: [Lab; 6] = [
        Lab::Chemistry,
        Lab::Physics,
        Lab::Biology,
        Lab::Dentistry,
        Lab::Medicine,
        Lab::ArtificialIntelligence,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Lab::Chemistry => "Chemistry",
            Lab::Physics => "Physics",
            Lab::Biology => "Biology",
            Lab::Dentistry => "Dentistry",
            Lab::Medicine => "Medicine",
            Lab::ArtificialIntelligence => "Artificial Intelligence",
        }
    }

    pub fn image(&self) -> &'static str {
        match self {
            Lab::Chemistry => "assets/labs/quimica.png",
            Lab::Physics => "assets/labs/fisica.png",
            Lab::Biology => "assets/labs/biologia.png",
            Lab::Dentistry => "assets/labs/odonto.png",
            Lab::Medicine => "assets/labs/medicina.png",
            Lab::ArtificialIntelligence => "assets/labs/ia.png",
        }
    }

    /// What picking this lab does
    pub fn outcome(&self) -> MenuOutcome {
        match self {
            Lab::Biology => MenuOutcome::Launch(SceneKey::BiologyHub),
            Lab::Physics => MenuOutcome::Launch(SceneKey::Landing),
            Lab::Chemistry => {
                MenuOutcome::Alert("The Chemistry lab is still under construction!".into())
            }
            other => MenuOutcome::Alert(format!(
                "The \"{}\" lab is not available right now.",
                other.name()
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuOutcome {
    Launch(SceneKey),
    Alert(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Drag {
    start_x: f32,
    dx: f32,
}

/// Carousel position and gestures, no DOM
#[derive(Debug, Clone, PartialEq)]
pub struct Carousel {
    /// Index into the track, clones included
    index: usize,
    /// Remaining slide time; input is ignored while sliding
    sliding: f32,
    drag: Option<Drag>,
    alert: Option<String>,
}

impl Default for Carousel {
    fn default() -> Self {
        Self::new()
    }
}

impl Carousel {
    pub fn new() -> Self {
        Self {
            index: CLONE_COUNT,
            sliding: 0.0,
            drag: None,
            alert: None,
        }
    }

    /// Cards in track order, clones included
    pub fn track() -> Vec<Lab> {
        let n = Lab::ALL.len();
        Lab::ALL[n - CLONE_COUNT..]
            .iter()
            .chain(Lab::ALL.iter())
            .chain(Lab::ALL[..CLONE_COUNT].iter())
            .copied()
            .collect()
    }

    pub fn track_len() -> usize {
        Lab::ALL.len() + 2 * CLONE_COUNT
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn active_lab(&self) -> Lab {
        Self::track()[self.index]
    }

    pub fn is_sliding(&self) -> bool {
        self.sliding > 0.0
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    /// Slide by `delta` cards; false while a slide is still running
    pub fn step(&mut self, delta: i32) -> bool {
        if self.is_sliding() {
            return false;
        }
        let max = Self::track_len() as i32 - 1;
        self.index = (self.index as i32 + delta).clamp(0, max) as usize;
        self.sliding = SLIDE_TIME;
        true
    }

    /// Advance the slide; on finish a clone index snaps to its real card
    pub fn update(&mut self, dt: f32) {
        if !self.is_sliding() {
            return;
        }
        self.sliding -= dt;
        if self.sliding <= 0.0 {
            self.sliding = 0.0;
            let n = Lab::ALL.len();
            if self.index < CLONE_COUNT {
                self.index += n;
            } else if self.index >= CLONE_COUNT + n {
                self.index -= n;
            }
        }
    }

    /// Pick the centered card
    pub fn select(&mut self) -> Option<MenuOutcome> {
        if self.is_sliding() || self.alert.is_some() {
            return None;
        }
        let lab = self.active_lab();
        log::info!("Selected lab: {}", lab.name());
        let outcome = lab.outcome();
        if let MenuOutcome::Alert(message) = &outcome {
            self.alert = Some(message.clone());
        }
        Some(outcome)
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    pub fn key(&mut self, key: &str) -> Option<MenuOutcome> {
        if self.alert.is_some() {
            if matches!(key, "escape" | "enter") {
                self.dismiss_alert();
            }
            return None;
        }
        match key {
            "arrowright" => {
                self.step(1);
                None
            }
            "arrowleft" => {
                self.step(-1);
                None
            }
            "enter" | "e" => self.select(),
            _ => None,
        }
    }

    pub fn pointer_down(&mut self, x: f32) {
        if self.is_sliding() || self.alert.is_some() {
            return;
        }
        self.drag = Some(Drag { start_x: x, dx: 0.0 });
    }

    pub fn pointer_move(&mut self, x: f32) {
        if let Some(drag) = &mut self.drag {
            drag.dx = x - drag.start_x;
        }
    }

    /// A short press selects; a drag slides one card against its direction
    pub fn pointer_up(&mut self, x: f32) -> Option<MenuOutcome> {
        let drag = self.drag.take()?;
        let dx = x - drag.start_x;
        if dx.abs() > DRAG_THRESHOLD {
            self.step(if dx < 0.0 { 1 } else { -1 });
            None
        } else {
            self.select()
        }
    }

    /// Track translation that centers the active card, plus any live drag
    pub fn offset(&self, area_width: f32) -> f32 {
        let item = CARD_WIDTH + CARD_SPACING;
        let drag = self.drag.map_or(0.0, |d| d.dx);
        -(self.index as f32) * item + area_width / 2.0 - CARD_WIDTH / 2.0 + drag
    }
}

#[derive(Debug)]
struct MenuView {
    root: WidgetId,
    track: WidgetId,
    cards: Vec<WidgetId>,
    modal: WidgetId,
    modal_text: WidgetId,
    modal_ok: WidgetId,
}

/// The carousel plus its DOM
#[derive(Debug, Default)]
pub struct Menu {
    pub carousel: Carousel,
    view: Option<MenuView>,
}

impl Menu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_shown(&self) -> bool {
        self.view.is_some()
    }

    pub fn show(&mut self, dom: &mut dyn DomHost) -> Result<()> {
        if self.view.is_some() {
            return Ok(());
        }
        let root = dom.attach(MENU_OWNER, None, WidgetKind::panel("carousel-area"))?;
        let track = dom.attach(MENU_OWNER, Some(root), WidgetKind::panel("carousel-track"))?;
        let mut cards = Vec::with_capacity(Carousel::track_len());
        for lab in Carousel::track() {
            let card = dom.attach(MENU_OWNER, Some(track), WidgetKind::panel("lab-card"))?;
            dom.attach(
                MENU_OWNER,
                Some(card),
                WidgetKind::Image {
                    src: lab.image().to_string(),
                    class: String::new(),
                },
            )?;
            dom.attach(MENU_OWNER, Some(card), WidgetKind::text(lab.name(), "lab-name"))?;
            cards.push(card);
        }

        let modal = dom.attach(MENU_OWNER, None, WidgetKind::panel("custom-modal"))?;
        let modal_text = dom.attach(MENU_OWNER, Some(modal), WidgetKind::text("", "modal-message"))?;
        let modal_ok = dom.attach(MENU_OWNER, Some(modal), WidgetKind::button("OK", "modal-ok"))?;
        dom.set_visible(modal, false);

        self.view = Some(MenuView {
            root,
            track,
            cards,
            modal,
            modal_text,
            modal_ok,
        });
        self.sync(dom);
        Ok(())
    }

    pub fn hide(&mut self, dom: &mut dyn DomHost) {
        if self.view.take().is_some() {
            dom.detach_all(MENU_OWNER);
        }
    }

    pub fn update(&mut self, dt: f32, dom: &mut dyn DomHost) {
        self.carousel.update(dt);
        self.sync(dom);
    }

    /// Returns the scene to launch, if a lab with one was picked
    pub fn handle_input(&mut self, event: &InputEvent, dom: &mut dyn DomHost) -> Option<SceneKey> {
        let outcome = match event {
            InputEvent::KeyDown(key) => self.carousel.key(key),
            InputEvent::PointerDown(p) => {
                self.carousel.pointer_down(p.x);
                None
            }
            InputEvent::PointerMove(p) => {
                self.carousel.pointer_move(p.x);
                None
            }
            InputEvent::PointerUp(p) => self.carousel.pointer_up(p.x),
            InputEvent::Widget(widget) => {
                if self.view.as_ref().is_some_and(|v| v.modal_ok == widget.id) {
                    self.carousel.dismiss_alert();
                }
                None
            }
            InputEvent::KeyUp(_) => None,
        };
        self.sync(dom);
        match outcome? {
            MenuOutcome::Launch(key) => Some(key),
            MenuOutcome::Alert(_) => None,
        }
    }

    fn sync(&self, dom: &mut dyn DomHost) {
        let Some(view) = &self.view else {
            return;
        };
        let width = dom.viewport().width;
        dom.set_offset_x(view.track, self.carousel.offset(width));
        for (i, card) in view.cards.iter().enumerate() {
            dom.set_class(*card, "active", i == self.carousel.index());
        }
        dom.set_class(view.track, "sliding", self.carousel.is_sliding());
        match self.carousel.alert() {
            Some(message) => {
                dom.set_text(view.modal_text, message);
                dom.set_visible(view.modal, true);
            }
            None => dom.set_visible(view.modal, false),
        }
        dom.set_visible(view.root, true);
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::platform::dom::HeadlessDom;

    fn settle(c: &mut Carousel) {
        c.update(SLIDE_TIME + 0.01);
    }

    #[test]
    fn test_track_has_clones_at_both_ends() {
        let track = Carousel::track();
        assert_eq!(track.len(), 10);
        assert_eq!(track[0], Lab::Medicine);
        assert_eq!(track[1], Lab::ArtificialIntelligence);
        assert_eq!(track[2], Lab::Chemistry);
        assert_eq!(track[8], Lab::Chemistry);
        assert_eq!(track[9], Lab::Physics);
    }

    #[test]
    fn test_wraps_left_past_first() {
        let mut c = Carousel::new();
        assert_eq!(c.active_lab(), Lab::Chemistry);
        c.step(-1);
        assert_eq!(c.active_lab(), Lab::ArtificialIntelligence);
        settle(&mut c);
        assert_eq!(c.index(), 7);
        assert_eq!(c.active_lab(), Lab::ArtificialIntelligence);
    }

    #[test]
    fn test_wraps_right_past_last() {
        let mut c = Carousel::new();
        for _ in 0..6 {
            c.key("arrowright");
            settle(&mut c);
        }
        assert_eq!(c.index(), CLONE_COUNT);
        assert_eq!(c.active_lab(), Lab::Chemistry);
    }

    #[test]
    fn test_input_ignored_while_sliding() {
        let mut c = Carousel::new();
        assert!(c.step(1));
        assert!(!c.step(1));
        assert_eq!(c.key("enter"), None);
        assert_eq!(c.active_lab(), Lab::Physics);
    }

    #[test]
    fn test_routing() {
        assert_eq!(Lab::Physics.outcome(), MenuOutcome::Launch(SceneKey::Landing));
        assert_eq!(Lab::Biology.outcome(), MenuOutcome::Launch(SceneKey::BiologyHub));
        assert!(matches!(Lab::Chemistry.outcome(), MenuOutcome::Alert(m) if m.contains("construction")));
        assert!(matches!(Lab::Medicine.outcome(), MenuOutcome::Alert(m) if m.contains("not available")));
    }

    #[test]
    fn test_short_press_selects_drag_slides() {
        let mut c = Carousel::new();
        c.step(1);
        settle(&mut c);
        c.pointer_down(500.0);
        c.pointer_move(503.0);
        assert_eq!(
            c.pointer_up(503.0),
            Some(MenuOutcome::Launch(SceneKey::Landing))
        );

        c.pointer_down(500.0);
        c.pointer_move(420.0);
        assert_eq!(c.pointer_up(420.0), None);
        settle(&mut c);
        assert_eq!(c.active_lab(), Lab::Biology);
    }

    #[test]
    fn test_alert_blocks_until_dismissed() {
        let mut c = Carousel::new();
        assert!(matches!(c.key("e"), Some(MenuOutcome::Alert(_))));
        assert!(c.alert().is_some());
        assert_eq!(c.key("arrowright"), None);
        assert_eq!(c.active_lab(), Lab::Chemistry);
        c.key("escape");
        assert!(c.alert().is_none());
    }

    #[test]
    fn test_menu_view_launches_and_hides() {
        let mut dom = HeadlessDom::default();
        let mut menu = Menu::new();
        menu.show(&mut dom).unwrap();
        assert!(dom.contains_text("Artificial Intelligence"));

        menu.handle_input(&InputEvent::key_down("ArrowRight"), &mut dom);
        menu.update(SLIDE_TIME, &mut dom);
        let launched = menu.handle_input(&InputEvent::key_down("Enter"), &mut dom);
        assert_eq!(launched, Some(SceneKey::Landing));

        menu.hide(&mut dom);
        assert!(dom.is_empty());
    }

    #[test]
    fn test_menu_modal_ok_closes_alert() {
        let mut dom = HeadlessDom::default();
        let mut menu = Menu::new();
        menu.show(&mut dom).unwrap();
        menu.handle_input(&InputEvent::PointerDown(Vec2::new(10.0, 10.0)), &mut dom);
        menu.handle_input(&InputEvent::PointerUp(Vec2::new(10.0, 10.0)), &mut dom);
        assert!(dom.contains_text("under construction"));

        let ok = dom
            .find_kind(|k| matches!(k, WidgetKind::Button { label, .. } if label == "OK"))[0];
        dom.click(ok);
        for event in dom.drain_events() {
            menu.handle_input(&InputEvent::Widget(event), &mut dom);
        }
        assert!(!dom.contains_text("under construction"));
    }
}
