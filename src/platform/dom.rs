//! DOM host abstraction
//!
//! Scenes never touch `web_sys` directly. They attach widgets through a
//! [`DomHost`], tagged with the owning scene, and read back clicks and slider
//! input as [`WidgetEvent`]s. The manager detaches everything a scene owns when
//! it leaves, which also drops every listener that scene registered.
//!
//! [`WebDom`] drives the real document on wasm; [`HeadlessDom`] keeps the same
//! bookkeeping in memory for tests and the native demo.

use std::collections::{BTreeSet, HashMap};

use crate::Viewport;
use crate::error::{HubError, Result};

/// Scene instance that owns a widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Owner(pub u32);

/// Handle to an attached widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(u32);

/// What to create
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetKind {
    /// Plain container (`div`)
    Panel { class: String },
    /// Text block
    Text { text: String, class: String },
    /// Clickable button
    Button { label: String, class: String },
    /// Range input reporting its value on every change
    Slider {
        label: String,
        min: f32,
        max: f32,
        step: f32,
        value: f32,
    },
    /// Image element (portraits)
    Image { src: String, class: String },
    /// Transparent full-size click target
    ClickArea,
}

impl WidgetKind {
    pub fn panel(class: &str) -> Self {
        WidgetKind::Panel {
            class: class.to_string(),
        }
    }

    pub fn text(text: &str, class: &str) -> Self {
        WidgetKind::Text {
            text: text.to_string(),
            class: class.to_string(),
        }
    }

    pub fn button(label: &str, class: &str) -> Self {
        WidgetKind::Button {
            label: label.to_string(),
            class: class.to_string(),
        }
    }

    /// Kinds that report clicks back
    fn clickable(&self) -> bool {
        matches!(self, WidgetKind::Button { .. } | WidgetKind::ClickArea)
    }
}

/// Something that happened to a widget
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WidgetAction {
    Click,
    /// New slider value
    Input(f32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidgetEvent {
    pub id: WidgetId,
    pub action: WidgetAction,
}

/// The surface scenes use to build DOM UI
pub trait DomHost {
    /// Size of the game area in CSS pixels
    fn viewport(&self) -> Viewport;

    /// Create a widget under `parent` (or the UI layer) owned by `owner`
    fn attach(&mut self, owner: Owner, parent: Option<WidgetId>, kind: WidgetKind)
    -> Result<WidgetId>;

    /// Remove a widget, its children and their listeners. False if unknown.
    fn detach(&mut self, id: WidgetId) -> bool;

    /// Remove every widget `owner` created; returns how many went away
    fn detach_all(&mut self, owner: Owner) -> usize;

    fn set_text(&mut self, id: WidgetId, text: &str);
    fn set_visible(&mut self, id: WidgetId, visible: bool);
    fn set_class(&mut self, id: WidgetId, class: &str, on: bool);
    fn set_value(&mut self, id: WidgetId, value: f32);
    /// Horizontal translation in CSS pixels (carousel track)
    fn set_offset_x(&mut self, id: WidgetId, x: f32);

    /// Live widgets owned by `owner`
    fn widget_count(&self, owner: Owner) -> usize;

    /// Events fired since the last drain, oldest first
    fn drain_events(&mut self) -> Vec<WidgetEvent>;
}

/// Parent/child bookkeeping shared by both hosts
#[derive(Debug, Default)]
struct Tree {
    owners: HashMap<WidgetId, Owner>,
    parents: HashMap<WidgetId, WidgetId>,
    next_id: u32,
}

impl Tree {
    fn insert(&mut self, owner: Owner, parent: Option<WidgetId>) -> Result<WidgetId> {
        if let Some(parent) = parent {
            if !self.owners.contains_key(&parent) {
                return Err(HubError::Dom(format!("parent widget {:?} is gone", parent)));
            }
        }
        self.next_id += 1;
        let id = WidgetId(self.next_id);
        self.owners.insert(id, owner);
        if let Some(parent) = parent {
            self.parents.insert(id, parent);
        }
        Ok(id)
    }

    /// `id` and every descendant, children before parents
    fn subtree(&self, id: WidgetId) -> Vec<WidgetId> {
        if !self.owners.contains_key(&id) {
            return Vec::new();
        }
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(
                self.parents
                    .iter()
                    .filter(|(_, p)| **p == current)
                    .map(|(child, _)| *child),
            );
        }
        out.reverse();
        out
    }

    fn remove(&mut self, id: WidgetId) {
        self.owners.remove(&id);
        self.parents.remove(&id);
    }

    fn owned_by(&self, owner: Owner) -> Vec<WidgetId> {
        let mut ids: Vec<_> = self
            .owners
            .iter()
            .filter(|(_, o)| **o == owner)
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }

    fn count(&self, owner: Owner) -> usize {
        self.owners.values().filter(|o| **o == owner).count()
    }
}

/// Recorded state of a headless widget
#[derive(Debug, Clone)]
pub struct HeadlessWidget {
    pub owner: Owner,
    pub parent: Option<WidgetId>,
    pub kind: WidgetKind,
    pub text: String,
    pub visible: bool,
    pub classes: BTreeSet<String>,
    pub value: f32,
    pub offset_x: f32,
}

/// In-memory DOM host
#[derive(Debug)]
pub struct HeadlessDom {
    viewport: Viewport,
    tree: Tree,
    widgets: HashMap<WidgetId, HeadlessWidget>,
    events: Vec<WidgetEvent>,
}

impl Default for HeadlessDom {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

impl HeadlessDom {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            tree: Tree::default(),
            widgets: HashMap::new(),
            events: Vec::new(),
        }
    }

    pub fn widget(&self, id: WidgetId) -> Option<&HeadlessWidget> {
        self.widgets.get(&id)
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Visible itself and through every ancestor
    pub fn is_shown(&self, id: WidgetId) -> bool {
        let mut current = Some(id);
        while let Some(id) = current {
            match self.widgets.get(&id) {
                Some(w) if w.visible => current = w.parent,
                _ => return false,
            }
        }
        true
    }

    /// First shown widget whose text or label matches exactly
    pub fn find_text(&self, text: &str) -> Option<WidgetId> {
        let mut ids: Vec<_> = self
            .widgets
            .iter()
            .filter(|(id, w)| w.text == text && self.is_shown(**id))
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids.first().copied()
    }

    /// Shown text containing `needle`
    pub fn contains_text(&self, needle: &str) -> bool {
        self.widgets
            .iter()
            .any(|(id, w)| w.text.contains(needle) && self.is_shown(*id))
    }

    /// Widgets of a given shape, in creation order
    pub fn find_kind(&self, pred: impl Fn(&WidgetKind) -> bool) -> Vec<WidgetId> {
        let mut ids: Vec<_> = self
            .widgets
            .iter()
            .filter(|(_, w)| pred(&w.kind))
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }

    /// Simulate a click; ignored for widgets that don't take clicks
    pub fn click(&mut self, id: WidgetId) -> bool {
        match self.widgets.get(&id) {
            Some(w) if w.kind.clickable() => {
                self.events.push(WidgetEvent {
                    id,
                    action: WidgetAction::Click,
                });
                true
            }
            _ => false,
        }
    }

    /// Simulate dragging a slider
    pub fn input(&mut self, id: WidgetId, value: f32) -> bool {
        match self.widgets.get_mut(&id) {
            Some(w) if matches!(w.kind, WidgetKind::Slider { .. }) => {
                w.value = value;
                self.events.push(WidgetEvent {
                    id,
                    action: WidgetAction::Input(value),
                });
                true
            }
            _ => false,
        }
    }
}

impl DomHost for HeadlessDom {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn attach(
        &mut self,
        owner: Owner,
        parent: Option<WidgetId>,
        kind: WidgetKind,
    ) -> Result<WidgetId> {
        let id = self.tree.insert(owner, parent)?;
        let (text, value, classes) = match &kind {
            WidgetKind::Panel { class } | WidgetKind::Image { class, .. } => {
                (String::new(), 0.0, class_set(class))
            }
            WidgetKind::Text { text, class } => (text.clone(), 0.0, class_set(class)),
            WidgetKind::Button { label, class } => (label.clone(), 0.0, class_set(class)),
            WidgetKind::Slider { label, value, .. } => (label.clone(), *value, BTreeSet::new()),
            WidgetKind::ClickArea => (String::new(), 0.0, BTreeSet::new()),
        };
        self.widgets.insert(
            id,
            HeadlessWidget {
                owner,
                parent,
                kind,
                text,
                visible: true,
                classes,
                value,
                offset_x: 0.0,
            },
        );
        Ok(id)
    }

    fn detach(&mut self, id: WidgetId) -> bool {
        let doomed = self.tree.subtree(id);
        if doomed.is_empty() {
            return false;
        }
        for id in doomed {
            self.tree.remove(id);
            self.widgets.remove(&id);
        }
        // Queued clicks on removed widgets must not reach anyone
        let widgets = &self.widgets;
        self.events.retain(|e| widgets.contains_key(&e.id));
        true
    }

    fn detach_all(&mut self, owner: Owner) -> usize {
        let before = self.widgets.len();
        for id in self.tree.owned_by(owner) {
            self.detach(id);
        }
        before - self.widgets.len()
    }

    fn set_text(&mut self, id: WidgetId, text: &str) {
        if let Some(w) = self.widgets.get_mut(&id) {
            w.text = text.to_string();
        }
    }

    fn set_visible(&mut self, id: WidgetId, visible: bool) {
        if let Some(w) = self.widgets.get_mut(&id) {
            w.visible = visible;
        }
    }

    fn set_class(&mut self, id: WidgetId, class: &str, on: bool) {
        if let Some(w) = self.widgets.get_mut(&id) {
            if on {
                w.classes.insert(class.to_string());
            } else {
                w.classes.remove(class);
            }
        }
    }

    fn set_value(&mut self, id: WidgetId, value: f32) {
        if let Some(w) = self.widgets.get_mut(&id) {
            w.value = value;
        }
    }

    fn set_offset_x(&mut self, id: WidgetId, x: f32) {
        if let Some(w) = self.widgets.get_mut(&id) {
            w.offset_x = x;
        }
    }

    fn widget_count(&self, owner: Owner) -> usize {
        self.tree.count(owner)
    }

    fn drain_events(&mut self) -> Vec<WidgetEvent> {
        std::mem::take(&mut self.events)
    }
}

fn class_set(class: &str) -> BTreeSet<String> {
    class.split_whitespace().map(str::to_string).collect()
}

#[cfg(target_arch = "wasm32")]
pub use web::WebDom;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlElement, HtmlInputElement};

    use super::*;

    struct Listener {
        event: &'static str,
        closure: Closure<dyn FnMut(web_sys::Event)>,
    }

    struct WebWidget {
        element: HtmlElement,
        listener: Option<Listener>,
    }

    /// DOM host backed by the page's `#ui-layer` element
    pub struct WebDom {
        document: Document,
        layer: HtmlElement,
        tree: Tree,
        widgets: HashMap<WidgetId, WebWidget>,
        events: Rc<RefCell<Vec<WidgetEvent>>>,
    }

    impl WebDom {
        pub fn new(layer_id: &str) -> Result<Self> {
            let document = web_sys::window()
                .and_then(|w| w.document())
                .ok_or_else(|| HubError::Dom("no document".into()))?;
            let layer = document
                .get_element_by_id(layer_id)
                .ok_or_else(|| HubError::Dom(format!("missing #{}", layer_id)))?
                .dyn_into::<HtmlElement>()
                .map_err(|_| HubError::Dom(format!("#{} is not an element", layer_id)))?;
            Ok(Self {
                document,
                layer,
                tree: Tree::default(),
                widgets: HashMap::new(),
                events: Rc::new(RefCell::new(Vec::new())),
            })
        }

        fn create(&self, tag: &str, class: &str) -> Result<HtmlElement> {
            let el = self.document.create_element(tag)?.unchecked_into::<HtmlElement>();
            if !class.is_empty() {
                el.set_class_name(class);
            }
            Ok(el)
        }

        fn listen(&self, id: WidgetId, element: &HtmlElement, kind: &WidgetKind) -> Result<Option<Listener>> {
            let events = self.events.clone();
            let listener = match kind {
                WidgetKind::Button { .. } | WidgetKind::ClickArea => {
                    let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                        event.stop_propagation();
                        events.borrow_mut().push(WidgetEvent {
                            id,
                            action: WidgetAction::Click,
                        });
                    });
                    Listener {
                        event: "click",
                        closure,
                    }
                }
                WidgetKind::Slider { .. } => {
                    let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                        let value = event
                            .target()
                            .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
                            .and_then(|input| input.value().parse::<f32>().ok());
                        if let Some(value) = value {
                            events.borrow_mut().push(WidgetEvent {
                                id,
                                action: WidgetAction::Input(value),
                            });
                        }
                    });
                    Listener {
                        event: "input",
                        closure,
                    }
                }
                _ => return Ok(None),
            };
            element.add_event_listener_with_callback(
                listener.event,
                listener.closure.as_ref().unchecked_ref(),
            )?;
            Ok(Some(listener))
        }

        fn build(&self, kind: &WidgetKind) -> Result<HtmlElement> {
            let el = match kind {
                WidgetKind::Panel { class } => self.create("div", class)?,
                WidgetKind::Text { text, class } => {
                    let el = self.create("p", class)?;
                    el.set_text_content(Some(text));
                    el
                }
                WidgetKind::Button { label, class } => {
                    let el = self.create("button", class)?;
                    el.set_text_content(Some(label));
                    el
                }
                WidgetKind::Slider {
                    label,
                    min,
                    max,
                    step,
                    value,
                } => {
                    let wrapper = self.create("label", "slider")?;
                    wrapper.set_text_content(Some(label));
                    let input = self
                        .document
                        .create_element("input")?
                        .unchecked_into::<HtmlInputElement>();
                    input.set_type("range");
                    input.set_min(&min.to_string());
                    input.set_max(&max.to_string());
                    input.set_step(&step.to_string());
                    input.set_value(&value.to_string());
                    wrapper.append_child(&input)?;
                    wrapper
                }
                WidgetKind::Image { src, class } => {
                    let img = self
                        .document
                        .create_element("img")?
                        .unchecked_into::<web_sys::HtmlImageElement>();
                    img.set_src(src);
                    if !class.is_empty() {
                        img.set_class_name(class);
                    }
                    img.unchecked_into::<HtmlElement>()
                }
                WidgetKind::ClickArea => self.create("div", "click-area")?,
            };
            Ok(el)
        }

        fn slider_input(&self, id: WidgetId) -> Option<HtmlInputElement> {
            let widget = self.widgets.get(&id)?;
            widget
                .element
                .query_selector("input")
                .ok()
                .flatten()
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        }
    }

    impl DomHost for WebDom {
        fn viewport(&self) -> Viewport {
            Viewport::new(
                self.layer.client_width().max(1) as f32,
                self.layer.client_height().max(1) as f32,
            )
        }

        fn attach(
            &mut self,
            owner: Owner,
            parent: Option<WidgetId>,
            kind: WidgetKind,
        ) -> Result<WidgetId> {
            let element = self.build(&kind)?;
            let parent_el = match parent {
                Some(p) => self
                    .widgets
                    .get(&p)
                    .map(|w| w.element.clone())
                    .ok_or_else(|| HubError::Dom(format!("parent widget {:?} is gone", p)))?,
                None => self.layer.clone(),
            };
            let id = self.tree.insert(owner, parent)?;
            let listen_on = match &kind {
                WidgetKind::Slider { .. } => element
                    .query_selector("input")?
                    .and_then(|el| el.dyn_into::<HtmlElement>().ok())
                    .unwrap_or_else(|| element.clone()),
                _ => element.clone(),
            };
            let listener = self.listen(id, &listen_on, &kind)?;
            parent_el.append_child(&element)?;
            self.widgets.insert(id, WebWidget { element, listener });
            Ok(id)
        }

        fn detach(&mut self, id: WidgetId) -> bool {
            let doomed = self.tree.subtree(id);
            if doomed.is_empty() {
                return false;
            }
            for id in doomed {
                self.tree.remove(id);
                if let Some(widget) = self.widgets.remove(&id) {
                    if let Some(listener) = widget.listener {
                        let target = widget
                            .element
                            .query_selector("input")
                            .ok()
                            .flatten()
                            .map(|el| el.unchecked_into::<web_sys::EventTarget>())
                            .unwrap_or_else(|| widget.element.clone().unchecked_into());
                        if let Err(e) = target.remove_event_listener_with_callback(
                            listener.event,
                            listener.closure.as_ref().unchecked_ref(),
                        ) {
                            log::warn!("Failed to remove {} listener: {:?}", listener.event, e);
                        }
                    }
                    widget.element.remove();
                }
            }
            let widgets = &self.widgets;
            self.events.borrow_mut().retain(|e| widgets.contains_key(&e.id));
            true
        }

        fn detach_all(&mut self, owner: Owner) -> usize {
            let before = self.widgets.len();
            for id in self.tree.owned_by(owner) {
                self.detach(id);
            }
            before - self.widgets.len()
        }

        fn set_text(&mut self, id: WidgetId, text: &str) {
            if let Some(w) = self.widgets.get(&id) {
                w.element.set_text_content(Some(text));
            }
        }

        fn set_visible(&mut self, id: WidgetId, visible: bool) {
            if let Some(w) = self.widgets.get(&id) {
                let result = if visible {
                    w.element.class_list().remove_1("hidden")
                } else {
                    w.element.class_list().add_1("hidden")
                };
                if let Err(e) = result {
                    log::warn!("Failed to toggle visibility: {:?}", e);
                }
            }
        }

        fn set_class(&mut self, id: WidgetId, class: &str, on: bool) {
            if let Some(w) = self.widgets.get(&id) {
                if let Err(e) = w.element.class_list().toggle_with_force(class, on) {
                    log::warn!("Failed to toggle class {}: {:?}", class, e);
                }
            }
        }

        fn set_value(&mut self, id: WidgetId, value: f32) {
            if let Some(input) = self.slider_input(id) {
                input.set_value(&value.to_string());
            }
        }

        fn set_offset_x(&mut self, id: WidgetId, x: f32) {
            if let Some(w) = self.widgets.get(&id) {
                if let Err(e) = w
                    .element
                    .style()
                    .set_property("transform", &format!("translateX({}px)", x))
                {
                    log::warn!("Failed to set offset: {:?}", e);
                }
            }
        }

        fn widget_count(&self, owner: Owner) -> usize {
            self.tree.count(owner)
        }

        fn drain_events(&mut self) -> Vec<WidgetEvent> {
            std::mem::take(&mut *self.events.borrow_mut())
        }
    }
}
