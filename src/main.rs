//! Lab Hub entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Element, HtmlCanvasElement, KeyboardEvent, PointerEvent};

    use glam::Vec2;
    use lab_hub::audio::MusicPlayer;
    use lab_hub::consts::*;
    use lab_hub::menu::Menu;
    use lab_hub::platform::assets::{AssetCache, default_manifest, keys};
    use lab_hub::platform::dom::{DomHost, WebDom};
    use lab_hub::platform::input::InputEvent;
    use lab_hub::renderer::RenderState;
    use lab_hub::scene::{LoaderScene, SceneCommand, SceneKey, SceneManager};
    use lab_hub::{HubError, Result, Settings};

    /// Toggles the theme music anywhere in the game
    const MUTE_KEY: &str = "m";

    /// Game instance holding all state
    struct Game {
        manager: SceneManager<WebDom>,
        menu: Menu,
        music: MusicPlayer,
        render_state: Option<RenderState>,
        canvas: HtmlCanvasElement,
        accumulator: f32,
        last_time: f64,
    }

    impl Game {
        fn new(manager: SceneManager<WebDom>, canvas: HtmlCanvasElement) -> Self {
            let music = MusicPlayer::new(keys::MUSIC, manager.settings());
            Self {
                manager,
                menu: Menu::new(),
                music,
                render_state: None,
                canvas,
                accumulator: 0.0,
                last_time: 0.0,
            }
        }

        /// Go through the loader so every scene starts with assets in place
        fn launch(&mut self, key: SceneKey) {
            log::info!("Launching {}", key.name());
            self.menu.hide(self.manager.dom_mut());
            self.manager.load_scene(Box::new(LoaderScene::new(key)));
        }

        fn show_menu(&mut self) {
            if let Err(err) = self.menu.show(self.manager.dom_mut()) {
                log::error!("Failed to build the lab menu: {}", err);
            }
        }

        fn route(&mut self, command: SceneCommand) {
            if command == SceneCommand::ExitToMenu {
                self.show_menu();
            }
        }

        fn handle_event(&mut self, event: InputEvent) {
            if matches!(event, InputEvent::KeyDown(_) | InputEvent::PointerDown(_)) {
                self.music.on_gesture();
            }
            if event == InputEvent::key_down(MUTE_KEY) {
                self.music.toggle_mute(self.manager.settings_mut());
                return;
            }
            if self.manager.is_empty() {
                if let Some(key) = self.menu.handle_input(&event, self.manager.dom_mut()) {
                    self.launch(key);
                }
            } else {
                let command = self.manager.handle_input(event);
                self.route(command);
            }
        }

        /// One fixed step of whichever of menu or scene is showing
        fn step(&mut self) {
            if self.manager.is_empty() {
                // The manager only drains widget events for a live scene
                let widgets = self.manager.dom_mut().drain_events();
                for widget in widgets {
                    self.handle_event(InputEvent::Widget(widget));
                    if !self.manager.is_empty() {
                        break;
                    }
                }
                self.menu.update(SIM_DT, self.manager.dom_mut());
            } else {
                let command = self.manager.update(SIM_DT);
                self.route(command);
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                self.step();
                self.accumulator -= SIM_DT;
                substeps += 1;
            }
            if substeps == MAX_SUBSTEPS {
                self.accumulator = 0.0;
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(self.manager.stage()) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        fn resize(&mut self) {
            let width = self.canvas.client_width().max(1) as u32;
            let height = self.canvas.client_height().max(1) as u32;
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            if let Some(ref mut render_state) = self.render_state {
                render_state.resize(width, height);
            }
        }

        /// Pointer position in stage pixels
        fn to_stage(&self, event: &PointerEvent) -> Vec2 {
            let rect = self.canvas.get_bounding_client_rect();
            Vec2::new(
                event.client_x() as f32 - rect.left() as f32,
                event.client_y() as f32 - rect.top() as f32,
            )
        }
    }

    /// `?scene=<name>` skips the menu
    fn scene_from_url() -> Option<SceneKey> {
        let search = web_sys::window()?.location().search().ok()?;
        search
            .trim_start_matches('?')
            .split('&')
            .find_map(|pair| pair.strip_prefix("scene="))
            .filter(|name| !name.is_empty())
            .map(SceneKey::route)
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Failed to init logger: {}", e).into());
        }

        log::info!("Lab Hub starting...");
        if let Err(err) = start().await {
            log::error!("Startup failed: {}", err);
        }
    }

    async fn start() -> Result<()> {
        let window = web_sys::window().ok_or_else(|| HubError::Dom("no window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| HubError::Dom("no document".into()))?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or_else(|| HubError::Dom("missing #canvas".into()))?
            .dyn_into()
            .map_err(|_| HubError::Dom("#canvas is not a canvas".into()))?;

        let width = canvas.client_width().max(1) as u32;
        let height = canvas.client_height().max(1) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let dom = WebDom::new("ui-layer")?;
        let manager = SceneManager::new(dom, AssetCache::new(default_manifest()), Settings::load());
        let game = Rc::new(RefCell::new(Game::new(manager, canvas.clone())));

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| HubError::Render(format!("Failed to create surface: {}", e)))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| HubError::Render(format!("Failed to get adapter: {}", e)))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height).await?;
        game.borrow_mut().render_state = Some(render_state);

        match scene_from_url() {
            Some(key) => game.borrow_mut().launch(key),
            None => game.borrow_mut().show_menu(),
        }

        setup_input_handlers(game.clone())?;
        setup_resize(game.clone())?;

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            if let Err(e) = loading.set_attribute("class", "hidden") {
                log::warn!("Failed to hide loading indicator: {:?}", e);
            }
        }

        request_animation_frame(game);

        log::info!("Lab Hub running!");
        Ok(())
    }

    /// Buttons and sliders report through the DOM host, not as pointer input
    fn is_control(event: &web_sys::Event) -> bool {
        event
            .target()
            .and_then(|t| t.dyn_into::<Element>().ok())
            .is_some_and(|el| matches!(el.tag_name().as_str(), "BUTTON" | "INPUT"))
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) -> Result<()> {
        let window = web_sys::window().ok_or_else(|| HubError::Dom("no window".into()))?;

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.repeat() {
                    return;
                }
                game.borrow_mut()
                    .handle_event(InputEvent::key_down(&event.key()));
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut()
                    .handle_event(InputEvent::key_up(&event.key()));
            });
            window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        let pointer_events: [(&str, fn(Vec2) -> InputEvent); 3] = [
            ("pointerdown", InputEvent::PointerDown),
            ("pointermove", InputEvent::PointerMove),
            ("pointerup", InputEvent::PointerUp),
        ];
        for (name, wrap) in pointer_events {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut g = game.borrow_mut();
                if is_control(&event) {
                    // Still a gesture as far as the audio unlock is concerned
                    if event.type_() == "pointerdown" {
                        g.music.on_gesture();
                    }
                    return;
                }
                let point = g.to_stage(&event);
                g.handle_event(wrap(point));
            });
            window.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn setup_resize(game: Rc<RefCell<Game>>) -> Result<()> {
        let window = web_sys::window().ok_or_else(|| HubError::Dom("no window".into()))?;
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            game.borrow_mut().resize();
        });
        window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        if let Err(e) = window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            log::warn!("requestAnimationFrame failed: {:?}", e);
        }
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.render();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Lab Hub (native) starting...");
    log::info!("The hub needs a browser - run with `trunk serve` for the web version");
    headless_landing();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Fly the first landing levels with a simple autopilot
#[cfg(not(target_arch = "wasm32"))]
fn headless_landing() {
    use lab_hub::Viewport;
    use lab_hub::consts::SIM_DT;
    use lab_hub::renderer::Stage;
    use lab_hub::sim::{LandingEvent, LandingState, ThrustInput, tick};

    let mut stage = Stage::new();
    let root = stage.root();
    let mut state = LandingState::new(&mut stage, root, Viewport::default(), 7);

    // One simulated minute
    for step in 0..3600 {
        let mut input = ThrustInput::default();
        if !state.body.landed {
            if let Some(pad) = &state.layout.pad {
                let dx = pad.anchor.x - state.body.pos.x;
                let vx = state.body.vel.x;
                input.right = dx > 10.0 && vx < 40.0;
                input.left = dx < -10.0 && vx > -40.0;
                input.up = state.body.vel.y > 30.0;
            }
        }

        for event in tick(&mut state, &mut stage, &input, SIM_DT) {
            match event {
                LandingEvent::Message { .. } | LandingEvent::MessageExpired(_) => {}
                LandingEvent::CourseComplete => {
                    log::info!("Course complete after {:.1}s", step as f32 * SIM_DT);
                    return;
                }
                other => log::info!("{:?}", other),
            }
        }
    }
    log::info!(
        "Demo ended on level {} ({:?})",
        state.course.current() + 1,
        state.phase
    );
}
