//! End-to-end flows through the public API: the landing course and the
//! scene lifecycle on a headless DOM.

use glam::Vec2;
use proptest::prelude::*;

use lab_hub::Settings;
use lab_hub::Viewport;
use lab_hub::consts::{SIM_DT, TRANSITION_DELAY};
use lab_hub::menu::{MENU_OWNER, Menu};
use lab_hub::platform::assets::AssetCache;
use lab_hub::platform::dom::{DomHost, HeadlessDom};
use lab_hub::platform::input::InputEvent;
use lab_hub::renderer::Stage;
use lab_hub::scene::{LoaderScene, SceneCommand, SceneKey, SceneManager};
use lab_hub::sim::{
    FailReason, LandingEvent, LandingGrade, LandingPhase, LandingState, ThrustInput, tick,
};

fn new_state(stage: &mut Stage) -> LandingState {
    let root = stage.root();
    LandingState::new(stage, root, Viewport::default(), 42)
}

/// Drop the lander a pixel above the pad at `speed` and run past the transition
fn touch_down(state: &mut LandingState, stage: &mut Stage, speed: f32) -> Vec<LandingEvent> {
    let pad = state.layout.pad_hitbox().expect("level has a pad");
    state.body.pos = Vec2::new(pad.center().x, pad.min.y - state.body.size.y / 2.0 - 1.0);
    state.body.vel = Vec2::new(0.0, speed);

    let ticks = ((TRANSITION_DELAY + 0.5) / SIM_DT) as usize;
    let mut events = Vec::new();
    for _ in 0..ticks {
        events.extend(tick(state, stage, &ThrustInput::default(), SIM_DT));
    }
    events
}

#[test]
fn soft_landing_advances_to_next_level() {
    let mut stage = Stage::new();
    let mut state = new_state(&mut stage);
    assert_eq!(state.course.current(), 0);

    let events = touch_down(&mut state, &mut stage, 20.0);
    assert!(events.iter().any(|e| matches!(
        e,
        LandingEvent::Landed {
            grade: LandingGrade::Soft,
            ..
        }
    )));
    assert!(events.contains(&LandingEvent::LevelLoaded(1)));
    assert!(events.contains(&LandingEvent::LevelComplete { next: 1 }));
    assert_eq!(state.course.current(), 1);
    assert_eq!(state.phase, LandingPhase::Flying);
    assert!(!state.body.landed);
}

#[test]
fn hard_landing_fails_after_delay() {
    let mut stage = Stage::new();
    let mut state = new_state(&mut stage);

    let events = touch_down(&mut state, &mut stage, 200.0);
    assert!(events.iter().any(|e| matches!(
        e,
        LandingEvent::Landed {
            grade: LandingGrade::Hard,
            ..
        }
    )));
    assert!(events.contains(&LandingEvent::Failed(FailReason::HardImpact)));
    assert_eq!(state.course.current(), 0);
    assert_eq!(state.phase, LandingPhase::Failed(FailReason::HardImpact));
}

#[test]
fn clearing_every_level_completes_the_course() {
    let mut stage = Stage::new();
    let mut state = new_state(&mut stage);
    let levels = state.course.len();

    let mut completed = false;
    for _ in 0..levels {
        let events = touch_down(&mut state, &mut stage, 10.0);
        completed |= events.contains(&LandingEvent::CourseComplete);
    }
    assert!(completed);
    assert!(state.course_completed);
    assert_eq!(state.course.current(), 0);
}

#[test]
fn teardown_leaves_only_the_stage_root() {
    let mut stage = Stage::new();
    let mut state = new_state(&mut stage);
    let input = ThrustInput {
        up: true,
        ..Default::default()
    };
    for _ in 0..30 {
        tick(&mut state, &mut stage, &input, SIM_DT);
    }
    assert!(!state.particles.is_empty());

    state.teardown(&mut stage);
    assert_eq!(stage.len(), 1);
}

fn manager() -> SceneManager<HeadlessDom> {
    SceneManager::new(
        HeadlessDom::default(),
        AssetCache::new(Vec::new()),
        Settings::default(),
    )
}

#[test]
fn loader_hands_over_to_its_target() {
    let mut mgr = manager();
    mgr.load_scene(Box::new(LoaderScene::new(SceneKey::Landing)));
    assert_eq!(mgr.active_key(), Some("loader"));

    let mut switched = false;
    for _ in 0..10 {
        mgr.update(SIM_DT);
        if mgr.active_key() == Some("fisica") {
            switched = true;
            break;
        }
    }
    assert!(switched);
    assert!(!mgr.dom().contains_text("Loading..."));
}

#[test]
fn leaving_a_scene_releases_held_keys() {
    let mut mgr = manager();
    mgr.load_key(SceneKey::Landing);
    mgr.handle_input(InputEvent::key_down("ArrowUp"));
    assert_eq!(mgr.input().held_count(), 1);

    mgr.load_key(SceneKey::Trial);
    assert_eq!(mgr.input().held_count(), 0);
    assert_eq!(mgr.active_key(), Some("teste"));
}

#[test]
fn exit_button_returns_from_hub_to_menu() {
    let mut mgr = manager();
    let mut menu = Menu::new();
    mgr.load_key(SceneKey::BiologyHub);
    let exit = mgr.exit_button().expect("hub has an exit button");

    assert!(mgr.dom_mut().click(exit));
    assert_eq!(mgr.update(SIM_DT), SceneCommand::ExitToMenu);
    menu.show(mgr.dom_mut()).unwrap();

    assert!(mgr.is_empty());
    assert_eq!(mgr.stage().len(), 1);
    assert!(mgr.dom().contains_text("Biology"));
    for id in mgr.dom().find_kind(|_| true) {
        assert_eq!(mgr.dom().widget(id).map(|w| w.owner), Some(MENU_OWNER));
    }
    // The old button and its listener are gone
    assert!(!mgr.dom_mut().click(exit));
    assert!(mgr.dom_mut().drain_events().is_empty());
}

#[test]
fn every_game_scene_can_exit() {
    for key in [SceneKey::BiologyHub, SceneKey::Landing, SceneKey::Trial] {
        let mut mgr = manager();
        mgr.load_key(key);
        let exit = mgr.exit_button().expect("scene has an exit button");
        mgr.dom_mut().click(exit);
        assert_eq!(mgr.update(SIM_DT), SceneCommand::ExitToMenu);
        assert!(mgr.dom().is_empty());
    }
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Load(SceneKey),
    Unload,
    Tick,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Load(SceneKey::BiologyHub)),
        Just(Op::Load(SceneKey::Landing)),
        Just(Op::Load(SceneKey::Trial)),
        Just(Op::Unload),
        Just(Op::Tick),
    ]
}

proptest! {
    /// Only the active scene ever owns widgets, and nothing outlives it
    #[test]
    fn prop_scene_switches_leave_no_residue(ops in prop::collection::vec(op(), 1..20)) {
        let mut mgr = manager();
        for op in ops {
            match op {
                Op::Load(key) => mgr.load_key(key),
                Op::Unload => mgr.unload(),
                Op::Tick => {
                    prop_assert_eq!(mgr.update(SIM_DT), SceneCommand::None);
                }
            }

            let widgets = mgr.dom().find_kind(|_| true);
            match mgr.active_owner() {
                Some(owner) => {
                    for id in widgets {
                        prop_assert_eq!(mgr.dom().widget(id).map(|w| w.owner), Some(owner));
                    }
                }
                None => {
                    prop_assert!(widgets.is_empty());
                    prop_assert_eq!(mgr.stage().len(), 1);
                }
            }
        }

        mgr.unload();
        prop_assert!(mgr.dom().is_empty());
        prop_assert_eq!(mgr.stage().len(), 1);
    }
}
