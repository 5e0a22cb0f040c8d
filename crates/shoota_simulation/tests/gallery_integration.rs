//! Gallery integration test
//!
//! Полный игровой цикл headless: spawn по таймеру, тапы, removal, game over.
//!
//! Проверяем:
//! - CAP и остановку spawn таймера
//! - live == created − hits, game over ровно один раз
//! - тапы по HUD и поздние тапы ничего не меняют
//! - decrement раньше окончания анимации

use bevy::prelude::*;
use std::time::Duration;

use shoota_simulation::hit::process_taps;
use shoota_simulation::*;

const STEP: Duration = Duration::from_millis(100);

#[derive(Resource, Default)]
struct GameOverLog {
    events: Vec<GameOver>,
}

fn record_game_over(mut events: EventReader<GameOver>, mut log: ResMut<GameOverLog>) {
    log.events.extend(events.read().copied());
}

/// Helper: headless App + счётчик GameOver events
fn create_test_app(seed: u64) -> App {
    let mut app = create_gallery_app(seed, GalleryConfig::default(), HeadlessSession::default(), STEP);
    app.init_resource::<GameOverLog>().add_systems(
        Update,
        record_game_over.after(process_taps::<HeadlessSession>),
    );
    app
}

/// Крутит update() пока predicate не станет true (или лимит кадров)
fn run_until(app: &mut App, max_frames: usize, predicate: impl Fn(&World) -> bool) -> bool {
    for _ in 0..max_frames {
        app.update();
        if predicate(app.world()) {
            return true;
        }
    }
    false
}

fn state(app: &App) -> &GameState {
    app.world().resource::<GameState>()
}

fn first_live_target(app: &mut App) -> (Entity, Target) {
    let world = app.world_mut();
    let mut query = world.query::<(Entity, &Target)>();
    query
        .iter(world)
        .filter(|(_, target)| target.alive && target.node.is_some())
        .min_by_key(|(_, target)| target.ordinal)
        .map(|(entity, target)| (entity, target.clone()))
        .expect("no live target with node")
}

#[test]
fn test_full_game_with_autoplay() {
    let mut app = create_test_app(42);
    app.add_plugins(AutoplayPlugin);

    let finished = run_until(&mut app, 2_000, |world| {
        !world.resource::<GameState>().is_running()
    });
    assert!(finished, "Игра не закончилась за 200 секунд");

    let state = state(&app);
    assert_eq!(state.phase(), GamePhase::GameOver);
    assert_eq!(state.targets_created(), 20);
    assert_eq!(state.targets_live(), 0);

    let log = &app.world().resource::<GameOverLog>().events;
    assert_eq!(log.len(), 1);
    // 20-я мишень появляется на ~40s, autoplay реагирует за ≤ 1s
    assert!(
        (38..=45).contains(&log[0].elapsed_secs),
        "elapsed = {}",
        log[0].elapsed_secs
    );

    let hud = app.world().resource::<Hud>();
    assert!(hud.element(HudRole::Remaining).is_none());
    assert!(hud.element(HudRole::GameOver).is_some());
    assert_eq!(
        hud.text(HudRole::TimeTaken),
        Some(format!("Time taken: {} seconds", log[0].elapsed_secs).as_str())
    );
    assert!(!app.world().resource::<SpawnTimer>().is_active());

    // Ещё секунда: removal transitions завершены, на сцене только HUD
    for _ in 0..10 {
        app.update();
    }
    let session = app.world().resource::<HeadlessSession>();
    assert!(session.target_nodes().is_empty());
    assert_eq!(session.node_count(), 2);
    assert!(session.hud_node(HudRole::Remaining).is_none());
    assert!(app.world().resource::<TargetIndex>().is_empty());
}

#[test]
fn test_late_taps_after_game_over_ignored() {
    let mut app = create_test_app(7);
    app.add_plugins(AutoplayPlugin);

    run_until(&mut app, 2_000, |world| !world.resource::<GameState>().is_running());

    let center = app.world().resource::<HeadlessSession>().viewport() * 0.5;
    for _ in 0..5 {
        app.world_mut().send_event(TapEvent::at(center.x, center.y));
        app.update();
    }

    assert_eq!(state(&app).targets_live(), 0);
    assert_eq!(app.world().resource::<GameOverLog>().events.len(), 1);
}

#[test]
fn test_spawner_stops_at_cap() {
    let mut app = create_test_app(42);

    // 60 секунд = 30 периодов таймера, без тапов
    for frame in 0..600 {
        app.update();
        let state = state(&app);
        assert!(state.targets_created() <= 20, "frame {}: created {}", frame, state.targets_created());
        assert_eq!(state.targets_live(), state.targets_created());
    }

    let state = state(&app);
    assert_eq!(state.targets_created(), 20);
    assert_eq!(state.phase(), GamePhase::Running);
    assert!(!app.world().resource::<SpawnTimer>().is_active());
    assert_eq!(app.world().resource::<HeadlessSession>().anchor_count(), 20);
    assert_eq!(app.world().resource::<Hud>().text(HudRole::Remaining), Some("Remaining: 20"));
    assert!(app.world().resource::<GameOverLog>().events.is_empty());
}

#[test]
fn test_tap_on_hud_label_changes_nothing() {
    let mut app = create_test_app(3);

    run_until(&mut app, 200, |world| world.resource::<GameState>().targets_created() >= 3);
    let live_before = state(&app).targets_live();

    let label = app
        .world()
        .resource::<Hud>()
        .element(HudRole::Remaining)
        .expect("remaining label")
        .position;
    app.world_mut().send_event(TapEvent { location: label });
    app.update();

    assert_eq!(state(&app).targets_live(), live_before);
}

#[test]
fn test_tap_on_empty_space_changes_nothing() {
    let mut app = create_test_app(3);

    run_until(&mut app, 200, |world| world.resource::<GameState>().targets_created() >= 2);
    let live_before = state(&app).targets_live();

    // Точка, где hit test ничего не находит
    let empty = {
        let session = app.world().resource::<HeadlessSession>();
        (0..20)
            .flat_map(|i| (0..20).map(move |j| Vec2::new(i as f32 * 18.0, j as f32 * 33.0)))
            .find(|location| session.hit_test(*location).is_empty())
            .expect("screen fully covered")
    };

    app.world_mut().send_event(TapEvent { location: empty });
    app.update();

    assert_eq!(state(&app).targets_live(), live_before);
}

#[test]
fn test_decrement_before_removal_animation_completes() {
    let mut app = create_test_app(11);

    run_until(&mut app, 100, |world| world.resource::<GameState>().targets_created() == 1);
    let (entity, target) = first_live_target(&mut app);
    let node = target.node.unwrap();

    let location = {
        let mut session = app.world_mut().resource_mut::<HeadlessSession>();
        session.look_at(target.position());
        session.screen_position(node).unwrap()
    };

    app.world_mut().send_event(TapEvent { location });
    app.update();

    // Счётчик уменьшен сразу, а мишень ещё на сцене (анимация идёт)
    assert_eq!(state(&app).targets_live(), 0);
    let dying = app.world().get::<Target>(entity).expect("target despawned too early");
    assert!(!dying.alive);
    assert!(app.world().get::<RemovalTransition>(entity).is_some());

    // Повторный тап по умирающей мишени не считается
    app.world_mut().send_event(TapEvent { location });
    app.update();
    assert_eq!(state(&app).targets_live(), 0);
    let (scale, alpha) = app
        .world()
        .resource::<HeadlessSession>()
        .node_appearance(node)
        .unwrap();
    assert!(scale > 1.0 && alpha < 1.0, "scale {} alpha {}", scale, alpha);

    // 0.2s transition
    for _ in 0..3 {
        app.update();
    }
    assert!(app.world().get::<Target>(entity).is_none());
    assert!(app.world().resource::<HeadlessSession>().node_appearance(node).is_none());
    // Игра продолжается: создана 1 из 20
    assert_eq!(state(&app).phase(), GamePhase::Running);
}

#[test]
fn test_paused_session_skips_spawn_ticks() {
    let mut app = create_test_app(5);
    app.update();
    app.world_mut().resource_mut::<HeadlessSession>().pause();

    // 10 секунд на паузе: 5 тиков отброшены, счётчики не тронуты
    for _ in 0..100 {
        app.update();
    }
    assert_eq!(state(&app).targets_created(), 0);
    assert_eq!(state(&app).targets_live(), 0);

    app.world_mut().resource_mut::<HeadlessSession>().resume();
    run_until(&mut app, 30, |world| world.resource::<GameState>().targets_created() == 1);
    assert_eq!(state(&app).targets_created(), 1);
    assert!(app.world().resource::<SpawnTimer>().is_active());
}

#[test]
fn test_invalid_config_falls_back_to_defaults() {
    let config = GalleryConfig {
        spawn_period_secs: -1.0,
        target_cap: 0,
        ..GalleryConfig::default()
    };
    let mut app = create_gallery_app(9, config, HeadlessSession::default(), STEP);

    // Startup не паникует, берёт Default
    app.update();
    assert_eq!(*app.world().resource::<GalleryConfig>(), GalleryConfig::default());
    assert_eq!(state(&app).cap(), 20);
    assert!(app.world().resource::<SpawnTimer>().is_active());

    run_until(&mut app, 30, |world| world.resource::<GameState>().targets_created() == 1);
    assert_eq!(state(&app).targets_created(), 1);
}

#[test]
fn test_config_file_with_zero_cap_is_rejected() {
    let result = GalleryConfig::from_toml_str("target_cap = 0\nspawn_period_secs = 1.0");
    assert!(matches!(
        result,
        Err(GalleryError::InvalidConfig { field: "target_cap", .. })
    ));
}
