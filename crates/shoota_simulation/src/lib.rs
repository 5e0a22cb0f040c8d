//! SHOOTA Simulation Core
//!
//! AR shooting gallery: мишени появляются по таймеру вокруг зрителя,
//! игрок сбивает их тапами, HUD показывает остаток и итоговое время.
//!
//! ECS = strategic layer (счётчики, spawn правила, hit правила, HUD state)
//! ArSession = tactical layer (anchors, ноды, hit test, отрисовка HUD)

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::marker::PhantomData;
use std::time::Duration;

pub mod autoplay;
pub mod components;
pub mod config;
pub mod error;
pub mod hit;
pub mod hud;
pub mod logger;
pub mod session;
pub mod spawner;
pub mod state;

pub use autoplay::{Autoplay, AutoplayPlugin};
pub use components::*;
pub use config::{GalleryConfig, HudStyle};
pub use error::GalleryError;
pub use hit::{GameOver, TapEvent, TargetDestroyed};
pub use hud::{Hud, HudContent, HudElement, HudRole};
pub use session::{AnchorHandle, ArSession, HeadlessSession, HeadlessSessionConfig, NodeId, NodeKind, VisualNode};
pub use spawner::{SpawnTick, SpawnTimer, TargetSpawned};
pub use state::{GamePhase, GameState, GameSummary};

/// Главный plugin игры, параметризован AR session host'а
///
/// Порядок выполнения (Update, chained):
/// 1. tick_spawn_timer — SpawnTick каждые 2s
/// 2. spawn_targets — anchor + Target entity
/// 3. attach_target_visuals — видимые anchors → ноды мишеней
/// 4. process_taps — hit test, decrement, game over
/// 5. animate_removals — scale + fade, detach
/// 6. sync_hud — HUD изменения → session
///
/// Update, а не FixedUpdate: тапы приходят per-frame и не должны
/// теряться на кадрах без fixed тика.
pub struct GalleryPlugin<S: ArSession> {
    _session: PhantomData<fn() -> S>,
}

impl<S: ArSession> Default for GalleryPlugin<S> {
    fn default() -> Self {
        Self {
            _session: PhantomData,
        }
    }
}

impl<S: ArSession> Plugin for GalleryPlugin<S> {
    fn build(&self, app: &mut App) {
        app.init_resource::<GalleryConfig>()
            .init_resource::<DeterministicRng>()
            .init_resource::<TargetIndex>();

        app.add_event::<SpawnTick>()
            .add_event::<TargetSpawned>()
            .add_event::<TapEvent>()
            .add_event::<TargetDestroyed>()
            .add_event::<GameOver>();

        app.add_systems(Startup, setup_gallery::<S>);

        app.add_systems(
            Update,
            (
                spawner::tick_spawn_timer,
                spawner::spawn_targets::<S>,
                spawner::attach_target_visuals::<S>,
                hit::process_taps::<S>,
                hit::animate_removals::<S>,
                hud::sync_hud::<S>,
            )
                .chain(),
        );
    }
}

/// Startup: GameState (start = текущее virtual время), HUD, spawn таймер
///
/// Config, вставленный в обход `from_toml_str`, тоже проверяется:
/// невалидный заменяется на Default.
pub fn setup_gallery<S: ArSession>(
    mut commands: Commands,
    session: Res<S>,
    mut config: ResMut<GalleryConfig>,
    time: Res<Time>,
) {
    if let Err(error) = config.validate() {
        logger::log_error(&format!("{}, falling back to default config", error));
        *config = GalleryConfig::default();
    }

    let mut state = GameState::new(config.target_cap, time.elapsed());
    let mut hud = Hud::new(&config, session.viewport());
    // "Remaining: 0" виден с первого кадра
    state.set_target_count(0, |live| hud.show_remaining(live));

    commands.insert_resource(state);
    commands.insert_resource(hud);
    commands.insert_resource(SpawnTimer::new(config.spawn_period_secs));

    logger::log_info(&format!(
        "Gallery started: {} targets, spawn every {:.1}s at {:.1}m",
        config.target_cap, config.spawn_period_secs, config.anchor_distance
    ));
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    logger::init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed));

    app
}

/// Полная headless игра: HeadlessSession + GalleryPlugin + фиксированный
/// шаг времени на каждый `app.update()` (детерминированно, без wall clock)
pub fn create_gallery_app(
    seed: u64,
    config: GalleryConfig,
    session: HeadlessSession,
    step: Duration,
) -> App {
    let mut app = create_headless_app(seed);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(step))
        .insert_resource(config)
        .insert_resource(session)
        .add_plugins(GalleryPlugin::<HeadlessSession>::default());

    app
}

/// Snapshot компонентов для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
