//! Spawner rules + systems

use bevy::prelude::*;
use rand::Rng;

use super::placement::{placement_transform, PlacementAngles};
use super::timer::{SpawnTick, SpawnTimer};
use crate::components::{Target, TargetIndex};
use crate::config::GalleryConfig;
use crate::error::GalleryError;
use crate::hud::Hud;
use crate::logger;
use crate::session::{AnchorHandle, ArSession, VisualSpec};
use crate::state::GameState;
use crate::DeterministicRng;

/// Мишень создана (anchor запрошен, нода появится позже)
#[derive(Event, Debug, Clone, Copy)]
pub struct TargetSpawned {
    pub entity: Entity,
    pub ordinal: u32,
    pub anchor: AnchorHandle,
    pub transform: Mat4,
}

/// Результат успешного тика
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnedTarget {
    pub ordinal: u32,
    pub anchor: AnchorHandle,
    pub angles: PlacementAngles,
    pub transform: Mat4,
}

/// Правила одного тика Spawner'а
///
/// - GameOver → отмена таймера, SpuriousLateEvent
/// - CAP достигнут → отмена таймера, Ok(None) (дальше no-op)
/// - session не готова / anchor не создан → RenderingUnavailable,
///   счётчики НЕ трогаются (инкремент только после успешного anchor'а)
/// - иначе: anchor по R · T, created += 1, live += 1 (HUD синхронно)
pub fn on_spawn_tick<S: ArSession>(
    state: &mut GameState,
    timer: &mut SpawnTimer,
    session: &mut S,
    hud: &mut Hud,
    rng: &mut impl Rng,
    config: &GalleryConfig,
) -> Result<Option<SpawnedTarget>, GalleryError> {
    if !state.is_running() {
        timer.cancel();
        return Err(GalleryError::SpuriousLateEvent);
    }

    if state.cap_reached() {
        if timer.cancel() {
            logger::log_info(&format!(
                "🎯 All {} targets created, spawn timer cancelled",
                state.cap()
            ));
        }
        return Ok(None);
    }

    if !session.is_ready() {
        return Err(GalleryError::RenderingUnavailable);
    }

    let angles = PlacementAngles::sample(rng);
    let transform = placement_transform(angles, config.anchor_distance);
    let anchor = session.add_anchor(transform)?;

    let Some(ordinal) = state.record_spawn(|live| hud.show_remaining(live)) else {
        // cap/phase проверены выше, сюда не попадаем
        return Ok(None);
    };

    Ok(Some(SpawnedTarget {
        ordinal,
        anchor,
        angles,
        transform,
    }))
}

/// Ответ на "anchor стал видимым": какой визуал показать
pub fn provide_visual(config: &GalleryConfig) -> VisualSpec {
    VisualSpec::Sprite {
        image: config.target_sprite.clone(),
    }
}

/// System: обработка SpawnTick → anchor + Target entity
#[allow(clippy::too_many_arguments)]
pub fn spawn_targets<S: ArSession>(
    mut commands: Commands,
    mut ticks: EventReader<SpawnTick>,
    mut state: ResMut<GameState>,
    mut timer: ResMut<SpawnTimer>,
    mut session: ResMut<S>,
    mut hud: ResMut<Hud>,
    mut rng: ResMut<DeterministicRng>,
    mut index: ResMut<TargetIndex>,
    mut spawned_events: EventWriter<TargetSpawned>,
    config: Res<GalleryConfig>,
) {
    for _ in ticks.read() {
        let result = on_spawn_tick(
            &mut state,
            &mut timer,
            &mut *session,
            &mut hud,
            &mut rng.rng,
            &config,
        );

        match result {
            Ok(Some(spawned)) => {
                let entity = commands
                    .spawn(Target::new(spawned.ordinal, spawned.anchor, spawned.transform))
                    .id();
                index.insert(spawned.anchor, entity);

                spawned_events.write(TargetSpawned {
                    entity,
                    ordinal: spawned.ordinal,
                    anchor: spawned.anchor,
                    transform: spawned.transform,
                });

                logger::log(&format!(
                    "🎯 Target #{} spawned: anchor {:?}, θx={:.3} θy={:.3} (live: {})",
                    spawned.ordinal,
                    spawned.anchor,
                    spawned.angles.theta_x,
                    spawned.angles.theta_y,
                    state.targets_live()
                ));
            }
            Ok(None) => {}
            Err(error) if error.is_benign() => {
                logger::log(&format!("Spawn tick ignored: {}", error));
            }
            Err(error) => {
                logger::log_warning(&format!("Spawn tick aborted: {}", error));
            }
        }
    }
}

/// System: anchors ставшие видимыми → visual node для мишени
pub fn attach_target_visuals<S: ArSession>(
    mut session: ResMut<S>,
    index: Res<TargetIndex>,
    mut targets: Query<&mut Target>,
    config: Res<GalleryConfig>,
) {
    let visible = session.poll_visible_anchors();
    if visible.is_empty() {
        return;
    }

    let visual = provide_visual(&config);

    for anchor in visible {
        let Some(entity) = index.get(anchor) else {
            continue;
        };
        let Ok(mut target) = targets.get_mut(entity) else {
            continue;
        };
        if !target.alive || target.node.is_some() {
            continue;
        }

        match session.attach_anchor_visual(anchor, &visual) {
            Ok(node) => {
                target.node = Some(node);
                logger::log(&format!("Target #{} visible → node {:?}", target.ordinal, node));
            }
            Err(error) => {
                logger::log_warning(&format!(
                    "Target #{} visual not attached: {}",
                    target.ordinal, error
                ));
            }
        }
    }
}
