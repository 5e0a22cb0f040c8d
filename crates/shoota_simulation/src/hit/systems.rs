//! Hit rules + systems

use bevy::prelude::*;
use std::time::Duration;

use super::events::{GameOver, TapEvent, TargetDestroyed};
use crate::components::{RemovalTransition, Target, TargetIndex};
use crate::config::GalleryConfig;
use crate::error::GalleryError;
use crate::hud::Hud;
use crate::logger;
use crate::session::{AnchorHandle, ArSession, NodeKind, VisualNode};
use crate::spawner::SpawnTimer;
use crate::state::{GameState, GameSummary};

/// Результат попадания для gameplay state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitOutcome {
    pub remaining: u32,
    /// Some только на том попадании, которое закончило игру
    pub summary: Option<GameSummary>,
}

/// Topmost нода под тапом. Первая нода решает: если это не мишень
/// (HUD лейбл, декорация): тап ничего не делает, даже если под ней
/// есть мишень.
pub fn resolve_tap<S: ArSession>(session: &S, location: Vec2) -> Result<AnchorHandle, GalleryError> {
    match session.hit_test(location).first() {
        Some(VisualNode {
            kind: NodeKind::Target(anchor),
            ..
        }) => Ok(*anchor),
        _ => Err(GalleryError::NoHitTarget),
    }
}

/// Gameplay часть попадания: decrement сразу (HUD синхронно),
/// затем terminal check.
pub fn register_hit(
    state: &mut GameState,
    hud: &mut Hud,
    now: Duration,
) -> Result<HitOutcome, GalleryError> {
    let remaining = state.record_hit(|live| hud.show_remaining(live))?;
    let summary = state.try_finish(now);

    Ok(HitOutcome { remaining, summary })
}

/// Game-over handler: spawn таймер стоп, HUD → game-over экран
pub fn on_game_over(summary: &GameSummary, hud: &mut Hud, timer: &mut SpawnTimer) -> GameOver {
    timer.cancel();
    hud.show_game_over(summary);

    GameOver {
        elapsed_secs: summary.elapsed_whole_secs(),
        targets_created: summary.targets_created,
    }
}

/// Попадание в конкретную мишень: проверки жизни + register_hit.
/// Мишень помечается мёртвой только если попадание засчитано.
fn hit_target(
    state: &mut GameState,
    hud: &mut Hud,
    index: &TargetIndex,
    targets: &mut Query<&mut Target>,
    anchor: AnchorHandle,
    now: Duration,
) -> Result<(Entity, u32, HitOutcome), GalleryError> {
    let entity = index.get(anchor).ok_or(GalleryError::NoHitTarget)?;
    let mut target = targets
        .get_mut(entity)
        .map_err(|_| GalleryError::NoHitTarget)?;

    // Мишень в процессе removal transition ещё видна, но уже не считается
    if !target.alive {
        return Err(GalleryError::NoHitTarget);
    }

    let outcome = register_hit(state, hud, now)?;
    target.alive = false;

    Ok((entity, target.ordinal, outcome))
}

/// System: TapEvent → hit test → destroy + счётчики + game over
#[allow(clippy::too_many_arguments)]
pub fn process_taps<S: ArSession>(
    mut commands: Commands,
    mut taps: EventReader<TapEvent>,
    mut state: ResMut<GameState>,
    session: Res<S>,
    index: Res<TargetIndex>,
    mut targets: Query<&mut Target>,
    mut hud: ResMut<Hud>,
    mut timer: ResMut<SpawnTimer>,
    mut destroyed_events: EventWriter<TargetDestroyed>,
    mut game_over_events: EventWriter<GameOver>,
    config: Res<GalleryConfig>,
    time: Res<Time>,
) {
    for tap in taps.read() {
        // Поздние тапы после GameOver молча игнорируем
        if !state.is_running() {
            logger::log(&format!(
                "Tap at {:?} ignored: {}",
                tap.location,
                GalleryError::SpuriousLateEvent
            ));
            continue;
        }

        let result = resolve_tap(&*session, tap.location).and_then(|anchor| {
            hit_target(
                &mut state,
                &mut hud,
                &index,
                &mut targets,
                anchor,
                time.elapsed(),
            )
            .map(|(entity, ordinal, outcome)| (entity, ordinal, anchor, outcome))
        });

        let (entity, ordinal, anchor, outcome) = match result {
            Ok(hit) => hit,
            Err(error) => {
                logger::log(&format!("Tap at {:?}: {}", tap.location, error));
                continue;
            }
        };

        // Анимация косметическая: счётчик уже уменьшен
        commands.entity(entity).insert(RemovalTransition::new(
            config.removal_duration_secs,
            config.removal_scale,
        ));

        destroyed_events.write(TargetDestroyed {
            entity,
            ordinal,
            anchor,
            remaining: outcome.remaining,
        });

        logger::log(&format!(
            "💥 Target #{} destroyed (remaining: {}, created: {}/{})",
            ordinal,
            outcome.remaining,
            state.targets_created(),
            state.cap()
        ));

        if let Some(summary) = outcome.summary {
            let event = on_game_over(&summary, &mut hud, &mut timer);
            logger::log_info(&format!(
                "🏁 GAME OVER: {} targets in {} seconds",
                event.targets_created, event.elapsed_secs
            ));
            game_over_events.write(event);
        }
    }
}

/// System: scale + fade мишеней в removal transition, потом detach + despawn
pub fn animate_removals<S: ArSession>(
    mut commands: Commands,
    time: Res<Time>,
    mut session: ResMut<S>,
    mut index: ResMut<TargetIndex>,
    mut removing: Query<(Entity, &Target, &mut RemovalTransition)>,
) {
    let delta = time.delta_secs();

    for (entity, target, mut transition) in removing.iter_mut() {
        // Кадр попадания: transition только что добавлен, отсчёт со следующего
        if !transition.is_added() {
            transition.advance(delta);
        }

        if let Some(node) = target.node {
            if let Err(error) = session.set_node_appearance(node, transition.scale(), transition.alpha()) {
                logger::log_warning(&format!("Target #{} appearance: {}", target.ordinal, error));
            }
        }

        if !transition.is_finished() {
            continue;
        }

        if let Some(node) = target.node {
            if let Err(error) = session.detach_node(node) {
                logger::log_warning(&format!("Target #{} detach: {}", target.ordinal, error));
            }
        }
        index.remove(target.anchor);
        commands.entity(entity).despawn();

        logger::log(&format!("Target #{} removed from scene", target.ordinal));
    }
}
