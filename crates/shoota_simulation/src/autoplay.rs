//! Scripted игрок для headless прогонов
//!
//! Раз в `reaction` поворачивает камеру HeadlessSession на живую мишень
//! с наименьшим номером и тапает в её проекцию на экран.

use bevy::prelude::*;

use crate::components::Target;
use crate::hit::{self, TapEvent};
use crate::logger;
use crate::session::{ArSession, HeadlessSession};
use crate::spawner;
use crate::state::GameState;

#[derive(Resource, Debug, Clone)]
pub struct Autoplay {
    pub reaction: Timer,
    pub taps_sent: u32,
}

impl Autoplay {
    pub fn new(reaction_secs: f32) -> Self {
        Self {
            reaction: Timer::from_seconds(reaction_secs, TimerMode::Repeating),
            taps_sent: 0,
        }
    }
}

impl Default for Autoplay {
    fn default() -> Self {
        Self::new(0.5)
    }
}

pub struct AutoplayPlugin;

impl Plugin for AutoplayPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Autoplay>().add_systems(
            Update,
            autoplay_taps
                .after(spawner::attach_target_visuals::<HeadlessSession>)
                .before(hit::process_taps::<HeadlessSession>),
        );
    }
}

/// Первая живая мишень с нодой (по порядку создания)
pub fn next_target(targets: &Query<&Target>) -> Option<Target> {
    targets
        .iter()
        .filter(|target| target.alive && target.node.is_some())
        .min_by_key(|target| target.ordinal)
        .cloned()
}

/// System: aim + tap
pub fn autoplay_taps(
    time: Res<Time>,
    state: Res<GameState>,
    mut autoplay: ResMut<Autoplay>,
    mut session: ResMut<HeadlessSession>,
    targets: Query<&Target>,
    mut taps: EventWriter<TapEvent>,
) {
    if !state.is_running() {
        return;
    }

    autoplay.reaction.tick(time.delta());
    if !autoplay.reaction.just_finished() {
        return;
    }

    let Some(target) = next_target(&targets) else {
        return;
    };
    let Some(node) = target.node else {
        return;
    };

    session.look_at(target.position());

    let Some(location) = session.screen_position(node) else {
        return;
    };

    autoplay.taps_sent += 1;
    taps.write(TapEvent { location });

    logger::log(&format!(
        "🤖 Autoplay tap #{} → target #{} at ({:.1}, {:.1})",
        autoplay.taps_sent, target.ordinal, location.x, location.y
    ));
}
