//! Spawn timer — periodic trigger с явной отменой

use bevy::prelude::*;

/// Один тик spawn таймера
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct SpawnTick;

/// Repeating таймер Spawner'а
///
/// `cancel()` idempotent: после отмены таймер больше не тикает,
/// повторные вызовы ничего не делают.
#[derive(Resource, Debug, Clone)]
pub struct SpawnTimer {
    timer: Option<Timer>,
}

impl SpawnTimer {
    pub fn new(period_secs: f32) -> Self {
        Self {
            timer: Some(Timer::from_seconds(period_secs, TimerMode::Repeating)),
        }
    }

    pub fn is_active(&self) -> bool {
        self.timer.is_some()
    }

    /// Возвращает true если таймер был активен (первая отмена)
    pub fn cancel(&mut self) -> bool {
        self.timer.take().is_some()
    }

    /// Продвинуть таймер, вернуть сколько раз он сработал за delta
    pub fn tick(&mut self, delta: std::time::Duration) -> u32 {
        match self.timer.as_mut() {
            Some(timer) => {
                timer.tick(delta);
                timer.times_finished_this_tick()
            }
            None => 0,
        }
    }
}

/// System: tick таймера → SpawnTick events
pub fn tick_spawn_timer(
    time: Res<Time>,
    mut timer: ResMut<SpawnTimer>,
    mut ticks: EventWriter<SpawnTick>,
) {
    if !timer.is_active() {
        return;
    }

    let fired = timer.tick(time.delta());
    for _ in 0..fired {
        ticks.write(SpawnTick);
    }
}
