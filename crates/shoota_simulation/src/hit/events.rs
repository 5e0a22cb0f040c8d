//! Hit tracking events

use bevy::prelude::*;

use crate::session::AnchorHandle;

/// Тап игрока в screen space (origin снизу слева, y вверх)
///
/// Emit: input host. Consume: process_taps.
#[derive(Event, Debug, Clone, Copy)]
pub struct TapEvent {
    pub location: Vec2,
}

impl TapEvent {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            location: Vec2::new(x, y),
        }
    }
}

/// Мишень уничтожена (счётчик уже уменьшен, анимация могла не закончиться)
#[derive(Event, Debug, Clone, Copy)]
pub struct TargetDestroyed {
    pub entity: Entity,
    pub ordinal: u32,
    pub anchor: AnchorHandle,
    pub remaining: u32,
}

/// Игра закончена. Отправляется ровно один раз за игру.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOver {
    pub elapsed_secs: u64,
    pub targets_created: u32,
}
