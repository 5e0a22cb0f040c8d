//! GameState resource + фазы игры

use bevy::prelude::*;
use std::time::Duration;

use crate::error::GalleryError;

/// Грубое состояние игры. Переход Running → GameOver ровно один раз.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub enum GamePhase {
    #[default]
    Running,
    GameOver,
}

/// Счётчики мишеней одной игры
///
/// Инвариант: targets_live ≤ targets_created ≤ cap
///
/// Мишени как визуальные ноды принадлежат session, здесь только счётчики.
/// Мутируется Spawner'ом (+1 при создании) и Hit Tracker'ом (−1 при попадании).
#[derive(Resource, Debug, Clone, Reflect)]
pub struct GameState {
    targets_created: u32,
    targets_live: u32,
    /// Время старта по virtual clock приложения
    start_time: Duration,
    phase: GamePhase,
    cap: u32,
}

/// Итог игры (для game-over HUD)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSummary {
    pub elapsed: Duration,
    pub targets_created: u32,
}

impl GameSummary {
    /// Целые секунды, дробная часть отбрасывается (45.7s → 45)
    pub fn elapsed_whole_secs(&self) -> u64 {
        self.elapsed.as_secs()
    }
}

impl GameState {
    pub fn new(cap: u32, start_time: Duration) -> Self {
        Self {
            targets_created: 0,
            targets_live: 0,
            start_time,
            phase: GamePhase::Running,
            cap,
        }
    }

    pub fn targets_created(&self) -> u32 {
        self.targets_created
    }

    pub fn targets_live(&self) -> u32 {
        self.targets_live
    }

    pub fn start_time(&self) -> Duration {
        self.start_time
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn cap(&self) -> u32 {
        self.cap
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    pub fn cap_reached(&self) -> bool {
        self.targets_created >= self.cap
    }

    /// Все мишени созданы и ни одной не осталось
    pub fn is_complete(&self) -> bool {
        self.cap_reached() && self.targets_live == 0
    }

    /// Ставит live счётчик и сразу
    /// (синхронно) зовёт `on_update` с новым значением, обычно это
    /// обновление "Remaining" лейбла.
    ///
    /// Значение зажимается в targets_created (инвариант live ≤ created).
    pub fn set_target_count(&mut self, live: u32, on_update: impl FnOnce(u32)) {
        self.targets_live = live.min(self.targets_created);
        on_update(self.targets_live);
    }

    /// Учёт новой мишени. Возвращает её порядковый номер (1-based),
    /// None если CAP достигнут или игра закончена.
    pub fn record_spawn(&mut self, on_update: impl FnOnce(u32)) -> Option<u32> {
        if !self.is_running() || self.cap_reached() {
            return None;
        }

        self.targets_created += 1;
        let live = self.targets_live + 1;
        self.set_target_count(live, on_update);

        Some(self.targets_created)
    }

    /// Учёт попадания. Возвращает оставшееся число живых мишеней.
    ///
    /// - после GameOver → SpuriousLateEvent
    /// - live == 0 → NoHitTarget (счётчик не уходит в минус)
    pub fn record_hit(&mut self, on_update: impl FnOnce(u32)) -> Result<u32, GalleryError> {
        if !self.is_running() {
            return Err(GalleryError::SpuriousLateEvent);
        }

        if self.targets_live == 0 {
            return Err(GalleryError::NoHitTarget);
        }

        let live = self.targets_live - 1;
        self.set_target_count(live, on_update);

        Ok(self.targets_live)
    }

    /// Terminal check. Some(summary) только на самом переходе в GameOver,
    /// все последующие вызовы → None.
    pub fn try_finish(&mut self, now: Duration) -> Option<GameSummary> {
        if !self.is_running() || !self.is_complete() {
            return None;
        }

        self.phase = GamePhase::GameOver;

        Some(GameSummary {
            elapsed: now.saturating_sub(self.start_time),
            targets_created: self.targets_created,
        })
    }
}
