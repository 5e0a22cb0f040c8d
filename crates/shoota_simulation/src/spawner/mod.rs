//! Spawner domain — создание мишеней по таймеру
//!
//! Содержит:
//! - SpawnTimer (repeating 2s, idempotent cancel)
//! - placement: случайная ориентация + forward offset (R · T)
//! - on_spawn_tick: правила одного тика (CAP, readiness, rollback)
//! - provide_visual / attach_target_visuals: ответ на "anchor стал видимым"

pub mod placement;
pub mod systems;
pub mod timer;

#[cfg(test)]
mod spawner_tests;

pub use placement::*;
pub use systems::*;
pub use timer::*;
