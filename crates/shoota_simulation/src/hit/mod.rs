//! Hit tracking domain — тапы игрока, уничтожение мишеней, game over
//!
//! Содержит:
//! - TapEvent (input от host'а) + TargetDestroyed / GameOver events
//! - resolve_tap: topmost нода под тапом → anchor мишени
//! - on_game_over: game-over HUD + отмена spawn таймера
//! - systems: process_taps, animate_removals

pub mod events;
pub mod systems;


pub use events::*;
pub use systems::*;
