//! Game state domain — счётчики мишеней и фаза игры
//!
//! Содержит:
//! - GameState (resource, единственный владелец счётчиков)
//! - GamePhase (Running → GameOver, без возврата)
//! - GameSummary (итог игры для game-over HUD)

pub mod game_state;


pub use game_state::*;
