//! ECS Components для игровых entity
//!
//! - target: мишень (Target, TargetIndex, RemovalTransition)

pub mod target;

pub use target::*;
