//! Мишень — ECS зеркало anchored ноды в session

use bevy::prelude::*;
use std::collections::HashMap;

use crate::session::{AnchorHandle, NodeId};

/// Мишень, созданная Spawner'ом
///
/// Жизненный цикл:
/// 1. spawn_targets: entity + anchor (node ещё нет)
/// 2. attach_target_visuals: session сообщила что anchor виден → node
/// 3. process_taps: попадание → alive = false + RemovalTransition
/// 4. animate_removals: transition закончился → detach node + despawn
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Target {
    /// Порядковый номер (1-based) в пределах игры
    pub ordinal: u32,
    pub anchor: AnchorHandle,
    /// Rotation + forward translation (R · T)
    pub transform: Mat4,
    pub node: Option<NodeId>,
    pub alive: bool,
}

impl Target {
    pub fn new(ordinal: u32, anchor: AnchorHandle, transform: Mat4) -> Self {
        Self {
            ordinal,
            anchor,
            transform,
            node: None,
            alive: true,
        }
    }

    /// Позиция anchor'а в tracking space
    pub fn position(&self) -> Vec3 {
        self.transform.w_axis.truncate()
    }
}

/// Registry anchor → entity (hit test возвращает ноды, нужен путь обратно)
#[derive(Resource, Debug, Default)]
pub struct TargetIndex {
    by_anchor: HashMap<AnchorHandle, Entity>,
}

impl TargetIndex {
    pub fn insert(&mut self, anchor: AnchorHandle, entity: Entity) {
        self.by_anchor.insert(anchor, entity);
    }

    pub fn get(&self, anchor: AnchorHandle) -> Option<Entity> {
        self.by_anchor.get(&anchor).copied()
    }

    pub fn remove(&mut self, anchor: AnchorHandle) -> Option<Entity> {
        self.by_anchor.remove(&anchor)
    }

    pub fn len(&self) -> usize {
        self.by_anchor.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_anchor.is_empty()
    }
}

/// Косметический transition уничтожения: scale 1 → N и fade 1 → 0
/// одновременно, потом нода отсоединяется.
///
/// На gameplay не влияет: счётчик уже уменьшен в момент попадания.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct RemovalTransition {
    pub elapsed: f32,
    pub duration: f32,
    pub target_scale: f32,
}

impl RemovalTransition {
    pub fn new(duration: f32, target_scale: f32) -> Self {
        Self {
            elapsed: 0.0,
            duration,
            target_scale,
        }
    }

    /// 0.0 → 1.0
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    pub fn advance(&mut self, delta: f32) {
        self.elapsed += delta.max(0.0);
    }

    pub fn scale(&self) -> f32 {
        1.0 + (self.target_scale - 1.0) * self.progress()
    }

    pub fn alpha(&self) -> f32 {
        1.0 - self.progress()
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }
}
