//! AR session seam — всё что ядру нужно от rendering/tracking host'а
//!
//! Архитектура:
//! - ECS = strategic layer (счётчики, spawn, hit rules)
//! - Session = tactical layer (anchors, visual nodes, hit test, HUD ноды)
//!
//! Device host реализует `ArSession` поверх своего AR фреймворка,
//! headless прогоны и тесты используют `HeadlessSession`.

use bevy::prelude::*;

use crate::error::GalleryError;
use crate::hud::{HudElement, HudRole};

pub mod headless;


pub use headless::{HeadlessSession, HeadlessSessionConfig};

/// Handle зарегистрированного anchor'а (3D поза в tracking space)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect)]
pub struct AnchorHandle(pub u64);

/// Handle визуальной ноды в session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect)]
pub struct NodeId(pub u64);

/// Тип ноды: dispatch по тегу вместо runtime type inspection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Мишень, привязанная к anchor'у
    Target(AnchorHandle),
    /// HUD элемент (лейблы + game-over картинка)
    HudLabel(HudRole),
    /// Прочие ноды сцены, не интерактивные для gameplay
    Decoration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualNode {
    pub id: NodeId,
    pub kind: NodeKind,
}

/// Что показать для anchor'а (ответ ядра на "anchor стал видимым")
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisualSpec {
    Sprite { image: String },
}

/// Capabilities AR/rendering host'а
///
/// Все вызовы: из одного (main) потока через chained systems,
/// поэтому `&mut self` без внутренней синхронизации.
pub trait ArSession: Resource {
    /// false пока view не готов или session на паузе
    fn is_ready(&self) -> bool;

    /// Размер экрана в points (origin снизу слева, y вверх)
    fn viewport(&self) -> Vec2;

    /// Fire-and-forget: handle возвращается сразу, нода появится позже
    /// через `poll_visible_anchors`.
    fn add_anchor(&mut self, transform: Mat4) -> Result<AnchorHandle, GalleryError>;

    /// Anchors ставшие видимыми с прошлого вызова
    fn poll_visible_anchors(&mut self) -> Vec<AnchorHandle>;

    fn attach_anchor_visual(
        &mut self,
        anchor: AnchorHandle,
        visual: &VisualSpec,
    ) -> Result<NodeId, GalleryError>;

    /// Ноды под точкой экрана, front-to-back (первая = верхняя)
    fn hit_test(&self, location: Vec2) -> Vec<VisualNode>;

    /// Проекция ноды на экран, None если за камерой / неизвестна
    fn screen_position(&self, node: NodeId) -> Option<Vec2>;

    fn set_node_appearance(&mut self, node: NodeId, scale: f32, alpha: f32) -> Result<(), GalleryError>;

    fn detach_node(&mut self, node: NodeId) -> Result<(), GalleryError>;

    /// Создаёт или обновляет HUD ноду для role (одна нода на role)
    fn upsert_hud_element(&mut self, element: &HudElement) -> NodeId;

    fn remove_hud_element(&mut self, role: HudRole);
}
