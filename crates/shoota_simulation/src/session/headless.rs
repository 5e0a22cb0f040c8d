//! HeadlessSession — in-memory AR session для headless прогонов и тестов
//!
//! Модель:
//! - pinhole камера в origin, смотрит вдоль −Z, ориентация задаётся снаружи
//!   (на устройстве её даёт orientation tracking)
//! - anchored ноды (мишени) проецируются на экран, hit radius = половина
//!   sprite'а в проекции × scale ноды
//! - overlay ноды (HUD, декорации): прямоугольники в screen space,
//!   всегда поверх anchored нод

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::{AnchorHandle, ArSession, NodeId, NodeKind, VisualNode, VisualSpec};
use crate::config::{invalid, positive};
use crate::error::GalleryError;
use crate::hud::{HudContent, HudElement, HudRole};

/// Ближе этого (метры) точка считается "за камерой"
const NEAR_PLANE: f32 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadlessSessionConfig {
    /// Размер экрана в points
    pub viewport: [f32; 2],
    /// Вертикальный FOV камеры (градусы)
    pub vertical_fov_deg: f32,
    /// Размер sprite'а мишени в мире (метры)
    pub sprite_size_m: f32,
    /// Размер HUD картинок в points
    pub image_size: [f32; 2],
    /// Ширина глифа относительно font size (оценка размера текста)
    pub glyph_width_ratio: f32,
}

impl Default for HeadlessSessionConfig {
    fn default() -> Self {
        Self {
            viewport: [375.0, 667.0],
            vertical_fov_deg: 60.0,
            sprite_size_m: 0.3,
            image_size: [300.0, 150.0],
            glyph_width_ratio: 0.6,
        }
    }
}

impl HeadlessSessionConfig {
    /// Секция `[session]` общего TOML файла (остальные ключи игнорируются)
    pub fn from_toml_str(source: &str) -> Result<Self, GalleryError> {
        #[derive(Deserialize)]
        struct Section {
            #[serde(default)]
            session: HeadlessSessionConfig,
        }

        let section: Section = toml::from_str(source)?;
        section.session.validate()?;
        Ok(section.session)
    }

    pub fn validate(&self) -> Result<(), GalleryError> {
        positive("session.viewport.width", self.viewport[0])?;
        positive("session.viewport.height", self.viewport[1])?;
        positive("session.sprite_size_m", self.sprite_size_m)?;
        positive("session.image_size.width", self.image_size[0])?;
        positive("session.image_size.height", self.image_size[1])?;
        positive("session.glyph_width_ratio", self.glyph_width_ratio)?;
        positive("session.vertical_fov_deg", self.vertical_fov_deg)?;
        if self.vertical_fov_deg >= 180.0 {
            return Err(invalid(
                "session.vertical_fov_deg",
                format!("must be < 180, got {}", self.vertical_fov_deg),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum Placement {
    Anchored(AnchorHandle),
    /// `layer` растёт с каждой новой overlay нодой (больше = выше)
    Overlay { center: Vec2, size: Vec2, layer: u64 },
}

#[derive(Debug, Clone)]
struct NodeRecord {
    kind: NodeKind,
    placement: Placement,
    scale: f32,
    alpha: f32,
    image: Option<String>,
}

#[derive(Resource, Debug)]
pub struct HeadlessSession {
    config: HeadlessSessionConfig,
    ready: bool,
    camera: Quat,
    anchors: BTreeMap<AnchorHandle, Mat4>,
    nodes: BTreeMap<NodeId, NodeRecord>,
    hud_nodes: HashMap<HudRole, NodeId>,
    newly_visible: Vec<AnchorHandle>,
    next_anchor: u64,
    next_node: u64,
    next_layer: u64,
}

impl Default for HeadlessSession {
    fn default() -> Self {
        Self::new(HeadlessSessionConfig::default())
    }
}

impl HeadlessSession {
    pub fn new(config: HeadlessSessionConfig) -> Self {
        Self {
            config,
            ready: true,
            camera: Quat::IDENTITY,
            anchors: BTreeMap::new(),
            nodes: BTreeMap::new(),
            hud_nodes: HashMap::new(),
            newly_visible: Vec::new(),
            next_anchor: 1,
            next_node: 1,
            next_layer: 1,
        }
    }

    /// Host ушёл с экрана, session на паузе
    pub fn pause(&mut self) {
        self.ready = false;
    }

    pub fn resume(&mut self) {
        self.ready = true;
    }

    pub fn camera_orientation(&self) -> Quat {
        self.camera
    }

    pub fn set_camera_orientation(&mut self, rotation: Quat) {
        self.camera = rotation.normalize();
    }

    /// Повернуть камеру так, чтобы точка оказалась в центре экрана
    pub fn look_at(&mut self, point: Vec3) {
        let Some(direction) = point.try_normalize() else {
            return;
        };
        self.camera = Quat::from_rotation_arc(Vec3::NEG_Z, direction);
    }

    pub fn anchor_count(&self) -> usize {
        self.anchors.len()
    }

    pub fn anchor_transform(&self, anchor: AnchorHandle) -> Option<Mat4> {
        self.anchors.get(&anchor).copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Ноды мишеней, привязанные к anchor'ам (в порядке создания)
    pub fn target_nodes(&self) -> Vec<(NodeId, AnchorHandle)> {
        self.nodes
            .iter()
            .filter_map(|(id, record)| match record.kind {
                NodeKind::Target(anchor) => Some((*id, anchor)),
                _ => None,
            })
            .collect()
    }

    /// (scale, alpha) ноды
    pub fn node_appearance(&self, node: NodeId) -> Option<(f32, f32)> {
        self.nodes.get(&node).map(|record| (record.scale, record.alpha))
    }

    pub fn node_image(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(&node).and_then(|record| record.image.as_deref())
    }

    pub fn hud_node(&self, role: HudRole) -> Option<NodeId> {
        self.hud_nodes.get(&role).copied()
    }

    /// Не-интерактивный прямоугольник поверх сцены
    pub fn add_decoration(&mut self, center: Vec2, size: Vec2) -> NodeId {
        let placement = self.overlay(center, size);
        self.insert_node(NodeKind::Decoration, placement, None)
    }

    fn focal_length(&self) -> f32 {
        let half_fov = (self.config.vertical_fov_deg.to_radians() * 0.5).max(f32::EPSILON);
        self.config.viewport[1] * 0.5 / half_fov.tan()
    }

    fn viewport_vec(&self) -> Vec2 {
        Vec2::from(self.config.viewport)
    }

    /// World point → (screen point, depth). None если за камерой.
    fn project(&self, world: Vec3) -> Option<(Vec2, f32)> {
        let local = self.camera.inverse() * world;
        let depth = -local.z;
        if depth <= NEAR_PLANE {
            return None;
        }

        let focal = self.focal_length();
        let screen = self.viewport_vec() * 0.5 + Vec2::new(local.x, local.y) * (focal / depth);
        Some((screen, depth))
    }

    fn project_anchor(&self, anchor: AnchorHandle) -> Option<(Vec2, f32)> {
        let transform = self.anchors.get(&anchor)?;
        self.project(transform.w_axis.truncate())
    }

    fn overlay(&mut self, center: Vec2, size: Vec2) -> Placement {
        let layer = self.next_layer;
        self.next_layer += 1;
        Placement::Overlay { center, size, layer }
    }

    fn insert_node(&mut self, kind: NodeKind, placement: Placement, image: Option<String>) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        self.nodes.insert(
            id,
            NodeRecord {
                kind,
                placement,
                scale: 1.0,
                alpha: 1.0,
                image,
            },
        );
        id
    }

    fn hud_element_size(&self, element: &HudElement) -> Vec2 {
        match &element.content {
            HudContent::Text { text, font_size, .. } => Vec2::new(
                text.chars().count() as f32 * font_size * self.config.glyph_width_ratio,
                *font_size,
            ),
            HudContent::Image { .. } => Vec2::from(self.config.image_size),
        }
    }
}

impl ArSession for HeadlessSession {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn viewport(&self) -> Vec2 {
        self.viewport_vec()
    }

    fn add_anchor(&mut self, transform: Mat4) -> Result<AnchorHandle, GalleryError> {
        if !self.ready {
            return Err(GalleryError::RenderingUnavailable);
        }

        let anchor = AnchorHandle(self.next_anchor);
        self.next_anchor += 1;
        self.anchors.insert(anchor, transform);
        // Headless: anchor "виден" сразу, материализуется на следующем poll
        self.newly_visible.push(anchor);

        Ok(anchor)
    }

    fn poll_visible_anchors(&mut self) -> Vec<AnchorHandle> {
        if !self.ready {
            return Vec::new();
        }
        std::mem::take(&mut self.newly_visible)
    }

    fn attach_anchor_visual(
        &mut self,
        anchor: AnchorHandle,
        visual: &VisualSpec,
    ) -> Result<NodeId, GalleryError> {
        if !self.anchors.contains_key(&anchor) {
            return Err(GalleryError::UnknownAnchor(anchor));
        }

        let VisualSpec::Sprite { image } = visual;
        Ok(self.insert_node(
            NodeKind::Target(anchor),
            Placement::Anchored(anchor),
            Some(image.clone()),
        ))
    }

    fn hit_test(&self, location: Vec2) -> Vec<VisualNode> {
        if !self.ready {
            return Vec::new();
        }

        let focal = self.focal_length();
        let half_sprite = self.config.sprite_size_m * 0.5;

        let mut overlays: Vec<(u64, VisualNode)> = Vec::new();
        let mut anchored: Vec<(f32, VisualNode)> = Vec::new();

        for (id, record) in &self.nodes {
            // Полностью прозрачная нода (конец fade) тапы не перехватывает
            if record.alpha <= 0.0 {
                continue;
            }
            let node = VisualNode { id: *id, kind: record.kind };

            match record.placement {
                Placement::Overlay { center, size, layer } => {
                    let half = size * record.scale * 0.5;
                    let delta = (location - center).abs();
                    if delta.x <= half.x && delta.y <= half.y {
                        overlays.push((layer, node));
                    }
                }
                Placement::Anchored(anchor) => {
                    let Some((screen, depth)) = self.project_anchor(anchor) else {
                        continue;
                    };
                    let radius = half_sprite * focal / depth * record.scale;
                    if screen.distance(location) <= radius {
                        anchored.push((depth, node));
                    }
                }
            }
        }

        // Overlay: последняя добавленная сверху. Anchored: ближняя первой.
        overlays.sort_by(|a, b| b.0.cmp(&a.0));
        anchored.sort_by(|a, b| a.0.total_cmp(&b.0));

        overlays
            .into_iter()
            .map(|(_, node)| node)
            .chain(anchored.into_iter().map(|(_, node)| node))
            .collect()
    }

    fn screen_position(&self, node: NodeId) -> Option<Vec2> {
        match self.nodes.get(&node)?.placement {
            Placement::Overlay { center, .. } => Some(center),
            Placement::Anchored(anchor) => self.project_anchor(anchor).map(|(screen, _)| screen),
        }
    }

    fn set_node_appearance(&mut self, node: NodeId, scale: f32, alpha: f32) -> Result<(), GalleryError> {
        let record = self
            .nodes
            .get_mut(&node)
            .ok_or(GalleryError::UnknownNode(node))?;
        record.scale = scale;
        record.alpha = alpha.clamp(0.0, 1.0);
        Ok(())
    }

    fn detach_node(&mut self, node: NodeId) -> Result<(), GalleryError> {
        self.nodes
            .remove(&node)
            .map(|_| ())
            .ok_or(GalleryError::UnknownNode(node))
    }

    fn upsert_hud_element(&mut self, element: &HudElement) -> NodeId {
        let size = self.hud_element_size(element);
        let image = match &element.content {
            HudContent::Image { name } => Some(name.clone()),
            HudContent::Text { .. } => None,
        };

        if let Some(id) = self.hud_nodes.get(&element.role).copied() {
            if let Some(record) = self.nodes.get_mut(&id) {
                if let Placement::Overlay { layer, .. } = record.placement {
                    record.placement = Placement::Overlay {
                        center: element.position,
                        size,
                        layer,
                    };
                }
                record.image = image;
                return id;
            }
        }

        let placement = self.overlay(element.position, size);
        let id = self.insert_node(NodeKind::HudLabel(element.role), placement, image);
        self.hud_nodes.insert(element.role, id);
        id
    }

    fn remove_hud_element(&mut self, role: HudRole) {
        if let Some(id) = self.hud_nodes.remove(&role) {
            self.nodes.remove(&id);
        }
    }
}
