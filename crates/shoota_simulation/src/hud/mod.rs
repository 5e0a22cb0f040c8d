//! HUD — screen-space элементы поверх AR сцены
//!
//! ECS хранит что показывать (Hud resource), session рисует.
//! Изменения копятся в pending и уходят в session одной системой
//! `sync_hud` в конце кадра.

use bevy::prelude::*;
use std::collections::BTreeMap;

use crate::config::{GalleryConfig, HudStyle};
use crate::logger;
use crate::session::ArSession;
use crate::state::GameSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect)]
pub enum HudRole {
    /// "Remaining: N" во время игры
    Remaining,
    /// Статичная game-over картинка
    GameOver,
    /// "Time taken: N seconds" после игры
    TimeTaken,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HudContent {
    Text {
        text: String,
        font_name: String,
        font_size: f32,
        color: [f32; 4],
    },
    Image {
        name: String,
    },
}

/// HUD элемент с фиксированной позицией на экране (origin снизу слева)
#[derive(Debug, Clone, PartialEq)]
pub struct HudElement {
    pub role: HudRole,
    pub content: HudContent,
    pub position: Vec2,
}

impl HudElement {
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            HudContent::Text { text, .. } => Some(text.as_str()),
            HudContent::Image { .. } => None,
        }
    }
}

pub fn remaining_text(live: u32) -> String {
    format!("Remaining: {}", live)
}

pub fn time_taken_text(whole_secs: u64) -> String {
    format!("Time taken: {} seconds", whole_secs)
}

#[derive(Resource, Debug, Clone)]
pub struct Hud {
    style: HudStyle,
    game_over_image: String,
    viewport: Vec2,
    elements: BTreeMap<HudRole, HudElement>,
    pending: Vec<HudRole>,
}

impl Hud {
    pub fn new(config: &GalleryConfig, viewport: Vec2) -> Self {
        Self {
            style: config.hud.clone(),
            game_over_image: config.game_over_image.clone(),
            viewport,
            elements: BTreeMap::new(),
            pending: Vec::new(),
        }
    }

    pub fn center(&self) -> Vec2 {
        self.viewport * 0.5
    }

    pub fn element(&self, role: HudRole) -> Option<&HudElement> {
        self.elements.get(&role)
    }

    pub fn text(&self, role: HudRole) -> Option<&str> {
        self.element(role).and_then(HudElement::text)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Забрать накопленные изменения (каждая role максимум один раз)
    pub fn take_pending(&mut self) -> Vec<HudRole> {
        let mut roles = std::mem::take(&mut self.pending);
        roles.sort();
        roles.dedup();
        roles
    }

    /// Callback для GameState::set_target_count
    pub fn show_remaining(&mut self, live: u32) {
        let position = self.center() + Vec2::new(0.0, self.style.remaining_offset_y);
        let element = self.text_element(HudRole::Remaining, remaining_text(live), position);
        self.set(element);
    }

    /// Game-over экран: убрать "Remaining", показать картинку и время
    pub fn show_game_over(&mut self, summary: &GameSummary) {
        self.remove(HudRole::Remaining);

        self.set(HudElement {
            role: HudRole::GameOver,
            content: HudContent::Image {
                name: self.game_over_image.clone(),
            },
            position: self.center(),
        });

        let position = self.center() + Vec2::new(0.0, self.style.time_taken_offset_y);
        let element = self.text_element(
            HudRole::TimeTaken,
            time_taken_text(summary.elapsed_whole_secs()),
            position,
        );
        self.set(element);
    }

    fn text_element(&self, role: HudRole, text: String, position: Vec2) -> HudElement {
        HudElement {
            role,
            content: HudContent::Text {
                text,
                font_name: self.style.font_name.clone(),
                font_size: self.style.font_size,
                color: self.style.color,
            },
            position,
        }
    }

    fn set(&mut self, element: HudElement) {
        let role = element.role;
        if self.elements.get(&role) == Some(&element) {
            return;
        }
        self.elements.insert(role, element);
        self.pending.push(role);
    }

    fn remove(&mut self, role: HudRole) {
        if self.elements.remove(&role).is_some() {
            self.pending.push(role);
        }
    }
}

/// System: отправить изменения HUD в session
pub fn sync_hud<S: ArSession>(mut hud: ResMut<Hud>, mut session: ResMut<S>) {
    if !hud.has_pending() {
        return;
    }

    for role in hud.take_pending() {
        match hud.element(role) {
            Some(element) => {
                let node = session.upsert_hud_element(element);
                logger::log(&format!("HUD {:?} → node {:?}", role, node));
            }
            None => {
                session.remove_hud_element(role);
                logger::log(&format!("HUD {:?} removed", role));
            }
        }
    }
}
