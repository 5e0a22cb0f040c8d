//! Gameplay + HUD константы
//!
//! Default = значения оригинальной игры. TOML может переопределить
//! любое подмножество полей (остальное берётся из Default).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::GalleryError;

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// CAP: сколько мишеней создаётся за игру
    pub target_cap: u32,

    /// Период spawn таймера (секунды)
    pub spawn_period_secs: f32,

    /// Дистанция anchor'а от зрителя вперёд (метры)
    pub anchor_distance: f32,

    /// Sprite мишени (отдаётся session через provide_visual)
    pub target_sprite: String,

    /// Статичная картинка "game over"
    pub game_over_image: String,

    /// Во сколько раз мишень раздувается при уничтожении
    pub removal_scale: f32,

    /// Длительность scale + fade (секунды)
    pub removal_duration_secs: f32,

    pub hud: HudStyle,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            target_cap: 20,
            spawn_period_secs: 2.0,
            anchor_distance: 1.5,
            target_sprite: "target".to_string(),
            game_over_image: "gameOver".to_string(),
            removal_scale: 2.0,
            removal_duration_secs: 0.2,
            hud: HudStyle::default(),
        }
    }
}

impl GalleryConfig {
    /// Parse + validate. Невалидные значения не доходят до таймеров.
    pub fn from_toml_str(source: &str) -> Result<Self, GalleryError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GalleryError> {
        // cap 0 = игра закончена до старта, GameOver некому вызвать
        if self.target_cap == 0 {
            return Err(invalid("target_cap", "must be at least 1"));
        }
        positive("spawn_period_secs", self.spawn_period_secs)?;
        positive("anchor_distance", self.anchor_distance)?;
        positive("removal_scale", self.removal_scale)?;
        if !self.removal_duration_secs.is_finite() || self.removal_duration_secs < 0.0 {
            return Err(invalid(
                "removal_duration_secs",
                format!("must be >= 0, got {}", self.removal_duration_secs),
            ));
        }
        positive("hud.font_size", self.hud.font_size)?;

        Ok(())
    }
}

pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> GalleryError {
    GalleryError::InvalidConfig {
        field,
        reason: reason.into(),
    }
}

/// Конечное и строго > 0
pub(crate) fn positive(field: &'static str, value: f32) -> Result<(), GalleryError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be > 0, got {}", value)))
    }
}

/// Стиль HUD лейблов. Offsets считаются от центра экрана (y вверх).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HudStyle {
    pub font_name: String,
    pub font_size: f32,
    /// RGBA 0..1
    pub color: [f32; 4],
    pub remaining_offset_y: f32,
    pub time_taken_offset_y: f32,
}

impl Default for HudStyle {
    fn default() -> Self {
        Self {
            font_name: "AmericanTypewriter".to_string(),
            font_size: 36.0,
            color: [1.0, 1.0, 1.0, 1.0],
            remaining_offset_y: 120.0,
            time_taken_offset_y: -120.0,
        }
    }
}
