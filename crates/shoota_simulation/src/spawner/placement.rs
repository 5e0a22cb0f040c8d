//! Placement мишеней вокруг зрителя

use bevy::prelude::*;
use rand::Rng;
use std::f32::consts::TAU;

/// Пара углов ориентации anchor'а (радианы, [0, 2π))
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementAngles {
    pub theta_x: f32,
    pub theta_y: f32,
}

impl PlacementAngles {
    /// Два независимых равномерных угла. theta_x сэмплится первым,
    /// порядок важен для воспроизводимости при фиксированном seed.
    pub fn sample(rng: &mut impl Rng) -> Self {
        let theta_x = rng.gen_range(0.0..TAU);
        let theta_y = rng.gen_range(0.0..TAU);
        Self { theta_x, theta_y }
    }
}

/// Transform anchor'а: Rot_y(θy) · Rot_x(θx) · Translate(0, 0, −distance)
///
/// x-rotation применяется первой, y-rotation поверх неё; точка всегда
/// лежит на сфере радиуса `distance` вокруг зрителя.
pub fn placement_transform(angles: PlacementAngles, distance: f32) -> Mat4 {
    let rotation = Mat4::from_rotation_y(angles.theta_y) * Mat4::from_rotation_x(angles.theta_x);
    let translation = Mat4::from_translation(Vec3::new(0.0, 0.0, -distance));
    rotation * translation
}
