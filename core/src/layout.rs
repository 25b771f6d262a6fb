use glam::{Mat4, Vec3};

use crate::motion::nearest_card;
use crate::tuning::CarouselTuning;

const SHADOW_DROP: f32 = 0.7;
const SHADOW_DROP_PER_OFFSET: f32 = 0.05;
const SHADOW_SCALE_NEAR: f32 = 0.9;
const SHADOW_SCALE_FAR: f32 = 1.2;
const SHADOW_OPACITY_NEAR: f32 = 0.5;
const SHADOW_OPACITY_FAR: f32 = 0.15;
pub const SHADOW_WIDTH_RATIO: f32 = 0.9;
pub const SHADOW_DEPTH_RATIO: f32 = 0.5;

/// Soft contact shadow under a card, in the card group's local space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowPose {
    pub y: f32,
    pub scale_x: f32,
    pub opacity: f32,
}

/// Placement of one card group (front face, reflection and shadow).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CardTransform {
    pub translation: Vec3,
    pub rotation_y: f32,
    pub scale: f32,
    /// Bob offset of the front face; zero for every card but the centered one.
    pub lift: f32,
    /// Local y of the mirrored copy, bouncing opposite to `lift`.
    pub reflection_y: f32,
    pub shadow: ShadowPose,
}

impl CardTransform {
    pub fn group_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.translation)
            * Mat4::from_rotation_y(self.rotation_y)
            * Mat4::from_scale(Vec3::splat(self.scale))
    }

    /// World matrix of the front face; the only part that takes clicks.
    pub fn front_matrix(&self) -> Mat4 {
        self.group_matrix() * Mat4::from_translation(Vec3::new(0.0, self.lift, 0.0))
    }

    pub fn reflection_matrix(&self) -> Mat4 {
        self.group_matrix()
            * Mat4::from_translation(Vec3::new(0.0, self.reflection_y, 0.0))
            * Mat4::from_scale(Vec3::new(1.0, -1.0, 1.0))
    }

    /// The shadow quad lies flat, so it is rotated onto the floor.
    pub fn shadow_matrix(&self) -> Mat4 {
        self.group_matrix()
            * Mat4::from_translation(Vec3::new(0.0, self.shadow.y, 0.0))
            * Mat4::from_rotation_x(-std::f32::consts::FRAC_PI_2)
            * Mat4::from_scale(Vec3::new(self.shadow.scale_x, 1.0, 1.0))
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Places every card for a given center position and bob offset.
pub fn layout_cards(
    card_count: usize,
    center: f32,
    bob: f32,
    tuning: &CarouselTuning,
) -> Vec<CardTransform> {
    let centered = nearest_card(center, card_count);
    let max_tilt = tuning.max_tilt_rad();
    let floor_y = tuning.floor_y();
    (0..card_count)
        .map(|i| {
            let offset = i as f32 - center;
            let distance = offset.abs();
            let x = offset * tuning.gap;
            let z = -(distance * tuning.depth_step).min(tuning.depth_cap);
            let scale = lerp(tuning.scale_min, tuning.scale_max, (1.0 - distance).max(0.0));
            let rotation_y = (-offset).clamp(-1.0, 1.0) * max_tilt;
            let lift = if i == centered { bob } else { 0.0 };
            CardTransform {
                translation: Vec3::new(x, 0.0, z),
                rotation_y,
                scale,
                lift,
                reflection_y: 2.0 * floor_y - lift,
                shadow: ShadowPose {
                    y: -tuning.card_height * (SHADOW_DROP + SHADOW_DROP_PER_OFFSET * distance),
                    scale_x: lerp(SHADOW_SCALE_NEAR, SHADOW_SCALE_FAR, distance),
                    opacity: lerp(SHADOW_OPACITY_NEAR, SHADOW_OPACITY_FAR, distance.min(1.0)),
                },
            }
        })
        .collect()
}

/// Remembers which card the title label shows so it only changes when the
/// nearest card does.
#[derive(Clone, Copy, Debug, Default)]
pub struct LabelTracker {
    shown: Option<usize>,
}

impl LabelTracker {
    pub fn new() -> Self {
        Self { shown: None }
    }

    /// Returns the new card when the label must change.
    pub fn update(&mut self, center: f32, card_count: usize) -> Option<usize> {
        if card_count == 0 {
            return None;
        }
        let nearest = nearest_card(center, card_count);
        if self.shown == Some(nearest) {
            return None;
        }
        self.shown = Some(nearest);
        Some(nearest)
    }

    pub fn shown(&self) -> Option<usize> {
        self.shown
    }
}
