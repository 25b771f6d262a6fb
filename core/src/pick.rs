use crate::camera::Ray;
use crate::layout::CardTransform;
use crate::tuning::CarouselTuning;

const PARALLEL_EPS: f32 = 1.0e-6;

/// Nearest card whose front face the ray crosses. Shadows and reflections
/// never take part.
pub fn pick_card(ray: &Ray, transforms: &[CardTransform], tuning: &CarouselTuning) -> Option<usize> {
    let half_w = tuning.card_width * 0.5;
    let half_h = tuning.card_height * 0.5;
    let mut best: Option<(usize, f32)> = None;
    for (i, transform) in transforms.iter().enumerate() {
        let world = transform.front_matrix();
        let inv = world.inverse();
        let origin = inv.transform_point3(ray.origin);
        let direction = inv.transform_vector3(ray.direction);
        if direction.z.abs() <= PARALLEL_EPS {
            continue;
        }
        let t = -origin.z / direction.z;
        if !(t >= 0.0) {
            continue;
        }
        let hit = origin + direction * t;
        if hit.x.abs() > half_w || hit.y.abs() > half_h {
            continue;
        }
        // `t` is shared between local and world space since only the
        // direction was transformed, not renormalized.
        if best.map(|(_, best_t)| t < best_t).unwrap_or(true) {
            best = Some((i, t));
        }
    }
    best.map(|(i, _)| i)
}

/// Both conditions must hold: the card sits at the center and the
/// carousel has all but stopped.
pub fn is_actionable(card: usize, index: f32, velocity: f32, tuning: &CarouselTuning) -> bool {
    let center_distance = (card as f32 - index).abs();
    center_distance < tuning.click_center_eps && velocity.abs() < tuning.click_speed_eps
}
